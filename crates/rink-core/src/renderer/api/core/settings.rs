// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Scene-level settings selecting how the air-hockey table is rendered.

use crate::math::LinearRgba;
use serde::{Deserialize, Serialize};

/// Selects the shader set, buffer layout and transform chain of the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Shared `X,Y,R,G,B` buffer with a per-vertex color attribute and an
    /// orthographic projection.
    #[default]
    FlatColor,
    /// Shared buffer with position only; each region sets a `u_Color` tint.
    UniformColor,
    /// Texture-mapped table with separate mallet and puck buffers, orthographic.
    Textured,
    /// Textured geometry seen through a perspective projection with a tilted model.
    Perspective,
}

impl RenderMode {
    /// Returns `true` for the modes that sample the table texture.
    pub fn is_textured(&self) -> bool {
        matches!(self, RenderMode::Textured | RenderMode::Perspective)
    }
}

/// A collection of settings that shape the scene built by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// The rendering variant.
    pub mode: RenderMode,
    /// Color the framebuffer is cleared to every frame.
    pub clear_color: LinearRgba,
    /// Vertical field of view of the perspective projection, in degrees.
    pub field_of_view_degrees: f32,
    /// Distance to the near clipping plane.
    pub z_near: f32,
    /// Distance to the far clipping plane.
    pub z_far: f32,
    /// How far the table is pushed away from the camera (perspective only).
    pub table_distance: f32,
    /// Rotation of the table around the X axis, in degrees (perspective only).
    pub table_tilt_degrees: f32,
    /// Offset along the table normal applied to objects drawn above it.
    pub object_lift: f32,
    /// Whether the puck is part of the scene.
    pub draw_puck: bool,
    /// Runs program validation after linking. Has no effect in release builds.
    pub validate_programs: bool,
}

impl SceneConfig {
    /// A default configuration using the given mode.
    pub fn with_mode(mode: RenderMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Whether program validation should actually run in this build.
    pub fn should_validate(&self) -> bool {
        self.validate_programs && cfg!(debug_assertions)
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            mode: RenderMode::FlatColor,
            clear_color: LinearRgba::TRANSPARENT,
            field_of_view_degrees: 45.0,
            z_near: 1.0,
            z_far: 10.0,
            table_distance: 2.5,
            table_tilt_degrees: -60.0,
            object_lift: 0.01,
            draw_puck: true,
            validate_programs: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_scene() {
        let cfg = SceneConfig::default();
        assert_eq!(cfg.field_of_view_degrees, 45.0);
        assert_eq!(cfg.z_near, 1.0);
        assert_eq!(cfg.z_far, 10.0);
        assert_eq!(cfg.mode, RenderMode::FlatColor);
        assert!(cfg.draw_puck);
    }

    #[test]
    fn textured_modes() {
        assert!(RenderMode::Perspective.is_textured());
        assert!(RenderMode::Textured.is_textured());
        assert!(!RenderMode::UniformColor.is_textured());
    }
}
