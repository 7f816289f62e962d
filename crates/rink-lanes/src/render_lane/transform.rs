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

//! Projection and model matrices fed to the `u_Matrix` uniform.

use rink_core::math::{degrees_to_radians, Mat4, Vec3};
use rink_core::renderer::{ConfigurationError, RenderMode, SceneConfig};

/// Half-extents of the orthographic view volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthoExtents {
    /// Half-width of the visible region.
    pub horizontal: f32,
    /// Half-height of the visible region.
    pub vertical: f32,
}

/// The projection family used by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Flat framing that keeps a unit square undistorted on any aspect ratio.
    Orthographic,
    /// Foreshortened view of a table pushed away from the camera and tilted.
    Perspective {
        /// Vertical field of view, in degrees.
        field_of_view_degrees: f32,
        /// Near clipping plane distance.
        z_near: f32,
        /// Far clipping plane distance.
        z_far: f32,
        /// Translation of the table along -Z.
        table_distance: f32,
        /// Rotation of the table around X, in degrees.
        table_tilt_degrees: f32,
        /// Extra translation along the table normal for objects above it.
        object_lift: f32,
    },
}

/// Computes the matrices for the table and for the objects drawn on it.
///
/// All matrices are recomputed on resize only; frames just read them.
#[derive(Debug, Clone)]
pub struct TransformPipeline {
    projection_kind: Projection,
    projection: Mat4,
    model: Mat4,
    table_matrix: Mat4,
    object_matrix: Mat4,
    extents: Option<OrthoExtents>,
    sized: bool,
}

impl TransformPipeline {
    /// Creates an unsized pipeline for the given projection.
    pub fn new(projection_kind: Projection) -> Self {
        Self {
            projection_kind,
            projection: Mat4::IDENTITY,
            model: Mat4::IDENTITY,
            table_matrix: Mat4::IDENTITY,
            object_matrix: Mat4::IDENTITY,
            extents: None,
            sized: false,
        }
    }

    /// Selects the projection family matching the configured render mode.
    pub fn from_config(config: &SceneConfig) -> Self {
        let kind = match config.mode {
            RenderMode::Perspective => Projection::Perspective {
                field_of_view_degrees: config.field_of_view_degrees,
                z_near: config.z_near,
                z_far: config.z_far,
                table_distance: config.table_distance,
                table_tilt_degrees: config.table_tilt_degrees,
                object_lift: config.object_lift,
            },
            _ => Projection::Orthographic,
        };
        Self::new(kind)
    }

    /// Recomputes every matrix for a `width` x `height` viewport.
    ///
    /// # Errors
    ///
    /// A zero-area viewport or unusable perspective parameters are rejected
    /// with a [`ConfigurationError`] and leave the pipeline unchanged.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), ConfigurationError> {
        if width == 0 || height == 0 {
            return Err(ConfigurationError::ZeroAreaViewport { width, height });
        }
        let (w, h) = (width as f32, height as f32);

        match self.projection_kind {
            Projection::Orthographic => {
                let aspect = if w > h { w / h } else { h / w };
                let extents = if w > h {
                    OrthoExtents {
                        horizontal: aspect,
                        vertical: 1.0,
                    }
                } else {
                    OrthoExtents {
                        horizontal: 1.0,
                        vertical: aspect,
                    }
                };
                self.projection = Mat4::orthographic_rh_gl(
                    -extents.horizontal,
                    extents.horizontal,
                    -extents.vertical,
                    extents.vertical,
                    -1.0,
                    1.0,
                );
                self.model = Mat4::IDENTITY;
                self.table_matrix = self.projection;
                self.object_matrix = self.projection;
                self.extents = Some(extents);
            }
            Projection::Perspective {
                field_of_view_degrees,
                z_near,
                z_far,
                table_distance,
                table_tilt_degrees,
                object_lift,
            } => {
                validate_perspective(field_of_view_degrees, z_near, z_far)?;
                self.projection = Mat4::perspective_rh_gl(
                    degrees_to_radians(field_of_view_degrees),
                    w / h,
                    z_near,
                    z_far,
                );

                // The table matrix is composed once from the model as it
                // stands here; the model then keeps accumulating for objects.
                self.model = Mat4::IDENTITY
                    .translate(Vec3::new(0.0, 0.0, -table_distance))
                    .rotate(Vec3::X, degrees_to_radians(table_tilt_degrees));
                self.table_matrix = self.projection * self.model;

                self.model = self.model.translate(Vec3::new(0.0, 0.0, object_lift));
                self.object_matrix = self.projection * self.model;
                self.extents = None;
            }
        }

        self.sized = true;
        Ok(())
    }

    /// The matrix for the table surface.
    pub fn table_matrix(&self) -> &Mat4 {
        &self.table_matrix
    }

    /// The matrix for mallets and puck.
    pub fn object_matrix(&self) -> &Mat4 {
        &self.object_matrix
    }

    /// The current projection matrix.
    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    /// The model matrix as left after the last resize.
    pub fn model(&self) -> &Mat4 {
        &self.model
    }

    /// Half-extents of the orthographic volume; `None` for perspective or before sizing.
    pub fn ortho_extents(&self) -> Option<OrthoExtents> {
        self.extents
    }

    /// The projection family.
    pub fn projection_kind(&self) -> Projection {
        self.projection_kind
    }

    /// `true` once a valid resize has been applied.
    pub fn is_sized(&self) -> bool {
        self.sized
    }
}

fn validate_perspective(fov: f32, z_near: f32, z_far: f32) -> Result<(), ConfigurationError> {
    if !(fov > 0.0 && fov < 180.0) {
        return Err(ConfigurationError::InvalidProjection(format!(
            "field of view {fov} is outside (0, 180) degrees"
        )));
    }
    if !(z_near > 0.0 && z_far > z_near && z_far.is_finite()) {
        return Err(ConfigurationError::InvalidProjection(format!(
            "clip planes near={z_near} far={z_far} must satisfy 0 < near < far"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rink_core::math::Vec4;

    fn perspective() -> TransformPipeline {
        TransformPipeline::from_config(&SceneConfig::with_mode(RenderMode::Perspective))
    }

    #[test]
    fn orthographic_landscape_and_portrait() {
        let mut t = TransformPipeline::new(Projection::Orthographic);
        t.resize(1000, 500).unwrap();
        let e = t.ortho_extents().unwrap();
        assert_relative_eq!(e.horizontal, 2.0);
        assert_relative_eq!(e.vertical, 1.0);

        t.resize(500, 1000).unwrap();
        let e = t.ortho_extents().unwrap();
        assert_relative_eq!(e.horizontal, 1.0);
        assert_relative_eq!(e.vertical, 2.0);
    }

    #[test]
    fn orthographic_square_viewport_is_identity_framing() {
        let mut t = TransformPipeline::new(Projection::Orthographic);
        t.resize(640, 640).unwrap();
        assert_eq!(
            t.ortho_extents(),
            Some(OrthoExtents {
                horizontal: 1.0,
                vertical: 1.0
            })
        );
        assert_eq!(t.table_matrix(), t.object_matrix());
    }

    #[test]
    fn zero_area_resize_is_rejected_without_side_effects() {
        let mut t = TransformPipeline::new(Projection::Orthographic);
        t.resize(800, 400).unwrap();
        let before = *t.table_matrix();
        assert_eq!(
            t.resize(0, 400),
            Err(ConfigurationError::ZeroAreaViewport {
                width: 0,
                height: 400
            })
        );
        assert_eq!(*t.table_matrix(), before);
        assert!(t.is_sized());
    }

    #[test]
    fn perspective_matrix_closed_form() {
        let mut t = perspective();
        t.resize(800, 600).unwrap();
        let f = 1.0 / degrees_to_radians(22.5).tan();
        assert_relative_eq!(t.projection().cols[1].y, f, epsilon = 1e-6);
        assert_relative_eq!(t.projection().cols[0].x, f * 600.0 / 800.0, epsilon = 1e-6);
        assert!(t.ortho_extents().is_none());
    }

    #[test]
    fn table_matrix_is_projection_times_model() {
        let mut t = perspective();
        t.resize(800, 600).unwrap();
        let model = Mat4::from_translation(Vec3::new(0.0, 0.0, -2.5))
            * Mat4::from_rotation_x(degrees_to_radians(-60.0));
        let expected = *t.projection() * model;
        for (a, b) in t
            .table_matrix()
            .to_cols_array()
            .iter()
            .zip(expected.to_cols_array().iter())
        {
            assert_relative_eq!(a, b, epsilon = 1e-5);
        }
        // The table center sits 2.5 units in front of the camera.
        let clip = *t.table_matrix() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(clip.w, 2.5, epsilon = 1e-5);
    }

    #[test]
    fn object_matrix_keeps_accumulating_on_the_model() {
        let mut t = perspective();
        t.resize(800, 600).unwrap();
        assert_ne!(t.table_matrix(), t.object_matrix());
        let lifted = *t.projection()
            * Mat4::from_translation(Vec3::new(0.0, 0.0, -2.5))
            * Mat4::from_rotation_x(degrees_to_radians(-60.0))
            * Mat4::from_translation(Vec3::new(0.0, 0.0, 0.01));
        for (a, b) in t
            .object_matrix()
            .to_cols_array()
            .iter()
            .zip(lifted.to_cols_array().iter())
        {
            assert_relative_eq!(a, b, epsilon = 1e-5);
        }
    }

    #[test]
    fn invalid_clip_planes_are_rejected() {
        let mut config = SceneConfig::with_mode(RenderMode::Perspective);
        config.z_near = 0.0;
        let mut t = TransformPipeline::from_config(&config);
        assert!(matches!(
            t.resize(800, 600),
            Err(ConfigurationError::InvalidProjection(_))
        ));
        assert!(!t.is_sized());
    }
}
