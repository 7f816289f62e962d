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

//! Built-in GLSL sources for the scene's three programs.
//!
//! The sources target GLSL ES 1.00 (`attribute`/`varying`, `gl_FragColor`),
//! which desktop GL compatibility contexts also accept. They are embedded at
//! compile time and served by [`EmbeddedShaderSources`] under the identifiers
//! below.
//!
//! # Available Shaders
//!
//! - [`SIMPLE_VERTEX_SHADER`] / [`SIMPLE_FRAGMENT_SHADER`] - per-vertex color
//! - [`UNIFORM_COLOR_VERTEX_SHADER`] / [`UNIFORM_COLOR_FRAGMENT_SHADER`] - `u_Color` tint
//! - [`TEXTURE_VERTEX_SHADER`] / [`TEXTURE_FRAGMENT_SHADER`] - one sampled texture

use rink_core::renderer::{ShaderError, ShaderSourceProvider};
use std::borrow::Cow;

/// Identifier of the per-vertex color vertex shader.
pub const SIMPLE_VERTEX_SHADER: &str = "simple_vertex_shader";
/// Identifier of the per-vertex color fragment shader.
pub const SIMPLE_FRAGMENT_SHADER: &str = "simple_fragment_shader";
/// Identifier of the uniform-color vertex shader.
pub const UNIFORM_COLOR_VERTEX_SHADER: &str = "uniform_color_vertex_shader";
/// Identifier of the uniform-color fragment shader.
pub const UNIFORM_COLOR_FRAGMENT_SHADER: &str = "uniform_color_fragment_shader";
/// Identifier of the texture vertex shader.
pub const TEXTURE_VERTEX_SHADER: &str = "texture_vertex_shader";
/// Identifier of the texture fragment shader.
pub const TEXTURE_FRAGMENT_SHADER: &str = "texture_fragment_shader";

/// Passes `a_Color` through to the fragment stage and draws points 10 pixels wide.
pub const SIMPLE_VERTEX_GLSL: &str = include_str!("simple_vertex_shader.glsl");
/// Writes the interpolated `v_Color`.
pub const SIMPLE_FRAGMENT_GLSL: &str = include_str!("simple_fragment_shader.glsl");
/// Transforms `a_Position` only; color comes from the fragment stage.
pub const UNIFORM_COLOR_VERTEX_GLSL: &str = include_str!("uniform_color_vertex_shader.glsl");
/// Writes the `u_Color` tint.
pub const UNIFORM_COLOR_FRAGMENT_GLSL: &str = include_str!("uniform_color_fragment_shader.glsl");
/// Passes `a_TextureCoordinates` through to the fragment stage.
pub const TEXTURE_VERTEX_GLSL: &str = include_str!("texture_vertex_shader.glsl");
/// Samples `u_TextureUnit` at the interpolated coordinates.
pub const TEXTURE_FRAGMENT_GLSL: &str = include_str!("texture_fragment_shader.glsl");

/// Every identifier served by [`EmbeddedShaderSources`].
pub const IDENTIFIERS: [&str; 6] = [
    SIMPLE_VERTEX_SHADER,
    SIMPLE_FRAGMENT_SHADER,
    UNIFORM_COLOR_VERTEX_SHADER,
    UNIFORM_COLOR_FRAGMENT_SHADER,
    TEXTURE_VERTEX_SHADER,
    TEXTURE_FRAGMENT_SHADER,
];

/// Serves the sources compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedShaderSources;

impl EmbeddedShaderSources {
    /// Looks up an embedded source by identifier.
    pub fn source(identifier: &str) -> Option<&'static str> {
        match identifier {
            SIMPLE_VERTEX_SHADER => Some(SIMPLE_VERTEX_GLSL),
            SIMPLE_FRAGMENT_SHADER => Some(SIMPLE_FRAGMENT_GLSL),
            UNIFORM_COLOR_VERTEX_SHADER => Some(UNIFORM_COLOR_VERTEX_GLSL),
            UNIFORM_COLOR_FRAGMENT_SHADER => Some(UNIFORM_COLOR_FRAGMENT_GLSL),
            TEXTURE_VERTEX_SHADER => Some(TEXTURE_VERTEX_GLSL),
            TEXTURE_FRAGMENT_SHADER => Some(TEXTURE_FRAGMENT_GLSL),
            _ => None,
        }
    }
}

impl ShaderSourceProvider for EmbeddedShaderSources {
    fn load_shader_source(&self, identifier: &str) -> Result<Cow<'_, str>, ShaderError> {
        Self::source(identifier)
            .map(Cow::Borrowed)
            .ok_or_else(|| ShaderError::LoadError {
                path: identifier.to_string(),
                source_error: "no embedded shader with this identifier".to_string(),
            })
    }
}
