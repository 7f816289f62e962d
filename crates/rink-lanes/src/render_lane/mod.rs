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

//! Rendering lane - hot path for graphics operations
//!
//! Data flows one way through this module: CPU-resident vertex arrays are
//! uploaded into [`VertexArray`]s, described to the active [`ShaderProgram`]
//! through attribute bindings, transformed by the [`TransformPipeline`] matrix
//! and finally drawn by each [`Drawable`] in a fixed order. The
//! [`SceneRenderer`] drives all of it from the three host lifecycle events.

pub mod drawables;
pub mod program;
pub mod shaders;

mod scene;
mod state;
mod texture;
mod transform;
mod vertex_array;

pub use drawables::{DrawRegion, DrawSummary, Drawable, Mallet, Puck, Table};
pub use program::{
    ColorShaderProgram, ColorSource, ProgramSources, ShaderProgram, TextureShaderProgram,
    VertexInputs,
};
pub use scene::*;
pub use shaders::EmbeddedShaderSources;
pub use state::*;
pub use texture::*;
pub use transform::*;
pub use vertex_array::*;
