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

use crate::math::{LinearRgba, Mat4, Vec4};
use crate::renderer::api::*;
use crate::renderer::error::ResourceError;
use std::fmt::Debug;

/// The capability interface of an immediate-mode graphics device.
///
/// A device owns every native object it hands out and refers to them through
/// opaque IDs. Methods take `&mut self` because the underlying context is bound
/// to the render thread and all pipeline state mutation happens there.
pub trait GraphicsDevice: Debug {
    /// Returns information about the adapter backing this device.
    fn adapter_info(&self) -> GraphicsAdapterInfo;

    /// Compiles a shader object.
    /// ## Arguments
    /// * `descriptor` - The stage and GLSL source to compile.
    /// ## Returns
    /// The ID of the compiled shader object.
    /// ## Errors
    /// * `ResourceError::Shader(ShaderError::CompilationError)` - carrying the compiler log verbatim.
    fn create_shader(
        &mut self,
        descriptor: &ShaderModuleDescriptor,
    ) -> Result<ShaderModuleId, ResourceError>;

    /// Releases a shader object. Linked programs keep working.
    fn destroy_shader(&mut self, id: ShaderModuleId) -> Result<(), ResourceError>;

    /// Links a vertex and a fragment shader object into a program.
    /// ## Arguments
    /// * `label` - A debug label surfaced in link errors.
    /// * `vertex` - A compiled vertex shader.
    /// * `fragment` - A compiled fragment shader.
    /// ## Errors
    /// * `ResourceError::Shader(ShaderError::LinkError)` - if the stage interfaces do not match.
    fn link_program(
        &mut self,
        label: Option<&str>,
        vertex: ShaderModuleId,
        fragment: ShaderModuleId,
    ) -> Result<ProgramId, ResourceError>;

    /// Releases a program. Every location resolved from it becomes invalid.
    fn destroy_program(&mut self, id: ProgramId) -> Result<(), ResourceError>;

    /// Runs the backend's diagnostic validation on a program.
    fn validate_program(&mut self, id: ProgramId) -> Result<ProgramValidation, ResourceError>;

    /// Resolves the location of a vertex attribute by name.
    /// ## Errors
    /// * `ResourceError::Shader(ShaderError::UnresolvedName)` - if the name has no location.
    fn attribute_location(
        &mut self,
        program: ProgramId,
        name: &str,
    ) -> Result<AttributeSlot, ResourceError>;

    /// Resolves the location of a uniform by name.
    /// ## Errors
    /// * `ResourceError::Shader(ShaderError::UnresolvedName)` - if the name has no location.
    fn uniform_location(
        &mut self,
        program: ProgramId,
        name: &str,
    ) -> Result<UniformSlot, ResourceError>;

    /// Makes `id` the current program.
    fn use_program(&mut self, id: ProgramId) -> Result<(), ResourceError>;

    /// Uploads vertex data into a new, write-once buffer.
    /// ## Arguments
    /// * `data` - The raw bytes of the interleaved `f32` records.
    /// ## Errors
    /// * `ResourceError::UploadError` - if the data is empty or the allocation is rejected.
    fn create_vertex_buffer(&mut self, data: &[u8]) -> Result<BufferId, ResourceError>;

    /// Releases a vertex buffer.
    fn destroy_buffer(&mut self, id: BufferId) -> Result<(), ResourceError>;

    /// Points an attribute location at a region of `buffer` and enables it.
    fn bind_vertex_attribute(
        &mut self,
        buffer: BufferId,
        descriptor: &AttributeDescriptor,
    ) -> Result<(), ResourceError>;

    /// Uploads a `mat4` uniform of the current program.
    fn set_uniform_mat4(&mut self, slot: UniformSlot, value: &Mat4) -> Result<(), ResourceError>;

    /// Uploads a `vec4` uniform of the current program.
    fn set_uniform_vec4(&mut self, slot: UniformSlot, value: Vec4) -> Result<(), ResourceError>;

    /// Uploads an `int` (or sampler) uniform of the current program.
    fn set_uniform_i32(&mut self, slot: UniformSlot, value: i32) -> Result<(), ResourceError>;

    /// Creates a 2D texture initialized with `data`.
    /// ## Errors
    /// * `ResourceError::UploadError` - if `data` does not match the descriptor's size.
    fn create_texture(
        &mut self,
        descriptor: &TextureDescriptor,
        data: &[u8],
    ) -> Result<TextureId, ResourceError>;

    /// Releases a texture.
    fn destroy_texture(&mut self, id: TextureId) -> Result<(), ResourceError>;

    /// Binds a texture to a texture unit.
    fn bind_texture(&mut self, unit: u32, id: TextureId) -> Result<(), ResourceError>;

    /// Sets the color used by [`GraphicsDevice::clear`].
    fn set_clear_color(&mut self, color: LinearRgba);

    /// Sets the viewport rectangle.
    fn set_viewport(&mut self, viewport: Viewport);

    /// Clears the color buffer.
    fn clear(&mut self);

    /// Draws `count` vertices starting at `first` from the bound attributes.
    /// ## Errors
    /// * `ResourceError::OutOfBounds` - if a backend can detect the range exceeds the bound buffers.
    fn draw_arrays(
        &mut self,
        topology: PrimitiveTopology,
        first: u32,
        count: u32,
    ) -> Result<(), ResourceError>;
}
