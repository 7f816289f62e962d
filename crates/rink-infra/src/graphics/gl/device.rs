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

use super::conversions::IntoGl;
use super::uniforms::UniformTable;
use glow::HasContext;
use rink_core::math::{LinearRgba, Mat4, Vec4};
use rink_core::renderer::{
    AttributeDescriptor, AttributeSlot, BufferId, GraphicsAdapterInfo, GraphicsBackendType,
    GraphicsDevice, PrimitiveTopology, ProgramId, ProgramValidation, RenderError, ResourceError,
    ShaderError, ShaderModuleDescriptor, ShaderModuleId, TextureDescriptor, TextureId,
    UniformSlot, Viewport,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

struct GlProgram {
    program: glow::Program,
    label: String,
    /// Attribute locations resolved from this program.
    attributes: Vec<u32>,
}

struct GlBuffer {
    buffer: glow::Buffer,
    size: usize,
}

/// A [`GraphicsDevice`] that issues OpenGL (ES) 2.0 calls through `glow`.
///
/// The context must be current on the calling thread for the whole lifetime
/// of the device. On desktop core profiles a vertex array object is created
/// and kept bound, so attribute state behaves as it does on ES 2.0.
pub struct GlDevice {
    gl: Arc<glow::Context>,
    vao: Option<glow::VertexArray>,
    next_id: usize,
    shaders: HashMap<ShaderModuleId, glow::Shader>,
    programs: HashMap<ProgramId, GlProgram>,
    uniforms: UniformTable<glow::UniformLocation>,
    buffers: HashMap<BufferId, GlBuffer>,
    textures: HashMap<TextureId, glow::Texture>,
    /// Readable vertex count of each enabled attribute location.
    attribute_extents: HashMap<u32, usize>,
    current_program: Option<ProgramId>,
}

impl fmt::Debug for GlDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlDevice")
            .field("shaders", &self.shaders.len())
            .field("programs", &self.programs.len())
            .field("uniforms", &self.uniforms.len())
            .field("buffers", &self.buffers.len())
            .field("textures", &self.textures.len())
            .field("current_program", &self.current_program)
            .finish()
    }
}

impl GlDevice {
    /// Wraps a context that is current on this thread.
    pub fn new(gl: Arc<glow::Context>) -> Result<Self, RenderError> {
        let version = gl.version();
        let vao = if !version.is_embedded && version.major >= 3 {
            // SAFETY: the caller guarantees the context is current.
            let vao = unsafe { gl.create_vertex_array() }
                .map_err(RenderError::InitializationFailed)?;
            unsafe { gl.bind_vertex_array(Some(vao)) };
            Some(vao)
        } else {
            None
        };

        let device = Self {
            gl,
            vao,
            next_id: 0,
            shaders: HashMap::new(),
            programs: HashMap::new(),
            uniforms: UniformTable::default(),
            buffers: HashMap::new(),
            textures: HashMap::new(),
            attribute_extents: HashMap::new(),
            current_program: None,
        };
        let info = device.adapter_info();
        log::info!(
            "GlDevice: Created on '{}' ({}), {}.",
            info.name,
            info.backend_type,
            info.version
        );
        Ok(device)
    }

    /// The wrapped context.
    pub fn context(&self) -> &Arc<glow::Context> {
        &self.gl
    }

    fn allocate_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn gl_program(&self, id: ProgramId) -> Result<&GlProgram, ResourceError> {
        self.programs.get(&id).ok_or(ResourceError::InvalidHandle)
    }

    fn uniform(&self, slot: UniformSlot) -> Result<&glow::UniformLocation, ResourceError> {
        if self.current_program != Some(slot.program) {
            return Err(ResourceError::BackendError(format!(
                "uniform location of program {:?} used while {:?} is current",
                slot.program, self.current_program
            )));
        }
        self.uniforms.get(slot).ok_or(ResourceError::InvalidHandle)
    }

    fn check_error(&self, operation: &str) -> Result<(), ResourceError> {
        // SAFETY: the context is current for the lifetime of the device.
        let error = unsafe { self.gl.get_error() };
        if error == glow::NO_ERROR {
            Ok(())
        } else {
            Err(ResourceError::BackendError(format!(
                "{operation} raised GL error 0x{error:04X}"
            )))
        }
    }
}

impl Drop for GlDevice {
    fn drop(&mut self) {
        // Objects still alive here belong to a context the platform is about
        // to destroy; only the vertex array is ours to release.
        if let Some(vao) = self.vao.take() {
            unsafe { self.gl.delete_vertex_array(vao) };
        }
    }
}

impl GraphicsDevice for GlDevice {
    fn adapter_info(&self) -> GraphicsAdapterInfo {
        // SAFETY: the context is current for the lifetime of the device.
        let (name, version) = unsafe {
            (
                self.gl.get_parameter_string(glow::RENDERER),
                self.gl.get_parameter_string(glow::VERSION),
            )
        };
        let backend_type = if self.gl.version().is_embedded {
            GraphicsBackendType::OpenGlEs
        } else {
            GraphicsBackendType::OpenGl
        };
        GraphicsAdapterInfo {
            name,
            backend_type,
            version,
        }
    }

    fn create_shader(
        &mut self,
        descriptor: &ShaderModuleDescriptor,
    ) -> Result<ShaderModuleId, ResourceError> {
        let label = descriptor.label.unwrap_or("unlabeled");
        // SAFETY: the context is current for the lifetime of the device.
        let shader = unsafe {
            let shader = self
                .gl
                .create_shader(descriptor.stage.into_gl())
                .map_err(ResourceError::BackendError)?;
            self.gl.shader_source(shader, &descriptor.source);
            self.gl.compile_shader(shader);
            if !self.gl.get_shader_compile_status(shader) {
                let details = self.gl.get_shader_info_log(shader);
                self.gl.delete_shader(shader);
                return Err(ShaderError::CompilationError {
                    label: label.to_string(),
                    stage: descriptor.stage,
                    details,
                }
                .into());
            }
            shader
        };

        let id = ShaderModuleId(self.allocate_id());
        self.shaders.insert(id, shader);
        log::debug!(
            "GlDevice: Compiled {} shader '{label}' as {id:?}.",
            descriptor.stage
        );
        Ok(id)
    }

    fn destroy_shader(&mut self, id: ShaderModuleId) -> Result<(), ResourceError> {
        let shader = self.shaders.remove(&id).ok_or(ResourceError::InvalidHandle)?;
        unsafe { self.gl.delete_shader(shader) };
        Ok(())
    }

    fn link_program(
        &mut self,
        label: Option<&str>,
        vertex: ShaderModuleId,
        fragment: ShaderModuleId,
    ) -> Result<ProgramId, ResourceError> {
        let label = label.unwrap_or("unlabeled");
        let vs = *self.shaders.get(&vertex).ok_or(ResourceError::InvalidHandle)?;
        let fs = *self.shaders.get(&fragment).ok_or(ResourceError::InvalidHandle)?;

        // SAFETY: the context is current for the lifetime of the device.
        let program = unsafe {
            let program = self
                .gl
                .create_program()
                .map_err(ResourceError::BackendError)?;
            self.gl.attach_shader(program, vs);
            self.gl.attach_shader(program, fs);
            self.gl.link_program(program);
            self.gl.detach_shader(program, vs);
            self.gl.detach_shader(program, fs);
            if !self.gl.get_program_link_status(program) {
                let details = self.gl.get_program_info_log(program);
                self.gl.delete_program(program);
                return Err(ShaderError::LinkError {
                    label: label.to_string(),
                    details,
                }
                .into());
            }
            program
        };

        let id = ProgramId(self.allocate_id());
        self.programs.insert(
            id,
            GlProgram {
                program,
                label: label.to_string(),
                attributes: Vec::new(),
            },
        );
        log::debug!("GlDevice: Linked program '{label}' as {id:?}.");
        Ok(id)
    }

    fn destroy_program(&mut self, id: ProgramId) -> Result<(), ResourceError> {
        let program = self.programs.remove(&id).ok_or(ResourceError::InvalidHandle)?;
        if self.current_program == Some(id) {
            self.current_program = None;
        }
        let uniforms = self.uniforms.forget_program(id);
        unsafe { self.gl.delete_program(program.program) };
        log::debug!(
            "GlDevice: Destroyed program '{}' ({id:?}) and {uniforms} uniform locations.",
            program.label
        );
        Ok(())
    }

    fn validate_program(&mut self, id: ProgramId) -> Result<ProgramValidation, ResourceError> {
        let program = self.gl_program(id)?.program;
        // SAFETY: the context is current for the lifetime of the device.
        let (valid, log) = unsafe {
            self.gl.validate_program(program);
            (
                self.gl
                    .get_program_parameter_i32(program, glow::VALIDATE_STATUS)
                    != 0,
                self.gl.get_program_info_log(program),
            )
        };
        Ok(ProgramValidation { valid, log })
    }

    fn attribute_location(
        &mut self,
        program: ProgramId,
        name: &str,
    ) -> Result<AttributeSlot, ResourceError> {
        let handle = self.gl_program(program)?.program;
        let index = unsafe { self.gl.get_attrib_location(handle, name) }.ok_or_else(|| {
            ShaderError::UnresolvedName {
                program,
                name: name.to_string(),
            }
        })?;
        if let Some(entry) = self.programs.get_mut(&program) {
            if !entry.attributes.contains(&index) {
                entry.attributes.push(index);
            }
        }
        Ok(AttributeSlot { program, index })
    }

    fn uniform_location(
        &mut self,
        program: ProgramId,
        name: &str,
    ) -> Result<UniformSlot, ResourceError> {
        let handle = self.gl_program(program)?.program;
        if let Some(slot) = self.uniforms.cached(program, name) {
            return Ok(slot);
        }
        let location = unsafe { self.gl.get_uniform_location(handle, name) }.ok_or_else(|| {
            ShaderError::UnresolvedName {
                program,
                name: name.to_string(),
            }
        })?;
        Ok(self.uniforms.insert(program, name, location))
    }

    fn use_program(&mut self, id: ProgramId) -> Result<(), ResourceError> {
        let program = self.gl_program(id)?.program;
        unsafe { self.gl.use_program(Some(program)) };
        self.current_program = Some(id);
        Ok(())
    }

    fn create_vertex_buffer(&mut self, data: &[u8]) -> Result<BufferId, ResourceError> {
        if data.is_empty() {
            return Err(ResourceError::UploadError("vertex data is empty".to_string()));
        }
        // SAFETY: the context is current for the lifetime of the device.
        let buffer = unsafe {
            let buffer = self
                .gl
                .create_buffer()
                .map_err(ResourceError::UploadError)?;
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
            self.gl
                .buffer_data_u8_slice(glow::ARRAY_BUFFER, data, glow::STATIC_DRAW);
            buffer
        };
        if let Err(e) = self.check_error("glBufferData") {
            unsafe { self.gl.delete_buffer(buffer) };
            return Err(ResourceError::UploadError(e.to_string()));
        }

        let id = BufferId(self.allocate_id());
        self.buffers.insert(
            id,
            GlBuffer {
                buffer,
                size: data.len(),
            },
        );
        log::debug!("GlDevice: Created vertex buffer {id:?} ({} bytes).", data.len());
        Ok(id)
    }

    fn destroy_buffer(&mut self, id: BufferId) -> Result<(), ResourceError> {
        let buffer = self.buffers.remove(&id).ok_or(ResourceError::InvalidHandle)?;
        unsafe { self.gl.delete_buffer(buffer.buffer) };
        Ok(())
    }

    fn bind_vertex_attribute(
        &mut self,
        buffer: BufferId,
        descriptor: &AttributeDescriptor,
    ) -> Result<(), ResourceError> {
        let entry = self.buffers.get(&buffer).ok_or(ResourceError::InvalidHandle)?;
        let (handle, size) = (entry.buffer, entry.size);
        // SAFETY: the context is current for the lifetime of the device.
        unsafe {
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(handle));
            self.gl.vertex_attrib_pointer_f32(
                descriptor.slot.index,
                descriptor.component_count as i32,
                glow::FLOAT,
                false,
                descriptor.stride_bytes as i32,
                descriptor.offset_bytes as i32,
            );
            self.gl.enable_vertex_attrib_array(descriptor.slot.index);
        }
        self.check_error("glVertexAttribPointer")?;
        self.attribute_extents
            .insert(descriptor.slot.index, descriptor.readable_vertices(size));
        Ok(())
    }

    fn set_uniform_mat4(&mut self, slot: UniformSlot, value: &Mat4) -> Result<(), ResourceError> {
        let location = self.uniform(slot)?;
        unsafe {
            self.gl
                .uniform_matrix_4_f32_slice(Some(location), false, &value.to_cols_array())
        };
        Ok(())
    }

    fn set_uniform_vec4(&mut self, slot: UniformSlot, value: Vec4) -> Result<(), ResourceError> {
        let location = self.uniform(slot)?;
        unsafe {
            self.gl
                .uniform_4_f32(Some(location), value.x, value.y, value.z, value.w)
        };
        Ok(())
    }

    fn set_uniform_i32(&mut self, slot: UniformSlot, value: i32) -> Result<(), ResourceError> {
        let location = self.uniform(slot)?;
        unsafe { self.gl.uniform_1_i32(Some(location), value) };
        Ok(())
    }

    fn create_texture(
        &mut self,
        descriptor: &TextureDescriptor,
        data: &[u8],
    ) -> Result<TextureId, ResourceError> {
        if descriptor.width == 0 || descriptor.height == 0 || data.len() != descriptor.byte_len() {
            return Err(ResourceError::UploadError(format!(
                "texture '{}' is {}x{} but {} bytes were supplied",
                descriptor.label.unwrap_or("unlabeled"),
                descriptor.width,
                descriptor.height,
                data.len()
            )));
        }
        let (internal_format, format, ty) = descriptor.format.into_gl();
        let filter: i32 = descriptor.filter.into_gl();

        // SAFETY: the context is current for the lifetime of the device.
        let texture = unsafe {
            let texture = self
                .gl
                .create_texture()
                .map_err(ResourceError::UploadError)?;
            self.gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, filter);
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, filter);
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_S,
                glow::CLAMP_TO_EDGE as i32,
            );
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_T,
                glow::CLAMP_TO_EDGE as i32,
            );
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                internal_format,
                descriptor.width as i32,
                descriptor.height as i32,
                0,
                format,
                ty,
                glow::PixelUnpackData::Slice(Some(data)),
            );
            self.gl.bind_texture(glow::TEXTURE_2D, None);
            texture
        };
        if let Err(e) = self.check_error("glTexImage2D") {
            unsafe { self.gl.delete_texture(texture) };
            return Err(ResourceError::UploadError(e.to_string()));
        }

        let id = TextureId(self.allocate_id());
        self.textures.insert(id, texture);
        log::debug!(
            "GlDevice: Created texture '{}' as {id:?} ({}x{}).",
            descriptor.label.unwrap_or("unlabeled"),
            descriptor.width,
            descriptor.height
        );
        Ok(id)
    }

    fn destroy_texture(&mut self, id: TextureId) -> Result<(), ResourceError> {
        let texture = self.textures.remove(&id).ok_or(ResourceError::InvalidHandle)?;
        unsafe { self.gl.delete_texture(texture) };
        Ok(())
    }

    fn bind_texture(&mut self, unit: u32, id: TextureId) -> Result<(), ResourceError> {
        let texture = *self.textures.get(&id).ok_or(ResourceError::InvalidHandle)?;
        // SAFETY: the context is current for the lifetime of the device.
        let units = unsafe {
            self.gl
                .get_parameter_i32(glow::MAX_COMBINED_TEXTURE_IMAGE_UNITS)
        };
        if unit >= units.max(0) as u32 {
            return Err(ResourceError::OutOfBounds);
        }
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        }
        Ok(())
    }

    fn set_clear_color(&mut self, color: LinearRgba) {
        unsafe { self.gl.clear_color(color.r, color.g, color.b, color.a) };
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        unsafe {
            self.gl.viewport(
                viewport.x,
                viewport.y,
                viewport.width as i32,
                viewport.height as i32,
            )
        };
    }

    fn clear(&mut self) {
        unsafe { self.gl.clear(glow::COLOR_BUFFER_BIT) };
    }

    fn draw_arrays(
        &mut self,
        topology: PrimitiveTopology,
        first: u32,
        count: u32,
    ) -> Result<(), ResourceError> {
        let program_id = self
            .current_program
            .ok_or_else(|| ResourceError::BackendError("no current program".to_string()))?;
        let program = self.gl_program(program_id)?;

        let readable = program
            .attributes
            .iter()
            .filter_map(|index| self.attribute_extents.get(index))
            .min()
            .copied()
            .unwrap_or(usize::MAX);
        if first as usize + count as usize > readable {
            return Err(ResourceError::OutOfBounds);
        }

        unsafe {
            self.gl
                .draw_arrays(topology.into_gl(), first as i32, count as i32)
        };
        Ok(())
    }
}
