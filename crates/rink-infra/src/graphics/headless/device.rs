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

use super::reflect::{self, ProgramInterface, ShaderInterface};
use rink_core::math::{LinearRgba, Mat4, Vec4};
use rink_core::renderer::{
    AttributeDescriptor, AttributeSlot, BufferId, GraphicsAdapterInfo, GraphicsBackendType,
    GraphicsDevice, PrimitiveTopology, ProgramId, ProgramValidation, ResourceError, ShaderError,
    ShaderModuleDescriptor, ShaderModuleId, ShaderStage, TextureDescriptor, TextureId,
    UniformSlot, Viewport,
};
use std::collections::HashMap;

/// Number of texture units the headless device exposes.
pub const MAX_TEXTURE_UNITS: u32 = 8;

/// Default budget for buffer and texture memory, in bytes.
pub const DEFAULT_MEMORY_LIMIT: usize = 64 * 1024 * 1024;

/// A draw call accepted by the headless device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    /// The program that was current when the call was issued.
    pub program: ProgramId,
    /// How the vertices were assembled.
    pub topology: PrimitiveTopology,
    /// Index of the first vertex.
    pub first: u32,
    /// Number of vertices.
    pub count: u32,
}

/// A value last uploaded to a uniform location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// A `mat4`.
    Mat4(Mat4),
    /// A `vec4`.
    Vec4(Vec4),
    /// An `int`, `bool` or sampler.
    Int(i32),
}

/// Every state change or object operation the device accepted, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    CreateShader { id: ShaderModuleId, stage: ShaderStage },
    DestroyShader(ShaderModuleId),
    LinkProgram { id: ProgramId, label: String },
    DestroyProgram(ProgramId),
    ValidateProgram(ProgramId),
    UseProgram(ProgramId),
    CreateBuffer { id: BufferId, size_bytes: usize },
    DestroyBuffer(BufferId),
    BindAttribute { buffer: BufferId, descriptor: AttributeDescriptor },
    SetUniform { slot: UniformSlot, value: UniformValue },
    CreateTexture { id: TextureId, width: u32, height: u32 },
    DestroyTexture(TextureId),
    BindTexture { unit: u32, id: TextureId },
    SetClearColor(LinearRgba),
    SetViewport(Viewport),
    Clear,
    Draw(DrawCall),
}

#[derive(Debug)]
struct ShaderObject {
    label: String,
    interface: ShaderInterface,
}

#[derive(Debug)]
struct ProgramObject {
    label: String,
    interface: ProgramInterface,
    /// Location of each entry of `interface.uniforms`.
    uniform_locations: Vec<u32>,
}

impl ProgramObject {
    fn uniform_type(&self, location: u32) -> Option<&str> {
        self.uniform_locations
            .iter()
            .position(|l| *l == location)
            .and_then(|i| self.interface.uniforms.get(i))
            .map(|u| u.ty.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
struct AttributeBinding {
    buffer: BufferId,
    descriptor: AttributeDescriptor,
}

/// A [`GraphicsDevice`] that needs no GPU.
///
/// It compiles and links GLSL with a shallow front end (see [`super::reflect`]),
/// tracks every object and piece of pipeline state the way a GL ES 2.0
/// context would, rejects the calls a driver would reject, and keeps an
/// ordered log of everything it accepted. Used by tests and by the sandbox.
#[derive(Debug)]
pub struct HeadlessDevice {
    next_id: usize,
    next_uniform_location: u32,
    memory_limit: usize,
    shaders: HashMap<ShaderModuleId, ShaderObject>,
    programs: HashMap<ProgramId, ProgramObject>,
    buffers: HashMap<BufferId, Vec<u8>>,
    textures: HashMap<TextureId, TextureDescriptor<'static>>,
    attributes: HashMap<u32, AttributeBinding>,
    uniforms: HashMap<(ProgramId, u32), UniformValue>,
    texture_units: HashMap<u32, TextureId>,
    current_program: Option<ProgramId>,
    clear_color: LinearRgba,
    viewport: Viewport,
    validations: usize,
    commands: Vec<DeviceCommand>,
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessDevice {
    /// Creates a device with the default memory budget.
    pub fn new() -> Self {
        Self::with_memory_limit(DEFAULT_MEMORY_LIMIT)
    }

    /// Creates a device that rejects uploads once `bytes` of buffer and
    /// texture memory are in use.
    pub fn with_memory_limit(bytes: usize) -> Self {
        Self {
            next_id: 0,
            next_uniform_location: 0,
            memory_limit: bytes,
            shaders: HashMap::new(),
            programs: HashMap::new(),
            buffers: HashMap::new(),
            textures: HashMap::new(),
            attributes: HashMap::new(),
            uniforms: HashMap::new(),
            texture_units: HashMap::new(),
            current_program: None,
            clear_color: LinearRgba::BLACK,
            viewport: Viewport::default(),
            validations: 0,
            commands: Vec::new(),
        }
    }

    /// The commands accepted so far.
    pub fn commands(&self) -> &[DeviceCommand] {
        &self.commands
    }

    /// Drains the command log.
    pub fn take_commands(&mut self) -> Vec<DeviceCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Empties the command log.
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// The draw calls in the command log, in issue order.
    pub fn draw_calls(&self) -> Vec<DrawCall> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DeviceCommand::Draw(call) => Some(*call),
                _ => None,
            })
            .collect()
    }

    /// The bytes stored in a live buffer.
    pub fn buffer_contents(&self, id: BufferId) -> Option<&[u8]> {
        self.buffers.get(&id).map(Vec::as_slice)
    }

    /// Number of shader objects not yet destroyed.
    pub fn live_shader_count(&self) -> usize {
        self.shaders.len()
    }

    /// Number of linked programs not yet destroyed.
    pub fn live_program_count(&self) -> usize {
        self.programs.len()
    }

    /// Number of vertex buffers not yet destroyed.
    pub fn live_buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Number of textures not yet destroyed.
    pub fn live_texture_count(&self) -> usize {
        self.textures.len()
    }

    /// `true` if `id` names a linked program that has not been destroyed.
    pub fn is_live_program(&self, id: ProgramId) -> bool {
        self.programs.contains_key(&id)
    }

    /// Number of `validate_program` calls that reached a live program.
    pub fn validation_count(&self) -> usize {
        self.validations
    }

    /// The current program, if any.
    pub fn current_program(&self) -> Option<ProgramId> {
        self.current_program
    }

    /// The current viewport.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// The current clear color.
    pub fn clear_color(&self) -> LinearRgba {
        self.clear_color
    }

    /// The buffer and layout bound to attribute `index`.
    pub fn attribute_binding(&self, index: u32) -> Option<(BufferId, AttributeDescriptor)> {
        self.attributes
            .get(&index)
            .map(|b| (b.buffer, b.descriptor))
    }

    /// The last value uploaded to `slot`.
    pub fn uniform_value(&self, slot: UniformSlot) -> Option<UniformValue> {
        self.uniforms.get(&(slot.program, slot.index)).copied()
    }

    /// The texture bound to `unit`.
    pub fn bound_texture(&self, unit: u32) -> Option<TextureId> {
        self.texture_units.get(&unit).copied()
    }

    /// Drops every object and all pipeline state, as when the platform
    /// destroys the context behind a surface. IDs and locations handed out
    /// afterwards never collide with earlier ones.
    pub fn simulate_context_loss(&mut self) {
        log::warn!(
            "HeadlessDevice: Context lost with {} shaders, {} programs, {} buffers and {} textures alive.",
            self.shaders.len(),
            self.programs.len(),
            self.buffers.len(),
            self.textures.len()
        );
        self.shaders.clear();
        self.programs.clear();
        self.buffers.clear();
        self.textures.clear();
        self.attributes.clear();
        self.uniforms.clear();
        self.texture_units.clear();
        self.current_program = None;
    }

    fn allocate_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn memory_in_use(&self) -> usize {
        let buffers: usize = self.buffers.values().map(Vec::len).sum();
        let textures: usize = self.textures.values().map(|t| t.byte_len()).sum();
        buffers + textures
    }

    fn reserve(&self, bytes: usize) -> Result<(), ResourceError> {
        let in_use = self.memory_in_use();
        if in_use.saturating_add(bytes) > self.memory_limit {
            return Err(ResourceError::UploadError(format!(
                "out of memory: {bytes} bytes requested, {in_use} of {} in use",
                self.memory_limit
            )));
        }
        Ok(())
    }

    fn record(&mut self, command: DeviceCommand) {
        log::trace!("HeadlessDevice: {command:?}");
        self.commands.push(command);
    }

    fn program(&self, id: ProgramId) -> Result<&ProgramObject, ResourceError> {
        self.programs.get(&id).ok_or(ResourceError::InvalidHandle)
    }

    fn set_uniform(
        &mut self,
        slot: UniformSlot,
        value: UniformValue,
        accepts: &[&str],
    ) -> Result<(), ResourceError> {
        if self.current_program != Some(slot.program) {
            return Err(ResourceError::BackendError(format!(
                "GL_INVALID_OPERATION: uniform location of program {:?} used while {:?} is current",
                slot.program, self.current_program
            )));
        }
        let ty = self
            .program(slot.program)?
            .uniform_type(slot.index)
            .ok_or_else(|| {
                ResourceError::BackendError(format!(
                    "GL_INVALID_OPERATION: location {} is not a uniform of program {:?}",
                    slot.index, slot.program
                ))
            })?;
        if !accepts.contains(&ty) {
            return Err(ResourceError::BackendError(format!(
                "GL_INVALID_OPERATION: uniform at location {} is '{ty}', expected one of {accepts:?}",
                slot.index
            )));
        }
        self.uniforms.insert((slot.program, slot.index), value);
        self.record(DeviceCommand::SetUniform { slot, value });
        Ok(())
    }
}

impl GraphicsDevice for HeadlessDevice {
    fn adapter_info(&self) -> GraphicsAdapterInfo {
        GraphicsAdapterInfo {
            name: "Headless Recorder".to_string(),
            backend_type: GraphicsBackendType::Headless,
            version: format!("OpenGL ES 2.0 (rink-infra {})", env!("CARGO_PKG_VERSION")),
        }
    }

    fn create_shader(
        &mut self,
        descriptor: &ShaderModuleDescriptor,
    ) -> Result<ShaderModuleId, ResourceError> {
        let label = descriptor.label.unwrap_or("unlabeled").to_string();
        let interface = reflect::compile(descriptor.stage, &descriptor.source).map_err(|log| {
            ShaderError::CompilationError {
                label: label.clone(),
                stage: descriptor.stage,
                details: log,
            }
        })?;

        let id = ShaderModuleId(self.allocate_id());
        log::debug!(
            "HeadlessDevice: Compiled {} shader '{label}' as {id:?} ({} declarations).",
            descriptor.stage,
            interface.declarations.len()
        );
        self.shaders.insert(id, ShaderObject { label, interface });
        self.record(DeviceCommand::CreateShader {
            id,
            stage: descriptor.stage,
        });
        Ok(id)
    }

    fn destroy_shader(&mut self, id: ShaderModuleId) -> Result<(), ResourceError> {
        let shader = self.shaders.remove(&id).ok_or(ResourceError::InvalidHandle)?;
        log::debug!("HeadlessDevice: Destroyed shader '{}' ({id:?}).", shader.label);
        self.record(DeviceCommand::DestroyShader(id));
        Ok(())
    }

    fn link_program(
        &mut self,
        label: Option<&str>,
        vertex: ShaderModuleId,
        fragment: ShaderModuleId,
    ) -> Result<ProgramId, ResourceError> {
        let label = label.unwrap_or("unlabeled").to_string();
        let vs = self.shaders.get(&vertex).ok_or(ResourceError::InvalidHandle)?;
        let fs = self.shaders.get(&fragment).ok_or(ResourceError::InvalidHandle)?;
        let interface =
            reflect::link(&vs.interface, &fs.interface).map_err(|log| ShaderError::LinkError {
                label: label.clone(),
                details: log,
            })?;

        let uniform_locations = (0..interface.uniforms.len() as u32)
            .map(|i| self.next_uniform_location + i)
            .collect();
        self.next_uniform_location += interface.uniforms.len() as u32;

        let id = ProgramId(self.allocate_id());
        log::debug!(
            "HeadlessDevice: Linked program '{label}' as {id:?} ({} attributes, {} uniforms).",
            interface.attributes.len(),
            interface.uniforms.len()
        );
        self.programs.insert(
            id,
            ProgramObject {
                label: label.clone(),
                interface,
                uniform_locations,
            },
        );
        self.record(DeviceCommand::LinkProgram { id, label });
        Ok(id)
    }

    fn destroy_program(&mut self, id: ProgramId) -> Result<(), ResourceError> {
        let program = self.programs.remove(&id).ok_or(ResourceError::InvalidHandle)?;
        self.uniforms.retain(|(owner, _), _| *owner != id);
        if self.current_program == Some(id) {
            self.current_program = None;
        }
        log::debug!("HeadlessDevice: Destroyed program '{}' ({id:?}).", program.label);
        self.record(DeviceCommand::DestroyProgram(id));
        Ok(())
    }

    fn validate_program(&mut self, id: ProgramId) -> Result<ProgramValidation, ResourceError> {
        let program = self.program(id)?;
        let unbound: Vec<&str> = program
            .interface
            .attributes
            .iter()
            .enumerate()
            .filter(|(index, _)| !self.attributes.contains_key(&(*index as u32)))
            .map(|(_, a)| a.name.as_str())
            .collect();
        // Validation reports the current state; an incomplete one is not an error.
        let log = if unbound.is_empty() {
            String::new()
        } else {
            format!("Attributes without a vertex source: {}", unbound.join(", "))
        };
        self.validations += 1;
        self.record(DeviceCommand::ValidateProgram(id));
        Ok(ProgramValidation { valid: true, log })
    }

    fn attribute_location(
        &mut self,
        program: ProgramId,
        name: &str,
    ) -> Result<AttributeSlot, ResourceError> {
        let index = self
            .program(program)?
            .interface
            .attributes
            .iter()
            .position(|a| a.name == name)
            .ok_or_else(|| ShaderError::UnresolvedName {
                program,
                name: name.to_string(),
            })?;
        Ok(AttributeSlot {
            program,
            index: index as u32,
        })
    }

    fn uniform_location(
        &mut self,
        program: ProgramId,
        name: &str,
    ) -> Result<UniformSlot, ResourceError> {
        let object = self.program(program)?;
        let index = object
            .interface
            .uniforms
            .iter()
            .position(|u| u.name == name)
            .and_then(|i| object.uniform_locations.get(i).copied())
            .ok_or_else(|| ShaderError::UnresolvedName {
                program,
                name: name.to_string(),
            })?;
        Ok(UniformSlot { program, index })
    }

    fn use_program(&mut self, id: ProgramId) -> Result<(), ResourceError> {
        self.program(id)?;
        self.current_program = Some(id);
        self.record(DeviceCommand::UseProgram(id));
        Ok(())
    }

    fn create_vertex_buffer(&mut self, data: &[u8]) -> Result<BufferId, ResourceError> {
        if data.is_empty() {
            return Err(ResourceError::UploadError(
                "vertex data is empty".to_string(),
            ));
        }
        self.reserve(data.len())?;
        let id = BufferId(self.allocate_id());
        self.buffers.insert(id, data.to_vec());
        log::debug!("HeadlessDevice: Created vertex buffer {id:?} ({} bytes).", data.len());
        self.record(DeviceCommand::CreateBuffer {
            id,
            size_bytes: data.len(),
        });
        Ok(id)
    }

    fn destroy_buffer(&mut self, id: BufferId) -> Result<(), ResourceError> {
        self.buffers.remove(&id).ok_or(ResourceError::InvalidHandle)?;
        self.attributes.retain(|_, b| b.buffer != id);
        self.record(DeviceCommand::DestroyBuffer(id));
        Ok(())
    }

    fn bind_vertex_attribute(
        &mut self,
        buffer: BufferId,
        descriptor: &AttributeDescriptor,
    ) -> Result<(), ResourceError> {
        if !self.buffers.contains_key(&buffer) {
            return Err(ResourceError::InvalidHandle);
        }
        if !(1..=4).contains(&descriptor.component_count) {
            return Err(ResourceError::BackendError(format!(
                "GL_INVALID_VALUE: attribute size {} is outside 1..=4",
                descriptor.component_count
            )));
        }
        self.attributes.insert(
            descriptor.slot.index,
            AttributeBinding {
                buffer,
                descriptor: *descriptor,
            },
        );
        self.record(DeviceCommand::BindAttribute {
            buffer,
            descriptor: *descriptor,
        });
        Ok(())
    }

    fn set_uniform_mat4(&mut self, slot: UniformSlot, value: &Mat4) -> Result<(), ResourceError> {
        self.set_uniform(slot, UniformValue::Mat4(*value), &["mat4"])
    }

    fn set_uniform_vec4(&mut self, slot: UniformSlot, value: Vec4) -> Result<(), ResourceError> {
        self.set_uniform(slot, UniformValue::Vec4(value), &["vec4"])
    }

    fn set_uniform_i32(&mut self, slot: UniformSlot, value: i32) -> Result<(), ResourceError> {
        self.set_uniform(
            slot,
            UniformValue::Int(value),
            &["int", "bool", "sampler2D", "samplerCube"],
        )
    }

    fn create_texture(
        &mut self,
        descriptor: &TextureDescriptor,
        data: &[u8],
    ) -> Result<TextureId, ResourceError> {
        if descriptor.width == 0 || descriptor.height == 0 {
            return Err(ResourceError::UploadError(format!(
                "texture '{}' has zero size {}x{}",
                descriptor.label.unwrap_or("unlabeled"),
                descriptor.width,
                descriptor.height
            )));
        }
        if data.len() != descriptor.byte_len() {
            return Err(ResourceError::UploadError(format!(
                "texture '{}' expects {} bytes, got {}",
                descriptor.label.unwrap_or("unlabeled"),
                descriptor.byte_len(),
                data.len()
            )));
        }
        self.reserve(data.len())?;

        let id = TextureId(self.allocate_id());
        self.textures.insert(
            id,
            TextureDescriptor {
                label: None,
                width: descriptor.width,
                height: descriptor.height,
                format: descriptor.format,
                filter: descriptor.filter,
            },
        );
        log::debug!(
            "HeadlessDevice: Created texture '{}' as {id:?} ({}x{}).",
            descriptor.label.unwrap_or("unlabeled"),
            descriptor.width,
            descriptor.height
        );
        self.record(DeviceCommand::CreateTexture {
            id,
            width: descriptor.width,
            height: descriptor.height,
        });
        Ok(id)
    }

    fn destroy_texture(&mut self, id: TextureId) -> Result<(), ResourceError> {
        self.textures.remove(&id).ok_or(ResourceError::InvalidHandle)?;
        self.texture_units.retain(|_, bound| *bound != id);
        self.record(DeviceCommand::DestroyTexture(id));
        Ok(())
    }

    fn bind_texture(&mut self, unit: u32, id: TextureId) -> Result<(), ResourceError> {
        if unit >= MAX_TEXTURE_UNITS {
            return Err(ResourceError::OutOfBounds);
        }
        if !self.textures.contains_key(&id) {
            return Err(ResourceError::InvalidHandle);
        }
        self.texture_units.insert(unit, id);
        self.record(DeviceCommand::BindTexture { unit, id });
        Ok(())
    }

    fn set_clear_color(&mut self, color: LinearRgba) {
        self.clear_color = color;
        self.record(DeviceCommand::SetClearColor(color));
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.record(DeviceCommand::SetViewport(viewport));
    }

    fn clear(&mut self) {
        self.record(DeviceCommand::Clear);
    }

    fn draw_arrays(
        &mut self,
        topology: PrimitiveTopology,
        first: u32,
        count: u32,
    ) -> Result<(), ResourceError> {
        let program_id = self.current_program.ok_or_else(|| {
            ResourceError::BackendError("GL_INVALID_OPERATION: no current program".to_string())
        })?;
        let program = self.program(program_id)?;

        let mut readable = usize::MAX;
        for (index, attribute) in program.interface.attributes.iter().enumerate() {
            let binding = self.attributes.get(&(index as u32)).ok_or_else(|| {
                ResourceError::BackendError(format!(
                    "GL_INVALID_OPERATION: attribute '{}' of program '{}' has no vertex source",
                    attribute.name, program.label
                ))
            })?;
            let len = self
                .buffers
                .get(&binding.buffer)
                .map(Vec::len)
                .ok_or(ResourceError::InvalidHandle)?;
            readable = readable.min(binding.descriptor.readable_vertices(len));
        }

        let end = first as usize + count as usize;
        if end > readable {
            log::warn!(
                "HeadlessDevice: Draw of vertices {first}..{end} exceeds the {readable} readable vertices."
            );
            return Err(ResourceError::OutOfBounds);
        }

        self.record(DeviceCommand::Draw(DrawCall {
            program: program_id,
            topology,
            first,
            count,
        }));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    const VS: &str = "uniform mat4 u_Matrix;\nattribute vec4 a_Position;\nvoid main() { gl_Position = u_Matrix * a_Position; }";
    const FS: &str = "precision mediump float;\nuniform vec4 u_Color;\nvoid main() { gl_FragColor = u_Color; }";

    fn shader(device: &mut HeadlessDevice, stage: ShaderStage, source: &str) -> ShaderModuleId {
        device
            .create_shader(&ShaderModuleDescriptor {
                label: Some("test"),
                stage,
                source: Cow::Owned(source.to_string()),
            })
            .unwrap()
    }

    fn program(device: &mut HeadlessDevice) -> ProgramId {
        let vs = shader(device, ShaderStage::Vertex, VS);
        let fs = shader(device, ShaderStage::Fragment, FS);
        device.link_program(Some("test"), vs, fs).unwrap()
    }

    #[test]
    fn compile_error_carries_the_log() {
        let mut device = HeadlessDevice::new();
        let err = device
            .create_shader(&ShaderModuleDescriptor {
                label: Some("broken"),
                stage: ShaderStage::Vertex,
                source: Cow::Borrowed("#error broken on purpose\n"),
            })
            .unwrap_err();
        match err {
            ResourceError::Shader(ShaderError::CompilationError { details, .. }) => {
                assert!(details.contains("broken on purpose"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(device.live_shader_count(), 0);
    }

    #[test]
    fn locations_are_stable_and_scoped() {
        let mut device = HeadlessDevice::new();
        let a = program(&mut device);
        let b = program(&mut device);
        let ua = device.uniform_location(a, "u_Color").unwrap();
        assert_eq!(ua, device.uniform_location(a, "u_Color").unwrap());
        assert_ne!(ua.index, device.uniform_location(b, "u_Color").unwrap().index);
        assert!(matches!(
            device.attribute_location(a, "a_Missing"),
            Err(ResourceError::Shader(ShaderError::UnresolvedName { .. }))
        ));
    }

    #[test]
    fn uniforms_need_the_owning_program_current() {
        let mut device = HeadlessDevice::new();
        let a = program(&mut device);
        let color = device.uniform_location(a, "u_Color").unwrap();
        assert!(device.set_uniform_vec4(color, Vec4::W).is_err());

        device.use_program(a).unwrap();
        device.set_uniform_vec4(color, Vec4::W).unwrap();
        assert_eq!(device.uniform_value(color), Some(UniformValue::Vec4(Vec4::W)));
        assert!(device.set_uniform_i32(color, 1).is_err());
    }

    #[test]
    fn draws_are_bounds_checked() {
        let mut device = HeadlessDevice::new();
        let a = program(&mut device);
        device.use_program(a).unwrap();
        assert!(device.draw_arrays(PrimitiveTopology::PointList, 0, 1).is_err());

        let floats = [0.0f32; 6];
        let buffer = device
            .create_vertex_buffer(bytemuck::cast_slice(&floats))
            .unwrap();
        let slot = device.attribute_location(a, "a_Position").unwrap();
        device
            .bind_vertex_attribute(buffer, &AttributeDescriptor::from_floats(slot, 2, 2, 0))
            .unwrap();

        device.draw_arrays(PrimitiveTopology::TriangleList, 0, 3).unwrap();
        assert!(matches!(
            device.draw_arrays(PrimitiveTopology::PointList, 2, 2),
            Err(ResourceError::OutOfBounds)
        ));
        assert_eq!(
            device.draw_calls(),
            vec![DrawCall {
                program: a,
                topology: PrimitiveTopology::TriangleList,
                first: 0,
                count: 3
            }]
        );
    }

    #[test]
    fn memory_limit_rejects_uploads() {
        let mut device = HeadlessDevice::with_memory_limit(16);
        assert!(device.create_vertex_buffer(&[0; 16]).is_ok());
        assert!(matches!(
            device.create_vertex_buffer(&[0; 4]),
            Err(ResourceError::UploadError(_))
        ));
        assert!(matches!(
            device.create_vertex_buffer(&[]),
            Err(ResourceError::UploadError(_))
        ));
    }

    #[test]
    fn ids_survive_context_loss_without_reuse() {
        let mut device = HeadlessDevice::new();
        let before = program(&mut device);
        let location = device.uniform_location(before, "u_Color").unwrap();
        device.simulate_context_loss();
        assert!(!device.is_live_program(before));
        assert_eq!(device.current_program(), None);

        let after = program(&mut device);
        assert_ne!(before, after);
        assert_ne!(
            location.index,
            device.uniform_location(after, "u_Color").unwrap().index
        );
    }

    #[test]
    fn texture_units_are_limited() {
        let mut device = HeadlessDevice::new();
        let descriptor = TextureDescriptor {
            label: Some("t"),
            width: 2,
            height: 2,
            format: Default::default(),
            filter: Default::default(),
        };
        assert!(device.create_texture(&descriptor, &[0; 4]).is_err());
        let texture = device.create_texture(&descriptor, &[0; 16]).unwrap();
        assert!(matches!(
            device.bind_texture(MAX_TEXTURE_UNITS, texture),
            Err(ResourceError::OutOfBounds)
        ));
        device.bind_texture(0, texture).unwrap();
        assert_eq!(device.bound_texture(0), Some(texture));
    }
}
