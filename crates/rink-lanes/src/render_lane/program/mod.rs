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

//! Shader programs: building, name resolution and activation.
//!
//! [`ShaderProgram`] is the generic part shared by every program: it pulls
//! the two sources from a [`ShaderSourceProvider`], compiles and links them,
//! and caches the locations it resolves. [`ColorShaderProgram`] and
//! [`TextureShaderProgram`] add the fixed set of names each GLSL pair uses.

mod color;
mod texture;

pub use color::{ColorShaderProgram, ColorSource};
pub use texture::TextureShaderProgram;

use super::state::PipelineState;
use rink_core::renderer::{
    AttributeSlot, GraphicsDevice, ProgramId, ResourceError, ShaderError, ShaderModuleDescriptor,
    ShaderModuleId, ShaderSourceProvider, ShaderStage, UniformSlot,
};
use std::collections::HashMap;

/// Name of the transform uniform shared by every program.
pub const U_MATRIX: &str = "u_Matrix";
/// Name of the tint uniform of the uniform-color program.
pub const U_COLOR: &str = "u_Color";
/// Name of the sampler uniform of the texture program.
pub const U_TEXTURE_UNIT: &str = "u_TextureUnit";
/// Name of the position attribute shared by every program.
pub const A_POSITION: &str = "a_Position";
/// Name of the per-vertex color attribute.
pub const A_COLOR: &str = "a_Color";
/// Name of the texture coordinate attribute.
pub const A_TEXTURE_COORDINATES: &str = "a_TextureCoordinates";

/// The source identifiers of one program build.
#[derive(Debug, Clone, Copy)]
pub struct ProgramSources<'a> {
    /// Label used in logs and errors.
    pub label: &'a str,
    /// Identifier of the vertex shader source.
    pub vertex: &'a str,
    /// Identifier of the fragment shader source.
    pub fragment: &'a str,
}

/// The attribute slots a program exposes to drawables.
///
/// A drawable binds position always, and color or texture coordinates only
/// when the active program consumes them.
pub trait VertexInputs {
    /// The position attribute.
    fn position(&self) -> AttributeSlot;

    /// The per-vertex color attribute, if the program reads one.
    fn color(&self) -> Option<AttributeSlot> {
        None
    }

    /// The texture coordinate attribute, if the program reads one.
    fn texture_coordinates(&self) -> Option<AttributeSlot> {
        None
    }
}

/// A linked program and the locations resolved from it.
#[derive(Debug)]
pub struct ShaderProgram {
    id: ProgramId,
    label: String,
    attributes: HashMap<String, AttributeSlot>,
    uniforms: HashMap<String, UniformSlot>,
}

impl ShaderProgram {
    /// Loads, compiles and links a program.
    ///
    /// The intermediate shader objects are released once the program is
    /// linked, or as soon as the build fails. When `validate` is set the
    /// program is also validated, which only produces log output.
    pub fn build(
        device: &mut dyn GraphicsDevice,
        sources: &dyn ShaderSourceProvider,
        program: ProgramSources<'_>,
        validate: bool,
    ) -> Result<Self, ResourceError> {
        let vertex_source = sources.load_shader_source(program.vertex)?;
        let fragment_source = sources.load_shader_source(program.fragment)?;

        let vertex = compile(device, program.vertex, ShaderStage::Vertex, &vertex_source)?;
        let fragment = match compile(
            device,
            program.fragment,
            ShaderStage::Fragment,
            &fragment_source,
        ) {
            Ok(fragment) => fragment,
            Err(e) => {
                release_shader(device, vertex);
                return Err(e);
            }
        };

        let linked = device.link_program(Some(program.label), vertex, fragment);
        release_shader(device, vertex);
        release_shader(device, fragment);
        let id = linked?;
        log::debug!("Linked program '{}' as {id:?}", program.label);

        if validate {
            match device.validate_program(id) {
                Ok(result) if result.valid => {
                    log::debug!("Program '{}' validated: {}", program.label, result.log)
                }
                Ok(result) => {
                    log::warn!("Program '{}' failed validation: {}", program.label, result.log)
                }
                Err(e) => log::warn!("Could not validate program '{}': {e}", program.label),
            }
        }

        Ok(Self {
            id,
            label: program.label.to_string(),
            attributes: HashMap::new(),
            uniforms: HashMap::new(),
        })
    }

    /// The program handle.
    pub fn id(&self) -> ProgramId {
        self.id
    }

    /// The label given at build time.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Resolves an attribute location, caching it for later calls.
    ///
    /// A name the program does not expose (absent or optimized away) is
    /// logged as a warning and returned as [`ShaderError::UnresolvedName`].
    pub fn resolve_attribute(
        &mut self,
        device: &mut dyn GraphicsDevice,
        name: &str,
    ) -> Result<AttributeSlot, ResourceError> {
        if let Some(slot) = self.attributes.get(name) {
            return Ok(*slot);
        }
        let slot = device
            .attribute_location(self.id, name)
            .inspect_err(|e| log::warn!("Program '{}': attribute '{name}': {e}", self.label))?;
        log::debug!("Program '{}': attribute '{name}' -> {}", self.label, slot.index);
        self.attributes.insert(name.to_string(), slot);
        Ok(slot)
    }

    /// Resolves a uniform location, caching it for later calls.
    pub fn resolve_uniform(
        &mut self,
        device: &mut dyn GraphicsDevice,
        name: &str,
    ) -> Result<UniformSlot, ResourceError> {
        if let Some(slot) = self.uniforms.get(name) {
            return Ok(*slot);
        }
        let slot = device
            .uniform_location(self.id, name)
            .inspect_err(|e| log::warn!("Program '{}': uniform '{name}': {e}", self.label))?;
        log::debug!("Program '{}': uniform '{name}' -> {}", self.label, slot.index);
        self.uniforms.insert(name.to_string(), slot);
        Ok(slot)
    }

    /// A previously resolved attribute location.
    pub fn attribute(&self, name: &str) -> Option<AttributeSlot> {
        self.attributes.get(name).copied()
    }

    /// A previously resolved uniform location.
    pub fn uniform(&self, name: &str) -> Option<UniformSlot> {
        self.uniforms.get(name).copied()
    }

    /// Makes this program the current one.
    pub fn activate(
        &self,
        device: &mut dyn GraphicsDevice,
        state: &mut PipelineState,
    ) -> Result<(), ResourceError> {
        state.activate(device, self.id)
    }

    /// Releases the program. Its cached locations go with it.
    pub fn destroy(self, device: &mut dyn GraphicsDevice) -> Result<(), ResourceError> {
        device.destroy_program(self.id)
    }

    /// Releases a program that is being abandoned because of an earlier error.
    pub(crate) fn discard(self, device: &mut dyn GraphicsDevice) {
        if let Err(e) = device.destroy_program(self.id) {
            log::warn!("Could not release program '{}': {e}", self.label);
        }
    }
}

fn compile(
    device: &mut dyn GraphicsDevice,
    label: &str,
    stage: ShaderStage,
    source: &str,
) -> Result<ShaderModuleId, ResourceError> {
    device
        .create_shader(&ShaderModuleDescriptor {
            label: Some(label),
            stage,
            source: source.into(),
        })
        .inspect_err(|e| log::error!("{e}"))
}

fn release_shader(device: &mut dyn GraphicsDevice, id: ShaderModuleId) {
    if let Err(e) = device.destroy_shader(id) {
        log::warn!("Failed to release shader {id:?}: {e}");
    }
}

/// Maps an unresolved-name failure to `None`, keeping every other error.
pub(crate) fn optional<T>(result: Result<T, ResourceError>) -> Result<Option<T>, ResourceError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ResourceError::Shader(ShaderError::UnresolvedName { .. })) => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render_lane::shaders::{self, EmbeddedShaderSources};
    use rink_infra::graphics::headless::HeadlessDevice;

    const SIMPLE: ProgramSources<'static> = ProgramSources {
        label: "simple",
        vertex: shaders::SIMPLE_VERTEX_SHADER,
        fragment: shaders::SIMPLE_FRAGMENT_SHADER,
    };

    #[test]
    fn build_releases_shader_objects() {
        let mut device = HeadlessDevice::new();
        let program =
            ShaderProgram::build(&mut device, &EmbeddedShaderSources, SIMPLE, false).unwrap();
        assert_eq!(device.live_shader_count(), 0);
        assert!(device.is_live_program(program.id()));
    }

    #[test]
    fn resolution_is_cached_and_stable() {
        let mut device = HeadlessDevice::new();
        let mut program =
            ShaderProgram::build(&mut device, &EmbeddedShaderSources, SIMPLE, false).unwrap();
        let first = program.resolve_attribute(&mut device, A_POSITION).unwrap();
        let second = program.resolve_attribute(&mut device, A_POSITION).unwrap();
        assert_eq!(first, second);
        assert_eq!(program.attribute(A_POSITION), Some(first));
        assert_eq!(first.program, program.id());
    }

    #[test]
    fn unknown_name_is_unresolved() {
        let mut device = HeadlessDevice::new();
        let mut program =
            ShaderProgram::build(&mut device, &EmbeddedShaderSources, SIMPLE, false).unwrap();
        let err = program.resolve_uniform(&mut device, "u_Missing").unwrap_err();
        assert!(matches!(
            err,
            ResourceError::Shader(ShaderError::UnresolvedName { .. })
        ));
        assert!(optional(program.resolve_uniform(&mut device, "u_Missing"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn missing_source_is_a_load_error() {
        let mut device = HeadlessDevice::new();
        let err = ShaderProgram::build(
            &mut device,
            &EmbeddedShaderSources,
            ProgramSources {
                label: "nope",
                vertex: "does_not_exist",
                fragment: shaders::SIMPLE_FRAGMENT_SHADER,
            },
            false,
        )
        .unwrap_err();
        assert!(matches!(err, ResourceError::Shader(ShaderError::LoadError { .. })));
    }

    #[test]
    fn validation_only_runs_on_request() {
        let mut device = HeadlessDevice::new();
        ShaderProgram::build(&mut device, &EmbeddedShaderSources, SIMPLE, false).unwrap();
        assert_eq!(device.validation_count(), 0);
        ShaderProgram::build(&mut device, &EmbeddedShaderSources, SIMPLE, true).unwrap();
        assert_eq!(device.validation_count(), 1);
    }
}
