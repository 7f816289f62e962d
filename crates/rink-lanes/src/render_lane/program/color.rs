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

use super::{optional, ProgramSources, ShaderProgram, VertexInputs};
use super::{A_COLOR, A_POSITION, U_COLOR, U_MATRIX};
use crate::render_lane::shaders;
use crate::render_lane::state::PipelineState;
use rink_core::math::Mat4;
use rink_core::renderer::{
    AttributeSlot, GraphicsDevice, ProgramId, ResourceError, ShaderError, ShaderSourceProvider,
    UniformSlot,
};

/// Where the color program takes its fragment color from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSource {
    /// The `a_Color` attribute, interpolated across primitives.
    PerVertex,
    /// The `u_Color` uniform, set per draw region.
    Uniform,
}

impl ColorSource {
    fn sources(&self) -> ProgramSources<'static> {
        match self {
            ColorSource::PerVertex => ProgramSources {
                label: "color_per_vertex",
                vertex: shaders::SIMPLE_VERTEX_SHADER,
                fragment: shaders::SIMPLE_FRAGMENT_SHADER,
            },
            ColorSource::Uniform => ProgramSources {
                label: "color_uniform",
                vertex: shaders::UNIFORM_COLOR_VERTEX_SHADER,
                fragment: shaders::UNIFORM_COLOR_FRAGMENT_SHADER,
            },
        }
    }
}

/// A program drawing flat-shaded geometry through the `u_Matrix` transform.
#[derive(Debug)]
pub struct ColorShaderProgram {
    program: ShaderProgram,
    source: ColorSource,
    u_matrix: UniformSlot,
    u_color: Option<UniformSlot>,
    a_position: AttributeSlot,
    a_color: Option<AttributeSlot>,
}

impl ColorShaderProgram {
    /// Builds the program for `source` and resolves its names.
    ///
    /// The color inputs are optional lookups: the per-vertex variant must expose
    /// `a_Color` and the uniform variant `u_Color`.
    pub fn new(
        device: &mut dyn GraphicsDevice,
        sources: &dyn ShaderSourceProvider,
        source: ColorSource,
        validate: bool,
    ) -> Result<Self, ResourceError> {
        let mut program = ShaderProgram::build(device, sources, source.sources(), validate)?;
        match resolve_color_locations(&mut program, device, source) {
            Ok(locations) => Ok(Self {
                program,
                source,
                u_matrix: locations.u_matrix,
                u_color: locations.u_color,
                a_position: locations.a_position,
                a_color: locations.a_color,
            }),
            Err(e) => {
                program.discard(device);
                Err(e)
            }
        }
    }

    /// Makes the program current.
    pub fn activate(
        &self,
        device: &mut dyn GraphicsDevice,
        state: &mut PipelineState,
    ) -> Result<(), ResourceError> {
        self.program.activate(device, state)
    }

    /// Uploads the transform. The program must be active.
    pub fn set_uniforms(
        &self,
        device: &mut dyn GraphicsDevice,
        state: &PipelineState,
        matrix: &Mat4,
    ) -> Result<(), ResourceError> {
        state.check_uniform(self.u_matrix)?;
        device.set_uniform_mat4(self.u_matrix, matrix)
    }

    /// The tint uniform, for the uniform-color variant.
    pub fn color_uniform(&self) -> Option<UniformSlot> {
        match self.source {
            ColorSource::Uniform => self.u_color,
            ColorSource::PerVertex => None,
        }
    }

    /// The variant this program was built for.
    pub fn source(&self) -> ColorSource {
        self.source
    }

    /// The transform uniform.
    pub fn matrix_uniform(&self) -> UniformSlot {
        self.u_matrix
    }

    /// The underlying program.
    pub fn program(&self) -> &ShaderProgram {
        &self.program
    }

    /// The program handle.
    pub fn id(&self) -> ProgramId {
        self.program.id()
    }

    /// Releases the program.
    pub fn destroy(self, device: &mut dyn GraphicsDevice) -> Result<(), ResourceError> {
        self.program.destroy(device)
    }
}

struct ColorLocations {
    u_matrix: UniformSlot,
    u_color: Option<UniformSlot>,
    a_position: AttributeSlot,
    a_color: Option<AttributeSlot>,
}

fn resolve_color_locations(
    program: &mut ShaderProgram,
    device: &mut dyn GraphicsDevice,
    source: ColorSource,
) -> Result<ColorLocations, ResourceError> {
    let u_matrix = program.resolve_uniform(device, U_MATRIX)?;
    let a_position = program.resolve_attribute(device, A_POSITION)?;
    let a_color = optional(program.resolve_attribute(device, A_COLOR))?;
    let u_color = optional(program.resolve_uniform(device, U_COLOR))?;

    let missing = match source {
        ColorSource::PerVertex if a_color.is_none() => Some(A_COLOR),
        ColorSource::Uniform if u_color.is_none() => Some(U_COLOR),
        _ => None,
    };
    if let Some(name) = missing {
        return Err(ShaderError::UnresolvedName {
            program: program.id(),
            name: name.to_string(),
        }
        .into());
    }

    Ok(ColorLocations {
        u_matrix,
        u_color,
        a_position,
        a_color,
    })
}

impl VertexInputs for ColorShaderProgram {
    fn position(&self) -> AttributeSlot {
        self.a_position
    }

    fn color(&self) -> Option<AttributeSlot> {
        match self.source {
            ColorSource::PerVertex => self.a_color,
            ColorSource::Uniform => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render_lane::shaders::EmbeddedShaderSources;
    use rink_infra::graphics::headless::HeadlessDevice;

    #[test]
    fn per_vertex_program_exposes_color_attribute() {
        let mut device = HeadlessDevice::new();
        let program = ColorShaderProgram::new(
            &mut device,
            &EmbeddedShaderSources,
            ColorSource::PerVertex,
            false,
        )
        .unwrap();
        assert!(program.color().is_some());
        assert!(program.color_uniform().is_none());
        assert_ne!(program.position(), program.color().unwrap());
    }

    #[test]
    fn uniform_program_exposes_tint() {
        let mut device = HeadlessDevice::new();
        let program = ColorShaderProgram::new(
            &mut device,
            &EmbeddedShaderSources,
            ColorSource::Uniform,
            false,
        )
        .unwrap();
        assert!(program.color().is_none());
        assert!(program.color_uniform().is_some());
    }

    #[test]
    fn set_uniforms_requires_active_program() {
        let mut device = HeadlessDevice::new();
        let mut state = PipelineState::new();
        let program = ColorShaderProgram::new(
            &mut device,
            &EmbeddedShaderSources,
            ColorSource::PerVertex,
            false,
        )
        .unwrap();
        assert!(matches!(
            program.set_uniforms(&mut device, &state, &Mat4::IDENTITY),
            Err(ResourceError::StaleLocation { .. })
        ));
        program.activate(&mut device, &mut state).unwrap();
        program
            .set_uniforms(&mut device, &state, &Mat4::IDENTITY)
            .unwrap();
    }
}
