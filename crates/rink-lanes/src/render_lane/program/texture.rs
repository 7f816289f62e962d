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

use super::{ProgramSources, ShaderProgram, VertexInputs};
use super::{A_POSITION, A_TEXTURE_COORDINATES, U_MATRIX, U_TEXTURE_UNIT};
use crate::render_lane::shaders;
use crate::render_lane::state::PipelineState;
use rink_core::math::Mat4;
use rink_core::renderer::{
    AttributeSlot, GraphicsDevice, ProgramId, ResourceError, ShaderSourceProvider, TextureId,
    UniformSlot,
};

/// Texture unit the table texture is sampled from.
pub const TABLE_TEXTURE_UNIT: u32 = 0;

/// A program sampling one 2D texture through `u_TextureUnit`.
#[derive(Debug)]
pub struct TextureShaderProgram {
    program: ShaderProgram,
    u_matrix: UniformSlot,
    u_texture_unit: UniformSlot,
    a_position: AttributeSlot,
    a_texture_coordinates: AttributeSlot,
}

impl TextureShaderProgram {
    /// Builds the program and resolves its names.
    pub fn new(
        device: &mut dyn GraphicsDevice,
        sources: &dyn ShaderSourceProvider,
        validate: bool,
    ) -> Result<Self, ResourceError> {
        let mut program = ShaderProgram::build(
            device,
            sources,
            ProgramSources {
                label: "texture",
                vertex: shaders::TEXTURE_VERTEX_SHADER,
                fragment: shaders::TEXTURE_FRAGMENT_SHADER,
            },
            validate,
        )?;

        match resolve_texture_locations(&mut program, device) {
            Ok(locations) => Ok(Self {
                program,
                u_matrix: locations.u_matrix,
                u_texture_unit: locations.u_texture_unit,
                a_position: locations.a_position,
                a_texture_coordinates: locations.a_texture_coordinates,
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

    /// Uploads the transform and points the sampler at `texture` on unit 0.
    pub fn set_uniforms(
        &self,
        device: &mut dyn GraphicsDevice,
        state: &PipelineState,
        matrix: &Mat4,
        texture: TextureId,
    ) -> Result<(), ResourceError> {
        state.check_uniform(self.u_matrix)?;
        device.set_uniform_mat4(self.u_matrix, matrix)?;
        device.bind_texture(TABLE_TEXTURE_UNIT, texture)?;
        device.set_uniform_i32(self.u_texture_unit, TABLE_TEXTURE_UNIT as i32)
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

struct TextureLocations {
    u_matrix: UniformSlot,
    u_texture_unit: UniformSlot,
    a_position: AttributeSlot,
    a_texture_coordinates: AttributeSlot,
}

fn resolve_texture_locations(
    program: &mut ShaderProgram,
    device: &mut dyn GraphicsDevice,
) -> Result<TextureLocations, ResourceError> {
    Ok(TextureLocations {
        u_matrix: program.resolve_uniform(device, U_MATRIX)?,
        u_texture_unit: program.resolve_uniform(device, U_TEXTURE_UNIT)?,
        a_position: program.resolve_attribute(device, A_POSITION)?,
        a_texture_coordinates: program.resolve_attribute(device, A_TEXTURE_COORDINATES)?,
    })
}

impl VertexInputs for TextureShaderProgram {
    fn position(&self) -> AttributeSlot {
        self.a_position
    }

    fn texture_coordinates(&self) -> Option<AttributeSlot> {
        Some(self.a_texture_coordinates)
    }
}
