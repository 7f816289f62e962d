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

//! Write-once vertex buffers and the attribute bindings that read them.

use super::state::PipelineState;
use rink_core::renderer::{
    AttributeDescriptor, AttributeSlot, BufferId, GraphicsDevice, ResourceError, FLOAT_SIZE_BYTES,
};

/// An interleaved `f32` vertex buffer uploaded once to the device.
#[derive(Debug)]
pub struct VertexArray {
    buffer: BufferId,
    floats_per_vertex: u32,
    vertex_count: u32,
}

impl VertexArray {
    /// Uploads `data`, made of records of `floats_per_vertex` floats.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UploadError`] if `data` is empty, if its length
    /// is not a multiple of the record size, or if the device rejects it.
    pub fn new(
        device: &mut dyn GraphicsDevice,
        data: &[f32],
        floats_per_vertex: u32,
    ) -> Result<Self, ResourceError> {
        if data.is_empty() {
            return Err(ResourceError::UploadError(
                "vertex data is empty".to_string(),
            ));
        }
        if floats_per_vertex == 0 || data.len() % floats_per_vertex as usize != 0 {
            return Err(ResourceError::UploadError(format!(
                "{} floats is not a whole number of {}-float records",
                data.len(),
                floats_per_vertex
            )));
        }

        let buffer = device.create_vertex_buffer(bytemuck::cast_slice(data))?;
        let vertex_count = (data.len() / floats_per_vertex as usize) as u32;
        log::debug!(
            "Uploaded {vertex_count} vertices ({floats_per_vertex} floats each) into {buffer:?}"
        );
        Ok(Self {
            buffer,
            floats_per_vertex,
            vertex_count,
        })
    }

    /// Points `slot` at the field starting `float_offset` floats into each record.
    ///
    /// The slot must belong to the active program. Returns the descriptor
    /// that was bound.
    pub fn set_vertex_attrib_pointer(
        &self,
        device: &mut dyn GraphicsDevice,
        state: &mut PipelineState,
        float_offset: u32,
        slot: AttributeSlot,
        component_count: u32,
    ) -> Result<AttributeDescriptor, ResourceError> {
        if float_offset + component_count > self.floats_per_vertex {
            return Err(ResourceError::OutOfBounds);
        }
        state.check_attribute(slot)?;

        let descriptor = AttributeDescriptor::from_floats(
            slot,
            component_count,
            self.floats_per_vertex,
            float_offset,
        );
        device.bind_vertex_attribute(self.buffer, &descriptor)?;
        state.record_binding(self.buffer, descriptor);
        Ok(descriptor)
    }

    /// The device buffer.
    pub fn buffer(&self) -> BufferId {
        self.buffer
    }

    /// Number of complete records in the buffer.
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Record size in floats.
    pub fn floats_per_vertex(&self) -> u32 {
        self.floats_per_vertex
    }

    /// Record size in bytes.
    pub fn stride_bytes(&self) -> u32 {
        self.floats_per_vertex * FLOAT_SIZE_BYTES
    }

    /// Releases the device buffer.
    pub fn destroy(&self, device: &mut dyn GraphicsDevice) -> Result<(), ResourceError> {
        device.destroy_buffer(self.buffer)
    }
}
