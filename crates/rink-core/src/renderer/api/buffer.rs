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

//! Defines data structures related to vertex buffers and attribute layouts.

use super::shader::AttributeSlot;
use std::ops::Range;

/// Size in bytes of one 32-bit float component.
pub const FLOAT_SIZE_BYTES: u32 = std::mem::size_of::<f32>() as u32;

/// An opaque handle to a GPU vertex buffer.
///
/// This ID is returned by `GraphicsDevice::create_vertex_buffer` and is used to reference
/// the buffer in all subsequent operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub usize);

/// Describes how one shader attribute reads its fields out of an interleaved
/// vertex buffer.
///
/// This is a pure value: it is recomputed every time a program is (re)linked,
/// because `slot` is resolved by name and can differ between program builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeDescriptor {
    /// Number of `f32` components read per vertex (1 to 4).
    pub component_count: u32,
    /// Byte distance between two consecutive vertex records.
    /// A value of `0` means the records are tightly packed.
    pub stride_bytes: u32,
    /// Byte position of the first component within a record.
    pub offset_bytes: u32,
    /// The attribute location this region feeds.
    pub slot: AttributeSlot,
}

impl AttributeDescriptor {
    /// Builds a descriptor from float counts instead of byte counts.
    ///
    /// `floats_per_vertex` is the full record size, `float_offset` the index of
    /// the first component inside it.
    pub fn from_floats(
        slot: AttributeSlot,
        component_count: u32,
        floats_per_vertex: u32,
        float_offset: u32,
    ) -> Self {
        Self {
            component_count,
            stride_bytes: floats_per_vertex * FLOAT_SIZE_BYTES,
            offset_bytes: float_offset * FLOAT_SIZE_BYTES,
            slot,
        }
    }

    /// Size in bytes of the components read for one vertex.
    #[inline]
    pub fn attribute_size_bytes(&self) -> u32 {
        self.component_count * FLOAT_SIZE_BYTES
    }

    /// The stride actually used by the pipeline, resolving a zero stride to
    /// the tightly packed size.
    #[inline]
    pub fn effective_stride(&self) -> u32 {
        if self.stride_bytes == 0 {
            self.attribute_size_bytes()
        } else {
            self.stride_bytes
        }
    }

    /// The byte range read for the vertex at `vertex_index`.
    pub fn byte_range(&self, vertex_index: usize) -> Range<usize> {
        let start =
            self.offset_bytes as usize + vertex_index * self.effective_stride() as usize;
        start..start + self.attribute_size_bytes() as usize
    }

    /// Number of whole vertices this descriptor can read from a buffer of
    /// `buffer_len_bytes` bytes.
    pub fn readable_vertices(&self, buffer_len_bytes: usize) -> usize {
        let first_end = (self.offset_bytes + self.attribute_size_bytes()) as usize;
        if buffer_len_bytes < first_end {
            return 0;
        }
        (buffer_len_bytes - first_end) / self.effective_stride() as usize + 1
    }

    /// Reads back the components of one vertex from raw buffer bytes, the
    /// way the GPU would fetch them. Returns `None` past the end of the buffer.
    pub fn read_vertex(&self, bytes: &[u8], vertex_index: usize) -> Option<Vec<f32>> {
        let range = self.byte_range(vertex_index);
        let raw = bytes.get(range)?;
        Some(
            raw.chunks_exact(FLOAT_SIZE_BYTES as usize)
                .map(bytemuck::pod_read_unaligned::<f32>)
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::api::shader::ProgramId;

    fn slot() -> AttributeSlot {
        AttributeSlot {
            program: ProgramId(1),
            index: 0,
        }
    }

    #[test]
    fn from_floats_computes_byte_layout() {
        let desc = AttributeDescriptor::from_floats(slot(), 3, 5, 2);
        assert_eq!(desc.stride_bytes, 20);
        assert_eq!(desc.offset_bytes, 8);
        assert_eq!(desc.byte_range(0), 8..20);
        assert_eq!(desc.byte_range(2), 48..60);
    }

    #[test]
    fn readable_vertices_respects_offset_and_stride() {
        let desc = AttributeDescriptor::from_floats(slot(), 3, 5, 2);
        // Two full records.
        assert_eq!(desc.readable_vertices(40), 2);
        // A truncated last record is not readable.
        assert_eq!(desc.readable_vertices(39), 1);
        assert_eq!(desc.readable_vertices(4), 0);
    }

    #[test]
    fn zero_stride_means_tightly_packed() {
        let desc = AttributeDescriptor {
            component_count: 2,
            stride_bytes: 0,
            offset_bytes: 0,
            slot: slot(),
        };
        assert_eq!(desc.effective_stride(), 8);
        assert_eq!(desc.readable_vertices(24), 3);
    }

    #[test]
    fn read_vertex_returns_interleaved_fields() {
        let data: [f32; 10] = [0.0, 1.0, 0.1, 0.2, 0.3, 2.0, 3.0, 0.4, 0.5, 0.6];
        let bytes: &[u8] = bytemuck::cast_slice(&data);
        let color = AttributeDescriptor::from_floats(slot(), 3, 5, 2);
        assert_eq!(color.read_vertex(bytes, 1), Some(vec![0.4, 0.5, 0.6]));
        assert_eq!(color.read_vertex(bytes, 2), None);
    }
}
