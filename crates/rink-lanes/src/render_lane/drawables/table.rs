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

use super::{
    DrawRegion, Drawable, Shape, VertexLayout, CENTER_LINE_COUNT, CENTER_LINE_FIRST,
    TABLE_FAN_COUNT, TABLE_FAN_FIRST,
};
use crate::render_lane::vertex_array::VertexArray;
use rink_core::math::LinearRgba;
use rink_core::renderer::{GraphicsDevice, PrimitiveTopology, ResourceError};
use std::rc::Rc;

/// The texture-mapped table: `X, Y, S, T` records drawn as one fan.
///
/// T runs from 0.1 to 0.9 to crop the texture edges on the long axis.
#[rustfmt::skip]
pub const TEXTURED_TABLE_VERTICES: [f32; 24] = [
     0.0,  0.0, 0.5, 0.5,
    -0.5, -0.8, 0.0, 0.9,
     0.5, -0.8, 1.0, 0.9,
     0.5,  0.8, 1.0, 0.1,
    -0.5,  0.8, 0.0, 0.1,
    -0.5, -0.8, 0.0, 0.9,
];

/// The table surface.
#[derive(Debug)]
pub struct Table {
    shape: Shape,
}

impl Table {
    /// The flat table in the shared buffer: its fan followed by the center line.
    pub fn with_center_line(shared: Rc<VertexArray>) -> Self {
        Self {
            shape: Shape::new(
                "table",
                shared,
                VertexLayout::PositionColor,
                vec![
                    DrawRegion {
                        topology: PrimitiveTopology::TriangleFan,
                        first: TABLE_FAN_FIRST,
                        count: TABLE_FAN_COUNT,
                        tint: LinearRgba::WHITE,
                    },
                    DrawRegion {
                        topology: PrimitiveTopology::LineList,
                        first: CENTER_LINE_FIRST,
                        count: CENTER_LINE_COUNT,
                        tint: LinearRgba::RED,
                    },
                ],
            ),
        }
    }

    /// The texture-mapped table with its own buffer.
    pub fn textured(device: &mut dyn GraphicsDevice) -> Result<Self, ResourceError> {
        let array = VertexArray::new(
            device,
            &TEXTURED_TABLE_VERTICES,
            VertexLayout::PositionTexture.floats_per_vertex(),
        )?;
        Ok(Self {
            shape: Shape::new(
                "table",
                Rc::new(array),
                VertexLayout::PositionTexture,
                vec![DrawRegion {
                    topology: PrimitiveTopology::TriangleFan,
                    first: 0,
                    count: 6,
                    tint: LinearRgba::WHITE,
                }],
            ),
        })
    }
}

impl Drawable for Table {
    fn shape(&self) -> &Shape {
        &self.shape
    }
}
