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

use super::{DrawRegion, Drawable, Shape, VertexLayout};
use crate::render_lane::vertex_array::VertexArray;
use rink_core::math::LinearRgba;
use rink_core::renderer::{GraphicsDevice, PrimitiveTopology, ResourceError};
use std::rc::Rc;

/// Both mallets as `X, Y, R, G, B` points, blue first.
#[rustfmt::skip]
pub const MALLET_VERTICES: [f32; 10] = [
    0.0, -0.4, 0.0, 0.0, 1.0,
    0.0,  0.4, 1.0, 0.0, 0.0,
];

/// Mallets, drawn as points.
#[derive(Debug)]
pub struct Mallet {
    shape: Shape,
}

impl Mallet {
    /// One mallet at vertex `index` of the shared buffer.
    pub fn in_shared(shared: Rc<VertexArray>, index: u32, tint: LinearRgba) -> Self {
        Self {
            shape: Shape::new(
                "mallet",
                shared,
                VertexLayout::PositionColor,
                vec![DrawRegion {
                    topology: PrimitiveTopology::PointList,
                    first: index,
                    count: 1,
                    tint,
                }],
            ),
        }
    }

    /// Both mallets in their own buffer, drawn with one call.
    pub fn pair(device: &mut dyn GraphicsDevice) -> Result<Self, ResourceError> {
        let array = VertexArray::new(
            device,
            &MALLET_VERTICES,
            VertexLayout::PositionColor.floats_per_vertex(),
        )?;
        Ok(Self {
            shape: Shape::new(
                "mallets",
                Rc::new(array),
                VertexLayout::PositionColor,
                vec![DrawRegion {
                    topology: PrimitiveTopology::PointList,
                    first: 0,
                    count: 2,
                    tint: LinearRgba::BLUE,
                }],
            ),
        })
    }
}

impl Drawable for Mallet {
    fn shape(&self) -> &Shape {
        &self.shape
    }
}
