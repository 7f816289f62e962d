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

use super::{DrawRegion, Drawable, Shape, VertexLayout, PUCK_INDEX};
use crate::render_lane::vertex_array::VertexArray;
use rink_core::math::LinearRgba;
use rink_core::renderer::{GraphicsDevice, PrimitiveTopology, ResourceError};
use std::rc::Rc;

/// The puck as a single black `X, Y, R, G, B` point at the center.
pub const PUCK_VERTICES: [f32; 5] = [0.0, 0.0, 0.0, 0.0, 0.0];

/// The puck.
#[derive(Debug)]
pub struct Puck {
    shape: Shape,
}

impl Puck {
    /// The puck vertex of the shared buffer.
    pub fn in_shared(shared: Rc<VertexArray>) -> Self {
        Self {
            shape: Shape::new("puck", shared, VertexLayout::PositionColor, vec![region()]),
        }
    }

    /// The puck in its own one-vertex buffer.
    pub fn standalone(device: &mut dyn GraphicsDevice) -> Result<Self, ResourceError> {
        let array = VertexArray::new(
            device,
            &PUCK_VERTICES,
            VertexLayout::PositionColor.floats_per_vertex(),
        )?;
        Ok(Self {
            shape: Shape::new(
                "puck",
                Rc::new(array),
                VertexLayout::PositionColor,
                vec![DrawRegion { first: 0, ..region() }],
            ),
        })
    }
}

fn region() -> DrawRegion {
    DrawRegion {
        topology: PrimitiveTopology::PointList,
        first: PUCK_INDEX,
        count: 1,
        tint: LinearRgba::BLACK,
    }
}

impl Drawable for Puck {
    fn shape(&self) -> &Shape {
        &self.shape
    }
}
