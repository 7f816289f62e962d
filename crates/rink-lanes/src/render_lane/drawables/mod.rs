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

//! The shapes of the scene and the draw calls that render them.
//!
//! Each shape reserves fixed vertex regions in a [`VertexArray`] at
//! construction and issues one draw call per region. The region table and the
//! vertex data are a single contract: they live next to each other here and
//! must change together.

mod mallet;
mod puck;
mod table;

pub use mallet::{Mallet, MALLET_VERTICES};
pub use puck::{Puck, PUCK_VERTICES};
pub use table::{Table, TEXTURED_TABLE_VERTICES};

use super::program::VertexInputs;
use super::state::PipelineState;
use super::vertex_array::VertexArray;
use rink_core::math::LinearRgba;
use rink_core::renderer::{
    GraphicsDevice, PrimitiveTopology, ResourceError, UniformSlot,
};
use std::ops::AddAssign;
use std::rc::Rc;

/// Components of the `a_Position` attribute.
pub const POSITION_COMPONENT_COUNT: u32 = 2;
/// Components of the `a_Color` attribute.
pub const COLOR_COMPONENT_COUNT: u32 = 3;
/// Components of the `a_TextureCoordinates` attribute.
pub const TEXTURE_COORDINATES_COMPONENT_COUNT: u32 = 2;

/// The shared flat-color buffer: `X, Y, R, G, B` records.
#[rustfmt::skip]
pub const SCENE_VERTICES: [f32; 55] = [
    // Table fan
     0.0,  0.0, 1.0, 1.0, 1.0,
    -0.5, -0.8, 0.7, 0.7, 0.7,
     0.5, -0.8, 0.7, 0.7, 0.7,
     0.5,  0.8, 0.7, 0.7, 0.7,
    -0.5,  0.8, 0.7, 0.7, 0.7,
    -0.5, -0.8, 0.7, 0.7, 0.7,
    // Center line
    -0.5,  0.0, 1.0, 0.0, 0.0,
     0.5,  0.0, 0.0, 0.0, 1.0,
    // Mallets
     0.0, -0.4, 0.0, 0.0, 1.0,
     0.0,  0.4, 1.0, 0.0, 0.0,
    // Puck
     0.0,  0.0, 0.0, 0.0, 0.0,
];

/// First vertex of the table fan in [`SCENE_VERTICES`].
pub const TABLE_FAN_FIRST: u32 = 0;
/// Vertex count of the table fan.
pub const TABLE_FAN_COUNT: u32 = 6;
/// First vertex of the center line.
pub const CENTER_LINE_FIRST: u32 = 6;
/// Vertex count of the center line.
pub const CENTER_LINE_COUNT: u32 = 2;
/// Index of the blue mallet.
pub const BLUE_MALLET_INDEX: u32 = 8;
/// Index of the red mallet.
pub const RED_MALLET_INDEX: u32 = 9;
/// Index of the puck.
pub const PUCK_INDEX: u32 = 10;

/// Record layout of a shape's vertex array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexLayout {
    /// `X, Y, R, G, B`.
    PositionColor,
    /// `X, Y, S, T`.
    PositionTexture,
}

impl VertexLayout {
    /// Record size in floats.
    pub fn floats_per_vertex(&self) -> u32 {
        match self {
            VertexLayout::PositionColor => POSITION_COMPONENT_COUNT + COLOR_COMPONENT_COUNT,
            VertexLayout::PositionTexture => {
                POSITION_COMPONENT_COUNT + TEXTURE_COORDINATES_COMPONENT_COUNT
            }
        }
    }
}

/// One draw call: a vertex range, how it is assembled, and the tint used by
/// the uniform-color program.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawRegion {
    /// Primitive assembly.
    pub topology: PrimitiveTopology,
    /// First vertex.
    pub first: u32,
    /// Vertex count.
    pub count: u32,
    /// Color written to `u_Color` before drawing, when that uniform is in use.
    pub tint: LinearRgba,
}

/// Counters accumulated while drawing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawSummary {
    /// Draw calls issued.
    pub draw_calls: u32,
    /// Vertices submitted.
    pub vertices: u32,
}

impl AddAssign for DrawSummary {
    fn add_assign(&mut self, rhs: Self) {
        self.draw_calls += rhs.draw_calls;
        self.vertices += rhs.vertices;
    }
}

/// The data behind every drawable: a vertex array, its layout and the regions drawn from it.
#[derive(Debug)]
pub struct Shape {
    name: &'static str,
    array: Rc<VertexArray>,
    layout: VertexLayout,
    regions: Vec<DrawRegion>,
}

impl Shape {
    fn new(
        name: &'static str,
        array: Rc<VertexArray>,
        layout: VertexLayout,
        regions: Vec<DrawRegion>,
    ) -> Self {
        debug_assert_eq!(array.floats_per_vertex(), layout.floats_per_vertex());
        debug_assert!(regions
            .iter()
            .all(|r| r.first + r.count <= array.vertex_count()));
        Self {
            name,
            array,
            layout,
            regions,
        }
    }

    /// The vertex array the regions index into.
    pub fn array(&self) -> &Rc<VertexArray> {
        &self.array
    }

    /// The record layout.
    pub fn layout(&self) -> VertexLayout {
        self.layout
    }
}

/// A shape that can bind its attributes and draw itself.
pub trait Drawable {
    /// The shape data.
    fn shape(&self) -> &Shape;

    /// A short name used in logs.
    fn name(&self) -> &'static str {
        self.shape().name
    }

    /// The draw regions, in the order they are drawn.
    fn regions(&self) -> &[DrawRegion] {
        &self.shape().regions
    }

    /// Binds position, plus color or texture coordinates when `inputs` reads them.
    ///
    /// Must be called after the program behind `inputs` is activated.
    fn bind_data(
        &self,
        device: &mut dyn GraphicsDevice,
        state: &mut PipelineState,
        inputs: &dyn VertexInputs,
    ) -> Result<(), ResourceError> {
        let shape = self.shape();
        shape.array.set_vertex_attrib_pointer(
            device,
            state,
            0,
            inputs.position(),
            POSITION_COMPONENT_COUNT,
        )?;

        let extra = match shape.layout {
            VertexLayout::PositionColor => inputs.color().map(|s| (s, COLOR_COMPONENT_COUNT)),
            VertexLayout::PositionTexture => inputs
                .texture_coordinates()
                .map(|s| (s, TEXTURE_COORDINATES_COMPONENT_COUNT)),
        };
        if let Some((slot, components)) = extra {
            shape.array.set_vertex_attrib_pointer(
                device,
                state,
                POSITION_COMPONENT_COUNT,
                slot,
                components,
            )?;
        }
        Ok(())
    }

    /// Issues one draw call per region. When `tint` is given, each region's
    /// tint is uploaded to it first.
    fn draw(
        &self,
        device: &mut dyn GraphicsDevice,
        state: &PipelineState,
        tint: Option<UniformSlot>,
    ) -> Result<DrawSummary, ResourceError> {
        let mut summary = DrawSummary::default();
        for region in self.regions() {
            if let Some(slot) = tint {
                state.check_uniform(slot)?;
                device.set_uniform_vec4(slot, region.tint.into())?;
            }
            device.draw_arrays(region.topology, region.first, region.count)?;
            summary.draw_calls += 1;
            summary.vertices += region.count;
        }
        log::trace!("Drew {} ({} calls)", self.name(), summary.draw_calls);
        Ok(summary)
    }
}

/// Uploads [`SCENE_VERTICES`], the buffer shared by every shape in the flat modes.
pub fn upload_scene_vertices(
    device: &mut dyn GraphicsDevice,
) -> Result<Rc<VertexArray>, ResourceError> {
    VertexArray::new(
        device,
        &SCENE_VERTICES,
        VertexLayout::PositionColor.floats_per_vertex(),
    )
    .map(Rc::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rink_infra::graphics::headless::HeadlessDevice;

    #[test]
    fn shared_buffer_regions_are_contiguous() {
        let mut device = HeadlessDevice::new();
        let shared = upload_scene_vertices(&mut device).unwrap();
        assert_eq!(shared.vertex_count(), 11);

        let table = Table::with_center_line(shared.clone());
        let blue = Mallet::in_shared(shared.clone(), BLUE_MALLET_INDEX, LinearRgba::BLUE);
        let red = Mallet::in_shared(shared.clone(), RED_MALLET_INDEX, LinearRgba::RED);
        let puck = Puck::in_shared(shared.clone());

        let mut next = 0;
        for region in table
            .regions()
            .iter()
            .chain(blue.regions())
            .chain(red.regions())
            .chain(puck.regions())
        {
            assert_eq!(region.first, next);
            next = region.first + region.count;
        }
        assert_eq!(next, shared.vertex_count());
    }

    #[test]
    fn draw_summary_accumulates() {
        let mut total = DrawSummary::default();
        total += DrawSummary {
            draw_calls: 2,
            vertices: 8,
        };
        total += DrawSummary {
            draw_calls: 1,
            vertices: 1,
        };
        assert_eq!(
            total,
            DrawSummary {
                draw_calls: 3,
                vertices: 9
            }
        );
    }

    #[test]
    fn layouts_have_expected_record_sizes() {
        assert_eq!(VertexLayout::PositionColor.floats_per_vertex(), 5);
        assert_eq!(VertexLayout::PositionTexture.floats_per_vertex(), 4);
    }
}
