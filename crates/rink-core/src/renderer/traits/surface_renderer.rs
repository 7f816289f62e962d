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

use crate::renderer::api::FrameStats;
use crate::renderer::error::RenderError;
use crate::renderer::GraphicsDevice;

/// The three lifecycle events a host delivers to a renderer.
///
/// The host guarantees the events are never interleaved: each call runs to
/// completion on the render thread before the next one is dispatched.
pub trait SurfaceRenderer: std::fmt::Debug {
    /// The surface (and its graphics context) was created or recreated.
    ///
    /// Every handle and location from a previous surface must be considered
    /// invalid. A failure here is fatal to this surface instance.
    fn on_surface_created(&mut self, device: &mut dyn GraphicsDevice) -> Result<(), RenderError>;

    /// The surface was resized. A zero-area size is ignored.
    fn on_viewport_resized(&mut self, device: &mut dyn GraphicsDevice, width: u32, height: u32);

    /// The host asks for a new frame.
    fn on_frame_requested(&mut self, device: &mut dyn GraphicsDevice) -> Result<(), RenderError>;

    /// Get the stats of the last rendered frame.
    fn last_frame_stats(&self) -> &FrameStats;
}
