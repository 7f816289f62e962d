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

//! The table surface texture, generated in code.

use rink_core::math::LinearRgba;
use rink_core::renderer::{
    FilterMode, GraphicsDevice, ResourceError, TextureDescriptor, TextureFormat, TextureId,
};

/// Edge length of the generated table texture.
pub const TABLE_TEXTURE_SIZE: u32 = 64;

const ICE: LinearRgba = LinearRgba::rgb(0.94, 0.97, 1.0);
const BOARDS: LinearRgba = LinearRgba::rgb(0.1, 0.2, 0.8);
const CENTER_LINE: LinearRgba = LinearRgba::rgb(0.85, 0.1, 0.1);

/// CPU-side RGBA8 texels, row 0 first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureData {
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Tightly packed RGBA8 texels.
    pub pixels: Vec<u8>,
}

impl TextureData {
    /// Paints the rink markings: ice, boards around the edge, a center line
    /// across the short axis and a center circle.
    pub fn table_markings(width: u32, height: u32) -> Self {
        let border = (width.min(height) / 32).max(1) as f32;
        let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
        let radius = width.min(height) as f32 / 6.0;

        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
                let edge = px.min(py).min(width as f32 - px).min(height as f32 - py);
                let distance = ((px - cx).powi(2) + (py - cy).powi(2)).sqrt();

                let color = if edge < border {
                    BOARDS
                } else if (py - cy).abs() < border {
                    CENTER_LINE
                } else if distance <= radius && distance > radius - border {
                    BOARDS
                } else {
                    ICE
                };
                pixels.extend_from_slice(&color.to_rgba8());
            }
        }

        Self {
            width,
            height,
            pixels,
        }
    }

    /// The texel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.pixels
            .get(i..i + 4)
            .and_then(|texel| texel.try_into().ok())
    }

    /// The descriptor matching this data.
    pub fn descriptor(&self) -> TextureDescriptor<'static> {
        TextureDescriptor {
            label: Some("table"),
            width: self.width,
            height: self.height,
            format: TextureFormat::Rgba8Unorm,
            filter: FilterMode::Linear,
        }
    }

    /// Uploads the texels to a new device texture.
    pub fn upload(&self, device: &mut dyn GraphicsDevice) -> Result<TextureId, ResourceError> {
        device.create_texture(&self.descriptor(), &self.pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markings_are_where_expected() {
        let tex = TextureData::table_markings(TABLE_TEXTURE_SIZE, TABLE_TEXTURE_SIZE);
        assert_eq!(tex.pixels.len(), 64 * 64 * 4);
        assert_eq!(tex.descriptor().byte_len(), tex.pixels.len());
        assert_eq!(tex.pixel(0, 0), Some(BOARDS.to_rgba8()));
        assert_eq!(tex.pixel(32, 32), Some(CENTER_LINE.to_rgba8()));
        assert_eq!(tex.pixel(16, 16), Some(ICE.to_rgba8()));
        assert_eq!(tex.pixel(64, 0), None);
    }

    #[test]
    fn tiny_textures_still_have_boards() {
        let tex = TextureData::table_markings(4, 8);
        assert_eq!(tex.pixel(0, 4), Some(BOARDS.to_rgba8()));
    }
}
