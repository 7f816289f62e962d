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


use rink_core::renderer::api::{FilterMode, PrimitiveTopology, ShaderStage, TextureFormat};

/// A local extension trait to convert our renderer's types into GL enums.
/// This avoids Rust's orphan rules while keeping an idiomatic `.into_gl()` syntax.
pub trait IntoGl<T> {
    /// Consumes self and converts it into a GL-compatible value.
    fn into_gl(self) -> T;
}

impl IntoGl<u32> for ShaderStage {
    fn into_gl(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl IntoGl<u32> for PrimitiveTopology {
    fn into_gl(self) -> u32 {
        match self {
            PrimitiveTopology::PointList => glow::POINTS,
            PrimitiveTopology::LineList => glow::LINES,
            PrimitiveTopology::LineStrip => glow::LINE_STRIP,
            PrimitiveTopology::TriangleList => glow::TRIANGLES,
            PrimitiveTopology::TriangleStrip => glow::TRIANGLE_STRIP,
            PrimitiveTopology::TriangleFan => glow::TRIANGLE_FAN,
        }
    }
}

impl IntoGl<i32> for FilterMode {
    fn into_gl(self) -> i32 {
        match self {
            FilterMode::Nearest => glow::NEAREST as i32,
            FilterMode::Linear => glow::LINEAR as i32,
        }
    }
}

/// `(internal_format, format, type)` for `glTexImage2D`.
impl IntoGl<(i32, u32, u32)> for TextureFormat {
    fn into_gl(self) -> (i32, u32, u32) {
        match self {
            TextureFormat::Rgba8Unorm => (glow::RGBA as i32, glow::RGBA, glow::UNSIGNED_BYTE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topologies_map_to_gl_modes() {
        let fan: u32 = PrimitiveTopology::TriangleFan.into_gl();
        assert_eq!(fan, glow::TRIANGLE_FAN);
        let points: u32 = PrimitiveTopology::PointList.into_gl();
        assert_eq!(points, glow::POINTS);
    }

    #[test]
    fn rgba8_uploads_unsigned_bytes() {
        let (internal, format, ty): (i32, u32, u32) = TextureFormat::Rgba8Unorm.into_gl();
        assert_eq!(internal as u32, glow::RGBA);
        assert_eq!(format, glow::RGBA);
        assert_eq!(ty, glow::UNSIGNED_BYTE);
    }
}
