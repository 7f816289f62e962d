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

//! Backend-agnostic rendering API.
//!
//! Organized into several logical sub-modules:
//!
//! - **[`core`]**: Scene configuration, frame statistics and adapter information.
//! - **[`buffer`]**: Vertex buffer handles and attribute layout descriptors.
//! - **[`shader`]**: Shader, program and resolved-location handles.
//! - **[`texture`]**: Texture handles and their descriptors.
//! - **[`pipeline`]**: Primitive topology and viewport state.

pub mod buffer;
pub mod core;
pub mod pipeline;
pub mod shader;
pub mod texture;

pub use self::buffer::*;
pub use self::core::*;
pub use self::pipeline::*;
pub use self::shader::*;
pub use self::texture::*;
