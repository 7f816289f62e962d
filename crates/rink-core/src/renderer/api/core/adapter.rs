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

//! Adapter and device information.

use std::fmt;

/// The graphics API family behind a `GraphicsDevice`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GraphicsBackendType {
    /// Desktop OpenGL.
    OpenGl,
    /// OpenGL ES or WebGL.
    OpenGlEs,
    /// The in-memory recording backend.
    #[default]
    Headless,
}

impl fmt::Display for GraphicsBackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphicsBackendType::OpenGl => write!(f, "OpenGL"),
            GraphicsBackendType::OpenGlEs => write!(f, "OpenGL ES"),
            GraphicsBackendType::Headless => write!(f, "Headless"),
        }
    }
}

/// Provides standardized, backend-agnostic information about a graphics adapter.
#[derive(Debug, Clone, Default)]
pub struct GraphicsAdapterInfo {
    /// The name of the adapter, as reported by the driver.
    pub name: String,
    /// The graphics API backend this adapter is associated with.
    pub backend_type: GraphicsBackendType,
    /// The API version string, as reported by the driver.
    pub version: String,
}
