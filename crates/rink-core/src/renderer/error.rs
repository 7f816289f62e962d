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

//! Defines the hierarchy of error types for the rendering subsystem.

use crate::renderer::api::shader::{ProgramId, ShaderStage};
use std::fmt;

/// An error related to loading, compiling or linking shaders, or to resolving
/// names from a linked program.
#[derive(Debug)]
pub enum ShaderError {
    /// The shader source provider could not supply a source.
    LoadError {
        /// The identifier that was requested from the provider.
        path: String,
        /// The underlying I/O or provider error.
        source_error: String,
    },
    /// The shader source failed to compile.
    CompilationError {
        /// A descriptive label for the shader, if available.
        label: String,
        /// The stage the source was compiled for.
        stage: ShaderStage,
        /// The compiler info log, verbatim.
        details: String,
    },
    /// The vertex and fragment stages could not be linked together.
    LinkError {
        /// A descriptive label for the program.
        label: String,
        /// The linker info log, verbatim.
        details: String,
    },
    /// A named attribute or uniform has no location in the linked program,
    /// either because it is misspelled or because it was optimized away.
    UnresolvedName {
        /// The program the name was looked up in.
        program: ProgramId,
        /// The attribute or uniform name.
        name: String,
    },
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::LoadError { path, source_error } => {
                write!(
                    f,
                    "Failed to load shader source from '{path}': {source_error}"
                )
            }
            ShaderError::CompilationError {
                label,
                stage,
                details,
            } => {
                write!(
                    f,
                    "Shader compilation failed for {stage} shader '{label}': {details}"
                )
            }
            ShaderError::LinkError { label, details } => {
                write!(f, "Program link failed for '{label}': {details}")
            }
            ShaderError::UnresolvedName { program, name } => {
                write!(f, "Name '{name}' has no location in program {program:?}")
            }
        }
    }
}

impl std::error::Error for ShaderError {}

/// An error related to the creation or use of a GPU resource (buffers, programs, textures).
#[derive(Debug)]
pub enum ResourceError {
    /// A shader-specific error occurred.
    Shader(ShaderError),
    /// Vertex or texture data was rejected before or during upload.
    UploadError(String),
    /// A location resolved from one program was used while another program is active.
    StaleLocation {
        /// The program the location belongs to.
        expected: ProgramId,
        /// The program that is currently active, if any.
        active: Option<ProgramId>,
    },
    /// A generic resource could not be found.
    NotFound,
    /// The handle or ID used to reference a resource is invalid.
    InvalidHandle,
    /// An attempt was made to access a resource out of its bounds (e.g., in a buffer).
    OutOfBounds,
    /// An error originating from the specific graphics backend implementation.
    BackendError(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::Shader(err) => write!(f, "Shader resource error: {err}"),
            ResourceError::UploadError(msg) => write!(f, "Upload rejected: {msg}"),
            ResourceError::StaleLocation { expected, active } => write!(
                f,
                "Location belongs to program {expected:?} but the active program is {active:?}"
            ),
            ResourceError::NotFound => write!(f, "Resource not found with ID."),
            ResourceError::InvalidHandle => write!(f, "Invalid resource handle or ID."),
            ResourceError::OutOfBounds => {
                write!(f, "Resource access out of bounds.")
            }
            ResourceError::BackendError(msg) => {
                write!(f, "Backend-specific resource error: {msg}")
            }
        }
    }
}

impl std::error::Error for ResourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResourceError::Shader(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ShaderError> for ResourceError {
    fn from(err: ShaderError) -> Self {
        ResourceError::Shader(err)
    }
}

/// A rejected configuration change. The renderer recovers from these locally.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// A viewport with a zero width or height was requested.
    ZeroAreaViewport {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },
    /// The projection parameters cannot produce a finite matrix.
    InvalidProjection(String),
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::ZeroAreaViewport { width, height } => {
                write!(f, "Viewport {width}x{height} has zero area")
            }
            ConfigurationError::InvalidProjection(msg) => {
                write!(f, "Invalid projection parameters: {msg}")
            }
        }
    }
}

impl std::error::Error for ConfigurationError {}

/// A high-level error that can occur within the renderer or graphics device.
#[derive(Debug)]
pub enum RenderError {
    /// A frame was requested before the surface was initialized.
    NotInitialized,
    /// A failure occurred while initializing the graphics backend.
    InitializationFailed(String),
    /// An error occurred while managing a GPU resource.
    ResourceError(ResourceError),
    /// A configuration change was rejected.
    Configuration(ConfigurationError),
    /// An unexpected or internal error occurred.
    Internal(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::NotInitialized => {
                write!(f, "The renderer is not initialized.")
            }
            RenderError::InitializationFailed(msg) => {
                write!(f, "Failed to initialize graphics backend: {msg}")
            }
            RenderError::ResourceError(err) => {
                write!(f, "Graphics resource operation failed: {err}")
            }
            RenderError::Configuration(err) => {
                write!(f, "Configuration rejected: {err}")
            }
            RenderError::Internal(msg) => {
                write!(f, "An internal or unexpected error occurred: {msg}")
            }
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::ResourceError(err) => Some(err),
            RenderError::Configuration(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResourceError> for RenderError {
    fn from(err: ResourceError) -> Self {
        RenderError::ResourceError(err)
    }
}

impl From<ShaderError> for RenderError {
    fn from(err: ShaderError) -> Self {
        RenderError::ResourceError(ResourceError::Shader(err))
    }
}

impl From<ConfigurationError> for RenderError {
    fn from(err: ConfigurationError) -> Self {
        RenderError::Configuration(err)
    }
}
