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

//! Defines data structures related to shader objects, linked programs and
//! the named locations resolved from them.

use std::borrow::Cow;
use std::fmt;

/// The programmable stage a shader object is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// The vertex processing stage.
    Vertex,
    /// The fragment (pixel) processing stage.
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

/// A descriptor used to compile a shader object.
#[derive(Debug, Clone)]
pub struct ShaderModuleDescriptor<'a> {
    /// An optional debug label, surfaced in compile errors.
    pub label: Option<&'a str>,
    /// The stage this source targets.
    pub stage: ShaderStage,
    /// The GLSL source text.
    pub source: Cow<'a, str>,
}

/// An opaque handle to a compiled shader object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderModuleId(pub usize);

/// An opaque handle to a linked shader program.
///
/// Locations resolved from a program are only meaningful while this handle
/// is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(pub usize);

/// A resolved vertex attribute location.
///
/// The slot remembers the program it was resolved from so that binding it
/// against another active program can be detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeSlot {
    /// The program the location was resolved from.
    pub program: ProgramId,
    /// The attribute index reported by the backend.
    pub index: u32,
}

/// A resolved uniform location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformSlot {
    /// The program the location was resolved from.
    pub program: ProgramId,
    /// The backend-specific location index.
    pub index: u32,
}

/// The outcome of a diagnostic program validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramValidation {
    /// `true` if the backend reported the program as valid for the current state.
    pub valid: bool,
    /// The raw validation log, possibly empty.
    pub log: String,
}
