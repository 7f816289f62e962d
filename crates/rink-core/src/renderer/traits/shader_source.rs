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

use crate::renderer::error::ShaderError;
use std::borrow::Cow;

/// Supplies GLSL source text by identifier.
///
/// The renderer makes no assumption about where sources live: they may be
/// embedded in the binary, read from disk or generated.
pub trait ShaderSourceProvider {
    /// Returns the source registered under `identifier`.
    ///
    /// Fails with [`ShaderError::LoadError`] if the provider has no such source.
    fn load_shader_source(&self, identifier: &str) -> Result<Cow<'_, str>, ShaderError>;
}
