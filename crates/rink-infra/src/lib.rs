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


//! # Rink Infra
//!
//! Concrete [`GraphicsDevice`](rink_core::renderer::GraphicsDevice) backends:
//! an OpenGL (ES) 2.0 device built on `glow`, and a headless device that
//! records and checks every call without touching a GPU.

pub mod graphics;
