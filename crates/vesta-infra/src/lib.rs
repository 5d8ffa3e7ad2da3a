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

//! # Vesta Infra
//!
//! Concrete implementations of the [`RhiBackend`](vesta_core::rhi::RhiBackend)
//! contract:
//!
//! - [`WgpuBackend`](graphics::wgpu::WgpuBackend) drives a real GPU through `wgpu`.
//! - [`HeadlessBackend`](graphics::headless::HeadlessBackend) keeps every
//!   resource in CPU memory and journals every command, for tests and tooling
//!   that must run without a GPU.

pub mod graphics;

pub use graphics::headless::HeadlessBackend;
#[cfg(feature = "graphics")]
pub use graphics::wgpu::WgpuBackend;
