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

use super::RhiBackend;
use crate::rhi::api::{ScissorRect, ShaderStage, Viewport};
use std::ops::Range;

/// An open render pass of a backend, used for recording draw state and draw calls.
///
/// A `RenderEncoder` is obtained from [`RhiBackend::begin_render_pass`] and handed
/// back through [`RhiBackend::end_render_pass`]. The command list guarantees
/// that at most one of them is alive per command buffer.
///
/// Resources are passed by reference; a backend that needs them beyond the call
/// keeps its own reference-counted clone.
pub trait RenderEncoder<B: RhiBackend + ?Sized> {
    /// Sets the active pipeline for subsequent draw calls.
    fn set_pipeline(&mut self, pipeline: &B::Pipeline);

    /// Binds a vertex buffer to a specific slot.
    fn set_vertex_buffer(&mut self, slot: u32, buffer: &B::Buffer, offset: u64);

    /// Binds a buffer to the numbered resource slot of a vertex or pixel stage.
    fn set_stage_buffer(&mut self, stage: ShaderStage, index: u32, buffer: &B::Buffer, offset: u64);

    /// Binds a texture to the numbered resource slot of a vertex or pixel stage.
    fn set_stage_texture(&mut self, stage: ShaderStage, index: u32, texture: &B::Texture);

    /// Sets the viewport transform.
    fn set_viewport(&mut self, viewport: &Viewport);

    /// Sets the scissor rectangle.
    fn set_scissor_rect(&mut self, rect: &ScissorRect);

    /// Records a non-indexed triangle-list draw.
    fn draw(&mut self, vertices: Range<u32>, instances: Range<u32>);

    /// Opens a named debug group.
    fn push_debug_group(&mut self, label: &str);

    /// Closes the innermost debug group.
    fn pop_debug_group(&mut self);

    /// Inserts a single named debug marker.
    fn insert_debug_marker(&mut self, label: &str);
}
