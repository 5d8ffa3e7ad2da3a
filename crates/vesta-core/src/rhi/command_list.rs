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

//! The command-list recording state machine.
//!
//! A [`CommandList`] records one submission worth of GPU commands against a
//! [`Device`]. Calls made in the wrong state, or with handles that do not
//! resolve, are skipped and reported on the device's diagnostics bus; they
//! never reach the backend.

use crate::diagnostics::{DiagnosticKind, DiagnosticSource};
use crate::rhi::api::*;
use crate::rhi::device::Device;
use crate::rhi::traits::{CompletionCallback, RenderEncoder, RhiBackend};
use std::fmt;

const COMMAND_BUFFER_LABEL: &str = "Vesta Command List";

/// Where a command list is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandListState {
    /// Created or reset; not recording.
    Idle,
    /// Recording, no pass open.
    Recording,
    /// Recording with a render pass open.
    InPass,
    /// Committed to the queue.
    Submitted,
    /// Torn down.
    Destroyed,
}

/// The kind of pass currently open on a command list.
///
/// Dispatches and copies are not recorded, so only render passes are ever open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassKind {
    /// No pass is open.
    None,
    /// A render pass.
    Render,
}

/// Records GPU commands for a single submission.
///
/// The list keeps a clone of its [`Device`] to resolve handles while recording.
/// At most one pass is open at a time.
pub struct CommandList<B: RhiBackend> {
    device: Device<B>,
    command_buffer: Option<B::CommandBuffer>,
    pass: Option<B::Encoder>,
    drawable: Option<B::Drawable>,
    recording: bool,
    state: CommandListState,
}

impl<B: RhiBackend> fmt::Debug for CommandList<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandList")
            .field("state", &self.state)
            .field("pass", &self.active_pass())
            .field("recording", &self.recording)
            .field("has_drawable", &self.drawable.is_some())
            .finish()
    }
}

impl<B: RhiBackend> CommandList<B> {
    /// Creates an idle command list bound to `device`.
    pub fn new(device: Device<B>) -> Self {
        Self {
            device,
            command_buffer: None,
            pass: None,
            drawable: None,
            recording: false,
            state: CommandListState::Idle,
        }
    }

    /// The current lifecycle state.
    pub fn state(&self) -> CommandListState {
        self.state
    }

    /// The kind of pass currently open.
    pub fn active_pass(&self) -> PassKind {
        match self.pass {
            Some(_) => PassKind::Render,
            None => PassKind::None,
        }
    }

    /// Whether commands are being recorded.
    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Whether a drawable is attached.
    pub fn has_drawable(&self) -> bool {
        self.drawable.is_some()
    }

    /// The device this list records against.
    pub fn device(&self) -> &Device<B> {
        &self.device
    }

    fn report(&self, kind: DiagnosticKind, message: impl Into<String>) {
        self.device
            .diagnostics()
            .report(DiagnosticSource::CommandList, kind, message);
    }

    /// Reports and returns `false` unless a render pass is open.
    fn require_render_pass(&self, operation: &str) -> bool {
        if self.pass.is_some() {
            return true;
        }
        self.report(
            DiagnosticKind::InvalidState,
            format!("{operation} called outside a render pass"),
        );
        false
    }

    fn encoder(&mut self) -> Option<&mut B::Encoder> {
        self.pass.as_mut()
    }

    /// Starts recording into a fresh command buffer.
    pub fn begin(&mut self) {
        if self.recording {
            self.report(DiagnosticKind::InvalidState, "begin called while already recording");
            return;
        }
        self.command_buffer = Some(
            self.device
                .backend()
                .create_command_buffer(Some(COMMAND_BUFFER_LABEL)),
        );
        self.recording = true;
        self.state = CommandListState::Recording;
    }

    /// Attaches the drawable this frame renders to and presents.
    pub fn set_drawable(&mut self, drawable: B::Drawable) {
        if self.drawable.replace(drawable).is_some() {
            self.report(
                DiagnosticKind::InvalidState,
                "set_drawable replaced a drawable that was never presented",
            );
        }
    }

    // --- Passes ---

    /// Opens a render pass on the attached drawable.
    ///
    /// The color and depth handles are accepted for interface stability; the
    /// drawable is always the color target.
    pub fn begin_render_pass(
        &mut self,
        color: TextureHandle,
        depth: TextureHandle,
        load: LoadAction,
        store: StoreAction,
        clear: Option<ClearColor>,
    ) {
        if !self.recording {
            self.report(DiagnosticKind::InvalidState, "begin_render_pass called while not recording");
            return;
        }
        if self.pass.is_some() {
            self.report(
                DiagnosticKind::InvalidState,
                "begin_render_pass called with a render pass already open",
            );
            return;
        }
        if self.drawable.is_none() {
            self.report(
                DiagnosticKind::InvalidState,
                "begin_render_pass called without a drawable attached",
            );
            return;
        }
        if !depth.is_null() && self.device.texture_entry(depth).is_none() {
            self.report(
                DiagnosticKind::InvalidHandle,
                format!("depth target {depth} does not resolve; rendering without depth"),
            );
        }
        log::trace!("CommandList: Render pass on {color} (load {load:?}, store {store:?}).");

        let backend = self.device.backend();
        let (Some(command_buffer), Some(drawable)) = (self.command_buffer.as_mut(), self.drawable.as_ref())
        else {
            return;
        };
        let target = backend.drawable_texture(drawable);
        let encoder = backend.begin_render_pass(
            command_buffer,
            &RenderPassDescriptor {
                label: Some("Vesta Render Pass"),
                color_target: &target,
                color_ops: Operations::from_actions(load, store, clear),
            },
        );
        self.pass = Some(encoder);
        self.state = CommandListState::InPass;
    }

    /// Opens a render pass using the first target and first clear color only.
    pub fn begin_render_pass_multi_target(
        &mut self,
        targets: &[TextureHandle],
        depth: TextureHandle,
        load: LoadAction,
        store: StoreAction,
        clears: &[ClearColor],
    ) {
        let Some(&color) = targets.first() else {
            self.report(
                DiagnosticKind::InvalidState,
                "begin_render_pass_multi_target called with no targets",
            );
            return;
        };
        if targets.len() > 1 {
            log::debug!(
                "CommandList: Only the first of {} render targets is bound.",
                targets.len()
            );
        }
        self.begin_render_pass(color, depth, load, store, clears.first().copied());
    }

    /// Closes the open render pass.
    pub fn end_render_pass(&mut self) {
        let Some(encoder) = self.pass.take() else {
            self.report(DiagnosticKind::InvalidState, "end_render_pass called with no pass open");
            return;
        };
        if let Some(command_buffer) = self.command_buffer.as_mut() {
            self.device.backend().end_render_pass(command_buffer, encoder);
        }
        self.state = CommandListState::Recording;
    }

    // --- Bindings ---

    /// Binds a pipeline state for subsequent draws.
    pub fn set_pipeline_state(&mut self, handle: PipelineStateHandle) {
        if !self.require_render_pass("set_pipeline_state") {
            return;
        }
        let Some(pipeline) = self.device.pipeline_entry(handle) else {
            self.report(
                DiagnosticKind::InvalidHandle,
                format!("set_pipeline_state: unknown pipeline state {handle}"),
            );
            return;
        };
        if let Some(encoder) = self.encoder() {
            encoder.set_pipeline(&pipeline.raw);
        }
    }

    /// Binds a vertex buffer to `slot`. The stride comes from the pipeline's
    /// vertex layout; the argument is accepted for interface stability.
    pub fn set_vertex_buffer(&mut self, slot: u32, handle: BufferHandle, stride: u32, offset: u64) {
        if !self.require_render_pass("set_vertex_buffer") {
            return;
        }
        if slot >= MAX_VERTEX_BUFFERS {
            self.report(
                DiagnosticKind::OutOfBounds,
                format!("vertex buffer slot {slot} exceeds the limit of {MAX_VERTEX_BUFFERS}"),
            );
            return;
        }
        let Some(buffer) = self.device.buffer_entry(handle) else {
            self.report(
                DiagnosticKind::InvalidHandle,
                format!("set_vertex_buffer: unknown buffer {handle}"),
            );
            return;
        };
        log::trace!("CommandList: Vertex buffer {handle} at slot {slot} (stride {stride}).");
        if let Some(encoder) = self.encoder() {
            encoder.set_vertex_buffer(slot, &buffer.raw, offset);
        }
    }

    /// Binds a constant buffer into a stage's resource slot.
    pub fn set_constant_buffer(&mut self, stage: ShaderStage, index: u32, handle: BufferHandle, offset: u64) {
        self.bind_stage_buffer("set_constant_buffer", stage, index, handle, offset);
    }

    /// Binds a buffer into a stage's resource slot.
    pub fn set_buffer(&mut self, stage: ShaderStage, index: u32, handle: BufferHandle, offset: u64) {
        self.bind_stage_buffer("set_buffer", stage, index, handle, offset);
    }

    fn bind_stage_buffer(
        &mut self,
        operation: &str,
        stage: ShaderStage,
        index: u32,
        handle: BufferHandle,
        offset: u64,
    ) {
        if !self.require_render_pass(operation) {
            return;
        }
        if stage == ShaderStage::Compute {
            self.report(
                DiagnosticKind::Unimplemented,
                format!("{operation}: compute stage bindings are ignored"),
            );
            return;
        }
        let Some(buffer) = self.device.buffer_entry(handle) else {
            self.report(
                DiagnosticKind::InvalidHandle,
                format!("{operation}: unknown buffer {handle}"),
            );
            return;
        };
        if let Some(encoder) = self.encoder() {
            encoder.set_stage_buffer(stage, index, &buffer.raw, offset);
        }
    }

    /// Binds a texture into a stage's resource slot.
    pub fn set_texture(&mut self, stage: ShaderStage, index: u32, handle: TextureHandle) {
        if !self.require_render_pass("set_texture") {
            return;
        }
        if stage == ShaderStage::Compute {
            self.report(
                DiagnosticKind::Unimplemented,
                "set_texture: compute stage bindings are ignored",
            );
            return;
        }
        let Some(texture) = self.device.texture_entry(handle) else {
            self.report(
                DiagnosticKind::InvalidHandle,
                format!("set_texture: unknown texture {handle}"),
            );
            return;
        };
        if let Some(encoder) = self.encoder() {
            encoder.set_stage_texture(stage, index, &texture.raw);
        }
    }

    /// Sets the viewport.
    pub fn set_viewport(&mut self, viewport: &Viewport) {
        if !self.require_render_pass("set_viewport") {
            return;
        }
        if let Some(encoder) = self.encoder() {
            encoder.set_viewport(viewport);
        }
    }

    /// Applies the first viewport only. An empty slice is reported and skipped.
    pub fn set_viewports(&mut self, viewports: &[Viewport]) {
        match viewports.first() {
            Some(viewport) => self.set_viewport(viewport),
            None => self.report(DiagnosticKind::InvalidState, "set_viewports called with no viewports"),
        }
    }

    /// Sets the scissor rectangle.
    pub fn set_scissor_rect(&mut self, rect: &ScissorRect) {
        if !self.require_render_pass("set_scissor_rect") {
            return;
        }
        if let Some(encoder) = self.encoder() {
            encoder.set_scissor_rect(rect);
        }
    }

    /// Applies the first scissor rectangle only. An empty slice is reported and skipped.
    pub fn set_scissor_rects(&mut self, rects: &[ScissorRect]) {
        match rects.first() {
            Some(rect) => self.set_scissor_rect(rect),
            None => self.report(
                DiagnosticKind::InvalidState,
                "set_scissor_rects called with no rectangles",
            ),
        }
    }

    // --- Draws ---

    /// Draws a triangle list.
    pub fn draw(&mut self, vertex_count: u32, instance_count: u32, start_vertex: u32, start_instance: u32) {
        if !self.require_render_pass("draw") {
            return;
        }
        let vertices = start_vertex..start_vertex.saturating_add(vertex_count);
        let instances = start_instance..start_instance.saturating_add(instance_count);
        if let Some(encoder) = self.encoder() {
            encoder.draw(vertices, instances);
        }
    }

    fn unimplemented(&self, operation: &str) {
        self.report(
            DiagnosticKind::Unimplemented,
            format!("{operation} is not implemented and was skipped"),
        );
    }

    /// Not implemented: index buffers are not tracked.
    pub fn set_index_buffer(&mut self, _handle: BufferHandle, _format: IndexFormat, _offset: u64) {
        self.unimplemented("set_index_buffer");
    }

    /// Not implemented: requires index buffer tracking.
    pub fn draw_indexed(
        &mut self,
        _index_count: u32,
        _instance_count: u32,
        _start_index: u32,
        _base_vertex: i32,
        _start_instance: u32,
    ) {
        self.unimplemented("draw_indexed");
    }

    /// Not implemented: compute pipelines cannot be created.
    pub fn dispatch(&mut self, _groups_x: u32, _groups_y: u32, _groups_z: u32) {
        self.unimplemented("dispatch");
    }

    /// Not implemented.
    pub fn copy_buffer(
        &mut self,
        _source: BufferHandle,
        _destination: BufferHandle,
        _source_offset: u64,
        _destination_offset: u64,
        _size: u64,
    ) {
        self.unimplemented("copy_buffer");
    }

    /// Not implemented.
    pub fn copy_texture(&mut self, _source: TextureHandle, _destination: TextureHandle) {
        self.unimplemented("copy_texture");
    }

    /// Not implemented.
    pub fn copy_buffer_to_texture(
        &mut self,
        _source: BufferHandle,
        _destination: TextureHandle,
        _mip_level: u32,
        _array_slice: u32,
    ) {
        self.unimplemented("copy_buffer_to_texture");
    }

    // --- Debug markers ---

    /// Opens a debug group in the open render pass, if any.
    pub fn begin_event(&mut self, name: &str) {
        if let Some(encoder) = self.encoder() {
            encoder.push_debug_group(name);
        }
    }

    /// Closes the innermost debug group in the open render pass, if any.
    pub fn end_event(&mut self) {
        if let Some(encoder) = self.encoder() {
            encoder.pop_debug_group();
        }
    }

    /// Inserts a debug marker in the open render pass, if any.
    pub fn set_marker(&mut self, name: &str) {
        if let Some(encoder) = self.encoder() {
            encoder.insert_debug_marker(name);
        }
    }

    // --- Submission ---

    fn end_open_pass(&mut self) {
        if let Some(encoder) = self.pass.take() {
            if let Some(command_buffer) = self.command_buffer.as_mut() {
                self.device.backend().end_render_pass(command_buffer, encoder);
            }
        }
    }

    /// Ends any open pass, commits the recorded commands and presents the
    /// attached drawable.
    pub fn close(&mut self) {
        self.close_with(None);
    }

    pub(crate) fn close_with(&mut self, on_complete: Option<CompletionCallback>) {
        if !self.recording {
            self.report(DiagnosticKind::InvalidState, "close called while not recording");
            return;
        }
        self.end_open_pass();
        if let Some(command_buffer) = self.command_buffer.take() {
            self.device
                .backend()
                .submit(command_buffer, self.drawable.take(), on_complete);
        }
        self.recording = false;
        self.state = CommandListState::Submitted;
        log::trace!("CommandList: Submitted.");
    }

    /// Drops everything recorded and returns to [`CommandListState::Idle`].
    pub fn reset(&mut self) {
        self.end_open_pass();
        self.drawable = None;
        self.command_buffer = None;
        self.recording = false;
        self.state = CommandListState::Idle;
    }

    /// Tears the list down, ending any open pass.
    pub fn destroy(mut self) {
        self.end_open_pass();
        self.state = CommandListState::Destroyed;
        log::trace!("CommandList: Destroyed.");
    }
}
