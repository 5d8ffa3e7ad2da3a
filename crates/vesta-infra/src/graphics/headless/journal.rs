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

use std::ops::Range;
use std::sync::{Arc, Mutex, PoisonError};
use vesta_core::rhi::{ClearColor, Operations, ScissorRect, ShaderStage, Viewport};

/// One backend call made by the device or a command list.
///
/// Objects are identified by the backend-assigned id of the object involved.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCommand {
    /// A command buffer was created.
    CreateCommandBuffer {
        /// Id of the command buffer.
        command_buffer: u64,
    },
    /// A render pass was opened.
    BeginRenderPass {
        /// Id of the command buffer.
        command_buffer: u64,
        /// Id of the color target texture.
        target: u64,
        /// Load and store operations of the color target.
        ops: Operations<ClearColor>,
    },
    /// A pipeline was bound.
    SetPipeline {
        /// Id of the pipeline.
        pipeline: u64,
    },
    /// A vertex buffer was bound.
    SetVertexBuffer {
        /// Slot index.
        slot: u32,
        /// Id of the buffer.
        buffer: u64,
        /// Byte offset.
        offset: u64,
    },
    /// A buffer was bound into a stage's resource slot.
    SetStageBuffer {
        /// Stage bound to.
        stage: ShaderStage,
        /// Slot index.
        index: u32,
        /// Id of the buffer.
        buffer: u64,
        /// Byte offset.
        offset: u64,
    },
    /// A texture was bound into a stage's resource slot.
    SetStageTexture {
        /// Stage bound to.
        stage: ShaderStage,
        /// Slot index.
        index: u32,
        /// Id of the texture.
        texture: u64,
    },
    /// The viewport was set.
    SetViewport(Viewport),
    /// The scissor rectangle was set.
    SetScissorRect(ScissorRect),
    /// A draw was recorded.
    Draw {
        /// Vertex range.
        vertices: Range<u32>,
        /// Instance range.
        instances: Range<u32>,
    },
    /// A debug group was opened.
    PushDebugGroup(String),
    /// A debug group was closed.
    PopDebugGroup,
    /// A debug marker was inserted.
    InsertDebugMarker(String),
    /// A render pass was closed.
    EndRenderPass {
        /// Id of the command buffer.
        command_buffer: u64,
    },
    /// A command buffer was committed.
    Submit {
        /// Id of the command buffer.
        command_buffer: u64,
        /// Id of the drawable presented after it, if any.
        presented: Option<u64>,
        /// Whether a completion callback was attached.
        fenced: bool,
    },
    /// A surface was reconfigured after a resize.
    ConfigureSurface {
        /// Id of the surface.
        surface: u64,
        /// New width in pixels.
        width: u32,
        /// New height in pixels.
        height: u32,
    },
    /// A drawable was presented directly by its swapchain.
    Present {
        /// Id of the drawable.
        drawable: u64,
    },
    /// The queue was drained.
    WaitIdle,
}

/// A shared, append-only log of [`RecordedCommand`]s.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    commands: Arc<Mutex<Vec<RecordedCommand>>>,
}

impl Journal {
    /// Creates an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&self, command: RecordedCommand) {
        log::trace!("HeadlessBackend: {command:?}");
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(command);
    }

    /// A copy of every command recorded so far.
    pub fn commands(&self) -> Vec<RecordedCommand> {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of commands recorded so far.
    pub fn len(&self) -> usize {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of recorded commands matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&RecordedCommand) -> bool) -> usize {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|c| predicate(c))
            .count()
    }

    /// Forgets everything recorded so far.
    pub fn clear(&self) {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_the_log() {
        let journal = Journal::new();
        let other = journal.clone();
        other.record(RecordedCommand::WaitIdle);
        other.record(RecordedCommand::PopDebugGroup);
        assert_eq!(journal.len(), 2);
        assert_eq!(journal.count(|c| matches!(c, RecordedCommand::WaitIdle)), 1);
        journal.clear();
        assert!(other.is_empty());
    }
}
