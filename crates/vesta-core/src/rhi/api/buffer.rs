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

//! Defines data structures related to GPU buffer resources.

use crate::vesta_bitflags;
use std::borrow::Cow;

vesta_bitflags! {
    /// Describes how a buffer will be used. Values match the C interface.
    pub struct BufferUsage: u32 {
        /// Vertex input data.
        const VERTEX = 1 << 0;
        /// Index input data.
        const INDEX = 1 << 1;
        /// Shader constants.
        const CONSTANT = 1 << 2;
        /// Structured shader storage.
        const STRUCTURED = 1 << 3;
        /// Read-only shader resource.
        const SHADER_RESOURCE = 1 << 4;
        /// Read/write shader resource.
        const UNORDERED_ACCESS = 1 << 5;
        /// Indirect draw or dispatch arguments.
        const INDIRECT_ARGS = 1 << 6;
        /// Source of a copy.
        const COPY_SOURCE = 1 << 7;
        /// Destination of a copy.
        const COPY_DEST = 1 << 8;
        /// Written by the CPU.
        const CPU_WRITE = 1 << 9;
        /// Source of a transfer to another queue.
        const TRANSFER_SRC = 1 << 10;
    }
}

impl BufferUsage {
    /// Usages that make a buffer host-visible on their own.
    pub const HOST_VISIBLE: Self = Self::VERTEX.union(Self::INDEX).union(Self::CONSTANT);
}

/// Where the backend places a buffer's storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryResidency {
    /// Mappable by the CPU; uploads are plain memory writes.
    HostVisible,
    /// Only reachable by the GPU.
    DevicePrivate,
}

/// A descriptor used to create a buffer.
#[derive(Debug, Clone, Default)]
pub struct BufferDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// Size of the buffer in bytes. Must be non-zero.
    pub size: u64,
    /// How the buffer will be used.
    pub usage: BufferUsage,
    /// Element stride for structured buffers, informational otherwise.
    pub stride: u32,
    /// Bytes copied into the buffer before creation returns.
    pub initial_data: Option<&'a [u8]>,
}

impl BufferDescriptor<'_> {
    /// A buffer is CPU accessible when its usage includes vertex, index or
    /// constant data, or when initial data is supplied.
    pub fn is_cpu_accessible(&self) -> bool {
        self.usage.intersects(BufferUsage::HOST_VISIBLE) || self.initial_data.is_some()
    }

    /// The memory residency implied by [`Self::is_cpu_accessible`].
    pub fn residency(&self) -> MemoryResidency {
        if self.is_cpu_accessible() {
            MemoryResidency::HostVisible
        } else {
            MemoryResidency::DevicePrivate
        }
    }
}
