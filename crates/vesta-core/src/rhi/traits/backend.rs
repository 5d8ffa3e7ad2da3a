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

use super::RenderEncoder;
use crate::platform::NativeWindow;
use crate::rhi::api::{
    AdapterInfo, BufferUsage, GraphicsPipelineDescriptor, MemoryResidency, RenderPassDescriptor,
    ShaderDescriptor, SurfaceConfig, TextureDescriptor, TextureDimension, TextureUploadRegion,
    VertexBufferLayout,
};
use crate::rhi::error::{PipelineError, ResourceError, RhiError, ShaderError};
use std::fmt::Debug;

/// Called once by the backend when a submission has finished executing.
pub type CompletionCallback = Box<dyn FnOnce() + Send + 'static>;

/// A compiled shader module together with the entry point to run.
#[derive(Debug)]
pub struct ShaderStageRef<'a, S> {
    /// The backend module.
    pub module: &'a S,
    /// The entry point inside the module.
    pub entry_point: &'a str,
}

/// Everything a backend needs to build a graphics pipeline, with shader handles
/// already resolved and the vertex layout grouped per buffer slot.
#[derive(Debug)]
pub struct RenderPipelineBuildInfo<'a, S> {
    /// An optional debug label.
    pub label: Option<&'a str>,
    /// The vertex stage.
    pub vertex: ShaderStageRef<'a, S>,
    /// The pixel stage.
    pub pixel: ShaderStageRef<'a, S>,
    /// One entry per bound vertex buffer slot.
    pub vertex_buffers: &'a [VertexBufferLayout],
    /// The original descriptor, for the fixed-function state.
    pub descriptor: &'a GraphicsPipelineDescriptor<'a>,
}

/// The interface between the device registry and one native graphics API.
///
/// A backend owns a single native device and its single submission queue. It
/// creates native objects and records and submits native commands; it never
/// sees handles. Handle bookkeeping, state validation and diagnostics all
/// live in [`Device`](crate::rhi::device::Device).
pub trait RhiBackend: Debug + Send + Sync + 'static {
    /// A native buffer.
    type Buffer: Debug + Send + Sync + 'static;
    /// A native texture. Cloning yields another reference to the same storage.
    type Texture: Clone + Debug + Send + Sync + 'static;
    /// A compiled shader module.
    type Shader: Debug + Send + Sync + 'static;
    /// A compiled graphics pipeline.
    type Pipeline: Debug + Send + Sync + 'static;
    /// A presentation surface bound to a window.
    type Surface: Debug + Send + Sync + 'static;
    /// The presentable image of one frame.
    type Drawable: Debug + Send + 'static;
    /// A native command buffer being recorded.
    type CommandBuffer: Send + 'static;
    /// An open render pass on a command buffer.
    type Encoder: RenderEncoder<Self> + Send + 'static;

    /// Describes the adapter this backend runs on.
    fn adapter_info(&self) -> AdapterInfo;

    /// Allocates a buffer with the given residency.
    fn create_buffer(
        &self,
        label: Option<&str>,
        size: u64,
        usage: BufferUsage,
        residency: MemoryResidency,
    ) -> Result<Self::Buffer, ResourceError>;

    /// Overwrites `data.len()` bytes at `offset`. The range is already checked.
    fn write_buffer(&self, buffer: &Self::Buffer, offset: u64, data: &[u8]) -> Result<(), ResourceError>;

    /// Reads `size` bytes at `offset` back to the CPU, blocking until they are available.
    fn read_buffer(&self, buffer: &Self::Buffer, offset: u64, size: u64) -> Result<Vec<u8>, ResourceError>;

    /// Allocates a texture.
    fn create_texture(
        &self,
        descriptor: &TextureDescriptor,
        dimension: TextureDimension,
    ) -> Result<Self::Texture, ResourceError>;

    /// Replaces one mip level of one slice. The region is already checked.
    fn write_texture(
        &self,
        texture: &Self::Texture,
        data: &[u8],
        region: &TextureUploadRegion,
    ) -> Result<(), ResourceError>;

    /// Compiles a shader stage and checks its entry point.
    fn create_shader(&self, descriptor: &ShaderDescriptor) -> Result<Self::Shader, ShaderError>;

    /// Builds a graphics pipeline.
    fn create_render_pipeline(
        &self,
        info: &RenderPipelineBuildInfo<'_, Self::Shader>,
    ) -> Result<Self::Pipeline, PipelineError>;

    /// Creates and configures a presentation surface on a window.
    fn create_surface(&self, window: &NativeWindow, config: &SurfaceConfig) -> Result<Self::Surface, ResourceError>;

    /// Reconfigures a surface, typically after a resize. Sizes are never zero.
    fn configure_surface(&self, surface: &mut Self::Surface, config: &SurfaceConfig);

    /// Acquires the next drawable of a surface.
    fn acquire_drawable(&self, surface: &Self::Surface) -> Result<Self::Drawable, RhiError>;

    /// Returns another reference to the texture behind a drawable.
    fn drawable_texture(&self, drawable: &Self::Drawable) -> Self::Texture;

    /// Presents a drawable that no command list has taken.
    fn present(&self, drawable: Self::Drawable);

    /// Creates an empty command buffer ready for recording.
    fn create_command_buffer(&self, label: Option<&str>) -> Self::CommandBuffer;

    /// Opens a render pass on a command buffer.
    fn begin_render_pass(
        &self,
        command_buffer: &mut Self::CommandBuffer,
        descriptor: &RenderPassDescriptor<'_, Self::Texture>,
    ) -> Self::Encoder;

    /// Closes a render pass opened on `command_buffer`.
    fn end_render_pass(&self, command_buffer: &mut Self::CommandBuffer, encoder: Self::Encoder);

    /// Commits a command buffer to the queue. The drawable, if any, is
    /// presented after the commands, and `on_complete` runs once the GPU is done.
    fn submit(
        &self,
        command_buffer: Self::CommandBuffer,
        drawable: Option<Self::Drawable>,
        on_complete: Option<CompletionCallback>,
    );

    /// Blocks until every submitted command buffer has completed.
    fn wait_idle(&self) -> Result<(), RhiError>;
}
