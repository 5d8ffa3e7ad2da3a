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

use super::journal::{Journal, RecordedCommand};
use crate::graphics::shader::validate_wgsl;
use raw_window_handle::HasWindowHandle;
use std::collections::HashMap;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use vesta_core::platform::NativeWindow;
use vesta_core::rhi::*;

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A buffer held in CPU memory.
#[derive(Debug)]
pub struct HeadlessBuffer {
    /// Backend id.
    pub id: u64,
    /// Usage flags.
    pub usage: BufferUsage,
    /// Residency chosen by the device.
    pub residency: MemoryResidency,
    data: Mutex<Vec<u8>>,
}

impl HeadlessBuffer {
    /// A copy of the buffer's contents.
    pub fn contents(&self) -> Vec<u8> {
        lock(&self.data).clone()
    }
}

/// A texture held in CPU memory, one byte vector per uploaded subresource.
#[derive(Debug, Clone)]
pub struct HeadlessTexture {
    /// Backend id.
    pub id: u64,
    /// Width of mip 0.
    pub width: u32,
    /// Height of mip 0.
    pub height: u32,
    /// Texel format.
    pub format: TextureFormat,
    subresources: Arc<Mutex<HashMap<(u32, u32), Vec<u8>>>>,
}

impl HeadlessTexture {
    fn new(id: u64, width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            id,
            width,
            height,
            format,
            subresources: Arc::default(),
        }
    }

    /// The last data uploaded to a mip level and slice.
    pub fn subresource(&self, mip_level: u32, array_slice: u32) -> Option<Vec<u8>> {
        lock(&self.subresources)
            .get(&(mip_level, array_slice))
            .cloned()
    }
}

/// A validated shader stage.
#[derive(Debug)]
pub struct HeadlessShader {
    /// Backend id.
    pub id: u64,
    /// Pipeline stage.
    pub stage: ShaderStage,
    /// Entry point name.
    pub entry_point: String,
}

/// A pipeline description, kept as given.
#[derive(Debug)]
pub struct HeadlessPipeline {
    /// Backend id.
    pub id: u64,
    /// Vertex buffer layouts per slot.
    pub vertex_buffers: Vec<VertexBufferLayout>,
    /// Primitive topology.
    pub topology: PrimitiveTopology,
}

/// A surface that hands out CPU textures as drawables.
#[derive(Debug)]
pub struct HeadlessSurface {
    /// Backend id.
    pub id: u64,
    /// Current configuration.
    pub config: SurfaceConfig,
}

/// The presentable image of one headless frame.
#[derive(Debug)]
pub struct HeadlessDrawable {
    /// Backend id.
    pub id: u64,
    /// The image rendered to.
    pub texture: HeadlessTexture,
}

/// A command buffer; its commands go straight to the journal.
#[derive(Debug)]
pub struct HeadlessCommandBuffer {
    /// Backend id.
    pub id: u64,
}

/// An open render pass that journals every call.
#[derive(Debug)]
pub struct HeadlessRenderEncoder {
    journal: Journal,
}

impl RenderEncoder<HeadlessBackend> for HeadlessRenderEncoder {
    fn set_pipeline(&mut self, pipeline: &HeadlessPipeline) {
        self.journal.record(RecordedCommand::SetPipeline {
            pipeline: pipeline.id,
        });
    }

    fn set_vertex_buffer(&mut self, slot: u32, buffer: &HeadlessBuffer, offset: u64) {
        self.journal.record(RecordedCommand::SetVertexBuffer {
            slot,
            buffer: buffer.id,
            offset,
        });
    }

    fn set_stage_buffer(&mut self, stage: ShaderStage, index: u32, buffer: &HeadlessBuffer, offset: u64) {
        self.journal.record(RecordedCommand::SetStageBuffer {
            stage,
            index,
            buffer: buffer.id,
            offset,
        });
    }

    fn set_stage_texture(&mut self, stage: ShaderStage, index: u32, texture: &HeadlessTexture) {
        self.journal.record(RecordedCommand::SetStageTexture {
            stage,
            index,
            texture: texture.id,
        });
    }

    fn set_viewport(&mut self, viewport: &Viewport) {
        self.journal.record(RecordedCommand::SetViewport(*viewport));
    }

    fn set_scissor_rect(&mut self, rect: &ScissorRect) {
        self.journal.record(RecordedCommand::SetScissorRect(*rect));
    }

    fn draw(&mut self, vertices: Range<u32>, instances: Range<u32>) {
        self.journal.record(RecordedCommand::Draw { vertices, instances });
    }

    fn push_debug_group(&mut self, label: &str) {
        self.journal
            .record(RecordedCommand::PushDebugGroup(label.to_string()));
    }

    fn pop_debug_group(&mut self) {
        self.journal.record(RecordedCommand::PopDebugGroup);
    }

    fn insert_debug_marker(&mut self, label: &str) {
        self.journal
            .record(RecordedCommand::InsertDebugMarker(label.to_string()));
    }
}

/// A backend with no GPU behind it.
///
/// Submissions complete synchronously, so fence callbacks run before
/// `submit` returns.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    journal: Journal,
    next_id: AtomicU64,
    surfaces_lost: AtomicBool,
}

impl HeadlessBackend {
    /// Creates a backend with an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// The log of every command recorded on this backend.
    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Makes every following drawable acquisition fail (or succeed again).
    pub fn set_surfaces_lost(&self, lost: bool) {
        self.surfaces_lost.store(lost, Ordering::Relaxed);
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl RhiBackend for HeadlessBackend {
    type Buffer = HeadlessBuffer;
    type Texture = HeadlessTexture;
    type Shader = HeadlessShader;
    type Pipeline = HeadlessPipeline;
    type Surface = HeadlessSurface;
    type Drawable = HeadlessDrawable;
    type CommandBuffer = HeadlessCommandBuffer;
    type Encoder = HeadlessRenderEncoder;

    fn adapter_info(&self) -> AdapterInfo {
        AdapterInfo {
            name: "Vesta Headless Adapter".to_string(),
            backend_type: GraphicsBackendType::Headless,
            device_type: DeviceType::Cpu,
        }
    }

    fn create_buffer(
        &self,
        _label: Option<&str>,
        size: u64,
        usage: BufferUsage,
        residency: MemoryResidency,
    ) -> Result<HeadlessBuffer, ResourceError> {
        let len = usize::try_from(size)
            .map_err(|_| ResourceError::BackendError(format!("{size} bytes do not fit in memory")))?;
        Ok(HeadlessBuffer {
            id: self.next_id(),
            usage,
            residency,
            data: Mutex::new(vec![0; len]),
        })
    }

    fn write_buffer(&self, buffer: &HeadlessBuffer, offset: u64, data: &[u8]) -> Result<(), ResourceError> {
        let mut contents = lock(&buffer.data);
        let start = offset as usize;
        let end = start + data.len();
        let capacity = contents.len() as u64;
        let target = contents
            .get_mut(start..end)
            .ok_or(ResourceError::OutOfBounds {
                offset,
                size: data.len() as u64,
                capacity,
            })?;
        target.copy_from_slice(data);
        Ok(())
    }

    fn read_buffer(&self, buffer: &HeadlessBuffer, offset: u64, size: u64) -> Result<Vec<u8>, ResourceError> {
        let contents = lock(&buffer.data);
        let start = offset as usize;
        let end = start + size as usize;
        contents
            .get(start..end)
            .map(<[u8]>::to_vec)
            .ok_or(ResourceError::OutOfBounds {
                offset,
                size,
                capacity: contents.len() as u64,
            })
    }

    fn create_texture(
        &self,
        descriptor: &TextureDescriptor,
        _dimension: TextureDimension,
    ) -> Result<HeadlessTexture, ResourceError> {
        Ok(HeadlessTexture::new(
            self.next_id(),
            descriptor.width,
            descriptor.height,
            descriptor.format,
        ))
    }

    fn write_texture(
        &self,
        texture: &HeadlessTexture,
        data: &[u8],
        region: &TextureUploadRegion,
    ) -> Result<(), ResourceError> {
        lock(&texture.subresources).insert((region.mip_level, region.array_slice), data.to_vec());
        Ok(())
    }

    fn create_shader(&self, descriptor: &ShaderDescriptor) -> Result<HeadlessShader, ShaderError> {
        validate_wgsl(descriptor)?;
        Ok(HeadlessShader {
            id: self.next_id(),
            stage: descriptor.stage,
            entry_point: descriptor.entry_point.to_string(),
        })
    }

    fn create_render_pipeline(
        &self,
        info: &RenderPipelineBuildInfo<'_, HeadlessShader>,
    ) -> Result<HeadlessPipeline, PipelineError> {
        if info.vertex_buffers.len() > MAX_VERTEX_BUFFERS as usize {
            return Err(PipelineError::InvalidVertexLayout(format!(
                "{} vertex buffer slots exceed the limit of {MAX_VERTEX_BUFFERS}",
                info.vertex_buffers.len()
            )));
        }
        Ok(HeadlessPipeline {
            id: self.next_id(),
            vertex_buffers: info.vertex_buffers.to_vec(),
            topology: info.descriptor.topology,
        })
    }

    fn create_surface(&self, window: &NativeWindow, config: &SurfaceConfig) -> Result<HeadlessSurface, ResourceError> {
        window
            .window_handle()
            .map_err(|e| ResourceError::BackendError(format!("window handle unavailable: {e}")))?;
        Ok(HeadlessSurface {
            id: self.next_id(),
            config: *config,
        })
    }

    fn configure_surface(&self, surface: &mut HeadlessSurface, config: &SurfaceConfig) {
        surface.config = *config;
        self.journal.record(RecordedCommand::ConfigureSurface {
            surface: surface.id,
            width: config.width,
            height: config.height,
        });
    }

    fn acquire_drawable(&self, surface: &HeadlessSurface) -> Result<HeadlessDrawable, RhiError> {
        if self.surfaces_lost.load(Ordering::Relaxed) {
            return Err(RhiError::SurfaceAcquisitionFailed(format!(
                "headless surface {} is lost",
                surface.id
            )));
        }
        let texture = HeadlessTexture::new(
            self.next_id(),
            surface.config.width,
            surface.config.height,
            surface.config.format,
        );
        Ok(HeadlessDrawable {
            id: self.next_id(),
            texture,
        })
    }

    fn drawable_texture(&self, drawable: &HeadlessDrawable) -> HeadlessTexture {
        drawable.texture.clone()
    }

    fn present(&self, drawable: HeadlessDrawable) {
        self.journal.record(RecordedCommand::Present {
            drawable: drawable.id,
        });
    }

    fn create_command_buffer(&self, _label: Option<&str>) -> HeadlessCommandBuffer {
        let command_buffer = HeadlessCommandBuffer { id: self.next_id() };
        self.journal.record(RecordedCommand::CreateCommandBuffer {
            command_buffer: command_buffer.id,
        });
        command_buffer
    }

    fn begin_render_pass(
        &self,
        command_buffer: &mut HeadlessCommandBuffer,
        descriptor: &RenderPassDescriptor<'_, HeadlessTexture>,
    ) -> HeadlessRenderEncoder {
        self.journal.record(RecordedCommand::BeginRenderPass {
            command_buffer: command_buffer.id,
            target: descriptor.color_target.id,
            ops: descriptor.color_ops,
        });
        HeadlessRenderEncoder {
            journal: self.journal.clone(),
        }
    }

    fn end_render_pass(&self, command_buffer: &mut HeadlessCommandBuffer, _encoder: HeadlessRenderEncoder) {
        self.journal.record(RecordedCommand::EndRenderPass {
            command_buffer: command_buffer.id,
        });
    }

    fn submit(
        &self,
        command_buffer: HeadlessCommandBuffer,
        drawable: Option<HeadlessDrawable>,
        on_complete: Option<CompletionCallback>,
    ) {
        self.journal.record(RecordedCommand::Submit {
            command_buffer: command_buffer.id,
            presented: drawable.map(|d| d.id),
            fenced: on_complete.is_some(),
        });
        if let Some(callback) = on_complete {
            callback();
        }
    }

    fn wait_idle(&self) -> Result<(), RhiError> {
        self.journal.record(RecordedCommand::WaitIdle);
        Ok(())
    }
}
