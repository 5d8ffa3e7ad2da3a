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

//! The device: owner of every GPU resource, addressed by typed handles.

use crate::config::DeviceConfig;
use crate::diagnostics::{DiagnosticKind, DiagnosticSource, DiagnosticsBus};
use crate::rhi::api::*;
use crate::rhi::command_list::CommandList;
use crate::rhi::error::{PipelineError, ResourceError, ShaderError};
use crate::rhi::table::HandleTable;
use crate::rhi::traits::{RenderPipelineBuildInfo, RhiBackend, ShaderStageRef};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug)]
pub(crate) struct BufferEntry<B: RhiBackend> {
    pub(crate) raw: B::Buffer,
    pub(crate) size: u64,
    pub(crate) usage: BufferUsage,
    pub(crate) stride: u32,
    pub(crate) label: Option<String>,
    pub(crate) cpu_accessible: bool,
}

#[derive(Debug)]
pub(crate) struct TextureEntry<B: RhiBackend> {
    pub(crate) raw: B::Texture,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) depth_or_array_layers: u32,
    pub(crate) mip_levels: u32,
    pub(crate) format: TextureFormat,
    pub(crate) usage: TextureUsage,
    pub(crate) dimension: TextureDimension,
    pub(crate) label: Option<String>,
    pub(crate) is_backbuffer: bool,
}

#[derive(Debug)]
pub(crate) struct ShaderEntry<B: RhiBackend> {
    pub(crate) raw: B::Shader,
    pub(crate) stage: ShaderStage,
    pub(crate) entry_point: String,
    pub(crate) label: Option<String>,
}

#[derive(Debug)]
pub(crate) struct PipelineEntry<B: RhiBackend> {
    pub(crate) raw: B::Pipeline,
    pub(crate) vertex_shader: ShaderHandle,
    pub(crate) pixel_shader: ShaderHandle,
    pub(crate) render_target_formats: Vec<TextureFormat>,
    pub(crate) vertex_stride: u32,
    pub(crate) label: Option<String>,
}

#[derive(Debug)]
struct SwapchainState<B: RhiBackend> {
    surface: B::Surface,
    config: SurfaceConfig,
    drawable: Option<B::Drawable>,
    /// The current drawable was handed to a command list and may still be alive.
    drawable_lent: bool,
    /// `config` changed while a drawable was lent; applied on the next present.
    resize_pending: bool,
}

#[derive(Debug)]
pub(crate) struct SwapchainEntry<B: RhiBackend> {
    state: Mutex<SwapchainState<B>>,
    label: Option<String>,
}

impl<B: RhiBackend> SwapchainEntry<B> {
    fn lock(&self) -> std::sync::MutexGuard<'_, SwapchainState<B>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug)]
pub(crate) struct FenceEntry {
    pub(crate) value: Arc<AtomicU64>,
}

/// A snapshot of a live buffer's properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferInfo {
    /// Size in bytes.
    pub size: u64,
    /// Usage flags given at creation.
    pub usage: BufferUsage,
    /// Element stride given at creation.
    pub stride: u32,
    /// Whether the CPU may write it.
    pub cpu_accessible: bool,
    /// Debug label.
    pub label: Option<String>,
}

/// A snapshot of a live texture's properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureInfo {
    /// Width of mip 0.
    pub width: u32,
    /// Height of mip 0.
    pub height: u32,
    /// Depth (3D) or layer count (2D arrays).
    pub depth_or_array_layers: u32,
    /// Number of mip levels.
    pub mip_levels: u32,
    /// Texel format.
    pub format: TextureFormat,
    /// Usage flags.
    pub usage: TextureUsage,
    /// Derived dimension.
    pub dimension: TextureDimension,
    /// Whether this entry wraps a swapchain drawable.
    pub is_backbuffer: bool,
    /// Debug label.
    pub label: Option<String>,
}

/// A snapshot of a live shader's properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderInfo {
    /// Pipeline stage.
    pub stage: ShaderStage,
    /// Entry point function.
    pub entry_point: String,
    /// Debug label.
    pub label: Option<String>,
}

/// A snapshot of a live pipeline state's properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineInfo {
    /// Vertex shader it was built from.
    pub vertex_shader: ShaderHandle,
    /// Pixel shader it was built from.
    pub pixel_shader: ShaderHandle,
    /// Color target formats.
    pub render_target_formats: Vec<TextureFormat>,
    /// Stride of vertex slot data, per the max-offset rule.
    pub vertex_stride: u32,
    /// Debug label.
    pub label: Option<String>,
}

/// Live entry counts of each handle table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceStats {
    /// Live buffers.
    pub buffers: usize,
    /// Live textures, backbuffer wrappers included.
    pub textures: usize,
    /// Live shaders.
    pub shaders: usize,
    /// Live pipeline states.
    pub pipelines: usize,
    /// Live swapchains.
    pub swapchains: usize,
    /// Live fences.
    pub fences: usize,
}

impl DeviceStats {
    /// Sum over every table.
    pub fn total(&self) -> usize {
        self.buffers + self.textures + self.shaders + self.pipelines + self.swapchains + self.fences
    }
}

impl fmt::Display for DeviceStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} buffers, {} textures, {} shaders, {} pipelines, {} swapchains, {} fences",
            self.buffers, self.textures, self.shaders, self.pipelines, self.swapchains, self.fences
        )
    }
}

#[derive(Debug)]
struct DeviceInner<B: RhiBackend> {
    backend: B,
    config: DeviceConfig,
    adapter_info: AdapterInfo,
    buffers: HandleTable<BufferEntry<B>>,
    textures: HandleTable<TextureEntry<B>>,
    shaders: HandleTable<ShaderEntry<B>>,
    pipelines: HandleTable<PipelineEntry<B>>,
    swapchains: HandleTable<SwapchainEntry<B>>,
    fences: HandleTable<FenceEntry>,
    diagnostics: DiagnosticsBus,
}

/// A clonable, thread-safe handle to a graphics device and every resource it owns.
///
/// All operations take `&self`; each handle table sits behind its own lock.
/// Clones share the same tables, which is how command lists resolve handles
/// while recording.
#[derive(Debug)]
pub struct Device<B: RhiBackend> {
    inner: Arc<DeviceInner<B>>,
}

impl<B: RhiBackend> Clone for Device<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

fn owned_label(label: &Option<std::borrow::Cow<'_, str>>) -> Option<String> {
    label.as_ref().map(|l| l.to_string())
}

impl<B: RhiBackend> Device<B> {
    /// Wraps an initialized backend.
    pub fn new(backend: B, config: DeviceConfig) -> Self {
        let adapter_info = backend.adapter_info();
        log::info!(
            "Device: Created on '{}' ({}, {:?})",
            adapter_info.name,
            adapter_info.backend_type.api_name(),
            adapter_info.device_type
        );
        Self {
            inner: Arc::new(DeviceInner {
                backend,
                config,
                adapter_info,
                buffers: HandleTable::new(),
                textures: HandleTable::new(),
                shaders: HandleTable::new(),
                pipelines: HandleTable::new(),
                swapchains: HandleTable::new(),
                fences: HandleTable::new(),
                diagnostics: DiagnosticsBus::new(),
            }),
        }
    }

    /// Releases every resource in every table.
    ///
    /// Other clones (held by command lists) stay usable, but every handle they
    /// hold stops resolving.
    pub fn destroy(self) {
        let inner = &self.inner;
        let released = DeviceStats {
            buffers: inner.buffers.clear(),
            textures: inner.textures.clear(),
            shaders: inner.shaders.clear(),
            pipelines: inner.pipelines.clear(),
            swapchains: inner.swapchains.clear(),
            fences: inner.fences.clear(),
        };
        log::info!("Device: Destroyed '{}', released {}", inner.adapter_info.name, released);
    }

    /// The backend driving this device.
    pub fn backend(&self) -> &B {
        &self.inner.backend
    }

    /// The configuration the device was created with.
    pub fn config(&self) -> &DeviceConfig {
        &self.inner.config
    }

    /// The bus on which tolerated misuse is reported.
    pub fn diagnostics(&self) -> &DiagnosticsBus {
        &self.inner.diagnostics
    }

    /// The adapter the device runs on.
    pub fn adapter_info(&self) -> &AdapterInfo {
        &self.inner.adapter_info
    }

    /// The adapter's name.
    pub fn device_name(&self) -> &str {
        &self.inner.adapter_info.name
    }

    /// The name of the native graphics API.
    pub fn api_name(&self) -> &'static str {
        self.inner.adapter_info.backend_type.api_name()
    }

    /// Live entry counts per table.
    pub fn stats(&self) -> DeviceStats {
        let inner = &self.inner;
        DeviceStats {
            buffers: inner.buffers.len(),
            textures: inner.textures.len(),
            shaders: inner.shaders.len(),
            pipelines: inner.pipelines.len(),
            swapchains: inner.swapchains.len(),
            fences: inner.fences.len(),
        }
    }

    fn report(&self, kind: DiagnosticKind, message: impl Into<String>) {
        self.inner.diagnostics.report(DiagnosticSource::Device, kind, message);
    }

    // --- Buffers ---

    /// Creates a buffer, copying `initial_data` in when the buffer is CPU accessible.
    pub fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<BufferHandle, ResourceError> {
        if descriptor.size == 0 {
            return Err(ResourceError::InvalidDescriptor(
                "buffer size must be non-zero".to_string(),
            ));
        }
        if let Some(data) = descriptor.initial_data {
            if data.len() as u64 > descriptor.size {
                return Err(ResourceError::InvalidDescriptor(format!(
                    "{} bytes of initial data exceed the buffer size of {}",
                    data.len(),
                    descriptor.size
                )));
            }
        }

        let label = descriptor.label.as_deref();
        let cpu_accessible = descriptor.is_cpu_accessible();
        let raw = self.inner.backend.create_buffer(
            label,
            descriptor.size,
            descriptor.usage,
            descriptor.residency(),
        )?;
        if let (Some(data), true) = (descriptor.initial_data, cpu_accessible) {
            self.inner.backend.write_buffer(&raw, 0, data)?;
        }

        let handle = BufferHandle(self.inner.buffers.insert(BufferEntry {
            raw,
            size: descriptor.size,
            usage: descriptor.usage,
            stride: descriptor.stride,
            label: owned_label(&descriptor.label),
            cpu_accessible,
        }));
        log::debug!(
            "Device: Created buffer {} '{}' ({} bytes, {:?}).",
            handle,
            label.unwrap_or("unlabeled"),
            descriptor.size,
            descriptor.usage
        );
        Ok(handle)
    }

    /// Overwrites `data.len()` bytes of a CPU-accessible buffer starting at `offset`.
    pub fn upload_buffer_data(&self, handle: BufferHandle, data: &[u8], offset: u64) -> Result<(), ResourceError> {
        let Some(entry) = self.inner.buffers.get(handle.raw()) else {
            self.report(
                DiagnosticKind::InvalidHandle,
                format!("upload to unknown buffer {handle}"),
            );
            return Err(ResourceError::NotFound);
        };
        if !entry.cpu_accessible {
            self.report(
                DiagnosticKind::NotCpuAccessible,
                format!("buffer {handle} is not CPU accessible"),
            );
            return Err(ResourceError::NotCpuAccessible(handle));
        }
        let len = data.len() as u64;
        if offset.checked_add(len).is_none_or(|end| end > entry.size) {
            self.report(
                DiagnosticKind::OutOfBounds,
                format!("{len} bytes at offset {offset} exceed buffer {handle} of {} bytes", entry.size),
            );
            return Err(ResourceError::OutOfBounds {
                offset,
                size: len,
                capacity: entry.size,
            });
        }
        if data.is_empty() {
            return Ok(());
        }
        self.inner.backend.write_buffer(&entry.raw, offset, data)
    }

    /// Same contract as [`Self::upload_buffer_data`].
    pub fn update_buffer(&self, handle: BufferHandle, data: &[u8], offset: u64) -> Result<(), ResourceError> {
        self.upload_buffer_data(handle, data, offset)
    }

    /// Reads a byte range of a buffer back to the CPU.
    pub fn read_buffer_data(&self, handle: BufferHandle, offset: u64, size: u64) -> Result<Vec<u8>, ResourceError> {
        let Some(entry) = self.inner.buffers.get(handle.raw()) else {
            self.report(
                DiagnosticKind::InvalidHandle,
                format!("read from unknown buffer {handle}"),
            );
            return Err(ResourceError::NotFound);
        };
        if offset.checked_add(size).is_none_or(|end| end > entry.size) {
            self.report(
                DiagnosticKind::OutOfBounds,
                format!("read of {size} bytes at offset {offset} exceeds buffer {handle}"),
            );
            return Err(ResourceError::OutOfBounds {
                offset,
                size,
                capacity: entry.size,
            });
        }
        self.inner.backend.read_buffer(&entry.raw, offset, size)
    }

    /// Properties of a live buffer.
    pub fn buffer_info(&self, handle: BufferHandle) -> Option<BufferInfo> {
        self.inner.buffers.get(handle.raw()).map(|e| BufferInfo {
            size: e.size,
            usage: e.usage,
            stride: e.stride,
            cpu_accessible: e.cpu_accessible,
            label: e.label.clone(),
        })
    }

    /// Releases a buffer. Unknown handles are ignored.
    pub fn destroy_buffer(&self, handle: BufferHandle) {
        if self.inner.buffers.remove(handle.raw()).is_none() {
            log::debug!("Device: destroy_buffer ignored unknown handle {handle}.");
        }
    }

    // --- Textures ---

    /// Creates a texture. The dimension is derived from depth and array size.
    pub fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureHandle, ResourceError> {
        if descriptor.width == 0 || descriptor.height == 0 {
            return Err(ResourceError::InvalidDescriptor(format!(
                "texture extent {}x{} has a zero dimension",
                descriptor.width, descriptor.height
            )));
        }
        if descriptor.format == TextureFormat::Unknown {
            return Err(ResourceError::InvalidDescriptor(
                "texture format is Unknown".to_string(),
            ));
        }

        let dimension = descriptor.dimension();
        let raw = self.inner.backend.create_texture(descriptor, dimension)?;
        let handle = TextureHandle(self.inner.textures.insert(TextureEntry {
            raw,
            width: descriptor.width,
            height: descriptor.height,
            depth_or_array_layers: descriptor.depth_or_array_layers(),
            mip_levels: descriptor.mip_levels.max(1),
            format: descriptor.format,
            usage: descriptor.usage,
            dimension,
            label: owned_label(&descriptor.label),
            is_backbuffer: false,
        }));
        log::debug!(
            "Device: Created texture {} ({}x{}, {:?}, {:?}).",
            handle,
            descriptor.width,
            descriptor.height,
            descriptor.format,
            dimension
        );
        Ok(handle)
    }

    /// Replaces the full contents of one mip level of one slice.
    ///
    /// Rows are tightly packed: the row pitch is the mip width times the
    /// format's bytes per pixel.
    pub fn upload_texture_data(
        &self,
        handle: TextureHandle,
        data: &[u8],
        mip_level: u32,
        array_slice: u32,
    ) -> Result<(), ResourceError> {
        let Some(entry) = self.inner.textures.get(handle.raw()) else {
            self.report(
                DiagnosticKind::InvalidHandle,
                format!("upload to unknown texture {handle}"),
            );
            return Err(ResourceError::NotFound);
        };
        if entry.is_backbuffer {
            self.report(
                DiagnosticKind::InvalidState,
                format!("texture {handle} wraps a swapchain drawable and cannot be uploaded to"),
            );
            return Err(ResourceError::InvalidDescriptor(
                "swapchain backbuffers are render targets only".to_string(),
            ));
        }
        if mip_level >= entry.mip_levels {
            self.report(
                DiagnosticKind::OutOfBounds,
                format!("mip level {mip_level} of texture {handle} with {} levels", entry.mip_levels),
            );
            return Err(ResourceError::OutOfBounds {
                offset: u64::from(mip_level),
                size: 1,
                capacity: u64::from(entry.mip_levels),
            });
        }
        if array_slice >= entry.depth_or_array_layers {
            self.report(
                DiagnosticKind::OutOfBounds,
                format!(
                    "slice {array_slice} of texture {handle} with {} slices",
                    entry.depth_or_array_layers
                ),
            );
            return Err(ResourceError::OutOfBounds {
                offset: u64::from(array_slice),
                size: 1,
                capacity: u64::from(entry.depth_or_array_layers),
            });
        }

        let (width, height) = mip_extent(entry.width, entry.height, mip_level);
        let Some(bytes_per_row) = width.checked_mul(entry.format.bytes_per_pixel()) else {
            self.report(
                DiagnosticKind::OutOfBounds,
                format!(
                    "a row of {width} {:?} texels in texture {handle} exceeds u32::MAX bytes",
                    entry.format
                ),
            );
            return Err(ResourceError::OutOfBounds {
                offset: 0,
                size: u64::from(width) * u64::from(entry.format.bytes_per_pixel()),
                capacity: u64::from(u32::MAX),
            });
        };
        let region = TextureUploadRegion {
            mip_level,
            array_slice,
            width,
            height,
            bytes_per_row,
        };
        let required = region.byte_len();
        if (data.len() as u64) < required {
            self.report(
                DiagnosticKind::OutOfBounds,
                format!(
                    "texture {handle} mip {mip_level} needs {required} bytes, got {}",
                    data.len()
                ),
            );
            return Err(ResourceError::OutOfBounds {
                offset: 0,
                size: required,
                capacity: data.len() as u64,
            });
        }
        self.inner
            .backend
            .write_texture(&entry.raw, &data[..required as usize], &region)
    }

    /// Properties of a live texture.
    pub fn texture_info(&self, handle: TextureHandle) -> Option<TextureInfo> {
        self.inner.textures.get(handle.raw()).map(|e| TextureInfo {
            width: e.width,
            height: e.height,
            depth_or_array_layers: e.depth_or_array_layers,
            mip_levels: e.mip_levels,
            format: e.format,
            usage: e.usage,
            dimension: e.dimension,
            is_backbuffer: e.is_backbuffer,
            label: e.label.clone(),
        })
    }

    /// Releases a texture. Unknown handles are ignored.
    pub fn destroy_texture(&self, handle: TextureHandle) {
        if self.inner.textures.remove(handle.raw()).is_none() {
            log::debug!("Device: destroy_texture ignored unknown handle {handle}.");
        }
    }

    // --- Shaders ---

    /// Compiles a shader stage from source.
    pub fn create_shader(&self, descriptor: &ShaderDescriptor) -> Result<ShaderHandle, ResourceError> {
        let raw = self.inner.backend.create_shader(descriptor).inspect_err(|e| {
            log::error!("Device: {e}");
        })?;
        let handle = ShaderHandle(self.inner.shaders.insert(ShaderEntry {
            raw,
            stage: descriptor.stage,
            entry_point: descriptor.entry_point.to_string(),
            label: owned_label(&descriptor.label),
        }));
        log::debug!(
            "Device: Created {:?} shader {} '{}'.",
            descriptor.stage,
            handle,
            descriptor.display_name()
        );
        Ok(handle)
    }

    /// Properties of a live shader.
    pub fn shader_info(&self, handle: ShaderHandle) -> Option<ShaderInfo> {
        self.inner.shaders.get(handle.raw()).map(|e| ShaderInfo {
            stage: e.stage,
            entry_point: e.entry_point.clone(),
            label: e.label.clone(),
        })
    }

    /// Releases a shader. Pipelines built from it stay valid.
    pub fn destroy_shader(&self, handle: ShaderHandle) {
        if self.inner.shaders.remove(handle.raw()).is_none() {
            log::debug!("Device: destroy_shader ignored unknown handle {handle}.");
        }
    }

    // --- Pipeline states ---

    fn resolve_shader(
        &self,
        handle: ShaderHandle,
        expected_stage: ShaderStage,
        pipeline_label: Option<&str>,
    ) -> Result<Arc<ShaderEntry<B>>, PipelineError> {
        self.inner
            .shaders
            .get(handle.raw())
            .filter(|entry| entry.stage == expected_stage)
            .ok_or_else(|| PipelineError::InvalidShaderHandle {
                handle,
                expected_stage,
                pipeline_label: pipeline_label.map(str::to_string),
            })
    }

    /// Validates a graphics pipeline description and builds it.
    ///
    /// Nothing is registered when validation or the backend fails.
    pub fn create_graphics_pipeline_state(
        &self,
        descriptor: &GraphicsPipelineDescriptor,
    ) -> Result<PipelineStateHandle, ResourceError> {
        let label = descriptor.label.as_deref();
        let vertex = self.resolve_shader(descriptor.vertex_shader, ShaderStage::Vertex, label)?;
        let pixel = self.resolve_shader(descriptor.pixel_shader, ShaderStage::Pixel, label)?;

        let targets = &descriptor.render_target_formats;
        if targets.len() > MAX_RENDER_TARGETS {
            return Err(PipelineError::InvalidRenderTargets(format!(
                "{} color targets exceed the limit of {MAX_RENDER_TARGETS}",
                targets.len()
            ))
            .into());
        }
        if let Some(index) = targets.iter().position(|f| *f == TextureFormat::Unknown) {
            return Err(PipelineError::InvalidRenderTargets(format!(
                "color target {index} has an Unknown format"
            ))
            .into());
        }
        descriptor
            .vertex_layout
            .validate()
            .map_err(PipelineError::InvalidVertexLayout)?;

        let vertex_buffers = descriptor.vertex_layout.buffer_layouts();
        let vertex_stride = descriptor.vertex_layout.stride();
        let raw = self
            .inner
            .backend
            .create_render_pipeline(&RenderPipelineBuildInfo {
                label,
                vertex: ShaderStageRef {
                    module: &vertex.raw,
                    entry_point: &vertex.entry_point,
                },
                pixel: ShaderStageRef {
                    module: &pixel.raw,
                    entry_point: &pixel.entry_point,
                },
                vertex_buffers: &vertex_buffers,
                descriptor,
            })
            .inspect_err(|e| log::error!("Device: {e}"))?;

        let handle = PipelineStateHandle(self.inner.pipelines.insert(PipelineEntry {
            raw,
            vertex_shader: descriptor.vertex_shader,
            pixel_shader: descriptor.pixel_shader,
            render_target_formats: targets.clone(),
            vertex_stride,
            label: label.map(str::to_string),
        }));
        log::debug!(
            "Device: Created pipeline state {} '{}' (stride {}).",
            handle,
            label.unwrap_or("unlabeled"),
            vertex_stride
        );
        Ok(handle)
    }

    /// Compute pipelines are not supported; this always fails.
    pub fn create_compute_pipeline_state(
        &self,
        descriptor: &ComputePipelineDescriptor,
    ) -> Result<PipelineStateHandle, ResourceError> {
        self.report(
            DiagnosticKind::Unimplemented,
            format!(
                "compute pipeline '{}' requested; compute pipelines are not implemented",
                descriptor.label.as_deref().unwrap_or("unlabeled")
            ),
        );
        Err(PipelineError::Unimplemented("compute pipeline creation").into())
    }

    /// Properties of a live pipeline state.
    pub fn pipeline_info(&self, handle: PipelineStateHandle) -> Option<PipelineInfo> {
        self.inner.pipelines.get(handle.raw()).map(|e| PipelineInfo {
            vertex_shader: e.vertex_shader,
            pixel_shader: e.pixel_shader,
            render_target_formats: e.render_target_formats.clone(),
            vertex_stride: e.vertex_stride,
            label: e.label.clone(),
        })
    }

    /// Releases a pipeline state. Unknown handles are ignored.
    pub fn destroy_pipeline_state(&self, handle: PipelineStateHandle) {
        if self.inner.pipelines.remove(handle.raw()).is_none() {
            log::debug!("Device: destroy_pipeline_state ignored unknown handle {handle}.");
        }
    }

    // --- Swapchains ---

    /// Creates a presentation surface on a window. No drawable is acquired
    /// until the first [`Self::present`].
    pub fn create_swapchain(&self, descriptor: &SwapchainDescriptor) -> Result<SwapchainHandle, ResourceError> {
        let Some(window) = descriptor.window.as_ref() else {
            log::error!("Device: Swapchain window handle is null.");
            return Err(ResourceError::MissingWindowHandle);
        };
        if descriptor.width == 0 || descriptor.height == 0 {
            return Err(ResourceError::InvalidDescriptor(format!(
                "swapchain extent {}x{} has a zero dimension",
                descriptor.width, descriptor.height
            )));
        }
        let format = match descriptor.format {
            TextureFormat::Unknown => TextureFormat::PRESENTATION,
            format => format,
        };
        let config = SurfaceConfig {
            width: descriptor.width,
            height: descriptor.height,
            format,
            buffer_count: descriptor.buffer_count.clamp(2, FRAMES_IN_FLIGHT),
            vsync: descriptor.vsync,
        };
        let surface = self.inner.backend.create_surface(window, &config)?;
        let handle = SwapchainHandle(self.inner.swapchains.insert(SwapchainEntry {
            state: Mutex::new(SwapchainState {
                surface,
                config,
                drawable: None,
                drawable_lent: false,
                resize_pending: false,
            }),
            label: owned_label(&descriptor.label),
        }));
        log::info!(
            "Device: Created swapchain {} ({}x{}, {:?}).",
            handle,
            config.width,
            config.height,
            config.format
        );
        Ok(handle)
    }

    /// Reconfigures a swapchain's size. Zero sizes are ignored.
    ///
    /// While a command list holds the current drawable the surface cannot be
    /// reconfigured; the new size is recorded and applied by the next [`present`](Self::present).
    pub fn resize_swapchain(&self, handle: SwapchainHandle, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            log::warn!("Device: Ignoring resize of swapchain {handle} to {width}x{height}.");
            return false;
        }
        let Some(entry) = self.inner.swapchains.get(handle.raw()) else {
            log::debug!("Device: resize_swapchain on unknown handle {handle}.");
            return false;
        };
        let mut state = entry.lock();
        state.config.width = width;
        state.config.height = height;
        if state.drawable_lent {
            state.resize_pending = true;
            log::debug!("Device: Resize of swapchain {handle} to {width}x{height} deferred to the next present.");
            return true;
        }
        // A drawable of the old size must not survive the reconfigure.
        state.drawable = None;
        let config = state.config;
        self.inner.backend.configure_surface(&mut state.surface, &config);
        log::debug!("Device: Resized swapchain {handle} to {width}x{height}.");
        true
    }

    /// Presents a drawable still held by the swapchain, then acquires the next one.
    ///
    /// Returns `true` when a new drawable was acquired.
    pub fn present(&self, handle: SwapchainHandle) -> bool {
        let Some(entry) = self.inner.swapchains.get(handle.raw()) else {
            log::debug!("Device: present on unknown swapchain {handle}.");
            return false;
        };
        let mut state = entry.lock();
        if let Some(pending) = state.drawable.take() {
            self.inner.backend.present(pending);
        }
        // The lent drawable was submitted with its frame by now.
        state.drawable_lent = false;
        if std::mem::take(&mut state.resize_pending) {
            let config = state.config;
            self.inner.backend.configure_surface(&mut state.surface, &config);
            log::debug!(
                "Device: Applied deferred resize of swapchain {handle} to {}x{}.",
                config.width,
                config.height
            );
        }
        match self.inner.backend.acquire_drawable(&state.surface) {
            Ok(drawable) => {
                state.drawable = Some(drawable);
                true
            }
            Err(e) => {
                self.report(DiagnosticKind::Backend, format!("swapchain {handle}: {e}"));
                false
            }
        }
    }

    /// Wraps the current drawable's texture as a new texture entry.
    ///
    /// Each call registers a fresh handle; the caller destroys it once the frame is done.
    pub fn get_swapchain_backbuffer(&self, handle: SwapchainHandle) -> TextureHandle {
        let Some(entry) = self.inner.swapchains.get(handle.raw()) else {
            self.report(DiagnosticKind::InvalidHandle, format!("unknown swapchain {handle}"));
            return TextureHandle::NULL;
        };
        let state = entry.lock();
        let Some(drawable) = state.drawable.as_ref() else {
            self.report(
                DiagnosticKind::InvalidState,
                format!("no current drawable for swapchain {handle}"),
            );
            return TextureHandle::NULL;
        };
        let raw = self.inner.backend.drawable_texture(drawable);
        let texture = TextureHandle(self.inner.textures.insert(TextureEntry {
            raw,
            width: state.config.width,
            height: state.config.height,
            depth_or_array_layers: 1,
            mip_levels: 1,
            format: TextureFormat::PRESENTATION,
            usage: TextureUsage::RENDER_TARGET,
            dimension: TextureDimension::D2,
            label: entry.label.clone(),
            is_backbuffer: true,
        }));
        log::debug!("Device: Wrapped backbuffer of swapchain {handle} as {texture}.");
        texture
    }

    /// Always 0: drawables are not indexed.
    pub fn get_swapchain_current_index(&self, _handle: SwapchainHandle) -> u32 {
        0
    }

    /// Takes the current drawable out of the swapchain so a command list can
    /// render to and present it.
    pub fn get_swapchain_drawable(&self, handle: SwapchainHandle) -> Option<B::Drawable> {
        let entry = self.inner.swapchains.get(handle.raw())?;
        let mut state = entry.lock();
        let drawable = state.drawable.take();
        state.drawable_lent |= drawable.is_some();
        drawable
    }

    /// The configured size of a swapchain.
    pub fn swapchain_extent(&self, handle: SwapchainHandle) -> Option<(u32, u32)> {
        let entry = self.inner.swapchains.get(handle.raw())?;
        let state = entry.lock();
        Some((state.config.width, state.config.height))
    }

    /// Releases a swapchain and any drawable it still holds.
    pub fn destroy_swapchain(&self, handle: SwapchainHandle) {
        if self.inner.swapchains.remove(handle.raw()).is_none() {
            log::debug!("Device: destroy_swapchain ignored unknown handle {handle}.");
        }
    }

    // --- Fences ---

    /// Creates a fence holding `initial_value`.
    pub fn create_fence(&self, initial_value: u64) -> FenceHandle {
        FenceHandle(self.inner.fences.insert(FenceEntry {
            value: Arc::new(AtomicU64::new(initial_value)),
        }))
    }

    /// Releases a fence. Unknown handles are ignored.
    pub fn destroy_fence(&self, handle: FenceHandle) {
        if self.inner.fences.remove(handle.raw()).is_none() {
            log::debug!("Device: destroy_fence ignored unknown handle {handle}.");
        }
    }

    /// Sets a fence's value from the CPU.
    pub fn signal_fence(&self, handle: FenceHandle, value: u64) {
        match self.inner.fences.get(handle.raw()) {
            Some(fence) => fence.value.store(value, Ordering::Release),
            None => self.report(DiagnosticKind::InvalidHandle, format!("signal of unknown fence {handle}")),
        }
    }

    /// A fence's current value, or 0 for an unknown fence.
    pub fn get_fence_value(&self, handle: FenceHandle) -> u64 {
        self.inner
            .fences
            .get(handle.raw())
            .map_or(0, |fence| fence.value.load(Ordering::Acquire))
    }

    /// Whether a fence has reached `value`. Unknown fences never have.
    pub fn is_fence_complete(&self, handle: FenceHandle, value: u64) -> bool {
        self.inner
            .fences
            .get(handle.raw())
            .is_some_and(|fence| fence.value.load(Ordering::Acquire) >= value)
    }

    /// Blocks until a fence reaches `value`, by draining the queue if needed.
    pub fn wait_for_fence(&self, handle: FenceHandle, value: u64) -> bool {
        let Some(fence) = self.inner.fences.get(handle.raw()) else {
            self.report(DiagnosticKind::InvalidHandle, format!("wait on unknown fence {handle}"));
            return false;
        };
        if fence.value.load(Ordering::Acquire) >= value {
            return true;
        }
        if let Err(e) = self.inner.backend.wait_idle() {
            self.report(DiagnosticKind::Backend, format!("wait on fence {handle}: {e}"));
            return false;
        }
        let reached = fence.value.load(Ordering::Acquire) >= value;
        if !reached {
            self.report(
                DiagnosticKind::InvalidState,
                format!(
                    "fence {handle} is at {} after the queue drained; {value} will not be signalled by pending work",
                    fence.value.load(Ordering::Acquire)
                ),
            );
        }
        reached
    }

    /// Blocks until every submission has completed.
    pub fn wait_for_idle(&self) {
        if let Err(e) = self.inner.backend.wait_idle() {
            self.report(DiagnosticKind::Backend, format!("wait for idle: {e}"));
        }
    }

    // --- State transitions ---

    /// Declares a texture state transition. Both backends track state
    /// implicitly, so this only validates the handle.
    pub fn transition_texture(&self, handle: TextureHandle, before: ResourceState, after: ResourceState) {
        if !self.inner.textures.contains(handle.raw()) {
            self.report(DiagnosticKind::InvalidHandle, format!("transition of unknown texture {handle}"));
            return;
        }
        log::trace!("Device: Texture {handle} {before:?} -> {after:?}.");
    }

    /// Declares a buffer state transition. See [`Self::transition_texture`].
    pub fn transition_buffer(&self, handle: BufferHandle, before: ResourceState, after: ResourceState) {
        if !self.inner.buffers.contains(handle.raw()) {
            self.report(DiagnosticKind::InvalidHandle, format!("transition of unknown buffer {handle}"));
            return;
        }
        log::trace!("Device: Buffer {handle} {before:?} -> {after:?}.");
    }

    // --- Command lists ---

    /// Creates a command list and begins recording on it.
    pub fn begin_command_list(&self) -> CommandList<B> {
        let mut list = CommandList::new(self.clone());
        list.begin();
        list
    }

    /// Ends any open pass, commits the list and presents its drawable.
    pub fn submit_command_list(&self, list: &mut CommandList<B>) {
        list.close();
    }

    /// Like [`Self::submit_command_list`], and sets `fence` to `value` once the
    /// GPU has finished the submission.
    pub fn submit_command_list_with_fence(&self, list: &mut CommandList<B>, fence: FenceHandle, value: u64) {
        let Some(entry) = self.inner.fences.get(fence.raw()) else {
            self.report(
                DiagnosticKind::InvalidHandle,
                format!("submission gated on unknown fence {fence}; submitting without it"),
            );
            list.close();
            return;
        };
        let counter = Arc::clone(&entry.value);
        list.close_with(Some(Box::new(move || {
            counter.store(value, Ordering::Release);
        })));
    }

    // --- Resolution for command lists ---

    pub(crate) fn buffer_entry(&self, handle: BufferHandle) -> Option<Arc<BufferEntry<B>>> {
        self.inner.buffers.get(handle.raw())
    }

    pub(crate) fn texture_entry(&self, handle: TextureHandle) -> Option<Arc<TextureEntry<B>>> {
        self.inner.textures.get(handle.raw())
    }

    pub(crate) fn pipeline_entry(&self, handle: PipelineStateHandle) -> Option<Arc<PipelineEntry<B>>> {
        self.inner.pipelines.get(handle.raw())
    }
}
