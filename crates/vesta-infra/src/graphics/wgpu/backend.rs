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

use anyhow::Context;
use super::conversions::{backend_from_wgpu, device_type_from_wgpu, format_from_wgpu, IntoWgpu};
use super::encoder::WgpuRenderEncoder;
use crate::graphics::shader::{validate_wgsl, ShaderBinding};
use std::borrow::Cow;
use std::sync::Arc;
use vesta_core::config::DeviceConfig;
use vesta_core::platform::NativeWindow;
use vesta_core::rhi::*;
use wgpu::SurfaceTargetUnsafe;

/// Features enabled when the adapter offers them.
const OPTIONAL_FEATURES: wgpu::Features = wgpu::Features::TEXTURE_COMPRESSION_BC
    .union(wgpu::Features::TEXTURE_FORMAT_16BIT_NORM)
    .union(wgpu::Features::DEPTH32FLOAT_STENCIL8)
    .union(wgpu::Features::POLYGON_MODE_LINE)
    .union(wgpu::Features::DEPTH_CLIP_CONTROL);

/// A WGPU buffer and the size it was requested with.
#[derive(Debug)]
pub struct WgpuBuffer {
    pub(crate) raw: wgpu::Buffer,
    size: u64,
}

impl WgpuBuffer {
    /// The requested size; the allocation may be padded to the copy alignment.
    pub fn size(&self) -> u64 {
        self.size
    }
}

/// A compiled shader module and the bindings its entry point uses.
#[derive(Debug)]
pub struct WgpuShader {
    module: wgpu::ShaderModule,
    bindings: Vec<ShaderBinding>,
}

/// A render pipeline and the union of its stages' bindings.
#[derive(Debug)]
pub struct WgpuPipeline {
    pub(crate) raw: wgpu::RenderPipeline,
    pub(crate) bindings: Arc<[ShaderBinding]>,
}

/// A configured surface. Holds the window so it outlives the surface.
#[derive(Debug)]
pub struct WgpuSurface {
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    _window: NativeWindow,
}

/// A command encoder being recorded.
#[derive(Debug)]
pub struct WgpuCommandBuffer {
    encoder: wgpu::CommandEncoder,
}

/// The WGPU implementation of [`RhiBackend`].
///
/// One adapter, one logical device and its queue. Presentation surfaces are
/// created on demand for each swapchain.
#[derive(Debug)]
pub struct WgpuBackend {
    instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
    info: AdapterInfo,
    sampler: wgpu::Sampler,
}

async fn request_device(adapter: &wgpu::Adapter) -> anyhow::Result<(wgpu::Device, wgpu::Queue)> {
    let features = adapter.features() & OPTIONAL_FEATURES;
    adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("Vesta Logical Device"),
            required_features: features,
            required_limits: wgpu::Limits::default(),
            experimental_features: wgpu::ExperimentalFeatures::default(),
            memory_hints: wgpu::MemoryHints::default(),
            trace: wgpu::Trace::default(),
        })
        .await
        .with_context(|| format!("Failed to create logical device with features {features:?}"))
}

impl WgpuBackend {
    /// Selects an adapter and opens a logical device according to `config`.
    pub fn new(config: &DeviceConfig) -> Result<Self, RhiError> {
        pollster::block_on(Self::new_async(config))
    }

    async fn new_async(config: &DeviceConfig) -> Result<Self, RhiError> {
        log::info!(
            "Initializing WGPU backend for '{}' (requested backend: {:?})...",
            config.application_name,
            config.backend
        );

        let mut instance_descriptor = wgpu::InstanceDescriptor::new_without_display_handle();
        instance_descriptor.backends = config.backend.into_wgpu();
        if config.enable_validation {
            instance_descriptor.flags |= wgpu::InstanceFlags::VALIDATION;
        }
        if config.enable_debug_layer {
            instance_descriptor.flags |= wgpu::InstanceFlags::DEBUG;
        }
        if config.enable_gpu_validation {
            instance_descriptor.flags |= wgpu::InstanceFlags::GPU_BASED_VALIDATION;
        }
        let instance = wgpu::Instance::new(instance_descriptor);

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: config.power_preference.into_wgpu(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| RhiError::NoCompatibleAdapter(e.to_string()))?;

        let adapter_info = adapter.get_info();
        log::info!(
            "Using graphics adapter: \"{}\" (Backend: {:?}, Type: {:?})",
            adapter_info.name,
            adapter_info.backend,
            adapter_info.device_type
        );

        let (device, queue) = request_device(&adapter)
            .await
            .map_err(|e| RhiError::InitializationFailed(format!("{e:#}")))?;

        device.on_uncaptured_error(Arc::new(|e| {
            log::error!("WGPU Uncaptured Error: {e:?}");
        }));
        log::debug!("Active device features: {:?}", device.features());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Vesta Default Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let info = AdapterInfo {
            name: adapter_info.name,
            backend_type: backend_from_wgpu(adapter_info.backend),
            device_type: device_type_from_wgpu(adapter_info.device_type),
        };

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
            info,
            sampler,
        })
    }

    /// The logical device, for interop with code that talks to WGPU directly.
    pub fn wgpu_device(&self) -> &wgpu::Device {
        &self.device
    }

    /// The submission queue.
    pub fn wgpu_queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Processes finished work without blocking, running pending completion callbacks.
    fn poll(&self) {
        if let Err(e) = self.device.poll(wgpu::PollType::Poll) {
            log::warn!("WgpuBackend: non-blocking poll failed: {e}");
        }
    }

    /// Runs `create` inside a validation error scope, so a rejected object
    /// comes back as an error instead of reaching the uncaptured-error handler.
    fn validated<T>(&self, create: impl FnOnce() -> T) -> Result<T, wgpu::Error> {
        let scope = self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = create();
        match pollster::block_on(scope.pop()) {
            Some(error) => Err(error),
            None => Ok(value),
        }
    }

    /// Copies an aligned range of `src` into a mappable buffer and reads it back.
    fn read_aligned(&self, src: &wgpu::Buffer, start: u64, len: u64) -> Result<Vec<u8>, ResourceError> {
        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Vesta Readback"),
            size: len,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Vesta Readback"),
            });
        encoder.copy_buffer_to_buffer(src, start, &staging, 0, len);
        self.queue.submit(std::iter::once(encoder.finish()));

        let (sender, receiver) = flume::bounded(1);
        staging.slice(..).map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| ResourceError::BackendError(format!("Device poll failed during read-back: {e}")))?;
        receiver
            .recv()
            .map_err(|e| ResourceError::BackendError(format!("Read-back callback dropped: {e}")))?
            .map_err(|e| ResourceError::BackendError(format!("WGPU map_async failed: {e}")))?;

        let data = staging.slice(..).get_mapped_range().to_vec();
        staging.unmap();
        Ok(data)
    }

    fn surface_configuration(&self, surface: &wgpu::Surface<'static>, config: &SurfaceConfig) -> wgpu::SurfaceConfiguration {
        let caps = surface.get_capabilities(&self.adapter);
        let requested: Option<wgpu::TextureFormat> = config.format.into_wgpu();
        let format = requested
            .filter(|f| caps.formats.contains(f))
            .or_else(|| caps.formats.iter().copied().find(|f| !f.is_srgb()))
            .or_else(|| caps.formats.first().copied())
            .unwrap_or(wgpu::TextureFormat::Bgra8Unorm);
        if requested != Some(format) {
            log::warn!(
                "WgpuBackend: surface does not support {:?}, presenting in {:?} instead.",
                config.format,
                format_from_wgpu(format)
            );
        }

        let present_mode = if config.vsync {
            // Fifo is guaranteed to be supported.
            wgpu::PresentMode::Fifo
        } else {
            caps.present_modes
                .iter()
                .copied()
                .find(|m| matches!(m, wgpu::PresentMode::Mailbox | wgpu::PresentMode::Immediate))
                .unwrap_or(wgpu::PresentMode::Fifo)
        };

        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: config.width.max(1),
            height: config.height.max(1),
            present_mode,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: config.buffer_count.saturating_sub(1).max(1),
        }
    }

    fn vertex_attributes(layout: &VertexBufferLayout) -> Result<Vec<wgpu::VertexAttribute>, PipelineError> {
        layout
            .attributes
            .iter()
            .map(|(location, element)| {
                let format: Option<wgpu::VertexFormat> = element.format.into_wgpu();
                let format = format.ok_or_else(|| {
                    PipelineError::InvalidVertexLayout(format!(
                        "'{}' uses {:?}, which is not a vertex format",
                        element.semantic_name, element.format
                    ))
                })?;
                Ok(wgpu::VertexAttribute {
                    format,
                    offset: u64::from(element.aligned_byte_offset),
                    shader_location: *location,
                })
            })
            .collect()
    }
}

impl RhiBackend for WgpuBackend {
    type Buffer = WgpuBuffer;
    type Texture = wgpu::Texture;
    type Shader = WgpuShader;
    type Pipeline = WgpuPipeline;
    type Surface = WgpuSurface;
    type Drawable = wgpu::SurfaceTexture;
    type CommandBuffer = WgpuCommandBuffer;
    type Encoder = WgpuRenderEncoder;

    fn adapter_info(&self) -> AdapterInfo {
        self.info.clone()
    }

    fn create_buffer(
        &self,
        label: Option<&str>,
        size: u64,
        usage: BufferUsage,
        residency: MemoryResidency,
    ) -> Result<WgpuBuffer, ResourceError> {
        let padded = size.next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT);
        let max = self.device.limits().max_buffer_size;
        if padded > max {
            return Err(ResourceError::BackendError(format!(
                "Buffer of {size} bytes exceeds the device limit of {max}"
            )));
        }
        log::trace!("WgpuBackend: creating {residency:?} buffer {label:?} of {size} bytes");
        let raw = self
            .validated(|| {
                self.device.create_buffer(&wgpu::BufferDescriptor {
                    label,
                    size: padded,
                    usage: usage.into_wgpu(),
                    mapped_at_creation: false,
                })
            })
            .map_err(|e| ResourceError::BackendError(format!("buffer {label:?} rejected: {e}")))?;
        Ok(WgpuBuffer { raw, size })
    }

    fn write_buffer(&self, buffer: &WgpuBuffer, offset: u64, data: &[u8]) -> Result<(), ResourceError> {
        let align = wgpu::COPY_BUFFER_ALIGNMENT;
        let end = offset + data.len() as u64;
        let aligned_start = offset - offset % align;
        let aligned_end = end.next_multiple_of(align);
        if aligned_start == offset && aligned_end == end {
            self.queue.write_buffer(&buffer.raw, offset, data);
            return Ok(());
        }

        // Unaligned ranges are patched into the surrounding aligned words.
        let mut staged = self.read_aligned(&buffer.raw, aligned_start, aligned_end - aligned_start)?;
        let at = (offset - aligned_start) as usize;
        staged[at..at + data.len()].copy_from_slice(data);
        self.queue.write_buffer(&buffer.raw, aligned_start, &staged);
        Ok(())
    }

    fn read_buffer(&self, buffer: &WgpuBuffer, offset: u64, size: u64) -> Result<Vec<u8>, ResourceError> {
        if size == 0 {
            return Ok(Vec::new());
        }
        let align = wgpu::COPY_BUFFER_ALIGNMENT;
        let aligned_start = offset - offset % align;
        let aligned_end = (offset + size).next_multiple_of(align);
        let staged = self.read_aligned(&buffer.raw, aligned_start, aligned_end - aligned_start)?;
        let at = (offset - aligned_start) as usize;
        Ok(staged[at..at + size as usize].to_vec())
    }

    fn create_texture(
        &self,
        descriptor: &TextureDescriptor,
        dimension: TextureDimension,
    ) -> Result<wgpu::Texture, ResourceError> {
        let format: Option<wgpu::TextureFormat> = descriptor.format.into_wgpu();
        let format = format.ok_or(ResourceError::UnsupportedFormat(descriptor.format))?;
        let required = format.required_features();
        if !self.device.features().contains(required) {
            log::warn!(
                "WgpuBackend: {:?} needs features {required:?} the device does not have.",
                descriptor.format
            );
            return Err(ResourceError::UnsupportedFormat(descriptor.format));
        }

        self.validated(|| {
            self.device.create_texture(&wgpu::TextureDescriptor {
                label: descriptor.label.as_deref(),
                size: wgpu::Extent3d {
                    width: descriptor.width,
                    height: descriptor.height,
                    depth_or_array_layers: descriptor.depth_or_array_layers(),
                },
                mip_level_count: descriptor.mip_levels.max(1),
                sample_count: 1,
                dimension: dimension.into_wgpu(),
                format,
                usage: descriptor.usage.into_wgpu(),
                view_formats: &[],
            })
        })
        .map_err(|e| {
            ResourceError::BackendError(format!(
                "texture {:?} rejected: {e}",
                descriptor.label.as_deref().unwrap_or("<unnamed>")
            ))
        })
    }

    fn write_texture(
        &self,
        texture: &wgpu::Texture,
        data: &[u8],
        region: &TextureUploadRegion,
    ) -> Result<(), ResourceError> {
        let format = texture.format();
        let (block_width, block_height) = format.block_dimensions();

        // Block-compressed rows are measured in blocks, not texels.
        let (bytes_per_row, rows, extent) = if (block_width, block_height) == (1, 1) {
            (region.bytes_per_row, region.height, (region.width, region.height))
        } else {
            let blocks_wide = region.width.div_ceil(block_width);
            let blocks_high = region.height.div_ceil(block_height);
            let block_size = format.block_copy_size(None).unwrap_or(16);
            let row = blocks_wide.checked_mul(block_size).ok_or(ResourceError::OutOfBounds {
                offset: 0,
                size: u64::from(blocks_wide) * u64::from(block_size),
                capacity: u64::from(u32::MAX),
            })?;
            (
                row,
                blocks_high,
                (blocks_wide * block_width, blocks_high * block_height),
            )
        };

        let needed = u64::from(bytes_per_row) * u64::from(rows);
        if (data.len() as u64) < needed {
            return Err(ResourceError::OutOfBounds {
                offset: 0,
                size: needed,
                capacity: data.len() as u64,
            });
        }

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: region.mip_level,
                origin: wgpu::Origin3d {
                    x: 0,
                    y: 0,
                    z: region.array_slice,
                },
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(rows),
            },
            wgpu::Extent3d {
                width: extent.0,
                height: extent.1,
                depth_or_array_layers: 1,
            },
        );
        Ok(())
    }

    fn create_shader(&self, descriptor: &ShaderDescriptor) -> Result<WgpuShader, ShaderError> {
        let validated = validate_wgsl(descriptor)?;
        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: descriptor.label.as_deref(),
            source: wgpu::ShaderSource::Wgsl(Cow::Owned(descriptor.source.to_string())),
        });
        Ok(WgpuShader {
            module,
            bindings: validated.bindings,
        })
    }

    fn create_render_pipeline(
        &self,
        info: &RenderPipelineBuildInfo<'_, WgpuShader>,
    ) -> Result<WgpuPipeline, PipelineError> {
        let descriptor = info.descriptor;
        let rasterizer = &descriptor.rasterizer;

        // WGPU addresses vertex buffers by their index in this list, so
        // unused slots below the highest one get an empty layout.
        let attributes = info
            .vertex_buffers
            .iter()
            .map(Self::vertex_attributes)
            .collect::<Result<Vec<_>, _>>()?;
        let slot_count = info
            .vertex_buffers
            .iter()
            .map(|l| l.input_slot + 1)
            .max()
            .unwrap_or(0);
        let buffers: Vec<wgpu::VertexBufferLayout> = (0..slot_count)
            .map(|slot| {
                match info.vertex_buffers.iter().position(|l| l.input_slot == slot) {
                    Some(i) => wgpu::VertexBufferLayout {
                        array_stride: u64::from(info.vertex_buffers[i].stride),
                        step_mode: info.vertex_buffers[i].classification.into_wgpu(),
                        attributes: &attributes[i],
                    },
                    None => wgpu::VertexBufferLayout {
                        array_stride: 0,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &[],
                    },
                }
            })
            .collect();

        let targets: Vec<Option<wgpu::ColorTargetState>> = descriptor
            .render_target_formats
            .iter()
            .enumerate()
            .map(|(i, format)| {
                let wgpu_format: Option<wgpu::TextureFormat> = format.into_wgpu();
                wgpu_format
                    .map(|f| (f, descriptor.blend.target(i)).into_wgpu())
                    .ok_or_else(|| PipelineError::InvalidRenderTargets(format!("target {i} has format {format:?}")))
                    .map(Some)
            })
            .collect::<Result<_, _>>()?;

        let depth_stencil = if descriptor.depth_stencil_format == TextureFormat::Unknown {
            None
        } else {
            let format: Option<wgpu::TextureFormat> = descriptor.depth_stencil_format.into_wgpu();
            let format = format
                .filter(|f| f.is_depth_stencil_format())
                .ok_or_else(|| {
                    PipelineError::InvalidRenderTargets(format!(
                        "{:?} is not a depth format",
                        descriptor.depth_stencil_format
                    ))
                })?;
            let ds = &descriptor.depth_stencil;
            Some(wgpu::DepthStencilState {
                format,
                depth_write_enabled: Some(ds.depth_enable && ds.depth_write_enable),
                depth_compare: Some(if ds.depth_enable {
                    ds.depth_func.into_wgpu()
                } else {
                    wgpu::CompareFunction::Always
                }),
                stencil: wgpu::StencilState {
                    front: wgpu::StencilFaceState::IGNORE,
                    back: wgpu::StencilFaceState::IGNORE,
                    read_mask: u32::from(ds.stencil_read_mask),
                    write_mask: u32::from(ds.stencil_write_mask),
                },
                bias: wgpu::DepthBiasState {
                    constant: rasterizer.depth_bias,
                    slope_scale: rasterizer.slope_scaled_depth_bias,
                    clamp: rasterizer.depth_bias_clamp,
                },
            })
        };

        let features = self.device.features();
        let polygon_mode = if features.contains(wgpu::Features::POLYGON_MODE_LINE) {
            rasterizer.fill_mode.into_wgpu()
        } else {
            wgpu::PolygonMode::Fill
        };
        let primitive = wgpu::PrimitiveState {
            topology: descriptor.topology.into_wgpu(),
            strip_index_format: None,
            front_face: if rasterizer.front_counter_clockwise {
                wgpu::FrontFace::Ccw
            } else {
                wgpu::FrontFace::Cw
            },
            cull_mode: rasterizer.cull_mode.into_wgpu(),
            polygon_mode,
            unclipped_depth: !rasterizer.depth_clip_enable
                && features.contains(wgpu::Features::DEPTH_CLIP_CONTROL),
            conservative: false,
        };

        let mut bindings = info.vertex.module.bindings.clone();
        for binding in &info.pixel.module.bindings {
            if !bindings.contains(binding) {
                bindings.push(*binding);
            }
        }

        // An automatic layout lets the encoder fetch bind group layouts from
        // the pipeline itself.
        let raw = self.validated(|| {
            self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: info.label,
                layout: None,
                vertex: wgpu::VertexState {
                    module: &info.vertex.module.module,
                    entry_point: Some(info.vertex.entry_point),
                    buffers: &buffers,
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &info.pixel.module.module,
                    entry_point: Some(info.pixel.entry_point),
                    targets: &targets,
                    compilation_options: Default::default(),
                }),
                primitive,
                depth_stencil,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        });
        let raw = raw.map_err(|e| PipelineError::CompilationFailed {
            label: info.label.map(str::to_owned),
            details: e.to_string(),
        })?;

        Ok(WgpuPipeline {
            raw,
            bindings: bindings.into(),
        })
    }

    fn create_surface(&self, window: &NativeWindow, config: &SurfaceConfig) -> Result<WgpuSurface, ResourceError> {
        // SAFETY: the surface keeps a clone of the window, which keeps the
        // native handles alive for the surface's whole lifetime.
        let target = unsafe {
            SurfaceTargetUnsafe::from_window(window)
                .map_err(|e| ResourceError::BackendError(format!("Failed to create surface target: {e}")))?
        };
        let surface = unsafe { self.instance.create_surface_unsafe(target) }
            .map_err(|e| ResourceError::BackendError(format!("Failed to create surface: {e}")))?;

        let wgpu_config = self.surface_configuration(&surface, config);
        surface.configure(&self.device, &wgpu_config);
        log::debug!(
            "WgpuBackend: surface configured ({}x{}, {:?}, {:?})",
            wgpu_config.width,
            wgpu_config.height,
            wgpu_config.format,
            wgpu_config.present_mode
        );

        Ok(WgpuSurface {
            surface,
            config: wgpu_config,
            _window: window.clone(),
        })
    }

    fn configure_surface(&self, surface: &mut WgpuSurface, config: &SurfaceConfig) {
        surface.config = self.surface_configuration(&surface.surface, config);
        surface.surface.configure(&self.device, &surface.config);
    }

    fn acquire_drawable(&self, surface: &WgpuSurface) -> Result<wgpu::SurfaceTexture, RhiError> {
        use wgpu::CurrentSurfaceTexture as Current;

        self.poll();
        let current = match surface.surface.get_current_texture() {
            status @ (Current::Lost | Current::Outdated) => {
                log::warn!("WgpuBackend: surface {status:?}, reconfiguring.");
                surface.surface.configure(&self.device, &surface.config);
                surface.surface.get_current_texture()
            }
            current => current,
        };
        match current {
            Current::Success(texture) => Ok(texture),
            Current::Suboptimal(texture) => {
                log::debug!("WgpuBackend: drawable is suboptimal for the surface.");
                Ok(texture)
            }
            status => Err(RhiError::SurfaceAcquisitionFailed(format!("{status:?}"))),
        }
    }

    fn drawable_texture(&self, drawable: &wgpu::SurfaceTexture) -> wgpu::Texture {
        drawable.texture.clone()
    }

    fn present(&self, drawable: wgpu::SurfaceTexture) {
        drawable.present();
    }

    fn create_command_buffer(&self, label: Option<&str>) -> WgpuCommandBuffer {
        WgpuCommandBuffer {
            encoder: self
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor { label }),
        }
    }

    fn begin_render_pass(
        &self,
        command_buffer: &mut WgpuCommandBuffer,
        descriptor: &RenderPassDescriptor<'_, wgpu::Texture>,
    ) -> WgpuRenderEncoder {
        let target = descriptor.color_target;
        let view = target.create_view(&wgpu::TextureViewDescriptor::default());
        let color_attachments = [Some(wgpu::RenderPassColorAttachment {
            view: &view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: descriptor.color_ops.load.into_wgpu(),
                store: descriptor.color_ops.store.into_wgpu(),
            },
            depth_slice: None,
        })];

        let pass = command_buffer
            .encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: descriptor.label,
                color_attachments: &color_attachments,
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            })
            .forget_lifetime();

        WgpuRenderEncoder::new(
            pass,
            self.device.clone(),
            self.sampler.clone(),
            (target.width(), target.height()),
        )
    }

    fn end_render_pass(&self, _command_buffer: &mut WgpuCommandBuffer, encoder: WgpuRenderEncoder) {
        // Dropping the pass ends it and unlocks the encoder.
        drop(encoder);
    }

    fn submit(
        &self,
        command_buffer: WgpuCommandBuffer,
        drawable: Option<wgpu::SurfaceTexture>,
        on_complete: Option<CompletionCallback>,
    ) {
        self.queue.submit(std::iter::once(command_buffer.encoder.finish()));
        if let Some(callback) = on_complete {
            self.queue.on_submitted_work_done(callback);
        }
        if let Some(drawable) = drawable {
            drawable.present();
        }
        self.poll();
    }

    fn wait_idle(&self) -> Result<(), RhiError> {
        // Waits for the queue to be empty and runs every `on_submitted_work_done` callback.
        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .map(|_| ())
            .map_err(|e| {
                log::error!("WgpuBackend: device poll failed: {e}");
                RhiError::DeviceLost
            })
    }
}
