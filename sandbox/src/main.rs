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

//! Opens a window and draws a triangle every frame through the WGPU backend.
//!
//! Usage: `sandbox [config.json]`. `VESTA_BACKEND` and `VESTA_VALIDATION`
//! override the configuration.

use anyhow::Context;
use bytemuck::{Pod, Zeroable};
use std::sync::Arc;
use vesta_core::platform::NativeWindow;
use vesta_core::rhi::*;
use vesta_core::DeviceConfig;
use vesta_infra::WgpuBackend;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

const SHADER: &str = r#"
    struct VertexOutput {
        @builtin(position) position: vec4<f32>,
        @location(0) color: vec4<f32>,
    }

    @vertex
    fn vs_main(@location(0) position: vec2<f32>, @location(1) color: vec4<f32>) -> VertexOutput {
        var out: VertexOutput;
        out.position = vec4<f32>(position, 0.0, 1.0);
        out.color = color;
        return out;
    }

    @fragment
    fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
        return in.color;
    }
"#;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct Vertex {
    position: [f32; 2],
    color: [f32; 4],
}

const TRIANGLE: [Vertex; 3] = [
    Vertex {
        position: [0.0, 0.6],
        color: [1.0, 0.2, 0.2, 1.0],
    },
    Vertex {
        position: [-0.6, -0.6],
        color: [0.2, 1.0, 0.2, 1.0],
    },
    Vertex {
        position: [0.6, -0.6],
        color: [0.2, 0.2, 1.0, 1.0],
    },
];

const CLEAR: ClearColor = ClearColor::new(0.05, 0.05, 0.08, 1.0);

/// Everything that only exists while the window does.
struct Renderer {
    window: Arc<Window>,
    device: Device<WgpuBackend>,
    lists: CommandListPool<WgpuBackend>,
    pacer: FramePacer<WgpuBackend>,
    pipelines: PipelineCache<WgpuBackend>,
    swapchain: SwapchainHandle,
    pipeline_descriptor: GraphicsPipelineDescriptor<'static>,
    vertices: BufferHandle,
    shaders: [ShaderHandle; 2],
    size: (u32, u32),
}

impl Renderer {
    fn new(event_loop: &ActiveEventLoop, config: &DeviceConfig) -> anyhow::Result<Self> {
        let attributes = Window::default_attributes()
            .with_title(config.application_name.clone())
            .with_inner_size(LogicalSize::new(960, 640));
        let window = Arc::new(event_loop.create_window(attributes).context("failed to create window")?);
        let size = window.inner_size();

        let backend = WgpuBackend::new(config).context("failed to initialize the WGPU backend")?;
        let device = Device::new(backend, config.clone());
        log::info!("Sandbox: Rendering with {} on {}", device.api_name(), device.device_name());

        let swapchain = device.create_swapchain(&SwapchainDescriptor {
            label: Some("Sandbox Swapchain".into()),
            window: Some(NativeWindow::from_arc(window.clone())),
            width: size.width,
            height: size.height,
            vsync: config.vsync,
            ..Default::default()
        })?;

        let vs = device.create_shader(&ShaderDescriptor::new(ShaderStage::Vertex, SHADER, "vs_main"))?;
        let ps = device.create_shader(&ShaderDescriptor::new(ShaderStage::Pixel, SHADER, "fs_main"))?;
        let vertices = device.create_buffer(&BufferDescriptor {
            label: Some("Triangle Vertices".into()),
            size: std::mem::size_of_val(&TRIANGLE) as u64,
            usage: BufferUsage::VERTEX,
            stride: std::mem::size_of::<Vertex>() as u32,
            initial_data: Some(bytemuck::cast_slice(&TRIANGLE)),
        })?;

        let pipeline_descriptor = GraphicsPipelineDescriptor {
            label: Some("Triangle Pipeline".into()),
            vertex_shader: vs,
            pixel_shader: ps,
            vertex_layout: VertexLayout::default()
                .with(VertexElement::new("POSITION", TextureFormat::Rg32Float, 0))
                .with(VertexElement::new("COLOR", TextureFormat::Rgba32Float, 8)),
            ..Default::default()
        };

        Ok(Self {
            window,
            lists: CommandListPool::with_capacity(device.clone(), FRAME_SLOTS),
            pacer: FramePacer::new(device.clone()),
            pipelines: PipelineCache::new(device.clone()),
            device,
            swapchain,
            pipeline_descriptor,
            vertices,
            shaders: [vs, ps],
            size: (size.width, size.height),
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.device.resize_swapchain(self.swapchain, width, height) {
            self.size = (width, height);
        }
    }

    fn render(&mut self) -> anyhow::Result<()> {
        if self.size.0 == 0 || self.size.1 == 0 {
            return Ok(());
        }
        if !self.pacer.begin_frame() {
            log::warn!("Sandbox: Frame {} started before its slot was free.", self.pacer.frame_number());
        }
        // Acquires the drawable this frame renders into.
        if !self.device.present(self.swapchain) {
            log::debug!("Sandbox: No drawable this frame.");
            self.pacer.skip_frame();
            return Ok(());
        }
        let pipeline = self.pipelines.get_or_create(&self.pipeline_descriptor)?;
        let Some(drawable) = self.device.get_swapchain_drawable(self.swapchain) else {
            self.pacer.skip_frame();
            return Ok(());
        };

        let mut list = self.lists.scoped();
        list.set_drawable(drawable);
        list.begin_render_pass(
            TextureHandle::NULL,
            TextureHandle::NULL,
            LoadAction::Clear,
            StoreAction::Store,
            Some(CLEAR),
        );
        list.begin_event("Triangle");
        list.set_pipeline_state(pipeline);
        list.set_vertex_buffer(0, self.vertices, std::mem::size_of::<Vertex>() as u32, 0);
        list.set_viewport(&Viewport::from_size(self.size.0 as f32, self.size.1 as f32));
        list.set_scissor_rect(&ScissorRect {
            left: 0,
            top: 0,
            right: self.size.0 as i32,
            bottom: self.size.1 as i32,
        });
        list.draw(3, 1, 0, 0);
        list.end_event();
        list.end_render_pass();
        // Submits and presents, fenced on this frame's slot.
        self.pacer.end_frame(&mut list);
        drop(list);

        for diagnostic in self.device.diagnostics().drain() {
            log::warn!("Sandbox: {diagnostic}");
        }
        Ok(())
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        if !self.pacer.wait_for_idle() {
            self.device.wait_for_idle();
        }
        self.lists.clear();
        self.pipelines.clear();
        self.device.destroy_buffer(self.vertices);
        for shader in self.shaders {
            self.device.destroy_shader(shader);
        }
        self.device.destroy_swapchain(self.swapchain);
        log::info!("Sandbox: {}", self.device.stats());
    }
}

struct Sandbox {
    config: DeviceConfig,
    renderer: Option<Renderer>,
}

impl ApplicationHandler for Sandbox {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }
        match Renderer::new(event_loop, &self.config) {
            Ok(renderer) => self.renderer = Some(renderer),
            Err(e) => {
                log::error!("Sandbox: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Sandbox: Close requested.");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => renderer.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                if let Err(e) = renderer.render() {
                    log::error!("Sandbox: Frame failed: {e:#}");
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(renderer) = &self.renderer {
            renderer.window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.renderer = None;
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .filter_module("wgpu_hal", log::LevelFilter::Warn)
        .filter_module("naga", log::LevelFilter::Warn)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => DeviceConfig::load(&path).with_context(|| format!("failed to load '{path}'"))?,
        None => DeviceConfig {
            application_name: "Vesta Sandbox".to_string(),
            ..Default::default()
        },
    }
    .with_env_overrides();

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);
    event_loop.run_app(&mut Sandbox { config, renderer: None })?;
    Ok(())
}
