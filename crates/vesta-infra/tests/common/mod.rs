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

//! Shared fixtures for the headless integration tests.

#![allow(dead_code)]

use raw_window_handle::{RawDisplayHandle, RawWindowHandle, XlibDisplayHandle, XlibWindowHandle};
use vesta_core::platform::{NativeWindow, RawWindow};
use vesta_core::rhi::*;
use vesta_core::{DeviceConfig, Diagnostic, DiagnosticKind};
use vesta_infra::HeadlessBackend;

pub const TRIANGLE_WGSL: &str = r#"
    struct VertexOutput {
        @builtin(position) position: vec4<f32>,
        @location(0) uv: vec2<f32>,
    }

    @vertex
    fn vs_main(@location(0) x: f32, @location(1) uv: vec2<f32>) -> VertexOutput {
        var out: VertexOutput;
        out.position = vec4<f32>(x, uv.y, 0.0, 1.0);
        out.uv = uv;
        return out;
    }

    @fragment
    fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
        return vec4<f32>(in.uv, 0.0, 1.0);
    }
"#;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn headless_device() -> Device<HeadlessBackend> {
    init_logger();
    Device::new(HeadlessBackend::new(), DeviceConfig::default())
}

/// An Xlib window id that nothing ever dereferences.
pub fn fake_window() -> NativeWindow {
    NativeWindow::new(RawWindow {
        window: RawWindowHandle::Xlib(XlibWindowHandle::new(0x2a)),
        display: RawDisplayHandle::Xlib(XlibDisplayHandle::new(None, 0)),
    })
}

pub fn swapchain_descriptor(width: u32, height: u32) -> SwapchainDescriptor<'static> {
    SwapchainDescriptor {
        label: Some("Test Swapchain".into()),
        window: Some(fake_window()),
        width,
        height,
        ..Default::default()
    }
}

pub fn triangle_shaders(device: &Device<HeadlessBackend>) -> (ShaderHandle, ShaderHandle) {
    let vs = device
        .create_shader(&ShaderDescriptor::new(ShaderStage::Vertex, TRIANGLE_WGSL, "vs_main"))
        .expect("vertex shader should compile");
    let ps = device
        .create_shader(&ShaderDescriptor::new(ShaderStage::Pixel, TRIANGLE_WGSL, "fs_main"))
        .expect("pixel shader should compile");
    (vs, ps)
}

pub fn triangle_pipeline_descriptor(vs: ShaderHandle, ps: ShaderHandle) -> GraphicsPipelineDescriptor<'static> {
    GraphicsPipelineDescriptor {
        label: Some("Triangle".into()),
        vertex_shader: vs,
        pixel_shader: ps,
        vertex_layout: VertexLayout::default()
            .with(VertexElement::new("POSITION", TextureFormat::R32Float, 0))
            .with(VertexElement::new("TEXCOORD", TextureFormat::Rg32Float, 4)),
        ..Default::default()
    }
}

/// Presents once so the swapchain holds a drawable, then hands it to a new list.
pub fn frame_list(device: &Device<HeadlessBackend>, swapchain: SwapchainHandle) -> CommandList<HeadlessBackend> {
    assert!(device.present(swapchain), "first present should acquire a drawable");
    let mut list = device.begin_command_list();
    let drawable = device
        .get_swapchain_drawable(swapchain)
        .expect("a drawable should be available after present");
    list.set_drawable(drawable);
    list
}

pub fn kinds(diagnostics: &[Diagnostic]) -> Vec<DiagnosticKind> {
    diagnostics.iter().map(|d| d.kind).collect()
}
