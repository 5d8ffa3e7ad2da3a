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

//! Drives the C surface the way a foreign host would, on the headless backend.

use bytemuck::Zeroable;
use std::ffi::{c_char, c_void, CString};
use vesta_core::rhi::*;
use vesta_ffi::*;

const TRIANGLE_WGSL: &str = r#"
    @vertex
    fn vs_main(@location(0) x: f32, @location(1) uv: vec2<f32>) -> @builtin(position) vec4<f32> {
        return vec4<f32>(x, uv.y, 0.0, 1.0);
    }

    @fragment
    fn fs_main() -> @location(0) vec4<f32> {
        return vec4<f32>(1.0, 0.5, 0.0, 1.0);
    }
"#;

/// `VestaDeviceDesc::backend` value selecting the headless backend.
const HEADLESS: u32 = 6;

fn create_headless_device() -> u64 {
    let _ = env_logger::builder().is_test(true).try_init();
    let name = CString::new("FFI Test").unwrap();
    let desc = VestaDeviceDesc {
        application_name: name.as_ptr(),
        backend: HEADLESS,
        ..Zeroable::zeroed()
    };
    unsafe { vesta_device_create(&desc) }
}

fn read_string(fill: impl Fn(*mut c_char, usize) -> usize) -> String {
    let len = fill(std::ptr::null_mut(), 0);
    let mut buffer = vec![0u8; len + 1];
    fill(buffer.as_mut_ptr().cast(), buffer.len());
    buffer.truncate(len);
    String::from_utf8(buffer).unwrap()
}

fn create_shader(device: u64, stage: ShaderStage, entry_point: &str) -> u64 {
    let entry_point = CString::new(entry_point).unwrap();
    let desc = VestaShaderDesc {
        stage: stage as u32,
        source: TRIANGLE_WGSL.as_ptr().cast(),
        source_size: TRIANGLE_WGSL.len(),
        entry_point: entry_point.as_ptr(),
        debug_name: std::ptr::null(),
    };
    unsafe { vesta_device_create_shader(device, &desc) }
}

fn create_pipeline(device: u64, vs: u64, ps: u64, elements: &[VestaVertexElement]) -> u64 {
    let mut desc: VestaGraphicsPipelineDesc = Zeroable::zeroed();
    desc.vertex_shader = vs;
    desc.pixel_shader = ps;
    desc.vertex_layout = VestaVertexLayout {
        elements: elements.as_ptr(),
        element_count: elements.len() as u32,
    };
    desc.topology = PrimitiveTopology::TriangleList as u32;
    desc.depth_stencil.depth_func = CompareFunction::Less as u32;
    desc.blend.render_targets[0].src_blend = BlendFactor::One as u32;
    desc.blend.render_targets[0].write_mask = 0b1111;
    desc.render_target_count = 1;
    desc.render_target_formats[0] = TextureFormat::PRESENTATION.raw();
    unsafe { vesta_device_create_graphics_pipeline_state(device, &desc) }
}

fn triangle_layout() -> [VestaVertexElement; 2] {
    [
        VestaVertexElement {
            format: TextureFormat::R32Float.raw(),
            ..Zeroable::zeroed()
        },
        VestaVertexElement {
            format: TextureFormat::Rg32Float.raw(),
            aligned_byte_offset: 4,
            ..Zeroable::zeroed()
        },
    ]
}

#[test]
fn test_headless_device_reports_its_names() {
    // --- 1. ARRANGE ---
    let device = create_headless_device();

    // --- 2. ACT ---
    let name = read_string(|buffer, capacity| unsafe { vesta_device_get_name(device, buffer, capacity) });
    let api = read_string(|buffer, capacity| unsafe { vesta_device_get_api_name(device, buffer, capacity) });

    // --- 3. ASSERT ---
    assert_ne!(device, 0);
    assert_eq!(name, "Vesta Headless Adapter");
    assert_eq!(api, "Headless");

    vesta_device_destroy(device);
}

#[test]
fn test_null_descriptors_give_zero() {
    // --- 1. ARRANGE ---
    let device = create_headless_device();

    // --- 2. ACT & 3. ASSERT ---
    unsafe {
        assert_eq!(vesta_device_create(std::ptr::null()), 0);
        assert_eq!(vesta_device_create_buffer(device, std::ptr::null()), 0);
        assert_eq!(vesta_device_create_texture(device, std::ptr::null()), 0);
        assert_eq!(vesta_device_create_shader(device, std::ptr::null()), 0);
        assert_eq!(vesta_device_create_graphics_pipeline_state(device, std::ptr::null()), 0);
        assert_eq!(vesta_device_create_swapchain(device, std::ptr::null()), 0);
        assert!(!vesta_device_upload_buffer_data(device, 1, std::ptr::null(), 4, 0));
    }

    vesta_device_destroy(device);
}

#[test]
fn test_unknown_enum_values_give_zero() {
    // --- 1. ARRANGE ---
    let device = create_headless_device();
    let bad_backend = VestaDeviceDesc {
        backend: 42,
        ..Zeroable::zeroed()
    };
    let bad_format = VestaTextureDesc {
        width: 4,
        height: 4,
        format: 999,
        usage: TextureUsage::SHADER_RESOURCE.bits(),
        ..Zeroable::zeroed()
    };
    let bad_usage = VestaBufferDesc {
        size: 16,
        usage: 1 << 20,
        ..Zeroable::zeroed()
    };

    let bad_stage = VestaShaderDesc {
        stage: 7,
        source: TRIANGLE_WGSL.as_ptr().cast(),
        source_size: TRIANGLE_WGSL.len(),
        entry_point: c"vs_main".as_ptr(),
        debug_name: std::ptr::null(),
    };

    // --- 2. ACT ---
    let created = unsafe {
        [
            vesta_device_create(&bad_backend),
            vesta_device_create_texture(device, &bad_format),
            vesta_device_create_buffer(device, &bad_usage),
            vesta_device_create_shader(device, &bad_stage),
        ]
    };

    // --- 3. ASSERT ---
    assert_eq!(created, [0, 0, 0, 0]);

    vesta_device_destroy(device);
}

#[test]
fn test_unknown_ids_are_tolerated() {
    // --- 2. ACT & 3. ASSERT ---
    assert_eq!(vesta_device_create_fence(u64::MAX, 0), 0);
    assert_eq!(vesta_device_begin_command_list(u64::MAX), 0);
    assert!(!vesta_device_present(u64::MAX, 1));
    vesta_command_list_draw(u64::MAX, 3, 1, 0, 0);
    vesta_command_list_destroy(u64::MAX);
    vesta_device_destroy(u64::MAX);
}

#[test]
fn test_buffer_round_trip() {
    // --- 1. ARRANGE ---
    let device = create_headless_device();
    let initial: [u8; 8] = [1, 2, 3, 4, 5, 6, 7, 8];
    let desc = VestaBufferDesc {
        size: initial.len() as u64,
        usage: BufferUsage::VERTEX.bits(),
        stride: 4,
        initial_data: initial.as_ptr().cast(),
        debug_name: c"Round Trip".as_ptr(),
    };
    let buffer = unsafe { vesta_device_create_buffer(device, &desc) };

    // --- 2. ACT ---
    let patch = [0xAAu8; 2];
    let updated = unsafe { vesta_device_update_buffer(device, buffer, patch.as_ptr().cast(), patch.len(), 6) };
    let overflow = unsafe { vesta_device_upload_buffer_data(device, buffer, patch.as_ptr().cast(), patch.len(), 7) };
    let mut out = [0u8; 8];
    let read = unsafe { vesta_device_read_buffer_data(device, buffer, 0, out.as_mut_ptr().cast::<c_void>(), out.len()) };

    // --- 3. ASSERT ---
    assert_ne!(buffer, 0);
    assert!(updated);
    assert!(!overflow, "a write past the end is rejected");
    assert!(read);
    assert_eq!(out, [1, 2, 3, 4, 5, 6, 0xAA, 0xAA]);

    vesta_device_destroy_buffer(device, buffer);
    assert!(!unsafe { vesta_device_read_buffer_data(device, buffer, 0, out.as_mut_ptr().cast(), 1) });
    vesta_device_destroy(device);
}

#[test]
fn test_pipeline_with_unknown_shader_gives_zero() {
    // --- 1. ARRANGE ---
    let device = create_headless_device();
    let ps = create_shader(device, ShaderStage::Pixel, "fs_main");
    let layout = triangle_layout();

    // --- 2. ACT ---
    let pipeline = create_pipeline(device, 9999, ps, &layout);

    // --- 3. ASSERT ---
    assert_ne!(ps, 0);
    assert_eq!(pipeline, 0);

    vesta_device_destroy(device);
}

#[test]
fn test_headless_frame_end_to_end() {
    // --- 1. ARRANGE ---
    let device = create_headless_device();
    let vs = create_shader(device, ShaderStage::Vertex, "vs_main");
    let ps = create_shader(device, ShaderStage::Pixel, "fs_main");
    let layout = triangle_layout();
    let pipeline = create_pipeline(device, vs, ps, &layout);

    let vertices: [f32; 9] = [-0.5, 0.0, 0.0, 0.5, 0.5, 1.0, 0.0, 1.0, 0.0];
    let vertex_bytes: &[u8] = bytemuck::cast_slice(&vertices);
    let vertex_buffer = unsafe {
        vesta_device_create_buffer(
            device,
            &VestaBufferDesc {
                size: vertex_bytes.len() as u64,
                usage: BufferUsage::VERTEX.bits(),
                stride: 12,
                initial_data: vertex_bytes.as_ptr().cast(),
                debug_name: std::ptr::null(),
            },
        )
    };

    let swapchain_desc = VestaSwapchainDesc {
        window: VestaWindowHandle {
            kind: VESTA_WINDOW_XLIB,
            window: 0x2a as *mut c_void,
            display: std::ptr::null_mut(),
        },
        width: 320,
        height: 240,
        format: TextureFormat::PRESENTATION.raw(),
        buffer_count: 2,
        vsync: true,
        ..Zeroable::zeroed()
    };
    let swapchain = unsafe { vesta_device_create_swapchain(device, &swapchain_desc) };
    let fence = vesta_device_create_fence(device, 0);
    let clear = ClearColor::new(0.1, 0.2, 0.3, 1.0);
    let viewport = Viewport::from_size(320.0, 240.0);

    // --- 2. ACT ---
    let acquired = vesta_device_present(device, swapchain);
    let list = vesta_device_begin_command_list(device);
    let attached = vesta_command_list_set_drawable(list, swapchain);
    unsafe {
        vesta_command_list_begin_render_pass(
            list,
            0,
            0,
            LoadAction::Clear as u32,
            StoreAction::Store as u32,
            &clear,
        );
        vesta_command_list_set_pipeline_state(list, pipeline);
        vesta_command_list_set_vertex_buffer(list, 0, vertex_buffer, 12, 0);
        vesta_command_list_set_viewport(list, &viewport);
        vesta_command_list_begin_event(list, c"Triangle".as_ptr());
        vesta_command_list_draw(list, 3, 1, 0, 0);
        vesta_command_list_end_event(list);
    }
    vesta_command_list_end_render_pass(list);
    vesta_device_submit_command_list_with_fence(device, list, fence, 1);

    // --- 3. ASSERT ---
    assert!([vs, ps, pipeline, vertex_buffer, swapchain, fence].iter().all(|&h| h != 0));
    assert!(acquired);
    assert!(attached);
    assert!(
        !vesta_command_list_set_drawable(list, swapchain),
        "the drawable moved onto the list"
    );
    assert_eq!(vesta_device_get_fence_value(device, fence), 1);
    assert!(vesta_device_is_fence_complete(device, fence, 1));
    assert!(vesta_device_wait_for_fence(device, fence, 1));

    vesta_command_list_destroy(list);
    vesta_device_destroy(device);
    assert_eq!(vesta_device_get_fence_value(device, fence), 0);
}

#[test]
fn test_resize_and_backbuffer() {
    // --- 1. ARRANGE ---
    let device = create_headless_device();
    let desc = VestaSwapchainDesc {
        window: VestaWindowHandle {
            kind: VESTA_WINDOW_XLIB,
            window: 0x2a as *mut c_void,
            display: std::ptr::null_mut(),
        },
        width: 64,
        height: 64,
        format: TextureFormat::PRESENTATION.raw(),
        ..Zeroable::zeroed()
    };
    let windowless = VestaSwapchainDesc {
        window: Zeroable::zeroed(),
        ..desc
    };
    let swapchain = unsafe { vesta_device_create_swapchain(device, &desc) };

    // --- 2. ACT ---
    let before_present = vesta_device_get_swapchain_backbuffer(device, swapchain);
    vesta_device_present(device, swapchain);
    let backbuffer = vesta_device_get_swapchain_backbuffer(device, swapchain);
    let resized = vesta_device_resize_swapchain(device, swapchain, 128, 96);
    let zero_resize = vesta_device_resize_swapchain(device, swapchain, 0, 96);

    // --- 3. ASSERT ---
    assert_eq!(unsafe { vesta_device_create_swapchain(device, &windowless) }, 0);
    assert_eq!(before_present, 0);
    assert_ne!(backbuffer, 0);
    assert_eq!(vesta_device_get_swapchain_current_index(device, swapchain), 0);
    assert!(resized);
    assert!(!zero_resize);

    vesta_device_destroy_texture(device, backbuffer);
    vesta_device_destroy_swapchain(device, swapchain);
    vesta_device_destroy(device);
}
