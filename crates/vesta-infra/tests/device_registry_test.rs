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

//! Integration tests for the device resource registry: creation, lookup,
//! destruction and bounds-checked uploads.

mod common;

use common::*;
use vesta_core::rhi::*;
use vesta_core::DiagnosticKind;

// ─────────────────────────────────────────────────────────────────────────────
// Buffers
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_vertex_buffer_created_and_destroyed_twice() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let zeros = [0u8; 64];
    let descriptor = BufferDescriptor {
        label: Some("Vertices".into()),
        size: 256,
        usage: BufferUsage::VERTEX,
        stride: 0,
        initial_data: Some(&zeros),
    };

    // --- 2. ACT ---
    let handle = device.create_buffer(&descriptor).expect("creation should succeed");
    let info = device.buffer_info(handle);
    device.destroy_buffer(handle);
    device.destroy_buffer(handle);

    // --- 3. ASSERT ---
    assert!(handle.is_valid());
    let info = info.expect("the buffer should resolve right after creation");
    assert_eq!(info.size, 256);
    assert!(info.cpu_accessible);
    assert_eq!(info.label.as_deref(), Some("Vertices"));
    assert!(device.buffer_info(handle).is_none());
    assert_eq!(device.stats().buffers, 0);
}

#[test]
fn test_initial_data_round_trip() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let data: Vec<u8> = (0..48u8).collect();

    // --- 2. ACT ---
    let handle = device
        .create_buffer(&BufferDescriptor {
            size: 48,
            usage: BufferUsage::CONSTANT,
            initial_data: Some(&data),
            ..Default::default()
        })
        .unwrap();
    let read_back = device.read_buffer_data(handle, 0, 48).unwrap();

    // --- 3. ASSERT ---
    assert_eq!(read_back, data);
}

#[test]
fn test_invalid_buffer_descriptors_leave_table_unchanged() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let too_much = [1u8; 32];

    // --- 2. ACT ---
    let empty = device.create_buffer(&BufferDescriptor {
        size: 0,
        usage: BufferUsage::VERTEX,
        ..Default::default()
    });
    let overflowing = device.create_buffer(&BufferDescriptor {
        size: 16,
        usage: BufferUsage::VERTEX,
        initial_data: Some(&too_much),
        ..Default::default()
    });

    // --- 3. ASSERT ---
    assert!(matches!(empty, Err(ResourceError::InvalidDescriptor(_))));
    assert!(matches!(overflowing, Err(ResourceError::InvalidDescriptor(_))));
    assert_eq!(device.stats().total(), 0);
}

#[test]
fn test_handles_are_monotonic_across_destroys() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let descriptor = BufferDescriptor {
        size: 16,
        usage: BufferUsage::INDEX,
        ..Default::default()
    };

    // --- 2. ACT ---
    let first = device.create_buffer(&descriptor).unwrap();
    device.destroy_buffer(first);
    let second = device.create_buffer(&descriptor).unwrap();
    let third = device.create_buffer(&descriptor).unwrap();

    // --- 3. ASSERT ---
    assert!(first < second && second < third);
}

#[test]
fn test_destroy_isolates_other_entries() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let descriptor = BufferDescriptor {
        size: 16,
        usage: BufferUsage::VERTEX,
        ..Default::default()
    };
    let kept = device.create_buffer(&descriptor).unwrap();
    let dropped = device.create_buffer(&descriptor).unwrap();
    let texture = device.create_texture(&TextureDescriptor::default()).unwrap();

    // --- 2. ACT ---
    device.destroy_buffer(dropped);
    device.destroy_buffer(BufferHandle(9_999));
    device.destroy_texture(TextureHandle::NULL);

    // --- 3. ASSERT ---
    assert!(device.buffer_info(kept).is_some());
    assert!(device.texture_info(texture).is_some());
    assert_eq!(device.stats().buffers, 1);
}

#[test]
fn test_out_of_bounds_upload_leaves_buffer_unchanged() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let original = [7u8; 16];
    let handle = device
        .create_buffer(&BufferDescriptor {
            size: 16,
            usage: BufferUsage::VERTEX,
            initial_data: Some(&original),
            ..Default::default()
        })
        .unwrap();
    device.diagnostics().drain();

    // --- 2. ACT ---
    let result = device.upload_buffer_data(handle, &[1u8; 8], 12);

    // --- 3. ASSERT ---
    assert!(matches!(
        result,
        Err(ResourceError::OutOfBounds {
            offset: 12,
            size: 8,
            capacity: 16
        })
    ));
    assert_eq!(device.read_buffer_data(handle, 0, 16).unwrap(), original);
    assert_eq!(kinds(&device.diagnostics().drain()), vec![DiagnosticKind::OutOfBounds]);
}

#[test]
fn test_upload_at_offset_and_update() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let handle = device
        .create_buffer(&BufferDescriptor {
            size: 8,
            usage: BufferUsage::CONSTANT,
            ..Default::default()
        })
        .unwrap();

    // --- 2. ACT ---
    device.upload_buffer_data(handle, &[1, 2], 2).unwrap();
    device.update_buffer(handle, &[9], 7).unwrap();
    device.upload_buffer_data(handle, &[], 8).unwrap();

    // --- 3. ASSERT ---
    assert_eq!(device.read_buffer_data(handle, 0, 8).unwrap(), vec![0, 0, 1, 2, 0, 0, 0, 9]);
}

#[test]
fn test_upload_to_private_buffer_is_rejected() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let handle = device
        .create_buffer(&BufferDescriptor {
            size: 64,
            usage: BufferUsage::UNORDERED_ACCESS,
            ..Default::default()
        })
        .unwrap();

    // --- 2. ACT ---
    let result = device.upload_buffer_data(handle, &[1, 2, 3, 4], 0);
    let unknown = device.upload_buffer_data(BufferHandle(4_242), &[1], 0);

    // --- 3. ASSERT ---
    assert!(matches!(result, Err(ResourceError::NotCpuAccessible(h)) if h == handle));
    assert!(matches!(unknown, Err(ResourceError::NotFound)));
    assert_eq!(
        kinds(&device.diagnostics().drain()),
        vec![DiagnosticKind::NotCpuAccessible, DiagnosticKind::InvalidHandle]
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Textures
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_texture_upload_targets_mip_and_slice() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let handle = device
        .create_texture(&TextureDescriptor {
            width: 8,
            height: 4,
            mip_levels: 2,
            array_size: 3,
            format: TextureFormat::Rgba8Unorm,
            ..Default::default()
        })
        .unwrap();
    let mip1 = vec![0xAB; 4 * 2 * 4];

    // --- 2. ACT ---
    device.upload_texture_data(handle, &mip1, 1, 2).unwrap();

    // --- 3. ASSERT ---
    let info = device.texture_info(handle).unwrap();
    assert_eq!(info.dimension, TextureDimension::D2Array);
    assert_eq!(info.depth_or_array_layers, 3);
    assert!(!info.is_backbuffer);
    device.transition_texture(handle, ResourceState::CopyDest, ResourceState::ShaderResource);
    assert!(device.diagnostics().drain().is_empty());
}

#[test]
fn test_texture_upload_bounds() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let handle = device
        .create_texture(&TextureDescriptor {
            width: 4,
            height: 4,
            format: TextureFormat::R32Float,
            ..Default::default()
        })
        .unwrap();

    // --- 2. ACT ---
    let short = device.upload_texture_data(handle, &[0u8; 63], 0, 0);
    let bad_mip = device.upload_texture_data(handle, &[0u8; 64], 1, 0);
    let bad_slice = device.upload_texture_data(handle, &[0u8; 64], 0, 1);

    // --- 3. ASSERT ---
    assert!(matches!(
        short,
        Err(ResourceError::OutOfBounds {
            offset: 0,
            size: 64,
            capacity: 63
        })
    ));
    assert!(matches!(bad_mip, Err(ResourceError::OutOfBounds { .. })));
    assert!(matches!(bad_slice, Err(ResourceError::OutOfBounds { .. })));
    assert_eq!(device.diagnostics().drain().len(), 3);
}

#[test]
fn test_texture_row_size_overflow_is_rejected() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let handle = device
        .create_texture(&TextureDescriptor {
            width: 0x1000_0000,
            height: 1,
            format: TextureFormat::Rgba32Float,
            ..Default::default()
        })
        .unwrap();

    // --- 2. ACT ---
    let result = device.upload_texture_data(handle, &[0u8; 16], 0, 0);

    // --- 3. ASSERT ---
    assert!(matches!(
        result,
        Err(ResourceError::OutOfBounds {
            offset: 0,
            size: 0x1_0000_0000,
            capacity: 0xFFFF_FFFF
        })
    ));
    assert_eq!(kinds(&device.diagnostics().drain()), vec![DiagnosticKind::OutOfBounds]);
}

#[test]
fn test_invalid_texture_descriptors() {
    // --- 1. ARRANGE ---
    let device = headless_device();

    // --- 2. ACT ---
    let zero = device.create_texture(&TextureDescriptor {
        width: 0,
        ..Default::default()
    });
    let unknown = device.create_texture(&TextureDescriptor {
        format: TextureFormat::Unknown,
        ..Default::default()
    });

    // --- 3. ASSERT ---
    assert!(matches!(zero, Err(ResourceError::InvalidDescriptor(_))));
    assert!(matches!(unknown, Err(ResourceError::InvalidDescriptor(_))));
    assert_eq!(device.stats().textures, 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Shaders and pipelines
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_shader_errors_register_nothing() {
    // --- 1. ARRANGE ---
    let device = headless_device();

    // --- 2. ACT ---
    let broken = device.create_shader(&ShaderDescriptor::new(ShaderStage::Vertex, "fn (", "vs_main"));
    let wrong_entry = device.create_shader(&ShaderDescriptor::new(ShaderStage::Vertex, TRIANGLE_WGSL, "fs_main"));

    // --- 3. ASSERT ---
    assert!(matches!(
        broken,
        Err(ResourceError::Shader(ShaderError::CompilationError { .. }))
    ));
    assert!(matches!(
        wrong_entry,
        Err(ResourceError::Shader(ShaderError::InvalidEntryPoint { .. }))
    ));
    assert_eq!(device.stats().shaders, 0);
}

#[test]
fn test_pipeline_reports_computed_stride() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let (vs, ps) = triangle_shaders(&device);

    // --- 2. ACT ---
    let pipeline = device
        .create_graphics_pipeline_state(&triangle_pipeline_descriptor(vs, ps))
        .unwrap();

    // --- 3. ASSERT ---
    let info = device.pipeline_info(pipeline).unwrap();
    assert_eq!(info.vertex_stride, 12);
    assert_eq!(info.vertex_shader, vs);
    assert_eq!(info.render_target_formats, vec![TextureFormat::PRESENTATION]);
}

#[test]
fn test_pipeline_with_unknown_vertex_shader_fails() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let (_, ps) = triangle_shaders(&device);
    let descriptor = triangle_pipeline_descriptor(ShaderHandle(777), ps);

    // --- 2. ACT ---
    let result = device.create_graphics_pipeline_state(&descriptor);

    // --- 3. ASSERT ---
    assert!(matches!(
        result,
        Err(ResourceError::Pipeline(PipelineError::InvalidShaderHandle {
            expected_stage: ShaderStage::Vertex,
            ..
        }))
    ));
    assert_eq!(device.stats().pipelines, 0);
}

#[test]
fn test_pipeline_rejects_shader_of_wrong_stage_and_bad_targets() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let (vs, ps) = triangle_shaders(&device);

    // --- 2. ACT ---
    let swapped = device.create_graphics_pipeline_state(&triangle_pipeline_descriptor(ps, vs));
    let mut unknown_target = triangle_pipeline_descriptor(vs, ps);
    unknown_target.render_target_formats = vec![TextureFormat::Unknown];
    let unknown_target = device.create_graphics_pipeline_state(&unknown_target);
    let mut too_many = triangle_pipeline_descriptor(vs, ps);
    too_many.render_target_formats = vec![TextureFormat::Rgba8Unorm; MAX_RENDER_TARGETS + 1];
    let too_many = device.create_graphics_pipeline_state(&too_many);

    // --- 3. ASSERT ---
    assert!(matches!(
        swapped,
        Err(ResourceError::Pipeline(PipelineError::InvalidShaderHandle { .. }))
    ));
    assert!(matches!(
        unknown_target,
        Err(ResourceError::Pipeline(PipelineError::InvalidRenderTargets(_)))
    ));
    assert!(matches!(
        too_many,
        Err(ResourceError::Pipeline(PipelineError::InvalidRenderTargets(_)))
    ));
    assert_eq!(device.stats().pipelines, 0);
}

#[test]
fn test_destroying_shader_keeps_pipeline_alive() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let (vs, ps) = triangle_shaders(&device);
    let pipeline = device
        .create_graphics_pipeline_state(&triangle_pipeline_descriptor(vs, ps))
        .unwrap();

    // --- 2. ACT ---
    device.destroy_shader(vs);
    device.destroy_shader(vs);

    // --- 3. ASSERT ---
    assert!(device.shader_info(vs).is_none());
    assert_eq!(device.shader_info(ps).unwrap().entry_point, "fs_main");
    assert!(device.pipeline_info(pipeline).is_some());
}

#[test]
fn test_compute_pipeline_is_unimplemented() {
    // --- 1. ARRANGE ---
    let device = headless_device();

    // --- 2. ACT ---
    let result = device.create_compute_pipeline_state(&ComputePipelineDescriptor::default());

    // --- 3. ASSERT ---
    assert!(matches!(
        result,
        Err(ResourceError::Pipeline(PipelineError::Unimplemented(_)))
    ));
    assert_eq!(kinds(&device.diagnostics().drain()), vec![DiagnosticKind::Unimplemented]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Fences, transitions and teardown
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_fence_values() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let fence = device.create_fence(3);

    // --- 2. ACT ---
    device.signal_fence(fence, 5);
    device.signal_fence(FenceHandle(12_345), 1);

    // --- 3. ASSERT ---
    assert_eq!(device.get_fence_value(fence), 5);
    assert!(device.is_fence_complete(fence, 5));
    assert!(!device.is_fence_complete(fence, 6));
    assert!(device.wait_for_fence(fence, 4));
    assert_eq!(device.get_fence_value(FenceHandle(12_345)), 0);
    assert!(!device.is_fence_complete(FenceHandle(12_345), 0));
    assert_eq!(kinds(&device.diagnostics().drain()), vec![DiagnosticKind::InvalidHandle]);
}

#[test]
fn test_wait_for_unreachable_fence_value_reports() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let fence = device.create_fence(0);

    // --- 2. ACT ---
    let reached = device.wait_for_fence(fence, 10);

    // --- 3. ASSERT ---
    assert!(!reached);
    assert_eq!(kinds(&device.diagnostics().drain()), vec![DiagnosticKind::InvalidState]);
}

#[test]
fn test_transition_of_unknown_resource_reports() {
    // --- 1. ARRANGE ---
    let device = headless_device();

    // --- 2. ACT ---
    device.transition_buffer(BufferHandle(5), ResourceState::Common, ResourceState::CopyDest);
    device.transition_texture(TextureHandle(5), ResourceState::Common, ResourceState::RenderTarget);

    // --- 3. ASSERT ---
    assert_eq!(
        kinds(&device.diagnostics().drain()),
        vec![DiagnosticKind::InvalidHandle, DiagnosticKind::InvalidHandle]
    );
}

#[test]
fn test_destroying_device_releases_every_table() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let observer = device.clone();
    let buffer = device
        .create_buffer(&BufferDescriptor {
            size: 4,
            usage: BufferUsage::VERTEX,
            ..Default::default()
        })
        .unwrap();
    let _fence = device.create_fence(0);
    let _shaders = triangle_shaders(&device);

    // --- 2. ACT ---
    device.destroy();

    // --- 3. ASSERT ---
    assert_eq!(observer.stats().total(), 0);
    assert!(observer.buffer_info(buffer).is_none());
    assert_eq!(observer.api_name(), "Headless");
    assert_eq!(observer.device_name(), "Vesta Headless Adapter");
}
