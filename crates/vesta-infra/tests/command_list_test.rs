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

//! Integration tests for command-list recording, checked against the
//! headless backend's journal.

mod common;

use common::*;
use vesta_core::rhi::*;
use vesta_core::DiagnosticKind;
use vesta_infra::graphics::headless::RecordedCommand;
use vesta_infra::HeadlessBackend;

fn vertex_buffer(device: &Device<HeadlessBackend>) -> BufferHandle {
    let vertices: [f32; 9] = [-0.5, 0.0, 1.0, 0.5, 1.0, 1.0, 0.0, 0.5, 0.0];
    device
        .create_buffer(&BufferDescriptor {
            label: Some("Triangle Vertices".into()),
            size: std::mem::size_of_val(&vertices) as u64,
            usage: BufferUsage::VERTEX,
            stride: 12,
            initial_data: Some(bytemuck::cast_slice(&vertices)),
        })
        .unwrap()
}

#[test]
fn test_full_frame_journal_order() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let swapchain = device.create_swapchain(&swapchain_descriptor(640, 480)).unwrap();
    let (vs, ps) = triangle_shaders(&device);
    let pipeline = device
        .create_graphics_pipeline_state(&triangle_pipeline_descriptor(vs, ps))
        .unwrap();
    let vertices = vertex_buffer(&device);
    let journal = device.backend().journal().clone();
    journal.clear();

    // --- 2. ACT ---
    let mut list = frame_list(&device, swapchain);
    list.begin_render_pass(
        TextureHandle::NULL,
        TextureHandle::NULL,
        LoadAction::Clear,
        StoreAction::Store,
        Some(ClearColor::new(0.1, 0.2, 0.3, 1.0)),
    );
    list.set_pipeline_state(pipeline);
    list.set_vertex_buffer(0, vertices, 12, 0);
    list.set_viewport(&Viewport::from_size(640.0, 480.0));
    list.draw(3, 1, 0, 0);
    list.end_render_pass();
    device.submit_command_list(&mut list);

    // --- 3. ASSERT ---
    let commands = journal.commands();
    assert!(
        matches!(
            commands.as_slice(),
            [
                RecordedCommand::CreateCommandBuffer { .. },
                RecordedCommand::BeginRenderPass { .. },
                RecordedCommand::SetPipeline { .. },
                RecordedCommand::SetVertexBuffer { slot: 0, offset: 0, .. },
                RecordedCommand::SetViewport(_),
                RecordedCommand::Draw { .. },
                RecordedCommand::EndRenderPass { .. },
                RecordedCommand::Submit {
                    presented: Some(_),
                    fenced: false,
                    ..
                },
            ]
        ),
        "unexpected journal: {commands:#?}"
    );
    let RecordedCommand::BeginRenderPass { ops, .. } = &commands[1] else {
        unreachable!();
    };
    assert_eq!(ops.load, LoadOp::Clear(ClearColor::new(0.1, 0.2, 0.3, 1.0)));
    assert_eq!(ops.store, StoreOp::Store);
    let RecordedCommand::Draw { vertices, instances } = &commands[5] else {
        unreachable!();
    };
    assert_eq!((vertices.clone(), instances.clone()), (0..3, 0..1));
    assert_eq!(list.state(), CommandListState::Submitted);
    assert!(!list.has_drawable());
    assert!(device.diagnostics().drain().is_empty());
}

#[test]
fn test_second_render_pass_is_rejected() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let swapchain = device.create_swapchain(&swapchain_descriptor(64, 64)).unwrap();
    let mut list = frame_list(&device, swapchain);
    list.begin_render_pass(
        TextureHandle::NULL,
        TextureHandle::NULL,
        LoadAction::Load,
        StoreAction::Store,
        None,
    );

    // --- 2. ACT ---
    list.begin_render_pass(
        TextureHandle::NULL,
        TextureHandle::NULL,
        LoadAction::Clear,
        StoreAction::Store,
        None,
    );

    // --- 3. ASSERT ---
    let journal = device.backend().journal();
    assert_eq!(
        journal.count(|c| matches!(c, RecordedCommand::BeginRenderPass { .. })),
        1
    );
    assert_eq!(list.state(), CommandListState::InPass);
    assert_eq!(list.active_pass(), PassKind::Render);
    assert_eq!(kinds(&device.diagnostics().drain()), vec![DiagnosticKind::InvalidState]);
}

#[test]
fn test_draw_outside_pass_is_skipped() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let mut list = device.begin_command_list();

    // --- 2. ACT ---
    list.draw(3, 1, 0, 0);
    list.set_viewport(&Viewport::from_size(1.0, 1.0));
    list.begin_render_pass(
        TextureHandle::NULL,
        TextureHandle::NULL,
        LoadAction::Clear,
        StoreAction::Store,
        None,
    );

    // --- 3. ASSERT ---
    let journal = device.backend().journal();
    assert_eq!(journal.count(|c| matches!(c, RecordedCommand::Draw { .. })), 0);
    assert_eq!(
        journal.count(|c| matches!(c, RecordedCommand::BeginRenderPass { .. })),
        0
    );
    assert_eq!(list.state(), CommandListState::Recording);
    assert_eq!(
        kinds(&device.diagnostics().drain()),
        vec![DiagnosticKind::InvalidState; 3]
    );
}

#[test]
fn test_unknown_pipeline_is_reported_and_skipped() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let swapchain = device.create_swapchain(&swapchain_descriptor(64, 64)).unwrap();
    let mut list = frame_list(&device, swapchain);
    list.begin_render_pass(
        TextureHandle::NULL,
        TextureHandle::NULL,
        LoadAction::Clear,
        StoreAction::Store,
        None,
    );

    // --- 2. ACT ---
    list.set_pipeline_state(PipelineStateHandle(404));
    list.set_vertex_buffer(0, BufferHandle(405), 12, 0);
    list.set_texture(ShaderStage::Pixel, 0, TextureHandle(406));

    // --- 3. ASSERT ---
    let journal = device.backend().journal();
    assert_eq!(journal.count(|c| matches!(c, RecordedCommand::SetPipeline { .. })), 0);
    assert_eq!(
        journal.count(|c| matches!(c, RecordedCommand::SetVertexBuffer { .. })),
        0
    );
    assert_eq!(list.state(), CommandListState::InPass);
    assert_eq!(
        kinds(&device.diagnostics().drain()),
        vec![DiagnosticKind::InvalidHandle; 3]
    );
}

#[test]
fn test_stage_bindings_reach_the_encoder() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let swapchain = device.create_swapchain(&swapchain_descriptor(64, 64)).unwrap();
    let constants = device
        .create_buffer(&BufferDescriptor {
            size: 64,
            usage: BufferUsage::CONSTANT,
            ..Default::default()
        })
        .unwrap();
    let albedo = device.create_texture(&TextureDescriptor::default()).unwrap();
    let mut list = frame_list(&device, swapchain);
    list.begin_render_pass(
        TextureHandle::NULL,
        TextureHandle::NULL,
        LoadAction::Clear,
        StoreAction::Store,
        None,
    );

    // --- 2. ACT ---
    list.set_constant_buffer(ShaderStage::Vertex, 0, constants, 16);
    list.set_buffer(ShaderStage::Pixel, 2, constants, 0);
    list.set_texture(ShaderStage::Pixel, 1, albedo);
    list.set_constant_buffer(ShaderStage::Compute, 0, constants, 0);
    list.set_vertex_buffer(MAX_VERTEX_BUFFERS, constants, 0, 0);

    // --- 3. ASSERT ---
    let journal = device.backend().journal();
    assert_eq!(
        journal.count(|c| matches!(
            c,
            RecordedCommand::SetStageBuffer {
                stage: ShaderStage::Vertex,
                index: 0,
                offset: 16,
                ..
            }
        )),
        1
    );
    assert_eq!(
        journal.count(|c| matches!(
            c,
            RecordedCommand::SetStageBuffer {
                stage: ShaderStage::Pixel,
                index: 2,
                ..
            }
        )),
        1
    );
    assert_eq!(
        journal.count(|c| matches!(
            c,
            RecordedCommand::SetStageTexture {
                stage: ShaderStage::Pixel,
                index: 1,
                ..
            }
        )),
        1
    );
    assert_eq!(
        kinds(&device.diagnostics().drain()),
        vec![DiagnosticKind::Unimplemented, DiagnosticKind::OutOfBounds]
    );
}

#[test]
fn test_only_first_viewport_and_scissor_apply() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let swapchain = device.create_swapchain(&swapchain_descriptor(128, 128)).unwrap();
    let mut list = frame_list(&device, swapchain);
    list.begin_render_pass(
        TextureHandle::NULL,
        TextureHandle::NULL,
        LoadAction::Clear,
        StoreAction::Store,
        None,
    );
    let first = ScissorRect {
        left: 0,
        top: 0,
        right: 32,
        bottom: 32,
    };
    let second = ScissorRect {
        left: 32,
        top: 32,
        right: 64,
        bottom: 64,
    };

    // --- 2. ACT ---
    list.set_viewports(&[Viewport::from_size(128.0, 128.0), Viewport::from_size(1.0, 1.0)]);
    list.set_scissor_rects(&[first, second]);
    list.set_viewports(&[]);
    list.set_scissor_rects(&[]);

    // --- 3. ASSERT ---
    let journal = device.backend().journal();
    assert_eq!(journal.count(|c| matches!(c, RecordedCommand::SetViewport(_))), 1);
    assert_eq!(
        journal.count(|c| *c == RecordedCommand::SetScissorRect(first)),
        1
    );
    assert_eq!(journal.count(|c| matches!(c, RecordedCommand::SetScissorRect(_))), 1);
    assert_eq!(
        kinds(&device.diagnostics().drain()),
        vec![DiagnosticKind::InvalidState; 2]
    );
}

#[test]
fn test_begin_while_recording_keeps_command_buffer() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let mut list = device.begin_command_list();

    // --- 2. ACT ---
    list.begin();

    // --- 3. ASSERT ---
    let journal = device.backend().journal();
    assert_eq!(
        journal.count(|c| matches!(c, RecordedCommand::CreateCommandBuffer { .. })),
        1
    );
    assert_eq!(list.state(), CommandListState::Recording);
    assert!(list.is_recording());
    assert_eq!(kinds(&device.diagnostics().drain()), vec![DiagnosticKind::InvalidState]);
}

#[test]
fn test_render_pass_rejected_when_not_recording() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let swapchain = device.create_swapchain(&swapchain_descriptor(64, 64)).unwrap();
    let mut idle = CommandList::new(device.clone());
    let mut submitted = frame_list(&device, swapchain);
    device.submit_command_list(&mut submitted);

    // --- 2. ACT ---
    for list in [&mut idle, &mut submitted] {
        list.begin_render_pass(
            TextureHandle::NULL,
            TextureHandle::NULL,
            LoadAction::Clear,
            StoreAction::Store,
            None,
        );
    }

    // --- 3. ASSERT ---
    let journal = device.backend().journal();
    assert_eq!(journal.count(|c| matches!(c, RecordedCommand::BeginRenderPass { .. })), 0);
    assert_eq!(idle.state(), CommandListState::Idle);
    assert_eq!(submitted.state(), CommandListState::Submitted);
    assert_eq!(idle.active_pass(), PassKind::None);
    assert_eq!(submitted.active_pass(), PassKind::None);
    assert_eq!(
        kinds(&device.diagnostics().drain()),
        vec![DiagnosticKind::InvalidState; 2]
    );
}

#[test]
fn test_end_render_pass_without_open_pass() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let mut list = device.begin_command_list();
    let before = device.backend().journal().len();

    // --- 2. ACT ---
    list.end_render_pass();

    // --- 3. ASSERT ---
    assert_eq!(device.backend().journal().len(), before);
    assert_eq!(list.state(), CommandListState::Recording);
    assert_eq!(list.active_pass(), PassKind::None);
    assert_eq!(kinds(&device.diagnostics().drain()), vec![DiagnosticKind::InvalidState]);
}

#[test]
fn test_multi_target_pass_uses_first_clear() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let swapchain = device.create_swapchain(&swapchain_descriptor(64, 64)).unwrap();
    let mut list = frame_list(&device, swapchain);
    let red = ClearColor::new(1.0, 0.0, 0.0, 1.0);
    let green = ClearColor::new(0.0, 1.0, 0.0, 1.0);

    // --- 2. ACT ---
    list.begin_render_pass_multi_target(&[], TextureHandle::NULL, LoadAction::Clear, StoreAction::Store, &[red]);
    list.begin_render_pass_multi_target(
        &[TextureHandle(1), TextureHandle(2)],
        TextureHandle::NULL,
        LoadAction::Clear,
        StoreAction::Store,
        &[red, green],
    );

    // --- 3. ASSERT ---
    let commands = device.backend().journal().commands();
    let ops = commands
        .iter()
        .find_map(|c| match c {
            RecordedCommand::BeginRenderPass { ops, .. } => Some(*ops),
            _ => None,
        })
        .expect("the second call should open a pass");
    assert_eq!(ops.load, LoadOp::Clear(red));
    assert_eq!(kinds(&device.diagnostics().drain()), vec![DiagnosticKind::InvalidState]);
}

#[test]
fn test_unimplemented_operations_report() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let mut list = device.begin_command_list();
    let before = device.backend().journal().len();

    // --- 2. ACT ---
    list.set_index_buffer(BufferHandle(1), IndexFormat::Uint16, 0);
    list.draw_indexed(3, 1, 0, 0, 0);
    list.dispatch(8, 8, 1);
    list.copy_buffer(BufferHandle(1), BufferHandle(2), 0, 0, 4);
    list.copy_texture(TextureHandle(1), TextureHandle(2));
    list.copy_buffer_to_texture(BufferHandle(1), TextureHandle(2), 0, 0);

    // --- 3. ASSERT ---
    assert_eq!(device.backend().journal().len(), before);
    assert_eq!(
        kinds(&device.diagnostics().drain()),
        vec![DiagnosticKind::Unimplemented; 6]
    );
    assert_eq!(list.state(), CommandListState::Recording);
}

#[test]
fn test_debug_markers_only_inside_pass() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let swapchain = device.create_swapchain(&swapchain_descriptor(64, 64)).unwrap();
    let mut list = frame_list(&device, swapchain);

    // --- 2. ACT ---
    list.set_marker("ignored");
    list.begin_render_pass(
        TextureHandle::NULL,
        TextureHandle::NULL,
        LoadAction::Clear,
        StoreAction::Store,
        None,
    );
    list.begin_event("Opaque");
    list.set_marker("Triangle");
    list.end_event();

    // --- 3. ASSERT ---
    let commands = device.backend().journal().commands();
    let markers: Vec<_> = commands
        .iter()
        .filter(|c| {
            matches!(
                c,
                RecordedCommand::PushDebugGroup(_)
                    | RecordedCommand::InsertDebugMarker(_)
                    | RecordedCommand::PopDebugGroup
            )
        })
        .cloned()
        .collect();
    assert_eq!(
        markers,
        vec![
            RecordedCommand::PushDebugGroup("Opaque".to_string()),
            RecordedCommand::InsertDebugMarker("Triangle".to_string()),
            RecordedCommand::PopDebugGroup,
        ]
    );
    assert!(device.diagnostics().drain().is_empty());
}

#[test]
fn test_close_ends_open_pass_and_rejects_second_close() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let swapchain = device.create_swapchain(&swapchain_descriptor(64, 64)).unwrap();
    let mut list = frame_list(&device, swapchain);
    list.begin_render_pass(
        TextureHandle::NULL,
        TextureHandle::NULL,
        LoadAction::Clear,
        StoreAction::Store,
        None,
    );

    // --- 2. ACT ---
    list.close();
    list.close();

    // --- 3. ASSERT ---
    let journal = device.backend().journal();
    assert_eq!(journal.count(|c| matches!(c, RecordedCommand::EndRenderPass { .. })), 1);
    assert_eq!(journal.count(|c| matches!(c, RecordedCommand::Submit { .. })), 1);
    assert_eq!(list.state(), CommandListState::Submitted);
    assert!(!list.is_recording());
    assert_eq!(kinds(&device.diagnostics().drain()), vec![DiagnosticKind::InvalidState]);
}

#[test]
fn test_reset_discards_recording() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let swapchain = device.create_swapchain(&swapchain_descriptor(64, 64)).unwrap();
    let mut list = frame_list(&device, swapchain);
    list.begin_render_pass(
        TextureHandle::NULL,
        TextureHandle::NULL,
        LoadAction::Clear,
        StoreAction::Store,
        None,
    );

    // --- 2. ACT ---
    list.reset();
    list.begin();

    // --- 3. ASSERT ---
    let journal = device.backend().journal();
    assert_eq!(journal.count(|c| matches!(c, RecordedCommand::Submit { .. })), 0);
    assert_eq!(
        journal.count(|c| matches!(c, RecordedCommand::CreateCommandBuffer { .. })),
        2
    );
    assert!(!list.has_drawable());
    assert_eq!(list.active_pass(), PassKind::None);
    assert_eq!(list.state(), CommandListState::Recording);
}

#[test]
fn test_fenced_submission_signals_fence() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let fence = device.create_fence(0);
    let mut list = device.begin_command_list();

    // --- 2. ACT ---
    device.submit_command_list_with_fence(&mut list, fence, 7);

    // --- 3. ASSERT ---
    assert_eq!(device.get_fence_value(fence), 7);
    assert!(device.wait_for_fence(fence, 7));
    assert_eq!(
        device.backend().journal().count(|c| matches!(
            c,
            RecordedCommand::Submit {
                presented: None,
                fenced: true,
                ..
            }
        )),
        1
    );
}

#[test]
fn test_submission_with_unknown_fence_still_submits() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let mut list = device.begin_command_list();

    // --- 2. ACT ---
    device.submit_command_list_with_fence(&mut list, FenceHandle(99), 1);

    // --- 3. ASSERT ---
    assert_eq!(list.state(), CommandListState::Submitted);
    assert_eq!(
        device
            .backend()
            .journal()
            .count(|c| matches!(c, RecordedCommand::Submit { fenced: false, .. })),
        1
    );
    assert_eq!(kinds(&device.diagnostics().drain()), vec![DiagnosticKind::InvalidHandle]);
}

#[test]
fn test_destroyed_pipeline_stops_resolving_for_lists() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let swapchain = device.create_swapchain(&swapchain_descriptor(64, 64)).unwrap();
    let (vs, ps) = triangle_shaders(&device);
    let pipeline = device
        .create_graphics_pipeline_state(&triangle_pipeline_descriptor(vs, ps))
        .unwrap();
    let mut list = frame_list(&device, swapchain);
    list.begin_render_pass(
        TextureHandle::NULL,
        TextureHandle::NULL,
        LoadAction::Clear,
        StoreAction::Store,
        None,
    );

    // --- 2. ACT ---
    device.destroy_pipeline_state(pipeline);
    list.set_pipeline_state(pipeline);

    // --- 3. ASSERT ---
    assert_eq!(
        device
            .backend()
            .journal()
            .count(|c| matches!(c, RecordedCommand::SetPipeline { .. })),
        0
    );
    assert_eq!(kinds(&device.diagnostics().drain()), vec![DiagnosticKind::InvalidHandle]);
}
