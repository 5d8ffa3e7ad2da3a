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

//! Integration tests for the per-frame fence ring and the frame pacer.

mod common;

use common::*;
use vesta_core::rhi::*;
use vesta_core::DiagnosticKind;
use vesta_infra::graphics::headless::RecordedCommand;

#[test]
fn test_frame_fences_cycle_through_slots() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let mut fences = FrameFences::new(device.clone());
    let mut slots = Vec::new();

    // --- 2. ACT ---
    for _ in 0..FRAME_SLOTS + 1 {
        assert!(fences.begin_frame());
        slots.push(fences.current_index());
        let mut list = device.begin_command_list();
        fences.end_frame(&mut list);
    }

    // --- 3. ASSERT ---
    assert_eq!(slots, vec![0, 1, 2, 0]);
    assert_eq!(fences.current_index(), 1);
    assert_eq!(fences.current_value(), 1);
    assert_eq!(device.stats().fences, FRAME_SLOTS);
    let journal = device.backend().journal();
    assert_eq!(
        journal.count(|c| matches!(c, RecordedCommand::Submit { fenced: true, .. })),
        4
    );
    // Every slot was signalled on submission, so no wait drained the queue.
    assert_eq!(journal.count(|c| matches!(c, RecordedCommand::WaitIdle)), 0);
    assert!(device.diagnostics().drain().is_empty());
}

#[test]
fn test_begin_frame_reports_slot_that_never_completes() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let mut fences = FrameFences::new(device.clone());
    // An idle list is never committed, so slot 0 is never signalled.
    let mut idle = CommandList::new(device.clone());
    fences.end_frame(&mut idle);
    fences.skip_frame();
    fences.skip_frame();

    // --- 2. ACT ---
    let ready = fences.begin_frame();

    // --- 3. ASSERT ---
    assert!(!ready);
    assert_eq!(fences.current_index(), 0);
    assert_eq!(device.get_fence_value(fences.current_fence()), 0);
    assert_eq!(
        device
            .backend()
            .journal()
            .count(|c| matches!(c, RecordedCommand::WaitIdle)),
        1
    );
    assert_eq!(
        kinds(&device.diagnostics().drain()),
        vec![DiagnosticKind::InvalidState, DiagnosticKind::InvalidState]
    );
}

#[test]
fn test_dropping_fences_releases_them() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let mut fences = FrameFences::new(device.clone());
    let mut list = device.begin_command_list();
    fences.end_frame(&mut list);

    // --- 2. ACT ---
    drop(fences);

    // --- 3. ASSERT ---
    assert_eq!(device.stats().fences, 0);
    assert!(device.diagnostics().drain().is_empty());
}

#[test]
fn test_pacer_counts_frames_and_indexes_per_frame_resources() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let mut pacer = FramePacer::new(device.clone());
    let constants = PerFrame::new(|slot| {
        device
            .create_buffer(&BufferDescriptor {
                label: Some(format!("Frame Constants {slot}").into()),
                size: 64,
                usage: BufferUsage::CONSTANT,
                ..Default::default()
            })
            .unwrap()
    });
    let mut written = Vec::new();

    // --- 2. ACT ---
    for frame in 0..5u8 {
        assert!(pacer.begin_frame());
        let buffer = *constants.current(&pacer);
        device.update_buffer(buffer, &[frame; 64], 0).unwrap();
        written.push(buffer);
        let mut list = device.begin_command_list();
        pacer.end_frame(&mut list);
    }
    let idle = pacer.wait_for_idle();

    // --- 3. ASSERT ---
    assert!(idle);
    assert_eq!(pacer.frame_number(), 5);
    assert_eq!(pacer.frame_index(), 5 % FRAME_SLOTS);
    assert_eq!(written[0], written[3]);
    assert_eq!(written[1], written[4]);
    assert_ne!(written[0], written[1]);
    assert_eq!(device.read_buffer_data(written[3], 0, 1).unwrap(), vec![3]);
    assert!(pacer.fps() >= 0.0);
    assert!(device.diagnostics().drain().is_empty());
}
