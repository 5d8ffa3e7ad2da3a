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

//! Integration tests for swapchain creation, drawable acquisition and the
//! backbuffer wrappers.

mod common;

use common::*;
use vesta_core::rhi::*;
use vesta_core::DiagnosticKind;
use vesta_infra::graphics::headless::RecordedCommand;
use vesta_infra::HeadlessBackend;

#[test]
fn test_swapchain_requires_window_and_extent() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let windowless = SwapchainDescriptor {
        width: 640,
        height: 480,
        ..Default::default()
    };

    // --- 2. ACT ---
    let missing = device.create_swapchain(&windowless);
    let empty = device.create_swapchain(&swapchain_descriptor(0, 480));

    // --- 3. ASSERT ---
    assert!(matches!(missing, Err(ResourceError::MissingWindowHandle)));
    assert!(matches!(empty, Err(ResourceError::InvalidDescriptor(_))));
    assert_eq!(device.stats().swapchains, 0);
}

#[test]
fn test_backbuffer_is_presentation_format_with_fresh_handles() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let mut descriptor = swapchain_descriptor(640, 480);
    descriptor.format = TextureFormat::Rgba8Unorm;
    let swapchain = device.create_swapchain(&descriptor).unwrap();
    assert!(device.present(swapchain));

    // --- 2. ACT ---
    let first = device.get_swapchain_backbuffer(swapchain);
    let second = device.get_swapchain_backbuffer(swapchain);

    // --- 3. ASSERT ---
    assert!(first.is_valid() && second.is_valid());
    assert_ne!(first, second);
    let info = device.texture_info(first).unwrap();
    assert_eq!(info.format, TextureFormat::PRESENTATION);
    assert_eq!((info.width, info.height), (640, 480));
    assert_eq!(info.usage, TextureUsage::RENDER_TARGET);
    assert!(info.is_backbuffer);
    assert_eq!(info.label.as_deref(), Some("Test Swapchain"));
    assert_eq!(device.stats().textures, 2);
    assert_eq!(device.get_swapchain_current_index(swapchain), 0);
}

#[test]
fn test_backbuffer_before_first_present_is_null() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let swapchain = device.create_swapchain(&swapchain_descriptor(64, 64)).unwrap();

    // --- 2. ACT ---
    let backbuffer = device.get_swapchain_backbuffer(swapchain);
    let unknown = device.get_swapchain_backbuffer(SwapchainHandle(77));

    // --- 3. ASSERT ---
    assert!(backbuffer.is_null());
    assert!(unknown.is_null());
    assert!(device.get_swapchain_drawable(swapchain).is_none());
    assert_eq!(
        kinds(&device.diagnostics().drain()),
        vec![DiagnosticKind::InvalidState, DiagnosticKind::InvalidHandle]
    );
}

#[test]
fn test_upload_to_backbuffer_is_rejected() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let swapchain = device.create_swapchain(&swapchain_descriptor(4, 4)).unwrap();
    device.present(swapchain);
    let backbuffer = device.get_swapchain_backbuffer(swapchain);

    // --- 2. ACT ---
    let result = device.upload_texture_data(backbuffer, &[0u8; 64], 0, 0);

    // --- 3. ASSERT ---
    assert!(matches!(result, Err(ResourceError::InvalidDescriptor(_))));
    assert_eq!(kinds(&device.diagnostics().drain()), vec![DiagnosticKind::InvalidState]);
}

#[test]
fn test_present_reports_lost_surface_and_recovers() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let swapchain = device.create_swapchain(&swapchain_descriptor(64, 64)).unwrap();
    device.backend().set_surfaces_lost(true);

    // --- 2. ACT ---
    let while_lost = device.present(swapchain);
    device.backend().set_surfaces_lost(false);
    let recovered = device.present(swapchain);
    let again = device.present(swapchain);

    // --- 3. ASSERT ---
    assert!(!while_lost);
    assert!(recovered);
    assert!(again);
    assert_eq!(kinds(&device.diagnostics().drain()), vec![DiagnosticKind::Backend]);
    // Only the drawable acquired by `recovered` was pending when `again` ran.
    assert_eq!(
        device
            .backend()
            .journal()
            .count(|c| matches!(c, RecordedCommand::Present { .. })),
        1
    );
}

#[test]
fn test_drawable_taken_by_list_is_presented_on_submit() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let swapchain = device.create_swapchain(&swapchain_descriptor(64, 64)).unwrap();
    let mut list = frame_list(&device, swapchain);

    // --- 2. ACT ---
    device.submit_command_list(&mut list);
    let next = device.present(swapchain);

    // --- 3. ASSERT ---
    assert!(next);
    let journal = device.backend().journal();
    assert_eq!(journal.count(|c| matches!(c, RecordedCommand::Present { .. })), 0);
    assert_eq!(
        journal.count(|c| matches!(c, RecordedCommand::Submit { presented: Some(_), .. })),
        1
    );
}

#[test]
fn test_resize_swapchain() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let swapchain = device.create_swapchain(&swapchain_descriptor(640, 480)).unwrap();
    device.present(swapchain);

    // --- 2. ACT ---
    let zero = device.resize_swapchain(swapchain, 0, 600);
    let unknown = device.resize_swapchain(SwapchainHandle(123), 800, 600);
    let resized = device.resize_swapchain(swapchain, 800, 600);

    // --- 3. ASSERT ---
    assert!(!zero);
    assert!(!unknown);
    assert!(resized);
    assert_eq!(device.swapchain_extent(swapchain), Some((800, 600)));
    // The drawable of the old size was dropped by the resize.
    assert!(device.get_swapchain_drawable(swapchain).is_none());
    assert!(device.present(swapchain));
    let backbuffer = device.get_swapchain_backbuffer(swapchain);
    let info = device.texture_info(backbuffer).unwrap();
    assert_eq!((info.width, info.height), (800, 600));
}

#[test]
fn test_resize_while_drawable_is_lent_waits_for_next_present() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let swapchain = device.create_swapchain(&swapchain_descriptor(640, 480)).unwrap();
    let mut list = frame_list(&device, swapchain);
    let configures = |device: &Device<HeadlessBackend>| {
        device
            .backend()
            .journal()
            .count(|c| matches!(c, RecordedCommand::ConfigureSurface { .. }))
    };

    // --- 2. ACT ---
    let resized = device.resize_swapchain(swapchain, 1024, 768);
    let configures_mid_frame = configures(&device);
    device.submit_command_list(&mut list);
    let presented = device.present(swapchain);

    // --- 3. ASSERT ---
    assert!(resized);
    assert_eq!(configures_mid_frame, 0);
    assert_eq!(device.swapchain_extent(swapchain), Some((1024, 768)));
    assert!(presented);
    let journal = device.backend().journal();
    assert_eq!(
        journal.count(|c| matches!(
            c,
            RecordedCommand::ConfigureSurface {
                width: 1024,
                height: 768,
                ..
            }
        )),
        1
    );
    assert_eq!(
        journal.count(|c| matches!(c, RecordedCommand::Submit { presented: Some(_), .. })),
        1
    );
    assert!(device.diagnostics().drain().is_empty());
}

#[test]
fn test_destroyed_swapchain_stops_presenting() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let swapchain = device.create_swapchain(&swapchain_descriptor(64, 64)).unwrap();

    // --- 2. ACT ---
    device.destroy_swapchain(swapchain);
    device.destroy_swapchain(swapchain);

    // --- 3. ASSERT ---
    assert!(!device.present(swapchain));
    assert!(device.swapchain_extent(swapchain).is_none());
    assert_eq!(device.stats().swapchains, 0);
}
