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

//! Integration tests for command-list pooling and pipeline caching.

mod common;

use common::*;
use vesta_core::rhi::*;
use vesta_infra::graphics::headless::RecordedCommand;

#[test]
fn test_pool_reuses_released_lists() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let pool = CommandListPool::with_capacity(device.clone(), 1);

    // --- 2. ACT ---
    let first = pool.acquire();
    let second = pool.acquire();
    let during = pool.stats();
    pool.release_all([first, second]);
    let reused = pool.acquire();

    // --- 3. ASSERT ---
    assert_eq!(
        during,
        PoolStats {
            total: 2,
            available: 0,
            in_use: 2
        }
    );
    assert!(reused.is_recording());
    assert_eq!(
        pool.stats(),
        PoolStats {
            total: 2,
            available: 1,
            in_use: 1
        }
    );
}

#[test]
fn test_released_list_is_reset() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let swapchain = device.create_swapchain(&swapchain_descriptor(32, 32)).unwrap();
    let pool = CommandListPool::with_capacity(device.clone(), 0);
    let mut list = pool.acquire();
    device.present(swapchain);
    if let Some(drawable) = device.get_swapchain_drawable(swapchain) {
        list.set_drawable(drawable);
    }

    // --- 2. ACT ---
    pool.release(list);
    let list = pool.acquire();

    // --- 3. ASSERT ---
    assert!(!list.has_drawable());
    assert_eq!(list.state(), CommandListState::Recording);
    assert_eq!(
        device
            .backend()
            .journal()
            .count(|c| matches!(c, RecordedCommand::Submit { .. })),
        0
    );
}

#[test]
fn test_scoped_list_submits_and_returns_on_drop() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let pool = CommandListPool::new(device.clone());

    // --- 2. ACT ---
    {
        let mut scoped = pool.scoped();
        scoped.set_marker("outside any pass");
        assert_eq!(pool.stats().in_use, 1);
    }

    // --- 3. ASSERT ---
    assert_eq!(pool.stats().in_use, 0);
    assert_eq!(pool.stats().available, 4);
    assert_eq!(
        device
            .backend()
            .journal()
            .count(|c| matches!(c, RecordedCommand::Submit { .. })),
        1
    );
}

#[test]
fn test_pool_clear_keeps_lists_in_use() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let pool = CommandListPool::with_capacity(device, 3);
    let held = pool.acquire();

    // --- 2. ACT ---
    pool.clear();

    // --- 3. ASSERT ---
    assert_eq!(
        pool.stats(),
        PoolStats {
            total: 1,
            available: 0,
            in_use: 1
        }
    );
    pool.release(held);
    assert_eq!(pool.stats().available, 1);
}

#[test]
fn test_cache_hits_for_equal_descriptors() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let (vs, ps) = triangle_shaders(&device);
    let cache = PipelineCache::new(device.clone());
    let descriptor = triangle_pipeline_descriptor(vs, ps);
    let mut biased = triangle_pipeline_descriptor(vs, ps);
    biased.rasterizer.depth_bias = 2;

    // --- 2. ACT ---
    let first = cache.get_or_create(&descriptor).unwrap();
    let second = cache.get_or_create(&descriptor).unwrap();
    let third = cache.get_or_create(&biased).unwrap();

    // --- 3. ASSERT ---
    assert_eq!(first, second);
    assert_eq!(first, third);
    let stats = cache.stats();
    assert_eq!((stats.hits, stats.misses, stats.total), (2, 1, 1));
    assert_eq!(device.stats().pipelines, 1);
}

#[test]
fn test_cache_rebuilds_destroyed_pipeline_and_clears() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let (vs, ps) = triangle_shaders(&device);
    let cache = PipelineCache::new(device.clone());
    let descriptor = triangle_pipeline_descriptor(vs, ps);
    let original = cache.get_or_create(&descriptor).unwrap();

    // --- 2. ACT ---
    device.destroy_pipeline_state(original);
    let rebuilt = cache.get_or_create(&descriptor).unwrap();
    cache.clear();

    // --- 3. ASSERT ---
    assert_ne!(original, rebuilt);
    assert_eq!(cache.stats().misses, 2);
    assert_eq!(cache.stats().total, 0);
    assert!(device.pipeline_info(rebuilt).is_none());
}

#[test]
fn test_cache_propagates_creation_errors() {
    // --- 1. ARRANGE ---
    let device = headless_device();
    let cache = PipelineCache::new(device.clone());
    let descriptor = triangle_pipeline_descriptor(ShaderHandle(1), ShaderHandle(2));

    // --- 2. ACT ---
    let result = cache.get_or_create(&descriptor);

    // --- 3. ASSERT ---
    assert!(matches!(result, Err(ResourceError::Pipeline(_))));
    assert_eq!(cache.stats().total, 0);
}
