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

//! Deduplication of graphics pipeline states.

use crate::rhi::api::*;
use crate::rhi::device::Device;
use crate::rhi::error::ResourceError;
use crate::rhi::traits::RhiBackend;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// The parts of a [`GraphicsPipelineDescriptor`] that identify a cached pipeline.
///
/// Rasterizer bias values and per-target blend factors are not part of the
/// key; descriptors differing only in those share a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    vertex_shader: ShaderHandle,
    pixel_shader: ShaderHandle,
    topology: PrimitiveTopology,
    fill_mode: FillMode,
    cull_mode: CullMode,
    depth_enable: bool,
    depth_write_enable: bool,
    blend_enable: bool,
    render_target_formats: Vec<TextureFormat>,
    depth_stencil_format: TextureFormat,
    vertex_layout: VertexLayout,
}

impl From<&GraphicsPipelineDescriptor<'_>> for PipelineKey {
    fn from(desc: &GraphicsPipelineDescriptor<'_>) -> Self {
        Self {
            vertex_shader: desc.vertex_shader,
            pixel_shader: desc.pixel_shader,
            topology: desc.topology,
            fill_mode: desc.rasterizer.fill_mode,
            cull_mode: desc.rasterizer.cull_mode,
            depth_enable: desc.depth_stencil.depth_enable,
            depth_write_enable: desc.depth_stencil.depth_write_enable,
            blend_enable: desc.blend.target(0).blend_enable,
            render_target_formats: desc.render_target_formats.clone(),
            depth_stencil_format: desc.depth_stencil_format,
            vertex_layout: desc.vertex_layout.clone(),
        }
    }
}

/// Hit and miss counters of a [`PipelineCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineCacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that built a pipeline.
    pub misses: u64,
    /// Pipelines currently cached.
    pub total: usize,
}

/// Builds each distinct graphics pipeline once and hands out the same handle afterwards.
#[derive(Debug)]
pub struct PipelineCache<B: RhiBackend> {
    device: Device<B>,
    entries: Mutex<HashMap<PipelineKey, PipelineStateHandle>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<B: RhiBackend> PipelineCache<B> {
    /// Creates an empty cache on `device`.
    pub fn new(device: Device<B>) -> Self {
        Self {
            device,
            entries: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns the cached pipeline for `descriptor`, building it on a miss.
    ///
    /// A cached handle that was destroyed behind the cache's back counts as a
    /// miss and is rebuilt.
    pub fn get_or_create(&self, descriptor: &GraphicsPipelineDescriptor) -> Result<PipelineStateHandle, ResourceError> {
        let key = PipelineKey::from(descriptor);
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(&handle) = entries.get(&key) {
            if self.device.pipeline_info(handle).is_some() {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(handle);
            }
            entries.remove(&key);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let handle = self.device.create_graphics_pipeline_state(descriptor)?;
        entries.insert(key, handle);
        log::debug!(
            "PipelineCache: Cached pipeline {} (total: {}).",
            handle,
            entries.len()
        );
        Ok(handle)
    }

    /// Destroys every cached pipeline state.
    pub fn clear(&self) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let count = entries.len();
        for (_, handle) in entries.drain() {
            self.device.destroy_pipeline_state(handle);
        }
        log::info!("PipelineCache: Cleared {count} pipelines.");
    }

    /// Current counters.
    pub fn stats(&self) -> PipelineCacheStats {
        PipelineCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            total: self
                .entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .len(),
        }
    }
}
