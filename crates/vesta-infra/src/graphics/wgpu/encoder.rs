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

use super::backend::{WgpuBackend, WgpuBuffer, WgpuPipeline};
use crate::graphics::shader::{bind_group_for_stage, BindingKind, ShaderBinding};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;
use std::sync::Arc;
use vesta_core::rhi::{RenderEncoder, ScissorRect, ShaderStage, Viewport};

/// A resource set for a stage slot, waiting for the next draw.
#[derive(Debug)]
enum BoundResource {
    Buffer { buffer: wgpu::Buffer, offset: u64 },
    Texture(wgpu::TextureView),
}

/// An open WGPU render pass.
///
/// Stage resources are collected per `(group, binding)` and turned into bind
/// groups right before a draw, using the layout reflected from the pipeline's
/// shaders.
pub struct WgpuRenderEncoder {
    pub(crate) pass: wgpu::RenderPass<'static>,
    device: wgpu::Device,
    sampler: wgpu::Sampler,
    target_size: (u32, u32),
    pipeline: Option<(wgpu::RenderPipeline, Arc<[ShaderBinding]>)>,
    bound: BTreeMap<(u32, u32), BoundResource>,
    dirty: bool,
}

impl WgpuRenderEncoder {
    pub(crate) fn new(
        pass: wgpu::RenderPass<'static>,
        device: wgpu::Device,
        sampler: wgpu::Sampler,
        target_size: (u32, u32),
    ) -> Self {
        Self {
            pass,
            device,
            sampler,
            target_size,
            pipeline: None,
            bound: BTreeMap::new(),
            dirty: false,
        }
    }

    fn bind(&mut self, stage: ShaderStage, index: u32, resource: BoundResource) {
        self.bound.insert((bind_group_for_stage(stage), index), resource);
        self.dirty = true;
    }

    /// Builds and sets the bind groups the current pipeline needs.
    /// Returns `false` when a draw must be skipped.
    fn flush_bindings(&mut self) -> bool {
        let Some((pipeline, bindings)) = &self.pipeline else {
            log::warn!("WgpuRenderEncoder: draw issued without a pipeline, skipped.");
            return false;
        };
        if !self.dirty {
            return true;
        }

        let groups: BTreeSet<u32> = bindings.iter().map(|b| b.group).collect();
        for group in groups {
            let mut entries = Vec::new();
            for slot in bindings.iter().filter(|b| b.group == group) {
                let resource = match (slot.kind, self.bound.get(&(slot.group, slot.binding))) {
                    (BindingKind::Sampler, _) => wgpu::BindingResource::Sampler(&self.sampler),
                    (BindingKind::Buffer, Some(BoundResource::Buffer { buffer, offset })) => {
                        wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                            buffer,
                            offset: *offset,
                            size: None,
                        })
                    }
                    (BindingKind::Texture, Some(BoundResource::Texture(view))) => {
                        wgpu::BindingResource::TextureView(view)
                    }
                    (kind, _) => {
                        log::warn!(
                            "WgpuRenderEncoder: no {kind:?} bound at group {} binding {}, draw skipped.",
                            slot.group,
                            slot.binding
                        );
                        return false;
                    }
                };
                entries.push(wgpu::BindGroupEntry {
                    binding: slot.binding,
                    resource,
                });
            }

            let layout = pipeline.get_bind_group_layout(group);
            let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Vesta Stage Bindings"),
                layout: &layout,
                entries: &entries,
            });
            self.pass.set_bind_group(group, &bind_group, &[]);
        }
        self.dirty = false;
        true
    }
}

impl RenderEncoder<WgpuBackend> for WgpuRenderEncoder {
    fn set_pipeline(&mut self, pipeline: &WgpuPipeline) {
        self.pass.set_pipeline(&pipeline.raw);
        self.pipeline = Some((pipeline.raw.clone(), pipeline.bindings.clone()));
        self.dirty = true;
    }

    fn set_vertex_buffer(&mut self, slot: u32, buffer: &WgpuBuffer, offset: u64) {
        self.pass.set_vertex_buffer(slot, buffer.raw.slice(offset..));
    }

    fn set_stage_buffer(&mut self, stage: ShaderStage, index: u32, buffer: &WgpuBuffer, offset: u64) {
        self.bind(
            stage,
            index,
            BoundResource::Buffer {
                buffer: buffer.raw.clone(),
                offset,
            },
        );
    }

    fn set_stage_texture(&mut self, stage: ShaderStage, index: u32, texture: &wgpu::Texture) {
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.bind(stage, index, BoundResource::Texture(view));
    }

    fn set_viewport(&mut self, viewport: &Viewport) {
        self.pass.set_viewport(
            viewport.x,
            viewport.y,
            viewport.width,
            viewport.height,
            viewport.min_depth,
            viewport.max_depth,
        );
    }

    fn set_scissor_rect(&mut self, rect: &ScissorRect) {
        // WGPU rejects rectangles leaving the attachment.
        let (target_width, target_height) = self.target_size;
        let x = (rect.left.max(0) as u32).min(target_width);
        let y = (rect.top.max(0) as u32).min(target_height);
        let width = rect.width().min(target_width - x);
        let height = rect.height().min(target_height - y);
        self.pass.set_scissor_rect(x, y, width, height);
    }

    fn draw(&mut self, vertices: Range<u32>, instances: Range<u32>) {
        if self.flush_bindings() {
            self.pass.draw(vertices, instances);
        }
    }

    fn push_debug_group(&mut self, label: &str) {
        self.pass.push_debug_group(label);
    }

    fn pop_debug_group(&mut self) {
        self.pass.pop_debug_group();
    }

    fn insert_debug_marker(&mut self, label: &str) {
        self.pass.insert_debug_marker(label);
    }
}
