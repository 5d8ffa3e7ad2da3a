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

//! `vesta_command_list_*`: recording on a command list id.
//!
//! Misuse (recording outside a pass, unknown handles) is reported on the
//! owning device's diagnostics bus and otherwise ignored, exactly as with the
//! Rust API.

use crate::device::{accept, deref};
use crate::error::{DecodeError, DecodeResult};
use crate::registry::{self, dispatch, AnyCommandList};
use crate::types::{index_format, load_action, opt_slice, opt_str, shader_stage, store_action};
use std::ffi::c_char;
use std::sync::{Arc, Mutex, PoisonError};
use vesta_core::rhi::*;

/// Runs `$body` with command list `$id` locked, or evaluates to `$fallback`
/// when the id is unknown.
macro_rules! on_list {
    ($id:expr, $fallback:expr, $list:ident => $body:expr) => {
        match registry::command_list($id) {
            Some(shared) => {
                let mut guard = registry::lock(&shared);
                dispatch!(list &mut *guard, $list => $body)
            }
            None => $fallback,
        }
    };
}

/// # Safety
/// `ptr` must be null or readable for `count` values.
unsafe fn slice_arg<'a, T>(ptr: *const T, count: u32, what: &'static str) -> DecodeResult<&'a [T]> {
    // SAFETY: forwarded contract.
    unsafe { opt_slice(ptr, count as usize) }.ok_or(DecodeError::NullPointer(what))
}

// --- Lifetime ---

/// Unregisters the list, ending any open pass. Unsubmitted work is dropped.
#[no_mangle]
pub extern "C" fn vesta_command_list_destroy(list: u64) {
    let Some(shared) = registry::remove_command_list(list) else {
        log::warn!("FFI: vesta_command_list_destroy: unknown command list {list}");
        return;
    };
    match Arc::try_unwrap(shared) {
        Ok(mutex) => dispatch!(list Mutex::into_inner(mutex).unwrap_or_else(PoisonError::into_inner), l => l.destroy()),
        // Another call still holds it; the last reference drops it.
        Err(_) => log::debug!("FFI: Command list {list} released while in use"),
    }
}

/// Starts recording on an idle or submitted list.
#[no_mangle]
pub extern "C" fn vesta_command_list_begin(list: u64) {
    on_list!(list, (), l => l.begin())
}

/// Ends any open pass and commits the list without going through a device.
#[no_mangle]
pub extern "C" fn vesta_command_list_close(list: u64) {
    on_list!(list, (), l => l.close())
}

#[no_mangle]
pub extern "C" fn vesta_command_list_reset(list: u64) {
    on_list!(list, (), l => l.reset())
}

/// Moves the swapchain's current drawable, acquired by the last
/// [`vesta_device_present`](crate::device::vesta_device_present), onto the
/// list. The next pass renders into it and submission presents it.
///
/// Returns `false` when the swapchain holds no drawable.
#[no_mangle]
pub extern "C" fn vesta_command_list_set_drawable(list: u64, swapchain: u64) -> bool {
    on_list!(list, false, l => {
        let drawable = l.device().get_swapchain_drawable(SwapchainHandle(swapchain));
        match drawable {
            Some(drawable) => {
                l.set_drawable(drawable);
                true
            }
            None => false,
        }
    })
}

// --- Render passes ---

/// Opens a render pass on the attached drawable. `clear` may be null.
///
/// # Safety
/// `clear` must be null or point to a valid [`ClearColor`].
#[no_mangle]
pub unsafe extern "C" fn vesta_command_list_begin_render_pass(
    list: u64,
    color: u64,
    depth: u64,
    load: u32,
    store: u32,
    clear: *const ClearColor,
) {
    let Some((load, store)) = accept(
        "vesta_command_list_begin_render_pass",
        load_action(load).and_then(|l| Ok((l, store_action(store)?))),
    ) else {
        return;
    };
    // SAFETY: forwarded contract.
    let clear = unsafe { clear.as_ref() }.copied();
    on_list!(list, (), l => l.begin_render_pass(TextureHandle(color), TextureHandle(depth), load, store, clear))
}

/// Opens a render pass on the attached drawable, cleared with the first of
/// `clear_count` colors. `target_count` must be at least one.
///
/// # Safety
/// `targets` must be readable for `target_count` handles and `clears` for
/// `clear_count` colors.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn vesta_command_list_begin_render_pass_multi_target(
    list: u64,
    targets: *const u64,
    target_count: u32,
    depth: u64,
    load: u32,
    store: u32,
    clears: *const ClearColor,
    clear_count: u32,
) {
    // SAFETY: forwarded contract; texture handles are transparent over `u64`.
    let decoded = unsafe {
        slice_arg(targets.cast::<TextureHandle>(), target_count, "render targets").and_then(|targets| {
            Ok((
                targets,
                slice_arg(clears, clear_count, "clear colors")?,
                load_action(load)?,
                store_action(store)?,
            ))
        })
    };
    let Some((targets, clears, load, store)) = accept("vesta_command_list_begin_render_pass_multi_target", decoded)
    else {
        return;
    };
    on_list!(list, (), l => l.begin_render_pass_multi_target(targets, TextureHandle(depth), load, store, clears))
}

#[no_mangle]
pub extern "C" fn vesta_command_list_end_render_pass(list: u64) {
    on_list!(list, (), l => l.end_render_pass())
}

// --- State ---

#[no_mangle]
pub extern "C" fn vesta_command_list_set_pipeline_state(list: u64, pipeline: u64) {
    on_list!(list, (), l => l.set_pipeline_state(PipelineStateHandle(pipeline)))
}

#[no_mangle]
pub extern "C" fn vesta_command_list_set_vertex_buffer(list: u64, slot: u32, buffer: u64, stride: u32, offset: u64) {
    on_list!(list, (), l => l.set_vertex_buffer(slot, BufferHandle(buffer), stride, offset))
}

/// Not implemented; reported as such.
#[no_mangle]
pub extern "C" fn vesta_command_list_set_index_buffer(list: u64, buffer: u64, format: u32, offset: u64) {
    let Some(format) = accept("vesta_command_list_set_index_buffer", index_format(format)) else {
        return;
    };
    on_list!(list, (), l => l.set_index_buffer(BufferHandle(buffer), format, offset))
}

#[no_mangle]
pub extern "C" fn vesta_command_list_set_constant_buffer(list: u64, slot: u32, buffer: u64, offset: u64, stage: u32) {
    let Some(stage) = accept("vesta_command_list_set_constant_buffer", shader_stage(stage)) else {
        return;
    };
    on_list!(list, (), l => l.set_constant_buffer(stage, slot, BufferHandle(buffer), offset))
}

#[no_mangle]
pub extern "C" fn vesta_command_list_set_buffer(list: u64, slot: u32, buffer: u64, offset: u64, stage: u32) {
    let Some(stage) = accept("vesta_command_list_set_buffer", shader_stage(stage)) else {
        return;
    };
    on_list!(list, (), l => l.set_buffer(stage, slot, BufferHandle(buffer), offset))
}

#[no_mangle]
pub extern "C" fn vesta_command_list_set_texture(list: u64, slot: u32, texture: u64, stage: u32) {
    let Some(stage) = accept("vesta_command_list_set_texture", shader_stage(stage)) else {
        return;
    };
    on_list!(list, (), l => l.set_texture(stage, slot, TextureHandle(texture)))
}

/// # Safety
/// `viewport` must be null or valid.
#[no_mangle]
pub unsafe extern "C" fn vesta_command_list_set_viewport(list: u64, viewport: *const Viewport) {
    // SAFETY: forwarded contract.
    let Some(viewport) = accept("vesta_command_list_set_viewport", unsafe { deref(viewport, "viewport") }) else {
        return;
    };
    on_list!(list, (), l => l.set_viewport(viewport))
}

/// Only the first viewport is applied.
///
/// # Safety
/// `viewports` must be readable for `count` values.
#[no_mangle]
pub unsafe extern "C" fn vesta_command_list_set_viewports(list: u64, viewports: *const Viewport, count: u32) {
    // SAFETY: forwarded contract.
    let decoded = unsafe { slice_arg(viewports, count, "viewports") };
    let Some(viewports) = accept("vesta_command_list_set_viewports", decoded) else {
        return;
    };
    on_list!(list, (), l => l.set_viewports(viewports))
}

/// # Safety
/// `rect` must be null or valid.
#[no_mangle]
pub unsafe extern "C" fn vesta_command_list_set_scissor_rect(list: u64, rect: *const ScissorRect) {
    // SAFETY: forwarded contract.
    let Some(rect) = accept("vesta_command_list_set_scissor_rect", unsafe { deref(rect, "scissor rect") }) else {
        return;
    };
    on_list!(list, (), l => l.set_scissor_rect(rect))
}

/// Only the first rectangle is applied.
///
/// # Safety
/// `rects` must be readable for `count` values.
#[no_mangle]
pub unsafe extern "C" fn vesta_command_list_set_scissor_rects(list: u64, rects: *const ScissorRect, count: u32) {
    // SAFETY: forwarded contract.
    let decoded = unsafe { slice_arg(rects, count, "scissor rects") };
    let Some(rects) = accept("vesta_command_list_set_scissor_rects", decoded) else {
        return;
    };
    on_list!(list, (), l => l.set_scissor_rects(rects))
}

// --- Work ---

#[no_mangle]
pub extern "C" fn vesta_command_list_draw(
    list: u64,
    vertex_count: u32,
    instance_count: u32,
    start_vertex: u32,
    start_instance: u32,
) {
    on_list!(list, (), l => l.draw(vertex_count, instance_count, start_vertex, start_instance))
}

/// Not implemented; reported as such.
#[no_mangle]
pub extern "C" fn vesta_command_list_draw_indexed(
    list: u64,
    index_count: u32,
    instance_count: u32,
    start_index: u32,
    base_vertex: i32,
    start_instance: u32,
) {
    on_list!(list, (), l => l.draw_indexed(index_count, instance_count, start_index, base_vertex, start_instance))
}

/// Not implemented; reported as such.
#[no_mangle]
pub extern "C" fn vesta_command_list_dispatch(list: u64, groups_x: u32, groups_y: u32, groups_z: u32) {
    on_list!(list, (), l => l.dispatch(groups_x, groups_y, groups_z))
}

/// Not implemented; reported as such.
#[no_mangle]
pub extern "C" fn vesta_command_list_copy_buffer(
    list: u64,
    source: u64,
    destination: u64,
    source_offset: u64,
    destination_offset: u64,
    size: u64,
) {
    on_list!(list, (), l => l.copy_buffer(
        BufferHandle(source),
        BufferHandle(destination),
        source_offset,
        destination_offset,
        size,
    ))
}

/// Not implemented; reported as such.
#[no_mangle]
pub extern "C" fn vesta_command_list_copy_texture(list: u64, source: u64, destination: u64) {
    on_list!(list, (), l => l.copy_texture(TextureHandle(source), TextureHandle(destination)))
}

/// Not implemented; reported as such.
#[no_mangle]
pub extern "C" fn vesta_command_list_copy_buffer_to_texture(
    list: u64,
    source: u64,
    destination: u64,
    mip_level: u32,
    array_slice: u32,
) {
    on_list!(list, (), l => l.copy_buffer_to_texture(
        BufferHandle(source),
        TextureHandle(destination),
        mip_level,
        array_slice,
    ))
}

// --- Debug markers ---

/// # Safety
/// `name` must be null or NUL-terminated.
#[no_mangle]
pub unsafe extern "C" fn vesta_command_list_begin_event(list: u64, name: *const c_char) {
    // SAFETY: forwarded contract.
    let name = unsafe { opt_str(name) }.unwrap_or_default();
    on_list!(list, (), l => l.begin_event(&name))
}

#[no_mangle]
pub extern "C" fn vesta_command_list_end_event(list: u64) {
    on_list!(list, (), l => l.end_event())
}

/// # Safety
/// `name` must be null or NUL-terminated.
#[no_mangle]
pub unsafe extern "C" fn vesta_command_list_set_marker(list: u64, name: *const c_char) {
    // SAFETY: forwarded contract.
    let name = unsafe { opt_str(name) }.unwrap_or_default();
    on_list!(list, (), l => l.set_marker(&name))
}
