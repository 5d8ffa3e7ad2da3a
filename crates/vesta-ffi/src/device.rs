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

//! `vesta_device_*`: device lifetime, resources, swapchains, fences and
//! command-list submission.
//!
//! Resource creation returns the new handle's raw value, `0` on failure.
//! Pointer arguments are read only for the duration of the call.

use crate::error::{DecodeError, DecodeResult};
use crate::registry::{self, dispatch, AnyCommandList, AnyDevice};
use crate::types::{
    opt_bytes, resource_state, VestaBufferDesc, VestaComputePipelineDesc, VestaDeviceDesc,
    VestaGraphicsPipelineDesc, VestaShaderDesc, VestaSwapchainDesc, VestaTextureDesc,
};
use std::ffi::{c_char, c_void};
use vesta_core::rhi::*;
use vesta_infra::{HeadlessBackend, WgpuBackend};

/// Runs `$body` against device `$id`, or evaluates to `$fallback` when the id
/// is unknown.
macro_rules! on_device {
    ($id:expr, $fallback:expr, $device:ident => $body:expr) => {
        match registry::device($id) {
            Some(any) => dispatch!(&any, $device => $body),
            None => $fallback,
        }
    };
}

/// Logs a rejected argument and drops it.
pub(crate) fn accept<T>(function: &str, decoded: DecodeResult<T>) -> Option<T> {
    decoded.map_err(|e| log::error!("FFI: {function}: {e}")).ok()
}

/// # Safety
/// `ptr` must be null or point to a valid `T`.
pub(crate) unsafe fn deref<'a, T>(ptr: *const T, what: &'static str) -> DecodeResult<&'a T> {
    // SAFETY: forwarded contract.
    unsafe { ptr.as_ref() }.ok_or(DecodeError::NullPointer(what))
}

/// Copies `text` into `buffer` NUL-terminated and truncated to `capacity`,
/// and returns the full length of `text` in bytes.
///
/// # Safety
/// `buffer` must be null or writable for `capacity` bytes.
unsafe fn write_c_string(text: &str, buffer: *mut c_char, capacity: usize) -> usize {
    if !buffer.is_null() && capacity > 0 {
        // SAFETY: writable for `capacity` bytes per the caller's contract.
        let out = unsafe { std::slice::from_raw_parts_mut(buffer.cast::<u8>(), capacity) };
        let copied = text.len().min(capacity - 1);
        out[..copied].copy_from_slice(&text.as_bytes()[..copied]);
        out[copied] = 0;
    }
    text.len()
}

// --- Lifetime ---

/// Creates a device and returns its id, `0` on failure.
///
/// The headless backend is used when `desc.backend` asks for it; every other
/// value goes through wgpu, which picks the native API.
///
/// # Safety
/// `desc` must be null or point to a valid descriptor whose strings are
/// NUL-terminated.
#[no_mangle]
pub unsafe extern "C" fn vesta_device_create(desc: *const VestaDeviceDesc) -> u64 {
    // SAFETY: forwarded contract.
    let decoded = unsafe { deref(desc, "device descriptor").and_then(|d| d.decode()) };
    let Some(config) = accept("vesta_device_create", decoded) else {
        return 0;
    };
    let device = match config.backend {
        GraphicsBackendType::Headless => AnyDevice::Headless(Device::new(HeadlessBackend::new(), config)),
        _ => match WgpuBackend::new(&config) {
            Ok(backend) => AnyDevice::Wgpu(Device::new(backend, config)),
            Err(e) => {
                log::error!("FFI: vesta_device_create: {e}");
                return 0;
            }
        },
    };
    let id = registry::insert_device(device);
    log::info!("FFI: Created device {id}");
    id
}

/// Releases a device and every resource it owns. Command lists recorded on
/// it stay registered until destroyed, but stop resolving handles.
#[no_mangle]
pub extern "C" fn vesta_device_destroy(device: u64) {
    match registry::remove_device(device) {
        Some(any) => dispatch!(any, d => d.destroy()),
        None => log::warn!("FFI: vesta_device_destroy: unknown device {device}"),
    }
}

/// Writes the adapter name into `buffer` and returns its full length.
///
/// # Safety
/// `buffer` must be null or writable for `capacity` bytes.
#[no_mangle]
pub unsafe extern "C" fn vesta_device_get_name(device: u64, buffer: *mut c_char, capacity: usize) -> usize {
    // SAFETY: forwarded contract.
    on_device!(device, 0, d => unsafe { write_c_string(d.device_name(), buffer, capacity) })
}

/// Writes the graphics API name into `buffer` and returns its full length.
///
/// # Safety
/// `buffer` must be null or writable for `capacity` bytes.
#[no_mangle]
pub unsafe extern "C" fn vesta_device_get_api_name(device: u64, buffer: *mut c_char, capacity: usize) -> usize {
    // SAFETY: forwarded contract.
    on_device!(device, 0, d => unsafe { write_c_string(d.api_name(), buffer, capacity) })
}

#[no_mangle]
pub extern "C" fn vesta_device_wait_for_idle(device: u64) {
    on_device!(device, (), d => d.wait_for_idle())
}

// --- Buffers ---

/// # Safety
/// `desc` must be null or valid, its `initial_data` readable for `size`
/// bytes when set.
#[no_mangle]
pub unsafe extern "C" fn vesta_device_create_buffer(device: u64, desc: *const VestaBufferDesc) -> u64 {
    // SAFETY: forwarded contract.
    let decoded = unsafe { deref(desc, "buffer descriptor").and_then(|d| d.decode()) };
    let Some(desc) = accept("vesta_device_create_buffer", decoded) else {
        return 0;
    };
    on_device!(device, 0, d => d.create_buffer(&desc).map_or(0, |h| h.raw()))
}

#[no_mangle]
pub extern "C" fn vesta_device_destroy_buffer(device: u64, buffer: u64) {
    on_device!(device, (), d => d.destroy_buffer(BufferHandle(buffer)))
}

/// Copies `size` bytes into the buffer at `offset`.
///
/// # Safety
/// `data` must be readable for `size` bytes.
#[no_mangle]
pub unsafe extern "C" fn vesta_device_upload_buffer_data(
    device: u64,
    buffer: u64,
    data: *const c_void,
    size: usize,
    offset: u64,
) -> bool {
    // SAFETY: forwarded contract.
    let Some(bytes) = accept("vesta_device_upload_buffer_data", unsafe { source_bytes(data, size) }) else {
        return false;
    };
    on_device!(device, false, d => d.upload_buffer_data(BufferHandle(buffer), bytes, offset).is_ok())
}

/// Same as [`vesta_device_upload_buffer_data`].
///
/// # Safety
/// `data` must be readable for `size` bytes.
#[no_mangle]
pub unsafe extern "C" fn vesta_device_update_buffer(
    device: u64,
    buffer: u64,
    data: *const c_void,
    size: usize,
    offset: u64,
) -> bool {
    // SAFETY: forwarded contract.
    let Some(bytes) = accept("vesta_device_update_buffer", unsafe { source_bytes(data, size) }) else {
        return false;
    };
    on_device!(device, false, d => d.update_buffer(BufferHandle(buffer), bytes, offset).is_ok())
}

/// Reads `size` bytes starting at `offset` into `out`.
///
/// # Safety
/// `out` must be writable for `size` bytes.
#[no_mangle]
pub unsafe extern "C" fn vesta_device_read_buffer_data(
    device: u64,
    buffer: u64,
    offset: u64,
    out: *mut c_void,
    size: usize,
) -> bool {
    if out.is_null() {
        log::error!("FFI: vesta_device_read_buffer_data: {}", DecodeError::NullPointer("output"));
        return false;
    }
    let read = on_device!(device, None, d => d.read_buffer_data(BufferHandle(buffer), offset, size as u64).ok());
    let Some(bytes) = read else {
        return false;
    };
    // SAFETY: `out` is writable for `size` bytes and `bytes` holds exactly `size`.
    unsafe { std::ptr::copy_nonoverlapping(bytes.as_ptr(), out.cast::<u8>(), bytes.len().min(size)) };
    true
}

/// # Safety
/// `data` must be null or readable for `size` bytes.
unsafe fn source_bytes<'a>(data: *const c_void, size: usize) -> DecodeResult<&'a [u8]> {
    if size == 0 {
        return Ok(&[]);
    }
    // SAFETY: forwarded contract.
    unsafe { opt_bytes(data, size) }.ok_or(DecodeError::NullPointer("data"))
}

// --- Textures ---

/// # Safety
/// `desc` must be null or valid.
#[no_mangle]
pub unsafe extern "C" fn vesta_device_create_texture(device: u64, desc: *const VestaTextureDesc) -> u64 {
    // SAFETY: forwarded contract.
    let decoded = unsafe { deref(desc, "texture descriptor").and_then(|d| d.decode()) };
    let Some(desc) = accept("vesta_device_create_texture", decoded) else {
        return 0;
    };
    on_device!(device, 0, d => d.create_texture(&desc).map_or(0, |h| h.raw()))
}

#[no_mangle]
pub extern "C" fn vesta_device_destroy_texture(device: u64, texture: u64) {
    on_device!(device, (), d => d.destroy_texture(TextureHandle(texture)))
}

/// Replaces one subresource with `size` tightly packed bytes.
///
/// # Safety
/// `data` must be readable for `size` bytes.
#[no_mangle]
pub unsafe extern "C" fn vesta_device_upload_texture_data(
    device: u64,
    texture: u64,
    data: *const c_void,
    size: usize,
    mip_level: u32,
    array_slice: u32,
) -> bool {
    // SAFETY: forwarded contract.
    let Some(bytes) = accept("vesta_device_upload_texture_data", unsafe { source_bytes(data, size) }) else {
        return false;
    };
    on_device!(device, false, d => d
        .upload_texture_data(TextureHandle(texture), bytes, mip_level, array_slice)
        .is_ok())
}

// --- Shaders and pipelines ---

/// # Safety
/// `desc` must be null or valid, its source readable for `source_size` bytes.
#[no_mangle]
pub unsafe extern "C" fn vesta_device_create_shader(device: u64, desc: *const VestaShaderDesc) -> u64 {
    // SAFETY: forwarded contract.
    let decoded = unsafe { deref(desc, "shader descriptor").and_then(|d| d.decode()) };
    let Some(desc) = accept("vesta_device_create_shader", decoded) else {
        return 0;
    };
    on_device!(device, 0, d => d.create_shader(&desc).map_or(0, |h| h.raw()))
}

#[no_mangle]
pub extern "C" fn vesta_device_destroy_shader(device: u64, shader: u64) {
    on_device!(device, (), d => d.destroy_shader(ShaderHandle(shader)))
}

/// # Safety
/// `desc` must be null or valid, its vertex elements readable for
/// `element_count` entries.
#[no_mangle]
pub unsafe extern "C" fn vesta_device_create_graphics_pipeline_state(
    device: u64,
    desc: *const VestaGraphicsPipelineDesc,
) -> u64 {
    // SAFETY: forwarded contract.
    let decoded = unsafe { deref(desc, "pipeline descriptor").and_then(|d| d.decode()) };
    let Some(desc) = accept("vesta_device_create_graphics_pipeline_state", decoded) else {
        return 0;
    };
    on_device!(device, 0, d => d.create_graphics_pipeline_state(&desc).map_or(0, |h| h.raw()))
}

/// Always fails: compute pipelines are not supported yet.
///
/// # Safety
/// `desc` must be null or valid.
#[no_mangle]
pub unsafe extern "C" fn vesta_device_create_compute_pipeline_state(
    device: u64,
    desc: *const VestaComputePipelineDesc,
) -> u64 {
    // SAFETY: forwarded contract.
    let decoded = unsafe { deref(desc, "pipeline descriptor").map(|d| d.decode()) };
    let Some(desc) = accept("vesta_device_create_compute_pipeline_state", decoded) else {
        return 0;
    };
    on_device!(device, 0, d => d.create_compute_pipeline_state(&desc).map_or(0, |h| h.raw()))
}

#[no_mangle]
pub extern "C" fn vesta_device_destroy_pipeline_state(device: u64, pipeline: u64) {
    on_device!(device, (), d => d.destroy_pipeline_state(PipelineStateHandle(pipeline)))
}

// --- Swapchains ---

/// The window handles in `desc` must stay valid until the swapchain is
/// destroyed.
///
/// # Safety
/// `desc` must be null or valid.
#[no_mangle]
pub unsafe extern "C" fn vesta_device_create_swapchain(device: u64, desc: *const VestaSwapchainDesc) -> u64 {
    // SAFETY: forwarded contract.
    let decoded = unsafe { deref(desc, "swapchain descriptor").and_then(|d| d.decode()) };
    let Some(desc) = accept("vesta_device_create_swapchain", decoded) else {
        return 0;
    };
    on_device!(device, 0, d => d.create_swapchain(&desc).map_or(0, |h| h.raw()))
}

#[no_mangle]
pub extern "C" fn vesta_device_destroy_swapchain(device: u64, swapchain: u64) {
    on_device!(device, (), d => d.destroy_swapchain(SwapchainHandle(swapchain)))
}

#[no_mangle]
pub extern "C" fn vesta_device_resize_swapchain(device: u64, swapchain: u64, width: u32, height: u32) -> bool {
    on_device!(device, false, d => d.resize_swapchain(SwapchainHandle(swapchain), width, height))
}

#[no_mangle]
pub extern "C" fn vesta_device_present(device: u64, swapchain: u64) -> bool {
    on_device!(device, false, d => d.present(SwapchainHandle(swapchain)))
}

/// A fresh texture handle for the current drawable, `0` before the first
/// drawable was acquired.
#[no_mangle]
pub extern "C" fn vesta_device_get_swapchain_backbuffer(device: u64, swapchain: u64) -> u64 {
    on_device!(device, 0, d => d.get_swapchain_backbuffer(SwapchainHandle(swapchain)).raw())
}

#[no_mangle]
pub extern "C" fn vesta_device_get_swapchain_current_index(device: u64, swapchain: u64) -> u32 {
    on_device!(device, 0, d => d.get_swapchain_current_index(SwapchainHandle(swapchain)))
}

// --- Fences ---

#[no_mangle]
pub extern "C" fn vesta_device_create_fence(device: u64, initial_value: u64) -> u64 {
    on_device!(device, 0, d => d.create_fence(initial_value).raw())
}

#[no_mangle]
pub extern "C" fn vesta_device_destroy_fence(device: u64, fence: u64) {
    on_device!(device, (), d => d.destroy_fence(FenceHandle(fence)))
}

#[no_mangle]
pub extern "C" fn vesta_device_signal_fence(device: u64, fence: u64, value: u64) {
    on_device!(device, (), d => d.signal_fence(FenceHandle(fence), value))
}

#[no_mangle]
pub extern "C" fn vesta_device_get_fence_value(device: u64, fence: u64) -> u64 {
    on_device!(device, 0, d => d.get_fence_value(FenceHandle(fence)))
}

#[no_mangle]
pub extern "C" fn vesta_device_is_fence_complete(device: u64, fence: u64, value: u64) -> bool {
    on_device!(device, false, d => d.is_fence_complete(FenceHandle(fence), value))
}

/// Blocks until the fence reaches `value`. Returns `false` for unknown fences
/// and for values nothing submitted can reach.
#[no_mangle]
pub extern "C" fn vesta_device_wait_for_fence(device: u64, fence: u64, value: u64) -> bool {
    on_device!(device, false, d => d.wait_for_fence(FenceHandle(fence), value))
}

// --- Transitions ---

#[no_mangle]
pub extern "C" fn vesta_device_transition_texture(device: u64, texture: u64, before: u32, after: u32) {
    let Some((before, after)) = accept(
        "vesta_device_transition_texture",
        resource_state(before).and_then(|b| Ok((b, resource_state(after)?))),
    ) else {
        return;
    };
    on_device!(device, (), d => d.transition_texture(TextureHandle(texture), before, after))
}

#[no_mangle]
pub extern "C" fn vesta_device_transition_buffer(device: u64, buffer: u64, before: u32, after: u32) {
    let Some((before, after)) = accept(
        "vesta_device_transition_buffer",
        resource_state(before).and_then(|b| Ok((b, resource_state(after)?))),
    ) else {
        return;
    };
    on_device!(device, (), d => d.transition_buffer(BufferHandle(buffer), before, after))
}

// --- Command lists ---

/// Creates a recording command list and returns its id. The list stays
/// registered after submission; release it with
/// [`vesta_command_list_destroy`](crate::command_list::vesta_command_list_destroy).
#[no_mangle]
pub extern "C" fn vesta_device_begin_command_list(device: u64) -> u64 {
    let list = match registry::device(device) {
        Some(AnyDevice::Wgpu(d)) => AnyCommandList::Wgpu(d.begin_command_list()),
        Some(AnyDevice::Headless(d)) => AnyCommandList::Headless(d.begin_command_list()),
        None => return 0,
    };
    registry::insert_command_list(list)
}

/// Closes the list, commits it and presents its drawable.
#[no_mangle]
pub extern "C" fn vesta_device_submit_command_list(device: u64, list: u64) {
    submit(device, list, None);
}

/// Like [`vesta_device_submit_command_list`], and sets `fence` to `value`
/// once the GPU is done.
#[no_mangle]
pub extern "C" fn vesta_device_submit_command_list_with_fence(device: u64, list: u64, fence: u64, value: u64) {
    submit(device, list, Some((FenceHandle(fence), value)));
}

fn submit(device: u64, list: u64, fence: Option<(FenceHandle, u64)>) {
    let (Some(any), Some(shared)) = (registry::device(device), registry::command_list(list)) else {
        return;
    };
    let mut guard = registry::lock(&shared);
    match (&any, &mut *guard) {
        (AnyDevice::Wgpu(d), AnyCommandList::Wgpu(l)) => submit_on(d, l, fence),
        (AnyDevice::Headless(d), AnyCommandList::Headless(l)) => submit_on(d, l, fence),
        _ => log::error!("FFI: Command list {list} was not recorded on device {device}'s backend"),
    }
}

fn submit_on<B: RhiBackend>(device: &Device<B>, list: &mut CommandList<B>, fence: Option<(FenceHandle, u64)>) {
    match fence {
        Some((fence, value)) => device.submit_command_list_with_fence(list, fence, value),
        None => device.submit_command_list(list),
    }
}
