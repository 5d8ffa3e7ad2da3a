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

//! `#[repr(C)]` descriptors and their decoding into the Rust vocabulary.
//!
//! Enumerations cross the boundary as `u32` and flag sets as `u32` masks.
//! Every decoder rejects values it does not know.

use crate::error::{DecodeError, DecodeResult};
use bytemuck::Zeroable;
use raw_window_handle::{
    AppKitDisplayHandle, AppKitWindowHandle, RawDisplayHandle, RawWindowHandle, WaylandDisplayHandle,
    WaylandWindowHandle, Win32WindowHandle, WindowsDisplayHandle, XlibDisplayHandle, XlibWindowHandle,
};
use std::borrow::Cow;
use std::ffi::{c_char, c_void, CStr};
use std::num::NonZeroIsize;
use std::ptr::NonNull;
use vesta_core::platform::{NativeWindow, RawWindow};
use vesta_core::rhi::*;
use vesta_core::DeviceConfig;

// --- Raw argument helpers ---

/// Borrows a NUL-terminated string, replacing invalid UTF-8.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives `'a`.
pub(crate) unsafe fn opt_str<'a>(ptr: *const c_char) -> Option<Cow<'a, str>> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: non-null and NUL-terminated per the caller's contract.
    Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy())
}

/// Borrows `len` bytes.
///
/// # Safety
/// `ptr` must be null or valid for reads of `len` bytes for `'a`.
pub(crate) unsafe fn opt_bytes<'a>(ptr: *const c_void, len: usize) -> Option<&'a [u8]> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: non-null and readable for `len` bytes per the caller's contract.
    Some(unsafe { std::slice::from_raw_parts(ptr.cast::<u8>(), len) })
}

/// Borrows `count` values of `T`. A zero count gives an empty slice even for null.
///
/// # Safety
/// `ptr` must be null or valid for reads of `count` values for `'a`.
pub(crate) unsafe fn opt_slice<'a, T>(ptr: *const T, count: usize) -> Option<&'a [T]> {
    if count == 0 {
        return Some(&[]);
    }
    if ptr.is_null() {
        return None;
    }
    // SAFETY: non-null and readable for `count` values per the caller's contract.
    Some(unsafe { std::slice::from_raw_parts(ptr, count) })
}

fn pick<T: Copy>(table: &[T], kind: &'static str, value: u32) -> DecodeResult<T> {
    table
        .get(value as usize)
        .copied()
        .ok_or(DecodeError::UnknownEnum { kind, value })
}

fn known<T>(decoded: Option<T>, kind: &'static str, value: u32) -> DecodeResult<T> {
    decoded.ok_or(DecodeError::UnknownEnum { kind, value })
}

// --- Enumerations ---

pub(crate) fn texture_format(value: u32) -> DecodeResult<TextureFormat> {
    known(TextureFormat::from_raw(value), "TextureFormat", value)
}

pub(crate) fn shader_stage(value: u32) -> DecodeResult<ShaderStage> {
    known(ShaderStage::from_raw(value), "ShaderStage", value)
}

pub(crate) fn load_action(value: u32) -> DecodeResult<LoadAction> {
    known(LoadAction::from_raw(value), "LoadAction", value)
}

pub(crate) fn store_action(value: u32) -> DecodeResult<StoreAction> {
    known(StoreAction::from_raw(value), "StoreAction", value)
}

pub(crate) fn index_format(value: u32) -> DecodeResult<IndexFormat> {
    known(IndexFormat::from_raw(value), "IndexFormat", value)
}

pub(crate) fn resource_state(value: u32) -> DecodeResult<ResourceState> {
    known(ResourceState::from_raw(value), "ResourceState", value)
}

pub(crate) fn backend_type(value: u32) -> DecodeResult<GraphicsBackendType> {
    use GraphicsBackendType::*;
    pick(
        &[Unknown, Vulkan, Metal, Dx12, OpenGL, WebGpu, Headless],
        "GraphicsBackendType",
        value,
    )
}

pub(crate) fn power_preference(value: u32) -> DecodeResult<PowerPreference> {
    use PowerPreference::*;
    pick(&[None, LowPower, HighPerformance], "PowerPreference", value)
}

fn classification(value: u32) -> DecodeResult<InputClassification> {
    use InputClassification::*;
    pick(&[PerVertex, PerInstance], "InputClassification", value)
}

fn topology(value: u32) -> DecodeResult<PrimitiveTopology> {
    use PrimitiveTopology::*;
    pick(
        &[PointList, LineList, LineStrip, TriangleList, TriangleStrip],
        "PrimitiveTopology",
        value,
    )
}

fn fill_mode(value: u32) -> DecodeResult<FillMode> {
    pick(&[FillMode::Solid, FillMode::Wireframe], "FillMode", value)
}

fn cull_mode(value: u32) -> DecodeResult<CullMode> {
    pick(&[CullMode::None, CullMode::Front, CullMode::Back], "CullMode", value)
}

fn compare_function(value: u32) -> DecodeResult<CompareFunction> {
    use CompareFunction::*;
    pick(
        &[Never, Less, Equal, LessEqual, Greater, NotEqual, GreaterEqual, Always],
        "CompareFunction",
        value,
    )
}

fn blend_factor(value: u32) -> DecodeResult<BlendFactor> {
    use self::BlendFactor as B;
    pick(
        &[
            B::Zero,
            B::One,
            B::SrcColor,
            B::InvSrcColor,
            B::SrcAlpha,
            B::InvSrcAlpha,
            B::DestAlpha,
            B::InvDestAlpha,
            B::DestColor,
            B::InvDestColor,
            B::SrcAlphaSat,
            B::BlendFactor,
            B::InvBlendFactor,
        ],
        "BlendFactor",
        value,
    )
}

fn blend_op(value: u32) -> DecodeResult<BlendOp> {
    use BlendOp::*;
    pick(&[Add, Subtract, ReverseSubtract, Min, Max], "BlendOp", value)
}

fn buffer_usage(bits: u32) -> DecodeResult<BufferUsage> {
    BufferUsage::from_bits(bits).ok_or(DecodeError::UnknownFlags {
        kind: "BufferUsage",
        bits,
    })
}

fn texture_usage(bits: u32) -> DecodeResult<TextureUsage> {
    TextureUsage::from_bits(bits).ok_or(DecodeError::UnknownFlags {
        kind: "TextureUsage",
        bits,
    })
}

// --- Device ---

/// Device creation settings.
#[repr(C)]
#[derive(Debug, Clone, Copy, Zeroable)]
pub struct VestaDeviceDesc {
    pub enable_debug_layer: bool,
    pub enable_gpu_validation: bool,
    pub enable_validation: bool,
    /// NUL-terminated, may be null.
    pub application_name: *const c_char,
    /// 0 auto, 1 Vulkan, 2 Metal, 3 Direct3D 12, 4 OpenGL, 5 WebGPU, 6 headless.
    pub backend: u32,
    /// 0 none, 1 low power, 2 high performance.
    pub power_preference: u32,
    pub vsync: bool,
}

impl VestaDeviceDesc {
    /// # Safety
    /// The string pointer must satisfy [`opt_str`].
    pub(crate) unsafe fn decode(&self) -> DecodeResult<DeviceConfig> {
        let defaults = DeviceConfig::default();
        Ok(DeviceConfig {
            // SAFETY: forwarded contract.
            application_name: unsafe { opt_str(self.application_name) }
                .map_or(defaults.application_name, Cow::into_owned),
            enable_debug_layer: self.enable_debug_layer,
            enable_gpu_validation: self.enable_gpu_validation,
            enable_validation: self.enable_validation,
            power_preference: power_preference(self.power_preference)?,
            backend: backend_type(self.backend)?,
            vsync: self.vsync,
        })
    }
}

// --- Buffers and textures ---

/// Buffer creation settings. `initial_data`, when set, supplies `size` bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, Zeroable)]
pub struct VestaBufferDesc {
    pub size: u64,
    pub usage: u32,
    pub stride: u32,
    pub initial_data: *const c_void,
    pub debug_name: *const c_char,
}

impl VestaBufferDesc {
    /// # Safety
    /// `initial_data` must be null or readable for `size` bytes, and
    /// `debug_name` must satisfy [`opt_str`].
    pub(crate) unsafe fn decode<'a>(&self) -> DecodeResult<BufferDescriptor<'a>> {
        let len = usize::try_from(self.size).map_err(|_| DecodeError::SizeOverflow(self.size))?;
        Ok(BufferDescriptor {
            // SAFETY: forwarded contract.
            label: unsafe { opt_str(self.debug_name) },
            size: self.size,
            usage: buffer_usage(self.usage)?,
            stride: self.stride,
            // SAFETY: forwarded contract.
            initial_data: unsafe { opt_bytes(self.initial_data, len) },
        })
    }
}

/// Texture creation settings.
#[repr(C)]
#[derive(Debug, Clone, Copy, Zeroable)]
pub struct VestaTextureDesc {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub mip_levels: u32,
    pub array_size: u32,
    pub format: u32,
    pub usage: u32,
    pub debug_name: *const c_char,
}

impl VestaTextureDesc {
    /// # Safety
    /// `debug_name` must satisfy [`opt_str`].
    pub(crate) unsafe fn decode<'a>(&self) -> DecodeResult<TextureDescriptor<'a>> {
        Ok(TextureDescriptor {
            // SAFETY: forwarded contract.
            label: unsafe { opt_str(self.debug_name) },
            width: self.width,
            height: self.height,
            depth: self.depth.max(1),
            mip_levels: self.mip_levels.max(1),
            array_size: self.array_size.max(1),
            format: texture_format(self.format)?,
            usage: texture_usage(self.usage)?,
        })
    }
}

// --- Shaders and pipelines ---

/// A WGSL shader stage. The source is `source_size` bytes, not NUL-terminated.
#[repr(C)]
#[derive(Debug, Clone, Copy, Zeroable)]
pub struct VestaShaderDesc {
    pub stage: u32,
    pub source: *const c_char,
    pub source_size: usize,
    pub entry_point: *const c_char,
    pub debug_name: *const c_char,
}

impl VestaShaderDesc {
    /// # Safety
    /// `source` must be readable for `source_size` bytes; the strings must
    /// satisfy [`opt_str`].
    pub(crate) unsafe fn decode<'a>(&self) -> DecodeResult<ShaderDescriptor<'a>> {
        // SAFETY: forwarded contract.
        let source = unsafe { opt_bytes(self.source.cast(), self.source_size) }
            .ok_or(DecodeError::NullPointer("shader source"))?;
        // SAFETY: forwarded contract.
        let entry_point = unsafe { opt_str(self.entry_point) }.ok_or(DecodeError::NullPointer("entry point"))?;
        Ok(ShaderDescriptor {
            // SAFETY: forwarded contract.
            label: unsafe { opt_str(self.debug_name) },
            stage: shader_stage(self.stage)?,
            source: String::from_utf8_lossy(source),
            entry_point,
        })
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Zeroable)]
pub struct VestaVertexElement {
    pub semantic_name: *const c_char,
    pub semantic_index: u32,
    pub format: u32,
    pub input_slot: u32,
    pub aligned_byte_offset: u32,
    pub classification: u32,
    pub instance_data_step_rate: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Zeroable)]
pub struct VestaVertexLayout {
    pub elements: *const VestaVertexElement,
    pub element_count: u32,
}

impl VestaVertexLayout {
    /// # Safety
    /// `elements` must be readable for `element_count` values whose names
    /// satisfy [`opt_str`].
    unsafe fn decode(&self) -> DecodeResult<VertexLayout> {
        // SAFETY: forwarded contract.
        let raw = unsafe { opt_slice(self.elements, self.element_count as usize) }
            .ok_or(DecodeError::NullPointer("vertex elements"))?;
        let mut elements = Vec::with_capacity(raw.len());
        for element in raw {
            elements.push(VertexElement {
                // SAFETY: forwarded contract.
                semantic_name: unsafe { opt_str(element.semantic_name) }
                    .map(Cow::into_owned)
                    .unwrap_or_default(),
                semantic_index: element.semantic_index,
                format: texture_format(element.format)?,
                input_slot: element.input_slot,
                aligned_byte_offset: element.aligned_byte_offset,
                classification: classification(element.classification)?,
                instance_data_step_rate: element.instance_data_step_rate,
            });
        }
        Ok(VertexLayout::new(elements))
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Zeroable)]
pub struct VestaRasterizerState {
    pub fill_mode: u32,
    pub cull_mode: u32,
    pub front_counter_clockwise: bool,
    pub depth_bias: i32,
    pub depth_bias_clamp: f32,
    pub slope_scaled_depth_bias: f32,
    pub depth_clip_enable: bool,
}

impl VestaRasterizerState {
    fn decode(&self) -> DecodeResult<RasterizerState> {
        Ok(RasterizerState {
            fill_mode: fill_mode(self.fill_mode)?,
            cull_mode: cull_mode(self.cull_mode)?,
            front_counter_clockwise: self.front_counter_clockwise,
            depth_bias: self.depth_bias,
            depth_bias_clamp: self.depth_bias_clamp,
            slope_scaled_depth_bias: self.slope_scaled_depth_bias,
            depth_clip_enable: self.depth_clip_enable,
        })
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Zeroable)]
pub struct VestaDepthStencilState {
    pub depth_enable: bool,
    pub depth_write_enable: bool,
    pub depth_func: u32,
    pub stencil_enable: bool,
    pub stencil_read_mask: u8,
    pub stencil_write_mask: u8,
}

impl VestaDepthStencilState {
    fn decode(&self) -> DecodeResult<DepthStencilState> {
        Ok(DepthStencilState {
            depth_enable: self.depth_enable,
            depth_write_enable: self.depth_write_enable,
            depth_func: compare_function(self.depth_func)?,
            stencil_enable: self.stencil_enable,
            stencil_read_mask: self.stencil_read_mask,
            stencil_write_mask: self.stencil_write_mask,
        })
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Zeroable)]
pub struct VestaRenderTargetBlendState {
    pub blend_enable: bool,
    pub src_blend: u32,
    pub dst_blend: u32,
    pub blend_op: u32,
    pub src_blend_alpha: u32,
    pub dst_blend_alpha: u32,
    pub blend_op_alpha: u32,
    pub write_mask: u8,
}

impl VestaRenderTargetBlendState {
    fn decode(&self) -> DecodeResult<RenderTargetBlendState> {
        Ok(RenderTargetBlendState {
            blend_enable: self.blend_enable,
            src_blend: blend_factor(self.src_blend)?,
            dst_blend: blend_factor(self.dst_blend)?,
            blend_op: blend_op(self.blend_op)?,
            src_blend_alpha: blend_factor(self.src_blend_alpha)?,
            dst_blend_alpha: blend_factor(self.dst_blend_alpha)?,
            blend_op_alpha: blend_op(self.blend_op_alpha)?,
            write_mask: self.write_mask,
        })
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Zeroable)]
pub struct VestaBlendState {
    pub alpha_to_coverage_enable: bool,
    pub independent_blend_enable: bool,
    pub render_targets: [VestaRenderTargetBlendState; MAX_RENDER_TARGETS],
}

impl VestaBlendState {
    fn decode(&self) -> DecodeResult<BlendState> {
        let mut render_targets = [RenderTargetBlendState::default(); MAX_RENDER_TARGETS];
        for (decoded, raw) in render_targets.iter_mut().zip(&self.render_targets) {
            *decoded = raw.decode()?;
        }
        Ok(BlendState {
            alpha_to_coverage_enable: self.alpha_to_coverage_enable,
            independent_blend_enable: self.independent_blend_enable,
            render_targets,
        })
    }
}

/// Graphics pipeline settings. Only the first `render_target_count` formats are read.
#[repr(C)]
#[derive(Debug, Clone, Copy, Zeroable)]
pub struct VestaGraphicsPipelineDesc {
    pub vertex_shader: u64,
    pub pixel_shader: u64,
    pub vertex_layout: VestaVertexLayout,
    pub topology: u32,
    pub rasterizer: VestaRasterizerState,
    pub depth_stencil: VestaDepthStencilState,
    pub blend: VestaBlendState,
    pub render_target_formats: [u32; MAX_RENDER_TARGETS],
    pub render_target_count: u32,
    pub depth_stencil_format: u32,
    pub debug_name: *const c_char,
}

impl VestaGraphicsPipelineDesc {
    /// # Safety
    /// The vertex layout must satisfy [`VestaVertexLayout::decode`] and
    /// `debug_name` must satisfy [`opt_str`].
    pub(crate) unsafe fn decode<'a>(&self) -> DecodeResult<GraphicsPipelineDescriptor<'a>> {
        let count = self.render_target_count as usize;
        let Some(formats) = self.render_target_formats.get(..count) else {
            return Err(DecodeError::TooManyRenderTargets(self.render_target_count));
        };
        Ok(GraphicsPipelineDescriptor {
            // SAFETY: forwarded contract.
            label: unsafe { opt_str(self.debug_name) },
            vertex_shader: ShaderHandle(self.vertex_shader),
            pixel_shader: ShaderHandle(self.pixel_shader),
            // SAFETY: forwarded contract.
            vertex_layout: unsafe { self.vertex_layout.decode() }?,
            topology: topology(self.topology)?,
            rasterizer: self.rasterizer.decode()?,
            depth_stencil: self.depth_stencil.decode()?,
            blend: self.blend.decode()?,
            render_target_formats: formats.iter().map(|&f| texture_format(f)).collect::<DecodeResult<_>>()?,
            depth_stencil_format: texture_format(self.depth_stencil_format)?,
        })
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Zeroable)]
pub struct VestaComputePipelineDesc {
    pub compute_shader: u64,
    pub debug_name: *const c_char,
}

impl VestaComputePipelineDesc {
    /// # Safety
    /// `debug_name` must satisfy [`opt_str`].
    pub(crate) unsafe fn decode<'a>(&self) -> ComputePipelineDescriptor<'a> {
        ComputePipelineDescriptor {
            // SAFETY: forwarded contract.
            label: unsafe { opt_str(self.debug_name) },
            compute_shader: ShaderHandle(self.compute_shader),
        }
    }
}

// --- Windows and swapchains ---

/// `VestaWindowHandle::kind` values.
pub const VESTA_WINDOW_NONE: u32 = 0;
pub const VESTA_WINDOW_WIN32: u32 = 1;
pub const VESTA_WINDOW_APPKIT: u32 = 2;
pub const VESTA_WINDOW_XLIB: u32 = 3;
pub const VESTA_WINDOW_WAYLAND: u32 = 4;

/// A platform window.
///
/// | kind    | window            | display             |
/// |---------|-------------------|---------------------|
/// | Win32   | `HWND`            | `HINSTANCE` or null |
/// | AppKit  | `NSView*`         | unused              |
/// | Xlib    | `Window` (the XID)| `Display*` or null  |
/// | Wayland | `wl_surface*`     | `wl_display*`       |
#[repr(C)]
#[derive(Debug, Clone, Copy, Zeroable)]
pub struct VestaWindowHandle {
    pub kind: u32,
    pub window: *mut c_void,
    pub display: *mut c_void,
}

impl VestaWindowHandle {
    /// `Ok(None)` for [`VESTA_WINDOW_NONE`].
    pub(crate) fn decode(&self) -> DecodeResult<Option<NativeWindow>> {
        let (window, display) = match self.kind {
            VESTA_WINDOW_NONE => return Ok(None),
            VESTA_WINDOW_WIN32 => {
                let hwnd = NonZeroIsize::new(self.window as isize).ok_or(DecodeError::InvalidWindow("null HWND"))?;
                let mut handle = Win32WindowHandle::new(hwnd);
                handle.hinstance = NonZeroIsize::new(self.display as isize);
                (
                    RawWindowHandle::Win32(handle),
                    RawDisplayHandle::Windows(WindowsDisplayHandle::new()),
                )
            }
            VESTA_WINDOW_APPKIT => {
                let view = NonNull::new(self.window).ok_or(DecodeError::InvalidWindow("null NSView"))?;
                (
                    RawWindowHandle::AppKit(AppKitWindowHandle::new(view)),
                    RawDisplayHandle::AppKit(AppKitDisplayHandle::new()),
                )
            }
            VESTA_WINDOW_XLIB => {
                if self.window.is_null() {
                    return Err(DecodeError::InvalidWindow("zero Xlib window"));
                }
                (
                    RawWindowHandle::Xlib(XlibWindowHandle::new(self.window as std::ffi::c_ulong)),
                    RawDisplayHandle::Xlib(XlibDisplayHandle::new(NonNull::new(self.display), 0)),
                )
            }
            VESTA_WINDOW_WAYLAND => {
                let surface = NonNull::new(self.window).ok_or(DecodeError::InvalidWindow("null wl_surface"))?;
                let display = NonNull::new(self.display).ok_or(DecodeError::InvalidWindow("null wl_display"))?;
                (
                    RawWindowHandle::Wayland(WaylandWindowHandle::new(surface)),
                    RawDisplayHandle::Wayland(WaylandDisplayHandle::new(display)),
                )
            }
            kind => {
                return Err(DecodeError::UnknownEnum {
                    kind: "window kind",
                    value: kind,
                })
            }
        };
        Ok(Some(NativeWindow::new(RawWindow { window, display })))
    }
}

/// Swapchain settings. `allow_tearing` picks an immediate present mode when
/// `vsync` is off and is otherwise ignored.
#[repr(C)]
#[derive(Debug, Clone, Copy, Zeroable)]
pub struct VestaSwapchainDesc {
    pub window: VestaWindowHandle,
    pub width: u32,
    pub height: u32,
    pub format: u32,
    pub buffer_count: u32,
    pub vsync: bool,
    pub allow_tearing: bool,
    pub debug_name: *const c_char,
}

impl VestaSwapchainDesc {
    /// # Safety
    /// `debug_name` must satisfy [`opt_str`].
    pub(crate) unsafe fn decode<'a>(&self) -> DecodeResult<SwapchainDescriptor<'a>> {
        Ok(SwapchainDescriptor {
            // SAFETY: forwarded contract.
            label: unsafe { opt_str(self.debug_name) },
            window: self.window.decode()?,
            width: self.width,
            height: self.height,
            format: texture_format(self.format)?,
            buffer_count: self.buffer_count,
            vsync: self.vsync,
        })
    }
}
