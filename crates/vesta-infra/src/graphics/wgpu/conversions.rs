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

use vesta_core::rhi::{
    BlendFactor, BlendOp, BufferUsage, ClearColor, CompareFunction, CullMode, FillMode,
    IndexFormat, InputClassification, LoadOp, PowerPreference, PrimitiveTopology,
    RenderTargetBlendState, StoreOp, TextureDimension, TextureFormat, TextureUsage,
    GraphicsBackendType, DeviceType,
};

/// A local extension trait to convert RHI types into WGPU types.
/// This avoids Rust's orphan rules while keeping an idiomatic `.into_wgpu()` syntax.
pub trait IntoWgpu<T> {
    /// Consumes self and converts it into a WGPU-compatible type.
    fn into_wgpu(self) -> T;
}

// --- Formats ---

impl IntoWgpu<Option<wgpu::TextureFormat>> for TextureFormat {
    fn into_wgpu(self) -> Option<wgpu::TextureFormat> {
        use wgpu::TextureFormat as W;
        let format = match self {
            TextureFormat::Unknown => return None,
            TextureFormat::R8Unorm => W::R8Unorm,
            TextureFormat::R8Snorm => W::R8Snorm,
            TextureFormat::R8Uint => W::R8Uint,
            TextureFormat::R8Sint => W::R8Sint,
            TextureFormat::R16Unorm => W::R16Unorm,
            TextureFormat::R16Snorm => W::R16Snorm,
            TextureFormat::R16Uint => W::R16Uint,
            TextureFormat::R16Sint => W::R16Sint,
            TextureFormat::R16Float => W::R16Float,
            TextureFormat::Rg8Unorm => W::Rg8Unorm,
            TextureFormat::Rg8Snorm => W::Rg8Snorm,
            TextureFormat::Rg8Uint => W::Rg8Uint,
            TextureFormat::Rg8Sint => W::Rg8Sint,
            TextureFormat::R32Uint => W::R32Uint,
            TextureFormat::R32Sint => W::R32Sint,
            TextureFormat::R32Float => W::R32Float,
            TextureFormat::Rg16Unorm => W::Rg16Unorm,
            TextureFormat::Rg16Snorm => W::Rg16Snorm,
            TextureFormat::Rg16Uint => W::Rg16Uint,
            TextureFormat::Rg16Sint => W::Rg16Sint,
            TextureFormat::Rg16Float => W::Rg16Float,
            TextureFormat::Rgba8Unorm => W::Rgba8Unorm,
            TextureFormat::Rgba8UnormSrgb => W::Rgba8UnormSrgb,
            TextureFormat::Rgba8Snorm => W::Rgba8Snorm,
            TextureFormat::Rgba8Uint => W::Rgba8Uint,
            TextureFormat::Rgba8Sint => W::Rgba8Sint,
            TextureFormat::Bgra8Unorm => W::Bgra8Unorm,
            TextureFormat::Bgra8UnormSrgb => W::Bgra8UnormSrgb,
            TextureFormat::Rg32Uint => W::Rg32Uint,
            TextureFormat::Rg32Sint => W::Rg32Sint,
            TextureFormat::Rg32Float => W::Rg32Float,
            TextureFormat::Rgba16Unorm => W::Rgba16Unorm,
            TextureFormat::Rgba16Snorm => W::Rgba16Snorm,
            TextureFormat::Rgba16Uint => W::Rgba16Uint,
            TextureFormat::Rgba16Sint => W::Rgba16Sint,
            TextureFormat::Rgba16Float => W::Rgba16Float,
            TextureFormat::Rgba32Uint => W::Rgba32Uint,
            TextureFormat::Rgba32Sint => W::Rgba32Sint,
            TextureFormat::Rgba32Float => W::Rgba32Float,
            TextureFormat::D16Unorm => W::Depth16Unorm,
            TextureFormat::D24UnormS8Uint => W::Depth24PlusStencil8,
            TextureFormat::D32Float => W::Depth32Float,
            TextureFormat::D32FloatS8Uint => W::Depth32FloatStencil8,
            TextureFormat::Bc1Unorm => W::Bc1RgbaUnorm,
            TextureFormat::Bc1UnormSrgb => W::Bc1RgbaUnormSrgb,
            TextureFormat::Bc2Unorm => W::Bc2RgbaUnorm,
            TextureFormat::Bc2UnormSrgb => W::Bc2RgbaUnormSrgb,
            TextureFormat::Bc3Unorm => W::Bc3RgbaUnorm,
            TextureFormat::Bc3UnormSrgb => W::Bc3RgbaUnormSrgb,
            TextureFormat::Bc4Unorm => W::Bc4RUnorm,
            TextureFormat::Bc4Snorm => W::Bc4RSnorm,
            TextureFormat::Bc5Unorm => W::Bc5RgUnorm,
            TextureFormat::Bc5Snorm => W::Bc5RgSnorm,
            TextureFormat::Bc6hUf16 => W::Bc6hRgbUfloat,
            TextureFormat::Bc6hSf16 => W::Bc6hRgbFloat,
            TextureFormat::Bc7Unorm => W::Bc7RgbaUnorm,
            TextureFormat::Bc7UnormSrgb => W::Bc7RgbaUnormSrgb,
        };
        Some(format)
    }
}

/// Maps a WGPU format back to the RHI, for the formats a surface can report.
pub fn format_from_wgpu(format: wgpu::TextureFormat) -> TextureFormat {
    TextureFormat::ALL
        .into_iter()
        .find(|f| IntoWgpu::<Option<wgpu::TextureFormat>>::into_wgpu(*f) == Some(format))
        .unwrap_or(TextureFormat::Unknown)
}

/// Vertex attribute formats. Only the 32-bit float vectors are valid.
impl IntoWgpu<Option<wgpu::VertexFormat>> for TextureFormat {
    fn into_wgpu(self) -> Option<wgpu::VertexFormat> {
        match self {
            TextureFormat::R32Float => Some(wgpu::VertexFormat::Float32),
            TextureFormat::Rg32Float => Some(wgpu::VertexFormat::Float32x2),
            TextureFormat::Rgba32Float => Some(wgpu::VertexFormat::Float32x4),
            _ => None,
        }
    }
}

impl IntoWgpu<wgpu::TextureDimension> for TextureDimension {
    fn into_wgpu(self) -> wgpu::TextureDimension {
        match self {
            TextureDimension::D2 | TextureDimension::D2Array => wgpu::TextureDimension::D2,
            TextureDimension::D3 => wgpu::TextureDimension::D3,
        }
    }
}

impl IntoWgpu<wgpu::IndexFormat> for IndexFormat {
    fn into_wgpu(self) -> wgpu::IndexFormat {
        match self {
            IndexFormat::Uint16 => wgpu::IndexFormat::Uint16,
            IndexFormat::Uint32 => wgpu::IndexFormat::Uint32,
        }
    }
}

// --- Usage flags ---

impl IntoWgpu<wgpu::BufferUsages> for BufferUsage {
    fn into_wgpu(self) -> wgpu::BufferUsages {
        // Uploads and read-backs go through the queue, so every buffer can be
        // copied in both directions.
        let mut usages = wgpu::BufferUsages::COPY_SRC | wgpu::BufferUsages::COPY_DST;
        if self.contains(BufferUsage::VERTEX) {
            usages |= wgpu::BufferUsages::VERTEX;
        }
        if self.contains(BufferUsage::INDEX) {
            usages |= wgpu::BufferUsages::INDEX;
        }
        if self.contains(BufferUsage::CONSTANT) {
            usages |= wgpu::BufferUsages::UNIFORM;
        }
        if self.intersects(
            BufferUsage::STRUCTURED | BufferUsage::SHADER_RESOURCE | BufferUsage::UNORDERED_ACCESS,
        ) {
            usages |= wgpu::BufferUsages::STORAGE;
        }
        if self.contains(BufferUsage::INDIRECT_ARGS) {
            usages |= wgpu::BufferUsages::INDIRECT;
        }
        usages
    }
}

impl IntoWgpu<wgpu::TextureUsages> for TextureUsage {
    fn into_wgpu(self) -> wgpu::TextureUsages {
        // Every texture accepts uploads.
        let mut usages = wgpu::TextureUsages::COPY_DST;
        if self.contains(TextureUsage::SHADER_RESOURCE) {
            usages |= wgpu::TextureUsages::TEXTURE_BINDING;
        }
        if self.intersects(TextureUsage::RENDER_TARGET | TextureUsage::DEPTH_STENCIL) {
            usages |= wgpu::TextureUsages::RENDER_ATTACHMENT;
        }
        if self.contains(TextureUsage::UNORDERED_ACCESS) {
            usages |= wgpu::TextureUsages::STORAGE_BINDING;
        }
        if self.contains(TextureUsage::COPY_SOURCE) {
            usages |= wgpu::TextureUsages::COPY_SRC;
        }
        usages
    }
}

// --- Pipeline state ---

impl IntoWgpu<wgpu::VertexStepMode> for InputClassification {
    fn into_wgpu(self) -> wgpu::VertexStepMode {
        match self {
            InputClassification::PerVertex => wgpu::VertexStepMode::Vertex,
            InputClassification::PerInstance => wgpu::VertexStepMode::Instance,
        }
    }
}

impl IntoWgpu<wgpu::PrimitiveTopology> for PrimitiveTopology {
    fn into_wgpu(self) -> wgpu::PrimitiveTopology {
        match self {
            PrimitiveTopology::PointList => wgpu::PrimitiveTopology::PointList,
            PrimitiveTopology::LineList => wgpu::PrimitiveTopology::LineList,
            PrimitiveTopology::LineStrip => wgpu::PrimitiveTopology::LineStrip,
            PrimitiveTopology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
            PrimitiveTopology::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
        }
    }
}

impl IntoWgpu<wgpu::PolygonMode> for FillMode {
    fn into_wgpu(self) -> wgpu::PolygonMode {
        match self {
            FillMode::Solid => wgpu::PolygonMode::Fill,
            FillMode::Wireframe => wgpu::PolygonMode::Line,
        }
    }
}

impl IntoWgpu<Option<wgpu::Face>> for CullMode {
    fn into_wgpu(self) -> Option<wgpu::Face> {
        match self {
            CullMode::None => None,
            CullMode::Front => Some(wgpu::Face::Front),
            CullMode::Back => Some(wgpu::Face::Back),
        }
    }
}

impl IntoWgpu<wgpu::CompareFunction> for CompareFunction {
    fn into_wgpu(self) -> wgpu::CompareFunction {
        match self {
            CompareFunction::Never => wgpu::CompareFunction::Never,
            CompareFunction::Less => wgpu::CompareFunction::Less,
            CompareFunction::Equal => wgpu::CompareFunction::Equal,
            CompareFunction::LessEqual => wgpu::CompareFunction::LessEqual,
            CompareFunction::Greater => wgpu::CompareFunction::Greater,
            CompareFunction::NotEqual => wgpu::CompareFunction::NotEqual,
            CompareFunction::GreaterEqual => wgpu::CompareFunction::GreaterEqual,
            CompareFunction::Always => wgpu::CompareFunction::Always,
        }
    }
}

impl IntoWgpu<wgpu::BlendFactor> for BlendFactor {
    fn into_wgpu(self) -> wgpu::BlendFactor {
        match self {
            BlendFactor::Zero => wgpu::BlendFactor::Zero,
            BlendFactor::One => wgpu::BlendFactor::One,
            BlendFactor::SrcColor => wgpu::BlendFactor::Src,
            BlendFactor::InvSrcColor => wgpu::BlendFactor::OneMinusSrc,
            BlendFactor::SrcAlpha => wgpu::BlendFactor::SrcAlpha,
            BlendFactor::InvSrcAlpha => wgpu::BlendFactor::OneMinusSrcAlpha,
            BlendFactor::DestAlpha => wgpu::BlendFactor::DstAlpha,
            BlendFactor::InvDestAlpha => wgpu::BlendFactor::OneMinusDstAlpha,
            BlendFactor::DestColor => wgpu::BlendFactor::Dst,
            BlendFactor::InvDestColor => wgpu::BlendFactor::OneMinusDst,
            BlendFactor::SrcAlphaSat => wgpu::BlendFactor::SrcAlphaSaturated,
            BlendFactor::BlendFactor => wgpu::BlendFactor::Constant,
            BlendFactor::InvBlendFactor => wgpu::BlendFactor::OneMinusConstant,
        }
    }
}

impl IntoWgpu<wgpu::BlendOperation> for BlendOp {
    fn into_wgpu(self) -> wgpu::BlendOperation {
        match self {
            BlendOp::Add => wgpu::BlendOperation::Add,
            BlendOp::Subtract => wgpu::BlendOperation::Subtract,
            BlendOp::ReverseSubtract => wgpu::BlendOperation::ReverseSubtract,
            BlendOp::Min => wgpu::BlendOperation::Min,
            BlendOp::Max => wgpu::BlendOperation::Max,
        }
    }
}

impl IntoWgpu<wgpu::ColorTargetState> for (wgpu::TextureFormat, &RenderTargetBlendState) {
    fn into_wgpu(self) -> wgpu::ColorTargetState {
        let (format, state) = self;
        let blend = state.blend_enable.then(|| wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: state.src_blend.into_wgpu(),
                dst_factor: state.dst_blend.into_wgpu(),
                operation: state.blend_op.into_wgpu(),
            },
            alpha: wgpu::BlendComponent {
                src_factor: state.src_blend_alpha.into_wgpu(),
                dst_factor: state.dst_blend_alpha.into_wgpu(),
                operation: state.blend_op_alpha.into_wgpu(),
            },
        });
        wgpu::ColorTargetState {
            format,
            blend,
            write_mask: wgpu::ColorWrites::from_bits_truncate(u32::from(state.write_mask & 0b1111)),
        }
    }
}

// --- Passes ---

impl IntoWgpu<wgpu::Color> for ClearColor {
    fn into_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: f64::from(self.r),
            g: f64::from(self.g),
            b: f64::from(self.b),
            a: f64::from(self.a),
        }
    }
}

impl IntoWgpu<wgpu::LoadOp<wgpu::Color>> for LoadOp<ClearColor> {
    fn into_wgpu(self) -> wgpu::LoadOp<wgpu::Color> {
        match self {
            LoadOp::Load => wgpu::LoadOp::Load,
            LoadOp::Clear(color) => wgpu::LoadOp::Clear(color.into_wgpu()),
            // Undefined contents: clearing is always a valid implementation.
            LoadOp::DontCare => wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
        }
    }
}

impl IntoWgpu<wgpu::StoreOp> for StoreOp {
    fn into_wgpu(self) -> wgpu::StoreOp {
        match self {
            StoreOp::Store => wgpu::StoreOp::Store,
            StoreOp::Discard => wgpu::StoreOp::Discard,
        }
    }
}

// --- Adapter selection ---

impl IntoWgpu<wgpu::PowerPreference> for PowerPreference {
    fn into_wgpu(self) -> wgpu::PowerPreference {
        match self {
            PowerPreference::None => wgpu::PowerPreference::None,
            PowerPreference::LowPower => wgpu::PowerPreference::LowPower,
            PowerPreference::HighPerformance => wgpu::PowerPreference::HighPerformance,
        }
    }
}

impl IntoWgpu<wgpu::Backends> for GraphicsBackendType {
    fn into_wgpu(self) -> wgpu::Backends {
        match self {
            GraphicsBackendType::Vulkan => wgpu::Backends::VULKAN,
            GraphicsBackendType::Metal => wgpu::Backends::METAL,
            GraphicsBackendType::Dx12 => wgpu::Backends::DX12,
            GraphicsBackendType::OpenGL => wgpu::Backends::GL,
            GraphicsBackendType::WebGpu => wgpu::Backends::BROWSER_WEBGPU,
            GraphicsBackendType::Headless | GraphicsBackendType::Unknown => wgpu::Backends::all(),
        }
    }
}

/// Maps the adapter's native API back to the RHI enumeration.
pub fn backend_from_wgpu(backend: wgpu::Backend) -> GraphicsBackendType {
    match backend {
        wgpu::Backend::Vulkan => GraphicsBackendType::Vulkan,
        wgpu::Backend::Metal => GraphicsBackendType::Metal,
        wgpu::Backend::Dx12 => GraphicsBackendType::Dx12,
        wgpu::Backend::Gl => GraphicsBackendType::OpenGL,
        wgpu::Backend::BrowserWebGpu => GraphicsBackendType::WebGpu,
        _ => GraphicsBackendType::Unknown,
    }
}

/// Maps the adapter class back to the RHI enumeration.
pub fn device_type_from_wgpu(device_type: wgpu::DeviceType) -> DeviceType {
    match device_type {
        wgpu::DeviceType::IntegratedGpu => DeviceType::IntegratedGpu,
        wgpu::DeviceType::DiscreteGpu => DeviceType::DiscreteGpu,
        wgpu::DeviceType::VirtualGpu => DeviceType::VirtualGpu,
        wgpu::DeviceType::Cpu => DeviceType::Cpu,
        wgpu::DeviceType::Other => DeviceType::Other,
    }
}
