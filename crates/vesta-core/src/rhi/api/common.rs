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

//! Common enums and limits shared by the whole RHI vocabulary.

use serde::{Deserialize, Serialize};

/// Maximum number of color targets a graphics pipeline may declare.
pub const MAX_RENDER_TARGETS: usize = 8;
/// Maximum number of vertex buffer slots.
pub const MAX_VERTEX_BUFFERS: u32 = 16;
/// Maximum number of elements in a vertex layout.
pub const MAX_VERTEX_ELEMENTS: usize = 32;
/// Number of frames the CPU may record ahead of the GPU.
pub const FRAMES_IN_FLIGHT: u32 = 3;

/// A programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ShaderStage {
    /// The vertex stage.
    Vertex = 0,
    /// The pixel (fragment) stage.
    Pixel = 1,
    /// The compute stage.
    Compute = 2,
}

impl ShaderStage {
    /// Decodes a raw discriminant received over the C boundary.
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(ShaderStage::Vertex),
            1 => Some(ShaderStage::Pixel),
            2 => Some(ShaderStage::Compute),
            _ => None,
        }
    }
}

/// The graphics API a device runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GraphicsBackendType {
    /// Vulkan API.
    Vulkan,
    /// Apple's Metal API.
    Metal,
    /// Microsoft's DirectX 12 API.
    Dx12,
    /// OpenGL / OpenGL ES.
    OpenGL,
    /// WebGPU in a browser.
    WebGpu,
    /// No GPU at all; resources live in host memory.
    Headless,
    /// Unknown, or "let the implementation choose" in a configuration.
    #[default]
    Unknown,
}

impl GraphicsBackendType {
    /// Parses a case-insensitive backend name, as used in configuration
    /// overrides.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "vulkan" | "vk" => Some(Self::Vulkan),
            "metal" | "mtl" => Some(Self::Metal),
            "dx12" | "d3d12" => Some(Self::Dx12),
            "gl" | "opengl" | "gles" => Some(Self::OpenGL),
            "webgpu" => Some(Self::WebGpu),
            "headless" | "none" => Some(Self::Headless),
            "auto" | "" => Some(Self::Unknown),
            _ => None,
        }
    }

    /// The human-readable API name reported by a device.
    pub fn api_name(self) -> &'static str {
        match self {
            Self::Vulkan => "Vulkan",
            Self::Metal => "Metal",
            Self::Dx12 => "Direct3D 12",
            Self::OpenGL => "OpenGL",
            Self::WebGpu => "WebGPU",
            Self::Headless => "Headless",
            Self::Unknown => "Unknown",
        }
    }
}

/// Adapter selection preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PowerPreference {
    /// No preference.
    None,
    /// Prefer an integrated, power-efficient adapter.
    LowPower,
    /// Prefer a discrete, high-performance adapter.
    #[default]
    HighPerformance,
}

/// The physical type of a graphics device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeviceType {
    /// A GPU integrated into the CPU.
    IntegratedGpu,
    /// A discrete, dedicated GPU.
    DiscreteGpu,
    /// A virtualized GPU.
    VirtualGpu,
    /// A software renderer running on the CPU.
    Cpu,
    /// Unknown.
    #[default]
    Other,
}

/// Information about the adapter a device was created on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AdapterInfo {
    /// The adapter name as reported by the driver.
    pub name: String,
    /// The API the device runs on.
    pub backend_type: GraphicsBackendType,
    /// The physical device type.
    pub device_type: DeviceType,
}

/// Resource usage states for explicit transitions.
///
/// Backends with implicit tracking accept transitions without acting on them.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ResourceState {
    Common = 0,
    VertexBuffer,
    IndexBuffer,
    ConstantBuffer,
    ShaderResource,
    UnorderedAccess,
    RenderTarget,
    DepthStencilWrite,
    DepthStencilRead,
    CopySource,
    CopyDest,
    Present,
}

impl ResourceState {
    /// Decodes a raw discriminant received over the C boundary.
    pub fn from_raw(raw: u32) -> Option<Self> {
        use ResourceState::*;
        [
            Common,
            VertexBuffer,
            IndexBuffer,
            ConstantBuffer,
            ShaderResource,
            UnorderedAccess,
            RenderTarget,
            DepthStencilWrite,
            DepthStencilRead,
            CopySource,
            CopyDest,
            Present,
        ]
        .get(raw as usize)
        .copied()
    }
}
