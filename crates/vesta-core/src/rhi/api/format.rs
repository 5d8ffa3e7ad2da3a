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

//! The pixel format enumeration shared by textures, swapchains and vertex
//! attributes.

use serde::{Deserialize, Serialize};

/// Pixel format of a texture, a render target or a vertex attribute.
///
/// The discriminants are part of the C interface and must never be reordered.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u32)]
pub enum TextureFormat {
    #[default]
    Unknown = 0,

    // 8-bit formats
    R8Unorm,
    R8Snorm,
    R8Uint,
    R8Sint,

    // 16-bit formats
    R16Unorm,
    R16Snorm,
    R16Uint,
    R16Sint,
    R16Float,
    Rg8Unorm,
    Rg8Snorm,
    Rg8Uint,
    Rg8Sint,

    // 32-bit formats
    R32Uint,
    R32Sint,
    R32Float,
    Rg16Unorm,
    Rg16Snorm,
    Rg16Uint,
    Rg16Sint,
    Rg16Float,
    Rgba8Unorm,
    Rgba8UnormSrgb,
    Rgba8Snorm,
    Rgba8Uint,
    Rgba8Sint,
    Bgra8Unorm,
    Bgra8UnormSrgb,

    // 64-bit formats
    Rg32Uint,
    Rg32Sint,
    Rg32Float,
    Rgba16Unorm,
    Rgba16Snorm,
    Rgba16Uint,
    Rgba16Sint,
    Rgba16Float,

    // 128-bit formats
    Rgba32Uint,
    Rgba32Sint,
    Rgba32Float,

    // Depth/stencil formats
    D16Unorm,
    D24UnormS8Uint,
    D32Float,
    D32FloatS8Uint,

    // Block-compressed formats
    Bc1Unorm,
    Bc1UnormSrgb,
    Bc2Unorm,
    Bc2UnormSrgb,
    Bc3Unorm,
    Bc3UnormSrgb,
    Bc4Unorm,
    Bc4Snorm,
    Bc5Unorm,
    Bc5Snorm,
    Bc6hUf16,
    Bc6hSf16,
    Bc7Unorm,
    Bc7UnormSrgb,
}

impl TextureFormat {
    /// Every format, in discriminant order.
    pub const ALL: [TextureFormat; 58] = {
        use TextureFormat::*;
        [
            Unknown, R8Unorm, R8Snorm, R8Uint, R8Sint, R16Unorm, R16Snorm, R16Uint, R16Sint,
            R16Float, Rg8Unorm, Rg8Snorm, Rg8Uint, Rg8Sint, R32Uint, R32Sint, R32Float,
            Rg16Unorm, Rg16Snorm, Rg16Uint, Rg16Sint, Rg16Float, Rgba8Unorm, Rgba8UnormSrgb,
            Rgba8Snorm, Rgba8Uint, Rgba8Sint, Bgra8Unorm, Bgra8UnormSrgb, Rg32Uint, Rg32Sint,
            Rg32Float, Rgba16Unorm, Rgba16Snorm, Rgba16Uint, Rgba16Sint, Rgba16Float,
            Rgba32Uint, Rgba32Sint, Rgba32Float, D16Unorm, D24UnormS8Uint, D32Float,
            D32FloatS8Uint, Bc1Unorm, Bc1UnormSrgb, Bc2Unorm, Bc2UnormSrgb, Bc3Unorm,
            Bc3UnormSrgb, Bc4Unorm, Bc4Snorm, Bc5Unorm, Bc5Snorm, Bc6hUf16, Bc6hSf16,
            Bc7Unorm, Bc7UnormSrgb,
        ]
    };

    /// The format drawables are presented in.
    pub const PRESENTATION: TextureFormat = TextureFormat::Bgra8Unorm;

    /// Decodes a raw discriminant received over the C boundary.
    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }

    /// The raw discriminant.
    pub const fn raw(self) -> u32 {
        self as u32
    }

    /// Size in bytes of one texel, used to derive upload row pitches.
    ///
    /// Block-compressed and unknown formats report 4, matching the upload path
    /// of the reference backend; callers uploading compressed data must pack
    /// rows accordingly.
    pub fn bytes_per_pixel(self) -> u32 {
        use TextureFormat::*;
        match self {
            R8Unorm | R8Snorm | R8Uint | R8Sint => 1,

            R16Unorm | R16Snorm | R16Uint | R16Sint | R16Float | Rg8Unorm | Rg8Snorm
            | Rg8Uint | Rg8Sint => 2,

            R32Uint | R32Sint | R32Float | Rg16Unorm | Rg16Snorm | Rg16Uint | Rg16Sint
            | Rg16Float | Rgba8Unorm | Rgba8UnormSrgb | Rgba8Snorm | Rgba8Uint | Rgba8Sint
            | Bgra8Unorm | Bgra8UnormSrgb => 4,

            Rg32Uint | Rg32Sint | Rg32Float | Rgba16Unorm | Rgba16Snorm | Rgba16Uint
            | Rgba16Sint | Rgba16Float => 8,

            Rgba32Uint | Rgba32Sint | Rgba32Float => 16,

            D16Unorm => 2,
            D24UnormS8Uint | D32Float => 4,
            D32FloatS8Uint => 8,

            _ => 4,
        }
    }

    /// Size in bytes of a vertex attribute stored in this format.
    ///
    /// Only the float vector formats are valid vertex formats; everything else
    /// reports 0.
    pub fn vertex_size(self) -> u32 {
        match self {
            TextureFormat::R32Float => 4,
            TextureFormat::Rg32Float => 8,
            TextureFormat::Rgba32Float => 16,
            _ => 0,
        }
    }

    /// Returns `true` for depth and depth/stencil formats.
    pub fn is_depth_stencil(self) -> bool {
        matches!(
            self,
            TextureFormat::D16Unorm
                | TextureFormat::D24UnormS8Uint
                | TextureFormat::D32Float
                | TextureFormat::D32FloatS8Uint
        )
    }

    /// Returns `true` for formats with an sRGB transfer function.
    pub fn is_srgb(self) -> bool {
        matches!(
            self,
            TextureFormat::Rgba8UnormSrgb
                | TextureFormat::Bgra8UnormSrgb
                | TextureFormat::Bc1UnormSrgb
                | TextureFormat::Bc2UnormSrgb
                | TextureFormat::Bc3UnormSrgb
                | TextureFormat::Bc7UnormSrgb
        )
    }

    /// Returns `true` for block-compressed formats.
    pub fn is_compressed(self) -> bool {
        self.raw() >= TextureFormat::Bc1Unorm.raw()
    }
}
