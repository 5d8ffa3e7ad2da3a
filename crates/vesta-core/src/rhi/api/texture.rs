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

//! Defines data structures related to GPU texture resources.

use super::format::TextureFormat;
use crate::vesta_bitflags;
use std::borrow::Cow;

vesta_bitflags! {
    /// Describes how a texture will be used. Values match the C interface.
    pub struct TextureUsage: u32 {
        /// Sampled or read in shaders.
        const SHADER_RESOURCE = 1 << 0;
        /// Color attachment of a render pass.
        const RENDER_TARGET = 1 << 1;
        /// Depth/stencil attachment of a render pass.
        const DEPTH_STENCIL = 1 << 2;
        /// Read/write storage access from shaders.
        const UNORDERED_ACCESS = 1 << 3;
        /// Source of a copy.
        const COPY_SOURCE = 1 << 4;
        /// Destination of a copy.
        const COPY_DEST = 1 << 5;
    }
}

/// The dimensionality of a texture, derived from its descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureDimension {
    /// A single two-dimensional image.
    D2,
    /// An array of two-dimensional images.
    D2Array,
    /// A volumetric texture.
    D3,
}

/// A descriptor used to create a texture.
#[derive(Debug, Clone)]
pub struct TextureDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Depth in texels; values above 1 make a 3D texture.
    pub depth: u32,
    /// Number of mip levels, at least 1.
    pub mip_levels: u32,
    /// Number of array layers; values above 1 make a 2D array.
    pub array_size: u32,
    /// Texel format.
    pub format: TextureFormat,
    /// How the texture will be used.
    pub usage: TextureUsage,
}

impl Default for TextureDescriptor<'_> {
    fn default() -> Self {
        Self {
            label: None,
            width: 1,
            height: 1,
            depth: 1,
            mip_levels: 1,
            array_size: 1,
            format: TextureFormat::Rgba8Unorm,
            usage: TextureUsage::SHADER_RESOURCE,
        }
    }
}

impl TextureDescriptor<'_> {
    /// `depth > 1` gives a 3D texture, otherwise `array_size > 1` gives a 2D
    /// array, otherwise a plain 2D texture.
    pub fn dimension(&self) -> TextureDimension {
        if self.depth > 1 {
            TextureDimension::D3
        } else if self.array_size > 1 {
            TextureDimension::D2Array
        } else {
            TextureDimension::D2
        }
    }

    /// Depth of a 3D texture, or the layer count of a 2D (array) texture.
    pub fn depth_or_array_layers(&self) -> u32 {
        match self.dimension() {
            TextureDimension::D3 => self.depth,
            _ => self.array_size.max(1),
        }
    }
}

/// The extent of a single mip level.
pub fn mip_extent(width: u32, height: u32, mip_level: u32) -> (u32, u32) {
    let shrink = |v: u32| v.checked_shr(mip_level).unwrap_or(0).max(1);
    (shrink(width), shrink(height))
}

/// A fully resolved texture upload: one whole mip level of one slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureUploadRegion {
    /// Target mip level.
    pub mip_level: u32,
    /// Array layer (2D arrays) or depth slice (3D textures).
    pub array_slice: u32,
    /// Width of the mip level in texels.
    pub width: u32,
    /// Height of the mip level in texels.
    pub height: u32,
    /// Bytes between two rows of the source data.
    pub bytes_per_row: u32,
}

impl TextureUploadRegion {
    /// Number of source bytes the region consumes.
    pub fn byte_len(&self) -> u64 {
        u64::from(self.bytes_per_row) * u64::from(self.height)
    }
}
