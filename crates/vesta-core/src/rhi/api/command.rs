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

//! Defines data structures used for recording and describing GPU commands.

use bytemuck::{Pod, Zeroable};

/// What happens to a color target's contents when a render pass begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum LoadAction {
    /// Preserve the existing contents.
    Load = 0,
    /// Clear to the pass's clear color.
    Clear = 1,
    /// Existing contents are undefined.
    DontCare = 2,
}

impl LoadAction {
    /// Decodes a raw discriminant received over the C boundary.
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(LoadAction::Load),
            1 => Some(LoadAction::Clear),
            2 => Some(LoadAction::DontCare),
            _ => None,
        }
    }
}

/// What happens to a color target's contents when a render pass ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum StoreAction {
    /// Keep the rendered contents.
    Store = 0,
    /// The contents may be discarded.
    DontCare = 1,
}

impl StoreAction {
    /// Decodes a raw discriminant received over the C boundary.
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(StoreAction::Store),
            1 => Some(StoreAction::DontCare),
            _ => None,
        }
    }
}

/// Width of the indices in an index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum IndexFormat {
    /// 16-bit indices.
    Uint16 = 0,
    /// 32-bit indices.
    Uint32 = 1,
}

impl IndexFormat {
    /// Decodes a raw discriminant received over the C boundary.
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(IndexFormat::Uint16),
            1 => Some(IndexFormat::Uint32),
            _ => None,
        }
    }
}

/// A clear color, each channel in `0.0..=1.0`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct ClearColor {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

impl ClearColor {
    /// Transparent black.
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// Creates a clear color.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// A viewport transform.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Viewport {
    /// Left edge in pixels.
    pub x: f32,
    /// Top edge in pixels.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
    /// Near depth.
    pub min_depth: f32,
    /// Far depth.
    pub max_depth: f32,
}

impl Viewport {
    /// A full-depth viewport at the origin.
    pub fn from_size(width: f32, height: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// A scissor rectangle given by its edges.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct ScissorRect {
    /// Left edge.
    pub left: i32,
    /// Top edge.
    pub top: i32,
    /// Right edge, exclusive.
    pub right: i32,
    /// Bottom edge, exclusive.
    pub bottom: i32,
}

impl ScissorRect {
    /// Horizontal extent; negative extents clamp to 0.
    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left).max(0) as u32
    }

    /// Vertical extent; negative extents clamp to 0.
    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top).max(0) as u32
    }
}

/// Describes the operation performed on an attachment when a pass begins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoadOp<V> {
    /// The existing contents are loaded.
    Load,
    /// The attachment is cleared to the value.
    Clear(V),
    /// The existing contents are undefined.
    DontCare,
}

/// Describes the operation performed on an attachment when a pass ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    /// The results are stored.
    Store,
    /// The results may be discarded.
    Discard,
}

/// Load and store operations of one attachment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Operations<V> {
    /// Operation at the start of the pass.
    pub load: LoadOp<V>,
    /// Operation at the end of the pass.
    pub store: StoreOp,
}

impl Operations<ClearColor> {
    /// Resolves the interface actions of a color attachment. The clear color
    /// only matters for [`LoadAction::Clear`]; a missing one clears to
    /// transparent black.
    pub fn from_actions(load: LoadAction, store: StoreAction, clear: Option<ClearColor>) -> Self {
        let load = match load {
            LoadAction::Load => LoadOp::Load,
            LoadAction::Clear => LoadOp::Clear(clear.unwrap_or(ClearColor::TRANSPARENT)),
            LoadAction::DontCare => LoadOp::DontCare,
        };
        let store = match store {
            StoreAction::Store => StoreOp::Store,
            StoreAction::DontCare => StoreOp::Discard,
        };
        Self { load, store }
    }
}

/// What a backend needs to open a render pass on a single color target.
#[derive(Debug)]
pub struct RenderPassDescriptor<'a, T> {
    /// An optional debug label.
    pub label: Option<&'a str>,
    /// The texture rendered to.
    pub color_target: &'a T,
    /// Load and store operations of the color target.
    pub color_ops: Operations<ClearColor>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_color_only_applies_to_clear() {
        let red = ClearColor::new(1.0, 0.0, 0.0, 1.0);

        let ops = Operations::from_actions(LoadAction::Clear, StoreAction::Store, Some(red));
        assert_eq!(ops.load, LoadOp::Clear(red));
        assert_eq!(ops.store, StoreOp::Store);

        let ops = Operations::from_actions(LoadAction::Load, StoreAction::DontCare, Some(red));
        assert_eq!(ops.load, LoadOp::Load);
        assert_eq!(ops.store, StoreOp::Discard);

        let ops = Operations::from_actions(LoadAction::Clear, StoreAction::Store, None);
        assert_eq!(ops.load, LoadOp::Clear(ClearColor::TRANSPARENT));
    }

    #[test]
    fn test_action_from_raw() {
        assert_eq!(LoadAction::from_raw(2), Some(LoadAction::DontCare));
        assert_eq!(LoadAction::from_raw(3), None);
        assert_eq!(StoreAction::from_raw(1), Some(StoreAction::DontCare));
        assert_eq!(StoreAction::from_raw(2), None);
    }

    #[test]
    fn test_scissor_extent() {
        let rect = ScissorRect {
            left: 10,
            top: 20,
            right: 110,
            bottom: 70,
        };
        assert_eq!((rect.width(), rect.height()), (100, 50));

        let inverted = ScissorRect {
            left: 50,
            right: 10,
            ..rect
        };
        assert_eq!(inverted.width(), 0);
    }

    #[test]
    fn test_pod_layouts() {
        assert_eq!(std::mem::size_of::<ClearColor>(), 16);
        assert_eq!(std::mem::size_of::<Viewport>(), 24);
        assert_eq!(std::mem::size_of::<ScissorRect>(), 16);
        let bytes: &[u8] = bytemuck::bytes_of(&ClearColor::BLACK);
        approx::assert_relative_eq!(f32::from_ne_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]), 1.0);
    }
}
