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

//! Defines the descriptor used to create swapchains.

use super::format::TextureFormat;
use crate::platform::NativeWindow;
use std::borrow::Cow;

/// A descriptor used to create a swapchain on a native window.
#[derive(Debug, Clone)]
pub struct SwapchainDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The window to present into. Creation fails without one.
    pub window: Option<NativeWindow>,
    /// Drawable width in pixels.
    pub width: u32,
    /// Drawable height in pixels.
    pub height: u32,
    /// Requested drawable format. Drawables handed out by the device always
    /// report [`TextureFormat::PRESENTATION`].
    pub format: TextureFormat,
    /// Requested number of drawables in flight.
    pub buffer_count: u32,
    /// Wait for vertical blank when presenting.
    pub vsync: bool,
}

impl Default for SwapchainDescriptor<'_> {
    fn default() -> Self {
        Self {
            label: None,
            window: None,
            width: 0,
            height: 0,
            format: TextureFormat::PRESENTATION,
            buffer_count: 2,
            vsync: true,
        }
    }
}

/// The surface settings a backend applies when (re)configuring a swapchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceConfig {
    /// Drawable width in pixels, never zero.
    pub width: u32,
    /// Drawable height in pixels, never zero.
    pub height: u32,
    /// Drawable format.
    pub format: TextureFormat,
    /// Requested number of drawables in flight.
    pub buffer_count: u32,
    /// Wait for vertical blank when presenting.
    pub vsync: bool,
}
