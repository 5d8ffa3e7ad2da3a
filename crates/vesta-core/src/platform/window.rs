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

use raw_window_handle::{
    DisplayHandle, HandleError, HasDisplayHandle, HasWindowHandle, RawDisplayHandle,
    RawWindowHandle, WindowHandle as BorrowedWindowHandle,
};
use std::fmt;
use std::sync::Arc;

/// The windowing traits a presentation surface needs, merged into one so it can
/// be used as a trait object.
pub trait WindowHandle: HasWindowHandle + HasDisplayHandle {}

impl<T: HasWindowHandle + HasDisplayHandle> WindowHandle for T {}

/// A shared, thread-safe handle to the native window a swapchain presents into.
///
/// Cloning is cheap; the window itself must outlive every swapchain built on it.
#[derive(Clone)]
pub struct NativeWindow(Arc<dyn WindowHandle + Send + Sync>);

impl NativeWindow {
    /// Wraps any window type that exposes raw handles (a `winit` window, an
    /// SDL window, or a [`RawWindow`] received over the C boundary).
    pub fn new<W: WindowHandle + Send + Sync + 'static>(window: W) -> Self {
        Self(Arc::new(window))
    }

    /// Wraps an already shared window.
    pub fn from_arc(window: Arc<dyn WindowHandle + Send + Sync>) -> Self {
        Self(window)
    }
}

impl HasWindowHandle for NativeWindow {
    fn window_handle(&self) -> Result<BorrowedWindowHandle<'_>, HandleError> {
        self.0.window_handle()
    }
}

impl HasDisplayHandle for NativeWindow {
    fn display_handle(&self) -> Result<DisplayHandle<'_>, HandleError> {
        self.0.display_handle()
    }
}

impl fmt::Debug for NativeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let window = self.0.window_handle().map(|h| h.as_raw());
        f.debug_tuple("NativeWindow").field(&window).finish()
    }
}

/// A pair of raw handles owned by someone else (typically a foreign caller).
///
/// The owner guarantees both handles stay valid for as long as any swapchain
/// created from them is alive.
#[derive(Debug, Clone, Copy)]
pub struct RawWindow {
    /// The raw native window.
    pub window: RawWindowHandle,
    /// The raw native display connection.
    pub display: RawDisplayHandle,
}

// SAFETY: the handles are plain identifiers; the owner is responsible for
// only using them from threads the platform allows.
unsafe impl Send for RawWindow {}
// SAFETY: see above.
unsafe impl Sync for RawWindow {}

impl HasWindowHandle for RawWindow {
    fn window_handle(&self) -> Result<BorrowedWindowHandle<'_>, HandleError> {
        // SAFETY: the owner guarantees the handle outlives this value.
        Ok(unsafe { BorrowedWindowHandle::borrow_raw(self.window) })
    }
}

impl HasDisplayHandle for RawWindow {
    fn display_handle(&self) -> Result<DisplayHandle<'_>, HandleError> {
        // SAFETY: the owner guarantees the handle outlives this value.
        Ok(unsafe { DisplayHandle::borrow_raw(self.display) })
    }
}
