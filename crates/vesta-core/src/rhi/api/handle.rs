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

//! Opaque resource handles.
//!
//! Every resource class has its own handle type so a buffer handle can never be
//! passed where a texture is expected. The wrapped value is the integer that
//! crosses the C boundary unchanged; `0` is the null handle of every class.

macro_rules! define_handle {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[repr(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// The null handle, never issued by a registry.
            pub const NULL: Self = Self(0);

            /// Returns `true` for the null handle.
            pub const fn is_null(self) -> bool {
                self.0 == 0
            }

            /// Returns `true` for any non-null handle. This says nothing about
            /// whether the resource is still alive.
            pub const fn is_valid(self) -> bool {
                self.0 != 0
            }

            /// The raw integer value.
            pub const fn raw(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for u64 {
            fn from(handle: $name) -> u64 {
                handle.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }
    };
}

define_handle!(
    /// Identifies a GPU buffer.
    BufferHandle
);
define_handle!(
    /// Identifies a texture, including swapchain backbuffer wrappers.
    TextureHandle
);
define_handle!(
    /// Identifies a compiled shader stage.
    ShaderHandle
);
define_handle!(
    /// Identifies a graphics pipeline state.
    PipelineStateHandle
);
define_handle!(
    /// Identifies a swapchain bound to a window surface.
    SwapchainHandle
);
define_handle!(
    /// Identifies a fence.
    FenceHandle
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_handle() {
        assert!(BufferHandle::NULL.is_null());
        assert!(!BufferHandle::NULL.is_valid());
        assert_eq!(BufferHandle::default(), BufferHandle::NULL);
        assert!(TextureHandle(7).is_valid());
    }

    #[test]
    fn test_raw_conversions_and_display() {
        let handle = FenceHandle::from(42);
        assert_eq!(u64::from(handle), 42);
        assert_eq!(handle.raw(), 42);
        assert_eq!(handle.to_string(), "FenceHandle#42");
    }
}
