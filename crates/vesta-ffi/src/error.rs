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

//! Errors raised while decoding values received over the C boundary.

use thiserror::Error;
use vesta_core::rhi::MAX_RENDER_TARGETS;

/// A C argument that could not be turned into its Rust counterpart.
///
/// These never cross the boundary themselves: the calling function logs them
/// and returns `0` or `false`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// A required pointer was null.
    #[error("null {0} pointer")]
    NullPointer(&'static str),

    /// An enumeration value outside the known discriminants.
    #[error("unknown {kind} value {value}")]
    UnknownEnum {
        /// Name of the enumeration.
        kind: &'static str,
        /// The raw value received.
        value: u32,
    },

    /// A bitmask with bits no flag defines.
    #[error("unknown {kind} bits {bits:#x}")]
    UnknownFlags {
        /// Name of the flag set.
        kind: &'static str,
        /// The raw mask received.
        bits: u32,
    },

    /// More color targets than a pipeline can hold.
    #[error("{0} render targets exceed the limit of {MAX_RENDER_TARGETS}")]
    TooManyRenderTargets(u32),

    /// A byte count the host cannot address.
    #[error("{0} bytes do not fit in host memory")]
    SizeOverflow(u64),

    /// A window handle whose fields do not form a valid platform handle.
    #[error("invalid window handle: {0}")]
    InvalidWindow(&'static str),
}

/// Result type alias for decoding.
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = DecodeError::UnknownEnum {
            kind: "TextureFormat",
            value: 99,
        };
        assert_eq!(err.to_string(), "unknown TextureFormat value 99");
        assert_eq!(
            DecodeError::UnknownFlags {
                kind: "BufferUsage",
                bits: 0x800
            }
            .to_string(),
            "unknown BufferUsage bits 0x800"
        );
        assert_eq!(
            DecodeError::TooManyRenderTargets(9).to_string(),
            "9 render targets exceed the limit of 8"
        );
    }
}
