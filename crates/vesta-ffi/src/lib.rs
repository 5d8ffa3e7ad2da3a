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

//! # Vesta FFI
//!
//! A flat C-callable surface over the Vesta RHI, for hosts that cannot link
//! Rust directly.
//!
//! Devices and command lists are addressed by `u64` ids; resources by the raw
//! value of their handle. No pointer to a Rust object ever crosses the
//! boundary. Every function tolerates null pointers and unknown ids, logging
//! them and returning `0`, `false` or nothing.
//!
//! A minimal frame from C:
//!
//! ```c
//! uint64_t list = vesta_device_begin_command_list(device);
//! vesta_command_list_set_drawable(list, swapchain);
//! vesta_command_list_begin_render_pass(list, 0, 0, /* clear */ 1, /* store */ 0, &clear);
//! vesta_command_list_set_pipeline_state(list, pipeline);
//! vesta_command_list_set_vertex_buffer(list, 0, vertices, 12, 0);
//! vesta_command_list_draw(list, 3, 1, 0, 0);
//! vesta_command_list_end_render_pass(list);
//! vesta_device_submit_command_list(device, list);
//! vesta_command_list_destroy(list);
//! ```

#![deny(unsafe_op_in_unsafe_fn)]

pub mod command_list;
pub mod device;
pub mod error;
pub mod types;

mod registry;

pub use command_list::*;
pub use device::*;
pub use error::{DecodeError, DecodeResult};
pub use types::{
    VestaBlendState, VestaBufferDesc, VestaComputePipelineDesc, VestaDepthStencilState, VestaDeviceDesc,
    VestaGraphicsPipelineDesc, VestaRasterizerState, VestaRenderTargetBlendState, VestaShaderDesc,
    VestaSwapchainDesc, VestaTextureDesc, VestaVertexElement, VestaVertexLayout, VestaWindowHandle,
    VESTA_WINDOW_APPKIT, VESTA_WINDOW_NONE, VESTA_WINDOW_WAYLAND, VESTA_WINDOW_WIN32, VESTA_WINDOW_XLIB,
};
