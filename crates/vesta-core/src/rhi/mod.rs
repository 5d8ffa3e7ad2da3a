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

//! The render hardware interface: handles, descriptors, the device registry
//! and command recording.

pub mod api;
pub mod command_list;
pub mod device;
pub mod error;
pub mod frame;
pub mod pipeline_cache;
pub mod pool;
pub mod traits;

mod table;

pub use self::api::*;
pub use self::command_list::{CommandList, CommandListState, PassKind};
pub use self::device::{BufferInfo, Device, DeviceStats, PipelineInfo, ShaderInfo, TextureInfo};
pub use self::error::*;
pub use self::frame::{FrameFences, FramePacer, PerFrame, FRAME_SLOTS};
pub use self::pipeline_cache::{PipelineCache, PipelineCacheStats, PipelineKey};
pub use self::pool::{CommandListPool, PoolStats, ScopedCommandList};
pub use self::traits::*;
