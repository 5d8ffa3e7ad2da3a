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

//! # Vesta Core
//!
//! Foundational crate of the Vesta render hardware interface. It contains the
//! backend-neutral vocabulary (handles, descriptors, formats, usage flags), the
//! backend contracts, the device resource registry and the command-list
//! recording state machine. No graphics API is referenced from here.

#![warn(missing_docs)]

pub mod config;
pub mod diagnostics;
pub mod platform;
pub mod rhi;
pub mod utils;

pub use config::DeviceConfig;
pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSource, DiagnosticsBus};
