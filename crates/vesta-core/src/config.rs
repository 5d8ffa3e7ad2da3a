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

//! Device creation settings.
//!
//! [`DeviceConfig`] is the Rust-side counterpart of the C device-creation
//! descriptor. It can be built in code, parsed from JSON, or loaded from a file,
//! and then adjusted by environment variables.

use crate::rhi::api::{GraphicsBackendType, PowerPreference};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable forcing a specific backend (`vulkan`, `metal`, `dx12`, `gl`).
pub const BACKEND_ENV_VAR: &str = "VESTA_BACKEND";
/// Environment variable toggling validation (`1`/`true` or `0`/`false`).
pub const VALIDATION_ENV_VAR: &str = "VESTA_VALIDATION";

/// Settings used when a device is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Name reported to the backend and used in log lines.
    pub application_name: String,
    /// Enables the backend's debug layer (extra labels and debug markers).
    pub enable_debug_layer: bool,
    /// Enables GPU-assisted validation where the backend supports it.
    pub enable_gpu_validation: bool,
    /// Enables API validation.
    pub enable_validation: bool,
    /// Which adapter class to prefer when several are available.
    pub power_preference: PowerPreference,
    /// Restricts adapter selection to one backend. `Unknown` lets the
    /// implementation pick the platform default.
    pub backend: GraphicsBackendType,
    /// Requests vertical synchronisation for swapchains created by default.
    pub vsync: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            application_name: "Vesta Application".to_string(),
            enable_debug_layer: cfg!(debug_assertions),
            enable_gpu_validation: false,
            enable_validation: cfg!(debug_assertions),
            power_preference: PowerPreference::HighPerformance,
            backend: GraphicsBackendType::Unknown,
            vsync: true,
        }
    }
}

impl DeviceConfig {
    /// Parses a configuration from a JSON document. Missing fields take their
    /// default value.
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("Failed to parse device configuration")
    }

    /// Loads a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read device configuration '{}'", path.display()))?;
        Self::from_json_str(&text)
            .with_context(|| format!("Invalid device configuration '{}'", path.display()))
    }

    /// Applies [`BACKEND_ENV_VAR`] and [`VALIDATION_ENV_VAR`] from the process
    /// environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var(BACKEND_ENV_VAR).ok().as_deref(),
            std::env::var(VALIDATION_ENV_VAR).ok().as_deref(),
        )
    }

    fn with_overrides(mut self, backend: Option<&str>, validation: Option<&str>) -> Self {
        if let Some(name) = backend {
            match GraphicsBackendType::from_name(name) {
                Some(backend) => {
                    log::info!("DeviceConfig: backend forced to {backend:?} by {BACKEND_ENV_VAR}");
                    self.backend = backend;
                }
                None => log::warn!("DeviceConfig: ignoring unknown {BACKEND_ENV_VAR} value '{name}'"),
            }
        }

        if let Some(flag) = validation {
            match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "on" => self.enable_validation = true,
                "0" | "false" | "off" => self.enable_validation = false,
                other => log::warn!("DeviceConfig: ignoring unknown {VALIDATION_ENV_VAR} value '{other}'"),
            }
        }

        self
    }
}
