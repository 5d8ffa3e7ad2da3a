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

//! Defines the descriptor used to create shader stages.

use super::common::ShaderStage;
use std::borrow::Cow;

/// Describes one shader stage to compile.
///
/// The source is WGSL text; the entry point must exist in the module and be
/// declared for `stage`.
#[derive(Debug, Clone)]
pub struct ShaderDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The stage the entry point runs in.
    pub stage: ShaderStage,
    /// Shader source text.
    pub source: Cow<'a, str>,
    /// Name of the entry-point function.
    pub entry_point: Cow<'a, str>,
}

impl<'a> ShaderDescriptor<'a> {
    /// Shorthand for a descriptor without label.
    pub fn new(stage: ShaderStage, source: impl Into<Cow<'a, str>>, entry_point: impl Into<Cow<'a, str>>) -> Self {
        Self {
            label: None,
            stage,
            source: source.into(),
            entry_point: entry_point.into(),
        }
    }

    /// The label, or the entry point when no label was given.
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.entry_point)
    }
}
