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

//! WGSL front-end checks shared by every backend.
//!
//! Resources are bound by stage: vertex-stage resources live in `@group(0)`,
//! pixel-stage resources in `@group(1)`, and the slot index passed to
//! `set_buffer`/`set_texture` is the `@binding` number.

use vesta_core::rhi::{ShaderDescriptor, ShaderError, ShaderStage};

/// The kind of resource a shader binding expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    /// A uniform or storage buffer.
    Buffer,
    /// A sampled or storage texture.
    Texture,
    /// A sampler.
    Sampler,
}

/// One resource binding used by a shader entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderBinding {
    /// The `@group` number.
    pub group: u32,
    /// The `@binding` number.
    pub binding: u32,
    /// What the binding expects.
    pub kind: BindingKind,
}

/// A parsed and validated shader module.
#[derive(Debug)]
pub struct ValidatedShader {
    /// The naga IR.
    pub module: naga::Module,
    /// Every binding the selected entry point actually uses.
    pub bindings: Vec<ShaderBinding>,
}

/// Bind group used by resources set for a stage.
pub fn bind_group_for_stage(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex | ShaderStage::Compute => 0,
        ShaderStage::Pixel => 1,
    }
}

fn matches_stage(stage: ShaderStage, naga_stage: naga::ShaderStage) -> bool {
    matches!(
        (stage, naga_stage),
        (ShaderStage::Vertex, naga::ShaderStage::Vertex)
            | (ShaderStage::Pixel, naga::ShaderStage::Fragment)
            | (ShaderStage::Compute, naga::ShaderStage::Compute)
    )
}

fn binding_kind(module: &naga::Module, ty: naga::Handle<naga::Type>) -> BindingKind {
    match module.types[ty].inner {
        naga::TypeInner::Sampler { .. } => BindingKind::Sampler,
        naga::TypeInner::Image { .. } => BindingKind::Texture,
        _ => BindingKind::Buffer,
    }
}

/// Parses and validates WGSL source, then checks that the requested entry
/// point exists and is declared for the requested stage.
pub fn validate_wgsl(descriptor: &ShaderDescriptor) -> Result<ValidatedShader, ShaderError> {
    let label = descriptor.display_name().to_string();
    let source = descriptor.source.as_ref();

    let module = naga::front::wgsl::parse_str(source).map_err(|e| ShaderError::CompilationError {
        label: label.clone(),
        details: e.emit_to_string(source),
    })?;

    let info = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    )
    .validate(&module)
    .map_err(|e| ShaderError::CompilationError {
        label: label.clone(),
        details: e.emit_to_string(source),
    })?;

    let Some(index) = module
        .entry_points
        .iter()
        .position(|ep| ep.name == descriptor.entry_point && matches_stage(descriptor.stage, ep.stage))
    else {
        return Err(ShaderError::InvalidEntryPoint {
            label,
            entry_point: descriptor.entry_point.to_string(),
            stage: descriptor.stage,
        });
    };

    let usage = info.get_entry_point(index);
    let bindings = module
        .global_variables
        .iter()
        .filter(|(handle, _)| !usage[*handle].is_empty())
        .filter_map(|(_, var)| {
            var.binding.as_ref().map(|rb| ShaderBinding {
                group: rb.group,
                binding: rb.binding,
                kind: binding_kind(&module, var.ty),
            })
        })
        .collect();

    Ok(ValidatedShader { module, bindings })
}
