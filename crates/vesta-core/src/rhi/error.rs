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

//! Defines the hierarchy of error types for the RHI.
//!
//! Hard failures (allocation, compilation, pipeline construction, bounds) are
//! returned as these errors; the C boundary turns them into the null handle or
//! `false`. Sequencing mistakes are not errors at all: they are tolerated and
//! reported through the diagnostics bus.

use crate::rhi::api::{BufferHandle, ShaderHandle, ShaderStage, TextureFormat};
use std::fmt;

/// An error related to compiling a shader stage.
#[derive(Debug)]
pub enum ShaderError {
    /// The source failed to parse or validate.
    CompilationError {
        /// A descriptive label for the shader.
        label: String,
        /// Messages from the shader front-end.
        details: String,
    },
    /// The entry point does not exist in the module, or is declared for
    /// another stage.
    InvalidEntryPoint {
        /// A descriptive label for the shader.
        label: String,
        /// The entry point that was requested.
        entry_point: String,
        /// The stage it was requested for.
        stage: ShaderStage,
    },
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CompilationError { label, details } => write!(f, "shader '{label}' did not compile: {details}"),
            Self::InvalidEntryPoint { label, entry_point, stage } => {
                write!(f, "no {stage:?} entry point named '{entry_point}' in shader '{label}'")
            }
        }
    }
}

impl std::error::Error for ShaderError {}

/// An error related to the creation of a pipeline state.
#[derive(Debug)]
pub enum PipelineError {
    /// A shader handle did not resolve to a live shader of the expected stage.
    InvalidShaderHandle {
        /// The handle that failed to resolve.
        handle: ShaderHandle,
        /// The stage it was supplied for.
        expected_stage: ShaderStage,
        /// The label of the pipeline being created.
        pipeline_label: Option<String>,
    },
    /// More color targets than supported, or an unusable target format.
    InvalidRenderTargets(String),
    /// The vertex layout cannot be expressed.
    InvalidVertexLayout(String),
    /// The backend refused to build the pipeline.
    CompilationFailed {
        /// The label of the pipeline being created.
        label: Option<String>,
        /// Details from the backend.
        details: String,
    },
    /// The requested kind of pipeline has no implementation.
    Unimplemented(&'static str),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidShaderHandle { handle, expected_stage, pipeline_label } => {
                let label = pipeline_label.as_deref().unwrap_or("<unnamed>");
                write!(f, "{handle} is not a live {expected_stage:?} shader (pipeline '{label}')")
            }
            Self::InvalidRenderTargets(msg) => write!(f, "render targets rejected: {msg}"),
            Self::InvalidVertexLayout(msg) => write!(f, "vertex layout rejected: {msg}"),
            Self::CompilationFailed { label, details } => {
                let label = label.as_deref().unwrap_or("<unnamed>");
                write!(f, "backend refused pipeline '{label}': {details}")
            }
            Self::Unimplemented(what) => write!(f, "{what} is not implemented"),
        }
    }
}

impl std::error::Error for PipelineError {}

/// An error related to the creation or use of a GPU resource.
#[derive(Debug)]
pub enum ResourceError {
    /// A shader-specific error occurred.
    Shader(ShaderError),
    /// A pipeline-specific error occurred.
    Pipeline(PipelineError),
    /// The handle does not name a live resource.
    NotFound,
    /// A creation descriptor is unusable.
    InvalidDescriptor(String),
    /// A CPU write targeted a buffer without host access.
    NotCpuAccessible(BufferHandle),
    /// A swapchain was requested without a window.
    MissingWindowHandle,
    /// A texture format cannot be used for the requested purpose.
    UnsupportedFormat(TextureFormat),
    /// An error originating from the graphics backend.
    BackendError(String),
    /// A write or read range exceeds the resource's extent.
    OutOfBounds {
        /// First byte (or subresource index) accessed.
        offset: u64,
        /// Number of bytes (or subresources) accessed.
        size: u64,
        /// Extent of the resource.
        capacity: u64,
    },
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shader(err) => write!(f, "shader: {err}"),
            Self::Pipeline(err) => write!(f, "pipeline: {err}"),
            Self::NotFound => f.write_str("handle does not name a live resource"),
            Self::InvalidDescriptor(msg) => write!(f, "descriptor rejected: {msg}"),
            Self::NotCpuAccessible(handle) => write!(f, "{handle} has no host access"),
            Self::MissingWindowHandle => f.write_str("swapchain descriptor has no window"),
            Self::UnsupportedFormat(format) => write!(f, "{format:?} is not usable here"),
            Self::BackendError(msg) => write!(f, "backend: {msg}"),
            Self::OutOfBounds { offset, size, capacity } => {
                write!(f, "range {offset}..{} exceeds extent {capacity}", offset.saturating_add(*size))
            }
        }
    }
}

impl std::error::Error for ResourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Shader(err) => Some(err),
            Self::Pipeline(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ShaderError> for ResourceError {
    fn from(value: ShaderError) -> Self {
        Self::Shader(value)
    }
}

impl From<PipelineError> for ResourceError {
    fn from(value: PipelineError) -> Self {
        Self::Pipeline(value)
    }
}

/// A device-level error.
#[derive(Debug)]
pub enum RhiError {
    /// No adapter matched the requested configuration.
    NoCompatibleAdapter(String),
    /// The backend failed to create the device or its queue.
    InitializationFailed(String),
    /// The next drawable could not be acquired.
    SurfaceAcquisitionFailed(String),
    /// The device was lost and must be recreated.
    DeviceLost,
    /// An error occurred while managing a resource.
    ResourceError(ResourceError),
}

impl fmt::Display for RhiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCompatibleAdapter(msg) => write!(f, "no adapter matches the configuration: {msg}"),
            Self::InitializationFailed(msg) => write!(f, "device creation failed: {msg}"),
            Self::SurfaceAcquisitionFailed(msg) => write!(f, "no drawable could be acquired: {msg}"),
            Self::DeviceLost => f.write_str("device lost; recreate it"),
            Self::ResourceError(err) => write!(f, "resource: {err}"),
        }
    }
}

impl std::error::Error for RhiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ResourceError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResourceError> for RhiError {
    fn from(value: ResourceError) -> Self {
        Self::ResourceError(value)
    }
}
