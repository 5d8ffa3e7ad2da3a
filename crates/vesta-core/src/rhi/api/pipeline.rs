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

//! Defines the vertex layout and fixed-function state of graphics pipelines.

use super::common::{MAX_RENDER_TARGETS, MAX_VERTEX_BUFFERS, MAX_VERTEX_ELEMENTS};
use super::format::TextureFormat;
use super::handle::ShaderHandle;
use std::borrow::Cow;

/// Whether a vertex element advances per vertex or per instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum InputClassification {
    /// Advances once per vertex.
    #[default]
    PerVertex = 0,
    /// Advances once per instance.
    PerInstance = 1,
}

/// One attribute of a vertex layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexElement {
    /// Semantic name (`POSITION`, `COLOR`, ...). Informational only.
    pub semantic_name: String,
    /// Semantic index for repeated semantics.
    pub semantic_index: u32,
    /// Attribute format; only the 32-bit float vector formats are supported.
    pub format: TextureFormat,
    /// Vertex buffer slot the attribute is fetched from.
    pub input_slot: u32,
    /// Byte offset of the attribute inside one vertex.
    pub aligned_byte_offset: u32,
    /// Per-vertex or per-instance stepping.
    pub classification: InputClassification,
    /// Instances drawn per element step when stepping per instance.
    pub instance_data_step_rate: u32,
}

impl VertexElement {
    /// A per-vertex element in slot 0.
    pub fn new(semantic_name: impl Into<String>, format: TextureFormat, aligned_byte_offset: u32) -> Self {
        Self {
            semantic_name: semantic_name.into(),
            semantic_index: 0,
            format,
            input_slot: 0,
            aligned_byte_offset,
            classification: InputClassification::PerVertex,
            instance_data_step_rate: 0,
        }
    }

    /// Moves the element to another vertex buffer slot.
    #[must_use]
    pub fn in_slot(mut self, input_slot: u32) -> Self {
        self.input_slot = input_slot;
        self
    }

    /// Makes the element advance per instance.
    #[must_use]
    pub fn per_instance(mut self, step_rate: u32) -> Self {
        self.classification = InputClassification::PerInstance;
        self.instance_data_step_rate = step_rate;
        self
    }
}

/// Stride of a set of elements: the element at the highest offset (the later
/// one on ties) determines it as `offset + size`. Sizes are not summed.
pub fn vertex_stride<'e>(elements: impl IntoIterator<Item = &'e VertexElement>) -> u32 {
    let mut max_offset = 0;
    let mut last_size = 0;
    for element in elements {
        if element.aligned_byte_offset >= max_offset {
            max_offset = element.aligned_byte_offset;
            last_size = element.format.vertex_size();
        }
    }
    max_offset + last_size
}

/// The attributes fetched from one vertex buffer slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexBufferLayout {
    /// The vertex buffer slot.
    pub input_slot: u32,
    /// Bytes between consecutive elements in the buffer.
    pub stride: u32,
    /// Per-vertex or per-instance stepping of the slot.
    pub classification: InputClassification,
    /// `(shader_location, element)` pairs; the location is the element's index
    /// in the layout.
    pub attributes: Vec<(u32, VertexElement)>,
}

/// An ordered list of vertex elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct VertexLayout {
    /// The elements; element `i` feeds shader location `i`.
    pub elements: Vec<VertexElement>,
}

impl VertexLayout {
    /// Creates a layout from its elements.
    pub fn new(elements: Vec<VertexElement>) -> Self {
        Self { elements }
    }

    /// Appends an element, builder style.
    #[must_use]
    pub fn with(mut self, element: VertexElement) -> Self {
        self.elements.push(element);
        self
    }

    /// Returns `true` when the pipeline takes no vertex input.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Stride of the whole layout, see [`vertex_stride`].
    pub fn stride(&self) -> u32 {
        vertex_stride(&self.elements)
    }

    /// Groups the elements per input slot, each slot with its own stride.
    /// A slot steps per instance if any of its elements does.
    pub fn buffer_layouts(&self) -> Vec<VertexBufferLayout> {
        let mut layouts: Vec<VertexBufferLayout> = Vec::new();
        for (location, element) in self.elements.iter().enumerate() {
            let slot = element.input_slot;
            let index = match layouts.iter().position(|l| l.input_slot == slot) {
                Some(index) => index,
                None => {
                    layouts.push(VertexBufferLayout {
                        input_slot: slot,
                        stride: 0,
                        classification: InputClassification::PerVertex,
                        attributes: Vec::new(),
                    });
                    layouts.len() - 1
                }
            };
            let layout = &mut layouts[index];
            if element.classification == InputClassification::PerInstance {
                layout.classification = InputClassification::PerInstance;
            }
            layout.attributes.push((location as u32, element.clone()));
        }

        for layout in &mut layouts {
            layout.stride = vertex_stride(layout.attributes.iter().map(|(_, e)| e));
        }
        layouts.sort_by_key(|l| l.input_slot);
        layouts
    }

    /// Checks element count, slot range and attribute formats.
    pub fn validate(&self) -> Result<(), String> {
        if self.elements.len() > MAX_VERTEX_ELEMENTS {
            return Err(format!(
                "{} vertex elements exceed the limit of {MAX_VERTEX_ELEMENTS}",
                self.elements.len()
            ));
        }
        for (i, element) in self.elements.iter().enumerate() {
            if element.input_slot >= MAX_VERTEX_BUFFERS {
                return Err(format!(
                    "element {i} ('{}') uses slot {} beyond the limit of {MAX_VERTEX_BUFFERS}",
                    element.semantic_name, element.input_slot
                ));
            }
            if element.format.vertex_size() == 0 {
                return Err(format!(
                    "element {i} ('{}') has unsupported vertex format {:?}",
                    element.semantic_name, element.format
                ));
            }
        }
        Ok(())
    }
}

/// How vertices are assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum PrimitiveTopology {
    /// Each vertex is a point.
    PointList = 0,
    /// Each pair of vertices is a line.
    LineList,
    /// Consecutive vertices form a connected line.
    LineStrip,
    /// Each triple of vertices is a triangle.
    #[default]
    TriangleList,
    /// Consecutive vertices form a triangle strip.
    TriangleStrip,
}

/// Polygon rasterization mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum FillMode {
    /// Filled polygons.
    #[default]
    Solid = 0,
    /// Polygon edges only.
    Wireframe,
}

/// Which faces are culled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum CullMode {
    /// No culling.
    #[default]
    None = 0,
    /// Front faces are culled.
    Front,
    /// Back faces are culled.
    Back,
}

/// Depth and stencil comparison functions.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum CompareFunction {
    Never = 0,
    #[default]
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

/// Blend operation combining source and destination terms.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum BlendOp {
    #[default]
    Add = 0,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

/// Blend factor applied to a source or destination term.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum BlendFactor {
    Zero = 0,
    #[default]
    One,
    SrcColor,
    InvSrcColor,
    SrcAlpha,
    InvSrcAlpha,
    DestAlpha,
    InvDestAlpha,
    DestColor,
    InvDestColor,
    SrcAlphaSat,
    BlendFactor,
    InvBlendFactor,
}

/// Rasterizer configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterizerState {
    /// Solid or wireframe.
    pub fill_mode: FillMode,
    /// Face culling.
    pub cull_mode: CullMode,
    /// Counter-clockwise winding marks the front face.
    pub front_counter_clockwise: bool,
    /// Constant depth bias.
    pub depth_bias: i32,
    /// Maximum depth bias.
    pub depth_bias_clamp: f32,
    /// Slope-scaled depth bias.
    pub slope_scaled_depth_bias: f32,
    /// Clip primitives against the depth range.
    pub depth_clip_enable: bool,
}

impl Default for RasterizerState {
    fn default() -> Self {
        Self {
            fill_mode: FillMode::Solid,
            cull_mode: CullMode::None,
            front_counter_clockwise: true,
            depth_bias: 0,
            depth_bias_clamp: 0.0,
            slope_scaled_depth_bias: 0.0,
            depth_clip_enable: true,
        }
    }
}

/// Depth and stencil test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthStencilState {
    /// Enables the depth test.
    pub depth_enable: bool,
    /// Enables depth writes.
    pub depth_write_enable: bool,
    /// Depth comparison.
    pub depth_func: CompareFunction,
    /// Enables the stencil test.
    pub stencil_enable: bool,
    /// Stencil read mask.
    pub stencil_read_mask: u8,
    /// Stencil write mask.
    pub stencil_write_mask: u8,
}

impl Default for DepthStencilState {
    fn default() -> Self {
        Self {
            depth_enable: false,
            depth_write_enable: false,
            depth_func: CompareFunction::Less,
            stencil_enable: false,
            stencil_read_mask: 0xFF,
            stencil_write_mask: 0xFF,
        }
    }
}

/// Blending of one render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTargetBlendState {
    /// Enables blending.
    pub blend_enable: bool,
    /// Source color factor.
    pub src_blend: BlendFactor,
    /// Destination color factor.
    pub dst_blend: BlendFactor,
    /// Color operation.
    pub blend_op: BlendOp,
    /// Source alpha factor.
    pub src_blend_alpha: BlendFactor,
    /// Destination alpha factor.
    pub dst_blend_alpha: BlendFactor,
    /// Alpha operation.
    pub blend_op_alpha: BlendOp,
    /// RGBA write mask, bit 0 is red.
    pub write_mask: u8,
}

impl Default for RenderTargetBlendState {
    fn default() -> Self {
        Self {
            blend_enable: false,
            src_blend: BlendFactor::One,
            dst_blend: BlendFactor::Zero,
            blend_op: BlendOp::Add,
            src_blend_alpha: BlendFactor::One,
            dst_blend_alpha: BlendFactor::Zero,
            blend_op_alpha: BlendOp::Add,
            write_mask: 0b1111,
        }
    }
}

/// Blending of every render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlendState {
    /// Alpha to coverage.
    pub alpha_to_coverage_enable: bool,
    /// When `false`, target 0's state applies to every target.
    pub independent_blend_enable: bool,
    /// Per-target state.
    pub render_targets: [RenderTargetBlendState; MAX_RENDER_TARGETS],
}

impl BlendState {
    /// The blend state that applies to color target `index`.
    pub fn target(&self, index: usize) -> &RenderTargetBlendState {
        if self.independent_blend_enable {
            &self.render_targets[index.min(MAX_RENDER_TARGETS - 1)]
        } else {
            &self.render_targets[0]
        }
    }
}

/// A descriptor used to create a graphics pipeline state.
#[derive(Debug, Clone)]
pub struct GraphicsPipelineDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// Vertex-stage shader.
    pub vertex_shader: ShaderHandle,
    /// Pixel-stage shader.
    pub pixel_shader: ShaderHandle,
    /// Vertex input layout.
    pub vertex_layout: VertexLayout,
    /// Primitive assembly.
    pub topology: PrimitiveTopology,
    /// Rasterizer state.
    pub rasterizer: RasterizerState,
    /// Depth/stencil state.
    pub depth_stencil: DepthStencilState,
    /// Blend state.
    pub blend: BlendState,
    /// Color target formats, at most [`MAX_RENDER_TARGETS`].
    pub render_target_formats: Vec<TextureFormat>,
    /// Depth target format, `Unknown` for none.
    pub depth_stencil_format: TextureFormat,
}

impl Default for GraphicsPipelineDescriptor<'_> {
    fn default() -> Self {
        Self {
            label: None,
            vertex_shader: ShaderHandle::NULL,
            pixel_shader: ShaderHandle::NULL,
            vertex_layout: VertexLayout::default(),
            topology: PrimitiveTopology::TriangleList,
            rasterizer: RasterizerState::default(),
            depth_stencil: DepthStencilState::default(),
            blend: BlendState::default(),
            render_target_formats: vec![TextureFormat::PRESENTATION],
            depth_stencil_format: TextureFormat::Unknown,
        }
    }
}

/// A descriptor used to create a compute pipeline state.
#[derive(Debug, Clone, Default)]
pub struct ComputePipelineDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// Compute-stage shader.
    pub compute_shader: ShaderHandle,
}
