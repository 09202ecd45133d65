/// Pipeline states and vertex declarations
///
/// Programs are referenced by name only; compiling them is the backend's
/// business.

use std::sync::Arc;

use crate::error::{Error, Result};
use super::core_object::{CoreHandle, CoreObjectId, FrontEndResource};

// ============================================================================
// Graphics pipeline
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GraphicsPipelineStateDesc {
    pub name: String,
    pub vertex_program: Option<String>,
    pub fragment_program: Option<String>,
    pub geometry_program: Option<String>,
    pub depth_write: bool,
    pub depth_test: bool,
    pub stencil_enable: bool,
}

#[derive(Debug)]
pub struct GraphicsPipelineStateCore {
    id: CoreObjectId,
    desc: GraphicsPipelineStateDesc,
}

impl GraphicsPipelineStateCore {
    pub fn id(&self) -> CoreObjectId {
        self.id
    }

    pub fn desc(&self) -> &GraphicsPipelineStateDesc {
        &self.desc
    }
}

pub struct GraphicsPipelineState {
    desc: GraphicsPipelineStateDesc,
    handle: CoreHandle<GraphicsPipelineStateCore>,
}

impl GraphicsPipelineState {
    pub fn create(desc: GraphicsPipelineStateDesc) -> Result<Arc<Self>> {
        let core = GraphicsPipelineStateCore { id: CoreObjectId::next(), desc: desc.clone() };
        Ok(Arc::new(Self { desc, handle: CoreHandle::new(core) }))
    }

    pub fn desc(&self) -> &GraphicsPipelineStateDesc {
        &self.desc
    }
}

impl FrontEndResource for GraphicsPipelineState {
    type Core = GraphicsPipelineStateCore;
    const KIND: &'static str = "graphics pipeline state";

    fn core_handle(&self) -> &CoreHandle<GraphicsPipelineStateCore> {
        &self.handle
    }
}

// ============================================================================
// Compute pipeline
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ComputePipelineStateDesc {
    pub name: String,
    pub compute_program: String,
}

#[derive(Debug)]
pub struct ComputePipelineStateCore {
    id: CoreObjectId,
    desc: ComputePipelineStateDesc,
}

impl ComputePipelineStateCore {
    pub fn id(&self) -> CoreObjectId {
        self.id
    }

    pub fn desc(&self) -> &ComputePipelineStateDesc {
        &self.desc
    }
}

pub struct ComputePipelineState {
    desc: ComputePipelineStateDesc,
    handle: CoreHandle<ComputePipelineStateCore>,
}

impl ComputePipelineState {
    /// # Errors
    ///
    /// `InvalidResource` if no compute program is named.
    pub fn create(desc: ComputePipelineStateDesc) -> Result<Arc<Self>> {
        if desc.compute_program.is_empty() {
            return Err(Error::InvalidResource(format!(
                "compute pipeline '{}' has no compute program", desc.name
            )));
        }

        let core = ComputePipelineStateCore { id: CoreObjectId::next(), desc: desc.clone() };
        Ok(Arc::new(Self { desc, handle: CoreHandle::new(core) }))
    }

    pub fn desc(&self) -> &ComputePipelineStateDesc {
        &self.desc
    }
}

impl FrontEndResource for ComputePipelineState {
    type Core = ComputePipelineStateCore;
    const KIND: &'static str = "compute pipeline state";

    fn core_handle(&self) -> &CoreHandle<ComputePipelineStateCore> {
        &self.handle
    }
}

// ============================================================================
// Vertex declaration
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexElementSemantic {
    Position,
    Normal,
    Tangent,
    Color,
    TexCoord,
    BlendWeights,
    BlendIndices,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexElementType {
    Float1,
    Float2,
    Float3,
    Float4,
    Color,
    UByte4,
}

impl VertexElementType {
    pub fn size_bytes(self) -> u32 {
        match self {
            VertexElementType::Float1 => 4,
            VertexElementType::Float2 => 8,
            VertexElementType::Float3 => 12,
            VertexElementType::Float4 => 16,
            VertexElementType::Color | VertexElementType::UByte4 => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexElement {
    /// Vertex stream (buffer slot) the element is read from
    pub stream: u16,
    pub offset: u32,
    pub element_type: VertexElementType,
    pub semantic: VertexElementSemantic,
    pub semantic_index: u16,
}

#[derive(Debug)]
pub struct VertexDeclarationCore {
    id: CoreObjectId,
    elements: Vec<VertexElement>,
}

impl VertexDeclarationCore {
    pub fn id(&self) -> CoreObjectId {
        self.id
    }

    pub fn elements(&self) -> &[VertexElement] {
        &self.elements
    }

    /// Bytes per vertex read from `stream`
    pub fn stream_stride(&self, stream: u16) -> u32 {
        self.elements
            .iter()
            .filter(|element| element.stream == stream)
            .map(|element| element.offset + element.element_type.size_bytes())
            .max()
            .unwrap_or(0)
    }
}

pub struct VertexDeclaration {
    elements: Vec<VertexElement>,
    handle: CoreHandle<VertexDeclarationCore>,
}

impl VertexDeclaration {
    /// # Errors
    ///
    /// `InvalidResource` for an empty element list.
    pub fn create(elements: Vec<VertexElement>) -> Result<Arc<Self>> {
        if elements.is_empty() {
            return Err(Error::InvalidResource("vertex declaration has no elements".to_string()));
        }

        let core = VertexDeclarationCore { id: CoreObjectId::next(), elements: elements.clone() };
        Ok(Arc::new(Self { elements, handle: CoreHandle::new(core) }))
    }

    pub fn elements(&self) -> &[VertexElement] {
        &self.elements
    }
}

impl FrontEndResource for VertexDeclaration {
    type Core = VertexDeclarationCore;
    const KIND: &'static str = "vertex declaration";

    fn core_handle(&self) -> &CoreHandle<VertexDeclarationCore> {
        &self.handle
    }
}
