/// Vertex and index buffers
///
/// Only the description is tracked here; device memory and uploads belong
/// to the backend.

use std::sync::Arc;

use crate::error::{Error, Result};
use super::core_object::{CoreHandle, CoreObjectId, FrontEndResource};

/// How often buffer contents are expected to change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferUsage {
    #[default]
    Static,
    Dynamic,
}

/// Index element size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    Bit16,
    Bit32,
}

impl IndexType {
    pub fn size_bytes(self) -> u32 {
        match self {
            IndexType::Bit16 => 2,
            IndexType::Bit32 => 4,
        }
    }
}

// ============================================================================
// Vertex buffer
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct VertexBufferDesc {
    /// Size of one vertex in bytes
    pub vertex_size: u32,
    pub num_vertices: u32,
    pub usage: BufferUsage,
}

/// Core-thread side of a vertex buffer
#[derive(Debug)]
pub struct VertexBufferCore {
    id: CoreObjectId,
    desc: VertexBufferDesc,
}

impl VertexBufferCore {
    pub fn id(&self) -> CoreObjectId {
        self.id
    }

    pub fn desc(&self) -> &VertexBufferDesc {
        &self.desc
    }

    pub fn size_bytes(&self) -> u64 {
        self.desc.vertex_size as u64 * self.desc.num_vertices as u64
    }
}

/// Front-end vertex buffer
pub struct VertexBuffer {
    desc: VertexBufferDesc,
    handle: CoreHandle<VertexBufferCore>,
}

impl VertexBuffer {
    /// Create a vertex buffer and its core object
    ///
    /// # Errors
    ///
    /// `InvalidResource` for a zero vertex size or count.
    pub fn create(desc: VertexBufferDesc) -> Result<Arc<Self>> {
        if desc.vertex_size == 0 || desc.num_vertices == 0 {
            return Err(Error::InvalidResource(format!(
                "vertex buffer needs a non-zero size (vertex_size = {}, num_vertices = {})",
                desc.vertex_size, desc.num_vertices
            )));
        }

        let core = VertexBufferCore { id: CoreObjectId::next(), desc: desc.clone() };
        Ok(Arc::new(Self { desc, handle: CoreHandle::new(core) }))
    }

    pub fn desc(&self) -> &VertexBufferDesc {
        &self.desc
    }
}

impl FrontEndResource for VertexBuffer {
    type Core = VertexBufferCore;
    const KIND: &'static str = "vertex buffer";

    fn core_handle(&self) -> &CoreHandle<VertexBufferCore> {
        &self.handle
    }
}

// ============================================================================
// Index buffer
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct IndexBufferDesc {
    pub index_type: IndexType,
    pub num_indices: u32,
    pub usage: BufferUsage,
}

/// Core-thread side of an index buffer
#[derive(Debug)]
pub struct IndexBufferCore {
    id: CoreObjectId,
    desc: IndexBufferDesc,
}

impl IndexBufferCore {
    pub fn id(&self) -> CoreObjectId {
        self.id
    }

    pub fn desc(&self) -> &IndexBufferDesc {
        &self.desc
    }

    pub fn size_bytes(&self) -> u64 {
        self.desc.index_type.size_bytes() as u64 * self.desc.num_indices as u64
    }
}

/// Front-end index buffer
pub struct IndexBuffer {
    desc: IndexBufferDesc,
    handle: CoreHandle<IndexBufferCore>,
}

impl IndexBuffer {
    /// Create an index buffer and its core object
    ///
    /// # Errors
    ///
    /// `InvalidResource` for a zero index count.
    pub fn create(desc: IndexBufferDesc) -> Result<Arc<Self>> {
        if desc.num_indices == 0 {
            return Err(Error::InvalidResource("index buffer needs at least one index".to_string()));
        }

        let core = IndexBufferCore { id: CoreObjectId::next(), desc: desc.clone() };
        Ok(Arc::new(Self { desc, handle: CoreHandle::new(core) }))
    }

    pub fn desc(&self) -> &IndexBufferDesc {
        &self.desc
    }
}

impl FrontEndResource for IndexBuffer {
    type Core = IndexBufferCore;
    const KIND: &'static str = "index buffer";

    fn core_handle(&self) -> &CoreHandle<IndexBufferCore> {
        &self.handle
    }
}
