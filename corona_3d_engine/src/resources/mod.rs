//! GPU resource handles
//!
//! Front-end objects (safe on any thread, metadata only) and their core
//! counterparts (used on the core thread only).

mod buffer;
mod core_object;
mod gpu_params;
mod pipeline_state;
mod render_target;
mod render_window;

pub use buffer::{
    BufferUsage, IndexType,
    VertexBuffer, VertexBufferCore, VertexBufferDesc,
    IndexBuffer, IndexBufferCore, IndexBufferDesc,
};
pub use core_object::{CoreHandle, CoreObjectId, FrontEndResource};
pub use gpu_params::{GpuParams, GpuParamsCore, GpuParamsDesc};
pub use pipeline_state::{
    GraphicsPipelineState, GraphicsPipelineStateCore, GraphicsPipelineStateDesc,
    ComputePipelineState, ComputePipelineStateCore, ComputePipelineStateDesc,
    VertexDeclaration, VertexDeclarationCore,
    VertexElement, VertexElementSemantic, VertexElementType,
};
pub use render_target::{RenderTarget, RenderTargetCore, RenderTargetProperties};
pub use render_window::{RenderWindow, RenderWindowCore, RenderWindowDesc};

#[cfg(test)]
#[path = "resources_tests.rs"]
mod tests;
