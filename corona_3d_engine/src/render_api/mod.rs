//! Render API
//!
//! [`RenderApi`] is the producer-side facade: it turns calls into commands
//! for the core thread. [`RenderApiCore`] is what a backend implements to
//! receive them.

mod capabilities;
mod draw_operation;
mod render_api;
mod render_api_core;
mod types;

#[cfg(test)]
pub(crate) mod mock_render_api;

pub use capabilities::{CapabilityFlags, GpuVendor, RenderApiCapabilities};
pub use draw_operation::{DrawOperationType, vertex_count_to_prim_count, vertex_count_to_prim_count_raw};
pub use render_api::{CoreContext, RenderApi, RenderApiLifecycle};
pub use render_api_core::{RenderApiCore, RenderApiCoreState};
pub use types::{
    Color, FrameBufferType, Rect2, RenderApiInfo, RenderSurfaceMask,
    VideoMode, VideoModeInfo, VideoOutputInfo,
};
