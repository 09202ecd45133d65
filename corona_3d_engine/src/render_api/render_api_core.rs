/// RenderApiCore trait - backend interface driven from the core thread
///
/// Every method runs on the core thread, called by commands the
/// [`RenderApi`](super::RenderApi) facade queued. Arguments are already
/// resolved core objects.

use std::sync::Arc;
use std::thread::ThreadId;

use crate::error::Result;
use crate::resources::{
    ComputePipelineStateCore, GpuParamsCore, GraphicsPipelineStateCore, IndexBufferCore,
    RenderTargetCore, RenderWindowCore, VertexBufferCore, VertexDeclarationCore,
};
use super::capabilities::RenderApiCapabilities;
use super::draw_operation::DrawOperationType;
use super::types::{Color, FrameBufferType, Rect2, RenderApiInfo, RenderSurfaceMask, VideoModeInfo};

// ============================================================================
// Shared core state
// ============================================================================

/// State every backend carries, mutated on the core thread only
#[derive(Debug, Default)]
pub struct RenderApiCoreState {
    capabilities: Vec<RenderApiCapabilities>,
    active_render_target: Option<Arc<RenderTargetCore>>,
    core_thread_id: Option<ThreadId>,
}

impl RenderApiCoreState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the per-device capability table (index = device)
    pub fn set_capabilities(&mut self, capabilities: Vec<RenderApiCapabilities>) {
        self.capabilities = capabilities;
    }

    pub fn num_devices(&self) -> u32 {
        self.capabilities.len() as u32
    }

    /// Capability record of a device
    ///
    /// An out-of-range index is not an error: a warning is logged and the
    /// record of device 0 is returned instead. With an empty table the
    /// default record is returned.
    pub fn capabilities(&self, device_idx: u32) -> RenderApiCapabilities {
        if let Some(record) = self.capabilities.get(device_idx as usize) {
            return record.clone();
        }

        crate::engine_warn!(
            "corona3d::RenderApiCore",
            "Invalid device index provided: {}. Valid range is: [0, {}).",
            device_idx,
            self.num_devices()
        );
        self.capabilities.first().cloned().unwrap_or_default()
    }

    pub fn active_render_target(&self) -> Option<&Arc<RenderTargetCore>> {
        self.active_render_target.as_ref()
    }

    pub fn set_active_render_target(&mut self, target: Option<Arc<RenderTargetCore>>) {
        self.active_render_target = target;
    }

    /// Thread recorded by [`record_core_thread`](Self::record_core_thread)
    pub fn core_thread_id(&self) -> Option<ThreadId> {
        self.core_thread_id
    }

    /// Remember the calling thread as the core thread
    pub fn record_core_thread(&mut self) {
        self.core_thread_id = Some(std::thread::current().id());
    }

    /// Whether the caller is the recorded core thread
    pub fn is_core_thread(&self) -> bool {
        self.core_thread_id == Some(std::thread::current().id())
    }

    /// Release everything held for the device
    pub fn clear(&mut self) {
        self.active_render_target = None;
        self.capabilities.clear();
    }
}

// ============================================================================
// RenderApiCore trait
// ============================================================================

/// Render backend living on the core thread
///
/// Implemented once per backend (e.g. `D3D9RenderApi`). Only one instance
/// is active per process; it is moved onto the core thread by
/// [`RenderApi`](super::RenderApi) and never touched from anywhere else.
pub trait RenderApiCore: Send {
    /// Backend display name
    fn name(&self) -> &str;

    /// API conventions, fixed once the backend is created
    fn api_info(&self) -> RenderApiInfo;

    /// Available outputs and video modes, fixed once the backend is created
    fn video_mode_info(&self) -> VideoModeInfo;

    /// Set up global device state before any window exists
    fn initialize(&mut self) -> Result<()> {
        self.state_mut().record_core_thread();
        Ok(())
    }

    /// Finish initialization once the primary window exists
    ///
    /// # Errors
    ///
    /// `WrongThread` when not called on the core thread.
    fn initialize_with_window(&mut self, primary_window: Arc<RenderWindowCore>) -> Result<()>;

    /// Release device state. Called once, as the last command before shutdown.
    fn destroy_core(&mut self) -> Result<()> {
        self.state_mut().clear();
        Ok(())
    }

    fn set_gpu_params(&mut self, params: Arc<GpuParamsCore>) -> Result<()>;

    fn set_graphics_pipeline(&mut self, pipeline: Arc<GraphicsPipelineStateCore>) -> Result<()>;

    fn set_compute_pipeline(&mut self, pipeline: Arc<ComputePipelineStateCore>) -> Result<()>;

    /// Bind `buffers` to consecutive slots starting at `index`
    ///
    /// `None` entries unbind their slot.
    fn set_vertex_buffers(&mut self, index: u32, buffers: &[Option<Arc<VertexBufferCore>>]) -> Result<()>;

    fn set_index_buffer(&mut self, buffer: Arc<IndexBufferCore>) -> Result<()>;

    fn set_vertex_declaration(&mut self, declaration: Arc<VertexDeclarationCore>) -> Result<()>;

    /// Viewport in normalized coordinates of the active render target
    fn set_viewport(&mut self, area: Rect2) -> Result<()>;

    fn set_scissor_rect(&mut self, left: u32, top: u32, right: u32, bottom: u32) -> Result<()>;

    fn set_stencil_ref(&mut self, value: u32) -> Result<()>;

    fn set_draw_operation(&mut self, op: DrawOperationType) -> Result<()>;

    /// Bind a render target
    ///
    /// Implementations must record the target with
    /// [`RenderApiCoreState::set_active_render_target`].
    fn set_render_target(
        &mut self,
        target: Arc<RenderTargetCore>,
        read_only_depth_stencil: bool,
        load_mask: RenderSurfaceMask,
    ) -> Result<()>;

    /// Clear the whole active render target
    fn clear_render_target(
        &mut self,
        buffers: FrameBufferType,
        color: Color,
        depth: f32,
        stencil: u16,
        target_mask: u8,
    ) -> Result<()>;

    /// Clear only the current viewport area
    fn clear_viewport(
        &mut self,
        buffers: FrameBufferType,
        color: Color,
        depth: f32,
        stencil: u16,
        target_mask: u8,
    ) -> Result<()>;

    fn swap_buffers(&mut self, target: Arc<RenderTargetCore>, sync_mask: u32) -> Result<()>;

    fn draw(&mut self, vertex_offset: u32, vertex_count: u32, instance_count: u32) -> Result<()>;

    fn draw_indexed(
        &mut self,
        start_index: u32,
        index_count: u32,
        vertex_offset: u32,
        vertex_count: u32,
        instance_count: u32,
    ) -> Result<()>;

    fn dispatch_compute(&mut self, num_groups_x: u32, num_groups_y: u32, num_groups_z: u32) -> Result<()>;

    fn state(&self) -> &RenderApiCoreState;

    fn state_mut(&mut self) -> &mut RenderApiCoreState;

    /// See [`RenderApiCoreState::capabilities`]
    fn capabilities(&self, device_idx: u32) -> RenderApiCapabilities {
        self.state().capabilities(device_idx)
    }

    fn num_devices(&self) -> u32 {
        self.state().num_devices()
    }
}

#[cfg(test)]
#[path = "render_api_core_tests.rs"]
mod tests;
