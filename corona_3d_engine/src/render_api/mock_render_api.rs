/// Mock render backend for unit tests (no device required)
///
/// Records every core call, with core objects reduced to their ids, into a
/// shared list the test keeps after the mock moved onto the core thread.

use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::log::{LogEntry, LogSeverity, Logger};
use crate::resources::{
    ComputePipelineStateCore, CoreObjectId, GpuParamsCore, GraphicsPipelineStateCore,
    IndexBufferCore, RenderTargetCore, RenderWindowCore, VertexBufferCore, VertexDeclarationCore,
};
use super::capabilities::{CapabilityFlags, GpuVendor, RenderApiCapabilities};
use super::draw_operation::DrawOperationType;
use super::render_api_core::{RenderApiCore, RenderApiCoreState};
use super::types::{Color, FrameBufferType, Rect2, RenderApiInfo, RenderSurfaceMask, VideoModeInfo};

/// One recorded core call
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Initialize,
    InitializeWithWindow(CoreObjectId),
    DestroyCore,
    SetGpuParams(CoreObjectId),
    SetGraphicsPipeline(CoreObjectId),
    SetComputePipeline(CoreObjectId),
    SetVertexBuffers { index: u32, buffers: Vec<Option<CoreObjectId>> },
    SetIndexBuffer(CoreObjectId),
    SetVertexDeclaration(CoreObjectId),
    SetViewport(Rect2),
    SetScissorRect(u32, u32, u32, u32),
    SetStencilRef(u32),
    SetDrawOperation(DrawOperationType),
    SetRenderTarget { target: CoreObjectId, read_only_depth_stencil: bool, load_mask: RenderSurfaceMask },
    ClearRenderTarget { buffers: FrameBufferType, color: Color, depth: f32, stencil: u16, target_mask: u8 },
    ClearViewport { buffers: FrameBufferType, color: Color, depth: f32, stencil: u16, target_mask: u8 },
    SwapBuffers(CoreObjectId),
    Draw { vertex_offset: u32, vertex_count: u32, instance_count: u32 },
    DrawIndexed { start_index: u32, index_count: u32, vertex_offset: u32, vertex_count: u32, instance_count: u32 },
    DispatchCompute(u32, u32, u32),
}

pub type MockCallLog = Arc<Mutex<Vec<MockCall>>>;

pub struct MockRenderApiCore {
    state: RenderApiCoreState,
    devices: Vec<RenderApiCapabilities>,
    calls: MockCallLog,
    fail_destroy: bool,
}

impl MockRenderApiCore {
    /// Mock exposing `num_devices` devices named "Mock Device {i}"
    pub fn new(num_devices: u32) -> Self {
        let devices = (0..num_devices)
            .map(|i| RenderApiCapabilities {
                device_name: format!("Mock Device {}", i),
                vendor: GpuVendor::Unknown,
                driver_version: "1.0".to_string(),
                render_api_name: "Mock".to_string(),
                num_texture_units: 8 + i,
                max_bound_vertex_buffers: 16,
                num_multi_render_targets: 4,
                max_anisotropy: 16,
                features: CapabilityFlags::HW_STENCIL | CapabilityFlags::SCISSOR_TEST,
            })
            .collect();

        Self {
            state: RenderApiCoreState::new(),
            devices,
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_destroy: false,
        }
    }

    /// Make `destroy_core` report a backend error
    pub fn with_failing_destroy(mut self) -> Self {
        self.fail_destroy = true;
        self
    }

    /// Shared handle on the recorded calls
    pub fn calls(&self) -> MockCallLog {
        self.calls.clone()
    }

    fn record(&self, call: MockCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl RenderApiCore for MockRenderApiCore {
    fn name(&self) -> &str {
        "MockRenderSystem"
    }

    fn api_info(&self) -> RenderApiInfo {
        RenderApiInfo {
            min_depth: 0.0,
            ..RenderApiInfo::default()
        }
    }

    fn video_mode_info(&self) -> VideoModeInfo {
        VideoModeInfo::default()
    }

    fn initialize(&mut self) -> Result<()> {
        self.state.record_core_thread();
        self.state.set_capabilities(self.devices.clone());
        self.record(MockCall::Initialize);
        Ok(())
    }

    fn initialize_with_window(&mut self, primary_window: Arc<RenderWindowCore>) -> Result<()> {
        if !self.state.is_core_thread() {
            return Err(Error::WrongThread("initialize_with_window called off the core thread".to_string()));
        }
        self.state.set_active_render_target(Some(primary_window.render_target().clone()));
        self.record(MockCall::InitializeWithWindow(primary_window.id()));
        Ok(())
    }

    fn destroy_core(&mut self) -> Result<()> {
        self.state.clear();
        self.record(MockCall::DestroyCore);
        if self.fail_destroy {
            return Err(Error::BackendError("mock device lost during teardown".to_string()));
        }
        Ok(())
    }

    fn set_gpu_params(&mut self, params: Arc<GpuParamsCore>) -> Result<()> {
        self.record(MockCall::SetGpuParams(params.id()));
        Ok(())
    }

    fn set_graphics_pipeline(&mut self, pipeline: Arc<GraphicsPipelineStateCore>) -> Result<()> {
        self.record(MockCall::SetGraphicsPipeline(pipeline.id()));
        Ok(())
    }

    fn set_compute_pipeline(&mut self, pipeline: Arc<ComputePipelineStateCore>) -> Result<()> {
        self.record(MockCall::SetComputePipeline(pipeline.id()));
        Ok(())
    }

    fn set_vertex_buffers(&mut self, index: u32, buffers: &[Option<Arc<VertexBufferCore>>]) -> Result<()> {
        let buffers = buffers.iter().map(|b| b.as_ref().map(|b| b.id())).collect();
        self.record(MockCall::SetVertexBuffers { index, buffers });
        Ok(())
    }

    fn set_index_buffer(&mut self, buffer: Arc<IndexBufferCore>) -> Result<()> {
        self.record(MockCall::SetIndexBuffer(buffer.id()));
        Ok(())
    }

    fn set_vertex_declaration(&mut self, declaration: Arc<VertexDeclarationCore>) -> Result<()> {
        self.record(MockCall::SetVertexDeclaration(declaration.id()));
        Ok(())
    }

    fn set_viewport(&mut self, area: Rect2) -> Result<()> {
        self.record(MockCall::SetViewport(area));
        Ok(())
    }

    fn set_scissor_rect(&mut self, left: u32, top: u32, right: u32, bottom: u32) -> Result<()> {
        self.record(MockCall::SetScissorRect(left, top, right, bottom));
        Ok(())
    }

    fn set_stencil_ref(&mut self, value: u32) -> Result<()> {
        self.record(MockCall::SetStencilRef(value));
        Ok(())
    }

    fn set_draw_operation(&mut self, op: DrawOperationType) -> Result<()> {
        self.record(MockCall::SetDrawOperation(op));
        Ok(())
    }

    fn set_render_target(
        &mut self,
        target: Arc<RenderTargetCore>,
        read_only_depth_stencil: bool,
        load_mask: RenderSurfaceMask,
    ) -> Result<()> {
        self.record(MockCall::SetRenderTarget { target: target.id(), read_only_depth_stencil, load_mask });
        self.state.set_active_render_target(Some(target));
        Ok(())
    }

    fn clear_render_target(
        &mut self,
        buffers: FrameBufferType,
        color: Color,
        depth: f32,
        stencil: u16,
        target_mask: u8,
    ) -> Result<()> {
        self.record(MockCall::ClearRenderTarget { buffers, color, depth, stencil, target_mask });
        Ok(())
    }

    fn clear_viewport(
        &mut self,
        buffers: FrameBufferType,
        color: Color,
        depth: f32,
        stencil: u16,
        target_mask: u8,
    ) -> Result<()> {
        self.record(MockCall::ClearViewport { buffers, color, depth, stencil, target_mask });
        Ok(())
    }

    fn swap_buffers(&mut self, target: Arc<RenderTargetCore>, _sync_mask: u32) -> Result<()> {
        self.record(MockCall::SwapBuffers(target.id()));
        Ok(())
    }

    fn draw(&mut self, vertex_offset: u32, vertex_count: u32, instance_count: u32) -> Result<()> {
        self.record(MockCall::Draw { vertex_offset, vertex_count, instance_count });
        Ok(())
    }

    fn draw_indexed(
        &mut self,
        start_index: u32,
        index_count: u32,
        vertex_offset: u32,
        vertex_count: u32,
        instance_count: u32,
    ) -> Result<()> {
        self.record(MockCall::DrawIndexed { start_index, index_count, vertex_offset, vertex_count, instance_count });
        Ok(())
    }

    fn dispatch_compute(&mut self, num_groups_x: u32, num_groups_y: u32, num_groups_z: u32) -> Result<()> {
        self.record(MockCall::DispatchCompute(num_groups_x, num_groups_y, num_groups_z));
        Ok(())
    }

    fn state(&self) -> &RenderApiCoreState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut RenderApiCoreState {
        &mut self.state
    }
}

// ============================================================================
// Capturing logger
// ============================================================================

/// Logger keeping every entry, for assertions on emitted warnings
#[derive(Clone, Default)]
pub struct CapturingLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl CapturingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages logged at `severity` whose text contains `needle`
    pub fn messages(&self, severity: LogSeverity, needle: &str) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.severity == severity && e.message.contains(needle))
            .map(|e| e.message.clone())
            .collect()
    }
}

impl Logger for CapturingLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}
