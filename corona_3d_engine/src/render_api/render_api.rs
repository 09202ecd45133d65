/// RenderApi - thread-safe facade over the active render backend
///
/// Each call resolves its front-end arguments to core objects on the calling
/// thread, wraps the matching [`RenderApiCore`] method into one command and
/// queues it on the core thread. Nothing executes until the caller submits.

use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::ThreadId;
use glam::Mat4;

use crate::core_thread::{AsyncOp, CoreThread, CoreThreadConfig, CoreThreadQueueFlags};
use crate::error::{Error, Result};
use crate::resources::{
    ComputePipelineState, FrontEndResource, GpuParams, GraphicsPipelineState, IndexBuffer,
    RenderTarget, RenderWindow, RenderWindowDesc, VertexBuffer, VertexDeclaration,
};
use super::capabilities::RenderApiCapabilities;
use super::draw_operation::DrawOperationType;
use super::render_api_core::RenderApiCore;
use super::types::{Color, FrameBufferType, Rect2, RenderApiInfo, RenderSurfaceMask, VideoModeInfo};

/// Context owned by the core thread
pub type CoreContext = Box<dyn RenderApiCore>;

const BLOCKING_INTERNAL: CoreThreadQueueFlags =
    CoreThreadQueueFlags::INTERNAL_QUEUE.union(CoreThreadQueueFlags::BLOCK_UNTIL_COMPLETE);

/// Lifecycle of a render API instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderApiLifecycle {
    Uninitialized,
    Initialized,
    /// Terminal
    Destroyed,
}

/// Front-end of the render system
///
/// Safe to share between producer threads (`Arc<RenderApi>`). The backend
/// itself lives on the core thread; the only data read directly here is the
/// API info and video mode info, copied once when the backend was created.
pub struct RenderApi {
    name: String,
    core_thread: CoreThread<CoreContext>,
    api_info: RenderApiInfo,
    video_mode_info: VideoModeInfo,
    lifecycle: Mutex<RenderApiLifecycle>,
}

impl RenderApi {
    /// Start the core thread around `core`
    ///
    /// # Errors
    ///
    /// `InitializationFailed` if the core thread cannot be spawned.
    pub fn new(core: CoreContext, config: CoreThreadConfig) -> Result<Self> {
        let name = core.name().to_string();
        let api_info = core.api_info();
        let video_mode_info = core.video_mode_info();
        let core_thread = CoreThread::spawn(core, config)?;

        crate::engine_info!("corona3d::RenderApi", "Render system '{}' started", name);

        Ok(Self {
            name,
            core_thread,
            api_info,
            video_mode_info,
            lifecycle: Mutex::new(RenderApiLifecycle::Uninitialized),
        })
    }

    /// Name of the backend
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lifecycle(&self) -> RenderApiLifecycle {
        self.lock_lifecycle()
            .map(|lifecycle| *lifecycle)
            .unwrap_or(RenderApiLifecycle::Destroyed)
    }

    pub fn core_thread_id(&self) -> ThreadId {
        self.core_thread.core_thread_id()
    }

    pub fn is_core_thread(&self) -> bool {
        self.core_thread.is_core_thread()
    }

    // ===== LIFECYCLE =====

    /// Initialize the backend and create the primary window
    ///
    /// Device setup runs first (blocking), then the primary window is
    /// created on this thread, then the backend finishes initialization
    /// with the window (blocking, on the core thread).
    ///
    /// # Errors
    ///
    /// - `InitializationFailed` if already initialized or destroyed
    /// - any error raised by the backend or by window creation
    pub fn initialize(&self, primary_window_desc: &RenderWindowDesc) -> Result<Arc<RenderWindow>> {
        let mut lifecycle = self.lock_lifecycle()?;
        match *lifecycle {
            RenderApiLifecycle::Uninitialized => {}
            RenderApiLifecycle::Initialized => {
                return Err(Error::InitializationFailed(format!(
                    "Render system '{}' is already initialized", self.name
                )));
            }
            RenderApiLifecycle::Destroyed => {
                return Err(Error::InitializationFailed(format!(
                    "Render system '{}' has been destroyed", self.name
                )));
            }
        }

        self.core_thread
            .queue_command(|core: &mut CoreContext| core.initialize(), BLOCKING_INTERNAL)?
            .wait()?;

        let window = RenderWindow::create(primary_window_desc, None)?;
        let window_core = window.core()?;

        self.core_thread
            .queue_command(
                move |core: &mut CoreContext| core.initialize_with_window(window_core),
                BLOCKING_INTERNAL,
            )?
            .wait()?;

        *lifecycle = RenderApiLifecycle::Initialized;
        crate::engine_info!(
            "corona3d::RenderApi",
            "Render system '{}' initialized ({} device(s))",
            self.name,
            self.num_devices()?
        );
        Ok(window)
    }

    /// Release the backend and stop the core thread
    ///
    /// Every command queued before this call, by any producer, executes
    /// first. `destroy_core` is the very last command. Afterwards every
    /// queueing call fails with `QueueClosed`.
    ///
    /// # Errors
    ///
    /// `QueueClosed` if already destroyed, or the error of `destroy_core`
    /// (the render system is destroyed regardless).
    pub fn destroy(&self) -> Result<()> {
        let mut lifecycle = self.lock_lifecycle()?;
        if *lifecycle == RenderApiLifecycle::Destroyed {
            return Err(Error::QueueClosed);
        }

        let result = self
            .core_thread
            .shutdown_with(|core: &mut CoreContext| core.destroy_core())
            .map(drop);

        if !matches!(result, Err(Error::WrongThread(_))) {
            *lifecycle = RenderApiLifecycle::Destroyed;
            crate::engine_info!("corona3d::RenderApi", "Render system '{}' destroyed", self.name);
        }
        result
    }

    /// Release a resource's core object on the core thread
    ///
    /// The front-end handle stops resolving immediately. Commands queued
    /// earlier keep the core object alive until they ran.
    ///
    /// # Errors
    ///
    /// `NullResource` if already destroyed, `QueueClosed` after `destroy`.
    pub fn destroy_resource<R: FrontEndResource>(&self, resource: &R) -> Result<()> {
        let core = resource
            .core_handle()
            .take()
            .ok_or_else(|| Error::NullResource(format!("{} already destroyed", R::KIND)))?;

        self.queue(move |_| {
            drop(core);
            Ok(())
        })
    }

    // ===== STATE COMMANDS =====

    pub fn set_gpu_params(&self, params: &GpuParams) -> Result<()> {
        let params = params.core()?;
        self.queue(move |core| core.set_gpu_params(params))
    }

    pub fn set_graphics_pipeline(&self, pipeline: &GraphicsPipelineState) -> Result<()> {
        let pipeline = pipeline.core()?;
        self.queue(move |core| core.set_graphics_pipeline(pipeline))
    }

    pub fn set_compute_pipeline(&self, pipeline: &ComputePipelineState) -> Result<()> {
        let pipeline = pipeline.core()?;
        self.queue(move |core| core.set_compute_pipeline(pipeline))
    }

    /// Bind vertex buffers to consecutive slots starting at `index`
    ///
    /// `None` entries unbind their slot. The whole list is bound by a single
    /// command, so no partial binding is ever observable.
    ///
    /// # Errors
    ///
    /// `NullResource` if a present buffer has been destroyed.
    pub fn set_vertex_buffers(&self, index: u32, buffers: &[Option<Arc<VertexBuffer>>]) -> Result<()> {
        let buffers = buffers
            .iter()
            .map(|buffer| buffer.as_ref().map(|b| b.core()).transpose())
            .collect::<Result<Vec<_>>>()?;

        self.queue(move |core| core.set_vertex_buffers(index, &buffers))
    }

    pub fn set_index_buffer(&self, buffer: &IndexBuffer) -> Result<()> {
        let buffer = buffer.core()?;
        self.queue(move |core| core.set_index_buffer(buffer))
    }

    pub fn set_vertex_declaration(&self, declaration: &VertexDeclaration) -> Result<()> {
        let declaration = declaration.core()?;
        self.queue(move |core| core.set_vertex_declaration(declaration))
    }

    pub fn set_viewport(&self, area: Rect2) -> Result<()> {
        self.queue(move |core| core.set_viewport(area))
    }

    pub fn set_stencil_ref(&self, value: u32) -> Result<()> {
        self.queue(move |core| core.set_stencil_ref(value))
    }

    pub fn set_draw_operation(&self, op: DrawOperationType) -> Result<()> {
        self.queue(move |core| core.set_draw_operation(op))
    }

    pub fn set_scissor_rect(&self, left: u32, top: u32, right: u32, bottom: u32) -> Result<()> {
        self.queue(move |core| core.set_scissor_rect(left, top, right, bottom))
    }

    /// Bind a render target
    ///
    /// `load_mask` selects the surfaces whose contents are preserved.
    pub fn set_render_target(
        &self,
        target: &RenderTarget,
        read_only_depth_stencil: bool,
        load_mask: RenderSurfaceMask,
    ) -> Result<()> {
        let target = target.core()?;
        self.queue(move |core| core.set_render_target(target, read_only_depth_stencil, load_mask))
    }

    // ===== CLEAR, DRAW, PRESENT =====

    /// Clear the active render target
    ///
    /// `target_mask` selects color surfaces (bit n = surface n).
    pub fn clear_render_target(
        &self,
        buffers: FrameBufferType,
        color: Color,
        depth: f32,
        stencil: u16,
        target_mask: u8,
    ) -> Result<()> {
        self.queue(move |core| core.clear_render_target(buffers, color, depth, stencil, target_mask))
    }

    /// Clear the current viewport area of the active render target
    pub fn clear_viewport(
        &self,
        buffers: FrameBufferType,
        color: Color,
        depth: f32,
        stencil: u16,
        target_mask: u8,
    ) -> Result<()> {
        self.queue(move |core| core.clear_viewport(buffers, color, depth, stencil, target_mask))
    }

    /// Present a window's back buffer
    pub fn swap_buffers(&self, target: &RenderTarget) -> Result<()> {
        let target = target.core()?;
        self.queue(move |core| core.swap_buffers(target, 1))
    }

    pub fn draw(&self, vertex_offset: u32, vertex_count: u32, instance_count: u32) -> Result<()> {
        self.queue(move |core| core.draw(vertex_offset, vertex_count, instance_count))
    }

    pub fn draw_indexed(
        &self,
        start_index: u32,
        index_count: u32,
        vertex_offset: u32,
        vertex_count: u32,
        instance_count: u32,
    ) -> Result<()> {
        self.queue(move |core| {
            core.draw_indexed(start_index, index_count, vertex_offset, vertex_count, instance_count)
        })
    }

    pub fn dispatch_compute(&self, num_groups_x: u32, num_groups_y: u32, num_groups_z: u32) -> Result<()> {
        self.queue(move |core| core.dispatch_compute(num_groups_x, num_groups_y, num_groups_z))
    }

    // ===== SYNCHRONOUS READS =====

    pub fn video_mode_info(&self) -> &VideoModeInfo {
        &self.video_mode_info
    }

    pub fn api_info(&self) -> &RenderApiInfo {
        &self.api_info
    }

    /// Adapt a projection matrix to the backend's depth range
    pub fn convert_projection_matrix(&self, matrix: &Mat4) -> Mat4 {
        self.api_info.convert_projection_matrix(matrix)
    }

    /// Capability record of a device, queried on the core thread
    ///
    /// Blocks. An out-of-range index falls back to device 0 (with a warning).
    pub fn capabilities(&self, device_idx: u32) -> Result<RenderApiCapabilities> {
        self.queue_return_command(
            move |core| Ok(core.capabilities(device_idx)),
            CoreThreadQueueFlags::BLOCK_UNTIL_COMPLETE,
        )?
        .wait()
    }

    /// Number of devices known to the backend (blocks)
    pub fn num_devices(&self) -> Result<u32> {
        self.queue_return_command(|core| Ok(core.num_devices()), CoreThreadQueueFlags::BLOCK_UNTIL_COMPLETE)?
            .wait()
    }

    // ===== QUEUE ACCESS =====

    /// Queue custom work against the backend
    pub fn queue_command<F>(&self, command: F, flags: CoreThreadQueueFlags) -> Result<AsyncOp<()>>
    where
        F: FnOnce(&mut dyn RenderApiCore) -> Result<()> + Send + 'static,
    {
        self.queue_return_command(command, flags)
    }

    /// Queue custom work returning a value
    pub fn queue_return_command<T, F>(&self, command: F, flags: CoreThreadQueueFlags) -> Result<AsyncOp<T>>
    where
        T: Send + 'static,
        F: FnOnce(&mut dyn RenderApiCore) -> Result<T> + Send + 'static,
    {
        self.core_thread
            .queue_return_command(move |core: &mut CoreContext| command(core.as_mut()), flags)
    }

    /// Submit this thread's queued commands
    pub fn submit(&self, blocking: bool) -> Result<()> {
        self.core_thread.submit(blocking)
    }

    /// Submit every thread's queued commands; blocking waits for a full drain
    pub fn submit_all(&self, blocking: bool) -> Result<()> {
        self.core_thread.submit_all(blocking)
    }

    /// Commands this thread queued but has not submitted yet
    pub fn pending_count(&self) -> usize {
        self.core_thread.pending_count()
    }

    fn queue<F>(&self, command: F) -> Result<()>
    where
        F: FnOnce(&mut dyn RenderApiCore) -> Result<()> + Send + 'static,
    {
        self.queue_command(command, CoreThreadQueueFlags::empty()).map(drop)
    }

    fn lock_lifecycle(&self) -> Result<MutexGuard<'_, RenderApiLifecycle>> {
        self.lifecycle.lock()
            .map_err(|_| Error::BackendError("Render API lifecycle lock poisoned".to_string()))
    }
}

impl Drop for RenderApi {
    fn drop(&mut self) {
        if self.lifecycle() == RenderApiLifecycle::Destroyed || self.core_thread.is_core_thread() {
            return;
        }
        if let Err(error) = self.destroy() {
            crate::engine_error!("corona3d::RenderApi", "Render system '{}' destroy failed: {}", self.name, error);
        }
    }
}

#[cfg(test)]
#[path = "render_api_tests.rs"]
mod tests;
