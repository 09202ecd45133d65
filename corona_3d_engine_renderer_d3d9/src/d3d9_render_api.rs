/// D3D9RenderApi - Direct3D 9 implementation of RenderApiCore
///
/// Translates core commands into device calls. Bindings are kept here so
/// draws can be validated (index buffer bound, stream count) before they
/// reach the device.

use std::sync::{Arc, Mutex};

use corona_3d_engine::corona3d::{Error, Result};
use corona_3d_engine::corona3d::render_api::{
    Color, DrawOperationType, FrameBufferType, Rect2, RenderApiCore, RenderApiCoreState,
    RenderApiInfo, RenderSurfaceMask, VideoModeInfo,
};
use corona_3d_engine::corona3d::resources::{
    ComputePipelineStateCore, GpuParamsCore, GraphicsPipelineStateCore, IndexBufferCore,
    RenderTargetCore, RenderWindowCore, VertexBufferCore, VertexDeclarationCore,
};
use corona_3d_engine::{engine_bail, engine_debug, engine_info, engine_trace, engine_warn};

use crate::d3d9_device::{D3D9CallLog, D3D9Device};
use crate::d3d9_driver_list::{D3D9Config, D3D9DriverList};
use crate::d3d9_mappings::{
    self, D3DRS_SCISSORTESTENABLE, D3DRS_STENCILENABLE, D3DRS_STENCILREF, D3DRS_ZENABLE,
    D3DRS_ZWRITEENABLE,
};

pub struct D3D9RenderApi {
    state: RenderApiCoreState,
    config: D3D9Config,
    driver_list: D3D9DriverList,
    device: Option<D3D9Device>,
    calls: D3D9CallLog,

    draw_operation: DrawOperationType,
    vertex_buffers: Vec<Option<Arc<VertexBufferCore>>>,
    index_buffer: Option<Arc<IndexBufferCore>>,
    vertex_declaration: Option<Arc<VertexDeclarationCore>>,
    graphics_pipeline: Option<Arc<GraphicsPipelineStateCore>>,
    gpu_params: Option<Arc<GpuParamsCore>>,
    /// Normalized viewport of the active render target
    viewport: Rect2,
}

impl D3D9RenderApi {
    /// Enumerate adapters and prepare the backend
    ///
    /// The device itself is created by `initialize_with_window`.
    ///
    /// # Errors
    ///
    /// `InitializationFailed` when no adapter is configured or the active
    /// adapter ordinal is out of range.
    pub fn new(config: D3D9Config) -> Result<Self> {
        let driver_list = D3D9DriverList::new(&config.adapters)?;
        if config.active_adapter >= driver_list.count() {
            return Err(Error::InitializationFailed(format!(
                "Active adapter {} does not exist ({} adapter(s) available)",
                config.active_adapter,
                driver_list.count()
            )));
        }

        Ok(Self {
            state: RenderApiCoreState::new(),
            config,
            driver_list,
            device: None,
            calls: Arc::new(Mutex::new(Vec::new())),
            draw_operation: DrawOperationType::default(),
            vertex_buffers: Vec::new(),
            index_buffer: None,
            vertex_declaration: None,
            graphics_pipeline: None,
            gpu_params: None,
            viewport: Rect2::FULL,
        })
    }

    /// Shared handle on the device call stream
    pub fn calls(&self) -> D3D9CallLog {
        self.calls.clone()
    }

    pub fn config(&self) -> &D3D9Config {
        &self.config
    }

    fn device_mut(&mut self) -> Result<&mut D3D9Device> {
        self.device.as_mut().ok_or_else(|| {
            Error::BackendError("Direct3D 9 device not created. Call initialize_with_window() first.".to_string())
        })
    }

    /// Vertex streams of the active adapter
    fn max_streams(&self) -> u32 {
        self.driver_list
            .driver(self.config.active_adapter)
            .map_or(0, |driver| driver.desc().max_streams)
    }

    fn release_bindings(&mut self) {
        self.vertex_buffers.clear();
        self.index_buffer = None;
        self.vertex_declaration = None;
        self.graphics_pipeline = None;
        self.gpu_params = None;
        self.viewport = Rect2::FULL;
    }
}

impl RenderApiCore for D3D9RenderApi {
    fn name(&self) -> &str {
        crate::SYSTEM_NAME
    }

    fn api_info(&self) -> RenderApiInfo {
        RenderApiInfo {
            horizontal_texel_offset: -0.5,
            vertical_texel_offset: -0.5,
            min_depth: 0.0,
            max_depth: 1.0,
            vertex_color_flip_required: true,
            ndc_y_axis_up: true,
        }
    }

    fn video_mode_info(&self) -> VideoModeInfo {
        self.driver_list.video_mode_info()
    }

    fn initialize(&mut self) -> Result<()> {
        self.state.record_core_thread();
        self.state.set_capabilities(self.driver_list.capabilities());

        for driver in self.driver_list.iter() {
            engine_debug!(
                "corona3d::d3d9",
                "Adapter {}: {} (driver {})",
                driver.adapter_number(),
                driver.desc().description,
                driver.driver_version_string()
            );
        }
        engine_info!("corona3d::d3d9", "Direct3D 9 render system initialized ({} adapter(s))", self.driver_list.count());
        Ok(())
    }

    fn initialize_with_window(&mut self, primary_window: Arc<RenderWindowCore>) -> Result<()> {
        if !self.state.is_core_thread() {
            return Err(Error::WrongThread("D3D9 device must be created on the core thread".to_string()));
        }
        if self.device.is_some() {
            return Err(Error::InitializationFailed("Direct3D 9 device already created".to_string()));
        }

        let mut device = D3D9Device::create(self.config.active_adapter, primary_window.desc(), self.calls.clone());
        let target = primary_window.render_target().clone();
        device.set_render_target(target.clone())?;

        self.device = Some(device);
        self.state.set_active_render_target(Some(target));

        engine_info!(
            "corona3d::d3d9",
            "Direct3D 9 device created on adapter {} for window '{}'",
            self.config.active_adapter,
            primary_window.desc().title
        );
        Ok(())
    }

    fn destroy_core(&mut self) -> Result<()> {
        if let Some(mut device) = self.device.take() {
            device.release();
        }
        self.release_bindings();
        self.state.clear();

        engine_info!("corona3d::d3d9", "Direct3D 9 render system destroyed");
        Ok(())
    }

    fn set_gpu_params(&mut self, params: Arc<GpuParamsCore>) -> Result<()> {
        self.device_mut()?;
        engine_trace!("corona3d::d3d9", "Bound GPU params '{}'", params.desc().name);
        self.gpu_params = Some(params);
        Ok(())
    }

    fn set_graphics_pipeline(&mut self, pipeline: Arc<GraphicsPipelineStateCore>) -> Result<()> {
        let desc = pipeline.desc().clone();
        if desc.geometry_program.is_some() {
            engine_warn!("corona3d::d3d9", "Pipeline '{}': geometry programs are not supported by Direct3D 9, ignoring", desc.name);
        }

        let device = self.device_mut()?;
        device.set_render_state(D3DRS_ZENABLE, desc.depth_test as u32)?;
        device.set_render_state(D3DRS_ZWRITEENABLE, desc.depth_write as u32)?;
        device.set_render_state(D3DRS_STENCILENABLE, desc.stencil_enable as u32)?;

        self.graphics_pipeline = Some(pipeline);
        Ok(())
    }

    fn set_compute_pipeline(&mut self, pipeline: Arc<ComputePipelineStateCore>) -> Result<()> {
        engine_warn!(
            "corona3d::d3d9",
            "Compute pipeline '{}' ignored: Direct3D 9 has no compute support",
            pipeline.desc().name
        );
        Ok(())
    }

    fn set_vertex_buffers(&mut self, index: u32, buffers: &[Option<Arc<VertexBufferCore>>]) -> Result<()> {
        let max_streams = self.max_streams();
        let end = index as usize + buffers.len();
        if end > max_streams as usize {
            return Err(Error::InvalidResource(format!(
                "Vertex buffer slots [{}, {}) exceed the {} stream(s) of the adapter",
                index, end, max_streams
            )));
        }

        let device = self.device_mut()?;
        for (slot, buffer) in buffers.iter().enumerate() {
            let stride = buffer.as_ref().map_or(0, |buffer| buffer.desc().vertex_size);
            device.set_stream_source(index + slot as u32, buffer.as_ref(), stride)?;
        }

        if self.vertex_buffers.len() < end {
            self.vertex_buffers.resize(end, None);
        }
        self.vertex_buffers[index as usize..end].clone_from_slice(buffers);
        Ok(())
    }

    fn set_index_buffer(&mut self, buffer: Arc<IndexBufferCore>) -> Result<()> {
        self.device_mut()?.set_indices(Some(&buffer))?;
        self.index_buffer = Some(buffer);
        Ok(())
    }

    fn set_vertex_declaration(&mut self, declaration: Arc<VertexDeclarationCore>) -> Result<()> {
        self.device_mut()?.set_vertex_declaration(declaration.id())?;
        self.vertex_declaration = Some(declaration);
        Ok(())
    }

    fn set_viewport(&mut self, area: Rect2) -> Result<()> {
        self.device_mut()?.set_viewport(area)?;
        self.viewport = area;
        Ok(())
    }

    fn set_scissor_rect(&mut self, left: u32, top: u32, right: u32, bottom: u32) -> Result<()> {
        let device = self.device_mut()?;
        device.set_render_state(D3DRS_SCISSORTESTENABLE, 1)?;
        device.set_scissor_rect(left, top, right, bottom)
    }

    fn set_stencil_ref(&mut self, value: u32) -> Result<()> {
        self.device_mut()?.set_render_state(D3DRS_STENCILREF, value)?;
        Ok(())
    }

    fn set_draw_operation(&mut self, op: DrawOperationType) -> Result<()> {
        self.draw_operation = op;
        Ok(())
    }

    fn set_render_target(
        &mut self,
        target: Arc<RenderTargetCore>,
        read_only_depth_stencil: bool,
        load_mask: RenderSurfaceMask,
    ) -> Result<()> {
        // D3D9 has no load/store actions: surfaces always keep their contents
        engine_trace!("corona3d::d3d9", "Binding render target '{}' (load mask {:?})", target.properties().name, load_mask);

        // Writable binds fall back to the pipeline's depth write (device default TRUE)
        let depth_write = !read_only_depth_stencil
            && self.graphics_pipeline.as_ref().map_or(true, |pipeline| pipeline.desc().depth_write);

        let device = self.device_mut()?;
        device.set_render_target(target.clone())?;
        if device.render_state(D3DRS_ZWRITEENABLE).unwrap_or(1) != depth_write as u32 {
            device.set_render_state(D3DRS_ZWRITEENABLE, depth_write as u32)?;
        }

        self.state.set_active_render_target(Some(target));
        Ok(())
    }

    fn clear_render_target(
        &mut self,
        buffers: FrameBufferType,
        color: Color,
        depth: f32,
        stencil: u16,
        _target_mask: u8,
    ) -> Result<()> {
        self.device_mut()?.clear(
            None,
            d3d9_mappings::clear_flags(buffers),
            d3d9_mappings::d3d_color(color),
            depth,
            stencil as u32,
        )
    }

    fn clear_viewport(
        &mut self,
        buffers: FrameBufferType,
        color: Color,
        depth: f32,
        stencil: u16,
        _target_mask: u8,
    ) -> Result<()> {
        let viewport = self.viewport;
        self.device_mut()?.clear(
            Some(viewport),
            d3d9_mappings::clear_flags(buffers),
            d3d9_mappings::d3d_color(color),
            depth,
            stencil as u32,
        )
    }

    fn swap_buffers(&mut self, target: Arc<RenderTargetCore>, _sync_mask: u32) -> Result<()> {
        self.device_mut()?.present(&target)
    }

    fn draw(&mut self, vertex_offset: u32, vertex_count: u32, instance_count: u32) -> Result<()> {
        let op = self.draw_operation;
        self.device_mut()?.draw_primitive(op, vertex_offset, vertex_count, instance_count)
    }

    fn draw_indexed(
        &mut self,
        start_index: u32,
        index_count: u32,
        vertex_offset: u32,
        vertex_count: u32,
        instance_count: u32,
    ) -> Result<()> {
        if self.index_buffer.is_none() {
            engine_bail!("corona3d::d3d9", "Indexed draw issued without a bound index buffer");
        }

        let op = self.draw_operation;
        self.device_mut()?
            .draw_indexed_primitive(op, start_index, index_count, vertex_offset, vertex_count, instance_count)
    }

    fn dispatch_compute(&mut self, num_groups_x: u32, num_groups_y: u32, num_groups_z: u32) -> Result<()> {
        engine_warn!(
            "corona3d::d3d9",
            "Compute dispatch ({}, {}, {}) ignored: Direct3D 9 has no compute support",
            num_groups_x, num_groups_y, num_groups_z
        );
        Ok(())
    }

    fn state(&self) -> &RenderApiCoreState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut RenderApiCoreState {
        &mut self.state
    }
}
