/// D3D9Device - state-tracking Direct3D 9 device
///
/// Mirrors an IDirect3DDevice9 without touching the hardware: every call is
/// validated against the tracked device state and appended to a shared call
/// log, in the order the driver would receive it. Redundant render states
/// are filtered out like a real state cache would.

use std::sync::{Arc, Mutex};

use corona_3d_engine::corona3d::{Error, Result};
use corona_3d_engine::corona3d::render_api::{vertex_count_to_prim_count, DrawOperationType, Rect2};
use corona_3d_engine::corona3d::resources::{
    CoreObjectId, IndexBufferCore, RenderTargetCore, RenderWindowDesc, VertexBufferCore,
};
use corona_3d_engine::engine_err;
use rustc_hash::FxHashMap;

use crate::d3d9_mappings::{
    self, D3DPrimitiveType, D3DSTREAMSOURCE_INDEXEDDATA, D3DSTREAMSOURCE_INSTANCEDATA,
    D3DSTREAMSOURCE_MAX_DIVIDER,
};
use crate::debug;

/// One recorded device call
#[derive(Debug, Clone, PartialEq)]
pub enum D3D9Call {
    CreateDevice {
        adapter: u32,
        back_buffer_width: u32,
        back_buffer_height: u32,
        windowed: bool,
        presentation_interval: u32,
    },
    SetStreamSource { stream: u32, buffer: Option<CoreObjectId>, stride: u32 },
    SetStreamSourceFreq { stream: u32, setting: u32 },
    SetIndices { buffer: Option<CoreObjectId>, format: u32 },
    SetVertexDeclaration(CoreObjectId),
    SetRenderState { state: u32, value: u32 },
    SetViewport { x: u32, y: u32, width: u32, height: u32, min_z: f32, max_z: f32 },
    SetScissorRect { left: u32, top: u32, right: u32, bottom: u32 },
    SetRenderTarget { index: u32, target: CoreObjectId },
    /// `rect` is `None` when the whole target is cleared
    Clear { rect: Option<[u32; 4]>, flags: u32, color: u32, z: f32, stencil: u32 },
    BeginScene,
    EndScene,
    DrawPrimitive { primitive_type: D3DPrimitiveType, start_vertex: u32, primitive_count: u32 },
    DrawIndexedPrimitive {
        primitive_type: D3DPrimitiveType,
        base_vertex_index: i32,
        min_vertex_index: u32,
        num_vertices: u32,
        start_index: u32,
        primitive_count: u32,
    },
    Present(CoreObjectId),
    Release,
}

/// Shared handle on the recorded calls
pub type D3D9CallLog = Arc<Mutex<Vec<D3D9Call>>>;

/// Draw statistics of one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct D3D9FrameStats {
    pub draw_calls: u64,
    pub primitives: u64,
}

pub struct D3D9Device {
    adapter_number: u32,
    calls: D3D9CallLog,
    render_states: FxHashMap<u32, u32>,
    render_target: Option<Arc<RenderTargetCore>>,
    in_scene: bool,
    frame_stats: D3D9FrameStats,
    last_frame_stats: D3D9FrameStats,
    released: bool,
}

impl D3D9Device {
    /// Create the device for the primary window
    pub fn create(adapter_number: u32, window: &RenderWindowDesc, calls: D3D9CallLog) -> Self {
        let device = Self {
            adapter_number,
            calls,
            render_states: FxHashMap::default(),
            render_target: None,
            in_scene: false,
            frame_stats: D3D9FrameStats::default(),
            last_frame_stats: D3D9FrameStats::default(),
            released: false,
        };

        device.record(D3D9Call::CreateDevice {
            adapter: adapter_number,
            back_buffer_width: window.size.width,
            back_buffer_height: window.size.height,
            windowed: !window.fullscreen,
            presentation_interval: d3d9_mappings::presentation_interval(window.vsync, window.vsync_interval),
        });

        device
    }

    pub fn adapter_number(&self) -> u32 {
        self.adapter_number
    }

    pub fn calls(&self) -> D3D9CallLog {
        self.calls.clone()
    }

    pub fn render_target(&self) -> Option<&Arc<RenderTargetCore>> {
        self.render_target.as_ref()
    }

    /// Statistics of the frame being recorded
    pub fn frame_stats(&self) -> D3D9FrameStats {
        self.frame_stats
    }

    /// Statistics of the last presented frame
    pub fn last_frame_stats(&self) -> D3D9FrameStats {
        self.last_frame_stats
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    fn record(&self, call: D3D9Call) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn check_alive(&self) -> Result<()> {
        if self.released {
            debug::record_failure();
            return Err(Error::BackendError("Direct3D 9 device already released".to_string()));
        }
        Ok(())
    }

    /// Fail unless a render target is bound, returning its pixel size
    fn require_render_target(&self, operation: &str) -> Result<(u32, u32)> {
        match &self.render_target {
            Some(target) => Ok((target.properties().width, target.properties().height)),
            None => {
                debug::record_failure();
                Err(engine_err!("corona3d::d3d9", "Cannot {} without a bound render target", operation))
            }
        }
    }

    fn begin_scene(&mut self) {
        if !self.in_scene {
            self.in_scene = true;
            self.record(D3D9Call::BeginScene);
        }
    }

    // ===== STATE =====

    /// Bind `buffer` to a vertex stream (`None` unbinds it)
    pub fn set_stream_source(&mut self, stream: u32, buffer: Option<&Arc<VertexBufferCore>>, stride: u32) -> Result<()> {
        self.check_alive()?;
        self.record(D3D9Call::SetStreamSource { stream, buffer: buffer.map(|b| b.id()), stride });
        debug::record_state_change();
        Ok(())
    }

    pub fn set_indices(&mut self, buffer: Option<&Arc<IndexBufferCore>>) -> Result<()> {
        self.check_alive()?;
        let format = buffer.map_or(0, |b| d3d9_mappings::index_format(b.desc().index_type));
        self.record(D3D9Call::SetIndices { buffer: buffer.map(|b| b.id()), format });
        debug::record_state_change();
        Ok(())
    }

    pub fn set_vertex_declaration(&mut self, declaration: CoreObjectId) -> Result<()> {
        self.check_alive()?;
        self.record(D3D9Call::SetVertexDeclaration(declaration));
        debug::record_state_change();
        Ok(())
    }

    /// Set a render state, skipping the call when the value is unchanged
    ///
    /// Returns whether a call was issued.
    pub fn set_render_state(&mut self, state: u32, value: u32) -> Result<bool> {
        self.check_alive()?;
        if self.render_states.get(&state) == Some(&value) {
            return Ok(false);
        }
        self.render_states.insert(state, value);
        self.record(D3D9Call::SetRenderState { state, value });
        debug::record_state_change();
        Ok(true)
    }

    pub fn render_state(&self, state: u32) -> Option<u32> {
        self.render_states.get(&state).copied()
    }

    /// Apply a normalized viewport to the bound render target
    pub fn set_viewport(&mut self, area: Rect2) -> Result<()> {
        self.check_alive()?;
        let (width, height) = self.require_render_target("set a viewport")?;
        let [x, y, w, h] = viewport_pixels(area, width, height);
        self.record(D3D9Call::SetViewport { x, y, width: w, height: h, min_z: 0.0, max_z: 1.0 });
        debug::record_state_change();
        Ok(())
    }

    pub fn set_scissor_rect(&mut self, left: u32, top: u32, right: u32, bottom: u32) -> Result<()> {
        self.check_alive()?;
        self.record(D3D9Call::SetScissorRect { left, top, right, bottom });
        debug::record_state_change();
        Ok(())
    }

    /// Bind `target` as render target 0
    ///
    /// Switching targets ends the current scene.
    pub fn set_render_target(&mut self, target: Arc<RenderTargetCore>) -> Result<()> {
        self.check_alive()?;
        if self.in_scene {
            self.in_scene = false;
            self.record(D3D9Call::EndScene);
        }
        self.record(D3D9Call::SetRenderTarget { index: 0, target: target.id() });
        self.render_target = Some(target);
        debug::record_state_change();
        Ok(())
    }

    // ===== CLEAR / DRAW =====

    /// Clear the bound render target, or only `area` of it (normalized)
    pub fn clear(&mut self, area: Option<Rect2>, flags: u32, color: u32, z: f32, stencil: u32) -> Result<()> {
        self.check_alive()?;
        let (width, height) = self.require_render_target("clear")?;
        if flags == 0 {
            return Ok(());
        }

        let rect = area.map(|area| {
            let [x, y, w, h] = viewport_pixels(area, width, height);
            [x, y, x + w, y + h]
        });
        self.record(D3D9Call::Clear { rect, flags, color, z, stencil });
        debug::record_clear();
        Ok(())
    }

    /// Non-indexed draw
    ///
    /// D3D9 only instances indexed geometry, so `instance_count > 1` issues
    /// one call per instance.
    pub fn draw_primitive(
        &mut self,
        op: DrawOperationType,
        start_vertex: u32,
        vertex_count: u32,
        instance_count: u32,
    ) -> Result<()> {
        self.check_alive()?;
        self.require_render_target("draw")?;

        let primitive_count = vertex_count_to_prim_count(op, vertex_count);
        if primitive_count == 0 {
            return Ok(());
        }

        self.begin_scene();
        for _ in 0..instance_count.max(1) {
            self.record(D3D9Call::DrawPrimitive {
                primitive_type: d3d9_mappings::primitive_type(op),
                start_vertex,
                primitive_count,
            });
            self.count_draw(u64::from(primitive_count));
        }
        Ok(())
    }

    /// Indexed draw, hardware instanced when `instance_count > 1`
    pub fn draw_indexed_primitive(
        &mut self,
        op: DrawOperationType,
        start_index: u32,
        index_count: u32,
        base_vertex: u32,
        vertex_count: u32,
        instance_count: u32,
    ) -> Result<()> {
        self.check_alive()?;
        self.require_render_target("draw")?;

        let primitive_count = vertex_count_to_prim_count(op, index_count);
        if primitive_count == 0 {
            return Ok(());
        }

        let base_vertex_index = i32::try_from(base_vertex).map_err(|_| {
            debug::record_failure();
            Error::InvalidResource(format!("Base vertex {} does not fit a Direct3D 9 base vertex index", base_vertex))
        })?;
        if instance_count > D3DSTREAMSOURCE_MAX_DIVIDER {
            debug::record_failure();
            return Err(Error::InvalidResource(format!(
                "Instance count {} exceeds the Direct3D 9 stream frequency limit {}",
                instance_count, D3DSTREAMSOURCE_MAX_DIVIDER
            )));
        }

        self.begin_scene();

        let instanced = instance_count > 1;
        if instanced {
            self.record(D3D9Call::SetStreamSourceFreq { stream: 0, setting: D3DSTREAMSOURCE_INDEXEDDATA | instance_count });
            self.record(D3D9Call::SetStreamSourceFreq { stream: 1, setting: D3DSTREAMSOURCE_INSTANCEDATA | 1 });
        }

        self.record(D3D9Call::DrawIndexedPrimitive {
            primitive_type: d3d9_mappings::primitive_type(op),
            base_vertex_index,
            min_vertex_index: 0,
            num_vertices: vertex_count,
            start_index,
            primitive_count,
        });
        self.count_draw(u64::from(primitive_count) * u64::from(instance_count.max(1)));

        if instanced {
            self.record(D3D9Call::SetStreamSourceFreq { stream: 0, setting: 1 });
            self.record(D3D9Call::SetStreamSourceFreq { stream: 1, setting: 1 });
        }
        Ok(())
    }

    fn count_draw(&mut self, primitives: u64) {
        self.frame_stats.draw_calls = self.frame_stats.draw_calls.saturating_add(1);
        self.frame_stats.primitives = self.frame_stats.primitives.saturating_add(primitives);
        debug::record_draw(primitives);
    }

    /// End the scene and present `target`, starting a new frame
    pub fn present(&mut self, target: &RenderTargetCore) -> Result<()> {
        self.check_alive()?;
        if !target.properties().is_window {
            debug::record_failure();
            return Err(Error::InvalidResource(format!(
                "Render target '{}' is not a window and cannot be presented",
                target.properties().name
            )));
        }

        if self.in_scene {
            self.in_scene = false;
            self.record(D3D9Call::EndScene);
        }
        self.record(D3D9Call::Present(target.id()));
        debug::record_present();

        self.last_frame_stats = std::mem::take(&mut self.frame_stats);
        Ok(())
    }

    /// Release the device and drop every bound object
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        if self.in_scene {
            self.in_scene = false;
            self.record(D3D9Call::EndScene);
        }
        self.render_target = None;
        self.render_states.clear();
        self.released = true;
        self.record(D3D9Call::Release);
    }
}

/// Normalized rectangle to [x, y, width, height] in pixels of a `width`x`height` target
pub fn viewport_pixels(area: Rect2, width: u32, height: u32) -> [u32; 4] {
    let to_pixels = |value: f32, size: u32| (value.clamp(0.0, 1.0) * size as f32).round() as u32;

    let x = to_pixels(area.x, width);
    let y = to_pixels(area.y, height);
    let w = to_pixels(area.x + area.width, width).saturating_sub(x);
    let h = to_pixels(area.y + area.height, height).saturating_sub(y);
    [x, y, w, h]
}

#[cfg(test)]
#[path = "d3d9_device_tests.rs"]
mod tests;
