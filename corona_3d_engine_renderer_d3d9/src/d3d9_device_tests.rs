//! Unit tests for the state-tracking D3D9 device

use std::sync::{Arc, Mutex};

use corona_3d_engine::corona3d::Error;
use corona_3d_engine::corona3d::render_api::{DrawOperationType, Rect2};
use corona_3d_engine::corona3d::resources::{
    BufferUsage, FrontEndResource, IndexBuffer, IndexBufferDesc, IndexType, RenderTarget,
    RenderTargetCore, RenderTargetProperties, RenderWindow, RenderWindowDesc, VertexBuffer,
    VertexBufferDesc,
};
use serial_test::serial;

use crate::d3d9_device::{viewport_pixels, D3D9Call, D3D9Device, D3D9FrameStats};
use crate::d3d9_mappings::{D3DPrimitiveType, D3DCLEAR_TARGET, D3DCLEAR_ZBUFFER, D3DRS_STENCILREF};
use crate::debug;

// ============================================================================
// HELPERS
// ============================================================================

fn create_device() -> D3D9Device {
    D3D9Device::create(0, &RenderWindowDesc::default(), Arc::new(Mutex::new(Vec::new())))
}

fn window_target() -> Arc<RenderTargetCore> {
    let window = RenderWindow::create(&RenderWindowDesc::default(), None).unwrap();
    window.render_target().core().unwrap()
}

fn calls(device: &D3D9Device) -> Vec<D3D9Call> {
    device.calls().lock().unwrap().clone()
}

// ============================================================================
// CREATION
// ============================================================================

#[test]
fn test_create_records_create_device() {
    let device = create_device();

    assert_eq!(
        calls(&device),
        vec![D3D9Call::CreateDevice {
            adapter: 0,
            back_buffer_width: 1280,
            back_buffer_height: 720,
            windowed: true,
            presentation_interval: 0,
        }]
    );
    assert!(device.render_target().is_none());
}

// ============================================================================
// STATE
// ============================================================================

#[test]
fn test_stream_sources_record_null_slots() {
    let mut device = create_device();
    let buffer = VertexBuffer::create(VertexBufferDesc {
        vertex_size: 32,
        num_vertices: 3,
        usage: BufferUsage::Static,
    })
    .unwrap()
    .core()
    .unwrap();

    device.set_stream_source(0, Some(&buffer), 32).unwrap();
    device.set_stream_source(1, None, 0).unwrap();

    let calls = calls(&device);
    assert_eq!(calls[1], D3D9Call::SetStreamSource { stream: 0, buffer: Some(buffer.id()), stride: 32 });
    assert_eq!(calls[2], D3D9Call::SetStreamSource { stream: 1, buffer: None, stride: 0 });
}

#[test]
fn test_set_indices_uses_index_format() {
    let mut device = create_device();
    let buffer = IndexBuffer::create(IndexBufferDesc {
        index_type: IndexType::Bit32,
        num_indices: 6,
        usage: BufferUsage::Dynamic,
    })
    .unwrap()
    .core()
    .unwrap();

    device.set_indices(Some(&buffer)).unwrap();

    assert_eq!(calls(&device)[1], D3D9Call::SetIndices { buffer: Some(buffer.id()), format: 102 });
}

#[test]
fn test_redundant_render_states_are_filtered() {
    let mut device = create_device();

    assert!(device.set_render_state(D3DRS_STENCILREF, 3).unwrap());
    assert!(!device.set_render_state(D3DRS_STENCILREF, 3).unwrap());
    assert!(device.set_render_state(D3DRS_STENCILREF, 4).unwrap());

    let set_states = calls(&device)
        .into_iter()
        .filter(|call| matches!(call, D3D9Call::SetRenderState { .. }))
        .count();
    assert_eq!(set_states, 2);
    assert_eq!(device.render_state(D3DRS_STENCILREF), Some(4));
}

#[test]
fn test_viewport_is_converted_to_pixels() {
    let mut device = create_device();
    device.set_render_target(window_target()).unwrap();

    device.set_viewport(Rect2::new(0.5, 0.0, 0.5, 0.5)).unwrap();

    assert_eq!(
        calls(&device).last(),
        Some(&D3D9Call::SetViewport { x: 640, y: 0, width: 640, height: 360, min_z: 0.0, max_z: 1.0 })
    );
}

#[test]
fn test_viewport_pixels_clamps_to_target() {
    assert_eq!(viewport_pixels(Rect2::FULL, 800, 600), [0, 0, 800, 600]);
    assert_eq!(viewport_pixels(Rect2::new(0.5, 0.5, 1.0, 1.0), 800, 600), [400, 300, 400, 300]);
    assert_eq!(viewport_pixels(Rect2::new(-1.0, 0.0, 0.5, 0.25), 800, 600), [0, 0, 0, 150]);
}

#[test]
fn test_viewport_without_render_target_fails() {
    let mut device = create_device();
    assert!(matches!(device.set_viewport(Rect2::FULL), Err(Error::BackendError(_))));
}

// ============================================================================
// CLEAR / DRAW
// ============================================================================

#[test]
fn test_clear_whole_target_and_area() {
    let mut device = create_device();
    device.set_render_target(window_target()).unwrap();

    device.clear(None, D3DCLEAR_TARGET, 0xFF00_0000, 1.0, 0).unwrap();
    device.clear(Some(Rect2::new(0.0, 0.0, 0.5, 0.5)), D3DCLEAR_ZBUFFER, 0, 0.5, 0).unwrap();

    let calls = calls(&device);
    assert_eq!(calls[calls.len() - 2], D3D9Call::Clear { rect: None, flags: 1, color: 0xFF00_0000, z: 1.0, stencil: 0 });
    assert_eq!(calls[calls.len() - 1], D3D9Call::Clear { rect: Some([0, 0, 640, 360]), flags: 2, color: 0, z: 0.5, stencil: 0 });
}

#[test]
fn test_clear_with_no_buffers_is_skipped() {
    let mut device = create_device();
    device.set_render_target(window_target()).unwrap();
    let before = calls(&device).len();

    device.clear(None, 0, 0, 1.0, 0).unwrap();

    assert_eq!(calls(&device).len(), before);
}

#[test]
fn test_draw_without_render_target_fails() {
    let mut device = create_device();

    let result = device.draw_primitive(DrawOperationType::TriangleList, 0, 3, 1);

    assert!(matches!(result, Err(Error::BackendError(msg)) if msg.contains("render target")));
    assert_eq!(device.frame_stats(), D3D9FrameStats::default());
}

#[test]
fn test_draw_primitive_converts_vertex_count() {
    let mut device = create_device();
    device.set_render_target(window_target()).unwrap();

    device.draw_primitive(DrawOperationType::TriangleStrip, 4, 6, 1).unwrap();

    let calls = calls(&device);
    assert_eq!(calls[calls.len() - 2], D3D9Call::BeginScene);
    assert_eq!(
        calls[calls.len() - 1],
        D3D9Call::DrawPrimitive { primitive_type: D3DPrimitiveType::TriangleStrip, start_vertex: 4, primitive_count: 4 }
    );
    assert_eq!(device.frame_stats(), D3D9FrameStats { draw_calls: 1, primitives: 4 });
}

#[test]
fn test_draw_primitive_repeats_per_instance() {
    let mut device = create_device();
    device.set_render_target(window_target()).unwrap();

    device.draw_primitive(DrawOperationType::TriangleList, 0, 6, 3).unwrap();

    let draws = calls(&device)
        .into_iter()
        .filter(|call| matches!(call, D3D9Call::DrawPrimitive { .. }))
        .count();
    assert_eq!(draws, 3);
    assert_eq!(device.frame_stats(), D3D9FrameStats { draw_calls: 3, primitives: 6 });
}

#[test]
fn test_degenerate_draw_is_skipped() {
    let mut device = create_device();
    device.set_render_target(window_target()).unwrap();

    device.draw_primitive(DrawOperationType::TriangleStrip, 0, 2, 1).unwrap();

    assert!(!calls(&device).iter().any(|call| matches!(call, D3D9Call::BeginScene)));
    assert_eq!(device.frame_stats().draw_calls, 0);
}

#[test]
fn test_indexed_instanced_draw_sets_stream_frequency() {
    let mut device = create_device();
    device.set_render_target(window_target()).unwrap();

    device.draw_indexed_primitive(DrawOperationType::TriangleList, 6, 12, 10, 8, 5).unwrap();

    let calls = calls(&device);
    let tail = &calls[calls.len() - 5..];
    assert_eq!(tail[0], D3D9Call::SetStreamSourceFreq { stream: 0, setting: (1 << 30) | 5 });
    assert_eq!(tail[1], D3D9Call::SetStreamSourceFreq { stream: 1, setting: (2 << 30) | 1 });
    assert_eq!(
        tail[2],
        D3D9Call::DrawIndexedPrimitive {
            primitive_type: D3DPrimitiveType::TriangleList,
            base_vertex_index: 10,
            min_vertex_index: 0,
            num_vertices: 8,
            start_index: 6,
            primitive_count: 4,
        }
    );
    assert_eq!(tail[3], D3D9Call::SetStreamSourceFreq { stream: 0, setting: 1 });
    assert_eq!(tail[4], D3D9Call::SetStreamSourceFreq { stream: 1, setting: 1 });
    assert_eq!(device.frame_stats(), D3D9FrameStats { draw_calls: 1, primitives: 20 });
}

#[test]
fn test_large_instanced_draw_counts_primitives_in_u64() {
    let mut device = create_device();
    device.set_render_target(window_target()).unwrap();

    // 1M triangles x 5000 instances overflows u32
    device.draw_indexed_primitive(DrawOperationType::TriangleList, 0, 3_000_000, 0, 3, 5000).unwrap();

    let calls = calls(&device);
    assert_eq!(calls[calls.len() - 2], D3D9Call::SetStreamSourceFreq { stream: 0, setting: 1 });
    assert_eq!(calls[calls.len() - 1], D3D9Call::SetStreamSourceFreq { stream: 1, setting: 1 });
    assert_eq!(device.frame_stats(), D3D9FrameStats { draw_calls: 1, primitives: 5_000_000_000 });
}

#[test]
fn test_instance_count_above_frequency_limit_is_rejected() {
    let mut device = create_device();
    device.set_render_target(window_target()).unwrap();
    let before = calls(&device).len();

    let result = device.draw_indexed_primitive(DrawOperationType::TriangleList, 0, 3, 0, 3, 1 << 30);

    assert!(matches!(result, Err(Error::InvalidResource(_))));
    assert_eq!(calls(&device).len(), before);
}

#[test]
fn test_base_vertex_above_i32_range_is_rejected() {
    let mut device = create_device();
    device.set_render_target(window_target()).unwrap();
    let before = calls(&device).len();

    let result = device.draw_indexed_primitive(DrawOperationType::TriangleList, 0, 3, i32::MAX as u32 + 1, 3, 1);

    assert!(matches!(result, Err(Error::InvalidResource(_))));
    assert_eq!(calls(&device).len(), before);
    assert_eq!(device.frame_stats(), D3D9FrameStats::default());

    device.draw_indexed_primitive(DrawOperationType::TriangleList, 0, 3, i32::MAX as u32, 3, 1).unwrap();
    assert!(calls(&device).iter().any(|call| matches!(
        call,
        D3D9Call::DrawIndexedPrimitive { base_vertex_index: i32::MAX, .. }
    )));
}

#[test]
fn test_present_ends_scene_and_rolls_frame_stats() {
    let mut device = create_device();
    let target = window_target();
    device.set_render_target(target.clone()).unwrap();
    device.draw_primitive(DrawOperationType::LineList, 0, 8, 1).unwrap();

    device.present(&target).unwrap();

    let calls = calls(&device);
    assert_eq!(calls[calls.len() - 2], D3D9Call::EndScene);
    assert_eq!(calls[calls.len() - 1], D3D9Call::Present(target.id()));
    assert_eq!(device.frame_stats(), D3D9FrameStats::default());
    assert_eq!(device.last_frame_stats(), D3D9FrameStats { draw_calls: 1, primitives: 4 });
}

#[test]
fn test_present_off_screen_target_fails() {
    let mut device = create_device();
    let target = RenderTarget::create(RenderTargetProperties {
        name: "shadow map".to_string(),
        width: 512,
        height: 512,
        ..RenderTargetProperties::default()
    })
    .unwrap()
    .core()
    .unwrap();

    assert!(matches!(device.present(&target), Err(Error::InvalidResource(_))));
}

#[test]
fn test_switching_render_target_ends_scene() {
    let mut device = create_device();
    device.set_render_target(window_target()).unwrap();
    device.draw_primitive(DrawOperationType::PointList, 0, 1, 1).unwrap();

    let second = window_target();
    device.set_render_target(second.clone()).unwrap();

    let calls = calls(&device);
    assert_eq!(calls[calls.len() - 2], D3D9Call::EndScene);
    assert_eq!(calls[calls.len() - 1], D3D9Call::SetRenderTarget { index: 0, target: second.id() });
}

#[test]
fn test_release_rejects_further_calls() {
    let mut device = create_device();
    device.set_render_target(window_target()).unwrap();

    device.release();
    device.release();

    assert!(device.is_released());
    assert!(device.render_target().is_none());
    assert_eq!(calls(&device).iter().filter(|call| **call == D3D9Call::Release).count(), 1);
    assert!(matches!(device.set_scissor_rect(0, 0, 1, 1), Err(Error::BackendError(_))));
}

#[test]
#[serial]
fn test_device_updates_global_stats() {
    debug::reset_device_stats();
    let mut device = create_device();
    let target = window_target();
    device.set_render_target(target.clone()).unwrap();
    device.draw_primitive(DrawOperationType::TriangleList, 0, 9, 1).unwrap();
    device.present(&target).unwrap();

    let stats = debug::get_device_stats();
    assert!(stats.draw_calls >= 1);
    assert!(stats.primitives >= 3);
    assert!(stats.frames_presented >= 1);
}
