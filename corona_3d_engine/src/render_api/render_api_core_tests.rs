//! Unit tests for RenderApiCoreState and the core trait defaults

use crate::corona3d::Engine;
use crate::error::Error;
use crate::log::LogSeverity;
use crate::render_api::mock_render_api::{CapturingLogger, MockRenderApiCore};
use crate::render_api::*;
use crate::resources::{FrontEndResource, RenderWindow, RenderWindowDesc};
use serial_test::serial;
use std::thread;

fn device(name: &str) -> RenderApiCapabilities {
    RenderApiCapabilities {
        device_name: name.to_string(),
        num_texture_units: 16,
        ..RenderApiCapabilities::default()
    }
}

fn state_with(names: &[&str]) -> RenderApiCoreState {
    let mut state = RenderApiCoreState::new();
    state.set_capabilities(names.iter().map(|n| device(n)).collect());
    state
}

// ============================================================================
// CAPABILITY LOOKUP
// ============================================================================

#[test]
#[serial]
fn test_capabilities_in_range_returns_stored_record() {
    let state = state_with(&["Primary", "Secondary"]);
    assert_eq!(state.num_devices(), 2);
    assert_eq!(state.capabilities(1), device("Secondary"));
    assert_eq!(state.capabilities(0), device("Primary"));
}

#[test]
#[serial]
fn test_capabilities_at_boundary_falls_back_with_one_warning() {
    let logger = CapturingLogger::new();
    Engine::set_logger(logger.clone());

    let state = state_with(&["Primary", "Secondary"]);
    let record = state.capabilities(2);

    Engine::reset_logger();

    assert_eq!(record, device("Primary"));
    let warnings = logger.messages(LogSeverity::Warn, "Invalid device index");
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0], "Invalid device index provided: 2. Valid range is: [0, 2).");
}

#[test]
#[serial]
fn test_capabilities_with_empty_table_returns_default() {
    let state = RenderApiCoreState::new();
    assert_eq!(state.capabilities(0), RenderApiCapabilities::default());
}

// ============================================================================
// ACTIVE TARGET AND THREAD
// ============================================================================

#[test]
fn test_clear_releases_target_and_capabilities() {
    let window = RenderWindow::create(&RenderWindowDesc::default(), None).unwrap();
    let mut state = state_with(&["Primary"]);
    state.set_active_render_target(Some(window.render_target().core().unwrap()));
    assert!(state.active_render_target().is_some());

    state.clear();
    assert!(state.active_render_target().is_none());
    assert_eq!(state.num_devices(), 0);
}

#[test]
fn test_record_core_thread() {
    let mut state = RenderApiCoreState::new();
    assert!(state.core_thread_id().is_none());
    assert!(!state.is_core_thread());

    state.record_core_thread();
    assert_eq!(state.core_thread_id(), Some(thread::current().id()));
    assert!(state.is_core_thread());

    let moved = thread::spawn(move || state.is_core_thread()).join().unwrap();
    assert!(!moved);
}

#[test]
fn test_initialize_with_window_rejects_other_threads() {
    let mut core = MockRenderApiCore::new(1);
    core.initialize().unwrap();

    let window = RenderWindow::create(&RenderWindowDesc::default(), None).unwrap();
    let window_core = window.core().unwrap();

    let result = thread::spawn(move || core.initialize_with_window(window_core))
        .join()
        .unwrap();
    assert!(matches!(result, Err(Error::WrongThread(_))));
}

#[test]
fn test_destroy_core_default_clears_state() {
    let mut core = MockRenderApiCore::new(2);
    core.initialize().unwrap();
    assert_eq!(core.num_devices(), 2);
    assert_eq!(core.capabilities(1).device_name, "Mock Device 1");

    core.destroy_core().unwrap();
    assert_eq!(core.num_devices(), 0);
    assert!(core.state().active_render_target().is_none());
}
