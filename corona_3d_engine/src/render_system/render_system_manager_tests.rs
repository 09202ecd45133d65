//! Unit tests for RenderSystemManager

use crate::corona3d::Engine;
use crate::error::{Error, Result};
use crate::log::LogSeverity;
use crate::render_api::mock_render_api::{CapturingLogger, MockRenderApiCore};
use crate::render_api::{RenderApiCore, RenderApiLifecycle};
use crate::render_system::{RenderSystemFactory, RenderSystemManager};
use crate::resources::RenderWindowDesc;
use serial_test::serial;
use std::sync::Arc;

struct MockFactory {
    name: &'static str,
    num_devices: u32,
}

impl RenderSystemFactory for MockFactory {
    fn name(&self) -> &str {
        self.name
    }

    fn create(&self) -> Result<Box<dyn RenderApiCore>> {
        Ok(Box::new(MockRenderApiCore::new(self.num_devices)))
    }
}

struct FailingDestroyFactory;

impl RenderSystemFactory for FailingDestroyFactory {
    fn name(&self) -> &str {
        "FragileRenderSystem"
    }

    fn create(&self) -> Result<Box<dyn RenderApiCore>> {
        Ok(Box::new(MockRenderApiCore::new(1).with_failing_destroy()))
    }
}

struct FailingFactory;

impl RenderSystemFactory for FailingFactory {
    fn name(&self) -> &str {
        "BrokenRenderSystem"
    }

    fn create(&self) -> Result<Box<dyn RenderApiCore>> {
        Err(Error::InitializationFailed("no adapter".to_string()))
    }
}

fn factory(name: &'static str) -> Arc<dyn RenderSystemFactory> {
    Arc::new(MockFactory { name, num_devices: 1 })
}

// ============================================================================
// REGISTRATION
// ============================================================================

#[test]
fn test_register_and_lookup() {
    let mut manager = RenderSystemManager::new();
    manager.register_render_system_factory(factory("Zeta")).unwrap();
    manager.register_render_system_factory(factory("Alpha")).unwrap();

    assert_eq!(manager.render_system_count(), 2);
    assert_eq!(manager.render_system_names(), vec!["Alpha".to_string(), "Zeta".to_string()]);
    assert_eq!(manager.factory("Zeta").unwrap().name(), "Zeta");
    assert!(manager.factory("Missing").is_none());
}

#[test]
fn test_duplicate_registration_rejected_first_wins() {
    let mut manager = RenderSystemManager::new();
    let first: Arc<dyn RenderSystemFactory> = Arc::new(MockFactory { name: "Mock", num_devices: 3 });
    manager.register_render_system_factory(first.clone()).unwrap();

    let second = manager.register_render_system_factory(factory("Mock"));
    assert_eq!(second, Err(Error::DuplicateRenderSystem("Mock".to_string())));
    assert_eq!(manager.render_system_count(), 1);
    assert!(Arc::ptr_eq(&manager.factory("Mock").unwrap(), &first));
}

#[test]
fn test_registration_closed_while_active() {
    let mut manager = RenderSystemManager::new();
    manager.register_render_system_factory(factory("Mock")).unwrap();
    manager.create("Mock").unwrap();

    let late = manager.register_render_system_factory(factory("Late"));
    assert!(matches!(late, Err(Error::InitializationFailed(_))));

    manager.destroy_active().unwrap();
    manager.register_render_system_factory(factory("Late")).unwrap();
}

// ============================================================================
// CREATION
// ============================================================================

#[test]
fn test_create_unknown_render_system() {
    let mut manager = RenderSystemManager::new();
    let result = manager.create("Missing");
    assert!(matches!(result, Err(Error::RenderSystemNotFound(name)) if name == "Missing"));
    assert!(manager.active().is_none());
}

#[test]
fn test_factory_error_propagates() {
    let mut manager = RenderSystemManager::new();
    manager.register_render_system_factory(Arc::new(FailingFactory)).unwrap();

    assert!(matches!(manager.create("BrokenRenderSystem"), Err(Error::InitializationFailed(_))));
    assert!(manager.active().is_none());
}

#[test]
fn test_only_one_active_render_system() {
    let mut manager = RenderSystemManager::new();
    manager.register_render_system_factory(factory("Mock")).unwrap();

    let api = manager.create("Mock").unwrap();
    assert_eq!(api.lifecycle(), RenderApiLifecycle::Uninitialized);
    assert!(Arc::ptr_eq(&manager.active().unwrap(), &api));
    assert!(matches!(manager.create("Mock"), Err(Error::InitializationFailed(_))));
}

#[test]
fn test_initialize_and_destroy_active() {
    let mut manager = RenderSystemManager::new();
    manager
        .register_render_system_factory(Arc::new(MockFactory { name: "Mock", num_devices: 2 }))
        .unwrap();

    let (api, window) = manager.initialize("Mock", &RenderWindowDesc::default()).unwrap();
    assert_eq!(api.lifecycle(), RenderApiLifecycle::Initialized);
    assert_eq!(api.num_devices().unwrap(), 2);
    assert!(window.render_target().properties().is_window);

    manager.destroy_active().unwrap();
    assert!(manager.active().is_none());
    assert_eq!(api.lifecycle(), RenderApiLifecycle::Destroyed);
    assert_eq!(api.submit_all(true), Err(Error::QueueClosed));

    // Nothing left to destroy
    manager.destroy_active().unwrap();
}

#[test]
fn test_failed_initialize_releases_active_slot() {
    let mut manager = RenderSystemManager::new();
    manager.register_render_system_factory(factory("Mock")).unwrap();

    let desc = RenderWindowDesc {
        size: winit::dpi::PhysicalSize::new(0, 0),
        ..RenderWindowDesc::default()
    };
    assert!(manager.initialize("Mock", &desc).is_err());
    assert!(manager.active().is_none());

    assert!(manager.initialize("Mock", &RenderWindowDesc::default()).is_ok());
}

#[test]
#[serial]
fn test_failed_initialize_logs_teardown_error() {
    let mut manager = RenderSystemManager::new();
    manager.register_render_system_factory(Arc::new(FailingDestroyFactory)).unwrap();
    let logger = CapturingLogger::new();
    Engine::set_logger(logger.clone());

    let desc = RenderWindowDesc {
        size: winit::dpi::PhysicalSize::new(0, 0),
        ..RenderWindowDesc::default()
    };
    let result = manager.initialize("FragileRenderSystem", &desc);

    Engine::reset_logger();
    // The initialization error is returned, the teardown error is logged
    assert!(matches!(result, Err(Error::InvalidResource(_))));
    assert!(manager.active().is_none());
    let teardown = logger.messages(LogSeverity::Error, "Failed to tear down render system 'FragileRenderSystem'");
    assert_eq!(teardown.len(), 1);
    assert!(teardown[0].contains("mock device lost during teardown"));
}
