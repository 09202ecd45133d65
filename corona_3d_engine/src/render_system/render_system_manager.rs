/// RenderSystemManager - registry of render backends and owner of the active one

use std::sync::Arc;
use rustc_hash::FxHashMap;

use crate::core_thread::CoreThreadConfig;
use crate::error::{Error, Result};
use crate::render_api::RenderApi;
use crate::resources::{RenderWindow, RenderWindowDesc};
use super::render_system_factory::RenderSystemFactory;

/// Registry of render system factories
///
/// Factories are registered explicitly at startup (each backend crate
/// exposes a `register` function). Registration is closed once a render
/// system is active.
///
/// # Example
///
/// ```no_run
/// use corona_3d_engine::corona3d::render_system::RenderSystemManager;
/// use corona_3d_engine::corona3d::resources::RenderWindowDesc;
///
/// let mut manager = RenderSystemManager::new();
/// corona_3d_engine_renderer_d3d9::register(&mut manager)?;
///
/// let (render_api, window) = manager.initialize(
///     corona_3d_engine_renderer_d3d9::SYSTEM_NAME,
///     &RenderWindowDesc::default(),
/// )?;
/// render_api.swap_buffers(window.render_target())?;
/// render_api.submit_all(true)?;
///
/// manager.destroy_active()?;
/// # Ok::<(), corona_3d_engine::corona3d::Error>(())
/// ```
pub struct RenderSystemManager {
    factories: FxHashMap<String, Arc<dyn RenderSystemFactory>>,
    active: Option<Arc<RenderApi>>,
    core_thread_config: CoreThreadConfig,
}

impl RenderSystemManager {
    pub fn new() -> Self {
        Self::with_core_thread_config(CoreThreadConfig::default())
    }

    /// Manager whose render systems use `config` for their core thread
    pub fn with_core_thread_config(config: CoreThreadConfig) -> Self {
        Self {
            factories: FxHashMap::default(),
            active: None,
            core_thread_config: config,
        }
    }

    // ===== REGISTRATION =====

    /// Register a factory under its own name
    ///
    /// # Errors
    ///
    /// - `DuplicateRenderSystem` if the name is taken (the first
    ///   registration stays)
    /// - `InitializationFailed` once a render system is active
    pub fn register_render_system_factory(&mut self, factory: Arc<dyn RenderSystemFactory>) -> Result<()> {
        let name = factory.name().to_string();

        if self.active.is_some() {
            return Err(Error::InitializationFailed(format!(
                "Cannot register '{}': a render system is already active", name
            )));
        }

        if self.factories.contains_key(&name) {
            crate::engine_warn!(
                "corona3d::RenderSystemManager",
                "Render system '{}' registered twice, keeping the first factory", name
            );
            return Err(Error::DuplicateRenderSystem(name));
        }

        crate::engine_debug!("corona3d::RenderSystemManager", "Registered render system '{}'", name);
        self.factories.insert(name, factory);
        Ok(())
    }

    pub fn factory(&self, name: &str) -> Option<Arc<dyn RenderSystemFactory>> {
        self.factories.get(name).cloned()
    }

    /// Registered names, sorted
    pub fn render_system_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn render_system_count(&self) -> usize {
        self.factories.len()
    }

    // ===== ACTIVE RENDER SYSTEM =====

    /// Instantiate a backend and start its core thread
    ///
    /// The new render system becomes the active one but is not initialized.
    ///
    /// # Errors
    ///
    /// - `RenderSystemNotFound` for an unknown name
    /// - `InitializationFailed` if a render system is already active
    /// - any error raised by the factory
    pub fn create(&mut self, name: &str) -> Result<Arc<RenderApi>> {
        if let Some(active) = &self.active {
            return Err(Error::InitializationFailed(format!(
                "Render system '{}' is already active", active.name()
            )));
        }

        let factory = self.factory(name)
            .ok_or_else(|| Error::RenderSystemNotFound(name.to_string()))?;

        let core = factory.create()?;
        let render_api = Arc::new(RenderApi::new(core, self.core_thread_config.clone())?);
        self.active = Some(render_api.clone());
        Ok(render_api)
    }

    /// Create a backend and initialize it with its primary window
    ///
    /// On initialization failure the render system is torn down again.
    pub fn initialize(
        &mut self,
        name: &str,
        primary_window_desc: &RenderWindowDesc,
    ) -> Result<(Arc<RenderApi>, Arc<RenderWindow>)> {
        let render_api = self.create(name)?;

        match render_api.initialize(primary_window_desc) {
            Ok(window) => Ok((render_api, window)),
            Err(error) => {
                crate::engine_error!(
                    "corona3d::RenderSystemManager",
                    "Failed to initialize render system '{}': {}", name, error
                );
                self.active = None;
                if let Err(teardown) = render_api.destroy() {
                    crate::engine_error!(
                        "corona3d::RenderSystemManager",
                        "Failed to tear down render system '{}': {}", name, teardown
                    );
                }
                Err(error)
            }
        }
    }

    pub fn active(&self) -> Option<Arc<RenderApi>> {
        self.active.clone()
    }

    /// Destroy the active render system (no-op if none)
    ///
    /// Blocks until every queued command ran. Other `Arc<RenderApi>` holders
    /// see `QueueClosed` afterwards.
    pub fn destroy_active(&mut self) -> Result<()> {
        match self.active.take() {
            Some(render_api) => render_api.destroy(),
            None => Ok(()),
        }
    }
}

impl Default for RenderSystemManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "render_system_manager_tests.rs"]
mod tests;
