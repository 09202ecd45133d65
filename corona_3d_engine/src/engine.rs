/// Corona3D Engine - process-wide access to engine subsystems
///
/// This module holds the global state of the engine: the render system
/// manager and the logger. Both live in thread-safe static storage
/// (`OnceLock` + `RwLock`) and can be reached from any thread.

use std::sync::{Arc, Mutex, OnceLock, RwLock};
use std::time::SystemTime;

use crate::error::{Error, Result};
use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
use crate::render_system::RenderSystemManager;

// ===== INTERNAL STATE =====

/// Global engine state storage
static ENGINE_STATE: OnceLock<EngineState> = OnceLock::new();

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

struct EngineState {
    render_system_manager: RwLock<Option<Arc<Mutex<RenderSystemManager>>>>,
}

impl EngineState {
    fn new() -> Self {
        Self {
            render_system_manager: RwLock::new(None),
        }
    }

    /// Remove the manager, destroying its active render system
    fn clear(&self) {
        let manager = match self.render_system_manager.write() {
            Ok(mut lock) => lock.take(),
            Err(_) => None,
        };

        if let Some(manager) = manager {
            if let Ok(mut manager) = manager.lock() {
                if let Err(error) = manager.destroy_active() {
                    crate::engine_error!("corona3d::Engine", "Failed to destroy active render system: {}", error);
                }
            }
        }
    }
}

// ===== PUBLIC API =====

/// Engine entry point
///
/// # Example
///
/// ```no_run
/// use corona_3d_engine::corona3d::Engine;
/// use corona_3d_engine::corona3d::resources::RenderWindowDesc;
///
/// Engine::initialize()?;
/// Engine::create_render_system_manager()?;
///
/// let manager = Engine::render_system_manager()?;
/// let mut manager = manager.lock().unwrap();
/// corona_3d_engine_renderer_d3d9::register(&mut manager)?;
/// let (render_api, _window) = manager.initialize(
///     corona_3d_engine_renderer_d3d9::SYSTEM_NAME,
///     &RenderWindowDesc::default(),
/// )?;
/// drop(manager);
///
/// render_api.submit_all(true)?;
/// Engine::shutdown();
/// # Ok::<(), corona_3d_engine::corona3d::Error>(())
/// ```
pub struct Engine;

impl Engine {
    /// Log an error before handing it back to the caller
    fn log_and_return_error(error: Error) -> Error {
        crate::engine_error!("corona3d::Engine", "{}", error);
        error
    }

    fn state() -> Result<&'static EngineState> {
        ENGINE_STATE.get().ok_or_else(|| Self::log_and_return_error(
            Error::InitializationFailed("Engine not initialized. Call Engine::initialize() first.".to_string())
        ))
    }

    /// Initialize the engine
    ///
    /// Must be called once at startup, before creating any subsystem.
    /// Calling it again is harmless.
    pub fn initialize() -> Result<()> {
        ENGINE_STATE.get_or_init(EngineState::new);
        Ok(())
    }

    /// Destroy every subsystem
    ///
    /// The active render system is destroyed (full drain of its core
    /// thread). Subsystems can be created again afterwards.
    pub fn shutdown() {
        if let Some(state) = ENGINE_STATE.get() {
            state.clear();
        }
    }

    // ===== RENDER SYSTEM MANAGER API =====

    /// Create the global render system manager
    ///
    /// # Errors
    ///
    /// - the engine is not initialized
    /// - a manager already exists
    pub fn create_render_system_manager() -> Result<()> {
        let state = Self::state()?;

        let mut lock = state.render_system_manager.write()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("RenderSystemManager lock poisoned".to_string())
            ))?;

        if lock.is_some() {
            return Err(Self::log_and_return_error(
                Error::InitializationFailed("RenderSystemManager already exists. Call Engine::destroy_render_system_manager() first.".to_string())
            ));
        }

        *lock = Some(Arc::new(Mutex::new(RenderSystemManager::new())));

        crate::engine_info!("corona3d::Engine", "RenderSystemManager created");

        Ok(())
    }

    /// Get the global render system manager
    pub fn render_system_manager() -> Result<Arc<Mutex<RenderSystemManager>>> {
        let state = Self::state()?;

        let lock = state.render_system_manager.read()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("RenderSystemManager lock poisoned".to_string())
            ))?;

        lock.clone()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("RenderSystemManager not created. Call Engine::create_render_system_manager() first.".to_string())
            ))
    }

    /// Destroy the global render system manager and its active render system
    ///
    /// Succeeds when no manager exists.
    pub fn destroy_render_system_manager() -> Result<()> {
        let state = ENGINE_STATE.get()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("Engine not initialized".to_string())
            ))?;

        state.clear();

        crate::engine_info!("corona3d::Engine", "RenderSystemManager destroyed");

        Ok(())
    }

    /// Reset all subsystems (only available in test builds)
    #[cfg(test)]
    pub fn reset_for_testing() {
        if let Some(state) = ENGINE_STATE.get() {
            state.clear();
        }
    }

    // ===== LOGGING API =====

    /// Replace the logger
    ///
    /// # Example
    ///
    /// ```no_run
    /// use corona_3d_engine::corona3d::{Engine, log::{Logger, LogEntry}};
    ///
    /// struct FileLogger;
    /// impl Logger for FileLogger {
    ///     fn log(&self, entry: &LogEntry) {
    ///         // Write to file...
    ///     }
    /// }
    ///
    /// Engine::set_logger(FileLogger);
    /// ```
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(mut lock) = logger_lock.write() {
            *lock = Box::new(logger);
        }
    }

    /// Restore the default console logger
    pub fn reset_logger() {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(mut lock) = logger_lock.write() {
            *lock = Box::new(DefaultLogger);
        }
    }

    /// Log without source location
    ///
    /// Used by `engine_trace!` through `engine_warn!`.
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(lock) = logger_lock.read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: None,
                line: None,
            });
        }
    }

    /// Log with file:line information
    ///
    /// Used by `engine_error!`, `engine_err!` and `engine_bail!`.
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(lock) = logger_lock.read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: Some(file),
                line: Some(line),
            });
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
