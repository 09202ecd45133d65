//! Error types for the Corona3D engine
//!
//! This module defines the error types used throughout the engine,
//! including render system registration, core thread dispatch and
//! resource resolution.

use std::fmt;

/// Result type for Corona3D engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Corona3D engine errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Backend-specific error (Direct3D9, OpenGL, etc.)
    BackendError(String),

    /// Invalid resource (buffer, pipeline, render target, etc.)
    InvalidResource(String),

    /// Initialization failed (engine, render system, subsystems)
    InitializationFailed(String),

    /// A required front-end handle has no core counterpart
    NullResource(String),

    /// The core thread command queue has been shut down
    QueueClosed,

    /// A core-thread-only entry point was called from another thread,
    /// or a producer-only call was made from the core thread
    WrongThread(String),

    /// A command panicked while executing on the core thread
    CommandPanicked(String),

    /// A blocking wait did not complete in time
    Timeout,

    /// A render system factory with the same name is already registered
    DuplicateRenderSystem(String),

    /// No render system factory is registered under this name
    RenderSystemNotFound(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::NullResource(what) => write!(f, "Null resource: {}", what),
            Error::QueueClosed => write!(f, "Core thread queue closed"),
            Error::WrongThread(msg) => write!(f, "Wrong thread: {}", msg),
            Error::CommandPanicked(msg) => write!(f, "Command panicked: {}", msg),
            Error::Timeout => write!(f, "Timed out waiting for the core thread"),
            Error::DuplicateRenderSystem(name) => {
                write!(f, "Render system '{}' is already registered", name)
            }
            Error::RenderSystemNotFound(name) => {
                write!(f, "Render system '{}' is not registered", name)
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
