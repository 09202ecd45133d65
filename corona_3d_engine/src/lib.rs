/*!
# Corona 3D Engine

Render command dispatch core of the Corona 3D engine.

This crate provides the platform-agnostic layer between game code and a
render backend. Producer threads call a thread-safe [`RenderApi`] facade;
every call becomes a command executed in order on a single core thread that
owns the graphics device. Backends (Direct3D 9, ...) live in their own crates
and register a factory at startup.

## Architecture

- **RenderSystemManager**: registry of backend factories, owns the active render system
- **RenderSystemFactory**: creates a backend's [`RenderApiCore`]
- **CoreThread**: per-producer command queues drained by the core thread
- **RenderApi**: producer-side facade, resolves resources and queues commands
- **RenderApiCore**: backend interface, capability table and active render target
- **Resources**: front-end handles paired with core-thread objects

[`RenderApi`]: corona3d::render_api::RenderApi
[`RenderApiCore`]: corona3d::render_api::RenderApiCore
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod core_thread;
pub mod render_api;
pub mod render_system;
pub mod resources;

// Main corona3d namespace module
pub mod corona3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine global state
    pub use crate::engine::Engine;

    // Most used entry points
    pub use crate::render_api::{RenderApi, RenderApiCore};
    pub use crate::render_system::{RenderSystemFactory, RenderSystemManager};

    // Logging sub-module (types only, macros are exported at the crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger, format_entry};
    }

    pub mod core_thread {
        pub use crate::core_thread::*;
    }

    pub mod render_api {
        pub use crate::render_api::*;
    }

    pub mod render_system {
        pub use crate::render_system::*;
    }

    pub mod resources {
        pub use crate::resources::*;
    }
}

// Re-export math library at crate root
pub use glam;
