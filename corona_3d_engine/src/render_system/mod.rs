//! Render system registry
//!
//! Backends register a [`RenderSystemFactory`] under a stable name at
//! startup. The [`RenderSystemManager`] later creates the chosen backend and
//! wraps it into a running [`RenderApi`](crate::render_api::RenderApi).

mod render_system_factory;
mod render_system_manager;

pub use render_system_factory::RenderSystemFactory;
pub use render_system_manager::RenderSystemManager;
