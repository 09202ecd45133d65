/*!
# Corona 3D Engine - Direct3D 9 Render System

Direct3D 9 backend of the Corona 3D engine.

The backend tracks device state and records the Direct3D 9 call stream
(`SetStreamSource`, `Clear`, `DrawPrimitive`, `Present`, ...) instead of
issuing it to a driver, which keeps it usable on any platform.

The render system is not registered implicitly: call [`register`] (or
[`register_with_config`]) on the manager at startup, then create it under
[`SYSTEM_NAME`].
*/

mod d3d9_device;
mod d3d9_driver_list;
mod d3d9_mappings;
mod d3d9_render_api;
mod d3d9_render_system_factory;
mod debug;

use std::sync::Arc;

use corona_3d_engine::corona3d::Result;
use corona_3d_engine::corona3d::render_system::RenderSystemManager;

pub use d3d9_device::{D3D9Call, D3D9CallLog, D3D9Device, D3D9FrameStats};
pub use d3d9_driver_list::{
    D3D9AdapterDesc, D3D9Config, D3D9DisplayMode, D3D9Driver, D3D9DriverList, D3D9OutputDesc,
};
pub use d3d9_mappings::D3DPrimitiveType;
pub use d3d9_render_api::D3D9RenderApi;
pub use d3d9_render_system_factory::D3D9RenderSystemFactory;

/// Direct3D 9 value constants and engine enum conversions
pub mod mappings {
    pub use crate::d3d9_mappings::*;
}

// Re-export debug utilities
pub use debug::{get_device_stats, print_device_stats_report, reset_device_stats, D3D9DeviceStats};

/// Name the Direct3D 9 render system is registered under
pub const SYSTEM_NAME: &str = "CoronaD3D9RenderSystem";

/// Register the Direct3D 9 render system with the default adapter list
///
/// # Example
///
/// ```no_run
/// use corona_3d_engine::corona3d::render_system::RenderSystemManager;
///
/// let mut manager = RenderSystemManager::new();
/// corona_3d_engine_renderer_d3d9::register(&mut manager)?;
/// assert!(manager.factory(corona_3d_engine_renderer_d3d9::SYSTEM_NAME).is_some());
/// # Ok::<(), corona_3d_engine::corona3d::Error>(())
/// ```
pub fn register(manager: &mut RenderSystemManager) -> Result<()> {
    register_with_config(manager, D3D9Config::default())
}

/// Register the Direct3D 9 render system with an explicit adapter configuration
pub fn register_with_config(manager: &mut RenderSystemManager, config: D3D9Config) -> Result<()> {
    manager.register_render_system_factory(Arc::new(D3D9RenderSystemFactory::new(config)))
}
