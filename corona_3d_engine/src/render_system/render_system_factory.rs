/// RenderSystemFactory trait - one implementation per backend

use crate::error::Result;
use crate::render_api::RenderApiCore;

/// Creates the core object of one render backend
///
/// # Example
///
/// ```no_run
/// use corona_3d_engine::corona3d::{Result, render_api::RenderApiCore};
/// use corona_3d_engine::corona3d::render_system::RenderSystemFactory;
///
/// struct NullFactory;
///
/// impl RenderSystemFactory for NullFactory {
///     fn name(&self) -> &str {
///         "NullRenderSystem"
///     }
///
///     fn create(&self) -> Result<Box<dyn RenderApiCore>> {
///         todo!()
///     }
/// }
/// ```
pub trait RenderSystemFactory: Send + Sync {
    /// Stable identifier the backend is registered under
    fn name(&self) -> &str;

    /// Instantiate the backend
    ///
    /// The returned core is moved onto the core thread by the manager; it
    /// must not touch the device before `RenderApiCore::initialize`.
    fn create(&self) -> Result<Box<dyn RenderApiCore>>;
}
