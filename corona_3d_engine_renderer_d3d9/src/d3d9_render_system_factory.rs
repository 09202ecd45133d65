/// D3D9RenderSystemFactory - creates the Direct3D 9 backend

use corona_3d_engine::corona3d::Result;
use corona_3d_engine::corona3d::render_api::RenderApiCore;
use corona_3d_engine::corona3d::render_system::RenderSystemFactory;

use crate::d3d9_driver_list::D3D9Config;
use crate::d3d9_render_api::D3D9RenderApi;

/// Factory registered under [`SYSTEM_NAME`](crate::SYSTEM_NAME)
pub struct D3D9RenderSystemFactory {
    config: D3D9Config,
}

impl D3D9RenderSystemFactory {
    pub fn new(config: D3D9Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &D3D9Config {
        &self.config
    }
}

impl Default for D3D9RenderSystemFactory {
    fn default() -> Self {
        Self::new(D3D9Config::default())
    }
}

impl RenderSystemFactory for D3D9RenderSystemFactory {
    fn name(&self) -> &str {
        crate::SYSTEM_NAME
    }

    fn create(&self) -> Result<Box<dyn RenderApiCore>> {
        Ok(Box::new(D3D9RenderApi::new(self.config.clone())?))
    }
}
