/// Render targets: surfaces that draw calls write to
///
/// A render target is either a window's back buffer or an off-screen
/// texture target.

use std::sync::Arc;

use crate::error::{Error, Result};
use super::core_object::{CoreHandle, CoreObjectId, FrontEndResource};

/// Immutable description of a render target
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTargetProperties {
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Number of color surfaces (multiple render targets)
    pub num_color_surfaces: u32,
    pub has_depth_stencil: bool,
    pub multisample_count: u32,
    pub hw_gamma: bool,
    /// Back buffer of a window, presented with `swap_buffers`
    pub is_window: bool,
}

impl Default for RenderTargetProperties {
    fn default() -> Self {
        Self {
            name: String::new(),
            width: 0,
            height: 0,
            num_color_surfaces: 1,
            has_depth_stencil: true,
            multisample_count: 1,
            hw_gamma: false,
            is_window: false,
        }
    }
}

#[derive(Debug)]
pub struct RenderTargetCore {
    id: CoreObjectId,
    properties: RenderTargetProperties,
}

impl RenderTargetCore {
    pub(crate) fn new(properties: RenderTargetProperties) -> Self {
        Self { id: CoreObjectId::next(), properties }
    }

    pub fn id(&self) -> CoreObjectId {
        self.id
    }

    pub fn properties(&self) -> &RenderTargetProperties {
        &self.properties
    }
}

pub struct RenderTarget {
    properties: RenderTargetProperties,
    handle: CoreHandle<RenderTargetCore>,
}

impl RenderTarget {
    /// Create an off-screen render target
    ///
    /// # Errors
    ///
    /// `InvalidResource` for a zero-sized target or one without any surface.
    pub fn create(properties: RenderTargetProperties) -> Result<Arc<Self>> {
        validate(&properties)?;
        Ok(Arc::new(Self::from_core(Arc::new(RenderTargetCore::new(properties)))))
    }

    /// Wrap an existing core render target (a window's back buffer)
    pub(crate) fn from_core(core: Arc<RenderTargetCore>) -> Self {
        Self {
            properties: core.properties().clone(),
            handle: CoreHandle::from_arc(core),
        }
    }

    pub fn properties(&self) -> &RenderTargetProperties {
        &self.properties
    }
}

impl FrontEndResource for RenderTarget {
    type Core = RenderTargetCore;
    const KIND: &'static str = "render target";

    fn core_handle(&self) -> &CoreHandle<RenderTargetCore> {
        &self.handle
    }
}

pub(crate) fn validate(properties: &RenderTargetProperties) -> Result<()> {
    if properties.width == 0 || properties.height == 0 {
        return Err(Error::InvalidResource(format!(
            "render target '{}' has zero size ({}x{})",
            properties.name, properties.width, properties.height
        )));
    }
    if properties.num_color_surfaces == 0 && !properties.has_depth_stencil {
        return Err(Error::InvalidResource(format!(
            "render target '{}' has no surfaces", properties.name
        )));
    }
    Ok(())
}
