/// Render windows
///
/// A render window pairs an OS window with the render target of its back
/// buffer. Creating the OS window itself is left to the platform layer; this
/// module only owns the description and the front-end/core handles.

use std::sync::Arc;
use winit::dpi::{PhysicalPosition, PhysicalSize};

use crate::error::Result;
use super::core_object::{CoreHandle, CoreObjectId, FrontEndResource};
use super::render_target::{self, RenderTarget, RenderTargetCore, RenderTargetProperties};

/// Primary window configuration passed to `RenderApi::initialize`
#[derive(Debug, Clone, PartialEq)]
pub struct RenderWindowDesc {
    pub title: String,
    pub size: PhysicalSize<u32>,
    /// `None` lets the platform pick (usually centered)
    pub position: Option<PhysicalPosition<i32>>,
    pub fullscreen: bool,
    pub vsync: bool,
    /// Present every n-th vertical blank when `vsync` is on
    pub vsync_interval: u32,
    pub multisample_count: u32,
    pub gamma: bool,
    pub hidden: bool,
}

impl Default for RenderWindowDesc {
    fn default() -> Self {
        Self {
            title: "Corona3D Application".to_string(),
            size: PhysicalSize::new(1280, 720),
            position: None,
            fullscreen: false,
            vsync: true,
            vsync_interval: 1,
            multisample_count: 1,
            gamma: false,
            hidden: false,
        }
    }
}

#[derive(Debug)]
pub struct RenderWindowCore {
    id: CoreObjectId,
    desc: RenderWindowDesc,
    parent: Option<CoreObjectId>,
    target: Arc<RenderTargetCore>,
}

impl RenderWindowCore {
    pub fn id(&self) -> CoreObjectId {
        self.id
    }

    pub fn desc(&self) -> &RenderWindowDesc {
        &self.desc
    }

    pub fn parent(&self) -> Option<CoreObjectId> {
        self.parent
    }

    /// Back buffer render target
    pub fn render_target(&self) -> &Arc<RenderTargetCore> {
        &self.target
    }
}

pub struct RenderWindow {
    desc: RenderWindowDesc,
    handle: CoreHandle<RenderWindowCore>,
    target: Arc<RenderTarget>,
}

impl RenderWindow {
    /// Create a render window, optionally as a child of `parent`
    ///
    /// # Errors
    ///
    /// `InvalidResource` for a zero-sized window.
    pub fn create(desc: &RenderWindowDesc, parent: Option<&RenderWindow>) -> Result<Arc<Self>> {
        let properties = RenderTargetProperties {
            name: desc.title.clone(),
            width: desc.size.width,
            height: desc.size.height,
            multisample_count: desc.multisample_count.max(1),
            hw_gamma: desc.gamma,
            is_window: true,
            ..RenderTargetProperties::default()
        };
        render_target::validate(&properties)?;

        let target_core = Arc::new(RenderTargetCore::new(properties));
        let core = RenderWindowCore {
            id: CoreObjectId::next(),
            desc: desc.clone(),
            parent: parent.and_then(|p| p.handle.core()).map(|p| p.id()),
            target: target_core.clone(),
        };

        crate::engine_debug!(
            "corona3d::RenderWindow",
            "Created window '{}' ({}x{})",
            desc.title, desc.size.width, desc.size.height
        );

        Ok(Arc::new(Self {
            desc: desc.clone(),
            handle: CoreHandle::new(core),
            target: Arc::new(RenderTarget::from_core(target_core)),
        }))
    }

    pub fn desc(&self) -> &RenderWindowDesc {
        &self.desc
    }

    /// Render target of the window's back buffer
    pub fn render_target(&self) -> &Arc<RenderTarget> {
        &self.target
    }
}

impl FrontEndResource for RenderWindow {
    type Core = RenderWindowCore;
    const KIND: &'static str = "render window";

    fn core_handle(&self) -> &CoreHandle<RenderWindowCore> {
        &self.handle
    }
}
