/// GPU program parameters bound alongside a pipeline

use std::sync::Arc;

use crate::error::Result;
use super::core_object::{CoreHandle, CoreObjectId, FrontEndResource};

/// Parameter set layout (slot counts per resource kind)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GpuParamsDesc {
    pub name: String,
    pub num_param_blocks: u32,
    pub num_textures: u32,
    pub num_samplers: u32,
    pub num_buffers: u32,
}

#[derive(Debug)]
pub struct GpuParamsCore {
    id: CoreObjectId,
    desc: GpuParamsDesc,
}

impl GpuParamsCore {
    pub fn id(&self) -> CoreObjectId {
        self.id
    }

    pub fn desc(&self) -> &GpuParamsDesc {
        &self.desc
    }
}

pub struct GpuParams {
    desc: GpuParamsDesc,
    handle: CoreHandle<GpuParamsCore>,
}

impl GpuParams {
    pub fn create(desc: GpuParamsDesc) -> Result<Arc<Self>> {
        let core = GpuParamsCore { id: CoreObjectId::next(), desc: desc.clone() };
        Ok(Arc::new(Self { desc, handle: CoreHandle::new(core) }))
    }

    pub fn desc(&self) -> &GpuParamsDesc {
        &self.desc
    }
}

impl FrontEndResource for GpuParams {
    type Core = GpuParamsCore;
    const KIND: &'static str = "GPU params";

    fn core_handle(&self) -> &CoreHandle<GpuParamsCore> {
        &self.handle
    }
}
