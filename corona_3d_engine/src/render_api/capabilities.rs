/// Device capability records

use bitflags::bitflags;

/// GPU vendor, decoded from the PCI vendor id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GpuVendor {
    Nvidia,
    Amd,
    Intel,
    #[default]
    Unknown,
}

impl GpuVendor {
    pub fn from_pci_id(vendor_id: u32) -> Self {
        match vendor_id {
            0x10DE => GpuVendor::Nvidia,
            0x1002 | 0x1022 => GpuVendor::Amd,
            0x8086 | 0x8087 => GpuVendor::Intel,
            _ => GpuVendor::Unknown,
        }
    }
}

bitflags! {
    /// Optional features a device may support
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CapabilityFlags: u32 {
        const HW_STENCIL = 1 << 0;
        const TWO_SIDED_STENCIL = 1 << 1;
        const SCISSOR_TEST = 1 << 2;
        const ANISOTROPY = 1 << 3;
        const INDEX_32BIT = 1 << 4;
        const VERTEX_TEXTURE_FETCH = 1 << 5;
        const MRT_DIFFERENT_BIT_DEPTHS = 1 << 6;
        const HW_GAMMA = 1 << 7;
        const GEOMETRY_PROGRAM = 1 << 8;
        const COMPUTE_PROGRAM = 1 << 9;
    }
}

/// What one device can do, filled in by the backend at initialization
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderApiCapabilities {
    pub device_name: String,
    pub vendor: GpuVendor,
    pub driver_version: String,
    pub render_api_name: String,
    pub num_texture_units: u32,
    pub max_bound_vertex_buffers: u32,
    pub num_multi_render_targets: u32,
    pub max_anisotropy: u32,
    pub features: CapabilityFlags,
}

impl RenderApiCapabilities {
    pub fn has(&self, feature: CapabilityFlags) -> bool {
        self.features.contains(feature)
    }
}
