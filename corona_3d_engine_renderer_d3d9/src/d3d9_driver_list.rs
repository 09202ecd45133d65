/// Direct3D 9 adapter enumeration
///
/// Each adapter (GPU) becomes a driver entry with its capability record and
/// its outputs' display modes.

use corona_3d_engine::corona3d::{Error, Result};
use corona_3d_engine::corona3d::render_api::{
    CapabilityFlags, GpuVendor, RenderApiCapabilities, VideoMode, VideoModeInfo, VideoOutputInfo,
};

/// Display mode as reported by `EnumAdapterModes`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct D3D9DisplayMode {
    pub width: u32,
    pub height: u32,
    pub refresh_rate: u32,
}

impl D3D9DisplayMode {
    pub const fn new(width: u32, height: u32, refresh_rate: u32) -> Self {
        Self { width, height, refresh_rate }
    }
}

/// One monitor attached to an adapter
#[derive(Debug, Clone, PartialEq)]
pub struct D3D9OutputDesc {
    pub name: String,
    pub modes: Vec<D3D9DisplayMode>,
    pub desktop_mode: D3D9DisplayMode,
}

/// Adapter identifier and device caps
#[derive(Debug, Clone, PartialEq)]
pub struct D3D9AdapterDesc {
    pub description: String,
    pub vendor_id: u32,
    pub device_id: u32,
    pub driver_version: [u16; 4],
    pub outputs: Vec<D3D9OutputDesc>,
    pub max_simultaneous_textures: u32,
    pub max_streams: u32,
    pub num_simultaneous_rts: u32,
    pub max_anisotropy: u32,
    pub two_sided_stencil: bool,
    pub vertex_texture_fetch: bool,
}

impl D3D9AdapterDesc {
    /// Software reference adapter with a single 1080p output
    pub fn reference() -> Self {
        Self {
            description: "Corona Direct3D 9 Reference Adapter".to_string(),
            vendor_id: 0,
            device_id: 0,
            driver_version: [9, 0, 0, 0],
            outputs: vec![D3D9OutputDesc {
                name: "\\\\.\\DISPLAY1".to_string(),
                modes: vec![
                    D3D9DisplayMode::new(800, 600, 60),
                    D3D9DisplayMode::new(1280, 720, 60),
                    D3D9DisplayMode::new(1920, 1080, 60),
                ],
                desktop_mode: D3D9DisplayMode::new(1920, 1080, 60),
            }],
            max_simultaneous_textures: 8,
            max_streams: 16,
            num_simultaneous_rts: 4,
            max_anisotropy: 16,
            two_sided_stencil: true,
            vertex_texture_fetch: false,
        }
    }
}

/// Backend configuration
#[derive(Debug, Clone, PartialEq)]
pub struct D3D9Config {
    /// Adapters visible to the backend, in `IDirect3D9` ordinal order
    pub adapters: Vec<D3D9AdapterDesc>,
    /// Ordinal of the adapter the device is created on
    pub active_adapter: u32,
}

impl Default for D3D9Config {
    fn default() -> Self {
        Self {
            adapters: vec![D3D9AdapterDesc::reference()],
            active_adapter: 0,
        }
    }
}

// ============================================================================
// Driver list
// ============================================================================

pub struct D3D9Driver {
    adapter_number: u32,
    desc: D3D9AdapterDesc,
}

impl D3D9Driver {
    pub fn adapter_number(&self) -> u32 {
        self.adapter_number
    }

    pub fn desc(&self) -> &D3D9AdapterDesc {
        &self.desc
    }

    pub fn driver_version_string(&self) -> String {
        let [a, b, c, d] = self.desc.driver_version;
        format!("{}.{}.{}.{}", a, b, c, d)
    }

    pub fn capabilities(&self) -> RenderApiCapabilities {
        let desc = &self.desc;

        let mut features = CapabilityFlags::HW_STENCIL
            | CapabilityFlags::SCISSOR_TEST
            | CapabilityFlags::INDEX_32BIT
            | CapabilityFlags::HW_GAMMA;
        if desc.max_anisotropy > 1 {
            features |= CapabilityFlags::ANISOTROPY;
        }
        if desc.two_sided_stencil {
            features |= CapabilityFlags::TWO_SIDED_STENCIL;
        }
        if desc.vertex_texture_fetch {
            features |= CapabilityFlags::VERTEX_TEXTURE_FETCH;
        }

        RenderApiCapabilities {
            device_name: desc.description.clone(),
            vendor: GpuVendor::from_pci_id(desc.vendor_id),
            driver_version: self.driver_version_string(),
            render_api_name: "Direct3D 9".to_string(),
            num_texture_units: desc.max_simultaneous_textures,
            max_bound_vertex_buffers: desc.max_streams,
            num_multi_render_targets: desc.num_simultaneous_rts,
            max_anisotropy: desc.max_anisotropy,
            features,
        }
    }
}

pub struct D3D9DriverList {
    drivers: Vec<D3D9Driver>,
}

impl D3D9DriverList {
    /// Enumerate the configured adapters
    ///
    /// # Errors
    ///
    /// `InitializationFailed` when no adapter is available.
    pub fn new(adapters: &[D3D9AdapterDesc]) -> Result<Self> {
        if adapters.is_empty() {
            return Err(Error::InitializationFailed("No Direct3D 9 adapter available".to_string()));
        }

        let drivers = adapters
            .iter()
            .enumerate()
            .map(|(i, desc)| D3D9Driver { adapter_number: i as u32, desc: desc.clone() })
            .collect();

        Ok(Self { drivers })
    }

    pub fn count(&self) -> u32 {
        self.drivers.len() as u32
    }

    pub fn driver(&self, adapter_number: u32) -> Option<&D3D9Driver> {
        self.drivers.get(adapter_number as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = &D3D9Driver> {
        self.drivers.iter()
    }

    /// Capability table, indexed by adapter ordinal
    pub fn capabilities(&self) -> Vec<RenderApiCapabilities> {
        self.drivers.iter().map(D3D9Driver::capabilities).collect()
    }

    /// Outputs of every adapter, numbered across the whole list
    pub fn video_mode_info(&self) -> VideoModeInfo {
        let outputs = self
            .drivers
            .iter()
            .flat_map(|driver| driver.desc.outputs.iter())
            .enumerate()
            .map(|(output_idx, output)| {
                let to_mode = |mode: &D3D9DisplayMode| VideoMode {
                    width: mode.width,
                    height: mode.height,
                    refresh_rate: mode.refresh_rate as f32,
                    output_idx: output_idx as u32,
                };
                VideoOutputInfo {
                    name: output.name.clone(),
                    video_modes: output.modes.iter().map(to_mode).collect(),
                    desktop_video_mode: to_mode(&output.desktop_mode),
                }
            })
            .collect();

        VideoModeInfo { outputs }
    }
}

#[cfg(test)]
#[path = "d3d9_driver_list_tests.rs"]
mod tests;
