/// Value types passed into render commands

use bitflags::bitflags;
use glam::{Mat4, Vec4};

/// Rectangle in normalized ([0, 1]) or pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect2 {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect2 {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// The whole target, in normalized coordinates
    pub const FULL: Rect2 = Rect2::new(0.0, 0.0, 1.0, 1.0);
}

/// Linear RGBA color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

bitflags! {
    /// Buffers affected by a clear
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FrameBufferType: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

bitflags! {
    /// Render target surfaces whose previous contents must be preserved
    /// when the target is bound
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RenderSurfaceMask: u32 {
        const COLOR0 = 1 << 0;
        const COLOR1 = 1 << 1;
        const COLOR2 = 1 << 2;
        const COLOR3 = 1 << 3;
        const COLOR4 = 1 << 4;
        const COLOR5 = 1 << 5;
        const COLOR6 = 1 << 6;
        const COLOR7 = 1 << 7;
        const DEPTH = 1 << 30;
        const STENCIL = 1 << 31;
        const DEPTH_STENCIL = Self::DEPTH.bits() | Self::STENCIL.bits();
    }
}

// ============================================================================
// Video modes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoMode {
    pub width: u32,
    pub height: u32,
    pub refresh_rate: f32,
    /// Index of the output (monitor) this mode belongs to
    pub output_idx: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoOutputInfo {
    pub name: String,
    pub video_modes: Vec<VideoMode>,
    pub desktop_video_mode: VideoMode,
}

/// Outputs and modes reported by the backend, fixed after creation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VideoModeInfo {
    pub outputs: Vec<VideoOutputInfo>,
}

impl VideoModeInfo {
    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }
}

// ============================================================================
// API conventions
// ============================================================================

/// Conventions of a render API that front-end code must respect
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderApiInfo {
    /// Offset to apply when mapping texels to pixels
    pub horizontal_texel_offset: f32,
    pub vertical_texel_offset: f32,
    /// Clip-space depth range
    pub min_depth: f32,
    pub max_depth: f32,
    /// Vertex colors are stored as BGRA instead of RGBA
    pub vertex_color_flip_required: bool,
    pub ndc_y_axis_up: bool,
}

impl Default for RenderApiInfo {
    fn default() -> Self {
        Self {
            horizontal_texel_offset: 0.0,
            vertical_texel_offset: 0.0,
            min_depth: -1.0,
            max_depth: 1.0,
            vertex_color_flip_required: false,
            ndc_y_axis_up: true,
        }
    }
}

impl RenderApiInfo {
    /// Adapt an engine projection matrix (depth in [-1, 1]) to this API
    ///
    /// For APIs with a [0, 1] depth range the z row becomes `(z + w) / 2`.
    pub fn convert_projection_matrix(&self, matrix: &Mat4) -> Mat4 {
        if self.min_depth == 0.0 {
            let remap = Mat4::from_cols(
                Vec4::new(1.0, 0.0, 0.0, 0.0),
                Vec4::new(0.0, 1.0, 0.0, 0.0),
                Vec4::new(0.0, 0.0, 0.5, 0.0),
                Vec4::new(0.0, 0.0, 0.5, 1.0),
            );
            remap * *matrix
        } else {
            *matrix
        }
    }
}
