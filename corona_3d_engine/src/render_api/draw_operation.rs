//! Draw topology and primitive counting

/// Primitive topology used by draw calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum DrawOperationType {
    PointList = 1,
    LineList = 2,
    LineStrip = 3,
    #[default]
    TriangleList = 4,
    TriangleStrip = 5,
    TriangleFan = 6,
}

impl DrawOperationType {
    /// Decode a raw topology value, `None` if unrecognized
    pub fn from_raw(value: u32) -> Option<Self> {
        match value {
            1 => Some(DrawOperationType::PointList),
            2 => Some(DrawOperationType::LineList),
            3 => Some(DrawOperationType::LineStrip),
            4 => Some(DrawOperationType::TriangleList),
            5 => Some(DrawOperationType::TriangleStrip),
            6 => Some(DrawOperationType::TriangleFan),
            _ => None,
        }
    }

    pub fn as_raw(self) -> u32 {
        self as u32
    }
}

/// Number of primitives drawn by `element_count` vertices (or indices)
///
/// Strips and fans with fewer vertices than one primitive yield zero.
pub fn vertex_count_to_prim_count(op: DrawOperationType, element_count: u32) -> u32 {
    match op {
        DrawOperationType::PointList => element_count,
        DrawOperationType::LineList => element_count / 2,
        DrawOperationType::LineStrip => element_count.saturating_sub(1),
        DrawOperationType::TriangleList => element_count / 3,
        DrawOperationType::TriangleStrip => element_count.saturating_sub(2),
        DrawOperationType::TriangleFan => element_count.saturating_sub(2),
    }
}

/// Same as [`vertex_count_to_prim_count`] for a raw topology value
///
/// Unrecognized topologies count as zero primitives, silently.
pub fn vertex_count_to_prim_count_raw(op: u32, element_count: u32) -> u32 {
    DrawOperationType::from_raw(op).map_or(0, |op| vertex_count_to_prim_count(op, element_count))
}

#[cfg(test)]
#[path = "draw_operation_tests.rs"]
mod tests;
