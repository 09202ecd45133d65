/// Engine enums to Direct3D 9 values
///
/// Values match the d3d9types.h definitions so the recorded call stream
/// reads like a PIX capture.

use corona_3d_engine::corona3d::render_api::{Color, DrawOperationType, FrameBufferType};
use corona_3d_engine::corona3d::resources::{
    BufferUsage, IndexType, VertexElementSemantic, VertexElementType,
};

/// D3DPRIMITIVETYPE
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum D3DPrimitiveType {
    PointList = 1,
    LineList = 2,
    LineStrip = 3,
    TriangleList = 4,
    TriangleStrip = 5,
    TriangleFan = 6,
}

// D3DCLEAR flags
pub const D3DCLEAR_TARGET: u32 = 0x0000_0001;
pub const D3DCLEAR_ZBUFFER: u32 = 0x0000_0002;
pub const D3DCLEAR_STENCIL: u32 = 0x0000_0004;

// D3DFORMAT (index formats only)
pub const D3DFMT_INDEX16: u32 = 101;
pub const D3DFMT_INDEX32: u32 = 102;

// D3DRENDERSTATETYPE (subset)
pub const D3DRS_ZENABLE: u32 = 7;
pub const D3DRS_ZWRITEENABLE: u32 = 14;
pub const D3DRS_STENCILENABLE: u32 = 52;
pub const D3DRS_STENCILREF: u32 = 57;
pub const D3DRS_SCISSORTESTENABLE: u32 = 174;

// D3DUSAGE / D3DPOOL
pub const D3DUSAGE_WRITEONLY: u32 = 0x0000_0008;
pub const D3DUSAGE_DYNAMIC: u32 = 0x0000_0200;
pub const D3DPOOL_DEFAULT: u32 = 0;
pub const D3DPOOL_MANAGED: u32 = 1;

// SetStreamSourceFreq settings (hardware instancing)
pub const D3DSTREAMSOURCE_INDEXEDDATA: u32 = 1 << 30;
pub const D3DSTREAMSOURCE_INSTANCEDATA: u32 = 2 << 30;
/// Largest divider that fits below the frequency flag bits
pub const D3DSTREAMSOURCE_MAX_DIVIDER: u32 = (1 << 30) - 1;

// D3DPRESENT_INTERVAL
pub const D3DPRESENT_INTERVAL_DEFAULT: u32 = 0;
pub const D3DPRESENT_INTERVAL_IMMEDIATE: u32 = 0x8000_0000;

// D3DDECLTYPE (subset)
pub const D3DDECLTYPE_FLOAT1: u8 = 0;
pub const D3DDECLTYPE_FLOAT2: u8 = 1;
pub const D3DDECLTYPE_FLOAT3: u8 = 2;
pub const D3DDECLTYPE_FLOAT4: u8 = 3;
pub const D3DDECLTYPE_D3DCOLOR: u8 = 4;
pub const D3DDECLTYPE_UBYTE4: u8 = 5;

// D3DDECLUSAGE (subset)
pub const D3DDECLUSAGE_POSITION: u8 = 0;
pub const D3DDECLUSAGE_BLENDWEIGHT: u8 = 1;
pub const D3DDECLUSAGE_BLENDINDICES: u8 = 2;
pub const D3DDECLUSAGE_NORMAL: u8 = 3;
pub const D3DDECLUSAGE_TEXCOORD: u8 = 5;
pub const D3DDECLUSAGE_TANGENT: u8 = 6;
pub const D3DDECLUSAGE_COLOR: u8 = 10;

pub fn primitive_type(op: DrawOperationType) -> D3DPrimitiveType {
    match op {
        DrawOperationType::PointList => D3DPrimitiveType::PointList,
        DrawOperationType::LineList => D3DPrimitiveType::LineList,
        DrawOperationType::LineStrip => D3DPrimitiveType::LineStrip,
        DrawOperationType::TriangleList => D3DPrimitiveType::TriangleList,
        DrawOperationType::TriangleStrip => D3DPrimitiveType::TriangleStrip,
        DrawOperationType::TriangleFan => D3DPrimitiveType::TriangleFan,
    }
}

/// `FrameBufferType` to a D3DCLEAR mask
pub fn clear_flags(buffers: FrameBufferType) -> u32 {
    let mut flags = 0;
    if buffers.contains(FrameBufferType::COLOR) {
        flags |= D3DCLEAR_TARGET;
    }
    if buffers.contains(FrameBufferType::DEPTH) {
        flags |= D3DCLEAR_ZBUFFER;
    }
    if buffers.contains(FrameBufferType::STENCIL) {
        flags |= D3DCLEAR_STENCIL;
    }
    flags
}

/// Pack a color as D3DCOLOR (0xAARRGGBB)
pub fn d3d_color(color: Color) -> u32 {
    fn channel(value: f32) -> u32 {
        (value.clamp(0.0, 1.0) * 255.0).round() as u32
    }

    (channel(color.a) << 24) | (channel(color.r) << 16) | (channel(color.g) << 8) | channel(color.b)
}

pub fn index_format(index_type: IndexType) -> u32 {
    match index_type {
        IndexType::Bit16 => D3DFMT_INDEX16,
        IndexType::Bit32 => D3DFMT_INDEX32,
    }
}

/// (D3DUSAGE, D3DPOOL) for a buffer
pub fn buffer_usage(usage: BufferUsage) -> (u32, u32) {
    match usage {
        BufferUsage::Static => (D3DUSAGE_WRITEONLY, D3DPOOL_MANAGED),
        BufferUsage::Dynamic => (D3DUSAGE_DYNAMIC | D3DUSAGE_WRITEONLY, D3DPOOL_DEFAULT),
    }
}

/// D3DPRESENT_INTERVAL_* for a window's vsync settings
pub fn presentation_interval(vsync: bool, vsync_interval: u32) -> u32 {
    match (vsync, vsync_interval) {
        (false, _) => D3DPRESENT_INTERVAL_IMMEDIATE,
        (true, 0 | 1) => D3DPRESENT_INTERVAL_DEFAULT,
        // D3DPRESENT_INTERVAL_TWO .. FOUR
        (true, n) => 1 << (n.min(4) - 1),
    }
}

pub fn decl_type(element_type: VertexElementType) -> u8 {
    match element_type {
        VertexElementType::Float1 => D3DDECLTYPE_FLOAT1,
        VertexElementType::Float2 => D3DDECLTYPE_FLOAT2,
        VertexElementType::Float3 => D3DDECLTYPE_FLOAT3,
        VertexElementType::Float4 => D3DDECLTYPE_FLOAT4,
        VertexElementType::Color => D3DDECLTYPE_D3DCOLOR,
        VertexElementType::UByte4 => D3DDECLTYPE_UBYTE4,
    }
}

pub fn decl_usage(semantic: VertexElementSemantic) -> u8 {
    match semantic {
        VertexElementSemantic::Position => D3DDECLUSAGE_POSITION,
        VertexElementSemantic::Normal => D3DDECLUSAGE_NORMAL,
        VertexElementSemantic::Tangent => D3DDECLUSAGE_TANGENT,
        VertexElementSemantic::Color => D3DDECLUSAGE_COLOR,
        VertexElementSemantic::TexCoord => D3DDECLUSAGE_TEXCOORD,
        VertexElementSemantic::BlendWeights => D3DDECLUSAGE_BLENDWEIGHT,
        VertexElementSemantic::BlendIndices => D3DDECLUSAGE_BLENDINDICES,
    }
}

#[cfg(test)]
#[path = "d3d9_mappings_tests.rs"]
mod tests;
