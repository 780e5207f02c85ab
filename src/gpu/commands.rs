use crate::utils::Handle;

use super::objects::{Descriptors, Pipeline, PrimitiveBuffer, RenderTarget};
use super::types::{BlitMask, ClearFlags, Filter};

/// Indexed or non-indexed instanced draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawInstanced {
    /// First vertex, or first index for indexed draws.
    pub first: u32,
    pub count: u32,
    pub instance_count: u32,
    pub first_instance: u32,
    /// Base vertex added to each index; indexed draws only.
    pub vertex_offset: i32,
    pub indexed: bool,
}

impl Default for DrawInstanced {
    fn default() -> Self {
        Self {
            first: 0,
            count: 0,
            instance_count: 1,
            first_instance: 0,
            vertex_offset: 0,
            indexed: false,
        }
    }
}

impl DrawInstanced {
    pub fn indexed(count: u32) -> Self {
        Self {
            count,
            indexed: true,
            ..Default::default()
        }
    }
}

/// One record of the ordered operation stream the engine consumes.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    BindPipeline(Handle<Pipeline>),
    BindDescriptors(Handle<Descriptors>),
    BindVertexInput(Handle<PrimitiveBuffer>),

    BeginRenderTarget(Handle<RenderTarget>),
    EndRenderTarget,

    /// Zero size resolves to the bound render target's size.
    SetViewport {
        offset: [i32; 2],
        size: [u32; 2],
    },
    SetScissor {
        offset: [i32; 2],
        size: [u32; 2],
    },
    SetViewportAndScissor {
        offset: [i32; 2],
        size: [u32; 2],
    },

    SetClearColor([f32; 4]),
    SetClearDepth(f32),
    SetClearStencil(u32),
    SetBlendConstants([f32; 4]),

    Draw(DrawInstanced),
    Dispatch {
        groups: [u32; 3],
    },

    ClearRenderTarget {
        target: Handle<RenderTarget>,
        flags: ClearFlags,
    },
    BlitRenderTarget {
        src: Handle<RenderTarget>,
        dst: Handle<RenderTarget>,
        src_area: [u32; 4],
        dst_area: [u32; 4],
        mask: BlitMask,
        filter: Filter,
    },

    DebugStartRegion(String),
    DebugInsertMarker(String),
    DebugEndRegion,
}
