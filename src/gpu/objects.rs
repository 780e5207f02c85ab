use std::collections::HashMap;

use super::driver::RawHandle;
use super::error::{GPUError, Result};
use super::types::{
    BlendState, Format, IndexType, InputRate, Msaa, Rasterizer, ResourceType, ShaderStages,
    TextureRange, Topology, VertexFormat,
};
use crate::utils::Handle;

// ---- Info structs (construction input) -----------------------------------

/// Registers a driver-allocated buffer with the engine. Allocation itself is
/// the caller's job.
#[derive(Debug, Clone)]
pub struct BufferInfo<'a> {
    pub debug_name: &'a str,
    pub raw: RawHandle,
    pub size: u64,
}

#[derive(Debug, Clone)]
pub struct TextureInfo<'a> {
    pub debug_name: &'a str,
    pub raw: RawHandle,
    pub format: Format,
    pub mip_levels: u32,
    pub layers: u32,
}

#[derive(Debug, Clone)]
pub struct SamplerInfo<'a> {
    pub debug_name: &'a str,
    pub raw: RawHandle,
}

#[derive(Debug, Clone)]
pub struct RenderTargetInfo<'a> {
    pub debug_name: &'a str,
    pub raw: RawHandle,
    pub size: [u32; 2],
}

#[derive(Debug, Clone)]
pub struct PipelineInfo<'a> {
    pub debug_name: &'a str,
    /// Linked program object, compiled by the caller.
    pub program: RawHandle,
    pub stages: ShaderStages,
    pub topology: Topology,
    pub rasterizer: Rasterizer,
    pub blend: BlendState,
    pub msaa: Msaa,
}

impl Default for PipelineInfo<'_> {
    fn default() -> Self {
        Self {
            debug_name: "",
            program: 0,
            stages: ShaderStages::VERTEX | ShaderStages::FRAGMENT,
            topology: Default::default(),
            rasterizer: Default::default(),
            blend: Default::default(),
            msaa: Default::default(),
        }
    }
}

/// One logical slot of a descriptor layout: which namespace and local slot it
/// binds into, and which global resource id fills it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorSlot {
    pub local_slot: u32,
    pub global_id: u32,
    pub ty: ResourceType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureSlot {
    pub texture: Handle<Texture>,
    pub range: TextureRange,
}

/// Closed variant over the resource kinds a descriptor slot can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceSlot {
    Buffer {
        buffer: Handle<Buffer>,
        offset: u64,
        size: u64,
    },
    Sampler {
        sampler: Handle<Sampler>,
        texture: Option<TextureSlot>,
    },
    Texture(TextureSlot),
}

#[derive(Debug, Clone)]
pub struct DescriptorsInfo<'a> {
    pub debug_name: &'a str,
    pub layout: &'a [DescriptorSlot],
    pub resources: &'a [(u32, ResourceSlot)],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub location: u32,
    pub format: VertexFormat,
    pub offset: u32,
}

#[derive(Debug, Clone)]
pub struct VertexBufferLayout {
    pub buffer: Handle<Buffer>,
    pub offset: u64,
    pub stride: u32,
    pub rate: InputRate,
    pub attributes: Vec<VertexAttribute>,
}

#[derive(Debug, Clone, Copy)]
pub struct IndexBufferLayout {
    pub buffer: Handle<Buffer>,
    pub ty: IndexType,
}

#[derive(Debug, Clone)]
pub struct PrimitiveBufferInfo<'a> {
    pub debug_name: &'a str,
    pub vertex_buffers: &'a [VertexBufferLayout],
    pub index: Option<IndexBufferLayout>,
}

// ---- Stored objects --------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Buffer {
    pub(crate) name: String,
    pub(crate) raw: RawHandle,
    pub(crate) size: u64,
}

#[derive(Debug, Clone)]
pub struct Texture {
    pub(crate) name: String,
    pub(crate) raw: RawHandle,
    pub(crate) format: Format,
    pub(crate) mip_levels: u32,
    pub(crate) layers: u32,
}

#[derive(Debug, Clone)]
pub struct Sampler {
    pub(crate) name: String,
    pub(crate) raw: RawHandle,
}

#[derive(Debug, Clone)]
pub struct RenderTarget {
    pub(crate) name: String,
    pub(crate) raw: RawHandle,
    pub(crate) size: [u32; 2],
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    pub(crate) name: String,
    pub(crate) program: RawHandle,
    pub(crate) stages: ShaderStages,
    pub(crate) topology: Topology,
    pub(crate) rasterizer: Rasterizer,
    pub(crate) blend: BlendState,
    pub(crate) msaa: Msaa,
}

impl Pipeline {
    pub(crate) fn is_compute(&self) -> bool {
        self.stages.contains(ShaderStages::COMPUTE)
    }
}

#[derive(Debug, Clone)]
pub struct Descriptors {
    pub(crate) name: String,
    pub(crate) layout: Vec<DescriptorSlot>,
    pub(crate) resources: HashMap<u32, ResourceSlot>,
}

#[derive(Debug, Clone)]
pub struct PrimitiveBuffer {
    pub(crate) name: String,
    pub(crate) vertex_buffers: Vec<VertexBufferLayout>,
    pub(crate) index: Option<IndexBufferLayout>,
}

// ---- Pure configuration checks --------------------------------------------

pub(crate) fn validate_stages(name: &str, stages: ShaderStages) -> Result<()> {
    let valid = if stages.contains(ShaderStages::COMPUTE) {
        stages == ShaderStages::COMPUTE
    } else {
        stages.contains(ShaderStages::VERTEX)
    };

    if valid {
        Ok(())
    } else {
        Err(GPUError::InvalidStageCombination {
            name: name.to_string(),
        })
    }
}

pub(crate) fn validate_layout(name: &str, layout: &[DescriptorSlot]) -> Result<()> {
    for (i, slot) in layout.iter().enumerate() {
        let dup = layout[..i]
            .iter()
            .any(|other| other.ty == slot.ty && other.local_slot == slot.local_slot);
        if dup {
            return Err(GPUError::DuplicateSlot {
                name: name.to_string(),
                slot: slot.local_slot,
            });
        }
    }
    Ok(())
}

/// Slot-type vs. resource-kind check for one layout entry. `None` resources
/// (unmatched global ids) never reach this.
pub(crate) fn resource_matches_slot(ty: ResourceType, res: &ResourceSlot) -> bool {
    matches!(
        (ty, res),
        (
            ResourceType::UniformBuffer | ResourceType::StorageBuffer,
            ResourceSlot::Buffer { .. }
        ) | (ResourceType::Sampler, ResourceSlot::Sampler { .. })
            | (
                ResourceType::SampledTexture | ResourceType::StorageImage,
                ResourceSlot::Texture(_)
            )
    )
}
