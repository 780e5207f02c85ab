use thiserror::Error;

/// Failure modes of the engine.
///
/// Configuration errors surface at object construction (or descriptor update),
/// invariant violations at command execution. Nothing in here is retried; the
/// failing operation stops and the driver state is left where it was.
#[derive(Debug, Error)]
pub enum GPUError {
    #[error("invalid or destroyed {0} handle")]
    InvalidHandle(&'static str),

    #[error("object pool for {0} is out of slots")]
    OutOfSlots(&'static str),

    #[error("pipeline '{name}' has an unsupported shader stage combination")]
    InvalidStageCombination { name: String },

    #[error("descriptor set '{name}' declares slot {slot} twice for the same bind class")]
    DuplicateSlot { name: String, slot: u32 },

    #[error("descriptor set '{name}' global id {global_id}: resource kind does not match the slot type")]
    SlotTypeMismatch { name: String, global_id: u32 },

    #[error("descriptor set '{name}' global id {global_id}: range {offset}+{size} exceeds buffer size {buffer_size}")]
    BufferRangeOutOfBounds {
        name: String,
        global_id: u32,
        offset: u64,
        size: u64,
        buffer_size: u64,
    },

    #[error("descriptor set '{name}' global id {global_id}: view range exceeds the texture's {mips} mips / {layers} layers")]
    TextureRangeOutOfBounds {
        name: String,
        global_id: u32,
        mips: u32,
        layers: u32,
    },

    #[error("primitive buffer '{name}' requires at least one vertex buffer")]
    EmptyVertexLayout { name: String },

    #[error("viewport/scissor with an implicit size requires a bound render target")]
    NoRenderTargetBound,

    #[error("draw requires a graphics pipeline to be bound")]
    NoPipelineBound,

    #[error("draw cannot run with a compute pipeline bound")]
    DrawRequiresGraphicsPipeline,

    #[error("draw requires a vertex input to be bound")]
    NoVertexInputBound,

    #[error("indexed draw requires the bound vertex input to carry an index buffer")]
    NoIndexBuffer,

    #[error("dispatch requires a compute pipeline to be bound")]
    DispatchRequiresComputePipeline,
}

pub type Result<T, E = GPUError> = std::result::Result<T, E>;
