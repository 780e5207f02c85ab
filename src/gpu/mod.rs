pub mod commands;
pub mod device;
pub mod driver;
pub mod error;
pub mod execution;
pub mod objects;
pub mod types;

pub use commands::{Command, DrawInstanced};
pub use device::Graphics;
pub use driver::{
    forward_driver_message, Driver, MessageKind, MessageSeverity, MessageSource, NullDriver,
    ObjectKind, RawHandle,
};
pub use error::{GPUError, Result};
pub use objects::{
    Buffer, BufferInfo, DescriptorSlot, Descriptors, DescriptorsInfo, IndexBufferLayout, Pipeline,
    PipelineInfo, PrimitiveBuffer, PrimitiveBufferInfo, RenderTarget, RenderTargetInfo,
    ResourceSlot, Sampler, SamplerInfo, Texture, TextureInfo, TextureSlot, VertexAttribute,
    VertexBufferLayout,
};
pub use types::*;
