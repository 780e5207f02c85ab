use bitflags::bitflags;

#[cfg(feature = "glint-serde")]
use serde::{Deserialize, Serialize};

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "glint-serde", derive(Serialize, Deserialize))]
pub enum CullMode {
    None,
    Front,
    #[default]
    Back,
}

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "glint-serde", derive(Serialize, Deserialize))]
pub enum WindMode {
    #[default]
    Ccw,
    Cw,
}

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "glint-serde", derive(Serialize, Deserialize))]
pub enum FillMode {
    #[default]
    Fill,
    Wireframe,
}

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "glint-serde", derive(Serialize, Deserialize))]
pub enum Topology {
    PointList,
    LineList,
    LineStrip,
    #[default]
    TriangleList,
    TriangleStrip,
}

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "glint-serde", derive(Serialize, Deserialize))]
pub enum BlendOp {
    #[default]
    Add,
    Subtract,
    RevSubtract,
    Min,
    Max,
}

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "glint-serde", derive(Serialize, Deserialize))]
pub enum BlendFactor {
    Zero,
    One,
    Src,
    InvSrc,
    Dst,
    InvDst,
    SrcAlpha,
    InvSrcAlpha,
    DstAlpha,
    InvDstAlpha,
    Constant,
    InvConstant,
    ConstantAlpha,
    InvConstantAlpha,
    SrcAlphaSaturate,
    Src1,
    InvSrc1,
    Src1Alpha,
    InvSrc1Alpha,
}

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "glint-serde", derive(Serialize, Deserialize))]
pub enum LogicOp {
    Clear,
    And,
    AndRev,
    Copy,
    AndInv,
    #[default]
    NoOp,
    Xor,
    Or,
    Nor,
    Equiv,
    Inv,
    OrRev,
    CopyInv,
    OrInv,
    Nand,
    Set,
}

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "glint-serde", derive(Serialize, Deserialize))]
pub enum IndexType {
    U16,
    #[default]
    U32,
}

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "glint-serde", derive(Serialize, Deserialize))]
pub enum Filter {
    #[default]
    Nearest,
    Linear,
}

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "glint-serde", derive(Serialize, Deserialize))]
pub enum Format {
    R8,
    RG8,
    #[default]
    RGBA8,
    RGBA8Snorm,
    R16F,
    RGBA16F,
    R32F,
    RGBA32F,
    R32U,
    RGBA32U,
    SRGBA8,
}

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "glint-serde", derive(Serialize, Deserialize))]
pub enum VertexFormat {
    F32,
    F32x2,
    #[default]
    F32x3,
    F32x4,
    U8x4Norm,
    U16x2,
    U32,
    I32,
}

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "glint-serde", derive(Serialize, Deserialize))]
pub enum InputRate {
    #[default]
    Vertex,
    Instance,
}

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "glint-serde", derive(Serialize, Deserialize))]
pub enum TextureViewType {
    Texture1D,
    #[default]
    Texture2D,
    Texture3D,
    Cube,
    Texture1DArray,
    Texture2DArray,
    CubeArray,
    Multisample,
    MultisampleArray,
}

/// Namespace a descriptor slot binds into. Doubles as the binding-cache key
/// class, so a buffer at slot N and a texture at slot N never collide.
#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "glint-serde", derive(Serialize, Deserialize))]
pub enum ResourceType {
    UniformBuffer,
    StorageBuffer,
    Sampler,
    SampledTexture,
    StorageImage,
}

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "glint-serde", derive(Serialize, Deserialize))]
pub enum BufferBindClass {
    Uniform,
    Storage,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "glint-serde", derive(Serialize, Deserialize))]
    pub struct WriteMask: u8 {
        const R = 0x1;
        const G = 0x2;
        const B = 0x4;
        const A = 0x8;
    }
}

impl Default for WriteMask {
    fn default() -> Self {
        WriteMask::all()
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "glint-serde", derive(Serialize, Deserialize))]
    pub struct ClearFlags: u8 {
        const COLOR = 0x1;
        const DEPTH = 0x2;
        const STENCIL = 0x4;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "glint-serde", derive(Serialize, Deserialize))]
    pub struct BlitMask: u8 {
        const COLOR = 0x1;
        const DEPTH = 0x2;
        const STENCIL = 0x4;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "glint-serde", derive(Serialize, Deserialize))]
    pub struct ShaderStages: u8 {
        const VERTEX = 0x01;
        const TESS_CTRL = 0x02;
        const TESS_EVAL = 0x04;
        const GEOMETRY = 0x08;
        const FRAGMENT = 0x10;
        const COMPUTE = 0x20;
    }
}

/// Mip/layer sub-range plus the view type a derived texture view is built with.
#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "glint-serde", derive(Serialize, Deserialize))]
pub struct TextureRange {
    pub base_mip: u32,
    pub mip_count: u32,
    pub base_layer: u32,
    pub layer_count: u32,
    pub view_type: TextureViewType,
}

impl Default for TextureRange {
    fn default() -> Self {
        Self {
            base_mip: 0,
            mip_count: 1,
            base_layer: 0,
            layer_count: 1,
            view_type: Default::default(),
        }
    }
}

/// Viewport or scissor rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "glint-serde", derive(Serialize, Deserialize))]
pub struct Region {
    pub offset: [i32; 2],
    pub size: [u32; 2],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "glint-serde", derive(Serialize, Deserialize))]
pub struct Rasterizer {
    pub cull: CullMode,
    pub winding: WindMode,
    pub fill: FillMode,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self {
            cull: CullMode::Back,
            winding: WindMode::Ccw,
            fill: FillMode::Fill,
        }
    }
}

impl Rasterizer {
    /// Shadow values matching the driver's reset state: culling off.
    pub(crate) fn driver_reset() -> Self {
        Self {
            cull: CullMode::None,
            winding: WindMode::Ccw,
            fill: FillMode::Fill,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "glint-serde", derive(Serialize, Deserialize))]
pub struct BlendState {
    pub enable: bool,
    pub constants: [f32; 4],
    pub logic_op: LogicOp,
    pub write_mask: WriteMask,
    pub color_op: BlendOp,
    pub alpha_op: BlendOp,
    pub src_color: BlendFactor,
    pub dst_color: BlendFactor,
    pub src_alpha: BlendFactor,
    pub dst_alpha: BlendFactor,
}

impl Default for BlendState {
    fn default() -> Self {
        Self {
            enable: false,
            constants: [0.0; 4],
            logic_op: LogicOp::NoOp,
            write_mask: WriteMask::all(),
            color_op: BlendOp::Add,
            alpha_op: BlendOp::Add,
            src_color: BlendFactor::Zero,
            dst_color: BlendFactor::One,
            src_alpha: BlendFactor::Zero,
            dst_alpha: BlendFactor::One,
        }
    }
}

impl BlendState {
    pub fn alpha_blend() -> Self {
        Self {
            enable: true,
            color_op: BlendOp::Add,
            alpha_op: BlendOp::Add,
            src_color: BlendFactor::One,
            dst_color: BlendFactor::InvSrcAlpha,
            src_alpha: BlendFactor::One,
            dst_alpha: BlendFactor::InvSrcAlpha,
            ..Default::default()
        }
    }

    /// Dual-source blend, e.g. subpixel text rendering.
    pub fn subpixel_alpha_blend() -> Self {
        Self {
            enable: true,
            color_op: BlendOp::Add,
            alpha_op: BlendOp::Add,
            src_color: BlendFactor::Src1,
            dst_color: BlendFactor::InvSrc1,
            src_alpha: BlendFactor::Src1Alpha,
            dst_alpha: BlendFactor::InvSrc1Alpha,
            ..Default::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "glint-serde", derive(Serialize, Deserialize))]
pub struct Msaa {
    pub samples: u32,
    /// 0 = off, closer to one is smoother.
    pub min_sample_shading: f32,
}

impl Default for Msaa {
    fn default() -> Self {
        Self {
            samples: 1,
            min_sample_shading: 0.0,
        }
    }
}
