use log::{debug, error, info, warn, Level};

use super::types::{
    BlendFactor, BlendOp, BlitMask, BufferBindClass, ClearFlags, CullMode, FillMode, Filter,
    Format, IndexType, LogicOp, TextureRange, TextureViewType, Topology, VertexFormat, WindMode,
    WriteMask,
};

/// Raw driver-side object name (GL-style integer id).
pub type RawHandle = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Texture,
    VertexArray,
}

/// The closed set of state-changing calls the engine is allowed to issue.
///
/// Every method is synchronous with respect to the calling thread, and nothing
/// in the engine reaches a backend except through this trait. Redundant-call
/// elimination happens *above* this boundary; an implementation may assume each
/// call it receives is a real state transition.
pub trait Driver: Send + Sync {
    // --- program + fixed-function pipeline state ---

    fn use_program(&self, program: RawHandle);
    fn set_cull_enable(&self, enable: bool);
    /// Only called with `Front` or `Back`; `None` is expressed via
    /// [`Driver::set_cull_enable`].
    fn set_cull_face(&self, face: CullMode);
    fn set_front_face(&self, winding: WindMode);
    fn set_fill_mode(&self, fill: FillMode);
    fn set_write_mask(&self, mask: WriteMask);
    fn set_min_sample_shading_enable(&self, enable: bool);
    fn set_min_sample_shading(&self, value: f32);
    fn set_blend_enable(&self, enable: bool);
    fn set_blend_constants(&self, rgba: [f32; 4]);
    fn set_logic_op(&self, op: LogicOp);
    fn set_blend_equation(&self, color: BlendOp, alpha: BlendOp);
    fn set_blend_factors(
        &self,
        src_color: BlendFactor,
        dst_color: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    );

    // --- resource bind points ---

    fn bind_buffer_range(
        &self,
        class: BufferBindClass,
        slot: u32,
        buffer: RawHandle,
        offset: u64,
        size: u64,
    );
    fn bind_sampler(&self, slot: u32, sampler: RawHandle);
    fn bind_texture_unit(&self, slot: u32, view: RawHandle);
    fn bind_image_unit(&self, slot: u32, view: RawHandle, format: Format);

    // --- derived objects ---

    fn create_texture_view(
        &self,
        texture: RawHandle,
        view_type: TextureViewType,
        format: Format,
        range: TextureRange,
    ) -> RawHandle;
    fn delete_texture_view(&self, view: RawHandle);

    fn create_vertex_array(&self) -> RawHandle;
    fn set_vertex_buffer(
        &self,
        vertex_array: RawHandle,
        binding: u32,
        buffer: RawHandle,
        offset: u64,
        stride: u32,
    );
    fn set_vertex_attribute(
        &self,
        vertex_array: RawHandle,
        location: u32,
        binding: u32,
        format: VertexFormat,
        offset: u32,
        per_instance: bool,
    );
    fn set_index_buffer(&self, vertex_array: RawHandle, buffer: RawHandle);
    fn delete_vertex_array(&self, vertex_array: RawHandle);
    fn bind_vertex_array(&self, vertex_array: RawHandle);

    // --- render target + dynamic state ---

    fn bind_draw_framebuffer(&self, framebuffer: RawHandle);
    fn set_viewport(&self, offset: [i32; 2], size: [u32; 2]);
    fn set_scissor_enable(&self, enable: bool);
    fn set_scissor(&self, offset: [i32; 2], size: [u32; 2]);
    fn set_clear_color(&self, rgba: [f32; 4]);
    fn set_clear_depth(&self, depth: f32);
    fn set_clear_stencil(&self, stencil: u32);
    fn clear(&self, flags: ClearFlags);
    /// Named-object blit. Leaves `src`/`dst` bound as the read/draw
    /// framebuffers; the engine records both in its binding cache.
    fn blit_framebuffer(
        &self,
        src: RawHandle,
        dst: RawHandle,
        src_area: [u32; 4],
        dst_area: [u32; 4],
        mask: BlitMask,
        filter: Filter,
    );

    // --- draws ---

    fn draw_instanced(
        &self,
        topology: Topology,
        first_vertex: u32,
        count: u32,
        instance_count: u32,
        first_instance: u32,
    );
    #[allow(clippy::too_many_arguments)]
    fn draw_indexed_instanced(
        &self,
        topology: Topology,
        index_type: IndexType,
        first_index: u32,
        count: u32,
        instance_count: u32,
        first_instance: u32,
        vertex_offset: i32,
    );
    fn dispatch(&self, groups: [u32; 3]);

    // --- debug ---

    fn label_object(&self, kind: ObjectKind, handle: RawHandle, label: &str) {
        let _ = (kind, handle, label);
    }
    fn push_debug_group(&self, label: &str) {
        let _ = label;
    }
    fn insert_debug_marker(&self, label: &str) {
        let _ = label;
    }
    fn pop_debug_group(&self) {}
}

/// No-op backend. Useful as a reference implementation and for dry-running
/// command streams.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDriver;

impl Driver for NullDriver {
    fn use_program(&self, _: RawHandle) {}
    fn set_cull_enable(&self, _: bool) {}
    fn set_cull_face(&self, _: CullMode) {}
    fn set_front_face(&self, _: WindMode) {}
    fn set_fill_mode(&self, _: FillMode) {}
    fn set_write_mask(&self, _: WriteMask) {}
    fn set_min_sample_shading_enable(&self, _: bool) {}
    fn set_min_sample_shading(&self, _: f32) {}
    fn set_blend_enable(&self, _: bool) {}
    fn set_blend_constants(&self, _: [f32; 4]) {}
    fn set_logic_op(&self, _: LogicOp) {}
    fn set_blend_equation(&self, _: BlendOp, _: BlendOp) {}
    fn set_blend_factors(&self, _: BlendFactor, _: BlendFactor, _: BlendFactor, _: BlendFactor) {}

    fn bind_buffer_range(&self, _: BufferBindClass, _: u32, _: RawHandle, _: u64, _: u64) {}
    fn bind_sampler(&self, _: u32, _: RawHandle) {}
    fn bind_texture_unit(&self, _: u32, _: RawHandle) {}
    fn bind_image_unit(&self, _: u32, _: RawHandle, _: Format) {}

    fn create_texture_view(
        &self,
        _: RawHandle,
        _: TextureViewType,
        _: Format,
        _: TextureRange,
    ) -> RawHandle {
        0
    }
    fn delete_texture_view(&self, _: RawHandle) {}

    fn create_vertex_array(&self) -> RawHandle {
        0
    }
    fn set_vertex_buffer(&self, _: RawHandle, _: u32, _: RawHandle, _: u64, _: u32) {}
    fn set_vertex_attribute(&self, _: RawHandle, _: u32, _: u32, _: VertexFormat, _: u32, _: bool) {
    }
    fn set_index_buffer(&self, _: RawHandle, _: RawHandle) {}
    fn delete_vertex_array(&self, _: RawHandle) {}
    fn bind_vertex_array(&self, _: RawHandle) {}

    fn bind_draw_framebuffer(&self, _: RawHandle) {}
    fn set_viewport(&self, _: [i32; 2], _: [u32; 2]) {}
    fn set_scissor_enable(&self, _: bool) {}
    fn set_scissor(&self, _: [i32; 2], _: [u32; 2]) {}
    fn set_clear_color(&self, _: [f32; 4]) {}
    fn set_clear_depth(&self, _: f32) {}
    fn set_clear_stencil(&self, _: u32) {}
    fn clear(&self, _: ClearFlags) {}
    fn blit_framebuffer(
        &self,
        _: RawHandle,
        _: RawHandle,
        _: [u32; 4],
        _: [u32; 4],
        _: BlitMask,
        _: Filter,
    ) {
    }

    fn draw_instanced(&self, _: Topology, _: u32, _: u32, _: u32, _: u32) {}
    fn draw_indexed_instanced(&self, _: Topology, _: IndexType, _: u32, _: u32, _: u32, _: u32, _: i32) {
    }
    fn dispatch(&self, _: [u32; 3]) {}
}

/// Origin a backend attributes an asynchronous diagnostic to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSource {
    Api,
    WindowSystem,
    ShaderCompiler,
    ThirdParty,
    Application,
    Other,
}

impl MessageSource {
    fn as_str(self) -> &'static str {
        match self {
            MessageSource::Api => "API",
            MessageSource::WindowSystem => "window system",
            MessageSource::ShaderCompiler => "shader compiler",
            MessageSource::ThirdParty => "third party",
            MessageSource::Application => "app",
            MessageSource::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Error,
    DeprecatedBehavior,
    UndefinedBehavior,
    Portability,
    Performance,
    Other,
}

impl MessageKind {
    fn as_str(self) -> &'static str {
        match self {
            MessageKind::Error => "error",
            MessageKind::DeprecatedBehavior => "deprecated behavior",
            MessageKind::UndefinedBehavior => "undefined behavior",
            MessageKind::Portability => "portability",
            MessageKind::Performance => "performance",
            MessageKind::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSeverity {
    High,
    Medium,
    Low,
    Notification,
}

/// Forwards a driver-reported diagnostic to the `log` facade.
///
/// Performance-kind messages always log under the `glint::performance` target
/// at their own level, whatever severity the driver assigned them.
pub fn forward_driver_message(
    source: MessageSource,
    kind: MessageKind,
    severity: MessageSeverity,
    message: &str,
) {
    if kind == MessageKind::Performance {
        log::log!(
            target: "glint::performance",
            Level::Warn,
            "driver ({}): {}",
            source.as_str(),
            message
        );
        return;
    }

    match severity {
        MessageSeverity::High => {
            error!("driver ({}) {}: {}", source.as_str(), kind.as_str(), message)
        }
        MessageSeverity::Medium => {
            warn!("driver ({}) {}: {}", source.as_str(), kind.as_str(), message)
        }
        MessageSeverity::Low => {
            info!("driver ({}) {}: {}", source.as_str(), kind.as_str(), message)
        }
        MessageSeverity::Notification => {
            debug!("driver ({}) {}: {}", source.as_str(), kind.as_str(), message)
        }
    }
}
