#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::thread::{self, ThreadId};

use glint::gpu::driver::{Driver, ObjectKind, RawHandle};
use glint::gpu::types::{
    BlendFactor, BlendOp, BlitMask, BufferBindClass, ClearFlags, CullMode, FillMode, Filter,
    Format, IndexType, LogicOp, TextureRange, TextureViewType, Topology, VertexFormat, WindMode,
    WriteMask,
};

/// Routes `log` output through the test harness's capture.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// One recorded driver call, in issue order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    UseProgram(RawHandle),
    SetCullEnable(bool),
    SetCullFace(CullMode),
    SetFrontFace(WindMode),
    SetFillMode(FillMode),
    SetWriteMask(WriteMask),
    SetMinSampleShadingEnable(bool),
    SetMinSampleShading(f32),
    SetBlendEnable(bool),
    SetBlendConstants([f32; 4]),
    SetLogicOp(LogicOp),
    SetBlendEquation(BlendOp, BlendOp),
    SetBlendFactors(BlendFactor, BlendFactor, BlendFactor, BlendFactor),

    BindBufferRange {
        class: BufferBindClass,
        slot: u32,
        buffer: RawHandle,
        offset: u64,
        size: u64,
    },
    BindSampler {
        slot: u32,
        sampler: RawHandle,
    },
    BindTextureUnit {
        slot: u32,
        view: RawHandle,
    },
    BindImageUnit {
        slot: u32,
        view: RawHandle,
        format: Format,
    },

    CreateTextureView(RawHandle),
    DeleteTextureView(RawHandle),
    CreateVertexArray(RawHandle),
    SetVertexBuffer {
        vao: RawHandle,
        binding: u32,
        buffer: RawHandle,
        offset: u64,
        stride: u32,
    },
    SetVertexAttribute {
        vao: RawHandle,
        location: u32,
        binding: u32,
        format: VertexFormat,
        offset: u32,
        per_instance: bool,
    },
    SetIndexBuffer {
        vao: RawHandle,
        buffer: RawHandle,
    },
    DeleteVertexArray(RawHandle),
    BindVertexArray(RawHandle),

    BindDrawFramebuffer(RawHandle),
    SetViewport {
        offset: [i32; 2],
        size: [u32; 2],
    },
    SetScissorEnable(bool),
    SetScissor {
        offset: [i32; 2],
        size: [u32; 2],
    },
    SetClearColor([f32; 4]),
    SetClearDepth(f32),
    SetClearStencil(u32),
    Clear(ClearFlags),
    Blit {
        src: RawHandle,
        dst: RawHandle,
        mask: BlitMask,
        filter: Filter,
    },

    DrawInstanced {
        topology: Topology,
        first: u32,
        count: u32,
        instances: u32,
        first_instance: u32,
    },
    DrawIndexed {
        topology: Topology,
        ty: IndexType,
        first: u32,
        count: u32,
        instances: u32,
        first_instance: u32,
        vertex_offset: i32,
    },
    Dispatch([u32; 3]),

    LabelObject {
        kind: ObjectKind,
        handle: RawHandle,
        label: String,
    },
    PushDebugGroup(String),
    InsertDebugMarker(String),
    PopDebugGroup,
}

/// Backend that records every call it receives along with the issuing thread.
///
/// Created derived objects get ids from 1000 upward so they never collide with
/// the raw handles tests pick for registered objects.
pub struct RecordingDriver {
    calls: Mutex<Vec<(ThreadId, Call)>>,
    next_raw: AtomicU32,
}

impl Default for RecordingDriver {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            next_raw: AtomicU32::new(1000),
        }
    }
}

impl RecordingDriver {
    fn record(&self, call: Call) {
        self.calls
            .lock()
            .unwrap()
            .push((thread::current().id(), call));
    }

    fn allocate(&self) -> RawHandle {
        self.next_raw.fetch_add(1, Ordering::Relaxed)
    }

    /// All calls so far, in order, thread ids dropped.
    pub fn calls(&self) -> Vec<Call> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, c)| c.clone())
            .collect()
    }

    /// Drains the recording; the next assertion starts from a clean slate.
    pub fn take_calls(&self) -> Vec<Call> {
        self.calls
            .lock()
            .unwrap()
            .drain(..)
            .map(|(_, c)| c)
            .collect()
    }

    /// Calls issued by a specific thread, in order.
    pub fn calls_on(&self, thread: ThreadId) -> Vec<Call> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == thread)
            .map(|(_, c)| c.clone())
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, c)| pred(c))
            .count()
    }
}

impl Driver for RecordingDriver {
    fn use_program(&self, program: RawHandle) {
        self.record(Call::UseProgram(program));
    }
    fn set_cull_enable(&self, enable: bool) {
        self.record(Call::SetCullEnable(enable));
    }
    fn set_cull_face(&self, face: CullMode) {
        self.record(Call::SetCullFace(face));
    }
    fn set_front_face(&self, winding: WindMode) {
        self.record(Call::SetFrontFace(winding));
    }
    fn set_fill_mode(&self, fill: FillMode) {
        self.record(Call::SetFillMode(fill));
    }
    fn set_write_mask(&self, mask: WriteMask) {
        self.record(Call::SetWriteMask(mask));
    }
    fn set_min_sample_shading_enable(&self, enable: bool) {
        self.record(Call::SetMinSampleShadingEnable(enable));
    }
    fn set_min_sample_shading(&self, value: f32) {
        self.record(Call::SetMinSampleShading(value));
    }
    fn set_blend_enable(&self, enable: bool) {
        self.record(Call::SetBlendEnable(enable));
    }
    fn set_blend_constants(&self, rgba: [f32; 4]) {
        self.record(Call::SetBlendConstants(rgba));
    }
    fn set_logic_op(&self, op: LogicOp) {
        self.record(Call::SetLogicOp(op));
    }
    fn set_blend_equation(&self, color: BlendOp, alpha: BlendOp) {
        self.record(Call::SetBlendEquation(color, alpha));
    }
    fn set_blend_factors(
        &self,
        src_color: BlendFactor,
        dst_color: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    ) {
        self.record(Call::SetBlendFactors(src_color, dst_color, src_alpha, dst_alpha));
    }

    fn bind_buffer_range(
        &self,
        class: BufferBindClass,
        slot: u32,
        buffer: RawHandle,
        offset: u64,
        size: u64,
    ) {
        self.record(Call::BindBufferRange {
            class,
            slot,
            buffer,
            offset,
            size,
        });
    }
    fn bind_sampler(&self, slot: u32, sampler: RawHandle) {
        self.record(Call::BindSampler { slot, sampler });
    }
    fn bind_texture_unit(&self, slot: u32, view: RawHandle) {
        self.record(Call::BindTextureUnit { slot, view });
    }
    fn bind_image_unit(&self, slot: u32, view: RawHandle, format: Format) {
        self.record(Call::BindImageUnit { slot, view, format });
    }

    fn create_texture_view(
        &self,
        _texture: RawHandle,
        _view_type: TextureViewType,
        _format: Format,
        _range: TextureRange,
    ) -> RawHandle {
        let view = self.allocate();
        self.record(Call::CreateTextureView(view));
        view
    }
    fn delete_texture_view(&self, view: RawHandle) {
        self.record(Call::DeleteTextureView(view));
    }

    fn create_vertex_array(&self) -> RawHandle {
        let vao = self.allocate();
        self.record(Call::CreateVertexArray(vao));
        vao
    }
    fn set_vertex_buffer(
        &self,
        vertex_array: RawHandle,
        binding: u32,
        buffer: RawHandle,
        offset: u64,
        stride: u32,
    ) {
        self.record(Call::SetVertexBuffer {
            vao: vertex_array,
            binding,
            buffer,
            offset,
            stride,
        });
    }
    fn set_vertex_attribute(
        &self,
        vertex_array: RawHandle,
        location: u32,
        binding: u32,
        format: VertexFormat,
        offset: u32,
        per_instance: bool,
    ) {
        self.record(Call::SetVertexAttribute {
            vao: vertex_array,
            location,
            binding,
            format,
            offset,
            per_instance,
        });
    }
    fn set_index_buffer(&self, vertex_array: RawHandle, buffer: RawHandle) {
        self.record(Call::SetIndexBuffer {
            vao: vertex_array,
            buffer,
        });
    }
    fn delete_vertex_array(&self, vertex_array: RawHandle) {
        self.record(Call::DeleteVertexArray(vertex_array));
    }
    fn bind_vertex_array(&self, vertex_array: RawHandle) {
        self.record(Call::BindVertexArray(vertex_array));
    }

    fn bind_draw_framebuffer(&self, framebuffer: RawHandle) {
        self.record(Call::BindDrawFramebuffer(framebuffer));
    }
    fn set_viewport(&self, offset: [i32; 2], size: [u32; 2]) {
        self.record(Call::SetViewport { offset, size });
    }
    fn set_scissor_enable(&self, enable: bool) {
        self.record(Call::SetScissorEnable(enable));
    }
    fn set_scissor(&self, offset: [i32; 2], size: [u32; 2]) {
        self.record(Call::SetScissor { offset, size });
    }
    fn set_clear_color(&self, rgba: [f32; 4]) {
        self.record(Call::SetClearColor(rgba));
    }
    fn set_clear_depth(&self, depth: f32) {
        self.record(Call::SetClearDepth(depth));
    }
    fn set_clear_stencil(&self, stencil: u32) {
        self.record(Call::SetClearStencil(stencil));
    }
    fn clear(&self, flags: ClearFlags) {
        self.record(Call::Clear(flags));
    }
    fn blit_framebuffer(
        &self,
        src: RawHandle,
        dst: RawHandle,
        _src_area: [u32; 4],
        _dst_area: [u32; 4],
        mask: BlitMask,
        filter: Filter,
    ) {
        self.record(Call::Blit {
            src,
            dst,
            mask,
            filter,
        });
    }

    fn draw_instanced(
        &self,
        topology: Topology,
        first_vertex: u32,
        count: u32,
        instance_count: u32,
        first_instance: u32,
    ) {
        self.record(Call::DrawInstanced {
            topology,
            first: first_vertex,
            count,
            instances: instance_count,
            first_instance,
        });
    }
    fn draw_indexed_instanced(
        &self,
        topology: Topology,
        index_type: IndexType,
        first_index: u32,
        count: u32,
        instance_count: u32,
        first_instance: u32,
        vertex_offset: i32,
    ) {
        self.record(Call::DrawIndexed {
            topology,
            ty: index_type,
            first: first_index,
            count,
            instances: instance_count,
            first_instance,
            vertex_offset,
        });
    }
    fn dispatch(&self, groups: [u32; 3]) {
        self.record(Call::Dispatch(groups));
    }

    fn label_object(&self, kind: ObjectKind, handle: RawHandle, label: &str) {
        self.record(Call::LabelObject {
            kind,
            handle,
            label: label.to_string(),
        });
    }
    fn push_debug_group(&self, label: &str) {
        self.record(Call::PushDebugGroup(label.to_string()));
    }
    fn insert_debug_marker(&self, label: &str) {
        self.record(Call::InsertDebugMarker(label.to_string()));
    }
    fn pop_debug_group(&self) {
        self.record(Call::PopDebugGroup);
    }
}
