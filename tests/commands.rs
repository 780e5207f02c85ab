mod common;

use common::{Call, RecordingDriver};
use glint::gpu::objects::{
    BufferInfo, IndexBufferLayout, PipelineInfo, PrimitiveBufferInfo, RenderTargetInfo,
    VertexAttribute, VertexBufferLayout,
};
use glint::gpu::types::{BlitMask, ClearFlags, Filter, IndexType, ShaderStages, Topology};
use glint::gpu::{Command, DrawInstanced, GPUError, Graphics};

fn device() -> Graphics<RecordingDriver> {
    common::init_logging();
    Graphics::new(RecordingDriver::default())
}

fn render_target(gpu: &Graphics<RecordingDriver>, raw: u32) -> glint::Handle<glint::RenderTarget> {
    gpu.make_render_target(&RenderTargetInfo {
        debug_name: "offscreen",
        raw,
        size: [800, 600],
    })
    .unwrap()
}

fn vertex_input(
    gpu: &Graphics<RecordingDriver>,
    indexed: bool,
) -> glint::Handle<glint::PrimitiveBuffer> {
    let verts = gpu
        .make_buffer(&BufferInfo {
            debug_name: "verts",
            raw: 41,
            size: 4096,
        })
        .unwrap();
    let index = indexed.then(|| {
        let ib = gpu
            .make_buffer(&BufferInfo {
                debug_name: "indices",
                raw: 42,
                size: 1024,
            })
            .unwrap();
        IndexBufferLayout {
            buffer: ib,
            ty: IndexType::U16,
        }
    });

    gpu.make_primitive_buffer(&PrimitiveBufferInfo {
        debug_name: "mesh",
        vertex_buffers: &[VertexBufferLayout {
            buffer: verts,
            offset: 0,
            stride: 12,
            rate: Default::default(),
            attributes: vec![VertexAttribute {
                location: 0,
                format: Default::default(),
                offset: 0,
            }],
        }],
        index,
    })
    .unwrap()
}

fn graphics_pipeline(gpu: &Graphics<RecordingDriver>) -> glint::Handle<glint::Pipeline> {
    gpu.make_pipeline(&PipelineInfo {
        debug_name: "draw",
        program: 7,
        ..Default::default()
    })
    .unwrap()
}

#[test]
fn begin_render_target_binds_and_clears() {
    let gpu = device();
    let rt = render_target(&gpu, 51);

    gpu.execute(&[Command::BeginRenderTarget(rt)]).unwrap();
    assert_eq!(
        gpu.driver().take_calls(),
        vec![
            Call::BindDrawFramebuffer(51),
            Call::Clear(ClearFlags::COLOR | ClearFlags::DEPTH),
        ]
    );

    // Re-beginning the same target skips the framebuffer bind, not the clear.
    gpu.execute(&[Command::EndRenderTarget, Command::BeginRenderTarget(rt)])
        .unwrap();
    assert_eq!(
        gpu.driver().take_calls(),
        vec![Call::Clear(ClearFlags::COLOR | ClearFlags::DEPTH)]
    );
}

#[test]
fn implicit_viewport_size_needs_a_render_target() {
    let gpu = device();
    let err = gpu
        .execute(&[Command::SetViewport {
            offset: [0, 0],
            size: [0, 0],
        }])
        .unwrap_err();
    assert!(matches!(err, GPUError::NoRenderTargetBound));

    let rt = render_target(&gpu, 51);
    gpu.execute(&[
        Command::BeginRenderTarget(rt),
        Command::SetViewport {
            offset: [0, 0],
            size: [0, 0],
        },
    ])
    .unwrap();
    assert!(gpu.driver().calls().contains(&Call::SetViewport {
        offset: [0, 0],
        size: [800, 600],
    }));
}

#[test]
fn viewport_rectangle_diffed() {
    let gpu = device();
    let rt = render_target(&gpu, 51);

    gpu.execute(&[
        Command::BeginRenderTarget(rt),
        Command::SetViewport {
            offset: [0, 0],
            size: [0, 0],
        },
        // Explicit size equal to the implicit one: no second call.
        Command::SetViewport {
            offset: [0, 0],
            size: [800, 600],
        },
    ])
    .unwrap();
    assert_eq!(
        gpu.driver().count(|c| matches!(c, Call::SetViewport { .. })),
        1
    );
}

#[test]
fn scissor_toggles_follow_commands() {
    let gpu = device();
    let rt = render_target(&gpu, 51);

    gpu.execute(&[
        Command::BeginRenderTarget(rt),
        Command::SetScissor {
            offset: [10, 10],
            size: [100, 100],
        },
    ])
    .unwrap();
    let calls = gpu.driver().take_calls();
    assert!(calls.contains(&Call::SetScissorEnable(true)));
    assert!(calls.contains(&Call::SetScissor {
        offset: [10, 10],
        size: [100, 100],
    }));

    // Scissor matching the viewport is expressed by disabling the test.
    gpu.execute(&[Command::SetViewportAndScissor {
        offset: [0, 0],
        size: [0, 0],
    }])
    .unwrap();
    let calls = gpu.driver().take_calls();
    assert!(calls.contains(&Call::SetScissorEnable(false)));
    assert!(calls.contains(&Call::SetViewport {
        offset: [0, 0],
        size: [800, 600],
    }));
    assert!(!calls.iter().any(|c| matches!(c, Call::SetScissor { .. })));
}

#[test]
fn clear_values_are_shadowed() {
    let gpu = device();
    gpu.execute(&[
        Command::SetClearColor([0.1, 0.2, 0.3, 1.0]),
        Command::SetClearColor([0.1, 0.2, 0.3, 1.0]),
        Command::SetClearDepth(0.5),
        Command::SetClearDepth(0.5),
        Command::SetClearStencil(0),
    ])
    .unwrap();

    let calls = gpu.driver().take_calls();
    // Stencil 0 matches the reset value, so three calls total.
    assert_eq!(
        calls,
        vec![
            Call::SetClearColor([0.1, 0.2, 0.3, 1.0]),
            Call::SetClearDepth(0.5),
        ]
    );
}

#[test]
fn draw_preconditions() {
    let gpu = device();
    let draw = Command::Draw(DrawInstanced {
        count: 3,
        ..Default::default()
    });

    assert!(matches!(
        gpu.execute(std::slice::from_ref(&draw)),
        Err(GPUError::NoPipelineBound)
    ));

    let pipe = graphics_pipeline(&gpu);
    assert!(matches!(
        gpu.execute(&[Command::BindPipeline(pipe), draw.clone()]),
        Err(GPUError::NoVertexInputBound)
    ));

    // Non-indexed input, indexed draw.
    let input = vertex_input(&gpu, false);
    assert!(matches!(
        gpu.execute(&[
            Command::BindVertexInput(input),
            Command::Draw(DrawInstanced::indexed(3)),
        ]),
        Err(GPUError::NoIndexBuffer)
    ));

    gpu.execute(std::slice::from_ref(&draw)).unwrap();
    assert!(gpu.driver().calls().contains(&Call::DrawInstanced {
        topology: Topology::TriangleList,
        first: 0,
        count: 3,
        instances: 1,
        first_instance: 0,
    }));
}

#[test]
fn indexed_draw_uses_bound_index_type() {
    let gpu = device();
    let pipe = graphics_pipeline(&gpu);
    let input = vertex_input(&gpu, true);

    gpu.execute(&[
        Command::BindPipeline(pipe),
        Command::BindVertexInput(input),
        Command::Draw(DrawInstanced::indexed(6)),
    ])
    .unwrap();

    assert!(gpu.driver().calls().contains(&Call::DrawIndexed {
        topology: Topology::TriangleList,
        ty: IndexType::U16,
        first: 0,
        count: 6,
        instances: 1,
        first_instance: 0,
        vertex_offset: 0,
    }));
}

#[test]
fn dispatch_requires_compute_pipeline() {
    let gpu = device();
    let graphics = graphics_pipeline(&gpu);
    let compute = gpu
        .make_pipeline(&PipelineInfo {
            debug_name: "reduce",
            program: 9,
            stages: ShaderStages::COMPUTE,
            ..Default::default()
        })
        .unwrap();

    assert!(matches!(
        gpu.execute(&[
            Command::BindPipeline(graphics),
            Command::Dispatch { groups: [8, 8, 1] },
        ]),
        Err(GPUError::DispatchRequiresComputePipeline)
    ));

    gpu.driver().take_calls();
    gpu.execute(&[
        Command::BindPipeline(compute),
        Command::Dispatch { groups: [8, 8, 1] },
    ])
    .unwrap();

    let calls = gpu.driver().take_calls();
    // Compute pipelines bind nothing but the program.
    assert_eq!(
        calls,
        vec![Call::UseProgram(9), Call::Dispatch([8, 8, 1])]
    );

    // And a draw under a compute pipeline is refused.
    let input = vertex_input(&gpu, false);
    assert!(matches!(
        gpu.execute(&[
            Command::BindVertexInput(input),
            Command::Draw(DrawInstanced {
                count: 3,
                ..Default::default()
            }),
        ]),
        Err(GPUError::DrawRequiresGraphicsPipeline)
    ));
}

#[test]
fn blit_records_implicit_framebuffer_binds() {
    let gpu = device();
    let src = render_target(&gpu, 51);
    let dst = render_target(&gpu, 52);

    gpu.execute(&[Command::BlitRenderTarget {
        src,
        dst,
        src_area: [0, 0, 800, 600],
        dst_area: [0, 0, 800, 600],
        mask: BlitMask::COLOR,
        filter: Filter::Linear,
    }])
    .unwrap();
    gpu.driver().take_calls();

    // The blit left dst bound as the draw framebuffer; beginning it again
    // must not re-bind.
    gpu.execute(&[Command::BeginRenderTarget(dst)]).unwrap();
    assert_eq!(
        gpu.driver().take_calls(),
        vec![Call::Clear(ClearFlags::COLOR | ClearFlags::DEPTH)]
    );
}

#[test]
fn clear_render_target_uses_cache() {
    let gpu = device();
    let rt = render_target(&gpu, 51);

    gpu.execute(&[
        Command::BeginRenderTarget(rt),
        Command::ClearRenderTarget {
            target: rt,
            flags: ClearFlags::STENCIL,
        },
    ])
    .unwrap();

    // One framebuffer bind serves both the begin and the explicit clear.
    assert_eq!(
        gpu.driver()
            .count(|c| matches!(c, Call::BindDrawFramebuffer(_))),
        1
    );
    assert!(gpu.driver().calls().contains(&Call::Clear(ClearFlags::STENCIL)));
}

#[test]
fn debug_commands_pass_through() {
    let gpu = device();
    gpu.execute(&[
        Command::DebugStartRegion("shadow pass".into()),
        Command::DebugInsertMarker("cascade 0".into()),
        Command::DebugEndRegion,
    ])
    .unwrap();

    assert_eq!(
        gpu.driver().take_calls(),
        vec![
            Call::PushDebugGroup("shadow pass".into()),
            Call::InsertDebugMarker("cascade 0".into()),
            Call::PopDebugGroup,
        ]
    );
}
