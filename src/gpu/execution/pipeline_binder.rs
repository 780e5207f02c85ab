use crate::gpu::driver::Driver;
use crate::gpu::objects::Pipeline;
use crate::gpu::types::CullMode;

use super::binding_cache::BindTarget;
use super::context::ContextState;

/// Diffs the requested pipeline against the context's shadow state and emits
/// only the calls needed for the transition. Field-granular on purpose:
/// switching shaders must not pay for raster or blend state it doesn't touch.
pub(crate) fn bind_pipeline<D: Driver>(driver: &D, ctx: &mut ContextState, pipe: &Pipeline) {
    ctx.bindings
        .bind_target(BindTarget::Program, pipe.program, |p| {
            driver.use_program(p)
        });

    ctx.topology = pipe.topology;
    ctx.pipeline_is_compute = pipe.is_compute();

    // Fixed-function state only exists on the graphics path.
    if pipe.is_compute() {
        return;
    }

    apply_raster(driver, ctx, pipe);
    apply_sample_shading(driver, ctx, pipe);
    apply_blend(driver, ctx, pipe);
}

fn apply_raster<D: Driver>(driver: &D, ctx: &mut ContextState, pipe: &Pipeline) {
    let r = &pipe.rasterizer;
    let r0 = &mut ctx.raster;

    if r0.cull != r.cull {
        // Enable/disable is its own transition; the face only needs setting
        // while culling is on.
        if r0.cull != CullMode::None && r.cull == CullMode::None {
            driver.set_cull_enable(false);
        }
        if r0.cull == CullMode::None && r.cull != CullMode::None {
            driver.set_cull_enable(true);
        }
        if r.cull != CullMode::None {
            driver.set_cull_face(r.cull);
        }
        r0.cull = r.cull;
    }

    if r0.winding != r.winding && r.cull != CullMode::None {
        driver.set_front_face(r.winding);
        r0.winding = r.winding;
    }

    if r0.fill != r.fill {
        driver.set_fill_mode(r.fill);
        r0.fill = r.fill;
    }

    if ctx.blend.write_mask != pipe.blend.write_mask {
        driver.set_write_mask(pipe.blend.write_mask);
        ctx.blend.write_mask = pipe.blend.write_mask;
    }
}

fn apply_sample_shading<D: Driver>(driver: &D, ctx: &mut ContextState, pipe: &Pipeline) {
    let msaa = &pipe.msaa;

    if msaa.samples > 0 && msaa.min_sample_shading > 0.0 {
        if !ctx.min_sample_shading_enabled {
            driver.set_min_sample_shading_enable(true);
            ctx.min_sample_shading_enabled = true;
        }
        if ctx.min_sample_shading != msaa.min_sample_shading {
            driver.set_min_sample_shading(msaa.min_sample_shading);
            ctx.min_sample_shading = msaa.min_sample_shading;
        }
    } else if ctx.min_sample_shading_enabled {
        driver.set_min_sample_shading_enable(false);
        ctx.min_sample_shading_enabled = false;
    }
}

fn apply_blend<D: Driver>(driver: &D, ctx: &mut ContextState, pipe: &Pipeline) {
    let b = &pipe.blend;
    let b0 = &mut ctx.blend;

    if b0.enable != b.enable {
        driver.set_blend_enable(b.enable);
        b0.enable = b.enable;
    }

    // The finer blend state only matters while blending is on; it is diffed
    // lazily on the next enabling bind otherwise.
    if !b0.enable {
        return;
    }

    if b0.constants != b.constants {
        driver.set_blend_constants(b.constants);
        b0.constants = b.constants;
    }

    if b0.logic_op != b.logic_op {
        driver.set_logic_op(b.logic_op);
        b0.logic_op = b.logic_op;
    }

    if b0.color_op != b.color_op || b0.alpha_op != b.alpha_op {
        driver.set_blend_equation(b.color_op, b.alpha_op);
        b0.color_op = b.color_op;
        b0.alpha_op = b.alpha_op;
    }

    if b0.src_color != b.src_color
        || b0.dst_color != b.dst_color
        || b0.src_alpha != b.src_alpha
        || b0.dst_alpha != b.dst_alpha
    {
        driver.set_blend_factors(b.src_color, b.dst_color, b.src_alpha, b.dst_alpha);
        b0.src_color = b.src_color;
        b0.dst_color = b.dst_color;
        b0.src_alpha = b.src_alpha;
        b0.dst_alpha = b.dst_alpha;
    }
}
