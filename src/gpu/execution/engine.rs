use log::trace;

use crate::gpu::commands::{Command, DrawInstanced};
use crate::gpu::device::Graphics;
use crate::gpu::driver::{Driver, ObjectKind};
use crate::gpu::error::{GPUError, Result};
use crate::gpu::objects::PrimitiveBuffer;
use crate::gpu::types::{ClearFlags, InputRate, Region};
use crate::utils::Handle;

use super::binding_cache::BindTarget;
use super::context::ContextState;
use super::pipeline_binder::bind_pipeline;
use super::resource_binder::bind_descriptors;

impl<D: Driver> Graphics<D> {
    /// Runs an ordered command stream against the calling thread's context.
    ///
    /// Drains the context's deferred deletions first, so nothing in the batch
    /// can alias a derived object some other thread retired. Errors abort the
    /// batch at the failing command; state already applied stays applied, and
    /// the shadow copies remain in sync with the driver.
    pub fn execute(&self, commands: &[Command]) -> Result<()> {
        let ctx = self.registry.current();
        let mut ctx = ctx.lock().unwrap();

        ctx.run_maintenance(&self.driver);

        for cmd in commands {
            self.run_command(&mut ctx, cmd)?;
        }

        ctx.frame_id += 1;
        trace!("executed {} command(s), frame {}", commands.len(), ctx.frame_id);
        Ok(())
    }

    fn run_command(&self, ctx: &mut ContextState, cmd: &Command) -> Result<()> {
        match cmd {
            Command::BindPipeline(handle) => {
                let pipe = self
                    .pools
                    .pipelines
                    .read()
                    .unwrap()
                    .get_ref(*handle)
                    .cloned()
                    .ok_or(GPUError::InvalidHandle("pipeline"))?;
                bind_pipeline(&self.driver, ctx, &pipe);
                ctx.pipeline = Some(*handle);
            }

            Command::BindDescriptors(handle) => {
                let set = self
                    .pools
                    .descriptors
                    .read()
                    .unwrap()
                    .get_ref(*handle)
                    .cloned()
                    .ok_or(GPUError::InvalidHandle("descriptor set"))?;
                bind_descriptors(&self.driver, &self.pools, ctx, &set)?;
                ctx.descriptors = Some(*handle);
            }

            Command::BindVertexInput(handle) => {
                self.bind_vertex_input(ctx, *handle)?;
            }

            Command::BeginRenderTarget(handle) => {
                let (raw, size) = self
                    .pools
                    .render_targets
                    .read()
                    .unwrap()
                    .get_ref(*handle)
                    .map(|rt| (rt.raw, rt.size))
                    .ok_or(GPUError::InvalidHandle("render target"))?;

                ctx.bindings
                    .bind_target(BindTarget::DrawFramebuffer, raw, |f| {
                        self.driver.bind_draw_framebuffer(f)
                    });
                self.driver.clear(ClearFlags::COLOR | ClearFlags::DEPTH);

                ctx.render_target = Some(*handle);
                ctx.render_target_size = size;
            }

            Command::EndRenderTarget => {
                ctx.render_target = None;
                ctx.render_target_size = [0; 2];
            }

            Command::SetViewport { offset, size } => {
                self.set_viewport(ctx, *offset, *size)?;
            }

            Command::SetScissor { offset, size } => {
                self.set_scissor(ctx, *offset, *size)?;
            }

            Command::SetViewportAndScissor { offset, size } => {
                // The viewport already clips to this region, so an identical
                // scissor adds nothing; turn the test off instead.
                if ctx.scissor_enabled {
                    self.driver.set_scissor_enable(false);
                    ctx.scissor_enabled = false;
                }
                self.set_viewport(ctx, *offset, *size)?;
            }

            Command::SetClearColor(rgba) => {
                if ctx.clear_color != *rgba {
                    self.driver.set_clear_color(*rgba);
                    ctx.clear_color = *rgba;
                }
            }

            Command::SetClearDepth(depth) => {
                if ctx.clear_depth != *depth {
                    self.driver.set_clear_depth(*depth);
                    ctx.clear_depth = *depth;
                }
            }

            Command::SetClearStencil(stencil) => {
                if ctx.clear_stencil != *stencil {
                    self.driver.set_clear_stencil(*stencil);
                    ctx.clear_stencil = *stencil;
                }
            }

            Command::SetBlendConstants(rgba) => {
                if ctx.blend.constants != *rgba {
                    self.driver.set_blend_constants(*rgba);
                    ctx.blend.constants = *rgba;
                }
            }

            Command::Draw(draw) => {
                self.draw(ctx, draw)?;
            }

            Command::Dispatch { groups } => {
                if ctx.pipeline.is_none() || !ctx.pipeline_is_compute {
                    return Err(GPUError::DispatchRequiresComputePipeline);
                }
                self.driver.dispatch(*groups);
            }

            Command::ClearRenderTarget { target, flags } => {
                let raw = self
                    .pools
                    .render_targets
                    .read()
                    .unwrap()
                    .get_ref(*target)
                    .map(|rt| rt.raw)
                    .ok_or(GPUError::InvalidHandle("render target"))?;

                ctx.bindings
                    .bind_target(BindTarget::DrawFramebuffer, raw, |f| {
                        self.driver.bind_draw_framebuffer(f)
                    });
                self.driver.clear(*flags);
            }

            Command::BlitRenderTarget {
                src,
                dst,
                src_area,
                dst_area,
                mask,
                filter,
            } => {
                let targets = self.pools.render_targets.read().unwrap();
                let src_raw = targets
                    .get_ref(*src)
                    .map(|rt| rt.raw)
                    .ok_or(GPUError::InvalidHandle("render target"))?;
                let dst_raw = targets
                    .get_ref(*dst)
                    .map(|rt| rt.raw)
                    .ok_or(GPUError::InvalidHandle("render target"))?;
                drop(targets);

                self.driver
                    .blit_framebuffer(src_raw, dst_raw, *src_area, *dst_area, *mask, *filter);

                // The named blit binds both framebuffers as a side effect.
                ctx.bindings.note_target(BindTarget::ReadFramebuffer, src_raw);
                ctx.bindings.note_target(BindTarget::DrawFramebuffer, dst_raw);
            }

            Command::DebugStartRegion(label) => self.driver.push_debug_group(label),
            Command::DebugInsertMarker(label) => self.driver.insert_debug_marker(label),
            Command::DebugEndRegion => self.driver.pop_debug_group(),
        }

        Ok(())
    }

    fn bind_vertex_input(
        &self,
        ctx: &mut ContextState,
        handle: Handle<PrimitiveBuffer>,
    ) -> Result<()> {
        let pb = self
            .pools
            .primitive_buffers
            .read()
            .unwrap()
            .get_ref(handle)
            .cloned()
            .ok_or(GPUError::InvalidHandle("primitive buffer"))?;

        let vao = match ctx.vertex_arrays.get(&handle) {
            Some(vao) => *vao,
            None => {
                let vao = self.build_vertex_array(&pb)?;
                ctx.vertex_arrays.insert(handle, vao);
                vao
            }
        };

        ctx.bindings
            .bind_target(BindTarget::VertexArray, vao, |v| {
                self.driver.bind_vertex_array(v)
            });

        ctx.vertex_input = Some(handle);
        ctx.index_type = pb.index.map(|i| i.ty);
        Ok(())
    }

    /// Builds a driver vertex array from the primitive buffer's layout. Only
    /// runs on a view-cache miss; the result is owned by the calling context.
    fn build_vertex_array(&self, pb: &PrimitiveBuffer) -> Result<u32> {
        let vao = self.driver.create_vertex_array();

        let buffers = self.pools.buffers.read().unwrap();
        for (binding, layout) in pb.vertex_buffers.iter().enumerate() {
            let binding = binding as u32;
            let raw = buffers
                .get_ref(layout.buffer)
                .map(|b| b.raw)
                .ok_or(GPUError::InvalidHandle("buffer"))?;

            self.driver
                .set_vertex_buffer(vao, binding, raw, layout.offset, layout.stride);

            let per_instance = layout.rate == InputRate::Instance;
            for attr in &layout.attributes {
                self.driver.set_vertex_attribute(
                    vao,
                    attr.location,
                    binding,
                    attr.format,
                    attr.offset,
                    per_instance,
                );
            }
        }

        if let Some(index) = &pb.index {
            let raw = buffers
                .get_ref(index.buffer)
                .map(|b| b.raw)
                .ok_or(GPUError::InvalidHandle("buffer"))?;
            self.driver.set_index_buffer(vao, raw);
        }
        drop(buffers);

        self.driver
            .label_object(ObjectKind::VertexArray, vao, &format!("{} vao", pb.name));
        Ok(vao)
    }

    fn draw(&self, ctx: &mut ContextState, draw: &DrawInstanced) -> Result<()> {
        if ctx.pipeline.is_none() {
            return Err(GPUError::NoPipelineBound);
        }
        if ctx.pipeline_is_compute {
            return Err(GPUError::DrawRequiresGraphicsPipeline);
        }
        if ctx.vertex_input.is_none() {
            return Err(GPUError::NoVertexInputBound);
        }

        if draw.indexed {
            let index_type = ctx.index_type.ok_or(GPUError::NoIndexBuffer)?;
            self.driver.draw_indexed_instanced(
                ctx.topology,
                index_type,
                draw.first,
                draw.count,
                draw.instance_count,
                draw.first_instance,
                draw.vertex_offset,
            );
        } else {
            self.driver.draw_instanced(
                ctx.topology,
                draw.first,
                draw.count,
                draw.instance_count,
                draw.first_instance,
            );
        }
        Ok(())
    }

    fn set_viewport(&self, ctx: &mut ContextState, offset: [i32; 2], size: [u32; 2]) -> Result<()> {
        let size = resolve_region_size(ctx, size)?;
        let region = Region { offset, size };
        if ctx.viewport != region {
            self.driver.set_viewport(offset, size);
            ctx.viewport = region;
        }
        Ok(())
    }

    fn set_scissor(&self, ctx: &mut ContextState, offset: [i32; 2], size: [u32; 2]) -> Result<()> {
        let size = resolve_region_size(ctx, size)?;

        if !ctx.scissor_enabled {
            self.driver.set_scissor_enable(true);
            ctx.scissor_enabled = true;
        }

        let region = Region { offset, size };
        if ctx.scissor != region {
            self.driver.set_scissor(offset, size);
            ctx.scissor = region;
        }
        Ok(())
    }
}

/// A zero-sized rectangle means "the whole render target".
fn resolve_region_size(ctx: &ContextState, size: [u32; 2]) -> Result<[u32; 2]> {
    if size[0] != 0 && size[1] != 0 {
        return Ok(size);
    }
    if ctx.render_target.is_none() {
        return Err(GPUError::NoRenderTargetBound);
    }
    Ok(ctx.render_target_size)
}
