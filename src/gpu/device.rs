use std::sync::{Arc, Mutex, RwLock};

use log::debug;

use crate::utils::{Handle, Pool};

use super::driver::{Driver, RawHandle};
use super::error::{GPUError, Result};
use super::execution::binding_cache::BindTarget;
use super::execution::context::{ContextRegistry, ContextState, DeferredDelete};
use super::objects::{
    resource_matches_slot, validate_layout, validate_stages, Buffer, BufferInfo, DescriptorSlot,
    Descriptors, DescriptorsInfo, Pipeline, PipelineInfo, PrimitiveBuffer, PrimitiveBufferInfo,
    RenderTarget, RenderTargetInfo, ResourceSlot, Sampler, SamplerInfo, Texture, TextureInfo,
};
use super::types::ResourceType;

pub(crate) struct ObjectPools {
    pub(crate) buffers: RwLock<Pool<Buffer>>,
    pub(crate) textures: RwLock<Pool<Texture>>,
    pub(crate) samplers: RwLock<Pool<Sampler>>,
    pub(crate) pipelines: RwLock<Pool<Pipeline>>,
    pub(crate) descriptors: RwLock<Pool<Descriptors>>,
    pub(crate) render_targets: RwLock<Pool<RenderTarget>>,
    pub(crate) primitive_buffers: RwLock<Pool<PrimitiveBuffer>>,
}

impl Default for ObjectPools {
    fn default() -> Self {
        Self {
            buffers: RwLock::new(Pool::default()),
            textures: RwLock::new(Pool::default()),
            samplers: RwLock::new(Pool::default()),
            pipelines: RwLock::new(Pool::default()),
            descriptors: RwLock::new(Pool::default()),
            render_targets: RwLock::new(Pool::default()),
            primitive_buffers: RwLock::new(Pool::default()),
        }
    }
}

/// Destruction event fed to the lifecycle hook.
enum Destroyed {
    Pipeline(Handle<Pipeline>, RawHandle),
    Descriptors(Handle<Descriptors>),
    RenderTarget(Handle<RenderTarget>, RawHandle),
    PrimitiveBuffer(Handle<PrimitiveBuffer>),
    Buffer(RawHandle),
    Texture(Handle<Texture>),
    Sampler(RawHandle),
}

/// The logical device: owns the driver, the object arenas, and the per-thread
/// context registry. Shareable across threads; each thread executes against
/// its own context state.
pub struct Graphics<D: Driver> {
    pub(crate) driver: D,
    pub(crate) pools: ObjectPools,
    pub(crate) registry: ContextRegistry,
}

impl<D: Driver> Graphics<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            pools: ObjectPools::default(),
            registry: ContextRegistry::default(),
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// The calling thread's context state, created on first use.
    pub fn current_context(&self) -> Arc<Mutex<ContextState>> {
        self.registry.current()
    }

    /// Tears down the calling thread's context, releasing every derived
    /// object it owns at the driver level.
    pub fn destroy_context(&self) {
        self.registry.destroy_current(&self.driver);
    }

    // ---- Object construction ------------------------------------------------

    pub fn make_buffer(&self, info: &BufferInfo) -> Result<Handle<Buffer>> {
        let handle = self
            .pools
            .buffers
            .write()
            .unwrap()
            .insert(Buffer {
                name: info.debug_name.to_string(),
                raw: info.raw,
                size: info.size,
            })
            .ok_or(GPUError::OutOfSlots("buffer"))?;
        debug!("registered buffer '{}' ({} bytes)", info.debug_name, info.size);
        Ok(handle)
    }

    pub fn make_texture(&self, info: &TextureInfo) -> Result<Handle<Texture>> {
        let handle = self
            .pools
            .textures
            .write()
            .unwrap()
            .insert(Texture {
                name: info.debug_name.to_string(),
                raw: info.raw,
                format: info.format,
                mip_levels: info.mip_levels,
                layers: info.layers,
            })
            .ok_or(GPUError::OutOfSlots("texture"))?;
        debug!("registered texture '{}'", info.debug_name);
        Ok(handle)
    }

    pub fn make_sampler(&self, info: &SamplerInfo) -> Result<Handle<Sampler>> {
        let handle = self
            .pools
            .samplers
            .write()
            .unwrap()
            .insert(Sampler {
                name: info.debug_name.to_string(),
                raw: info.raw,
            })
            .ok_or(GPUError::OutOfSlots("sampler"))?;
        debug!("registered sampler '{}'", info.debug_name);
        Ok(handle)
    }

    pub fn make_render_target(&self, info: &RenderTargetInfo) -> Result<Handle<RenderTarget>> {
        let handle = self
            .pools
            .render_targets
            .write()
            .unwrap()
            .insert(RenderTarget {
                name: info.debug_name.to_string(),
                raw: info.raw,
                size: info.size,
            })
            .ok_or(GPUError::OutOfSlots("render target"))?;
        debug!("registered render target '{}'", info.debug_name);
        Ok(handle)
    }

    pub fn make_pipeline(&self, info: &PipelineInfo) -> Result<Handle<Pipeline>> {
        validate_stages(info.debug_name, info.stages)?;

        let handle = self
            .pools
            .pipelines
            .write()
            .unwrap()
            .insert(Pipeline {
                name: info.debug_name.to_string(),
                program: info.program,
                stages: info.stages,
                topology: info.topology,
                rasterizer: info.rasterizer,
                blend: info.blend,
                msaa: info.msaa,
            })
            .ok_or(GPUError::OutOfSlots("pipeline"))?;
        debug!("created pipeline '{}'", info.debug_name);
        Ok(handle)
    }

    pub fn make_descriptors(&self, info: &DescriptorsInfo) -> Result<Handle<Descriptors>> {
        validate_layout(info.debug_name, info.layout)?;
        for (global_id, res) in info.resources {
            self.validate_resource(info.debug_name, info.layout, *global_id, res)?;
        }

        let handle = self
            .pools
            .descriptors
            .write()
            .unwrap()
            .insert(Descriptors {
                name: info.debug_name.to_string(),
                layout: info.layout.to_vec(),
                resources: info.resources.iter().cloned().collect(),
            })
            .ok_or(GPUError::OutOfSlots("descriptor set"))?;
        debug!("created descriptor set '{}'", info.debug_name);
        Ok(handle)
    }

    pub fn make_primitive_buffer(
        &self,
        info: &PrimitiveBufferInfo,
    ) -> Result<Handle<PrimitiveBuffer>> {
        if info.vertex_buffers.is_empty() {
            return Err(GPUError::EmptyVertexLayout {
                name: info.debug_name.to_string(),
            });
        }

        let buffers = self.pools.buffers.read().unwrap();
        for layout in info.vertex_buffers {
            if buffers.get_ref(layout.buffer).is_none() {
                return Err(GPUError::InvalidHandle("buffer"));
            }
        }
        if let Some(index) = &info.index {
            if buffers.get_ref(index.buffer).is_none() {
                return Err(GPUError::InvalidHandle("buffer"));
            }
        }
        drop(buffers);

        let handle = self
            .pools
            .primitive_buffers
            .write()
            .unwrap()
            .insert(PrimitiveBuffer {
                name: info.debug_name.to_string(),
                vertex_buffers: info.vertex_buffers.to_vec(),
                index: info.index,
            })
            .ok_or(GPUError::OutOfSlots("primitive buffer"))?;
        debug!("created primitive buffer '{}'", info.debug_name);
        Ok(handle)
    }

    /// Replaces the resource at `global_id` in a descriptor set, re-running
    /// the same checks construction does. The next bind re-resolves the slot.
    pub fn write_descriptor(
        &self,
        set: Handle<Descriptors>,
        global_id: u32,
        resource: ResourceSlot,
    ) -> Result<()> {
        let (name, layout) = {
            let sets = self.pools.descriptors.read().unwrap();
            let set = sets
                .get_ref(set)
                .ok_or(GPUError::InvalidHandle("descriptor set"))?;
            (set.name.clone(), set.layout.clone())
        };
        self.validate_resource(&name, &layout, global_id, &resource)?;

        let mut sets = self.pools.descriptors.write().unwrap();
        let set = sets
            .get_mut_ref(set)
            .ok_or(GPUError::InvalidHandle("descriptor set"))?;
        set.resources.insert(global_id, resource);
        Ok(())
    }

    fn validate_resource(
        &self,
        name: &str,
        layout: &[DescriptorSlot],
        global_id: u32,
        res: &ResourceSlot,
    ) -> Result<()> {
        for slot in layout.iter().filter(|s| s.global_id == global_id) {
            if !resource_matches_slot(slot.ty, res) {
                return Err(GPUError::SlotTypeMismatch {
                    name: name.to_string(),
                    global_id,
                });
            }
        }

        match res {
            ResourceSlot::Buffer {
                buffer,
                offset,
                size,
            } => {
                let buffers = self.pools.buffers.read().unwrap();
                let buf = buffers
                    .get_ref(*buffer)
                    .ok_or(GPUError::InvalidHandle("buffer"))?;
                if offset.checked_add(*size).map_or(true, |end| end > buf.size) {
                    return Err(GPUError::BufferRangeOutOfBounds {
                        name: name.to_string(),
                        global_id,
                        offset: *offset,
                        size: *size,
                        buffer_size: buf.size,
                    });
                }
            }
            ResourceSlot::Sampler { sampler, texture } => {
                if self.pools.samplers.read().unwrap().get_ref(*sampler).is_none() {
                    return Err(GPUError::InvalidHandle("sampler"));
                }
                if let Some(tex) = texture {
                    self.validate_texture_range(name, global_id, tex)?;
                }
            }
            ResourceSlot::Texture(tex) => {
                self.validate_texture_range(name, global_id, tex)?;
            }
        }

        Ok(())
    }

    fn validate_texture_range(
        &self,
        name: &str,
        global_id: u32,
        slot: &super::objects::TextureSlot,
    ) -> Result<()> {
        let textures = self.pools.textures.read().unwrap();
        let tex = textures
            .get_ref(slot.texture)
            .ok_or(GPUError::InvalidHandle("texture"))?;

        let r = &slot.range;
        let mips_ok = r
            .base_mip
            .checked_add(r.mip_count)
            .is_some_and(|end| end <= tex.mip_levels);
        let layers_ok = r
            .base_layer
            .checked_add(r.layer_count)
            .is_some_and(|end| end <= tex.layers);
        if !mips_ok || !layers_ok || r.mip_count == 0 || r.layer_count == 0 {
            return Err(GPUError::TextureRangeOutOfBounds {
                name: name.to_string(),
                global_id,
                mips: tex.mip_levels,
                layers: tex.layers,
            });
        }
        Ok(())
    }

    // ---- Object destruction + lifecycle hook --------------------------------

    pub fn destroy_buffer(&self, handle: Handle<Buffer>) -> Result<()> {
        let raw = self
            .pools
            .buffers
            .read()
            .unwrap()
            .get_ref(handle)
            .map(|b| b.raw)
            .ok_or(GPUError::InvalidHandle("buffer"))?;

        self.on_object_destroyed(Destroyed::Buffer(raw));

        let released = self.pools.buffers.write().unwrap().release(handle);
        if let Some(buf) = released {
            debug!("destroyed buffer '{}'", buf.name);
        }
        Ok(())
    }

    pub fn destroy_texture(&self, handle: Handle<Texture>) -> Result<()> {
        self.pools
            .textures
            .read()
            .unwrap()
            .get_ref(handle)
            .ok_or(GPUError::InvalidHandle("texture"))?;

        self.on_object_destroyed(Destroyed::Texture(handle));

        let released = self.pools.textures.write().unwrap().release(handle);
        if let Some(tex) = released {
            debug!("destroyed texture '{}'", tex.name);
        }
        Ok(())
    }

    pub fn destroy_sampler(&self, handle: Handle<Sampler>) -> Result<()> {
        let raw = self
            .pools
            .samplers
            .read()
            .unwrap()
            .get_ref(handle)
            .map(|s| s.raw)
            .ok_or(GPUError::InvalidHandle("sampler"))?;

        self.on_object_destroyed(Destroyed::Sampler(raw));

        let released = self.pools.samplers.write().unwrap().release(handle);
        if let Some(sampler) = released {
            debug!("destroyed sampler '{}'", sampler.name);
        }
        Ok(())
    }

    pub fn destroy_render_target(&self, handle: Handle<RenderTarget>) -> Result<()> {
        let raw = self
            .pools
            .render_targets
            .read()
            .unwrap()
            .get_ref(handle)
            .map(|rt| rt.raw)
            .ok_or(GPUError::InvalidHandle("render target"))?;

        self.on_object_destroyed(Destroyed::RenderTarget(handle, raw));

        let released = self.pools.render_targets.write().unwrap().release(handle);
        if let Some(rt) = released {
            debug!("destroyed render target '{}'", rt.name);
        }
        Ok(())
    }

    pub fn destroy_pipeline(&self, handle: Handle<Pipeline>) -> Result<()> {
        let program = self
            .pools
            .pipelines
            .read()
            .unwrap()
            .get_ref(handle)
            .map(|p| p.program)
            .ok_or(GPUError::InvalidHandle("pipeline"))?;

        self.on_object_destroyed(Destroyed::Pipeline(handle, program));

        let released = self.pools.pipelines.write().unwrap().release(handle);
        if let Some(pipe) = released {
            debug!("destroyed pipeline '{}'", pipe.name);
        }
        Ok(())
    }

    pub fn destroy_descriptors(&self, handle: Handle<Descriptors>) -> Result<()> {
        self.pools
            .descriptors
            .read()
            .unwrap()
            .get_ref(handle)
            .ok_or(GPUError::InvalidHandle("descriptor set"))?;

        self.on_object_destroyed(Destroyed::Descriptors(handle));

        let released = self.pools.descriptors.write().unwrap().release(handle);
        if let Some(set) = released {
            debug!("destroyed descriptor set '{}'", set.name);
        }
        Ok(())
    }

    pub fn destroy_primitive_buffer(&self, handle: Handle<PrimitiveBuffer>) -> Result<()> {
        self.pools
            .primitive_buffers
            .read()
            .unwrap()
            .get_ref(handle)
            .ok_or(GPUError::InvalidHandle("primitive buffer"))?;

        self.on_object_destroyed(Destroyed::PrimitiveBuffer(handle));

        let released = self
            .pools
            .primitive_buffers
            .write()
            .unwrap()
            .release(handle);
        if let Some(pb) = released {
            debug!("destroyed primitive buffer '{}'", pb.name);
        }
        Ok(())
    }

    /// Lifecycle hook: runs synchronously on the destroying thread, before the
    /// pool slot is freed, so no thread's next bind can observe the object.
    ///
    /// Scans every live context and scrubs anything referring to the dying
    /// object. Derived driver objects are never deleted here; they are queued
    /// on their owning context and reclaimed by that thread's maintenance pass.
    fn on_object_destroyed(&self, event: Destroyed) {
        self.registry.for_each(|ctx| match &event {
            Destroyed::Pipeline(handle, program) => {
                if ctx.pipeline == Some(*handle) {
                    ctx.pipeline = None;
                }
                ctx.bindings
                    .forget_target_handle(BindTarget::Program, *program);
            }

            Destroyed::Descriptors(handle) => {
                if ctx.descriptors == Some(*handle) {
                    ctx.descriptors = None;
                }
            }

            Destroyed::RenderTarget(handle, raw) => {
                if ctx.render_target == Some(*handle) {
                    ctx.render_target = None;
                    ctx.render_target_size = [0; 2];
                }
                ctx.bindings
                    .forget_target_handle(BindTarget::DrawFramebuffer, *raw);
                ctx.bindings
                    .forget_target_handle(BindTarget::ReadFramebuffer, *raw);
            }

            Destroyed::PrimitiveBuffer(handle) => {
                if ctx.vertex_input == Some(*handle) {
                    ctx.vertex_input = None;
                    ctx.index_type = None;
                }
                if let Some(vao) = ctx.vertex_arrays.remove(handle) {
                    ctx.bindings
                        .forget_target_handle(BindTarget::VertexArray, vao);
                    ctx.pending_deletes.push(DeferredDelete::VertexArray(vao));
                }
            }

            Destroyed::Buffer(raw) => {
                ctx.bindings
                    .forget_slots_of(ResourceType::UniformBuffer, *raw);
                ctx.bindings
                    .forget_slots_of(ResourceType::StorageBuffer, *raw);
            }

            Destroyed::Texture(handle) => {
                let stale: Vec<_> = ctx
                    .texture_views
                    .keys()
                    .filter(|(tex, _)| tex == handle)
                    .copied()
                    .collect();
                for key in stale {
                    if let Some(view) = ctx.texture_views.remove(&key) {
                        ctx.bindings
                            .forget_slots_of(ResourceType::SampledTexture, view);
                        ctx.bindings
                            .forget_slots_of(ResourceType::StorageImage, view);
                        ctx.pending_deletes.push(DeferredDelete::TextureView(view));
                    }
                }
            }

            Destroyed::Sampler(raw) => {
                ctx.bindings.forget_slots_of(ResourceType::Sampler, *raw);
            }
        });
    }
}
