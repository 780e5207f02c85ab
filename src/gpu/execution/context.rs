use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};

use log::trace;
use smallvec::SmallVec;

use crate::gpu::driver::{Driver, RawHandle};
use crate::gpu::objects::{Descriptors, Pipeline, PrimitiveBuffer, RenderTarget, Texture};
use crate::gpu::types::{BlendState, IndexType, Rasterizer, Region, TextureRange, Topology};
use crate::utils::Handle;

use super::binding_cache::BindingCache;

/// Driver object whose deletion was requested by a foreign thread and must be
/// carried out by the context's owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeferredDelete {
    VertexArray(RawHandle),
    TextureView(RawHandle),
}

/// Everything one thread believes about the driver's current configuration,
/// plus the derived objects that thread has built. Owned by exactly one
/// thread; other threads only ever null references and queue deletions here
/// (under the registry's per-context lock).
pub struct ContextState {
    pub(crate) bindings: BindingCache,

    // Currently bound high-level objects. Handles, not owners: they fail
    // closed once the pool slot is released.
    pub(crate) pipeline: Option<Handle<Pipeline>>,
    pub(crate) descriptors: Option<Handle<Descriptors>>,
    pub(crate) vertex_input: Option<Handle<PrimitiveBuffer>>,
    pub(crate) render_target: Option<Handle<RenderTarget>>,

    // Facts cached at bind time so draws don't re-read the pools.
    pub(crate) topology: Topology,
    pub(crate) pipeline_is_compute: bool,
    pub(crate) index_type: Option<IndexType>,
    pub(crate) render_target_size: [u32; 2],

    // Shadow copies of fixed-function state, initialized to driver reset
    // values. The pipeline binder diffs against these field by field.
    pub(crate) raster: Rasterizer,
    pub(crate) blend: BlendState,
    pub(crate) min_sample_shading_enabled: bool,
    pub(crate) min_sample_shading: f32,

    pub(crate) viewport: Region,
    pub(crate) scissor: Region,
    pub(crate) scissor_enabled: bool,

    pub(crate) clear_color: [f32; 4],
    pub(crate) clear_depth: f32,
    pub(crate) clear_stencil: u32,

    pub(crate) frame_id: u64,

    // Derived-object caches, never shared across contexts.
    pub(crate) vertex_arrays: HashMap<Handle<PrimitiveBuffer>, RawHandle>,
    pub(crate) texture_views: HashMap<(Handle<Texture>, TextureRange), RawHandle>,
    pub(crate) pending_deletes: SmallVec<[DeferredDelete; 4]>,
}

impl Default for ContextState {
    fn default() -> Self {
        Self {
            bindings: Default::default(),
            pipeline: None,
            descriptors: None,
            vertex_input: None,
            render_target: None,
            topology: Default::default(),
            pipeline_is_compute: false,
            index_type: None,
            render_target_size: [0; 2],
            raster: Rasterizer::driver_reset(),
            blend: Default::default(),
            min_sample_shading_enabled: false,
            min_sample_shading: 0.0,
            viewport: Default::default(),
            scissor: Default::default(),
            scissor_enabled: false,
            clear_color: [0.0; 4],
            clear_depth: 1.0,
            clear_stencil: 0,
            frame_id: 0,
            vertex_arrays: Default::default(),
            texture_views: Default::default(),
            pending_deletes: Default::default(),
        }
    }
}

impl ContextState {
    pub fn frame_id(&self) -> u64 {
        self.frame_id
    }

    pub fn bound_pipeline(&self) -> Option<Handle<Pipeline>> {
        self.pipeline
    }

    pub fn bound_descriptors(&self) -> Option<Handle<Descriptors>> {
        self.descriptors
    }

    pub fn bound_vertex_input(&self) -> Option<Handle<PrimitiveBuffer>> {
        self.vertex_input
    }

    pub fn bound_render_target(&self) -> Option<Handle<RenderTarget>> {
        self.render_target
    }

    /// Releases every pending derived object at the driver. Must run before a
    /// batch can reference a stale derived object; harmless when empty.
    pub(crate) fn run_maintenance(&mut self, driver: &dyn Driver) {
        if self.pending_deletes.is_empty() {
            return;
        }

        let reclaimed = self.pending_deletes.len();
        for del in self.pending_deletes.drain(..) {
            match del {
                DeferredDelete::VertexArray(raw) => driver.delete_vertex_array(raw),
                DeferredDelete::TextureView(raw) => driver.delete_texture_view(raw),
            }
        }
        trace!("context maintenance reclaimed {} derived object(s)", reclaimed);
    }

    /// Driver-level teardown of everything this context owns.
    pub(crate) fn release_derived(&mut self, driver: &dyn Driver) {
        self.run_maintenance(driver);
        for (_, raw) in self.vertex_arrays.drain() {
            driver.delete_vertex_array(raw);
        }
        for (_, raw) in self.texture_views.drain() {
            driver.delete_texture_view(raw);
        }
    }
}

/// Thread-identity-keyed map of context states.
///
/// The outer mutex serializes creation and teardown; the per-context mutex is
/// held by the owner for a whole batch and briefly by the lifecycle hook for
/// invalidation writes.
#[derive(Default)]
pub struct ContextRegistry {
    contexts: Mutex<HashMap<ThreadId, Arc<Mutex<ContextState>>>>,
}

impl ContextRegistry {
    /// The calling thread's context, created on first use.
    pub fn current(&self) -> Arc<Mutex<ContextState>> {
        let mut map = self.contexts.lock().unwrap();
        map.entry(thread::current().id())
            .or_insert_with(|| {
                trace!("created context state for {:?}", thread::current().id());
                Arc::new(Mutex::new(ContextState::default()))
            })
            .clone()
    }

    /// Tears down the calling thread's context, releasing its derived objects
    /// at the driver. No-op if the thread never executed a batch.
    pub fn destroy_current(&self, driver: &dyn Driver) {
        let removed = self
            .contexts
            .lock()
            .unwrap()
            .remove(&thread::current().id());

        if let Some(ctx) = removed {
            ctx.lock().unwrap().release_derived(driver);
            trace!("destroyed context state for {:?}", thread::current().id());
        }
    }

    /// Runs `f` over every live context. Used by the lifecycle hook; each
    /// context is locked only for the duration of its visit.
    pub(crate) fn for_each(&self, mut f: impl FnMut(&mut ContextState)) {
        let snapshot: Vec<_> = self.contexts.lock().unwrap().values().cloned().collect();
        for ctx in snapshot {
            f(&mut ctx.lock().unwrap());
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.contexts.lock().unwrap().len()
    }
}
