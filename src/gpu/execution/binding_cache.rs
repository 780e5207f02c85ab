use std::collections::HashMap;

use crate::gpu::driver::RawHandle;
use crate::gpu::types::ResourceType;

/// Singleton bind points that hold exactly one object at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindTarget {
    Program,
    VertexArray,
    DrawFramebuffer,
    ReadFramebuffer,
}

/// Slot-indexed bind point. The [`ResourceType`] class keeps namespaces apart:
/// a uniform buffer at slot N and a texture at slot N live side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotKey {
    pub class: ResourceType,
    pub slot: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoundRange {
    pub handle: RawHandle,
    pub offset: u64,
    pub size: u64,
}

impl BoundRange {
    pub fn whole(handle: RawHandle) -> Self {
        Self {
            handle,
            offset: 0,
            size: 0,
        }
    }
}

/// What this context believes the driver currently has bound.
///
/// This is the single chokepoint for bind calls: an entry is written only
/// after the `issue` closure has run, so a hit always means the driver really
/// has the value and the call can be skipped. Bypassing the cache for any of
/// these bind points would desync it.
#[derive(Default)]
pub struct BindingCache {
    targets: HashMap<BindTarget, RawHandle>,
    slots: HashMap<SlotKey, BoundRange>,
}

impl BindingCache {
    /// Issues the bind only if `handle` differs from the cached value.
    /// Returns whether a driver call was made.
    pub fn bind_target(
        &mut self,
        target: BindTarget,
        handle: RawHandle,
        issue: impl FnOnce(RawHandle),
    ) -> bool {
        if self.targets.get(&target) == Some(&handle) {
            return false;
        }
        issue(handle);
        self.targets.insert(target, handle);
        true
    }

    /// Issues the slot bind only if the stored range differs. Returns whether
    /// a driver call was made.
    pub fn bind_slot(
        &mut self,
        key: SlotKey,
        range: BoundRange,
        issue: impl FnOnce(BoundRange),
    ) -> bool {
        if self.slots.get(&key) == Some(&range) {
            return false;
        }
        issue(range);
        self.slots.insert(key, range);
        true
    }

    /// Records a binding the driver call performed implicitly (e.g. a named
    /// blit re-binding read/draw framebuffers) without issuing anything.
    pub fn note_target(&mut self, target: BindTarget, handle: RawHandle) {
        self.targets.insert(target, handle);
    }

    pub fn target(&self, target: BindTarget) -> Option<RawHandle> {
        self.targets.get(&target).copied()
    }

    pub fn slot(&self, key: SlotKey) -> Option<BoundRange> {
        self.slots.get(&key).copied()
    }

    /// Drops any target entry of `target` currently holding `handle`; the next
    /// bind of that target issues unconditionally.
    pub fn forget_target_handle(&mut self, target: BindTarget, handle: RawHandle) {
        if self.targets.get(&target) == Some(&handle) {
            self.targets.remove(&target);
        }
    }

    /// Drops every slot entry of `class` bound to `handle`.
    pub fn forget_slots_of(&mut self, class: ResourceType, handle: RawHandle) {
        self.slots
            .retain(|key, range| key.class != class || range.handle != handle);
    }
}
