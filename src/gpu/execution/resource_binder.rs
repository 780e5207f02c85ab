use crate::gpu::device::ObjectPools;
use crate::gpu::driver::{Driver, ObjectKind};
use crate::gpu::error::{GPUError, Result};
use crate::gpu::objects::{Descriptors, ResourceSlot, TextureSlot};
use crate::gpu::types::{BufferBindClass, ResourceType};

use super::binding_cache::{BoundRange, SlotKey};
use super::context::ContextState;

/// Resolves every layout slot of `set` to concrete driver bindings, issuing
/// only the calls the binding cache reports as real changes.
///
/// A slot whose global id has no entry in the resource table is skipped, since
/// layouts may be supersets of what a draw actually exercises. A slot whose
/// resource handle has been freed resolves to "unbound" and is also skipped;
/// the lifecycle hook has already scrubbed the caches for it.
pub(crate) fn bind_descriptors<D: Driver>(
    driver: &D,
    pools: &ObjectPools,
    ctx: &mut ContextState,
    set: &Descriptors,
) -> Result<()> {
    for slot in &set.layout {
        let Some(res) = set.resources.get(&slot.global_id) else {
            continue;
        };

        match (slot.ty, res) {
            (
                ResourceType::UniformBuffer | ResourceType::StorageBuffer,
                ResourceSlot::Buffer {
                    buffer,
                    offset,
                    size,
                },
            ) => {
                let raw = pools
                    .buffers
                    .read()
                    .unwrap()
                    .get_ref(*buffer)
                    .map(|b| b.raw);
                let Some(raw) = raw else {
                    continue;
                };

                let class = match slot.ty {
                    ResourceType::UniformBuffer => BufferBindClass::Uniform,
                    _ => BufferBindClass::Storage,
                };
                let key = SlotKey {
                    class: slot.ty,
                    slot: slot.local_slot,
                };
                ctx.bindings.bind_slot(
                    key,
                    BoundRange {
                        handle: raw,
                        offset: *offset,
                        size: *size,
                    },
                    |r| driver.bind_buffer_range(class, slot.local_slot, r.handle, r.offset, r.size),
                );
            }

            (ResourceType::Sampler, ResourceSlot::Sampler { sampler, texture }) => {
                let raw = pools
                    .samplers
                    .read()
                    .unwrap()
                    .get_ref(*sampler)
                    .map(|s| s.raw);
                let Some(raw) = raw else {
                    continue;
                };

                let key = SlotKey {
                    class: ResourceType::Sampler,
                    slot: slot.local_slot,
                };
                ctx.bindings.bind_slot(key, BoundRange::whole(raw), |r| {
                    driver.bind_sampler(slot.local_slot, r.handle)
                });

                // A sampler slot may carry the texture it samples from; that
                // texture binds read-only at the same slot index.
                if let Some(paired) = texture {
                    bind_texture(driver, pools, ctx, slot.local_slot, paired, false);
                }
            }

            (ResourceType::SampledTexture, ResourceSlot::Texture(tex)) => {
                bind_texture(driver, pools, ctx, slot.local_slot, tex, false);
            }

            (ResourceType::StorageImage, ResourceSlot::Texture(tex)) => {
                bind_texture(driver, pools, ctx, slot.local_slot, tex, true);
            }

            // Construction and update validation keep kinds aligned with slot
            // types, so reaching this means the set was corrupted.
            _ => {
                return Err(GPUError::SlotTypeMismatch {
                    name: set.name.clone(),
                    global_id: slot.global_id,
                })
            }
        }
    }

    Ok(())
}

/// Resolves the sub-range view for `tex` in this context's derived-object
/// cache (creating and labeling it on a miss), then binds it at `local_slot`.
/// Read-only and writable access use distinct cache namespaces: the driver
/// binds them through different units, so the same slot index must not alias.
fn bind_texture<D: Driver>(
    driver: &D,
    pools: &ObjectPools,
    ctx: &mut ContextState,
    local_slot: u32,
    tex: &TextureSlot,
    writable: bool,
) {
    let resolved = pools
        .textures
        .read()
        .unwrap()
        .get_ref(tex.texture)
        .map(|t| (t.raw, t.format, t.name.clone()));
    let Some((raw, format, name)) = resolved else {
        return;
    };

    let view = match ctx.texture_views.get(&(tex.texture, tex.range)) {
        Some(view) => *view,
        None => {
            let view = driver.create_texture_view(raw, tex.range.view_type, format, tex.range);

            let nth = ctx
                .texture_views
                .keys()
                .filter(|(handle, _)| *handle == tex.texture)
                .count();
            driver.label_object(ObjectKind::Texture, view, &format!("{} view {}", name, nth));

            ctx.texture_views.insert((tex.texture, tex.range), view);
            view
        }
    };

    if writable {
        let key = SlotKey {
            class: ResourceType::StorageImage,
            slot: local_slot,
        };
        ctx.bindings.bind_slot(key, BoundRange::whole(view), |r| {
            driver.bind_image_unit(local_slot, r.handle, format)
        });
    } else {
        let key = SlotKey {
            class: ResourceType::SampledTexture,
            slot: local_slot,
        };
        ctx.bindings.bind_slot(key, BoundRange::whole(view), |r| {
            driver.bind_texture_unit(local_slot, r.handle)
        });
    }
}
