pub mod binding_cache;
pub mod context;
mod engine;
mod pipeline_binder;
mod resource_binder;

pub use binding_cache::{BindTarget, BindingCache, BoundRange, SlotKey};
pub use context::{ContextRegistry, ContextState};
