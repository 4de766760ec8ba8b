//! Tick-boundary application of deferred spawns and destroys.
use bevy_ecs::prelude::*;

use crate::registry::{SpawnError, destroy, instantiate};
use crate::resources::lifecycle::PendingLifecycle;

/// Apply every queued request: destroys first, then spawns.
///
/// Destroys go through [`destroy`], so partners get their exit events.
/// Returns the outcome of each queued spawn in request order; refused specs
/// have already been logged by [`instantiate`].
pub fn apply_pending_lifecycle(world: &mut World) -> Vec<Result<Entity, SpawnError>> {
    let Some(mut pending) = world.get_resource_mut::<PendingLifecycle>() else {
        return Vec::new();
    };
    if pending.is_empty() {
        return Vec::new();
    }
    let (spawns, destroys) = pending.drain();

    for entity in destroys {
        destroy(world, entity);
    }
    spawns
        .into_iter()
        .map(|spec| instantiate(world, spec))
        .collect()
}
