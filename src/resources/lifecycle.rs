//! Deferred instantiation and destruction.
//!
//! Game logic reacting to a collision runs in the middle of a tick, while the
//! entity set is being scanned. Requests made there are parked in
//! [`PendingLifecycle`] and applied by
//! [`apply_pending_lifecycle`](crate::systems::lifecycle::apply_pending_lifecycle)
//! at the next tick boundary, so the scan never sees a mutating entity set.

use bevy_ecs::prelude::*;

use crate::registry::EntitySpec;

/// Queued spawn/destroy requests for the next tick boundary.
#[derive(Resource, Debug, Default)]
pub struct PendingLifecycle {
    spawns: Vec<EntitySpec>,
    destroys: Vec<Entity>,
}

impl PendingLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_spawn(&mut self, spec: EntitySpec) {
        self.spawns.push(spec);
    }

    /// Queue `entity` for destruction. Duplicate requests are ignored.
    pub fn request_destroy(&mut self, entity: Entity) {
        if !self.destroys.contains(&entity) {
            self.destroys.push(entity);
        }
    }

    pub fn is_destroy_pending(&self, entity: Entity) -> bool {
        self.destroys.contains(&entity)
    }

    pub fn is_empty(&self) -> bool {
        self.spawns.is_empty() && self.destroys.is_empty()
    }

    /// Take every queued request, leaving the queue empty.
    pub fn drain(&mut self) -> (Vec<EntitySpec>, Vec<Entity>) {
        (
            std::mem::take(&mut self.spawns),
            std::mem::take(&mut self.destroys),
        )
    }
}

/// Queue the destruction of `entity` from inside a system or callback.
pub fn defer_destroy(commands: &mut Commands, entity: Entity) {
    commands.queue(move |world: &mut World| {
        match world.get_resource_mut::<PendingLifecycle>() {
            Some(mut pending) => pending.request_destroy(entity),
            None => log::warn!("No PendingLifecycle resource; dropping destroy of {:?}", entity),
        }
    });
}

/// Queue the instantiation of `spec` from inside a system or callback.
pub fn defer_spawn(commands: &mut Commands, spec: EntitySpec) {
    commands.queue(move |world: &mut World| {
        match world.get_resource_mut::<PendingLifecycle>() {
            Some(mut pending) => pending.request_spawn(spec),
            None => log::warn!("No PendingLifecycle resource; dropping spawn request"),
        }
    });
}
