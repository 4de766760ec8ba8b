//! Publishes moved bodies to the sync port after each tick.
use bevy_ecs::prelude::*;

use crate::components::rigidbody::RigidBody;
use crate::components::transform::Transform;
use crate::resources::syncbridge::{BodyState, SyncBridge, SyncMessage};

/// Send an `Updated` message for every body whose transform changed this tick.
///
/// No-op when no [`SyncBridge`] has been injected. If the receiver has gone
/// away the bridge is removed and nothing more is sent.
pub fn publish_body_states(
    bridge: Option<Res<SyncBridge>>,
    query: Query<(Entity, &Transform, &RigidBody), Changed<Transform>>,
    mut commands: Commands,
) {
    let Some(bridge) = bridge else {
        return;
    };
    for (entity, transform, rigidbody) in query.iter() {
        let state = BodyState::new(entity, transform, rigidbody);
        if !bridge.publish(SyncMessage::Updated { state }) {
            commands.remove_resource::<SyncBridge>();
            break;
        }
    }
}
