//! Outbound port for network synchronisation.
//!
//! The physics core never talks to a socket. A host that mirrors the
//! simulation onto remote screens injects a [`SyncBridge`] with
//! [`setup_sync`] and drains the returned receiver on its own thread. When
//! the resource is absent nothing is published.

use bevy_ecs::prelude::*;
use crossbeam_channel::{Receiver, Sender, unbounded};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::components::rigidbody::RigidBody;
use crate::components::transform::{Dimensions, Transform};

/// Serializable snapshot of one body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyState {
    /// `Entity::to_bits` of the body.
    pub id: u64,
    pub position: Vec2,
    pub rotation: f32,
    pub dimensions: Dimensions,
    pub velocity: Vec2,
    pub angular_velocity: f32,
}

impl BodyState {
    pub fn new(entity: Entity, transform: &Transform, rigidbody: &RigidBody) -> Self {
        Self {
            id: entity.to_bits(),
            position: transform.position,
            rotation: transform.rotation,
            dimensions: transform.dimensions,
            velocity: rigidbody.velocity,
            angular_velocity: rigidbody.angular_velocity,
        }
    }
}

/// Read the current [`BodyState`] of `entity`, if it has a transform and a rigid body.
pub fn body_state(world: &World, entity: Entity) -> Option<BodyState> {
    let transform = world.get::<Transform>(entity)?;
    let rigidbody = world.get::<RigidBody>(entity)?;
    Some(BodyState::new(entity, transform, rigidbody))
}

/// Messages sent to remote mirrors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncMessage {
    Instantiated { tag: Option<String>, state: BodyState },
    Updated { state: BodyState },
    Destroyed { id: u64 },
}

/// Sender half of the sync channel.
#[derive(Resource, Clone)]
pub struct SyncBridge {
    pub tx: Sender<SyncMessage>,
}

impl SyncBridge {
    /// Send a message. Returns false if the receiving side has gone away.
    ///
    /// Callers detach the bridge on failure, so the warning is logged once.
    pub fn publish(&self, message: SyncMessage) -> bool {
        if self.tx.send(message).is_err() {
            log::warn!("Sync receiver dropped; detaching sync port");
            return false;
        }
        true
    }
}

/// Publish through the injected bridge, if any. A bridge whose receiver is
/// gone is removed from the world.
pub fn publish_or_detach(world: &mut World, message: SyncMessage) {
    let sent = world
        .get_resource::<SyncBridge>()
        .map(|bridge| bridge.publish(message));
    if sent == Some(false) {
        world.remove_resource::<SyncBridge>();
    }
}

/// Create the sync channel, register [`SyncBridge`] and hand back the receiver.
pub fn setup_sync(world: &mut World) -> Receiver<SyncMessage> {
    let (tx, rx) = unbounded::<SyncMessage>();
    world.insert_resource(SyncBridge { tx });
    rx
}

/// Remove the bridge; subsequent ticks publish nothing.
pub fn shutdown_sync(world: &mut World) {
    world.remove_resource::<SyncBridge>();
}
