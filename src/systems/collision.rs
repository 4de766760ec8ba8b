//! Collision detection and ledger reconciliation.
//!
//! [`detect_collisions`] runs once per tick after motion integration. It is
//! an exclusive system that works in three passes:
//!
//! 1. **Snapshot** every body (`Transform` + `RigidBody` + `Colliders`) with
//!    its shapes resolved into simulation space.
//! 2. **Plan**: for each owner, compare the snapshot against its
//!    [`CollisionLedger`] and collect [`Transition`]s. Nothing is mutated
//!    while scanning.
//! 3. **Apply** the transitions to the ledgers, then announce them as
//!    [`TriggerEnter`]/[`TriggerStay`]/[`TriggerExit`] events.
//!
//! The broad phase is the full candidate list (every other body); the narrow
//! phase is the OR over all shape pairs of the two entities. Records are
//! keyed by entity, never by individual shape.
//!
//! [`TriggerEnter`]: crate::events::trigger::TriggerEnter
//! [`TriggerStay`]: crate::events::trigger::TriggerStay
//! [`TriggerExit`]: crate::events::trigger::TriggerExit

use bevy_ecs::prelude::*;
use glam::Vec2;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::components::collider::{ColliderShape, Colliders, DebugShape, PlacedShape, any_overlap};
use crate::components::ledger::CollisionLedger;
use crate::components::rigidbody::RigidBody;
use crate::components::transform::Transform;
use crate::components::trigger::Contact;
use crate::events::trigger::{Transition, TriggerPhase, announce};
use crate::resources::physicsconfig::{ContactPolicy, PhysicsConfig};
use crate::resources::worldtime::WorldTime;

/// A body frozen in place for the duration of one collision pass.
#[derive(Debug, Clone)]
pub struct BodySnapshot {
    pub entity: Entity,
    /// Transform origin, the same point collider offsets are measured from.
    pub origin: Vec2,
    /// Radius used by the coarse check. Never smaller than half the
    /// transform width, nor than the farthest extent of any shape.
    pub reach: f32,
    pub shapes: SmallVec<[PlacedShape; 4]>,
}

impl BodySnapshot {
    pub fn new(entity: Entity, transform: &Transform, colliders: &Colliders) -> Self {
        let origin = transform.position + transform.local_position;
        let shapes = colliders.placed(transform);
        let reach = shapes
            .iter()
            .filter(|placed| !placed.shape.is_degenerate())
            .map(|placed| placed.center.distance(origin) + shape_extent(&placed.shape))
            .fold(transform.dimensions.width / 2.0, f32::max);
        Self {
            entity,
            origin,
            reach,
            shapes,
        }
    }

    /// Exact test: any shape of `self` overlaps any shape of `other`.
    /// A body never overlaps itself.
    pub fn overlaps(&self, other: &BodySnapshot) -> bool {
        self.entity != other.entity && any_overlap(&self.shapes, &other.shapes)
    }

    /// Coarse test: origins closer than the summed reaches.
    ///
    /// Reaches cover every shape, so two overlapping bodies are always near.
    pub fn is_near(&self, other: &BodySnapshot) -> bool {
        self.entity != other.entity && self.origin.distance(other.origin) < self.reach + other.reach
    }
}

/// Distance from a shape's centre to its farthest point.
fn shape_extent(shape: &ColliderShape) -> f32 {
    match *shape {
        ColliderShape::Circle { radius } => radius,
        ColliderShape::Rect { width, height } => Vec2::new(width, height).length() / 2.0,
    }
}

/// Snapshot every collidable body, ordered by entity for deterministic output.
pub fn snapshot_bodies(world: &mut World) -> Vec<BodySnapshot> {
    let mut query =
        world.query_filtered::<(Entity, &Transform, &Colliders), With<RigidBody>>();
    let mut bodies: Vec<BodySnapshot> = query
        .iter(world)
        .map(|(entity, transform, colliders)| BodySnapshot::new(entity, transform, colliders))
        .collect();
    bodies.sort_by_key(|b| b.entity);
    bodies
}

/// Compare the current snapshot with every ledger and list the transitions.
///
/// Ledger records whose owner or partner is no longer a body (destroyed, or
/// stripped of its collider) expire with an exit.
pub fn plan_transitions(
    world: &mut World,
    bodies: &[BodySnapshot],
    policy: ContactPolicy,
    tick: u64,
) -> Vec<Transition> {
    let live: FxHashSet<Entity> = bodies.iter().map(|b| b.entity).collect();
    let mut transitions = Vec::new();

    let mut ledgers = world.query::<(Entity, &CollisionLedger)>();
    let mut stale: Vec<(Entity, Entity)> = ledgers
        .iter(world)
        .flat_map(|(owner, ledger)| {
            let owner_live = live.contains(&owner);
            ledger
                .others()
                .filter(|other| !owner_live || !live.contains(other))
                .map(|other| (owner, other))
                .collect::<SmallVec<[(Entity, Entity); 4]>>()
        })
        .collect();
    stale.sort();
    transitions.extend(
        stale
            .into_iter()
            .map(|(owner, other)| Transition::new(TriggerPhase::Exit, owner, other, tick)),
    );

    for owner in bodies {
        let ledger = world.get::<CollisionLedger>(owner.entity);
        for other in bodies {
            if other.entity == owner.entity {
                continue;
            }
            let tracked = ledger.is_some_and(|l| l.contains(other.entity));
            let phase = if !tracked {
                owner.overlaps(other).then_some(TriggerPhase::Enter)
            } else {
                let holds = match policy {
                    ContactPolicy::Exact => owner.overlaps(other),
                    ContactPolicy::Hysteresis => owner.overlaps(other) || owner.is_near(other),
                };
                Some(if holds {
                    TriggerPhase::Stay
                } else {
                    TriggerPhase::Exit
                })
            };
            if let Some(phase) = phase {
                transitions.push(Transition::new(phase, owner.entity, other.entity, tick));
            }
        }
    }

    transitions
}

/// Write planned transitions into the ledgers, creating ledgers on demand.
pub fn apply_transitions(world: &mut World, transitions: &[Transition]) {
    for transition in transitions {
        let Contact {
            entity,
            other,
            tick,
        } = transition.contact;
        let Ok(mut owner) = world.get_entity_mut(entity) else {
            continue;
        };
        match transition.phase {
            TriggerPhase::Enter => {
                if !owner.contains::<CollisionLedger>() {
                    owner.insert(CollisionLedger::new());
                }
                if let Some(mut ledger) = owner.get_mut::<CollisionLedger>() {
                    ledger.open(entity, other, tick);
                }
            }
            TriggerPhase::Stay => {
                if let Some(mut ledger) = owner.get_mut::<CollisionLedger>() {
                    ledger.touch(other, tick);
                }
            }
            TriggerPhase::Exit => {
                if let Some(mut ledger) = owner.get_mut::<CollisionLedger>() {
                    ledger.close(other);
                }
            }
        }
    }
}

/// Per-tick collision pass: snapshot, plan, apply, announce.
pub fn detect_collisions(world: &mut World) {
    let policy = world
        .get_resource::<PhysicsConfig>()
        .map(|c| c.contact_policy)
        .unwrap_or_default();
    let tick = world
        .get_resource::<WorldTime>()
        .map(|t| t.frame_count)
        .unwrap_or(0);

    let bodies = snapshot_bodies(world);
    let transitions = plan_transitions(world, &bodies, policy, tick);
    apply_transitions(world, &transitions);

    if log::log_enabled!(log::Level::Debug) {
        let count = |phase| transitions.iter().filter(|t| t.phase == phase).count();
        let (enters, exits) = (count(TriggerPhase::Enter), count(TriggerPhase::Exit));
        if enters + exits > 0 {
            log::debug!(
                "tick {}: {} bodies, {} enter, {} exit",
                tick,
                bodies.len(),
                enters,
                exits
            );
        }
    }

    for transition in transitions {
        announce(world, transition);
    }
    // Lifecycle requests queued by handlers must reach PendingLifecycle this tick.
    world.flush();
}

/// Exact overlap query between two entities, independent of ledger state.
///
/// False for self-pairs and for entities lacking a transform or colliders.
pub fn is_colliding(world: &World, a: Entity, b: Entity) -> bool {
    if a == b {
        return false;
    }
    let snapshot = |entity| {
        let transform = world.get::<Transform>(entity)?;
        let colliders = world.get::<Colliders>(entity)?;
        Some(BodySnapshot::new(entity, transform, colliders))
    };
    match (snapshot(a), snapshot(b)) {
        (Some(a), Some(b)) => a.overlaps(&b),
        _ => false,
    }
}

/// World-space outlines of every collider, for an optional debug renderer.
pub fn collect_debug_shapes(world: &mut World) -> Vec<(Entity, DebugShape)> {
    let mut query = world.query::<(Entity, &Transform, &Colliders)>();
    query
        .iter(world)
        .flat_map(|(entity, transform, colliders)| {
            colliders
                .debug_shapes(transform)
                .into_iter()
                .map(move |shape| (entity, shape))
        })
        .collect()
}
