//! Collision lifecycle events.
//!
//! [`detect_collisions`](crate::systems::collision::detect_collisions) and
//! [`registry::destroy`](crate::registry::destroy) trigger one of these per
//! ledger transition, always from the point of view of `entity` (the ledger
//! owner). A contact between `A` and `B` therefore produces one event for
//! `A` and one for `B`.
//!
//! | event           | fires                                                   |
//! |-----------------|---------------------------------------------------------|
//! | [`TriggerEnter`] | once, on the tick the pair starts overlapping           |
//! | [`TriggerStay`]  | every following tick the pair keeps overlapping         |
//! | [`TriggerExit`]  | once, when the pair separates or `other` is destroyed   |
//!
//! Observers registered with `world.add_observer` receive every event; use
//! [`TriggerHandlers`](crate::components::trigger::TriggerHandlers) for
//! per-entity callbacks.

use bevy_ecs::prelude::*;

use crate::components::trigger::Contact;

/// A pair started overlapping.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerEnter {
    pub entity: Entity,
    pub other: Entity,
    pub tick: u64,
}

/// A tracked pair is still overlapping.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerStay {
    pub entity: Entity,
    pub other: Entity,
    pub tick: u64,
}

/// A tracked pair separated, or one side was destroyed.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerExit {
    pub entity: Entity,
    pub other: Entity,
    pub tick: u64,
}

/// Which edge of the lifecycle a transition represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerPhase {
    Enter,
    Stay,
    Exit,
}

/// A ledger transition waiting to be announced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub phase: TriggerPhase,
    pub contact: Contact,
}

impl Transition {
    pub fn new(phase: TriggerPhase, entity: Entity, other: Entity, tick: u64) -> Self {
        Self {
            phase,
            contact: Contact {
                entity,
                other,
                tick,
            },
        }
    }
}

/// Trigger the event matching `transition` on the world.
pub fn announce(world: &mut World, transition: Transition) {
    let Contact {
        entity,
        other,
        tick,
    } = transition.contact;
    log::trace!(
        "{:?} {:?} <-> {:?} at tick {}",
        transition.phase,
        entity,
        other,
        tick
    );
    match transition.phase {
        TriggerPhase::Enter => world.trigger(TriggerEnter {
            entity,
            other,
            tick,
        }),
        TriggerPhase::Stay => world.trigger(TriggerStay {
            entity,
            other,
            tick,
        }),
        TriggerPhase::Exit => world.trigger(TriggerExit {
            entity,
            other,
            tick,
        }),
    }
}
