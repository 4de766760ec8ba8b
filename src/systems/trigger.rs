//! Delivery of lifecycle events to per-entity [`TriggerHandlers`].
//!
//! Register the three observers once per world (the
//! [`Simulation`](crate::simulation::Simulation) does this). Each one looks up
//! the handlers of the event's `entity` and calls the matching callback; an
//! entity without handlers, or without the specific callback, is skipped.

use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;

use crate::components::tag::Tag;
use crate::components::trigger::{Contact, TriggerCallback, TriggerHandlers};
use crate::events::trigger::{TriggerEnter, TriggerExit, TriggerStay};

fn dispatch(
    callback: impl Fn(&TriggerHandlers) -> Option<TriggerCallback>,
    contact: Contact,
    handlers: &Query<&TriggerHandlers>,
    tags: &Query<&Tag>,
    commands: &mut Commands,
) {
    if let Some(cb) = handlers.get(contact.entity).ok().and_then(callback) {
        cb(contact, commands, tags);
    }
}

pub fn dispatch_trigger_enter(
    trigger: On<TriggerEnter>,
    handlers: Query<&TriggerHandlers>,
    tags: Query<&Tag>,
    mut commands: Commands,
) {
    let event = trigger.event();
    let contact = Contact {
        entity: event.entity,
        other: event.other,
        tick: event.tick,
    };
    dispatch(|h| h.on_enter, contact, &handlers, &tags, &mut commands);
}

pub fn dispatch_trigger_stay(
    trigger: On<TriggerStay>,
    handlers: Query<&TriggerHandlers>,
    tags: Query<&Tag>,
    mut commands: Commands,
) {
    let event = trigger.event();
    let contact = Contact {
        entity: event.entity,
        other: event.other,
        tick: event.tick,
    };
    dispatch(|h| h.on_stay, contact, &handlers, &tags, &mut commands);
}

pub fn dispatch_trigger_exit(
    trigger: On<TriggerExit>,
    handlers: Query<&TriggerHandlers>,
    tags: Query<&Tag>,
    mut commands: Commands,
) {
    let event = trigger.event();
    let contact = Contact {
        entity: event.entity,
        other: event.other,
        tick: event.tick,
    };
    dispatch(|h| h.on_exit, contact, &handlers, &tags, &mut commands);
}

/// Register the three dispatch observers on `world`.
pub fn register_trigger_observers(world: &mut World) {
    world.add_observer(dispatch_trigger_enter);
    world.add_observer(dispatch_trigger_stay);
    world.add_observer(dispatch_trigger_exit);
    world.flush();
}
