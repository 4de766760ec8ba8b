//! Per-entity collision lifecycle callbacks.
//!
//! [`TriggerHandlers`] is the explicit registration of the enter/stay/exit
//! behaviour an entity implements. It is resolved once when the entity is
//! built; the `dispatch_trigger_*` observers in
//! [`crate::systems::trigger`] look it up when a lifecycle event fires for
//! the owning entity.

use bevy_ecs::prelude::*;

use crate::components::tag::Tag;

/// The owning entity and its counterpart in a contact episode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Contact {
    /// Entity whose ledger produced the event (the callback receiver).
    pub entity: Entity,
    /// The other participant.
    pub other: Entity,
    /// Tick on which the transition happened.
    pub tick: u64,
}

/// Callback signature for lifecycle handlers.
///
/// Structural changes (spawning, destroying) must go through
/// [`defer_destroy`](crate::resources::lifecycle::defer_destroy) and
/// [`defer_spawn`](crate::resources::lifecycle::defer_spawn) so they land on a
/// tick boundary.
pub type TriggerCallback = fn(contact: Contact, commands: &mut Commands, tags: &Query<&Tag>);

/// Optional enter/stay/exit callbacks for one entity.
#[derive(Component, Clone, Copy, Default)]
pub struct TriggerHandlers {
    pub on_enter: Option<TriggerCallback>,
    pub on_stay: Option<TriggerCallback>,
    pub on_exit: Option<TriggerCallback>,
}

impl TriggerHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_enter(mut self, callback: TriggerCallback) -> Self {
        self.on_enter = Some(callback);
        self
    }

    pub fn on_stay(mut self, callback: TriggerCallback) -> Self {
        self.on_stay = Some(callback);
        self
    }

    pub fn on_exit(mut self, callback: TriggerCallback) -> Self {
        self.on_exit = Some(callback);
        self
    }
}

impl std::fmt::Debug for TriggerHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerHandlers")
            .field("on_enter", &self.on_enter.is_some())
            .field("on_stay", &self.on_stay.is_some())
            .field("on_exit", &self.on_exit.is_some())
            .finish()
    }
}
