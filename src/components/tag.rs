use bevy_ecs::prelude::Component;

/// Free-form label identifying what kind of entity this is ("ship", "bullet").
///
/// Trigger callbacks use it to decide how to react to a contact.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(pub &'static str);

impl Tag {
    pub fn new(name: &'static str) -> Self {
        Tag(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}
