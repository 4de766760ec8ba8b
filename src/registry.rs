//! Entity instantiation and destruction for physics-bearing entities.
//!
//! The `bevy_ecs` [`World`] is the entity registry: typed component lookup,
//! identity comparison and iteration all come from it. This module adds the
//! two contracts the collision core depends on:
//!
//! - [`instantiate`] validates an [`EntitySpec`] against the static
//!   requirement table ([`RequiresSiblings`]) and the rigid body
//!   preconditions before anything is spawned. A misconfigured entity is
//!   refused loudly and never reaches the simulation.
//! - [`destroy`] removes an entity and synchronously purges every collision
//!   record that references it, firing [`TriggerExit`] on each former
//!   partner before the entity is despawned.
//!
//! [`TriggerExit`]: crate::events::trigger::TriggerExit

use std::fmt;

use bevy_ecs::prelude::*;
use smallvec::SmallVec;

use crate::components::collider::{Collider, Colliders};
use crate::components::ledger::CollisionLedger;
use crate::components::rigidbody::RigidBody;
use crate::components::tag::Tag;
use crate::components::transform::Transform;
use crate::components::trigger::TriggerHandlers;
use crate::events::trigger::{Transition, TriggerPhase, announce};
use crate::resources::syncbridge::{SyncMessage, body_state, publish_or_detach};
use crate::resources::worldtime::WorldTime;

/// Stable tag for the component kinds that take part in validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Transform,
    RigidBody,
    Colliders,
    TriggerHandlers,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComponentKind::Transform => "Transform",
            ComponentKind::RigidBody => "RigidBody",
            ComponentKind::Colliders => "Colliders",
            ComponentKind::TriggerHandlers => "TriggerHandlers",
        };
        f.write_str(name)
    }
}

/// Static declaration of the sibling components a component needs.
pub trait RequiresSiblings {
    const KIND: ComponentKind;
    const REQUIRED: &'static [ComponentKind];
}

impl RequiresSiblings for Transform {
    const KIND: ComponentKind = ComponentKind::Transform;
    const REQUIRED: &'static [ComponentKind] = &[];
}

impl RequiresSiblings for RigidBody {
    const KIND: ComponentKind = ComponentKind::RigidBody;
    const REQUIRED: &'static [ComponentKind] = &[ComponentKind::Transform];
}

impl RequiresSiblings for Colliders {
    const KIND: ComponentKind = ComponentKind::Colliders;
    const REQUIRED: &'static [ComponentKind] = &[ComponentKind::Transform, ComponentKind::RigidBody];
}

impl RequiresSiblings for TriggerHandlers {
    const KIND: ComponentKind = ComponentKind::TriggerHandlers;
    const REQUIRED: &'static [ComponentKind] = &[ComponentKind::Colliders];
}

/// Reasons an entity is refused at instantiation.
#[derive(Debug, Clone, PartialEq)]
pub enum SpawnError {
    /// `component` was requested without one of its required siblings.
    MissingComponent {
        component: ComponentKind,
        required: ComponentKind,
    },
    InvalidMass(f32),
    InvalidFriction(f32),
    InvalidClamp {
        max_velocity: f32,
        max_angular_velocity: f32,
    },
}

impl fmt::Display for SpawnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpawnError::MissingComponent {
                component,
                required,
            } => write!(f, "missing required component: {} requires {}", component, required),
            SpawnError::InvalidMass(mass) => {
                write!(f, "rigid body mass must be positive, got {}", mass)
            }
            SpawnError::InvalidFriction(friction) => {
                write!(f, "rigid body friction must be in [0, 1), got {}", friction)
            }
            SpawnError::InvalidClamp {
                max_velocity,
                max_angular_velocity,
            } => write!(
                f,
                "rigid body clamps must be non-negative, got max_velocity={} max_angular_velocity={}",
                max_velocity, max_angular_velocity
            ),
        }
    }
}

impl std::error::Error for SpawnError {}

/// Description of an entity to instantiate.
///
/// Every part is optional; [`instantiate`] checks the combination.
///
/// # Example
/// ```ignore
/// let ship = EntitySpec::new()
///     .with_tag("ship")
///     .with_transform(Transform::new(0.0, 0.0).with_dimensions(50.0, 50.0))
///     .with_rigidbody(RigidBody::new().with_friction(0.03))
///     .with_collider(Collider::circle(15.0).with_offset(Vec2::new(0.0, -10.0)))
///     .with_collider(Collider::circle(10.0).with_offset(Vec2::new(0.0, 15.0)));
/// let entity = instantiate(&mut world, ship)?;
/// ```
#[derive(Clone, Debug, Default)]
pub struct EntitySpec {
    pub tag: Option<Tag>,
    pub transform: Option<Transform>,
    pub rigidbody: Option<RigidBody>,
    pub colliders: Option<Colliders>,
    pub handlers: Option<TriggerHandlers>,
}

impl EntitySpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transform + rigid body with default values, the usual starting point.
    pub fn body(transform: Transform, rigidbody: RigidBody) -> Self {
        Self::new()
            .with_transform(transform)
            .with_rigidbody(rigidbody)
    }

    pub fn with_tag(mut self, name: &'static str) -> Self {
        self.tag = Some(Tag::new(name));
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn with_rigidbody(mut self, rigidbody: RigidBody) -> Self {
        self.rigidbody = Some(rigidbody);
        self
    }

    /// Append a collider, creating the [`Colliders`] set on first use.
    pub fn with_collider(mut self, collider: Collider) -> Self {
        self.colliders.get_or_insert_with(Colliders::new).push(collider);
        self
    }

    pub fn with_handlers(mut self, handlers: TriggerHandlers) -> Self {
        self.handlers = Some(handlers);
        self
    }

    fn kinds(&self) -> SmallVec<[ComponentKind; 4]> {
        let mut kinds = SmallVec::new();
        if self.transform.is_some() {
            kinds.push(ComponentKind::Transform);
        }
        if self.rigidbody.is_some() {
            kinds.push(ComponentKind::RigidBody);
        }
        if self.colliders.is_some() {
            kinds.push(ComponentKind::Colliders);
        }
        if self.handlers.is_some() {
            kinds.push(ComponentKind::TriggerHandlers);
        }
        kinds
    }

    fn check<C: RequiresSiblings>(&self, present: &[ComponentKind]) -> Result<(), SpawnError> {
        if !present.contains(&C::KIND) {
            return Ok(());
        }
        match C::REQUIRED.iter().find(|kind| !present.contains(kind)) {
            Some(&required) => Err(SpawnError::MissingComponent {
                component: C::KIND,
                required,
            }),
            None => Ok(()),
        }
    }

    /// Check sibling requirements and rigid body preconditions.
    pub fn validate(&self) -> Result<(), SpawnError> {
        let present = self.kinds();
        self.check::<Transform>(&present)?;
        self.check::<RigidBody>(&present)?;
        self.check::<Colliders>(&present)?;
        self.check::<TriggerHandlers>(&present)?;
        if let Some(rigidbody) = &self.rigidbody {
            rigidbody.validate()?;
        }
        if let (Some(colliders), Some(tag)) = (&self.colliders, &self.tag) {
            if colliders.iter().any(|c| c.shape.is_degenerate()) {
                log::warn!("'{}' has a zero-area collider; it will never collide", tag.name());
            }
        }
        Ok(())
    }
}

/// Validate `spec` and spawn it.
///
/// Nothing is spawned when validation fails. Observers of the sync port
/// receive an `Instantiated` message for bodies.
pub fn instantiate(world: &mut World, spec: EntitySpec) -> Result<Entity, SpawnError> {
    if let Err(e) = spec.validate() {
        log::error!(
            "Refusing to instantiate {}: {}",
            spec.tag.map(|t| t.name()).unwrap_or("entity"),
            e
        );
        return Err(e);
    }

    let EntitySpec {
        tag,
        transform,
        rigidbody,
        colliders,
        handlers,
    } = spec;

    let mut entity = world.spawn_empty();
    if let Some(tag) = tag {
        entity.insert(tag);
    }
    if let Some(transform) = transform {
        entity.insert(transform);
    }
    if let Some(rigidbody) = rigidbody {
        entity.insert(rigidbody);
    }
    if let Some(colliders) = colliders {
        entity.insert(colliders);
    }
    if let Some(handlers) = handlers {
        entity.insert(handlers);
    }
    let id = entity.id();

    log::debug!("Instantiated {:?} ({})", id, tag.map(|t| t.name()).unwrap_or("-"));

    if let Some(state) = body_state(world, id) {
        publish_or_detach(
            world,
            SyncMessage::Instantiated {
                tag: tag.map(|t| t.name().to_string()),
                state,
            },
        );
    }

    Ok(id)
}

/// Destroy `entity`, cascading through every collision ledger.
///
/// Each ledger holding a record for `entity` loses it and its owner receives
/// exactly one [`TriggerExit`](crate::events::trigger::TriggerExit) before
/// the entity is despawned. Returns false if the entity did not exist.
pub fn destroy(world: &mut World, entity: Entity) -> bool {
    if world.get_entity(entity).is_err() {
        return false;
    }

    let tick = world
        .get_resource::<WorldTime>()
        .map(|t| t.frame_count)
        .unwrap_or(0);

    // Snapshot-then-apply: collect affected owners first, then announce.
    let mut partners = Vec::new();
    let mut ledgers = world.query::<(Entity, &mut CollisionLedger)>();
    for (owner, mut ledger) in ledgers.iter_mut(world) {
        if owner != entity && ledger.close(entity).is_some() {
            partners.push(owner);
        }
    }

    for owner in partners {
        announce(world, Transition::new(TriggerPhase::Exit, owner, entity, tick));
    }

    let despawned = world.despawn(entity);
    if despawned {
        log::debug!("Destroyed {:?}", entity);
        publish_or_detach(
            world,
            SyncMessage::Destroyed {
                id: entity.to_bits(),
            },
        );
    }
    despawned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collider_without_rigidbody_is_refused() {
        let spec = EntitySpec::new()
            .with_transform(Transform::default())
            .with_collider(Collider::circle(1.0));
        assert_eq!(
            spec.validate(),
            Err(SpawnError::MissingComponent {
                component: ComponentKind::Colliders,
                required: ComponentKind::RigidBody,
            })
        );
    }

    #[test]
    fn test_collider_without_transform_is_refused() {
        let spec = EntitySpec::new()
            .with_rigidbody(RigidBody::new())
            .with_collider(Collider::circle(1.0));
        // RigidBody is checked first and also needs a Transform.
        assert_eq!(
            spec.validate(),
            Err(SpawnError::MissingComponent {
                component: ComponentKind::RigidBody,
                required: ComponentKind::Transform,
            })
        );
    }

    #[test]
    fn test_handlers_without_colliders_are_refused() {
        let spec = EntitySpec::body(Transform::default(), RigidBody::new())
            .with_handlers(TriggerHandlers::new());
        assert!(matches!(
            spec.validate(),
            Err(SpawnError::MissingComponent {
                component: ComponentKind::TriggerHandlers,
                ..
            })
        ));
    }

    #[test]
    fn test_full_spec_is_accepted() {
        let spec = EntitySpec::body(Transform::default(), RigidBody::new())
            .with_tag("ship")
            .with_collider(Collider::circle(1.0))
            .with_collider(Collider::rect(2.0, 2.0))
            .with_handlers(TriggerHandlers::new());
        assert!(spec.validate().is_ok());
        assert_eq!(spec.colliders.as_ref().map(|c| c.len()), Some(2));
    }

    #[test]
    fn test_invalid_mass_spawns_nothing() {
        let mut world = World::new();
        let spec = EntitySpec::body(Transform::default(), RigidBody::new().with_mass(0.0));
        let result = instantiate(&mut world, spec);
        assert!(matches!(result, Err(SpawnError::InvalidMass(_))));
        assert_eq!(world.query::<Entity>().iter(&world).count(), 0);
    }

    #[test]
    fn test_error_message_names_the_missing_component() {
        let err = SpawnError::MissingComponent {
            component: ComponentKind::Colliders,
            required: ComponentKind::Transform,
        };
        assert_eq!(
            err.to_string(),
            "missing required component: Colliders requires Transform"
        );
    }

    #[test]
    fn test_destroy_unknown_entity_returns_false() {
        let mut world = World::new();
        let entity = world.spawn_empty().id();
        assert!(world.despawn(entity));
        assert!(!destroy(&mut world, entity));
    }
}
