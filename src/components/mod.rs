//! ECS components for physics-bearing entities.
//!
//! Submodules overview:
//! - [`collider`] – circle/rect shapes, exact overlap predicates, debug outlines
//! - [`ledger`] – per-entity record of active collision pairs
//! - [`rigidbody`] – velocity integrator with friction, forces and clamps
//! - [`tag`] – label identifying the kind of entity
//! - [`transform`] – position, rotation and dimensions
//! - [`trigger`] – enter/stay/exit callback registration

pub mod collider;
pub mod ledger;
pub mod rigidbody;
pub mod tag;
pub mod transform;
pub mod trigger;
