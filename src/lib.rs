//! Physics and collision core for a tick-driven 2D game.
//!
//! This crate exposes the ECS components, resources, systems and events that
//! advance rigid-body motion and track collision lifecycles (enter, stay,
//! exit) between entities, plus the [`simulation::Simulation`] driver that
//! runs them in order.

pub mod components;
pub mod events;
pub mod registry;
pub mod resources;
pub mod simulation;
pub mod systems;
