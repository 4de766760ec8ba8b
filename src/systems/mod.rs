//! Engine systems.
//!
//! Submodules overview
//! - [`collision`] – snapshot, plan and apply collision ledger transitions
//! - [`lifecycle`] – apply deferred spawn/destroy requests at tick boundaries
//! - [`movement`] – integrate rigid bodies into their transforms
//! - [`sync`] – publish changed bodies to the sync port
//! - [`time`] – update simulation time, delta and tick index
//! - [`trigger`] – deliver lifecycle events to per-entity handlers

pub mod collision;
pub mod lifecycle;
pub mod movement;
pub mod sync;
pub mod time;
pub mod trigger;
