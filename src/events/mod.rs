//! Event types exchanged between the physics core and game logic.
//!
//! Submodules:
//! - [`trigger`] – collision lifecycle (enter/stay/exit) notifications
pub mod trigger;
