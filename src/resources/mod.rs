//! ECS resources made available to systems.
//!
//! Overview
//! - `lifecycle` – spawn/destroy requests deferred to the next tick boundary
//! - `physicsconfig` – tick rate, collision policy and viewport settings
//! - `syncbridge` – outbound channel for mirroring bodies to remote screens
//! - `viewport` – render-space offset owned by the renderer
//! - `worldtime` – simulation time, delta and tick index
pub mod lifecycle;
pub mod physicsconfig;
pub mod syncbridge;
pub mod viewport;
pub mod worldtime;
