//! Render-space offset published by the rendering collaborator.
//!
//! In a multi-screen layout each screen shows a horizontal slice of the
//! simulation; the renderer sets `offset` to the slice displacement and reads
//! [`Transform::canvas_position`](crate::components::transform::Transform::canvas_position).
//! Physics never writes this resource.

use bevy_ecs::prelude::Resource;
use glam::Vec2;

#[derive(Resource, Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    pub offset: Vec2,
}

impl Viewport {
    pub fn new(offset: Vec2) -> Self {
        Self { offset }
    }
}
