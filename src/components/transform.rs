//! Positional, rotational and dimensional state of an entity.
//!
//! [`Transform`] lives in simulation space. Rendering reads it through
//! [`Transform::canvas_position`], which shifts the simulation position by the
//! [`Viewport`](crate::resources::viewport::Viewport) offset owned by the
//! renderer.

use bevy_ecs::prelude::Component;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::resources::viewport::Viewport;

/// Width and height of an entity or shape, in world units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f32,
    pub height: f32,
}

impl Dimensions {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Square dimensions, as used by circle-shaped entities.
    pub fn square(side: f32) -> Self {
        Self {
            width: side,
            height: side,
        }
    }

    /// True when either side is zero, negative or NaN.
    ///
    /// Degenerate dimensions never collide with anything.
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self::square(1.0)
    }
}

/// Simulation-space placement of an entity.
///
/// # Fields
/// - `position` - centre of the entity in simulation space
/// - `rotation` - radians, unbounded (no wraparound is applied)
/// - `dimensions` - bounding width/height, also used by the coarse proximity check
/// - `local_position` - offset of this transform from the entity origin
#[derive(Component, Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec2,
    pub rotation: f32,
    pub dimensions: Dimensions,
    pub local_position: Vec2,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl Transform {
    /// Create a transform at `(x, y)` with unit dimensions and no rotation.
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            rotation: 0.0,
            dimensions: Dimensions::default(),
            local_position: Vec2::ZERO,
        }
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_dimensions(mut self, width: f32, height: f32) -> Self {
        self.dimensions = Dimensions::new(width, height);
        self
    }

    pub fn with_local_position(mut self, local_position: Vec2) -> Self {
        self.local_position = local_position;
        self
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn set_rotation(&mut self, rotation: f32) {
        self.rotation = rotation;
    }

    pub fn set_dimensions(&mut self, dimensions: Dimensions) {
        self.dimensions = dimensions;
    }

    /// Render-space position: simulation position shifted by the viewport offset.
    pub fn canvas_position(&self, viewport: &Viewport) -> Vec2 {
        self.position + viewport.offset
    }

    /// Map a point given relative to this transform into simulation space.
    ///
    /// The local point is rotated with the transform, so shapes attached
    /// off-centre follow the entity as it turns. Uses the same handedness as
    /// [`Transform::direction`]: local +Y always maps onto the facing direction.
    pub fn world_point(&self, local: Vec2) -> Vec2 {
        self.position + self.local_position + Vec2::from_angle(-self.rotation).rotate(local)
    }

    /// Unit vector the entity is facing.
    ///
    /// Rotation 0 faces +Y; positive rotation turns towards +X.
    pub fn direction(&self) -> Vec2 {
        Vec2::new(self.rotation.sin(), self.rotation.cos())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_transform_new_defaults() {
        let t = Transform::new(3.0, 4.0);
        assert_eq!(t.position, Vec2::new(3.0, 4.0));
        assert!(approx_eq(t.rotation, 0.0));
        assert_eq!(t.dimensions, Dimensions::square(1.0));
        assert_eq!(t.local_position, Vec2::ZERO);
    }

    #[test]
    fn test_canvas_position_adds_viewport_offset() {
        let t = Transform::new(10.0, 20.0);
        let viewport = Viewport::new(Vec2::new(-100.0, 5.0));
        assert_eq!(t.canvas_position(&viewport), Vec2::new(-90.0, 25.0));
    }

    #[test]
    fn test_canvas_position_follows_set_position() {
        let mut t = Transform::new(0.0, 0.0);
        let viewport = Viewport::new(Vec2::new(50.0, 50.0));
        t.set_position(Vec2::new(1.0, 2.0));
        assert_eq!(t.canvas_position(&viewport), Vec2::new(51.0, 52.0));
    }

    #[test]
    fn test_rotation_is_not_wrapped() {
        let mut t = Transform::default();
        t.set_rotation(10.0 * std::f32::consts::PI);
        assert!(approx_eq(t.rotation, 10.0 * std::f32::consts::PI));
    }

    #[test]
    fn test_world_point_without_rotation() {
        let t = Transform::new(10.0, 10.0);
        let p = t.world_point(Vec2::new(0.0, 15.0));
        assert!(approx_eq(p.x, 10.0));
        assert!(approx_eq(p.y, 25.0));
    }

    #[test]
    fn test_world_point_rotates_offset() {
        let t = Transform::new(0.0, 0.0).with_rotation(std::f32::consts::FRAC_PI_2);
        let p = t.world_point(Vec2::new(1.0, 0.0));
        assert!(approx_eq(p.x, 0.0));
        assert!(approx_eq(p.y, -1.0));
    }

    #[test]
    fn test_world_point_forward_matches_direction() {
        let t = Transform::new(0.0, 0.0).with_rotation(0.7);
        let p = t.world_point(Vec2::new(0.0, 1.0));
        let d = t.direction();
        assert!(approx_eq(p.x, d.x));
        assert!(approx_eq(p.y, d.y));
    }

    #[test]
    fn test_world_point_includes_local_position() {
        let t = Transform::new(1.0, 1.0).with_local_position(Vec2::new(2.0, 0.0));
        assert_eq!(t.world_point(Vec2::ZERO), Vec2::new(3.0, 1.0));
    }

    #[test]
    fn test_degenerate_dimensions() {
        assert!(Dimensions::new(0.0, 10.0).is_degenerate());
        assert!(Dimensions::new(10.0, -1.0).is_degenerate());
        assert!(Dimensions::new(f32::NAN, 1.0).is_degenerate());
        assert!(!Dimensions::new(0.5, 0.5).is_degenerate());
    }

    #[test]
    fn test_direction_at_zero_rotation_faces_up_axis() {
        let t = Transform::default();
        let d = t.direction();
        assert!(approx_eq(d.x, 0.0));
        assert!(approx_eq(d.y, 1.0));
    }
}
