//! Collider shapes and the exact overlap predicates between them.
//!
//! An entity carries its shapes in a single [`Colliders`] component; several
//! small circles can approximate an irregular hull. Each [`Collider`] is
//! positioned relative to the owning entity's
//! [`Transform`](super::transform::Transform) and follows its rotation.
//!
//! Overlap between two entities is the OR of every shape pair. Any shape with
//! zero or negative area never overlaps anything.

use bevy_ecs::prelude::Component;
use glam::Vec2;
use smallvec::SmallVec;

use crate::components::transform::{Dimensions, Transform};

/// Geometry of a single collider.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ColliderShape {
    /// Circle; its bounding dimensions are always square (`2r x 2r`).
    Circle { radius: f32 },
    /// Axis-aligned rectangle centred on the collider position.
    Rect { width: f32, height: f32 },
}

impl ColliderShape {
    /// Bounding dimensions of the shape.
    pub fn dimensions(&self) -> Dimensions {
        match *self {
            ColliderShape::Circle { radius } => Dimensions::square(radius * 2.0),
            ColliderShape::Rect { width, height } => Dimensions::new(width, height),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.dimensions().is_degenerate()
    }
}

/// One shape attached to an entity, offset from its transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Collider {
    pub shape: ColliderShape,
    /// Offset from the entity transform, rotated with it.
    pub local_position: Vec2,
}

impl Collider {
    /// Circle collider centred on the entity.
    pub fn circle(radius: f32) -> Self {
        Self {
            shape: ColliderShape::Circle { radius },
            local_position: Vec2::ZERO,
        }
    }

    /// Rectangle collider centred on the entity.
    pub fn rect(width: f32, height: f32) -> Self {
        Self {
            shape: ColliderShape::Rect { width, height },
            local_position: Vec2::ZERO,
        }
    }

    /// Modify the collider with the given offset from the entity transform.
    pub fn with_offset(mut self, local_position: Vec2) -> Self {
        self.local_position = local_position;
        self
    }

    /// Resolve this collider against its owner's transform.
    pub fn placed(&self, transform: &Transform) -> PlacedShape {
        PlacedShape {
            center: transform.world_point(self.local_position),
            shape: self.shape,
        }
    }
}

/// A collider resolved into simulation space for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedShape {
    pub center: Vec2,
    pub shape: ColliderShape,
}

impl PlacedShape {
    /// Exact overlap test between two placed shapes.
    ///
    /// Degenerate shapes never overlap.
    pub fn overlaps(&self, other: &PlacedShape) -> bool {
        if self.shape.is_degenerate() || other.shape.is_degenerate() {
            return false;
        }
        match (self.shape, other.shape) {
            (ColliderShape::Circle { radius: ra }, ColliderShape::Circle { radius: rb }) => {
                circle_overlaps_circle(self.center, ra, other.center, rb)
            }
            (ColliderShape::Circle { radius }, ColliderShape::Rect { width, height }) => {
                circle_overlaps_rect(self.center, radius, other.center, width, height)
            }
            (ColliderShape::Rect { width, height }, ColliderShape::Circle { radius }) => {
                circle_overlaps_rect(other.center, radius, self.center, width, height)
            }
            (
                ColliderShape::Rect {
                    width: wa,
                    height: ha,
                },
                ColliderShape::Rect {
                    width: wb,
                    height: hb,
                },
            ) => rect_overlaps_rect(self.center, wa, ha, other.center, wb, hb),
        }
    }
}

/// Circle vs circle: strictly closer than the sum of the radii.
pub fn circle_overlaps_circle(center_a: Vec2, radius_a: f32, center_b: Vec2, radius_b: f32) -> bool {
    center_a.distance(center_b) < radius_a + radius_b
}

/// Circle vs axis-aligned rectangle.
///
/// Rejects on the expanded bounding box first, accepts when the circle centre
/// lies in the rectangle's horizontal or vertical band, and otherwise
/// compares the distance to the nearest corner against the radius.
pub fn circle_overlaps_rect(
    circle_center: Vec2,
    radius: f32,
    rect_center: Vec2,
    rect_width: f32,
    rect_height: f32,
) -> bool {
    let diff = (circle_center - rect_center).abs();
    let half_w = rect_width / 2.0;
    let half_h = rect_height / 2.0;

    if diff.x > half_w + radius {
        return false;
    }
    if diff.y > half_h + radius {
        return false;
    }
    if diff.x <= half_w {
        return true;
    }
    if diff.y <= half_h {
        return true;
    }

    let corner_sq = (diff.x - half_w).powi(2) + (diff.y - half_h).powi(2);
    corner_sq <= radius.powi(2)
}

/// Rect vs rect: strict axis-aligned overlap, touching edges do not count.
pub fn rect_overlaps_rect(
    center_a: Vec2,
    width_a: f32,
    height_a: f32,
    center_b: Vec2,
    width_b: f32,
    height_b: f32,
) -> bool {
    let diff = (center_a - center_b).abs();
    diff.x < (width_a + width_b) / 2.0 && diff.y < (height_a + height_b) / 2.0
}

/// Outline handed to an optional debug renderer. Never read by physics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DebugShape {
    Circle { center: Vec2, radius: f32 },
    Rect { center: Vec2, width: f32, height: f32 },
}

/// Every collider attached to an entity.
///
/// Requires [`Transform`] and [`RigidBody`](super::rigidbody::RigidBody) on
/// the same entity; see [`crate::registry`].
#[derive(Component, Clone, Debug, Default)]
pub struct Colliders {
    pub shapes: SmallVec<[Collider; 4]>,
}

impl Colliders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(collider: Collider) -> Self {
        let mut colliders = Self::new();
        colliders.push(collider);
        colliders
    }

    pub fn with(mut self, collider: Collider) -> Self {
        self.push(collider);
        self
    }

    pub fn push(&mut self, collider: Collider) {
        self.shapes.push(collider);
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Collider> {
        self.shapes.iter()
    }

    /// Resolve all shapes into simulation space.
    pub fn placed(&self, transform: &Transform) -> SmallVec<[PlacedShape; 4]> {
        self.shapes.iter().map(|c| c.placed(transform)).collect()
    }

    /// Debug-draw hook: world-space outlines of every shape.
    pub fn debug_shapes(&self, transform: &Transform) -> Vec<DebugShape> {
        self.placed(transform)
            .into_iter()
            .map(|placed| match placed.shape {
                ColliderShape::Circle { radius } => DebugShape::Circle {
                    center: placed.center,
                    radius,
                },
                ColliderShape::Rect { width, height } => DebugShape::Rect {
                    center: placed.center,
                    width,
                    height,
                },
            })
            .collect()
    }
}

/// True if any shape in `a` overlaps any shape in `b`.
pub fn any_overlap(a: &[PlacedShape], b: &[PlacedShape]) -> bool {
    a.iter().any(|sa| b.iter().any(|sb| sa.overlaps(sb)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circle_at(x: f32, y: f32, radius: f32) -> PlacedShape {
        PlacedShape {
            center: Vec2::new(x, y),
            shape: ColliderShape::Circle { radius },
        }
    }

    fn rect_at(x: f32, y: f32, width: f32, height: f32) -> PlacedShape {
        PlacedShape {
            center: Vec2::new(x, y),
            shape: ColliderShape::Rect { width, height },
        }
    }

    // ==================== CIRCLE VS CIRCLE ====================

    #[test]
    fn test_circles_overlap_inside_threshold() {
        assert!(circle_at(0.0, 0.0, 10.0).overlaps(&circle_at(15.0, 0.0, 10.0)));
    }

    #[test]
    fn test_circles_apart_beyond_threshold() {
        assert!(!circle_at(0.0, 0.0, 10.0).overlaps(&circle_at(25.0, 0.0, 10.0)));
    }

    #[test]
    fn test_circles_touching_do_not_overlap() {
        assert!(!circle_at(0.0, 0.0, 10.0).overlaps(&circle_at(20.0, 0.0, 10.0)));
    }

    // ==================== CIRCLE VS RECT ====================

    #[test]
    fn test_circle_rect_horizontal_band() {
        assert!(circle_at(0.0, 0.0, 10.0).overlaps(&rect_at(5.0, 0.0, 20.0, 20.0)));
    }

    #[test]
    fn test_circle_rect_vertical_band() {
        // diff = (15, 3): outside horizontal band, inside vertical band
        assert!(circle_at(0.0, 0.0, 10.0).overlaps(&rect_at(15.0, 3.0, 20.0, 20.0)));
    }

    #[test]
    fn test_circle_rect_corner_miss() {
        // corner^2 = 9^2 + 9^2 = 162 > 100
        assert!(!circle_at(0.0, 0.0, 10.0).overlaps(&rect_at(19.0, 19.0, 20.0, 20.0)));
    }

    #[test]
    fn test_circle_rect_corner_hit() {
        // corner^2 = 5^2 + 5^2 = 50 <= 100
        assert!(circle_at(0.0, 0.0, 10.0).overlaps(&rect_at(15.0, 15.0, 20.0, 20.0)));
    }

    #[test]
    fn test_circle_rect_far_on_x() {
        assert!(!circle_at(0.0, 0.0, 10.0).overlaps(&rect_at(21.0, 0.0, 20.0, 20.0)));
    }

    #[test]
    fn test_circle_rect_is_symmetric() {
        let c = circle_at(0.0, 0.0, 10.0);
        let r = rect_at(19.0, 19.0, 20.0, 20.0);
        assert_eq!(c.overlaps(&r), r.overlaps(&c));
        let r = rect_at(5.0, 0.0, 20.0, 20.0);
        assert_eq!(c.overlaps(&r), r.overlaps(&c));
    }

    // ==================== RECT VS RECT ====================

    #[test]
    fn test_rects_overlap() {
        assert!(rect_at(0.0, 0.0, 10.0, 10.0).overlaps(&rect_at(5.0, 5.0, 10.0, 10.0)));
    }

    #[test]
    fn test_rects_touching_edges_do_not_overlap() {
        assert!(!rect_at(0.0, 0.0, 10.0, 10.0).overlaps(&rect_at(10.0, 0.0, 10.0, 10.0)));
    }

    // ==================== DEGENERATE SHAPES ====================

    #[test]
    fn test_zero_radius_never_overlaps() {
        let dot = circle_at(0.0, 0.0, 0.0);
        assert!(!dot.overlaps(&circle_at(0.0, 0.0, 10.0)));
        assert!(!dot.overlaps(&rect_at(0.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn test_zero_area_rect_never_overlaps() {
        let line = rect_at(0.0, 0.0, 10.0, 0.0);
        assert!(!line.overlaps(&circle_at(0.0, 0.0, 10.0)));
        assert!(!line.overlaps(&rect_at(0.0, 0.0, 10.0, 10.0)));
    }

    // ==================== PLACEMENT ====================

    #[test]
    fn test_offset_collider_follows_transform() {
        let transform = Transform::new(100.0, 100.0);
        let placed = Collider::circle(5.0)
            .with_offset(Vec2::new(0.0, 15.0))
            .placed(&transform);
        assert_eq!(placed.center, Vec2::new(100.0, 115.0));
    }

    #[test]
    fn test_any_overlap_is_or_across_shapes() {
        let transform = Transform::new(0.0, 0.0);
        let hull = Colliders::new()
            .with(Collider::circle(5.0).with_offset(Vec2::new(0.0, 20.0)))
            .with(Collider::circle(5.0).with_offset(Vec2::new(0.0, -20.0)));
        let placed = hull.placed(&transform);

        assert!(any_overlap(&placed, &[circle_at(0.0, 22.0, 1.0)]));
        assert!(any_overlap(&placed, &[circle_at(0.0, -22.0, 1.0)]));
        assert!(!any_overlap(&placed, &[circle_at(0.0, 0.0, 1.0)]));
    }

    #[test]
    fn test_debug_shapes_are_world_space() {
        let transform = Transform::new(1.0, 2.0);
        let colliders = Colliders::single(Collider::rect(4.0, 6.0));
        assert_eq!(
            colliders.debug_shapes(&transform),
            vec![DebugShape::Rect {
                center: Vec2::new(1.0, 2.0),
                width: 4.0,
                height: 6.0,
            }]
        );
    }
}
