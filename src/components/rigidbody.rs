//! Rigid body component: velocity integrator with friction and clamps.
//!
//! The [`RigidBody`] component stores linear and angular velocity for an
//! entity and advances its [`Transform`] once per tick. Forces reach the body
//! in two ways:
//!
//! - one-shot forces/torques pushed with [`RigidBody::apply_force`] and
//!   [`RigidBody::apply_torque`], consumed by the next integration;
//! - named persistent forces (gravity, wind, thrusters) that are added every
//!   tick while enabled.
//!
//! Velocities are expressed in world units per tick. The `frozen` flag
//! suspends integration entirely, useful when an entity's position is driven
//! externally.

use bevy_ecs::prelude::Component;
use glam::Vec2;
use rustc_hash::FxHashMap;

use crate::components::transform::Transform;
use crate::registry::SpawnError;

/// A named force that can be toggled on/off.
#[derive(Clone, Copy, Debug)]
pub struct ForceSource {
    /// The force vector, divided by mass on integration.
    pub value: Vec2,
    /// Whether this force is currently active.
    pub enabled: bool,
}

impl ForceSource {
    /// Create a new enabled force.
    pub fn new(value: Vec2) -> Self {
        Self {
            value,
            enabled: true,
        }
    }

    /// Create a new force with specified enabled state.
    pub fn with_enabled(value: Vec2, enabled: bool) -> Self {
        Self { value, enabled }
    }
}

/// Physical-motion state of an entity.
///
/// Integrated by [`integrate_motion`](crate::systems::movement::integrate_motion)
/// before collision detection runs, so colliders always observe post-step
/// positions.
///
/// # Fields
/// - `velocity` - world units per tick
/// - `angular_velocity` - radians per tick
/// - `mass` - must be strictly positive, checked when the entity is instantiated
/// - `friction` - fraction of velocity lost each tick, in `[0, 1)`
/// - `max_velocity` / `max_angular_velocity` - magnitude clamps applied after every step
/// - `forces` - named persistent forces
/// - `frozen` - when true, integration is skipped and pending forces are dropped
///
/// # Example
/// ```ignore
/// let mut rb = RigidBody::new().with_mass(3.0).with_friction(0.03);
/// rb.add_force("gravity", Vec2::new(0.0, -0.2));
/// rb.apply_force(Vec2::new(3.0, 0.0)); // thrust for this tick only
/// ```
#[derive(Component, Clone, Debug)]
pub struct RigidBody {
    pub velocity: Vec2,
    pub angular_velocity: f32,
    pub mass: f32,
    pub friction: f32,
    pub max_velocity: f32,
    pub max_angular_velocity: f32,
    pub forces: FxHashMap<String, ForceSource>,
    pub frozen: bool,
    pending_force: Vec2,
    pending_torque: f32,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self::new()
    }
}

impl RigidBody {
    /// Unit mass, no friction, no forces and unbounded speed.
    pub fn new() -> Self {
        Self {
            velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            mass: 1.0,
            friction: 0.0,
            max_velocity: f32::INFINITY,
            max_angular_velocity: f32::INFINITY,
            forces: FxHashMap::default(),
            frozen: false,
            pending_force: Vec2::ZERO,
            pending_torque: 0.0,
        }
    }

    /// Create a RigidBody with damping and clamps configured.
    ///
    /// # Arguments
    /// * `friction` - fraction of velocity lost per tick (0.0 = none, 0.03 = light drag)
    /// * `max_velocity` - linear speed clamp
    /// * `max_angular_velocity` - angular speed clamp
    pub fn with_physics(friction: f32, max_velocity: f32, max_angular_velocity: f32) -> Self {
        Self {
            friction,
            max_velocity,
            max_angular_velocity,
            ..Self::new()
        }
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_angular_velocity(mut self, angular_velocity: f32) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    pub fn with_max_velocity(mut self, max_velocity: f32) -> Self {
        self.max_velocity = max_velocity;
        self
    }

    pub fn with_max_angular_velocity(mut self, max_angular_velocity: f32) -> Self {
        self.max_angular_velocity = max_angular_velocity;
        self
    }

    /// Check the construction preconditions.
    ///
    /// Mass must be finite and strictly positive, friction must lie in
    /// `[0, 1)` and both clamps must be non-negative.
    pub fn validate(&self) -> Result<(), SpawnError> {
        if !(self.mass > 0.0 && self.mass.is_finite()) {
            return Err(SpawnError::InvalidMass(self.mass));
        }
        if !(0.0..1.0).contains(&self.friction) {
            return Err(SpawnError::InvalidFriction(self.friction));
        }
        if !(self.max_velocity >= 0.0) || !(self.max_angular_velocity >= 0.0) {
            return Err(SpawnError::InvalidClamp {
                max_velocity: self.max_velocity,
                max_angular_velocity: self.max_angular_velocity,
            });
        }
        Ok(())
    }

    /// Accumulate a force to be applied by the next integration.
    pub fn apply_force(&mut self, force: Vec2) {
        self.pending_force += force;
    }

    /// Accumulate a torque to be applied by the next integration.
    pub fn apply_torque(&mut self, torque: f32) {
        self.pending_torque += torque;
    }

    /// Force accumulated since the previous integration.
    pub fn pending_force(&self) -> Vec2 {
        self.pending_force
    }

    /// Torque accumulated since the previous integration.
    pub fn pending_torque(&self) -> f32 {
        self.pending_torque
    }

    /// Add or update a named persistent force (enabled by default).
    pub fn add_force(&mut self, name: &str, value: Vec2) {
        self.forces.insert(name.to_string(), ForceSource::new(value));
    }

    /// Add or update a named persistent force with specified enabled state.
    pub fn add_force_with_state(&mut self, name: &str, value: Vec2, enabled: bool) {
        self.forces
            .insert(name.to_string(), ForceSource::with_enabled(value, enabled));
    }

    /// Remove a named force entirely.
    pub fn remove_force(&mut self, name: &str) {
        self.forces.remove(name);
    }

    /// Enable or disable a specific force by name.
    /// Returns false if the force doesn't exist.
    pub fn set_force_enabled(&mut self, name: &str, enabled: bool) -> bool {
        if let Some(force) = self.forces.get_mut(name) {
            force.enabled = enabled;
            true
        } else {
            false
        }
    }

    /// Check if a force exists and is enabled.
    pub fn is_force_enabled(&self, name: &str) -> bool {
        self.forces.get(name).map(|f| f.enabled).unwrap_or(false)
    }

    /// Get a named force.
    pub fn get_force(&self, name: &str) -> Option<&ForceSource> {
        self.forces.get(name)
    }

    /// Sum of all enabled persistent forces.
    pub fn total_force(&self) -> Vec2 {
        self.forces
            .values()
            .filter(|f| f.enabled)
            .fold(Vec2::ZERO, |acc, f| acc + f.value)
    }

    /// Freeze the rigid body, preventing integration.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Unfreeze the rigid body.
    pub fn unfreeze(&mut self) {
        self.frozen = false;
    }

    /// Set speed while maintaining the current direction of velocity.
    ///
    /// If the current velocity is zero this is a no-op, since there is no
    /// direction to maintain. The result is still subject to `max_velocity`
    /// on the next integration.
    pub fn set_speed(&mut self, new_speed: f32) {
        match self.velocity.try_normalize() {
            Some(direction) => self.velocity = direction * new_speed,
            None => {
                log::warn!("RigidBody::set_speed called with zero velocity - operation ignored")
            }
        }
    }

    /// Advance one tick and write the result into `transform`.
    ///
    /// Order of operations:
    /// 1. `velocity += (pending + persistent forces) / mass`
    /// 2. `velocity *= 1 - friction`
    /// 3. clamp `|velocity|` to `max_velocity`
    /// 4. same three steps for angular velocity against `max_angular_velocity`
    /// 5. `position += velocity`, `rotation += angular_velocity`
    ///
    /// Pending forces are cleared afterwards, so each call consumes exactly
    /// what was applied since the previous one.
    pub fn integrate(&mut self, transform: &mut Transform) {
        if self.frozen {
            self.clear_pending();
            return;
        }

        let force = self.pending_force + self.total_force();
        self.velocity += force / self.mass;
        self.velocity *= 1.0 - self.friction;
        self.velocity = self.velocity.clamp_length_max(self.max_velocity);

        self.angular_velocity += self.pending_torque / self.mass;
        self.angular_velocity *= 1.0 - self.friction;
        if self.angular_velocity.abs() > self.max_angular_velocity {
            self.angular_velocity = self.max_angular_velocity.copysign(self.angular_velocity);
        }

        transform.position += self.velocity;
        transform.rotation += self.angular_velocity;

        self.clear_pending();
    }

    fn clear_pending(&mut self) {
        self.pending_force = Vec2::ZERO;
        self.pending_torque = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn vec_approx_eq(a: Vec2, b: Vec2) -> bool {
        approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
    }

    // ==================== CONSTRUCTOR TESTS ====================

    #[test]
    fn test_rigidbody_new() {
        let rb = RigidBody::new();
        assert!(vec_approx_eq(rb.velocity, Vec2::ZERO));
        assert!(approx_eq(rb.mass, 1.0));
        assert!(approx_eq(rb.friction, 0.0));
        assert!(rb.forces.is_empty());
        assert!(!rb.frozen);
        assert!(rb.validate().is_ok());
    }

    #[test]
    fn test_rigidbody_with_physics() {
        let rb = RigidBody::with_physics(0.03, 8.0, 0.2);
        assert!(approx_eq(rb.friction, 0.03));
        assert!(approx_eq(rb.max_velocity, 8.0));
        assert!(approx_eq(rb.max_angular_velocity, 0.2));
        assert!(approx_eq(rb.mass, 1.0));
    }

    // ==================== VALIDATION TESTS ====================

    #[test]
    fn test_validate_rejects_zero_mass() {
        let rb = RigidBody::new().with_mass(0.0);
        assert!(matches!(rb.validate(), Err(SpawnError::InvalidMass(_))));
    }

    #[test]
    fn test_validate_rejects_negative_mass() {
        let rb = RigidBody::new().with_mass(-2.0);
        assert!(matches!(rb.validate(), Err(SpawnError::InvalidMass(_))));
    }

    #[test]
    fn test_validate_rejects_nan_mass() {
        let rb = RigidBody::new().with_mass(f32::NAN);
        assert!(matches!(rb.validate(), Err(SpawnError::InvalidMass(_))));
    }

    #[test]
    fn test_validate_rejects_friction_of_one() {
        let rb = RigidBody::new().with_friction(1.0);
        assert!(matches!(rb.validate(), Err(SpawnError::InvalidFriction(_))));
    }

    #[test]
    fn test_validate_rejects_negative_clamp() {
        let rb = RigidBody::new().with_max_velocity(-1.0);
        assert!(matches!(rb.validate(), Err(SpawnError::InvalidClamp { .. })));
    }

    // ==================== FORCE MANAGEMENT TESTS ====================

    #[test]
    fn test_add_force_overwrites() {
        let mut rb = RigidBody::new();
        rb.add_force("gravity", Vec2::new(0.0, 1.0));
        rb.add_force("gravity", Vec2::new(0.0, 2.0));
        assert_eq!(rb.forces.len(), 1);
        assert!(approx_eq(rb.get_force("gravity").unwrap().value.y, 2.0));
    }

    #[test]
    fn test_set_force_enabled_nonexistent() {
        let mut rb = RigidBody::new();
        assert!(!rb.set_force_enabled("nonexistent", true));
        assert!(!rb.is_force_enabled("nonexistent"));
    }

    #[test]
    fn test_total_force_excludes_disabled() {
        let mut rb = RigidBody::new();
        rb.add_force("gravity", Vec2::new(0.0, -1.0));
        rb.add_force_with_state("wind", Vec2::new(5.0, 0.0), false);
        assert!(vec_approx_eq(rb.total_force(), Vec2::new(0.0, -1.0)));

        rb.set_force_enabled("wind", true);
        assert!(vec_approx_eq(rb.total_force(), Vec2::new(5.0, -1.0)));

        rb.remove_force("gravity");
        assert!(vec_approx_eq(rb.total_force(), Vec2::new(5.0, 0.0)));
    }

    // ==================== INTEGRATION TESTS ====================

    #[test]
    fn test_integrate_divides_force_by_mass() {
        let mut rb = RigidBody::new().with_mass(2.0);
        let mut t = Transform::default();
        rb.apply_force(Vec2::new(4.0, 0.0));
        rb.integrate(&mut t);
        assert!(vec_approx_eq(rb.velocity, Vec2::new(2.0, 0.0)));
        assert!(vec_approx_eq(t.position, Vec2::new(2.0, 0.0)));
    }

    #[test]
    fn test_integrate_consumes_pending_force() {
        let mut rb = RigidBody::new();
        let mut t = Transform::default();
        rb.apply_force(Vec2::new(1.0, 0.0));
        rb.apply_force(Vec2::new(1.0, 0.0));
        assert!(vec_approx_eq(rb.pending_force(), Vec2::new(2.0, 0.0)));
        rb.integrate(&mut t);
        assert!(vec_approx_eq(rb.pending_force(), Vec2::ZERO));
        rb.integrate(&mut t);
        // no new force: velocity unchanged, position advanced twice
        assert!(vec_approx_eq(rb.velocity, Vec2::new(2.0, 0.0)));
        assert!(vec_approx_eq(t.position, Vec2::new(4.0, 0.0)));
    }

    #[test]
    fn test_integrate_applies_friction_after_force() {
        let mut rb = RigidBody::new().with_friction(0.5);
        let mut t = Transform::default();
        rb.apply_force(Vec2::new(4.0, 0.0));
        rb.integrate(&mut t);
        assert!(vec_approx_eq(rb.velocity, Vec2::new(2.0, 0.0)));
    }

    #[test]
    fn test_integrate_clamps_velocity() {
        let mut rb = RigidBody::new().with_max_velocity(5.0);
        let mut t = Transform::default();
        rb.apply_force(Vec2::new(30.0, 40.0));
        rb.integrate(&mut t);
        assert!(approx_eq(rb.velocity.length(), 5.0));
        assert!(vec_approx_eq(rb.velocity, Vec2::new(3.0, 4.0)));
        assert!(vec_approx_eq(t.position, Vec2::new(3.0, 4.0)));
    }

    #[test]
    fn test_integrate_clamps_angular_velocity_both_signs() {
        let mut rb = RigidBody::new().with_max_angular_velocity(0.1);
        let mut t = Transform::default();
        rb.apply_torque(3.0);
        rb.integrate(&mut t);
        assert!(approx_eq(rb.angular_velocity, 0.1));
        assert!(approx_eq(t.rotation, 0.1));

        rb.apply_torque(-10.0);
        rb.integrate(&mut t);
        assert!(approx_eq(rb.angular_velocity, -0.1));
        assert!(approx_eq(t.rotation, 0.0));
    }

    #[test]
    fn test_integrate_uses_persistent_forces_every_tick() {
        let mut rb = RigidBody::new();
        let mut t = Transform::default();
        rb.add_force("gravity", Vec2::new(0.0, -1.0));
        rb.integrate(&mut t);
        rb.integrate(&mut t);
        assert!(vec_approx_eq(rb.velocity, Vec2::new(0.0, -2.0)));
        assert!(vec_approx_eq(t.position, Vec2::new(0.0, -3.0)));
    }

    #[test]
    fn test_integrate_frozen_drops_pending_and_keeps_position() {
        let mut rb = RigidBody::new().with_velocity(Vec2::new(1.0, 1.0));
        let mut t = Transform::new(5.0, 5.0);
        rb.freeze();
        rb.apply_force(Vec2::new(10.0, 0.0));
        rb.integrate(&mut t);
        assert!(vec_approx_eq(t.position, Vec2::new(5.0, 5.0)));
        assert!(vec_approx_eq(rb.pending_force(), Vec2::ZERO));

        rb.unfreeze();
        rb.integrate(&mut t);
        assert!(vec_approx_eq(t.position, Vec2::new(6.0, 6.0)));
    }

    #[test]
    fn test_velocity_decays_monotonically_and_stays_clamped() {
        let mut rb = RigidBody::with_physics(0.1, 4.0, 1.0).with_velocity(Vec2::new(10.0, 0.0));
        let mut t = Transform::default();
        let mut previous = f32::INFINITY;
        for _ in 0..200 {
            rb.integrate(&mut t);
            let speed = rb.velocity.length();
            assert!(speed <= 4.0 + EPSILON);
            assert!(speed <= previous);
            previous = speed;
        }
        assert!(previous < 1e-3);
    }

    // ==================== SET SPEED TESTS ====================

    #[test]
    fn test_set_speed_maintains_direction() {
        let mut rb = RigidBody::new().with_velocity(Vec2::new(3.0, 4.0));
        rb.set_speed(10.0);
        assert!(vec_approx_eq(rb.velocity, Vec2::new(6.0, 8.0)));
    }

    #[test]
    fn test_set_speed_with_zero_velocity() {
        let mut rb = RigidBody::new();
        rb.set_speed(10.0);
        assert!(vec_approx_eq(rb.velocity, Vec2::ZERO));
    }
}
