use bevy_ecs::prelude::*;

use crate::components::rigidbody::RigidBody;
use crate::components::transform::Transform;

/// Integrate every rigid body exactly once and write back into its transform.
///
/// Runs before [`detect_collisions`](crate::systems::collision::detect_collisions)
/// so the collision pass only ever sees post-integration positions.
pub fn integrate_motion(mut query: Query<(&mut Transform, &mut RigidBody)>) {
    for (mut transform, mut rigidbody) in query.iter_mut() {
        rigidbody.integrate(&mut transform);
    }
}
