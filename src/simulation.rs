//! Fixed-tick driver owning the ECS world.
//!
//! One call to [`Simulation::tick`] is one world tick, run synchronously to
//! completion:
//!
//! 1. advance [`WorldTime`]
//! 2. [`integrate_motion`] for every rigid body
//! 3. [`detect_collisions`] (snapshot, reconcile ledgers, fire lifecycle events)
//! 4. [`publish_body_states`] to the sync port, if one is injected
//! 5. apply spawn/destroy requests deferred during the tick
//! 6. clear change trackers
//!
//! Integration for all bodies always completes before any collision test, so
//! collisions only ever see positions from the current tick.

use bevy_ecs::prelude::*;
use crossbeam_channel::Receiver;

use crate::components::rigidbody::RigidBody;
use crate::components::transform::Transform;
use crate::registry::{self, EntitySpec, SpawnError};
use crate::resources::lifecycle::PendingLifecycle;
use crate::resources::physicsconfig::PhysicsConfig;
use crate::resources::syncbridge::{BodyState, SyncMessage, setup_sync};
use crate::resources::viewport::Viewport;
use crate::resources::worldtime::WorldTime;
use crate::systems::collision::detect_collisions;
use crate::systems::lifecycle::apply_pending_lifecycle;
use crate::systems::movement::integrate_motion;
use crate::systems::sync::publish_body_states;
use crate::systems::time::update_world_time;
use crate::systems::trigger::register_trigger_observers;

pub struct Simulation {
    world: World,
    schedule: Schedule,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}

impl Simulation {
    /// Build a world with the physics resources, observers and tick schedule.
    pub fn new(config: PhysicsConfig) -> Self {
        let mut world = World::new();
        world.insert_resource(WorldTime::default().with_time_scale(config.time_scale));
        world.insert_resource(Viewport::new(config.viewport_offset));
        world.insert_resource(PendingLifecycle::new());
        log::info!(
            "Simulation ready: {} Hz, {} contact policy",
            config.tick_hz,
            config.contact_policy
        );
        world.insert_resource(config);

        register_trigger_observers(&mut world);

        let mut schedule = Schedule::default();
        schedule.add_systems((integrate_motion, detect_collisions, publish_body_states).chain());

        Self { world, schedule }
    }

    /// Inject the network-sync port and return its receiving end.
    pub fn attach_sync(&mut self) -> Receiver<SyncMessage> {
        setup_sync(&mut self.world)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn config(&self) -> &PhysicsConfig {
        self.world.resource::<PhysicsConfig>()
    }

    /// Current tick index (0 before the first tick).
    pub fn tick_count(&self) -> u64 {
        self.world.resource::<WorldTime>().frame_count
    }

    /// Instantiate immediately. Use between ticks.
    pub fn instantiate(&mut self, spec: EntitySpec) -> Result<Entity, SpawnError> {
        registry::instantiate(&mut self.world, spec)
    }

    /// Destroy immediately, cascading exits to every partner. Use between ticks.
    pub fn destroy(&mut self, entity: Entity) -> bool {
        registry::destroy(&mut self.world, entity)
    }

    /// Queue a destruction for the end of the current/next tick.
    pub fn request_destroy(&mut self, entity: Entity) {
        self.world
            .resource_mut::<PendingLifecycle>()
            .request_destroy(entity);
    }

    /// Queue an instantiation for the end of the current/next tick.
    pub fn request_spawn(&mut self, spec: EntitySpec) {
        self.world.resource_mut::<PendingLifecycle>().request_spawn(spec);
    }

    /// Run one tick with `dt` seconds of wall-clock time.
    pub fn tick(&mut self, dt: f32) {
        update_world_time(&mut self.world, dt);
        self.schedule.run(&mut self.world);
        self.world.flush();
        apply_pending_lifecycle(&mut self.world);
        self.world.clear_trackers();
    }

    /// Run one tick at the configured nominal interval.
    pub fn step(&mut self) {
        let dt = self.config().tick_interval().as_secs_f32();
        self.tick(dt);
    }

    pub fn run_for(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.step();
        }
    }

    /// Current state of every body, ordered by entity.
    pub fn snapshot(&mut self) -> Vec<BodyState> {
        let mut query = self.world.query::<(Entity, &Transform, &RigidBody)>();
        let mut states: Vec<BodyState> = query
            .iter(&self.world)
            .map(|(entity, transform, rigidbody)| BodyState::new(entity, transform, rigidbody))
            .collect();
        states.sort_by_key(|s| s.id);
        states
    }
}
