//! Headless asteroid-field simulation.
//!
//! Spawns a thrusting ship, a field of drifting asteroids and a static wall,
//! then runs the physics core for a fixed number of ticks. Contacts are
//! reported through the log, body updates go out over the sync port and can
//! be dumped as JSON at the end.
//!
//! # Running
//!
//! ```sh
//! RUST_LOG=debug cargo run --release -- --ticks 600 --asteroids 12 --seed 7 --dump field.json
//! ```

use std::path::PathBuf;
use std::thread;
use std::time::Instant;

use asteroids_core::components::collider::Collider;
use asteroids_core::components::rigidbody::RigidBody;
use asteroids_core::components::tag::Tag;
use asteroids_core::components::transform::Transform;
use asteroids_core::components::trigger::{Contact, TriggerHandlers};
use asteroids_core::events::trigger::{TriggerEnter, TriggerExit};
use asteroids_core::registry::EntitySpec;
use asteroids_core::resources::lifecycle::defer_destroy;
use asteroids_core::resources::physicsconfig::PhysicsConfig;
use asteroids_core::resources::syncbridge::{SyncMessage, shutdown_sync};
use asteroids_core::simulation::Simulation;
use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use clap::Parser;
use glam::Vec2;

/// Asteroids physics core, headless runner
#[derive(Parser)]
#[command(version, about = "Runs the asteroid-field physics simulation without a renderer.")]
struct Cli {
    /// Path to the INI configuration file (default: ./config.ini).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Number of asteroids in the field.
    #[arg(long, default_value_t = 8)]
    asteroids: usize,

    /// Seed for the asteroid field. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Write the final body states as JSON to this path.
    #[arg(long, value_name = "PATH")]
    dump: Option<PathBuf>,

    /// Pace ticks at the configured tick rate instead of running flat out.
    #[arg(long)]
    realtime: bool,
}

/// Running totals of lifecycle events seen by the runner.
#[derive(Resource, Default, Debug)]
struct ContactStats {
    enters: u64,
    exits: u64,
}

const FIELD_HALF_SIZE: f32 = 400.0;

fn ship_contact(contact: Contact, commands: &mut Commands, tags: &Query<&Tag>) {
    let other = tags.get(contact.other).map(|t| t.name()).unwrap_or("unknown");
    match other {
        "asteroid" => {
            log::info!("tick {}: ship shield vaporised {:?}", contact.tick, contact.other);
            defer_destroy(commands, contact.other);
        }
        _ => log::info!("tick {}: ship touched {}", contact.tick, other),
    }
}

fn ship_clear(contact: Contact, _commands: &mut Commands, tags: &Query<&Tag>) {
    let other = tags.get(contact.other).map(|t| t.name()).unwrap_or("unknown");
    log::debug!("tick {}: ship clear of {}", contact.tick, other);
}

fn asteroid_contact(contact: Contact, _commands: &mut Commands, tags: &Query<&Tag>) {
    if tags.get(contact.other).is_ok_and(|t| t.name() == "wall") {
        log::debug!("tick {}: {:?} grazed the wall", contact.tick, contact.entity);
    }
}

fn ship() -> EntitySpec {
    let mut rigidbody = RigidBody::with_physics(0.02, 6.0, 0.1);
    rigidbody.add_force("thrust", Vec2::new(0.0, 0.08));
    rigidbody.angular_velocity = 0.01;
    EntitySpec::body(
        Transform::new(0.0, 0.0).with_dimensions(50.0, 50.0),
        rigidbody,
    )
    .with_tag("ship")
    .with_collider(Collider::circle(15.0).with_offset(Vec2::new(0.0, -10.0)))
    .with_collider(Collider::circle(10.0).with_offset(Vec2::new(0.0, 15.0)))
    .with_handlers(
        TriggerHandlers::new()
            .on_enter(ship_contact)
            .on_exit(ship_clear),
    )
}

fn asteroid(rng: &mut fastrand::Rng) -> EntitySpec {
    let size = 20.0 + rng.f32() * 60.0;
    let position = Vec2::new(
        (rng.f32() * 2.0 - 1.0) * FIELD_HALF_SIZE,
        (rng.f32() * 2.0 - 1.0) * FIELD_HALF_SIZE,
    );
    // Keep the spawn area around the ship clear.
    let position = if position.length() < 120.0 {
        position.normalize_or(Vec2::X) * 120.0
    } else {
        position
    };
    let heading = rng.f32() * std::f32::consts::TAU;
    let velocity = Vec2::from_angle(heading) * (0.5 + rng.f32() * 2.0);

    EntitySpec::body(
        Transform::new(position.x, position.y).with_dimensions(size, size),
        RigidBody::new()
            .with_mass(size / 20.0)
            .with_velocity(velocity)
            .with_angular_velocity((rng.f32() - 0.5) * 0.1),
    )
    .with_tag("asteroid")
    .with_collider(Collider::circle(size / 2.0))
    .with_handlers(TriggerHandlers::new().on_enter(asteroid_contact))
}

fn wall() -> EntitySpec {
    EntitySpec::body(
        Transform::new(0.0, -FIELD_HALF_SIZE).with_dimensions(2.0 * FIELD_HALF_SIZE, 20.0),
        RigidBody::new().with_mass(1000.0),
    )
    .with_tag("wall")
    .with_collider(Collider::rect(2.0 * FIELD_HALF_SIZE, 20.0))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => PhysicsConfig::with_path(path.clone()),
        None => PhysicsConfig::new(),
    };
    if let Err(e) = config.load_from_file() {
        // ignore errors, use defaults
        log::warn!("{}; using defaults", e);
    }

    let mut sim = Simulation::new(config);
    sim.world_mut().insert_resource(ContactStats::default());
    sim.world_mut()
        .add_observer(|_trigger: On<TriggerEnter>, mut stats: ResMut<ContactStats>| {
            stats.enters += 1;
        });
    sim.world_mut()
        .add_observer(|_trigger: On<TriggerExit>, mut stats: ResMut<ContactStats>| {
            stats.exits += 1;
        });

    // Stand-in for a network mirror: count what would go over the wire.
    let sync_rx = sim.attach_sync();
    let mirror = thread::spawn(move || {
        let (mut instantiated, mut updated, mut destroyed) = (0u64, 0u64, 0u64);
        for message in sync_rx.iter() {
            match message {
                SyncMessage::Instantiated { .. } => instantiated += 1,
                SyncMessage::Updated { .. } => updated += 1,
                SyncMessage::Destroyed { .. } => destroyed += 1,
            }
        }
        (instantiated, updated, destroyed)
    });

    let seed = cli.seed.unwrap_or_else(|| fastrand::u64(..));
    log::info!("Asteroid field seed: {}", seed);
    let mut rng = fastrand::Rng::with_seed(seed);

    let mut specs = vec![ship(), wall()];
    specs.extend((0..cli.asteroids).map(|_| asteroid(&mut rng)));
    for spec in specs {
        if let Err(e) = sim.instantiate(spec) {
            log::error!("Setup failed: {}", e);
            std::process::exit(1);
        }
    }

    let interval = sim.config().tick_interval();
    let started = Instant::now();
    for _ in 0..cli.ticks {
        let tick_start = Instant::now();
        sim.step();
        if cli.realtime {
            if let Some(rest) = interval.checked_sub(tick_start.elapsed()) {
                thread::sleep(rest);
            }
        }
    }

    let states = sim.snapshot();
    let stats = sim.world().resource::<ContactStats>();
    log::info!(
        "Ran {} ticks in {:.2?}: {} bodies left, {} enters, {} exits",
        sim.tick_count(),
        started.elapsed(),
        states.len(),
        stats.enters,
        stats.exits
    );

    shutdown_sync(sim.world_mut());
    match mirror.join() {
        Ok((instantiated, updated, destroyed)) => log::info!(
            "Sync port carried {} instantiated, {} updated, {} destroyed",
            instantiated,
            updated,
            destroyed
        ),
        Err(_) => log::error!("Sync mirror thread panicked"),
    }

    if let Some(path) = cli.dump {
        let written = serde_json::to_string_pretty(&states)
            .map_err(|e| e.to_string())
            .and_then(|json| std::fs::write(&path, json).map_err(|e| e.to_string()));
        match written {
            Ok(()) => log::info!("Body states written to {}", path.display()),
            Err(e) => {
                log::error!("Failed to write {}: {}", path.display(), e);
                std::process::exit(1);
            }
        }
    }
}
