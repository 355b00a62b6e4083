//! Momentum - Headless sandbox for the character coordination engine
//!
//! Builds a small rapier level, plays a scripted input timeline through the
//! engine at a fixed step and logs what the character is doing.

mod settings;

use anyhow::{Context, Result};
use glam::{Vec2, Vec3};
use momentum_audio::{AudioEngine, AudioSink, NullAudio};
use momentum_core::{EntityId, GameTime, TimeConfig, Transform};
use momentum_game::{
    CheckpointTrack, Collaborators, Enemy, Engine, GrapplePoint, InputEvent, InputPhase,
    NullAnimation, NullEffects, RailPath, Scene, SmashSize,
};
use momentum_physics::{
    CharacterBodyConfig, ColliderTag, PhysicsConfig, PhysicsWorld, QueryMask, RigidBodyControl,
};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use settings::Settings;

/// How close the character centre must come to a rail to land on it
const RAIL_CONTACT_RADIUS: f32 = 1.0;

/// One scripted event: an input, or something the host would normally
/// report from animation markers or triggers
#[derive(Debug, Clone)]
enum Cue {
    Input(InputEvent),
    BeginAttack,
    EndAttack,
    Smash(SmashSize),
    Checkpoint(usize),
    Respawn,
}

fn timeline() -> Vec<(u64, Cue)> {
    let stick = |phase, y| Cue::Input(InputEvent::axis("Move", phase, Vec2::new(0.0, y)));
    vec![
        (5, stick(InputPhase::Started, 1.0)),
        (30, Cue::Input(InputEvent::started("Sprint"))),
        (60, Cue::Checkpoint(1)),
        (80, Cue::Input(InputEvent::started("Dash"))),
        (110, stick(InputPhase::Canceled, 0.0)),
        (111, Cue::Input(InputEvent::canceled("Sprint"))),
        (120, Cue::Input(InputEvent::started("Target"))),
        (130, Cue::Input(InputEvent::started("WeakAttack"))),
        (145, Cue::BeginAttack),
        (165, Cue::EndAttack),
        (200, Cue::Input(InputEvent::started("HeavyAttack"))),
        (215, Cue::Smash(SmashSize::Big)),
        (240, Cue::EndAttack),
        (250, Cue::Input(InputEvent::started("Target"))),
        (260, Cue::Input(InputEvent::axis("Look", InputPhase::Started, Vec2::new(0.4, 0.0)))),
        (300, Cue::Input(InputEvent::canceled("Look"))),
        (310, Cue::Input(InputEvent::started("ResetCamera"))),
        (320, Cue::Input(InputEvent::started("Grapple"))),
        (380, Cue::Input(InputEvent::canceled("Grapple"))),
        (400, stick(InputPhase::Started, 1.0)),
        (460, Cue::Input(InputEvent::started("Jump"))),
        (520, Cue::Respawn),
    ]
}

/// The sandbox level: physics colliders plus the matching scene registry
struct Level {
    scene: Scene,
    rail: EntityId,
    checkpoints: CheckpointTrack,
}

fn build_level(world: &mut PhysicsWorld) -> Level {
    let mut scene = Scene::new();

    world.create_ground(0.0);
    world.create_static_box(Vec3::new(2.0, 1.5, 0.5), Vec3::new(6.0, 1.5, -8.0));
    world.create_static_box(Vec3::new(0.5, 3.0, 6.0), Vec3::new(-7.0, 3.0, -12.0));

    for (name, position) in [
        ("Grunt", Vec3::new(0.5, 0.9, -16.0)),
        ("Brute", Vec3::new(-2.0, 0.9, -19.0)),
    ] {
        let id = scene.add_enemy(Enemy::new(name, position, 20.0));
        world.create_tagged_sphere(position, 0.5, QueryMask::ENEMY, ColliderTag::Entity(id));
    }

    let anchor = Vec3::new(0.0, 6.0, -24.0);
    let point = scene.add_grapple_point(GrapplePoint::new(anchor, anchor - Vec3::Y * 1.5));
    world.create_tagged_sphere(anchor, 0.5, QueryMask::GRAPPLE, ColliderTag::Entity(point));

    let rail = scene.add_rail(RailPath::new(
        vec![
            Vec3::new(0.0, 0.3, -28.0),
            Vec3::new(0.0, 0.3, -40.0),
            Vec3::new(6.0, 1.5, -48.0),
        ],
        false,
    ));

    let checkpoints = CheckpointTrack::new([Vec3::new(0.0, 0.9, 0.0), Vec3::new(0.0, 0.9, -10.0)]);
    info!(
        enemies = scene.live_enemies().count(),
        checkpoints = checkpoints.len(),
        "Level built"
    );

    Level {
        scene,
        rail,
        checkpoints,
    }
}

/// Point on the rail the character is touching, if any
fn rail_touch(scene: &Scene, rail: EntityId, position: Vec3) -> Option<Vec3> {
    let path = scene.rail(rail)?;
    let (point, _) = path.sample(path.project(position));
    (point.distance(position) < RAIL_CONTACT_RADIUS).then_some(point)
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;

    info!("Starting Momentum sandbox...");

    let settings = Settings::load();
    if std::env::args().any(|arg| arg == "--write-settings") {
        settings.save().context("Failed to write settings")?;
    }

    let tick_length = settings.engine.tick_length;
    let mut world = PhysicsWorld::with_config(PhysicsConfig {
        timestep: tick_length,
        ..Default::default()
    });
    let mut level = build_level(&mut world);
    let spawn = Vec3::ZERO;
    world.spawn_character(&CharacterBodyConfig::default(), spawn);
    world.update_queries();

    let start = Transform::from_position(world.character_rig()?.position());
    let mut engine = Engine::new(settings.engine.clone(), start)
        .context("Engine configuration rejected")?
        .with_checkpoints(level.checkpoints.clone());

    let mut audio_engine = match AudioEngine::new(settings.audio.clone()) {
        Ok(engine) => Some(engine),
        Err(e) => {
            warn!("Audio unavailable, running silent: {}", e);
            None
        }
    };
    let mut silent = NullAudio;
    let mut animation = NullAnimation;
    let mut effects = NullEffects;

    let mut time = GameTime::new(TimeConfig {
        time_scale: settings.sandbox.time_scale,
        fixed_timestep: tick_length,
        ..Default::default()
    });
    let mut script = timeline().into_iter().peekable();
    let total_ticks = (settings.sandbox.duration / tick_length).ceil() as u64;
    let log_interval = settings.sandbox.log_interval.max(1);

    let mut tick: u64 = 0;
    while tick < total_ticks {
        time.update(settings.sandbox.frame_delta);
        let audio: &mut dyn AudioSink = match audio_engine.as_mut() {
            Some(engine) => engine,
            None => &mut silent,
        };

        for _ in 0..time.fixed_steps() {
            let mut rig = world.character_rig()?;
            let touch = rail_touch(&level.scene, level.rail, rig.position());
            let mut collab = Collaborators {
                physics: &mut rig,
                animation: &mut animation,
                audio: &mut *audio,
                effects: &mut effects,
                scene: &mut level.scene,
            };

            while let Some((_, cue)) = script.next_if(|(at, _)| *at <= tick) {
                debug!(tick, ?cue, "script");
                match cue {
                    Cue::Input(event) => engine.on_input(&event, &mut collab),
                    Cue::BeginAttack => engine.begin_attack(&mut collab),
                    Cue::EndAttack => engine.end_attack(&mut collab),
                    Cue::Smash(size) => {
                        let hits = engine.smash_ground(size, &mut collab);
                        info!(?size, hits = hits.len(), "ground smash");
                    }
                    Cue::Checkpoint(index) => {
                        engine.reach_checkpoint(index);
                    }
                    Cue::Respawn => engine.respawn(&mut collab),
                }
            }

            if let Some(contact) = touch {
                engine.rail_contact(level.rail, contact, &mut collab);
            }
            engine.tick(&mut collab);

            if tick % log_interval == 0 {
                let character = engine.character();
                info!(
                    tick,
                    position = ?rig.position(),
                    state = ?character.movement_state,
                    camera = ?engine.camera().mode,
                    health = character.health,
                    karnage = character.karnage.points,
                    "status"
                );
            }

            world.step();
            tick += 1;
        }

        if let Some(engine) = audio_engine.as_mut() {
            engine.update();
        }
    }

    let character = engine.character();
    info!(
        ticks = tick,
        seconds = time.total_time,
        state = ?character.movement_state,
        enemies_left = level.scene.live_enemies().count(),
        "Sandbox finished"
    );
    Ok(())
}
