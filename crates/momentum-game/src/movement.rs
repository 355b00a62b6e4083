//! Ground and air locomotion, plus the ground probe, sprint and jump handlers

use glam::{Quat, Vec3};
use momentum_audio::cue;
use momentum_core::{planar, signed_angle_y, Transform};
use momentum_physics::QueryMask;
use tracing::{debug, trace};

use crate::collab::{anim, ShakePreset, TickContext};
use crate::input::{InputEvent, InputPhase};
use crate::state::MovementState;

/// Below this planar speed the character counts as stopped
const STOP_SPEED: f32 = 1.0;

/// Distance below the body centre where landing effects spawn
const FEET_OFFSET: f32 = 0.8;

/// Turns stick input into rigid-body velocity
#[derive(Debug, Default)]
pub struct MovementController {
    /// Planar speed this tick
    speed: f32,
    /// Time spent blending toward the current target speed
    blend_time: f32,
}

impl MovementController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Store the stick direction, rotated into the camera's ground frame
    pub fn on_input(&mut self, event: &InputEvent, ctx: &mut TickContext) {
        let value = event.value();
        let local = Vec3::new(value.x, 0.0, -value.y);
        let yaw = signed_angle_y(Vec3::NEG_Z, planar(ctx.camera.transform.forward()));
        ctx.character.direction = Quat::from_rotation_y(yaw.to_radians()) * local;
    }

    pub fn tick(&mut self, ctx: &mut TickContext) {
        if ctx.character.anim_override_movement {
            self.tick_override(ctx);
        } else if !ctx.character.movement_allowed {
            return;
        } else if ctx.character.grounded {
            self.tick_ground(ctx);
        } else {
            self.tick_air(ctx);
        }
    }

    fn tick_ground(&mut self, ctx: &mut TickContext) {
        let character = &ctx.character;
        let params = &ctx.config.character;

        let has_input = character.direction.length_squared() > f32::EPSILON;
        let target = match (has_input, character.sprinting) {
            (false, _) => 0.0,
            (true, true) => params.sprint_speed,
            (true, false) => params.speed,
        };

        let forward = planar(ctx.physics.forward()).normalize_or_zero();
        let movement = if has_input {
            let turn = signed_angle_y(forward, character.direction)
                .clamp(-params.rotation_speed, params.rotation_speed);
            Quat::from_rotation_y(turn.to_radians()) * forward
        } else {
            forward
        };

        let factor = (self.blend_time / params.acceleration_lerp).min(1.0);
        self.speed += (target - self.speed) * factor;
        self.blend_time += ctx.dt;
        if (self.speed - target).abs() < 1e-3 {
            self.speed = target;
            self.blend_time = 0.0;
        }

        let vertical = ctx.physics.linear_velocity().y;
        let velocity = movement.normalize_or_zero() * self.speed;
        ctx.physics
            .set_linear_velocity(Vec3::new(velocity.x, vertical, velocity.z));
        if has_input {
            ctx.face(movement);
        }

        let speed = planar(velocity).length();
        self.classify(speed, ctx);
        ctx.animation.set_float(anim::SPEED, speed);
        let subject = ctx.subject();
        ctx.audio.set_parameter(cue::MOVE_SPEED, speed, subject);
    }

    fn tick_air(&mut self, ctx: &mut TickContext) {
        let delta = ctx.character.direction * ctx.config.character.air_speed * ctx.dt;
        let velocity = ctx.physics.linear_velocity() + delta;
        ctx.physics.set_linear_velocity(velocity);
        trace!(?velocity, "air control");
    }

    /// Attack animations drive forward speed; planar speed reads as zero
    fn tick_override(&mut self, ctx: &mut TickContext) {
        let forward = planar(ctx.physics.forward()).normalize_or_zero();
        let vertical = ctx.physics.linear_velocity().y;
        let velocity = forward * ctx.character.anim_forward_movement;
        ctx.physics
            .set_linear_velocity(Vec3::new(velocity.x, vertical, velocity.z));

        self.speed = 0.0;
        self.blend_time = 0.0;
        self.classify(0.0, ctx);
        ctx.animation.set_float(anim::SPEED, 0.0);
    }

    fn classify(&self, speed: f32, ctx: &mut TickContext) {
        let state = if speed < STOP_SPEED {
            MovementState::Stopped
        } else if speed <= ctx.config.character.speed {
            MovementState::Moving
        } else {
            MovementState::Running
        };
        if ctx.character.movement_state != state {
            trace!(from = ?ctx.character.movement_state, to = ?state, "movement state");
            ctx.character.movement_state = state;
        }
    }
}

/// Sweep below the character to refresh `grounded`. Runs before every
/// handler tick.
pub fn probe_ground(ctx: &mut TickContext) {
    let params = &ctx.config.character;
    let position = ctx.physics.position();
    let hit = ctx.physics.sweep(
        position,
        params.ground_probe_radius,
        Vec3::NEG_Y,
        params.ground_probe_distance,
        QueryMask::WORLD,
    );

    let was_grounded = ctx.character.grounded;
    ctx.character.grounded = hit.is_some();
    ctx.animation.set_bool(anim::ON_AIR, hit.is_none());

    if !ctx.character.grounded {
        // no pitch or roll while airborne
        let flat = planar(ctx.physics.forward());
        if let Some(rotation) = Transform::rotation_towards(flat) {
            ctx.physics.set_rotation(rotation);
        }
    } else if !was_grounded {
        debug!(?position, "landed");
        ctx.character.jumped = false;
        let feet = position - Vec3::Y * FEET_OFFSET;
        ctx.effects.landing_burst(feet);
        ctx.effects.shake(ShakePreset::Landing);
    }
}

pub fn sprint_input(event: &InputEvent, ctx: &mut TickContext) {
    match event.phase {
        InputPhase::Started => ctx.character.sprinting = true,
        InputPhase::Canceled => ctx.character.sprinting = false,
        InputPhase::Changed => {}
    }
}

/// Jump from the ground, or flag a rail exit while grinding
pub fn jump_input(event: &InputEvent, ctx: &mut TickContext) {
    if event.phase != InputPhase::Started {
        return;
    }
    let grinding = ctx.character.is_grinding();
    if !ctx.character.grounded && !grinding {
        return;
    }

    ctx.character.jumped = true;
    ctx.animation.set_trigger(anim::JUMP);
    if !grinding {
        let velocity = ctx.physics.linear_velocity() + Vec3::Y * ctx.config.character.jump_force;
        ctx.physics.set_linear_velocity(velocity);
        debug!("jump");
    }
}
