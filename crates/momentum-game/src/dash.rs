//! Obstacle-limited, eased dash with cooldown and invincibility
//!
//! Idle -> Dashing -> Cooldown -> Idle. A dash may carry a continuation that
//! is handed back exactly once when it completes normally; a forced end drops
//! it.

use glam::Vec3;
use momentum_audio::cue;
use momentum_physics::QueryMask;
use tracing::{debug, info, trace};

use crate::collab::TickContext;
use crate::combat::{self, AttackKind};
use crate::input::{InputEvent, InputPhase};

/// Dashes shorter than this do not start
pub const MIN_DASH_DISTANCE: f32 = 0.3;

/// Distance to the endpoint at which a dash counts as arrived
const ARRIVAL_DISTANCE: f32 = 0.1;

/// Exit speed of a forced end, as a multiple of dash speed
const FORCED_EXIT_FACTOR: f32 = 1.5;

/// What to do once a dash arrives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashContinuation {
    /// Land the queued attack
    Strike(AttackKind),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DashPhase {
    Idle,
    Dashing {
        start: Vec3,
        end: Vec3,
        elapsed: f32,
        duration: f32,
        grappling: bool,
    },
    Cooldown {
        elapsed: f32,
    },
}

#[derive(Debug)]
pub struct DashController {
    phase: DashPhase,
    /// Model hidden by this controller
    hidden: bool,
    continuation: Option<DashContinuation>,
    /// Endpoint of the most recent dash, used for the forced-exit push
    last_end: Vec3,
}

impl Default for DashController {
    fn default() -> Self {
        Self {
            phase: DashPhase::Idle,
            hidden: false,
            continuation: None,
            last_end: Vec3::ZERO,
        }
    }
}

impl DashController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> DashPhase {
        self.phase
    }

    pub fn is_dashing(&self) -> bool {
        matches!(self.phase, DashPhase::Dashing { .. })
    }

    /// Dash along the input direction, or forward without input, stopping
    /// short of the first obstacle.
    pub fn on_input(&mut self, event: &InputEvent, ctx: &mut TickContext) {
        if event.phase != InputPhase::Started {
            return;
        }

        let direction = match ctx.character.direction.try_normalize() {
            Some(direction) => {
                ctx.face(direction);
                direction
            }
            None => ctx.physics.forward().normalize_or_zero(),
        };
        if direction == Vec3::ZERO {
            return;
        }

        let params = &ctx.config.character;
        let (radius, max_distance) = (params.dash_sweep_radius, params.dash_distance);
        let origin = ctx.physics.position();
        let usable = dash_distance(ctx, origin, direction, radius, max_distance);

        if usable <= MIN_DASH_DISTANCE {
            trace!(usable, "dash blocked");
            return;
        }
        self.dash(origin + direction * usable, false, None, ctx);
    }

    /// Start a dash toward `end`. Returns false if the dash is not allowed
    /// right now (cooling down, mid-dash or grinding).
    pub fn dash(
        &mut self,
        end: Vec3,
        grappling: bool,
        continuation: Option<DashContinuation>,
        ctx: &mut TickContext,
    ) -> bool {
        if !matches!(self.phase, DashPhase::Idle) || ctx.character.is_grinding() {
            return false;
        }

        let start = ctx.physics.position();
        let duration = start.distance(end) / ctx.config.character.dash_speed;

        self.hide(ctx);
        ctx.character.movement_allowed = false;
        ctx.physics.set_gravity_enabled(false);
        ctx.post_audio(cue::DASH);
        if continuation.is_none() {
            combat::reset_combat(ctx);
        } else {
            ctx.character.anim_override_movement = false;
        }

        self.continuation = continuation;
        self.last_end = end;
        self.phase = DashPhase::Dashing {
            start,
            end,
            elapsed: 0.0,
            duration,
            grappling,
        };
        info!(?start, ?end, grappling, "dash start");
        true
    }

    /// Advance the dash. Returns the continuation when a dash completes.
    pub fn tick(&mut self, ctx: &mut TickContext) -> Option<DashContinuation> {
        match &mut self.phase {
            DashPhase::Idle => None,
            DashPhase::Cooldown { elapsed } => {
                *elapsed += ctx.dt;
                if *elapsed >= ctx.config.character.time_between_dashes {
                    self.phase = DashPhase::Idle;
                    trace!("dash ready");
                }
                None
            }
            DashPhase::Dashing {
                start,
                end,
                elapsed,
                duration,
                grappling,
            } => {
                let t = if *duration > f32::EPSILON {
                    ctx.config.character.dash_curve.evaluate(*elapsed / *duration)
                } else {
                    1.0
                };
                let position = start.lerp(*end, t);
                ctx.physics.set_position(position);
                *elapsed += ctx.dt;

                if position.distance(*end) > ARRIVAL_DISTANCE {
                    return None;
                }
                let (end, grappling) = (*end, *grappling);
                ctx.physics.set_position(end);
                self.finish(grappling, ctx)
            }
        }
    }

    fn finish(&mut self, grappling: bool, ctx: &mut TickContext) -> Option<DashContinuation> {
        self.unhide(ctx);
        ctx.physics.set_linear_velocity(Vec3::ZERO);
        // a strike re-enables attacking through its own markers
        if self.continuation.is_none() {
            combat::allow_attack(ctx);
        }
        self.phase = DashPhase::Cooldown { elapsed: 0.0 };
        debug!(grappling, "dash finished");

        if grappling {
            // the grapple keeps control until it is released
            return None;
        }
        ctx.physics.set_gravity_enabled(true);
        ctx.character.movement_allowed = true;
        self.continuation.take()
    }

    /// Forced termination. Safe to call at any time, dashing or not.
    pub fn end_dash(&mut self, ctx: &mut TickContext) {
        if self.hidden {
            self.unhide(ctx);
            let push = (self.last_end - ctx.physics.position()).normalize_or_zero();
            let speed = FORCED_EXIT_FACTOR * ctx.config.character.dash_speed;
            ctx.physics.set_linear_velocity(push * speed);
        }
        if self.is_dashing() {
            info!("dash forced to end");
            self.phase = DashPhase::Cooldown { elapsed: 0.0 };
            combat::allow_attack(ctx);
        }

        self.continuation = None;
        ctx.character.movement_allowed = true;
        ctx.physics.set_gravity_enabled(true);
        ctx.set_audio_switch(cue::VELOCITY, cue::VELOCITY_WALK);
    }

    fn hide(&mut self, ctx: &mut TickContext) {
        self.hidden = true;
        ctx.set_hidden(true);
        ctx.effects.set_dash_trail(true);
    }

    fn unhide(&mut self, ctx: &mut TickContext) {
        self.hidden = false;
        ctx.set_hidden(false);
        ctx.effects.set_dash_trail(false);
    }
}

/// How far a dash from `origin` can travel before touching geometry
fn dash_distance(
    ctx: &TickContext,
    origin: Vec3,
    direction: Vec3,
    radius: f32,
    max_distance: f32,
) -> f32 {
    ctx.physics
        .sweep(origin, radius, direction, max_distance, QueryMask::WORLD)
        .map(|hit| hit.distance - radius)
        .unwrap_or(max_distance)
        .min(max_distance)
}
