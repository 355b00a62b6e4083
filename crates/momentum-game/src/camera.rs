//! Free, targeted and grinding camera modes
//!
//! Only the tick of the active mode does anything. The free camera also picks
//! the ambient combat target that attacks dash toward.

use glam::{Mat4, Quat, Vec2, Vec3};
use momentum_core::{planar, EntityId, Transform};
use momentum_physics::QueryMask;
use tracing::{info, trace};

use crate::collab::TickContext;
use crate::config::Lens;
use crate::input::{InputEvent, InputPhase};
use crate::state::{elevation, raised, CameraMode, MovementState};

/// Above this elevation (degrees) of the character over its target, the
/// lock-on camera looks down less steeply
const TARGET_ELEVATION_THRESHOLD: f32 = 2.0;
const TARGET_ELEVATION_CORRECTION: f32 = 0.75;

#[derive(Debug, Default)]
pub struct CameraController {
    /// Eased rotation rate, degrees per second
    rotation_speed: f32,
    /// Time since look input started
    blend_time: f32,
    /// Look input with axis inversion applied
    look: Vec2,
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_free_input(&mut self, event: &InputEvent, ctx: &mut TickContext) {
        let config = &ctx.config.camera;
        if event.phase == InputPhase::Started {
            self.rotation_speed = config.initial_rotation_speed;
            self.blend_time = 0.0;
        }

        let value = event.value();
        let x = if config.inverted_x { value.x } else { -value.x };
        let y = if config.inverted_y { -value.y } else { value.y };
        self.look = Vec2::new(x, y);
    }

    /// Lock onto the most central visible enemy, or drop the lock
    pub fn on_target_input(&mut self, event: &InputEvent, ctx: &mut TickContext) {
        if event.phase != InputPhase::Started || ctx.character.is_grinding() {
            return;
        }

        if ctx.camera.mode == CameraMode::Targeted {
            ctx.camera.targeted_enemy = None;
            ctx.camera.mode = CameraMode::Free;
            info!("camera lock released");
            return;
        }

        ctx.camera.current_angle = ctx.config.camera.target_angle;
        if let Some(enemy) = select_lock_target(ctx) {
            ctx.camera.targeted_enemy = Some(enemy);
            ctx.camera.mode = CameraMode::Targeted;
            info!(?enemy, "camera locked on");
        }
    }

    /// Put the camera back behind the character
    pub fn on_reset_input(&mut self, event: &InputEvent, ctx: &mut TickContext) {
        if event.phase != InputPhase::Started {
            return;
        }
        ctx.camera.point = raised(-ctx.physics.forward(), ctx.config.camera.default_height);
        trace!("camera reset");
    }

    pub fn tick_free(&mut self, ctx: &mut TickContext) {
        if ctx.camera.mode != CameraMode::Free {
            return;
        }
        let config = &ctx.config.camera;

        let eased = config
            .rotation_curve
            .evaluate(self.blend_time / config.rotation_lerp_time);
        self.rotation_speed += (config.final_rotation_speed - self.rotation_speed) * eased;
        self.blend_time += ctx.dt;

        let step = self.rotation_speed * ctx.dt;
        let point = Quat::from_rotation_y((self.look.x * step).to_radians()) * ctx.camera.point;
        let pitch = (elevation(point) + self.look.y * step).clamp(config.min_pitch, config.max_pitch);
        ctx.camera.point = raised(point, pitch);

        let anchor = look_anchor(ctx);
        let distance = collision_distance(ctx, anchor, ctx.camera.point, ctx.camera.current_distance);
        ctx.camera.applied_distance = distance;
        ctx.camera.transform.position = anchor + ctx.camera.point * distance;
        ctx.camera.transform.look_at(anchor);

        let target = select_combat_target(ctx);
        if target != ctx.camera.targeted_enemy {
            trace!(?target, "combat target");
            ctx.camera.targeted_enemy = target;
        }

        let config = &ctx.config.camera;
        let desired = match ctx.character.movement_state {
            MovementState::Stopped => config.idle_distance,
            MovementState::Moving => config.move_distance,
            MovementState::Running | MovementState::Grinding => config.sprint_distance,
        };
        let camera = &mut ctx.camera;
        camera.current_distance += (desired - camera.current_distance) * ctx.dt.min(1.0);
    }

    pub fn tick_targeted(&mut self, ctx: &mut TickContext) {
        if ctx.camera.mode != CameraMode::Targeted {
            return;
        }
        let enemy = ctx
            .camera
            .targeted_enemy
            .and_then(|id| ctx.scene.live_enemy(id))
            .map(|enemy| enemy.position);
        let Some(enemy) = enemy else {
            ctx.camera.targeted_enemy = None;
            ctx.camera.mode = CameraMode::Free;
            info!("camera target lost");
            return;
        };

        let config = &ctx.config.camera;
        let from_enemy = ctx.physics.position() - enemy;
        let rise = elevation(from_enemy);
        let angle = if rise > TARGET_ELEVATION_THRESHOLD {
            config.target_angle - rise * TARGET_ELEVATION_CORRECTION
        } else {
            config.target_angle
        };
        let target_distance = config.target_distance;

        let camera = &mut ctx.camera;
        camera.current_angle += (angle - camera.current_angle) * ctx.dt.min(1.0);
        let flat = planar(from_enemy).try_normalize().unwrap_or(planar(camera.point));
        camera.point = raised(flat, camera.current_angle);

        let anchor = look_anchor(ctx);
        let distance = collision_distance(ctx, anchor, ctx.camera.point, target_distance);
        ctx.camera.applied_distance = distance;
        ctx.camera.transform.position = anchor + ctx.camera.point * distance;
        ctx.camera.transform.look_at(enemy);
    }

    pub fn tick_grinding(&mut self, ctx: &mut TickContext) {
        if ctx.camera.mode != CameraMode::Grinding {
            return;
        }
        let config = &ctx.config.camera;
        let alpha = (config.grind_rotation_speed * ctx.dt).min(1.0);
        let distance = config.sprint_distance;

        if let Some(goal) = Transform::rotation_towards(ctx.physics.forward()) {
            let rotation = ctx.camera.transform.rotation.slerp(goal, alpha);
            ctx.camera.transform.rotation = rotation;
        }
        ctx.camera.point = -ctx.camera.transform.forward();

        let anchor = look_anchor(ctx);
        ctx.camera.applied_distance = distance;
        ctx.camera.transform.position = anchor + ctx.camera.point * distance;
    }
}

/// Look-at point: above the character and slightly to the camera's right
fn look_anchor(ctx: &TickContext) -> Vec3 {
    let config = &ctx.config.camera;
    let right = planar(ctx.camera.transform.right()).normalize_or_zero();
    ctx.physics.position() + Vec3::Y * config.offset_y + right * config.offset_x
}

/// Follow distance along `point` from `anchor` that keeps the camera out of
/// level geometry. Never more than `distance`.
fn collision_distance(ctx: &TickContext, anchor: Vec3, point: Vec3, distance: f32) -> f32 {
    let radius = ctx.config.camera.collision_radius;
    ctx.physics
        .sweep(anchor, radius, point, distance, QueryMask::WORLD)
        .map_or(distance, |hit| hit.distance)
        .min(distance)
}

/// Live enemies near the character's height, in range and visible
fn combat_candidates(ctx: &TickContext) -> Vec<(EntityId, Vec3)> {
    let config = &ctx.config.camera;
    let position = ctx.physics.position();
    ctx.scene
        .live_enemies()
        .filter(|enemy| (enemy.position.y - position.y).abs() < config.combat_band)
        .filter(|enemy| position.distance(enemy.position) <= config.combat_range)
        .filter(|enemy| {
            ctx.physics.line_of_sight(
                position,
                enemy.position,
                enemy.id,
                QueryMask::WORLD | QueryMask::ENEMY,
            )
        })
        .map(|enemy| (enemy.id, enemy.position))
        .collect()
}

/// Nearest candidate without stick input; otherwise the one best aligned
/// with the stick inside a 90 degree cone, falling back to the nearest.
fn select_combat_target(ctx: &TickContext) -> Option<EntityId> {
    let candidates = combat_candidates(ctx);
    let position = ctx.physics.position();

    let nearest = candidates
        .iter()
        .min_by(|a, b| position.distance(a.1).total_cmp(&position.distance(b.1)))
        .map(|(id, _)| *id);

    let Some(direction) = planar(ctx.character.direction).try_normalize() else {
        return nearest;
    };

    let cone = 45.0_f32.to_radians().cos();
    candidates
        .iter()
        .map(|(id, at)| (*id, planar(*at - position).normalize_or_zero().dot(direction)))
        .filter(|(_, alignment)| *alignment >= cone)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
        .or(nearest)
}

/// Nearest visible enemy close to the centre of the screen
fn select_lock_target(ctx: &TickContext) -> Option<EntityId> {
    let config = &ctx.config.camera;
    let position = ctx.physics.position();
    let max_offset = config.target_radius * 0.01;

    ctx.scene
        .live_enemies()
        .filter(|enemy| {
            project(&ctx.camera.transform, &config.lens, enemy.position)
                .is_some_and(|ndc| screen_distance(ndc, &config.lens) < max_offset)
        })
        .filter(|enemy| {
            ctx.physics.line_of_sight(
                position,
                enemy.position,
                enemy.id,
                QueryMask::WORLD | QueryMask::ENEMY,
            )
        })
        .min_by(|a, b| {
            position
                .distance(a.position)
                .total_cmp(&position.distance(b.position))
        })
        .map(|enemy| enemy.id)
}

/// Normalized device coordinates of `world` as seen from `camera`, or `None`
/// when it is behind the camera or outside the view volume.
pub fn project(camera: &Transform, lens: &Lens, world: Vec3) -> Option<Vec3> {
    let view = camera.matrix().inverse();
    let projection = Mat4::perspective_rh(lens.fov_y.to_radians(), lens.aspect, lens.near, lens.far);
    let clip = projection * view * world.extend(1.0);
    if clip.w <= f32::EPSILON {
        return None;
    }

    let ndc = clip.truncate() / clip.w;
    let visible = ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0 && (0.0..=1.0).contains(&ndc.z);
    visible.then_some(ndc)
}

/// Distance of a projected point from the screen centre, in units of half the
/// screen height
pub fn screen_distance(ndc: Vec3, lens: &Lens) -> f32 {
    Vec2::new(ndc.x * lens.aspect, ndc.y).length()
}
