//! Rail grinding
//!
//! Contact with a rail starts the grind; the tick walks the character along
//! the rail until a jump or, on open rails, the end of the rail. The rail just
//! left is ignored for a short while so the character does not snap back on.

use glam::Vec3;
use momentum_audio::cue;
use momentum_core::EntityId;
use tracing::{debug, info};

use crate::collab::{anim, TickContext};
use crate::state::{CameraMode, MovementState};

/// Facing alignment with the rail below which the character rides it backwards
const BACKWARDS_THRESHOLD: f32 = 0.1;

#[derive(Debug, Default)]
pub struct GrindController;

impl GrindController {
    pub fn new() -> Self {
        Self
    }

    /// The character touched `rail` at `contact`. Ignored while already
    /// grinding or while `rail` is the one just left.
    pub fn rail_contact(&mut self, rail: EntityId, contact: Vec3, ctx: &mut TickContext) -> bool {
        let path = &ctx.character.path;
        if path.is_grinding() || path.ignored == Some(rail) {
            return false;
        }
        let Some(path_rail) = ctx.scene.rail(rail) else {
            return false;
        };

        let distance = path_rail.project(contact);
        let (_, segment_forward) = path_rail.sample(distance);
        let backwards = ctx.physics.forward().dot(segment_forward) < BACKWARDS_THRESHOLD;

        let path = &mut ctx.character.path;
        path.current = Some(rail);
        path.distance = distance;
        path.backwards = backwards;

        ctx.character.jumped = false;
        ctx.character.movement_allowed = false;
        ctx.character.movement_state = MovementState::Grinding;
        ctx.camera.mode = CameraMode::Grinding;
        ctx.physics.set_kinematic(true);
        ctx.animation.set_bool(anim::RAILING, true);
        ctx.effects.set_grind_sparks(true);
        ctx.post_audio(cue::RAIL_START);

        info!(?rail, distance, backwards, "rail attached");
        true
    }

    pub fn tick(&mut self, ctx: &mut TickContext) {
        let path = &mut ctx.character.path;
        if path.ignore_timer.tick(ctx.dt) {
            path.ignored = None;
        }

        let Some(rail_id) = path.current else {
            return;
        };
        let Some(rail) = ctx.scene.rail(rail_id) else {
            debug!(?rail_id, "rail vanished");
            self.exit(false, ctx);
            return;
        };
        let length = rail.length();
        let looped = rail.is_looped();

        if looped {
            if length > f32::EPSILON {
                path.distance = path.distance.rem_euclid(length);
            }
        } else if (path.backwards && path.distance <= 0.0)
            || (!path.backwards && path.distance >= length)
        {
            self.exit(false, ctx);
            return;
        }

        if ctx.character.jumped {
            self.exit(true, ctx);
            return;
        }

        let (position, forward) = rail.sample(path.distance);
        let backwards = path.backwards;
        let step = ctx.config.character.grind_speed * ctx.dt;
        path.distance += if backwards { -step } else { step };

        ctx.character.movement_allowed = false;
        ctx.physics
            .set_position(position + Vec3::Y * ctx.config.character.grind_vertical_offset);
        ctx.face(if backwards { -forward } else { forward });
    }

    fn exit(&mut self, jumped: bool, ctx: &mut TickContext) {
        let params = &ctx.config.character;
        let path = &mut ctx.character.path;
        path.ignored = path.current.take();
        path.ignore_timer.start(params.rail_ignore_time);
        path.distance = 0.0;
        path.backwards = false;

        ctx.character.movement_allowed = true;
        ctx.character.movement_state = MovementState::Stopped;
        if ctx.camera.mode == CameraMode::Grinding {
            ctx.camera.mode = CameraMode::Free;
        }

        ctx.physics.set_kinematic(false);
        let mut velocity = ctx.physics.forward() * params.sprint_speed;
        if jumped {
            velocity += Vec3::Y * params.jump_force;
        }
        ctx.physics.set_linear_velocity(velocity);

        ctx.animation.set_bool(anim::RAILING, false);
        ctx.effects.set_grind_sparks(false);
        ctx.post_audio(cue::RAIL_STOP);
        info!(jumped, "rail exit");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputEvent;
    use crate::scene::RailPath;
    use crate::test_support::Harness;

    fn straight_rail(h: &mut Harness) -> EntityId {
        h.scene.add_rail(RailPath::new(
            vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -20.0)],
            false,
        ))
    }

    fn ride_until_exit(h: &mut Harness, max_ticks: usize) -> usize {
        for i in 0..max_ticks {
            h.tick();
            if !h.engine.character().path.is_grinding() {
                return i + 1;
            }
        }
        max_ticks
    }

    #[test]
    fn test_contact_attaches_and_locks_control() {
        let mut h = Harness::new();
        let rail = straight_rail(&mut h);
        assert!(h.rail_contact(rail, Vec3::ZERO));

        let character = h.engine.character();
        assert_eq!(character.movement_state, MovementState::Grinding);
        assert!(!character.movement_allowed);
        assert!(!character.path.backwards);
        assert!(h.physics.kinematic);
        assert_eq!(h.engine.camera().mode, CameraMode::Grinding);
        assert!(h.audio.events.contains(&cue::RAIL_START.to_string()));

        h.tick();
        assert!((h.physics.position - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-4);
        assert!((h.engine.character().path.distance - 0.24).abs() < 1e-4);
    }

    #[test]
    fn test_open_rail_exits_at_end() {
        let mut h = Harness::new();
        let rail = straight_rail(&mut h);
        h.rail_contact(rail, Vec3::ZERO);

        // 20 units at 12 u/s
        let ticks = ride_until_exit(&mut h, 200);
        assert!(ticks < 200 && ticks > 80, "ticks {ticks}");

        let character = h.engine.character();
        assert_eq!(character.path.ignored, Some(rail));
        assert!(character.movement_allowed);
        assert!(!h.physics.kinematic);
        assert_eq!(h.engine.camera().mode, CameraMode::Free);
        // launched forward at sprint speed
        assert!((h.physics.velocity.z + 10.0).abs() < 1e-3);
        assert!(h.audio.events.contains(&cue::RAIL_STOP.to_string()));
    }

    #[test]
    fn test_backwards_ride_exits_at_start() {
        let mut h = Harness::new();
        let rail = straight_rail(&mut h);
        h.physics.rotation = glam::Quat::from_rotation_y(std::f32::consts::PI);
        h.rail_contact(rail, Vec3::new(0.0, 0.0, -6.0));
        assert!(h.engine.character().path.backwards);

        let ticks = ride_until_exit(&mut h, 200);
        // six units back to the start
        assert!(ticks < 40, "ticks {ticks}");
        assert!(h.physics.position.z > -0.5);
    }

    #[test]
    fn test_looped_rail_wraps() {
        let mut h = Harness::new();
        let rail = h.scene.add_rail(RailPath::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, -5.0),
                Vec3::new(5.0, 0.0, -5.0),
                Vec3::new(5.0, 0.0, 0.0),
            ],
            true,
        ));
        h.rail_contact(rail, Vec3::ZERO);

        assert_eq!(ride_until_exit(&mut h, 300), 300);
        let distance = h.engine.character().path.distance;
        assert!((0.0..20.0 + 0.25).contains(&distance), "{distance}");
    }

    #[test]
    fn test_jump_exits_upward() {
        let mut h = Harness::new();
        let rail = straight_rail(&mut h);
        h.rail_contact(rail, Vec3::ZERO);
        h.ticks(5);

        h.input(InputEvent::started("Jump"));
        assert!(h.engine.character().jumped);
        h.tick();

        assert!(!h.engine.character().path.is_grinding());
        assert!(h.physics.velocity.y > 6.0);
        assert!(h.physics.velocity.z < -9.0);
    }

    #[test]
    fn test_just_left_rail_is_ignored_for_a_while() {
        let mut h = Harness::new();
        let rail = straight_rail(&mut h);
        h.rail_contact(rail, Vec3::ZERO);
        h.input(InputEvent::started("Jump"));
        h.tick();

        assert!(!h.rail_contact(rail, Vec3::new(0.0, 0.0, -1.0)));
        // rail_ignore_time is one second
        h.ticks(51);
        assert!(h.rail_contact(rail, Vec3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn test_second_rail_ignored_while_grinding() {
        let mut h = Harness::new();
        let first = straight_rail(&mut h);
        let second = straight_rail(&mut h);
        assert!(h.rail_contact(first, Vec3::ZERO));
        assert!(!h.rail_contact(second, Vec3::ZERO));
        assert_eq!(h.engine.character().path.current, Some(first));
    }
}
