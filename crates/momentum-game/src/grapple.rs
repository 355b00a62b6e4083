//! Grapple target acquisition and hand travel
//!
//! The controller picks the best on-screen grapple point every tick, sends a
//! hand toward it on input, and asks the engine to dash to the attach point
//! once the hand arrives.

use glam::Vec3;
use momentum_audio::cue;
use momentum_core::{EntityId, Transform};
use momentum_physics::QueryMask;
use tracing::{debug, info, trace};

use crate::camera::{project, screen_distance};
use crate::collab::TickContext;
use crate::input::{InputEvent, InputPhase};

/// Hand spawn height above the body centre
const HAND_RAISE: f32 = 0.2;

/// Requests the grapple hands to the engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GrappleEvent {
    /// The hand reached its point; dash to this position in grapple mode
    Attach(Vec3),
    /// Stop grappling
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GrapplePhase {
    Idle,
    Travelling {
        target: EntityId,
        origin: Vec3,
        elapsed: f32,
        duration: f32,
    },
    Attached {
        target: EntityId,
    },
}

#[derive(Debug)]
pub struct GrappleController {
    phase: GrapplePhase,
    /// Current best candidate
    highlighted: Option<EntityId>,
    /// Point used most recently; skipped until forgotten
    last_target: Option<EntityId>,
    idle_time: f32,
}

impl Default for GrappleController {
    fn default() -> Self {
        Self {
            phase: GrapplePhase::Idle,
            highlighted: None,
            last_target: None,
            idle_time: 0.0,
        }
    }
}

impl GrappleController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> GrapplePhase {
        self.phase
    }

    pub fn candidate(&self) -> Option<EntityId> {
        self.highlighted
    }

    pub fn is_grappling(&self) -> bool {
        !matches!(self.phase, GrapplePhase::Idle)
    }

    pub fn on_input(&mut self, event: &InputEvent, ctx: &mut TickContext) -> Option<GrappleEvent> {
        match event.phase {
            InputPhase::Started => {
                self.launch(ctx);
                None
            }
            InputPhase::Canceled if self.is_grappling() => Some(GrappleEvent::Release),
            _ => None,
        }
    }

    fn launch(&mut self, ctx: &mut TickContext) {
        if self.is_grappling() {
            return;
        }
        let Some(target) = self.highlighted else {
            return;
        };
        let Some(point) = ctx.scene.grapple_point(target) else {
            return;
        };
        let point_position = point.position;

        let position = ctx.physics.position();
        let origin = position + ctx.physics.forward() + Vec3::Y * HAND_RAISE;
        let duration = position.distance(point_position) / (2.0 * ctx.config.character.grapple_speed);

        self.last_target = Some(target);
        self.idle_time = 0.0;
        self.phase = GrapplePhase::Travelling {
            target,
            origin,
            elapsed: 0.0,
            duration,
        };

        ctx.face(point_position - position);
        ctx.effects.set_grapple_hand(Some(hand_pose(origin, point_position)));
        ctx.set_audio_switch(cue::HIT, cue::HIT_GRAPPLE_POINT);
        ctx.post_audio(cue::GRAPPLE_START);
        if !ctx.character.grounded {
            ctx.physics.set_gravity_enabled(false);
        }
        info!(?target, duration, "grapple launched");
    }

    pub fn tick(&mut self, ctx: &mut TickContext) -> Option<GrappleEvent> {
        let candidate = select_candidate(ctx, self.last_target);
        self.highlight(candidate, ctx);

        match &mut self.phase {
            GrapplePhase::Idle => {
                if self.last_target.is_some() {
                    self.idle_time += ctx.dt;
                    if self.idle_time > ctx.config.character.grapple_forget_time {
                        trace!("last grapple point forgotten");
                        self.last_target = None;
                        self.idle_time = 0.0;
                    }
                }
                None
            }
            GrapplePhase::Travelling {
                target,
                origin,
                elapsed,
                duration,
            } => {
                let Some(point) = ctx.scene.grapple_point(*target) else {
                    debug!("grapple point vanished mid travel");
                    return Some(GrappleEvent::Release);
                };
                let (point_position, attach) = (point.position, point.attach_point);

                let t = if *duration > f32::EPSILON {
                    (*elapsed / *duration).min(1.0)
                } else {
                    1.0
                };
                let hand = origin.lerp(point_position, t);
                ctx.effects.set_grapple_hand(Some(hand_pose(hand, point_position)));
                *elapsed += ctx.dt;

                if t < 1.0 {
                    return None;
                }
                let target = *target;
                ctx.character.movement_allowed = false;
                self.phase = GrapplePhase::Attached { target };
                info!(?target, "grapple attached");
                Some(GrappleEvent::Attach(attach))
            }
            GrapplePhase::Attached { target } => {
                if ctx.scene.grapple_point(*target).is_none() {
                    return Some(GrappleEvent::Release);
                }
                None
            }
        }
    }

    /// Drop the hand and give control back. The engine force-ends any
    /// grapple dash before calling this.
    pub fn release(&mut self, ctx: &mut TickContext) {
        if self.is_grappling() {
            info!("grapple released");
        }
        self.phase = GrapplePhase::Idle;
        self.idle_time = 0.0;
        ctx.effects.set_grapple_hand(None);
        ctx.character.movement_allowed = true;
    }

    fn highlight(&mut self, candidate: Option<EntityId>, ctx: &mut TickContext) {
        if candidate == self.highlighted {
            return;
        }
        for (id, on) in [(self.highlighted, false), (candidate, true)] {
            let Some(id) = id else { continue };
            if let Some(point) = ctx.scene.grapple_point_mut(id) {
                point.highlighted = on;
            }
            ctx.effects.set_grapple_highlight(id, on);
        }
        self.highlighted = candidate;
    }
}

/// Nearest grapple point that is in range, near the centre of the screen and
/// in line of sight. `exclude` is never returned.
fn select_candidate(ctx: &TickContext, exclude: Option<EntityId>) -> Option<EntityId> {
    let params = &ctx.config.character;
    let lens = &ctx.config.camera.lens;
    let position = ctx.physics.position();
    let max_offset = params.grapple_screen_radius * 0.01;

    ctx.scene
        .grapple_points
        .iter()
        .filter(|point| Some(point.id) != exclude)
        .map(|point| (point, position.distance(point.position)))
        .filter(|(_, distance)| *distance <= params.grapple_range)
        .filter(|(point, _)| {
            project(&ctx.camera.transform, lens, point.position)
                .is_some_and(|ndc| screen_distance(ndc, lens) < max_offset)
        })
        .filter(|(point, _)| {
            ctx.physics.line_of_sight(
                position,
                point.position,
                point.id,
                QueryMask::WORLD | QueryMask::GRAPPLE,
            )
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(point, _)| point.id)
}

fn hand_pose(hand: Vec3, target: Vec3) -> Transform {
    let mut pose = Transform::from_position(hand);
    pose.look_at(target);
    pose
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputEvent;
    use crate::test_support::Harness;
    use momentum_physics::ColliderTag;

    const POINT: Vec3 = Vec3::new(0.0, 1.0, -4.0);
    const ATTACH: Vec3 = Vec3::new(0.0, 0.9, -5.0);

    #[test]
    fn test_candidate_is_highlighted() {
        let mut h = Harness::new();
        let id = h.add_grapple_point(POINT, ATTACH);
        h.tick();

        assert_eq!(h.engine.grapple().candidate(), Some(id));
        assert_eq!(h.effects.highlights.get(&id), Some(&true));
        assert!(h.scene.grapple_point(id).is_some_and(|p| p.highlighted));
    }

    #[test]
    fn test_out_of_range_point_ignored() {
        let mut h = Harness::new();
        h.add_grapple_point(Vec3::new(0.0, 1.0, -40.0), ATTACH);
        h.tick();
        assert_eq!(h.engine.grapple().candidate(), None);
    }

    #[test]
    fn test_blocked_point_ignored() {
        let mut h = Harness::new();
        h.add_grapple_point(POINT, ATTACH);
        h.physics.add_plane(Vec3::Z, -2.0, ColliderTag::World, QueryMask::WORLD);
        h.tick();
        assert_eq!(h.engine.grapple().candidate(), None);
    }

    #[test]
    fn test_off_screen_point_ignored() {
        let mut h = Harness::new();
        // behind the camera
        h.add_grapple_point(Vec3::new(0.0, 1.0, 20.0), ATTACH);
        h.tick();
        assert_eq!(h.engine.grapple().candidate(), None);
    }

    #[test]
    fn test_grapple_travels_then_dashes_to_attach_point() {
        let mut h = Harness::new();
        let id = h.add_grapple_point(POINT, ATTACH);
        h.tick();
        h.input(InputEvent::started("Grapple"));

        assert!(matches!(h.engine.grapple().phase(), GrapplePhase::Travelling { target, .. } if target == id));
        assert!(h.audio.events.contains(&cue::GRAPPLE_START.to_string()));
        assert!(h
            .audio
            .switches
            .contains(&(cue::HIT.to_string(), cue::HIT_GRAPPLE_POINT.to_string())));
        assert!(h.effects.hand.is_some());

        h.ticks(40);
        assert!(matches!(h.engine.grapple().phase(), GrapplePhase::Attached { .. }));
        assert!((h.physics.position - ATTACH).length() < 1e-3);
        // grapple dashes keep control locked until release
        assert!(!h.engine.character().movement_allowed);
        assert!(!h.physics.gravity);

        h.input(InputEvent::canceled("Grapple"));
        assert!(matches!(h.engine.grapple().phase(), GrapplePhase::Idle));
        assert!(h.engine.character().movement_allowed);
        assert!(h.physics.gravity);
        assert!(h.effects.hand.is_none());
    }

    #[test]
    fn test_last_target_is_forgotten_after_grace_period() {
        let mut h = Harness::new();
        let id = h.add_grapple_point(POINT, ATTACH);
        h.tick();
        h.input(InputEvent::started("Grapple"));
        h.tick();
        h.input(InputEvent::canceled("Grapple"));
        h.physics.position = Vec3::new(0.0, 0.9, 0.0);

        h.tick();
        assert_eq!(h.engine.grapple().candidate(), None);

        // grapple_forget_time is one second
        h.ticks(60);
        assert_eq!(h.engine.grapple().candidate(), Some(id));
    }
}
