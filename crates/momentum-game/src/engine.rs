//! The coordination engine: owns the blackboard and every controller, routes
//! input to handlers and ticks them in the configured order.

use glam::Vec3;
use momentum_core::{EntityId, Transform};
use momentum_physics::ColliderTag;
use tracing::{debug, info, trace, warn};

use crate::action::ActionKind;
use crate::camera::CameraController;
use crate::checkpoint::CheckpointTrack;
use crate::collab::{Collaborators, TickContext};
use crate::combat::{self, AttackElement, AttackKind, CombatController, HitSide, SmashSize};
use crate::config::EngineConfig;
use crate::dash::{DashContinuation, DashController, DashPhase};
use crate::error::EngineError;
use crate::grapple::{GrappleController, GrappleEvent};
use crate::grind::GrindController;
use crate::input::{InputEvent, InputPhase};
use crate::movement::{self, MovementController};
use crate::state::{Blackboard, CameraState, CharacterState};

/// Every controller, one of each
#[derive(Debug, Default)]
struct Handlers {
    movement: MovementController,
    dash: DashController,
    grapple: GrappleController,
    grind: GrindController,
    combat: CombatController,
    camera: CameraController,
}

impl Handlers {
    fn input(&mut self, kind: ActionKind, event: &InputEvent, ctx: &mut TickContext) {
        match kind {
            ActionKind::Movement => self.movement.on_input(event, ctx),
            ActionKind::Sprint => movement::sprint_input(event, ctx),
            ActionKind::Jump => movement::jump_input(event, ctx),
            ActionKind::Dash => self.dash.on_input(event, ctx),
            ActionKind::Grapple => {
                if let Some(request) = self.grapple.on_input(event, ctx) {
                    self.grapple_request(request, ctx);
                }
            }
            ActionKind::WeakAttack => self.attack(AttackKind::Weak, event, ctx),
            ActionKind::HeavyAttack => self.attack(AttackKind::Heavy, event, ctx),
            ActionKind::CameraFree => self.camera.on_free_input(event, ctx),
            ActionKind::CameraTargeted => self.camera.on_target_input(event, ctx),
            ActionKind::CameraReset => self.camera.on_reset_input(event, ctx),
            ActionKind::Grind | ActionKind::Combat | ActionKind::CameraGrind => {}
        }
    }

    fn tick(&mut self, kind: ActionKind, ctx: &mut TickContext) {
        match kind {
            ActionKind::Movement => self.movement.tick(ctx),
            ActionKind::Dash => {
                if let Some(DashContinuation::Strike(attack)) = self.dash.tick(ctx) {
                    self.combat.strike(attack, ctx);
                }
            }
            ActionKind::Grapple => {
                if let Some(request) = self.grapple.tick(ctx) {
                    self.grapple_request(request, ctx);
                }
            }
            ActionKind::Grind => self.grind.tick(ctx),
            ActionKind::Combat => self.combat.tick(ctx),
            ActionKind::CameraFree => self.camera.tick_free(ctx),
            ActionKind::CameraTargeted => self.camera.tick_targeted(ctx),
            ActionKind::CameraGrind => self.camera.tick_grinding(ctx),
            ActionKind::Sprint
            | ActionKind::Jump
            | ActionKind::WeakAttack
            | ActionKind::HeavyAttack
            | ActionKind::CameraReset => {}
        }
    }

    fn attack(&mut self, kind: AttackKind, event: &InputEvent, ctx: &mut TickContext) {
        if event.phase != InputPhase::Started {
            return;
        }
        let element: AttackElement = CombatController::element(kind, ctx);
        let Some(request) = self.combat.queue_attack(element, ctx) else {
            return;
        };

        let continuation = DashContinuation::Strike(request.kind);
        if !self.dash.dash(request.end, false, Some(continuation), ctx) {
            debug!("dash to target refused, striking in place");
            self.combat.strike_immediately(request.kind, element.grounded, ctx);
        }
    }

    fn grapple_request(&mut self, request: GrappleEvent, ctx: &mut TickContext) {
        match request {
            GrappleEvent::Attach(point) => {
                if !self.dash.dash(point, true, None, ctx) {
                    debug!("grapple dash refused");
                }
            }
            GrappleEvent::Release => {
                self.dash.end_dash(ctx);
                self.grapple.release(ctx);
            }
        }
    }
}

/// Owns the character and camera state and drives every controller.
///
/// The host calls [`Engine::on_input`] whenever an input arrives and
/// [`Engine::tick`] once per fixed step, handing over its collaborators for
/// the duration of each call. Animation markers and collision callbacks have
/// their own entry points.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    board: Blackboard,
    handlers: Handlers,
    checkpoints: CheckpointTrack,
}

impl Engine {
    /// Validate `config` and set up state for a character standing at `spawn`
    pub fn new(config: EngineConfig, spawn: Transform) -> Result<Self, EngineError> {
        if let Err(e) = config.validate() {
            warn!("Engine configuration rejected: {}", e);
            return Err(e);
        }

        let board = Blackboard {
            character: CharacterState::new(&config),
            camera: CameraState::new(&spawn, &config.camera),
        };
        info!(
            handlers = config.dispatch.order.len(),
            bindings = config.dispatch.bindings.len(),
            "Coordination engine initialized"
        );

        Ok(Self {
            config,
            board,
            handlers: Handlers::default(),
            checkpoints: CheckpointTrack::default(),
        })
    }

    pub fn with_checkpoints(mut self, checkpoints: CheckpointTrack) -> Self {
        self.checkpoints = checkpoints;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn board(&self) -> &Blackboard {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Blackboard {
        &mut self.board
    }

    pub fn character(&self) -> &CharacterState {
        &self.board.character
    }

    pub fn camera(&self) -> &CameraState {
        &self.board.camera
    }

    pub fn dash_phase(&self) -> DashPhase {
        self.handlers.dash.phase()
    }

    pub fn grapple(&self) -> &GrappleController {
        &self.handlers.grapple
    }

    pub fn current_attack(&self) -> Option<AttackElement> {
        self.handlers.combat.current_attack()
    }

    pub fn hit_collider_active(&self, side: HitSide) -> bool {
        self.handlers.combat.hit_collider_active(side)
    }

    pub fn checkpoints(&self) -> &CheckpointTrack {
        &self.checkpoints
    }

    fn split<'a>(
        &'a mut self,
        collab: &'a mut Collaborators<'_>,
    ) -> (&'a mut Handlers, TickContext<'a>) {
        let Engine {
            config,
            board,
            handlers,
            ..
        } = self;
        (handlers, TickContext::new(board, config, collab))
    }

    /// Route an input to its handler. Unbound actions are ignored.
    pub fn on_input(&mut self, event: &InputEvent, collab: &mut Collaborators<'_>) {
        let Some(kind) = self.config.dispatch.bindings.get(&event.action).copied() else {
            trace!(action = %event.action, "unbound input");
            return;
        };
        trace!(action = %event.action, ?kind, phase = ?event.phase, "input");
        let (handlers, mut ctx) = self.split(collab);
        handlers.input(kind, event, &mut ctx);
    }

    /// Advance one fixed step: probe the ground, then tick every handler in
    /// order.
    pub fn tick(&mut self, collab: &mut Collaborators<'_>) {
        let Engine {
            config,
            board,
            handlers,
            ..
        } = self;
        let mut ctx = TickContext::new(board, config, collab);

        movement::probe_ground(&mut ctx);
        for kind in &config.dispatch.order {
            handlers.tick(*kind, &mut ctx);
        }
    }

    pub fn begin_attack(&mut self, collab: &mut Collaborators<'_>) {
        let (handlers, mut ctx) = self.split(collab);
        handlers.combat.begin_attack(&mut ctx);
    }

    pub fn next_attack(&mut self, collab: &mut Collaborators<'_>) {
        let (handlers, mut ctx) = self.split(collab);
        handlers.combat.next_attack(&mut ctx);
    }

    pub fn end_attack(&mut self, collab: &mut Collaborators<'_>) {
        let (handlers, mut ctx) = self.split(collab);
        handlers.combat.end_attack(&mut ctx);
    }

    pub fn activate_hit_collider(&mut self, side: HitSide) {
        self.handlers.combat.activate_hit_collider(side);
    }

    pub fn deactivate_hit_collider(&mut self, side: HitSide) {
        self.handlers.combat.deactivate_hit_collider(side);
    }

    pub fn punch_contact(
        &mut self,
        side: HitSide,
        tag: ColliderTag,
        point: Vec3,
        collab: &mut Collaborators<'_>,
    ) -> bool {
        let (handlers, mut ctx) = self.split(collab);
        handlers.combat.punch_contact(side, tag, point, &mut ctx)
    }

    pub fn smash_ground(&mut self, size: SmashSize, collab: &mut Collaborators<'_>) -> Vec<EntityId> {
        let (handlers, mut ctx) = self.split(collab);
        handlers.combat.smash_ground(size, &mut ctx)
    }

    pub fn register_karnage_hit(&mut self, collab: &mut Collaborators<'_>) {
        let (_, mut ctx) = self.split(collab);
        combat::register_karnage_hit(&mut ctx);
    }

    /// The character touched `rail` at `contact`
    pub fn rail_contact(
        &mut self,
        rail: EntityId,
        contact: Vec3,
        collab: &mut Collaborators<'_>,
    ) -> bool {
        let (handlers, mut ctx) = self.split(collab);
        handlers.grind.rail_contact(rail, contact, &mut ctx)
    }

    /// Force any dash or grapple to stop. Safe to call at any time.
    pub fn end_dash(&mut self, collab: &mut Collaborators<'_>) {
        let (handlers, mut ctx) = self.split(collab);
        handlers.dash.end_dash(&mut ctx);
        if handlers.grapple.is_grappling() {
            handlers.grapple.release(&mut ctx);
        }
    }

    pub fn take_hit(&mut self, damage: f32) {
        self.board.character.take_hit(damage);
        trace!(health = self.board.character.health, "character hit");
    }

    pub fn reach_checkpoint(&mut self, index: usize) -> bool {
        self.checkpoints.reach(index)
    }

    /// Teleport to the current checkpoint, cutting any dash short
    pub fn respawn(&mut self, collab: &mut Collaborators<'_>) {
        let Some(point) = self.checkpoints.respawn_point() else {
            warn!("No checkpoint to respawn at");
            return;
        };

        let (handlers, mut ctx) = self.split(collab);
        if ctx.character.invincible {
            handlers.dash.end_dash(&mut ctx);
        }
        ctx.physics.set_position(point);
        ctx.physics.set_linear_velocity(Vec3::ZERO);
        info!(?point, "respawned");
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::state::CameraMode;
    use crate::test_support::Harness;

    #[test]
    fn test_invalid_config_fails_fast() {
        let mut config = EngineConfig::default();
        config.dispatch.order.retain(|k| *k != ActionKind::Dash);
        assert_eq!(
            Engine::new(config, Transform::default()).err(),
            Some(EngineError::MissingHandler(ActionKind::Dash))
        );

        let mut config = EngineConfig::default();
        config.character.dash_speed = 0.0;
        assert!(matches!(
            Engine::new(config, Transform::default()),
            Err(EngineError::InvalidConfig { field: "character.dash_speed", .. })
        ));
    }

    #[test]
    fn test_unbound_action_is_ignored() {
        let mut h = Harness::new();
        h.input(InputEvent::started("Teleport"));
        h.tick();
        assert!(h.audio.events.is_empty());
        assert_eq!(h.engine.dash_phase(), DashPhase::Idle);
    }

    #[test]
    fn test_rebinding_routes_to_new_handler() {
        let mut config = EngineConfig::default();
        config
            .dispatch
            .bindings
            .insert("Dodge".to_string(), ActionKind::Dash);
        let mut h = Harness::with_config(config);
        h.input(InputEvent::started("Dodge"));
        assert!(h.engine.character().invincible);
    }

    #[test]
    fn test_camera_frames_position_after_dash_moves() {
        let mut h = Harness::new();
        h.tick();
        h.input(InputEvent::started("Dash"));
        h.ticks(3);

        let camera = h.engine.camera();
        let anchor = camera.transform.position - camera.point * camera.applied_distance;
        let expected = h.physics.position + Vec3::Y * 1.5;
        // only the sideways offset separates them
        assert!(((anchor - expected).length() - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_input_before_tick_is_seen_by_that_tick() {
        let mut h = Harness::new();
        h.tick();
        h.input(InputEvent::axis("Move", InputPhase::Started, Vec2::new(0.0, 1.0)));
        h.input(InputEvent::started("Sprint"));
        h.ticks(20);
        assert!(h.engine.character().sprinting);
        assert!(h.physics.velocity.z < -5.0);
    }

    #[test]
    fn test_end_dash_releases_grapple() {
        let mut h = Harness::new();
        h.add_grapple_point(Vec3::new(0.0, 1.0, -4.0), Vec3::new(0.0, 0.9, -5.0));
        h.tick();
        h.input(InputEvent::started("Grapple"));
        assert!(h.engine.grapple().is_grappling());

        h.end_dash();
        assert!(!h.engine.grapple().is_grappling());
        assert!(h.effects.hand.is_none());
        assert!(h.engine.character().movement_allowed);
    }

    #[test]
    fn test_take_hit_ignored_mid_dash() {
        let mut h = Harness::new();
        h.input(InputEvent::started("Dash"));
        h.engine.take_hit(40.0);
        assert_eq!(h.engine.character().health, 100.0);

        h.ticks(30);
        h.engine.take_hit(40.0);
        assert_eq!(h.engine.character().health, 60.0);
    }

    #[test]
    fn test_respawn_ends_dash_and_teleports() {
        let mut h = Harness::new();
        let track = CheckpointTrack::new([Vec3::new(0.0, 0.9, 0.0), Vec3::new(30.0, 0.9, 0.0)]);
        h.engine = Engine::new(EngineConfig::default(), Transform::default())
            .expect("default config is valid")
            .with_checkpoints(track);

        assert!(h.engine.reach_checkpoint(1));
        h.input(InputEvent::started("Dash"));
        h.tick();
        h.respawn();

        assert_eq!(h.physics.position, Vec3::new(30.0, 0.9, 0.0));
        assert!(!h.engine.character().invincible);
        assert!(h.effects.visible);
        assert_eq!(h.physics.velocity, Vec3::ZERO);
    }

    #[test]
    fn test_respawn_without_checkpoints_is_noop() {
        let mut h = Harness::new();
        let before = h.physics.position;
        h.respawn();
        assert_eq!(h.physics.position, before);
    }

    #[test]
    fn test_targeted_input_ignored_while_grinding() {
        let mut h = Harness::new();
        h.add_enemy("Grunt", Vec3::new(0.0, 1.0, -4.0));
        h.tick();
        h.engine.board_mut().character.movement_state = crate::state::MovementState::Grinding;
        h.input(InputEvent::started("Target"));
        assert_ne!(h.engine.camera().mode, CameraMode::Targeted);
    }
}
