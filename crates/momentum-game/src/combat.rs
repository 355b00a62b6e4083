//! Attack queue, combo state machine, hit colliders and the karnage meter
//!
//! Combo and karnage counters live on the blackboard so the dash controller
//! can reset or re-enable attacking without holding a reference to this one.

use glam::Vec3;
use momentum_audio::cue;
use momentum_core::{planar, EntityId};
use momentum_physics::{ColliderTag, QueryMask};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::collab::{anim, ShakePreset, TickContext};
use crate::config::AttackConfig;

/// Distance below the body centre where the smash effect spawns
const FEET_OFFSET: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackKind {
    Weak,
    Heavy,
}

/// One queued attack
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackElement {
    pub kind: AttackKind,
    /// Queued while standing on the ground
    pub grounded: bool,
    /// 1 for a fresh combo; lower the later a follow-up lands in the chain window
    pub quality: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitSide {
    Left,
    Right,
}

impl HitSide {
    fn index(self) -> usize {
        match self {
            HitSide::Left => 0,
            HitSide::Right => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SmashSize {
    Small,
    Big,
}

/// Close in on the target with a dash, then strike
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashRequest {
    pub end: Vec3,
    pub kind: AttackKind,
}

#[derive(Debug, Default)]
pub struct CombatController {
    /// Attack currently being played
    current: Option<AttackElement>,
    /// Punch colliders, left then right
    hit_colliders: [bool; 2],
}

impl CombatController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_attack(&self) -> Option<AttackElement> {
        self.current
    }

    pub fn hit_collider_active(&self, side: HitSide) -> bool {
        self.hit_colliders[side.index()]
    }

    /// Build the queue element for an attack input
    pub fn element(kind: AttackKind, ctx: &TickContext) -> AttackElement {
        let combo = &ctx.character.combo;
        let window = ctx.config.combat.time_to_reset_combo;
        let quality = if combo.margin_timer.is_active() && window > 0.0 {
            combo.margin_timer.remaining() / window
        } else {
            1.0
        };
        AttackElement {
            kind,
            grounded: ctx.character.grounded,
            quality,
        }
    }

    /// Start the next attack of the combo. A no-op while attacking is not
    /// allowed. Returns a dash request when the target should be closed in
    /// on first; otherwise the strike has already happened.
    pub fn queue_attack(
        &mut self,
        element: AttackElement,
        ctx: &mut TickContext,
    ) -> Option<DashRequest> {
        if !ctx.character.combo.attack_allowed {
            trace!(kind = ?element.kind, "attack ignored");
            return None;
        }

        let combo = &mut ctx.character.combo;
        combo.index = (combo.index + 1).min(combo.max);
        combo.margin_timer.stop();
        combo.attack_allowed = false;
        combo.chained_animation = true;
        let index = combo.index;

        ctx.animation.set_integer(anim::ATTACK_INDEX, index as i32);
        ctx.physics.set_linear_velocity(Vec3::ZERO);
        ctx.physics.set_gravity_enabled(false);
        self.current = Some(element);
        debug!(kind = ?element.kind, index, quality = element.quality, "attack queued");

        let attack = attack_config(element.kind, ctx);
        let position = ctx.physics.position();
        let target = ctx
            .camera
            .targeted_enemy
            .and_then(|id| ctx.scene.live_enemy(id))
            .map(|enemy| enemy.position);

        if let Some(enemy) = target {
            let offset = planar(enemy - position);
            let distance = offset.length();
            let direction = offset.normalize_or_zero();

            if attack.dash_to_target
                && distance > attack.attack_range
                && distance <= attack.max_dash_distance
            {
                ctx.face(direction);
                let stop = enemy - direction * attack.attack_range;
                return Some(DashRequest {
                    end: Vec3::new(stop.x, position.y, stop.z),
                    kind: element.kind,
                });
            }
            if distance <= attack.attack_range {
                ctx.face(direction);
            }
        }

        self.strike_immediately(element.kind, element.grounded, ctx);
        None
    }

    /// Lunge forward and strike in place
    pub fn strike_immediately(&mut self, kind: AttackKind, grounded: bool, ctx: &mut TickContext) {
        let attack = attack_config(kind, ctx);
        let strength = if grounded {
            attack.impulse
        } else {
            attack.air_impulse
        };
        let position = ctx.physics.position();
        let impulse = ctx.physics.forward() * strength;
        ctx.physics.set_linear_velocity(Vec3::ZERO);
        ctx.physics.apply_impulse_at_point(impulse, position);
        self.strike(kind, ctx);
    }

    /// Play the strike. Also the continuation of a dash-to-target.
    pub fn strike(&mut self, kind: AttackKind, ctx: &mut TickContext) {
        let (trigger, event) = match kind {
            AttackKind::Weak => (anim::WEAK_ATTACK, cue::WEAK_ATTACK),
            AttackKind::Heavy => (anim::HEAVY_ATTACK, cue::HEAVY_ATTACK),
        };
        ctx.animation.set_trigger(trigger);
        ctx.post_audio(event);
        debug!(?kind, "strike");
    }

    /// Animation marker: the attack clip took over
    pub fn begin_attack(&mut self, ctx: &mut TickContext) {
        ctx.character.combo.margin_timer.stop();
        ctx.character.movement_allowed = false;
        ctx.character.anim_override_movement = true;
    }

    /// Animation marker: the chain window opened
    pub fn next_attack(&mut self, ctx: &mut TickContext) {
        let combo = &mut ctx.character.combo;
        if combo.index < combo.max {
            combo.attack_allowed = true;
            combo.chained_animation = false;
        }
    }

    /// Animation marker: the attack clip finished
    pub fn end_attack(&mut self, ctx: &mut TickContext) {
        ctx.physics.set_gravity_enabled(true);
        let combo = &ctx.character.combo;
        let chained = combo.chained_animation;
        let complete = combo.index >= combo.max;
        if !chained || complete {
            ctx.character.anim_override_movement = false;
            ctx.character.combo.chained_animation = false;
            self.current = None;
        }

        let combat = &ctx.config.combat;
        let combo = &mut ctx.character.combo;
        if complete {
            combo.index = 0;
            combo.reset_timer.start(combat.time_between_combos);
            ctx.character.movement_allowed = true;
            info!("combo complete");
        } else {
            combo.margin_timer.start(combat.time_to_reset_combo);
        }
    }

    pub fn tick(&mut self, ctx: &mut TickContext) {
        let combo = &mut ctx.character.combo;
        if combo.reset_timer.tick(ctx.dt) {
            combo.attack_allowed = true;
            trace!("attacks allowed again");
        }
        if combo.margin_timer.tick(ctx.dt) {
            combo.index = 0;
            combo.attack_allowed = true;
            ctx.character.movement_allowed = true;
            ctx.character.anim_override_movement = false;
            self.current = None;
            debug!("combo dropped");
        }

        tick_karnage(ctx);

        ctx.character.anim_forward_movement = ctx.animation.get_float(anim::FORWARD_MOVEMENT);
    }

    pub fn activate_hit_collider(&mut self, side: HitSide) {
        self.hit_colliders[side.index()] = true;
    }

    pub fn deactivate_hit_collider(&mut self, side: HitSide) {
        self.hit_colliders[side.index()] = false;
    }

    /// A punch collider touched something. Damages a live enemy once per
    /// activation; returns whether it did.
    pub fn punch_contact(
        &mut self,
        side: HitSide,
        tag: ColliderTag,
        point: Vec3,
        ctx: &mut TickContext,
    ) -> bool {
        if !self.hit_colliders[side.index()] {
            return false;
        }
        let ColliderTag::Entity(id) = tag else {
            return false;
        };
        let damage = ctx.config.combat.punch_damage;
        let Some(enemy) = ctx.scene.live_enemy_mut(id) else {
            return false;
        };
        enemy.take_damage(damage);
        let name = enemy.name.clone();
        let health = enemy.health;

        self.hit_colliders[side.index()] = false;
        ctx.set_audio_switch(cue::HIT, &name);
        ctx.post_audio(cue::PUNCH_HIT);
        ctx.effects.hit_burst(point);
        register_karnage_hit(ctx);
        debug!(?id, ?side, health, "punch landed");
        true
    }

    /// Shake the camera and damage every visible enemy around the character.
    /// Returns the ids of the enemies hit.
    pub fn smash_ground(&mut self, size: SmashSize, ctx: &mut TickContext) -> Vec<EntityId> {
        let combat = &ctx.config.combat;
        let (range, damage, preset) = match size {
            SmashSize::Small => (
                combat.small_smash_range,
                combat.small_smash_damage,
                ShakePreset::SmallSmash,
            ),
            SmashSize::Big => (
                combat.big_smash_range,
                combat.big_smash_damage,
                ShakePreset::BigSmash,
            ),
        };
        let band = combat.smash_band;

        let position = ctx.physics.position();
        ctx.effects.shake(preset);
        ctx.effects.ground_smash(position - Vec3::Y * FEET_OFFSET);

        let victims: Vec<EntityId> = ctx
            .scene
            .live_enemies()
            .filter(|enemy| (enemy.position.y - position.y).abs() < band)
            .filter(|enemy| planar(enemy.position - position).length() <= range)
            .filter(|enemy| {
                ctx.physics.line_of_sight(
                    position,
                    enemy.position,
                    enemy.id,
                    QueryMask::WORLD | QueryMask::ENEMY,
                )
            })
            .map(|enemy| enemy.id)
            .collect();

        for id in &victims {
            if let Some(enemy) = ctx.scene.live_enemy_mut(*id) {
                enemy.take_damage(damage);
            }
        }
        info!(?size, hits = victims.len(), "ground smash");
        victims
    }
}

fn attack_config<'c>(kind: AttackKind, ctx: &TickContext<'c>) -> &'c AttackConfig {
    match kind {
        AttackKind::Weak => &ctx.config.combat.weak,
        AttackKind::Heavy => &ctx.config.combat.heavy,
    }
}

/// Hard-clear the combo. Used when a dash interrupts combat.
pub fn reset_combat(ctx: &mut TickContext) {
    let combo = &mut ctx.character.combo;
    combo.index = 0;
    combo.attack_allowed = false;
    combo.reset_timer.stop();
    combo.margin_timer.stop();
    ctx.character.anim_override_movement = false;
}

pub fn allow_attack(ctx: &mut TickContext) {
    ctx.character.combo.attack_allowed = true;
}

/// Count a hit toward karnage mode
pub fn register_karnage_hit(ctx: &mut TickContext) {
    let config = &ctx.config.combat.karnage;
    let karnage = &mut ctx.character.karnage;
    if karnage.on {
        return;
    }

    karnage.combo = (karnage.combo + 1).min(config.max_combo);
    karnage.rest.start(config.time_before_decrease);
    karnage.step.start(config.max_timer);

    if karnage.combo >= config.max_combo {
        karnage.on = true;
        karnage.points = config.max_points;
        karnage.combo = 0;
        info!(points = karnage.points, "karnage mode on");
    }
}

fn tick_karnage(ctx: &mut TickContext) {
    let config = &ctx.config.combat.karnage;
    let karnage = &mut ctx.character.karnage;

    if karnage.on {
        karnage.points = (karnage.points - config.decrease_speed * ctx.dt).max(0.0);
        if karnage.points <= 0.0 {
            karnage.on = false;
            info!("karnage mode off");
        }
        return;
    }

    if karnage.combo == 0 {
        return;
    }
    if karnage.is_resting() {
        karnage.rest.tick(ctx.dt);
        return;
    }
    if karnage.step.tick(ctx.dt) {
        karnage.combo -= 1;
        karnage.step.start(config.max_timer);
        debug!(combo = karnage.combo, "karnage combo decayed");
    }
}
