//! Host-owned registry of the things the character interacts with
//!
//! The engine never stores references into the scene. It keeps [`EntityId`]s
//! and looks them up on every use, so entities may vanish at any time.

use glam::Vec3;
use momentum_core::EntityId;
use serde::{Deserialize, Serialize};

/// A damageable enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EntityId,
    /// Also used as the value of the audio `Hit` switch
    pub name: String,
    pub position: Vec3,
    pub health: f32,
}

impl Enemy {
    pub fn new(name: impl Into<String>, position: Vec3, health: f32) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            position,
            health,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn take_damage(&mut self, amount: f32) {
        self.health = (self.health - amount.max(0.0)).max(0.0);
    }
}

/// A point the character can grapple to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrapplePoint {
    pub id: EntityId,
    pub position: Vec3,
    /// Where the character ends up once the hand arrives
    pub attach_point: Vec3,
    pub highlighted: bool,
}

impl GrapplePoint {
    pub fn new(position: Vec3, attach_point: Vec3) -> Self {
        Self {
            id: EntityId::new(),
            position,
            attach_point,
            highlighted: false,
        }
    }
}

/// A polyline rail
#[derive(Debug, Clone)]
pub struct RailPath {
    pub id: EntityId,
    points: Vec<Vec3>,
    looped: bool,
    /// Distance from the first point to the start of each segment, plus the total
    cumulative: Vec<f32>,
}

impl RailPath {
    pub fn new(points: Vec<Vec3>, looped: bool) -> Self {
        let segments = segment_count(points.len(), looped);
        let mut cumulative = Vec::with_capacity(segments + 1);
        let mut total = 0.0;
        cumulative.push(total);
        for i in 0..segments {
            let (a, b) = (points[i], points[(i + 1) % points.len()]);
            total += a.distance(b);
            cumulative.push(total);
        }

        Self {
            id: EntityId::new(),
            points,
            looped,
            cumulative,
        }
    }

    pub fn is_looped(&self) -> bool {
        self.looped
    }

    pub fn length(&self) -> f32 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Position and travel direction at `distance` along the rail. The
    /// distance is clamped to the rail.
    pub fn sample(&self, distance: f32) -> (Vec3, Vec3) {
        let Some(&first) = self.points.first() else {
            return (Vec3::ZERO, Vec3::NEG_Z);
        };
        let segments = self.cumulative.len() - 1;
        if segments == 0 {
            return (first, Vec3::NEG_Z);
        }

        let distance = distance.clamp(0.0, self.length());
        let segment = self.cumulative[1..]
            .iter()
            .position(|end| distance <= *end)
            .unwrap_or(segments - 1);

        let a = self.points[segment];
        let b = self.points[(segment + 1) % self.points.len()];
        let span = self.cumulative[segment + 1] - self.cumulative[segment];
        let t = if span > f32::EPSILON {
            (distance - self.cumulative[segment]) / span
        } else {
            0.0
        };
        let forward = (b - a).try_normalize().unwrap_or(Vec3::NEG_Z);
        (a.lerp(b, t), forward)
    }

    /// Distance along the rail of the point nearest to `position`
    pub fn project(&self, position: Vec3) -> f32 {
        let segments = self.cumulative.len().saturating_sub(1);
        let mut best = (f32::MAX, 0.0);
        for i in 0..segments {
            let a = self.points[i];
            let b = self.points[(i + 1) % self.points.len()];
            let ab = b - a;
            let t = if ab.length_squared() > f32::EPSILON {
                ((position - a).dot(ab) / ab.length_squared()).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let gap = position.distance_squared(a + ab * t);
            if gap < best.0 {
                best = (gap, self.cumulative[i] + ab.length() * t);
            }
        }
        best.1
    }
}

fn segment_count(points: usize, looped: bool) -> usize {
    match points {
        0 | 1 => 0,
        2 => 1,
        n if looped => n,
        n => n - 1,
    }
}

/// Everything the character can see, hit, grapple or ride
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub enemies: Vec<Enemy>,
    pub grapple_points: Vec<GrapplePoint>,
    pub rails: Vec<RailPath>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_enemy(&mut self, enemy: Enemy) -> EntityId {
        let id = enemy.id;
        self.enemies.push(enemy);
        id
    }

    pub fn add_grapple_point(&mut self, point: GrapplePoint) -> EntityId {
        let id = point.id;
        self.grapple_points.push(point);
        id
    }

    pub fn add_rail(&mut self, rail: RailPath) -> EntityId {
        let id = rail.id;
        self.rails.push(rail);
        id
    }

    pub fn remove(&mut self, id: EntityId) {
        self.enemies.retain(|e| e.id != id);
        self.grapple_points.retain(|g| g.id != id);
        self.rails.retain(|r| r.id != id);
    }

    pub fn enemy(&self, id: EntityId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    /// The enemy with `id`, if it exists and is still alive
    pub fn live_enemy(&self, id: EntityId) -> Option<&Enemy> {
        self.enemy(id).filter(|e| e.is_alive())
    }

    pub fn live_enemy_mut(&mut self, id: EntityId) -> Option<&mut Enemy> {
        self.enemies
            .iter_mut()
            .find(|e| e.id == id)
            .filter(|e| e.is_alive())
    }

    pub fn live_enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter().filter(|e| e.is_alive())
    }

    pub fn grapple_point(&self, id: EntityId) -> Option<&GrapplePoint> {
        self.grapple_points.iter().find(|g| g.id == id)
    }

    pub fn grapple_point_mut(&mut self, id: EntityId) -> Option<&mut GrapplePoint> {
        self.grapple_points.iter_mut().find(|g| g.id == id)
    }

    pub fn rail(&self, id: EntityId) -> Option<&RailPath> {
        self.rails.iter().find(|r| r.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(10.0, 0.0, 10.0),
            Vec3::new(0.0, 0.0, 10.0),
        ]
    }

    #[test]
    fn test_open_rail_length_and_sample() {
        let rail = RailPath::new(square(), false);
        assert_eq!(rail.length(), 30.0);

        let (pos, fwd) = rail.sample(15.0);
        assert!((pos - Vec3::new(10.0, 0.0, 5.0)).length() < 1e-5);
        assert!((fwd - Vec3::Z).length() < 1e-5);

        // clamped past the end
        let (pos, _) = rail.sample(100.0);
        assert!((pos - Vec3::new(0.0, 0.0, 10.0)).length() < 1e-5);
    }

    #[test]
    fn test_looped_rail_includes_closing_segment() {
        let rail = RailPath::new(square(), true);
        assert_eq!(rail.length(), 40.0);
        let (pos, fwd) = rail.sample(35.0);
        assert!((pos - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-5);
        assert!((fwd - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn test_project_finds_nearest_distance() {
        let rail = RailPath::new(square(), false);
        assert!((rail.project(Vec3::new(4.0, 1.0, -0.5)) - 4.0).abs() < 1e-5);
        assert!((rail.project(Vec3::new(11.0, 0.0, 3.0)) - 13.0).abs() < 1e-5);
    }

    #[test]
    fn test_dead_enemy_is_not_live() {
        let mut scene = Scene::new();
        let id = scene.add_enemy(Enemy::new("Grunt", Vec3::ZERO, 5.0));
        assert!(scene.live_enemy(id).is_some());

        if let Some(enemy) = scene.live_enemy_mut(id) {
            enemy.take_damage(10.0);
        }
        assert!(scene.live_enemy(id).is_none());
        assert!(scene.enemy(id).is_some());

        scene.remove(id);
        assert!(scene.enemy(id).is_none());
    }
}
