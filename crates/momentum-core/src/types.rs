//! Core types used throughout the Momentum engine

use glam::{Mat3, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Handle for anything the engine refers to without owning (enemies,
/// grapple points, rails, the character itself)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Create a new random entity ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

/// Position and orientation of a scene object. Forward is -Z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Transform {
    /// Create a new transform at the given position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a new transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Compute the model matrix for this transform
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    /// Get the forward direction (negative Z in local space)
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    /// Get the right direction (positive X in local space)
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Rotate so that forward points at `target`
    pub fn look_at(&mut self, target: Vec3) {
        self.look_to(target - self.position);
    }

    /// Rotate so that forward points along `direction`.
    ///
    /// Zero-length directions and directions parallel to world up leave the
    /// rotation untouched.
    pub fn look_to(&mut self, direction: Vec3) {
        if let Some(rotation) = Self::rotation_towards(direction) {
            self.rotation = rotation;
        }
    }

    /// Rotation whose forward axis is `direction`, with world Y as up
    pub fn rotation_towards(direction: Vec3) -> Option<Quat> {
        let forward = direction.try_normalize()?;
        let back = -forward;
        let right = Vec3::Y.cross(back).try_normalize()?;
        let up = back.cross(right);
        Some(Quat::from_mat3(&Mat3::from_cols(right, up, back)))
    }
}

/// Project onto the ground plane (drop the Y component)
pub fn planar(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Signed angle in degrees that rotates `from` onto `to` about world Y.
///
/// Both vectors are flattened first; the result is in (-180, 180].
pub fn signed_angle_y(from: Vec3, to: Vec3) -> f32 {
    let a = planar(from);
    let b = planar(to);
    a.cross(b).y.atan2(a.dot(b)).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_matrix() {
        let transform = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        let matrix = transform.matrix();
        let translation = matrix.col(3).truncate();
        assert_eq!(translation, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_look_to_sets_forward() {
        let mut transform = Transform::default();
        transform.look_to(Vec3::new(1.0, 0.0, 0.0));
        assert!((transform.forward() - Vec3::X).length() < 1e-5);
        assert!((transform.right() - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_look_to_ignores_degenerate_directions() {
        let mut transform = Transform::default();
        transform.look_to(Vec3::ZERO);
        transform.look_to(Vec3::Y);
        assert_eq!(transform.rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_signed_angle_y() {
        let angle = signed_angle_y(-Vec3::Z, Vec3::X);
        assert!((angle + 90.0).abs() < 1e-4);

        let rotated = Quat::from_rotation_y(angle.to_radians()) * -Vec3::Z;
        assert!((rotated - Vec3::X).length() < 1e-5);
    }
}
