use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Position plus a yaw about +Y, in radians.
///
/// A yaw of zero faces +Z; positive yaw turns toward +X.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub facing: f32,
}

impl Pose {
    pub fn new(position: Vec3, facing: f32) -> Self {
        Self { position, facing }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            facing: 0.0,
        }
    }
}

/// A zero-length (or non-finite) direction showed up where a heading was needed.
///
/// Callers recover by skipping whatever update needed the direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("degenerate direction vector")]
pub struct DegenerateVector;

/// Project a world position onto the ground plane.
pub fn planar(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Horizontal distance between two world positions.
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    planar(a).distance(planar(b))
}

/// Unit ground-plane direction from `from` toward `to`.
pub fn planar_direction(from: Vec3, to: Vec3) -> Result<Vec2, DegenerateVector> {
    let delta = planar(to) - planar(from);
    let len = delta.length();
    if len == 0.0 || !len.is_finite() {
        return Err(DegenerateVector);
    }
    Ok(delta / len)
}

/// Yaw that points +Z along a ground-plane displacement.
pub fn yaw_toward(delta: Vec2) -> Result<f32, DegenerateVector> {
    if delta == Vec2::ZERO || !delta.is_finite() {
        return Err(DegenerateVector);
    }
    Ok(delta.x.atan2(delta.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn pose_default_is_origin() {
        let p = Pose::default();
        assert_eq!(p.position, Vec3::ZERO);
        assert_eq!(p.facing, 0.0);
    }

    #[test]
    fn planar_distance_ignores_height() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(3.0, 100.0, 4.0);
        assert!((planar_distance(a, b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn planar_direction_is_unit() {
        let d = planar_direction(Vec3::ZERO, Vec3::new(3.0, 7.0, 4.0)).unwrap();
        assert!((d.length() - 1.0).abs() < 1e-6);
        assert!((d.x - 0.6).abs() < 1e-6);
        assert!((d.y - 0.8).abs() < 1e-6);
    }

    #[test]
    fn planar_direction_rejects_zero() {
        let p = Vec3::new(1.0, 0.0, 1.0);
        assert_eq!(planar_direction(p, p + Vec3::Y), Err(DegenerateVector));
    }

    #[test]
    fn yaw_toward_axes() {
        assert!((yaw_toward(Vec2::new(0.0, 1.0)).unwrap()).abs() < 1e-6);
        assert!((yaw_toward(Vec2::new(1.0, 0.0)).unwrap() - FRAC_PI_2).abs() < 1e-6);
        assert_eq!(yaw_toward(Vec2::ZERO), Err(DegenerateVector));
    }
}
