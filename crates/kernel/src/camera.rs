use glade_common::DegenerateVector;
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub start: Vec3,
    /// Added to the tracked anchor to get the resting camera position.
    pub offset: Vec3,
    /// Added to the tracked anchor to get the look-at point.
    pub look_offset: Vec3,
    /// Per-tick lerp factor toward the resting position.
    pub smoothing: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            start: Vec3::new(0.0, 4.0, 8.0),
            offset: Vec3::new(0.0, 4.0, 8.0),
            look_offset: Vec3::new(0.0, 1.0, 0.0),
            smoothing: 0.08,
        }
    }
}

/// What the camera is tracking. Only one target at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraTarget {
    #[default]
    Player,
    Follower(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Vec3,
    pub forward: Vec3,
}

impl CameraPose {
    /// Right-handed view matrix. Looking straight up or down uses -Z as up.
    pub fn view_matrix(&self) -> Mat4 {
        let up = if self.forward.cross(Vec3::Y).length_squared() < 1e-6 {
            Vec3::NEG_Z
        } else {
            Vec3::Y
        };
        Mat4::look_at_rh(self.position, self.position + self.forward, up)
    }
}

/// Chase camera: position eases toward the target, gaze snaps to it.
#[derive(Debug, Clone)]
pub struct CameraTracker {
    config: CameraConfig,
    pose: CameraPose,
    target: CameraTarget,
}

impl CameraTracker {
    pub fn new(config: CameraConfig) -> Self {
        let look_at = config.look_offset;
        let forward = (look_at - config.start).try_normalize().unwrap_or(Vec3::NEG_Z);
        Self {
            config,
            pose: CameraPose {
                position: config.start,
                look_at,
                forward,
            },
            target: CameraTarget::Player,
        }
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    pub fn target(&self) -> &CameraTarget {
        &self.target
    }

    /// Replace the tracked target.
    pub fn set_target(&mut self, target: CameraTarget) {
        self.target = target;
    }

    pub fn desired_position(&self, anchor: Vec3) -> Vec3 {
        anchor + self.config.offset
    }

    /// One smoothing step from `current` toward the resting spot for `anchor`.
    pub fn next_position(&self, current: Vec3, anchor: Vec3) -> Vec3 {
        current.lerp(self.desired_position(anchor), self.config.smoothing)
    }

    /// Ease the position and re-aim at `anchor`.
    ///
    /// If the camera ends up on its own look-at point the previous forward is
    /// kept and `DegenerateVector` is returned; the position still updates.
    pub fn tick(&mut self, anchor: Vec3) -> Result<(), DegenerateVector> {
        let position = self.next_position(self.pose.position, anchor);
        let look_at = anchor + self.config.look_offset;
        self.pose.position = position;
        self.pose.look_at = look_at;
        let forward = (look_at - position).try_normalize().ok_or(DegenerateVector)?;
        self.pose.forward = forward;
        Ok(())
    }
}
