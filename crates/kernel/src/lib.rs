//! Scene kernel: authoritative state for a small explorable scene.
//!
//! # Invariants
//! - `WorldState::tick` is the only mutation path once a session starts.
//! - Randomness is consumed at construction only; ticking is deterministic.
//! - The day/night mix stays in `[0, 1]`.
//! - Scattered entities never land inside an exclusion zone.

pub mod audio;
pub mod camera;
pub mod config;
pub mod cycle;
pub mod error;
pub mod event;
pub mod fauna;
pub mod follow;
pub mod proximity;
pub mod scatter;
pub mod snapshot;
pub mod world;

pub use audio::{AudioConfig, AudioCue, AudioSink, ambient_volume, drive_audio};
pub use camera::{CameraConfig, CameraPose, CameraTarget, CameraTracker};
pub use config::{CycleConfig, Landmark, PlayerConfig, ScatterConfig, SceneConfig};
pub use cycle::{CelestialBody, CycleIntegrator, CycleState, SkyConfig, SkyParams};
pub use error::{SceneError, SceneResult};
pub use event::SceneEvent;
pub use fauna::{BirdPose, FaunaConfig, Flock};
pub use follow::{FollowController, FollowState, Follower, FollowerConfig, Pursuit};
pub use proximity::{HintDismissal, InteractionZone, ProximityTrigger, ZoneAction, ZoneStatus};
pub use scatter::{ExclusionZone, PlacementExhausted, ScaleRange, ScatterEntity, Scatterer};
pub use snapshot::{FollowerView, SceneSnapshot, ZoneView};
pub use world::WorldState;

pub fn crate_info() -> &'static str {
    "glade-kernel v0.1.0"
}
