use glade_common::Pose;
use glam::{Vec2, Vec3};
use serde::Serialize;

use crate::audio::ambient_volume;
use crate::camera::CameraPose;
use crate::config::Landmark;
use crate::cycle::{CycleState, SkyParams};
use crate::fauna::BirdPose;
use crate::follow::FollowState;
use crate::proximity::ZoneAction;
use crate::scatter::ScatterEntity;
use crate::world::WorldState;

/// Read-only view of one tick, handed to renderers and serialized by tools.
///
/// Borrowed from the world, so it cannot outlive the next `tick`.
#[derive(Debug, Clone, Serialize)]
pub struct SceneSnapshot<'a> {
    pub tick: u64,
    pub elapsed_secs: f32,
    pub player: Pose,
    pub followers: Vec<FollowerView<'a>>,
    pub scatter: &'a [ScatterEntity],
    pub cycle: CycleState,
    pub sky: SkyParams,
    pub camera: CameraPose,
    pub zones: Vec<ZoneView<'a>>,
    pub hint_visible: bool,
    pub controls_visible: bool,
    pub birds: Vec<BirdPose>,
    pub fireflies: &'a [Vec3],
    pub landmarks: &'a [Landmark],
    pub ambient_volume: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FollowerView<'a> {
    pub id: &'a str,
    pub pose: Pose,
    pub state: FollowState,
    pub published: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZoneView<'a> {
    pub id: &'a str,
    pub anchor: Vec2,
    pub radius: f32,
    pub near: bool,
    pub entered: bool,
    /// One-shot already fired this session.
    pub spent: bool,
    pub action: Option<&'a ZoneAction>,
    pub toggles_follow: Option<&'a str>,
}

impl<'a> SceneSnapshot<'a> {
    pub fn capture(world: &'a WorldState) -> Self {
        let config = world.config();
        let followers = world
            .followers()
            .iter()
            .map(|f| FollowerView {
                id: f.id(),
                pose: f.pose(),
                state: f.state(),
                published: f.published_position(),
            })
            .collect();
        let zones = world
            .proximity()
            .iter()
            .map(|(zone, anchor, status, spent)| ZoneView {
                id: &zone.id,
                anchor,
                radius: zone.radius,
                near: status.near,
                entered: status.entered,
                spent,
                action: zone.on_interact.as_ref(),
                toggles_follow: zone.toggles_follow.as_deref(),
            })
            .collect();

        Self {
            tick: world.tick_count(),
            elapsed_secs: world.elapsed_secs(),
            player: world.player(),
            followers,
            scatter: world.scatter(),
            cycle: world.cycle(),
            sky: world.sky(),
            camera: world.camera().pose(),
            zones,
            hint_visible: world.hint_visible(),
            controls_visible: world.controls_visible(),
            birds: world.flock().poses(),
            fireflies: world.fireflies(),
            landmarks: &config.landmarks,
            ambient_volume: ambient_volume(world.cycle(), &config.audio),
        }
    }

    pub fn zone(&self, id: &str) -> Option<&ZoneView<'a>> {
        self.zones.iter().find(|z| z.id == id)
    }

    pub fn follower(&self, id: &str) -> Option<&FollowerView<'a>> {
        self.followers.iter().find(|f| f.id == id)
    }

    /// Whether the player is inside zone `id`. Unknown zones are never near.
    pub fn is_near(&self, id: &str) -> bool {
        self.zone(id).is_some_and(|z| z.near)
    }
}
