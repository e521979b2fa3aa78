//! Companion steering.
//!
//! Each follower is either idle or pursuing. While pursuing it walks a fixed
//! stride per tick toward its target and stops short once inside its arrival
//! threshold. A trailing follower never sees the player's live position
//! directly; it chases a point behind its leader's last published position.

use glade_common::{DegenerateVector, Pose, planar, planar_direction, yaw_toward};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{SceneError, SceneResult};

/// What a follower steers toward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Pursuit {
    /// The player's live position.
    Player,
    /// A point `distance` behind `leader`, on the far side from the player.
    Trail { leader: String, distance: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowerConfig {
    pub id: String,
    pub start: Vec3,
    pub pursuit: Pursuit,
    pub arrival_threshold: f32,
    pub speed: f32,
    /// Ticks between syncs of the published position.
    #[serde(default = "default_publish_interval")]
    pub publish_interval: u32,
    #[serde(default)]
    pub follow_enabled: bool,
}

fn default_publish_interval() -> u32 {
    20
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowState {
    Idle,
    Pursuing,
}

/// Result of one steering step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SteerOutcome {
    /// Follow is off; nothing moved.
    Idle,
    /// Already inside the arrival threshold; only facing changed.
    Arrived,
    Moved,
}

/// A steerable companion entity.
#[derive(Debug, Clone)]
pub struct Follower {
    id: String,
    live: Pose,
    state: FollowState,
    pursuit: Pursuit,
    arrival_threshold: f32,
    speed: f32,
    published: Vec3,
    publish_interval: u32,
    since_publish: u32,
}

impl Follower {
    /// Build from config, initially facing `look_at`.
    pub fn from_config(cfg: &FollowerConfig, look_at: Vec3) -> Self {
        let facing = yaw_toward(planar(look_at) - planar(cfg.start)).unwrap_or(0.0);
        Self {
            id: cfg.id.clone(),
            live: Pose::new(cfg.start, facing),
            state: if cfg.follow_enabled {
                FollowState::Pursuing
            } else {
                FollowState::Idle
            },
            pursuit: cfg.pursuit.clone(),
            arrival_threshold: cfg.arrival_threshold,
            speed: cfg.speed,
            published: cfg.start,
            publish_interval: cfg.publish_interval,
            since_publish: 0,
        }
    }

    /// Follower id, unique within the scene.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Authoritative position, updated every tick.
    pub fn live_position(&self) -> Vec3 {
        self.live.position
    }

    /// Yaw of the live pose.
    pub fn facing(&self) -> f32 {
        self.live.facing
    }

    /// Live pose.
    pub fn pose(&self) -> Pose {
        self.live
    }

    /// Last synced copy of the live position. Observers must tolerate it
    /// lagging by up to one publish interval.
    pub fn published_position(&self) -> Vec3 {
        self.published
    }

    /// What this follower chases.
    pub fn pursuit(&self) -> &Pursuit {
        &self.pursuit
    }

    /// Current follow state.
    pub fn state(&self) -> FollowState {
        self.state
    }

    /// True while pursuing.
    pub fn follow_enabled(&self) -> bool {
        self.state == FollowState::Pursuing
    }

    /// Set the follow flag. Returns true if the state changed.
    pub fn set_follow(&mut self, enabled: bool) -> bool {
        let next = if enabled {
            FollowState::Pursuing
        } else {
            FollowState::Idle
        };
        if next == self.state {
            return false;
        }
        tracing::debug!(follower = %self.id, from = ?self.state, to = ?next, "follow state change");
        self.state = next;
        true
    }

    /// Flip the follow flag and return the new value.
    pub fn toggle_follow(&mut self) -> bool {
        let enabled = !self.follow_enabled();
        self.set_follow(enabled);
        enabled
    }

    /// Where this follower should head, given the player's live position and,
    /// for trailing followers, the leader's published position.
    ///
    /// Returns `None` when a trailing follower has no leader position to work from.
    pub fn pursuit_target(&self, player: Vec3, leader_published: Option<Vec3>) -> Option<Vec3> {
        match &self.pursuit {
            Pursuit::Player => Some(player),
            Pursuit::Trail { distance, .. } => {
                let leader = leader_published?;
                match planar_direction(leader, player) {
                    Ok(toward_player) => {
                        let back = Vec3::new(toward_player.x, 0.0, toward_player.y) * *distance;
                        Some(leader - back)
                    }
                    Err(DegenerateVector) => Some(leader),
                }
            }
        }
    }

    /// One steering step toward `target`.
    ///
    /// A zero displacement yields `DegenerateVector` and leaves the pose untouched.
    pub fn steer(&mut self, target: Vec3) -> Result<SteerOutcome, DegenerateVector> {
        if self.state == FollowState::Idle {
            return Ok(SteerOutcome::Idle);
        }

        let delta = planar(target) - planar(self.live.position);
        let dist = delta.length();
        if dist == 0.0 || !dist.is_finite() {
            return Err(DegenerateVector);
        }

        self.live.facing = yaw_toward(delta)?;
        if dist <= self.arrival_threshold {
            return Ok(SteerOutcome::Arrived);
        }

        let dir = delta / dist;
        let stride = self.speed.min(dist);
        self.live.position += Vec3::new(dir.x, 0.0, dir.y) * stride;
        Ok(SteerOutcome::Moved)
    }

    /// Count one tick toward the next publish. Returns true when it published.
    pub fn advance_publish(&mut self) -> bool {
        self.since_publish += 1;
        if self.since_publish < self.publish_interval {
            return false;
        }
        self.since_publish = 0;
        self.published = self.live.position;
        true
    }
}

/// All followers in a scene, ticked in declaration order.
///
/// Leaders are declared before anyone trailing them, so a leader that
/// publishes this tick is already visible to its trailer this tick.
#[derive(Debug, Clone, Default)]
pub struct FollowController {
    followers: Vec<Follower>,
}

impl FollowController {
    pub fn new(configs: &[FollowerConfig], player_start: Vec3) -> SceneResult<Self> {
        let mut followers: Vec<Follower> = Vec::with_capacity(configs.len());
        for cfg in configs {
            if followers.iter().any(|f| f.id == cfg.id) {
                return Err(SceneError::DuplicateFollower(cfg.id.clone()));
            }
            if !(cfg.arrival_threshold.is_finite() && cfg.arrival_threshold > 0.0) {
                return Err(SceneError::InvalidConfig(format!(
                    "follower `{}` needs a positive arrival threshold",
                    cfg.id
                )));
            }
            if !(cfg.speed.is_finite() && cfg.speed >= 0.0) {
                return Err(SceneError::InvalidConfig(format!(
                    "follower `{}` needs a non-negative speed",
                    cfg.id
                )));
            }
            if let Pursuit::Trail { leader, distance } = &cfg.pursuit {
                if !followers.iter().any(|f| &f.id == leader) {
                    return Err(SceneError::LeaderOrder {
                        follower: cfg.id.clone(),
                        leader: leader.clone(),
                    });
                }
                if !(distance.is_finite() && *distance >= 0.0) {
                    return Err(SceneError::InvalidConfig(format!(
                        "follower `{}` needs a non-negative trail distance",
                        cfg.id
                    )));
                }
            }
            followers.push(Follower::from_config(cfg, player_start));
        }
        Ok(Self { followers })
    }

    /// Steer and publish every follower once.
    pub fn tick(&mut self, player: Vec3) {
        for i in 0..self.followers.len() {
            let (done, rest) = self.followers.split_at_mut(i);
            let follower = &mut rest[0];

            let leader_published = match &follower.pursuit {
                Pursuit::Player => None,
                Pursuit::Trail { leader, .. } => done
                    .iter()
                    .find(|f| &f.id == leader)
                    .map(Follower::published_position),
            };

            if follower.follow_enabled() {
                match follower.pursuit_target(player, leader_published) {
                    Some(target) => {
                        if let Err(DegenerateVector) = follower.steer(target) {
                            tracing::trace!(follower = %follower.id, "on target, skipping steer");
                        }
                    }
                    None => {
                        tracing::warn!(follower = %follower.id, "no leader position to trail");
                    }
                }
            }

            if follower.advance_publish() {
                tracing::trace!(follower = %follower.id, position = ?follower.published, "published position");
            }
        }
    }

    /// Look up a follower by id.
    pub fn get(&self, id: &str) -> Option<&Follower> {
        self.followers.iter().find(|f| f.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Follower> {
        self.followers.iter_mut().find(|f| f.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Flip follow on `id`. Returns the new flag, or `None` for an unknown id.
    pub fn toggle(&mut self, id: &str) -> Option<bool> {
        self.get_mut(id).map(Follower::toggle_follow)
    }

    /// Followers in tick order.
    pub fn iter(&self) -> impl Iterator<Item = &Follower> {
        self.followers.iter()
    }

    pub fn len(&self) -> usize {
        self.followers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.followers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glade_common::planar_distance;
    use proptest::prelude::*;

    fn companion(start: Vec3, enabled: bool) -> FollowerConfig {
        FollowerConfig {
            id: "companion".into(),
            start,
            pursuit: Pursuit::Player,
            arrival_threshold: 1.2,
            speed: 0.05,
            publish_interval: 20,
            follow_enabled: enabled,
        }
    }

    fn trailer(leader: &str) -> FollowerConfig {
        FollowerConfig {
            id: "trailer".into(),
            start: Vec3::new(0.0, 0.0, 5.0),
            pursuit: Pursuit::Trail {
                leader: leader.into(),
                distance: 1.0,
            },
            arrival_threshold: 0.5,
            speed: 0.045,
            publish_interval: 20,
            follow_enabled: true,
        }
    }

    #[test]
    fn starts_facing_player() {
        let f = Follower::from_config(&companion(Vec3::new(0.0, 0.0, -5.0), false), Vec3::ZERO);
        // Player is at +Z from the follower.
        assert!(f.facing().abs() < 1e-6);
    }

    #[test]
    fn state_transitions() {
        let mut f = Follower::from_config(&companion(Vec3::ZERO, false), Vec3::Z);
        assert_eq!(f.state(), FollowState::Idle);
        assert!(f.set_follow(true));
        assert_eq!(f.state(), FollowState::Pursuing);
        assert!(!f.set_follow(true));
        assert!(!f.toggle_follow());
        assert_eq!(f.state(), FollowState::Idle);
    }

    #[test]
    fn disabled_follower_never_moves() {
        let start = Vec3::new(3.0, 0.0, 3.0);
        let mut f = Follower::from_config(&companion(start, false), Vec3::ZERO);
        for i in 0..200 {
            let target = Vec3::new(i as f32, 0.0, -(i as f32));
            assert_eq!(f.steer(target), Ok(SteerOutcome::Idle));
        }
        assert_eq!(f.live_position(), start);
    }

    #[test]
    fn pursuit_moves_by_speed_and_faces_target() {
        let mut f = Follower::from_config(&companion(Vec3::ZERO, true), Vec3::X);
        let outcome = f.steer(Vec3::new(10.0, 0.0, 0.0)).unwrap();
        assert_eq!(outcome, SteerOutcome::Moved);
        assert!((f.live_position().x - 0.05).abs() < 1e-6);
        assert!((f.facing() - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn pursuit_ignores_target_height() {
        let mut f = Follower::from_config(&companion(Vec3::ZERO, true), Vec3::X);
        f.steer(Vec3::new(10.0, 4.0, 0.0)).unwrap();
        assert_eq!(f.live_position().y, 0.0);
    }

    #[test]
    fn arrival_holds_position_but_turns() {
        let start = Vec3::new(1.0, 0.0, 0.0);
        let mut f = Follower::from_config(&companion(start, true), Vec3::ZERO);
        let outcome = f.steer(Vec3::new(1.0, 0.0, 1.0)).unwrap();
        assert_eq!(outcome, SteerOutcome::Arrived);
        assert_eq!(f.live_position(), start);
        assert!(f.facing().abs() < 1e-6);
    }

    #[test]
    fn zero_displacement_is_degenerate() {
        let start = Vec3::new(2.0, 0.0, 2.0);
        let mut f = Follower::from_config(&companion(start, true), Vec3::ZERO);
        let facing = f.facing();
        assert_eq!(f.steer(start), Err(DegenerateVector));
        assert_eq!(f.live_position(), start);
        assert_eq!(f.facing(), facing);
    }

    #[test]
    fn publishes_on_interval() {
        let mut f = Follower::from_config(&companion(Vec3::ZERO, true), Vec3::X);
        let target = Vec3::new(50.0, 0.0, 0.0);
        for _ in 0..19 {
            f.steer(target).unwrap();
            assert!(!f.advance_publish());
        }
        assert_eq!(f.published_position(), Vec3::ZERO);
        f.steer(target).unwrap();
        assert!(f.advance_publish());
        assert_eq!(f.published_position(), f.live_position());
    }

    #[test]
    fn published_catches_up_after_stopping() {
        let mut controller = FollowController::new(&[companion(Vec3::ZERO, true)], Vec3::ZERO).unwrap();
        let player = Vec3::new(5.0, 0.0, 0.0);
        for _ in 0..300 {
            controller.tick(player);
        }
        // Stopped at the arrival threshold long ago; one interval is enough.
        let f = controller.get("companion").unwrap();
        assert!(planar_distance(f.live_position(), player) <= 1.2 + 1e-4);
        assert_eq!(f.published_position(), f.live_position());
    }

    #[test]
    fn trail_target_sits_behind_leader() {
        let f = Follower::from_config(&trailer("companion"), Vec3::ZERO);
        let leader = Vec3::new(0.0, 0.0, 4.0);
        let player = Vec3::ZERO;
        let target = f.pursuit_target(player, Some(leader)).unwrap();
        assert!((target - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-6);
        // Leader standing on the player: no bearing, aim at the leader.
        assert_eq!(f.pursuit_target(leader, Some(leader)), Some(leader));
        assert_eq!(f.pursuit_target(player, None), None);
    }

    #[test]
    fn trailer_steers_off_stale_leader_position() {
        let leader_start = Vec3::new(0.0, 0.0, 4.0);
        let configs = [companion(leader_start, true), trailer("companion")];
        let mut controller = FollowController::new(&configs, Vec3::ZERO).unwrap();
        let player = Vec3::new(-10.0, 0.0, 4.0);

        // Replays what the trailer should do while the leader has not published yet.
        let mut stale = Follower::from_config(&configs[1], Vec3::ZERO);
        let mut fresh = Follower::from_config(&configs[1], Vec3::ZERO);
        for _ in 0..10 {
            controller.tick(player);
            let leader = controller.get("companion").unwrap();
            let target = stale.pursuit_target(player, Some(leader_start)).unwrap();
            stale.steer(target).unwrap();
            let target = fresh.pursuit_target(player, Some(leader.live_position())).unwrap();
            fresh.steer(target).unwrap();
        }

        let leader = controller.get("companion").unwrap();
        assert_eq!(leader.published_position(), leader_start);
        assert_ne!(leader.live_position(), leader_start);
        let trailer = controller.get("trailer").unwrap();
        assert_eq!(trailer.live_position(), stale.live_position());
        assert_ne!(trailer.live_position(), fresh.live_position());
    }

    #[test]
    fn trailer_sees_leader_publish_in_same_tick() {
        let leader_start = Vec3::new(0.0, 0.0, 4.0);
        let configs = [companion(leader_start, true), trailer("companion")];
        let mut controller = FollowController::new(&configs, Vec3::ZERO).unwrap();
        let player = Vec3::new(-10.0, 0.0, 4.0);

        let mut expected = Follower::from_config(&configs[1], Vec3::ZERO);
        for _ in 0..19 {
            controller.tick(player);
            let target = expected.pursuit_target(player, Some(leader_start)).unwrap();
            expected.steer(target).unwrap();
        }
        let mut lagging = expected.clone();
        assert_eq!(controller.get("companion").unwrap().published_position(), leader_start);

        // Tick 20: the leader publishes before the trailer steers.
        controller.tick(player);
        let leader = controller.get("companion").unwrap();
        assert_ne!(leader.published_position(), leader_start);
        assert_eq!(leader.published_position(), leader.live_position());

        let target = expected.pursuit_target(player, Some(leader.published_position())).unwrap();
        expected.steer(target).unwrap();
        let target = lagging.pursuit_target(player, Some(leader_start)).unwrap();
        lagging.steer(target).unwrap();

        let trailer = controller.get("trailer").unwrap();
        assert_eq!(trailer.live_position(), expected.live_position());
        assert_ne!(trailer.live_position(), lagging.live_position());
    }

    #[test]
    fn rejects_bad_configs() {
        let dup = [companion(Vec3::ZERO, false), companion(Vec3::ONE, false)];
        assert_eq!(
            FollowController::new(&dup, Vec3::ZERO).unwrap_err(),
            SceneError::DuplicateFollower("companion".into())
        );

        let order = [trailer("companion"), companion(Vec3::ZERO, false)];
        assert!(matches!(
            FollowController::new(&order, Vec3::ZERO),
            Err(SceneError::LeaderOrder { .. })
        ));

        let mut bad = companion(Vec3::ZERO, false);
        bad.arrival_threshold = 0.0;
        assert!(matches!(
            FollowController::new(&[bad], Vec3::ZERO),
            Err(SceneError::InvalidConfig(_))
        ));
    }

    #[test]
    fn toggle_by_id() {
        let mut controller = FollowController::new(&[companion(Vec3::ZERO, false)], Vec3::ZERO).unwrap();
        assert_eq!(controller.toggle("companion"), Some(true));
        assert_eq!(controller.toggle("companion"), Some(false));
        assert_eq!(controller.toggle("nobody"), None);
    }

    proptest! {
        #[test]
        fn inside_threshold_never_moves(
            x in -20.0f32..20.0,
            z in -20.0f32..20.0,
            angle in 0.0f32..std::f32::consts::TAU,
            frac in 0.0f32..=1.0,
        ) {
            let start = Vec3::new(x, 0.0, z);
            let mut f = Follower::from_config(&companion(start, true), Vec3::ZERO);
            let r = 1.2 * frac;
            let target = start + Vec3::new(angle.cos() * r, 0.0, angle.sin() * r);
            let _ = f.steer(target);
            if planar_distance(start, target) <= 1.2 {
                prop_assert_eq!(f.live_position(), start);
            }
        }
    }
}
