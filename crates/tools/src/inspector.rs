use glade_common::{planar, planar_distance, yaw_toward};
use glade_kernel::{FollowState, WorldState};
use glam::Vec3;

/// Read-only queries against a running scene for debugging and dev UI.
pub struct SceneInspector;

impl SceneInspector {
    pub fn summary(world: &WorldState) -> SceneSummary {
        let proximity = world.proximity();
        SceneSummary {
            tick: world.tick_count(),
            elapsed_secs: world.elapsed_secs(),
            trees: world.scatter().len(),
            scatter_shortfall: world.scatter_shortfall(),
            followers: world.followers().len(),
            pursuing: world
                .followers()
                .iter()
                .filter(|f| f.state() == FollowState::Pursuing)
                .count(),
            zones_near: proximity.iter().filter(|(_, _, s, _)| s.near).count(),
            spent_one_shots: proximity.iter().filter(|(_, _, _, spent)| *spent).count(),
            mix: world.cycle().mix(),
            target_night: world.cycle().target_night(),
            pending_events: world.events().len(),
        }
    }

    /// Diagnostics for one follower, or `None` for an unknown id.
    pub fn inspect_follower(world: &WorldState, id: &str) -> Option<FollowerInfo> {
        let player = world.player().position;
        world.followers().get(id).map(|f| {
            let live = f.live_position();
            FollowerInfo {
                id: f.id().to_string(),
                state: f.state(),
                position: live,
                published: f.published_position(),
                publish_lag: planar_distance(live, f.published_position()),
                facing: f.facing(),
                bearing_to_player: yaw_toward(planar(player) - planar(live)).ok(),
                distance_to_player: planar_distance(live, player),
            }
        })
    }

    /// Follower ids in tick order.
    pub fn list_followers(world: &WorldState) -> Vec<String> {
        world.followers().iter().map(|f| f.id().to_string()).collect()
    }
}

/// Summary of scene state for the inspector.
#[derive(Debug, Clone)]
pub struct SceneSummary {
    pub tick: u64,
    pub elapsed_secs: f32,
    pub trees: usize,
    pub scatter_shortfall: usize,
    pub followers: usize,
    pub pursuing: usize,
    pub zones_near: usize,
    pub spent_one_shots: usize,
    pub mix: f32,
    pub target_night: bool,
    pub pending_events: usize,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: tick={} t={:.2}s trees={} shortfall={} followers={}/{} near={} spent={} mix={:.2}{} pending_events={}",
            self.tick,
            self.elapsed_secs,
            self.trees,
            self.scatter_shortfall,
            self.pursuing,
            self.followers,
            self.zones_near,
            self.spent_one_shots,
            self.mix,
            if self.target_night { " (to night)" } else { "" },
            self.pending_events
        )
    }
}

/// Detailed info about a single follower.
#[derive(Debug, Clone)]
pub struct FollowerInfo {
    pub id: String,
    pub state: FollowState,
    pub position: Vec3,
    pub published: Vec3,
    /// Ground distance between live and published position.
    pub publish_lag: f32,
    pub facing: f32,
    /// `None` when standing on the player.
    pub bearing_to_player: Option<f32>,
    pub distance_to_player: f32,
}

impl std::fmt::Display for FollowerInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Follower [{}] {:?} pos=({:.2}, {:.2}, {:.2}) lag={:.2} facing={:.2} to_player={:.2}",
            self.id,
            self.state,
            self.position.x,
            self.position.y,
            self.position.z,
            self.publish_lag,
            self.facing,
            self.distance_to_player,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glade_input::{Action, Direction};
    use glade_kernel::SceneConfig;

    fn world() -> WorldState {
        WorldState::with_seed(&SceneConfig::default(), 3).unwrap()
    }

    #[test]
    fn summary_fresh_scene() {
        let w = world();
        let summary = SceneInspector::summary(&w);
        assert_eq!(summary.tick, 0);
        assert_eq!(summary.trees, 200);
        assert_eq!(summary.followers, 2);
        assert_eq!(summary.pursuing, 1);
        assert_eq!(summary.zones_near, 0);
        assert_eq!(summary.pending_events, 1); // session start
    }

    #[test]
    fn summary_tracks_night_and_ticks() {
        let mut w = world();
        w.tick(&[Action::ToggleNight]);
        for _ in 0..9 {
            w.tick(&[]);
        }
        let summary = SceneInspector::summary(&w);
        assert_eq!(summary.tick, 10);
        assert!(summary.target_night);
        assert!((summary.mix - 0.1).abs() < 1e-5);
    }

    #[test]
    fn inspect_follower_found() {
        let w = world();
        let info = SceneInspector::inspect_follower(&w, "tuzulotl").unwrap();
        assert_eq!(info.state, FollowState::Idle);
        assert_eq!(info.position, Vec3::new(6.0, 0.0, -3.8));
        assert_eq!(info.publish_lag, 0.0);
        assert!(info.bearing_to_player.is_some());
    }

    #[test]
    fn inspect_follower_not_found() {
        let w = world();
        assert!(SceneInspector::inspect_follower(&w, "nobody").is_none());
    }

    #[test]
    fn publish_lag_shows_while_moving() {
        let mut w = world();
        for _ in 0..5 {
            w.tick(&[Action::Move(Direction::South)]);
        }
        // The trailing follower moves every tick but publishes every 20.
        let info = SceneInspector::inspect_follower(&w, "sprout").unwrap();
        assert_eq!(info.state, FollowState::Pursuing);
        assert!(info.publish_lag > 0.0);
    }

    #[test]
    fn list_followers_in_order() {
        let w = world();
        assert_eq!(SceneInspector::list_followers(&w), vec!["tuzulotl", "sprout"]);
    }

    #[test]
    fn summary_display() {
        let w = world();
        let s = format!("{}", SceneInspector::summary(&w));
        assert!(s.contains("tick=0"));
        assert!(s.contains("followers=1/2"));
    }
}
