use glade_common::{DegenerateVector, Pose, planar};
use glade_input::{Action, Direction};
use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::camera::{CameraTarget, CameraTracker};
use crate::config::SceneConfig;
use crate::cycle::{CycleIntegrator, CycleState, SkyParams};
use crate::error::{SceneError, SceneResult};
use crate::event::SceneEvent;
use crate::fauna::{Flock, spawn_fireflies};
use crate::follow::FollowController;
use crate::proximity::{Dispatch, ProximityTrigger, TransientHint};
use crate::scatter::ScatterEntity;
use crate::snapshot::SceneSnapshot;

/// The authoritative scene.
///
/// Built once from a [`SceneConfig`] and a random source, then advanced with
/// [`WorldState::tick`]. Randomness is only consumed during construction, so
/// two worlds built from the same config and seed stay identical under the
/// same action sequence.
#[derive(Debug, Clone)]
pub struct WorldState {
    config: SceneConfig,
    player: Pose,
    cycle: CycleState,
    integrator: CycleIntegrator,
    sky: SkyParams,
    followers: FollowController,
    camera: CameraTracker,
    proximity: ProximityTrigger,
    hint: TransientHint,
    controls_visible: bool,
    scatter: Vec<ScatterEntity>,
    scatter_shortfall: usize,
    flock: Flock,
    fireflies: Vec<Vec3>,
    tick: u64,
    ended: bool,
    /// Pending events, drained by the host after each tick.
    event_log: Vec<SceneEvent>,
}

impl WorldState {
    /// Validate `config`, scatter the trees and spawn fauna from `rng`.
    pub fn new<R: Rng + ?Sized>(config: &SceneConfig, rng: &mut R) -> SceneResult<Self> {
        let _span = tracing::info_span!("world_init").entered();
        config.validate()?;

        let player = Pose::new(config.player.start, config.player.facing);
        let followers = FollowController::new(&config.followers, player.position)?;

        let scatter_cfg = &config.scatter;
        let (scatter, scatter_shortfall) = match scatter_cfg.sampler.scatter(
            scatter_cfg.count,
            scatter_cfg.half_extent,
            &config.exclusion_zones,
            scatter_cfg.scale,
            rng,
        ) {
            Ok(placed) => (placed, 0),
            Err(exhausted) => {
                tracing::warn!(%exhausted, "scatter placement exhausted, continuing with partial set");
                let shortfall = exhausted.shortfall();
                (exhausted.partial, shortfall)
            }
        };

        let flock = Flock::spawn(&config.fauna, rng);
        let fireflies = spawn_fireflies(&config.fauna, rng);

        let cycle = CycleState::new(config.cycle.start_mix, config.cycle.start_night);
        let sky = SkyParams::derive(cycle, &config.sky);

        tracing::info!(
            trees = scatter.len(),
            followers = followers.len(),
            zones = config.zones.len(),
            birds = flock.len(),
            "scene initialized"
        );

        Ok(Self {
            player,
            cycle,
            integrator: CycleIntegrator::new(config.cycle.step),
            sky,
            followers,
            camera: CameraTracker::new(config.camera),
            proximity: ProximityTrigger::new(config.zones.clone()),
            hint: TransientHint::new(config.hint_timeout_ticks()),
            controls_visible: false,
            scatter,
            scatter_shortfall,
            flock,
            fireflies,
            tick: 0,
            ended: false,
            event_log: vec![SceneEvent::SessionStarted],
            config: config.clone(),
        })
    }

    /// Build with a ChaCha8 stream seeded from `seed`.
    pub fn with_seed(config: &SceneConfig, seed: u64) -> SceneResult<Self> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Self::new(config, &mut rng)
    }

    /// Advance one tick, applying `actions` first.
    ///
    /// Interact and follow-toggle are resolved after proximity so they see
    /// this tick's `near` flags.
    pub fn tick(&mut self, actions: &[Action]) {
        self.tick += 1;
        let _span = tracing::trace_span!("world_tick", tick = self.tick).entered();

        let mut interacts = 0usize;
        let mut follow_toggles = 0usize;
        for action in actions {
            match *action {
                Action::Move(dir) => self.step_player(dir),
                Action::ToggleNight => {
                    self.cycle = self.cycle.toggled();
                    let night = self.cycle.target_night();
                    tracing::debug!(night, "cycle target flipped");
                    self.event_log.push(SceneEvent::NightToggled { night });
                }
                Action::ToggleControls => {
                    self.controls_visible = !self.controls_visible;
                    self.event_log.push(SceneEvent::ControlsToggled {
                        visible: self.controls_visible,
                    });
                }
                Action::Interact => interacts += 1,
                Action::ToggleFollow => follow_toggles += 1,
                Action::Noop => {}
            }
        }

        self.cycle = self.integrator.tick(self.cycle, 1);
        self.sky = SkyParams::derive(self.cycle, &self.config.sky);

        self.followers.tick(self.player.position);

        let anchor = self.camera_anchor();
        if let Err(DegenerateVector) = self.camera.tick(anchor) {
            tracing::trace!("camera on its look-at point, keeping forward");
        }

        let followers = &self.followers;
        self.proximity.update(self.player.position, |id| {
            followers.get(id).map(|f| planar(f.published_position()))
        });
        let entered: Vec<String> = self.proximity.entered().map(String::from).collect();
        for zone in entered {
            tracing::debug!(%zone, "zone entered");
            self.event_log.push(SceneEvent::ZoneEntered { zone });
        }

        if let Some(reason) = self.hint.update(self.proximity.any_near()) {
            tracing::debug!(?reason, "hint dismissed");
            self.event_log.push(SceneEvent::HintDismissed { reason });
        }

        for _ in 0..interacts {
            match self.proximity.interact() {
                Some(dispatch) => self.apply(dispatch),
                None => tracing::trace!("interact with nothing in reach"),
            }
        }
        for _ in 0..follow_toggles {
            match self.proximity.follow_toggle() {
                Some(dispatch) => self.apply(dispatch),
                None => tracing::trace!("follow toggle with nothing in reach"),
            }
        }

        self.flock.tick();
    }

    fn step_player(&mut self, dir: Direction) {
        self.player.position += dir.delta() * self.config.player.stride;
        self.player.facing = dir.facing();
    }

    fn camera_anchor(&self) -> Vec3 {
        match self.camera.target() {
            CameraTarget::Player => self.player.position,
            CameraTarget::Follower(id) => self
                .followers
                .get(id)
                .map_or(self.player.position, |f| f.live_position()),
        }
    }

    fn apply(&mut self, dispatch: Dispatch) {
        match dispatch {
            Dispatch::OneShot { zone, label, link } => {
                tracing::info!(%zone, %label, "one-shot fired");
                self.event_log.push(SceneEvent::OneShotFired { zone, label });
                if let Some(url) = link {
                    self.event_log.push(SceneEvent::LinkRequested { url });
                }
            }
            Dispatch::OpenLink { zone, url } => {
                tracing::debug!(%zone, %url, "link requested");
                self.event_log.push(SceneEvent::LinkRequested { url });
            }
            Dispatch::ToggleFollow { zone, follower } => match self.followers.toggle(&follower) {
                Some(enabled) => {
                    tracing::debug!(%zone, %follower, enabled, "follow toggled");
                    self.event_log
                        .push(SceneEvent::FollowToggled { follower, enabled });
                }
                None => tracing::warn!(%zone, %follower, "zone toggles an unknown follower"),
            },
        }
    }

    /// Point the camera at something else. Follower targets must exist.
    pub fn set_camera_target(&mut self, target: CameraTarget) -> SceneResult<()> {
        if let CameraTarget::Follower(id) = &target {
            if !self.followers.contains(id) {
                return Err(SceneError::UnknownFollower {
                    referrer: "camera".into(),
                    follower: id.clone(),
                });
            }
        }
        self.camera.set_target(target);
        Ok(())
    }

    /// Emit `SessionEnded` once. Returns false if the session had already ended.
    pub fn end_session(&mut self) -> bool {
        if self.ended {
            return false;
        }
        self.ended = true;
        tracing::info!(ticks = self.tick, "session ended");
        self.event_log.push(SceneEvent::SessionEnded);
        true
    }

    /// Borrow the current state for renderers and tooling.
    pub fn snapshot(&self) -> SceneSnapshot<'_> {
        SceneSnapshot::capture(self)
    }

    /// Drain and return pending events.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Read-only access to the pending event log.
    pub fn events(&self) -> &[SceneEvent] {
        &self.event_log
    }

    /// The config this world was built from.
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Current simulation tick.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Simulated time since the session started.
    pub fn elapsed_secs(&self) -> f32 {
        self.tick as f32 / self.config.ticks_per_second
    }

    /// Player pose.
    pub fn player(&self) -> Pose {
        self.player
    }

    /// Day/night progress.
    pub fn cycle(&self) -> CycleState {
        self.cycle
    }

    /// Lighting derived from the cycle this tick.
    pub fn sky(&self) -> SkyParams {
        self.sky
    }

    /// Every follower, in declaration order.
    pub fn followers(&self) -> &FollowController {
        &self.followers
    }

    /// The chase camera.
    pub fn camera(&self) -> &CameraTracker {
        &self.camera
    }

    /// Interaction zones and their latched state.
    pub fn proximity(&self) -> &ProximityTrigger {
        &self.proximity
    }

    /// Trees placed at construction.
    pub fn scatter(&self) -> &[ScatterEntity] {
        &self.scatter
    }

    /// Trees the scatterer could not place. Zero unless placement ran dry.
    pub fn scatter_shortfall(&self) -> usize {
        self.scatter_shortfall
    }

    /// Birds circling the clearing.
    pub fn flock(&self) -> &Flock {
        &self.flock
    }

    /// Firefly positions, fixed at construction.
    pub fn fireflies(&self) -> &[Vec3] {
        &self.fireflies
    }

    /// Whether the movement hint is still up.
    pub fn hint_visible(&self) -> bool {
        self.hint.visible()
    }

    /// Whether the controls panel is shown.
    pub fn controls_visible(&self) -> bool {
        self.controls_visible
    }
}
