use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::f32::consts::PI;

use crate::audio::AudioConfig;
use crate::camera::CameraConfig;
use crate::cycle::SkyConfig;
use crate::error::{SceneError, SceneResult};
use crate::fauna::FaunaConfig;
use crate::follow::{FollowController, FollowerConfig, Pursuit};
use crate::proximity::{InteractionZone, ZoneAction};
use crate::scatter::{ExclusionZone, ScaleRange, Scatterer};

const CAVE: Vec3 = Vec3::new(6.0, 0.0, -6.0);
const POND: Vec3 = Vec3::new(-6.0, 0.0, -4.0);
const NPC_HOME: Vec3 = Vec3::new(6.0, 0.0, -3.8);
const PRESENT: Vec3 = Vec3::new(7.2, 0.4, -3.3);
const SLIDE: Vec3 = Vec3::new(-6.0, 0.0, -8.0);

/// Full description of a scene. Every section falls back to its default,
/// so a config file only needs the parts it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Host frame rate the tick is driven at; converts second-based timings to ticks.
    pub ticks_per_second: f32,
    pub player: PlayerConfig,
    pub cycle: CycleConfig,
    pub sky: SkyConfig,
    pub camera: CameraConfig,
    pub scatter: ScatterConfig,
    pub exclusion_zones: Vec<ExclusionZone>,
    /// Leaders must come before the followers trailing them.
    pub followers: Vec<FollowerConfig>,
    /// Earlier zones win when several are near at once.
    pub zones: Vec<InteractionZone>,
    pub hint_timeout_secs: f32,
    pub fauna: FaunaConfig,
    pub audio: AudioConfig,
    pub landmarks: Vec<Landmark>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub start: Vec3,
    pub facing: f32,
    /// Distance covered by one movement action.
    pub stride: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            start: Vec3::ZERO,
            facing: PI,
            stride: 0.4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleConfig {
    pub step: f32,
    pub start_mix: f32,
    pub start_night: bool,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            step: 0.01,
            start_mix: 0.0,
            start_night: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterConfig {
    pub count: usize,
    pub half_extent: f32,
    pub scale: ScaleRange,
    pub sampler: Scatterer,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            count: 200,
            half_extent: 50.0,
            scale: ScaleRange::new(0.7, 1.4),
            sampler: Scatterer::default(),
        }
    }
}

/// A named static prop the renderer places by asset name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub name: String,
    pub position: Vec3,
}

impl Landmark {
    pub fn new(name: impl Into<String>, position: Vec3) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }
}

fn ground(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: 60.0,
            player: PlayerConfig::default(),
            cycle: CycleConfig::default(),
            sky: SkyConfig::default(),
            camera: CameraConfig::default(),
            scatter: ScatterConfig::default(),
            exclusion_zones: vec![
                ExclusionZone::new(ground(CAVE), 6.0),
                ExclusionZone::new(ground(POND), 5.0),
                ExclusionZone::new(ground(NPC_HOME), 4.0),
                ExclusionZone::new(ground(PRESENT), 3.0),
                ExclusionZone::new(ground(SLIDE), 7.0),
            ],
            followers: vec![
                FollowerConfig {
                    id: "tuzulotl".into(),
                    start: NPC_HOME,
                    pursuit: Pursuit::Player,
                    arrival_threshold: 1.2,
                    speed: 0.05,
                    publish_interval: 20,
                    follow_enabled: false,
                },
                FollowerConfig {
                    id: "sprout".into(),
                    start: Vec3::new(7.5, 0.0, -5.0),
                    pursuit: Pursuit::Trail {
                        leader: "tuzulotl".into(),
                        distance: 1.0,
                    },
                    arrival_threshold: 0.5,
                    speed: 0.045,
                    publish_interval: 20,
                    follow_enabled: true,
                },
            ],
            zones: vec![
                InteractionZone::new("tuzulotl", ground(NPC_HOME), 2.2)
                    .attached_to("tuzulotl")
                    .on_interact(ZoneAction::OneShot {
                        label: "gift".into(),
                        link: Some("https://example.com/photos".into()),
                    })
                    .toggles_follow("tuzulotl"),
                InteractionZone::new("pond", ground(POND), 2.8).on_interact(ZoneAction::OpenLink {
                    url: "https://example.com/letter".into(),
                }),
            ],
            hint_timeout_secs: 5.0,
            fauna: FaunaConfig::default(),
            audio: AudioConfig::default(),
            landmarks: vec![
                Landmark::new("cave", CAVE),
                Landmark::new("pond", POND),
                Landmark::new("present", PRESENT),
                Landmark::new("slide", SLIDE),
            ],
        }
    }
}

impl SceneConfig {
    /// Ticks the movement hint stays up when nothing dismisses it early.
    pub fn hint_timeout_ticks(&self) -> u32 {
        (self.hint_timeout_secs * self.ticks_per_second).round().max(0.0) as u32
    }

    /// Check every invariant a `WorldState` relies on.
    pub fn validate(&self) -> SceneResult<()> {
        ensure(
            self.ticks_per_second.is_finite() && self.ticks_per_second > 0.0,
            "ticks_per_second must be positive",
        )?;
        ensure(
            self.hint_timeout_secs.is_finite() && self.hint_timeout_secs >= 0.0,
            "hint_timeout_secs must be non-negative",
        )?;
        ensure(
            self.player.stride.is_finite() && self.player.stride >= 0.0,
            "player stride must be non-negative",
        )?;
        ensure(
            self.cycle.step.is_finite() && self.cycle.step > 0.0 && self.cycle.step <= 1.0,
            "cycle step must be in (0, 1]",
        )?;
        ensure(
            self.camera.smoothing.is_finite()
                && self.camera.smoothing > 0.0
                && self.camera.smoothing <= 1.0,
            "camera smoothing must be in (0, 1]",
        )?;

        let scatter = &self.scatter;
        ensure(
            scatter.half_extent.is_finite() && scatter.half_extent >= 0.0,
            "scatter half_extent must be non-negative",
        )?;
        ensure(scatter.scale.is_valid(), "scatter scale range is inverted")?;
        ensure(
            scatter.sampler.attempt_factor >= 1,
            "scatter attempt_factor must be at least 1",
        )?;
        ensure(
            scatter.sampler.sway_speed.is_valid() && scatter.sampler.sway_amount.is_valid(),
            "scatter sway ranges are inverted",
        )?;
        ensure(
            self.exclusion_zones
                .iter()
                .all(|z| z.radius.is_finite() && z.radius >= 0.0),
            "exclusion zone radius must be non-negative",
        )?;

        ensure(self.fauna.orbit_speed.is_valid(), "fauna orbit_speed range is inverted")?;
        let fauna = &self.fauna;
        ensure(
            [
                fauna.orbit_radius,
                fauna.altitude,
                fauna.bob,
                fauna.flap_rate,
                fauna.flap_pitch,
                fauna.bird_scale,
            ]
            .iter()
            .all(|v| v.is_finite()),
            "fauna flock parameters must be finite",
        )?;
        ensure(
            fauna.firefly_center.is_finite()
                && fauna.firefly_spread.is_finite()
                && fauna.firefly_spread >= 0.0
                && fauna.firefly_height.is_finite()
                && fauna.firefly_height >= 0.0,
            "firefly swarm extents must be finite and non-negative",
        )?;

        FollowController::new(&self.followers, self.player.start)?;

        let mut zone_ids = BTreeSet::new();
        for zone in &self.zones {
            if !zone_ids.insert(zone.id.as_str()) {
                return Err(SceneError::InvalidConfig(format!(
                    "zone `{}` is declared more than once",
                    zone.id
                )));
            }
            ensure(
                zone.radius.is_finite() && zone.radius > 0.0,
                "interaction zone radius must be positive",
            )?;
            for follower in [&zone.attached_to, &zone.toggles_follow].into_iter().flatten() {
                if !self.followers.iter().any(|f| &f.id == follower) {
                    return Err(SceneError::UnknownFollower {
                        referrer: zone.id.clone(),
                        follower: follower.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn ensure(ok: bool, msg: &str) -> SceneResult<()> {
    if ok {
        Ok(())
    } else {
        Err(SceneError::InvalidConfig(msg.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        SceneConfig::default().validate().unwrap();
    }

    #[test]
    fn hint_timeout_in_ticks() {
        let cfg = SceneConfig::default();
        assert_eq!(cfg.hint_timeout_ticks(), 300);
    }

    #[test]
    fn default_zones_keep_landmarks_clear() {
        let cfg = SceneConfig::default();
        for landmark in &cfg.landmarks {
            let p = ground(landmark.position);
            assert!(
                cfg.exclusion_zones.iter().any(|z| z.excludes(p)),
                "{} is not protected from scatter",
                landmark.name
            );
        }
    }

    #[test]
    fn rejects_inverted_scale() {
        let mut cfg = SceneConfig::default();
        cfg.scatter.scale = ScaleRange::new(2.0, 1.0);
        assert!(matches!(cfg.validate(), Err(SceneError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_zone_pointing_at_missing_follower() {
        let mut cfg = SceneConfig::default();
        cfg.zones.push(InteractionZone::new("swing", Vec2::ZERO, 1.0).toggles_follow("ghost"));
        assert_eq!(
            cfg.validate(),
            Err(SceneError::UnknownFollower {
                referrer: "swing".into(),
                follower: "ghost".into(),
            })
        );
    }

    #[test]
    fn rejects_duplicate_zone() {
        let mut cfg = SceneConfig::default();
        cfg.zones.push(InteractionZone::new("pond", Vec2::ZERO, 1.0));
        assert!(matches!(cfg.validate(), Err(SceneError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_trailer_before_leader() {
        let mut cfg = SceneConfig::default();
        cfg.followers.reverse();
        assert!(matches!(cfg.validate(), Err(SceneError::LeaderOrder { .. })));
    }

    #[test]
    fn rejects_unbounded_firefly_swarm() {
        let mut cfg = SceneConfig::default();
        cfg.fauna.firefly_spread = f32::INFINITY;
        assert!(matches!(cfg.validate(), Err(SceneError::InvalidConfig(_))));

        let mut cfg = SceneConfig::default();
        cfg.fauna.firefly_height = f32::NAN;
        assert!(matches!(cfg.validate(), Err(SceneError::InvalidConfig(_))));

        let mut cfg = SceneConfig::default();
        cfg.fauna.orbit_radius = f32::NEG_INFINITY;
        assert!(matches!(cfg.validate(), Err(SceneError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_zero_cycle_step() {
        let mut cfg = SceneConfig::default();
        cfg.cycle.step = 0.0;
        assert!(cfg.validate().is_err());
    }
}
