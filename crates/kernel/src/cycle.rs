//! Day/night progression.
//!
//! `CycleState::mix` is a linear ramp between day (0) and night (1). The
//! toggle only flips the target; the integrator walks `mix` toward it one
//! fixed step per tick, so lighting never jumps.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Bounded day/night scalar plus the direction it is heading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CycleState {
    mix: f32,
    target_night: bool,
}

impl CycleState {
    /// Build a state, clamping `mix` into `[0, 1]`.
    pub fn new(mix: f32, target_night: bool) -> Self {
        let mix = if mix.is_nan() { 0.0 } else { mix.clamp(0.0, 1.0) };
        Self { mix, target_night }
    }

    /// Full daylight, staying day.
    pub fn day() -> Self {
        Self::new(0.0, false)
    }

    pub fn mix(&self) -> f32 {
        self.mix
    }

    pub fn target_night(&self) -> bool {
        self.target_night
    }

    /// Same mix, opposite target.
    pub fn toggled(self) -> Self {
        Self {
            target_night: !self.target_night,
            ..self
        }
    }

    pub fn with_target(self, night: bool) -> Self {
        Self {
            target_night: night,
            ..self
        }
    }
}

impl Default for CycleState {
    fn default() -> Self {
        Self::day()
    }
}

/// Advances a [`CycleState`] by a fixed per-tick step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleIntegrator {
    step: f32,
}

impl CycleIntegrator {
    pub fn new(step: f32) -> Self {
        Self { step: step.abs() }
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    /// Move `mix` toward the target by `step * dt_ticks`, clamped to `[0, 1]`.
    ///
    /// Values within a thousandth of a step of either bound snap onto it, so a
    /// full ramp lands on exactly 0.0 or 1.0 despite f32 accumulation.
    pub fn tick(&self, state: CycleState, dt_ticks: u32) -> CycleState {
        let delta = self.step * dt_ticks as f32;
        let raw = if state.target_night {
            state.mix + delta
        } else {
            state.mix - delta
        };
        let snap = self.step * 1e-3;
        let mix = if raw >= 1.0 - snap {
            1.0
        } else if raw <= snap {
            0.0
        } else {
            raw
        };
        CycleState { mix, ..state }
    }
}

impl Default for CycleIntegrator {
    fn default() -> Self {
        Self::new(0.01)
    }
}

/// Constant parameters for everything derived from `mix`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyConfig {
    pub day_color: Vec3,
    pub night_color: Vec3,
    pub fog_near: f32,
    pub fog_far: f32,
    pub ambient_base: f32,
    pub ambient_falloff: f32,
    pub directional_base: f32,
    pub directional_falloff: f32,
    pub lantern_base: f32,
    pub celestial_radius: f32,
    /// Below this height the sun/moon is hidden.
    pub horizon_cutoff: f32,
    /// Below this height the body uses the moon palette.
    pub moon_below: f32,
    pub sun_tint: Vec3,
    pub sun_glow: Vec3,
    pub moon_tint: Vec3,
    pub moon_glow: Vec3,
    pub firefly_threshold: f32,
    pub firefly_gain: f32,
}

impl Default for SkyConfig {
    fn default() -> Self {
        Self {
            day_color: rgb(0x9fd3ff),
            night_color: rgb(0x0b1026),
            fog_near: 25.0,
            fog_far: 80.0,
            ambient_base: 0.8,
            ambient_falloff: 0.5,
            directional_base: 1.0,
            directional_falloff: 0.6,
            lantern_base: 0.6,
            celestial_radius: 25.0,
            horizon_cutoff: -1.0,
            moon_below: 3.0,
            sun_tint: rgb(0xffd84d),
            sun_glow: rgb(0xfff2a8),
            moon_tint: rgb(0xdbe2ff),
            moon_glow: rgb(0xcfd9ff),
            firefly_threshold: 0.35,
            firefly_gain: 1.2,
        }
    }
}

/// `0xRRGGBB` to a linear 0..1 triple.
pub fn rgb(hex: u32) -> Vec3 {
    let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
    Vec3::new(channel(16), channel(8), channel(0))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CelestialBody {
    Sun,
    Moon,
}

/// The sun/moon disc riding a fixed circle as `mix` goes from 0 to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Celestial {
    pub position: Vec3,
    pub visible: bool,
    pub body: CelestialBody,
    pub tint: Vec3,
    pub glow: Vec3,
}

/// Everything the renderer needs from the cycle, recomputed every tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SkyParams {
    /// Fog and clear color share one value.
    pub fog_color: Vec3,
    pub fog_near: f32,
    pub fog_far: f32,
    pub ambient_intensity: f32,
    pub directional_intensity: f32,
    /// Warm point light at the cave mouth; brightens as night falls.
    pub lantern_intensity: f32,
    pub celestial: Celestial,
    pub fireflies_active: bool,
    pub firefly_intensity: f32,
    /// The "fireflies near the cave" banner needs both a night target and enough dark.
    pub firefly_banner: bool,
}

impl SkyParams {
    pub fn derive(state: CycleState, cfg: &SkyConfig) -> Self {
        let mix = state.mix();
        let celestial = celestial_at(mix, cfg);
        let fireflies_active = mix > cfg.firefly_threshold;

        Self {
            fog_color: cfg.day_color.lerp(cfg.night_color, mix),
            fog_near: cfg.fog_near,
            fog_far: cfg.fog_far,
            ambient_intensity: cfg.ambient_base - mix * cfg.ambient_falloff,
            directional_intensity: cfg.directional_base - mix * cfg.directional_falloff,
            lantern_intensity: cfg.lantern_base + mix,
            celestial,
            fireflies_active,
            firefly_intensity: mix * cfg.firefly_gain,
            firefly_banner: state.target_night() && fireflies_active,
        }
    }
}

fn celestial_at(mix: f32, cfg: &SkyConfig) -> Celestial {
    let angle = mix * TAU;
    let y = angle.sin() * cfg.celestial_radius;
    let z = angle.cos() * cfg.celestial_radius;
    let body = if y < cfg.moon_below {
        CelestialBody::Moon
    } else {
        CelestialBody::Sun
    };
    let (tint, glow) = match body {
        CelestialBody::Sun => (cfg.sun_tint, cfg.sun_glow),
        CelestialBody::Moon => (cfg.moon_tint, cfg.moon_glow),
    };
    Celestial {
        position: Vec3::new(0.0, y, z),
        visible: y >= cfg.horizon_cutoff,
        body,
        tint,
        glow,
    }
}
