//! Ambient creatures. All randomness is drawn at spawn; ticking is pure.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::scatter::ScaleRange;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaunaConfig {
    pub bird_count: usize,
    pub orbit_radius: f32,
    pub altitude: f32,
    /// Vertical bob amplitude over the orbit.
    pub bob: f32,
    /// Radians of orbit per tick.
    pub orbit_speed: ScaleRange,
    /// Radians of flap phase per tick.
    pub flap_rate: f32,
    pub flap_pitch: f32,
    pub bird_scale: f32,
    pub firefly_count: usize,
    pub firefly_center: Vec3,
    /// Full width of the swarm box on X and Z.
    pub firefly_spread: f32,
    pub firefly_height: f32,
}

impl Default for FaunaConfig {
    fn default() -> Self {
        Self {
            bird_count: 6,
            orbit_radius: 10.0,
            altitude: 5.0,
            bob: 0.3,
            orbit_speed: ScaleRange::new(0.002, 0.004),
            flap_rate: 0.25,
            flap_pitch: 0.35,
            bird_scale: 1.5,
            firefly_count: 25,
            firefly_center: Vec3::new(6.0, 0.0, -6.0),
            firefly_spread: 4.0,
            firefly_height: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Bird {
    angle: f32,
    speed: f32,
    flap: f32,
}

/// Where a bird is and how its body is squashed this tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BirdPose {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub scale: Vec3,
}

/// Birds circling the clearing.
#[derive(Debug, Clone)]
pub struct Flock {
    birds: Vec<Bird>,
    orbit_radius: f32,
    altitude: f32,
    bob: f32,
    flap_rate: f32,
    flap_pitch: f32,
    bird_scale: f32,
}

impl Flock {
    pub fn spawn<R: Rng + ?Sized>(cfg: &FaunaConfig, rng: &mut R) -> Self {
        let birds = (0..cfg.bird_count)
            .map(|_| Bird {
                angle: rng.gen_range(0.0..TAU),
                speed: rng.gen_range(cfg.orbit_speed.min..=cfg.orbit_speed.max),
                flap: rng.gen_range(0.0..TAU),
            })
            .collect();
        Self {
            birds,
            orbit_radius: cfg.orbit_radius,
            altitude: cfg.altitude,
            bob: cfg.bob,
            flap_rate: cfg.flap_rate,
            flap_pitch: cfg.flap_pitch,
            bird_scale: cfg.bird_scale,
        }
    }

    pub fn tick(&mut self) {
        for bird in &mut self.birds {
            bird.angle = (bird.angle + bird.speed) % TAU;
            bird.flap = (bird.flap + self.flap_rate) % TAU;
        }
    }

    pub fn len(&self) -> usize {
        self.birds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.birds.is_empty()
    }

    pub fn poses(&self) -> Vec<BirdPose> {
        self.birds.iter().map(|b| self.pose_of(b)).collect()
    }

    fn pose_of(&self, bird: &Bird) -> BirdPose {
        let flap = bird.flap.sin();
        let s = self.bird_scale;
        BirdPose {
            position: Vec3::new(
                bird.angle.cos() * self.orbit_radius,
                self.altitude + (bird.angle * 2.0).sin() * self.bob,
                bird.angle.sin() * self.orbit_radius,
            ),
            yaw: -bird.angle,
            pitch: flap * self.flap_pitch,
            scale: Vec3::new(s, s + flap * 0.25, s - flap * 0.1),
        }
    }
}

/// Firefly positions in a box around the swarm center, drawn once.
pub fn spawn_fireflies<R: Rng + ?Sized>(cfg: &FaunaConfig, rng: &mut R) -> Vec<Vec3> {
    let half = cfg.firefly_spread * 0.5;
    (0..cfg.firefly_count)
        .map(|_| {
            let offset = Vec3::new(
                rng.gen_range(-half..=half),
                rng.gen_range(0.0..=cfg.firefly_height),
                rng.gen_range(-half..=half),
            );
            cfg.firefly_center + offset
        })
        .collect()
}
