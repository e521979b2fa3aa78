use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// A disk on the ground plane that procedural placement must avoid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExclusionZone {
    pub center: Vec2,
    pub radius: f32,
}

impl ExclusionZone {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    /// True when `point` lies strictly inside the disk. The rim is allowed.
    pub fn excludes(&self, point: Vec2) -> bool {
        point.distance(self.center) < self.radius
    }
}

/// Inclusive `[min, max]` range sampled uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleRange {
    pub min: f32,
    pub max: f32,
}

impl ScaleRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }

    pub fn contains(&self, v: f32) -> bool {
        v >= self.min && v <= self.max
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        rng.gen_range(self.min..=self.max)
    }
}

/// Wind sway for a placed entity.
///
/// The renderer evaluates `angle_at` against elapsed scene time; nothing here
/// changes after placement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Sway {
    pub speed: f32,
    pub amount: f32,
    pub phase: f32,
}

impl Sway {
    /// Roll angle (about Z) at `seconds` of scene time.
    pub fn angle_at(&self, seconds: f32) -> f32 {
        (seconds * self.speed + self.phase).sin() * self.amount
    }
}

/// A decorative entity placed once at world creation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScatterEntity {
    pub position: Vec3,
    pub scale: f32,
    pub sway: Sway,
}

/// Scatter ran out of attempts before placing everything that was asked for.
///
/// Not fatal: `partial` holds every entity that was accepted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("placed {placed} of {requested} entities after {attempts} attempts", placed = .partial.len())]
pub struct PlacementExhausted {
    pub partial: Vec<ScatterEntity>,
    pub requested: usize,
    pub attempts: usize,
}

impl PlacementExhausted {
    /// How many entities are missing.
    pub fn shortfall(&self) -> usize {
        self.requested.saturating_sub(self.partial.len())
    }
}

/// Rejection sampler over a square region with circular holes.
///
/// Zones are few and simple, so a straight reject-and-redraw loop gives
/// uniform coverage of the free area without any spatial index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scatterer {
    /// Attempts allowed per requested entity before giving up.
    pub attempt_factor: usize,
    pub sway_speed: ScaleRange,
    pub sway_amount: ScaleRange,
}

impl Default for Scatterer {
    fn default() -> Self {
        Self {
            attempt_factor: 50,
            sway_speed: ScaleRange::new(0.3, 0.8),
            sway_amount: ScaleRange::new(0.03, 0.06),
        }
    }
}

impl Scatterer {
    /// Place `count` entities in `[-half_extent, half_extent]²`, avoiding `zones`.
    ///
    /// Deterministic for a given random source. Stops after
    /// `attempt_factor * count` candidates and reports the shortfall.
    pub fn scatter<R: Rng + ?Sized>(
        &self,
        count: usize,
        half_extent: f32,
        zones: &[ExclusionZone],
        scale: ScaleRange,
        rng: &mut R,
    ) -> Result<Vec<ScatterEntity>, PlacementExhausted> {
        let budget = count.saturating_mul(self.attempt_factor.max(1));
        let mut placed = Vec::with_capacity(count);
        let mut attempts = 0;

        while placed.len() < count {
            if attempts >= budget {
                return Err(PlacementExhausted {
                    partial: placed,
                    requested: count,
                    attempts,
                });
            }
            attempts += 1;

            let x = rng.gen_range(-half_extent..=half_extent);
            let z = rng.gen_range(-half_extent..=half_extent);
            let candidate = Vec2::new(x, z);
            if zones.iter().any(|zone| zone.excludes(candidate)) {
                continue;
            }

            let entity_scale = scale.sample(rng);
            let sway = Sway {
                speed: self.sway_speed.sample(rng),
                amount: self.sway_amount.sample(rng),
                phase: rng.gen_range(0.0..TAU),
            };
            placed.push(ScatterEntity {
                position: Vec3::new(x, 0.0, z),
                scale: entity_scale,
                sway,
            });
        }

        tracing::debug!(placed = placed.len(), attempts, "scatter complete");
        Ok(placed)
    }
}

/// [`Scatterer::scatter`] with the default attempt budget and sway ranges.
pub fn scatter<R: Rng + ?Sized>(
    count: usize,
    half_extent: f32,
    zones: &[ExclusionZone],
    scale: ScaleRange,
    rng: &mut R,
) -> Result<Vec<ScatterEntity>, PlacementExhausted> {
    Scatterer::default().scatter(count, half_extent, zones, scale, rng)
}
