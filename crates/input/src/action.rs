use glam::Vec3;
use std::f32::consts::{FRAC_PI_2, PI};

/// A cardinal movement direction on the ground plane. North is -Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    West,
    East,
}

impl Direction {
    /// Unit displacement for one step in this direction.
    pub fn delta(self) -> Vec3 {
        match self {
            Self::North => Vec3::NEG_Z,
            Self::South => Vec3::Z,
            Self::West => Vec3::NEG_X,
            Self::East => Vec3::X,
        }
    }

    /// Facing the player model snaps to when stepping this way.
    ///
    /// The player mesh rests looking down +X, so these are offset a quarter
    /// turn from the bearing convention used for followers.
    pub fn facing(self) -> f32 {
        match self {
            Self::North => FRAC_PI_2,
            Self::South => -FRAC_PI_2,
            Self::West => PI,
            Self::East => 0.0,
        }
    }
}

/// A discrete simulation action produced by one key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Step the player one unit of the configured stride.
    Move(Direction),
    /// Flip the day/night target. The cycle ramps toward it over many ticks.
    ToggleNight,
    /// Show or hide the controls panel.
    ToggleControls,
    /// Context-sensitive interaction with whichever zone is near.
    Interact,
    /// Toggle follow on the companion bound to the near zone.
    ToggleFollow,
    /// Bound but intentionally inert.
    Noop,
}
