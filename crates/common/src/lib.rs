//! Shared types for the glade scene: poses and ground-plane math.
//!
//! The scene lives on the XZ plane. Horizontal distances, bearings, and
//! facings all ignore the vertical axis; a `Vec2` in this workspace always
//! means `(x, z)`.

pub mod types;

pub use types::{DegenerateVector, Pose, planar, planar_direction, planar_distance, yaw_toward};
