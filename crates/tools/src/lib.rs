//! Developer tooling: scene inspector and follower diagnostics.
//!
//! # Invariants
//! - Tools only read scene state.

mod inspector;

pub use inspector::{FollowerInfo, SceneInspector, SceneSummary};

pub fn crate_info() -> &'static str {
    "glade-tools v0.1.0"
}
