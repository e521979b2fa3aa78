//! Rendering adapter: renderer-agnostic interface over scene snapshots.
//!
//! # Invariants
//! - Renderers read a `SceneSnapshot` and never touch the world.
//! - Overlay prompt selection is a pure function of the snapshot.

mod overlay;
mod renderer;

pub use overlay::{OverlayText, Prompt, PromptSlot, prompts};
pub use renderer::{DebugTextRenderer, RenderView, Renderer};

pub fn crate_info() -> &'static str {
    "glade-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
