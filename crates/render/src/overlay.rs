use std::collections::BTreeMap;

use glade_kernel::{FollowState, SceneSnapshot, ZoneAction};

/// Where on screen a prompt belongs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptSlot {
    /// Banner across the top.
    Top,
    /// Caption near the bottom; hint and zone prompts.
    Bottom,
    /// Side panel listing the key bindings.
    Panel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub slot: PromptSlot,
    pub text: String,
}

impl Prompt {
    fn new(slot: PromptSlot, text: impl Into<String>) -> Self {
        Self {
            slot,
            text: text.into(),
        }
    }
}

/// Copy for every overlay line. Zone prompts are keyed by zone id.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayText {
    pub hint: String,
    pub firefly_banner: String,
    pub controls: Vec<String>,
    pub zone_prompts: BTreeMap<String, String>,
    pub follow_start: String,
    pub follow_stop: String,
}

impl Default for OverlayText {
    fn default() -> Self {
        let zone_prompts = [
            (
                "tuzulotl",
                "It is me Tuzulotl, and this is my smol cave.\nI hab something for u. Press E to open",
            ),
            ("pond", "The pond is hiding a surprise. Press E to read"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            hint: "Use W A S D to move\nPress N for day / night".into(),
            firefly_banner: "Waoooo fireflies near cave".into(),
            controls: vec![
                "W A S D  move".into(),
                "N  day / night".into(),
                "E  interact".into(),
                "F  walk together".into(),
                "H  hide controls".into(),
            ],
            zone_prompts,
            follow_start: "Press F to walk together".into(),
            follow_stop: "Press F to say goodbye".into(),
        }
    }
}

/// Pick the overlay lines for one frame.
///
/// The movement hint suppresses every zone prompt while it is up. A spent
/// one-shot zone drops its interact prompt but keeps its follow prompt.
pub fn prompts(scene: &SceneSnapshot<'_>, text: &OverlayText) -> Vec<Prompt> {
    let mut out = Vec::new();

    if scene.sky.firefly_banner {
        out.push(Prompt::new(PromptSlot::Top, &text.firefly_banner));
    }

    if scene.hint_visible {
        out.push(Prompt::new(PromptSlot::Bottom, &text.hint));
    } else {
        for zone in scene.zones.iter().filter(|z| z.near) {
            let spent_one_shot = zone.spent && matches!(zone.action, Some(ZoneAction::OneShot { .. }));
            if !spent_one_shot {
                if let Some(line) = text.zone_prompts.get(zone.id) {
                    out.push(Prompt::new(PromptSlot::Bottom, line));
                }
            }
            let follower = zone.toggles_follow.and_then(|id| scene.follower(id));
            if let Some(follower) = follower {
                let line = match follower.state {
                    FollowState::Idle => &text.follow_start,
                    FollowState::Pursuing => &text.follow_stop,
                };
                out.push(Prompt::new(PromptSlot::Bottom, line));
            }
        }
    }

    if scene.controls_visible {
        out.push(Prompt::new(PromptSlot::Panel, text.controls.join("\n")));
    }

    out
}
