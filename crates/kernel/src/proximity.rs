//! Proximity zones around points of interest.
//!
//! Three kinds of behavior hang off a zone:
//! - the visual `near` flag, recomputed from scratch every tick;
//! - one-shot actions, gated on `near` plus an interact edge, latched forever once fired;
//! - follow toggles, gated on `near` plus a toggle edge, flipping on every edge.

use glade_common::planar;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// What the interact action does inside a zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ZoneAction {
    /// Fires once per session, optionally opening a link as it does.
    OneShot {
        label: String,
        #[serde(default)]
        link: Option<String>,
    },
    /// Opens a link on every interact.
    OpenLink { url: String },
}

/// Stateless definition of a circular interaction zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionZone {
    pub id: String,
    pub anchor: Vec2,
    pub radius: f32,
    /// Follower whose published position replaces `anchor` while it exists.
    #[serde(default)]
    pub attached_to: Option<String>,
    #[serde(default)]
    pub on_interact: Option<ZoneAction>,
    /// Follower toggled by the follow action inside this zone.
    #[serde(default)]
    pub toggles_follow: Option<String>,
}

impl InteractionZone {
    pub fn new(id: impl Into<String>, anchor: Vec2, radius: f32) -> Self {
        Self {
            id: id.into(),
            anchor,
            radius,
            attached_to: None,
            on_interact: None,
            toggles_follow: None,
        }
    }

    pub fn attached_to(mut self, follower: impl Into<String>) -> Self {
        self.attached_to = Some(follower.into());
        self
    }

    pub fn on_interact(mut self, action: ZoneAction) -> Self {
        self.on_interact = Some(action);
        self
    }

    pub fn toggles_follow(mut self, follower: impl Into<String>) -> Self {
        self.toggles_follow = Some(follower.into());
        self
    }
}

/// `near` means strictly inside the disk, measured on the ground plane.
pub fn is_near(player: Vec3, anchor: Vec2, radius: f32) -> bool {
    planar(player).distance(anchor) < radius
}

/// Near flag for every zone against its static anchor.
pub fn evaluate(player: Vec3, zones: &[InteractionZone]) -> BTreeMap<String, bool> {
    zones
        .iter()
        .map(|z| (z.id.clone(), is_near(player, z.anchor, z.radius)))
        .collect()
}

/// Per-tick state paired with a zone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ZoneStatus {
    pub near: bool,
    /// Rising edge of `near`: true only on the tick the player stepped in.
    pub entered: bool,
}

/// A discrete action chosen by the trigger. The caller carries it out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    OneShot {
        zone: String,
        label: String,
        link: Option<String>,
    },
    OpenLink {
        zone: String,
        url: String,
    },
    ToggleFollow {
        zone: String,
        follower: String,
    },
}

/// Zones plus their runtime state.
#[derive(Debug, Clone, Default)]
pub struct ProximityTrigger {
    zones: Vec<InteractionZone>,
    anchors: Vec<Vec2>,
    status: Vec<ZoneStatus>,
    spent: BTreeSet<String>,
}

impl ProximityTrigger {
    pub fn new(zones: Vec<InteractionZone>) -> Self {
        let anchors = zones.iter().map(|z| z.anchor).collect();
        let status = vec![ZoneStatus::default(); zones.len()];
        Self {
            zones,
            anchors,
            status,
            spent: BTreeSet::new(),
        }
    }

    /// Re-evaluate every zone against the player.
    ///
    /// `resolve` maps a follower id to its published ground position; attached
    /// zones whose follower cannot be resolved fall back to their static anchor.
    pub fn update(&mut self, player: Vec3, resolve: impl Fn(&str) -> Option<Vec2>) {
        for (i, zone) in self.zones.iter().enumerate() {
            let anchor = zone
                .attached_to
                .as_deref()
                .and_then(&resolve)
                .unwrap_or(zone.anchor);
            let near = is_near(player, anchor, zone.radius);
            let was_near = self.status[i].near;
            self.anchors[i] = anchor;
            self.status[i] = ZoneStatus {
                near,
                entered: near && !was_near,
            };
        }
    }

    pub fn zones(&self) -> &[InteractionZone] {
        &self.zones
    }

    pub fn status(&self, id: &str) -> Option<ZoneStatus> {
        self.index_of(id).map(|i| self.status[i])
    }

    /// Anchor used on the last update.
    pub fn anchor(&self, id: &str) -> Option<Vec2> {
        self.index_of(id).map(|i| self.anchors[i])
    }

    pub fn any_near(&self) -> bool {
        self.status.iter().any(|s| s.near)
    }

    /// Ids of zones the player stepped into on the last update.
    pub fn entered(&self) -> impl Iterator<Item = &str> {
        self.zones
            .iter()
            .zip(&self.status)
            .filter(|(_, s)| s.entered)
            .map(|(z, _)| z.id.as_str())
    }

    pub fn is_spent(&self, id: &str) -> bool {
        self.spent.contains(id)
    }

    /// Zones with their last anchor, status, and one-shot latch.
    pub fn iter(&self) -> impl Iterator<Item = (&InteractionZone, Vec2, ZoneStatus, bool)> {
        self.zones
            .iter()
            .zip(&self.anchors)
            .zip(&self.status)
            .map(move |((z, a), s)| (z, *a, *s, self.spent.contains(&z.id)))
    }

    /// Handle one interact edge.
    ///
    /// The first near zone in declaration order with an available action wins.
    /// A spent one-shot zone is skipped, letting a later near zone respond.
    pub fn interact(&mut self) -> Option<Dispatch> {
        let (zone, action) = self
            .zones
            .iter()
            .zip(&self.status)
            .filter(|(_, s)| s.near)
            .find_map(|(z, _)| match &z.on_interact {
                Some(ZoneAction::OneShot { .. }) if self.spent.contains(&z.id) => None,
                Some(action) => Some((z.id.clone(), action.clone())),
                None => None,
            })?;

        match action {
            ZoneAction::OneShot { label, link } => {
                self.spent.insert(zone.clone());
                tracing::debug!(%zone, %label, "one-shot fired");
                Some(Dispatch::OneShot { zone, label, link })
            }
            ZoneAction::OpenLink { url } => Some(Dispatch::OpenLink { zone, url }),
        }
    }

    /// Handle one follow-toggle edge: first near zone that toggles a follower.
    pub fn follow_toggle(&self) -> Option<Dispatch> {
        self.zones
            .iter()
            .zip(&self.status)
            .filter(|(_, s)| s.near)
            .find_map(|(z, _)| {
                z.toggles_follow.as_ref().map(|follower| Dispatch::ToggleFollow {
                    zone: z.id.clone(),
                    follower: follower.clone(),
                })
            })
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.zones.iter().position(|z| z.id == id)
    }
}

/// Why the movement hint went away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HintDismissal {
    Timeout,
    ZoneEntered,
}

/// A hint shown at session start and dismissed for good by whichever comes
/// first: the timeout, or the player reaching any zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransientHint {
    visible: bool,
    elapsed_ticks: u32,
    timeout_ticks: u32,
}

impl TransientHint {
    pub fn new(timeout_ticks: u32) -> Self {
        Self {
            visible: true,
            elapsed_ticks: 0,
            timeout_ticks,
        }
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Advance one tick. Returns the reason on the tick the hint is dismissed.
    pub fn update(&mut self, any_near: bool) -> Option<HintDismissal> {
        if !self.visible {
            return None;
        }
        self.elapsed_ticks = self.elapsed_ticks.saturating_add(1);
        let reason = if any_near {
            HintDismissal::ZoneEntered
        } else if self.elapsed_ticks >= self.timeout_ticks {
            HintDismissal::Timeout
        } else {
            return None;
        };
        self.visible = false;
        Some(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn gift_zone() -> InteractionZone {
        InteractionZone::new("npc", Vec2::new(6.0, -3.8), 2.2)
            .on_interact(ZoneAction::OneShot {
                label: "gift".into(),
                link: Some("https://example.com/photos".into()),
            })
            .toggles_follow("companion")
    }

    fn pond_zone() -> InteractionZone {
        InteractionZone::new("pond", Vec2::new(-6.0, -4.0), 2.8).on_interact(ZoneAction::OpenLink {
            url: "https://example.com/letter".into(),
        })
    }

    fn no_followers(_: &str) -> Option<Vec2> {
        None
    }

    #[test]
    fn radius_boundary_scenario() {
        let zone = InteractionZone::new("z", Vec2::ZERO, 2.2);
        assert!(is_near(Vec3::new(2.0, 0.0, 0.0), zone.anchor, zone.radius));
        assert!(!is_near(Vec3::new(2.3, 0.0, 0.0), zone.anchor, zone.radius));
        // Exactly on the rim is outside.
        assert!(!is_near(Vec3::new(2.2, 0.0, 0.0), zone.anchor, zone.radius));
    }

    #[test]
    fn height_is_ignored() {
        assert!(is_near(Vec3::new(0.0, 50.0, 1.0), Vec2::ZERO, 2.0));
    }

    #[test]
    fn evaluate_reports_every_zone() {
        let near = evaluate(Vec3::new(6.0, 0.0, -3.0), &[gift_zone(), pond_zone()]);
        assert_eq!(near.len(), 2);
        assert!(near["npc"]);
        assert!(!near["pond"]);
    }

    #[test]
    fn entered_is_a_rising_edge() {
        let mut trigger = ProximityTrigger::new(vec![gift_zone()]);
        let inside = Vec3::new(6.0, 0.0, -3.0);
        trigger.update(inside, no_followers);
        assert_eq!(trigger.status("npc"), Some(ZoneStatus { near: true, entered: true }));
        assert_eq!(trigger.entered().collect::<Vec<_>>(), vec!["npc"]);

        trigger.update(inside, no_followers);
        assert_eq!(trigger.status("npc"), Some(ZoneStatus { near: true, entered: false }));

        trigger.update(Vec3::ZERO, no_followers);
        assert_eq!(trigger.status("npc"), Some(ZoneStatus::default()));
    }

    #[test]
    fn attached_zone_follows_resolved_anchor() {
        let zone = InteractionZone::new("npc", Vec2::new(6.0, -3.8), 2.2).attached_to("companion");
        let mut trigger = ProximityTrigger::new(vec![zone]);
        let resolve = |id: &str| (id == "companion").then_some(Vec2::new(0.0, 1.0));
        trigger.update(Vec3::ZERO, resolve);
        assert!(trigger.status("npc").unwrap().near);
        assert_eq!(trigger.anchor("npc"), Some(Vec2::new(0.0, 1.0)));

        // Unresolvable follower falls back to the static anchor.
        trigger.update(Vec3::ZERO, no_followers);
        assert!(!trigger.status("npc").unwrap().near);
    }

    #[test]
    fn one_shot_fires_once() {
        let mut trigger = ProximityTrigger::new(vec![gift_zone()]);
        trigger.update(Vec3::new(6.0, 0.0, -3.0), no_followers);

        let first = trigger.interact();
        assert!(matches!(first, Some(Dispatch::OneShot { ref label, .. }) if label == "gift"));
        assert!(trigger.is_spent("npc"));
        assert_eq!(trigger.interact(), None);
    }

    #[test]
    fn interact_needs_near() {
        let mut trigger = ProximityTrigger::new(vec![gift_zone()]);
        trigger.update(Vec3::ZERO, no_followers);
        assert_eq!(trigger.interact(), None);
        assert!(!trigger.is_spent("npc"));
    }

    #[test]
    fn open_link_repeats() {
        let mut trigger = ProximityTrigger::new(vec![pond_zone()]);
        trigger.update(Vec3::new(-6.0, 0.0, -3.0), no_followers);
        for _ in 0..3 {
            assert_eq!(
                trigger.interact(),
                Some(Dispatch::OpenLink {
                    zone: "pond".into(),
                    url: "https://example.com/letter".into()
                })
            );
        }
    }

    #[test]
    fn first_declared_zone_wins_then_falls_through() {
        // Two overlapping zones: the one-shot is declared first.
        let a = InteractionZone::new("a", Vec2::ZERO, 3.0).on_interact(ZoneAction::OneShot {
            label: "gift".into(),
            link: None,
        });
        let b = InteractionZone::new("b", Vec2::ZERO, 3.0).on_interact(ZoneAction::OpenLink {
            url: "u".into(),
        });
        let mut trigger = ProximityTrigger::new(vec![a, b]);
        trigger.update(Vec3::ZERO, no_followers);
        assert!(matches!(trigger.interact(), Some(Dispatch::OneShot { .. })));
        assert!(matches!(trigger.interact(), Some(Dispatch::OpenLink { .. })));
    }

    #[test]
    fn follow_toggle_only_near_bound_zone() {
        let mut trigger = ProximityTrigger::new(vec![gift_zone(), pond_zone()]);
        trigger.update(Vec3::new(-6.0, 0.0, -4.0), no_followers);
        assert_eq!(trigger.follow_toggle(), None);

        trigger.update(Vec3::new(6.0, 0.0, -3.8), no_followers);
        assert_eq!(
            trigger.follow_toggle(),
            Some(Dispatch::ToggleFollow {
                zone: "npc".into(),
                follower: "companion".into()
            })
        );
        // Toggling never spends the one-shot.
        assert!(!trigger.is_spent("npc"));
    }

    #[test]
    fn hint_times_out() {
        let mut hint = TransientHint::new(3);
        assert!(hint.visible());
        assert_eq!(hint.update(false), None);
        assert_eq!(hint.update(false), None);
        assert_eq!(hint.update(false), Some(HintDismissal::Timeout));
        assert!(!hint.visible());
        assert_eq!(hint.update(true), None);
    }

    #[test]
    fn hint_dismissed_by_zone_first() {
        let mut hint = TransientHint::new(300);
        assert_eq!(hint.update(false), None);
        assert_eq!(hint.update(true), Some(HintDismissal::ZoneEntered));
        assert!(!hint.visible());
        // Leaving the zone does not bring it back.
        assert_eq!(hint.update(false), None);
        assert!(!hint.visible());
    }

    proptest! {
        #[test]
        fn near_matches_planar_distance(
            px in -20.0f32..20.0,
            py in -5.0f32..5.0,
            pz in -20.0f32..20.0,
            ax in -20.0f32..20.0,
            az in -20.0f32..20.0,
            radius in 0.1f32..10.0,
        ) {
            let distance = Vec2::new(px - ax, pz - az).length();
            prop_assert_eq!(
                is_near(Vec3::new(px, py, pz), Vec2::new(ax, az), radius),
                distance < radius
            );
        }
    }
}
