use serde::Serialize;

use crate::proximity::HintDismissal;

/// Discrete things that happened during a tick, drained by the host.
///
/// The audio layer maps these to sounds; the host opens links. Nothing in
/// the kernel reads them back.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SceneEvent {
    /// The world was constructed.
    SessionStarted,
    /// The host ended the session.
    SessionEnded,
    /// The cycle target flipped; `night` is the new target.
    NightToggled { night: bool },
    /// The controls panel was shown or hidden.
    ControlsToggled { visible: bool },
    /// The movement hint went away.
    HintDismissed { reason: HintDismissal },
    /// The player crossed into a zone's radius.
    ZoneEntered { zone: String },
    /// A one-shot zone fired and is now spent.
    OneShotFired { zone: String, label: String },
    /// The host should open `url`.
    LinkRequested { url: String },
    /// A follower started or stopped pursuing.
    FollowToggled { follower: String, enabled: bool },
}
