pub type SceneResult<T> = Result<T, SceneError>;

/// Problems found while building a scene from its configuration.
///
/// Nothing in the per-tick path returns these; once a `WorldState` exists it
/// only degrades, never fails.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("invalid scene config: {0}")]
    InvalidConfig(String),

    #[error("follower `{0}` is declared more than once")]
    DuplicateFollower(String),

    #[error("follower `{follower}` trails `{leader}`, which is unknown or declared after it")]
    LeaderOrder { follower: String, leader: String },

    #[error("`{referrer}` references unknown follower `{follower}`")]
    UnknownFollower { referrer: String, follower: String },
}
