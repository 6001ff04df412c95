// Dashboard error types
use thiserror::Error;

/// The two independent data feeds polled from the weather backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feed {
    Current,
    History,
}

impl std::fmt::Display for Feed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Feed::Current => f.write_str("current"),
            Feed::History => f.write_str("history"),
        }
    }
}

/// Errors raised while acquiring or shaping telemetry.
///
/// None of these are fatal: the scheduler logs them and keeps the last good
/// rendered state on screen.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DashboardError {
    #[error("fetching {feed} feed failed: {reason}")]
    Fetch { feed: Feed, reason: String },

    #[error("decoding {feed} feed payload failed: {reason}")]
    Decode { feed: Feed, reason: String },

    #[error("series has no data points")]
    EmptySeries,

    #[error("refresh interval must be greater than zero")]
    InvalidInterval,

    #[error("unknown metric `{0}`")]
    UnknownMetric(String),
}
