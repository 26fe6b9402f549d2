use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a countdown
///
/// A countdown that runs out naturally lands in `Stopped`, the same as an
/// explicit stop; only the callback fired differs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Initialized,
    Started,
    Paused,
    Stopped,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Initialized => "initialized",
            Status::Started => "started",
            Status::Paused => "paused",
            Status::Stopped => "stopped",
        }
    }

    /// `pause` and `stop` only act on an active countdown
    pub fn is_active(self) -> bool {
        matches!(self, Status::Started | Status::Paused)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initialized" => Ok(Status::Initialized),
            "started" => Ok(Status::Started),
            "paused" => Ok(Status::Paused),
            "stopped" => Ok(Status::Stopped),
            other => Err(format!("unknown timer status: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_strings() {
        for status in [
            Status::Initialized,
            Status::Started,
            Status::Paused,
            Status::Stopped,
        ] {
            assert_eq!(status.as_str().parse::<Status>(), Ok(status));
            assert_eq!(status.to_string(), status.as_str());
        }
        assert!("finished".parse::<Status>().is_err());
    }

    #[test]
    fn test_active_states() {
        assert!(!Status::Initialized.is_active());
        assert!(Status::Started.is_active());
        assert!(Status::Paused.is_active());
        assert!(!Status::Stopped.is_active());
    }
}
