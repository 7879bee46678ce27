//! Points -> severity mapping
//!
//! PingCastle scores each matched risk rule with a number of points. The
//! mapper translates that raw score into a five-level severity label plus a
//! 0-100 normalized score. Thresholds are data, not control flow, so they
//! can be tuned without touching any other component.

use serde::{Deserialize, Serialize};

/// Severity label of a finding
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeverityLabel {
    Informational,
    Low,
    Medium,
    High,
    Critical,
}

impl SeverityLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
            Self::Informational => "INFORMATIONAL",
        }
    }
}

impl std::fmt::Display for SeverityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive lower-bound thresholds, ordered from most to least severe.
/// First match wins; anything below the last threshold is informational.
const THRESHOLDS: [(i64, SeverityLabel, u8); 4] = [
    (30, SeverityLabel::Critical, 90),
    (20, SeverityLabel::High, 70),
    (10, SeverityLabel::Medium, 40),
    (1, SeverityLabel::Low, 20),
];

/// Map a numeric point score to (label, normalized 0-100 score).
pub fn severity_for_points(points: i64) -> (SeverityLabel, u8) {
    for (min, label, normalized) in THRESHOLDS {
        if points >= min {
            return (label, normalized);
        }
    }
    (SeverityLabel::Informational, 0)
}

/// Map a raw points string to (label, normalized score).
///
/// Non-numeric or missing points default to 0 points.
pub fn severity_for_raw_points(raw: &str) -> (SeverityLabel, u8) {
    severity_for_points(raw.trim().parse::<i64>().unwrap_or(0))
}
