//! Artifact classification
//!
//! Decides which of the two known PingCastle artifact kinds a normalized
//! tree is, from its root shape alone.

use crate::infrastructure::xml::Element;

/// Kind of an uploaded artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Rules catalog export (`ArrayOfExportedRule` / `ExportedRule`)
    Rules,
    /// Healthcheck report (`RiskRules` + `DomainFQDN`)
    Report,
    /// Neither known schema; ignored without error
    Unknown,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rules => write!(f, "rules"),
            Self::Report => write!(f, "report"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Classify a normalized tree root.
///
/// The rules-shape check runs before the report-shape check: both could
/// theoretically coexist in malformed input, and first match wins.
pub fn classify(root: &Element) -> ArtifactKind {
    if root.name == "ArrayOfExportedRule" || root.child("ExportedRule").is_some() {
        return ArtifactKind::Rules;
    }

    if root.descendant("RiskRules").is_some() && root.descendant("DomainFQDN").is_some() {
        return ArtifactKind::Report;
    }

    ArtifactKind::Unknown
}
