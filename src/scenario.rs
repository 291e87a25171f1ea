//! Scenario classification
//!
//! A category counts as available only when its report was generated. Empty and
//! failed reports are both "unavailable"; the difference survives in the
//! [`ReportResult`](crate::types::ReportResult) and is spelled out in the
//! notification body.

use crate::types::{ReportStatus, Scenario};

/// Classify a run from its two report statuses
///
/// Total over all nine combinations of `{Generated, Empty, Failed}`.
///
/// # Examples
///
/// ```
/// use review_orchestrator::scenario::classify;
/// use review_orchestrator::types::{ReportStatus, Scenario};
///
/// let a = ReportStatus::Generated { artifact: "a.txt".into() };
/// let b = ReportStatus::Empty;
/// assert_eq!(classify(&a, &b), Scenario::OnlyA);
/// ```
pub fn classify(a: &ReportStatus, b: &ReportStatus) -> Scenario {
    match (a.is_available(), b.is_available()) {
        (true, true) => Scenario::Both,
        (true, false) => Scenario::OnlyA,
        (false, true) => Scenario::OnlyB,
        (false, false) => Scenario::None,
    }
}
