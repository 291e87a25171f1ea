//! Assertion and event helpers

use review_orchestrator::types::{ArchiveItem, ArchiveItemKind, ArchiveOutcome};
use review_orchestrator::{Event, RunRecord};
use std::path::Path;
use tokio::sync::broadcast;

/// Drain every event already sent on `rx`
pub fn drain_events(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// The archive outcome of a run that reached the archive phase
pub fn archive_of(record: &RunRecord) -> &ArchiveOutcome {
    record
        .archive
        .as_ref()
        .unwrap_or_else(|| panic!("run never archived: {}", record.summary_line()))
}

/// Assert that `kind` was moved and its destination exists
pub fn assert_archived<'a>(outcome: &'a ArchiveOutcome, kind: ArchiveItemKind) -> &'a ArchiveItem {
    let item = outcome
        .item(kind)
        .unwrap_or_else(|| panic!("no archive item for {kind:?}"));
    assert!(item.archived, "{kind:?} not archived: {:?}", item.error);
    let destination = item.destination.as_deref().expect("archived item has a destination");
    assert!(destination.exists(), "{} missing", destination.display());
    item
}

/// Assert that `kind` failed to move and its source is still in place
pub fn assert_left_in_place(outcome: &ArchiveOutcome, kind: ArchiveItemKind) {
    let item = outcome
        .item(kind)
        .unwrap_or_else(|| panic!("no archive item for {kind:?}"));
    assert!(!item.archived, "{kind:?} unexpectedly archived");
    assert!(item.error.is_some());
    assert!(item.source.exists(), "{} was removed", item.source.display());
}

/// Number of data rows in a CSV file
pub fn csv_row_count(path: &Path) -> usize {
    std::fs::read_to_string(path)
        .expect("failed to read csv")
        .lines()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .count()
}
