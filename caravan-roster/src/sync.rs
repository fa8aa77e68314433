use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::Participant;

/// Record of one refresh attempt, kept in the service's bounded history.
#[derive(Clone, Debug, Serialize)]
pub struct SyncReport {
    pub at: DateTime<Utc>,
    pub duration: Duration,
    pub source: String,
    pub outcome: SyncOutcome,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum SyncOutcome {
    Applied {
        added: usize,
        updated: usize,
        removed: usize,
    },
    Failed {
        error: String,
    },
}

impl SyncReport {
    pub const fn succeeded(&self) -> bool {
        matches!(self.outcome, SyncOutcome::Applied { .. })
    }
}

/// Diff of two snapshots keyed by ticket id: what a full-replace refresh
/// added, changed and wiped. Ticket ids are not guaranteed unique, so the
/// counts are informational (the last row per ticket wins in the diff), in
/// line with capacity being informational elsewhere.
pub(crate) fn diff_snapshots(
    old: &[Participant],
    new: &[Participant],
) -> (usize, usize, usize) {
    let old_by_ticket: HashMap<&str, &Participant> = old
        .iter()
        .map(|participant| (participant.ticket_id.as_str(), participant))
        .collect();
    let new_by_ticket: HashMap<&str, &Participant> = new
        .iter()
        .map(|participant| (participant.ticket_id.as_str(), participant))
        .collect();

    let added = new_by_ticket
        .keys()
        .filter(|ticket| !old_by_ticket.contains_key(*ticket))
        .count();
    let removed = old_by_ticket
        .keys()
        .filter(|ticket| !new_by_ticket.contains_key(*ticket))
        .count();
    let updated = new_by_ticket
        .iter()
        .filter(|(ticket, incoming)| {
            old_by_ticket.get(*ticket).is_some_and(|previous| {
                previous.first_name != incoming.first_name
                    || previous.last_name != incoming.last_name
                    || previous.assignment.bus_id() != incoming.assignment.bus_id()
            })
        })
        .count();

    (added, updated, removed)
}
