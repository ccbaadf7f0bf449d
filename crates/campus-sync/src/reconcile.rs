//! List reconciliation helpers: dedup and unread totals.

use campus_types::Participant;
use std::collections::HashSet;

/// Deduplicate a listing by `unique_key`: one pass, first occurrence wins,
/// relative order of survivors preserved.
pub fn dedup_participants(participants: Vec<Participant>) -> Vec<Participant> {
    let mut seen = HashSet::with_capacity(participants.len());
    let mut deduped = Vec::with_capacity(participants.len());
    for participant in participants {
        if seen.insert(participant.unique_key.clone()) {
            deduped.push(participant);
        }
    }
    deduped
}

/// Total unread messages across a listing. Saturates instead of wrapping.
pub fn total_unread(participants: &[Participant]) -> u32 {
    participants
        .iter()
        .fold(0u32, |acc, p| acc.saturating_add(p.unread_count))
}
