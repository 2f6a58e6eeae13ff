//! Most-frequent payload.
//!
//! Sorts a list of handles (never the payloads themselves) by payload bytes,
//! then scans the runs of equal payloads once. A run only replaces the best
//! one when strictly longer, so among equally frequent payloads the
//! lexicographically smallest wins.

use crate::store::{MessageStore, PayloadId};

/// The most frequent payload and how often it occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frequency {
    pub id: PayloadId,
    pub occurrences: usize,
}

/// Find the most frequent payload, or `None` for an empty store.
pub fn most_common(store: &MessageStore) -> Option<Frequency> {
    let mut order: Vec<PayloadId> = store.ids().collect();
    order.sort_unstable_by(|a, b| store.bytes(*a).cmp(store.bytes(*b)));

    let (&first, rest) = order.split_first()?;
    let mut best = Frequency {
        id: first,
        occurrences: 1,
    };
    let mut run = best;
    for &id in rest {
        if store.bytes(id) == store.bytes(run.id) {
            run.occurrences += 1;
        } else {
            run = Frequency { id, occurrences: 1 };
        }
        if run.occurrences > best.occurrences {
            best = run;
        }
    }
    Some(best)
}
