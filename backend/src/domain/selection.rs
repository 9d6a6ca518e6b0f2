//! Stale-response guard for per-selection fetches.
//!
//! Each viewer's latest selection is stamped with a ticket. Responses carry
//! the ticket they were requested under and are discarded once a newer
//! selection exists, so a slow fetch for a previous patient cannot replace the
//! data of the current one.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{Error, RecordId, UserKey};

/// Monotonic stamp identifying one selection made by one viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionTicket(u64);

impl SelectionTicket {
    /// Wrap a raw ticket value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy)]
struct Selection {
    ticket: SelectionTicket,
    target: RecordId,
}

/// Latest selection per viewer.
#[derive(Debug, Default)]
pub struct SelectionTracker {
    selections: Mutex<HashMap<UserKey, Selection>>,
}

impl SelectionTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `viewer` selected `target` and return the new ticket.
    ///
    /// # Examples
    /// ```
    /// use guardian_vision::domain::{RecordId, Role, SelectionTracker, UserKey};
    ///
    /// let tracker = SelectionTracker::new();
    /// let viewer = UserKey::new(Role::Caregiver, RecordId::new(2));
    /// let first = tracker.select(viewer, RecordId::new(3));
    /// let second = tracker.select(viewer, RecordId::new(4));
    /// assert!(!tracker.is_current(viewer, first));
    /// assert!(tracker.is_current(viewer, second));
    /// ```
    pub fn select(&self, viewer: UserKey, target: RecordId) -> SelectionTicket {
        let mut selections = self
            .selections
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let next = selections
            .get(&viewer)
            .map_or(1, |current| current.ticket.get().saturating_add(1));
        let ticket = SelectionTicket(next);
        selections.insert(viewer, Selection { ticket, target });
        ticket
    }

    /// Whether `ticket` is still the latest selection of `viewer`.
    pub fn is_current(&self, viewer: UserKey, ticket: SelectionTicket) -> bool {
        self.current(viewer)
            .is_some_and(|(current, _)| current == ticket)
    }

    /// Latest ticket and target selected by `viewer`.
    pub fn current(&self, viewer: UserKey) -> Option<(SelectionTicket, RecordId)> {
        self.selections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&viewer)
            .map(|selection| (selection.ticket, selection.target))
    }

    /// Fail with `conflict` unless `ticket` still selects `target`.
    pub fn ensure_current(
        &self,
        viewer: UserKey,
        ticket: SelectionTicket,
        target: RecordId,
    ) -> Result<(), Error> {
        match self.current(viewer) {
            Some((current, selected)) if current == ticket && selected == target => Ok(()),
            current => Err(Error::conflict("selection superseded").with_details(json!({
                "reason": "selection_superseded",
                "currentTicket": current.map(|(ticket, _)| ticket),
            }))),
        }
    }
}
