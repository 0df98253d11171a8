use std::collections::BTreeMap;

use crate::domain::RecordId;

/// Remote call a submit ticket expects the caller to make.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTarget {
    Create,
    Edit(RecordId),
}

/// Outstanding optimistic create or edit. Hand it back to
/// [`CollectionController::finish_submit`](super::CollectionController::finish_submit)
/// together with the remote outcome.
#[must_use = "an optimistic submit stays pending until it is finished"]
#[derive(Debug, PartialEq, Eq)]
pub struct SubmitTicket {
    pub(crate) seq: u64,
    pub(crate) target: SubmitTarget,
}

impl SubmitTicket {
    pub fn target(&self) -> SubmitTarget {
        self.target
    }
}

/// Outstanding optimistic delete of `id`.
#[must_use = "an optimistic remove stays pending until it is finished"]
#[derive(Debug, PartialEq, Eq)]
pub struct RemoveTicket {
    pub(crate) seq: u64,
    pub(crate) id: RecordId,
}

impl RemoveTicket {
    pub fn id(&self) -> RecordId {
        self.id
    }
}

#[must_use = "a refresh stays pending until it is finished"]
#[derive(Debug, PartialEq, Eq)]
pub struct RefreshTicket {
    pub(crate) seq: u64,
}

/// Rollback information captured when an operation begins.
#[derive(Debug, Clone)]
pub(crate) enum Pending<R> {
    Create { provisional_id: RecordId },
    Edit { id: RecordId, previous: R },
    /// `snapshot` is `None` when the record was not in the list at begin time.
    Remove {
        id: RecordId,
        snapshot: Option<R>,
        closed_editor: bool,
    },
    Refresh,
}

impl<R> Pending<R> {
    fn is_submit(&self) -> bool {
        matches!(self, Pending::Create { .. } | Pending::Edit { .. })
    }
}

/// Every operation that has begun but not finished, keyed by a sequence number
/// that also orders them by start time.
#[derive(Debug)]
pub(crate) struct InFlight<R> {
    next_seq: u64,
    entries: BTreeMap<u64, Pending<R>>,
}

impl<R> Default for InFlight<R> {
    fn default() -> Self {
        Self {
            next_seq: 1,
            entries: BTreeMap::new(),
        }
    }
}

impl<R> InFlight<R> {
    pub fn open(&mut self, pending: Pending<R>) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(seq, pending);
        seq
    }

    /// Removes the entry for `seq` if `accept` recognises its variant. A ticket
    /// minted by another controller can collide on `seq`; the variant check keeps
    /// it from settling an unrelated operation.
    pub fn take_if(&mut self, seq: u64, accept: impl Fn(&Pending<R>) -> bool) -> Option<Pending<R>> {
        if self.entries.get(&seq).is_some_and(|pending| accept(pending)) {
            self.entries.remove(&seq)
        } else {
            None
        }
    }

    pub fn has_submits(&self) -> bool {
        self.entries.values().any(Pending::is_submit)
    }

    pub fn has_refresh(&self) -> bool {
        self.entries
            .values()
            .any(|pending| matches!(pending, Pending::Refresh))
    }

    pub fn is_provisional(&self, id: RecordId) -> bool {
        self.entries.values().any(
            |pending| matches!(pending, Pending::Create { provisional_id } if *provisional_id == id),
        )
    }

    pub fn provisional_ids(&self) -> Vec<RecordId> {
        self.entries
            .values()
            .filter_map(|pending| match pending {
                Pending::Create { provisional_id } => Some(*provisional_id),
                _ => None,
            })
            .collect()
    }

    /// Points the pending create that owns `from`, and any edit queued on it, at `to`.
    pub fn rekey_provisional(&mut self, from: RecordId, to: RecordId) {
        for pending in self.entries.values_mut() {
            match pending {
                Pending::Create { provisional_id: id } | Pending::Edit { id, .. } if *id == from => {
                    *id = to;
                }
                _ => {}
            }
        }
    }

    pub fn entries_mut(&mut self) -> impl Iterator<Item = &mut Pending<R>> {
        self.entries.values_mut()
    }

    pub fn has_edit_for(&self, id: RecordId) -> bool {
        self.entries.values().any(|pending| is_edit_of(pending, id))
    }

    /// Whether an edit of `id` began after the operation numbered `seq`.
    pub fn has_edit_after(&self, seq: u64, id: RecordId) -> bool {
        self.entries
            .range(seq + 1..)
            .any(|(_, pending)| is_edit_of(pending, id))
    }

    /// Makes the first edit of `id` begun after `seq` roll back to `previous`.
    pub fn hand_down_previous(&mut self, seq: u64, id: RecordId, previous: R) {
        let next = self
            .entries
            .range_mut(seq + 1..)
            .find_map(|(_, pending)| match pending {
                Pending::Edit { id: other, previous } if *other == id => Some(previous),
                _ => None,
            });
        if let Some(slot) = next {
            *slot = previous;
        }
    }
}

impl<R: Clone> InFlight<R> {
    /// Points every outstanding edit of `id` at `confirmed` as its rollback value.
    pub fn rebase_edits(&mut self, id: RecordId, confirmed: &R) {
        for pending in self.entries.values_mut() {
            if let Pending::Edit { id: other, previous } = pending {
                if *other == id {
                    *previous = confirmed.clone();
                }
            }
        }
    }
}

fn is_edit_of<R>(pending: &Pending<R>, id: RecordId) -> bool {
    matches!(pending, Pending::Edit { id: other, .. } if *other == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_if_rejects_mismatched_variant() {
        let mut in_flight: InFlight<()> = InFlight::default();
        let seq = in_flight.open(Pending::Refresh);
        assert!(in_flight
            .take_if(seq, |pending| matches!(pending, Pending::Create { .. }))
            .is_none());
        assert!(in_flight.has_refresh());
        assert!(in_flight
            .take_if(seq, |pending| matches!(pending, Pending::Refresh))
            .is_some());
        assert!(!in_flight.has_refresh());
    }

    #[test]
    fn rekey_moves_provisional_id() {
        let mut in_flight: InFlight<()> = InFlight::default();
        in_flight.open(Pending::Create { provisional_id: 4 });
        assert!(in_flight.has_submits());
        in_flight.rekey_provisional(4, 12);
        assert!(!in_flight.is_provisional(4));
        assert_eq!(in_flight.provisional_ids(), vec![12]);
    }

    #[test]
    fn hand_down_reaches_only_the_next_edit_of_the_same_record() {
        let mut in_flight: InFlight<&str> = InFlight::default();
        let first = in_flight.open(Pending::Edit { id: 1, previous: "original" });
        in_flight.open(Pending::Edit { id: 2, previous: "other" });
        let third = in_flight.open(Pending::Edit { id: 1, previous: "first draft" });
        assert!(in_flight.has_edit_after(first, 1));
        assert!(!in_flight.has_edit_after(third, 1));

        in_flight.take_if(first, |_| true);
        in_flight.hand_down_previous(first, 1, "original");
        assert!(matches!(
            in_flight.take_if(third, |_| true),
            Some(Pending::Edit { previous: "original", .. })
        ));
        assert!(!in_flight.has_edit_for(1));
        assert!(in_flight.has_edit_for(2));
    }
}
