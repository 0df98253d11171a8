//! Optimistic collection controller shared by every asset kind.
//!
//! Mutations run in two phases. `begin_*` applies the tentative change and records
//! what is needed to undo it; `finish_*` commits the remote answer or rolls back.
//! Both phases are keyed by the identifier captured at `begin_*` time, so answers
//! that arrive late, twice, or after the record was removed cannot corrupt the list.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::domain::{Identifiable, RecordId};

use super::{
    editor::EditorState,
    error::{RemoteOp, RemoteResult, SyncError},
    in_flight::{InFlight, Pending, RefreshTicket, RemoveTicket, SubmitTarget, SubmitTicket},
    kind::AssetKind,
    remote::Collaborators,
};

/// In-memory list for one asset kind kept eventually consistent with a remote source.
pub struct CollectionController<K: AssetKind> {
    items: Vec<K::Record>,
    error_message: Option<String>,
    next_local_id: RecordId,
    editor: EditorState,
    in_flight: InFlight<K::Record>,
    last_applied_refresh: Option<u64>,
    /// Latest confirmed edit per record, while other edits of it are outstanding.
    confirmed_edits: HashMap<RecordId, u64>,
    collaborators: Collaborators<K>,
    revision: u64,
}

impl<K: AssetKind> CollectionController<K> {
    pub fn new(collaborators: Collaborators<K>) -> Self {
        Self {
            items: Vec::new(),
            error_message: None,
            next_local_id: 1,
            editor: EditorState::Closed,
            in_flight: InFlight::default(),
            last_applied_refresh: None,
            confirmed_edits: HashMap::new(),
            collaborators,
            revision: 0,
        }
    }

    /// Controller with no remote side; changes live only in memory.
    pub fn local() -> Self {
        Self::new(Collaborators::local())
    }

    /// Seeds the list, e.g. from a cached copy. Duplicate identifiers keep their first
    /// occurrence.
    pub fn with_items(mut self, items: Vec<K::Record>) -> Self {
        self.items = dedupe(items);
        if let Some(max) = max_id(&self.items) {
            self.observe_id(max);
        }
        self
    }

    pub fn items(&self) -> &[K::Record] {
        &self.items
    }

    pub fn get(&self, id: RecordId) -> Option<&K::Record> {
        self.items.iter().find(|record| record.id() == id)
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.has_submits()
    }

    pub fn is_refreshing(&self) -> bool {
        self.in_flight.has_refresh()
    }

    pub fn editor(&self) -> EditorState {
        self.editor
    }

    pub fn is_editor_open(&self) -> bool {
        self.editor.is_open()
    }

    /// The record under edit, when the editor is in edit mode and it still exists.
    pub fn editing_record(&self) -> Option<&K::Record> {
        self.editor.editing_id().and_then(|id| self.get(id))
    }

    /// Next provisional identifier; always above every identifier seen so far.
    pub fn next_local_id(&self) -> RecordId {
        self.next_local_id
    }

    /// Whether `id` belongs to a record whose create has not been confirmed yet.
    pub fn is_provisional(&self, id: RecordId) -> bool {
        self.in_flight.is_provisional(id)
    }

    /// Increases on every observable change; poll it to know when to re-render.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn open_create(&mut self) {
        self.editor = EditorState::Creating;
        self.error_message = None;
        self.touch();
    }

    /// Starts editing `record`. Returns `false` and leaves everything untouched when
    /// the record is no longer part of the collection.
    pub fn open_edit(&mut self, record: &K::Record) -> bool {
        let id = record.id();
        if self.position(id).is_none() {
            debug!("{} {} vanished before the editor opened", K::LABEL, id);
            return false;
        }
        self.editor = EditorState::Editing(id);
        self.error_message = None;
        self.touch();
        true
    }

    pub fn close_editor(&mut self) {
        self.editor = EditorState::Closed;
        self.error_message = None;
        self.touch();
    }

    pub fn clear_error(&mut self) {
        if self.error_message.take().is_some() {
            self.touch();
        }
    }

    /// Applies `input` optimistically according to the editor state.
    ///
    /// Returns `None` when nothing was started: the editor is closed, or the record
    /// under edit has disappeared (reported through [`Self::error_message`]).
    pub fn begin_submit(&mut self, input: &K::Input) -> Option<SubmitTicket> {
        self.error_message = None;
        match self.editor {
            EditorState::Closed => {
                debug!("submit for {} ignored: editor is closed", K::LABEL);
                self.touch();
                None
            }
            EditorState::Creating => {
                let id = self.allocate_id();
                let mut record = K::create_local(input, id);
                record.set_id(id);
                self.items.insert(0, record);
                let seq = self.in_flight.open(Pending::Create { provisional_id: id });
                debug!("{} {} inserted provisionally", K::LABEL, id);
                self.touch();
                Some(SubmitTicket {
                    seq,
                    target: SubmitTarget::Create,
                })
            }
            EditorState::Editing(id) => {
                let Some(pos) = self.position(id) else {
                    self.report(SyncError::StaleRecord { kind: K::LABEL, id });
                    return None;
                };
                let previous = self.items[pos].clone();
                let mut updated = K::update_local(&previous, input);
                updated.set_id(id);
                self.items[pos] = updated;
                let seq = self.in_flight.open(Pending::Edit { id, previous });
                debug!("{} {} updated provisionally", K::LABEL, id);
                self.touch();
                Some(SubmitTicket {
                    seq,
                    target: SubmitTarget::Edit(id),
                })
            }
        }
    }

    /// Settles a submit with the remote answer: the canonical record on success,
    /// a full rollback of the optimistic change on failure. Returns whether the
    /// remote side accepted the change.
    pub fn finish_submit(
        &mut self,
        ticket: SubmitTicket,
        outcome: RemoteResult<K::Record>,
    ) -> bool {
        self.settle_submit(ticket, Some(outcome))
    }

    /// Submits `input` through the configured collaborator, or commits the optimistic
    /// record as-is when none is configured.
    pub fn submit(&mut self, input: &K::Input) -> bool {
        let Some(ticket) = self.begin_submit(input) else {
            return false;
        };
        let outcome = match ticket.target {
            SubmitTarget::Create => self
                .collaborators
                .on_create
                .as_mut()
                .map(|create| create(input)),
            SubmitTarget::Edit(id) => self
                .collaborators
                .on_edit
                .as_mut()
                .map(|edit| edit(id, input)),
        };
        self.settle_submit(ticket, outcome)
    }

    /// Removes `record` optimistically. If it was the edit target the editor closes.
    pub fn begin_remove(&mut self, record: &K::Record) -> RemoveTicket {
        self.error_message = None;
        let id = record.id();
        let snapshot = self.position(id).map(|pos| self.items.remove(pos));
        let closed_editor = self.editor.is_editing(id);
        if closed_editor {
            self.editor = EditorState::Closed;
        }
        let seq = self.in_flight.open(Pending::Remove {
            id,
            snapshot,
            closed_editor,
        });
        debug!("{} {} removed provisionally", K::LABEL, id);
        self.touch();
        RemoveTicket { seq, id }
    }

    /// Settles a remove. On failure a record that was listed when the remove began
    /// returns to the head of the list and, if the removal closed its editor, the
    /// editor reopens on it.
    pub fn finish_remove(&mut self, ticket: RemoveTicket, outcome: RemoteResult<()>) -> bool {
        let Some(Pending::Remove {
            id,
            snapshot,
            closed_editor,
        }) = self
            .in_flight
            .take_if(ticket.seq, |pending| matches!(pending, Pending::Remove { .. }))
        else {
            warn!("ignoring unknown remove ticket for {} {}", K::LABEL, ticket.id);
            return false;
        };

        let accepted = match outcome {
            Ok(()) => {
                info!("{} {} deleted", K::LABEL, ticket.id);
                true
            }
            Err(err) => {
                warn!("rolling back delete of {} {}: {}", K::LABEL, id, err);
                if let Some(snapshot) = snapshot {
                    if self.position(id).is_none() {
                        self.items.insert(0, snapshot);
                    }
                    if closed_editor && self.editor == EditorState::Closed {
                        self.editor = EditorState::Editing(id);
                    }
                }
                self.report(SyncError::remote(RemoteOp::Delete, K::LABEL, err));
                false
            }
        };
        self.touch();
        accepted
    }

    pub fn remove(&mut self, record: &K::Record) -> bool {
        let ticket = self.begin_remove(record);
        let outcome = match self.collaborators.on_delete.as_mut() {
            Some(delete) => delete(ticket.id),
            None => Ok(()),
        };
        self.finish_remove(ticket, outcome)
    }

    /// Marks a list fetch as outstanding.
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.error_message = None;
        let seq = self.in_flight.open(Pending::Refresh);
        self.touch();
        RefreshTicket { seq }
    }

    /// Replaces the list with `outcome` and rebases outstanding optimistic work onto
    /// it. Answers to a refresh that started before the last applied one are dropped.
    pub fn finish_refresh(
        &mut self,
        ticket: RefreshTicket,
        outcome: RemoteResult<Vec<K::Record>>,
    ) -> bool {
        if self
            .in_flight
            .take_if(ticket.seq, |pending| matches!(pending, Pending::Refresh))
            .is_none()
        {
            warn!("ignoring unknown refresh ticket for {}", K::LABEL);
            return false;
        }
        if self
            .last_applied_refresh
            .is_some_and(|applied| applied > ticket.seq)
        {
            debug!("discarding superseded {} refresh", K::LABEL);
            self.touch();
            return false;
        }

        let accepted = match outcome {
            Ok(records) => {
                self.last_applied_refresh = Some(ticket.seq);
                self.apply_fetched(records);
                info!("{} list refreshed ({} records)", K::LABEL, self.items.len());
                true
            }
            Err(err) => {
                warn!("{} refresh failed: {}", K::LABEL, err);
                self.report(SyncError::remote(RemoteOp::Refresh, K::LABEL, err));
                false
            }
        };
        self.touch();
        accepted
    }

    /// Reloads the list from the configured collaborator; a no-op without one.
    pub fn refresh(&mut self) -> bool {
        let Some(list) = self.collaborators.on_refresh.as_mut() else {
            return false;
        };
        let outcome = list();
        let ticket = self.begin_refresh();
        self.finish_refresh(ticket, outcome)
    }

    /// `None` commits the optimistic value as the durable one.
    fn settle_submit(
        &mut self,
        ticket: SubmitTicket,
        outcome: Option<RemoteResult<K::Record>>,
    ) -> bool {
        let Some(pending) = self.in_flight.take_if(ticket.seq, |pending| {
            matches!(pending, Pending::Create { .. } | Pending::Edit { .. })
        }) else {
            warn!("ignoring unknown submit ticket for {}", K::LABEL);
            return false;
        };

        let accepted = match pending {
            Pending::Create { provisional_id } => self.settle_create(provisional_id, outcome),
            Pending::Edit { id, previous } => self.settle_edit(ticket.seq, id, previous, outcome),
            Pending::Remove { .. } | Pending::Refresh => false,
        };
        self.touch();
        accepted
    }

    fn settle_create(
        &mut self,
        provisional_id: RecordId,
        outcome: Option<RemoteResult<K::Record>>,
    ) -> bool {
        match outcome {
            None => {
                info!("{} {} kept locally", K::LABEL, provisional_id);
            }
            Some(Ok(canonical)) => {
                let durable_id = canonical.id();
                self.observe_id(durable_id);
                match self.position(provisional_id) {
                    Some(pos) => {
                        self.items.remove(pos);
                        self.place_canonical(pos, canonical);
                        info!(
                            "{} {} confirmed as {}",
                            K::LABEL, provisional_id, durable_id
                        );
                    }
                    None => debug!(
                        "{} {} was dropped before its create confirmed",
                        K::LABEL, provisional_id
                    ),
                }
            }
            Some(Err(err)) => {
                warn!("rolling back create of {}: {}", K::LABEL, err);
                if let Some(pos) = self.position(provisional_id) {
                    self.items.remove(pos);
                }
                self.report(SyncError::remote(RemoteOp::Create, K::LABEL, err));
                return false;
            }
        }
        if self.editor == EditorState::Creating {
            self.editor = EditorState::Closed;
        }
        true
    }

    /// Answers may arrive out of order when a record is edited again before the
    /// first edit settles. Only the newest word on a record touches the list; older
    /// answers just fix up the rollback values of the edits still outstanding.
    fn settle_edit(
        &mut self,
        seq: u64,
        id: RecordId,
        previous: K::Record,
        outcome: Option<RemoteResult<K::Record>>,
    ) -> bool {
        let newer_pending = self.in_flight.has_edit_after(seq, id);
        let newer_confirmed = self
            .confirmed_edits
            .get(&id)
            .is_some_and(|confirmed| *confirmed > seq);

        let accepted = match outcome {
            None => {
                info!("{} {} updated locally", K::LABEL, id);
                true
            }
            Some(Ok(_)) if newer_confirmed => {
                debug!("{} {} edit confirmed after a newer one, ignored", K::LABEL, id);
                true
            }
            Some(Ok(canonical)) => {
                self.observe_id(canonical.id());
                self.confirmed_edits.insert(id, seq);
                self.in_flight.rebase_edits(id, &canonical);
                match self.position(id) {
                    Some(_) if newer_pending => {
                        debug!("{} {} confirmed; a newer edit is still pending", K::LABEL, id);
                    }
                    Some(pos) if canonical.id() == id => {
                        self.items[pos] = canonical;
                        info!("{} {} updated", K::LABEL, id);
                    }
                    Some(pos) => {
                        self.items.remove(pos);
                        self.place_canonical(pos, canonical);
                        info!("{} {} updated and re-keyed", K::LABEL, id);
                    }
                    None => debug!("{} {} was removed before its edit confirmed", K::LABEL, id),
                }
                true
            }
            Some(Err(err)) => {
                warn!("rolling back edit of {} {}: {}", K::LABEL, id, err);
                if newer_confirmed {
                    debug!("{} {} already holds a newer confirmed edit", K::LABEL, id);
                } else if newer_pending {
                    self.in_flight.hand_down_previous(seq, id, previous);
                } else if let Some(pos) = self.position(id) {
                    self.items[pos] = previous;
                }
                self.report(SyncError::remote(RemoteOp::Edit, K::LABEL, err));
                false
            }
        };

        if !self.in_flight.has_edit_for(id) {
            self.confirmed_edits.remove(&id);
        }
        if accepted && self.editor.is_editing(id) {
            self.editor = EditorState::Closed;
        }
        accepted
    }

    /// Inserts a remote-confirmed record at `pos`, or over an existing copy of it.
    fn place_canonical(&mut self, pos: usize, canonical: K::Record) {
        let id = canonical.id();
        self.make_room_for(id);
        match self.position(id) {
            Some(existing) => self.items[existing] = canonical,
            None => self.items.insert(pos.min(self.items.len()), canonical),
        }
    }

    /// Moves a provisional record off `id` so a durable record can take it.
    fn make_room_for(&mut self, id: RecordId) {
        if !self.in_flight.is_provisional(id) {
            return;
        }
        let fresh = self.allocate_id();
        self.rekey(id, fresh);
        if let Some(pos) = self.position(id) {
            self.items[pos].set_id(fresh);
        }
    }

    fn rekey(&mut self, from: RecordId, to: RecordId) {
        debug!("{} provisional id {} moved to {}", K::LABEL, from, to);
        self.in_flight.rekey_provisional(from, to);
        if let Some(confirmed) = self.confirmed_edits.remove(&from) {
            self.confirmed_edits.insert(to, confirmed);
        }
        if self.editor.is_editing(from) {
            self.editor = EditorState::Editing(to);
        }
    }

    fn apply_fetched(&mut self, records: Vec<K::Record>) {
        let mut fetched = dedupe(records);
        if let Some(max) = max_id(&fetched) {
            self.observe_id(max);
        }
        let previous_items = std::mem::take(&mut self.items);
        let provisional_ids = self.in_flight.provisional_ids();
        // Only the oldest outstanding edit of a record rolls back to the server copy;
        // later ones roll back to the edit before them.
        let mut rebased = HashSet::new();

        for pending in self.in_flight.entries_mut() {
            match pending {
                Pending::Remove { id, snapshot, .. } => {
                    if let Some(pos) = fetched.iter().position(|r| r.id() == *id) {
                        *snapshot = Some(fetched.remove(pos));
                    }
                }
                Pending::Edit { id, previous } if !provisional_ids.contains(&*id) => {
                    let id = *id;
                    if !rebased.insert(id) {
                        continue;
                    }
                    if let Some(pos) = fetched.iter().position(|r| r.id() == id) {
                        let optimistic = previous_items.iter().find(|r| r.id() == id).cloned();
                        if let Some(optimistic) = optimistic {
                            *previous = std::mem::replace(&mut fetched[pos], optimistic);
                        } else {
                            *previous = fetched[pos].clone();
                        }
                    }
                }
                Pending::Edit { .. } | Pending::Create { .. } | Pending::Refresh => {}
            }
        }

        // Provisional ids the server now uses move aside, whether or not their
        // record is still on screen.
        let fetched_ids: HashSet<RecordId> = fetched.iter().map(Identifiable::id).collect();
        let mut renamed = HashMap::new();
        for id in &provisional_ids {
            if fetched_ids.contains(id) {
                let fresh = self.allocate_id();
                self.rekey(*id, fresh);
                renamed.insert(*id, fresh);
            }
        }

        let mut merged: Vec<K::Record> = Vec::with_capacity(fetched.len() + provisional_ids.len());
        for mut record in previous_items {
            let id = record.id();
            if let Some(fresh) = renamed.get(&id) {
                record.set_id(*fresh);
                merged.push(record);
            } else if provisional_ids.contains(&id) {
                merged.push(record);
            }
        }
        merged.extend(fetched);
        self.items = merged;
    }

    fn report(&mut self, err: SyncError) {
        self.error_message = Some(err.to_string());
        self.touch();
    }

    fn allocate_id(&mut self) -> RecordId {
        let id = self.next_local_id;
        self.next_local_id += 1;
        id
    }

    fn observe_id(&mut self, id: RecordId) {
        if id >= self.next_local_id {
            self.next_local_id = id + 1;
        }
    }

    fn position(&self, id: RecordId) -> Option<usize> {
        self.items.iter().position(|record| record.id() == id)
    }

    fn touch(&mut self) {
        self.revision += 1;
    }
}

fn dedupe<R: Identifiable>(records: Vec<R>) -> Vec<R> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.id()))
        .collect()
}

fn max_id<R: Identifiable>(records: &[R]) -> Option<RecordId> {
    records.iter().map(Identifiable::id).max()
}
