use std::fmt::Debug;

use crate::domain::{Identifiable, RecordId};

/// Per-kind record adapters the controller is generic over.
///
/// Both functions are pure: they synthesize the optimistic value shown before the
/// remote collaborator answers, and the durable value when none is configured.
pub trait AssetKind: 'static {
    type Record: Clone + PartialEq + Debug + Identifiable;
    type Input: Clone + Debug;

    /// Singular lower-case noun used in user-facing messages.
    const LABEL: &'static str;

    /// Builds a provisional record carrying `id`.
    fn create_local(input: &Self::Input, id: RecordId) -> Self::Record;

    /// Merges `input` into `current`, keeping its identifier.
    fn update_local(current: &Self::Record, input: &Self::Input) -> Self::Record;
}
