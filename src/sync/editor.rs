use crate::domain::RecordId;

/// Which record, if any, the next submit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorState {
    #[default]
    Closed,
    Creating,
    Editing(RecordId),
}

impl EditorState {
    pub fn is_open(&self) -> bool {
        !matches!(self, EditorState::Closed)
    }

    pub fn editing_id(&self) -> Option<RecordId> {
        match self {
            EditorState::Editing(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_editing(&self, id: RecordId) -> bool {
        self.editing_id() == Some(id)
    }
}
