use std::{cell::RefCell, rc::Rc};

use crate::domain::RecordId;

use super::{error::RemoteResult, kind::AssetKind};

/// Durable create/edit/delete/list for one asset kind.
pub trait RemoteCollection<K: AssetKind> {
    fn create(&mut self, input: &K::Input) -> RemoteResult<K::Record>;
    fn edit(&mut self, id: RecordId, input: &K::Input) -> RemoteResult<K::Record>;
    fn delete(&mut self, id: RecordId) -> RemoteResult<()>;
    fn list(&mut self) -> RemoteResult<Vec<K::Record>>;
}

type CreateFn<K> =
    Box<dyn FnMut(&<K as AssetKind>::Input) -> RemoteResult<<K as AssetKind>::Record>>;
type EditFn<K> = Box<
    dyn FnMut(RecordId, &<K as AssetKind>::Input) -> RemoteResult<<K as AssetKind>::Record>,
>;
type DeleteFn = Box<dyn FnMut(RecordId) -> RemoteResult<()>>;
type RefreshFn<K> = Box<dyn FnMut() -> RemoteResult<Vec<<K as AssetKind>::Record>>>;

/// The optional remote operations a controller calls. Any that is missing turns the
/// matching controller operation into a local-only one.
pub struct Collaborators<K: AssetKind> {
    pub(crate) on_create: Option<CreateFn<K>>,
    pub(crate) on_edit: Option<EditFn<K>>,
    pub(crate) on_delete: Option<DeleteFn>,
    pub(crate) on_refresh: Option<RefreshFn<K>>,
}

impl<K: AssetKind> Default for Collaborators<K> {
    fn default() -> Self {
        Self {
            on_create: None,
            on_edit: None,
            on_delete: None,
            on_refresh: None,
        }
    }
}

impl<K: AssetKind> Collaborators<K> {
    /// No remote side at all: every change is kept in memory only.
    pub fn local() -> Self {
        Self::default()
    }

    /// Routes all four operations to a shared [`RemoteCollection`].
    pub fn backed_by<R>(remote: Rc<RefCell<R>>) -> Self
    where
        R: RemoteCollection<K> + 'static,
    {
        let create = Rc::clone(&remote);
        let edit = Rc::clone(&remote);
        let delete = Rc::clone(&remote);
        Self::default()
            .on_create(move |input| RemoteCollection::<K>::create(&mut *create.borrow_mut(), input))
            .on_edit(move |id, input| RemoteCollection::<K>::edit(&mut *edit.borrow_mut(), id, input))
            .on_delete(move |id| RemoteCollection::<K>::delete(&mut *delete.borrow_mut(), id))
            .on_refresh(move || RemoteCollection::<K>::list(&mut *remote.borrow_mut()))
    }

    pub fn on_create(
        mut self,
        f: impl FnMut(&K::Input) -> RemoteResult<K::Record> + 'static,
    ) -> Self {
        self.on_create = Some(Box::new(f));
        self
    }

    pub fn on_edit(
        mut self,
        f: impl FnMut(RecordId, &K::Input) -> RemoteResult<K::Record> + 'static,
    ) -> Self {
        self.on_edit = Some(Box::new(f));
        self
    }

    pub fn on_delete(mut self, f: impl FnMut(RecordId) -> RemoteResult<()> + 'static) -> Self {
        self.on_delete = Some(Box::new(f));
        self
    }

    pub fn on_refresh(
        mut self,
        f: impl FnMut() -> RemoteResult<Vec<K::Record>> + 'static,
    ) -> Self {
        self.on_refresh = Some(Box::new(f));
        self
    }
}
