//! Optimistic synchronization of per-kind record collections with a remote store.

pub mod adapters;
pub mod controller;
pub mod editor;
pub mod error;
pub mod in_flight;
pub mod kind;
pub mod remote;

pub use adapters::{CashAccounts, FixedAssets, Holdings, Liabilities, OtherAssets};
pub use controller::CollectionController;
pub use editor::EditorState;
pub use error::{RemoteError, RemoteOp, RemoteResult, SyncError};
pub use in_flight::{RefreshTicket, RemoveTicket, SubmitTarget, SubmitTicket};
pub use kind::AssetKind;
pub use remote::{Collaborators, RemoteCollection};
