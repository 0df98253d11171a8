//! Local persistence standing in for the remote asset service.

pub mod json_backend;

pub use json_backend::{
    load_store_from_path, save_store_to_path, JsonAssetStore, StoreData, StoredCollection,
    StoredKind, STORE_SCHEMA_VERSION,
};
