#![allow(dead_code)]

use std::{cell::RefCell, path::PathBuf, rc::Rc, sync::Mutex};

use asset_tracker::{portfolio::Portfolio, storage::JsonAssetStore};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// A fresh directory that outlives the calling test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// A store file in an isolated directory plus a portfolio wired to it.
pub fn setup_store() -> (Rc<RefCell<JsonAssetStore>>, Portfolio, PathBuf) {
    let path = temp_base().join("assets.json");
    let store = Rc::new(RefCell::new(
        JsonAssetStore::open(&path).expect("open json asset store"),
    ));
    let portfolio = Portfolio::backed_by(Rc::clone(&store));
    (store, portfolio, path)
}
