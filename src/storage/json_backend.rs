use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    domain::{
        CashAccount, FixedAsset, Holding, Identifiable, Liability, OtherAsset, RecordId,
    },
    errors::{AssetError, Result},
    sync::{
        AssetKind, CashAccounts, FixedAssets, Holdings, Liabilities, OtherAssets,
        RemoteCollection, RemoteResult,
    },
    utils::paths::write_atomic,
};

pub const STORE_SCHEMA_VERSION: u32 = 1;

/// Records of one kind together with the identifier the next create receives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCollection<R> {
    #[serde(default = "first_id")]
    pub next_id: RecordId,
    #[serde(default = "Vec::new")]
    pub records: Vec<R>,
}

impl<R> Default for StoredCollection<R> {
    fn default() -> Self {
        Self {
            next_id: first_id(),
            records: Vec::new(),
        }
    }
}

fn first_id() -> RecordId {
    1
}

impl<R: Identifiable> StoredCollection<R> {
    fn allocate_id(&mut self) -> RecordId {
        let max = self.records.iter().map(Identifiable::id).max().unwrap_or(0);
        let id = self.next_id.max(max + 1);
        self.next_id = id + 1;
        id
    }

    fn position(&self, id: RecordId) -> Option<usize> {
        self.records.iter().position(|record| record.id() == id)
    }
}

/// On-disk layout of the asset store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreData {
    pub schema_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cash_accounts: StoredCollection<CashAccount>,
    #[serde(default)]
    pub holdings: StoredCollection<Holding>,
    #[serde(default)]
    pub fixed_assets: StoredCollection<FixedAsset>,
    #[serde(default)]
    pub liabilities: StoredCollection<Liability>,
    #[serde(default)]
    pub other_assets: StoredCollection<OtherAsset>,
}

impl Default for StoreData {
    fn default() -> Self {
        Self {
            schema_version: STORE_SCHEMA_VERSION,
            updated_at: None,
            cash_accounts: StoredCollection::default(),
            holdings: StoredCollection::default(),
            fixed_assets: StoredCollection::default(),
            liabilities: StoredCollection::default(),
            other_assets: StoredCollection::default(),
        }
    }
}

/// How an asset kind is laid out in [`StoreData`].
pub trait StoredKind: AssetKind {
    fn collection(data: &StoreData) -> &StoredCollection<Self::Record>;
    fn collection_mut(data: &mut StoreData) -> &mut StoredCollection<Self::Record>;

    /// First rule `input` violates, as a user-facing message.
    fn validate(input: &Self::Input) -> std::result::Result<(), String>;

    /// Orders a listing. Identifier order unless a kind has a natural one.
    fn sort(records: &mut [Self::Record]) {
        records.sort_by_key(Identifiable::id);
    }
}

impl StoredKind for CashAccounts {
    fn collection(data: &StoreData) -> &StoredCollection<CashAccount> {
        &data.cash_accounts
    }

    fn collection_mut(data: &mut StoreData) -> &mut StoredCollection<CashAccount> {
        &mut data.cash_accounts
    }

    fn validate(input: &Self::Input) -> std::result::Result<(), String> {
        input.validate()
    }

    fn sort(records: &mut [CashAccount]) {
        records.sort_by(|a, b| (&a.platform, &a.name).cmp(&(&b.platform, &b.name)));
    }
}

impl StoredKind for Holdings {
    fn collection(data: &StoreData) -> &StoredCollection<Holding> {
        &data.holdings
    }

    fn collection_mut(data: &mut StoreData) -> &mut StoredCollection<Holding> {
        &mut data.holdings
    }

    fn validate(input: &Self::Input) -> std::result::Result<(), String> {
        input.validate()
    }

    fn sort(records: &mut [Holding]) {
        records.sort_by(|a, b| (&a.symbol, &a.name).cmp(&(&b.symbol, &b.name)));
    }
}

impl StoredKind for FixedAssets {
    fn collection(data: &StoreData) -> &StoredCollection<FixedAsset> {
        &data.fixed_assets
    }

    fn collection_mut(data: &mut StoreData) -> &mut StoredCollection<FixedAsset> {
        &mut data.fixed_assets
    }

    fn validate(input: &Self::Input) -> std::result::Result<(), String> {
        input.validate()
    }
}

impl StoredKind for Liabilities {
    fn collection(data: &StoreData) -> &StoredCollection<Liability> {
        &data.liabilities
    }

    fn collection_mut(data: &mut StoreData) -> &mut StoredCollection<Liability> {
        &mut data.liabilities
    }

    fn validate(input: &Self::Input) -> std::result::Result<(), String> {
        input.validate()
    }
}

impl StoredKind for OtherAssets {
    fn collection(data: &StoreData) -> &StoredCollection<OtherAsset> {
        &data.other_assets
    }

    fn collection_mut(data: &mut StoreData) -> &mut StoredCollection<OtherAsset> {
        &mut data.other_assets
    }

    fn validate(input: &Self::Input) -> std::result::Result<(), String> {
        input.validate()
    }
}

/// JSON file holding every asset collection. Acts as the remote side of the
/// controllers when the tracker runs without a server.
///
/// Every accepted change is written back before it is acknowledged; a write that
/// fails leaves the in-memory copy as it was.
#[derive(Debug, Clone)]
pub struct JsonAssetStore {
    path: Option<PathBuf>,
    data: StoreData,
}

impl JsonAssetStore {
    /// Opens the store at `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = if path.exists() {
            load_store_from_path(&path)?
        } else {
            debug!("no asset store at {}, starting empty", path.display());
            StoreData::default()
        };
        Ok(Self {
            path: Some(path),
            data,
        })
    }

    /// A store that never touches the filesystem.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            data: StoreData::default(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn data(&self) -> &StoreData {
        &self.data
    }

    pub fn records<K: StoredKind>(&self) -> &[K::Record] {
        &K::collection(&self.data).records
    }

    pub fn save(&mut self) -> Result<()> {
        self.data.updated_at = Some(Utc::now());
        match &self.path {
            Some(path) => save_store_to_path(&self.data, path),
            None => Ok(()),
        }
    }

    /// Applies `change` and persists it, restoring the previous contents if the
    /// write fails.
    fn commit<T>(&mut self, change: impl FnOnce(&mut StoreData) -> Result<T>) -> Result<T> {
        let before = self.data.clone();
        let outcome = change(&mut self.data).and_then(|value| {
            self.save()?;
            Ok(value)
        });
        if outcome.is_err() {
            self.data = before;
        }
        outcome
    }
}

impl<K: StoredKind> RemoteCollection<K> for JsonAssetStore {
    fn create(&mut self, input: &K::Input) -> RemoteResult<K::Record> {
        K::validate(input).map_err(AssetError::InvalidInput)?;
        let record = self.commit(|data| {
            let collection = K::collection_mut(data);
            let id = collection.allocate_id();
            let mut record = K::create_local(input, id);
            record.set_id(id);
            collection.records.push(record.clone());
            Ok(record)
        })?;
        info!("stored new {} {}", K::LABEL, record.id());
        Ok(record)
    }

    fn edit(&mut self, id: RecordId, input: &K::Input) -> RemoteResult<K::Record> {
        K::validate(input).map_err(AssetError::InvalidInput)?;
        let record = self.commit(|data| {
            let collection = K::collection_mut(data);
            let pos = collection
                .position(id)
                .ok_or(AssetError::NotFound { kind: K::LABEL, id })?;
            let mut record = K::update_local(&collection.records[pos], input);
            record.set_id(id);
            collection.records[pos] = record.clone();
            Ok(record)
        })?;
        info!("stored update of {} {}", K::LABEL, id);
        Ok(record)
    }

    fn delete(&mut self, id: RecordId) -> RemoteResult<()> {
        self.commit(|data| {
            let collection = K::collection_mut(data);
            let pos = collection
                .position(id)
                .ok_or(AssetError::NotFound { kind: K::LABEL, id })?;
            collection.records.remove(pos);
            Ok(())
        })?;
        info!("deleted stored {} {}", K::LABEL, id);
        Ok(())
    }

    fn list(&mut self) -> RemoteResult<Vec<K::Record>> {
        let mut records = K::collection(&self.data).records.clone();
        K::sort(&mut records);
        Ok(records)
    }
}

pub fn save_store_to_path(data: &StoreData, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    write_atomic(path, &json)
}

pub fn load_store_from_path(path: &Path) -> Result<StoreData> {
    let contents = fs::read_to_string(path)?;
    let data: StoreData = serde_json::from_str(&contents)?;
    if data.schema_version > STORE_SCHEMA_VERSION {
        return Err(AssetError::InvalidInput(format!(
            "asset store `{}` is from a newer schema version",
            path.display()
        )));
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CashAccountInput, HoldingInput, LiabilityInput};
    use tempfile::TempDir;

    fn store_in_temp_dir() -> (JsonAssetStore, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        let store = JsonAssetStore::open(temp.path().join("assets.json")).expect("open store");
        (store, temp)
    }

    #[test]
    fn create_assigns_increasing_ids_and_persists() {
        let (mut store, temp) = store_in_temp_dir();
        let first = RemoteCollection::<CashAccounts>::create(
            &mut store,
            &CashAccountInput::new("Wallet", "Alipay", 10.0),
        )
        .expect("create wallet");
        let second = RemoteCollection::<CashAccounts>::create(
            &mut store,
            &CashAccountInput::new("Salary", "ICBC", 20.0),
        )
        .expect("create salary");
        assert_eq!((first.id, second.id), (1, 2));

        let reopened = JsonAssetStore::open(temp.path().join("assets.json")).expect("reopen");
        assert_eq!(reopened.records::<CashAccounts>().len(), 2);
        assert_eq!(reopened.data().cash_accounts.next_id, 3);
        assert!(reopened.data().updated_at.is_some());
    }

    #[test]
    fn invalid_input_is_rejected_with_its_message() {
        let (mut store, _temp) = store_in_temp_dir();
        let err = RemoteCollection::<Holdings>::create(
            &mut store,
            &HoldingInput::new("600519", "Moutai", 1.5),
        )
        .expect_err("fractional shares rejected");
        assert!(err.message().contains("whole units"), "{}", err.message());
        assert!(store.records::<Holdings>().is_empty());
    }

    #[test]
    fn edit_and_delete_report_missing_records() {
        let (mut store, _temp) = store_in_temp_dir();
        let err = RemoteCollection::<Liabilities>::edit(
            &mut store,
            4,
            &LiabilityInput::new("Mortgage", 1000.0),
        )
        .expect_err("missing liability");
        assert_eq!(err.message(), "liability 4 not found.");

        let err = RemoteCollection::<Liabilities>::delete(&mut store, 4).expect_err("missing");
        assert_eq!(err.message(), "liability 4 not found.");
    }

    #[test]
    fn deleted_ids_are_not_reused() {
        let mut store = JsonAssetStore::in_memory();
        let input = CashAccountInput::new("Wallet", "Cash", 1.0);
        let first = RemoteCollection::<CashAccounts>::create(&mut store, &input).expect("create");
        RemoteCollection::<CashAccounts>::delete(&mut store, first.id).expect("delete");
        let second = RemoteCollection::<CashAccounts>::create(&mut store, &input).expect("create");
        assert_eq!(second.id, 2);
    }

    #[test]
    fn cash_accounts_list_by_platform_then_name() {
        let mut store = JsonAssetStore::in_memory();
        for (name, platform) in [("Savings", "ICBC"), ("Wallet", "Alipay"), ("Daily", "ICBC")] {
            RemoteCollection::<CashAccounts>::create(
                &mut store,
                &CashAccountInput::new(name, platform, 1.0),
            )
            .expect("create");
        }
        let names: Vec<String> = RemoteCollection::<CashAccounts>::list(&mut store)
            .expect("list")
            .into_iter()
            .map(|account| account.name)
            .collect();
        assert_eq!(names, vec!["Wallet", "Daily", "Savings"]);
    }

    #[test]
    fn newer_schema_is_refused() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("assets.json");
        fs::write(&path, r#"{ "schema_version": 99 }"#).expect("write store");
        let err = JsonAssetStore::open(&path).expect_err("newer schema");
        assert!(err.to_string().contains("newer schema version"));
    }
}
