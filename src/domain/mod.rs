pub mod cash_account;
pub mod common;
pub mod fixed_asset;
pub mod holding;
pub mod liability;
pub mod other_asset;

pub use cash_account::{CashAccount, CashAccountInput, CashAccountType};
pub use common::{
    ChoiceError, CurrencyCode, Displayable, Identifiable, NamedEntity, RecordId,
};
pub use fixed_asset::{FixedAsset, FixedAssetCategory, FixedAssetInput};
pub use holding::{Holding, HoldingInput, SecurityMarket};
pub use liability::{Liability, LiabilityCategory, LiabilityCurrency, LiabilityInput};
pub use other_asset::{OtherAsset, OtherAssetCategory, OtherAssetInput};
