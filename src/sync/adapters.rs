//! Record adapters for the five asset kinds.
//!
//! Optimistic records carry every field the user typed plus whatever can be derived
//! without market data. Prices and exchange rates only ever come from the remote
//! side, so an edit keeps them as long as the symbol or currency is unchanged.

use crate::domain::{
    cash_account::{CashAccount, CashAccountInput},
    common::{normalize_optional_text, return_pct, round_to, CurrencyCode},
    fixed_asset::{FixedAsset, FixedAssetInput},
    holding::{normalize_symbol, Holding, HoldingInput},
    liability::{Liability, LiabilityCurrency, LiabilityInput},
    other_asset::{OtherAsset, OtherAssetInput},
    RecordId,
};

use super::kind::AssetKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CashAccounts;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Holdings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedAssets;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Liabilities;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OtherAssets;

fn value_in_cny(amount: f64, fx_to_cny: Option<f64>) -> Option<f64> {
    fx_to_cny.map(|fx| round_to(amount * fx, 2))
}

impl AssetKind for CashAccounts {
    type Record = CashAccount;
    type Input = CashAccountInput;

    const LABEL: &'static str = "cash account";

    fn create_local(input: &CashAccountInput, id: RecordId) -> CashAccount {
        let currency = CurrencyCode::new(input.currency.as_str());
        let fx_to_cny = currency.is_cny().then_some(1.0);
        CashAccount {
            id,
            name: input.name.trim().to_string(),
            platform: input.platform.trim().to_string(),
            currency,
            balance: input.balance,
            account_type: input.account_type.unwrap_or_default(),
            started_on: input.started_on,
            note: normalize_optional_text(input.note.as_deref()),
            fx_to_cny,
            value_cny: value_in_cny(input.balance, fx_to_cny),
        }
    }

    fn update_local(current: &CashAccount, input: &CashAccountInput) -> CashAccount {
        let currency = CurrencyCode::new(input.currency.as_str());
        let fx_to_cny = if currency == current.currency {
            current.fx_to_cny
        } else {
            currency.is_cny().then_some(1.0)
        };
        CashAccount {
            id: current.id,
            name: input.name.trim().to_string(),
            platform: input.platform.trim().to_string(),
            currency,
            balance: input.balance,
            account_type: input.account_type.unwrap_or(current.account_type),
            started_on: input.started_on,
            note: normalize_optional_text(input.note.as_deref()),
            fx_to_cny,
            value_cny: value_in_cny(input.balance, fx_to_cny),
        }
    }
}

impl AssetKind for Holdings {
    type Record = Holding;
    type Input = HoldingInput;

    const LABEL: &'static str = "holding";

    fn create_local(input: &HoldingInput, id: RecordId) -> Holding {
        Holding {
            id,
            symbol: normalize_symbol(&input.symbol),
            name: input.name.trim().to_string(),
            quantity: input.quantity,
            fallback_currency: CurrencyCode::new(input.fallback_currency.as_str()),
            cost_basis_price: input.cost_basis_price,
            market: input.market.unwrap_or_default(),
            broker: normalize_optional_text(input.broker.as_deref()),
            started_on: input.started_on,
            note: normalize_optional_text(input.note.as_deref()),
            price: None,
            price_currency: None,
            value_cny: None,
            return_pct: None,
            last_updated: None,
        }
    }

    fn update_local(current: &Holding, input: &HoldingInput) -> Holding {
        let symbol = normalize_symbol(&input.symbol);
        let mut updated = Holding {
            market: input.market.unwrap_or(current.market),
            ..Self::create_local(input, current.id)
        };
        if symbol == current.symbol {
            updated.price = current.price;
            updated.price_currency = current.price_currency.clone();
            updated.last_updated = current.last_updated;
            // Per-unit value is unchanged until the next quote arrives.
            updated.value_cny = current
                .value_cny
                .filter(|_| current.quantity > 0.0)
                .map(|value| round_to(value / current.quantity * input.quantity, 2));
            updated.return_pct = current
                .price
                .and_then(|price| return_pct(price, input.cost_basis_price));
        }
        updated
    }
}

impl AssetKind for FixedAssets {
    type Record = FixedAsset;
    type Input = FixedAssetInput;

    const LABEL: &'static str = "fixed asset";

    fn create_local(input: &FixedAssetInput, id: RecordId) -> FixedAsset {
        FixedAsset {
            id,
            name: input.name.trim().to_string(),
            category: input.category.unwrap_or_default(),
            current_value_cny: input.current_value_cny,
            purchase_value_cny: input.purchase_value_cny,
            started_on: input.started_on,
            note: normalize_optional_text(input.note.as_deref()),
            value_cny: round_to(input.current_value_cny, 2),
            return_pct: return_pct(input.current_value_cny, input.purchase_value_cny),
        }
    }

    fn update_local(current: &FixedAsset, input: &FixedAssetInput) -> FixedAsset {
        FixedAsset {
            category: input.category.unwrap_or(current.category),
            ..Self::create_local(input, current.id)
        }
    }
}

impl AssetKind for Liabilities {
    type Record = Liability;
    type Input = LiabilityInput;

    const LABEL: &'static str = "liability";

    fn create_local(input: &LiabilityInput, id: RecordId) -> Liability {
        let fx_to_cny = (input.currency == LiabilityCurrency::Cny).then_some(1.0);
        Liability {
            id,
            name: input.name.trim().to_string(),
            category: input.category.unwrap_or_default(),
            currency: input.currency,
            balance: input.balance,
            started_on: input.started_on,
            note: normalize_optional_text(input.note.as_deref()),
            fx_to_cny,
            value_cny: value_in_cny(input.balance, fx_to_cny),
        }
    }

    fn update_local(current: &Liability, input: &LiabilityInput) -> Liability {
        let mut updated = Liability {
            category: input.category.unwrap_or(current.category),
            ..Self::create_local(input, current.id)
        };
        if input.currency == current.currency {
            updated.fx_to_cny = current.fx_to_cny;
            updated.value_cny = value_in_cny(input.balance, current.fx_to_cny);
        }
        updated
    }
}

impl AssetKind for OtherAssets {
    type Record = OtherAsset;
    type Input = OtherAssetInput;

    const LABEL: &'static str = "other asset";

    fn create_local(input: &OtherAssetInput, id: RecordId) -> OtherAsset {
        OtherAsset {
            id,
            name: input.name.trim().to_string(),
            category: input.category.unwrap_or_default(),
            current_value_cny: input.current_value_cny,
            original_value_cny: input.original_value_cny,
            started_on: input.started_on,
            note: normalize_optional_text(input.note.as_deref()),
            value_cny: round_to(input.current_value_cny, 2),
            return_pct: return_pct(input.current_value_cny, input.original_value_cny),
        }
    }

    fn update_local(current: &OtherAsset, input: &OtherAssetInput) -> OtherAsset {
        OtherAsset {
            category: input.category.unwrap_or(current.category),
            ..Self::create_local(input, current.id)
        }
    }
}
