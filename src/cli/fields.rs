//! `field=value` arguments turned into per-kind inputs.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use strsim::levenshtein;

use crate::{
    domain::{
        CashAccount, CashAccountInput, CurrencyCode, Displayable, FixedAsset, FixedAssetInput,
        Holding, HoldingInput, Liability, LiabilityInput, OtherAsset, OtherAssetInput,
    },
    portfolio::Portfolio,
    sync::{
        AssetKind, CashAccounts, CollectionController, FixedAssets, Holdings, Liabilities,
        OtherAssets,
    },
};

/// The five collections as named on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindName {
    Cash,
    Holdings,
    Fixed,
    Liabilities,
    Other,
}

impl KindName {
    pub const ALL: [KindName; 5] = [
        KindName::Cash,
        KindName::Holdings,
        KindName::Fixed,
        KindName::Liabilities,
        KindName::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            KindName::Cash => CashAccounts::NAME,
            KindName::Holdings => Holdings::NAME,
            KindName::Fixed => FixedAssets::NAME,
            KindName::Liabilities => Liabilities::NAME,
            KindName::Other => OtherAssets::NAME,
        }
    }

    /// Closest kind name to a mistyped one.
    pub fn suggest(raw: &str) -> Option<&'static str> {
        let raw = raw.to_lowercase();
        KindName::ALL
            .iter()
            .map(|kind| (levenshtein(kind.as_str(), &raw), kind.as_str()))
            .filter(|(distance, _)| *distance <= 3)
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, name)| name)
    }
}

impl fmt::Display for KindName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for KindName {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_lowercase();
        KindName::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| {
                let names: Vec<&str> = KindName::ALL.iter().map(KindName::as_str).collect();
                match KindName::suggest(raw) {
                    Some(best) => format!("Unknown kind `{}`. Did you mean `{}`?", raw, best),
                    None => format!("Unknown kind `{}`. Expected one of: {}.", raw, names.join(", ")),
                }
            })
    }
}

/// What the shell needs to know about an asset kind beyond its adapters.
pub trait CliKind: AssetKind + Sized {
    const NAME: &'static str;
    const FIELDS: &'static [&'static str];

    fn controller(portfolio: &Portfolio) -> &CollectionController<Self>;
    fn controller_mut(portfolio: &mut Portfolio) -> &mut CollectionController<Self>;

    /// Starting point for a create.
    fn blank_input() -> Self::Input;
    /// Starting point for an edit: the record's own values.
    fn input_from(record: &Self::Record) -> Self::Input;
    fn set_field(input: &mut Self::Input, key: &str, value: &str) -> Result<(), String>;
    fn validate(input: &Self::Input) -> Result<(), String>;
    fn describe(record: &Self::Record) -> String;
}

/// Applies `key=value` pairs to `input`, stopping at the first bad one.
pub fn apply_assignments<K: CliKind>(input: &mut K::Input, args: &[&str]) -> Result<(), String> {
    for arg in args {
        let Some((key, value)) = arg.split_once('=') else {
            return Err(format!("Expected field=value, got `{}`.", arg));
        };
        let key = key.trim().to_lowercase();
        if !K::FIELDS.contains(&key.as_str()) {
            let hint = K::FIELDS
                .iter()
                .map(|field| (levenshtein(field, &key), *field))
                .filter(|(distance, _)| *distance <= 3)
                .min_by_key(|(distance, _)| *distance)
                .map(|(_, field)| format!(" Did you mean `{}`?", field))
                .unwrap_or_default();
            return Err(format!("Unknown {} field `{}`.{}", K::LABEL, key, hint));
        }
        K::set_field(input, &key, value.trim())?;
    }
    Ok(())
}

fn parse_number(key: &str, value: &str) -> Result<f64, String> {
    value
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
        .ok_or_else(|| format!("{} must be a number.", key))
}

fn parse_optional_number(key: &str, value: &str) -> Result<Option<f64>, String> {
    if value.is_empty() {
        return Ok(None);
    }
    parse_number(key, value).map(Some)
}

fn parse_date(key: &str, value: &str) -> Result<Option<NaiveDate>, String> {
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| format!("{} must be a date like 2024-01-31.", key))
}

fn parse_choice<T>(value: &str) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    if value.is_empty() {
        return Ok(None);
    }
    value.parse::<T>().map(Some).map_err(|err| err.to_string())
}

fn optional_text(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

impl CliKind for CashAccounts {
    const NAME: &'static str = "cash";
    const FIELDS: &'static [&'static str] = &[
        "name",
        "platform",
        "currency",
        "balance",
        "account_type",
        "started_on",
        "note",
    ];

    fn controller(portfolio: &Portfolio) -> &CollectionController<Self> {
        &portfolio.cash_accounts
    }

    fn controller_mut(portfolio: &mut Portfolio) -> &mut CollectionController<Self> {
        &mut portfolio.cash_accounts
    }

    fn blank_input() -> CashAccountInput {
        CashAccountInput::default()
    }

    fn input_from(record: &CashAccount) -> CashAccountInput {
        CashAccountInput {
            name: record.name.clone(),
            platform: record.platform.clone(),
            currency: record.currency.clone(),
            balance: record.balance,
            account_type: Some(record.account_type),
            started_on: record.started_on,
            note: record.note.clone(),
        }
    }

    fn set_field(input: &mut CashAccountInput, key: &str, value: &str) -> Result<(), String> {
        match key {
            "name" => input.name = value.to_string(),
            "platform" => input.platform = value.to_string(),
            "currency" => input.currency = CurrencyCode::new(value),
            "balance" => input.balance = parse_number(key, value)?,
            "account_type" => input.account_type = parse_choice(value)?,
            "started_on" => input.started_on = parse_date(key, value)?,
            "note" => input.note = optional_text(value),
            _ => return Err(format!("Unknown cash account field `{}`.", key)),
        }
        Ok(())
    }

    fn validate(input: &CashAccountInput) -> Result<(), String> {
        input.validate()
    }

    fn describe(record: &CashAccount) -> String {
        record.display_label()
    }
}

impl CliKind for Holdings {
    const NAME: &'static str = "holdings";
    const FIELDS: &'static [&'static str] = &[
        "symbol",
        "name",
        "quantity",
        "fallback_currency",
        "cost_basis_price",
        "market",
        "broker",
        "started_on",
        "note",
    ];

    fn controller(portfolio: &Portfolio) -> &CollectionController<Self> {
        &portfolio.holdings
    }

    fn controller_mut(portfolio: &mut Portfolio) -> &mut CollectionController<Self> {
        &mut portfolio.holdings
    }

    fn blank_input() -> HoldingInput {
        HoldingInput::default()
    }

    fn input_from(record: &Holding) -> HoldingInput {
        HoldingInput {
            symbol: record.symbol.clone(),
            name: record.name.clone(),
            quantity: record.quantity,
            fallback_currency: record.fallback_currency.clone(),
            cost_basis_price: record.cost_basis_price,
            market: Some(record.market),
            broker: record.broker.clone(),
            started_on: record.started_on,
            note: record.note.clone(),
        }
    }

    fn set_field(input: &mut HoldingInput, key: &str, value: &str) -> Result<(), String> {
        match key {
            "symbol" => input.symbol = value.to_string(),
            "name" => input.name = value.to_string(),
            "quantity" => input.quantity = parse_number(key, value)?,
            "fallback_currency" => input.fallback_currency = CurrencyCode::new(value),
            "cost_basis_price" => input.cost_basis_price = parse_optional_number(key, value)?,
            "market" => input.market = parse_choice(value)?,
            "broker" => input.broker = optional_text(value),
            "started_on" => input.started_on = parse_date(key, value)?,
            "note" => input.note = optional_text(value),
            _ => return Err(format!("Unknown holding field `{}`.", key)),
        }
        Ok(())
    }

    fn validate(input: &HoldingInput) -> Result<(), String> {
        input.validate()
    }

    fn describe(record: &Holding) -> String {
        record.display_label()
    }
}

impl CliKind for FixedAssets {
    const NAME: &'static str = "fixed";
    const FIELDS: &'static [&'static str] = &[
        "name",
        "category",
        "current_value_cny",
        "purchase_value_cny",
        "started_on",
        "note",
    ];

    fn controller(portfolio: &Portfolio) -> &CollectionController<Self> {
        &portfolio.fixed_assets
    }

    fn controller_mut(portfolio: &mut Portfolio) -> &mut CollectionController<Self> {
        &mut portfolio.fixed_assets
    }

    fn blank_input() -> FixedAssetInput {
        FixedAssetInput::default()
    }

    fn input_from(record: &FixedAsset) -> FixedAssetInput {
        FixedAssetInput {
            name: record.name.clone(),
            category: Some(record.category),
            current_value_cny: record.current_value_cny,
            purchase_value_cny: record.purchase_value_cny,
            started_on: record.started_on,
            note: record.note.clone(),
        }
    }

    fn set_field(input: &mut FixedAssetInput, key: &str, value: &str) -> Result<(), String> {
        match key {
            "name" => input.name = value.to_string(),
            "category" => input.category = parse_choice(value)?,
            "current_value_cny" => input.current_value_cny = parse_number(key, value)?,
            "purchase_value_cny" => input.purchase_value_cny = parse_optional_number(key, value)?,
            "started_on" => input.started_on = parse_date(key, value)?,
            "note" => input.note = optional_text(value),
            _ => return Err(format!("Unknown fixed asset field `{}`.", key)),
        }
        Ok(())
    }

    fn validate(input: &FixedAssetInput) -> Result<(), String> {
        input.validate()
    }

    fn describe(record: &FixedAsset) -> String {
        record.display_label()
    }
}

impl CliKind for Liabilities {
    const NAME: &'static str = "liabilities";
    const FIELDS: &'static [&'static str] =
        &["name", "category", "currency", "balance", "started_on", "note"];

    fn controller(portfolio: &Portfolio) -> &CollectionController<Self> {
        &portfolio.liabilities
    }

    fn controller_mut(portfolio: &mut Portfolio) -> &mut CollectionController<Self> {
        &mut portfolio.liabilities
    }

    fn blank_input() -> LiabilityInput {
        LiabilityInput::default()
    }

    fn input_from(record: &Liability) -> LiabilityInput {
        LiabilityInput {
            name: record.name.clone(),
            category: Some(record.category),
            currency: record.currency,
            balance: record.balance,
            started_on: record.started_on,
            note: record.note.clone(),
        }
    }

    fn set_field(input: &mut LiabilityInput, key: &str, value: &str) -> Result<(), String> {
        match key {
            "name" => input.name = value.to_string(),
            "category" => input.category = parse_choice(value)?,
            "currency" => input.currency = parse_choice(value)?.unwrap_or_default(),
            "balance" => input.balance = parse_number(key, value)?,
            "started_on" => input.started_on = parse_date(key, value)?,
            "note" => input.note = optional_text(value),
            _ => return Err(format!("Unknown liability field `{}`.", key)),
        }
        Ok(())
    }

    fn validate(input: &LiabilityInput) -> Result<(), String> {
        input.validate()
    }

    fn describe(record: &Liability) -> String {
        record.display_label()
    }
}

impl CliKind for OtherAssets {
    const NAME: &'static str = "other";
    const FIELDS: &'static [&'static str] = &[
        "name",
        "category",
        "current_value_cny",
        "original_value_cny",
        "started_on",
        "note",
    ];

    fn controller(portfolio: &Portfolio) -> &CollectionController<Self> {
        &portfolio.other_assets
    }

    fn controller_mut(portfolio: &mut Portfolio) -> &mut CollectionController<Self> {
        &mut portfolio.other_assets
    }

    fn blank_input() -> OtherAssetInput {
        OtherAssetInput::default()
    }

    fn input_from(record: &OtherAsset) -> OtherAssetInput {
        OtherAssetInput {
            name: record.name.clone(),
            category: Some(record.category),
            current_value_cny: record.current_value_cny,
            original_value_cny: record.original_value_cny,
            started_on: record.started_on,
            note: record.note.clone(),
        }
    }

    fn set_field(input: &mut OtherAssetInput, key: &str, value: &str) -> Result<(), String> {
        match key {
            "name" => input.name = value.to_string(),
            "category" => input.category = parse_choice(value)?,
            "current_value_cny" => input.current_value_cny = parse_number(key, value)?,
            "original_value_cny" => input.original_value_cny = parse_optional_number(key, value)?,
            "started_on" => input.started_on = parse_date(key, value)?,
            "note" => input.note = optional_text(value),
            _ => return Err(format!("Unknown other asset field `{}`.", key)),
        }
        Ok(())
    }

    fn validate(input: &OtherAssetInput) -> Result<(), String> {
        input.validate()
    }

    fn describe(record: &OtherAsset) -> String {
        record.display_label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CashAccountType, LiabilityCurrency, SecurityMarket};

    #[test]
    fn kind_names_parse_and_suggest() {
        assert_eq!("Cash".parse::<KindName>(), Ok(KindName::Cash));
        let err = "holdngs".parse::<KindName>().expect_err("typo");
        assert!(err.contains("Did you mean `holdings`?"), "{err}");
    }

    #[test]
    fn assignments_fill_cash_input() {
        let mut input = CashAccounts::blank_input();
        apply_assignments::<CashAccounts>(
            &mut input,
            &["name=Daily", "platform=ICBC", "balance=12.5", "account_type=bank", "currency=usd"],
        )
        .expect("valid fields");
        assert_eq!(input.name, "Daily");
        assert_eq!(input.balance, 12.5);
        assert_eq!(input.account_type, Some(CashAccountType::Bank));
        assert_eq!(input.currency.as_str(), "USD");
        assert!(CashAccounts::validate(&input).is_ok());
    }

    #[test]
    fn unknown_field_gets_a_suggestion() {
        let mut input = Holdings::blank_input();
        let err = apply_assignments::<Holdings>(&mut input, &["quantty=3"]).expect_err("typo");
        assert_eq!(err, "Unknown holding field `quantty`. Did you mean `quantity`?");
    }

    #[test]
    fn bad_values_are_reported() {
        let mut input = Holdings::blank_input();
        let err = apply_assignments::<Holdings>(&mut input, &["market=moon"]).expect_err("choice");
        assert!(err.starts_with("market must be one of:"), "{err}");
        let err = apply_assignments::<Holdings>(&mut input, &["quantity"]).expect_err("no value");
        assert_eq!(err, "Expected field=value, got `quantity`.");
        apply_assignments::<Holdings>(&mut input, &["market=fund"]).expect("fund");
        assert_eq!(input.market, Some(SecurityMarket::Fund));
    }

    #[test]
    fn edit_input_starts_from_record() {
        let record = Liabilities::create_local(&LiabilityInput::new("Card", 40.0), 3);
        let mut input = Liabilities::input_from(&record);
        apply_assignments::<Liabilities>(&mut input, &["currency=usd"]).expect("currency");
        assert_eq!(input.name, "Card");
        assert_eq!(input.currency, LiabilityCurrency::Usd);
    }
}
