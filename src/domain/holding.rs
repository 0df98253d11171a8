use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::common::*;

choice_enum! {
    /// Market a security trades on.
    SecurityMarket, "market", default = Other, {
        Cn => "CN",
        Hk => "HK",
        Us => "US",
        Fund => "FUND",
        Crypto => "CRYPTO",
        Other => "OTHER",
    }
}

impl SecurityMarket {
    /// Funds and crypto may be held in fractional units.
    pub fn allows_fractional_quantity(&self) -> bool {
        matches!(self, SecurityMarket::Fund | SecurityMarket::Crypto)
    }
}

/// A position in a listed security or fund.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Holding {
    pub id: RecordId,
    pub symbol: String,
    pub name: String,
    pub quantity: f64,
    pub fallback_currency: CurrencyCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_basis_price: Option<f64>,
    pub market: SecurityMarket,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_on: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_currency: Option<CurrencyCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_cny: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct HoldingInput {
    pub symbol: String,
    pub name: String,
    pub quantity: f64,
    #[serde(default)]
    pub fallback_currency: CurrencyCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_basis_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market: Option<SecurityMarket>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_on: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl HoldingInput {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>, quantity: f64) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            quantity,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        require_text(&self.symbol, "symbol", 32)?;
        require_text(&self.name, "name", 120)?;
        require_positive(self.quantity, "quantity")?;
        self.fallback_currency.validate("fallback_currency")?;
        optional_positive(self.cost_basis_price, "cost_basis_price")?;
        limit_optional_text(self.broker.as_deref(), "broker", 120)?;
        limit_optional_text(self.note.as_deref(), "note", 500)?;
        let market = self.market.unwrap_or_default();
        if !market.allows_fractional_quantity() && self.quantity.fract() != 0.0 {
            return Err("Stocks must be held in whole units; only funds and crypto allow fractional quantities.".into());
        }
        Ok(())
    }
}

/// Canonical symbol spelling: trimmed and upper-cased (`0700.hk` becomes `0700.HK`).
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

impl Identifiable for Holding {
    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
}

impl NamedEntity for Holding {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Holding {
    fn display_label(&self) -> String {
        format!("{} {} x{} ({})", self.symbol, self.name, self.quantity, self.market)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_units_required_outside_funds_and_crypto() {
        let mut input = HoldingInput::new("AAPL", "Apple", 1.5);
        assert!(input.validate().is_err());

        input.market = Some(SecurityMarket::Fund);
        assert!(input.validate().is_ok());

        input.market = Some(SecurityMarket::Us);
        input.quantity = 3.0;
        assert!(input.validate().is_ok());
    }

    #[test]
    fn symbol_is_upper_cased() {
        assert_eq!(normalize_symbol(" 0700.hk "), "0700.HK");
    }
}
