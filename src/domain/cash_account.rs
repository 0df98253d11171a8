use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::common::*;

choice_enum! {
    /// Where a cash balance is held.
    CashAccountType, "account_type", default = Other, {
        Alipay => "ALIPAY",
        Wechat => "WECHAT",
        Bank => "BANK",
        Cash => "CASH",
        Other => "OTHER",
    }
}

/// A cash balance held on a platform, valued in CNY when the rate is known.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CashAccount {
    pub id: RecordId,
    pub name: String,
    pub platform: String,
    pub currency: CurrencyCode,
    pub balance: f64,
    pub account_type: CashAccountType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_on: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fx_to_cny: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_cny: Option<f64>,
}

/// Fields a user submits to create or edit a [`CashAccount`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CashAccountInput {
    pub name: String,
    pub platform: String,
    #[serde(default)]
    pub currency: CurrencyCode,
    pub balance: f64,
    /// Absent keeps the current type on edit and falls back to `OTHER` on create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_type: Option<CashAccountType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_on: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl CashAccountInput {
    pub fn new(name: impl Into<String>, platform: impl Into<String>, balance: f64) -> Self {
        Self {
            name: name.into(),
            platform: platform.into(),
            balance,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        require_text(&self.name, "name", 80)?;
        require_text(&self.platform, "platform", 80)?;
        self.currency.validate("currency")?;
        require_non_negative(self.balance, "balance")?;
        limit_optional_text(self.note.as_deref(), "note", 500)
    }
}

impl Identifiable for CashAccount {
    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
}

impl NamedEntity for CashAccount {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for CashAccount {
    fn display_label(&self) -> String {
        format!(
            "{} @ {} ({:.2} {}, {})",
            self.name, self.platform, self.balance, self.currency, self.account_type
        )
    }
}
