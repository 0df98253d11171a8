use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::common::*;

choice_enum! {
    LiabilityCategory, "category", default = Other, {
        Mortgage => "MORTGAGE",
        AutoLoan => "AUTO_LOAN",
        CreditCard => "CREDIT_CARD",
        PersonalLoan => "PERSONAL_LOAN",
        Other => "OTHER",
    }
}

choice_enum! {
    /// Liabilities are only tracked in these two currencies.
    LiabilityCurrency, "currency", default = Cny, {
        Cny => "CNY",
        Usd => "USD",
    }
}

/// An outstanding debt; its `value_cny` counts against net worth.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Liability {
    pub id: RecordId,
    pub name: String,
    pub category: LiabilityCategory,
    pub currency: LiabilityCurrency,
    pub balance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_on: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fx_to_cny: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_cny: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LiabilityInput {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<LiabilityCategory>,
    #[serde(default)]
    pub currency: LiabilityCurrency,
    pub balance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_on: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl LiabilityInput {
    pub fn new(name: impl Into<String>, balance: f64) -> Self {
        Self {
            name: name.into(),
            balance,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        require_text(&self.name, "name", 120)?;
        require_non_negative(self.balance, "balance")?;
        limit_optional_text(self.note.as_deref(), "note", 500)
    }
}

impl Identifiable for Liability {
    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
}

impl NamedEntity for Liability {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Liability {
    fn display_label(&self) -> String {
        format!(
            "{} ({}, {:.2} {})",
            self.name, self.category, self.balance, self.currency
        )
    }
}
