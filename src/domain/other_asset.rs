use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::common::*;

choice_enum! {
    OtherAssetCategory, "category", default = Other, {
        Receivable => "RECEIVABLE",
        Other => "OTHER",
    }
}

/// Anything else worth tracking, such as money lent out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OtherAsset {
    pub id: RecordId,
    pub name: String,
    pub category: OtherAssetCategory,
    pub current_value_cny: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_value_cny: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_on: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub value_cny: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_pct: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct OtherAssetInput {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<OtherAssetCategory>,
    pub current_value_cny: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_value_cny: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_on: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl OtherAssetInput {
    pub fn new(name: impl Into<String>, current_value_cny: f64) -> Self {
        Self {
            name: name.into(),
            current_value_cny,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        require_text(&self.name, "name", 120)?;
        require_positive(self.current_value_cny, "current_value_cny")?;
        optional_positive(self.original_value_cny, "original_value_cny")?;
        limit_optional_text(self.note.as_deref(), "note", 500)
    }
}

impl Identifiable for OtherAsset {
    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
}

impl NamedEntity for OtherAsset {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for OtherAsset {
    fn display_label(&self) -> String {
        format!("{} ({}, {:.2} CNY)", self.name, self.category, self.value_cny)
    }
}
