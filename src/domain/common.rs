use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a record within its kind's collection. Durable ids come from the
/// remote store; provisional ids are allocated locally by the controller.
pub type RecordId = i64;

/// Identifies entities that expose a stable integer identifier.
pub trait Identifiable {
    fn id(&self) -> RecordId;
    fn set_id(&mut self, id: RecordId);
}

/// Provides access to a human-friendly entity name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Supplies a presentation-ready label for UI or logs.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Upper-cased currency code such as `CNY` or `USD`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_uppercase())
    }

    pub fn cny() -> Self {
        Self::new("CNY")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_cny(&self) -> bool {
        self.0 == "CNY"
    }

    pub(crate) fn validate(&self, field: &str) -> Result<(), String> {
        let len = self.0.chars().count();
        if (3..=8).contains(&len) {
            Ok(())
        } else {
            Err(format!("{field} must be 3 to 8 characters."))
        }
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::cny()
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raised when a closed choice field receives a value outside its set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} must be one of: {allowed}.")]
pub struct ChoiceError {
    pub field: &'static str,
    pub allowed: String,
}

/// Declares a closed, upper-case choice set with case-insensitive parsing.
macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal, default = $default:ident,
        { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::domain::common::ChoiceError;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                let normalized = raw.trim().to_uppercase();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|choice| choice.as_str() == normalized)
                    .ok_or_else(|| $crate::domain::common::ChoiceError {
                        field: $field,
                        allowed: $name::ALL
                            .iter()
                            .map(|choice| choice.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    })
            }
        }
    };
}

pub(crate) use choice_enum;

/// Rounds half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Percentage gain of `current` over `basis`, absent when the basis is not positive.
pub fn return_pct(current: f64, basis: Option<f64>) -> Option<f64> {
    basis
        .filter(|basis| *basis > 0.0)
        .map(|basis| round_to((current - basis) / basis * 100.0, 2))
}

/// Trims optional free text; blank values collapse to `None`.
pub fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

pub(crate) fn require_text(value: &str, field: &str, max_len: usize) -> Result<(), String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{field} cannot be empty."));
    }
    if trimmed.chars().count() > max_len {
        return Err(format!("{field} must be at most {max_len} characters."));
    }
    Ok(())
}

pub(crate) fn limit_optional_text(
    value: Option<&str>,
    field: &str,
    max_len: usize,
) -> Result<(), String> {
    match value {
        Some(text) if text.trim().chars().count() > max_len => {
            Err(format!("{field} must be at most {max_len} characters."))
        }
        _ => Ok(()),
    }
}

pub(crate) fn require_positive(value: f64, field: &str) -> Result<(), String> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(format!("{field} must be greater than 0."))
    }
}

pub(crate) fn require_non_negative(value: f64, field: &str) -> Result<(), String> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(format!("{field} cannot be negative."))
    }
}

pub(crate) fn optional_positive(value: Option<f64>, field: &str) -> Result<(), String> {
    value.map_or(Ok(()), |value| require_positive(value, field))
}
