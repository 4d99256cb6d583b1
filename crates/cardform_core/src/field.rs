//! Field identifiers and per-field state
//!
//! A card form is made of at most five fields. Their order is fixed and their
//! string forms match the keys owners use in configuration files.

use std::fmt;
use std::str::FromStr;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::CardFormError;

/// Current text of each field, as held by the owner
pub type FieldValues = FxHashMap<FieldId, String>;

/// Current validity of each field, as held by the owner
pub type FieldStatuses = FxHashMap<FieldId, FieldStatus>;

/// Identifier of one editable payment-form field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldId {
    /// Card number
    Number,
    /// Expiry date (MM/YY)
    Expiry,
    /// Card verification code
    Cvc,
    /// Cardholder name
    Name,
    /// Billing postal code
    PostalCode,
}

impl FieldId {
    /// Every field, in form order
    pub const ALL: [FieldId; 5] = [
        FieldId::Number,
        FieldId::Expiry,
        FieldId::Cvc,
        FieldId::Name,
        FieldId::PostalCode,
    ];

    /// The key used for this field in configuration maps
    pub const fn as_str(self) -> &'static str {
        match self {
            FieldId::Number => "number",
            FieldId::Expiry => "expiry",
            FieldId::Cvc => "cvc",
            FieldId::Name => "name",
            FieldId::PostalCode => "postalCode",
        }
    }

    /// Whether this field only exists when a requirement flag asks for it
    pub const fn is_optional(self) -> bool {
        matches!(self, FieldId::Cvc | FieldId::Name | FieldId::PostalCode)
    }

    /// Keyboard the editor for this field should bring up
    pub const fn keyboard(self) -> KeyboardKind {
        match self {
            FieldId::Name => KeyboardKind::Default,
            _ => KeyboardKind::Numeric,
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldId {
    type Err = CardFormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldId::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| CardFormError::UnknownField(s.to_string()))
    }
}

/// Validity reported by a field editor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldStatus {
    Valid,
    Invalid,
    /// Not enough input yet to decide
    #[default]
    Incomplete,
}

/// Keyboard layout requested from the platform when a field is focused
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyboardKind {
    /// Full text keyboard
    Default,
    /// Digits only
    #[default]
    Numeric,
}

/// Snapshot of one field as held by the owning state container
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldState {
    pub value: String,
    pub status: FieldStatus,
    pub label: String,
    pub placeholder: String,
}
