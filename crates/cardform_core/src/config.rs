//! Form configuration supplied by the embedding application
//!
//! All settings are optional. Defaults use a fixed Spanish locale for labels
//! and placeholders. Supplying a `labels` or `placeholders` table replaces the
//! default table as a whole; fields missing from it render without text.
//!
//! # Example
//!
//! ```rust
//! use cardform_core::config::FormConfig;
//! use cardform_core::FieldId;
//!
//! let config = FormConfig::from_toml_str(
//!     r##"
//!     invalid_color = "#d0021b"
//!
//!     [labels]
//!     number = "Card number"
//!     "##,
//! )
//! .unwrap();
//!
//! assert_eq!(config.label(FieldId::Number), Some("Card number"));
//! assert_eq!(config.label(FieldId::Expiry), None);
//! ```

use std::path::Path;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{CardFormError, Result};
use crate::field::FieldId;
use crate::theme::{optional_color, Color, ContainerStyle, FormTheme, TextStyle};

/// Per-field text table (labels or placeholders)
pub type FieldText = FxHashMap<FieldId, String>;

/// Presentation settings forwarded to the card preview
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardViewConfig {
    /// Scale factor applied to the card face
    pub scale: f32,
    pub font_family: Option<String>,
    /// Image resource for the front face
    pub image_front: Option<String>,
    /// Image resource for the back face
    pub image_back: Option<String>,
}

impl Default for CardViewConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            font_family: None,
            image_front: None,
            image_back: None,
        }
    }
}

/// Static configuration for a card form
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    pub labels: FieldText,
    pub placeholders: FieldText,

    #[serde(deserialize_with = "optional_color")]
    pub valid_color: Option<Color>,
    #[serde(deserialize_with = "optional_color")]
    pub invalid_color: Option<Color>,
    #[serde(deserialize_with = "optional_color")]
    pub placeholder_color: Option<Color>,

    /// Overrides layered over the base label style
    pub label_style: TextStyle,
    /// Overrides layered over the base input style
    pub input_style: TextStyle,
    /// Overrides layered over the base row style
    pub input_container_style: ContainerStyle,

    /// Width of every field row; unset fills the scroll surface
    pub field_width: Option<f32>,

    pub card: CardViewConfig,
}

impl Default for FormConfig {
    fn default() -> Self {
        let theme = FormTheme::default();
        Self {
            labels: default_labels(),
            placeholders: default_placeholders(),
            valid_color: theme.valid_color,
            invalid_color: theme.invalid_color,
            placeholder_color: theme.placeholder_color,
            label_style: TextStyle::default(),
            input_style: TextStyle::default(),
            input_container_style: ContainerStyle::default(),
            field_width: None,
            card: CardViewConfig::default(),
        }
    }
}

impl FormConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: FormConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CardFormError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("loaded card form config from {}", path.display());
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<()> {
        if let Some(width) = self.field_width {
            if !(width.is_finite() && width > 0.0) {
                return Err(CardFormError::Config(format!(
                    "field_width must be positive, got {}",
                    width
                )));
            }
        }
        if !(self.card.scale.is_finite() && self.card.scale > 0.0) {
            return Err(CardFormError::Config(format!(
                "card.scale must be positive, got {}",
                self.card.scale
            )));
        }
        Ok(())
    }

    /// The theme colors as one value
    pub fn theme(&self) -> FormTheme {
        FormTheme {
            valid_color: self.valid_color,
            invalid_color: self.invalid_color,
            placeholder_color: self.placeholder_color,
        }
    }

    pub fn label(&self, field: FieldId) -> Option<&str> {
        self.labels.get(&field).map(String::as_str)
    }

    pub fn placeholder(&self, field: FieldId) -> Option<&str> {
        self.placeholders.get(&field).map(String::as_str)
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = (FieldId, S)>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(|(f, s)| (f, s.into())).collect();
        self
    }

    pub fn with_placeholders<I, S>(mut self, placeholders: I) -> Self
    where
        I: IntoIterator<Item = (FieldId, S)>,
        S: Into<String>,
    {
        self.placeholders = placeholders
            .into_iter()
            .map(|(f, s)| (f, s.into()))
            .collect();
        self
    }

    pub fn with_theme(mut self, theme: FormTheme) -> Self {
        self.valid_color = theme.valid_color;
        self.invalid_color = theme.invalid_color;
        self.placeholder_color = theme.placeholder_color;
        self
    }
}

fn default_labels() -> FieldText {
    [
        (FieldId::Name, "Nombre"),
        (FieldId::Number, "Número de tarjeta"),
        (FieldId::Expiry, "Expiración"),
        (FieldId::Cvc, "CVC"),
        (FieldId::PostalCode, "Código postal"),
    ]
    .into_iter()
    .map(|(f, s)| (f, s.to_string()))
    .collect()
}

fn default_placeholders() -> FieldText {
    [
        (FieldId::Name, "Nombre del tarjetahabiente"),
        (FieldId::Number, "**** **** **** ****"),
        (FieldId::Expiry, "MM/AA"),
        (FieldId::Cvc, "CVC"),
        (FieldId::PostalCode, "0000"),
    ]
    .into_iter()
    .map(|(f, s)| (f, s.to_string()))
    .collect()
}
