//! Colors, text styles and container styles for form fields
//!
//! Every style property is optional. Styles are layered: the form's base
//! style first, then the owner's override, property by property.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CardFormError;

/// RGBA color
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let b = (hex & 0xFF) as f32 / 255.0;
        Self::rgb(r, g, b)
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.a = alpha;
        self
    }

    /// Parse `#rgb`, `#rrggbb`, `#rrggbbaa` or a CSS color name
    pub fn parse(input: &str) -> Result<Self, CardFormError> {
        let s = input.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return Self::parse_hex(hex).ok_or_else(|| invalid_color(input));
        }

        let named = match s.to_ascii_lowercase().as_str() {
            "black" => 0x000000,
            "white" => 0xffffff,
            "red" => 0xff0000,
            "green" => 0x008000,
            "blue" => 0x0000ff,
            "gray" | "grey" => 0x808080,
            "lightgray" | "lightgrey" => 0xd3d3d3,
            "darkgray" | "darkgrey" => 0xa9a9a9,
            "orange" => 0xffa500,
            "transparent" => return Ok(Self::TRANSPARENT),
            _ => return Err(invalid_color(input)),
        };
        Ok(Self::from_hex(named))
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match hex.len() {
            3 => {
                let v = u32::from_str_radix(hex, 16).ok()?;
                let (r, g, b) = ((v >> 8) & 0xF, (v >> 4) & 0xF, v & 0xF);
                Some(Self::from_hex((r * 17) << 16 | (g * 17) << 8 | (b * 17)))
            }
            6 => u32::from_str_radix(hex, 16).ok().map(Self::from_hex),
            8 => {
                let v = u32::from_str_radix(hex, 16).ok()?;
                Some(Self::from_hex(v >> 8).with_alpha((v & 0xFF) as f32 / 255.0))
            }
            _ => None,
        }
    }

    /// Hex form, alpha included only when not opaque
    pub fn to_hex(&self) -> String {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        if channel(self.a) == 255 {
            format!(
                "#{:02x}{:02x}{:02x}",
                channel(self.r),
                channel(self.g),
                channel(self.b)
            )
        } else {
            format!(
                "#{:02x}{:02x}{:02x}{:02x}",
                channel(self.r),
                channel(self.g),
                channel(self.b),
                channel(self.a)
            )
        }
    }
}

fn invalid_color(input: &str) -> CardFormError {
    CardFormError::Config(format!("invalid color '{}'", input))
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for Color {
    type Error = CardFormError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Deserialize an optional color where the empty string means "unset"
pub(crate) fn optional_color<'de, D>(deserializer: D) -> Result<Option<Color>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => Color::parse(s).map(Some).map_err(serde::de::Error::custom),
    }
}

/// Colors shared by every field
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormTheme {
    /// Text color for valid input (unset keeps the editor's own color)
    #[serde(deserialize_with = "optional_color")]
    pub valid_color: Option<Color>,
    /// Text color for invalid input
    #[serde(deserialize_with = "optional_color")]
    pub invalid_color: Option<Color>,
    /// Placeholder text color
    #[serde(deserialize_with = "optional_color")]
    pub placeholder_color: Option<Color>,
}

impl Default for FormTheme {
    fn default() -> Self {
        Self {
            valid_color: None,
            invalid_color: Some(Color::RED),
            placeholder_color: Some(Color::from_hex(0x808080)),
        }
    }
}

/// Text style for labels and inputs
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    pub font_size: Option<f32>,
    pub font_family: Option<String>,
    pub line_height: Option<f32>,
    pub height: Option<f32>,
    pub padding_left: Option<f32>,
    pub padding_right: Option<f32>,
    #[serde(deserialize_with = "optional_color")]
    pub color: Option<Color>,
}

impl TextStyle {
    /// Layer `over` on top of this style
    pub fn merged(&self, over: &TextStyle) -> TextStyle {
        TextStyle {
            font_size: over.font_size.or(self.font_size),
            font_family: over.font_family.clone().or_else(|| self.font_family.clone()),
            line_height: over.line_height.or(self.line_height),
            height: over.height.or(self.height),
            padding_left: over.padding_left.or(self.padding_left),
            padding_right: over.padding_right.or(self.padding_right),
            color: over.color.or(self.color),
        }
    }

    /// Base label style
    pub fn label() -> Self {
        Self {
            font_size: Some(17.0),
            line_height: Some(40.0),
            padding_left: Some(10.0),
            padding_right: Some(10.0),
            ..Default::default()
        }
    }

    /// Base input style
    pub fn input() -> Self {
        Self {
            height: Some(40.0),
            padding_left: Some(10.0),
            padding_right: Some(10.0),
            ..Default::default()
        }
    }
}

/// Style of the row that holds a label and its input
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerStyle {
    pub width: Option<f32>,
    pub border_top_width: Option<f32>,
    pub border_bottom_width: Option<f32>,
    #[serde(deserialize_with = "optional_color")]
    pub border_color: Option<Color>,
    #[serde(deserialize_with = "optional_color")]
    pub background: Option<Color>,
}

impl ContainerStyle {
    /// Layer `over` on top of this style
    pub fn merged(&self, over: &ContainerStyle) -> ContainerStyle {
        ContainerStyle {
            width: over.width.or(self.width),
            border_top_width: over.border_top_width.or(self.border_top_width),
            border_bottom_width: over.border_bottom_width.or(self.border_bottom_width),
            border_color: over.border_color.or(self.border_color),
            background: over.background.or(self.background),
        }
    }

    /// Base row style: a hairline under every row
    pub fn row(width: Option<f32>) -> Self {
        Self {
            width,
            border_bottom_width: Some(1.0),
            border_color: Some(Color::from_hex(0xe3e3e3)),
            ..Default::default()
        }
    }

    /// Base style for the first row, which also has a top hairline
    pub fn first_row(width: Option<f32>) -> Self {
        Self {
            border_top_width: Some(1.0),
            ..Self::row(width)
        }
    }
}
