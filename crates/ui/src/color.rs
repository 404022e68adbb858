use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

static HEX_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#([0-9a-fA-F]{2})([0-9a-fA-F]{2})([0-9a-fA-F]{2})$")
        .expect("hex color pattern is valid")
});

/// Luminance at or below which white text reads better than black.
///
/// This is 0.6 scaled from the 0-1 range to the 0-255 component range.
const DARK_LUMINANCE_THRESHOLD: f64 = 153.0;

/// A color as held by the input, in `#RRGGBB` notation.
///
/// The value is not validated on construction. Anything that does not match
/// the 6-digit hex pattern (including no value at all) is treated as "no
/// color" by everything that reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ColorValue(Option<String>);

impl ColorValue {
    /// An absent color.
    pub const fn none() -> Self {
        Self(None)
    }

    pub fn new(value: impl Into<String>) -> Self {
        Self(Some(value.into()))
    }

    /// The raw string, valid or not.
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Parse the value into components, `None` if it is not `#RRGGBB`.
    pub fn rgb(&self) -> Option<Rgb> {
        self.as_str().and_then(Rgb::parse)
    }

    pub fn is_valid(&self) -> bool {
        self.rgb().is_some()
    }

    /// See [`is_dark`].
    pub fn is_dark(&self) -> bool {
        is_dark(self)
    }

    /// Normalize a color reported by the picker into `#RRGGBB`.
    ///
    /// Pickers may report 8-digit `#RRGGBBAA` strings or lowercase digits, the
    /// alpha channel is dropped since opacity is locked. Returns `None` for
    /// anything that still does not parse.
    pub fn from_picked(color: &dyn PickedColor) -> Option<Self> {
        let hex = color.to_hex_string();
        let hex = hex.trim();
        let hex = match hex.len() {
            9 if hex.starts_with('#') && hex.is_ascii() => &hex[..7],
            _ => hex,
        };

        Rgb::parse(hex).map(Self::from)
    }
}

impl fmt::Display for ColorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str().unwrap_or_default())
    }
}

impl From<&str> for ColorValue {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ColorValue {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<Option<String>> for ColorValue {
    fn from(value: Option<String>) -> Self {
        Self(value)
    }
}

impl From<Rgb> for ColorValue {
    fn from(rgb: Rgb) -> Self {
        Self::new(rgb.to_hex_string())
    }
}

/// An RGB color with 8-bit components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#RRGGBB` string, either case.
    pub fn parse(input: &str) -> Option<Self> {
        let caps = HEX_PATTERN.captures(input)?;
        let channel = |ix: usize| u8::from_str_radix(&caps[ix], 16).ok();

        Some(Self {
            r: channel(1)?,
            g: channel(2)?,
            b: channel(3)?,
        })
    }

    /// Format as uppercase `#RRGGBB`.
    pub fn to_hex_string(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Relative luminance on the 0-255 scale, using the W3C weights.
    pub fn luminance(&self) -> f64 {
        0.2126 * self.r as f64 + 0.7152 * self.g as f64 + 0.0722 * self.b as f64
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex_string())
    }
}

/// A color reported by the picker when the user saves a selection.
pub trait PickedColor: fmt::Debug {
    /// The color in hex notation, `#RRGGBB` or `#RRGGBBAA`.
    fn to_hex_string(&self) -> String;
}

impl PickedColor for Rgb {
    fn to_hex_string(&self) -> String {
        Rgb::to_hex_string(self)
    }
}

impl PickedColor for String {
    fn to_hex_string(&self) -> String {
        self.clone()
    }
}

/// Returns true if white text has better contrast than black text over
/// `color`.
///
/// Colors that are not `#RRGGBB` are never dark, so callers fall back to
/// dark text.
pub fn is_dark(color: &ColorValue) -> bool {
    match color.rgb() {
        Some(rgb) => rgb.luminance() <= DARK_LUMINANCE_THRESHOLD,
        None => false,
    }
}

/// Foreground text color to draw over a swatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Foreground {
    Light,
    Dark,
}

impl Foreground {
    pub fn for_background(color: &ColorValue) -> Self {
        if is_dark(color) {
            Self::Light
        } else {
            Self::Dark
        }
    }

    pub fn hex(&self) -> &'static str {
        match self {
            Self::Light => "#FFFFFF",
            Self::Dark => "#000000",
        }
    }
}
