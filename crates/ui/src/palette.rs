use std::ops::Deref;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ColorValue;

/// Suggested colors shown as swatches by the picker.
///
/// Order is preserved and duplicates are kept as given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Palette(Vec<ColorValue>);

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a swatch.
    pub fn color(mut self, color: impl Into<ColorValue>) -> Self {
        self.0.push(color.into());
        self
    }
}

impl Deref for Palette {
    type Target = [ColorValue];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<C: Into<ColorValue>> FromIterator<C> for Palette {
    fn from_iter<T: IntoIterator<Item = C>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl From<Option<Palette>> for Palette {
    fn from(palette: Option<Palette>) -> Self {
        palette.unwrap_or_default()
    }
}
