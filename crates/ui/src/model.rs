use gpui::Context;

use crate::ColorValue;

/// A caller-owned color value that a [`crate::ColorInput`] is bound to.
///
/// Hold it in an `Entity<ColorModel>`, every change notifies the observers
/// of that entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorModel {
    value: ColorValue,
}

impl ColorModel {
    pub fn new(value: impl Into<ColorValue>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn value(&self) -> &ColorValue {
        &self.value
    }

    /// Replace the value, returns false if it was already equal.
    pub fn set_value(&mut self, value: impl Into<ColorValue>, cx: &mut Context<Self>) -> bool {
        let value = value.into();
        if self.value == value {
            return false;
        }

        self.value = value;
        cx.notify();
        true
    }
}
