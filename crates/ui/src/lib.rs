//! A color input field that drives an external color picker widget.
//!
//! The [`ColorInput`] control resolves its button labels, probes the picker
//! backend once, and then keeps a caller-owned [`ColorModel`] in sync with
//! the widget. When the backend cannot build a picker the control becomes a
//! read-only preview and reports [`ColorInputEvent::PickerUnavailable`].

mod color;
mod color_input;
mod error;
mod labels;
mod model;
mod palette;
mod picker;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use color::*;
pub use color_input::*;
pub use error::*;
pub use labels::*;
pub use model::*;
pub use palette::*;
pub use picker::*;

rust_i18n::i18n!("locales", fallback = "en");

/// Set the locale used by [`I18nTranslator`] when none is given explicitly.
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}
