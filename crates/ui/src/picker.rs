use async_channel::{Receiver, Sender};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{ColorValue, LabelSet, Palette, PickedColor, Unsupported};

/// The visual theme of the picker popup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PickerTheme {
    Classic,
    /// Between `Nano` (not available on every platform) and `Classic` (too big).
    #[default]
    Monolith,
    Nano,
}

/// How the picker displays color details.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Representation {
    #[default]
    Hex,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct InteractionConfig {
    /// Show the text color input field.
    pub input: bool,
    pub save: bool,
    pub cancel: bool,
    pub clear: bool,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            input: true,
            save: true,
            cancel: true,
            clear: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ComponentsConfig {
    pub preview: bool,
    pub hue: bool,
    pub interaction: InteractionConfig,
}

impl Default for ComponentsConfig {
    fn default() -> Self {
        Self {
            preview: true,
            hue: true,
            interaction: InteractionConfig::default(),
        }
    }
}

/// Display configuration passed to the picker backend.
///
/// Every field is optional in JSON, missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct PickerConfig {
    /// Extra class applied to the popup for styling.
    pub app_class: String,
    pub theme: PickerTheme,
    pub default_representation: Representation,
    /// Hide the opacity controls, default: true
    pub lock_opacity: bool,
    /// Use the input element itself as the button that opens the picker.
    pub use_as_button: bool,
    pub append_to_body: bool,
    pub components: ComponentsConfig,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            app_class: "guac-input-color-picker".into(),
            theme: PickerTheme::default(),
            default_representation: Representation::default(),
            lock_opacity: true,
            use_as_button: true,
            append_to_body: true,
            components: ComponentsConfig::default(),
        }
    }
}

impl PickerConfig {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// The JSON schema of the configuration file.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(PickerConfig)
    }
}

/// Events reported by a picker widget.
#[derive(Debug)]
pub enum PickerEvent {
    /// The widget finished its setup, showing the given color.
    Ready(ColorValue),
    /// The user confirmed a selection.
    Saved(Box<dyn PickedColor>),
    /// The user dismissed the widget without confirming.
    Canceled,
}

/// The sink through which a picker widget reports [`PickerEvent`]s.
#[derive(Debug, Clone)]
pub struct PickerEvents {
    tx: Sender<PickerEvent>,
}

impl PickerEvents {
    pub fn ready(&self, color: impl Into<ColorValue>) {
        self.send(PickerEvent::Ready(color.into()));
    }

    pub fn saved(&self, color: impl PickedColor + 'static) {
        self.send(PickerEvent::Saved(Box::new(color)));
    }

    pub fn canceled(&self) {
        self.send(PickerEvent::Canceled);
    }

    fn send(&self, event: PickerEvent) {
        if let Err(err) = self.tx.try_send(event) {
            tracing::debug!("color input is gone, dropped picker event: {:?}", err.into_inner());
        }
    }
}

/// Everything a backend needs to build a picker.
#[derive(Debug, Clone)]
pub struct PickerOptions {
    /// Opaque id of the element the picker attaches to.
    pub anchor: String,
    pub swatches: Palette,
    pub labels: LabelSet,
    pub config: PickerConfig,
    pub events: PickerEvents,
}

/// Commands accepted by a constructed picker widget.
pub trait Picker {
    /// Display `color` in the widget. Must not report [`PickerEvent::Saved`].
    fn set_color(&mut self, color: &ColorValue);
    fn hide(&mut self);
}

/// Builds picker widgets, failing when the environment cannot host one.
pub trait PickerBackend {
    fn create(&self, options: PickerOptions) -> Result<Box<dyn Picker>, Unsupported>;
}

/// A constructed picker together with the events it reports.
pub struct PickerAdapter {
    picker: Box<dyn Picker>,
    events: Receiver<PickerEvent>,
    ready: bool,
    displayed: ColorValue,
}

impl PickerAdapter {
    /// Try to build a picker, the result tells whether one is available at all.
    pub fn probe(
        backend: &dyn PickerBackend,
        anchor: impl Into<String>,
        swatches: Palette,
        labels: LabelSet,
        config: PickerConfig,
    ) -> Result<Self, Unsupported> {
        let (tx, rx) = async_channel::unbounded();
        let picker = backend.create(PickerOptions {
            anchor: anchor.into(),
            swatches,
            labels,
            config,
            events: PickerEvents { tx },
        })?;

        Ok(Self {
            picker,
            events: rx,
            ready: false,
            displayed: ColorValue::none(),
        })
    }

    /// The events reported by the picker, closed once the picker is dropped.
    pub fn events(&self) -> Receiver<PickerEvent> {
        self.events.clone()
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// The color the widget is known to display.
    pub fn displayed(&self) -> &ColorValue {
        &self.displayed
    }

    pub(crate) fn mark_ready(&mut self, initial: ColorValue) {
        self.ready = true;
        self.displayed = initial;
    }

    /// Record a color the widget reported as saved.
    pub(crate) fn mark_saved(&mut self, color: ColorValue) {
        self.displayed = color;
    }

    /// Push `color` into the widget.
    ///
    /// Returns false, without touching the widget, before it is ready, when
    /// the color is not `#RRGGBB`, or when the widget already shows it in
    /// any letter case.
    pub fn set_color(&mut self, color: &ColorValue) -> bool {
        if !self.ready || !color.is_valid() || color.rgb() == self.displayed.rgb() {
            return false;
        }

        self.picker.set_color(color);
        self.displayed = color.clone();
        true
    }

    pub fn hide(&mut self) {
        self.picker.hide();
    }
}
