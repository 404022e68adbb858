//! In-memory doubles for the picker backend and the translator.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use anyhow::anyhow;
use async_channel::Receiver;
use futures::future::LocalBoxFuture;
use futures::FutureExt as _;

use crate::{
    ColorValue, LabelKey, LabelSet, Palette, PickedColor, Picker, PickerBackend, PickerConfig,
    PickerEvents, PickerOptions, Translator, Unsupported,
};

/// The options a [`MemoryPickerBackend`] was asked to build a picker with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPicker {
    pub anchor: String,
    pub swatches: Palette,
    pub labels: LabelSet,
    pub config: PickerConfig,
}

#[derive(Default)]
struct BackendState {
    unsupported: Option<String>,
    create_count: usize,
    created: Vec<CreatedPicker>,
    pickers: Vec<MemoryPickerHandle>,
}

/// A picker backend that builds [`MemoryPickerHandle`] controlled pickers,
/// or always fails when made with [`MemoryPickerBackend::unsupported`].
#[derive(Clone, Default)]
pub struct MemoryPickerBackend {
    state: Rc<RefCell<BackendState>>,
}

impl MemoryPickerBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unsupported(reason: impl Into<String>) -> Self {
        let this = Self::default();
        this.state.borrow_mut().unsupported = Some(reason.into());
        this
    }

    /// Number of times `create` was called, failed calls included.
    pub fn create_count(&self) -> usize {
        self.state.borrow().create_count
    }

    pub fn last_options(&self) -> Option<CreatedPicker> {
        self.state.borrow().created.last().cloned()
    }

    /// The most recently built picker.
    pub fn picker(&self) -> Option<MemoryPickerHandle> {
        self.state.borrow().pickers.last().cloned()
    }
}

impl PickerBackend for MemoryPickerBackend {
    fn create(&self, options: PickerOptions) -> Result<Box<dyn Picker>, Unsupported> {
        let mut state = self.state.borrow_mut();
        state.create_count += 1;
        if let Some(reason) = &state.unsupported {
            return Err(Unsupported::new(reason.clone()));
        }

        state.created.push(CreatedPicker {
            anchor: options.anchor,
            swatches: options.swatches,
            labels: options.labels,
            config: options.config,
        });

        let handle = MemoryPickerHandle {
            state: Rc::new(RefCell::new(PickerState {
                events: Some(options.events),
                ..Default::default()
            })),
        };
        state.pickers.push(handle.clone());

        Ok(Box::new(MemoryPicker {
            state: handle.state.clone(),
        }))
    }
}

#[derive(Default)]
struct PickerState {
    events: Option<PickerEvents>,
    colors: Vec<ColorValue>,
    visible: bool,
    hide_count: usize,
}

struct MemoryPicker {
    state: Rc<RefCell<PickerState>>,
}

impl Picker for MemoryPicker {
    fn set_color(&mut self, color: &ColorValue) {
        self.state.borrow_mut().colors.push(color.clone());
    }

    fn hide(&mut self) {
        let mut state = self.state.borrow_mut();
        state.visible = false;
        state.hide_count += 1;
    }
}

impl Drop for MemoryPicker {
    fn drop(&mut self) {
        self.state.borrow_mut().events.take();
    }
}

/// Plays the user's side of a picker built by [`MemoryPickerBackend`].
#[derive(Clone)]
pub struct MemoryPickerHandle {
    state: Rc<RefCell<PickerState>>,
}

impl MemoryPickerHandle {
    fn events(&self) -> Option<PickerEvents> {
        self.state.borrow().events.clone()
    }

    /// Finish setup, showing `color`.
    pub fn ready(&self, color: impl Into<ColorValue>) {
        if let Some(events) = self.events() {
            events.ready(color);
        }
    }

    /// Confirm a selection.
    pub fn save(&self, color: impl PickedColor + 'static) {
        if let Some(events) = self.events() {
            events.saved(color);
        }
    }

    /// Dismiss without confirming.
    pub fn cancel(&self) {
        if let Some(events) = self.events() {
            events.canceled();
        }
    }

    /// Open the popup, as a click on the input would.
    pub fn open(&self) {
        self.state.borrow_mut().visible = true;
    }

    /// Every color pushed through [`Picker::set_color`], in order.
    pub fn colors(&self) -> Vec<ColorValue> {
        self.state.borrow().colors.clone()
    }

    pub fn is_visible(&self) -> bool {
        self.state.borrow().visible
    }

    pub fn hide_count(&self) -> usize {
        self.state.borrow().hide_count
    }

    /// Whether the picker was dropped by its owner.
    pub fn is_dropped(&self) -> bool {
        self.state.borrow().events.is_none()
    }
}

/// A translator with fixed labels that can be told to fail or to wait.
#[derive(Clone)]
pub struct StaticTranslator {
    labels: HashMap<LabelKey, String>,
    failing: Option<LabelKey>,
    gate: Option<Receiver<()>>,
}

impl Default for StaticTranslator {
    fn default() -> Self {
        Self {
            labels: HashMap::from([
                (LabelKey::Save, "Save".to_string()),
                (LabelKey::Cancel, "Cancel".to_string()),
            ]),
            failing: None,
            gate: None,
        }
    }
}

impl StaticTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(mut self, key: LabelKey, text: impl Into<String>) -> Self {
        self.labels.insert(key, text.into());
        self
    }

    /// Reject lookups of `key`.
    pub fn failing(mut self, key: LabelKey) -> Self {
        self.failing = Some(key);
        self
    }

    /// Hold every lookup until the returned sender is closed or dropped.
    pub fn gated(mut self) -> (Self, async_channel::Sender<()>) {
        let (tx, rx) = async_channel::bounded(1);
        self.gate = Some(rx);
        (self, tx)
    }
}

impl Translator for StaticTranslator {
    fn translate(&self, key: LabelKey) -> LocalBoxFuture<'static, anyhow::Result<String>> {
        let gate = self.gate.clone();
        let result = if self.failing == Some(key) {
            Err(anyhow!("no translation for {}", key.as_str()))
        } else {
            self.labels
                .get(&key)
                .cloned()
                .ok_or_else(|| anyhow!("missing label {}", key.as_str()))
        };

        async move {
            if let Some(gate) = gate {
                while gate.recv().await.is_ok() {}
            }
            result
        }
        .boxed_local()
    }
}
