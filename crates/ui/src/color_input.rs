use std::rc::Rc;

use anyhow::Result;
use gpui::{App, Context, Entity, EventEmitter, Subscription, Task};

use crate::{
    ColorModel, ColorValue, Foreground, InitError, LabelSet, Palette, PickerAdapter,
    PickerBackend, PickerConfig, PickerEvent, Translator,
};

/// Where a [`ColorInput`] is in its setup.
#[derive(Debug, Clone)]
pub enum ColorInputState {
    /// Waiting for the button labels.
    Loading,
    /// The picker is built and kept in sync with the model.
    Available,
    /// No picker could be set up, the input is a read-only preview.
    Unavailable(Rc<InitError>),
}

impl ColorInputState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Events emitted by a [`ColorInput`] to its container.
#[derive(Debug, Clone)]
pub enum ColorInputEvent {
    /// The model was set to a color the user saved in the picker.
    ColorChanged(ColorValue),
    /// The picker could not be set up, the payload is the cause.
    PickerUnavailable(Rc<InitError>),
}

/// A snapshot of what the input displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldState {
    pub current_color: ColorValue,
    pub picker_available: bool,
}

/// A color input bound to an `Entity<ColorModel>`.
///
/// Nothing happens until [`ColorInput::start`] is called.
///
/// ```ignore
/// let model = cx.new(|_| ColorModel::new("#112233"));
/// let input = cx.new(|cx| ColorInput::new("color-field", &model, cx).palette(palette));
/// input.update(cx, |input, cx| input.start(&I18nTranslator::new(), backend, cx));
///
/// cx.subscribe(&input, |_, event: &ColorInputEvent, _| {
///     println!("{:?}", event);
/// })
/// .detach();
/// ```
pub struct ColorInput {
    anchor: String,
    model: Entity<ColorModel>,
    palette: Palette,
    config: PickerConfig,
    state: ColorInputState,
    adapter: Option<PickerAdapter>,
    _load_task: Option<Task<()>>,
    _picker_task: Option<Task<()>>,
    _subscriptions: Vec<Subscription>,
}

impl EventEmitter<ColorInputEvent> for ColorInput {}

impl ColorInput {
    /// Create an input attached to the element `anchor`, bound to `model`.
    pub fn new(
        anchor: impl Into<String>,
        model: &Entity<ColorModel>,
        cx: &mut Context<Self>,
    ) -> Self {
        let _subscriptions = vec![cx.observe(model, |this, model, cx| {
            let value = model.read(cx).value().clone();
            if let Some(adapter) = this.adapter.as_mut() {
                adapter.set_color(&value);
            }
        })];

        Self {
            anchor: anchor.into(),
            model: model.clone(),
            palette: Palette::default(),
            config: PickerConfig::default(),
            state: ColorInputState::Loading,
            adapter: None,
            _load_task: None,
            _picker_task: None,
            _subscriptions,
        }
    }

    /// Set the suggested colors, default: empty.
    pub fn palette(mut self, palette: impl Into<Palette>) -> Self {
        self.palette = palette.into();
        self
    }

    /// Set the picker display configuration.
    pub fn config(mut self, config: PickerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn anchor(&self) -> &str {
        &self.anchor
    }

    pub fn model(&self) -> &Entity<ColorModel> {
        &self.model
    }

    pub fn state(&self) -> &ColorInputState {
        &self.state
    }

    pub fn value(&self, cx: &App) -> ColorValue {
        self.model.read(cx).value().clone()
    }

    pub fn field_state(&self, cx: &App) -> FieldState {
        FieldState {
            current_color: self.value(cx),
            picker_available: !self.state.is_unavailable(),
        }
    }

    /// Whether the current color needs light text, see [`crate::is_dark`].
    pub fn is_dark(&self, cx: &App) -> bool {
        self.model.read(cx).value().is_dark()
    }

    pub fn foreground(&self, cx: &App) -> Foreground {
        Foreground::for_background(self.model.read(cx).value())
    }

    /// Set the model on behalf of the caller, the picker follows once ready.
    pub fn set_color(&mut self, color: impl Into<ColorValue>, cx: &mut Context<Self>) -> bool {
        self.model.update(cx, |model, cx| model.set_value(color, cx))
    }

    /// Resolve the labels, then build the picker and keep it in sync with
    /// the model.
    ///
    /// Calling this again while the labels are still loading starts over
    /// with the new `translator` and `backend`. Once the input is available
    /// or unavailable it does nothing, the picker is built at most once.
    pub fn start(
        &mut self,
        translator: &dyn Translator,
        backend: impl PickerBackend + 'static,
        cx: &mut Context<Self>,
    ) {
        if !self.state.is_loading() {
            tracing::warn!("color input `{}` is already set up", self.anchor);
            return;
        }

        let labels = LabelSet::resolve(translator);
        self._load_task = Some(cx.spawn(async move |this, cx| {
            let labels = labels.await;
            _ = this.update(cx, |this, cx| this.build_picker(labels, &backend, cx));
        }));
    }

    fn build_picker(
        &mut self,
        labels: Result<LabelSet>,
        backend: &dyn PickerBackend,
        cx: &mut Context<Self>,
    ) {
        let labels = match labels {
            Ok(labels) => labels,
            Err(err) => return self.fail(InitError::Labels(err), cx),
        };

        let adapter = match PickerAdapter::probe(
            backend,
            self.anchor.clone(),
            self.palette.clone(),
            labels,
            self.config.clone(),
        ) {
            Ok(adapter) => adapter,
            Err(err) => return self.fail(err.into(), cx),
        };

        let events = adapter.events();
        self._picker_task = Some(cx.spawn(async move |this, cx| {
            while let Ok(event) = events.recv().await {
                if this
                    .update(cx, |this, cx| this.on_picker_event(event, cx))
                    .is_err()
                {
                    break;
                }
            }
        }));

        tracing::debug!("color input `{}` picker available", self.anchor);
        self.adapter = Some(adapter);
        self.state = ColorInputState::Available;
        cx.notify();
    }

    fn fail(&mut self, err: InitError, cx: &mut Context<Self>) {
        tracing::warn!("color input `{}` is read-only: {:?}", self.anchor, err);
        let err = Rc::new(err);
        self.state = ColorInputState::Unavailable(err.clone());
        cx.emit(ColorInputEvent::PickerUnavailable(err));
        cx.notify();
    }

    fn on_picker_event(&mut self, event: PickerEvent, cx: &mut Context<Self>) {
        let Some(adapter) = self.adapter.as_mut() else {
            return;
        };

        match event {
            PickerEvent::Ready(initial) => {
                adapter.mark_ready(initial);
                adapter.set_color(self.model.read(cx).value());
            }
            PickerEvent::Saved(color) => match ColorValue::from_picked(color.as_ref()) {
                Some(value) => {
                    adapter.mark_saved(value.clone());

                    // Write once this handler has returned.
                    let this = cx.weak_entity();
                    cx.defer(move |cx| {
                        _ = this.update(cx, |this, cx| this.apply_saved(value, cx));
                    });
                }
                None => tracing::warn!("ignored unparsable saved color: {:?}", color),
            },
            PickerEvent::Canceled => adapter.hide(),
        }
    }

    fn apply_saved(&mut self, value: ColorValue, cx: &mut Context<Self>) {
        let changed = self
            .model
            .update(cx, |model, cx| model.set_value(value.clone(), cx));

        if changed {
            tracing::debug!("color input `{}` changed to {}", self.anchor, value);
            cx.emit(ColorInputEvent::ColorChanged(value));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use gpui::{AppContext as _, TestAppContext};

    use super::*;
    use crate::{
        LabelKey, Rgb,
        test_support::{MemoryPickerBackend, StaticTranslator},
    };

    fn build(cx: &mut TestAppContext, color: &str) -> (Entity<ColorModel>, Entity<ColorInput>) {
        let model = cx.new(|_| ColorModel::new(color));
        let input = cx.new(|cx| ColorInput::new("color-field", &model, cx));
        (model, input)
    }

    fn start(
        input: &Entity<ColorInput>,
        translator: &StaticTranslator,
        backend: &MemoryPickerBackend,
        cx: &mut TestAppContext,
    ) {
        input.update(cx, |input, cx| input.start(translator, backend.clone(), cx));
        cx.run_until_parked();
    }

    fn collect_events(
        input: &Entity<ColorInput>,
        cx: &mut TestAppContext,
    ) -> (Rc<RefCell<Vec<ColorInputEvent>>>, Subscription) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let subscription = cx.update(|cx| {
            let events = events.clone();
            cx.subscribe(input, move |_, event: &ColorInputEvent, _| {
                events.borrow_mut().push(event.clone());
            })
        });
        (events, subscription)
    }

    fn value(model: &Entity<ColorModel>, cx: &TestAppContext) -> ColorValue {
        model.read_with(cx, |model, _| model.value().clone())
    }

    fn state(input: &Entity<ColorInput>, cx: &TestAppContext) -> ColorInputState {
        input.read_with(cx, |input, _| input.state().clone())
    }

    #[gpui::test]
    fn test_loading_until_labels_resolve(cx: &mut TestAppContext) {
        let (_, input) = build(cx, "#112233");
        let (translator, gate) = StaticTranslator::new().gated();
        let backend = MemoryPickerBackend::new();
        start(&input, &translator, &backend, cx);

        assert!(state(&input, cx).is_loading());
        assert!(input.read_with(cx, |input, cx| input.field_state(cx).picker_available));
        assert_eq!(backend.create_count(), 0);

        drop(gate);
        cx.run_until_parked();
        assert!(state(&input, cx).is_available());
        assert_eq!(backend.create_count(), 1);
    }

    #[gpui::test]
    fn test_start_again_while_loading(cx: &mut TestAppContext) {
        let (_, input) = build(cx, "#112233");
        let (stalled, gate) = StaticTranslator::new().gated();
        let backend = MemoryPickerBackend::new();
        start(&input, &stalled, &backend, cx);
        assert!(state(&input, cx).is_loading());

        start(&input, &StaticTranslator::new(), &backend, cx);
        assert!(state(&input, cx).is_available());
        assert_eq!(backend.create_count(), 1);

        // The first lookup was dropped, and later starts are ignored.
        drop(gate);
        start(&input, &StaticTranslator::new(), &backend, cx);
        assert!(state(&input, cx).is_available());
        assert_eq!(backend.create_count(), 1);
    }

    #[gpui::test]
    fn test_saved_color_is_written_after_the_handler(cx: &mut TestAppContext) {
        let (model, input) = build(cx, "#112233");
        let (events, _subscription) = collect_events(&input, cx);
        let backend = MemoryPickerBackend::new();
        start(&input, &StaticTranslator::new(), &backend, cx);

        let picker = backend.picker().unwrap();
        picker.ready("#112233");
        cx.run_until_parked();
        assert!(picker.colors().is_empty());

        input.update(cx, |input, cx| {
            let saved = Box::new(Rgb::new(0xAA, 0xBB, 0xCC));
            input.on_picker_event(PickerEvent::Saved(saved), cx);
            assert_eq!(input.value(cx), ColorValue::from("#112233"));
        });

        assert_eq!(value(&model, cx), ColorValue::from("#AABBCC"));
        let field_state = input.read_with(cx, |input, cx| input.field_state(cx));
        assert_eq!(field_state.current_color, ColorValue::from("#AABBCC"));

        let events = events.borrow();
        assert_eq!(events.len(), 1);
        match &events[0] {
            ColorInputEvent::ColorChanged(color) => {
                assert_eq!(color, &ColorValue::from("#AABBCC"))
            }
            other => panic!("unexpected event: {:?}", other),
        }

        // The saved color is already displayed, so it is not pushed back.
        assert!(picker.colors().is_empty());
    }

    #[gpui::test]
    fn test_saved_color_from_picker(cx: &mut TestAppContext) {
        let (model, input) = build(cx, "#112233");
        let (events, _subscription) = collect_events(&input, cx);
        let backend = MemoryPickerBackend::new();
        start(&input, &StaticTranslator::new(), &backend, cx);

        let picker = backend.picker().unwrap();
        picker.ready("#112233");
        picker.save("#AABBCC".to_string());
        cx.run_until_parked();

        assert_eq!(value(&model, cx), ColorValue::from("#AABBCC"));
        assert_eq!(events.borrow().len(), 1);
        assert!(picker.colors().is_empty());
    }

    #[gpui::test]
    fn test_model_changes_reach_picker_once_ready(cx: &mut TestAppContext) {
        let (model, input) = build(cx, "#112233");
        let (events, _subscription) = collect_events(&input, cx);
        let backend = MemoryPickerBackend::new();
        start(&input, &StaticTranslator::new(), &backend, cx);
        let picker = backend.picker().unwrap();

        assert!(input.update(cx, |input, cx| input.set_color("#445566", cx)));
        cx.run_until_parked();
        assert!(picker.colors().is_empty());

        picker.ready("#42445A");
        cx.run_until_parked();
        assert_eq!(picker.colors(), vec![ColorValue::from("#445566")]);

        model.update(cx, |model, cx| model.set_value("#778899", cx));
        model.update(cx, |model, cx| model.set_value("not a color", cx));
        cx.run_until_parked();
        assert_eq!(
            picker.colors(),
            vec![ColorValue::from("#445566"), ColorValue::from("#778899")]
        );

        // Pushing colors into the picker never writes back to the model.
        assert_eq!(value(&model, cx), ColorValue::from("not a color"));
        assert!(events.borrow().is_empty());
    }

    #[gpui::test]
    fn test_set_color_with_current_value_is_a_no_op(cx: &mut TestAppContext) {
        let (model, input) = build(cx, "#112233");
        let (events, _subscription) = collect_events(&input, cx);
        let backend = MemoryPickerBackend::new();
        start(&input, &StaticTranslator::new(), &backend, cx);

        let picker = backend.picker().unwrap();
        picker.ready("#112233");
        cx.run_until_parked();

        assert!(!input.update(cx, |input, cx| input.set_color("#112233", cx)));
        assert!(!input.update(cx, |input, cx| input.set_color("#112233", cx)));
        cx.run_until_parked();
        assert!(picker.colors().is_empty());
        assert!(events.borrow().is_empty());
        assert_eq!(value(&model, cx), ColorValue::from("#112233"));
    }

    #[gpui::test]
    fn test_unsupported_picker_falls_back_to_preview(cx: &mut TestAppContext) {
        let (model, input) = build(cx, "#112233");
        let (events, _subscription) = collect_events(&input, cx);
        let backend = MemoryPickerBackend::unsupported("no canvas");
        start(&input, &StaticTranslator::new(), &backend, cx);

        match state(&input, cx) {
            ColorInputState::Unavailable(err) => {
                assert!(matches!(&*err, InitError::Unsupported(err) if err.reason == "no canvas"))
            }
            other => panic!("unexpected state: {:?}", other),
        }
        assert_eq!(
            input.read_with(cx, |input, cx| input.field_state(cx)),
            FieldState {
                current_color: ColorValue::from("#112233"),
                picker_available: false,
            }
        );

        {
            let events = events.borrow();
            assert_eq!(events.len(), 1);
            match &events[0] {
                ColorInputEvent::PickerUnavailable(err) => {
                    assert_eq!(err.to_string(), "color picker is not supported: no canvas")
                }
                other => panic!("unexpected event: {:?}", other),
            }
        }

        // External writes stay as they are, the input never writes again.
        model.update(cx, |model, cx| model.set_value("#000000", cx));
        cx.run_until_parked();
        assert_eq!(value(&model, cx), ColorValue::from("#000000"));
        assert!(input.read_with(cx, |input, cx| input.is_dark(cx)));
        assert_eq!(events.borrow().len(), 1);

        // The probe is never retried.
        start(&input, &StaticTranslator::new(), &backend, cx);
        assert_eq!(backend.create_count(), 1);
        assert!(state(&input, cx).is_unavailable());
        assert_eq!(events.borrow().len(), 1);
    }

    #[gpui::test]
    fn test_label_failure_falls_back_to_preview(cx: &mut TestAppContext) {
        let (model, input) = build(cx, "#112233");
        let (events, _subscription) = collect_events(&input, cx);
        let backend = MemoryPickerBackend::new();
        start(&input, &StaticTranslator::new().failing(LabelKey::Save), &backend, cx);

        assert_eq!(backend.create_count(), 0);
        match state(&input, cx) {
            ColorInputState::Unavailable(err) => assert!(matches!(&*err, InitError::Labels(_))),
            other => panic!("unexpected state: {:?}", other),
        }
        assert_eq!(events.borrow().len(), 1);
        assert!(matches!(
            events.borrow()[0],
            ColorInputEvent::PickerUnavailable(_)
        ));
        assert_eq!(value(&model, cx), ColorValue::from("#112233"));
    }

    #[gpui::test]
    fn test_cancel_only_hides_picker(cx: &mut TestAppContext) {
        let (model, input) = build(cx, "#112233");
        let (events, _subscription) = collect_events(&input, cx);
        let backend = MemoryPickerBackend::new();
        start(&input, &StaticTranslator::new(), &backend, cx);

        let picker = backend.picker().unwrap();
        picker.ready("#112233");
        picker.open();
        picker.cancel();
        cx.run_until_parked();

        assert!(!picker.is_visible());
        assert_eq!(picker.hide_count(), 1);
        assert!(state(&input, cx).is_available());
        assert_eq!(value(&model, cx), ColorValue::from("#112233"));
        assert!(events.borrow().is_empty());
    }

    #[gpui::test]
    fn test_unparsable_saved_color_is_ignored(cx: &mut TestAppContext) {
        let (model, input) = build(cx, "#112233");
        let (events, _subscription) = collect_events(&input, cx);
        let backend = MemoryPickerBackend::new();
        start(&input, &StaticTranslator::new(), &backend, cx);

        let picker = backend.picker().unwrap();
        picker.ready("#112233");
        picker.save("transparent".to_string());
        picker.save("#aabbccff".to_string());
        cx.run_until_parked();

        assert_eq!(value(&model, cx), ColorValue::from("#AABBCC"));
        assert_eq!(events.borrow().len(), 1);
        assert!(matches!(
            events.borrow()[0],
            ColorInputEvent::ColorChanged(_)
        ));
    }

    #[gpui::test]
    fn test_picker_options(cx: &mut TestAppContext) {
        let palette = Palette::new().color("#FF0000").color("#00FF00");
        let config = PickerConfig {
            app_class: "settings-color".into(),
            ..Default::default()
        };
        let model = cx.new(|_| ColorModel::default());
        let input = cx.new(|cx| {
            ColorInput::new("color-field", &model, cx)
                .palette(palette.clone())
                .config(config.clone())
        });
        let backend = MemoryPickerBackend::new();
        let translator = StaticTranslator::new().label(LabelKey::Cancel, "Close");
        start(&input, &translator, &backend, cx);

        let options = backend.last_options().unwrap();
        assert_eq!(options.anchor, "color-field");
        assert_eq!(options.swatches, palette);
        assert_eq!(options.config, config);
        assert_eq!(
            options.labels,
            LabelSet {
                save: "Save".into(),
                cancel: "Close".into(),
            }
        );
        input.read_with(cx, |input, cx| {
            assert!(!input.is_dark(cx));
            assert_eq!(input.foreground(cx), Foreground::Dark);
        });
    }

    #[gpui::test]
    fn test_releasing_the_input_drops_the_picker(cx: &mut TestAppContext) {
        let (model, input) = build(cx, "#112233");
        let backend = MemoryPickerBackend::new();
        start(&input, &StaticTranslator::new(), &backend, cx);

        let picker = backend.picker().unwrap();
        assert!(!picker.is_dropped());

        drop(input);
        cx.update(|_| {});
        cx.run_until_parked();
        assert!(picker.is_dropped());
        assert_eq!(value(&model, cx), ColorValue::from("#112233"));
    }
}
