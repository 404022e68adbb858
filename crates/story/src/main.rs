use std::{cell::RefCell, rc::Rc, time::Duration};

use anyhow::{Context as _, Result};
use color_input::{
    ColorInput, ColorInputEvent, ColorModel, ColorValue, I18nTranslator, Palette, Picker,
    PickerBackend, PickerConfig, PickerEvents, PickerOptions, Rgb, Unsupported,
};
use gpui::{App, AppContext as _, AsyncApp, Entity};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

const PALETTE: [&str; 6] = ["#000000", "#FFFFFF", "#880000", "#008800", "#000088", "#F5D547"];

/// A picker that only logs the commands it receives.
struct ConsolePicker {
    anchor: String,
}

impl Picker for ConsolePicker {
    fn set_color(&mut self, color: &ColorValue) {
        tracing::info!("[{}] picker shows {}", self.anchor, color);
    }

    fn hide(&mut self) {
        tracing::info!("[{}] picker hidden", self.anchor);
    }
}

/// Builds [`ConsolePicker`]s and keeps their event sink so the story can
/// play the user.
#[derive(Clone)]
struct ConsoleBackend {
    supported: bool,
    events: Rc<RefCell<Option<PickerEvents>>>,
}

impl ConsoleBackend {
    fn new(supported: bool) -> Self {
        Self {
            supported,
            events: Rc::default(),
        }
    }

    fn events(&self) -> Option<PickerEvents> {
        self.events.borrow().clone()
    }
}

impl PickerBackend for ConsoleBackend {
    fn create(&self, options: PickerOptions) -> Result<Box<dyn Picker>, Unsupported> {
        if !self.supported {
            return Err(Unsupported::new("no display available"));
        }

        tracing::info!(
            "[{}] picker created: theme {:?}, {} swatches, buttons {:?}/{:?}",
            options.anchor,
            options.config.theme,
            options.swatches.len(),
            options.labels.save,
            options.labels.cancel,
        );
        self.events.replace(Some(options.events));
        Ok(Box::new(ConsolePicker {
            anchor: options.anchor,
        }))
    }
}

fn build_input(
    anchor: &str,
    initial: ColorValue,
    palette: Palette,
    config: PickerConfig,
    cx: &mut App,
) -> Entity<ColorInput> {
    let model = cx.new(|_| ColorModel::new(initial));
    let input = cx.new(|cx| {
        ColorInput::new(anchor, &model, cx)
            .palette(palette)
            .config(config)
    });

    cx.subscribe(&input, |input, event: &ColorInputEvent, cx| {
        let anchor = input.read(cx).anchor();
        match event {
            ColorInputEvent::ColorChanged(color) => {
                tracing::info!("[{}] color changed to {}", anchor, color)
            }
            ColorInputEvent::PickerUnavailable(err) => {
                tracing::warn!("[{}] showing a read-only swatch: {}", anchor, err)
            }
        }
    })
    .detach();

    input
}

fn report(input: &Entity<ColorInput>, cx: &App) {
    let input = input.read(cx);
    let state = input.field_state(cx);
    tracing::info!(
        "[{}] {} with {:?} text, picker available: {}",
        input.anchor(),
        state.current_color,
        input.foreground(cx),
        state.picker_available,
    );
}

/// Give the input a moment to handle what the picker reported.
async fn settle(input: &Entity<ColorInput>, cx: &mut AsyncApp) {
    cx.background_executor()
        .timer(Duration::from_millis(50))
        .await;
    _ = cx.update(|cx| report(input, cx));
}

fn load_config(path: &str) -> Result<PickerConfig> {
    let json = std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
    PickerConfig::from_json(&json).with_context(|| format!("invalid picker config {path}"))
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,color_input=debug")),
        )
        .init();

    // Parse `cargo run -- [<color> | --schema] [<config.json>]`
    let first = std::env::args().nth(1);
    if first.as_deref() == Some("--schema") {
        println!("{}", serde_json::to_string_pretty(&PickerConfig::json_schema())?);
        return Ok(());
    }

    let initial = ColorValue::from(first.unwrap_or_else(|| "#112233".to_string()));
    let config = match std::env::args().nth(2) {
        Some(path) => load_config(&path)?,
        None => PickerConfig::default(),
    };
    if let Ok(locale) = std::env::var("COLOR_INPUT_LOCALE") {
        color_input::set_locale(&locale);
    }

    let app = gpui_platform::application();
    app.run(move |cx| {
        let palette: Palette = PALETTE.into_iter().collect();
        let translator = I18nTranslator::new();

        // A picker that works.
        let backend = ConsoleBackend::new(true);
        let input = build_input(
            "settings-color",
            initial.clone(),
            palette.clone(),
            config.clone(),
            cx,
        );
        input.update(cx, |input, cx| input.start(&translator, backend.clone(), cx));

        // A picker that cannot be built.
        let fallback = build_input("legacy-color", initial, palette, config, cx);
        fallback.update(cx, |input, cx| {
            input.start(&translator, ConsoleBackend::new(false), cx)
        });

        cx.spawn(async move |cx| {
            settle(&input, cx).await;
            settle(&fallback, cx).await;

            match backend.events() {
                Some(picker) => {
                    picker.ready(ColorValue::none());
                    settle(&input, cx).await;

                    picker.saved(Rgb::new(0xF5, 0xD5, 0x47));
                    settle(&input, cx).await;

                    picker.canceled();
                    settle(&input, cx).await;

                    _ = input.update(cx, |input, cx| input.set_color("#880000", cx));
                    settle(&input, cx).await;
                }
                None => tracing::error!("picker was not created"),
            }

            _ = cx.update(|cx| cx.quit());
        })
        .detach();
    });

    Ok(())
}
