use anyhow::{Context as _, Result};
use futures::future::{self, LocalBoxFuture};
use futures::FutureExt as _;
use rust_i18n::t;

/// The translated strings a picker needs for its buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelKey {
    Save,
    Cancel,
}

impl LabelKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Save => "ColorInput.save",
            Self::Cancel => "ColorInput.cancel",
        }
    }
}

/// Resolves human readable labels, possibly asynchronously.
pub trait Translator {
    fn translate(&self, key: LabelKey) -> LocalBoxFuture<'static, Result<String>>;
}

/// Translates labels from the bundled `locales/ui.yml`.
#[derive(Debug, Clone, Default)]
pub struct I18nTranslator {
    locale: Option<String>,
}

impl I18nTranslator {
    /// Use the current global locale.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the given locale instead of the global one.
    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    fn lookup(&self, key: LabelKey) -> String {
        match (&self.locale, key) {
            (Some(locale), LabelKey::Save) => t!("ColorInput.save", locale = locale.as_str()),
            (Some(locale), LabelKey::Cancel) => t!("ColorInput.cancel", locale = locale.as_str()),
            (None, LabelKey::Save) => t!("ColorInput.save"),
            (None, LabelKey::Cancel) => t!("ColorInput.cancel"),
        }
        .into_owned()
    }
}

impl Translator for I18nTranslator {
    fn translate(&self, key: LabelKey) -> LocalBoxFuture<'static, Result<String>> {
        future::ready(Ok(self.lookup(key))).boxed_local()
    }
}

/// Button labels handed to the picker, resolved once per input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSet {
    pub save: String,
    pub cancel: String,
}

impl LabelSet {
    /// Resolve both labels; fails if either lookup fails.
    ///
    /// Both lookups are requested right away, the returned future does not
    /// borrow `translator`.
    pub fn resolve(translator: &dyn Translator) -> LocalBoxFuture<'static, Result<Self>> {
        let save = lookup(translator.translate(LabelKey::Save), LabelKey::Save);
        let cancel = lookup(translator.translate(LabelKey::Cancel), LabelKey::Cancel);

        async move {
            let (save, cancel) = futures::try_join!(save, cancel)?;
            Ok(Self { save, cancel })
        }
        .boxed_local()
    }
}

async fn lookup(
    lookup: LocalBoxFuture<'static, Result<String>>,
    key: LabelKey,
) -> Result<String> {
    lookup
        .await
        .with_context(|| format!("failed to translate `{}`", key.as_str()))
}
