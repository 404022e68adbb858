use thiserror::Error;

/// The picker backend cannot build a picker in this environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("color picker is not supported: {reason}")]
pub struct Unsupported {
    pub reason: String,
}

impl Unsupported {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Why a [`crate::ColorInput`] fell back to a read-only preview.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("failed to resolve color picker labels")]
    Labels(#[source] anyhow::Error),
    #[error(transparent)]
    Unsupported(#[from] Unsupported),
}
