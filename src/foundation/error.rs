/// Convenience result type used across vidfield.
pub type FieldResult<T> = Result<T, FieldError>;

/// Top-level error taxonomy used by the field APIs.
#[derive(thiserror::Error, Debug)]
pub enum FieldError {
    /// Rejected mapper, layout or session settings. The previous valid state stays active.
    #[error("config error: {0}")]
    Config(String),

    /// A frame buffer could not be produced or does not match its declared size.
    #[error("frame error: {0}")]
    Frame(String),

    /// Errors when serializing or deserializing configuration or attribute dumps.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FieldError {
    /// Build a [`FieldError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`FieldError::Frame`] value.
    pub fn frame(msg: impl Into<String>) -> Self {
        Self::Frame(msg.into())
    }

    /// Build a [`FieldError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// True for [`FieldError::Config`].
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
