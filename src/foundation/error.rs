/// Convenience result type used across textbehind.
pub type TextBehindResult<T> = Result<T, TextBehindError>;

/// Top-level error taxonomy used by engine APIs.
///
/// None of these are fatal to an [`Editor`](crate::Editor): it logs them and keeps the last good
/// state on screen.
#[derive(thiserror::Error, Debug)]
pub enum TextBehindError {
    /// Invalid user-provided data (buffer lengths, colors, project fields).
    #[error("validation error: {0}")]
    Validation(String),

    /// Source image bytes could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The segmentation collaborator failed or produced unusable output.
    #[error("segmentation error: {0}")]
    Segmentation(String),

    /// A render target could not be acquired or a pass failed.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TextBehindError {
    /// Build a [`TextBehindError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TextBehindError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`TextBehindError::Segmentation`] value.
    pub fn segmentation(msg: impl Into<String>) -> Self {
        Self::Segmentation(msg.into())
    }

    /// Build a [`TextBehindError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`TextBehindError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
