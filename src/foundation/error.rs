/// Convenience result alias used across the crate.
pub type BadgeResult<T> = Result<T, BadgeError>;

/// Errors surfaced by the overlay engine.
///
/// Only invalid inputs and undecodable images are fatal. Missing fonts, undetectable zones and
/// overflowing text degrade to substitutes and are reported through `tracing` instead.
#[derive(thiserror::Error, Debug)]
pub enum BadgeError {
    /// Invalid argument or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Template bytes could not be decoded into a raster image.
    #[error("cannot decode image: {0}")]
    Decode(String),

    /// A font file was found but could not be used.
    #[error("font error: {0}")]
    Font(String),

    /// Rasterization or encoding failed.
    #[error("render error: {0}")]
    Render(String),

    /// Config or manifest (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other error, usually IO with attached context.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BadgeError {
    /// Build a [`BadgeError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`BadgeError::Decode`].
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`BadgeError::Font`].
    pub fn font(msg: impl Into<String>) -> Self {
        Self::Font(msg.into())
    }

    /// Build a [`BadgeError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`BadgeError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
