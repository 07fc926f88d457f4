//! Error types for Afterglow Core

use thiserror::Error;

/// Result type alias for player operations
pub type Result<T> = std::result::Result<T, Error>;

/// Player error types
#[derive(Error, Debug)]
pub enum Error {
    // Markup errors
    #[error("Please provide width and height for your video element")]
    MissingDimensions,

    #[error("Invalid value for attribute {name}: {value:?}")]
    InvalidAttribute { name: String, value: String },

    // Lightbox errors
    #[error("Lightbox trigger has no target player (expected href=\"#id\" or data-playerid)")]
    MissingLightboxTarget,

    #[error("Lightbox target video not found: {playerid}")]
    LightboxTargetNotFound { playerid: String },

    #[error("Page could not mount a lightbox for {playerid}")]
    LightboxUnavailable { playerid: String },

    // Engine errors
    #[error("Video engine error: {0}")]
    Engine(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}

impl Error {
    /// Create an engine error
    pub fn engine(msg: impl Into<String>) -> Self {
        Error::Engine(msg.into())
    }

    /// Create an invalid attribute error
    pub fn invalid_attribute(name: impl Into<String>, value: impl Into<String>) -> Self {
        Error::InvalidAttribute {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Returns the error code reported to the page
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::MissingDimensions => "MISSING_DIMENSIONS",
            Error::InvalidAttribute { .. } => "INVALID_ATTRIBUTE",
            Error::MissingLightboxTarget => "MISSING_LIGHTBOX_TARGET",
            Error::LightboxTargetNotFound { .. } => "LIGHTBOX_TARGET_NOT_FOUND",
            Error::LightboxUnavailable { .. } => "LIGHTBOX_UNAVAILABLE",
            Error::Engine(_) => "ENGINE",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
        }
    }
}
