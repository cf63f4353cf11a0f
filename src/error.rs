//! Error types for poise.
//!
//! Only construction and I/O can fail. The per-frame paths degrade silently
//! (passthrough, fallback, pending) and never surface a `PoiseError`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PoiseError {
    // Configuration errors
    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Audio errors
    #[error("Invalid sample rate: {input_rate} Hz -> {output_rate} Hz")]
    InvalidSampleRate { input_rate: u32, output_rate: u32 },

    #[error("WAV error: {message}")]
    Wav { message: String },

    // Inference errors
    #[error("Inference failed: {message}")]
    Inference { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<hound::Error> for PoiseError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(io) => PoiseError::Io(io),
            other => PoiseError::Wav {
                message: other.to_string(),
            },
        }
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, PoiseError>;
