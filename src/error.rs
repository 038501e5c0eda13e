use thiserror::Error;

use crate::types::ProcessingPhase;

/// Why a single media blob could not be turned into a decoded buffer.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("input is empty")]
    Empty,

    #[error("cannot read media: {0}")]
    Unreadable(String),

    #[error("unsupported media: {0}")]
    Unsupported(String),

    #[error("corrupt stream: {0}")]
    Corrupt(String),

    #[error("invalid speech payload: {0}")]
    Payload(String),

    #[error("resampling failed: {0}")]
    Resample(String),
}

/// Central error type for the storemix-core crate.
#[derive(Debug, Error)]
pub enum MixError {
    // Generic fallback (wraps anyhow)
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),

    // Domain-specific variants
    #[error("Failed to decode track {} ({name}): {source}", .index + 1)]
    Decode {
        index: usize,
        name: String,
        #[source]
        source: DecodeError,
    },

    #[error("Failed to decode speech for {name}: {source}")]
    Speech {
        name: String,
        #[source]
        source: DecodeError,
    },

    #[error("No tracks to merge")]
    EmptyInput,

    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    #[error(
        "Track {} ({name}) is at {actual} Hz but the mix is at {expected} Hz",
        .index + 1
    )]
    SampleRateMismatch {
        index: usize,
        name: String,
        expected: u32,
        actual: u32,
    },

    #[error("PCM payload of {bytes} bytes does not fit in a WAV container")]
    PayloadTooLarge { bytes: u64 },

    #[error("Session is not idle (phase: {0}); reset it first")]
    NotIdle(ProcessingPhase),

    #[error("Invalid track order: {0}")]
    Reorder(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Playlist error: {0}")]
    Playlist(String),
}

// --- Implement From conversions for common errors ---
impl From<std::io::Error> for MixError {
    fn from(e: std::io::Error) -> Self {
        MixError::Anyhow(e.into())
    }
}

impl From<serde_json::Error> for MixError {
    fn from(e: serde_json::Error) -> Self {
        MixError::Anyhow(e.into())
    }
}

pub type Result<T> = std::result::Result<T, MixError>;
