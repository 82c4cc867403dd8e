//! Error types surfaced by the player and the FFI boundary

use std::sync::Mutex;

/// Errors raised while initializing the player or reported by the embedded content
#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    /// The base URL given to `initialize` could not be parsed
    #[error("invalid base url `{url}`: {source}")]
    InvalidBaseUrl {
        /// The rejected input
        url: String,
        /// Parser failure
        #[source]
        source: url::ParseError,
    },

    /// The base URL parsed but cannot carry a path (e.g. `data:` or `mailto:`)
    #[error("base url `{0}` cannot be used as an embed host")]
    UnsupportedBaseUrl(String),

    /// The embedded player reported that it could not start
    #[error("player initialization failed")]
    InitFailed,

    /// Playback error reported by the embedded player
    #[error("{kind}: {message}")]
    Playback {
        /// Error name as reported by the player (e.g. `PasswordError`)
        kind: String,
        /// Human readable message
        message: String,
        /// Player method that raised the error, if any
        method: Option<String>,
    },

    /// A bridge payload that does not decode into a known event
    #[error("malformed bridge message: {0}")]
    MalformedMessage(#[from] serde_json::Error),
}

impl PlayerError {
    /// Short, stable category name for this error
    pub fn kind(&self) -> &str {
        match self {
            PlayerError::InvalidBaseUrl { .. } | PlayerError::UnsupportedBaseUrl(_) => {
                "InvalidBaseUrl"
            }
            PlayerError::InitFailed => "InitFailed",
            PlayerError::Playback { kind, .. } => kind,
            PlayerError::MalformedMessage(_) => "MalformedMessage",
        }
    }

    /// Message text without the category prefix
    pub fn message(&self) -> String {
        match self {
            PlayerError::Playback { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Last error recorded by the FFI layer
static LAST_ERROR: Mutex<Option<String>> = Mutex::new(None);

/// Store an error message for the host to pick up
#[doc(hidden)]
pub fn store_error(message: String) {
    if let Ok(mut last_error) = LAST_ERROR.lock() {
        *last_error = Some(message);
    }
}

/// Retrieve and clear the last error message
#[doc(hidden)]
pub fn take_last_error() -> Option<String> {
    LAST_ERROR.lock().ok().and_then(|mut e| e.take())
}
