// SPDX-FileCopyrightText: 2026 Ampwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Ampwatch workspace.

use thiserror::Error;

/// The primary error type shared by the portal client, processor, store and gateway.
#[derive(Debug, Error)]
pub enum AmpwatchError {
    /// Configuration errors (invalid TOML, unknown timezone, bad URL).
    #[error("configuration error: {0}")]
    Config(String),

    /// Network or connection-level failure talking to the portal. Always propagated.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The portal rejected the credentials or answered the login with an unexpected shape.
    #[error("login failed: {0}")]
    LoginFailed(String),

    /// A portal response body could not be decoded.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The reading payload was unsuccessful or missing its numeric fields.
    #[error("malformed reading: {0}")]
    MalformedReading(String),

    /// The log store refused or failed a read or write.
    #[error("persist error: {source}")]
    Persist {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Opening the log store failed after every configured attempt.
    #[error("storage unavailable after {attempts} attempt(s): {source}")]
    StorageUnavailable {
        attempts: u32,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Caller presented a missing or wrong access token.
    #[error("invalid access_token")]
    AccessDenied,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AmpwatchError {
    /// Builds a [`AmpwatchError::Transport`] from any error source.
    pub fn transport(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Builds a [`AmpwatchError::Persist`] from a plain message.
    pub fn persist(message: impl Into<String>) -> Self {
        Self::Persist {
            source: message.into().into(),
        }
    }

    /// True for connection-level failures.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// True for failures a later login attempt may recover from.
    ///
    /// Protocol errors count here: a garbled portal answer is retried the
    /// same way as a rejected login.
    pub fn is_login_failure(&self) -> bool {
        matches!(self, Self::LoginFailed(_) | Self::Protocol(_))
    }
}
