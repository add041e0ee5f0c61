// SPDX-FileCopyrightText: 2026 Ampwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credentials, identity and the mutable per-process session.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::cookie::Jar;
use serde::Serialize;

/// Login identifier and secret. Never printed.
#[derive(Clone)]
pub struct Credentials {
    sid: String,
    password: String,
}

impl Credentials {
    pub fn new(sid: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            sid: sid.into(),
            password: password.into(),
        }
    }

    pub fn sid(&self) -> &str {
        &self.sid
    }

    /// The password as the login form expects it: base64 of its UTF-8 bytes.
    ///
    /// This is transport obfuscation only.
    pub fn encoded_password(&self) -> String {
        STANDARD.encode(self.password.as_bytes())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("sid", &self.sid)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// The identity returned by a successful login. Replaced wholesale, never mutated.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    pub student_id: String,
    pub token: String,
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("student_id", &self.student_id)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Where the login state machine currently stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    LoggedOut,
    Authenticating,
    LoggedIn,
}

/// Transport, cookie jar and identity. Guarded by the client's session mutex.
#[derive(Debug)]
pub(crate) struct Session {
    pub(crate) http: reqwest::Client,
    pub(crate) jar: Arc<Jar>,
    pub(crate) identity: Option<Identity>,
    pub(crate) state: SessionState,
}

impl Session {
    pub(crate) fn new(http: reqwest::Client, jar: Arc<Jar>) -> Self {
        Self {
            http,
            jar,
            identity: None,
            state: SessionState::LoggedOut,
        }
    }

    pub(crate) fn authenticated(&mut self, identity: Identity) {
        self.identity = Some(identity);
        self.state = SessionState::LoggedIn;
    }

    pub(crate) fn clear_identity(&mut self) {
        self.identity = None;
        self.state = SessionState::LoggedOut;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_is_base64_encoded() {
        let creds = Credentials::new("2023040001", "secret");
        assert_eq!(creds.encoded_password(), "c2VjcmV0");
    }

    #[test]
    fn debug_redacts_secrets() {
        let creds = Credentials::new("2023040001", "hunter2");
        let printed = format!("{creds:?}");
        assert!(printed.contains("2023040001"));
        assert!(!printed.contains("hunter2"));

        let identity = Identity {
            student_id: "42".into(),
            token: "tok-abc".into(),
        };
        assert!(!format!("{identity:?}").contains("tok-abc"));
    }

    #[test]
    fn new_session_is_logged_out() {
        let jar = Arc::new(Jar::default());
        let mut session = Session::new(reqwest::Client::new(), jar);
        assert_eq!(session.state, SessionState::LoggedOut);
        session.authenticated(Identity {
            student_id: "1".into(),
            token: "t".into(),
        });
        assert_eq!(session.state, SessionState::LoggedIn);
        session.clear_identity();
        assert!(session.identity.is_none());
        assert_eq!(session.state, SessionState::LoggedOut);
    }
}
