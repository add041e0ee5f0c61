// SPDX-FileCopyrightText: 2026 Ampwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the electricity portal.
//!
//! Provides [`PortalClient`], which owns the single portal session and its
//! login state machine. Authenticated calls log in on demand and, when the
//! portal answers with a non-success status, re-login exactly once and resend
//! exactly once. Transport failures are never retried.

use std::sync::Arc;
use std::time::Duration;

use ampwatch_config::model::PortalConfig;
use ampwatch_core::AmpwatchError;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::HeaderMap;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::headers;
use crate::session::{Credentials, Identity, Session, SessionState};
use crate::types::{BindingInfo, IndexResponse, LoginResult, ReadingResult, STATE_OK};

const VERIFY_CODE_PATH: &str = "interface/getVerifyCode";
const LOGIN_PATH: &str = "interface/login";
const LOGOUT_PATH: &str = "home/logout";
const INDEX_PATH: &str = "interface/index";

/// Whether a call needs an authenticated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Sent as-is and never retried.
    Public,
    /// Logs in first when needed; one re-login and resend on a non-success status.
    Authenticated,
}

/// Status and body of a completed portal request.
#[derive(Debug, Clone)]
pub struct PortalResponse {
    pub status: StatusCode,
    pub body: String,
}

impl PortalResponse {
    pub fn is_success(&self) -> bool {
        self.status == StatusCode::OK
    }

    /// Decodes the body, reporting garbage as a protocol failure.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, AmpwatchError> {
        serde_json::from_str(&self.body).map_err(|e| {
            AmpwatchError::Protocol(format!("undecodable portal response ({}): {e}", self.status))
        })
    }
}

/// Result of a login attempt that reached the portal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Authenticated(Identity),
    Rejected { reason: String },
}

enum Method<'a> {
    Get,
    Post(&'a [(&'a str, String)]),
}

impl Method<'_> {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post(_) => "POST",
        }
    }
}

/// Client for the portal. One instance per process; cheap to share behind an `Arc`.
#[derive(Debug)]
pub struct PortalClient {
    base_url: Url,
    credentials: Credentials,
    timeout: Duration,
    get_headers: HeaderMap,
    post_headers: HeaderMap,
    session: Mutex<Session>,
}

impl PortalClient {
    /// Creates a logged-out client with an empty cookie jar.
    pub fn new(
        base_url: &str,
        credentials: Credentials,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, AmpwatchError> {
        let origin = base_url.trim().trim_end_matches('/');
        let base_url = Url::parse(&format!("{origin}/"))
            .map_err(|e| AmpwatchError::Config(format!("invalid portal base URL `{origin}`: {e}")))?;
        let session = new_session(timeout)?;

        Ok(Self {
            get_headers: headers::get_headers(origin, user_agent)?,
            post_headers: headers::post_headers(origin, user_agent)?,
            base_url,
            credentials,
            timeout,
            session: Mutex::new(session),
        })
    }

    /// Creates a client from the `[portal]` configuration section.
    pub fn from_config(config: &PortalConfig) -> Result<Self, AmpwatchError> {
        Self::new(
            &config.base_url,
            Credentials::new(config.sid.clone(), config.password.clone()),
            &config.user_agent,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The current identity, if logged in.
    pub async fn identity(&self) -> Option<Identity> {
        self.session.lock().await.identity.clone()
    }

    pub async fn state(&self) -> SessionState {
        self.session.lock().await.state
    }

    /// True when the jar holds at least one cookie for the portal.
    pub async fn has_cookies(&self) -> bool {
        let session = self.session.lock().await;
        self.jar_has_cookies(&session)
    }

    /// Bootstraps cookie state with one unauthenticated GET of the portal root.
    ///
    /// Does nothing when cookies are already present.
    pub async fn ensure_cookies(&self) -> Result<(), AmpwatchError> {
        let session = self.session.lock().await;
        self.ensure_cookies_locked(&session).await
    }

    /// Logs in, replacing any current identity.
    ///
    /// A rejected login is returned as [`LoginOutcome::Rejected`], not as an
    /// error. Only transport failures propagate.
    pub async fn login(&self) -> Result<LoginOutcome, AmpwatchError> {
        let mut session = self.session.lock().await;
        self.login_locked(&mut session).await
    }

    /// Best-effort logout notification, then a fresh transport and cookie jar.
    ///
    /// Local state is reset even when the notification fails; the transport
    /// error is still returned.
    pub async fn logout(&self) -> Result<(), AmpwatchError> {
        let mut session = self.session.lock().await;
        let notified = self.send(&session, LOGOUT_PATH, &Method::Get).await;
        session.clear_identity();
        *session = new_session(self.timeout)?;
        match notified {
            Ok(response) => {
                info!(status = response.status.as_u16(), "logged out of portal");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "logout notification failed; local session reset anyway");
                Err(e)
            }
        }
    }

    /// GET `path` relative to the portal root.
    pub async fn get(&self, path: &str, access: Access) -> Result<PortalResponse, AmpwatchError> {
        self.call(path, &Method::Get, access).await
    }

    /// POST `form` to `path` relative to the portal root.
    pub async fn post(
        &self,
        path: &str,
        form: &[(&str, String)],
        access: Access,
    ) -> Result<PortalResponse, AmpwatchError> {
        self.call(path, &Method::Post(form), access).await
    }

    /// Looks up the customer id of the first dormitory bound to this account.
    pub async fn resolve_cust_id(&self) -> Result<String, AmpwatchError> {
        let form = [
            ("method", "getelstudorbandinfo".to_string()),
            ("stuid", "1".to_string()),
        ];
        let response = self.post(INDEX_PATH, &form, Access::Authenticated).await?;
        if !response.is_success() {
            return Err(AmpwatchError::Protocol(format!(
                "binding query answered {}",
                response.status
            )));
        }
        let result: IndexResponse<Vec<BindingInfo>> = response.json()?;
        let cust_id = result
            .data
            .and_then(|bindings| bindings.into_iter().next())
            .map(|binding| binding.cust_id.to_string())
            .ok_or_else(|| {
                AmpwatchError::Protocol("no dormitory is bound to this account".to_string())
            })?;
        debug!(cust_id = %cust_id, "resolved customer id");
        Ok(cust_id)
    }

    /// Queries the meter reading for `cust_id`, resolving it first when absent.
    ///
    /// The payload is returned undigested; judging success is up to the caller.
    pub async fn fetch_reading(
        &self,
        cust_id: Option<&str>,
    ) -> Result<ReadingResult, AmpwatchError> {
        let cust_id = match cust_id {
            Some(id) => id.to_string(),
            None => self.resolve_cust_id().await?,
        };
        let form = [
            ("method", "geteldorbaseinfo".to_string()),
            ("stuid", "1".to_string()),
            ("xq", "4".to_string()),
            ("custId", cust_id),
        ];
        let response = self.post(INDEX_PATH, &form, Access::Authenticated).await?;
        if !response.is_success() {
            return Err(AmpwatchError::Protocol(format!(
                "reading query answered {}",
                response.status
            )));
        }
        if response.body.trim().is_empty() {
            return Err(AmpwatchError::Protocol("empty reading response".to_string()));
        }
        response.json()
    }

    async fn call(
        &self,
        path: &str,
        method: &Method<'_>,
        access: Access,
    ) -> Result<PortalResponse, AmpwatchError> {
        let mut session = self.session.lock().await;

        if access == Access::Authenticated && session.identity.is_none() {
            if let LoginOutcome::Rejected { reason } = self.login_locked(&mut session).await? {
                error!(path, reason = %reason, "login failed");
                return Err(AmpwatchError::LoginFailed(reason));
            }
        }

        let response = self.send(&session, path, method).await?;
        if access == Access::Public || response.is_success() {
            return Ok(response);
        }

        warn!(
            path,
            status = response.status.as_u16(),
            "non-success answer to authenticated call, re-logging in"
        );
        match self.login_locked(&mut session).await? {
            LoginOutcome::Authenticated(_) => {
                let resent = self.send(&session, path, method).await?;
                info!(path, status = resent.status.as_u16(), "resent after re-login");
                Ok(resent)
            }
            LoginOutcome::Rejected { reason } => {
                error!(path, reason = %reason, "re-login failed, returning original response");
                Ok(response)
            }
        }
    }

    async fn login_locked(&self, session: &mut Session) -> Result<LoginOutcome, AmpwatchError> {
        session.state = SessionState::Authenticating;
        let outcome = self.attempt_login(session).await;
        match &outcome {
            Ok(LoginOutcome::Authenticated(identity)) => {
                info!(student_id = %identity.student_id, "logged in to portal");
                session.authenticated(identity.clone());
            }
            Ok(LoginOutcome::Rejected { reason }) => {
                warn!(reason = %reason, "portal rejected login");
                session.clear_identity();
            }
            Err(_) => session.clear_identity(),
        }
        outcome
    }

    async fn attempt_login(&self, session: &Session) -> Result<LoginOutcome, AmpwatchError> {
        self.ensure_cookies_locked(session).await?;
        // The portal only accepts a login after the captcha endpoint was hit.
        self.send(session, VERIFY_CODE_PATH, &Method::Get).await?;

        let form = [
            ("sid", self.credentials.sid().to_string()),
            ("passWord", self.credentials.encoded_password()),
            ("verifycode", String::new()),
            ("ismobile", "0".to_string()),
        ];
        let response = self.send(session, LOGIN_PATH, &Method::Post(&form)).await?;
        if !response.is_success() {
            return Ok(LoginOutcome::Rejected {
                reason: format!("login answered {}", response.status),
            });
        }

        let result: LoginResult = match response.json() {
            Ok(result) => result,
            Err(e) => {
                return Ok(LoginOutcome::Rejected {
                    reason: e.to_string(),
                });
            }
        };
        if result.state != STATE_OK {
            return Ok(LoginOutcome::Rejected {
                reason: result
                    .message
                    .unwrap_or_else(|| format!("login state {}", result.state)),
            });
        }
        Ok(match result.data {
            Some(data) => LoginOutcome::Authenticated(Identity {
                student_id: data.studentid.to_string(),
                token: data.token,
            }),
            None => LoginOutcome::Rejected {
                reason: "login answer carries no identity".to_string(),
            },
        })
    }

    async fn ensure_cookies_locked(&self, session: &Session) -> Result<(), AmpwatchError> {
        if self.jar_has_cookies(session) {
            return Ok(());
        }
        debug!("no portal cookies yet, bootstrapping");
        self.send(session, "", &Method::Get).await?;
        Ok(())
    }

    fn jar_has_cookies(&self, session: &Session) -> bool {
        session.jar.cookies(&self.base_url).is_some()
    }

    async fn send(
        &self,
        session: &Session,
        path: &str,
        method: &Method<'_>,
    ) -> Result<PortalResponse, AmpwatchError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| AmpwatchError::Internal(format!("invalid portal path `{path}`: {e}")))?;

        let request = match method {
            Method::Get => session.http.get(url.clone()).headers(self.get_headers.clone()),
            Method::Post(form) => session
                .http
                .post(url.clone())
                .headers(self.post_headers.clone())
                .form(form),
        };

        let response = request.send().await.map_err(|e| {
            error!(method = method.as_str(), url = %url, error = %e, "portal request failed");
            AmpwatchError::transport(format!("{} {url} failed", method.as_str()), e)
        })?;
        let status = response.status();
        info!(method = method.as_str(), url = %url, status = status.as_u16(), "portal request");

        let body = response.text().await.map_err(|e| {
            AmpwatchError::transport(format!("reading body of {url} failed"), e)
        })?;
        Ok(PortalResponse { status, body })
    }
}

fn new_session(timeout: Duration) -> Result<Session, AmpwatchError> {
    let jar = Arc::new(Jar::default());
    let http = reqwest::Client::builder()
        .cookie_provider(Arc::clone(&jar))
        .timeout(timeout)
        .build()
        .map_err(|e| AmpwatchError::transport("failed to build HTTP client", e))?;
    Ok(Session::new(http, jar))
}
