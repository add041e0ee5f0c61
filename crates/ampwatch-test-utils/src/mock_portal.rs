// SPDX-FileCopyrightText: 2026 Ampwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A wiremock server that answers like the electricity portal.

use std::time::Duration;

use ampwatch_portal::{Credentials, PortalClient};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::mock_source::reading_payload;

pub const TEST_SID: &str = "2023040001";
pub const TEST_PASSWORD: &str = "secret";

/// Fake portal. Cookie bootstrap, captcha and logout are always mounted;
/// login, binding and reading answers are mounted per test.
pub struct MockPortal {
    server: MockServer,
}

impl MockPortal {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200).insert_header("set-cookie", "JSESSIONID=mock; Path=/"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/interface/getVerifyCode"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/home/logout"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Self { server }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// A client for this portal using the test credentials.
    pub fn client(&self) -> PortalClient {
        PortalClient::new(
            &self.uri(),
            Credentials::new(TEST_SID, TEST_PASSWORD),
            "ampwatch-test/1.0",
            Duration::from_secs(5),
        )
        .expect("mock portal client")
    }

    /// Accepts the test credentials; anything else is rejected.
    pub async fn accept_login(&self) {
        Mock::given(method("POST"))
            .and(path("/interface/login"))
            .and(body_string_contains("passWord=c2VjcmV0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "state": 200,
                "data": {"studentid": TEST_SID, "token": "mock-token"}
            })))
            .mount(&self.server)
            .await;
        self.mount_rejection(10).await;
    }

    /// Rejects every login attempt.
    pub async fn reject_login(&self) {
        self.mount_rejection(1).await;
    }

    async fn mount_rejection(&self, priority: u8) {
        Mock::given(method("POST"))
            .and(path("/interface/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "state": 500,
                "message": "invalid sid or password",
                "data": ""
            })))
            .with_priority(priority)
            .mount(&self.server)
            .await;
    }

    /// Binds `cust_id` to the test account.
    pub async fn bind_customer(&self, cust_id: &str) {
        Mock::given(method("POST"))
            .and(path("/interface/index"))
            .and(body_string_contains("method=getelstudorbandinfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "state": 200,
                "data": [{"CustId": cust_id}]
            })))
            .mount(&self.server)
            .await;
    }

    /// Answers the next reading query for `cust_id` once.
    pub async fn serve_reading_once(&self, cust_id: &str, used_amp: &str, res_amp: &str, time: &str) {
        Mock::given(method("POST"))
            .and(path("/interface/index"))
            .and(body_string_contains("method=geteldorbaseinfo"))
            .and(body_string_contains(format!("custId={cust_id}")))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(reading_payload(used_amp, res_amp, time)),
            )
            .up_to_n_times(1)
            .mount(&self.server)
            .await;
    }
}
