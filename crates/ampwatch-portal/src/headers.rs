// SPDX-FileCopyrightText: 2026 Ampwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Browser-like request headers. The portal answers scripted clients
//! differently, so every request looks like it came from its login page.

use ampwatch_core::AmpwatchError;
use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, HeaderMap, HeaderName, HeaderValue, ORIGIN, PRAGMA,
    REFERER, USER_AGENT,
};

const ACCEPT_LANGUAGE_VALUE: &str = "zh-TW,zh;q=0.9,en-US;q=0.8,en;q=0.7,zh-CN;q=0.6";
const GET_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,\
image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7";
const POST_ACCEPT: &str = "application/json, text/javascript, */*; q=0.01";

fn value(name: &str, raw: &str) -> Result<HeaderValue, AmpwatchError> {
    HeaderValue::from_str(raw)
        .map_err(|e| AmpwatchError::Config(format!("invalid {name} header value: {e}")))
}

fn common(origin: &str, user_agent: &str) -> Result<HeaderMap, AmpwatchError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(REFERER, value("Referer", &format!("{origin}/home/login"))?);
    headers.insert(USER_AGENT, value("User-Agent", user_agent)?);
    Ok(headers)
}

/// Headers for page-style GET requests.
pub fn get_headers(origin: &str, user_agent: &str) -> Result<HeaderMap, AmpwatchError> {
    let mut headers = common(origin, user_agent)?;
    headers.insert(ACCEPT, HeaderValue::from_static(GET_ACCEPT));
    headers.insert(
        HeaderName::from_static("upgrade-insecure-requests"),
        HeaderValue::from_static("1"),
    );
    Ok(headers)
}

/// Headers for XHR-style form POSTs. The form body sets its own content type.
pub fn post_headers(origin: &str, user_agent: &str) -> Result<HeaderMap, AmpwatchError> {
    let mut headers = common(origin, user_agent)?;
    headers.insert(ACCEPT, HeaderValue::from_static(POST_ACCEPT));
    headers.insert(ORIGIN, value("Origin", origin)?);
    headers.insert(
        HeaderName::from_static("x-requested-with"),
        HeaderValue::from_static("XMLHttpRequest"),
    );
    Ok(headers)
}
