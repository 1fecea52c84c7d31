use crate::config::HttpConfig;
use crate::constants;
use crate::error::{MigrateError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};

/// Build the shared reqwest client: fixed timeout, identifying User-Agent, JSON/JRD Accept.
pub fn build_client(http: &HttpConfig) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    let user_agent = HeaderValue::from_str(&http.user_agent).map_err(|e| {
        MigrateError::Config(format!("Invalid user agent '{}': {}", http.user_agent, e))
    })?;
    headers.insert(USER_AGENT, user_agent);
    headers.insert(ACCEPT, HeaderValue::from_static(constants::ACCEPT));

    let client = reqwest::Client::builder()
        .default_headers(headers)
        .timeout(http.timeout())
        .build()?;
    Ok(client)
}
