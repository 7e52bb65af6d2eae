// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::errors::CheckError;
use reqwest::header;
use std::time::Duration;

pub type HTTPClient = reqwest::Client;

pub static DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

static ACCEPTED_LANGUAGES: &str = "en-US,en;q=0.5";

pub fn user_agent() -> String {
    format!("tombstone/{} (archived repository checker)", env!("CARGO_PKG_VERSION"))
}

/// Every worker owns the client built here, so connection pools are never shared across workers
pub fn build_http_client(request_timeout: Duration) -> anyhow::Result<HTTPClient> {
    let mut headers = header::HeaderMap::new();
    headers.insert(header::USER_AGENT, header::HeaderValue::from_str(&user_agent())?);
    headers.insert(
        header::ACCEPT_LANGUAGE,
        header::HeaderValue::from_static(ACCEPTED_LANGUAGES),
    );

    let client = HTTPClient::builder()
        .default_headers(headers)
        .timeout(request_timeout)
        .build()?;

    Ok(client)
}

impl From<reqwest::Error> for CheckError {
    fn from(value: reqwest::Error) -> Self {
        CheckError::Transport(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::errors::CheckError;
    use crate::infra::networking::http::{DEFAULT_REQUEST_TIMEOUT, build_http_client, user_agent};
    use assertor::{BooleanAssertion, EqualityAssertion};
    use httpmock::MockServer;

    #[tokio::test]
    async fn should_identify_tool_on_every_request() {
        let mock_server = MockServer::start();
        let http_client = build_http_client(DEFAULT_REQUEST_TIMEOUT).unwrap();

        let mocked = mock_server.mock(|when, then| {
            when.method("GET")
                .path("/owner/project")
                .header("user-agent", user_agent())
                .header("accept-language", "en-US,en;q=0.5");

            then.status(200);
        });

        let response = http_client.get(mock_server.url("/owner/project")).send().await.unwrap();

        mocked.assert();
        assertor::assert_that!(response.status().as_u16()).is_equal_to(200);
    }

    #[tokio::test]
    async fn should_report_connection_failures_as_transport_errors() {
        let http_client = build_http_client(DEFAULT_REQUEST_TIMEOUT).unwrap();

        let incoming = http_client.get("http://127.0.0.1:1/owner/project").send().await.unwrap_err();
        let converted = CheckError::from(incoming);

        assertor::assert_that!(matches!(converted, CheckError::Transport(_))).is_true();
    }
}
