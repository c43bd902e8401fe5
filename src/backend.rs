pub mod file_session_store;
pub mod http_task_driven_ports;
pub mod http_user_driven_ports;

use crate::domain::DrivenPortError;
use crate::dto;
use crate::external_connections;
use anyhow::{Context, anyhow};
use reqwest::{StatusCode, Url};
use reqwest_middleware::ClientBuilder;
use reqwest_tracing::TracingMiddleware;
use std::time::Duration;

/// Data structure which owns the clients for talking to the task backend.
/// Lets the driven adapters stay agnostic of how the HTTP client was configured.
#[derive(Clone)]
pub struct ExternalConnectivity {
    api_base: Url,
    http_client: reqwest_middleware::ClientWithMiddleware,
}

impl ExternalConnectivity {
    /// Builds the HTTP client used for every backend request. Requests give up after
    /// [request_timeout].
    pub fn new(api_url: &Url, request_timeout: Duration) -> Result<Self, anyhow::Error> {
        let base_client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(request_timeout)
            .build()
            .context("building the HTTP client")?;
        let http_client = ClientBuilder::new(base_client)
            .with(TracingMiddleware::default())
            .build();

        Ok(ExternalConnectivity {
            api_base: with_trailing_slash(api_url),
            http_client,
        })
    }
}

/// Joining onto a base without a trailing slash would drop its last path segment ("v1")
fn with_trailing_slash(url: &Url) -> Url {
    let mut url = url.clone();
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    url
}

impl external_connections::ExternalConnectivity for ExternalConnectivity {
    fn http_client(&self) -> &reqwest_middleware::ClientWithMiddleware {
        &self.http_client
    }

    fn endpoint(&self, path: &str) -> Result<Url, anyhow::Error> {
        self.api_base
            .join(path.trim_start_matches('/'))
            .with_context(|| format!("building the URL for {path}"))
    }
}

/// Sends a request and sorts the response into the port error taxonomy. Successful responses
/// are handed back untouched.
async fn send(
    request: reqwest_middleware::RequestBuilder,
    action: &str,
) -> Result<reqwest::Response, DrivenPortError> {
    let response = request
        .send()
        .await
        .with_context(|| format!("sending the request to {action}"))?;

    check_status(response, action).await
}

async fn check_status(
    response: reqwest::Response,
    action: &str,
) -> Result<reqwest::Response, DrivenPortError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(DrivenPortError::Unauthorized),
        StatusCode::NOT_FOUND => Err(DrivenPortError::DoesNotExist),
        StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
            let body = response
                .text()
                .await
                .with_context(|| format!("reading the rejection of the request to {action}"))?;
            Err(DrivenPortError::Rejected(dto::error::rejection_from_body(
                &body,
            )))
        }
        other => Err(DrivenPortError::CommsFailure(anyhow!(
            "backend responded with {other} when trying to {action}"
        ))),
    }
}
