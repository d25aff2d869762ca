use std::future::Future;
use std::sync::{atomic::AtomicBool, atomic::Ordering, Arc};
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::ForgeApiConfig;
use crate::error::{parse_error_message, ForgeApiError};
use crate::headers::build_headers;
use crate::payload::{DebugPayload, DebugResponse, RunPayload, RunResponse};
use crate::url::{endpoint_url, DEBUG_PATH, RUN_PATH};

/// Optional cancellation signal shared with the request future.
pub type CancellationSignal = Arc<AtomicBool>;

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Debug)]
pub struct ForgeApiClient {
    http: Client,
    config: ForgeApiConfig,
    run_url: Url,
    debug_url: Url,
}

impl ForgeApiClient {
    pub fn new(config: ForgeApiConfig) -> Result<Self, ForgeApiError> {
        let run_url = endpoint_url(&config.base_url, RUN_PATH)?;
        let debug_url = endpoint_url(&config.base_url, DEBUG_PATH)?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ForgeApiError::from)?;
        Ok(Self {
            http,
            config,
            run_url,
            debug_url,
        })
    }

    pub fn config(&self) -> &ForgeApiConfig {
        &self.config
    }

    pub fn run_endpoint(&self) -> &Url {
        &self.run_url
    }

    pub fn debug_endpoint(&self) -> &Url {
        &self.debug_url
    }

    pub fn build_headers(&self) -> Result<HeaderMap, ForgeApiError> {
        let mut out = HeaderMap::new();
        for (key, value) in build_headers(&self.config) {
            out.insert(
                HeaderName::from_bytes(key.as_bytes())
                    .map_err(|_| ForgeApiError::InvalidHeader(format!("invalid key: {key}")))?,
                HeaderValue::from_str(&value)
                    .map_err(|_| ForgeApiError::InvalidHeader(format!("invalid value for {key}")))?,
            );
        }
        Ok(out)
    }

    pub fn build_run_request(&self, payload: &RunPayload) -> Result<RequestBuilder, ForgeApiError> {
        Ok(self
            .http
            .post(self.run_url.clone())
            .headers(self.build_headers()?)
            .json(payload))
    }

    pub fn build_debug_request(
        &self,
        payload: &DebugPayload,
    ) -> Result<RequestBuilder, ForgeApiError> {
        Ok(self
            .http
            .post(self.debug_url.clone())
            .headers(self.build_headers()?)
            .json(payload))
    }

    /// Execute code in the remote sandbox. Requests are sent once; there is no retry.
    pub async fn run(
        &self,
        payload: &RunPayload,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<RunResponse, ForgeApiError> {
        self.send_json(self.build_run_request(payload)?, cancellation)
            .await
    }

    /// Ask the service for a diagnosis and a proposed fix.
    pub async fn debug(
        &self,
        payload: &DebugPayload,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<DebugResponse, ForgeApiError> {
        self.send_json(self.build_debug_request(payload)?, cancellation)
            .await
    }

    async fn send_json<T>(
        &self,
        request: RequestBuilder,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<T, ForgeApiError>
    where
        T: DeserializeOwned,
    {
        if is_cancelled(cancellation) {
            return Err(ForgeApiError::Cancelled);
        }

        let response = await_or_cancel(request.send(), cancellation)
            .await?
            .map_err(ForgeApiError::from)?;
        let status = response.status();
        let body = await_or_cancel(response.text(), cancellation)
            .await?
            .map_err(ForgeApiError::from)?;

        if !status.is_success() {
            return Err(ForgeApiError::Status(
                status,
                parse_error_message(status, &body),
            ));
        }

        serde_json::from_str(&body).map_err(|error| ForgeApiError::Decode(error.to_string()))
    }
}

fn is_cancelled(cancel: Option<&CancellationSignal>) -> bool {
    cancel.is_some_and(|token| token.load(Ordering::Acquire))
}

async fn await_or_cancel<F>(
    future: F,
    cancellation: Option<&CancellationSignal>,
) -> Result<F::Output, ForgeApiError>
where
    F: Future,
{
    if cancellation.is_none() {
        return Ok(future.await);
    }

    let mut future = Box::pin(future);

    loop {
        if is_cancelled(cancellation) {
            return Err(ForgeApiError::Cancelled);
        }

        if let Ok(output) = tokio::time::timeout(CANCEL_POLL_INTERVAL, &mut future).await {
            if is_cancelled(cancellation) {
                return Err(ForgeApiError::Cancelled);
            }
            return Ok(output);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn await_or_cancel_returns_output_without_signal() {
        let output = await_or_cancel(async { 7 }, None).await.expect("output");
        assert_eq!(output, 7);
    }

    #[tokio::test]
    async fn await_or_cancel_stops_pending_future_once_signalled() {
        let cancel: CancellationSignal = Arc::new(AtomicBool::new(false));
        let trigger = Arc::clone(&cancel);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            trigger.store(true, Ordering::Release);
        });

        let outcome = await_or_cancel(std::future::pending::<()>(), Some(&cancel)).await;
        assert!(matches!(outcome, Err(ForgeApiError::Cancelled)));
    }

    #[tokio::test]
    async fn send_short_circuits_when_already_cancelled() {
        let client = ForgeApiClient::new(ForgeApiConfig::default()).expect("client");
        let cancel: CancellationSignal = Arc::new(AtomicBool::new(true));

        let outcome = client
            .run(&RunPayload::new("print(1)", "python"), Some(&cancel))
            .await;
        assert!(matches!(outcome, Err(ForgeApiError::Cancelled)));
    }
}
