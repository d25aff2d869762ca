//! HTTP-backed implementation of the shared `forge_backend` contract.
//!
//! This adapter drives `forge_api` requests on a per-call current-thread tokio
//! runtime and maps transport results into `forge_backend` values or failure
//! descriptions.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use forge_api::{
    DebugPayload, DebugResponse, ForgeApiClient, ForgeApiConfig, ForgeApiError, RunPayload,
    RunResponse,
};
use forge_backend::{
    BackendInitError, BackendProfile, CancelSignal, DebugRequest, DebugResult, ExecuteRequest,
    ExecuteResult, RemoteBackend,
};
use tracing::debug;

/// Stable backend identifier used for explicit startup selection.
pub const HTTP_BACKEND_ID: &str = "http";

/// Runtime configuration for the HTTP backend.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HttpBackendConfig {
    pub base_url: Option<String>,
    pub timeout: Option<Duration>,
}

impl HttpBackendConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn into_forge_api_config(self) -> ForgeApiConfig {
        let mut config = ForgeApiConfig::default()
            .with_user_agent(format!("autodebugger/{}", env!("CARGO_PKG_VERSION")));

        if let Some(base_url) = self.base_url {
            config = config.with_base_url(base_url);
        }

        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }

        config
    }
}

trait ServiceClient: Send + Sync {
    fn endpoint(&self) -> String;

    fn run(&self, payload: &RunPayload, cancel: &CancelSignal)
        -> Result<RunResponse, ForgeApiError>;

    fn debug(
        &self,
        payload: &DebugPayload,
        cancel: &CancelSignal,
    ) -> Result<DebugResponse, ForgeApiError>;
}

#[derive(Debug)]
struct DefaultServiceClient {
    client: ForgeApiClient,
}

impl DefaultServiceClient {
    fn runtime() -> Result<tokio::runtime::Runtime, ForgeApiError> {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| {
                ForgeApiError::Unknown(format!("failed to initialize tokio runtime: {error}"))
            })
    }
}

impl ServiceClient for DefaultServiceClient {
    fn endpoint(&self) -> String {
        self.client.config().base_url.clone()
    }

    fn run(
        &self,
        payload: &RunPayload,
        cancel: &CancelSignal,
    ) -> Result<RunResponse, ForgeApiError> {
        let runtime = Self::runtime()?;
        runtime.block_on(self.client.run(payload, Some(cancel)))
    }

    fn debug(
        &self,
        payload: &DebugPayload,
        cancel: &CancelSignal,
    ) -> Result<DebugResponse, ForgeApiError> {
        let runtime = Self::runtime()?;
        runtime.block_on(self.client.debug(payload, Some(cancel)))
    }
}

/// `RemoteBackend` adapter backed by `forge_api` transport primitives.
pub struct HttpBackend {
    client: Arc<dyn ServiceClient>,
}

impl HttpBackend {
    /// Creates a backend using real HTTP transport.
    pub fn new(config: HttpBackendConfig) -> Result<Self, BackendInitError> {
        let client = ForgeApiClient::new(config.into_forge_api_config()).map_err(map_init_error)?;

        Ok(Self {
            client: Arc::new(DefaultServiceClient { client }),
        })
    }

    #[cfg(test)]
    fn with_client_for_tests(client: Arc<dyn ServiceClient>) -> Self {
        Self { client }
    }
}

impl RemoteBackend for HttpBackend {
    fn profile(&self) -> BackendProfile {
        BackendProfile {
            backend_id: HTTP_BACKEND_ID.to_string(),
            endpoint: Some(self.client.endpoint()),
        }
    }

    fn execute(&self, req: ExecuteRequest, cancel: CancelSignal) -> Result<ExecuteResult, String> {
        if cancel.load(Ordering::Acquire) {
            return Err(ForgeApiError::Cancelled.to_string());
        }

        let payload = RunPayload::new(req.code, req.language.id());
        debug!(op_id = req.op_id, language = %req.language, "sending run request");
        let response = self
            .client
            .run(&payload, &cancel)
            .map_err(|error| error.to_string())?;

        Ok(ExecuteResult {
            logs: response.logs.unwrap_or_default(),
            exit_code: response.exit_code,
        })
    }

    fn debug(&self, req: DebugRequest, cancel: CancelSignal) -> Result<DebugResult, String> {
        if cancel.load(Ordering::Acquire) {
            return Err(ForgeApiError::Cancelled.to_string());
        }

        let payload = DebugPayload::new(req.code, req.language.id(), req.logs, req.model);
        debug!(op_id = req.op_id, language = %req.language, "sending debug request");
        let response = self
            .client
            .debug(&payload, &cancel)
            .map_err(|error| error.to_string())?;

        Ok(DebugResult {
            fixed_code: response.fixed_code.unwrap_or_default(),
            analysis: response.analysis.unwrap_or_default(),
        })
    }
}

fn map_init_error(error: ForgeApiError) -> BackendInitError {
    BackendInitError::new(format!("Failed to initialize http backend: {error}"))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;
    use std::sync::{Mutex, MutexGuard};

    use assert_matches::assert_matches;
    use forge_backend::Language;

    use super::*;

    fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        match mutex.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    enum FakeOutcome {
        Run(Result<RunResponse, ForgeApiError>),
        Debug(Result<DebugResponse, ForgeApiError>),
    }

    struct FakeServiceClient {
        observed_run: Mutex<Option<RunPayload>>,
        observed_debug: Mutex<Option<DebugPayload>>,
        outcome: Mutex<Option<FakeOutcome>>,
    }

    impl FakeServiceClient {
        fn with(outcome: FakeOutcome) -> Arc<Self> {
            Arc::new(Self {
                observed_run: Mutex::new(None),
                observed_debug: Mutex::new(None),
                outcome: Mutex::new(Some(outcome)),
            })
        }
    }

    impl ServiceClient for FakeServiceClient {
        fn endpoint(&self) -> String {
            "http://fake:8000".to_string()
        }

        fn run(
            &self,
            payload: &RunPayload,
            _cancel: &CancelSignal,
        ) -> Result<RunResponse, ForgeApiError> {
            *lock_unpoisoned(&self.observed_run) = Some(payload.clone());
            match lock_unpoisoned(&self.outcome).take() {
                Some(FakeOutcome::Run(result)) => result,
                _ => panic!("fake run outcome should be consumed exactly once"),
            }
        }

        fn debug(
            &self,
            payload: &DebugPayload,
            _cancel: &CancelSignal,
        ) -> Result<DebugResponse, ForgeApiError> {
            *lock_unpoisoned(&self.observed_debug) = Some(payload.clone());
            match lock_unpoisoned(&self.outcome).take() {
                Some(FakeOutcome::Debug(result)) => result,
                _ => panic!("fake debug outcome should be consumed exactly once"),
            }
        }
    }

    fn execute_request() -> ExecuteRequest {
        ExecuteRequest {
            op_id: 4,
            code: "console.log(1)".to_string(),
            language: Language::JavaScript,
        }
    }

    fn debug_request() -> DebugRequest {
        DebugRequest {
            op_id: 5,
            code: "high = len(arr)".to_string(),
            language: Language::Python,
            logs: "IndexError".to_string(),
            model: "qwen2.5-coder".to_string(),
        }
    }

    fn idle_cancel() -> CancelSignal {
        Arc::new(AtomicBool::new(false))
    }

    #[test]
    fn profile_reports_http_backend_and_endpoint() {
        let client = FakeServiceClient::with(FakeOutcome::Run(Ok(RunResponse::default())));
        let backend = HttpBackend::with_client_for_tests(client);

        let profile = backend.profile();
        assert_eq!(profile.backend_id, HTTP_BACKEND_ID);
        assert_eq!(profile.endpoint.as_deref(), Some("http://fake:8000"));
    }

    #[test]
    fn execute_sends_language_id_and_maps_response() {
        let client = FakeServiceClient::with(FakeOutcome::Run(Ok(RunResponse {
            exit_code: Some(0),
            logs: Some("1\n".to_string()),
        })));
        let backend =
            HttpBackend::with_client_for_tests(Arc::clone(&client) as Arc<dyn ServiceClient>);

        let result = backend
            .execute(execute_request(), idle_cancel())
            .expect("execute succeeds");

        assert_eq!(result.logs, "1\n");
        assert_eq!(result.exit_code, Some(0));
        assert_eq!(
            lock_unpoisoned(&client.observed_run).clone(),
            Some(RunPayload::new("console.log(1)", "javascript"))
        );
    }

    #[test]
    fn execute_treats_missing_logs_as_empty() {
        let client = FakeServiceClient::with(FakeOutcome::Run(Ok(RunResponse::default())));
        let backend = HttpBackend::with_client_for_tests(client);

        let result = backend
            .execute(execute_request(), idle_cancel())
            .expect("execute succeeds");
        assert_eq!(result, ExecuteResult::default());
    }

    #[test]
    fn debug_forwards_logs_and_model_and_maps_fix() {
        let client = FakeServiceClient::with(FakeOutcome::Debug(Ok(DebugResponse {
            analysis: Some("**Error:** IndexError".to_string()),
            fixed_code: Some("high = len(arr) - 1".to_string()),
        })));
        let backend =
            HttpBackend::with_client_for_tests(Arc::clone(&client) as Arc<dyn ServiceClient>);

        let result = backend
            .debug(debug_request(), idle_cancel())
            .expect("debug succeeds");

        assert_eq!(result.fixed_code, "high = len(arr) - 1");
        assert_eq!(result.analysis, "**Error:** IndexError");
        assert_matches!(
            lock_unpoisoned(&client.observed_debug).clone(),
            Some(DebugPayload { logs, model, .. }) if logs == "IndexError" && model == "qwen2.5-coder"
        );
    }

    #[test]
    fn transport_errors_become_descriptions() {
        let client = FakeServiceClient::with(FakeOutcome::Debug(Err(ForgeApiError::Decode(
            "expected value at line 1 column 1".to_string(),
        ))));
        let backend = HttpBackend::with_client_for_tests(client);

        let error = backend
            .debug(debug_request(), idle_cancel())
            .expect_err("decode error surfaces");
        assert_eq!(
            error,
            "malformed response: expected value at line 1 column 1"
        );
    }

    #[test]
    fn pre_cancelled_request_skips_transport() {
        let client = FakeServiceClient::with(FakeOutcome::Run(Ok(RunResponse::default())));
        let backend =
            HttpBackend::with_client_for_tests(Arc::clone(&client) as Arc<dyn ServiceClient>);

        let error = backend
            .execute(execute_request(), Arc::new(AtomicBool::new(true)))
            .expect_err("cancelled");
        assert_eq!(error, "request was cancelled");
        assert!(lock_unpoisoned(&client.observed_run).is_none());
    }

    #[test]
    fn invalid_base_url_fails_initialization() {
        let error = match HttpBackend::new(HttpBackendConfig::new().with_base_url("ftp://nope")) {
            Ok(_) => panic!("ftp base url must be rejected"),
            Err(error) => error,
        };
        assert!(error
            .message()
            .starts_with("Failed to initialize http backend: invalid base URL"));
    }
}
