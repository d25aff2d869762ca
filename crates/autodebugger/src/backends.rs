use std::sync::Arc;

use forge_backend::RemoteBackend;
use forge_backend_http::{HttpBackend, HttpBackendConfig, HTTP_BACKEND_ID};
use forge_backend_mock::{MockBackend, MOCK_BACKEND_ID};

use crate::config::AppConfig;

pub fn backend_from_config(config: &AppConfig) -> Result<Arc<dyn RemoteBackend>, String> {
    match config.backend_id.as_str() {
        MOCK_BACKEND_ID => Ok(Arc::new(MockBackend::default())),
        HTTP_BACKEND_ID => {
            let mut http_config = HttpBackendConfig::new();
            if let Some(base_url) = config.base_url.as_deref() {
                http_config = http_config.with_base_url(base_url);
            }
            if let Some(timeout) = config.request_timeout {
                http_config = http_config.with_timeout(timeout);
            }
            let backend = HttpBackend::new(http_config).map_err(|error| error.to_string())?;
            Ok(Arc::new(backend))
        }
        unknown => Err(format!(
            "Unsupported backend '{unknown}'. Available backends: {MOCK_BACKEND_ID}, {HTTP_BACKEND_ID}"
        )),
    }
}
