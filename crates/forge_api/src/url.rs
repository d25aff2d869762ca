use url::Url;

use crate::error::ForgeApiError;

/// Default base URL of a locally running DevForge service.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

pub const RUN_PATH: &str = "run";
pub const DEBUG_PATH: &str = "debug";

/// Resolve `path` against `base`.
///
/// Resolution rules:
/// 1) a blank base falls back to [`DEFAULT_BASE_URL`]
/// 2) the base is treated as a directory, so `http://host/api` yields `http://host/api/run`
/// 3) only `http` and `https` schemes are accepted
pub fn endpoint_url(base: &str, path: &str) -> Result<Url, ForgeApiError> {
    let base = if base.trim().is_empty() {
        DEFAULT_BASE_URL
    } else {
        base.trim()
    };

    let directory = format!("{}/", base.trim_end_matches('/'));
    let parsed = Url::parse(&directory)
        .map_err(|error| ForgeApiError::InvalidBaseUrl(format!("{base}: {error}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ForgeApiError::InvalidBaseUrl(format!(
            "{base}: unsupported scheme '{}'",
            parsed.scheme()
        )));
    }

    parsed
        .join(path.trim_start_matches('/'))
        .map_err(|error| ForgeApiError::InvalidBaseUrl(format!("{base}: {error}")))
}
