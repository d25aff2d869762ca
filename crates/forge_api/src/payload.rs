use serde::{Deserialize, Serialize};

/// Body of `POST /run`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunPayload {
    pub code: String,
    pub language: String,
}

impl RunPayload {
    pub fn new(code: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            language: language.into(),
        }
    }
}

/// Response of `POST /run`. Missing or null fields decode as absent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunResponse {
    #[serde(default)]
    pub exit_code: Option<i32>,
    #[serde(default)]
    pub logs: Option<String>,
}

/// Body of `POST /debug`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugPayload {
    pub code: String,
    pub language: String,
    pub logs: String,
    pub model: String,
}

impl DebugPayload {
    pub fn new(
        code: impl Into<String>,
        language: impl Into<String>,
        logs: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            language: language.into(),
            logs: logs.into(),
            model: model.into(),
        }
    }
}

/// Response of `POST /debug`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DebugResponse {
    #[serde(default)]
    pub analysis: Option<String>,
    #[serde(default, alias = "fixedCode")]
    pub fixed_code: Option<String>,
}
