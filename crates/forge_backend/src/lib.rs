//! Minimal backend-agnostic contract for remote execution and auto-debugging.
//!
//! This crate defines the request/response values exchanged with a remote
//! backend and the [`RemoteBackend`] trait. It excludes transport details,
//! wire payloads, and session state.

use std::fmt;
use std::str::FromStr;
use std::sync::{atomic::AtomicBool, Arc, OnceLock};

use regex::Regex;

/// Identifier for one remote operation.
pub type OpId = u64;

/// Shared cancellation flag for an in-flight remote operation.
pub type CancelSignal = Arc<AtomicBool>;

/// Languages the remote sandbox can execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    Python,
    JavaScript,
    Cpp,
    Java,
}

impl Language {
    pub const ALL: [Language; 4] = [
        Language::Python,
        Language::JavaScript,
        Language::Cpp,
        Language::Java,
    ];

    /// Wire identifier sent to the backend.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::Cpp => "cpp",
            Self::Java => "java",
        }
    }

    /// Human-readable runtime label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Python => "Python 3.10",
            Self::JavaScript => "Node.js 18",
            Self::Cpp => "C++ (g++)",
            Self::Java => "Java 17",
        }
    }

    /// File name the sandbox writes the buffer to.
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Python => "main.py",
            Self::JavaScript => "main.js",
            Self::Cpp => "main.cpp",
            Self::Java => "main.java",
        }
    }

    /// File extension used to look up a syntax definition.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Python => "py",
            Self::JavaScript => "js",
            Self::Cpp => "cpp",
            Self::Java => "java",
        }
    }

    /// Guesses the language of `code` from characteristic syntax.
    ///
    /// Returns `None` when nothing matches. Java is checked before C++ and
    /// Python before JavaScript, so mixed snippets resolve deterministically.
    #[must_use]
    pub fn detect(code: &str) -> Option<Self> {
        let code = code.trim();
        if code.is_empty() {
            return None;
        }

        if java_class_regex().is_match(code) || code.contains("System.out.println") {
            return Some(Self::Java);
        }

        if code.contains("#include") && (code.contains("<iostream>") || code.contains("<vector>"))
        {
            return Some(Self::Cpp);
        }

        let first_line = code.lines().next().unwrap_or_default();
        if python_def_regex().is_match(code)
            || (code.starts_with("import ") && !first_line.contains(';'))
        {
            return Some(Self::Python);
        }

        if code.contains("console.log") || js_function_regex().is_match(code) {
            return Some(Self::JavaScript);
        }

        None
    }
}

fn java_class_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| Regex::new(r"public\s+class\s+\w+").expect("java regex must compile"))
}

fn python_def_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| Regex::new(r"def\s+\w+\(.*\):").expect("python regex must compile"))
}

fn js_function_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| {
        Regex::new(r"function\s+\w+\(.*\)\s*\{").expect("javascript regex must compile")
    })
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "python" | "py" => Ok(Self::Python),
            "javascript" | "js" | "node" => Ok(Self::JavaScript),
            "cpp" | "c++" | "cxx" => Ok(Self::Cpp),
            "java" => Ok(Self::Java),
            other => {
                let supported = Self::ALL.map(Language::id).join(", ");
                Err(format!(
                    "Unsupported language '{other}'. Supported languages: {supported}"
                ))
            }
        }
    }
}

/// Error returned while constructing a backend before any operation starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendInitError {
    message: String,
}

impl BackendInitError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for BackendInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for BackendInitError {}

impl From<String> for BackendInitError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for BackendInitError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Input for one remote execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteRequest {
    pub op_id: OpId,
    pub code: String,
    pub language: Language,
}

/// Output of one remote execution.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecuteResult {
    pub logs: String,
    pub exit_code: Option<i32>,
}

/// Input for one auto-debug request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugRequest {
    pub op_id: OpId,
    pub code: String,
    pub language: Language,
    pub logs: String,
    pub model: String,
}

/// Proposed fix returned by an auto-debug request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DebugResult {
    pub fixed_code: String,
    pub analysis: String,
}

/// Immutable metadata describing a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendProfile {
    pub backend_id: String,
    pub endpoint: Option<String>,
}

/// Backend interface for the two remote operations.
///
/// Implementations never touch session state; they return immutable values or
/// a failure description which the caller applies.
pub trait RemoteBackend: Send + Sync + 'static {
    /// Returns backend identity metadata.
    fn profile(&self) -> BackendProfile;

    /// Executes the buffer in the remote sandbox.
    fn execute(&self, req: ExecuteRequest, cancel: CancelSignal) -> Result<ExecuteResult, String>;

    /// Requests an automated fix for the buffer given the last execution output.
    fn debug(&self, req: DebugRequest, cancel: CancelSignal) -> Result<DebugResult, String>;
}
