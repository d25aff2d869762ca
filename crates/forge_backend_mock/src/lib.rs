//! Deterministic mock implementation of the shared `forge_backend` contract.
//!
//! This crate contains no transport logic and is intended for local
//! development and controller-level integration testing. Scripted outcomes are
//! consumed first; once a queue is empty the built-in simulation answers.

use std::collections::VecDeque;
use std::sync::atomic::Ordering;
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use forge_backend::{
    BackendProfile, CancelSignal, DebugRequest, DebugResult, ExecuteRequest, ExecuteResult,
    RemoteBackend,
};

/// Stable backend identifier used for explicit startup selection.
pub const MOCK_BACKEND_ID: &str = "mock";

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(5);

#[derive(Debug, Default)]
struct ScriptState {
    executions: VecDeque<Result<ExecuteResult, String>>,
    debugs: VecDeque<Result<DebugResult, String>>,
    execute_requests: Vec<ExecuteRequest>,
    debug_requests: Vec<DebugRequest>,
}

/// Deterministic mock backend used by `autodebugger` tests and local runs.
#[derive(Debug)]
pub struct MockBackend {
    latency: Duration,
    state: Mutex<ScriptState>,
}

impl MockBackend {
    /// Creates a mock backend that answers immediately using the built-in simulation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            latency: Duration::ZERO,
            state: Mutex::new(ScriptState::default()),
        }
    }

    /// Delays every answer by `latency`, polling the cancel signal meanwhile.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Queues an execution outcome to be returned by the next `execute` call.
    #[must_use]
    pub fn with_execution(self, outcome: Result<ExecuteResult, String>) -> Self {
        lock_unpoisoned(&self.state).executions.push_back(outcome);
        self
    }

    /// Queues a debug outcome to be returned by the next `debug` call.
    #[must_use]
    pub fn with_debug(self, outcome: Result<DebugResult, String>) -> Self {
        lock_unpoisoned(&self.state).debugs.push_back(outcome);
        self
    }

    /// Returns every execution request received so far, in order.
    #[must_use]
    pub fn execute_requests(&self) -> Vec<ExecuteRequest> {
        lock_unpoisoned(&self.state).execute_requests.clone()
    }

    /// Returns every debug request received so far, in order.
    #[must_use]
    pub fn debug_requests(&self) -> Vec<DebugRequest> {
        lock_unpoisoned(&self.state).debug_requests.clone()
    }

    fn wait_latency(&self, cancel: &CancelSignal) -> Result<(), String> {
        let deadline = Instant::now() + self.latency;
        loop {
            if cancel.load(Ordering::SeqCst) {
                return Err("request was cancelled".to_string());
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }

            thread::sleep(CANCEL_POLL_INTERVAL.min(deadline - now));
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteBackend for MockBackend {
    fn profile(&self) -> BackendProfile {
        BackendProfile {
            backend_id: MOCK_BACKEND_ID.to_string(),
            endpoint: None,
        }
    }

    fn execute(&self, req: ExecuteRequest, cancel: CancelSignal) -> Result<ExecuteResult, String> {
        let scripted = {
            let mut state = lock_unpoisoned(&self.state);
            state.execute_requests.push(req.clone());
            state.executions.pop_front()
        };

        self.wait_latency(&cancel)?;
        scripted.unwrap_or_else(|| Ok(simulate_execution(&req)))
    }

    fn debug(&self, req: DebugRequest, cancel: CancelSignal) -> Result<DebugResult, String> {
        let scripted = {
            let mut state = lock_unpoisoned(&self.state);
            state.debug_requests.push(req.clone());
            state.debugs.pop_front()
        };

        self.wait_latency(&cancel)?;
        scripted.unwrap_or_else(|| Ok(simulate_debug(&req)))
    }
}

fn simulate_execution(req: &ExecuteRequest) -> ExecuteResult {
    if has_division_by_zero(&req.code) {
        return ExecuteResult {
            logs: format!(
                "Traceback (most recent call last):\n  File \"/app/{}\"\nZeroDivisionError: division by zero\n",
                req.language.file_name()
            ),
            exit_code: Some(1),
        };
    }

    let line_count = req.code.lines().count();
    ExecuteResult {
        logs: format!(
            "[mock sandbox] {} executed ({line_count} lines, {})\n",
            req.language.file_name(),
            req.language.label()
        ),
        exit_code: Some(0),
    }
}

fn simulate_debug(req: &DebugRequest) -> DebugResult {
    let mut fixed_code = req
        .code
        .lines()
        .map(|line| {
            if line.trim_start().starts_with("high = len(arr)") && !line.contains("- 1") {
                let indent = &line[..line.len() - line.trim_start().len()];
                format!("{indent}high = len(arr) - 1")
            } else {
                line.trim_end().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    fixed_code.push('\n');

    let error = if req.logs.trim().is_empty() {
        "No execution output was provided."
    } else {
        req.logs.lines().last().unwrap_or_default()
    };

    DebugResult {
        fixed_code,
        analysis: format!(
            "**Error:** {error}\n\n**Root Cause:** Static review of `{}` found off-by-one bounds or formatting drift.\n\n**Fix:** Normalized the buffer and corrected loop bounds where detected.",
            req.language.file_name()
        ),
    }
}

fn has_division_by_zero(code: &str) -> bool {
    let compact: String = code.chars().filter(|ch| !ch.is_whitespace()).collect();
    compact.contains("/0") && !compact.contains("/0.")
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
