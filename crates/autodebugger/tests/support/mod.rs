#![allow(dead_code)]

use autodebugger::app::{App, HostOps, OpId, RemoteJob};
use forge_backend::{DebugResult, ExecuteResult};

#[derive(Default)]
pub struct HostSpy {
    pub next_op_id: OpId,
    pub started: Vec<(OpId, RemoteJob)>,
    pub start_error: Option<String>,
    pub render_requests: usize,
    pub stop_requests: usize,
}

impl HostSpy {
    pub fn new() -> Self {
        Self {
            next_op_id: 1,
            ..Self::default()
        }
    }

    pub fn failing_with(error: &str) -> Self {
        Self {
            start_error: Some(error.to_string()),
            ..Self::new()
        }
    }

    pub fn last_op_id(&self) -> OpId {
        self.started
            .last()
            .map(|(op_id, _)| *op_id)
            .expect("an operation was started")
    }
}

impl HostOps for HostSpy {
    fn start_operation(&mut self, job: RemoteJob) -> Result<OpId, String> {
        if let Some(error) = self.start_error.clone() {
            return Err(error);
        }
        let op_id = self.next_op_id;
        self.next_op_id += 1;
        self.started.push((op_id, job));
        Ok(op_id)
    }

    fn request_render(&mut self) {
        self.render_requests += 1;
    }

    fn request_stop(&mut self) {
        self.stop_requests += 1;
    }
}

pub fn session_with_code(code: &str, host: &mut HostSpy) -> App {
    let mut app = App::new();
    app.edit_code(code.to_string(), host).expect("edit accepted");
    app
}

pub fn logs(text: &str) -> Result<ExecuteResult, String> {
    Ok(ExecuteResult {
        logs: text.to_string(),
        exit_code: Some(0),
    })
}

pub fn fix(fixed_code: &str, analysis: &str) -> Result<DebugResult, String> {
    Ok(DebugResult {
        fixed_code: fixed_code.to_string(),
        analysis: analysis.to_string(),
    })
}

/// Drives a session into review of `fixed_code`, starting from `code`.
pub fn reviewing_session(code: &str, fixed_code: &str, host: &mut HostSpy) -> App {
    let mut app = session_with_code(code, host);
    app.debug(host).expect("debug accepted");
    let op_id = host.last_op_id();
    app.on_debug_finished(op_id, fix(fixed_code, "Added explicit return."));
    app
}
