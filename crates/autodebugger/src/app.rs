use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use forge_backend::{DebugResult, ExecuteResult, Language};
use thiserror::Error;
use tracing::{debug, info, warn};

pub use forge_backend::OpId;

pub const READY_OUTPUT: &str = "Ready to execute...";
pub const LANGUAGE_SWITCHED_OUTPUT: &str = "Language switched. Ready.";
pub const NOTHING_TO_RUN_OUTPUT: &str = "Nothing to run. Write some code first.";
pub const NOTHING_TO_DEBUG_OUTPUT: &str = "Nothing to debug. Write some code first.";
pub const NO_OUTPUT_RETURNED: &str = "No output returned.";
pub const NO_DIAGNOSIS_RETURNED: &str = "No diagnosis returned.";
pub const MISSING_FIX_ERROR: &str = "debug response did not include a proposed fix";
pub const FIX_APPLIED_OUTPUT: &str = "Fix applied. Run the code to verify.";
pub const FIX_REJECTED_OUTPUT: &str = "Fix rejected. Restored original code.";

/// Model identifier sent with every auto-debug request.
pub const DEBUG_MODEL: &str = "qwen2.5-coder";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Editing,
    Reviewing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Output,
    Diagnosis,
}

impl Tab {
    pub fn title(self) -> &'static str {
        match self {
            Self::Output => "Terminal Output",
            Self::Diagnosis => "AI Analysis & Fix Logic",
        }
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "output" | "terminal" => Ok(Self::Output),
            "diagnosis" | "analysis" => Ok(Self::Diagnosis),
            other => Err(format!(
                "Unknown tab '{other}'. Available tabs: output, diagnosis"
            )),
        }
    }
}

/// Kind of remote operation occupying the single-flight slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Execute,
    Debug,
}

impl OpKind {
    /// Prefix prepended to failure descriptions surfaced in the output panel.
    pub fn error_prefix(self) -> &'static str {
        match self {
            Self::Execute => "System Error",
            Self::Debug => "AI Error",
        }
    }

    pub fn busy_label(self) -> &'static str {
        match self {
            Self::Execute => "Compiling & Running in Sandbox...",
            Self::Debug => "AI is analyzing stack traces & generating patches...",
        }
    }

    fn noun(self) -> &'static str {
        match self {
            Self::Execute => "execution",
            Self::Debug => "debug request",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingOp {
    pub op_id: OpId,
    pub kind: OpKind,
}

/// Why an operation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("another operation is still in flight")]
    Busy,
    #[error("the buffer is blank")]
    BlankBuffer,
    #[error("resolve the proposed fix with /apply or /reject first")]
    NotEditing,
    #[error("there is no proposed fix to review")]
    NotReviewing,
}

/// Work handed to the host when a remote operation starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteJob {
    Execute {
        code: String,
        language: Language,
    },
    Debug {
        code: String,
        language: Language,
        logs: String,
        model: String,
    },
}

impl RemoteJob {
    pub fn kind(&self) -> OpKind {
        match self {
            Self::Execute { .. } => OpKind::Execute,
            Self::Debug { .. } => OpKind::Debug,
        }
    }
}

pub trait HostOps {
    /// Starts `job` in the background and returns its operation id.
    fn start_operation(&mut self, job: RemoteJob) -> Result<OpId, String>;
    fn request_render(&mut self);
    fn request_stop(&mut self);
}

/// Every state transition of the session, as a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetLanguage(Language),
    EditCode(String),
    Run,
    Debug,
    ApplyFix,
    RejectFix,
    SetActiveTab(Tab),
    ExecuteFinished {
        op_id: OpId,
        outcome: Result<ExecuteResult, String>,
    },
    DebugFinished {
        op_id: OpId,
        outcome: Result<DebugResult, String>,
    },
    OperationTimedOut {
        op_id: OpId,
        after: Duration,
    },
    Quit,
}

/// Session workflow controller.
///
/// Owns the code buffer and every result derived from it. All mutation goes
/// through the named operations below (or [`App::dispatch`]); remote results
/// are applied only through the completion handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct App {
    language: Language,
    code: String,
    last_output: String,
    last_exit_code: Option<i32>,
    diagnosis: String,
    proposed_fix: String,
    mode: Mode,
    pending: Option<PendingOp>,
    active_tab: Tab,
    pub should_exit: bool,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self::with_language(Language::default())
    }

    pub fn with_language(language: Language) -> Self {
        Self {
            language,
            code: String::new(),
            last_output: READY_OUTPUT.to_string(),
            last_exit_code: None,
            diagnosis: String::new(),
            proposed_fix: String::new(),
            mode: Mode::Editing,
            pending: None,
            active_tab: Tab::Output,
            should_exit: false,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn last_output(&self) -> &str {
        &self.last_output
    }

    /// Exit code of the most recent execution, while its output is still shown.
    pub fn last_exit_code(&self) -> Option<i32> {
        self.last_exit_code
    }

    pub fn diagnosis(&self) -> &str {
        &self.diagnosis
    }

    pub fn proposed_fix(&self) -> &str {
        &self.proposed_fix
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn pending(&self) -> Option<PendingOp> {
        self.pending
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    /// Routes `action` to the matching operation or completion handler.
    pub fn dispatch(&mut self, action: Action, host: &mut dyn HostOps) -> Result<(), Rejection> {
        match action {
            Action::SetLanguage(language) => self.set_language(language, host),
            Action::EditCode(text) => self.edit_code(text, host),
            Action::Run => self.run(host),
            Action::Debug => self.debug(host),
            Action::ApplyFix => self.apply_fix(host),
            Action::RejectFix => self.reject_fix(host),
            Action::SetActiveTab(tab) => {
                self.set_active_tab(tab, host);
                Ok(())
            }
            Action::ExecuteFinished { op_id, outcome } => {
                self.on_execute_finished(op_id, outcome);
                host.request_render();
                Ok(())
            }
            Action::DebugFinished { op_id, outcome } => {
                self.on_debug_finished(op_id, outcome);
                host.request_render();
                Ok(())
            }
            Action::OperationTimedOut { op_id, after } => {
                self.on_operation_timed_out(op_id, after);
                host.request_render();
                Ok(())
            }
            Action::Quit => {
                self.on_quit(host);
                Ok(())
            }
        }
    }

    pub fn set_language(
        &mut self,
        language: Language,
        host: &mut dyn HostOps,
    ) -> Result<(), Rejection> {
        self.ensure_idle()?;

        info!(from = %self.language, to = %language, "language switched");
        self.language = language;
        self.code.clear();
        self.mode = Mode::Editing;
        self.set_output(LANGUAGE_SWITCHED_OUTPUT);
        host.request_render();
        Ok(())
    }

    pub fn edit_code(&mut self, text: String, host: &mut dyn HostOps) -> Result<(), Rejection> {
        self.ensure_can_edit()?;

        self.code = text;
        host.request_render();
        Ok(())
    }

    pub fn run(&mut self, host: &mut dyn HostOps) -> Result<(), Rejection> {
        self.ensure_idle()?;
        self.ensure_editing()?;
        if self.code.trim().is_empty() {
            self.set_output(NOTHING_TO_RUN_OUTPUT);
            host.request_render();
            return Err(Rejection::BlankBuffer);
        }

        self.active_tab = Tab::Output;
        self.start(
            RemoteJob::Execute {
                code: self.code.clone(),
                language: self.language,
            },
            host,
        );
        Ok(())
    }

    pub fn debug(&mut self, host: &mut dyn HostOps) -> Result<(), Rejection> {
        self.ensure_idle()?;
        self.ensure_editing()?;
        if self.code.trim().is_empty() {
            self.set_output(NOTHING_TO_DEBUG_OUTPUT);
            host.request_render();
            return Err(Rejection::BlankBuffer);
        }

        self.start(
            RemoteJob::Debug {
                code: self.code.clone(),
                language: self.language,
                logs: self.last_output.clone(),
                model: DEBUG_MODEL.to_string(),
            },
            host,
        );
        Ok(())
    }

    pub fn apply_fix(&mut self, host: &mut dyn HostOps) -> Result<(), Rejection> {
        self.ensure_idle()?;
        self.ensure_reviewing()?;

        self.code = self.proposed_fix.clone();
        self.mode = Mode::Editing;
        self.active_tab = Tab::Output;
        self.set_output(FIX_APPLIED_OUTPUT);
        info!("proposed fix applied");
        host.request_render();
        Ok(())
    }

    pub fn reject_fix(&mut self, host: &mut dyn HostOps) -> Result<(), Rejection> {
        self.ensure_idle()?;
        self.ensure_reviewing()?;

        self.mode = Mode::Editing;
        self.set_output(FIX_REJECTED_OUTPUT);
        info!("proposed fix rejected");
        host.request_render();
        Ok(())
    }

    pub fn set_active_tab(&mut self, tab: Tab, host: &mut dyn HostOps) {
        self.active_tab = tab;
        host.request_render();
    }

    pub fn on_quit(&mut self, host: &mut dyn HostOps) {
        self.should_exit = true;
        host.request_stop();
    }

    pub fn on_execute_finished(&mut self, op_id: OpId, outcome: Result<ExecuteResult, String>) {
        if !self.release(op_id, OpKind::Execute) {
            return;
        }

        self.active_tab = Tab::Output;
        match outcome {
            Ok(result) => {
                debug!(op_id, exit_code = ?result.exit_code, "execution finished");
                if result.logs.is_empty() {
                    self.last_output = NO_OUTPUT_RETURNED.to_string();
                } else {
                    self.last_output = result.logs;
                }
                self.last_exit_code = result.exit_code;
            }
            Err(error) => {
                warn!(op_id, %error, "execution failed");
                self.set_failure(OpKind::Execute, &error);
            }
        }
    }

    pub fn on_debug_finished(&mut self, op_id: OpId, outcome: Result<DebugResult, String>) {
        if !self.release(op_id, OpKind::Debug) {
            return;
        }

        match outcome {
            Ok(result) if result.fixed_code.trim().is_empty() => {
                warn!(op_id, "debug response carried no fix");
                self.set_failure(OpKind::Debug, MISSING_FIX_ERROR);
            }
            Ok(result) => {
                debug!(op_id, "debug finished with a proposed fix");
                self.proposed_fix = result.fixed_code;
                self.diagnosis = if result.analysis.trim().is_empty() {
                    NO_DIAGNOSIS_RETURNED.to_string()
                } else {
                    result.analysis
                };
                self.mode = Mode::Reviewing;
                self.active_tab = Tab::Diagnosis;
            }
            Err(error) => {
                warn!(op_id, %error, "debug request failed");
                self.set_failure(OpKind::Debug, &error);
            }
        }
    }

    /// Releases the slot of an operation whose deadline passed.
    pub fn on_operation_timed_out(&mut self, op_id: OpId, after: Duration) {
        let Some(pending) = self.pending.filter(|pending| pending.op_id == op_id) else {
            debug!(op_id, "ignoring timeout for inactive operation");
            return;
        };

        self.pending = None;
        warn!(op_id, ?after, "operation timed out");
        let description = format!(
            "{} timed out after {}",
            pending.kind.noun(),
            format_duration(after)
        );
        if pending.kind == OpKind::Execute {
            self.active_tab = Tab::Output;
        }
        self.set_failure(pending.kind, &description);
    }

    fn start(&mut self, job: RemoteJob, host: &mut dyn HostOps) {
        let kind = job.kind();
        match host.start_operation(job) {
            Ok(op_id) => {
                info!(op_id, ?kind, language = %self.language, "operation started");
                self.pending = Some(PendingOp { op_id, kind });
            }
            Err(error) => {
                warn!(?kind, %error, "operation failed to start");
                self.set_failure(kind, &error);
            }
        }
        host.request_render();
    }

    fn release(&mut self, op_id: OpId, kind: OpKind) -> bool {
        let matches = self.pending == Some(PendingOp { op_id, kind });
        if matches {
            self.pending = None;
        } else {
            debug!(op_id, ?kind, pending = ?self.pending, "ignoring stale completion");
        }
        matches
    }

    fn set_output(&mut self, text: &str) {
        self.last_output = text.to_string();
        self.last_exit_code = None;
    }

    fn set_failure(&mut self, kind: OpKind, description: &str) {
        self.last_output = format!("{}: {description}", kind.error_prefix());
        self.last_exit_code = None;
    }

    /// Checks whether [`App::edit_code`] would accept a new buffer right now.
    pub fn ensure_can_edit(&self) -> Result<(), Rejection> {
        self.ensure_idle()?;
        self.ensure_editing()
    }

    fn ensure_idle(&self) -> Result<(), Rejection> {
        if self.is_busy() {
            Err(Rejection::Busy)
        } else {
            Ok(())
        }
    }

    fn ensure_editing(&self) -> Result<(), Rejection> {
        match self.mode {
            Mode::Editing => Ok(()),
            Mode::Reviewing => Err(Rejection::NotEditing),
        }
    }

    fn ensure_reviewing(&self) -> Result<(), Rejection> {
        match self.mode {
            Mode::Reviewing => Ok(()),
            Mode::Editing => Err(Rejection::NotReviewing),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Editing => f.write_str("editing"),
            Self::Reviewing => f.write_str("reviewing"),
        }
    }
}

fn format_duration(duration: Duration) -> String {
    if duration.subsec_nanos() == 0 {
        format!("{} s", duration.as_secs())
    } else {
        format!("{} ms", duration.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_parsing_accepts_panel_aliases() {
        assert_eq!("output".parse::<Tab>(), Ok(Tab::Output));
        assert_eq!("Terminal".parse::<Tab>(), Ok(Tab::Output));
        assert_eq!("analysis".parse::<Tab>(), Ok(Tab::Diagnosis));
        assert!("logs"
            .parse::<Tab>()
            .expect_err("unknown tab")
            .contains("Unknown tab 'logs'"));
    }

    #[test]
    fn durations_render_in_whole_seconds_when_possible() {
        assert_eq!(format_duration(Duration::from_secs(60)), "60 s");
        assert_eq!(format_duration(Duration::from_millis(250)), "250 ms");
    }

    #[test]
    fn new_session_starts_idle_in_editing_mode() {
        let app = App::new();
        assert_eq!(app.language(), Language::Python);
        assert_eq!(app.code(), "");
        assert_eq!(app.last_output(), READY_OUTPUT);
        assert_eq!(app.mode(), Mode::Editing);
        assert_eq!(app.active_tab(), Tab::Output);
        assert!(!app.is_busy());
        assert!(!app.should_exit);
    }

    #[test]
    fn remote_job_reports_its_kind() {
        let job = RemoteJob::Execute {
            code: "print(1)".to_string(),
            language: Language::Python,
        };
        assert_eq!(job.kind(), OpKind::Execute);
        assert_eq!(OpKind::Debug.error_prefix(), "AI Error");
        assert_eq!(
            OpKind::Execute.busy_label(),
            "Compiling & Running in Sandbox..."
        );
    }
}
