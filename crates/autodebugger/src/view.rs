//! Pure projection from session state to what the console draws.
//!
//! Nothing here mutates [`App`]; the renderer in [`crate::tui`] consumes the
//! resulting [`View`].

use forge_backend::{BackendProfile, Language};
use forge_tui::SplitDiff;

use crate::app::{App, Mode, Tab};

pub const APP_TITLE: &str = "DevForge AutoDebugger";
pub const DIFF_ACTIVE_LABEL: &str = "Diff View Active";
pub const OUTPUT_EMPTY_HINT: &str = "No output yet. Use /run to start.";
pub const DIAGNOSIS_EMPTY_HINT: &str = "Run the Auto-Debugger (/debug) to see AI Analysis here.";
pub const REVIEW_TIP: &str =
    "Review the changes in the split view above. Use /apply to accept them or /reject to keep your code.";
pub const NO_CHANGES_LABEL: &str = "No changes proposed: the fix is identical to the buffer.";

/// Inputs to the projection that do not live in the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionContext {
    pub backend: BackendProfile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorSurface {
    Buffer {
        text: String,
        language: Language,
    },
    Diff {
        original: String,
        proposed: String,
        language: Language,
        unchanged: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelContent {
    Output {
        text: String,
        exit_code: Option<i32>,
    },
    Diagnosis {
        markdown: String,
        review_tip: Option<&'static str>,
    },
    Empty {
        hint: &'static str,
    },
}

/// Which controls accept input right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub run: bool,
    pub debug: bool,
    pub apply: bool,
    pub reject: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBar {
    pub file_name: &'static str,
    pub language_label: &'static str,
    pub line_count: usize,
    pub backend: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub title: &'static str,
    pub mode: Mode,
    pub mode_label: Option<&'static str>,
    pub editor: EditorSurface,
    pub controls: Controls,
    pub busy_label: Option<&'static str>,
    pub active_tab: Tab,
    pub panel: PanelContent,
    pub language_hint: Option<String>,
    pub status: StatusBar,
}

pub fn project(app: &App, context: &ProjectionContext) -> View {
    let language = app.language();
    let editor = match app.mode() {
        Mode::Editing => EditorSurface::Buffer {
            text: app.code().to_string(),
            language,
        },
        Mode::Reviewing => EditorSurface::Diff {
            original: app.code().to_string(),
            proposed: app.proposed_fix().to_string(),
            language,
            unchanged: SplitDiff::new(app.code(), app.proposed_fix()).is_unchanged(),
        },
    };

    View {
        title: APP_TITLE,
        mode: app.mode(),
        mode_label: (app.mode() == Mode::Reviewing).then_some(DIFF_ACTIVE_LABEL),
        editor,
        controls: controls(app),
        busy_label: app.pending().map(|pending| pending.kind.busy_label()),
        active_tab: app.active_tab(),
        panel: panel(app),
        language_hint: language_hint(app),
        status: StatusBar {
            file_name: language.file_name(),
            language_label: language.label(),
            line_count: app.code().lines().count(),
            backend: backend_label(&context.backend),
        },
    }
}

fn controls(app: &App) -> Controls {
    let idle = !app.is_busy();
    let editing = app.mode() == Mode::Editing;
    Controls {
        run: idle && editing,
        debug: idle && editing,
        apply: idle && !editing,
        reject: idle && !editing,
    }
}

fn panel(app: &App) -> PanelContent {
    match app.active_tab() {
        Tab::Output if app.last_output().is_empty() => PanelContent::Empty {
            hint: OUTPUT_EMPTY_HINT,
        },
        Tab::Output => PanelContent::Output {
            text: app.last_output().to_string(),
            exit_code: app.last_exit_code(),
        },
        Tab::Diagnosis if app.diagnosis().is_empty() => PanelContent::Empty {
            hint: DIAGNOSIS_EMPTY_HINT,
        },
        Tab::Diagnosis => PanelContent::Diagnosis {
            markdown: app.diagnosis().to_string(),
            review_tip: (app.mode() == Mode::Reviewing).then_some(REVIEW_TIP),
        },
    }
}

fn language_hint(app: &App) -> Option<String> {
    if app.mode() != Mode::Editing {
        return None;
    }

    let detected = Language::detect(app.code())?;
    if detected == app.language() {
        return None;
    }

    Some(format!(
        "Buffer looks like {}; switch with /lang {}",
        detected.label(),
        detected.id()
    ))
}

fn backend_label(profile: &BackendProfile) -> String {
    match profile.endpoint.as_deref() {
        Some(endpoint) => format!("{} @ {endpoint}", profile.backend_id),
        None => profile.backend_id.clone(),
    }
}
