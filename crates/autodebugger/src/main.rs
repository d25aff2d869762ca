use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use autodebugger::app::{Action, App, Rejection};
use autodebugger::backends::backend_from_config;
use autodebugger::cli::{parse_cli_args, USAGE};
use autodebugger::commands::{parse_console_command, ConsoleCommand, EditCollector, HELP_TEXT};
use autodebugger::config::AppConfig;
use autodebugger::logging::init_file_logging;
use autodebugger::runtime::{RuntimeController, UiNotifier, UiSignal};
use autodebugger::sample::{SAMPLE_CODE, SAMPLE_LANGUAGE};
use autodebugger::tui::{render_view, RenderOptions};
use autodebugger::view::{project, ProjectionContext};
use forge_backend::Language;
use forge_tui::{
    prewarm_highlighting, render_markdown, terminal_columns, EnvConfig, Highlighter, ResizeFlag,
    Style,
};
use tracing::{info, warn};

const TICK: Duration = Duration::from_millis(100);

enum LoopEvent {
    Input(String),
    InputClosed,
    Ui(UiSignal),
}

fn main() -> Result<()> {
    let cli = parse_cli_args(std::env::args().skip(1)).map_err(anyhow::Error::msg)?;
    if cli.help {
        println!("{USAGE}");
        println!();
        for line in render_markdown(HELP_TEXT, 80, Style::plain()) {
            println!("{line}");
        }
        return Ok(());
    }

    let config = AppConfig::from_env()?;
    init_file_logging(&config.log_path)?;

    let env_config = EnvConfig::from_env();
    if env_config.highlight_enabled() {
        let _ = thread::Builder::new()
            .name("syntax-highlight-prewarm".to_string())
            .spawn(prewarm_highlighting);
    }

    let backend = backend_from_config(&config).map_err(anyhow::Error::msg)?;
    let profile = backend.profile();
    info!(backend = %profile.backend_id, endpoint = ?profile.endpoint, "autodebugger starting");

    let (language, code) = initial_buffer(cli.language, cli.load.as_deref())?;
    let app = Arc::new(Mutex::new(App::with_language(language)));

    let (sender, events) = mpsc::channel::<LoopEvent>();
    let ui_sender = Mutex::new(sender.clone());
    let notifier: Arc<dyn UiNotifier> = Arc::new(move |signal: UiSignal| {
        let _ = lock_unpoisoned(&ui_sender).send(LoopEvent::Ui(signal));
    });
    let host = RuntimeController::new(
        Arc::clone(&app),
        notifier,
        backend,
        config.operation_timeout,
    );

    thread::Builder::new()
        .name("autodebugger-stdin".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if sender.send(LoopEvent::Input(line)).is_err() {
                    return;
                }
            }
            let _ = sender.send(LoopEvent::InputClosed);
        })
        .context("failed to spawn stdin reader")?;

    let mut console = Console {
        app,
        host,
        context: ProjectionContext { backend: profile },
        highlighter: env_config
            .highlight_enabled()
            .then(Highlighter::new)
            .flatten(),
        style: Style::new(env_config.color_enabled()),
        env_config,
        editing: None,
        notices: Vec::new(),
        dirty: true,
    };
    if !code.is_empty() {
        console.dispatch([Action::EditCode(code)]);
    }

    let resize = ResizeFlag::register().ok();
    console.draw()?;

    loop {
        match events.recv_timeout(TICK) {
            Ok(LoopEvent::Input(line)) => console.handle_line(&line),
            Ok(LoopEvent::InputClosed) => console.dispatch([Action::Quit]),
            Ok(LoopEvent::Ui(UiSignal::DrainCompletions)) => {
                console.host.flush_pending_events();
            }
            Ok(LoopEvent::Ui(UiSignal::Render)) => console.dirty = true,
            Ok(LoopEvent::Ui(UiSignal::Stop)) => {}
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        console.host.flush_pending_events();
        if console.host.expire_overdue().is_some() {
            console.dirty = true;
        }
        if resize.as_ref().is_some_and(ResizeFlag::take) {
            console.dirty = true;
        }
        if lock_unpoisoned(&console.app).should_exit {
            break;
        }
        if console.dirty {
            console.draw()?;
        }
    }

    console.host.cancel_active();
    info!("autodebugger exiting");
    Ok(())
}

fn initial_buffer(language: Option<Language>, load: Option<&Path>) -> Result<(Language, String)> {
    match load {
        Some(path) => {
            let code = fs::read_to_string(path)
                .with_context(|| format!("failed to read '{}'", path.display()))?;
            let language = language
                .or_else(|| Language::detect(&code))
                .unwrap_or_default();
            Ok((language, code))
        }
        None => match language {
            None => Ok((SAMPLE_LANGUAGE, SAMPLE_CODE.to_string())),
            Some(language) if language == SAMPLE_LANGUAGE => {
                Ok((language, SAMPLE_CODE.to_string()))
            }
            Some(language) => Ok((language, String::new())),
        },
    }
}

struct Console {
    app: Arc<Mutex<App>>,
    host: Arc<RuntimeController>,
    context: ProjectionContext,
    env_config: EnvConfig,
    highlighter: Option<Highlighter>,
    style: Style,
    editing: Option<EditCollector>,
    notices: Vec<String>,
    dirty: bool,
}

impl Console {
    fn dispatch(&mut self, actions: impl IntoIterator<Item = Action>) {
        let outcome = {
            let mut app = lock_unpoisoned(&self.app);
            actions
                .into_iter()
                .try_for_each(|action| app.dispatch(action, &mut self.host))
        };
        if let Err(rejection) = outcome {
            self.reject(rejection);
        }
        self.dirty = true;
    }

    fn reject(&mut self, rejection: Rejection) {
        warn!(%rejection, "command rejected");
        self.notice(format!("Rejected: {rejection}"));
    }

    fn handle_line(&mut self, line: &str) {
        if let Some(collector) = self.editing.as_mut() {
            if let Some(code) = collector.push_line(line) {
                self.editing = None;
                self.dispatch([Action::EditCode(code)]);
            }
            return;
        }

        let Some(command) = parse_console_command(line) else {
            if !line.trim().is_empty() {
                self.notice("Commands start with '/'. Type /help for the list.".to_string());
            }
            return;
        };

        if let Some(action) = command.action() {
            self.dispatch([action]);
            return;
        }

        match command {
            ConsoleCommand::Edit => {
                let editable = lock_unpoisoned(&self.app).ensure_can_edit();
                match editable {
                    Ok(()) => {
                        self.editing = Some(EditCollector::new());
                        println!("Enter code; finish with a line containing a single '.'");
                    }
                    Err(rejection) => self.reject(rejection),
                }
            }
            ConsoleCommand::Load(path) => match fs::read_to_string(&path) {
                Ok(code) => self.dispatch([Action::EditCode(code)]),
                Err(error) => self.notice(format!("Could not read {}: {error}", path.display())),
            },
            ConsoleCommand::Save(path) => {
                let code = lock_unpoisoned(&self.app).code().to_string();
                match fs::write(&path, code) {
                    Ok(()) => self.notice(format!("Saved {}", path.display())),
                    Err(error) => {
                        self.notice(format!("Could not write {}: {error}", path.display()));
                    }
                }
            }
            ConsoleCommand::Sample => {
                let switch = (lock_unpoisoned(&self.app).language() != SAMPLE_LANGUAGE)
                    .then_some(Action::SetLanguage(SAMPLE_LANGUAGE));
                self.dispatch(
                    switch
                        .into_iter()
                        .chain([Action::EditCode(SAMPLE_CODE.to_string())]),
                );
            }
            ConsoleCommand::Show => self.dirty = true,
            ConsoleCommand::Help => {
                let width = self.width();
                self.notices
                    .extend(render_markdown(HELP_TEXT, width, self.style));
                self.dirty = true;
            }
            ConsoleCommand::Invalid(message) => self.notice(message),
            ConsoleCommand::Unknown(command) => {
                self.notice(format!("Unknown command {command}. Type /help for the list."));
            }
            ConsoleCommand::Run
            | ConsoleCommand::Debug
            | ConsoleCommand::Apply
            | ConsoleCommand::Reject
            | ConsoleCommand::Language(_)
            | ConsoleCommand::Tab(_)
            | ConsoleCommand::Quit => {}
        }
    }

    fn notice(&mut self, message: String) {
        self.notices.push(message);
        self.dirty = true;
    }

    fn width(&self) -> usize {
        usize::from(terminal_columns(&self.env_config))
    }

    fn draw(&mut self) -> Result<()> {
        if self.editing.is_some() {
            return Ok(());
        }

        let view = project(&lock_unpoisoned(&self.app), &self.context);
        let options = RenderOptions {
            width: self.width(),
            style: self.style,
            highlighter: self.highlighter.as_ref(),
        };

        let mut stdout = io::stdout().lock();
        if self.style.is_enabled() {
            write!(stdout, "\x1b[2J\x1b[H")?;
        }
        for line in render_view(&view, &options) {
            writeln!(stdout, "{line}")?;
        }
        for notice in self.notices.drain(..) {
            writeln!(stdout, "{notice}")?;
        }
        write!(stdout, "> ")?;
        stdout.flush()?;

        self.dirty = false;
        Ok(())
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
