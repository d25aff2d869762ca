use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use forge_backend::{
    CancelSignal, DebugRequest, DebugResult, ExecuteRequest, ExecuteResult, RemoteBackend,
};
use tracing::{debug, warn};

use crate::app::{App, HostOps, OpId, OpKind, RemoteJob};

pub const ERROR_OPERATION_ALREADY_ACTIVE: &str = "Operation already active";

/// Result of a remote call, buffered until the UI thread applies it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Executed {
        op_id: OpId,
        outcome: Result<ExecuteResult, String>,
    },
    Debugged {
        op_id: OpId,
        outcome: Result<DebugResult, String>,
    },
}

impl Completion {
    fn op_id(&self) -> OpId {
        match self {
            Self::Executed { op_id, .. } | Self::Debugged { op_id, .. } => *op_id,
        }
    }
}

/// Requests sent from the runtime to the UI loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiSignal {
    DrainCompletions,
    Render,
    Stop,
}

pub trait UiNotifier: Send + Sync {
    fn notify(&self, signal: UiSignal);
}

impl<F> UiNotifier for F
where
    F: Fn(UiSignal) + Send + Sync,
{
    fn notify(&self, signal: UiSignal) {
        self(signal)
    }
}

struct ActiveOp {
    op_id: OpId,
    kind: OpKind,
    deadline: Instant,
    cancel: CancelSignal,
    join_handle: Option<JoinHandle<()>>,
}

/// Single-flight host for remote operations.
///
/// Each operation runs on its own worker thread. Completions are queued and
/// applied to `App` only by [`RuntimeController::flush_pending_events`], which
/// the UI loop calls from its own thread.
pub struct RuntimeController {
    app: Arc<Mutex<App>>,
    notifier: Arc<dyn UiNotifier>,
    backend: Arc<dyn RemoteBackend>,
    pending_events: Mutex<VecDeque<Completion>>,
    next_op_id: AtomicU64,
    active_op: Mutex<Option<ActiveOp>>,
    operation_timeout: Duration,
}

impl RuntimeController {
    pub fn new(
        app: Arc<Mutex<App>>,
        notifier: Arc<dyn UiNotifier>,
        backend: Arc<dyn RemoteBackend>,
        operation_timeout: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            app,
            notifier,
            backend,
            pending_events: Mutex::new(VecDeque::new()),
            next_op_id: AtomicU64::new(1),
            active_op: Mutex::new(None),
            operation_timeout,
        })
    }

    pub fn active_op_id(&self) -> Option<OpId> {
        self.lock_active_op().as_ref().map(|active| active.op_id)
    }

    fn start_internal(self: &Arc<Self>, job: RemoteJob) -> Result<OpId, String> {
        let mut active_op = self.lock_active_op();
        if active_op.is_some() {
            return Err(ERROR_OPERATION_ALREADY_ACTIVE.to_string());
        }

        let op_id = self.next_op_id.fetch_add(1, Ordering::SeqCst);
        let kind = job.kind();
        let cancel: CancelSignal = Arc::new(AtomicBool::new(false));
        let join_handle = self.spawn_worker(op_id, job, Arc::clone(&cancel))?;

        *active_op = Some(ActiveOp {
            op_id,
            kind,
            deadline: Instant::now() + self.operation_timeout,
            cancel,
            join_handle: Some(join_handle),
        });

        Ok(op_id)
    }

    fn spawn_worker(
        self: &Arc<Self>,
        op_id: OpId,
        job: RemoteJob,
        cancel: CancelSignal,
    ) -> Result<JoinHandle<()>, String> {
        let controller = Arc::clone(self);
        thread::Builder::new()
            .name(format!("autodebugger-op-{op_id}"))
            .spawn(move || controller.run_worker(op_id, job, cancel))
            .map_err(|error| format!("Failed to spawn operation worker: {error}"))
    }

    fn run_worker(self: Arc<Self>, op_id: OpId, job: RemoteJob, cancel: CancelSignal) {
        let backend = Arc::clone(&self.backend);
        let completion = match job {
            RemoteJob::Execute { code, language } => {
                let request = ExecuteRequest {
                    op_id,
                    code,
                    language,
                };
                let outcome = catch_unwind(AssertUnwindSafe(|| backend.execute(request, cancel)))
                    .unwrap_or_else(|_| Err("Remote backend panicked".to_string()));
                Completion::Executed { op_id, outcome }
            }
            RemoteJob::Debug {
                code,
                language,
                logs,
                model,
            } => {
                let request = DebugRequest {
                    op_id,
                    code,
                    language,
                    logs,
                    model,
                };
                let outcome = catch_unwind(AssertUnwindSafe(|| backend.debug(request, cancel)))
                    .unwrap_or_else(|_| Err("Remote backend panicked".to_string()));
                Completion::Debugged { op_id, outcome }
            }
        };

        self.enqueue_completion(completion);
    }

    fn enqueue_completion(&self, completion: Completion) {
        let should_drain = {
            let mut queue = lock_unpoisoned(&self.pending_events);
            let should_drain = queue.is_empty();
            queue.push_back(completion);
            should_drain
        };

        if should_drain {
            self.notifier.notify(UiSignal::DrainCompletions);
        }
    }

    /// Applies every queued completion to `App` and schedules a render.
    ///
    /// Must be called from the thread that owns the UI loop.
    pub fn flush_pending_events(&self) -> usize {
        let mut drained = 0usize;

        loop {
            let completion = lock_unpoisoned(&self.pending_events).pop_front();
            match completion {
                Some(completion) => {
                    self.apply_completion(completion);
                    drained += 1;
                }
                None => break,
            }
        }

        if drained > 0 {
            self.notifier.notify(UiSignal::Render);
        }

        drained
    }

    /// Releases the slot of an operation past its deadline.
    ///
    /// The worker is signalled to cancel but not joined; its eventual
    /// completion is discarded as stale.
    pub fn expire_overdue(&self) -> Option<OpId> {
        self.expire_overdue_at(Instant::now())
    }

    fn expire_overdue_at(&self, now: Instant) -> Option<OpId> {
        let expired = {
            let mut active_op = self.lock_active_op();
            let overdue = active_op
                .as_ref()
                .is_some_and(|active| now >= active.deadline);
            if overdue {
                active_op.take()
            } else {
                None
            }
        }?;

        expired.cancel.store(true, Ordering::SeqCst);
        warn!(op_id = expired.op_id, kind = ?expired.kind, "operation deadline passed");
        lock_unpoisoned(&self.app).on_operation_timed_out(expired.op_id, self.operation_timeout);
        self.notifier.notify(UiSignal::Render);
        Some(expired.op_id)
    }

    /// Signals the active operation, if any, to stop.
    pub fn cancel_active(&self) {
        if let Some(active) = self.lock_active_op().as_ref() {
            debug!(op_id = active.op_id, "cancelling active operation");
            active.cancel.store(true, Ordering::SeqCst);
        }
    }

    fn apply_completion(&self, completion: Completion) {
        let op_id = completion.op_id();

        {
            let mut app = lock_unpoisoned(&self.app);
            match completion {
                Completion::Executed { op_id, outcome } => app.on_execute_finished(op_id, outcome),
                Completion::Debugged { op_id, outcome } => app.on_debug_finished(op_id, outcome),
            }
        }

        self.clear_active_op_if_matching(op_id);
    }

    fn clear_active_op_if_matching(&self, op_id: OpId) {
        let mut active_op = self.lock_active_op();
        let matches = active_op.as_ref().map(|active| active.op_id) == Some(op_id);
        if !matches {
            return;
        }

        let mut completed = match active_op.take() {
            Some(completed) => completed,
            None => return,
        };

        if let Some(join_handle) = completed.join_handle.take() {
            let is_current_thread = join_handle.thread().id() == thread::current().id();
            if !is_current_thread && join_handle.is_finished() {
                let _ = join_handle.join();
            }
        }
    }

    fn lock_active_op(&self) -> MutexGuard<'_, Option<ActiveOp>> {
        lock_unpoisoned(&self.active_op)
    }
}

impl HostOps for Arc<RuntimeController> {
    fn start_operation(&mut self, job: RemoteJob) -> Result<OpId, String> {
        self.start_internal(job)
    }

    fn request_render(&mut self) {
        self.notifier.notify(UiSignal::Render);
    }

    fn request_stop(&mut self) {
        self.cancel_active();
        self.notifier.notify(UiSignal::Stop);
    }
}

pub(crate) fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
