use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use autodebugger::app::{App, Mode, Tab};
use autodebugger::runtime::{RuntimeController, UiNotifier, UiSignal};
use forge_backend::{DebugResult, ExecuteResult, RemoteBackend};
use forge_backend_mock::MockBackend;
use pretty_assertions::assert_eq;

fn silent_notifier() -> Arc<dyn UiNotifier> {
    Arc::new(|_signal: UiSignal| {})
}

fn controller(
    backend: MockBackend,
    operation_timeout: Duration,
) -> (Arc<Mutex<App>>, Arc<RuntimeController>, Arc<MockBackend>) {
    let app = Arc::new(Mutex::new(App::new()));
    let backend = Arc::new(backend);
    let remote: Arc<dyn RemoteBackend> = backend.clone();
    let host = RuntimeController::new(
        Arc::clone(&app),
        silent_notifier(),
        remote,
        operation_timeout,
    );
    (app, host, backend)
}

fn wait_until_idle(app: &Arc<Mutex<App>>, host: &Arc<RuntimeController>) {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        host.flush_pending_events();
        if !app.lock().expect("app lock").is_busy() {
            return;
        }
        assert!(Instant::now() < deadline, "operation never completed");
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn run_then_debug_then_apply_through_the_runtime() {
    let backend = MockBackend::new()
        .with_execution(Ok(ExecuteResult {
            logs: "IndexError: list index out of range\n".to_string(),
            exit_code: Some(1),
        }))
        .with_debug(Ok(DebugResult {
            fixed_code: "high = len(arr) - 1\n".to_string(),
            analysis: "**Error:** off by one".to_string(),
        }));
    let (app, mut host, backend) = controller(backend, Duration::from_secs(60));

    {
        let mut app = app.lock().expect("app lock");
        app.edit_code("high = len(arr)\n".to_string(), &mut host)
            .expect("edit accepted");
        app.run(&mut host).expect("run accepted");
    }
    wait_until_idle(&app, &host);
    {
        let app = app.lock().expect("app lock");
        assert_eq!(app.last_output(), "IndexError: list index out of range\n");
        assert_eq!(app.last_exit_code(), Some(1));
    }

    app.lock()
        .expect("app lock")
        .debug(&mut host)
        .expect("debug accepted");
    wait_until_idle(&app, &host);

    let requests = backend.debug_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].logs, "IndexError: list index out of range\n");

    let mut app = app.lock().expect("app lock");
    assert_eq!(app.mode(), Mode::Reviewing);
    assert_eq!(app.active_tab(), Tab::Diagnosis);
    app.apply_fix(&mut host).expect("apply accepted");
    assert_eq!(app.code(), "high = len(arr) - 1\n");
    assert_eq!(host.active_op_id(), None);
}

#[test]
fn overdue_operation_is_expired_and_its_late_result_dropped() {
    let backend = MockBackend::new().with_latency(Duration::from_millis(200));
    let (app, mut host, _backend) = controller(backend, Duration::from_millis(20));

    {
        let mut app = app.lock().expect("app lock");
        app.edit_code("print(1)".to_string(), &mut host)
            .expect("edit accepted");
        app.run(&mut host).expect("run accepted");
    }

    thread::sleep(Duration::from_millis(40));
    let expired = host.expire_overdue();
    assert!(expired.is_some());
    assert_eq!(host.active_op_id(), None);

    {
        let app = app.lock().expect("app lock");
        assert!(!app.is_busy());
        assert_eq!(
            app.last_output(),
            "System Error: execution timed out after 20 ms"
        );
    }

    thread::sleep(Duration::from_millis(50));
    host.flush_pending_events();
    assert_eq!(
        app.lock().expect("app lock").last_output(),
        "System Error: execution timed out after 20 ms"
    );
}

#[test]
fn notifier_receives_drain_then_render() {
    let signals = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&signals);
    let notifier: Arc<dyn UiNotifier> = Arc::new(move |signal: UiSignal| {
        sink.lock().expect("signal lock").push(signal);
    });
    let app = Arc::new(Mutex::new(App::new()));
    let mut host = RuntimeController::new(
        Arc::clone(&app),
        notifier,
        Arc::new(MockBackend::new()),
        Duration::from_secs(60),
    );

    {
        let mut app = app.lock().expect("app lock");
        app.edit_code("print(1)".to_string(), &mut host)
            .expect("edit accepted");
        app.run(&mut host).expect("run accepted");
    }
    wait_until_idle(&app, &host);

    let signals = signals.lock().expect("signal lock");
    assert!(signals.contains(&UiSignal::DrainCompletions));
    assert_eq!(signals.last(), Some(&UiSignal::Render));
}
