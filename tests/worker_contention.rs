//! Behaviour of the mailbox while the worker is busy inside a handler.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use worker_fsm::{SubmitError, Transition, fsm};

const WAIT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Idle;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pressed;

/// Parks the worker inside its handler until the test opens the gate.
#[derive(Debug)]
pub struct Hold;

#[derive(Debug)]
pub struct Press;

#[derive(Debug)]
pub struct Release;

pub struct Gate {
    entered: mpsc::Sender<()>,
    open: Mutex<mpsc::Receiver<()>>,
    handled: Arc<Mutex<Vec<&'static str>>>,
}

impl Gate {
    fn record(&self, name: &'static str) {
        self.handled.lock().unwrap().push(name);
    }
}

struct Harness {
    entered: mpsc::Receiver<()>,
    open: mpsc::Sender<()>,
    handled: Arc<Mutex<Vec<&'static str>>>,
}

fn gate() -> (Gate, Harness) {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (open_tx, open_rx) = mpsc::channel();
    let handled = Arc::new(Mutex::new(Vec::new()));
    (
        Gate {
            entered: entered_tx,
            open: Mutex::new(open_rx),
            handled: handled.clone(),
        },
        Harness {
            entered: entered_rx,
            open: open_tx,
            handled,
        },
    )
}

impl Harness {
    /// Blocks until the worker is parked in the `Hold` handler.
    fn wait_entered(&self) {
        self.entered.recv_timeout(WAIT).expect("worker entered Hold");
    }

    fn release_worker(&self) {
        self.open.send(()).unwrap();
    }

    fn handled(&self) -> Vec<&'static str> {
        self.handled.lock().unwrap().clone()
    }
}

fn wait_until(mut done: impl FnMut() -> bool) {
    let deadline = Instant::now() + WAIT;
    while !done() {
        assert!(Instant::now() < deadline, "timed out");
        thread::sleep(Duration::from_millis(2));
    }
}

#[fsm(states(Idle, Pressed), events(Hold, Press, Release))]
impl LatchFsm {
    type Context = Gate;

    #[on(state = Idle, event = Hold)]
    fn hold(&mut self, _: &Idle, _: Hold) -> Transition<Idle> {
        self.context.entered.send(()).unwrap();
        self.context.open.lock().unwrap().recv().unwrap();
        Transition::Stay
    }

    #[on(state = Idle, event = Press)]
    fn press(&mut self, _: &Idle, _: Press) -> Transition<Pressed> {
        self.context.record("press");
        Transition::to(Pressed)
    }

    #[on(state = Idle, event = Release)]
    fn release(&mut self, _: &Idle, _: Release) -> Transition<Idle> {
        self.context.record("release");
        Transition::Stay
    }
}

#[fsm(
    states(Idle, Pressed),
    events(Hold, Press, Release),
    mailbox = "queue",
    capacity = 2,
    submit_timeout = "20ms"
)]
impl QueuedFsm {
    type Context = Gate;

    #[on(state = Idle, event = Hold)]
    fn hold(&mut self, _: &Idle, _: Hold) -> Transition<Idle> {
        self.context.entered.send(()).unwrap();
        self.context.open.lock().unwrap().recv().unwrap();
        Transition::Stay
    }

    #[on(state = Idle, event = Press)]
    fn press(&mut self, _: &Idle, _: Press) -> Transition<Pressed> {
        self.context.record("press");
        Transition::to(Pressed)
    }

    #[on(state = Pressed, event = Release)]
    fn release(&mut self, _: &Pressed, _: Release) -> Transition<Idle> {
        self.context.record("release");
        Transition::to(Idle)
    }
}

#[test]
fn test_racing_submissions_deliver_at_most_one_event() {
    let (gate, harness) = gate();
    let (handle, _task) = LatchFsm::spawn(gate).unwrap();

    handle.submit(Hold).unwrap();
    harness.wait_entered();

    let press = thread::spawn({
        let handle = handle.clone();
        move || handle.submit(Press).unwrap()
    });
    let release = thread::spawn({
        let handle = handle.clone();
        move || handle.submit(Release).unwrap()
    });
    press.join().unwrap();
    release.join().unwrap();

    harness.release_worker();
    wait_until(|| handle.cycles() >= 2);
    thread::sleep(Duration::from_millis(50));

    // Which event survived is up to the race; that only one did is not.
    let handled = harness.handled();
    assert_eq!(handled.len(), 1, "{handled:?}");
    assert_eq!(handle.cycles(), 2);
    assert_eq!(handle.dropped_events(), 1);
    match handled[0] {
        "press" => assert_eq!(handle.state_kind(), LatchFsmStateKind::Pressed),
        "release" => assert_eq!(handle.state_kind(), LatchFsmStateKind::Idle),
        other => panic!("unexpected handler {other}"),
    }
}

#[test]
fn test_isr_submission_reports_yield_hint() {
    let (gate, harness) = gate();
    let (handle, _task) = LatchFsm::spawn(gate).unwrap();

    wait_until(|| handle.is_worker_waiting());
    assert!(handle.submit_from_isr(Hold).unwrap());
    harness.wait_entered();

    // The worker is busy in a handler, so nobody is woken.
    assert!(!handle.submit_from_isr(Press).unwrap());
    harness.release_worker();

    wait_until(|| handle.state_kind() == LatchFsmStateKind::Pressed);
    assert_eq!(harness.handled(), ["press"]);
}

#[test]
fn test_isr_burst_during_busy_handler_keeps_last_event() {
    let (gate, harness) = gate();
    let (handle, _task) = LatchFsm::spawn(gate).unwrap();

    wait_until(|| handle.is_worker_waiting());
    assert!(handle.submit_from_isr(Hold).unwrap());
    harness.wait_entered();

    assert!(!handle.submit_from_isr(Press).unwrap());
    assert!(!handle.submit_from_isr(Release).unwrap());
    assert_eq!(handle.dropped_events(), 1);
    assert_eq!(handle.pending(), 1);

    harness.release_worker();
    wait_until(|| handle.cycles() >= 2);
    thread::sleep(Duration::from_millis(50));

    assert_eq!(harness.handled(), ["release"]);
    assert_eq!(handle.cycles(), 2);
    assert_eq!(handle.state_kind(), LatchFsmStateKind::Idle);
}

#[test]
fn test_queue_applies_backpressure() {
    let (gate, harness) = gate();
    let (handle, _task) = QueuedFsm::spawn(gate).unwrap();

    handle.submit(Hold).unwrap();
    harness.wait_entered();

    handle.submit(Press).unwrap();
    handle.submit(Release).unwrap();
    assert_eq!(handle.pending(), 2);

    // Without a wait the full queue answers at once.
    assert!(matches!(handle.submit(Press), Err(SubmitError::Full(_))));

    let started = Instant::now();
    let err = handle.blocking_submit(Press).unwrap_err();
    assert!(matches!(err, SubmitError::Full(QueuedFsmEvent::Press(_))));
    assert!(started.elapsed() >= Duration::from_millis(20));
    assert!(matches!(
        handle.submit_from_isr(Press),
        Err(SubmitError::Full(_))
    ));

    harness.release_worker();
    wait_until(|| handle.cycles() >= 3);

    assert_eq!(harness.handled(), ["press", "release"]);
    assert_eq!(handle.state_kind(), QueuedFsmStateKind::Idle);
    assert_eq!(handle.dropped_events(), 0);
}
