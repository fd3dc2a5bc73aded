use std::sync::{Arc, Mutex};
use std::time::Duration;

use worker_fsm::{EventSet, StateSet, Transition, fsm};

const WAIT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Idle;

#[derive(Debug, Clone, PartialEq)]
pub struct Pressed {
    pub presses: u32,
}

#[derive(Debug)]
pub struct Press;

#[derive(Debug)]
pub struct Release;

#[derive(Debug)]
pub struct Timer {
    pub seconds: u32,
}

/// Shared call log; the machine's copy lives on the worker thread.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    fn snapshot(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

#[fsm(
    states(Idle, Pressed),
    events(Press, Release, Timer),
    name = "button_fsm",
    priority = 3
)]
impl ButtonFsm {
    type Context = CallLog;

    #[on(state = Idle, event = Press)]
    fn press(&mut self, _: &Idle, _: Press) -> Transition<Pressed> {
        self.context.push("idle+press");
        Transition::to(Pressed { presses: 1 })
    }

    #[on(state = Pressed, event = Press)]
    fn press_again(&mut self, pressed: &Pressed, _: Press) -> Transition<Pressed> {
        self.context.push("pressed+press");
        Transition::to(Pressed {
            presses: pressed.presses + 1,
        })
    }

    #[on(state = Pressed, event = Timer)]
    fn timer(&mut self, _: &Pressed, timer: &Timer) -> Transition<Pressed> {
        self.context.push(format!("pressed+timer({})", timer.seconds));
        Transition::Stay
    }

    #[on(state = Pressed, event = Release)]
    fn release(&mut self, _: &Pressed, _: Release) -> Transition<Idle> {
        self.context.push("pressed+release");
        Transition::to(Idle)
    }

    #[on_default]
    fn unknown(
        &mut self,
        state: &ButtonFsmState,
        event: &ButtonFsmEvent,
    ) -> Transition<ButtonFsmState> {
        self.context.push(format!("default({}+{})", state.name(), event.name()));
        Transition::Stay
    }

    #[on_exit(Idle)]
    fn leave_idle(&mut self, _: &mut Idle) {
        self.context.push("exit(Idle)");
    }

    #[on_entry(Idle)]
    fn enter_idle(&mut self, _: &mut Idle) {
        self.context.push("entry(Idle)");
    }

    #[on_exit(Pressed)]
    fn leave_pressed(&mut self, _: &mut Pressed) {
        self.context.push("exit(Pressed)");
    }

    #[on_entry(Pressed)]
    fn enter_pressed(&mut self, _: &mut Pressed) {
        self.context.push("entry(Pressed)");
    }
}

#[tokio::test]
async fn test_entry_state_after_construction() {
    let log = CallLog::default();
    let (handle, task) = ButtonFsm::spawn(log.clone()).unwrap();

    assert_eq!(handle.state_kind(), ButtonFsmStateKind::Idle);
    assert_eq!(handle.expect_state::<Idle>(), Idle);
    assert_eq!(handle.cycles(), 0);
    assert_eq!(task.name(), "button_fsm");
    // No entry hook runs for the entry state.
    assert!(log.snapshot().is_empty());
}

#[tokio::test]
async fn test_button_lifecycle() {
    let log = CallLog::default();
    let (handle, _task) = ButtonFsm::spawn(log.clone()).unwrap();

    // Idle -> Pressed
    handle.submit(Press).unwrap();
    tokio::time::timeout(WAIT, handle.wait_for_state(ButtonFsmStateKind::Pressed))
        .await
        .unwrap()
        .unwrap();

    // Pressed stays Pressed on a timer
    handle.submit(Timer { seconds: 3 }).unwrap();
    let snapshot = tokio::time::timeout(WAIT, handle.wait_for_cycle(2))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(snapshot.state.kind(), ButtonFsmStateKind::Pressed);
    assert_eq!(handle.expect_state::<Pressed>(), Pressed { presses: 1 });

    // Pressed -> Idle
    handle.submit(Release).unwrap();
    tokio::time::timeout(WAIT, handle.wait_for_state(ButtonFsmStateKind::Idle))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        log.snapshot(),
        [
            "idle+press",
            "exit(Idle)",
            "entry(Pressed)",
            "pressed+timer(3)",
            "pressed+release",
            "exit(Pressed)",
            "entry(Idle)",
        ]
    );
    assert_eq!(handle.dropped_events(), 0);
}

#[tokio::test]
async fn test_unhandled_pair_runs_default_handler() {
    let log = CallLog::default();
    let (handle, _task) = ButtonFsm::spawn(log.clone()).unwrap();

    handle.submit(Release).unwrap();
    let snapshot = tokio::time::timeout(WAIT, handle.wait_for_cycle(1))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(snapshot.state.kind(), ButtonFsmStateKind::Idle);
    assert_eq!(log.snapshot(), ["default(Idle+Release)"]);
}

#[tokio::test]
async fn test_self_transition_runs_exit_then_entry() {
    let log = CallLog::default();
    let (handle, _task) = ButtonFsm::spawn(log.clone()).unwrap();

    handle.submit(Press).unwrap();
    tokio::time::timeout(WAIT, handle.wait_for_cycle(1))
        .await
        .unwrap()
        .unwrap();
    handle.submit(Press).unwrap();
    tokio::time::timeout(WAIT, handle.wait_for_cycle(2))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(handle.try_state::<Pressed>(), Some(Pressed { presses: 2 }));
    assert_eq!(
        &log.snapshot()[3..],
        ["pressed+press", "exit(Pressed)", "entry(Pressed)"]
    );
}

#[test]
fn test_generated_conversions() {
    let state: ButtonFsmState = Pressed { presses: 4 }.into();
    assert_eq!(state.kind(), ButtonFsmStateKind::Pressed);
    assert_eq!(state.name(), "Pressed");
    assert_eq!(ButtonFsmState::entry().kind(), ButtonFsmStateKind::Idle);

    let event: ButtonFsmEvent = Timer { seconds: 1 }.into();
    assert_eq!(event.name(), "Timer");
}

#[test]
fn test_config_from_macro_arguments() {
    let config = <ButtonFsm as worker_fsm::Machine>::config();
    assert_eq!(config.name, "button_fsm");
    assert_eq!(config.priority, 3);
    assert_eq!(config.mailbox, worker_fsm::MailboxPolicy::Overwrite);
    assert_eq!(config.stack_size, worker_fsm::DEFAULT_STACK_SIZE);
    assert!(<ButtonFsm as worker_fsm::Machine>::ENTRY_HOOKS);
    assert!(<ButtonFsm as worker_fsm::Machine>::EXIT_HOOKS);
}
