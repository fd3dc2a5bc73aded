use std::sync::{Arc, Mutex};
use std::time::Duration;

use worker_fsm::{Machine, StateSet, Transition, fsm};

const WAIT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Default)]
pub struct Off;

#[derive(Debug, Clone, Default)]
pub struct On;

#[derive(Debug)]
pub struct Toggle;

#[derive(Debug, Clone, Default)]
pub struct Calls(Arc<Mutex<Vec<&'static str>>>);

impl Calls {
    fn push(&self, call: &'static str) {
        self.0.lock().unwrap().push(call);
    }

    fn snapshot(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().clone()
    }
}

#[fsm(
    states(Off, On),
    events(Toggle),
    entry_hooks = false,
    exit_hooks = false
)]
impl SilentFsm {
    type Context = Calls;

    #[on(state = Off, event = Toggle)]
    fn switch_on(&mut self, _: &Off, _: Toggle) -> Transition<On> {
        self.context.push("switch_on");
        Transition::to(On)
    }

    #[on(state = On, event = Toggle)]
    fn switch_off(&mut self, _: &On, _: Toggle) -> Transition<Off> {
        self.context.push("switch_off");
        Transition::to(Off)
    }

    #[on_entry(On)]
    fn enter_on(&mut self, _: &mut On) {
        self.context.push("entry(On)");
    }

    #[on_exit(Off)]
    fn leave_off(&mut self, _: &mut Off) {
        self.context.push("exit(Off)");
    }
}

#[fsm(states(Off, On), events(Toggle), entry_hooks = false)]
impl ExitOnlyFsm {
    type Context = Calls;

    #[on(state = Off, event = Toggle)]
    fn switch_on(&mut self, _: &Off, _: Toggle) -> Transition<On> {
        Transition::to(On)
    }

    #[on(state = On, event = Toggle)]
    fn switch_off(&mut self, _: &On, _: Toggle) -> Transition<Off> {
        Transition::to(Off)
    }

    #[on_entry(On)]
    fn enter_on(&mut self, _: &mut On) {
        self.context.push("entry(On)");
    }

    #[on_exit(Off)]
    fn leave_off(&mut self, _: &mut Off) {
        self.context.push("exit(Off)");
    }

    #[on_exit(On)]
    fn leave_on(&mut self, _: &mut On) {
        self.context.push("exit(On)");
    }
}

#[test]
fn test_hook_toggles_follow_macro_arguments() {
    assert!(!<SilentFsm as Machine>::ENTRY_HOOKS);
    assert!(!<SilentFsm as Machine>::EXIT_HOOKS);
    assert!(!<ExitOnlyFsm as Machine>::ENTRY_HOOKS);
    assert!(<ExitOnlyFsm as Machine>::EXIT_HOOKS);
}

#[tokio::test]
async fn test_disabled_hooks_are_never_called() {
    let calls = Calls::default();
    let (handle, _task) = SilentFsm::spawn(calls.clone()).unwrap();

    handle.submit(Toggle).unwrap();
    tokio::time::timeout(WAIT, handle.wait_for_cycle(1))
        .await
        .unwrap()
        .unwrap();
    handle.submit(Toggle).unwrap();
    let snapshot = tokio::time::timeout(WAIT, handle.wait_for_cycle(2))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(snapshot.state.kind(), SilentFsmStateKind::Off);
    assert_eq!(calls.snapshot(), ["switch_on", "switch_off"]);
}

#[tokio::test]
async fn test_exit_hooks_run_without_entry_hooks() {
    let calls = Calls::default();
    let (handle, _task) = ExitOnlyFsm::spawn(calls.clone()).unwrap();

    handle.submit(Toggle).unwrap();
    tokio::time::timeout(WAIT, handle.wait_for_cycle(1))
        .await
        .unwrap()
        .unwrap();
    handle.submit(Toggle).unwrap();
    tokio::time::timeout(WAIT, handle.wait_for_cycle(2))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(calls.snapshot(), ["exit(Off)", "exit(On)"]);
}

#[test]
fn test_hooks_run_on_the_engine_without_a_worker() {
    let calls = Calls::default();
    let mut engine = worker_fsm::Engine::new(ExitOnlyFsm::new(calls.clone()));

    assert!(engine.step(Toggle.into()));
    assert!(engine.step(Toggle.into()));
    assert_eq!(engine.cycles(), 2);
    assert_eq!(engine.machine().context().snapshot(), ["exit(Off)", "exit(On)"]);
}
