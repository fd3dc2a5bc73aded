//! Example: debounced button with a long-press timer
//!
//! Run with `RUST_LOG=worker_fsm=trace,button=info` to see every dispatch.

use std::time::Duration;

use tracing_subscriber::prelude::*;
use worker_fsm::{StateSet, Transition, fsm};

#[derive(Debug, Clone, Default)]
pub struct Idle;

#[derive(Debug, Clone)]
pub struct Pressed {
    pub held_for: u32,
}

#[derive(Debug, Clone)]
pub struct LongPress;

#[derive(Debug)]
pub struct Press;

#[derive(Debug)]
pub struct Release;

/// One tick of the hold timer, in seconds.
#[derive(Debug)]
pub struct Tick(pub u32);

#[derive(Debug, Default)]
pub struct Panel {
    pub clicks: u32,
    pub long_presses: u32,
}

#[fsm(
    states(Idle, Pressed, LongPress),
    events(Press, Release, Tick),
    name = "button",
    priority = 3
)]
impl ButtonFsm {
    type Context = Panel;

    #[on(state = Idle, event = Press)]
    fn press(&mut self, _: &Idle, _: Press) -> Transition<Pressed> {
        Transition::to(Pressed { held_for: 0 })
    }

    #[on(state = Pressed, event = Tick)]
    fn hold(&mut self, pressed: &Pressed, tick: &Tick) -> Transition<ButtonFsmState> {
        let held_for = pressed.held_for + tick.0;
        if held_for >= 2 {
            Transition::to(LongPress.into())
        } else {
            Transition::to(Pressed { held_for }.into())
        }
    }

    #[on(state = Pressed, event = Release)]
    fn click(&mut self, _: &Pressed, _: Release) -> Transition<Idle> {
        self.context.clicks += 1;
        Transition::to(Idle)
    }

    #[on(state = LongPress, event = Release)]
    fn release_long(&mut self, _: &LongPress, _: Release) -> Transition<Idle> {
        Transition::to(Idle)
    }

    #[on_entry(LongPress)]
    fn enter_long_press(&mut self, _: &mut LongPress) {
        self.context.long_presses += 1;
        tracing::info!(total = self.context.long_presses, "long press");
    }

    #[on_exit(Pressed)]
    fn leave_pressed(&mut self, pressed: &mut Pressed) {
        tracing::info!(held_for = pressed.held_for, "leaving pressed");
    }
}

async fn settle(handle: &ButtonFsmHandle, cycle: u64) -> ButtonFsmState {
    handle.wait_for_cycle(cycle).await.unwrap().state
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let (handle, task) = ButtonFsm::spawn(Panel::default()).unwrap();
    tracing::info!(worker = task.name(), state = ?handle.current_state(), "spawned");

    // A short click
    handle.submit(Press).unwrap();
    settle(&handle, 1).await;
    handle.submit(Release).unwrap();
    let state = settle(&handle, 2).await;
    tracing::info!(state = state.name(), "after click");

    // Held long enough to count as a long press
    handle.submit(Press).unwrap();
    settle(&handle, 3).await;
    for cycle in 4..=5 {
        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.submit(Tick(1)).unwrap();
        settle(&handle, cycle).await;
    }
    tracing::info!(state = ?handle.state_kind(), "while held");

    handle.submit(Release).unwrap();
    let state = settle(&handle, 6).await;
    tracing::info!(
        state = state.name(),
        dropped = handle.dropped_events(),
        "done"
    );
}
