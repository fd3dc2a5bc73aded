//! Example: feeding a machine from an interrupt-like context
//!
//! A sampler thread plays the role of an interrupt handler. It never blocks
//! on the mailbox and yields whenever the submit reports that it woke the
//! worker. Samples it produces faster than the worker drains them are
//! overwritten, and the handle counts them.

use std::thread;
use std::time::Duration;

use tracing_subscriber::prelude::*;
use worker_fsm::{SubmitError, Transition, fsm};

#[derive(Debug, Clone, Default)]
pub struct Quiet;

#[derive(Debug, Clone)]
pub struct Alarm {
    pub level: u16,
}

#[derive(Debug)]
pub struct Sample(pub u16);

const THRESHOLD: u16 = 800;

#[fsm(states(Quiet, Alarm), events(Sample), name = "sensor")]
impl SensorFsm {
    #[on(state = Quiet, event = Sample)]
    fn watch(&mut self, _: &Quiet, sample: &Sample) -> Transition<Alarm> {
        if sample.0 >= THRESHOLD {
            Transition::to(Alarm { level: sample.0 })
        } else {
            Transition::Stay
        }
    }

    #[on(state = Alarm, event = Sample)]
    fn clear(&mut self, _: &Alarm, sample: &Sample) -> Transition<Quiet> {
        if sample.0 < THRESHOLD {
            Transition::to(Quiet)
        } else {
            Transition::Stay
        }
    }

    #[on_entry(Alarm)]
    fn raise_alarm(&mut self, alarm: &mut Alarm) {
        tracing::warn!(level = alarm.level, "alarm raised");
    }

    #[on_exit(Alarm)]
    fn clear_alarm(&mut self, _: &mut Alarm) {
        tracing::info!("alarm cleared");
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let (handle, _task) = SensorFsm::spawn(()).unwrap();

    let sampler = thread::spawn({
        let handle = handle.clone();
        move || {
            let mut woke = 0u32;
            for tick in 0u16..200 {
                let level = (tick * 37) % 1000;
                match handle.submit_from_isr(Sample(level)) {
                    Ok(true) => {
                        woke += 1;
                        thread::yield_now();
                    }
                    Ok(false) => {}
                    Err(SubmitError::Contended(_)) => tracing::debug!(tick, "mailbox busy"),
                    Err(err) => {
                        tracing::error!(%err, "worker gone");
                        break;
                    }
                }
                thread::sleep(Duration::from_micros(200));
            }
            woke
        }
    });

    let woke = sampler.join().unwrap();
    thread::sleep(Duration::from_millis(20));
    tracing::info!(
        woke,
        cycles = handle.cycles(),
        dropped = handle.dropped_events(),
        state = ?handle.state_kind(),
        "sampling finished"
    );
}
