//! Beltline runtime -- the threads that keep a line alive.
//!
//! Three periodic loops, each on its own thread:
//!
//! - the tick loop advances the [`SimulationGraph`] at a fixed period;
//! - the read loop pulls controller tags into the variable store;
//! - the write loop pushes store values back to the controller.
//!
//! The loops share nothing but the graph mutex, the variable store, and a
//! [`CancelToken`]. Cancellation is cooperative and observed only at loop
//! boundaries: an in-progress tick or sync pass always finishes. A loop that
//! overruns its period skips the missed deadlines instead of bursting to
//! catch up.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use beltline_core::graph::SimulationGraph;
use beltline_core::vars::VariableStore;
use beltline_s7::sync::{PassOutcome, PlcSync, SyncError};
use beltline_s7::transport::BlockTransport;

/// Shared stop flag for the runtime loops. Cloning yields a handle to the
/// same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Run `body` once per `period` until cancelled. Missed deadlines are
/// skipped, not replayed.
fn run_periodic(name: &str, period: Duration, cancel: &CancelToken, mut body: impl FnMut()) {
    let mut next = Instant::now();
    while !cancel.is_cancelled() {
        body();
        next += period;
        let now = Instant::now();
        if now <= next {
            thread::sleep(next - now);
        } else {
            log::debug!("{name} loop overran its period by {:?}", now - next);
            next = now;
        }
    }
}

/// Spawn the simulation tick loop.
///
/// Each iteration locks the graph for exactly one tick, so editor mutations
/// interleave between ticks, never inside one.
pub fn spawn_tick_loop(
    graph: Arc<Mutex<SimulationGraph>>,
    vars: Arc<VariableStore>,
    period: Duration,
    cancel: CancelToken,
) -> JoinHandle<()> {
    thread::spawn(move || {
        run_periodic("tick", period, &cancel, || {
            let mut graph = graph.lock().unwrap_or_else(|e| e.into_inner());
            graph.tick(&vars);
        });
        log::info!("tick loop stopped");
    })
}

/// Spawn the controller read loop. Transport failures are logged and the
/// loop keeps polling; the simulation never sees them.
pub fn spawn_read_loop<T>(
    sync: Arc<PlcSync<T>>,
    period: Duration,
    cancel: CancelToken,
) -> JoinHandle<()>
where
    T: BlockTransport + 'static,
{
    thread::spawn(move || {
        run_periodic("read", period, &cancel, || match sync.read_pass() {
            Ok(PassOutcome::Completed { changed }) if changed > 0 => {
                log::trace!("read pass updated {changed} variables");
            }
            Ok(PassOutcome::Completed { .. }) => {}
            Ok(PassOutcome::Skipped) => {
                log::debug!("read pass still in flight, skipping");
            }
            Err(SyncError::ControllerUnreachable(e)) => {
                log::warn!("read pass failed: {e}");
            }
        });
        log::info!("read loop stopped");
    })
}

/// Spawn the controller write loop. Same failure policy as the read loop.
pub fn spawn_write_loop<T>(
    sync: Arc<PlcSync<T>>,
    period: Duration,
    cancel: CancelToken,
) -> JoinHandle<()>
where
    T: BlockTransport + 'static,
{
    thread::spawn(move || {
        run_periodic("write", period, &cancel, || match sync.write_pass() {
            Ok(PassOutcome::Skipped) => {
                log::debug!("write pass still in flight, skipping");
            }
            Ok(PassOutcome::Completed { .. }) => {}
            Err(SyncError::ControllerUnreachable(e)) => {
                log::warn!("write pass failed: {e}");
            }
        });
        log::info!("write loop stopped");
    })
}
