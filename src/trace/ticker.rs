//! Ticker - background thread that drives playback at a fixed cadence
//!
//! Architecture:
//! ```text
//! Owner thread          Channel              Ticker thread
//!     │                    │                      │
//!     ├─ Ticker::spawn() ─────────────────────────►│ every interval: on_tick()
//!     ├─ set_interval() ──►│ Command::SetInterval►│ new cadence
//!     ├─ stop() ──────────►│ Command::Stop ──────►│ exit loop
//!     │◄──────────────────── join ◄──────────────│
//! ```
//!
//! The ticker knows nothing about traces. The callback applies one step
//! and says whether to keep going.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{select, after, unbounded, Receiver, Sender};

/// Returned by the tick callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Stop,
}

enum Command {
    SetInterval(Duration),
    Stop,
}

/// Handle to a running ticker thread
pub struct Ticker {
    command_tx: Sender<Command>,
    worker_handle: Option<JoinHandle<usize>>,
}

impl Ticker {
    /// Spawn the ticker. The first tick fires one `interval` after spawn.
    pub fn spawn<F>(interval: Duration, on_tick: F) -> Self
    where
        F: FnMut() -> TickControl + Send + 'static,
    {
        let (command_tx, command_rx) = unbounded::<Command>();

        let worker_handle = thread::spawn(move || tick_loop(interval, command_rx, on_tick));

        Self {
            command_tx,
            worker_handle: Some(worker_handle),
        }
    }

    pub fn set_interval(&self, interval: Duration) {
        let _ = self.command_tx.send(Command::SetInterval(interval));
    }

    /// Whether the thread has exited on its own (callback returned Stop)
    pub fn is_finished(&self) -> bool {
        self.worker_handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Stop ticking and wait for the thread. Returns the number of ticks fired.
    pub fn stop(mut self) -> usize {
        self.shutdown()
    }

    fn shutdown(&mut self) -> usize {
        let _ = self.command_tx.send(Command::Stop);
        self.worker_handle
            .take()
            .and_then(|handle| handle.join().ok())
            .unwrap_or(0)
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn tick_loop<F>(mut interval: Duration, command_rx: Receiver<Command>, mut on_tick: F) -> usize
where
    F: FnMut() -> TickControl,
{
    let mut ticks = 0;
    loop {
        let deadline = after(interval);
        select! {
            recv(command_rx) -> command => match command {
                Ok(Command::SetInterval(new_interval)) => {
                    tracing::debug!("Ticker interval -> {:?}", new_interval);
                    interval = new_interval;
                }
                // Sender dropped counts as stop
                Ok(Command::Stop) | Err(_) => break,
            },
            recv(deadline) -> _ => {
                ticks += 1;
                if on_tick() == TickControl::Stop {
                    break;
                }
            }
        }
    }
    tracing::debug!("Ticker stopped after {} ticks", ticks);
    ticks
}
