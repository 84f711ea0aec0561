use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};
use tracing::{debug, warn};

use crate::error::{Error, Result};

pub const TICK_RATE_MS: u64 = 500;

/// Unified event type consumed by the driver
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    Tick,
}

/// The single ordered queue every event passes through.
///
/// Terminal input and ticks are both producers; the driver is the only consumer, so a cancel
/// key can never race with a keystroke or a tick.
pub struct EventChannel {
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
}

impl EventChannel {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    /// Channel fed by a background thread reading crossterm events.
    pub fn with_terminal_input() -> Self {
        let channel = Self::new();
        let tx = channel.sender();

        thread::spawn(move || loop {
            let ev = match event::read() {
                Ok(CtEvent::Key(key)) => AppEvent::Key(key),
                Ok(CtEvent::Resize(w, h)) => AppEvent::Resize(w, h),
                Ok(_) => continue,
                Err(e) => {
                    warn!(error = %e, "terminal input reader stopped");
                    break;
                }
            };

            if tx.send(ev).is_err() {
                break;
            }
        });

        channel
    }

    pub fn sender(&self) -> Sender<AppEvent> {
        self.tx.clone()
    }

    /// Block until the next event arrives.
    pub fn recv(&self) -> Result<AppEvent> {
        self.rx.recv().map_err(|_| Error::EventsClosed)
    }
}

impl Default for EventChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Background task posting [`AppEvent::Tick`] into an event channel at a fixed interval.
///
/// Stopping (or dropping) the ticker joins its thread, so no tick is produced for a session
/// that has already ended.
pub struct Ticker {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn spawn(tx: Sender<AppEvent>, interval: Duration) -> Self {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || loop {
            match stop_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {
                    if tx.send(AppEvent::Tick).is_err() {
                        break;
                    }
                }
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });

        Self {
            stop: Some(stop_tx),
            handle: Some(handle),
        }
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // dropping the sender wakes the thread immediately
        self.stop.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("ticker thread panicked");
            } else {
                debug!("ticker stopped");
            }
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.shutdown();
    }
}
