use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Liveness timeout driven by an explicit heartbeat.
///
/// A monitor thread watches the last-activity timestamp; once it ages
/// past the timeout, a single expiry notice is sent and the monitor
/// exits. Advisory housekeeping only: nothing in the data workflow
/// depends on it, and batch runs never start one.
pub struct IdleWatchdog {
    last_activity: Arc<Mutex<Instant>>,
    expired_rx: Receiver<()>,
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl IdleWatchdog {
    pub fn start(timeout: Duration) -> Self {
        Self::with_poll_interval(timeout, DEFAULT_POLL_INTERVAL)
    }

    pub fn with_poll_interval(timeout: Duration, poll: Duration) -> Self {
        let last_activity = Arc::new(Mutex::new(Instant::now()));
        let (expired_tx, expired_rx) = bounded::<()>(1);
        let (stop_tx, stop_rx) = bounded::<()>(1);

        let watched = last_activity.clone();
        let handle = std::thread::spawn(move || loop {
            match stop_rx.recv_timeout(poll) {
                Ok(()) | Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
                Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
            }
            let idle_for = watched
                .lock()
                .map(|t| t.elapsed())
                .unwrap_or(Duration::ZERO);
            if idle_for >= timeout {
                let _ = expired_tx.try_send(());
                break;
            }
        });

        Self {
            last_activity,
            expired_rx,
            stop_tx,
            handle: Some(handle),
        }
    }

    /// Record activity, postponing expiry by a full timeout.
    pub fn heartbeat(&self) {
        if let Ok(mut t) = self.last_activity.lock() {
            *t = Instant::now();
        }
    }

    /// Channel that yields one message when the timeout elapses.
    pub fn expired(&self) -> &Receiver<()> {
        &self.expired_rx
    }

    pub fn has_expired(&self) -> bool {
        self.expired_rx.try_recv().is_ok()
    }
}

impl Drop for IdleWatchdog {
    fn drop(&mut self) {
        let _ = self.stop_tx.try_send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
