//! Background change detection for the sound root.
//!
//! A single watcher thread raises a [`WatchSignal`]; the frame loop consumes
//! it. Nothing else crosses the thread boundary.

pub mod native;
pub mod poll;

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use thiserror::Error;

pub use native::NotifyWatcher;
pub use poll::{tree_signature, PollWatcher};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// "Library needs a rescan" flag shared between the watcher and the frame loop.
#[derive(Debug, Clone, Default)]
pub struct WatchSignal(Arc<AtomicBool>);

impl WatchSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Read and clear in one step.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Messages delivered to the watcher thread's inbox.
#[derive(Debug)]
pub enum WatchMsg {
    Changed,
    Error(String),
    Stop,
}

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("notification watch failed: {0}")]
    Notify(#[from] notify::Error),
    #[error("watch backend reported: {0}")]
    Backend(String),
    #[error("failed to spawn watcher thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Which change-detection strategy to use 👀
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WatcherKind {
    /// Notifications on Windows, polling elsewhere
    #[default]
    Auto,
    /// OS change notifications
    Notify,
    /// Periodic tree signature
    Poll,
}

impl WatcherKind {
    pub fn resolve(self) -> Self {
        match self {
            Self::Auto if cfg!(windows) => Self::Notify,
            Self::Auto => Self::Poll,
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Watching,
    Terminated,
    Failed,
}

impl WatchState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Watching,
            1 => Self::Terminated,
            _ => Self::Failed,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Watching => 0,
            Self::Terminated => 1,
            Self::Failed => 2,
        }
    }
}

/// A change-detection strategy. Armed on the owner's thread, then moved into
/// the watcher thread where `run` blocks until a `Stop` arrives.
pub trait ChangeWatcher: Send {
    fn name(&self) -> &'static str;

    fn run(&mut self, inbox: &Receiver<WatchMsg>, signal: &WatchSignal) -> Result<(), WatchError>;
}

/// Owns the watcher thread. Dropping it stops and joins the thread.
pub struct WatcherService {
    strategy: &'static str,
    outbox: Sender<WatchMsg>,
    handle: Option<thread::JoinHandle<()>>,
    state: Arc<AtomicU8>,
}

impl WatcherService {
    pub fn start(
        kind: WatcherKind,
        root: &Path,
        poll_interval: Duration,
        signal: WatchSignal,
    ) -> Result<Self, WatchError> {
        let (outbox, inbox) = mpsc::channel();
        let watcher = arm(kind.resolve(), root, poll_interval, outbox.clone());
        Self::spawn(watcher, outbox, inbox, signal)
    }

    /// Run an already-armed strategy. `outbox` must feed `inbox`.
    pub fn spawn(
        mut watcher: Box<dyn ChangeWatcher>,
        outbox: Sender<WatchMsg>,
        inbox: Receiver<WatchMsg>,
        signal: WatchSignal,
    ) -> Result<Self, WatchError> {
        let strategy = watcher.name();
        let state = Arc::new(AtomicU8::new(WatchState::Watching.as_u8()));
        let thread_state = state.clone();

        let handle = thread::Builder::new()
            .name("soundgrid-watcher".to_string())
            .spawn(move || {
                let outcome = watcher.run(&inbox, &signal);
                // Release OS handles before reporting the final state.
                drop(watcher);
                let final_state = match outcome {
                    Ok(()) => {
                        tracing::debug!(strategy, "watcher stopped");
                        WatchState::Terminated
                    }
                    Err(e) => {
                        tracing::error!(strategy, error = %e, "watcher failed, library will no longer auto-refresh");
                        WatchState::Failed
                    }
                };
                thread_state.store(final_state.as_u8(), Ordering::Release);
            })
            .map_err(WatchError::Spawn)?;

        tracing::info!(strategy, "watching for changes");
        Ok(Self {
            strategy,
            outbox,
            handle: Some(handle),
            state,
        })
    }

    pub fn strategy(&self) -> &'static str {
        self.strategy
    }

    pub fn state(&self) -> WatchState {
        WatchState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Ask the thread to stop and wait for it. Idempotent.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            // The thread may already be gone (failed); a closed inbox is fine.
            let _ = self.outbox.send(WatchMsg::Stop);
            if handle.join().is_err() {
                tracing::error!("watcher thread panicked");
                self.state
                    .store(WatchState::Failed.as_u8(), Ordering::Release);
            }
        }
    }
}

impl Drop for WatcherService {
    fn drop(&mut self) {
        self.stop();
    }
}

fn arm(
    kind: WatcherKind,
    root: &Path,
    poll_interval: Duration,
    outbox: Sender<WatchMsg>,
) -> Box<dyn ChangeWatcher> {
    if kind == WatcherKind::Notify {
        match NotifyWatcher::arm(root, outbox) {
            Ok(watcher) => return Box::new(watcher),
            Err(e) => {
                tracing::warn!(error = %e, "change notifications unavailable, falling back to polling");
            }
        }
    }
    Box::new(PollWatcher::new(root, poll_interval))
}
