//! OS change notifications via `notify` (inotify, FSEvents, ReadDirectoryChangesW).

use super::{ChangeWatcher, WatchError, WatchMsg, WatchSignal};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::mpsc::{Receiver, Sender};

/// Holds the OS watch registration; dropping it releases the handles.
pub struct NotifyWatcher {
    _watcher: RecommendedWatcher,
}

impl NotifyWatcher {
    /// Register a recursive watch on `root`. Events are posted to `outbox`,
    /// the same inbox that carries the stop request.
    pub fn arm(root: &Path, outbox: Sender<WatchMsg>) -> Result<Self, WatchError> {
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let msg = match res {
                    Ok(event) if is_change(&event.kind) => WatchMsg::Changed,
                    Ok(_) => return,
                    Err(e) => WatchMsg::Error(e.to_string()),
                };
                // Inbox closed means the thread is gone; nothing to tell.
                let _ = outbox.send(msg);
            },
            Config::default(),
        )?;
        watcher.watch(root, RecursiveMode::Recursive)?;
        tracing::debug!(root = %root.display(), "notification watch armed");

        Ok(Self { _watcher: watcher })
    }
}

/// Name, directory and write changes count; plain reads do not.
fn is_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Any | EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

impl ChangeWatcher for NotifyWatcher {
    fn name(&self) -> &'static str {
        "notify"
    }

    fn run(&mut self, inbox: &Receiver<WatchMsg>, signal: &WatchSignal) -> Result<(), WatchError> {
        loop {
            match inbox.recv() {
                Ok(WatchMsg::Changed) => signal.raise(),
                Ok(WatchMsg::Error(reason)) => return Err(WatchError::Backend(reason)),
                Ok(WatchMsg::Stop) | Err(_) => return Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind};
    use std::sync::mpsc;

    #[test]
    fn test_access_events_are_ignored() {
        assert!(!is_change(&EventKind::Access(AccessKind::Any)));
        assert!(!is_change(&EventKind::Other));
        assert!(is_change(&EventKind::Create(CreateKind::File)));
    }

    #[test]
    fn test_run_raises_then_stops() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, rx) = mpsc::channel();
        let mut watcher = NotifyWatcher::arm(dir.path(), tx.clone()).unwrap();
        let signal = WatchSignal::new();

        tx.send(WatchMsg::Changed).unwrap();
        tx.send(WatchMsg::Stop).unwrap();
        assert!(watcher.run(&rx, &signal).is_ok());
        assert!(signal.take());
    }

    #[test]
    fn test_backend_error_ends_run() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, rx) = mpsc::channel();
        let mut watcher = NotifyWatcher::arm(dir.path(), tx.clone()).unwrap();

        tx.send(WatchMsg::Error("overflow".to_string())).unwrap();
        assert!(matches!(
            watcher.run(&rx, &WatchSignal::new()),
            Err(WatchError::Backend(_))
        ));
    }

    #[test]
    fn test_arm_fails_for_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, _rx) = mpsc::channel();
        assert!(NotifyWatcher::arm(&dir.path().join("missing"), tx).is_err());
    }
}
