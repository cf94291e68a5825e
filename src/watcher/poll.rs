//! Portable change detection: compare a folded metadata hash of the tree.

use super::{ChangeWatcher, WatchError, WatchMsg, WatchSignal};
use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, UNIX_EPOCH};

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

pub struct PollWatcher {
    root: PathBuf,
    interval: Duration,
    baseline: u64,
}

impl PollWatcher {
    /// Takes the baseline signature immediately.
    pub fn new(root: &Path, interval: Duration) -> Self {
        Self {
            root: root.to_path_buf(),
            interval,
            baseline: tree_signature(root),
        }
    }

    /// Recompute the signature; true if it moved since the last check.
    pub fn check(&mut self) -> bool {
        let current = tree_signature(&self.root);
        if current == self.baseline {
            return false;
        }
        self.baseline = current;
        true
    }
}

impl ChangeWatcher for PollWatcher {
    fn name(&self) -> &'static str {
        "poll"
    }

    fn run(&mut self, inbox: &Receiver<WatchMsg>, signal: &WatchSignal) -> Result<(), WatchError> {
        loop {
            match inbox.recv_timeout(self.interval) {
                Err(RecvTimeoutError::Timeout) => {
                    if self.check() {
                        tracing::debug!(root = %self.root.display(), "tree signature changed");
                        signal.raise();
                    }
                }
                Ok(WatchMsg::Stop) | Err(RecvTimeoutError::Disconnected) => return Ok(()),
                Ok(_) => {}
            }
        }
    }
}

/// FNV-1a style fold over (mtime, size) of every entry below `dir`,
/// recursing into subdirectories, symlinked ones included. Unreadable
/// directories hash to 0.
pub fn tree_signature(dir: &Path) -> u64 {
    let mut ancestors = Vec::new();
    fold_dir(dir, &mut ancestors)
}

/// `ancestors` holds the canonical paths of the directories being folded, so
/// a symlink pointing back up the tree hashes to 0 instead of looping.
fn fold_dir(dir: &Path, ancestors: &mut Vec<PathBuf>) -> u64 {
    let canonical = fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
    if ancestors.contains(&canonical) {
        return 0;
    }
    let Ok(read_dir) = fs::read_dir(dir) else {
        return 0;
    };

    let mut children: Vec<_> = read_dir.filter_map(Result::ok).collect();
    children.sort_by_key(|entry| entry.file_name());

    ancestors.push(canonical);
    let mut signature = FNV_OFFSET;
    for child in children {
        let path = child.path();
        // Follows links, like the scanner does
        let Ok(meta) = fs::metadata(&path) else {
            continue;
        };

        signature = mix(signature, modified_nanos(&meta));
        signature = mix(signature, meta.len());

        if meta.is_dir() {
            signature = mix(signature, fold_dir(&path, ancestors));
        }
    }
    ancestors.pop();
    signature
}

fn mix(signature: u64, value: u64) -> u64 {
    (signature ^ value).wrapping_mul(FNV_PRIME)
}

fn modified_nanos(meta: &Metadata) -> u64 {
    meta.modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;

    #[test]
    fn test_signature_is_stable_for_quiet_tree() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/a.wav"), b"abc").unwrap();
        assert_eq!(tree_signature(dir.path()), tree_signature(dir.path()));
    }

    #[test]
    fn test_signature_sees_nested_additions() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        let before = tree_signature(dir.path());
        fs::write(dir.path().join("a/b/deep.wav"), b"x").unwrap();
        assert_ne!(before, tree_signature(dir.path()));
    }

    #[test]
    fn test_signature_sees_size_change() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("clip.wav");
        fs::write(&file, b"short").unwrap();
        let before = tree_signature(dir.path());
        fs::write(&file, b"a good deal longer").unwrap();
        assert_ne!(before, tree_signature(dir.path()));
    }

    #[test]
    fn test_unreadable_root_is_zero() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(tree_signature(&dir.path().join("missing")), 0);
    }

    #[test]
    fn test_check_rebaselines() {
        let dir = tempfile::tempdir().unwrap();
        let mut watcher = PollWatcher::new(dir.path(), Duration::from_millis(10));
        assert!(!watcher.check());
        fs::write(dir.path().join("x.wav"), b"x").unwrap();
        assert!(watcher.check());
        assert!(!watcher.check());
    }

    #[test]
    fn test_run_returns_on_stop() {
        let dir = tempfile::tempdir().unwrap();
        let mut watcher = PollWatcher::new(dir.path(), Duration::from_secs(60));
        let (tx, rx) = mpsc::channel();
        let signal = WatchSignal::new();
        let worker = thread::spawn(move || watcher.run(&rx, &signal).is_ok());
        tx.send(WatchMsg::Stop).unwrap();
        assert!(worker.join().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_changes_under_symlinked_directory_are_seen() {
        let root = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        fs::create_dir(outside.path().join("deep")).unwrap();
        std::os::unix::fs::symlink(outside.path(), root.path().join("linked")).unwrap();

        let mut watcher = PollWatcher::new(root.path(), Duration::from_millis(10));
        fs::write(outside.path().join("deep/new.wav"), b"x").unwrap();

        let names: Vec<_> = crate::library::scan(root.path())
            .into_iter()
            .map(|e| e.display_name)
            .collect();
        assert_eq!(names, vec!["linked/deep/new.wav"]);
        assert!(watcher.check());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_loop_terminates() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("sub")).unwrap();
        std::os::unix::fs::symlink(root.path(), root.path().join("sub/up")).unwrap();
        fs::write(root.path().join("sub/a.wav"), b"x").unwrap();

        let first = tree_signature(root.path());
        assert_eq!(first, tree_signature(root.path()));
        fs::write(root.path().join("sub/a.wav"), b"longer").unwrap();
        assert_ne!(first, tree_signature(root.path()));
    }
}
