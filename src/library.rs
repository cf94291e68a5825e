//! Sound discovery: a depth-first walk of the root collecting `.wav` files.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Hard cap on discovered clips.
pub const MAX_SOUNDS: usize = 100;

/// One discovered clip 🔊
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundEntry {
    /// Path relative to the scan root, `/`-separated (e.g. `drums/kick.wav`).
    pub display_name: String,
    /// Path used to open the file (root joined with the relative path).
    pub path: PathBuf,
}

/// Ordered, bounded collection of clips. Replaced wholesale on every reload.
#[derive(Debug, Clone, Default)]
pub struct SoundLibrary {
    entries: Vec<SoundEntry>,
}

impl SoundLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan `root` and build a fresh library.
    pub fn scan(root: &Path) -> Self {
        Self {
            entries: scan(root),
        }
    }

    pub fn entries(&self) -> &[SoundEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&SoundEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Walk `root` depth-first and return up to [`MAX_SOUNDS`] `.wav` entries in
/// traversal order (not sorted).
///
/// An unreadable root yields an empty list; unreadable subtrees are skipped.
pub fn scan(root: &Path) -> Vec<SoundEntry> {
    let mut entries = Vec::new();

    for item in WalkDir::new(root).follow_links(true) {
        if entries.len() >= MAX_SOUNDS {
            tracing::debug!(cap = MAX_SOUNDS, "sound cap reached, stopping scan");
            break;
        }

        let entry = match item {
            Ok(entry) => entry,
            Err(e) => {
                if e.depth() == 0 {
                    tracing::warn!(root = %root.display(), error = %e, "cannot open sound root");
                    return Vec::new();
                }
                tracing::debug!(error = %e, "skipping unreadable entry");
                continue;
            }
        };

        if entry.depth() == 0 && !entry.file_type().is_dir() {
            tracing::warn!(root = %root.display(), "sound root is not a directory");
            return Vec::new();
        }
        if !entry.file_type().is_file() || !has_wav_extension(entry.path()) {
            continue;
        }

        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        entries.push(SoundEntry {
            display_name: display_name(relative),
            path: entry.path().to_path_buf(),
        });
    }

    tracing::info!(root = %root.display(), count = entries.len(), "scanned sounds");
    entries
}

pub fn has_wav_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
}

fn display_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
