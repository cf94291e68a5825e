use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("no sound at index {0}")]
    NoSuchEntry(usize),
    #[error("no audio player could be started (tried {0})")]
    NoBackend(String),
    #[error("native audio output: {0}")]
    Native(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Something that can start playing a file and cut it off again 🔈
///
/// Implementations own at most one live playback at a time.
pub trait AudioBackend {
    fn name(&self) -> &str;

    /// Begin playing `path` asynchronously.
    fn play(&mut self, path: &Path) -> Result<(), PlaybackError>;

    /// Terminate the current playback, if any, and wait until it is gone.
    fn stop(&mut self);

    /// Drop bookkeeping for a playback that has ended on its own. Never blocks.
    fn reap(&mut self) {}
}

/// Monotonic millisecond clock; wraps around like a 32-bit tick counter.
pub trait Clock {
    fn now_ms(&self) -> u32;
}
