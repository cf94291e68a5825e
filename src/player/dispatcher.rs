use super::clock::MonotonicClock;
use super::traits::{AudioBackend, Clock, PlaybackError};
use crate::wav;
use std::path::Path;

/// Which clip is playing and since when. `playing_index == None` is idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackState {
    pub playing_index: Option<usize>,
    pub start_time_ms: u32,
    pub duration_ms: u32,
}

/// Per-frame snapshot for progress overlays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackProgress {
    pub is_playing: bool,
    pub index: Option<usize>,
    /// Elapsed / duration, clamped to `[0, 1]`.
    pub ratio: f64,
}

impl PlaybackProgress {
    pub const IDLE: Self = Self {
        is_playing: false,
        index: None,
        ratio: 0.0,
    };
}

/// Starts clips on an [`AudioBackend`], one at a time, and times them.
///
/// "Finished" is decided by the clock against the duration parsed from the
/// WAV header, not by watching the player.
pub struct PlaybackDispatcher {
    backend: Box<dyn AudioBackend>,
    clock: Box<dyn Clock>,
    state: PlaybackState,
}

impl PlaybackDispatcher {
    pub fn new(backend: Box<dyn AudioBackend>, clock: Box<dyn Clock>) -> Self {
        Self {
            backend,
            clock,
            state: PlaybackState::default(),
        }
    }

    pub fn with_backend(backend: Box<dyn AudioBackend>) -> Self {
        Self::new(backend, Box::new(MonotonicClock::new()))
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Supersede whatever is playing and start `path` as entry `index`.
    ///
    /// If no backend can start, the error is returned and the recorded state
    /// is left as it was.
    pub fn start(&mut self, index: usize, path: &Path) -> Result<(), PlaybackError> {
        let duration_ms = wav::duration_ms(path);

        self.backend.stop();
        if let Err(e) = self.backend.play(path) {
            tracing::warn!(path = %path.display(), error = %e, "playback did not start");
            return Err(e);
        }

        self.state = PlaybackState {
            playing_index: Some(index),
            start_time_ms: self.clock.now_ms(),
            duration_ms,
        };
        tracing::info!(
            index,
            path = %path.display(),
            duration_ms,
            backend = self.backend.name(),
            "playing"
        );
        Ok(())
    }

    /// True exactly once per playback: on the first call at or after the
    /// recorded duration. Resets the state to idle when it fires.
    pub fn poll_finished(&mut self) -> bool {
        self.backend.reap();

        if self.state.playing_index.is_none() {
            return false;
        }
        if self.elapsed_ms() < self.state.duration_ms {
            return false;
        }

        tracing::debug!(index = ?self.state.playing_index, "playback finished");
        self.state = PlaybackState::default();
        true
    }

    pub fn progress(&self) -> PlaybackProgress {
        let Some(index) = self.state.playing_index else {
            return PlaybackProgress::IDLE;
        };

        let ratio = if self.state.duration_ms == 0 {
            1.0
        } else {
            (f64::from(self.elapsed_ms()) / f64::from(self.state.duration_ms)).clamp(0.0, 1.0)
        };

        PlaybackProgress {
            is_playing: true,
            index: Some(index),
            ratio,
        }
    }

    /// Forget the current playback without touching the player.
    pub fn clear(&mut self) {
        self.state = PlaybackState::default();
    }

    /// Silence the player and go idle.
    pub fn stop(&mut self) {
        self.backend.stop();
        self.clear();
    }

    fn elapsed_ms(&self) -> u32 {
        self.clock.now_ms().wrapping_sub(self.state.start_time_ms)
    }
}
