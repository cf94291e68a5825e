//! In-process playback on the system output device (WASAPI / CoreAudio / ALSA).

use super::traits::{AudioBackend, PlaybackError};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// The output stream is opened on first use and kept for the process lifetime.
#[derive(Default)]
pub struct NativeBackend {
    output: Option<(OutputStream, OutputStreamHandle)>,
    sink: Option<Sink>,
}

impl NativeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&mut self) -> Result<&OutputStreamHandle, PlaybackError> {
        if self.output.is_none() {
            let opened =
                OutputStream::try_default().map_err(|e| PlaybackError::Native(e.to_string()))?;
            tracing::debug!("opened default audio output");
            self.output = Some(opened);
        }
        self.output
            .as_ref()
            .map(|(_, handle)| handle)
            .ok_or_else(|| PlaybackError::Native("audio output unavailable".to_string()))
    }
}

impl AudioBackend for NativeBackend {
    fn name(&self) -> &str {
        "native"
    }

    fn play(&mut self, path: &Path) -> Result<(), PlaybackError> {
        let file = File::open(path)?;
        let source =
            Decoder::new(BufReader::new(file)).map_err(|e| PlaybackError::Native(e.to_string()))?;

        let sink = Sink::try_new(self.handle()?).map_err(|e| PlaybackError::Native(e.to_string()))?;
        sink.append(source);
        self.sink = Some(sink);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }

    fn reap(&mut self) {
        if self.sink.as_ref().is_some_and(Sink::empty) {
            self.sink = None;
        }
    }
}
