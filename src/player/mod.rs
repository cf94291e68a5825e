pub mod clock;
pub mod dispatcher;
pub mod external;
pub mod native;
pub mod traits;

use serde::{Deserialize, Serialize};

pub use clock::{ManualClock, MonotonicClock};
pub use dispatcher::{PlaybackDispatcher, PlaybackProgress, PlaybackState};
pub use external::{default_players, ExternalChain, PlayerCommand, PlayerProcess};
pub use native::NativeBackend;
pub use traits::{AudioBackend, Clock, PlaybackError};

/// Where playback happens 🎛️
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Native on Windows, external players elsewhere
    #[default]
    Auto,
    /// In-process output device
    Native,
    /// First command-line player that starts
    External,
}

impl BackendKind {
    pub fn resolve(self) -> Self {
        match self {
            Self::Auto if cfg!(windows) => Self::Native,
            Self::Auto => Self::External,
            other => other,
        }
    }
}

/// Factory to get the backend for this platform / configuration
pub fn get_backend(kind: BackendKind, players: &[PlayerCommand]) -> Box<dyn AudioBackend> {
    match kind.resolve() {
        BackendKind::Native => Box::new(NativeBackend::new()),
        _ => Box::new(ExternalChain::new(players.to_vec())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_backend_per_platform() {
        let expected = if cfg!(windows) {
            BackendKind::Native
        } else {
            BackendKind::External
        };
        assert_eq!(BackendKind::Auto.resolve(), expected);
        assert_eq!(get_backend(BackendKind::Native, &[]).name(), "native");
        assert_eq!(
            get_backend(BackendKind::External, &default_players()).name(),
            "external"
        );
    }
}
