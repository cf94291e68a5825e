use crate::player::{default_players, BackendKind, PlayerCommand};
use crate::theme::Theme;
use crate::watcher::WatcherKind;
use serde::{Deserialize, Serialize};

/// User-editable configuration (ReadOnly by App after load)
/// stored in `config.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    /// Directory to scan; the working directory when unset. A leading `~` is expanded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_directory: Option<String>,
    #[serde(default)]
    pub watcher: WatcherKind,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default)]
    pub backend: BackendKind,
    /// External players in the order they are tried.
    #[serde(default = "default_players")]
    pub players: Vec<PlayerCommand>,
    #[serde(default)]
    pub theme: Theme,
}

fn default_poll_interval_ms() -> u64 {
    500
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            root_directory: None,
            watcher: WatcherKind::default(),
            poll_interval_ms: default_poll_interval_ms(),
            backend: BackendKind::default(),
            players: default_players(),
            theme: Theme::default(),
        }
    }
}
