use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod user;

pub use user::UserConfig;

use crate::app::cli::Args;
use crate::player::{BackendKind, PlayerCommand};
use crate::theme::Theme;
use crate::watcher::WatcherKind;

pub struct AppConfig;

impl AppConfig {
    pub fn get_config_dir() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let xdg_dir = home.join(".config").join("soundgrid");

        // Ensure it exists
        if !xdg_dir.exists() {
            let _ = fs::create_dir_all(&xdg_dir);
        }

        xdg_dir
    }

    pub fn get_config_path() -> PathBuf {
        Self::get_config_dir().join("config.toml")
    }

    pub fn get_log_dir() -> PathBuf {
        Self::get_config_dir().join("logs")
    }

    /// Load `config.toml`, writing the defaults there on first run.
    pub fn load() -> UserConfig {
        Self::load_from(&Self::get_config_path(), true)
    }

    /// Load from `path`; a missing file yields defaults (written back when
    /// `create` is set), a malformed one yields defaults with a warning.
    pub fn load_from(path: &Path, create: bool) -> UserConfig {
        if !path.exists() {
            let config = UserConfig::default();
            if create {
                if let Err(e) = Self::write_default(path) {
                    tracing::warn!(path = %path.display(), error = %e, "could not write default config");
                }
            }
            return config;
        }

        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "invalid config, using defaults");
                UserConfig::default()
            }),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable config, using defaults");
                UserConfig::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<UserConfig> {
        toml::from_str(content).context("parsing config.toml")
    }

    pub fn default_toml() -> Result<String> {
        toml::to_string_pretty(&UserConfig::default()).context("serializing default config")
    }

    fn write_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, Self::default_toml()?)?;
        Ok(())
    }
}

/// Effective settings: CLI flags over `config.toml` over defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub root: PathBuf,
    pub watcher: WatcherKind,
    pub poll_interval: Duration,
    pub backend: BackendKind,
    pub players: Vec<PlayerCommand>,
    pub theme: Theme,
}

impl Settings {
    pub fn merge(args: &Args, config: UserConfig) -> Self {
        let root = args
            .root
            .clone()
            .or_else(|| config.root_directory.as_deref().map(expand_home))
            .unwrap_or_else(|| PathBuf::from("."));

        let poll_ms = args.poll_interval_ms.unwrap_or(config.poll_interval_ms).max(1);

        Self {
            root,
            watcher: args.watcher.unwrap_or(config.watcher),
            poll_interval: Duration::from_millis(poll_ms),
            backend: args.backend.unwrap_or(config.backend),
            players: config.players,
            theme: config.theme,
        }
    }
}

fn expand_home(raw: &str) -> PathBuf {
    match raw.strip_prefix("~") {
        Some(rest) => {
            let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
            home.join(rest.trim_start_matches(['/', '\\']))
        }
        None => PathBuf::from(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::default_players;

    #[test]
    fn test_empty_config_is_default() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config, UserConfig::default());
        assert_eq!(config.poll_interval_ms, 500);
        assert_eq!(config.players, default_players());
    }

    #[test]
    fn test_default_toml_round_trips() {
        let text = AppConfig::default_toml().unwrap();
        assert_eq!(AppConfig::parse(&text).unwrap(), UserConfig::default());
    }

    #[test]
    fn test_partial_config() {
        let config = AppConfig::parse(
            r#"
            root_directory = "/srv/clips"
            watcher = "notify"
            backend = "external"

            [[players]]
            program = "aplay"
            args = ["-q"]
            "#,
        )
        .unwrap();
        assert_eq!(config.root_directory.as_deref(), Some("/srv/clips"));
        assert_eq!(config.watcher, WatcherKind::Notify);
        assert_eq!(config.backend, BackendKind::External);
        assert_eq!(config.players, vec![PlayerCommand::new("aplay", &["-q"])]);
        assert_eq!(config.poll_interval_ms, 500);
    }

    #[test]
    fn test_bad_config_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "watcher = 12").unwrap();
        assert_eq!(AppConfig::load_from(&path, false), UserConfig::default());
    }

    #[test]
    fn test_missing_config_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");
        assert_eq!(AppConfig::load_from(&path, true), UserConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn test_cli_overrides_config() {
        let config = UserConfig {
            root_directory: Some("/from/config".to_string()),
            watcher: WatcherKind::Notify,
            poll_interval_ms: 250,
            ..UserConfig::default()
        };
        let args = Args {
            root: Some(PathBuf::from("/from/cli")),
            backend: Some(BackendKind::Native),
            ..Args::default()
        };

        let settings = Settings::merge(&args, config);
        assert_eq!(settings.root, PathBuf::from("/from/cli"));
        assert_eq!(settings.watcher, WatcherKind::Notify);
        assert_eq!(settings.poll_interval, Duration::from_millis(250));
        assert_eq!(settings.backend, BackendKind::Native);
    }

    #[test]
    fn test_root_defaults_to_working_directory() {
        let settings = Settings::merge(&Args::default(), UserConfig::default());
        assert_eq!(settings.root, PathBuf::from("."));
        assert_eq!(settings.poll_interval, Duration::from_millis(500));
    }

    #[test]
    fn test_home_expansion() {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        assert_eq!(expand_home("~/Sounds"), home.join("Sounds"));
        assert_eq!(expand_home("/abs"), PathBuf::from("/abs"));
    }
}
