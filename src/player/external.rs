//! Playback through command-line players, tried in order until one starts.

use super::traits::{AudioBackend, PlaybackError};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use std::process::{Child, Command, Stdio};

/// One external player invocation. The clip path is appended as the last argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl PlayerCommand {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// PulseAudio, mpv, PipeWire, ALSA, ffplay. macOS gets `afplay` up front.
pub fn default_players() -> Vec<PlayerCommand> {
    let mut players = Vec::new();
    if cfg!(target_os = "macos") {
        players.push(PlayerCommand::new("afplay", &[]));
    }
    players.extend([
        PlayerCommand::new("paplay", &[]),
        PlayerCommand::new("mpv", &["--no-video", "--really-quiet"]),
        PlayerCommand::new("pw-play", &[]),
        PlayerCommand::new("aplay", &["-q"]),
        PlayerCommand::new("ffplay", &["-nodisp", "-autoexit", "-loglevel", "quiet"]),
    ]);
    players
}

/// A running player. Terminated and reaped when dropped.
#[derive(Debug)]
pub struct PlayerProcess {
    program: String,
    child: Child,
}

impl PlayerProcess {
    pub fn spawn(command: &PlayerCommand, path: &Path) -> io::Result<Self> {
        let child = Command::new(&command.program)
            .args(&command.args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        Ok(Self {
            program: command.program.clone(),
            child,
        })
    }

    pub fn id(&self) -> u32 {
        self.child.id()
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Non-blocking; reaps the child if it has finished.
    pub fn has_exited(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(Some(_)))
    }

    /// Ask the player to quit, then wait for it.
    pub fn terminate(&mut self) {
        match self.child.try_wait() {
            Ok(Some(_)) => return,
            Ok(None) => {}
            Err(e) => tracing::warn!(program = %self.program, error = %e, "cannot query player"),
        }

        self.send_term();
        if let Err(e) = self.child.wait() {
            tracing::warn!(program = %self.program, error = %e, "failed to reap player");
        }
    }

    #[cfg(unix)]
    fn send_term(&mut self) {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        let pid = Pid::from_raw(self.child.id() as i32);
        if let Err(e) = kill(pid, Signal::SIGTERM) {
            tracing::debug!(program = %self.program, error = %e, "SIGTERM failed, killing");
            let _ = self.child.kill();
        }
    }

    #[cfg(not(unix))]
    fn send_term(&mut self) {
        let _ = self.child.kill();
    }
}

impl Drop for PlayerProcess {
    fn drop(&mut self) {
        self.terminate();
    }
}

/// Ordered fallback over [`PlayerCommand`]s; first one that spawns wins.
#[derive(Debug)]
pub struct ExternalChain {
    players: Vec<PlayerCommand>,
    current: Option<PlayerProcess>,
}

impl ExternalChain {
    pub fn new(players: Vec<PlayerCommand>) -> Self {
        Self {
            players,
            current: None,
        }
    }

    pub fn players(&self) -> &[PlayerCommand] {
        &self.players
    }

    /// Pid of the live player, if any.
    pub fn current_pid(&self) -> Option<u32> {
        self.current.as_ref().map(PlayerProcess::id)
    }

    pub fn current_program(&self) -> Option<&str> {
        self.current.as_ref().map(PlayerProcess::program)
    }
}

impl Default for ExternalChain {
    fn default() -> Self {
        Self::new(default_players())
    }
}

impl AudioBackend for ExternalChain {
    fn name(&self) -> &str {
        self.current_program().unwrap_or("external")
    }

    fn play(&mut self, path: &Path) -> Result<(), PlaybackError> {
        for command in &self.players {
            match PlayerProcess::spawn(command, path) {
                Ok(process) => {
                    tracing::debug!(program = %command.program, pid = process.id(), "player started");
                    self.current = Some(process);
                    return Ok(());
                }
                Err(e) => {
                    tracing::debug!(program = %command.program, error = %e, "player unavailable");
                }
            }
        }

        let tried = self
            .players
            .iter()
            .map(|p| p.program.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        Err(PlaybackError::NoBackend(tried))
    }

    fn stop(&mut self) {
        if let Some(mut process) = self.current.take() {
            process.terminate();
        }
    }

    fn reap(&mut self) {
        if self.current.as_mut().is_some_and(PlayerProcess::has_exited) {
            self.current = None;
        }
    }
}
