use crate::library::{SoundEntry, SoundLibrary};
use crate::player::{PlaybackDispatcher, PlaybackError, PlaybackProgress};
use crate::theme::Theme;
use crate::ui::layout::Grid;
use crate::watcher::{WatchSignal, WatchState};
use std::path::PathBuf;
use std::time::{Duration, Instant};

const TOAST_DURATION: Duration = Duration::from_millis(2500);

/// Transient status message 🍞
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub deadline: Instant,
}

/// Selection, hover and scroll for the tile grid.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub selected: usize,
    pub hovered: Option<usize>,
    pub scroll_row: usize,
    /// Frames since the focused tile changed; drives the marquee.
    pub marquee_tick: u64,
    /// Geometry of the last drawn frame, for mouse hit-testing.
    pub grid: Grid,
}

impl UiState {
    /// Tile whose label scrolls: the hovered one, else the selected one.
    pub fn focus(&self) -> usize {
        self.hovered.unwrap_or(self.selected)
    }
}

/// Everything the frame loop owns, passed by reference to input and rendering.
pub struct App {
    pub root: PathBuf,
    library: SoundLibrary,
    dispatcher: PlaybackDispatcher,
    signal: WatchSignal,
    pub ui: UiState,
    pub theme: Theme,
    /// Last known watcher health; `None` when no watcher is running.
    pub watcher_state: Option<WatchState>,
    pub toast: Option<Toast>,
    pub is_running: bool,
}

impl App {
    /// Scans `root` right away.
    pub fn new(root: PathBuf, dispatcher: PlaybackDispatcher, signal: WatchSignal, theme: Theme) -> Self {
        let library = SoundLibrary::scan(&root);
        Self {
            root,
            library,
            dispatcher,
            signal,
            ui: UiState::default(),
            theme,
            watcher_state: None,
            toast: None,
            is_running: true,
        }
    }

    pub fn entries(&self) -> &[SoundEntry] {
        self.library.entries()
    }

    pub fn backend_name(&self) -> &str {
        self.dispatcher.backend_name()
    }

    /// Start playing entry `index`, cutting off whatever was playing.
    pub fn activate(&mut self, index: usize) -> Result<(), PlaybackError> {
        let entry = self
            .library
            .get(index)
            .ok_or(PlaybackError::NoSuchEntry(index))?;
        self.dispatcher.start(index, &entry.path)
    }

    pub fn activate_selected(&mut self) {
        if self.library.is_empty() {
            return;
        }
        if let Err(e) = self.activate(self.ui.selected) {
            self.show_toast(&format!("Playback failed: {}", e));
        }
    }

    /// Run the finished check, then report where playback stands.
    pub fn poll_playback_progress(&mut self) -> PlaybackProgress {
        self.dispatcher.poll_finished();
        self.dispatcher.progress()
    }

    /// Snapshot without advancing state (for rendering).
    pub fn playback(&self) -> PlaybackProgress {
        self.dispatcher.progress()
    }

    /// Consumes the refresh signal.
    pub fn should_reload(&self) -> bool {
        self.signal.take()
    }

    /// Rescan the root and drop index-based state (selection, hover, playback).
    pub fn reload(&mut self) {
        self.library = SoundLibrary::scan(&self.root);
        self.dispatcher.clear();
        self.ui.selected = 0;
        self.ui.hovered = None;
        self.ui.scroll_row = 0;
        self.ui.marquee_tick = 0;
    }

    /// Once per frame.
    pub fn tick(&mut self) {
        if self.should_reload() {
            self.reload();
        }
        self.poll_playback_progress();
        self.ui.marquee_tick = self.ui.marquee_tick.wrapping_add(1);

        if self
            .toast
            .as_ref()
            .is_some_and(|t| Instant::now() >= t.deadline)
        {
            self.toast = None;
        }
    }

    pub fn show_toast(&mut self, message: &str) {
        self.toast = Some(Toast {
            message: message.to_string(),
            deadline: Instant::now() + TOAST_DURATION,
        });
    }

    /// Move the selection by whole tiles; `dy` counts rows.
    pub fn move_selection(&mut self, dx: isize, dy: isize) {
        let count = self.library.len();
        if count == 0 {
            return;
        }
        let columns = self.ui.grid.columns as isize;
        let target = self.ui.selected as isize + dx + dy * columns;
        let next = target.clamp(0, count as isize - 1) as usize;

        if next != self.ui.selected {
            self.ui.selected = next;
            self.ui.marquee_tick = 0;
        }
        self.ui.scroll_row = self.ui.grid.scroll_to_show(next, self.ui.scroll_row);
    }

    pub fn hover_at(&mut self, x: u16, y: u16) {
        let hovered = self
            .ui
            .grid
            .tile_at(x, y, self.ui.scroll_row, self.library.len());
        if hovered != self.ui.hovered {
            self.ui.hovered = hovered;
            self.ui.marquee_tick = 0;
        }
    }

    pub fn click_at(&mut self, x: u16, y: u16) {
        let hit = self
            .ui
            .grid
            .tile_at(x, y, self.ui.scroll_row, self.library.len());
        if let Some(index) = hit {
            self.ui.selected = index;
            self.activate_selected();
        }
    }

    pub fn scroll_by(&mut self, rows: isize) {
        let max = self.ui.grid.max_scroll(self.library.len()) as isize;
        self.ui.scroll_row = (self.ui.scroll_row as isize + rows).clamp(0, max) as usize;
    }

    /// Silence the player; used on shutdown.
    pub fn stop_playback(&mut self) {
        self.dispatcher.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{AudioBackend, ManualClock};
    use ratatui::layout::Rect;
    use std::fs;
    use std::path::Path;

    struct Silent;

    impl AudioBackend for Silent {
        fn name(&self) -> &str {
            "silent"
        }

        fn play(&mut self, _: &Path) -> Result<(), PlaybackError> {
            Ok(())
        }

        fn stop(&mut self) {}
    }

    fn app_in(root: &Path, clock: &ManualClock) -> App {
        let dispatcher = PlaybackDispatcher::new(Box::new(Silent), Box::new(clock.clone()));
        App::new(root.to_path_buf(), dispatcher, WatchSignal::new(), Theme::default())
    }

    fn tree(n: usize) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..n {
            fs::write(dir.path().join(format!("s{i:02}.wav")), b"x").unwrap();
        }
        dir
    }

    #[test]
    fn test_activate_out_of_range() {
        let dir = tree(2);
        let mut app = app_in(dir.path(), &ManualClock::new(0));
        assert!(matches!(app.activate(5), Err(PlaybackError::NoSuchEntry(5))));
        assert_eq!(app.playback(), PlaybackProgress::IDLE);
    }

    #[test]
    fn test_reload_consumes_signal_and_resets() {
        let dir = tree(3);
        let clock = ManualClock::new(0);
        let mut app = app_in(dir.path(), &clock);
        app.ui.selected = 2;
        app.ui.hovered = Some(1);
        app.activate(2).unwrap();
        assert!(app.playback().is_playing);

        fs::write(dir.path().join("new.wav"), b"x").unwrap();
        app.signal.raise();
        app.tick();

        assert_eq!(app.entries().len(), 4);
        assert_eq!(app.ui.selected, 0);
        assert_eq!(app.ui.hovered, None);
        assert!(!app.playback().is_playing);
        assert!(!app.should_reload());
    }

    #[test]
    fn test_keyboard_navigation_clamps() {
        let dir = tree(7);
        let mut app = app_in(dir.path(), &ManualClock::new(0));
        app.ui.grid = Grid::new(Rect::new(0, 0, 24 * 3, 3 * 2));

        app.move_selection(1, 0);
        assert_eq!(app.ui.selected, 1);
        app.move_selection(0, 1);
        assert_eq!(app.ui.selected, 4);
        app.move_selection(0, 1);
        assert_eq!(app.ui.selected, 6);
        assert_eq!(app.ui.scroll_row, 1);
        app.move_selection(-100, 0);
        assert_eq!(app.ui.selected, 0);
        assert_eq!(app.ui.scroll_row, 0);
    }

    #[test]
    fn test_click_plays_tile_under_cursor() {
        let dir = tree(4);
        let mut app = app_in(dir.path(), &ManualClock::new(0));
        app.ui.grid = Grid::new(Rect::new(0, 1, 24 * 2, 3 * 2));

        app.click_at(30, 5);
        assert_eq!(app.ui.selected, 3);
        assert_eq!(app.playback().index, Some(3));

        app.hover_at(1, 2);
        assert_eq!(app.ui.hovered, Some(0));
        assert_eq!(app.ui.focus(), 0);
        app.hover_at(200, 200);
        assert_eq!(app.ui.focus(), 3);
    }

    #[test]
    fn test_scroll_is_clamped() {
        let dir = tree(9);
        let mut app = app_in(dir.path(), &ManualClock::new(0));
        app.ui.grid = Grid::new(Rect::new(0, 0, 24 * 2, 3 * 2));
        // 5 rows, 2 visible
        app.scroll_by(10);
        assert_eq!(app.ui.scroll_row, 3);
        app.scroll_by(-1);
        assert_eq!(app.ui.scroll_row, 2);
        app.scroll_by(-10);
        assert_eq!(app.ui.scroll_row, 0);
    }

    #[test]
    fn test_toast_expires() {
        let dir = tree(0);
        let mut app = app_in(dir.path(), &ManualClock::new(0));
        app.show_toast("hello");
        app.tick();
        assert!(app.toast.is_some());
        app.toast.as_mut().unwrap().deadline = Instant::now();
        app.tick();
        assert!(app.toast.is_none());
    }
}
