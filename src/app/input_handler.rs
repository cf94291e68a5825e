use crate::app::App;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind, MouseButton};

pub fn handle_event(event: Event, app: &mut App) {
    match event {
        Event::Key(key) => handle_key(key, app),
        Event::Mouse(mouse) => handle_mouse(mouse, app),
        // Layout is recomputed on the next draw
        Event::Resize(..) => {}
        _ => {}
    }
}

pub fn handle_key(key: KeyEvent, app: &mut App) {
    // Windows reports releases too
    if key.kind != KeyEventKind::Press {
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.is_running = false,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.is_running = false,
        KeyCode::Left | KeyCode::Char('h') => app.move_selection(-1, 0),
        KeyCode::Right | KeyCode::Char('l') => app.move_selection(1, 0),
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(0, -1),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(0, 1),
        KeyCode::Enter | KeyCode::Char(' ') => app.activate_selected(),
        KeyCode::Char('r') => {
            app.reload();
            let count = app.entries().len();
            app.show_toast(&format!("🔄 {} sounds", count));
        }
        _ => {}
    }
}

pub fn handle_mouse(mouse: MouseEvent, app: &mut App) {
    match mouse.kind {
        MouseEventKind::Moved | MouseEventKind::Drag(_) => app.hover_at(mouse.column, mouse.row),
        MouseEventKind::Down(MouseButton::Left) => {
            app.hover_at(mouse.column, mouse.row);
            app.click_at(mouse.column, mouse.row);
        }
        MouseEventKind::ScrollDown => app.scroll_by(1),
        MouseEventKind::ScrollUp => app.scroll_by(-1),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{AudioBackend, ManualClock, PlaybackDispatcher, PlaybackError};
    use crate::theme::Theme;
    use crate::ui::layout::Grid;
    use crate::watcher::WatchSignal;
    use crossterm::event::KeyEventState;
    use ratatui::layout::Rect;
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

    fn app_with(n: usize) -> (tempfile::TempDir, App) {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..n {
            std::fs::write(dir.path().join(format!("{i}.wav")), b"x").unwrap();
        }
        let dispatcher = PlaybackDispatcher::new(Box::new(Silent), Box::new(ManualClock::new(0)));
        let mut app = App::new(dir.path().to_path_buf(), dispatcher, WatchSignal::new(), Theme::default());
        app.ui.grid = Grid::new(Rect::new(0, 0, 48, 9));
        (dir, app)
    }

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_quit_keys() {
        let (_dir, mut app) = app_with(1);
        handle_event(press(KeyCode::Char('q')), &mut app);
        assert!(!app.is_running);

        let (_dir, mut app) = app_with(1);
        handle_event(press(KeyCode::Esc), &mut app);
        assert!(!app.is_running);
    }

    #[test]
    fn test_release_is_ignored() {
        let (_dir, mut app) = app_with(3);
        let release = KeyEvent {
            code: KeyCode::Right,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        handle_event(Event::Key(release), &mut app);
        assert_eq!(app.ui.selected, 0);
    }

    #[test]
    fn test_navigate_and_play() {
        let (_dir, mut app) = app_with(5);
        handle_event(press(KeyCode::Char('l')), &mut app);
        handle_event(press(KeyCode::Down), &mut app);
        assert_eq!(app.ui.selected, 3);
        handle_event(press(KeyCode::Enter), &mut app);
        assert_eq!(app.playback().index, Some(3));
    }

    #[test]
    fn test_mouse_hover_click_and_wheel() {
        let (_dir, mut app) = app_with(8);
        handle_event(mouse(MouseEventKind::Moved, 30, 1), &mut app);
        assert_eq!(app.ui.hovered, Some(1));

        handle_event(mouse(MouseEventKind::Down(MouseButton::Left), 5, 4), &mut app);
        assert_eq!(app.ui.selected, 2);
        assert_eq!(app.playback().index, Some(2));

        // 4 rows, 3 visible
        handle_event(mouse(MouseEventKind::ScrollDown, 0, 0), &mut app);
        handle_event(mouse(MouseEventKind::ScrollDown, 0, 0), &mut app);
        assert_eq!(app.ui.scroll_row, 1);
    }
}
