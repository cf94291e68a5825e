pub mod footer;
pub mod layout;
pub mod tile;
pub mod toast;
pub mod utils;

use crate::app::App;
use layout::Grid;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub fn ui(f: &mut Frame, app: &mut App) {
    let area = f.area();

    // 1. Layout
    let main_layout = layout::get_main_layout(area);
    let body = main_layout.body_area;

    // Remember the geometry so mouse events can be hit-tested against it
    app.ui.grid = Grid::new(body);
    let max_scroll = app.ui.grid.max_scroll(app.entries().len());
    app.ui.scroll_row = app.ui.scroll_row.min(max_scroll);

    // 2. Header
    render_header(f, main_layout.header_area, app);

    // 3. Tiles
    if app.entries().is_empty() {
        let hint = Paragraph::new(Line::from(Span::styled(
            format!("No .wav files under {}", app.root.display()),
            Style::default().fg(app.theme.overlay),
        )))
        .alignment(Alignment::Center);
        let y = body.y + body.height / 2;
        f.render_widget(hint, Rect::new(body.x, y, body.width, body.height.min(1)));
    } else {
        let grid = app.ui.grid;
        for index in 0..app.entries().len() {
            if let Some(rect) = grid.tile_rect(index, app.ui.scroll_row) {
                tile::render(f, rect, app, index);
            }
        }
    }

    // 4. Footer
    footer::render(f, main_layout.footer_area, app);

    // 5. Overlays
    toast::render(f, app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let count = app.entries().len();
    let title = Line::from(vec![
        Span::styled(
            " 🔊 soundgrid ",
            Style::default().fg(theme.blue).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {} ", app.root.display()),
            Style::default().fg(theme.text),
        ),
        Span::styled(
            format!(" {} sound{}", count, if count == 1 { "" } else { "s" }),
            Style::default().fg(theme.overlay),
        ),
    ]);
    f.render_widget(Paragraph::new(title), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{AudioBackend, ManualClock, PlaybackDispatcher, PlaybackError};
    use crate::theme::Theme;
    use crate::watcher::{WatchSignal, WatchState};
    use ratatui::{backend::TestBackend, Terminal};
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

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn app_in(root: &Path) -> App {
        let dispatcher = PlaybackDispatcher::new(Box::new(Silent), Box::new(ManualClock::new(0)));
        App::new(root.to_path_buf(), dispatcher, WatchSignal::new(), Theme::default())
    }

    #[test]
    fn test_renders_tiles_and_status() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("kick.wav"), b"x").unwrap();
        std::fs::write(dir.path().join("a-rather-long-sample-name.wav"), b"x").unwrap();
        let mut app = app_in(dir.path());
        let long = app
            .entries()
            .iter()
            .position(|e| e.display_name.starts_with("a-rather"))
            .unwrap();
        app.ui.selected = 1 - long;
        app.watcher_state = Some(WatchState::Failed);

        let mut terminal = Terminal::new(TestBackend::new(80, 12)).unwrap();
        terminal.draw(|f| ui(f, &mut app)).unwrap();
        let text = screen_text(&terminal);

        assert!(text.contains("kick"));
        assert!(!text.contains("kick.wav"));
        // Not focused, so shortened
        assert!(text.contains("a-rather-long-s..."));
        assert!(text.contains("watcher offline"));
        assert!(text.contains("silent"));
        assert_eq!(app.ui.grid.columns, 3);
    }

    #[test]
    fn test_empty_root_message() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path());

        let mut terminal = Terminal::new(TestBackend::new(60, 10)).unwrap();
        terminal.draw(|f| ui(f, &mut app)).unwrap();
        assert!(screen_text(&terminal).contains("No .wav files"));
    }
}
