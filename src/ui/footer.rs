use crate::app::App;
use crate::watcher::WatchState;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub fn watcher_label(state: Option<WatchState>) -> &'static str {
    match state {
        Some(WatchState::Watching) => "👀 watching",
        Some(WatchState::Terminated) => "watcher stopped",
        Some(WatchState::Failed) => "⚠ watcher offline",
        None => "watcher off",
    }
}

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(36)])
        .split(area);

    let key = Style::default().fg(theme.overlay).add_modifier(Modifier::BOLD);
    let desc = Style::default().fg(theme.overlay);
    let hints = Line::from(vec![
        Span::styled(" ←↓↑→ ", key),
        Span::styled("move", desc),
        Span::styled("  ⏎ ", key),
        Span::styled("play", desc),
        Span::styled("  r ", key),
        Span::styled("rescan", desc),
        Span::styled("  q ", key),
        Span::styled("quit", desc),
    ]);
    f.render_widget(Paragraph::new(hints), chunks[0]);

    let watcher_style = match app.watcher_state {
        Some(WatchState::Failed) => Style::default().fg(theme.red),
        Some(WatchState::Watching) => Style::default().fg(theme.green),
        _ => Style::default().fg(theme.yellow),
    };
    let status = Line::from(vec![
        Span::styled(watcher_label(app.watcher_state), watcher_style),
        Span::styled(" · ", desc),
        Span::styled(format!("🔊 {} ", app.backend_name()), desc),
    ])
    .right_aligned();
    f.render_widget(Paragraph::new(status), chunks[1]);
}
