use crate::app::App;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// Top-right notice; expiry is handled in `App::tick`.
pub fn render(f: &mut Frame, app: &App) {
    let Some(ref toast) = app.toast else {
        return;
    };
    let theme = &app.theme;
    let screen = f.area();

    let message = &toast.message;
    let width = (message.width() as u16 + 6).min(screen.width.saturating_sub(2));
    let x = screen.width.saturating_sub(width + 1);
    let area = Rect::new(x, 1, width, 3).intersection(screen);
    if area.is_empty() {
        return;
    }

    f.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.blue))
        .style(Style::default().bg(Color::Reset));
    let style = Style::default().fg(theme.blue).add_modifier(Modifier::BOLD);
    let text = Paragraph::new(Line::from(Span::styled(message.as_str(), style)))
        .alignment(Alignment::Center)
        .block(block);
    f.render_widget(text, area);
}
