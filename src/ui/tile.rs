use crate::app::App;
use crate::ui::utils::{fit, marquee, short_label};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

/// Frames per marquee step (~4 columns a second at 60 fps).
const MARQUEE_FRAMES_PER_STEP: u64 = 15;

/// One sound tile: a rounded card with the label and, while playing, a fill
/// that grows left to right with progress.
pub fn render(f: &mut Frame, area: Rect, app: &App, index: usize) {
    let Some(entry) = app.entries().get(index) else {
        return;
    };
    let theme = &app.theme;
    let playback = app.playback();
    let is_playing = playback.index == Some(index);
    let is_selected = app.ui.selected == index;
    let is_hovered = app.ui.hovered == Some(index);

    let border_color = if is_playing {
        theme.green
    } else if is_selected {
        theme.blue
    } else if is_hovered {
        theme.magenta
    } else {
        theme.surface
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color))
        .style(Style::default().bg(Color::Reset));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let width = usize::from(inner.width);
    let label = if app.ui.focus() == index {
        let offset = (app.ui.marquee_tick / MARQUEE_FRAMES_PER_STEP) as usize;
        marquee(&entry.display_name, width, offset)
    } else {
        short_label(&entry.display_name)
    };

    let mut label_style = Style::default().fg(theme.text);
    if is_selected || is_hovered {
        label_style = label_style.add_modifier(Modifier::BOLD);
    }
    let text = Paragraph::new(Line::from(Span::styled(fit(&label, width), label_style)))
        .alignment(Alignment::Left);
    f.render_widget(text, inner);

    // Progress fill 🟩
    if is_playing {
        let filled = (playback.ratio * f64::from(inner.width)).round() as u16;
        let fill_area = Rect {
            width: filled.min(inner.width),
            ..inner
        };
        if !fill_area.is_empty() {
            f.buffer_mut()
                .set_style(fill_area, Style::default().bg(theme.green).fg(theme.base));
        }
    }
}
