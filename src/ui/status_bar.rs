//! Status bar UI component.

use crate::app::OffsetPrompt;
use crate::ui::ThemeColors;
use ratatui::{layout::Rect, style::Style, widgets::Paragraph, Frame};

/// Draw the status bar.
pub(super) fn draw_status(
    f: &mut Frame<'_>,
    area: Rect,
    status: &str,
    prompt: &OffsetPrompt,
    colors: &ThemeColors,
) {
    let text = if prompt.is_active() {
        format!("Go to sample: {}_", prompt.buffer())
    } else {
        status.to_string()
    };

    let paragraph =
        Paragraph::new(text).style(Style::default().fg(colors.status_fg).bg(colors.status_bg));

    f.render_widget(paragraph, area);
}
