//! Keymap help bar UI component.

use crate::session::RunState;
use crate::ui::ThemeColors;
use ratatui::{layout::Rect, style::Style, widgets::Paragraph, Frame};

/// Draw the keymap help bar.
pub(super) fn draw_keymap(
    f: &mut Frame<'_>,
    area: Rect,
    run_state: RunState,
    prompt_active: bool,
    colors: &ThemeColors,
) {
    let keymap_text = if prompt_active {
        "0-9:offset | Enter:go | Esc:cancel".to_string()
    } else {
        format!(
            "q:quit | s:{} | c:clear | h/l:scroll | PgUp/PgDn:page | o:goto | G:live | y:copy | T:theme",
            run_state.action_label().to_lowercase()
        )
    };

    let paragraph = Paragraph::new(keymap_text).style(Style::default().fg(colors.hint).bg(colors.panel_bg));

    f.render_widget(paragraph, area);
}
