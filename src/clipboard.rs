//! Clipboard integration.

use crate::error::Result;
use crate::session::ChartWindow;
use arboard::Clipboard;

/// Copy text to clipboard.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = Clipboard::new()?;
    clipboard.set_text(text)?;
    Ok(())
}

/// Render the window as `index<TAB>value` lines.
pub fn window_to_tsv(window: &ChartWindow) -> String {
    let mut out = String::with_capacity(window.len() * 12);
    out.push_str("index\tmagnetic_field_mT\n");
    for (index, value) in window.labels.iter().zip(&window.values) {
        out.push_str(&format!("{}\t{}\n", index, value));
    }
    out
}

/// Copy the visible chart window to the clipboard.
pub fn copy_window(window: &ChartWindow) -> Result<()> {
    copy_to_clipboard(&window_to_tsv(window))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tsv_has_header_and_one_row_per_point() {
        let window = ChartWindow {
            labels: vec![70, 71],
            values: vec![1.5, -2.25],
        };
        assert_eq!(
            window_to_tsv(&window),
            "index\tmagnetic_field_mT\n70\t1.5\n71\t-2.25\n"
        );
    }
}
