//! Color themes for the monitor.

use crate::app::Theme;
use crate::session::ConnectionStatus;
use ratatui::style::Color;

/// Colors for each part of the monitor screen.
#[derive(Debug, Clone)]
pub struct ThemeColors {
    /// Panel background.
    pub panel_bg: Color,
    /// Panel borders and the scroll track.
    pub frame: Color,
    /// Panel titles and the run-state badge.
    pub title: Color,
    /// Readout names ("Field", "RPM").
    pub readout_label: Color,
    /// Readout numbers.
    pub readout_value: Color,
    /// Field trace and scroll thumb.
    pub trace: Color,
    /// Axis lines, ticks and titles.
    pub axis: Color,
    /// Placeholder text while there is nothing to show.
    pub placeholder: Color,
    /// Feed is delivering.
    pub link_up: Color,
    /// Feed is still connecting.
    pub link_pending: Color,
    /// Feed failed.
    pub link_failed: Color,
    /// Status line text.
    pub status_fg: Color,
    /// Status line background.
    pub status_bg: Color,
    /// Key hints.
    pub hint: Color,
}

impl ThemeColors {
    /// Palette for `theme`.
    pub fn from_theme(theme: &Theme) -> Self {
        match theme {
            Theme::GruvboxDark => Self {
                panel_bg: Color::Rgb(29, 32, 33),
                frame: Color::Rgb(80, 73, 69),
                title: Color::Rgb(254, 128, 25),
                readout_label: Color::Rgb(168, 153, 132),
                readout_value: Color::Rgb(251, 241, 199),
                trace: Color::Rgb(131, 165, 152),
                axis: Color::Rgb(189, 174, 147),
                placeholder: Color::Rgb(102, 92, 84),
                link_up: Color::Rgb(184, 187, 38),
                link_pending: Color::Rgb(250, 189, 47),
                link_failed: Color::Rgb(251, 73, 52),
                status_fg: Color::Rgb(235, 219, 178),
                status_bg: Color::Rgb(50, 48, 47),
                hint: Color::Rgb(146, 131, 116),
            },
            Theme::GruvboxLight => Self {
                panel_bg: Color::Rgb(249, 245, 215),
                frame: Color::Rgb(189, 174, 147),
                title: Color::Rgb(175, 58, 3),
                readout_label: Color::Rgb(124, 111, 100),
                readout_value: Color::Rgb(40, 40, 40),
                trace: Color::Rgb(7, 102, 120),
                axis: Color::Rgb(80, 73, 69),
                placeholder: Color::Rgb(168, 153, 132),
                link_up: Color::Rgb(121, 116, 14),
                link_pending: Color::Rgb(181, 118, 20),
                link_failed: Color::Rgb(157, 0, 6),
                status_fg: Color::Rgb(60, 56, 54),
                status_bg: Color::Rgb(235, 219, 178),
                hint: Color::Rgb(102, 92, 84),
            },
        }
    }

    /// Color of the connection badge.
    pub fn link(&self, status: &ConnectionStatus) -> Color {
        match status {
            ConnectionStatus::Connected => self.link_up,
            ConnectionStatus::Connecting => self.link_pending,
            ConnectionStatus::Disconnected => self.placeholder,
            ConnectionStatus::Error(_) => self.link_failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_connection_state_has_its_own_color() {
        for theme in [Theme::GruvboxDark, Theme::GruvboxLight] {
            let colors = ThemeColors::from_theme(&theme);
            let badges = [
                colors.link(&ConnectionStatus::Connected),
                colors.link(&ConnectionStatus::Connecting),
                colors.link(&ConnectionStatus::Disconnected),
                colors.link(&ConnectionStatus::Error("reset".to_string())),
            ];
            for (i, a) in badges.iter().enumerate() {
                for b in &badges[i + 1..] {
                    assert_ne!(a, b, "{}", theme.name());
                }
            }
            assert_ne!(colors.trace, colors.panel_bg);
        }
    }
}
