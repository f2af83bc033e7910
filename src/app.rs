//! Application state and logic.

use std::time::{Duration, Instant};

use crate::clipboard;
use crate::config::Config;
use crate::feed::Connector;
use crate::session::{Outcome, RunState, Session};
use crate::ui::formatters::format_number;

/// Most feed events applied between two frames.
const MAX_EVENTS_PER_FRAME: usize = 512;

/// Application theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    /// Gruvbox dark theme.
    GruvboxDark,
    /// Gruvbox light theme.
    GruvboxLight,
}

impl Theme {
    /// Get the next theme in the cycle.
    pub fn next(self) -> Self {
        match self {
            Theme::GruvboxDark => Theme::GruvboxLight,
            Theme::GruvboxLight => Theme::GruvboxDark,
        }
    }

    /// Get the theme name.
    pub fn name(self) -> &'static str {
        match self {
            Theme::GruvboxDark => "Gruvbox Dark",
            Theme::GruvboxLight => "Gruvbox Light",
        }
    }
}

/// Input line for jumping to a sample offset.
#[derive(Debug, Clone, Default)]
pub struct OffsetPrompt {
    active: bool,
    buffer: String,
}

impl OffsetPrompt {
    /// Open the prompt with an empty buffer.
    pub fn start(&mut self) {
        self.active = true;
        self.buffer.clear();
    }

    /// Whether the prompt is open.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Typed text.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Add a character; anything but a digit is ignored.
    pub fn input(&mut self, c: char) {
        if c.is_ascii_digit() && self.buffer.len() < 18 {
            self.buffer.push(c);
        }
    }

    /// Remove the last character.
    pub fn backspace(&mut self) {
        self.buffer.pop();
    }

    /// Close the prompt and discard input.
    pub fn cancel(&mut self) {
        self.active = false;
        self.buffer.clear();
    }

    /// Close the prompt and return the entered offset, if any.
    pub fn submit(&mut self) -> Option<usize> {
        let value = self.buffer.parse().ok();
        self.cancel();
        value
    }
}

/// Application state.
pub struct App {
    /// Current session.
    pub session: Session,
    /// Where new feeds come from.
    pub connector: Box<dyn Connector>,
    /// Active configuration.
    pub config: Config,
    /// Status message.
    pub status: String,
    /// Current theme.
    pub theme: Theme,
    /// Offset input prompt.
    pub offset_prompt: OffsetPrompt,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("session", &self.session)
            .field("source", &self.connector.describe())
            .field("status", &self.status)
            .field("theme", &self.theme)
            .finish()
    }
}

impl App {
    /// Create a new application instance.
    pub fn new(config: Config, connector: Box<dyn Connector>) -> Self {
        let status = format!("Source: {} (press s to start)", connector.describe());
        Self {
            session: Session::new(&config),
            connector,
            config,
            status,
            theme: Theme::GruvboxDark,
            offset_prompt: OffsetPrompt::default(),
        }
    }

    /// Start, pause or resume the feed.
    pub fn toggle_run(&mut self) {
        match self.session.toggle_run(self.connector.as_mut()) {
            Ok(RunState::Running) => {
                self.status = format!("Recording from {}", self.connector.describe());
            },
            Ok(RunState::Paused) => {
                self.status = "Paused: incoming data is discarded".to_string();
            },
            Ok(RunState::Stopped) => {
                self.status = "Feed ended, press c to clear and start over".to_string();
            },
            Ok(RunState::Idle) => {},
            Err(e) => {
                self.status = format!("Start failed: {}", e);
            },
        }
    }

    /// Drop the session's data and feed.
    pub fn clear(&mut self) {
        self.session.clear();
        self.offset_prompt.cancel();
        self.status = "Cleared".to_string();
    }

    /// Apply pending feed events and periodic housekeeping.
    pub fn on_tick(&mut self, now: Instant) {
        let was_live = self.session.is_live();
        for _ in 0..MAX_EVENTS_PER_FRAME {
            if self.session.pump(Duration::ZERO, now) == Outcome::Idle {
                break;
            }
        }
        self.session.tick(now);

        if was_live && !self.session.is_live() {
            self.status = format!(
                "{} after {} samples",
                self.session.connection().label(),
                format_number(self.session.store().len())
            );
        }
    }

    /// Follow live data.
    pub fn scroll_to_end(&mut self) {
        self.session.scroll_to_end();
        self.status = "Following live data".to_string();
    }

    /// Scroll the chart by `delta` samples.
    pub fn scroll_by(&mut self, delta: isize) {
        self.session.scroll_by(delta);
        self.update_scroll_status();
    }

    /// Scroll by whole windows.
    pub fn page(&mut self, pages: isize) {
        let window = self.session.viewport().window() as isize;
        self.scroll_by(pages.saturating_mul(window));
    }

    /// Apply the offset typed into the prompt.
    pub fn submit_offset(&mut self) {
        match self.offset_prompt.submit() {
            Some(offset) => {
                self.session.scroll_to(offset);
                self.update_scroll_status();
            },
            None => self.status = "No offset entered".to_string(),
        }
    }

    fn update_scroll_status(&mut self) {
        let (start, end) = self.session.visible_range();
        self.status = if self.session.viewport().is_following() {
            "Following live data".to_string()
        } else {
            format!("Samples {}-{}", start, end.saturating_sub(1))
        };
    }

    /// Copy the visible window to the clipboard.
    pub fn copy_window(&mut self) {
        let window = self.session.chart_window();
        if window.is_empty() {
            self.status = "Nothing to copy".to_string();
            return;
        }
        match clipboard::copy_window(&window) {
            Ok(()) => self.status = format!("Copied {} samples", window.len()),
            Err(e) => {
                tracing::warn!("Clipboard copy failed: {}", e);
                self.status = format!("Copy failed: {}", e);
            },
        }
    }

    /// Cycle to the next theme.
    pub fn cycle_theme(&mut self) {
        self.theme = self.theme.next();
        self.status = format!("Theme: {}", self.theme.name());
    }
}
