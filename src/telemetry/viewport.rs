//! Viewport controller.
//!
//! Decides which contiguous window of the sample store the chart shows:
//! either the trailing `window` samples, or a window pinned at a
//! user-chosen offset.

/// Where the viewport is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewportMode {
    /// Always show the most recent samples.
    #[default]
    Following,
    /// Show the window starting at this index.
    Fixed(usize),
}

/// State of the history scroll control, derived from the store length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollControl {
    /// There is history outside the window to scroll into.
    pub enabled: bool,
    /// Largest valid offset.
    pub max: usize,
    /// Current position of the thumb.
    pub value: usize,
}

/// Viewport over a growing sample store.
#[derive(Debug, Clone)]
pub struct Viewport {
    window: usize,
    mode: ViewportMode,
}

impl Viewport {
    /// Create a viewport showing `window` samples, following live data.
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            mode: ViewportMode::Following,
        }
    }

    /// Window size.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Current mode.
    pub fn mode(&self) -> ViewportMode {
        self.mode
    }

    /// Whether the viewport follows live data.
    pub fn is_following(&self) -> bool {
        self.mode == ViewportMode::Following
    }

    fn max_offset(&self, len: usize) -> usize {
        len.saturating_sub(self.window)
    }

    /// Keep a pinned offset inside the valid range after the store changed.
    pub fn on_new_sample(&mut self, len: usize) {
        if let ViewportMode::Fixed(offset) = self.mode {
            let max = self.max_offset(len);
            if offset > max {
                self.mode = ViewportMode::Fixed(max);
            }
        }
    }

    /// Pin the window at `requested`. Scrolling to (or past) the end snaps
    /// back to following, so the view never sits one sample behind live.
    pub fn set_offset(&mut self, requested: usize, len: usize) {
        let max = self.max_offset(len);
        self.mode = if requested >= max {
            ViewportMode::Following
        } else {
            ViewportMode::Fixed(requested)
        };
    }

    /// Move the window by `delta` samples relative to what is visible now.
    pub fn scroll_by(&mut self, delta: isize, len: usize) {
        let (start, _) = self.visible_range(len);
        let target = if delta < 0 {
            start.saturating_sub(delta.unsigned_abs())
        } else {
            start.saturating_add(delta as usize)
        };
        self.set_offset(target, len);
    }

    /// Return to following live data.
    pub fn follow_latest(&mut self) {
        self.mode = ViewportMode::Following;
    }

    /// Go back to the initial state.
    pub fn reset(&mut self) {
        self.follow_latest();
    }

    /// Half-open index range `(start, end)` to draw for a store of `len`.
    pub fn visible_range(&self, len: usize) -> (usize, usize) {
        let max = self.max_offset(len);
        match self.mode {
            ViewportMode::Following => (max, len),
            ViewportMode::Fixed(offset) => {
                let start = offset.min(max);
                (start, (start + self.window).min(len))
            },
        }
    }

    /// Scroll control state for a store of `len`.
    pub fn scroll_control(&self, len: usize) -> ScrollControl {
        let max = self.max_offset(len);
        let value = match self.mode {
            ViewportMode::Following => max,
            ViewportMode::Fixed(_) => self.visible_range(len).0,
        };
        ScrollControl {
            enabled: len > self.window,
            max,
            value,
        }
    }
}
