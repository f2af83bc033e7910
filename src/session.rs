//! A viewing session: the sample history, the viewport over it, the live
//! readouts and the feed they come from.
//!
//! All mutation happens through [`Session`] methods called from one loop,
//! so events are applied strictly in arrival order.

use std::time::{Duration, Instant};

use crate::config::{Calibration, Config};
use crate::error::Result;
use crate::feed::{Connector, Feed, FeedEvent};
use crate::telemetry::{Payload, RpmTracker, Sample, SampleStore, ScrollControl, Viewport};

/// Whether the session is consuming its feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    /// Not started, or cleared.
    #[default]
    Idle,
    /// Samples are being recorded.
    Running,
    /// Payloads are received and discarded.
    Paused,
    /// The feed ended; only a clear starts over.
    Stopped,
}

impl RunState {
    /// Label of the start/pause/resume control in this state.
    pub fn action_label(self) -> &'static str {
        match self {
            RunState::Idle => "START",
            RunState::Running => "PAUSE",
            RunState::Paused => "RESUME",
            RunState::Stopped => "CLEAR",
        }
    }
}

/// Connection state as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// No feed, or the remote side closed it.
    #[default]
    Disconnected,
    /// Feed opened, waiting for the transport.
    Connecting,
    /// Transport is up.
    Connected,
    /// Transport failed.
    Error(String),
}

impl ConnectionStatus {
    /// Short status text.
    pub fn label(&self) -> String {
        match self {
            ConnectionStatus::Disconnected => "Disconnected".to_string(),
            ConnectionStatus::Connecting => "Connecting...".to_string(),
            ConnectionStatus::Connected => "Connected".to_string(),
            ConnectionStatus::Error(msg) => format!("Error: {}", msg),
        }
    }
}

/// Latest values shown next to the chart.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Readouts {
    /// Field strength in mT of the latest sample, whether it came from a
    /// frame's `magneticField`, a calibrated raw reading or a number found
    /// in a plain-text payload.
    pub magnetic_field: Option<f64>,
    /// Current RPM.
    pub rpm: Option<f64>,
    /// Highest RPM so far.
    pub peak_rpm: Option<f64>,
    /// Motor kV, when the relay reports one.
    pub kv: Option<f64>,
}

/// What handling one event did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// No event was available.
    Idle,
    /// Connection status changed.
    Status,
    /// Payload arrived while paused and was thrown away.
    Dropped,
    /// Payload updated readouts but carried no sample.
    Readout,
    /// A sample was recorded.
    Appended(Sample),
}

/// Labels and values of the visible window, index-aligned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartWindow {
    /// Sample indices.
    pub labels: Vec<u64>,
    /// Field strengths.
    pub values: Vec<f64>,
}

impl ChartWindow {
    /// Number of points.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Points as `(x, y)` pairs for plotting.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.labels
            .iter()
            .zip(&self.values)
            .map(|(&x, &y)| (x as f64, y))
            .collect()
    }
}

/// One viewing session.
pub struct Session {
    store: SampleStore,
    viewport: Viewport,
    run_state: RunState,
    connection: ConnectionStatus,
    readouts: Readouts,
    tracker: RpmTracker,
    calibration: Calibration,
    feed: Option<Box<dyn Feed>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("samples", &self.store.len())
            .field("viewport", &self.viewport)
            .field("run_state", &self.run_state)
            .field("connection", &self.connection)
            .field("readouts", &self.readouts)
            .field("has_feed", &self.feed.is_some())
            .finish()
    }
}

impl Session {
    /// Create an idle session.
    pub fn new(config: &Config) -> Self {
        Self {
            store: SampleStore::new(),
            viewport: Viewport::new(config.chart.window),
            run_state: RunState::Idle,
            connection: ConnectionStatus::Disconnected,
            readouts: Readouts::default(),
            tracker: RpmTracker::new(config.rpm),
            calibration: config.calibration,
            feed: None,
        }
    }

    /// Start, pause or resume.
    ///
    /// Starting opens a feed through `connector`. A stopped session stays
    /// stopped until it is cleared.
    pub fn toggle_run(&mut self, connector: &mut dyn Connector) -> Result<RunState> {
        self.run_state = match self.run_state {
            RunState::Idle => match connector.connect() {
                Ok(feed) => {
                    self.feed = Some(feed);
                    self.connection = ConnectionStatus::Connecting;
                    RunState::Running
                },
                Err(e) => {
                    tracing::error!("Could not open {}: {}", connector.describe(), e);
                    self.connection = ConnectionStatus::Error(e.to_string());
                    return Err(e);
                },
            },
            RunState::Running => RunState::Paused,
            RunState::Paused => RunState::Running,
            RunState::Stopped => RunState::Stopped,
        };
        tracing::info!("Run state: {:?}", self.run_state);
        Ok(self.run_state)
    }

    /// Apply one feed event.
    pub fn handle_event(&mut self, event: FeedEvent, now: Instant) -> Outcome {
        match event {
            FeedEvent::Connected => {
                self.connection = ConnectionStatus::Connected;
                Outcome::Status
            },
            FeedEvent::Closed => {
                self.end_feed(ConnectionStatus::Disconnected);
                Outcome::Status
            },
            FeedEvent::Error(msg) => {
                self.end_feed(ConnectionStatus::Error(msg));
                Outcome::Status
            },
            FeedEvent::Message(text) => {
                if self.run_state == RunState::Paused {
                    return Outcome::Dropped;
                }
                self.ingest(&text, now)
            },
        }
    }

    fn end_feed(&mut self, status: ConnectionStatus) {
        tracing::info!("Feed ended: {}", status.label());
        if let Some(mut feed) = self.feed.take() {
            feed.close();
        }
        self.connection = status;
        self.run_state = RunState::Stopped;
    }

    fn ingest(&mut self, text: &str, now: Instant) -> Outcome {
        let payload = Payload::parse(text);

        let value = if let Some(raw) = payload.raw_reading() {
            let millitesla = self.calibration.to_millitesla(raw);
            self.tracker.observe(millitesla, now);
            self.readouts.rpm = Some(self.tracker.rpm());
            self.readouts.peak_rpm = Some(self.tracker.peak_rpm());
            Some(millitesla)
        } else {
            if let Payload::Frame(ref frame) = payload {
                if frame.rpm.is_some() {
                    self.readouts.rpm = frame.rpm;
                }
                if frame.peak_rpm.is_some() {
                    self.readouts.peak_rpm = frame.peak_rpm;
                }
                if frame.kv.is_some() {
                    self.readouts.kv = frame.kv;
                }
            }
            payload.sample()
        };

        let Some(value) = value else {
            tracing::trace!("No sample in payload {:?}", text);
            return Outcome::Readout;
        };

        self.readouts.magnetic_field = Some(value);
        self.store.append(value);
        self.viewport.on_new_sample(self.store.len());

        match self.store.last() {
            Some(sample) => Outcome::Appended(*sample),
            None => Outcome::Readout,
        }
    }

    /// Wait up to `timeout` for one feed event and apply it.
    pub fn pump(&mut self, timeout: Duration, now: Instant) -> Outcome {
        let Some(feed) = self.feed.as_mut() else {
            return Outcome::Idle;
        };
        match feed.next(timeout) {
            Some(event) => self.handle_event(event, now),
            None => Outcome::Idle,
        }
    }

    /// Periodic housekeeping: zero the RPM when the rotor stopped.
    pub fn tick(&mut self, now: Instant) {
        if self.tracker.tick(now) {
            self.readouts.rpm = Some(self.tracker.rpm());
        }
    }

    /// Drop the feed and all history; back to a fresh idle session.
    pub fn clear(&mut self) {
        if let Some(mut feed) = self.feed.take() {
            feed.close();
        }
        self.store.reset();
        self.viewport.reset();
        self.readouts = Readouts::default();
        self.tracker.reset();
        self.run_state = RunState::Idle;
        self.connection = ConnectionStatus::Disconnected;
        tracing::info!("Session cleared");
    }

    /// Follow live data again.
    pub fn scroll_to_end(&mut self) {
        self.viewport.follow_latest();
    }

    /// Pin the chart at `offset`, or follow when that is the end.
    pub fn scroll_to(&mut self, offset: usize) {
        self.viewport.set_offset(offset, self.store.len());
    }

    /// Move the chart by `delta` samples.
    pub fn scroll_by(&mut self, delta: isize) {
        self.viewport.scroll_by(delta, self.store.len());
    }

    /// Index range currently on the chart.
    pub fn visible_range(&self) -> (usize, usize) {
        self.viewport.visible_range(self.store.len())
    }

    /// Labels and values for the chart.
    pub fn chart_window(&self) -> ChartWindow {
        let (start, end) = self.visible_range();
        let (labels, values) = self
            .store
            .slice(start, end)
            .iter()
            .map(|s| (s.index, s.value))
            .unzip();
        ChartWindow { labels, values }
    }

    /// Scroll control state for the current history.
    pub fn scroll_control(&self) -> ScrollControl {
        self.viewport.scroll_control(self.store.len())
    }

    /// Sample history.
    pub fn store(&self) -> &SampleStore {
        &self.store
    }

    /// Viewport.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Run state.
    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Connection status.
    pub fn connection(&self) -> &ConnectionStatus {
        &self.connection
    }

    /// Latest readouts.
    pub fn readouts(&self) -> &Readouts {
        &self.readouts
    }

    /// Whether a feed is open.
    pub fn is_live(&self) -> bool {
        self.feed.is_some()
    }
}
