//! Telemetry feeds.
//!
//! A feed is the inbound side of one session: a worker thread owns the
//! transport and forwards [`FeedEvent`]s over a channel, and the session
//! pulls them one at a time with [`Feed::next`]. Events of a feed arrive in
//! the order the transport produced them.

mod replay;
mod websocket;

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::error::Result;

pub use replay::replay;
pub use websocket::websocket;

/// Something that happened on a feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    /// Transport is up.
    Connected,
    /// One inbound payload.
    Message(String),
    /// Remote side closed the feed.
    Closed,
    /// Transport failed.
    Error(String),
}

/// Inbound event source for one session.
pub trait Feed: Send {
    /// Wait up to `timeout` for the next event.
    fn next(&mut self, timeout: Duration) -> Option<FeedEvent>;

    /// Stop the feed. Nothing is delivered afterwards, not even `Closed`.
    ///
    /// A feed whose transport ends on its own always reports `Closed` or
    /// `Error` last.
    fn close(&mut self);
}

/// Opens a fresh feed each time a session starts.
pub trait Connector {
    /// Open a new feed.
    fn connect(&mut self) -> Result<Box<dyn Feed>>;

    /// Human-readable name of the source.
    fn describe(&self) -> String;
}

/// Producer half handed to feed workers.
#[derive(Debug, Clone)]
pub struct FeedSink {
    tx: Sender<FeedEvent>,
    stop: Arc<AtomicBool>,
}

impl FeedSink {
    /// Deliver an event. Returns false once the feed was closed.
    pub fn send(&self, event: FeedEvent) -> bool {
        if self.is_stopped() {
            return false;
        }
        self.tx.send(event).is_ok()
    }

    /// Whether the consumer asked the worker to stop.
    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }
}

/// Feed backed by an mpsc channel, usually filled by a worker thread.
#[derive(Debug)]
pub struct ChannelFeed {
    rx: Option<Receiver<FeedEvent>>,
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    ended: bool,
}

impl ChannelFeed {
    /// Run `work` on a named thread, feeding this channel.
    pub fn spawn<F>(name: &str, work: F) -> Result<Self>
    where
        F: FnOnce(FeedSink) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let sink = FeedSink {
            tx,
            stop: Arc::clone(&stop),
        };
        let worker = std::thread::Builder::new()
            .name(name.to_string())
            .spawn(move || work(sink))?;

        Ok(Self {
            rx: Some(rx),
            stop,
            worker: Some(worker),
            ended: false,
        })
    }

    /// Feed that replays a fixed list of events.
    pub fn from_events(events: impl IntoIterator<Item = FeedEvent>) -> Self {
        let (tx, rx) = mpsc::channel();
        for event in events {
            // The receiver is alive, so this cannot fail.
            let _ = tx.send(event);
        }
        Self {
            rx: Some(rx),
            stop: Arc::new(AtomicBool::new(false)),
            worker: None,
            ended: false,
        }
    }
}

impl Feed for ChannelFeed {
    fn next(&mut self, timeout: Duration) -> Option<FeedEvent> {
        let rx = self.rx.as_ref()?;
        match rx.recv_timeout(timeout) {
            Ok(event) => {
                self.ended = matches!(event, FeedEvent::Closed | FeedEvent::Error(_));
                Some(event)
            },
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                self.rx = None;
                if self.ended {
                    return None;
                }
                // Worker exited (or panicked) without saying so.
                tracing::warn!("Feed worker ended without a close event");
                self.ended = true;
                Some(FeedEvent::Closed)
            },
        }
    }

    fn close(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        self.rx = None;
        // The worker notices the flag on its next poll; no need to wait.
        self.worker.take();
    }
}

impl Drop for ChannelFeed {
    fn drop(&mut self) {
        self.close();
    }
}

/// Feed source chosen on the command line.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedTarget {
    /// Live WebSocket relay.
    WebSocket(String),
    /// Recorded payloads, one per line. `-` reads standard input.
    Replay {
        /// File to read.
        path: PathBuf,
        /// Delay between payloads.
        interval: Duration,
    },
}

impl Connector for FeedTarget {
    fn connect(&mut self) -> Result<Box<dyn Feed>> {
        tracing::info!("Opening feed {}", self);
        let feed = match self {
            Self::WebSocket(url) => websocket(url)?,
            Self::Replay { path, interval } => replay(path, *interval)?,
        };
        Ok(Box::new(feed))
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FeedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WebSocket(url) => write!(f, "{}", url),
            Self::Replay { path, .. } => write!(f, "replay {}", path.display()),
        }
    }
}
