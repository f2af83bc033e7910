//! Fluxview - a terminal viewer for live magnetic-field telemetry.
//!
//! Fluxview reads field-strength samples from a telemetry relay (or a
//! recorded feed), keeps the whole session's history, and draws a
//! fixed-width scrolling chart next to RPM readouts.
//!
//! # Features
//!
//! - WebSocket and file-replay feeds
//! - Relay frames, raw hall sensor frames and plain-text numbers
//! - Local RPM estimation from field peaks
//! - Follow-live or pinned history view
//! - Gruvbox color themes
//! - Clipboard export of the visible window
//!
//! # Example
//!
//! ```
//! use fluxview::config::Config;
//! use fluxview::feed::FeedEvent;
//! use fluxview::session::Session;
//! use std::time::Instant;
//!
//! let mut session = Session::new(&Config::default());
//! session.handle_event(FeedEvent::Message(r#"{"magneticField": 12.5}"#.into()), Instant::now());
//! assert_eq!(session.store().len(), 1);
//! assert_eq!(session.visible_range(), (0, 1));
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]
#![deny(unsafe_code)]

pub mod app;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod feed;
pub mod session;
pub mod telemetry;
pub mod ui;

pub use error::{FluxError, Result};
