//! Replay of recorded payloads.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use super::{ChannelFeed, FeedEvent, FeedSink};
use crate::error::{FluxError, Result};

/// Set once a replay has taken standard input.
static STDIN_CLAIMED: AtomicBool = AtomicBool::new(false);

/// Replay `path` one non-empty line per payload, `interval` apart.
///
/// `-` reads standard input. Standard input can be replayed only once per
/// process: a second replay of `-` (for example after clearing the session)
/// fails with [`FluxError::StdinConsumed`], since the first reader may still
/// be blocked on it. The file is opened before the worker starts so a bad
/// path is reported to the caller directly.
pub fn replay(path: &Path, interval: Duration) -> Result<ChannelFeed> {
    let reader: Box<dyn BufRead + Send> = if path == Path::new("-") {
        claim(&STDIN_CLAIMED)?;
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = File::open(path).map_err(|e| FluxError::file_open(path.to_path_buf(), e))?;
        Box::new(BufReader::new(file))
    };

    ChannelFeed::spawn("fluxview-replay", move |sink| run(reader, interval, &sink))
}

fn claim(flag: &AtomicBool) -> Result<()> {
    if flag.swap(true, Ordering::SeqCst) {
        return Err(FluxError::StdinConsumed);
    }
    Ok(())
}

fn run(reader: Box<dyn BufRead + Send>, interval: Duration, sink: &FeedSink) {
    if !sink.send(FeedEvent::Connected) {
        return;
    }

    let mut sent = 0usize;
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::error!("Replay read failed after {} payloads: {}", sent, e);
                sink.send(FeedEvent::Error(e.to_string()));
                return;
            },
        };

        let payload = line.trim();
        if payload.is_empty() {
            continue;
        }
        if !sink.send(FeedEvent::Message(payload.to_string())) {
            tracing::debug!("Replay stopped after {} payloads", sent);
            return;
        }
        sent += 1;

        if !interval.is_zero() {
            std::thread::sleep(interval);
        }
    }

    tracing::info!("Replay finished, {} payloads", sent);
    sink.send(FeedEvent::Closed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::Feed;
    use std::io::Write;

    #[test]
    fn replays_non_empty_lines_then_closes() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "{{\"magneticField\": 3.0}}").expect("write");
        writeln!(file).expect("write");
        writeln!(file, "  value 4.5  ").expect("write");

        let mut feed = replay(file.path(), Duration::ZERO).expect("open replay");
        let wait = Duration::from_secs(5);
        assert_eq!(feed.next(wait), Some(FeedEvent::Connected));
        assert_eq!(
            feed.next(wait),
            Some(FeedEvent::Message("{\"magneticField\": 3.0}".to_string()))
        );
        assert_eq!(feed.next(wait), Some(FeedEvent::Message("value 4.5".to_string())));
        assert_eq!(feed.next(wait), Some(FeedEvent::Closed));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = replay(Path::new("/definitely/not/here.log"), Duration::ZERO).unwrap_err();
        assert!(matches!(err, FluxError::FileOpen { .. }));
    }

    #[test]
    fn stdin_is_claimed_only_once() {
        let flag = AtomicBool::new(false);
        claim(&flag).expect("first claim");
        assert!(matches!(claim(&flag), Err(FluxError::StdinConsumed)));
        assert!(matches!(claim(&flag), Err(FluxError::StdinConsumed)));
    }
}
