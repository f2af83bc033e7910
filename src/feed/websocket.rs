//! WebSocket client feed.

use std::net::TcpStream;
use std::time::Duration;

use tungstenite::client::IntoClientRequest;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

use super::{ChannelFeed, FeedEvent, FeedSink};
use crate::error::{FluxError, Result};

/// How often a blocked read wakes up to check for a close request.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Connect to a telemetry relay on a worker thread.
///
/// A malformed URL is rejected here. The connection attempt itself happens
/// on the worker; its outcome arrives as `Connected` or `Error`.
pub fn websocket(url: &str) -> Result<ChannelFeed> {
    url.into_client_request().map_err(|e| FluxError::connect(url, e))?;
    let url = url.to_string();
    ChannelFeed::spawn("fluxview-ws", move |sink| run(&url, &sink))
}

fn run(url: &str, sink: &FeedSink) {
    let mut socket = match tungstenite::connect(url) {
        Ok((socket, response)) => {
            tracing::info!("Connected to {} (HTTP {})", url, response.status());
            socket
        },
        Err(e) => {
            tracing::error!("Connection to {} failed: {}", url, e);
            sink.send(FeedEvent::Error(e.to_string()));
            return;
        },
    };

    set_read_timeout(&mut socket);

    if !sink.send(FeedEvent::Connected) {
        shutdown(&mut socket);
        return;
    }

    loop {
        if sink.is_stopped() {
            shutdown(&mut socket);
            return;
        }

        let text = match socket.read() {
            Ok(Message::Text(text)) => text,
            Ok(Message::Binary(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
            Ok(Message::Close(frame)) => {
                tracing::info!("Relay closed the connection: {:?}", frame);
                let _ = socket.flush();
                sink.send(FeedEvent::Closed);
                return;
            },
            Ok(_) => continue,
            Err(tungstenite::Error::Io(e))
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) =>
            {
                continue;
            },
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                sink.send(FeedEvent::Closed);
                return;
            },
            Err(e) => {
                tracing::error!("WebSocket read failed: {}", e);
                sink.send(FeedEvent::Error(e.to_string()));
                return;
            },
        };

        if !sink.send(FeedEvent::Message(text)) {
            shutdown(&mut socket);
            return;
        }
    }
}

fn set_read_timeout(socket: &mut WebSocket<MaybeTlsStream<TcpStream>>) {
    if let MaybeTlsStream::Plain(stream) = socket.get_mut() {
        if let Err(e) = stream.set_read_timeout(Some(POLL_INTERVAL)) {
            tracing::warn!("Could not set read timeout: {}", e);
        }
    }
}

fn shutdown(socket: &mut WebSocket<MaybeTlsStream<TcpStream>>) {
    tracing::debug!("Closing WebSocket");
    if let Err(e) = socket.close(None) {
        tracing::debug!("Close handshake failed: {}", e);
    }
    let _ = socket.flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::Feed;
    use std::net::TcpListener;

    #[test]
    fn relays_messages_until_remote_close() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        let server = std::thread::spawn(move || {
            let (stream, _) = listener.accept().expect("accept");
            let mut ws = tungstenite::accept(stream).expect("handshake");
            ws.send(Message::Text(r#"{"magneticField":1.5}"#.into()))
                .expect("send");
            ws.send(Message::Binary(b"raw 7".to_vec())).expect("send");
            ws.close(None).expect("close");
            // Drain until the client acknowledges the close.
            while ws.read().is_ok() {}
        });

        let mut feed = websocket(&format!("ws://{}", addr)).expect("spawn worker");
        let wait = Duration::from_secs(5);
        assert_eq!(feed.next(wait), Some(FeedEvent::Connected));
        assert_eq!(
            feed.next(wait),
            Some(FeedEvent::Message(r#"{"magneticField":1.5}"#.to_string()))
        );
        assert_eq!(feed.next(wait), Some(FeedEvent::Message("raw 7".to_string())));
        assert_eq!(feed.next(wait), Some(FeedEvent::Closed));
        feed.close();
        server.join().expect("server thread");
    }

    #[test]
    fn invalid_url_is_rejected_before_spawning() {
        let err = websocket("not a url").unwrap_err();
        assert!(matches!(&err, FluxError::Connect { url, .. } if url == "not a url"), "got {err:?}");
        assert_eq!(err.to_string(), "Failed to connect to not a url");
    }
}
