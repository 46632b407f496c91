//! Server-Sent Events (SSE) utilities
//!
//! Shared SSE implementations for the DLENS services.

use std::convert::Infallible;
use std::time::Duration;

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;

/// Turn an unbounded event channel into an SSE response.
///
/// The stream ends when the sender side is dropped (e.g. the view
/// unregisters or the session is closed), which terminates the HTTP
/// response cleanly.
pub fn channel_sse_stream(
    mut receiver: UnboundedReceiver<Event>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = async_stream::stream! {
        yield Ok(Event::default()
            .event("ConnectionStatus")
            .data("connected"));

        while let Some(event) = receiver.recv().await {
            yield Ok(event);
        }
        debug!("SSE: event channel closed, ending stream");
    };

    Sse::new(stream).keep_alive(keep_alive())
}

fn keep_alive() -> KeepAlive {
    KeepAlive::new()
        .interval(Duration::from_secs(15))
        .text("heartbeat")
}
