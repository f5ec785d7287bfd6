//! Server-sent events: live view counts

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{Stream, StreamExt};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{info, warn};

use crate::AppState;

/// GET /events
///
/// Emits a `view_count` event for every newly counted view.
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.bus.subscribe()).filter_map(|result| async move {
        match result {
            Ok(update) => Event::default()
                .event(update.event_name())
                .json_data(&update)
                .ok()
                .map(Ok),
            Err(e) => {
                warn!("SSE client lagged: {:?}", e);
                None
            }
        }
    });

    info!("New SSE client connected, total clients: {}", state.bus.subscriber_count());

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("keep-alive"),
    )
}
