use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::{Stream, StreamExt};
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

use crate::state::AppState;

/// GET /events/{event_id}/stream
/// Server-sent events feed of purchases for one event, so clients can render
/// live availability without polling.
pub async fn event_stream(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.sse_tx.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(move |result| async move {
        match result {
            // The channel is shared by all events; deliver only this one's
            Ok(event) if event.event_id == event_id => {
                let data = serde_json::to_string(&event).ok()?;
                Some(Ok(Event::default().event("ticket_purchased").data(data)))
            }
            // Lagged receivers skip ahead rather than erroring out
            _ => None,
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
