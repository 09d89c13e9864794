use crate::state::RosterState;
use axum::extract::State;
use axum::response::Sse;
use axum::response::sse::{Event, KeepAlive};
use futures::{Stream, StreamExt, future};
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SseEvent {
    CrudStudent,
}

impl SseEvent {
    /// The event name htmx listens for, as in `hx-trigger="sse:crud_student"`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::CrudStudent => "crud_student",
        }
    }
}

pub async fn sse_feed(
    State(state): State<RosterState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.subscribe_to_sse_feed())
        .filter_map(|event| {
            future::ready(match event {
                Ok(event) => Some(Ok(Event::default().event(event.name()).data("changed"))),
                //missing a few is fine, the next one still causes a full refetch
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    warn!(skipped, "SSE subscriber lagged");
                    None
                }
            })
        })
        .take_until(state.shutdown_started());

    Sse::new(stream).keep_alive(KeepAlive::default())
}
