//! Server-sent events between the server and every open panel.
//!
//! Events are plain `message` events whose data is the JSON encoding of the
//! event value, so one client subscription receives every kind of event.
//!
//! # Server Example
//!
//! ```ignore
//! use led_panel::events;
//! use tokio::sync::broadcast;
//!
//! async fn stream(tx: broadcast::Sender<PanelEvent>) -> impl IntoResponse {
//!     let current = PanelEvent::LedUpdate(LedState::default());
//!     events::sse_response(events::subscribe(current, tx.subscribe()))
//! }
//! ```

use serde::de::DeserializeOwned;

#[cfg(feature = "server")]
mod server {
    use axum::response::sse::{Event, KeepAlive, Sse};
    use futures_util::{Stream, StreamExt, stream};
    use serde::Serialize;
    use std::convert::Infallible;
    use tokio::sync::broadcast;
    use tokio_stream::wrappers::BroadcastStream;

    /// Encode each item as a JSON `message` event.
    ///
    /// Items that fail to serialize are sent as an `error` event carrying the
    /// serializer's message.
    pub fn to_event<T: Serialize>(item: &T) -> Event {
        Event::default()
            .json_data(item)
            .unwrap_or_else(|e| Event::default().event("error").data(e.to_string()))
    }

    /// SSE response over a stream of serializable items.
    pub fn sse_response<S, T>(items: S) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
    where
        S: Stream<Item = T> + Send + 'static,
        T: Serialize + 'static,
    {
        let events = items.map(|item| Ok(to_event(&item)));
        Sse::new(events).keep_alive(KeepAlive::default())
    }

    /// `first`, then everything broadcast on `rx`.
    ///
    /// A subscriber that falls behind skips the messages it missed rather
    /// than ending the stream.
    pub fn subscribe<T>(first: T, rx: broadcast::Receiver<T>) -> impl Stream<Item = T> + Send
    where
        T: Clone + Send + 'static,
    {
        let rest = BroadcastStream::new(rx).filter_map(|msg| async move { msg.ok() });
        stream::once(async move { first }).chain(rest)
    }
}

#[cfg(feature = "server")]
pub use server::*;

/// Failure on the client side of an event stream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventStreamError {
    #[error("event stream connection error: {0}")]
    Connection(String),
    #[error("event stream parse error: {0}")]
    Parse(String),
}

/// Decode the `data` field of one `message` event.
pub fn decode_event<T: DeserializeOwned>(data: &str) -> Result<T, EventStreamError> {
    serde_json::from_str(data).map_err(|e| EventStreamError::Parse(e.to_string()))
}

// ============================================================================
// Client-side subscription
// ============================================================================

#[cfg(feature = "client")]
mod client {
    use super::{EventStreamError, decode_event};
    use futures_util::stream::{Stream, StreamExt};
    use gloo_net::eventsource::State;
    use gloo_net::eventsource::futures::{EventSource, EventSourceSubscription};
    use serde::de::DeserializeOwned;
    use std::marker::PhantomData;
    use std::pin::Pin;
    use std::task::{Context, Poll, ready};

    /// A browser `EventSource` that yields decoded JSON events.
    ///
    /// Connection errors are yielded while the browser keeps reconnecting;
    /// the stream ends once the source is closed.
    pub struct EventStream<T> {
        source: EventSource,
        messages: EventSourceSubscription,
        _item: PhantomData<fn() -> T>,
    }

    impl<T> EventStream<T> {
        pub fn connect(url: &str) -> Result<Self, EventStreamError> {
            let mut source = EventSource::new(url)
                .map_err(|e| EventStreamError::Connection(format!("{e:?}")))?;
            let messages = source
                .subscribe("message")
                .map_err(|e| EventStreamError::Connection(format!("{e:?}")))?;

            Ok(Self {
                source,
                messages,
                _item: PhantomData,
            })
        }
    }

    impl<T: DeserializeOwned> Stream for EventStream<T> {
        type Item = Result<T, EventStreamError>;

        fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
            let item = match ready!(self.messages.poll_next_unpin(cx)) {
                Some(Ok((_, message))) => {
                    let data = message.data().as_string().unwrap_or_default();
                    Some(decode_event(&data))
                }
                Some(Err(_)) if matches!(self.source.state(), State::Closed) => None,
                Some(Err(e)) => Some(Err(EventStreamError::Connection(format!("{e:?}")))),
                None => None,
            };
            Poll::Ready(item)
        }
    }
}

#[cfg(feature = "client")]
pub use client::*;

#[cfg(test)]
mod decode_tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(tag = "event", content = "data", rename_all = "snake_case")]
    enum Event {
        Count(u32),
    }

    #[test]
    fn decodes_message_data() {
        let event: Event = decode_event(r#"{"event":"count","data":3}"#).unwrap();
        assert_eq!(event, Event::Count(3));
    }

    #[test]
    fn unknown_event_is_a_parse_error() {
        let err = decode_event::<Event>(r#"{"event":"other","data":3}"#).unwrap_err();
        assert!(matches!(err, EventStreamError::Parse(_)));
    }

    #[test]
    fn empty_data_is_a_parse_error() {
        let err = decode_event::<Event>("").unwrap_err();
        assert!(err.to_string().starts_with("event stream parse error"));
    }
}
