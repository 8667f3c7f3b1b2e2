use crate::core::errors::ApiError;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::{
    connect_async, tungstenite::protocol::Message, MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, warn};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsSource = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Lifecycle of a realtime connection.
///
/// CONNECTING → OPEN → CLOSED, or CONNECTING → CLOSED when the transport
/// fails before opening. There is no reconnecting state: the channel never
/// reconnects on its own, callers construct a fresh connection with the
/// then-current token if they want one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Connecting,
    Open,
    Closed,
}

const STATE_CONNECTING: u8 = 0;
const STATE_OPEN: u8 = 1;
const STATE_CLOSED: u8 = 2;

impl ChannelState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            STATE_CONNECTING => Self::Connecting,
            STATE_OPEN => Self::Open,
            _ => Self::Closed,
        }
    }
}

/// Handle to an open realtime channel.
///
/// The creator owns the handle and releases it via [`close`](Self::close);
/// nothing else in the crate retains it. The underlying transport does not
/// survive environment suspension; on resume, construct a fresh connection
/// instead of reusing this one.
pub struct RealtimeConnection {
    write: Arc<tokio::sync::Mutex<WsSink>>,
    state: Arc<AtomicU8>,
    reader: JoinHandle<()>,
}

impl RealtimeConnection {
    pub fn state(&self) -> ChannelState {
        ChannelState::from_raw(self.state.load(Ordering::SeqCst))
    }

    pub fn is_open(&self) -> bool {
        self.state() == ChannelState::Open
    }

    /// Close the channel and stop message delivery.
    pub async fn close(self) {
        {
            let mut write = self.write.lock().await;
            let _ = write.send(Message::Close(None)).await;
        }
        self.state.store(STATE_CLOSED, Ordering::SeqCst);
        self.reader.abort();
    }
}

impl std::fmt::Debug for RealtimeConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeConnection")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Open a realtime channel and deliver every JSON frame to `on_message`.
///
/// Frames that fail to parse as JSON are logged and dropped without
/// invoking the callback and without closing the connection; a framing bug
/// in the transport must not surface as an application error. Transport
/// pings are answered here.
pub async fn connect<F>(url: &str, on_message: F) -> Result<RealtimeConnection, ApiError>
where
    F: Fn(Value) + Send + 'static,
{
    let state = Arc::new(AtomicU8::new(STATE_CONNECTING));

    let (ws_stream, _) = connect_async(url).await.map_err(|e| {
        state.store(STATE_CLOSED, Ordering::SeqCst);
        ApiError::WebSocketError(format!("realtime connection failed: {}", e))
    })?;

    let (write, read) = ws_stream.split();
    let write = Arc::new(tokio::sync::Mutex::new(write));
    state.store(STATE_OPEN, Ordering::SeqCst);
    debug!("realtime channel open");

    let reader = tokio::spawn(read_loop(
        read,
        Arc::clone(&write),
        Arc::clone(&state),
        on_message,
    ));

    Ok(RealtimeConnection {
        write,
        state,
        reader,
    })
}

async fn read_loop<F>(
    mut read: WsSource,
    write: Arc<tokio::sync::Mutex<WsSink>>,
    state: Arc<AtomicU8>,
    on_message: F,
) where
    F: Fn(Value) + Send + 'static,
{
    while let Some(frame) = read.next().await {
        match frame {
            Ok(Message::Text(text)) => match serde_json::from_str::<Value>(&text) {
                Ok(value) => on_message(value),
                Err(e) => {
                    warn!(error = %e, "dropping realtime frame that is not valid JSON");
                }
            },
            Ok(Message::Ping(payload)) => {
                let mut write = write.lock().await;
                if write.send(Message::Pong(payload)).await.is_err() {
                    break;
                }
            }
            Ok(Message::Close(_)) => {
                debug!("realtime channel closed by server");
                break;
            }
            Ok(_) => {
                // Binary and pong frames carry nothing for us
            }
            Err(e) => {
                warn!(error = %e, "realtime channel transport error");
                break;
            }
        }
    }

    state.store(STATE_CLOSED, Ordering::SeqCst);
}
