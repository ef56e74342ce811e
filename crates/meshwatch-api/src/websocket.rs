//! Operator-events WebSocket stream with auto-reconnect.
//!
//! Connects to the Meshery server's operator-events endpoint and streams
//! parsed [`StatusPayload`] updates through a [`tokio::sync::broadcast`]
//! channel. The first handshake happens inside
//! [`OperatorEventsHandle::connect`] so callers learn immediately whether the
//! subscription was established; later disconnects are retried with
//! exponential backoff + jitter.
//!
//! # Example
//!
//! ```rust,ignore
//! use meshwatch_api::websocket::{OperatorEventsHandle, ReconnectConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! let url = client.operator_events_url()?;
//! let handle = OperatorEventsHandle::connect(
//!     url,
//!     ReconnectConfig::default(),
//!     CancellationToken::new(),
//!     client.cookie_header(),
//! )
//! .await?;
//! let mut rx = handle.subscribe();
//!
//! while let Ok(update) = rx.recv().await {
//!     println!("{update:?}");
//! }
//!
//! handle.shutdown();
//! ```

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use serde::Deserialize;
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio_tungstenite::tungstenite::{self, ClientRequestBuilder};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::Error;
use crate::models::StatusPayload;

// ── Broadcast channel capacity ───────────────────────────────────────

const EVENT_CHANNEL_CAPACITY: usize = 256;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ── ReconnectConfig ──────────────────────────────────────────────────

/// Exponential backoff configuration for WebSocket reconnection.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt. Default: 1s.
    pub initial_delay: Duration,

    /// Upper bound on backoff delay. Default: 30s.
    pub max_delay: Duration,

    /// Maximum reconnection attempts before giving up.
    /// `None` means retry forever.
    pub max_retries: Option<u32>,

    /// Upper bound on a single upgrade handshake. Default: 30s.
    pub handshake_timeout: Duration,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_retries: None,
            handshake_timeout: Duration::from_secs(30),
        }
    }
}

// ── OperatorEventsHandle ─────────────────────────────────────────────

/// Handle to a running operator-events stream.
///
/// Call [`shutdown`](Self::shutdown) to tear down the background task.
#[derive(Debug)]
pub struct OperatorEventsHandle {
    event_rx: broadcast::Receiver<Arc<StatusPayload>>,
    cancel: CancellationToken,
}

impl OperatorEventsHandle {
    /// Perform the initial handshake, then spawn the read/reconnect loop.
    ///
    /// Returns an error if the first handshake fails; no background task
    /// is left running in that case. `cookie` is sent verbatim as the
    /// `Cookie` header of every upgrade request.
    pub async fn connect(
        ws_url: Url,
        reconnect: ReconnectConfig,
        cancel: CancellationToken,
        cookie: Option<String>,
    ) -> Result<Self, Error> {
        let first = open(&ws_url, cookie.as_deref(), reconnect.handshake_timeout).await?;
        let (event_tx, event_rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            ws_loop(ws_url, first, event_tx, reconnect, task_cancel, cookie).await;
        });

        Ok(Self { event_rx, cancel })
    }

    /// Get a new broadcast receiver for the update stream.
    ///
    /// If a consumer falls behind, it receives
    /// [`broadcast::error::RecvError::Lagged`].
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<StatusPayload>> {
        self.event_rx.resubscribe()
    }

    /// Signal the background task to shut down.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// `true` once [`shutdown`](Self::shutdown) was called or the parent
    /// token was cancelled.
    pub fn is_shut_down(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

// ── Background reconnection loop ─────────────────────────────────────

/// Main loop: read → on disconnect, backoff → reconnect → read.
async fn ws_loop(
    ws_url: Url,
    first: WsStream,
    event_tx: broadcast::Sender<Arc<StatusPayload>>,
    reconnect: ReconnectConfig,
    cancel: CancellationToken,
    cookie: Option<String>,
) {
    let mut attempt: u32 = 0;
    let mut established = Some(first);

    loop {
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = session(
                &ws_url,
                established.take(),
                &event_tx,
                &cancel,
                cookie.as_deref(),
                reconnect.handshake_timeout,
            ) => result,
        };

        if cancel.is_cancelled() {
            break;
        }

        match result {
            // Clean disconnect: reset the attempt counter and reconnect immediately.
            Ok(()) => {
                tracing::info!("operator events disconnected cleanly, reconnecting");
                attempt = 0;
            }
            Err(e) => {
                tracing::warn!(error = %e, attempt, "operator events error");

                if let Some(max) = reconnect.max_retries {
                    if attempt >= max {
                        tracing::error!(
                            max_retries = max,
                            "operator events reconnection limit reached, giving up"
                        );
                        break;
                    }
                }

                let delay = calculate_backoff(attempt, &reconnect);
                tracing::info!(
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    attempt,
                    "waiting before reconnect"
                );

                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(delay) => {}
                }

                attempt = attempt.saturating_add(1);
            }
        }
    }

    tracing::debug!("operator events loop exiting");
}

/// One connection lifecycle: reuse an established stream or open a new one,
/// then read until it drops.
async fn session(
    url: &Url,
    established: Option<WsStream>,
    event_tx: &broadcast::Sender<Arc<StatusPayload>>,
    cancel: &CancellationToken,
    cookie: Option<&str>,
    handshake_timeout: Duration,
) -> Result<(), Error> {
    let stream = match established {
        Some(stream) => stream,
        None => open(url, cookie, handshake_timeout).await?,
    };
    read_until_closed(stream, event_tx, cancel).await
}

/// Perform the WebSocket upgrade handshake, giving up after `timeout`.
async fn open(url: &Url, cookie: Option<&str>, timeout: Duration) -> Result<WsStream, Error> {
    tracing::info!(url = %url, "connecting to operator events");

    let uri: tungstenite::http::Uri = url
        .as_str()
        .parse()
        .map_err(|e: tungstenite::http::uri::InvalidUri| Error::WebSocketConnect(e.to_string()))?;

    let mut request = ClientRequestBuilder::new(uri);
    if let Some(cookie_val) = cookie {
        request = request.with_header("Cookie", cookie_val);
    }

    let (ws_stream, _response) = tokio::time::timeout(timeout, tokio_tungstenite::connect_async(request))
        .await
        .map_err(|_| {
            Error::WebSocketConnect(format!("handshake timed out after {}s", timeout.as_secs()))
        })?
        .map_err(|e| Error::WebSocketConnect(e.to_string()))?;

    tracing::info!("operator events connected");
    Ok(ws_stream)
}

/// Read frames until the server closes, the stream errors, or `cancel` fires.
async fn read_until_closed(
    ws_stream: WsStream,
    event_tx: &broadcast::Sender<Arc<StatusPayload>>,
    cancel: &CancellationToken,
) -> Result<(), Error> {
    let (_write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return Ok(()),
            frame = read.next() => {
                match frame {
                    Some(Ok(tungstenite::Message::Text(text))) => {
                        parse_and_broadcast(&text, event_tx);
                    }
                    Some(Ok(tungstenite::Message::Close(frame))) => {
                        if let Some(ref cf) = frame {
                            tracing::info!(
                                code = %cf.code,
                                reason = %cf.reason,
                                "operator events close frame received"
                            );
                        } else {
                            tracing::info!("operator events close frame received (no payload)");
                        }
                        return Ok(());
                    }
                    Some(Err(e)) => {
                        return Err(Error::WebSocketConnect(e.to_string()));
                    }
                    None => {
                        tracing::info!("operator events stream ended");
                        return Ok(());
                    }
                    // Ping is answered by tungstenite; binary frames carry nothing for us.
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}

// ── Message parsing ──────────────────────────────────────────────────

/// Frames arrive either bare or wrapped in a `{"data": ...}` envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Frame {
    Wrapped { data: StatusPayload },
    Bare(StatusPayload),
}

/// Decode one text frame into a status update.
///
/// Returns `None` for unparsable frames and for objects that carry no
/// component section at all (keep-alives, acks).
pub(crate) fn parse_frame(text: &str) -> Option<StatusPayload> {
    let payload = match serde_json::from_str::<Frame>(text) {
        Ok(Frame::Wrapped { data } | Frame::Bare(data)) => data,
        Err(e) => {
            tracing::debug!(error = %e, "failed to parse operator events frame");
            return None;
        }
    };

    if payload.is_empty() {
        tracing::trace!("operator events frame without component data");
        return None;
    }
    Some(payload)
}

fn parse_and_broadcast(text: &str, event_tx: &broadcast::Sender<Arc<StatusPayload>>) {
    if let Some(payload) = parse_frame(text) {
        // No receivers right now is fine.
        let _ = event_tx.send(Arc::new(payload));
    }
}

// ── Backoff calculation ──────────────────────────────────────────────

/// Exponential backoff with jitter.
///
/// `delay = min(initial * 2^attempt, max) * (1 ± 0.25)`
fn calculate_backoff(attempt: u32, config: &ReconnectConfig) -> Duration {
    let exponent = i32::try_from(attempt.min(31)).unwrap_or(31);
    let base = config.initial_delay.as_secs_f64() * 2.0_f64.powi(exponent);
    let capped = base.min(config.max_delay.as_secs_f64());

    // Deterministic jitter seeded from the attempt number.
    let jitter_factor = 1.0 + 0.25 * (f64::from(attempt) * 7.3).sin();
    let with_jitter = (capped * jitter_factor).max(0.0);

    Duration::from_secs_f64(with_jitter)
}

// ── Tests ────────────────────────────────────────────────────────────
