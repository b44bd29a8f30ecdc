//! Timetable generation progress client.
//!
//! [`ProgressClient::start`] spawns one task per generation run. The task
//! opens the WebSocket connection for the timetable, feeds every inbound
//! frame through [`GenerationRun::apply`] in arrival order, and publishes a
//! [`GenerationSnapshot`] after each transition on a
//! [`tokio::sync::watch`] channel. The run ends on a terminal event, a
//! transport failure, or cancellation. There is no automatic reconnect: a
//! retry is a new call to `start`.

use std::time::Duration;

use futures::StreamExt;
use reqwest::Url;
use timetabler_core::generation::{Applied, GenerationRun, GenerationSnapshot};
use timetabler_core::session::Session;
use timetabler_core::types::DbId;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::client::{connect, generation_url, ProgressClientError, WsStream};
use crate::config::ClientConfig;
use crate::messages::parse_message;

/// Starts generation runs against one backend.
#[derive(Debug, Clone)]
pub struct ProgressClient {
    base_url: String,
    token: Option<String>,
    close_delay: Duration,
}

impl ProgressClient {
    /// Create a client for the backend at `base_url` (e.g. `http://host:8000`).
    pub fn new(base_url: impl Into<String>) -> Self {
        let defaults = ClientConfig::default();
        Self {
            base_url: base_url.into(),
            token: None,
            close_delay: defaults.close_delay,
        }
    }

    /// Create a client from configuration, authenticating as `session`.
    pub fn from_config(config: &ClientConfig, session: &Session) -> Self {
        Self {
            base_url: config.base_url.clone(),
            token: session.token().map(str::to_string),
            close_delay: config.close_delay,
        }
    }

    /// Send `token` as a bearer header on the upgrade request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// How long to keep the connection open after a terminal event.
    pub fn with_close_delay(mut self, close_delay: Duration) -> Self {
        self.close_delay = close_delay;
        self
    }

    /// Begin generation for a previously created, not yet generated timetable.
    ///
    /// Returns immediately; all communication happens on a spawned task.
    /// Must be called from within a tokio runtime.
    pub fn start(&self, timetable_id: DbId) -> GenerationHandle {
        let run = GenerationRun::for_timetable(timetable_id);
        let (progress_tx, progress_rx) = watch::channel(run.snapshot());
        let cancel = CancellationToken::new();

        let url = generation_url(&self.base_url, timetable_id);
        let session = RunSession {
            timetable_id,
            token: self.token.clone(),
            close_delay: self.close_delay,
            run,
            progress_tx,
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(session.drive(url));

        GenerationHandle {
            timetable_id,
            progress: progress_rx,
            cancel: cancel.clone(),
            _cancel_on_drop: cancel.drop_guard(),
            task,
        }
    }
}

/// Consumer side of one generation run.
///
/// Dropping the handle cancels the run.
pub struct GenerationHandle {
    timetable_id: DbId,
    progress: watch::Receiver<GenerationSnapshot>,
    cancel: CancellationToken,
    _cancel_on_drop: DropGuard,
    task: JoinHandle<GenerationSnapshot>,
}

impl GenerationHandle {
    pub fn timetable_id(&self) -> DbId {
        self.timetable_id
    }

    /// A receiver that observes every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<GenerationSnapshot> {
        self.progress.clone()
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> GenerationSnapshot {
        self.progress.borrow().clone()
    }

    /// Close the connection now, whatever the run state.
    ///
    /// An unfinished run is abandoned; the server owns any rollback.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the run task to exit and return the final snapshot.
    pub async fn finished(self) -> GenerationSnapshot {
        let GenerationHandle {
            timetable_id,
            progress,
            _cancel_on_drop,
            task,
            ..
        } = self;

        match task.await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::error!(timetable_id, error = %e, "Generation task aborted");
                let snapshot = progress.borrow().clone();
                snapshot
            }
        }
    }
}

/// How the receive loop ended.
enum SessionEnd {
    /// A success or error event was applied.
    Terminal,
    /// The consumer cancelled the run.
    Cancelled,
    /// The transport closed or failed before a terminal event.
    Disconnected,
}

/// Everything the run task owns.
struct RunSession {
    timetable_id: DbId,
    token: Option<String>,
    close_delay: Duration,
    run: GenerationRun,
    progress_tx: watch::Sender<GenerationSnapshot>,
    cancel: CancellationToken,
}

impl RunSession {
    /// Connect, receive until the run ends, then close.
    async fn drive(mut self, url: Result<Url, ProgressClientError>) -> GenerationSnapshot {
        let timetable_id = self.timetable_id;

        let url = match url {
            Ok(url) => url,
            Err(e) => {
                tracing::error!(timetable_id, error = %e, "Cannot build generation URL");
                self.run.connection_failed();
                self.publish();
                return self.run.snapshot();
            }
        };

        tracing::info!(timetable_id, url = %url, "Starting timetable generation");

        let connected = tokio::select! {
            _ = self.cancel.cancelled() => None,
            result = connect(&url, timetable_id, self.token.as_deref()) => Some(result),
        };

        let mut ws_stream = match connected {
            None => {
                tracing::info!(timetable_id, "Generation cancelled before connecting");
                self.run.cancel();
                self.publish();
                return self.run.snapshot();
            }
            Some(Err(e)) => {
                tracing::error!(timetable_id, error = %e, "Generation connection failed");
                self.run.connection_failed();
                self.publish();
                return self.run.snapshot();
            }
            Some(Ok(conn)) => conn.ws_stream,
        };

        match self.receive(&mut ws_stream).await {
            SessionEnd::Terminal => self.linger(&mut ws_stream).await,
            SessionEnd::Cancelled => {
                tracing::info!(timetable_id, "Generation cancelled");
                self.run.cancel();
                self.publish();
            }
            SessionEnd::Disconnected => {}
        }

        if let Err(e) = ws_stream.close(None).await {
            tracing::debug!(timetable_id, error = %e, "Error closing generation connection");
        }
        tracing::info!(timetable_id, status = ?self.run.status(), "Generation connection closed");

        self.run.snapshot()
    }

    /// Apply inbound frames until the run ends.
    async fn receive(&mut self, ws_stream: &mut WsStream) -> SessionEnd {
        let timetable_id = self.timetable_id;

        loop {
            let frame = tokio::select! {
                _ = self.cancel.cancelled() => return SessionEnd::Cancelled,
                frame = ws_stream.next() => frame,
            };

            match frame {
                Some(Ok(Message::Text(text))) => {
                    if self.handle_text(&text) {
                        return SessionEnd::Terminal;
                    }
                }
                Some(Ok(Message::Binary(_))) => {
                    tracing::trace!(timetable_id, "Ignoring binary frame");
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => {
                    // Handled automatically by tungstenite.
                }
                Some(Ok(Message::Close(frame))) => {
                    tracing::warn!(timetable_id, ?frame, "Server closed generation connection early");
                    self.disconnected();
                    return SessionEnd::Disconnected;
                }
                Some(Ok(Message::Frame(_))) => {}
                Some(Err(e)) => {
                    tracing::error!(timetable_id, error = %e, "Generation connection receive error");
                    self.disconnected();
                    return SessionEnd::Disconnected;
                }
                None => {
                    tracing::warn!(timetable_id, "Generation stream ended early");
                    self.disconnected();
                    return SessionEnd::Disconnected;
                }
            }
        }
    }

    /// Parse and apply one text frame. Returns `true` once the run is terminal.
    fn handle_text(&mut self, text: &str) -> bool {
        let timetable_id = self.timetable_id;

        let event = match parse_message(text) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(
                    timetable_id,
                    error = %e,
                    raw_message = %text,
                    "Dropping malformed progress message",
                );
                return false;
            }
        };

        match self.run.apply(event) {
            Applied::Progress => {
                if let Some(progress) = self.run.current() {
                    tracing::debug!(
                        timetable_id,
                        level = progress.level,
                        status = %progress.status,
                        percentage = progress.percentage,
                        "Generation progress",
                    );
                }
            }
            Applied::Notice => {
                tracing::debug!(timetable_id, "Generation notice");
            }
            Applied::Succeeded => {
                tracing::info!(
                    timetable_id,
                    levels_completed = self.run.completed_levels().len(),
                    "Timetable generation succeeded",
                );
            }
            Applied::Failed => {
                tracing::error!(
                    timetable_id,
                    error = self.run.error().unwrap_or_default(),
                    "Timetable generation failed",
                );
            }
            Applied::Ignored => {}
        }

        self.publish();
        self.run.is_terminal()
    }

    /// Keep a finished connection open for `close_delay` so the outcome can
    /// be observed. Frames arriving meanwhile are not applied.
    async fn linger(&mut self, ws_stream: &mut WsStream) {
        let timetable_id = self.timetable_id;
        let deadline = tokio::time::sleep(self.close_delay);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return,
                _ = &mut deadline => return,
                frame = ws_stream.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!(
                            timetable_id,
                            raw_message = %text,
                            "Ignoring message after terminal event",
                        );
                    }
                    Some(Ok(Message::Close(_)) | Err(_)) | None => return,
                    Some(Ok(_)) => {}
                },
            }
        }
    }

    fn disconnected(&mut self) {
        self.run.connection_lost();
        self.publish();
    }

    fn publish(&self) {
        // `send_replace` succeeds even when every receiver has been dropped.
        self.progress_tx.send_replace(self.run.snapshot());
    }
}
