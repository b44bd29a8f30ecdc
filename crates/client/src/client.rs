//! WebSocket connection to the timetable generation endpoint.
//!
//! [`generation_url`] derives the endpoint for one timetable from the
//! backend origin, and [`connect`] opens a live [`GenerationConnection`].

use reqwest::Url;
use timetabler_core::types::DbId;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// The raw WebSocket stream type used for generation connections.
pub type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// A live WebSocket connection scoped to one timetable.
pub struct GenerationConnection {
    pub timetable_id: DbId,
    pub ws_stream: WsStream,
}

/// Build the generation endpoint for `timetable_id`.
///
/// The secure transport (`wss`) is used when the origin is `https`. A path
/// prefix on `base_url` (a reverse-proxy mount) is kept, matching the REST
/// client's `{base_url}/api/...` endpoints.
pub fn generation_url(base_url: &str, timetable_id: DbId) -> Result<Url, ProgressClientError> {
    let mut url = Url::parse(base_url)
        .map_err(|e| ProgressClientError::InvalidOrigin(format!("{base_url}: {e}")))?;

    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(ProgressClientError::InvalidOrigin(format!(
                "unsupported scheme '{other}' in {base_url}"
            )))
        }
    };
    url.set_scheme(scheme).map_err(|()| {
        ProgressClientError::InvalidOrigin(format!("cannot use {scheme} for {base_url}"))
    })?;
    // REST and WebSocket endpoints share the base path prefix.
    let prefix = url.path().trim_end_matches('/').to_string();
    url.set_path(&format!("{prefix}/api/timetables/generate/{timetable_id}"));
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}

/// Open the generation connection.
///
/// When a session token is given it is sent as a bearer `Authorization`
/// header on the upgrade request.
pub async fn connect(
    url: &Url,
    timetable_id: DbId,
    token: Option<&str>,
) -> Result<GenerationConnection, ProgressClientError> {
    let mut request = url
        .as_str()
        .into_client_request()
        .map_err(|e| ProgressClientError::Connection(format!("Invalid request for {url}: {e}")))?;

    if let Some(token) = token {
        let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
            ProgressClientError::Connection(format!("Token is not a valid header value: {e}"))
        })?;
        request.headers_mut().insert(AUTHORIZATION, value);
    }

    let (ws_stream, _response) = connect_async(request).await.map_err(|e| {
        ProgressClientError::Connection(format!("Failed to connect to {url}: {e}"))
    })?;

    tracing::info!(timetable_id, url = %url, "Connected to generation endpoint");

    Ok(GenerationConnection {
        timetable_id,
        ws_stream,
    })
}

/// Errors that can occur while opening a generation connection.
#[derive(Debug, thiserror::Error)]
pub enum ProgressClientError {
    /// The backend origin cannot be turned into a WebSocket URL.
    #[error("Invalid backend origin: {0}")]
    InvalidOrigin(String),

    /// Failed to establish the WebSocket connection.
    #[error("Connection error: {0}")]
    Connection(String),
}
