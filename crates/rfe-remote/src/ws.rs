//! WebSocket transport for the watch channel.

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use rfe_client::{WatchSocket, WatchTransport};
use rfe_core::{RemoteError, RemoteResult};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, trace};
use url::Url;

use crate::http::parse_base;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Path of the watcher endpoint below the server base URL.
pub const WATCH_ENDPOINT: &str = "api/ws/watcher";

/// Derive the watcher URL from an HTTP base URL.
///
/// `http` becomes `ws` and `https` becomes `wss`.
pub fn watch_url(base_url: &str) -> RemoteResult<Url> {
    let mut url = parse_base(base_url)?;
    let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
    url.set_scheme(scheme)
        .map_err(|()| RemoteError::transport(format!("Cannot derive watch URL from {base_url}")))?;
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty();
        segments.extend(WATCH_ENDPOINT.split('/'));
    }
    Ok(url)
}

/// Opens watch sockets against one server.
#[derive(Debug, Clone)]
pub struct WsWatchTransport {
    url: Url,
}

impl WsWatchTransport {
    pub fn new(base_url: &str) -> RemoteResult<Self> {
        Ok(Self {
            url: watch_url(base_url)?,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl WatchTransport for WsWatchTransport {
    async fn connect(&self) -> RemoteResult<Box<dyn WatchSocket>> {
        let (socket, _response) = connect_async(self.url.as_str())
            .await
            .map_err(|e| RemoteError::transport(e.to_string()))?;
        debug!(url = %self.url, "Watch socket connected");
        let (sink, stream) = socket.split();
        Ok(Box::new(WsSocket { sink, stream }))
    }
}

struct WsSocket {
    sink: SplitSink<Socket, Message>,
    stream: SplitStream<Socket>,
}

#[async_trait]
impl WatchSocket for WsSocket {
    async fn send(&mut self, text: String) -> RemoteResult<()> {
        self.sink
            .send(Message::Text(text))
            .await
            .map_err(|e| RemoteError::transport(e.to_string()))
    }

    async fn recv(&mut self) -> Option<RemoteResult<String>> {
        while let Some(message) = self.stream.next().await {
            match message {
                Ok(Message::Text(text)) => return Some(Ok(text)),
                Ok(Message::Close(frame)) => {
                    debug!(?frame, "Watch socket closed by server");
                    return None;
                }
                Ok(other) => trace!(?other, "Ignoring watch frame"),
                Err(e) => return Some(Err(RemoteError::transport(e.to_string()))),
            }
        }
        None
    }

    async fn close(&mut self) {
        let _ = self.sink.close().await;
    }
}
