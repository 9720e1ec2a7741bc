//! Backend push messages over a websocket (tungstenite).

use std::net::TcpStream;

use tracing::{debug, info, trace, warn};
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message as Frame, WebSocket};
use url::Url;

use crate::infrastructure::api::{ApiError, ApiResult, ApiVersion, Message};
use crate::infrastructure::traits::MessageSource;

pub struct WebSocketMessages {
    url: String,
    socket: WebSocket<MaybeTlsStream<TcpStream>>,
}

impl WebSocketMessages {
    /// Connect to `<base>/api/<version>/messages`.
    pub fn connect(base: &Url, version: ApiVersion) -> ApiResult<Self> {
        let url = messages_url(base, version)?;
        let (socket, response) = tungstenite::connect(url.as_str()).map_err(|e| ApiError::Network {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        info!("connected to {} ({})", url, response.status());
        Ok(Self {
            url: url.to_string(),
            socket,
        })
    }
}

impl MessageSource for WebSocketMessages {
    fn next_message(&mut self) -> ApiResult<Option<Message>> {
        loop {
            let frame = match self.socket.read() {
                Ok(frame) => frame,
                Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                    return Ok(None)
                }
                Err(e) => {
                    return Err(ApiError::Network {
                        url: self.url.clone(),
                        message: e.to_string(),
                    })
                }
            };
            match frame {
                Frame::Text(text) => {
                    trace!("message frame: {}", text.as_str());
                    return decode_message(&self.url, text.as_str()).map(Some);
                }
                Frame::Close(reason) => {
                    debug!("message channel closed: {:?}", reason);
                    return Ok(None);
                }
                other => {
                    trace!("skipping frame {:?}", other);
                }
            }
        }
    }
}

fn decode_message(url: &str, text: &str) -> ApiResult<Message> {
    serde_json::from_str(text).map_err(|e| {
        warn!("undecodable message: {}", text);
        ApiError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        }
    })
}

/// Swap the http(s) scheme for ws(s) and point at the messages endpoint.
pub fn messages_url(base: &Url, version: ApiVersion) -> ApiResult<Url> {
    let invalid = |message: &str| ApiError::Network {
        url: base.to_string(),
        message: message.to_string(),
    };
    let mut url = base.clone();
    let scheme = match base.scheme() {
        "https" => "wss",
        "http" => "ws",
        _ => return Err(invalid("unsupported scheme for message channel")),
    };
    url.set_scheme(scheme)
        .map_err(|_| invalid("cannot switch to websocket scheme"))?;
    url.path_segments_mut()
        .map_err(|_| invalid("base url cannot carry a path"))?
        .pop_if_empty()
        .extend(["api", version.as_str(), "messages"]);
    url.set_query(None);
    Ok(url)
}
