//! Minimal Engine.IO v4 / Socket.IO v5 client framing over a text WebSocket.
//!
//! Only what a receive-mostly subscriber needs: handshake, namespace connect,
//! heartbeat replies, event delivery and acks. Binary attachments are rejected.

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::error::FeedError;

pub const ENGINE_IO_VERSION: u32 = 4;
pub const DEFAULT_SOCKET_PATH: &str = "/socket.io/";
pub const DEFAULT_NAMESPACE: &str = "/";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    #[serde(default)]
    pub ping_interval: u64,
    #[serde(default)]
    pub ping_timeout: u64,
    #[serde(default)]
    pub max_payload: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open(Handshake),
    Close,
    Ping(String),
    Pong(String),
    Message(String),
    Upgrade,
    Noop,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect {
        namespace: String,
    },
    Disconnect {
        namespace: String,
    },
    Event {
        namespace: String,
        ack_id: Option<u64>,
        name: String,
        args: Vec<Value>,
    },
    Ack {
        namespace: String,
        ack_id: u64,
    },
    ConnectError {
        namespace: String,
        message: String,
    },
}

impl SocketPacket {
    pub fn namespace(&self) -> &str {
        match self {
            SocketPacket::Connect { namespace }
            | SocketPacket::Disconnect { namespace }
            | SocketPacket::Event { namespace, .. }
            | SocketPacket::Ack { namespace, .. }
            | SocketPacket::ConnectError { namespace, .. } => namespace,
        }
    }
}

pub fn parse_engine_packet(frame: &str) -> Result<EnginePacket, FeedError> {
    let Some(kind) = frame.chars().next() else {
        return Err(FeedError::protocol(frame, "empty frame"));
    };
    let body = &frame[kind.len_utf8()..];
    match kind {
        '0' => serde_json::from_str(body)
            .map(EnginePacket::Open)
            .map_err(|err| FeedError::protocol(frame, format!("bad handshake: {err}"))),
        '1' => Ok(EnginePacket::Close),
        '2' => Ok(EnginePacket::Ping(body.to_string())),
        '3' => Ok(EnginePacket::Pong(body.to_string())),
        '4' => Ok(EnginePacket::Message(body.to_string())),
        '5' => Ok(EnginePacket::Upgrade),
        '6' => Ok(EnginePacket::Noop),
        'b' => Err(FeedError::protocol(frame, "binary frames are not supported")),
        other => Err(FeedError::protocol(
            frame,
            format!("unknown engine packet type '{other}'"),
        )),
    }
}

pub fn parse_socket_packet(body: &str) -> Result<SocketPacket, FeedError> {
    let Some(kind) = body.chars().next() else {
        return Err(FeedError::protocol(body, "empty message"));
    };
    if matches!(kind, '5' | '6') {
        return Err(FeedError::protocol(body, "binary attachments are not supported"));
    }
    let mut rest = &body[kind.len_utf8()..];

    let namespace = if rest.starts_with('/') {
        match rest.find(',') {
            Some(idx) => {
                let namespace = &rest[..idx];
                rest = &rest[idx + 1..];
                namespace.to_string()
            }
            None => {
                let namespace = rest;
                rest = "";
                namespace.to_string()
            }
        }
    } else {
        DEFAULT_NAMESPACE.to_string()
    };

    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    let ack_id = if digits > 0 {
        rest[..digits].parse::<u64>().ok()
    } else {
        None
    };
    rest = &rest[digits..];

    match kind {
        '0' => Ok(SocketPacket::Connect { namespace }),
        '1' => Ok(SocketPacket::Disconnect { namespace }),
        '2' => {
            let data: Vec<Value> = serde_json::from_str(rest)
                .map_err(|err| FeedError::protocol(body, format!("event data: {err}")))?;
            let mut args = data.into_iter();
            let Some(Value::String(name)) = args.next() else {
                return Err(FeedError::protocol(body, "event without a name"));
            };
            Ok(SocketPacket::Event {
                namespace,
                ack_id,
                name,
                args: args.collect(),
            })
        }
        '3' => {
            let Some(ack_id) = ack_id else {
                return Err(FeedError::protocol(body, "ack without an id"));
            };
            Ok(SocketPacket::Ack { namespace, ack_id })
        }
        '4' => {
            let message = match serde_json::from_str::<Value>(rest) {
                Ok(Value::Object(map)) => map
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| rest.to_string()),
                Ok(Value::String(message)) => message,
                _ => rest.to_string(),
            };
            Ok(SocketPacket::ConnectError { namespace, message })
        }
        other => Err(FeedError::protocol(
            body,
            format!("unknown socket packet type '{other}'"),
        )),
    }
}

pub fn encode_connect(namespace: &str) -> String {
    if namespace == DEFAULT_NAMESPACE {
        "40".to_string()
    } else {
        format!("40{namespace},")
    }
}

pub fn encode_ack(namespace: &str, ack_id: u64) -> String {
    if namespace == DEFAULT_NAMESPACE {
        format!("43{ack_id}[]")
    } else {
        format!("43{namespace},{ack_id}[]")
    }
}

/// WebSocket endpoint for the page's own origin.
pub fn socket_io_url(page_protocol: &str, host: &str) -> Option<String> {
    let host = host.trim();
    if host.is_empty() {
        return None;
    }
    let scheme = if page_protocol.eq_ignore_ascii_case("https:") {
        "wss"
    } else {
        "ws"
    };
    normalize_ws_url(&format!("{scheme}://{host}"))
}

/// Accepts http(s) or ws(s) URLs; fills in the socket path and Engine.IO
/// query when missing.
pub fn normalize_ws_url(raw: &str) -> Option<String> {
    let mut url = Url::parse(raw.trim()).ok()?;
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        _ => return None,
    };
    url.set_scheme(scheme).ok()?;
    if url.host_str().map_or(true, str::is_empty) {
        return None;
    }
    if url.path().is_empty() || url.path() == "/" {
        url.set_path(DEFAULT_SOCKET_PATH);
    }
    let has_key = |key: &str| url.query_pairs().any(|(name, _)| name == key);
    let missing_eio = !has_key("EIO");
    let missing_transport = !has_key("transport");
    if missing_eio || missing_transport {
        let mut pairs = url.query_pairs_mut();
        if missing_eio {
            pairs.append_pair("EIO", &ENGINE_IO_VERSION.to_string());
        }
        if missing_transport {
            pairs.append_pair("transport", "websocket");
        }
    }
    url.set_fragment(None);
    Some(url.into())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Opening,
    Connecting,
    Connected,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    Send(String),
    /// `payload` is the first event argument as JSON text.
    Deliver { event: String, payload: String },
    Close { reason: String },
}

/// Client side of one Socket.IO namespace session.
#[derive(Debug, Clone)]
pub struct Session {
    namespace: String,
    state: SessionState,
    handshake: Option<Handshake>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

impl Session {
    pub fn new(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            state: SessionState::Opening,
            handshake: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn handshake(&self) -> Option<&Handshake> {
        self.handshake.as_ref()
    }

    pub fn handle_frame(&mut self, frame: &str) -> Result<Vec<SessionAction>, FeedError> {
        if self.state == SessionState::Closed {
            return Ok(Vec::new());
        }
        match parse_engine_packet(frame)? {
            EnginePacket::Open(handshake) => {
                self.handshake = Some(handshake);
                self.state = SessionState::Connecting;
                Ok(vec![SessionAction::Send(encode_connect(&self.namespace))])
            }
            EnginePacket::Ping(probe) => Ok(vec![SessionAction::Send(format!("3{probe}"))]),
            EnginePacket::Pong(_) | EnginePacket::Upgrade | EnginePacket::Noop => Ok(Vec::new()),
            EnginePacket::Close => {
                self.state = SessionState::Closed;
                Ok(vec![SessionAction::Close {
                    reason: "server closed the session".to_string(),
                }])
            }
            EnginePacket::Message(body) => self.handle_message(&body),
        }
    }

    fn handle_message(&mut self, body: &str) -> Result<Vec<SessionAction>, FeedError> {
        let packet = parse_socket_packet(body)?;
        if packet.namespace() != self.namespace {
            return Ok(Vec::new());
        }
        let actions = match packet {
            SocketPacket::Connect { .. } => {
                self.state = SessionState::Connected;
                Vec::new()
            }
            SocketPacket::ConnectError { message, .. } => {
                self.state = SessionState::Closed;
                vec![SessionAction::Close { reason: message }]
            }
            SocketPacket::Disconnect { .. } => {
                self.state = SessionState::Closed;
                vec![SessionAction::Close {
                    reason: "server disconnected the namespace".to_string(),
                }]
            }
            SocketPacket::Event {
                ack_id, name, args, ..
            } => {
                let payload = args
                    .first()
                    .map(Value::to_string)
                    .unwrap_or_else(|| "null".to_string());
                let mut actions = vec![SessionAction::Deliver {
                    event: name,
                    payload,
                }];
                if let Some(ack_id) = ack_id {
                    actions.push(SessionAction::Send(encode_ack(&self.namespace, ack_id)));
                }
                actions
            }
            SocketPacket::Ack { .. } => Vec::new(),
        };
        Ok(actions)
    }
}
