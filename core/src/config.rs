use std::str::FromStr;

use crate::error::FeedError;
use crate::item::DEFAULT_STATIC_PREFIX;
use crate::protocol::NEW_IMAGE_EVENT;
use crate::socketio::normalize_ws_url;

pub const KEY_TRANSPORT: &str = "transport";
pub const KEY_EVENT: &str = "event";
pub const KEY_STATIC_PREFIX: &str = "static-prefix";
pub const KEY_WS_URL: &str = "ws-url";
pub const KEY_DEBUG: &str = "debug";

pub const CONFIG_KEYS: [&str; 5] = [
    KEY_TRANSPORT,
    KEY_EVENT,
    KEY_STATIC_PREFIX,
    KEY_WS_URL,
    KEY_DEBUG,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedTransport {
    /// Page-provided client if present, else native WebSocket when a URL is known.
    #[default]
    Auto,
    PageClient,
    WebSocket,
    Off,
}

impl FromStr for FeedTransport {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(FeedTransport::Auto),
            "page" | "page-client" | "io" => Ok(FeedTransport::PageClient),
            "websocket" | "ws" => Ok(FeedTransport::WebSocket),
            "off" | "none" | "disabled" => Ok(FeedTransport::Off),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    pub transport: FeedTransport,
    pub event_name: String,
    pub static_prefix: String,
    pub ws_url: Option<String>,
    pub debug: bool,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            transport: FeedTransport::Auto,
            event_name: NEW_IMAGE_EVENT.to_string(),
            static_prefix: DEFAULT_STATIC_PREFIX.to_string(),
            ws_url: None,
            debug: false,
        }
    }
}

impl FeedConfig {
    /// Applies one raw setting. Blank values leave the current setting alone.
    pub fn apply(&mut self, key: &str, raw: &str) -> Result<(), FeedError> {
        let value = raw.trim();
        if value.is_empty() {
            return Ok(());
        }
        let invalid = || FeedError::Config {
            key: key.to_string(),
            value: value.to_string(),
        };
        match key {
            KEY_TRANSPORT => {
                self.transport = value.parse().map_err(|_| invalid())?;
            }
            KEY_EVENT => {
                self.event_name = value.to_string();
            }
            KEY_STATIC_PREFIX => {
                self.static_prefix = normalize_prefix(value);
            }
            KEY_WS_URL => {
                self.ws_url = Some(normalize_ws_url(value).ok_or_else(invalid)?);
            }
            KEY_DEBUG => {
                self.debug = parse_flag(value).ok_or_else(invalid)?;
            }
            _ => return Err(invalid()),
        }
        Ok(())
    }

    pub fn enabled(&self) -> bool {
        self.transport != FeedTransport::Off
    }
}

fn normalize_prefix(value: &str) -> String {
    if value.ends_with('/') {
        value.to_string()
    } else {
        format!("{value}/")
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
