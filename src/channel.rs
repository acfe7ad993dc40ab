use std::rc::Rc;

use promptgallery_core::{FeedConfig, FeedError, FeedTransport};

use crate::config;
use crate::page_client::PageClientChannel;
use crate::ws_channel::WebSocketChannel;

/// Receives the first event argument as JSON text.
pub(crate) type MessageHandler = Rc<dyn Fn(String)>;

/// Push transport the live feed subscribes through.
pub(crate) trait PushChannel {
    fn name(&self) -> &'static str;

    fn subscribe(&self, event: &str, handler: MessageHandler) -> Result<(), FeedError>;
}

/// Stand-in used when no transport is available; refuses every subscription.
pub(crate) struct InertChannel {
    reason: String,
}

impl InertChannel {
    pub(crate) fn new(reason: &str) -> Self {
        Self {
            reason: reason.to_string(),
        }
    }
}

impl PushChannel for InertChannel {
    fn name(&self) -> &'static str {
        "inert"
    }

    fn subscribe(&self, _event: &str, _handler: MessageHandler) -> Result<(), FeedError> {
        Err(FeedError::unavailable(self.reason.clone()))
    }
}

/// Picks a transport without opening any connection; the connection starts
/// on the first subscription.
pub(crate) fn probe(config: &FeedConfig) -> Box<dyn PushChannel> {
    match config.transport {
        FeedTransport::Off => Box::new(InertChannel::new("disabled by configuration")),
        FeedTransport::PageClient => match PageClientChannel::probe() {
            Some(channel) => Box::new(channel),
            None => Box::new(InertChannel::new("no socket.io client on this page")),
        },
        FeedTransport::WebSocket => {
            match config.ws_url.clone().or_else(config::page_ws_url) {
                Some(url) => Box::new(WebSocketChannel::new(url)),
                None => Box::new(InertChannel::new("no websocket url for this page")),
            }
        }
        FeedTransport::Auto => {
            if let Some(channel) = PageClientChannel::probe() {
                return Box::new(channel);
            }
            match config.ws_url.clone() {
                Some(url) => Box::new(WebSocketChannel::new(url)),
                None => Box::new(InertChannel::new("no socket.io client on this page")),
            }
        }
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
pub(crate) use manual::ManualChannel;
