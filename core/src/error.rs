use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    Unavailable { reason: String },
    Setup { message: String },
    Payload { message: String },
    Protocol { packet: String, message: String },
    Config { key: String, value: String },
}

impl FeedError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        FeedError::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn setup(message: impl Into<String>) -> Self {
        FeedError::Setup {
            message: message.into(),
        }
    }

    pub(crate) fn protocol(packet: &str, message: impl Into<String>) -> Self {
        FeedError::Protocol {
            packet: packet.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedError::Unavailable { reason } => write!(f, "push channel unavailable: {reason}"),
            FeedError::Setup { message } => write!(f, "push channel setup failed: {message}"),
            FeedError::Payload { message } => write!(f, "malformed image payload: {message}"),
            FeedError::Protocol { packet, message } => {
                write!(f, "bad socket.io packet {packet:?}: {message}")
            }
            FeedError::Config { key, value } => {
                write!(f, "invalid value {value:?} for feed setting '{key}'")
            }
        }
    }
}

impl std::error::Error for FeedError {}
