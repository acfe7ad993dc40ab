pub mod codec;
pub mod config;
pub mod error;
pub mod item;
pub mod overlay;
pub mod protocol;
pub mod socketio;

pub use codec::decode_published;
pub use config::{FeedConfig, FeedTransport};
pub use error::FeedError;
pub use item::{caption, static_url, GalleryItem, DEFAULT_STATIC_PREFIX, GALLERY_ITEM_CLASS};
pub use overlay::{ClickTarget, OverlayState};
pub use protocol::{ImagePublished, NEW_IMAGE_EVENT};
pub use socketio::{Session, SessionAction, SessionState};
