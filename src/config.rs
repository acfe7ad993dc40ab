use web_sys::Document;

use promptgallery_core::config::{CONFIG_KEYS, KEY_WS_URL};
use promptgallery_core::socketio::socket_io_url;
use promptgallery_core::FeedConfig;

use crate::dom;

pub(crate) const STORAGE_PREFIX: &str = "promptgallery.feed.";
pub(crate) const DATA_PREFIX: &str = "data-feed-";

/// Layers, lowest first: defaults, build-time env, attributes on the feed
/// gallery, then `localStorage` overrides.
pub(crate) fn load_feed_config(document: &Document) -> FeedConfig {
    let mut config = FeedConfig::default();
    if let Some(raw) =
        option_env!("PROMPTGALLERY_WS_URL").or(option_env!("TRUNK_PUBLIC_PROMPTGALLERY_WS_URL"))
    {
        apply(&mut config, KEY_WS_URL, raw, "build env");
    }
    if let Some(gallery) = document.get_element_by_id(dom::FEED_GALLERY_ID) {
        for key in CONFIG_KEYS {
            if let Some(raw) = gallery.get_attribute(&format!("{DATA_PREFIX}{key}")) {
                apply(&mut config, key, &raw, "gallery attribute");
            }
        }
    }
    for key in CONFIG_KEYS {
        if let Some(raw) = read_storage(&format!("{STORAGE_PREFIX}{key}")) {
            apply(&mut config, key, &raw, "local storage");
        }
    }
    config
}

fn apply(config: &mut FeedConfig, key: &str, raw: &str, source: &str) {
    if let Err(err) = config.apply(key, raw) {
        gloo::console::warn!("ignoring feed setting from", source.to_string(), err.to_string());
    }
}

fn read_storage(key: &str) -> Option<String> {
    let window = web_sys::window()?;
    let storage = window.local_storage().ok()??;
    storage.get_item(key).ok()?
}

/// Socket.IO endpoint on the page's own origin.
pub(crate) fn page_ws_url() -> Option<String> {
    let location = web_sys::window()?.location();
    let host = location.host().ok()?;
    let protocol = location.protocol().ok()?;
    socket_io_url(&protocol, &host)
}
