use crate::protocol::ImagePublished;

pub const DEFAULT_STATIC_PREFIX: &str = "/static/";
pub const GALLERY_ITEM_CLASS: &str = "gallery-item";

/// One rendered gallery entry: an image plus its attribution line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryItem {
    pub src: String,
    pub alt: String,
    pub caption: String,
}

impl GalleryItem {
    pub fn from_published(event: &ImagePublished, static_prefix: &str) -> Self {
        Self {
            src: static_url(static_prefix, &event.path),
            alt: event.prompt.clone(),
            caption: caption(&event.prompt, &event.author),
        }
    }
}

/// Plain concatenation: the prefix carries its own trailing slash and the
/// path is used as delivered.
pub fn static_url(prefix: &str, path: &str) -> String {
    format!("{prefix}{path}")
}

pub fn caption(prompt: &str, author: &str) -> String {
    format!("\"{prompt}\" by {author}")
}
