use serde::{Deserialize, Serialize};

/// Event name the server emits when an image is made public.
pub const NEW_IMAGE_EVENT: &str = "new_image";

/// Payload of a `new_image` event.
///
/// `path` is relative to the static asset root, `prompt` doubles as caption
/// and alt text, `author` is the publishing user's display name. Extra fields
/// are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePublished {
    pub path: String,
    pub prompt: String,
    pub author: String,
}
