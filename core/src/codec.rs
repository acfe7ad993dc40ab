use crate::error::FeedError;
use crate::protocol::ImagePublished;

pub fn decode_published(raw: &str) -> Result<ImagePublished, FeedError> {
    serde_json::from_str(raw).map_err(|err| FeedError::Payload {
        message: err.to_string(),
    })
}
