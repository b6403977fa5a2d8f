//! Action results fed back to the model.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const PNG_MEDIA_TYPE: &str = "image/png";

/// One block of action output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResultContent {
    Text {
        text: String,
    },
    Image {
        media_type: String,
        #[serde(serialize_with = "to_base64", deserialize_with = "from_base64")]
        data: Vec<u8>,
    },
}

impl ResultContent {
    pub fn text(text: impl Into<String>) -> Self {
        ResultContent::Text { text: text.into() }
    }

    pub fn png(data: Vec<u8>) -> Self {
        ResultContent::Image {
            media_type: PNG_MEDIA_TYPE.to_string(),
            data,
        }
    }

    /// Base64 form of an image block, as sent on the wire.
    pub fn image_base64(&self) -> Option<String> {
        match self {
            ResultContent::Image { data, .. } => Some(STANDARD.encode(data)),
            ResultContent::Text { .. } => None,
        }
    }
}

fn to_base64<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(data))
}

fn from_base64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let encoded = String::deserialize(deserializer)?;
    STANDARD
        .decode(encoded.as_bytes())
        .map_err(serde::de::Error::custom)
}

/// Outcome of dispatching one `ActionRequest`, correlated by `request_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub request_id: String,
    pub is_error: bool,
    pub content: Vec<ResultContent>,
}

impl ActionResult {
    pub fn success(request_id: impl Into<String>, content: Vec<ResultContent>) -> Self {
        Self {
            request_id: request_id.into(),
            is_error: false,
            content,
        }
    }

    pub fn failure(request_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            is_error: true,
            content: vec![ResultContent::text(reason)],
        }
    }

    /// Concatenated text blocks.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ResultContent::Text { text } => Some(text.as_str()),
                ResultContent::Image { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn images(&self) -> impl Iterator<Item = &[u8]> {
        self.content.iter().filter_map(|block| match block {
            ResultContent::Image { data, .. } => Some(data.as_slice()),
            ResultContent::Text { .. } => None,
        })
    }
}
