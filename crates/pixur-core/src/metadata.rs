//! JSON wire formats of the item metadata endpoint.

use crate::crop::CropSpan;
use crate::error::RequestError;
use serde::{Deserialize, Serialize};

/// Body of `GET {item}/meta`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub recipients: Vec<String>,
    pub crop_left: f64,
    pub crop_right: f64,
    pub crop_top: f64,
    pub crop_bottom: f64,
}

impl Metadata {
    pub fn parse(body: &str) -> Result<Self, RequestError> {
        let metadata: Metadata = serde_json::from_str(body)?;
        metadata.validate()?;
        Ok(metadata)
    }

    pub fn horizontal(&self) -> CropSpan {
        CropSpan::new(self.crop_left, self.crop_right)
    }

    pub fn vertical(&self) -> CropSpan {
        CropSpan::new(self.crop_top, self.crop_bottom)
    }

    /// Crop spans must be ordered and inside the image.
    fn validate(&self) -> Result<(), RequestError> {
        for (name, span) in [("horizontal", self.horizontal()), ("vertical", self.vertical())] {
            let ordered = 0.0 <= span.start && span.start <= span.end && span.end <= 1.0;
            if !ordered {
                return Err(RequestError::MalformedBody(format!(
                    "{name} crop out of range: {} .. {}",
                    span.start, span.end
                )));
            }
        }
        Ok(())
    }
}

/// Notification sent along with a metadata update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailNotice {
    pub title: String,
    pub message: String,
}

/// Body of `POST {item}/meta`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataUpdate {
    pub metadata: Metadata,
    /// Serialized as `null` when no e-mail should be sent.
    pub send_email: Option<EmailNotice>,
}

impl MetadataUpdate {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Metadata endpoint of an item.
pub fn meta_url(item_url: &str) -> String {
    format!("{item_url}/meta")
}
