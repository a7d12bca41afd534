//! The CloudEvents envelope as delivered by the sidecar.
//!
//! Only the attributes needed to unwrap the payload are kept. Every other
//! attribute (`source`, `type`, `specversion`, extensions) is ignored.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::EnvelopeError;

/// A parsed CloudEvents JSON envelope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CloudEvent {
    #[serde(default)]
    id: Option<String>,

    #[serde(default, rename = "datacontenttype")]
    data_content_type: Option<String>,

    // `"data": null` counts as present.
    #[serde(default, deserialize_with = "present")]
    data: Option<Value>,

    #[serde(default)]
    data_base64: Option<String>,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl CloudEvent {
    /// Parse an envelope from its JSON text.
    pub fn from_json(text: &str) -> Result<Self, EnvelopeError> {
        let event: CloudEvent = serde_json::from_str(text)?;
        if event.data.is_some() && event.data_base64.is_some() {
            return Err(EnvelopeError::ConflictingData);
        }
        Ok(event)
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The `datacontenttype` attribute, verbatim.
    pub fn data_content_type(&self) -> Option<&str> {
        self.data_content_type.as_deref()
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    pub fn data_base64(&self) -> Option<&str> {
        self.data_base64.as_deref()
    }
}
