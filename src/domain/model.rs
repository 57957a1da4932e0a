use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Parsed provider response. No schema is assumed beyond the field names
/// the navigator looks up.
pub type ProviderDocument = serde_json::Value;

pub const PATH_FIELD: &str = "pth";

/// Structured file entry from the provider's `files` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileDescriptor(pub serde_json::Map<String, serde_json::Value>);

impl FileDescriptor {
    pub fn path(&self) -> Option<&str> {
        self.0.get(PATH_FIELD).and_then(|v| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileReference {
    Url(String),
    Descriptor(FileDescriptor),
}

impl FileReference {
    pub fn download_url(&self) -> Option<&str> {
        match self {
            FileReference::Url(url) => Some(url),
            FileReference::Descriptor(descriptor) => descriptor.path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationImage {
    pub year: i32,
    pub image_url: String,
}

impl PopulationImage {
    pub fn new(year: i32, image_url: impl Into<String>) -> Self {
        Self {
            year,
            image_url: image_url.into(),
        }
    }
}

/// Stored GeoJSON layer. `json` is kept as the caller sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub id: Option<u64>,
    #[serde(rename = "type")]
    pub layer_type: String,
    pub json: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphicRecord {
    pub id: Option<u64>,
    pub name: String,
    pub year: i32,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

impl GraphicRecord {
    pub fn from_image(name: &str, image: &PopulationImage) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            year: image.year,
            url: image.image_url.clone(),
            created_at: Utc::now(),
        }
    }
}
