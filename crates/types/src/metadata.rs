use serde::{Deserialize, Serialize};

/// Structured metadata attached to a LAND parcel or an Estate.
///
/// Absent text fields are `None`, never the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub version: u32,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl MetadataRecord {
    pub fn new(name: Option<String>, description: Option<String>) -> Self {
        Self {
            version: 0,
            name,
            description,
        }
    }
}
