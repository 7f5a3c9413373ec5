//! Address validation and track search results

use serde::{Deserialize, Serialize};

/// Outcome of geocoding a free-text address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressValidation {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
}

impl AddressValidation {
    #[must_use]
    pub fn invalid() -> Self {
        Self {
            is_valid: false,
            formatted_address: None,
        }
    }
}

/// A playable track for the alarm
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MusicTrack {
    pub name: String,
    pub artist: String,
    /// Preview or stream URL
    pub url: String,
}
