//! Confluence space types.

use serde::Deserialize;

/// Confluence space.
#[derive(Debug, Clone, Deserialize)]
pub struct Space {
    /// Space ID (v2 numeric id, as a string).
    pub id: String,
    /// Space key.
    pub key: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

/// Spaces API response.
#[derive(Debug, Clone, Deserialize)]
pub struct SpacesResponse {
    /// Matching spaces.
    pub results: Vec<Space>,
}
