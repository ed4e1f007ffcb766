//! Confluence content property types.

use serde::{Deserialize, Serialize};

use super::{Version, VersionWrite};

/// Content property attached to a page.
#[derive(Debug, Clone, Deserialize)]
pub struct Property {
    /// Property ID.
    pub id: String,
    /// Property key.
    pub key: String,
    /// Arbitrary JSON value.
    pub value: serde_json::Value,
    /// Property version.
    pub version: Version,
}

/// Content properties API response.
#[derive(Debug, Clone, Deserialize)]
pub struct PropertiesResponse {
    /// Properties on the page.
    pub results: Vec<Property>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreatePropertyRequest<'a> {
    pub key: &'a str,
    pub value: &'a serde_json::Value,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdatePropertyRequest<'a> {
    pub key: &'a str,
    pub value: &'a serde_json::Value,
    pub version: VersionWrite<'a>,
}
