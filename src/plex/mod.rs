use std::fmt;

use serde::Deserialize;

use crate::plex::item::PlexItem;

pub mod account;
pub mod collection;
pub mod item;
pub mod playlist;
pub mod section;
pub mod server;

pub const PLEX_TV_BASE: &str = "https://plex.tv";
pub const PLEX_PRODUCT: &str = "Plex Porter";
pub const PLEX_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlexError {
    /// Any non-success response that is not a rejected query.
    Api,
    /// The server rejected the search query itself (HTTP 400).
    MalformedQuery,
}

impl fmt::Display for PlexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlexError::Api => f.write_str("Plex API error"),
            PlexError::MalformedQuery => f.write_str("Plex rejected the search query"),
        }
    }
}

impl std::error::Error for PlexError {}

pub type PlexResult<T> = error_stack::Result<T, PlexError>;

/// `{"MediaContainer": {"Metadata": [...]}}`, the shape of most item listings.
#[derive(Debug, Deserialize)]
pub struct MetadataResponse {
    #[serde(rename = "MediaContainer")]
    pub media_container: MetadataContainer,
}

#[derive(Debug, Deserialize, Default)]
pub struct MetadataContainer {
    #[serde(rename = "Metadata", default)]
    pub metadata: Vec<PlexItem>,
}

#[derive(Debug, Deserialize)]
pub struct HubSearchResponse {
    #[serde(rename = "MediaContainer")]
    pub media_container: HubContainer,
}

#[derive(Debug, Deserialize, Default)]
pub struct HubContainer {
    #[serde(rename = "Hub", default)]
    pub hubs: Vec<Hub>,
}

#[derive(Debug, Deserialize)]
pub struct Hub {
    #[serde(rename = "type")]
    pub hub_type: String,
    #[serde(rename = "Metadata", default)]
    pub metadata: Vec<PlexItem>,
}

#[derive(Debug, Deserialize)]
pub struct IdentityResponse {
    #[serde(rename = "MediaContainer")]
    pub media_container: IdentityContainer,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityContainer {
    pub machine_identifier: String,
}
