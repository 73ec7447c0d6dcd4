use async_trait::async_trait;
use serde::Deserialize;

use crate::matching::matcher::Catalog;
use crate::plex::item::{PlexItem, SearchKind};
use crate::plex::server::PlexServer;
use crate::plex::PlexResult;

#[derive(Debug, Deserialize)]
struct SectionsResponse {
    #[serde(rename = "MediaContainer")]
    media_container: SectionsContainer,
}

#[derive(Debug, Deserialize, Default)]
struct SectionsContainer {
    #[serde(rename = "Directory", default)]
    directory: Vec<PlexSection>,
}

/// A library section (music, movies, ...) on one server.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PlexSection {
    pub key: String,
    pub title: String,
    #[serde(rename = "type", default)]
    pub section_type: String,
}

impl PlexSection {
    pub async fn all(server: &PlexServer) -> PlexResult<Vec<PlexSection>> {
        let response: SectionsResponse = server.get_json("/library/sections", &[]).await?;
        Ok(response.media_container.directory)
    }
}

/// Search scoped to one destination section, the catalog the collection
/// copy flow matches against.
pub struct SectionCatalog<'a> {
    pub server: &'a PlexServer,
    pub section: &'a PlexSection,
}

#[async_trait]
impl Catalog for SectionCatalog<'_> {
    async fn search(
        &self,
        query: &str,
        kind: SearchKind,
        limit: u32,
    ) -> PlexResult<Vec<PlexItem>> {
        self.server
            .hub_search(query, kind, limit, Some(&self.section.key))
            .await
    }
}
