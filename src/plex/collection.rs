use reqwest::Method;
use serde::Deserialize;

use crate::plex::item::{PlexItem, SearchKind};
use crate::plex::section::PlexSection;
use crate::plex::server::PlexServer;
use crate::plex::{MetadataResponse, PlexResult};

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
struct CollectionEntry {
    rating_key: String,
    title: String,
}

#[derive(Debug, Deserialize)]
struct CollectionsResponse {
    #[serde(rename = "MediaContainer")]
    media_container: CollectionsContainer,
}

#[derive(Debug, Deserialize, Default)]
struct CollectionsContainer {
    #[serde(rename = "Metadata", default)]
    metadata: Vec<CollectionEntry>,
}

/// A collection within one library section, with its children as fetched at
/// lookup time.
#[derive(Debug, Clone)]
pub struct PlexCollection {
    pub rating_key: String,
    pub title: String,
    pub items: Vec<PlexItem>,
}

impl PlexCollection {
    pub async fn all(server: &PlexServer, section: &PlexSection) -> PlexResult<Vec<PlexCollection>> {
        let response: CollectionsResponse = server
            .get_json(&format!("/library/sections/{}/collections", section.key), &[])
            .await?;
        let mut collections = vec![];
        for entry in response.media_container.metadata {
            collections.push(PlexCollection {
                rating_key: entry.rating_key,
                title: entry.title,
                items: vec![],
            });
        }
        Ok(collections)
    }

    /// Fetches a collection and its children by exact title. `None` fixes
    /// the run in create mode.
    pub async fn by_title(
        server: &PlexServer,
        section: &PlexSection,
        title: &str,
    ) -> PlexResult<Option<PlexCollection>> {
        let collections = Self::all(server, section).await?;
        let found = collections
            .into_iter()
            .find(|collection| collection.title == title);
        match found {
            Some(mut collection) => {
                collection.items = collection.fetch_items(server).await?;
                Ok(Some(collection))
            }
            None => Ok(None),
        }
    }

    pub async fn fetch_items(&self, server: &PlexServer) -> PlexResult<Vec<PlexItem>> {
        let response: MetadataResponse = server
            .get_json(&format!("/library/collections/{}/children", self.rating_key), &[])
            .await?;
        Ok(response.media_container.metadata)
    }

    pub async fn create(
        server: &PlexServer,
        section: &PlexSection,
        title: &str,
        items: &[PlexItem],
    ) -> PlexResult<()> {
        server
            .send_write(
                Method::POST,
                "/library/collections",
                &[
                    ("type", SearchKind::Album.plex_type().to_string()),
                    ("smart", "0".to_string()),
                    ("title", title.to_string()),
                    ("sectionId", section.key.clone()),
                    ("uri", server.metadata_uri(items)),
                ],
            )
            .await
    }

    pub async fn add_items(&self, server: &PlexServer, items: &[PlexItem]) -> PlexResult<()> {
        server
            .send_write(
                Method::PUT,
                &format!("/library/collections/{}/items", self.rating_key),
                &[("uri", server.metadata_uri(items))],
            )
            .await
    }
}
