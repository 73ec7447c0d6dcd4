use reqwest::Method;
use serde::Deserialize;

use crate::plex::item::PlexItem;
use crate::plex::server::PlexServer;
use crate::plex::{MetadataResponse, PlexResult};

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
struct PlaylistEntry {
    rating_key: String,
    title: String,
}

#[derive(Debug, Deserialize)]
struct PlaylistsResponse {
    #[serde(rename = "MediaContainer")]
    media_container: PlaylistsContainer,
}

#[derive(Debug, Deserialize, Default)]
struct PlaylistsContainer {
    #[serde(rename = "Metadata", default)]
    metadata: Vec<PlaylistEntry>,
}

/// An audio playlist on one server, with its items as fetched at lookup
/// time.
#[derive(Debug, Clone)]
pub struct PlexPlaylist {
    pub rating_key: String,
    pub title: String,
    pub items: Vec<PlexItem>,
}

impl PlexPlaylist {
    pub async fn all(server: &PlexServer) -> PlexResult<Vec<PlexPlaylist>> {
        let response: PlaylistsResponse = server
            .get_json("/playlists", &[("playlistType", "audio".to_string())])
            .await?;
        let mut playlists = vec![];
        for entry in response.media_container.metadata {
            playlists.push(PlexPlaylist {
                rating_key: entry.rating_key,
                title: entry.title,
                items: vec![],
            });
        }
        Ok(playlists)
    }

    /// Fetches a playlist and its items by exact title. `None` means the
    /// destination playlist does not exist yet and a new one will be
    /// created at the end of the run.
    pub async fn by_title(server: &PlexServer, title: &str) -> PlexResult<Option<PlexPlaylist>> {
        let playlists = Self::all(server).await?;
        let found = playlists.into_iter().find(|playlist| playlist.title == title);
        match found {
            Some(mut playlist) => {
                playlist.items = playlist.fetch_items(server).await?;
                Ok(Some(playlist))
            }
            None => Ok(None),
        }
    }

    pub async fn fetch_items(&self, server: &PlexServer) -> PlexResult<Vec<PlexItem>> {
        let response: MetadataResponse = server
            .get_json(&format!("/playlists/{}/items", self.rating_key), &[])
            .await?;
        Ok(response.media_container.metadata)
    }

    pub async fn create(server: &PlexServer, title: &str, items: &[PlexItem]) -> PlexResult<()> {
        server
            .send_write(
                Method::POST,
                "/playlists",
                &[
                    ("type", "audio".to_string()),
                    ("smart", "0".to_string()),
                    ("title", title.to_string()),
                    ("uri", server.metadata_uri(items)),
                ],
            )
            .await
    }

    pub async fn add_items(&self, server: &PlexServer, items: &[PlexItem]) -> PlexResult<()> {
        server
            .send_write(
                Method::PUT,
                &format!("/playlists/{}/items", self.rating_key),
                &[("uri", server.metadata_uri(items))],
            )
            .await
    }
}
