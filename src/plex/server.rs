use async_trait::async_trait;
use error_stack::{IntoReport, Report, ResultExt};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::matching::matcher::Catalog;
use crate::plex::item::{PlexItem, SearchKind};
use crate::plex::{HubSearchResponse, PlexError, PlexResult, PLEX_PRODUCT, PLEX_VERSION};

/// A connected Plex media server. Holds the per-server access token and the
/// machine identifier needed to mint `server://` item URIs.
pub struct PlexServer {
    pub name: String,
    pub machine_identifier: String,
    base_url: String,
    token: String,
    client_identifier: String,
    client: Client,
}

impl PlexServer {
    pub fn new(
        name: String,
        base_url: String,
        token: String,
        machine_identifier: String,
        client_identifier: String,
    ) -> Self {
        Self {
            name,
            machine_identifier,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client_identifier,
            client: Client::new(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header("X-Plex-Token", &self.token)
            .header("X-Plex-Client-Identifier", &self.client_identifier)
            .header("X-Plex-Product", PLEX_PRODUCT)
            .header("X-Plex-Version", PLEX_VERSION)
            .header("Accept", "application/json")
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> PlexResult<T> {
        let response = self
            .request(Method::GET, path)
            .query(query)
            .send()
            .await
            .into_report()
            .change_context(PlexError::Api)?;
        let status = response.status();
        if status == StatusCode::BAD_REQUEST {
            return Err(Report::new(PlexError::MalformedQuery)
                .attach_printable(format!("Request to {} was rejected", path)));
        }
        if !status.is_success() {
            return Err(Report::new(PlexError::Api)
                .attach_printable(format!("GET {} returned {}", path, status)));
        }
        response
            .json::<T>()
            .await
            .into_report()
            .change_context(PlexError::Api)
    }

    pub(crate) async fn send_write(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
    ) -> PlexResult<()> {
        let response = self
            .request(method.clone(), path)
            .query(query)
            .send()
            .await
            .into_report()
            .change_context(PlexError::Api)?;
        if !response.status().is_success() {
            return Err(Report::new(PlexError::Api).attach_printable(format!(
                "{} {} returned {}",
                method,
                path,
                response.status()
            )));
        }
        Ok(())
    }

    /// The `server://` URI form Plex expects when creating playlists and
    /// collections or appending items to them.
    pub(crate) fn metadata_uri(&self, items: &[PlexItem]) -> String {
        let keys = items
            .iter()
            .map(|item| item.rating_key.as_str())
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "server://{}/com.plexapp.plugins.library/library/metadata/{}",
            self.machine_identifier, keys
        )
    }

    /// Server-wide hub search, optionally scoped to one library section.
    /// Hubs of other entity kinds are dropped.
    pub(crate) async fn hub_search(
        &self,
        query: &str,
        kind: SearchKind,
        limit: u32,
        section_key: Option<&str>,
    ) -> PlexResult<Vec<PlexItem>> {
        let mut params = vec![
            ("query", query.to_string()),
            ("limit", limit.to_string()),
        ];
        if let Some(key) = section_key {
            params.push(("sectionId", key.to_string()));
        }
        let response: HubSearchResponse = self.get_json("/hubs/search", &params).await?;
        let items = response
            .media_container
            .hubs
            .into_iter()
            .filter(|hub| hub.hub_type == kind.hub_type())
            .flat_map(|hub| hub.metadata)
            .collect();
        Ok(items)
    }
}

#[async_trait]
impl Catalog for PlexServer {
    async fn search(
        &self,
        query: &str,
        kind: SearchKind,
        limit: u32,
    ) -> PlexResult<Vec<PlexItem>> {
        self.hub_search(query, kind, limit, None).await
    }
}
