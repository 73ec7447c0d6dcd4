use serde::{Deserialize, Serialize};

/// A media entity as returned by any Plex metadata listing. Doubles as the
/// source item being copied and as a search candidate on the destination;
/// `rating_key` is the opaque identity used to add it to a playlist or
/// collection.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlexItem {
    pub rating_key: String,
    pub title: String,
    #[serde(default)]
    pub parent_title: String,
    #[serde(default)]
    pub grandparent_title: Option<String>,
}

impl PlexItem {
    pub fn new(
        rating_key: impl Into<String>,
        title: impl Into<String>,
        parent_title: impl Into<String>,
        grandparent_title: Option<String>,
    ) -> Self {
        Self {
            rating_key: rating_key.into(),
            title: title.into(),
            parent_title: parent_title.into(),
            grandparent_title,
        }
    }
}

/// The entity kind a copy run matches against: tracks for playlists, albums
/// for collections. Carries the numeric type code Plex uses in query strings
/// and the hub type name used by `/hubs/search`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SearchKind {
    Track,
    Album,
}

impl SearchKind {
    pub fn plex_type(&self) -> u32 {
        match self {
            SearchKind::Track => 10,
            SearchKind::Album => 9,
        }
    }

    pub fn hub_type(&self) -> &'static str {
        match self {
            SearchKind::Track => "track",
            SearchKind::Album => "album",
        }
    }
}
