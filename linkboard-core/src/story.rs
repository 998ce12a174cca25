use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A submitted link as the remote service returns it. Stories are immutable
/// once created; the only lifecycle transitions are creation and deletion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub story_id: String,
    pub title: String,
    pub author: String,
    pub url: String,
    /// Username of the user who posted the story.
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Story {
    /// Host part of the story URL, for the "(hostname)" suffix in lists.
    pub fn host_name(&self) -> Option<String> {
        url::Url::parse(&self.url)
            .ok()
            .and_then(|parsed| parsed.host_str().map(ToOwned::to_owned))
    }
}

/// A story submission before the server has assigned it an id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoryDraft {
    pub title: String,
    pub author: String,
    pub url: String,
}

/// Profile of the logged-in user, as returned by login/signup. Carries the
/// favorites list the session seeds its [`crate::FavoritesSet`] from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub favorites: Vec<Story>,
}
