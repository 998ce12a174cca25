use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::favorites::FavoritesSet;
use crate::registry::SharedRegistry;
use crate::story::{Story, StoryDraft};

/// Logged-in user, created by login/signup and destroyed by logout. Owns the
/// favorites set for its lifetime.
#[derive(Debug, Clone)]
pub struct User {
    pub username: String,
    pub name: String,
    pub token: String,
    pub favorites: FavoritesSet,
}

/// Session-scoped context tying together the remote client, the story
/// registry and the (optional) logged-in user. One `Session` lives for one
/// page session; clones share the same state.
#[derive(Debug, Clone)]
pub struct Session {
    api: ApiClient,
    registry: SharedRegistry,
    user: Arc<RwLock<Option<User>>>,
}

impl Session {
    pub fn new(api: ApiClient, registry: SharedRegistry) -> Self {
        Self {
            api,
            registry,
            user: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let payload = self.api.login(username, password).await?;
        let user = User {
            username: payload.user.username,
            name: payload.user.name,
            token: payload.token,
            favorites: FavoritesSet::new(payload.user.favorites),
        };
        info!(username = %user.username, favorites = user.favorites.len(), "logged in");
        *self.user.write().await = Some(user);
        Ok(())
    }

    pub async fn signup(&self, username: &str, password: &str, name: &str) -> Result<(), ApiError> {
        let payload = self.api.signup(username, password, name).await?;
        let user = User {
            username: payload.user.username,
            name: payload.user.name,
            token: payload.token,
            favorites: FavoritesSet::new(payload.user.favorites),
        };
        info!(username = %user.username, "account created");
        *self.user.write().await = Some(user);
        Ok(())
    }

    /// Drops the user and with it the favorites set.
    pub async fn logout(&self) {
        if let Some(user) = self.user.write().await.take() {
            info!(username = %user.username, "logged out");
        }
    }

    /// Wholesale refresh of the registry from the remote list. Favorites
    /// whose story no longer exists remotely are pruned here; between
    /// refreshes a stale favorite stays visible.
    pub async fn refresh_stories(&self) -> Result<usize, ApiError> {
        let stories = self.api.fetch_stories().await?;
        let count = stories.len();
        {
            let mut user = self.user.write().await;
            if let Some(user) = user.as_mut() {
                user.favorites.retain_known(&stories);
            }
        }
        self.registry.write().await.replace_all(stories);
        debug!(count, "registry refreshed");
        Ok(count)
    }

    /// Remote create, then front insertion. The registry is untouched when
    /// the remote call fails.
    pub async fn submit_story(&self, draft: &StoryDraft) -> Result<Story, ApiError> {
        let token = self.require_token().await?;
        let story = self.api.submit_story(&token, draft).await?;
        self.registry.write().await.insert_front(story.clone());
        Ok(story)
    }

    /// The remote delete is issued regardless of local state; a local miss
    /// afterwards is a state mismatch worth logging, not retrying. Evicts
    /// the story from the favorites set as well, so a deleted story never
    /// lingers in the favorites list.
    pub async fn delete_story(&self, story_id: &str) -> Result<(), ApiError> {
        let token = self.require_token().await?;
        self.api.delete_story(&token, story_id).await?;
        if let Err(ApiError::NotFound { .. }) = self.registry.write().await.remove(story_id) {
            warn!(%story_id, "deleted story was not in the local registry");
        }
        let mut user = self.user.write().await;
        if let Some(user) = user.as_mut() {
            if user.favorites.evict(story_id).is_some() {
                debug!(%story_id, "deleted story evicted from favorites");
            }
        }
        Ok(())
    }

    /// Make the story a favorite (or not). The favorites set is mutated on
    /// remote success only; the optimistic indicator flip is the
    /// controller's business, not this layer's. Favoriting resolves the
    /// story from the registry; removal works on the id alone, since a
    /// favorite can outlive its registry entry when the story was deleted
    /// by another session.
    pub async fn set_favorite(&self, story_id: &str, favored: bool) -> Result<(), ApiError> {
        let (token, username) = {
            let user = self.user.read().await;
            let user = user
                .as_ref()
                .ok_or_else(|| ApiError::auth("favorites require a logged-in user"))?;
            (user.token.clone(), user.username.clone())
        };
        if favored {
            let story = self
                .registry
                .read()
                .await
                .get(story_id)
                .cloned()
                .ok_or_else(|| ApiError::not_found(story_id))?;
            self.api.add_favorite(&token, &username, story_id).await?;
            if let Some(user) = self.user.write().await.as_mut() {
                user.favorites.insert(story);
            }
        } else {
            self.api
                .remove_favorite(&token, &username, story_id)
                .await?;
            if let Some(user) = self.user.write().await.as_mut() {
                user.favorites.evict(story_id);
            }
        }
        Ok(())
    }

    pub async fn is_favorite(&self, story_id: &str) -> bool {
        self.user
            .read()
            .await
            .as_ref()
            .map(|user| user.favorites.contains(story_id))
            .unwrap_or(false)
    }

    pub async fn current_username(&self) -> Option<String> {
        self.user.read().await.as_ref().map(|user| user.username.clone())
    }

    pub async fn is_logged_in(&self) -> bool {
        self.user.read().await.is_some()
    }

    pub async fn favorites_snapshot(&self) -> FavoritesSet {
        self.user
            .read()
            .await
            .as_ref()
            .map(|user| user.favorites.clone())
            .unwrap_or_default()
    }

    pub async fn stories_snapshot(&self) -> Vec<Story> {
        self.registry.read().await.stories().to_vec()
    }

    async fn require_token(&self) -> Result<String, ApiError> {
        self.user
            .read()
            .await
            .as_ref()
            .map(|user| user.token.clone())
            .ok_or_else(|| ApiError::auth("action requires a logged-in user"))
    }
}
