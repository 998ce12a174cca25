use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::session::Session;
use crate::story::{Story, StoryDraft};

/// Outcome of an interaction, consumed by the frontend's event drain each
/// frame. `FavoriteFlipped` is emitted optimistically before the remote call
/// resolves; `FavoriteReverted` restores the previous indicator state when
/// the call fails.
#[derive(Debug, Clone)]
pub enum Event {
    StoryAdded(Story),
    StoryDeleted(String),
    FavoriteFlipped { story_id: String, favored: bool },
    FavoriteReverted { story_id: String, favored: bool },
    ActionFailed { story_id: Option<String>, message: String },
}

/// Binds user interactions to session operations and reports outcomes as
/// [`Event`]s. Mutating operations on one story id are serialized: while one
/// is in flight, further requests for the same id are ignored. Requests for
/// different ids proceed independently.
#[derive(Debug, Clone)]
pub struct Controller {
    session: Session,
    inflight: Arc<Mutex<HashSet<String>>>,
    events: mpsc::Sender<Event>,
}

struct InflightGuard {
    set: Arc<Mutex<HashSet<String>>>,
    story_id: String,
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        if let Ok(mut set) = self.set.lock() {
            set.remove(&self.story_id);
        }
    }
}

impl Controller {
    pub fn new(session: Session, events: mpsc::Sender<Event>) -> Self {
        Self {
            session,
            inflight: Arc::new(Mutex::new(HashSet::new())),
            events,
        }
    }

    /// Star-click handler. Reads membership once, flips the indicator
    /// immediately, then awaits remote confirmation; a rejection reverts the
    /// indicator to its previous state.
    pub async fn toggle_favorite(&self, story_id: String) {
        let Some(_guard) = self.mark_inflight(&story_id) else {
            debug!(%story_id, "toggle ignored, a request for this story is in flight");
            return;
        };

        let was_favorite = self.session.is_favorite(&story_id).await;
        let favored = !was_favorite;
        self.emit(Event::FavoriteFlipped {
            story_id: story_id.clone(),
            favored,
        })
        .await;

        if let Err(err) = self.session.set_favorite(&story_id, favored).await {
            warn!(%story_id, error = %err, "favorite toggle failed, reverting indicator");
            self.emit(Event::FavoriteReverted {
                story_id: story_id.clone(),
                favored: was_favorite,
            })
            .await;
            self.fail(Some(story_id), err).await;
        }
    }

    /// Submission handler. The frontend clears the form only when
    /// `StoryAdded` arrives, so a failed submission keeps the typed values.
    pub async fn submit_story(&self, draft: StoryDraft) {
        match self.session.submit_story(&draft).await {
            Ok(story) => self.emit(Event::StoryAdded(story)).await,
            Err(err) => self.fail(None, err).await,
        }
    }

    /// Trash-click handler. Shares the per-id guard with the toggle flow so
    /// a delete never races a favorite request for the same story.
    pub async fn delete_story(&self, story_id: String) {
        let Some(_guard) = self.mark_inflight(&story_id) else {
            debug!(%story_id, "delete ignored, a request for this story is in flight");
            return;
        };

        match self.session.delete_story(&story_id).await {
            Ok(()) => self.emit(Event::StoryDeleted(story_id)).await,
            Err(err) => self.fail(Some(story_id), err).await,
        }
    }

    fn mark_inflight(&self, story_id: &str) -> Option<InflightGuard> {
        let mut set = self.inflight.lock().ok()?;
        if !set.insert(story_id.to_owned()) {
            return None;
        }
        Some(InflightGuard {
            set: Arc::clone(&self.inflight),
            story_id: story_id.to_owned(),
        })
    }

    async fn emit(&self, event: Event) {
        if self.events.send(event).await.is_err() {
            warn!("event receiver dropped");
        }
    }

    async fn fail(&self, story_id: Option<String>, err: ApiError) {
        self.emit(Event::ActionFailed {
            story_id,
            message: err.to_string(),
        })
        .await;
    }
}
