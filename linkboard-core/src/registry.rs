use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::error::ApiError;
use crate::story::Story;

/// Authoritative in-memory story list for the page session, newest first.
/// Invariant: story ids are unique at every observable instant.
#[derive(Debug, Default)]
pub struct StoryRegistry {
    stories: Vec<Story>,
}

pub type SharedRegistry = Arc<RwLock<StoryRegistry>>;

pub fn shared_registry(initial: Vec<Story>) -> SharedRegistry {
    Arc::new(RwLock::new(StoryRegistry::new(initial)))
}

impl StoryRegistry {
    pub fn new(stories: Vec<Story>) -> Self {
        let mut registry = Self::default();
        registry.replace_all(stories);
        registry
    }

    /// Wholesale refresh from a fetch. Keeps server order, dropping any
    /// duplicate ids past the first occurrence.
    pub fn replace_all(&mut self, stories: Vec<Story>) {
        self.stories.clear();
        for story in stories {
            if !self.contains(&story.story_id) {
                self.stories.push(story);
            }
        }
    }

    /// Insert a freshly created story at the front, preserving newest-first
    /// order. An entry with the same id is replaced rather than duplicated.
    pub fn insert_front(&mut self, story: Story) {
        self.stories
            .retain(|existing| existing.story_id != story.story_id);
        self.stories.insert(0, story);
    }

    pub fn remove(&mut self, story_id: &str) -> Result<Story, ApiError> {
        let position = self
            .stories
            .iter()
            .position(|story| story.story_id == story_id)
            .ok_or_else(|| ApiError::not_found(story_id))?;
        let removed = self.stories.remove(position);
        debug!(%story_id, "story removed from registry");
        Ok(removed)
    }

    pub fn contains(&self, story_id: &str) -> bool {
        self.stories.iter().any(|story| story.story_id == story_id)
    }

    pub fn get(&self, story_id: &str) -> Option<&Story> {
        self.stories.iter().find(|story| story.story_id == story_id)
    }

    pub fn stories(&self) -> &[Story] {
        &self.stories
    }

    pub fn len(&self) -> usize {
        self.stories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }
}
