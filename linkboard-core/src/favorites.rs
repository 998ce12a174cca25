use crate::story::Story;

/// The current user's favorited stories. Favorite counts are expected to be
/// small, so membership is a linear scan with no index. All membership logic
/// lives here; call sites never re-implement the lookup. Toggle is not a
/// primitive: the interaction controller composes it from `contains` plus
/// `insert` or `evict`.
#[derive(Debug, Clone, Default)]
pub struct FavoritesSet {
    stories: Vec<Story>,
}

impl FavoritesSet {
    pub fn new(stories: Vec<Story>) -> Self {
        let mut set = Self::default();
        for story in stories {
            set.insert(story);
        }
        set
    }

    pub fn contains(&self, story_id: &str) -> bool {
        self.stories.iter().any(|story| story.story_id == story_id)
    }

    /// No-op if a story with the same id is already present.
    pub fn insert(&mut self, story: Story) {
        if !self.contains(&story.story_id) {
            self.stories.push(story);
        }
    }

    /// Removes and returns the favorite, or `None` if it was not present.
    pub fn evict(&mut self, story_id: &str) -> Option<Story> {
        let position = self
            .stories
            .iter()
            .position(|story| story.story_id == story_id)?;
        Some(self.stories.remove(position))
    }

    /// Drop favorites whose story no longer appears in the given registry
    /// snapshot. Used after a full refresh to prune references to stories
    /// deleted by other sessions.
    pub fn retain_known(&mut self, known: &[Story]) {
        self.stories
            .retain(|favorite| known.iter().any(|story| story.story_id == favorite.story_id));
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
