use serde::{Deserialize, Serialize};

use crate::favorites::FavoritesSet;
use crate::story::Story;

/// Everything the frontend needs to paint one story row. `starred` is the
/// two-state favorite indicator; whether a delete affordance is shown is the
/// frontend's call, comparing `posted_by` against the logged-in username.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoryFragment {
    pub story_id: String,
    pub title: String,
    pub url: String,
    pub host: Option<String>,
    pub author: String,
    pub posted_by: String,
    pub starred: bool,
}

/// Pure mapping from a story (plus favorite membership) to its row model.
pub fn render_story(story: &Story, is_favorite: bool) -> StoryFragment {
    StoryFragment {
        story_id: story.story_id.clone(),
        title: story.title.clone(),
        url: story.url.clone(),
        host: story.host_name(),
        author: story.author.clone(),
        posted_by: story.username.clone(),
        starred: is_favorite,
    }
}

/// Ordered list model the frontend paints each frame. Full repopulation goes
/// through [`ListView::render_list`]; the add/delete/favorite flows use the
/// incremental single-item operations so the rest of the list is untouched.
#[derive(Debug, Clone, Default)]
pub struct ListView {
    items: Vec<StoryFragment>,
}

impl ListView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears existing contents first, so repeated calls with the same input
    /// yield the same visible result.
    pub fn render_list(&mut self, stories: &[Story], favorites: &FavoritesSet) {
        self.items.clear();
        for story in stories {
            self.items
                .push(render_story(story, favorites.contains(&story.story_id)));
        }
    }

    pub fn insert_front(&mut self, fragment: StoryFragment) {
        self.items
            .retain(|existing| existing.story_id != fragment.story_id);
        self.items.insert(0, fragment);
    }

    pub fn insert_back(&mut self, fragment: StoryFragment) {
        self.items
            .retain(|existing| existing.story_id != fragment.story_id);
        self.items.push(fragment);
    }

    /// Returns whether a matching item was present.
    pub fn remove_one(&mut self, story_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.story_id != story_id);
        self.items.len() != before
    }

    /// Flip the favorite indicator on one row, leaving the rest of the list
    /// (and any frontend state attached to it) alone.
    pub fn set_starred(&mut self, story_id: &str, starred: bool) {
        if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.story_id == story_id)
        {
            item.starred = starred;
        }
    }

    pub fn get(&self, story_id: &str) -> Option<&StoryFragment> {
        self.items.iter().find(|item| item.story_id == story_id)
    }

    pub fn items(&self) -> &[StoryFragment] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Apply a favorite-indicator change across the main and favorites views.
/// The favorites row is normally cloned from the main list; when the main
/// list no longer has the story (a favorite can outlive its main-list
/// entry), the row is rebuilt from the favorites set instead.
pub fn apply_star_state(
    main: &mut ListView,
    favorites_view: &mut ListView,
    favorites: &FavoritesSet,
    story_id: &str,
    favored: bool,
) {
    main.set_starred(story_id, favored);
    if favored {
        if let Some(fragment) = main.get(story_id).cloned() {
            favorites_view.insert_back(fragment);
        } else if let Some(story) = favorites
            .stories()
            .iter()
            .find(|story| story.story_id == story_id)
        {
            favorites_view.insert_back(render_story(story, true));
        } else {
            favorites_view.set_starred(story_id, favored);
        }
    } else {
        favorites_view.remove_one(story_id);
    }
}
