pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod favorites;
pub mod registry;
pub mod render;
pub mod session;
pub mod story;

pub use api::{ApiClient, AuthPayload};
pub use config::AppConfig;
pub use controller::{Controller, Event};
pub use error::ApiError;
pub use favorites::FavoritesSet;
pub use registry::{shared_registry, SharedRegistry, StoryRegistry};
pub use render::{apply_star_state, render_story, ListView, StoryFragment};
pub use session::{Session, User};
pub use story::{Story, StoryDraft, UserProfile};
