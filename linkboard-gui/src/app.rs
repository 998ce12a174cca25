use std::sync::Arc;
use std::time::Duration;

use eframe::egui::{self, Color32};
use linkboard_core::{
    apply_star_state, render_story, AppConfig, Controller, Event, ListView, Session, StoryDraft,
    StoryFragment,
};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tracing::warn;

pub struct AppInit {
    pub runtime: Arc<Runtime>,
    pub session: Session,
    pub controller: Controller,
    pub events: mpsc::Receiver<Event>,
    pub config: AppConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AppView {
    AllStories,
    Favorites,
    Submit,
    Login,
}

pub struct BoardApp {
    runtime: Arc<Runtime>,
    session: Session,
    controller: Controller,
    events: mpsc::Receiver<Event>,
    config: AppConfig,
    view: AppView,
    username: Option<String>,
    all_stories: ListView,
    favorites_view: ListView,
    // story submission form
    title_input: String,
    author_input: String,
    url_input: String,
    // login / signup forms
    login_username: String,
    login_password: String,
    signup_username: String,
    signup_password: String,
    signup_name: String,
    status: Option<(bool, String)>,
}

impl BoardApp {
    pub fn new(init: AppInit) -> Self {
        let mut app = Self {
            runtime: init.runtime,
            session: init.session,
            controller: init.controller,
            events: init.events,
            config: init.config,
            view: AppView::AllStories,
            username: None,
            all_stories: ListView::new(),
            favorites_view: ListView::new(),
            title_input: String::new(),
            author_input: String::new(),
            url_input: String::new(),
            login_username: String::new(),
            login_password: String::new(),
            signup_username: String::new(),
            signup_password: String::new(),
            signup_name: String::new(),
            status: None,
        };

        // Initial load, so the board is populated before the first frame.
        if let Err(err) = app.runtime.block_on(app.session.refresh_stories()) {
            warn!(error = %err, "initial story fetch failed");
            app.status = Some((false, format!("Could not load stories: {err}")));
        }
        app.rebuild_views();
        app
    }

    /// Full repopulation of both list models from session state. Used for
    /// load/refresh and login/logout; the interaction flows go through the
    /// incremental event path instead.
    fn rebuild_views(&mut self) {
        let stories = self.runtime.block_on(self.session.stories_snapshot());
        let favorites = self.runtime.block_on(self.session.favorites_snapshot());
        self.all_stories.render_list(&stories, &favorites);
        self.favorites_view.render_list(favorites.stories(), &favorites);
    }

    /// Drain controller outcomes and apply each one as a minimal list-view
    /// mutation, never a full repaint.
    fn refresh_updates(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                Event::StoryAdded(story) => {
                    self.all_stories.insert_front(render_story(&story, false));
                    self.title_input.clear();
                    self.author_input.clear();
                    self.url_input.clear();
                    self.view = AppView::AllStories;
                    self.status = Some((true, format!("\"{}\" posted.", story.title)));
                }
                Event::StoryDeleted(story_id) => {
                    self.all_stories.remove_one(&story_id);
                    self.favorites_view.remove_one(&story_id);
                }
                Event::FavoriteFlipped { story_id, favored }
                | Event::FavoriteReverted { story_id, favored } => {
                    self.apply_star_state(&story_id, favored);
                }
                Event::ActionFailed { story_id: _, message } => {
                    self.status = Some((false, message));
                }
            }
        }
    }

    fn apply_star_state(&mut self, story_id: &str, favored: bool) {
        let favorites = self.runtime.block_on(self.session.favorites_snapshot());
        apply_star_state(
            &mut self.all_stories,
            &mut self.favorites_view,
            &favorites,
            story_id,
            favored,
        );
    }

    fn refresh_stories(&mut self) {
        match self.runtime.block_on(self.session.refresh_stories()) {
            Ok(count) => {
                self.rebuild_views();
                self.status = Some((true, format!("{count} stories loaded.")));
            }
            Err(err) => self.status = Some((false, format!("Refresh failed: {err}"))),
        }
    }

    fn do_login(&mut self) {
        let username = self.login_username.trim().to_string();
        let password = self.login_password.clone();
        match self.runtime.block_on(self.session.login(&username, &password)) {
            Ok(()) => self.finish_auth(),
            Err(err) => self.status = Some((false, format!("Login failed: {err}"))),
        }
    }

    fn do_signup(&mut self) {
        let username = self.signup_username.trim().to_string();
        let password = self.signup_password.clone();
        let name = self.signup_name.trim().to_string();
        match self
            .runtime
            .block_on(self.session.signup(&username, &password, &name))
        {
            Ok(()) => self.finish_auth(),
            Err(err) => self.status = Some((false, format!("Signup failed: {err}"))),
        }
    }

    fn finish_auth(&mut self) {
        self.username = self.runtime.block_on(self.session.current_username());
        self.login_password.clear();
        self.signup_password.clear();
        self.rebuild_views();
        self.view = AppView::AllStories;
        self.status = None;
    }

    fn do_logout(&mut self) {
        self.runtime.block_on(self.session.logout());
        self.username = None;
        self.rebuild_views();
        self.view = AppView::AllStories;
        self.status = None;
    }

    fn spawn_toggle(&self, story_id: String) {
        let controller = self.controller.clone();
        self.runtime.spawn(async move {
            controller.toggle_favorite(story_id).await;
        });
    }

    fn spawn_delete(&self, story_id: String) {
        let controller = self.controller.clone();
        self.runtime.spawn(async move {
            controller.delete_story(story_id).await;
        });
    }

    fn submit_from_form(&mut self) {
        let draft = StoryDraft {
            title: self.title_input.trim().to_string(),
            author: self.author_input.trim().to_string(),
            url: self.url_input.trim().to_string(),
        };
        if draft.title.is_empty() || draft.author.is_empty() || draft.url.is_empty() {
            self.status = Some((false, "All three fields are required.".to_string()));
            return;
        }
        let controller = self.controller.clone();
        self.runtime.spawn(async move {
            controller.submit_story(draft).await;
        });
        self.status = Some((true, "Posting...".to_string()));
    }

    fn draw_nav(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("nav").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .add(egui::Label::new(egui::RichText::new("Linkboard").strong().size(17.0))
                        .sense(egui::Sense::click()))
                    .clicked()
                {
                    self.view = AppView::AllStories;
                    self.rebuild_views();
                }
                if ui.small_button("⟳").on_hover_text("Reload the story list").clicked() {
                    self.refresh_stories();
                }
                ui.separator();
                if self.username.is_some() {
                    if ui.selectable_label(self.view == AppView::Submit, "submit").clicked() {
                        self.view = AppView::Submit;
                    }
                    if ui
                        .selectable_label(self.view == AppView::Favorites, "favorites")
                        .clicked()
                    {
                        self.view = AppView::Favorites;
                    }
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    match self.username.clone() {
                        Some(username) => {
                            if ui.small_button("log out").clicked() {
                                self.do_logout();
                            }
                            ui.label(egui::RichText::new(username).strong());
                        }
                        None => {
                            if ui
                                .selectable_label(self.view == AppView::Login, "login / signup")
                                .clicked()
                            {
                                self.view = AppView::Login;
                            }
                        }
                    }
                });
            });
        });
    }

    fn draw_status(&mut self, ui: &mut egui::Ui) {
        if let Some((ok, message)) = &self.status {
            let color = if *ok {
                Color32::from_rgb(67, 160, 71)
            } else {
                Color32::from_rgb(229, 57, 53)
            };
            ui.label(egui::RichText::new(message.clone()).color(color).size(13.0));
            ui.separator();
        }
    }

    fn draw_story_row(&self, ui: &mut egui::Ui, fragment: &StoryFragment) -> RowAction {
        let mut action = RowAction::None;
        let logged_in = self.username.is_some();
        let own_story = self.username.as_deref() == Some(fragment.posted_by.as_str());

        ui.horizontal(|ui| {
            if logged_in {
                let star = if fragment.starred { "★" } else { "☆" };
                if ui
                    .small_button(star)
                    .on_hover_text(if fragment.starred {
                        "Remove from favorites"
                    } else {
                        "Add to favorites"
                    })
                    .clicked()
                {
                    action = RowAction::ToggleFavorite;
                }
            }
            if own_story {
                if ui.small_button("🗑").on_hover_text("Delete this story").clicked() {
                    action = RowAction::Delete;
                }
            }
            let title = ui.add(
                egui::Label::new(
                    egui::RichText::new(&fragment.title)
                        .strong()
                        .size(self.config.ui.font_size + 2.0),
                )
                .sense(egui::Sense::click()),
            );
            if title.clicked() {
                if let Err(err) = webbrowser::open(&fragment.url) {
                    warn!(error = %err, "could not open story link");
                }
            }
            if let Some(host) = &fragment.host {
                ui.label(egui::RichText::new(format!("({host})")).weak().size(12.0));
            }
        });
        ui.horizontal(|ui| {
            ui.add_space(18.0);
            ui.label(
                egui::RichText::new(format!("by {}", fragment.author))
                    .weak()
                    .size(12.0),
            );
            ui.label(
                egui::RichText::new(format!("posted by {}", fragment.posted_by))
                    .weak()
                    .size(12.0),
            );
        });
        ui.add_space(4.0);
        action
    }

    fn draw_story_list(&mut self, ui: &mut egui::Ui, favorites: bool) {
        let fragments: Vec<StoryFragment> = if favorites {
            self.favorites_view.items().to_vec()
        } else {
            self.all_stories.items().to_vec()
        };

        if fragments.is_empty() {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                if favorites {
                    ui.label(egui::RichText::new("No favorites yet.").size(15.0));
                    ui.label(
                        egui::RichText::new("Star a story on the main list to keep it here.")
                            .weak()
                            .size(13.0),
                    );
                } else {
                    ui.label(egui::RichText::new("No stories to show.").size(15.0));
                }
            });
            return;
        }

        egui::ScrollArea::vertical()
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for fragment in &fragments {
                    match self.draw_story_row(ui, fragment) {
                        RowAction::ToggleFavorite => self.spawn_toggle(fragment.story_id.clone()),
                        RowAction::Delete => self.spawn_delete(fragment.story_id.clone()),
                        RowAction::None => {}
                    }
                }
            });
    }

    fn draw_submit_form(&mut self, ui: &mut egui::Ui) {
        ui.heading(egui::RichText::new("Submit a story").size(16.0));
        ui.separator();
        ui.label("Title");
        ui.text_edit_singleline(&mut self.title_input);
        ui.label("Author");
        ui.text_edit_singleline(&mut self.author_input);
        ui.label("URL");
        ui.text_edit_singleline(&mut self.url_input);
        ui.add_space(6.0);
        if ui.button("Post").clicked() {
            self.submit_from_form();
        }
    }

    fn draw_login_forms(&mut self, ui: &mut egui::Ui) {
        ui.heading(egui::RichText::new("Login").size(16.0));
        ui.separator();
        ui.label("Username");
        ui.text_edit_singleline(&mut self.login_username);
        ui.label("Password");
        ui.add(egui::TextEdit::singleline(&mut self.login_password).password(true));
        ui.add_space(6.0);
        if ui.button("Log in").clicked() {
            self.do_login();
        }

        ui.add_space(16.0);
        ui.heading(egui::RichText::new("Create account").size(16.0));
        ui.separator();
        ui.label("Name");
        ui.text_edit_singleline(&mut self.signup_name);
        ui.label("Username");
        ui.text_edit_singleline(&mut self.signup_username);
        ui.label("Password");
        ui.add(egui::TextEdit::singleline(&mut self.signup_password).password(true));
        ui.add_space(6.0);
        if ui.button("Sign up").clicked() {
            self.do_signup();
        }
    }
}

enum RowAction {
    None,
    ToggleFavorite,
    Delete,
}

impl eframe::App for BoardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.refresh_updates();
        self.draw_nav(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_status(ui);
            match self.view.clone() {
                AppView::AllStories => self.draw_story_list(ui, false),
                AppView::Favorites => self.draw_story_list(ui, true),
                AppView::Submit => self.draw_submit_form(ui),
                AppView::Login => self.draw_login_forms(ui),
            }
        });

        // Controller events arrive from spawned tasks; keep polling even
        // without input.
        ctx.request_repaint_after(Duration::from_millis(150));
    }
}
