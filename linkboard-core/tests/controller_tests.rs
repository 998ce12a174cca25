use std::time::Duration;

use reqwest::{Client, Url};
use serde_json::json;
use tokio::sync::mpsc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use linkboard_core::{
    shared_registry, ApiClient, Controller, Event, Session, Story, StoryDraft,
};

fn story(id: &str, title: &str) -> Story {
    Story {
        story_id: id.into(),
        title: title.into(),
        author: "Ann Author".into(),
        url: format!("https://example.com/{id}"),
        username: "alice".into(),
        created_at: None,
    }
}

fn story_json(id: &str, title: &str) -> serde_json::Value {
    json!({
        "storyId": id,
        "title": title,
        "author": "Ann Author",
        "url": format!("https://example.com/{id}"),
        "username": "alice"
    })
}

/// Board with a seeded registry and "alice" logged in via a mocked /login.
async fn logged_in_board(
    server: &MockServer,
    stories: Vec<Story>,
    favorites: Vec<Story>,
) -> (Session, Controller, mpsc::Receiver<Event>) {
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "tok",
            "user": {
                "username": "alice",
                "name": "Alice",
                "favorites": favorites
            }
        })))
        .mount(server)
        .await;

    let api = ApiClient::new(Client::new(), Url::parse(&server.uri()).unwrap());
    let session = Session::new(api, shared_registry(stories));
    session.login("alice", "pw").await.unwrap();

    let (tx, rx) = mpsc::channel(32);
    let controller = Controller::new(session.clone(), tx);
    (session, controller, rx)
}

fn drain(rx: &mut mpsc::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn toggle_favorite_flips_on_then_off() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/alice/favorites/s1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "added"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/users/alice/favorites/s1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "removed"})))
        .expect(1)
        .mount(&server)
        .await;

    let (session, controller, mut rx) = logged_in_board(
        &server,
        vec![story("s1", "A"), story("s2", "B")],
        Vec::new(),
    )
    .await;

    controller.toggle_favorite("s1".into()).await;
    assert!(session.is_favorite("s1").await);
    assert!(!session.is_favorite("s2").await);
    let events = drain(&mut rx);
    assert!(matches!(
        events.as_slice(),
        [Event::FavoriteFlipped { story_id, favored: true }] if story_id == "s1"
    ));

    controller.toggle_favorite("s1".into()).await;
    assert!(!session.is_favorite("s1").await);
    let events = drain(&mut rx);
    assert!(matches!(
        events.as_slice(),
        [Event::FavoriteFlipped { story_id, favored: false }] if story_id == "s1"
    ));
}

#[tokio::test]
async fn failed_toggle_reverts_the_indicator() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/alice/favorites/s1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (session, controller, mut rx) =
        logged_in_board(&server, vec![story("s1", "A")], Vec::new()).await;

    controller.toggle_favorite("s1".into()).await;

    assert!(!session.is_favorite("s1").await);
    let events = drain(&mut rx);
    assert_eq!(events.len(), 3, "flip, revert, failure: {events:?}");
    assert!(matches!(
        events[0],
        Event::FavoriteFlipped { favored: true, .. }
    ));
    assert!(matches!(
        events[1],
        Event::FavoriteReverted { favored: false, .. }
    ));
    assert!(matches!(events[2], Event::ActionFailed { .. }));
}

#[tokio::test]
async fn rapid_double_toggle_issues_a_single_remote_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/alice/favorites/s1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"message": "added"}))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (session, controller, mut rx) =
        logged_in_board(&server, vec![story("s1", "A")], Vec::new()).await;

    // Second click lands while the first request is still in flight; it must
    // be ignored rather than dispatched concurrently.
    tokio::join!(
        controller.toggle_favorite("s1".into()),
        controller.toggle_favorite("s1".into()),
    );

    assert!(session.is_favorite("s1").await);
    let flips = drain(&mut rx)
        .into_iter()
        .filter(|event| matches!(event, Event::FavoriteFlipped { .. }))
        .count();
    assert_eq!(flips, 1);
    server.verify().await;
}

#[tokio::test]
async fn toggles_on_distinct_stories_run_independently() {
    let server = MockServer::start().await;
    for id in ["s1", "s2"] {
        Mock::given(method("POST"))
            .and(path(format!("/users/alice/favorites/{id}")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"message": "added"}))
                    .set_delay(Duration::from_millis(50)),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let (session, controller, _rx) = logged_in_board(
        &server,
        vec![story("s1", "A"), story("s2", "B")],
        Vec::new(),
    )
    .await;

    tokio::join!(
        controller.toggle_favorite("s1".into()),
        controller.toggle_favorite("s2".into()),
    );

    assert!(session.is_favorite("s1").await);
    assert!(session.is_favorite("s2").await);
}

#[tokio::test]
async fn submitted_story_lands_at_the_front_of_the_registry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/stories"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "story": story_json("s3", "C") })),
        )
        .mount(&server)
        .await;

    let (session, controller, mut rx) = logged_in_board(
        &server,
        vec![story("s1", "A"), story("s2", "B")],
        Vec::new(),
    )
    .await;

    controller
        .submit_story(StoryDraft {
            title: "C".into(),
            author: "Ann Author".into(),
            url: "https://example.com/s3".into(),
        })
        .await;

    let events = drain(&mut rx);
    assert!(matches!(
        events.as_slice(),
        [Event::StoryAdded(added)] if added.story_id == "s3"
    ));
    let ids: Vec<String> = session
        .stories_snapshot()
        .await
        .iter()
        .map(|s| s.story_id.clone())
        .collect();
    assert_eq!(ids, vec!["s3", "s1", "s2"]);
}

#[tokio::test]
async fn failed_submission_leaves_the_registry_unmodified() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/stories"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "message": "url is not a valid URL" }
        })))
        .mount(&server)
        .await;

    let (session, controller, mut rx) =
        logged_in_board(&server, vec![story("s1", "A")], Vec::new()).await;

    controller
        .submit_story(StoryDraft {
            title: "Bad".into(),
            author: "A".into(),
            url: "nope".into(),
        })
        .await;

    let events = drain(&mut rx);
    assert!(matches!(events.as_slice(), [Event::ActionFailed { .. }]));
    assert_eq!(session.stories_snapshot().await.len(), 1);
}

#[tokio::test]
async fn delete_removes_the_story_from_registry_and_favorites() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/stories/s2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "deleted"})))
        .expect(1)
        .mount(&server)
        .await;

    let (session, controller, mut rx) = logged_in_board(
        &server,
        vec![story("s1", "A"), story("s2", "B")],
        vec![story("s2", "B")],
    )
    .await;
    assert!(session.is_favorite("s2").await);

    controller.delete_story("s2".into()).await;

    let events = drain(&mut rx);
    assert!(matches!(
        events.as_slice(),
        [Event::StoryDeleted(id)] if id == "s2"
    ));
    let ids: Vec<String> = session
        .stories_snapshot()
        .await
        .iter()
        .map(|s| s.story_id.clone())
        .collect();
    assert_eq!(ids, vec!["s1"]);
    assert!(!session.is_favorite("s2").await);
}

#[tokio::test]
async fn delete_issues_the_remote_call_even_on_local_mismatch() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/stories/ghost"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "deleted"})))
        .expect(1)
        .mount(&server)
        .await;

    let (_session, controller, mut rx) =
        logged_in_board(&server, vec![story("s1", "A")], Vec::new()).await;

    controller.delete_story("ghost".into()).await;

    let events = drain(&mut rx);
    assert!(matches!(
        events.as_slice(),
        [Event::StoryDeleted(id)] if id == "ghost"
    ));
    server.verify().await;
}

#[tokio::test]
async fn toggle_without_login_rolls_back_and_reports_auth_failure() {
    let server = MockServer::start().await;
    let api = ApiClient::new(Client::new(), Url::parse(&server.uri()).unwrap());
    let session = Session::new(api, shared_registry(vec![story("s1", "A")]));
    let (tx, mut rx) = mpsc::channel(32);
    let controller = Controller::new(session.clone(), tx);

    controller.toggle_favorite("s1".into()).await;

    let events = drain(&mut rx);
    assert!(matches!(
        events.first(),
        Some(Event::FavoriteFlipped { favored: true, .. })
    ));
    assert!(matches!(
        events.get(1),
        Some(Event::FavoriteReverted { favored: false, .. })
    ));
    assert!(matches!(events.get(2), Some(Event::ActionFailed { .. })));
}
