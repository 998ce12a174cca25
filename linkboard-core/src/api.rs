use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::ApiError;
use crate::story::{Story, StoryDraft, UserProfile};

/// Thin client for the remote story service. Holds no session state; the
/// credential is passed into each mutating call by the session layer.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
}

/// Token plus profile as returned by login/signup.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Deserialize)]
struct StoriesEnvelope {
    stories: Vec<Story>,
}

#[derive(Deserialize)]
struct StoryEnvelope {
    story: Story,
}

#[derive(Serialize)]
struct TokenBody<'a> {
    token: &'a str,
}

#[derive(Serialize)]
struct SubmitBody<'a> {
    token: &'a str,
    story: &'a StoryDraft,
}

#[derive(Serialize)]
struct CredentialsBody<'a> {
    user: Credentials<'a>,
}

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl ApiClient {
    pub fn new(http: Client, base: Url) -> Self {
        Self { http, base }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::not_found("service base URL is not a valid base"))?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    /// Full story list, server order.
    pub async fn fetch_stories(&self) -> Result<Vec<Story>, ApiError> {
        let url = self.endpoint(&["stories"])?;
        let response = self.http.get(url).send().await?;
        let envelope: StoriesEnvelope = expect_ok(response, "stories").await?.json().await?;
        debug!(count = envelope.stories.len(), "fetched story list");
        Ok(envelope.stories)
    }

    /// Create a story on behalf of the credential owner. The server assigns
    /// the story id.
    pub async fn submit_story(&self, token: &str, draft: &StoryDraft) -> Result<Story, ApiError> {
        let url = self.endpoint(&["stories"])?;
        let response = self
            .http
            .post(url)
            .json(&SubmitBody { token, story: draft })
            .send()
            .await?;
        let envelope: StoryEnvelope = expect_ok(response, "story").await?.json().await?;
        debug!(story_id = %envelope.story.story_id, "story created");
        Ok(envelope.story)
    }

    pub async fn delete_story(&self, token: &str, story_id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["stories", story_id])?;
        let response = self
            .http
            .delete(url)
            .json(&TokenBody { token })
            .send()
            .await?;
        expect_ok(response, story_id).await?;
        debug!(%story_id, "story deleted remotely");
        Ok(())
    }

    pub async fn add_favorite(
        &self,
        token: &str,
        username: &str,
        story_id: &str,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&["users", username, "favorites", story_id])?;
        let response = self
            .http
            .post(url)
            .json(&TokenBody { token })
            .send()
            .await?;
        expect_ok(response, story_id).await?;
        Ok(())
    }

    pub async fn remove_favorite(
        &self,
        token: &str,
        username: &str,
        story_id: &str,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&["users", username, "favorites", story_id])?;
        let response = self
            .http
            .delete(url)
            .json(&TokenBody { token })
            .send()
            .await?;
        expect_ok(response, story_id).await?;
        Ok(())
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<AuthPayload, ApiError> {
        let url = self.endpoint(&["login"])?;
        let response = self
            .http
            .post(url)
            .json(&CredentialsBody {
                user: Credentials {
                    username,
                    password,
                    name: None,
                },
            })
            .send()
            .await?;
        let payload: AuthPayload = expect_ok(response, username).await?.json().await?;
        Ok(payload)
    }

    pub async fn signup(
        &self,
        username: &str,
        password: &str,
        name: &str,
    ) -> Result<AuthPayload, ApiError> {
        let url = self.endpoint(&["signup"])?;
        let response = self
            .http
            .post(url)
            .json(&CredentialsBody {
                user: Credentials {
                    username,
                    password,
                    name: Some(name),
                },
            })
            .send()
            .await?;
        let payload: AuthPayload = expect_ok(response, username).await?.json().await?;
        Ok(payload)
    }
}

/// Map non-success statuses onto the error kinds the controller distinguishes.
/// The server reports failures as `{"error": {"message": ...}}`.
async fn expect_ok(response: Response, what: &str) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let transport = response.error_for_status_ref().err();
    let message = response
        .json::<ErrorEnvelope>()
        .await
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| status.to_string());
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ApiError::Auth { message }),
        StatusCode::NOT_FOUND => Err(ApiError::not_found(what)),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            Err(ApiError::Validation { message })
        }
        _ => match transport {
            Some(err) => Err(ApiError::Network(err)),
            None => Err(ApiError::Validation { message }),
        },
    }
}
