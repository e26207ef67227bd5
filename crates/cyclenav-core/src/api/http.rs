//! [`ApiClient`] over HTTP.
//!
//! The CycleStreets endpoints answer with JSON. A body of the form
//! `{"error": "..."}` is a refusal even when the status is 200.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use url::Url;

use super::{ApiCall, ApiClient, ApiError, ApiReply, ApiResult, BlogPost};
use crate::config::settings::ApiConfig;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Replaces `{%apiBaseUrl}` and `{%apiKey}` in a URL template.
pub fn substitute_placeholders(template: &str, base_url: &str, key: &str) -> String {
    template
        .replace("{%apiBaseUrl}", base_url.trim_end_matches('/'))
        .replace("{%apiKey}", key)
}

/// Interprets a response body.
///
/// # Errors
///
/// - [`ApiError::Rejected`] for a 2xx body carrying an `error` string.
/// - [`ApiError::Status`] for any non-2xx status, with the body's error
///   message when present.
/// - [`ApiError::Decode`] for a 2xx body that is not JSON.
pub fn parse_envelope(status: u16, body: &str) -> Result<serde_json::Value, ApiError> {
    let success = (200..300).contains(&status);
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) if success => return Err(ApiError::Decode(e.to_string())),
        Err(_) => {
            return Err(ApiError::Status {
                status,
                message: None,
            })
        }
    };

    let message = value
        .get("error")
        .and_then(|e| e.as_str())
        .map(str::to_string);

    match (success, message) {
        (true, Some(message)) => Err(ApiError::Rejected(message)),
        (true, None) => Ok(value),
        (false, message) => Err(ApiError::Status { status, message }),
    }
}

#[derive(Debug, Clone)]
struct Endpoints {
    authentication: Url,
    account_creation: Url,
    password_reset: Url,
    photomap_tags: Url,
    blog_posts: Url,
}

impl Endpoints {
    fn resolve(config: &ApiConfig) -> Result<Self, ApiError> {
        let url = |template: &str| {
            let raw = substitute_placeholders(template, &config.base_url, &config.key);
            Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))
        };
        Ok(Self {
            authentication: url(&config.authentication_url)?,
            account_creation: url(&config.account_creation_url)?,
            password_reset: url(&config.password_reset_url)?,
            photomap_tags: url(&config.photomap_tags_url)?,
            blog_posts: url(&config.blog_posts_url)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    tag: String,
}

/// HTTP implementation of [`ApiClient`].
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    client: reqwest::Client,
    endpoints: Endpoints,
}

impl HttpApiClient {
    /// Builds a client for the endpoints in `config`.
    ///
    /// # Errors
    ///
    /// [`ApiError::InvalidUrl`] if an endpoint does not parse after
    /// placeholder substitution.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let endpoints = Endpoints::resolve(config)?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self { client, endpoints })
    }

    async fn post_form(&self, url: &Url, fields: &[(&str, &str)]) -> Result<(u16, String), ApiError> {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields.iter().copied())
            .finish();
        let request = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body);
        read(request).await
    }

    async fn get(&self, url: Url) -> Result<(u16, String), ApiError> {
        read(self.client.get(url)).await
    }
}

async fn read(request: reqwest::RequestBuilder) -> Result<(u16, String), ApiError> {
    let response = request
        .send()
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))?;
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))?;
    Ok((status, body))
}

fn decode<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Maps the response to `call` onto its reply.
///
/// # Errors
///
/// As [`parse_envelope`]. The password reset page answers with HTML, so
/// only its status is checked.
pub fn interpret_reply(call: &ApiCall, status: u16, body: &str) -> ApiResult {
    let reply = match call {
        ApiCall::Authenticate { .. } => {
            parse_envelope(status, body)?;
            ApiReply::Authenticated
        }
        ApiCall::CreateAccount { .. } => {
            let value = parse_envelope(status, body)?;
            let success_message = value
                .get("successmessage")
                .and_then(|m| m.as_str())
                .unwrap_or_default()
                .to_string();
            ApiReply::AccountCreated { success_message }
        }
        ApiCall::ResetPassword { .. } => {
            if !(200..300).contains(&status) {
                return Err(ApiError::Status {
                    status,
                    message: None,
                });
            }
            ApiReply::ResetRequested
        }
        ApiCall::PhotomapTags { .. } => {
            let entries: Vec<TagEntry> = decode(parse_envelope(status, body)?)?;
            ApiReply::Tags(entries.into_iter().map(|e| e.tag).collect())
        }
        ApiCall::BlogPosts(purpose) => {
            let posts: Vec<BlogPost> = decode(parse_envelope(status, body)?)?;
            ApiReply::BlogPosts {
                purpose: *purpose,
                posts,
            }
        }
    };
    Ok(reply)
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn execute(&self, call: ApiCall) -> ApiResult {
        tracing::debug!(call = call.name(), "api request");
        let (status, body) = match &call {
            ApiCall::Authenticate {
                identifier,
                password,
            } => {
                let fields = [("identifier", identifier.as_str()), ("password", password.as_str())];
                self.post_form(&self.endpoints.authentication, &fields).await?
            }
            ApiCall::CreateAccount {
                username,
                email,
                password,
            } => {
                let fields = [
                    ("username", username.as_str()),
                    ("email", email.as_str()),
                    ("password", password.as_str()),
                ];
                self.post_form(&self.endpoints.account_creation, &fields).await?
            }
            ApiCall::ResetPassword { email } => {
                self.post_form(&self.endpoints.password_reset, &[("email", email.as_str())])
                    .await?
            }
            ApiCall::PhotomapTags { term } => {
                let mut url = self.endpoints.photomap_tags.clone();
                url.query_pairs_mut().append_pair("match", term);
                self.get(url).await?
            }
            ApiCall::BlogPosts(_) => self.get(self.endpoints.blog_posts.clone()).await?,
        };
        interpret_reply(&call, status, &body)
    }
}
