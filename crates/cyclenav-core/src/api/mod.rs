//! Remote API access.
//!
//! The UI never waits on the network. Handlers describe a request as an
//! [`ApiCall`] wrapped in a [`PendingRequest`]; the frontend executes it
//! through an [`ApiClient`] on a background task and hands the result back
//! together with the request's [`RequestTicket`].

pub mod blog;
pub mod http;

use async_trait::async_trait;

pub use blog::BlogPost;
pub use http::HttpApiClient;

/// Failure of a remote call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The server answered with an `{ "error": ... }` body.
    #[error("{0}")]
    Rejected(String),

    /// Non-2xx status, with the body's error message when it had one.
    #[error("server returned HTTP {status}")]
    Status { status: u16, message: Option<String> },

    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(String),

    /// The response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Text for the error panel: the server's own message when it sent one.
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected(message) => message.clone(),
            Self::Status {
                message: Some(message),
                ..
            } => message.clone(),
            Self::Transport(_) => "Could not reach the server. Please try again.".to_string(),
            other => other.to_string(),
        }
    }
}

/// Why the blog feed is being fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlogPurpose {
    /// Startup check that notifies about unread posts.
    CheckUnread,
    /// Opening the blog records the newest post as viewed.
    MarkViewed,
}

/// A remote operation.
#[derive(Clone, PartialEq, Eq)]
pub enum ApiCall {
    Authenticate {
        identifier: String,
        password: String,
    },
    CreateAccount {
        username: String,
        email: String,
        password: String,
    },
    ResetPassword {
        email: String,
    },
    PhotomapTags {
        term: String,
    },
    BlogPosts(BlogPurpose),
}

impl ApiCall {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Authenticate { .. } => "user.authenticate",
            Self::CreateAccount { .. } => "user.create",
            Self::ResetPassword { .. } => "resetpassword",
            Self::PhotomapTags { .. } => "photomap.tags",
            Self::BlogPosts(_) => "blog.posts",
        }
    }
}

impl std::fmt::Debug for ApiCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PhotomapTags { term } => f.debug_struct("PhotomapTags").field("term", term).finish(),
            Self::BlogPosts(purpose) => f.debug_tuple("BlogPosts").field(purpose).finish(),
            other => f.write_str(other.name()),
        }
    }
}

/// Successful result of an [`ApiCall`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiReply {
    Authenticated,
    AccountCreated { success_message: String },
    ResetRequested,
    Tags(Vec<String>),
    BlogPosts {
        purpose: BlogPurpose,
        posts: Vec<BlogPost>,
    },
}

pub type ApiResult = Result<ApiReply, ApiError>;

/// Navigation context a request was issued in.
///
/// A bound ticket carries the navigator generation at issue time; its
/// result is dropped if the user has navigated since. Unbound tickets are
/// for results that do not target a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket(Option<u64>);

impl RequestTicket {
    pub fn bound(generation: u64) -> Self {
        Self(Some(generation))
    }

    pub fn unbound() -> Self {
        Self(None)
    }

    pub fn generation(self) -> Option<u64> {
        self.0
    }
}

/// A request waiting to be executed by the frontend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub ticket: RequestTicket,
    pub call: ApiCall,
}

/// Executes [`ApiCall`]s.
#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn execute(&self, call: ApiCall) -> ApiResult;
}
