//! Background execution of remote calls.
//!
//! The controller never blocks on the network. Each [`PendingRequest`] it
//! hands out is run on a tokio task by [`spawn_request`], and the result
//! comes back to the main event loop through an unbounded mpsc channel.

use std::path::PathBuf;
use std::sync::Arc;

use cyclenav_core::{ApiClient, ApiResult, PendingRequest};
use tokio::sync::mpsc::UnboundedSender;

/// Messages sent from background tasks to the main event loop.
pub enum ApiMessage {
    Completed {
        request: PendingRequest,
        result: ApiResult,
    },
}

/// Returns the per-user configuration directory.
///
/// A `config/` directory in the working directory wins over
/// `~/.config/cyclenav`.
pub fn config_dir() -> PathBuf {
    let local = PathBuf::from("config");
    if local.exists() {
        return local;
    }
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
        .join(".config")
        .join("cyclenav")
}

/// Default location of the preferences file.
pub fn default_preferences_path() -> PathBuf {
    config_dir().join("preferences.json")
}

/// Runs `request` on a background task.
///
/// The result is sent as [`ApiMessage::Completed`] together with the
/// original request so its ticket can be checked. A closed receiver is
/// ignored.
pub fn spawn_request(
    client: Arc<dyn ApiClient>,
    request: PendingRequest,
    tx: UnboundedSender<ApiMessage>,
) {
    tokio::spawn(async move {
        tracing::debug!(call = request.call.name(), "request started");
        let result = client.execute(request.call.clone()).await;
        if let Err(e) = &result {
            tracing::debug!(call = request.call.name(), error = %e, "request failed");
        }
        let _ = tx.send(ApiMessage::Completed { request, result });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cyclenav_core::{ApiCall, ApiError, ApiReply, RequestTicket};
    use tokio::sync::mpsc;

    struct ScriptedClient;

    #[async_trait]
    impl ApiClient for ScriptedClient {
        async fn execute(&self, call: ApiCall) -> ApiResult {
            match call {
                ApiCall::PhotomapTags { term } => Ok(ApiReply::Tags(vec![format!("{term}parking")])),
                _ => Err(ApiError::Transport("offline".to_string())),
            }
        }
    }

    #[test]
    fn preferences_live_in_config_dir() {
        let path = default_preferences_path();
        assert!(path.ends_with("preferences.json"));
        assert_eq!(path.parent(), Some(config_dir().as_path()));
    }

    #[tokio::test]
    async fn completed_request_carries_its_ticket() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let request = PendingRequest {
            ticket: RequestTicket::bound(7),
            call: ApiCall::PhotomapTags {
                term: "cycle".to_string(),
            },
        };
        spawn_request(Arc::new(ScriptedClient), request.clone(), tx);

        let Some(ApiMessage::Completed { request: done, result }) = rx.recv().await else {
            panic!("no completion received");
        };
        assert_eq!(done, request);
        assert_eq!(result, Ok(ApiReply::Tags(vec!["cycleparking".to_string()])));
    }

    #[tokio::test]
    async fn failures_are_delivered_too() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let request = PendingRequest {
            ticket: RequestTicket::unbound(),
            call: ApiCall::ResetPassword {
                email: "rider@example.org".to_string(),
            },
        };
        spawn_request(Arc::new(ScriptedClient), request, tx);

        let Some(ApiMessage::Completed { result, .. }) = rx.recv().await else {
            panic!("no completion received");
        };
        assert!(matches!(result, Err(ApiError::Transport(_))));
    }
}
