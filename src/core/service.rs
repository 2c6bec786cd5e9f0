//! Seam between the app and the remote generation backend.

use std::error::Error;
use std::fmt;

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::api::Content;
use crate::core::credential::Credential;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The request never produced an HTTP response, or the body broke off.
    Transport(String),
    /// The service answered with an error, either as a status or inline.
    Api {
        status: Option<u16>,
        message: String,
    },
    /// A payload arrived that could not be decoded.
    Malformed(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Transport(message) => write!(f, "network error: {message}"),
            ServiceError::Api {
                status: Some(status),
                message,
            } => write!(f, "{message} (HTTP {status})"),
            ServiceError::Api {
                status: None,
                message,
            } => f.write_str(message),
            ServiceError::Malformed(message) => write!(f, "unexpected response: {message}"),
        }
    }
}

impl Error for ServiceError {}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        ServiceError::Transport(err.to_string())
    }
}

/// Lazy, finite sequence of text fragments for one exchange.
pub type FragmentStream = BoxStream<'static, Result<String, ServiceError>>;

/// Everything needed to open one streamed exchange.
#[derive(Clone, Debug)]
pub struct StreamRequest {
    pub credential: Credential,
    pub model: String,
    pub system_instruction: Option<String>,
    /// Prior committed turns, oldest first, not including `message`.
    pub history: Vec<Content>,
    pub message: String,
}

impl StreamRequest {
    /// Full `contents` array: history followed by the new user turn.
    pub fn contents(&self) -> Vec<Content> {
        let mut contents = self.history.clone();
        contents.push(Content::user(self.message.clone()));
        contents
    }
}

#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Single non-streamed request; used by the credential probe.
    async fn generate_once(
        &self,
        credential: &Credential,
        model: &str,
        text: &str,
    ) -> Result<String, ServiceError>;

    /// Opens a streamed exchange. Errors raised before the first fragment
    /// are returned directly; later ones arrive as stream items.
    async fn open_stream(&self, request: StreamRequest) -> Result<FragmentStream, ServiceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contents_append_the_new_turn_after_history() {
        let request = StreamRequest {
            credential: Credential::new("k"),
            model: "m".into(),
            system_instruction: None,
            history: vec![Content::model("Hello!"), Content::user("a"), Content::model("b")],
            message: "c".into(),
        };
        let contents = request.contents();
        assert_eq!(contents.len(), 4);
        assert_eq!(contents[3], Content::user("c"));
    }

    #[test]
    fn api_error_display_includes_status_when_known() {
        let err = ServiceError::Api {
            status: Some(403),
            message: "PERMISSION_DENIED: nope".into(),
        };
        assert_eq!(err.to_string(), "PERMISSION_DENIED: nope (HTTP 403)");
        let inline = ServiceError::Api {
            status: None,
            message: "quota".into(),
        };
        assert_eq!(inline.to_string(), "quota");
    }
}
