use thiserror::Error;

/// Failures surfaced by the upstream client. Every call is attempted once.
#[derive(Debug, Error)]
pub enum ChessComError {
    /// Upstream answered 404 for the requested player, title or archive.
    #[error("{0} not found")]
    NotFound(String),

    /// Non-2xx status other than 404, transport failure or undecodable body.
    #[error("upstream error: {message}")]
    Upstream {
        status: Option<u16>,
        message: String,
    },

    #[error("upstream request timed out: {0}")]
    Timeout(String),
}

impl ChessComError {
    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    pub(crate) fn from_transport(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(url.to_string())
        } else if err.is_decode() {
            Self::upstream(
                err.status().map(|s| s.as_u16()),
                format!("malformed response from {url}: {err}"),
            )
        } else {
            Self::upstream(
                err.status().map(|s| s.as_u16()),
                format!("request to {url} failed: {err}"),
            )
        }
    }
}
