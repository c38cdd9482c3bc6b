use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("feed responded with HTTP {status}")]
    Status { status: u16 },

    #[error("malformed feed body: {0}")]
    Malformed(String),

    #[error("invalid feed url: {0}")]
    InvalidUrl(String),
}

impl FeedError {
    /// Message shown to the user in place of (or above) the earthquake list.
    pub fn user_message(&self) -> String {
        match self {
            FeedError::Transport(_) => "Network error while contacting the earthquake feed".to_string(),
            FeedError::Timeout(_) => "The earthquake feed took too long to respond".to_string(),
            FeedError::Status { status } => format!("Request failed with status code {status}"),
            FeedError::Malformed(_) => "The earthquake feed returned data that could not be read".to_string(),
            FeedError::InvalidUrl(url) => format!("Invalid feed URL: {url}"),
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            FeedError::Timeout(timeout)
        } else if let Some(status) = err.status() {
            FeedError::Status {
                status: status.as_u16(),
            }
        } else if err.is_decode() {
            FeedError::Malformed(err.to_string())
        } else {
            FeedError::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FeedError;

    #[test]
    fn status_message_names_the_code() {
        let err = FeedError::Status { status: 500 };
        assert_eq!(err.user_message(), "Request failed with status code 500");
        assert_eq!(err.to_string(), "feed responded with HTTP 500");
    }
}
