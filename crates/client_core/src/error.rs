use shared::error::ApiException;
use thiserror::Error;

/// A call to the food API that did not produce a usable response.
#[derive(Debug, Error)]
pub enum RemoteCallError {
    #[error("invalid food api url: {0}")]
    Url(#[from] url::ParseError),
    #[error("food api transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("food api rejected request with status {status}: {source}")]
    Rejected {
        status: u16,
        #[source]
        source: ApiException,
    },
    #[error("food api responded with status {status}")]
    Status { status: u16 },
}

impl RemoteCallError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } | Self::Status { status } => Some(*status),
            Self::Transport(err) => err.status().map(|s| s.as_u16()),
            Self::Url(_) => None,
        }
    }
}
