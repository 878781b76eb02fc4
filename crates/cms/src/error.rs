use reqwest::StatusCode;

/// Failures of a CMS fetch.
///
/// Adapters catch transport failures per resource and keep going; only
/// `MissingSettings` and failures of the primary item request reach callers.
#[derive(Debug, thiserror::Error)]
pub enum CmsError {
    #[error("{source_name} is missing required settings: {}", missing.join(", "))]
    MissingSettings {
        source_name: &'static str,
        missing: Vec<&'static str>,
    },

    #[error("unknown data source type {0:?}")]
    UnknownSource(String),

    #[error("API key cannot be used in an Authorization header")]
    InvalidApiKey(#[source] reqwest::header::InvalidHeaderValue),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} from {url}")]
    Status { url: String, status: StatusCode },

    #[error("unexpected response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl CmsError {
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingSettings { .. } | Self::UnknownSource(_) | Self::InvalidApiKey(_)
        )
    }
}
