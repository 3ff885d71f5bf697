use thiserror::Error;

/// Errors raised by the geocoding and forecast clients.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("request to {endpoint} failed")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} responded with status {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("no data")]
    NoData,

    #[error("failed to decode {endpoint} response")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn is_decode(&self) -> bool {
        matches!(self, FetchError::Decode { .. })
    }
}

/// Why the current device position could not be obtained.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("Location access is denied. Please enable it in Settings.")]
    PermissionDenied,
    #[error("Location service unavailable: {0}")]
    Unavailable(String),
}

/// Errors from the "use current location" flow.
#[derive(Debug, Error)]
pub enum LocateError {
    #[error(transparent)]
    Location(#[from] LocationError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let cut = (0..=MAX).rev().find(|i| body.is_char_boundary(*i)).unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}
