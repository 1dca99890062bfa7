pub mod api;
pub mod auth;
pub mod registration;
pub mod session;

use thiserror::Error;

/// Client-side failure taxonomy. Validation carries the localized message
/// shown next to the form field; Api carries whatever the server put in the
/// {error} body. No retries anywhere, a failed call is terminal.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0}")]
    Validation(String),

    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("session storage failed: {0}")]
    Session(#[source] anyhow::Error),

    #[error("not logged in")]
    NotLoggedIn,

    #[error("unknown provider: {0}")]
    UnknownProvider(String),
}
