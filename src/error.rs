use thiserror::Error;

/// Fatal errors of a run. Anything surfaced here stops the remaining phases.
///
/// Per-item anomalies (an unexpected response code on a report or an
/// evaluation) are never turned into a `RunError`; the batch logs them and
/// moves on.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("no tag group registered for {0} stars")]
    UnknownRating(u8),

    #[error("failed to create API client: {0}")]
    ClientInit(String),

    #[error("session is not logged in")]
    NotLoggedIn,

    #[error("account is not a music partner (code {code}): {message}")]
    NotAPartner { code: i64, message: String },

    #[error("account is not eligible for evaluation (status {0})")]
    Ineligible(String),

    #[error("partner status query failed (code {code}): {message}")]
    StatusQueryFailed { code: i64, message: String },

    #[error("failed to fetch {batch} batch: {message}")]
    BatchFetchFailed { batch: &'static str, message: String },

    #[error("{call} request failed: {message}")]
    Transport { call: &'static str, message: String },
}

impl RunError {
    pub(crate) fn transport(call: &'static str, err: anyhow::Error) -> Self {
        RunError::Transport {
            call,
            message: format!("{:#}", err),
        }
    }
}
