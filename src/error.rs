//! Error types.
//!
//! - `AppError`: fatal, carries the process exit code (2 = input/filesystem, 4 = data)
//! - `FetchError`: remote acquisition failures, recovered by the resolver
//! - `ChartError`: per-chart failures, collected into the workflow report

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Why a remote fetch produced no usable dataset.
///
/// Callers treat every variant the same way ("remote acquisition failed");
/// the variants only exist so the reason can be reported.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("schema error: {0}")]
    Schema(String),

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Schema(format!("undecodable response body: {err}"))
        } else {
            FetchError::Connection(err.to_string())
        }
    }
}

/// Failure producing one chart artifact.
#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("nothing to plot: {0}")]
    NothingToPlot(String),

    #[error("drawing failed: {0}")]
    Draw(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Invariant violation on a single ad performance record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("campaign name is empty")]
    EmptyCampaign,

    #[error("ad group name is empty")]
    EmptyAdGroup,

    #[error("clicks ({clicks}) exceed impressions ({impressions})")]
    ClicksExceedImpressions { clicks: u64, impressions: u64 },

    #[error("cost must be a finite, non-negative number (got {0})")]
    InvalidCost(String),
}
