use std::path::PathBuf;
use thiserror::Error;

/// Shown when a failure carries no message of its own.
pub const GENERIC_FAILURE: &str = "Failed to fetch";

/// Everything that can go wrong between pressing Analyze and showing a result.
///
/// All variants are caught at the action boundary and turned into the single
/// error line the form displays; none of them escape into rendering.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("Please choose a resume PDF first.")]
    NoFileSelected,

    #[error("Could not read {}: {}", .path.display(), .source)]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The request never completed. Holds the lowest-level cause reqwest
    /// reported, which may be empty.
    #[error("{}", or_generic(.0))]
    Transport(String),

    #[error("{}", server_message(.status, .body))]
    Server { status: u16, body: Option<String> },

    #[error("Unexpected response from scoring service: {0}")]
    Parse(String),

    #[error("Analysis task stopped unexpectedly: {0}")]
    Task(String),
}

impl AnalyzeError {
    /// Text for the form's error region.
    pub fn display_message(&self) -> String {
        self.to_string()
    }

    /// Problems the user can fix locally, before anything is sent.
    pub fn is_user_input(&self) -> bool {
        matches!(self, AnalyzeError::NoFileSelected | AnalyzeError::FileRead { .. })
    }
}

impl From<reqwest::Error> for AnalyzeError {
    fn from(err: reqwest::Error) -> Self {
        let mut cause: &dyn std::error::Error = &err;
        while let Some(source) = cause.source() {
            cause = source;
        }
        AnalyzeError::Transport(cause.to_string())
    }
}

fn or_generic(message: &str) -> &str {
    match message.trim() {
        "" => GENERIC_FAILURE,
        trimmed => trimmed,
    }
}

fn server_message(status: &u16, body: &Option<String>) -> String {
    match body.as_deref().map(str::trim).filter(|b| !b.is_empty()) {
        Some(details) => format!("API error {}. Details: {}", status, details),
        None => format!("API error {}.", status),
    }
}
