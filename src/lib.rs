pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod handler;
pub mod result;
pub mod state;
pub mod tui;
pub mod ui;
pub mod view;

// Re-export main types for convenience
pub use app::App;
pub use client::ScoringClient;
pub use config::{ApiConfig, Config};
pub use error::AnalyzeError;
pub use result::ScoreResult;
pub use state::{AnalyzeRequest, ResumeFile, UploadState};
