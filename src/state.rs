//! UI-agnostic upload state
//!
//! `UploadState` holds what the form shows and is shared by the TUI and the
//! headless `analyze` command. Network work happens elsewhere; this module
//! only owns the transitions around it.

use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::AnalyzeError;
use crate::result::ScoreResult;

pub const DEFAULT_TARGET_ROLE: &str = "Data Analyst";

/// A resume loaded into memory, ready to be posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ResumeFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub fn load(path: &Path) -> Result<Self, AnalyzeError> {
        let bytes = fs::read(path).map_err(|source| AnalyzeError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "resume.pdf".to_string());

        Ok(Self::new(file_name, bytes))
    }
}

/// One dispatch of the analyze action, built from the state at trigger time.
#[derive(Debug, Clone)]
pub struct AnalyzeRequest {
    pub request_id: u64,
    pub file: ResumeFile,
    pub target_role: String,
}

#[derive(Debug, Clone)]
pub struct UploadState {
    pub selected_file: Option<ResumeFile>,
    pub target_role: String,
    pub is_loading: bool,
    pub error_message: Option<String>,
    pub result: Option<ScoreResult>,
    latest_request: u64,
}

impl Default for UploadState {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_ROLE)
    }
}

impl UploadState {
    pub fn new(target_role: impl Into<String>) -> Self {
        Self {
            selected_file: None,
            target_role: target_role.into(),
            is_loading: false,
            error_message: None,
            result: None,
            latest_request: 0,
        }
    }

    pub fn set_file(&mut self, file: Option<ResumeFile>) {
        self.selected_file = file;
    }

    pub fn set_role(&mut self, role: impl Into<String>) {
        self.target_role = role.into();
    }

    /// Surface a local problem (bad path, nothing selected) without touching
    /// the request lifecycle.
    pub fn report_input_error(&mut self, err: &AnalyzeError) {
        self.result = None;
        self.error_message = Some(err.display_message());
    }

    /// Start phase. Clears the previous outcome and, if a file is selected,
    /// marks the state as loading and hands back the request to send.
    pub fn begin_analysis(&mut self) -> Result<AnalyzeRequest, AnalyzeError> {
        self.error_message = None;
        self.result = None;

        let Some(file) = self.selected_file.clone() else {
            let err = AnalyzeError::NoFileSelected;
            self.report_input_error(&err);
            return Err(err);
        };

        self.latest_request += 1;
        self.is_loading = true;

        Ok(AnalyzeRequest {
            request_id: self.latest_request,
            file,
            target_role: self.target_role.clone(),
        })
    }

    /// Success or failure phase. Returns false when the outcome belongs to a
    /// request that has since been superseded; such outcomes are dropped.
    pub fn complete_analysis(
        &mut self,
        request_id: u64,
        outcome: Result<ScoreResult, AnalyzeError>,
    ) -> bool {
        if request_id != self.latest_request {
            debug!(
                "Dropping stale analysis response {} (latest is {})",
                request_id, self.latest_request
            );
            return false;
        }

        self.is_loading = false;
        match outcome {
            Ok(result) => {
                self.error_message = None;
                self.result = Some(result);
            }
            Err(err) => {
                self.result = None;
                self.error_message = Some(err.display_message());
            }
        }
        true
    }

    pub fn latest_request_id(&self) -> u64 {
        self.latest_request
    }
}
