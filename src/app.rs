use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::client::ScoringClient;
use crate::error::AnalyzeError;
use crate::result::ScoreResult;
use crate::state::{ResumeFile, UploadState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    File,
    Role,
    Analyze,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::File => Focus::Role,
            Focus::Role => Focus::Analyze,
            Focus::Analyze => Focus::File,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Focus::File => Focus::Analyze,
            Focus::Role => Focus::File,
            Focus::Analyze => Focus::Role,
        }
    }
}

/// Single-line editable text with a char-indexed cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField {
    pub value: String,
    pub cursor: usize,
}

impl TextField {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.chars().count();
        Self { value, cursor }
    }

    pub fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.value, self.cursor);
        self.value.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.value, self.cursor);
            self.value.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.value.chars().count() {
            let byte_pos = char_to_byte_index(&self.value, self.cursor);
            self.value.remove(byte_pos);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.value.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.end();
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

type AnalysisTask = JoinHandle<Result<ScoreResult, AnalyzeError>>;

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: Focus,
    pub upload: UploadState,

    // Form fields
    pub path_input: TextField,
    pub role_input: TextField,

    // PDF picker popup
    pub show_picker: bool,
    pub picker_dir: PathBuf,
    pub picker_entries: Vec<PathBuf>,
    pub picker_state: ListState,

    // Results panel
    pub show_debug: bool,
    pub results_scroll: u16,
    /// Set on each draw from the wrapped height of the details text.
    pub results_max_scroll: u16,
    pub results_area: Option<Rect>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    pub client: ScoringClient,
    analysis: Option<(u64, AnalysisTask)>,
}

impl App {
    pub fn new(client: ScoringClient, target_role: impl Into<String>, picker_dir: PathBuf) -> Self {
        let upload = UploadState::new(target_role);
        let role_input = TextField::new(upload.target_role.clone());

        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            focus: Focus::File,
            upload,

            path_input: TextField::default(),
            role_input,

            show_picker: false,
            picker_dir,
            picker_entries: Vec::new(),
            picker_state: ListState::default(),

            show_debug: false,
            results_scroll: 0,
            results_max_scroll: 0,
            results_area: None,

            animation_frame: 0,

            client,
            analysis: None,
        }
    }

    pub fn api_base_url(&self) -> String {
        self.client.base_url()
    }

    /// Load a resume from disk into the form. Read failures are shown in the
    /// error region and leave the current selection alone.
    pub fn load_file(&mut self, path: &Path) {
        match ResumeFile::load(path) {
            Ok(file) => {
                info!("Selected {} ({} bytes)", path.display(), file.bytes.len());
                self.path_input.set(path.display().to_string());
                self.upload.set_file(Some(file));
            }
            Err(err) => {
                warn!("{}", err);
                self.upload.report_input_error(&err);
            }
        }
    }

    pub fn commit_path_input(&mut self) {
        let typed = self.path_input.value.trim().to_string();
        if typed.is_empty() {
            self.upload.set_file(None);
            return;
        }
        self.load_file(&PathBuf::from(typed));
    }

    pub fn sync_role(&mut self) {
        self.upload.set_role(self.role_input.value.clone());
    }

    /// Analyze button. Ignored while a request is in flight.
    pub fn trigger(&mut self) {
        if self.upload.is_loading {
            return;
        }

        let request = match self.upload.begin_analysis() {
            Ok(request) => request,
            Err(_) => return,
        };

        self.results_scroll = 0;
        let client = self.client.clone();
        let request_id = request.request_id;
        let task = tokio::spawn(async move { client.analyze(&request).await });
        self.analysis = Some((request_id, task));
    }

    pub fn has_pending_analysis(&self) -> bool {
        self.analysis.is_some()
    }

    /// Apply the in-flight analysis if it has finished. Called from the event
    /// loop after every event.
    pub async fn poll_analysis(&mut self) {
        let finished = self
            .analysis
            .as_ref()
            .is_some_and(|(_, task)| task.is_finished());
        if finished {
            self.settle_analysis().await;
        }
    }

    /// Wait for the in-flight analysis, if any, and apply its outcome.
    pub async fn settle_analysis(&mut self) {
        let Some((request_id, task)) = self.analysis.take() else {
            return;
        };

        let outcome = match task.await {
            Ok(outcome) => outcome,
            Err(join_err) => Err(AnalyzeError::Task(join_err.to_string())),
        };
        if let Err(err) = &outcome {
            warn!("Analysis {} failed: {}", request_id, err);
        }
        self.upload.complete_analysis(request_id, outcome);
    }

    // Picker
    pub fn open_picker(&mut self) {
        match pdf_files_in(&self.picker_dir) {
            Ok(entries) => {
                self.picker_entries = entries;
                let selected = if self.picker_entries.is_empty() { None } else { Some(0) };
                self.picker_state.select(selected);
                self.show_picker = true;
            }
            Err(err) => {
                warn!("{}", err);
                self.upload.report_input_error(&err);
            }
        }
    }

    pub fn picker_nav_down(&mut self) {
        let len = self.picker_entries.len();
        if len > 0 {
            let i = self.picker_state.selected().unwrap_or(0);
            self.picker_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn picker_nav_up(&mut self) {
        let i = self.picker_state.selected().unwrap_or(0);
        self.picker_state.select(Some(i.saturating_sub(1)));
    }

    pub fn choose_picked(&mut self) {
        let picked = self
            .picker_state
            .selected()
            .and_then(|i| self.picker_entries.get(i))
            .cloned();
        self.show_picker = false;
        if let Some(path) = picked {
            self.load_file(&path);
        }
    }

    // Results panel
    pub fn toggle_debug(&mut self) {
        self.show_debug = !self.show_debug;
    }

    pub fn scroll_results_down(&mut self, lines: u16) {
        if self.upload.result.is_some() {
            self.results_scroll = self
                .results_scroll
                .saturating_add(lines)
                .min(self.results_max_scroll);
        }
    }

    pub fn scroll_results_up(&mut self, lines: u16) {
        self.results_scroll = self.results_scroll.saturating_sub(lines);
    }

    pub fn tick_animation(&mut self) {
        if self.upload.is_loading {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }
}

/// PDF files directly inside `dir`, sorted by file name.
pub fn pdf_files_in(dir: &Path) -> Result<Vec<PathBuf>, AnalyzeError> {
    let read_err = |source| AnalyzeError::FileRead {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(read_err)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("pdf"))
        })
        .collect();

    entries.sort_by_key(|path| path.file_name().map(|n| n.to_os_string()));
    Ok(entries)
}
