// src/core/session.rs — Editor session: the state behind one editing window
//
// Owns the view-level state (active tool, prompt draft, preview file) and
// drives the dispatcher. Edits run as fire-and-forget tokio tasks; their
// outcomes arrive on the receiver returned by `EditorSession::new` and are
// handed back through `finish`. Nothing here is global: dropping the session
// releases the preview file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::core::dispatcher::Dispatcher;
use crate::core::export;
use crate::core::presets::Tool;
use crate::core::preview::Preview;
use crate::core::snapshot::{ImageData, Snapshot};
use crate::infra::config::OutputConfig;
use crate::infra::errors::PixshopError;

pub type EditOutcome = Result<Snapshot, PixshopError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Started,
    /// Another edit is outstanding; the request was ignored.
    Dropped,
}

/// Point-in-time view of the session for status lines.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStatus {
    pub tool: Tool,
    pub versions: usize,
    /// 1-based position of the current version, 0 when no image is loaded.
    pub version: usize,
    pub can_undo: bool,
    pub can_redo: bool,
    pub busy: bool,
    pub error: Option<String>,
    pub preview: Option<PathBuf>,
}

pub struct EditorSession {
    dispatcher: Arc<Dispatcher>,
    tool: Tool,
    prompt: String,
    preview: Preview,
    output: OutputConfig,
    outcomes: mpsc::UnboundedSender<EditOutcome>,
    awaiting: bool,
}

impl EditorSession {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        output: OutputConfig,
        preview_dir: impl Into<PathBuf>,
    ) -> (Self, mpsc::UnboundedReceiver<EditOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Self {
            dispatcher,
            tool: Tool::default(),
            prompt: String::new(),
            preview: Preview::new(preview_dir),
            output,
            outcomes: tx,
            awaiting: false,
        };
        (session, rx)
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    /// The last free-text instruction that has not yet produced an edit.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn preview_path(&self) -> Option<&Path> {
        self.preview.path()
    }

    pub fn is_busy(&self) -> bool {
        self.awaiting || self.dispatcher.is_busy()
    }

    /// Upload an image from disk, replacing the whole history.
    pub async fn open(&mut self, path: &Path) -> Result<Snapshot, PixshopError> {
        self.ensure_idle()?;
        let image = match ImageData::read(path).await {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!("Cannot read {}: {}", path.display(), e);
                return Err(e);
            }
        };
        self.open_image(image)
    }

    pub fn open_image(&mut self, image: ImageData) -> Result<Snapshot, PixshopError> {
        self.ensure_idle()?;
        let snapshot = self.dispatcher.load(image)?;
        self.tool = Tool::Magic;
        self.sync_preview();
        Ok(snapshot)
    }

    /// Forget the current image ("new image").
    pub fn new_image(&mut self) -> Result<(), PixshopError> {
        self.ensure_idle()?;
        self.dispatcher.clear();
        self.prompt.clear();
        self.sync_preview();
        Ok(())
    }

    pub fn undo(&mut self) -> Result<bool, PixshopError> {
        self.ensure_idle()?;
        let changed = self.dispatcher.undo();
        self.sync_preview();
        Ok(changed)
    }

    pub fn redo(&mut self) -> Result<bool, PixshopError> {
        self.ensure_idle()?;
        let changed = self.dispatcher.redo();
        self.sync_preview();
        Ok(changed)
    }

    pub fn reset(&mut self) -> Result<bool, PixshopError> {
        self.ensure_idle()?;
        let changed = self.dispatcher.reset_to_original();
        self.sync_preview();
        Ok(changed)
    }

    /// Free-text edit from the magic tool. The text is kept as the prompt
    /// draft until an edit succeeds.
    pub fn submit_prompt(&mut self, text: &str) -> Submission {
        if self.is_busy() {
            tracing::debug!("Prompt ignored while an edit is in progress");
            return Submission::Dropped;
        }
        self.prompt = text.trim().to_string();
        let prompt = self.prompt.clone();
        self.submit(prompt)
    }

    /// Submit the kept prompt draft again, e.g. after a failure.
    pub fn retry(&mut self) -> Option<Submission> {
        if self.prompt.is_empty() {
            return None;
        }
        let prompt = self.prompt.clone();
        Some(self.submit(prompt))
    }

    /// Launch an edit in the background. A submission made while another is
    /// outstanding is dropped, not queued.
    pub fn submit(&mut self, instruction: impl Into<String>) -> Submission {
        if self.is_busy() {
            tracing::debug!("Submission dropped: an edit is already in progress");
            return Submission::Dropped;
        }

        self.awaiting = true;
        let dispatcher = self.dispatcher.clone();
        let outcomes = self.outcomes.clone();
        let instruction = instruction.into();
        let edit = {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move { dispatcher.submit(&instruction).await })
        };
        // Every submission yields exactly one outcome, even if the edit panics.
        tokio::spawn(async move {
            let outcome = match edit.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    let error = PixshopError::TaskFailed(if e.is_panic() {
                        "panicked".into()
                    } else {
                        "cancelled".into()
                    });
                    dispatcher.record_failure(&error);
                    Err(error)
                }
            };
            if outcomes.send(outcome).is_err() {
                tracing::debug!("Session closed before the edit finished");
            }
        });
        Submission::Started
    }

    /// Apply an outcome received from the channel.
    pub fn finish(&mut self, outcome: EditOutcome) -> EditOutcome {
        self.awaiting = false;
        if outcome.is_ok() {
            self.prompt.clear();
        }
        self.sync_preview();
        outcome
    }

    /// Save the current version; `dir` overrides the configured directory.
    pub async fn download(&self, dir: Option<&Path>) -> Result<PathBuf, PixshopError> {
        let snapshot = self
            .dispatcher
            .current()
            .ok_or_else(|| PixshopError::invalid_input("There is no image to download."))?;
        let dir = dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.output.dir_or_cwd());
        export::download(&snapshot, &dir, &self.output.prefix).await
    }

    pub fn status(&self) -> SessionStatus {
        let (versions, version, can_undo, can_redo) = self.dispatcher.with_history(|h| {
            (
                h.len(),
                h.cursor().map(|c| c + 1).unwrap_or(0),
                h.can_undo(),
                h.can_redo(),
            )
        });
        SessionStatus {
            tool: self.tool,
            versions,
            version,
            can_undo,
            can_redo,
            busy: self.is_busy(),
            error: self.dispatcher.error(),
            preview: self.preview.path().map(Path::to_path_buf),
        }
    }

    fn ensure_idle(&self) -> Result<(), PixshopError> {
        if self.is_busy() {
            return Err(PixshopError::AlreadyInProgress);
        }
        Ok(())
    }

    fn sync_preview(&mut self) {
        let current = self.dispatcher.current();
        if let Err(e) = self.preview.sync(current.as_ref()) {
            tracing::warn!("Failed to update preview: {}", e);
        }
    }
}
