// src/core/dispatcher.rs — Single-flight edit dispatcher
//
// Owns the history and the user-visible message slot. At most one
// generation request is outstanding; a second `submit` while one is in
// flight is rejected with `AlreadyInProgress` and never reaches the
// generator. The history lock is never held across the generator call.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::history::History;
use crate::core::snapshot::{ImageData, Snapshot};
use crate::infra::errors::PixshopError;
use crate::provider::ImageGenerator;

pub const NO_IMAGE_MESSAGE: &str = "Please upload an image first.";
pub const EMPTY_INSTRUCTION_MESSAGE: &str = "Please enter a description for your edit.";
pub const FAILURE_PREFIX: &str = "Failed to generate the image.";

/// Lifecycle notifications for a submitted edit.
#[derive(Debug, Clone, PartialEq)]
pub enum EditEvent {
    Started {
        base_seq: u64,
        instruction: String,
    },
    Committed {
        seq: u64,
        version: usize,
        versions: usize,
    },
    Failed {
        message: String,
    },
}

type ProgressFn = Box<dyn Fn(EditEvent) + Send + Sync>;

#[derive(Default)]
struct EditorState {
    history: History,
    error: Option<String>,
}

pub struct Dispatcher {
    generator: Arc<dyn ImageGenerator>,
    state: Mutex<EditorState>,
    in_flight: AtomicBool,
    progress: Option<ProgressFn>,
}

/// Holds the in-flight flag; dropping it releases the flag on every exit
/// path of `submit`, including early returns and unwinding.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Dispatcher {
    pub fn new(generator: Arc<dyn ImageGenerator>) -> Self {
        Self {
            generator,
            state: Mutex::new(EditorState::default()),
            in_flight: AtomicBool::new(false),
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: impl Fn(EditEvent) + Send + Sync + 'static) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    /// Send the current image and `instruction` to the generator and commit
    /// the result.
    pub async fn submit(&self, instruction: &str) -> Result<Snapshot, PixshopError> {
        let Some(_in_flight) = InFlight::acquire(&self.in_flight) else {
            tracing::debug!("Submission dropped: an edit is already in progress");
            return Err(PixshopError::AlreadyInProgress);
        };

        let base = {
            let mut state = self.lock();
            let Some(current) = state.history.current().cloned() else {
                state.error = Some(NO_IMAGE_MESSAGE.into());
                return Err(PixshopError::invalid_input(NO_IMAGE_MESSAGE));
            };
            if instruction.trim().is_empty() {
                state.error = Some(EMPTY_INSTRUCTION_MESSAGE.into());
                return Err(PixshopError::invalid_input(EMPTY_INSTRUCTION_MESSAGE));
            }
            state.error = None;
            current
        };

        tracing::info!(base_seq = base.seq(), model = self.generator.model(), "Edit submitted");
        self.emit(EditEvent::Started {
            base_seq: base.seq(),
            instruction: instruction.to_string(),
        });

        let result = self
            .generator
            .generate(&base, instruction)
            .await
            .and_then(|uri| self.decode_result(&uri));

        let committed = {
            let mut state = self.lock();
            result.and_then(|image| {
                let snapshot = state.history.commit(image)?.clone();
                state.error = None;
                let version = state.history.cursor().unwrap_or(0) + 1;
                Ok((snapshot, version, state.history.len()))
            })
        };

        match committed {
            Ok((snapshot, version, versions)) => {
                tracing::info!(seq = snapshot.seq(), version, versions, "Edit committed");
                self.emit(EditEvent::Committed {
                    seq: snapshot.seq(),
                    version,
                    versions,
                });
                Ok(snapshot)
            }
            Err(e) => {
                let message = self.record_failure(&e);
                self.emit(EditEvent::Failed { message });
                Err(e)
            }
        }
    }

    /// Decode a generator result. Anything that is not an image counts as a
    /// failed generation, not as bad user input.
    fn decode_result(&self, uri: &str) -> Result<ImageData, PixshopError> {
        let image = ImageData::from_data_uri(uri)
            .map_err(|e| PixshopError::generation(self.generator.id(), e.detail()))?;
        if !image.is_image() {
            return Err(PixshopError::generation(
                self.generator.id(),
                format!("The model returned {} instead of an image.", image.media_type()),
            ));
        }
        Ok(image)
    }

    /// Put "Failed to generate the image. <detail>" in the message slot and
    /// return it. History is left as it was.
    pub fn record_failure(&self, error: &PixshopError) -> String {
        let message = format!("{} {}", FAILURE_PREFIX, error.detail());
        self.lock().error = Some(message.clone());
        tracing::warn!("{}", message);
        message
    }

    /// Replace the history with a freshly uploaded image.
    pub fn load(&self, image: ImageData) -> Result<Snapshot, PixshopError> {
        let mut state = self.lock();
        match state.history.load(image).cloned() {
            Ok(snapshot) => {
                state.error = None;
                Ok(snapshot)
            }
            Err(e) => {
                state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn undo(&self) -> bool {
        self.lock().history.undo()
    }

    pub fn redo(&self) -> bool {
        self.lock().history.redo()
    }

    pub fn reset_to_original(&self) -> bool {
        self.lock().history.reset_to_original()
    }

    /// Drop the image and every edit ("new image").
    pub fn clear(&self) {
        let mut state = self.lock();
        state.history.clear();
        state.error = None;
    }

    pub fn current(&self) -> Option<Snapshot> {
        self.lock().history.current().cloned()
    }

    /// Read-only access to the history.
    pub fn with_history<R>(&self, f: impl FnOnce(&History) -> R) -> R {
        f(&self.lock().history)
    }

    pub fn can_undo(&self) -> bool {
        self.lock().history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.lock().history.can_redo()
    }

    /// The single user-visible message slot.
    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn dismiss_error(&self) {
        self.lock().error = None;
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn lock(&self) -> MutexGuard<'_, EditorState> {
        // History mutations cannot leave partial state; poison is harmless.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn emit(&self, event: EditEvent) {
        if let Some(ref cb) = self.progress {
            cb(event);
        }
    }
}
