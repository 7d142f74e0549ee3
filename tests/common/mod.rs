// tests/common/mod.rs — Scripted image generator shared by integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use pixshop::core::snapshot::{ImageData, Snapshot};
use pixshop::infra::errors::PixshopError;
use pixshop::provider::ImageGenerator;

/// A generator that replays canned results without any network calls.
///
/// With a gate installed, every call signals `entered` and then blocks until
/// the test calls `release`.
pub struct MockGenerator {
    responses: Mutex<VecDeque<Result<String, PixshopError>>>,
    calls: AtomicUsize,
    seen: Mutex<Vec<(u64, String)>>,
    gate: Option<(Arc<Notify>, Arc<Notify>)>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub fn gated() -> Self {
        Self {
            gate: Some((Arc::new(Notify::new()), Arc::new(Notify::new()))),
            ..Self::new()
        }
    }

    /// Queue an image whose bytes are `tag`.
    pub fn then_image(self, tag: &str) -> Self {
        let uri = png(tag).to_data_uri();
        self.responses.lock().unwrap().push_back(Ok(uri));
        self
    }

    pub fn then_raw(self, uri: &str) -> Self {
        self.responses.lock().unwrap().push_back(Ok(uri.to_string()));
        self
    }

    pub fn then_error(self, message: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(PixshopError::generation("mock", message)));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// (base snapshot seq, instruction) for every call, in order.
    pub fn seen(&self) -> Vec<(u64, String)> {
        self.seen.lock().unwrap().clone()
    }

    pub async fn wait_entered(&self) {
        if let Some((entered, _)) = &self.gate {
            entered.notified().await;
        }
    }

    pub fn release(&self) {
        if let Some((_, release)) = &self.gate {
            release.notify_one();
        }
    }
}

#[async_trait]
impl ImageGenerator for MockGenerator {
    fn id(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-image"
    }

    async fn generate(&self, image: &Snapshot, instruction: &str) -> Result<String, PixshopError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((image.seq(), instruction.to_string()));

        if let Some((entered, release)) = &self.gate {
            entered.notify_one();
            release.notified().await;
        }

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(PixshopError::generation("mock", "no scripted response")))
    }
}

pub fn png(tag: &str) -> ImageData {
    ImageData::new("image/png", tag.as_bytes().to_vec())
}

pub fn tag(snapshot: &Snapshot) -> String {
    String::from_utf8(snapshot.bytes().to_vec()).unwrap()
}
