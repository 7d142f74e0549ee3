// src/core/mod.rs — Edit history, dispatch, and session state

pub mod dispatcher;
pub mod export;
pub mod history;
pub mod presets;
pub mod preview;
pub mod session;
pub mod snapshot;
