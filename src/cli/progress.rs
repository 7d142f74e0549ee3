// src/cli/progress.rs — Terminal renderer for edit events

use crate::core::dispatcher::EditEvent;
use crate::util::ellipsize;

/// Render an edit event as a single line.
pub fn format_event(event: &EditEvent) -> String {
    match event {
        EditEvent::Started { instruction, .. } => {
            format!("[edit] working on \"{}\"", ellipsize(instruction.trim(), 60))
        }
        EditEvent::Committed {
            version, versions, ..
        } => format!("[done] version {}/{}", version, versions),
        EditEvent::Failed { message } => format!("[error] {}", message),
    }
}

/// Build a progress callback that writes formatted output to stderr.
///
/// All progress output goes to stderr so stdout stays clean for paths.
pub fn terminal_progress() -> impl Fn(EditEvent) + Send + Sync + 'static {
    move |event| eprintln!("{}", format_event(&event))
}
