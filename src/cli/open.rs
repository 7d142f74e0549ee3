// src/cli/open.rs — Interactive editing session (REPL)

use std::path::Path;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::core::dispatcher::Dispatcher;
use crate::core::presets::{self, Tool};
use crate::core::session::{EditOutcome, EditorSession, Submission};
use crate::infra::config::Config;
use crate::infra::errors::PixshopError;
use crate::infra::paths;
use crate::provider::ImageGenerator;

enum Flow {
    Continue,
    Quit,
}

/// Run the interactive session until EOF or `/quit`.
pub async fn run_open(
    generator: Arc<dyn ImageGenerator>,
    config: &Config,
    image: Option<&Path>,
    quiet: bool,
) -> anyhow::Result<()> {
    eprintln!(
        "pixshop v{} | {}/{} | /help for commands\n",
        env!("CARGO_PKG_VERSION"),
        generator.id(),
        generator.model(),
    );

    paths::ensure_dirs().await?;

    let mut dispatcher = Dispatcher::new(generator);
    if !quiet {
        dispatcher = dispatcher.with_progress(super::progress::terminal_progress());
    }
    let (mut session, mut outcomes) = EditorSession::new(
        Arc::new(dispatcher),
        config.output.clone(),
        paths::preview_dir(),
    );

    if let Some(path) = image {
        match session.open(path).await {
            Ok(_) => print_loaded(&session),
            Err(e) => report_error(&e),
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    print_prompt(&session);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::warn!("stdin: {}", e);
                        break;
                    }
                };
                if let Flow::Quit = handle_line(&mut session, line.trim()).await {
                    break;
                }
                print_prompt(&session);
            }
            Some(outcome) = outcomes.recv() => {
                report_outcome(&mut session, outcome, quiet);
                print_prompt(&session);
            }
        }
    }

    // Edits cannot be cancelled; let an outstanding one land before exiting.
    if session.is_busy() {
        eprintln!("Waiting for the current edit to finish...");
        if let Some(outcome) = outcomes.recv().await {
            report_outcome(&mut session, outcome, quiet);
        }
    }

    let status = session.status();
    eprintln!(
        "\nSession end: {} version(s). Use /download before quitting to keep a result.",
        status.versions
    );
    Ok(())
}

async fn handle_line(session: &mut EditorSession, input: &str) -> Flow {
    if input.is_empty() {
        return Flow::Continue;
    }
    if input == "quit" || input == "exit" || input == "/quit" {
        return Flow::Quit;
    }
    if input.starts_with('/') {
        handle_slash_command(session, input).await;
        return Flow::Continue;
    }

    match session.tool() {
        Tool::Magic => {
            session.submit_prompt(input);
        }
        Tool::Adjust => {
            session.submit(presets::adjustment_instruction(input));
        }
        Tool::Filter => {
            session.submit(presets::filter_instruction(input));
        }
        Tool::Advanced => submit_advanced(session, input),
    }
    Flow::Continue
}

fn submit_advanced(session: &mut EditorSession, input: &str) {
    if input.eq_ignore_ascii_case("upscale") {
        session.submit(presets::UPSCALE_INSTRUCTION);
    } else if let Some(instruction) = presets::expand_instruction(input) {
        session.submit(instruction);
    } else {
        eprintln!("  Advanced tool: type horizontal, vertical, all, or upscale.");
    }
}

async fn handle_slash_command(session: &mut EditorSession, input: &str) {
    let (cmd, arg) = match input.split_once(' ') {
        Some((cmd, arg)) => (cmd, arg.trim()),
        None => (input, ""),
    };

    match cmd {
        "/open" => {
            if arg.is_empty() {
                eprintln!("  Usage: /open <image>");
                return;
            }
            match session.open(Path::new(arg)).await {
                Ok(_) => print_loaded(session),
                Err(e) => report_error(&e),
            }
        }

        "/new" => match session.new_image() {
            Ok(()) => eprintln!("  Cleared. /open <image> to start again."),
            Err(e) => report_error(&e),
        },

        "/undo" => match session.undo() {
            Ok(true) => print_position(session),
            Ok(false) => eprintln!("  Nothing to undo."),
            Err(e) => report_error(&e),
        },

        "/redo" => match session.redo() {
            Ok(true) => print_position(session),
            Ok(false) => eprintln!("  Nothing to redo."),
            Err(e) => report_error(&e),
        },

        "/reset" => match session.reset() {
            Ok(true) => eprintln!("  Back to the original."),
            Ok(false) => eprintln!("  No edits to reset."),
            Err(e) => report_error(&e),
        },

        "/download" => {
            let dir = (!arg.is_empty()).then(|| Path::new(arg));
            match session.download(dir).await {
                Ok(path) => println!("{}", path.display()),
                Err(e) => report_error(&e),
            }
        }

        "/tool" => {
            if arg.is_empty() {
                eprintln!("  Current tool: {}", session.tool().title());
                eprintln!("  Usage: /tool <magic|adjust|filter|advanced>");
            } else if let Some(tool) = Tool::parse(arg) {
                session.set_tool(tool);
                eprintln!("  Tool: {}", tool.title());
            } else {
                eprintln!("  Unknown tool: {}", arg);
            }
        }

        "/adjust" => {
            if arg.is_empty() {
                session.set_tool(Tool::Adjust);
                print_tool_presets(Tool::Adjust);
            } else {
                session.submit(presets::adjustment_instruction(arg));
            }
        }

        "/filter" => {
            if arg.is_empty() {
                session.set_tool(Tool::Filter);
                print_tool_presets(Tool::Filter);
            } else {
                session.submit(presets::filter_instruction(arg));
            }
        }

        "/expand" => match presets::expand_instruction(arg) {
            Some(instruction) => {
                session.submit(instruction);
            }
            None => eprintln!("  Usage: /expand <horizontal|vertical|all>"),
        },

        "/upscale" => {
            session.submit(presets::UPSCALE_INSTRUCTION);
        }

        "/retry" => match session.retry() {
            Some(Submission::Started) | Some(Submission::Dropped) => {}
            None => eprintln!("  No prompt to retry."),
        },

        "/presets" => super::print_presets(),

        "/status" => {
            let s = session.status();
            eprintln!("  Tool: {}", s.tool.title());
            if s.versions == 0 {
                eprintln!("  No image loaded.");
            } else {
                eprintln!(
                    "  Version {}/{} | undo: {} | redo: {}",
                    s.version,
                    s.versions,
                    yes_no(s.can_undo),
                    yes_no(s.can_redo)
                );
            }
            if s.busy {
                eprintln!("  An edit is in progress.");
            }
            if !session.prompt().is_empty() {
                eprintln!("  Prompt: {}", session.prompt());
            }
            if let Some(ref error) = s.error {
                eprintln!("  Message: {}", error);
            }
            if let Some(ref preview) = s.preview {
                eprintln!("  Preview: {}", preview.display());
            }
        }

        "/history" => {
            let lines = session.dispatcher().with_history(|h| {
                let cursor = h.cursor();
                h.iter()
                    .enumerate()
                    .map(|(i, s)| {
                        let marker = if Some(i) == cursor { "*" } else { " " };
                        let label = if i == 0 { "original" } else { "edit" };
                        format!(
                            "  {}{}. {:<8} {} ({} bytes)",
                            marker,
                            i + 1,
                            label,
                            s.media_type(),
                            s.bytes().len()
                        )
                    })
                    .collect::<Vec<_>>()
            });
            if lines.is_empty() {
                eprintln!("  No image loaded.");
            }
            for line in lines {
                eprintln!("{}", line);
            }
        }

        "/dismiss" => session.dispatcher().dismiss_error(),

        "/help" => {
            eprintln!("Type an instruction to edit the image with the current tool.");
            eprintln!("Slash commands:");
            eprintln!("  /open <image>          Load an image (replaces history)");
            eprintln!("  /new                   Drop the current image");
            eprintln!("  /undo, /redo           Step through versions");
            eprintln!("  /reset                 Discard all edits");
            eprintln!("  /download [dir]        Save the current version");
            eprintln!("  /tool [name]           Show or switch tool (magic, adjust, filter, advanced)");
            eprintln!("  /adjust [preset|text]  Apply an adjustment");
            eprintln!("  /filter [preset|text]  Apply a filter");
            eprintln!("  /expand <direction>    Expand canvas: horizontal, vertical, all");
            eprintln!("  /upscale               Upscale the image");
            eprintln!("  /retry                 Resubmit the last prompt");
            eprintln!("  /presets               List presets");
            eprintln!("  /status, /history      Show session state");
            eprintln!("  /dismiss               Clear the message");
            eprintln!("  /quit, quit, exit      End session");
        }

        _ => {
            eprintln!("Unknown command: {}. Type /help for commands.", cmd);
        }
    }
}

fn report_outcome(session: &mut EditorSession, outcome: EditOutcome, quiet: bool) {
    match session.finish(outcome) {
        Ok(_) => {
            if let Some(path) = session.preview_path() {
                eprintln!("  preview: {}", path.display());
            }
        }
        Err(PixshopError::AlreadyInProgress) => {}
        // Validation failures never reach the progress renderer.
        Err(e @ PixshopError::InvalidInput(_)) => report_error(&e),
        // No progress event is emitted when the edit task dies.
        Err(PixshopError::TaskFailed(_)) => {
            if let Some(message) = session.dispatcher().error() {
                eprintln!("[error] {}", message);
            }
        }
        Err(e) => {
            if quiet {
                let message = session.dispatcher().error().unwrap_or_else(|| e.to_string());
                eprintln!("[error] {}", message);
            }
        }
    }
}

fn report_error(e: &PixshopError) {
    match e {
        PixshopError::AlreadyInProgress => {
            eprintln!("  An edit is in progress; wait for it to finish.")
        }
        other => eprintln!("[error] {}", other),
    }
}

fn print_loaded(session: &EditorSession) {
    if let Some(snapshot) = session.dispatcher().current() {
        eprintln!(
            "  Loaded {} ({} bytes).",
            snapshot.media_type(),
            snapshot.bytes().len()
        );
    }
    if let Some(path) = session.preview_path() {
        eprintln!("  preview: {}", path.display());
    }
}

fn print_position(session: &EditorSession) {
    let s = session.status();
    eprintln!("  Version {}/{}", s.version, s.versions);
    if let Some(path) = session.preview_path() {
        eprintln!("  preview: {}", path.display());
    }
}

fn print_tool_presets(tool: Tool) {
    eprintln!("  {} presets (or type your own):", tool.title());
    for p in presets::presets_for(tool) {
        eprintln!("    {:<16} {}", p.key, p.label);
    }
}

fn print_prompt(session: &EditorSession) {
    use std::io::Write;

    let tool = session.tool();
    if tool == Tool::Magic {
        print!("> ");
    } else {
        print!("{}> ", tool);
    }
    std::io::stdout().flush().ok();
}

fn yes_no(b: bool) -> &'static str {
    if b {
        "yes"
    } else {
        "no"
    }
}
