// src/cli/mod.rs — CLI definition (clap derive)

pub mod edit;
pub mod open;
pub mod progress;
pub mod setup;

use clap::{Parser, Subcommand};

use crate::core::presets::{self, Tool};

#[derive(Parser)]
#[command(name = "pixshop", about = "Edit photos by describing the change", version)]
pub struct Cli {
    /// Model to use (model name, or provider/model)
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Suppress progress output
    #[arg(long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply one edit to an image and save the result
    Edit {
        /// Image to edit
        image: String,
        /// What to change, in plain words
        #[arg(short, long, required_unless_present = "preset")]
        prompt: Option<String>,
        /// Use a preset instead of a prompt (e.g. `warm`, `filter:anime`, `upscale`)
        #[arg(long, conflicts_with = "prompt")]
        preset: Option<String>,
        /// Output directory (defaults to the configured one)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Interactive editing session
    Open {
        /// Image to start with
        image: Option<String>,
    },
    /// List preset instructions
    Presets,
    /// Save an API key
    Setup {
        /// Gemini API key
        #[arg(long)]
        api_key: String,
    },
}

/// Print the preset table.
pub fn print_presets() {
    for tool in Tool::ALL {
        let mut list = presets::presets_for(tool).peekable();
        if list.peek().is_none() {
            continue;
        }
        println!("{}:", tool.title());
        for p in list {
            println!("  {:<24} {}", format!("{}:{}", tool, p.key), p.label);
        }
    }
}
