// src/main.rs — pixshop entry point

use clap::Parser;
use std::path::Path;

use pixshop::cli::{Cli, Commands};
use pixshop::infra::config::Config;
use pixshop::infra::logger;
use pixshop::provider::resolver;

#[tokio::main]
async fn main() {
    // Initialize logging (respects RUST_LOG)
    logger::init_logging("warn");

    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load config (falls back to defaults if no config.toml)
    let config = if let Some(ref path) = cli.config {
        Config::load_from(Path::new(path))?
    } else {
        Config::load()?
    };

    // Dispatch subcommands that don't need a provider
    match &cli.command {
        Some(Commands::Presets) => {
            pixshop::cli::print_presets();
            return Ok(());
        }
        Some(Commands::Setup { api_key }) => {
            return pixshop::cli::setup::run_setup(api_key).await;
        }
        _ => {}
    }

    let generator = resolver::resolve_generator(&config, cli.model.as_deref()).await?;

    match cli.command {
        Some(Commands::Edit {
            image,
            prompt,
            preset,
            output,
        }) => {
            let instruction =
                pixshop::cli::edit::resolve_instruction(prompt.as_deref(), preset.as_deref())?;
            pixshop::cli::edit::run_edit(
                generator,
                &config,
                Path::new(&image),
                &instruction,
                output.as_deref().map(Path::new),
                cli.quiet,
            )
            .await?;
            Ok(())
        }
        Some(Commands::Open { image }) => {
            pixshop::cli::open::run_open(
                generator,
                &config,
                image.as_deref().map(Path::new),
                cli.quiet,
            )
            .await
        }
        // Default: interactive session without an image
        _ => pixshop::cli::open::run_open(generator, &config, None, cli.quiet).await,
    }
}
