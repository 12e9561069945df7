//! jsximg - turn image imports into JSX components.

mod cli;
mod config;
mod core;
mod directive;
mod generator;
mod image;
mod logger;
mod pipeline;
mod utils;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use crate::cli::{Cli, Commands, ModeArgs};
use crate::config::PipelineConfig;
use crate::core::BuildMode;
use crate::pipeline::ImagePipeline;
use std::io::stdout;
use std::sync::Arc;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    if let Commands::Build { mode, .. } | Commands::Transform { mode, .. } = &cli.command {
        logger::set_verbose(mode.verbose);
    }

    let config = PipelineConfig::load(&cli)?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    rt.block_on(run(&cli, config))
}

async fn run(cli: &Cli, mut config: PipelineConfig) -> Result<()> {
    let mut out = stdout().lock();

    match &cli.command {
        Commands::Build {
            paths,
            modules,
            mode,
        } => {
            if let Some(dir) = modules {
                config.output.modules = config.root.join(dir);
            }
            let modules_dir = config.output.modules.clone();
            let pipeline = Arc::new(ImagePipeline::new(config, build_mode(mode)));

            let summary = cli::build::build_modules(pipeline, paths, &modules_dir).await?;
            log!("build"; "{} raster, {} vector -> {}",
                summary.raster, summary.vector, modules_dir.display());
            Ok(())
        }
        Commands::Transform { id, mode } => {
            let pipeline = ImagePipeline::new(config, build_mode(mode));
            cli::inspect::transform(&pipeline, id, &mut out).await
        }
        Commands::Directives { id } => {
            let pipeline = ImagePipeline::new(config, BuildMode::PRODUCTION);
            cli::inspect::directives(&pipeline, id, &mut out)
        }
        Commands::Variants { id } => {
            let pipeline = ImagePipeline::new(config, BuildMode::PRODUCTION);
            cli::inspect::variants(&pipeline, id, &mut out).await
        }
    }
}

fn build_mode(mode: &ModeArgs) -> BuildMode {
    if mode.dev {
        BuildMode::DEVELOPMENT
    } else {
        BuildMode::PRODUCTION
    }
}
