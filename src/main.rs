//! # Agent Cost Estimator
//!
//! Deterministic monthly cost estimation for AI agent systems
//!
//! ## Key Components
//! - [`estimator`] - The calculation engine (low/mid/high scenarios)
//! - [`knowledge_base`] - Empirical pricing and overhead tables
//! - [`commands`] - CLI command handlers

mod cli;
mod commands;
mod error;
mod estimator;
mod knowledge_base;
mod system;
mod table_display;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Args, Commands};
use crate::system::OptimizationFlags;

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match args.command {
        Commands::Estimate {
            input,
            json,
            caching,
            batch,
            loop_detection,
            tool_routing,
        } => {
            let flags = OptimizationFlags {
                caching_enabled: caching,
                batch_processing: batch,
                loop_detection,
                tool_specific_routing: tool_routing,
            };
            commands::handle_estimate_command(input.as_deref(), json, flags)
        }
        Commands::Models { json } => commands::handle_models_command(json),
        Commands::Patterns { json } => commands::handle_patterns_command(json),
        Commands::Presets { json } => commands::handle_presets_command(json),
    }
}
