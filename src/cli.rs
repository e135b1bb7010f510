//! # CLI Module
//!
//! Command-line interface definitions and argument parsing for agentcost
//!
//! ## Key Components
//! - [`Args`] - Main CLI arguments structure
//! - [`Commands`] - Subcommand definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Estimate monthly costs for an agent system description
    Estimate {
        /// Path to the estimate request JSON (reads stdin when omitted)
        input: Option<PathBuf>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,

        /// Assume prompt caching is already enabled
        #[arg(long)]
        caching: bool,

        /// Assume batch processing (50% discount)
        #[arg(long)]
        batch: bool,

        /// Assume loop-detection guardrails are in place
        #[arg(long)]
        loop_detection: bool,

        /// Assume tool-specific routing (only the relevant tool definition per call)
        #[arg(long)]
        tool_routing: bool,
    },
    /// List builtin model pricing
    Models {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// List architecture pattern profiles
    Patterns {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// List non-LLM service price presets
    Presets {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Agent cost estimator - deterministic token economics for AI agent systems"
)]
pub struct Args {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}
