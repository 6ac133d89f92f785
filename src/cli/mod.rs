//! CLI module for the subscription tracker
//!
//! Provides subcommands for running the backend and managing storage:
//! - `serve`: run the HTTP API server
//! - `migrate`: apply pending storage migrations and exit

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

/// Subscription tracking backend with budgets and currency conversion
#[derive(Parser)]
#[command(name = "subtrack")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server
    Serve,

    /// Apply pending storage migrations and exit
    Migrate,
}
