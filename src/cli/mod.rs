//! Command-line interface for portfolio hierarchy management
//!
//! Thin wrapper over the reconciler: each subcommand maps to one lifecycle
//! operation against the SonarQube instance named by the environment.

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod commands;

use commands::{CreateArgs, DeleteArgs, ReadArgs, UpdateArgs};
use crate::config::SonarConfig;
use crate::logging;

#[derive(Parser)]
#[command(name = "sonar-portfolio")]
#[command(version)]
#[command(about = "Manage SonarQube portfolio hierarchy references", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a hierarchy: add child references under a parent portfolio
    Create(CreateArgs),

    /// Read the current child references of a portfolio
    Read(ReadArgs),

    /// Reconcile child references from an old set to a new set
    Update(UpdateArgs),

    /// Remove child references from a parent portfolio
    Delete(DeleteArgs),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        logging::init_logging(self.verbose);

        let config = SonarConfig::from_env()?;

        match self.command {
            Commands::Create(args) => commands::create(&config, args).await,
            Commands::Read(args) => commands::read(&config, args).await,
            Commands::Update(args) => commands::update(&config, args).await,
            Commands::Delete(args) => commands::delete(&config, args).await,
        }
    }
}
