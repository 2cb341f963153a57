//! Command line configuration.

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command line configuration for sitekit.
#[derive(Debug, Clone, Parser)]
#[command(name = "sitekit", version, about, long_about = None)]
pub struct Config {
    #[command(subcommand)]
    pub command: Command,

    /// Show debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only show warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Build a whole site: splice components, convert writeups, copy assets
    Build {
        /// Site root directory
        #[arg(default_value = ".")]
        site: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "dist")]
        output: PathBuf,
    },

    /// Load components into a single page
    Include {
        /// HTML page
        page: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Page URL; fragments are fetched over HTTP relative to it
        #[arg(long)]
        url: Option<String>,
    },

    /// Replay tag button clicks on a page
    Filter {
        /// HTML page with a tag filter
        page: PathBuf,

        /// Tag to click, repeat for several clicks in order
        #[arg(short, long = "tag", required = true)]
        tags: Vec<String>,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert Markdown to HTML
    Markdown {
        /// Markdown file
        input: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Config {
    /// Parses configuration from command line arguments.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Validates configuration.
    ///
    /// # Errors
    ///
    /// Returns error if an input path does not exist.
    pub fn validate(&self) -> Result<()> {
        match &self.command {
            Command::Build { site, .. } => {
                if !site.is_dir() {
                    bail!("Site directory does not exist: {}", site.display());
                }
            }
            Command::Include { page, .. }
            | Command::Filter { page, .. }
            | Command::Markdown { input: page, .. } => {
                if !page.is_file() {
                    bail!("Input file does not exist: {}", page.display());
                }
            }
        }

        Ok(())
    }

    /// Default log filter for the verbosity flags.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}
