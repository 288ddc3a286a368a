//! Command-line interface implementation for webstacks.
//! Provides argument parsing using clap.

use crate::config::Infra;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments structure for webstacks.
#[derive(Parser, Debug)]
#[command(
    version,
    about = "webstacks: generate CloudFormation templates for web application stacks",
    long_about = None
)]
pub struct Args {
    /// Deployment variant to generate
    #[arg(short, long, value_enum, default_value = "ecs")]
    pub infra: Infra,

    /// Generate a GovCloud-compatible template (skips ACM certificates and
    /// the CloudFront distribution, which GovCloud does not support)
    #[arg(long)]
    pub gov_cloud: bool,

    /// Path to a JSON or YAML file overriding parameter defaults
    #[arg(short, long, value_name = "FILE")]
    pub defaults_file: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parses command line arguments and returns the Args structure.
pub fn get_args() -> Args {
    Args::parse()
}
