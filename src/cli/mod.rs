//! Command-line interface.
//!
//! # Commands
//!
//! - `route` - Show the routing decision for a prompt
//! - `models` - List the model catalog
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Where would this prompt go?
//! switchyard route "explain this function"
//!
//! # Same, honouring a config file and preferring local models
//! switchyard route -c switchyard.toml --prefer-local "write unit tests for parser.rs"
//!
//! # Generate shell completions
//! switchyard completions bash > ~/.bash_completion.d/switchyard
//! ```

pub mod completions;
pub mod config;
pub mod models;
pub mod output;
pub mod route;

pub use completions::handle_completions;
pub use config::handle_config_init;
pub use models::handle_models;
pub use route::handle_route;

use crate::analyzer::TaskType;
use crate::catalog::Tier;
use crate::config::SwitchyardConfig;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Switchyard - cost-aware LLM model router
#[derive(Parser, Debug)]
#[command(name = "switchyard", version, about = "Cost-aware LLM model router")]
pub struct Cli {
    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the routing decision for a prompt
    Route(RouteArgs),
    /// List the model catalog
    Models(ModelsArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct RouteArgs {
    /// Prompt to route
    pub prompt: String,

    /// Skip keyword detection and use this task type
    #[arg(short, long)]
    pub task_type: Option<TaskType>,

    /// Attach an image by URL (repeatable)
    #[arg(long = "image", value_name = "URL")]
    pub images: Vec<String>,

    /// Prepend a system message
    #[arg(long)]
    pub system: Option<String>,

    /// Route eligible tasks to local models
    #[arg(long)]
    pub prefer_local: bool,

    /// Route non-frontier tasks to the fastest economy model
    #[arg(long)]
    pub prefer_speed: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ModelsArgs {
    /// Only show models in this tier (local, economy, standard, frontier)
    #[arg(long)]
    pub tier: Option<Tier>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "switchyard.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

/// Load configuration from `path` (defaults when `None`) with environment
/// overrides applied. CLI overrides are applied by each command on top.
pub fn load_config(path: Option<&Path>) -> Result<SwitchyardConfig, crate::config::ConfigError> {
    Ok(SwitchyardConfig::load(path)?.with_env_overrides())
}
