//! Config command handlers

use crate::cli::ConfigInitArgs;
use anyhow::{bail, Context};
use std::fs;

const EXAMPLE_CONFIG: &str = include_str!("../../switchyard.example.toml");

/// Handle `switchyard config init`
pub fn handle_config_init(args: &ConfigInitArgs) -> anyhow::Result<()> {
    if args.output.exists() && !args.force {
        bail!(
            "File already exists: {}. Use --force to overwrite.",
            args.output.display()
        );
    }

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(&args.output, EXAMPLE_CONFIG)
        .with_context(|| format!("writing {}", args.output.display()))?;

    println!("✓ Configuration file created: {}", args.output.display());
    println!("  Edit budgets, routing preferences and the model catalog to suit.");

    Ok(())
}
