use clap::Parser;
use switchyard::cli::{
    handle_completions, handle_config_init, handle_models, handle_route, load_config, Cli, Commands,
    ConfigCommands,
};
use switchyard::config::LoggingConfig;
use switchyard::logging::init_tracing;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Route(args) => {
            setup_logging(args.config.as_deref(), cli.log_level.as_deref());
            handle_route(&args).map(|output| println!("{}", output))
        }
        Commands::Models(args) => {
            setup_logging(args.config.as_deref(), cli.log_level.as_deref());
            handle_models(&args).map(|output| println!("{}", output))
        }
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Init(args) => handle_config_init(&args),
        },
        Commands::Completions(args) => {
            handle_completions(&args);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Install tracing from the config file's `[logging]` section, if it loads.
/// Config errors are reported by the command itself.
fn setup_logging(config_path: Option<&std::path::Path>, level_override: Option<&str>) {
    let mut logging = load_config(config_path)
        .map(|config| config.logging)
        .unwrap_or_else(|_| LoggingConfig::default());
    if let Some(level) = level_override {
        logging.level = level.to_string();
    }

    if let Err(e) = init_tracing(&logging) {
        eprintln!("Warning: failed to initialize logging: {}", e);
    }
}
