//! Hintcheck CLI entry point.

use clap::Parser;
use hintcheck::cli::{self, Cli, Commands, EXIT_ERROR};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    hintcheck::init();

    let result = match cli.command {
        Commands::Lint(args) => cli::run_lint(&args),
        Commands::Init(args) => cli::run_init(&args),
        Commands::Rules => cli::run_rules(),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
