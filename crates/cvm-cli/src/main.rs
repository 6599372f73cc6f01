//! # cvm CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use clap::Parser;

/// CVM schema tool: validate management API payloads.
#[derive(Parser, Debug)]
#[command(name = "cvm", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Validate a JSON document against a record schema.
    Validate(cvm_cli::validate::ValidateArgs),
    /// Print a record schema as JSON Schema.
    Schema(cvm_cli::schema::SchemaArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate(args) => cvm_cli::validate::run(args),
        Commands::Schema(args) => cvm_cli::schema::run(args),
    }
}
