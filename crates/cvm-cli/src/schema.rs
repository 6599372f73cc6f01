//! # Schema Subcommand
//!
//! Prints the JSON Schema export of a record schema.

use clap::Args;
use cvm_schema::{to_json_schema, SchemaKind, UnknownKeys};

/// Arguments for the schema subcommand.
#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Schema to export (vm-info, managed-user, cvm-node, cvm-network-urls,
    /// kms-info, cvm-info, cvm-info-strict).
    #[arg(long, short)]
    pub schema: SchemaKind,

    /// Close every object with `additionalProperties: false`.
    #[arg(long)]
    pub reject_unknown: bool,
}

/// Render the requested schema as pretty-printed JSON.
pub fn render(args: &SchemaArgs) -> anyhow::Result<String> {
    let unknown_keys = if args.reject_unknown {
        UnknownKeys::Reject
    } else {
        UnknownKeys::Ignore
    };
    let doc = to_json_schema(args.schema.schema(), unknown_keys);
    Ok(serde_json::to_string_pretty(&doc)?)
}

pub fn run(args: SchemaArgs) -> anyhow::Result<()> {
    tracing::debug!(schema = %args.schema, "exporting JSON Schema");
    println!("{}", render(&args)?);
    Ok(())
}
