//! # Validate Subcommand
//!
//! Validates a JSON document (file or stdin) against a record schema. On
//! success the normalized record is printed; on failure each issue is printed
//! on its own line and the command fails.

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use cvm_schema::{
    validate, CvmInfo, CvmNetworkUrls, CvmNode, KmsInfo, ManagedUser, Record, SchemaKind,
    UnknownKeys, ValidationError, ValidationOptions, VmInfo,
};
use serde_json::Value;

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Schema to validate against (vm-info, managed-user, cvm-node,
    /// cvm-network-urls, kms-info, cvm-info, cvm-info-strict).
    #[arg(long, short)]
    pub schema: SchemaKind,

    /// Report keys the schema does not declare. Overrides
    /// CVM_SCHEMA_UNKNOWN_KEYS.
    #[arg(long)]
    pub reject_unknown: bool,

    /// JSON document to read; stdin when omitted or `-`.
    pub file: Option<PathBuf>,
}

/// Validate `input` as `kind` and return the normalized record in tree form.
///
/// Record schemas go through their typed [`Record`] so defaults and
/// representation rules apply; the strict aggregate has no typed record and
/// returns the interpreter's normalized value.
pub fn check(
    kind: SchemaKind,
    input: &Value,
    options: &ValidationOptions,
) -> Result<Value, ValidationError> {
    match kind {
        SchemaKind::VmInfo => VmInfo::normalize_with(input, options),
        SchemaKind::ManagedUser => ManagedUser::normalize_with(input, options),
        SchemaKind::CvmNode => CvmNode::normalize_with(input, options),
        SchemaKind::CvmNetworkUrls => CvmNetworkUrls::normalize_with(input, options),
        SchemaKind::KmsInfo => KmsInfo::normalize_with(input, options),
        SchemaKind::CvmInfo => CvmInfo::normalize_with(input, options),
        SchemaKind::CvmInfoStrict => validate(input, kind.schema(), options),
    }
}

fn read_document(file: Option<&PathBuf>) -> anyhow::Result<Value> {
    let (source, raw) = match file {
        Some(path) if path.as_os_str() != "-" => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            (path.display().to_string(), raw)
        }
        _ => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("failed to read stdin")?;
            ("<stdin>".to_string(), raw)
        }
    };
    serde_json::from_str(&raw).with_context(|| format!("{source} is not valid JSON"))
}

pub fn run(args: ValidateArgs) -> anyhow::Result<()> {
    let options = if args.reject_unknown {
        ValidationOptions::new(UnknownKeys::Reject)
    } else {
        ValidationOptions::from_env()?
    };
    let input = read_document(args.file.as_ref())?;

    tracing::info!(schema = %args.schema, unknown_keys = %options.unknown_keys, "validating document");
    match check(args.schema, &input, &options) {
        Ok(normalized) => {
            println!("{}", serde_json::to_string_pretty(&normalized)?);
            Ok(())
        }
        Err(err) => {
            for issue in err.issues() {
                eprintln!("  {issue}");
            }
            Err(err.into())
        }
    }
}
