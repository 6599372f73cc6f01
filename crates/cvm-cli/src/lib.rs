//! # cvm-cli — CVM Schema Command-Line Tool
//!
//! Developer tooling around `cvm-schema`: check a captured API response
//! against one of the record schemas, or print a schema as JSON Schema for use
//! elsewhere.
//!
//! ## Subcommands
//!
//! - `validate`: validate a JSON document and print the normalized record
//! - `schema`: print the JSON Schema export of a record schema
//!
//! ## Crate Policy
//!
//! - Argument parsing lives next to each handler; `main.rs` only dispatches.
//! - Validation logic stays in `cvm-schema`.

pub mod schema;
pub mod validate;
