//! Command-line front end for airouter.
//!
//! `main.rs` is the composition root; this library holds the argument
//! parser, the config mapping and the CLI error type so they can be tested.
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used by the binary only
use anyhow as _;
use dotenvy as _;
use tokio as _;
use tracing as _;
use tracing_subscriber as _;

pub mod error;
pub mod parser;

pub use error::CliError;
pub use parser::Cli;
