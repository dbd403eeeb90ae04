#![deny(missing_docs)]

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub(super) struct Cli {
    #[command(subcommand)]
    pub(super) commands: Commands,
}

#[derive(Debug, Subcommand)]
pub(super) enum Commands {
    /// Print the certificates and key held by a PEM trust provider.
    Inspect {
        /// PEM file to inspect.
        #[arg(value_hint = ValueHint::FilePath)]
        path: PathBuf,
    },

    /// Re-encode a PEM trust provider in canonical form.
    ///
    /// Certificates are written in chain order, followed by the private key, if any.
    Normalize {
        /// PEM file to read.
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,

        /// File to write, truncated if it exists.
        #[arg(value_hint = ValueHint::FilePath)]
        output: PathBuf,
    },

    /// Build mTLS credentials from a private trust provider and report failures.
    Check(Box<CheckArgs>),

    /// Build mTLS credentials from `<PREFIX>CERT_PATH`, `<PREFIX>POOL_PATH`,
    /// `<PREFIX>ENDPOINT` and `<PREFIX>INSECURE`.
    Env {
        /// Prefix of the environment variables to read.
        #[arg(long, default_value = "TRUSTKIT_")]
        prefix: String,
    },
}

#[derive(Debug, clap::Args)]
pub(super) struct CheckArgs {
    /// PEM file holding the certificate chain and private key.
    #[arg(value_hint = ValueHint::FilePath)]
    pub path: PathBuf,

    /// Additional PEM files whose certificates should be trusted, can be repeated.
    #[arg(long = "trusted", value_hint = ValueHint::FilePath)]
    pub trusted: Vec<PathBuf>,

    /// Remote endpoint, e.g. `https://node-3.example.net:4443`.
    ///
    /// When given, client credentials are built as well.
    #[arg(long)]
    pub endpoint: Option<String>,
}
