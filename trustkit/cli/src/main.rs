#![warn(clippy::indexing_slicing)]

use clap::Parser;
use config::{CheckArgs, Cli, Commands};
use error::{CliError, CliResult};

mod check;
mod config;
mod error;
mod inspect;
mod logging;

fn main() -> miette::Result<()> {
    rustls::crypto::CryptoProvider::install_default(rustls::crypto::aws_lc_rs::default_provider())
        .map_err(|_| CliError::CryptoProvider)?;

    let cli = Cli::parse();

    logging::init_tracing_registry();

    let res: CliResult<()> = match cli.commands {
        Commands::Inspect { path } => inspect::inspect(&path).map(|report| print!("{report}")),
        Commands::Normalize { input, output } => {
            inspect::normalize(&input, &output).map(|provider| {
                println!(
                    "wrote {} certificate(s){} to {}",
                    provider.len(),
                    if provider.is_private() { " and a private key" } else { "" },
                    output.display()
                )
            })
        }
        Commands::Check(args) => {
            let CheckArgs {
                path,
                trusted,
                endpoint,
            } = *args;

            check::check(&path, &trusted, endpoint.as_deref()).map(|report| print!("{report}"))
        }
        Commands::Env { prefix } => check::check_env(&prefix).map(|report| print!("{report}")),
    };

    res.map_err(Into::into)
}
