//! sol-cli: command line wallet.

use anyhow::Result;
use colored::Colorize;
use sol_cli::{dispatch, Opt};
use std::process::ExitCode;
use structopt::clap::ErrorKind;
use structopt::StructOpt;
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn init_logging() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if let Err(e) = init_logging() {
        eprintln!("failed to initialize logging: {}", e);
    }

    let opt = match Opt::from_iter_safe(std::env::args_os()) {
        Ok(opt) => opt,
        Err(e) if matches!(e.kind, ErrorKind::HelpDisplayed | ErrorKind::VersionDisplayed) => {
            println!("{}", e.message);
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("{}", e.message);
            return ExitCode::from(2);
        }
    };
    debug!("Parsed arguments: {:?}", opt);

    match dispatch(opt).await {
        Ok(outcome) => {
            println!("{}", outcome.to_string().green());
            ExitCode::SUCCESS
        }
        Err(e) => {
            debug!("Command failed: {:?}", e);
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::from(e.exit_code())
        }
    }
}
