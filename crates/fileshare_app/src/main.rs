mod cli;
mod commands;
mod config;
mod logging;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use fileshare_engine::EngineHandle;
use fileshare_logging::share_error;

use crate::cli::{Cli, Command};
use crate::config::{FlagOverrides, CONFIG_FILENAME};

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    logging::initialize(cli.log, cli.verbose);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(err) => {
            share_error!("{:#}", err);
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<bool> {
    let config_path = cli
        .config
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));
    let file = config::load_file_config(&config_path);
    let progress = match &cli.command {
        Command::Upload(args) => args.progress,
        _ => None,
    };
    let resolved = config::resolve(
        file,
        FlagOverrides {
            server: cli.server,
            progress,
        },
    )?;

    let engine = EngineHandle::new(resolved.settings).context("cannot start the upload engine")?;

    match cli.command {
        Command::List => commands::list(&engine),
        Command::Upload(args) => commands::upload(&engine, args.paths),
        Command::Download(args) => {
            let dir = args.out.unwrap_or(resolved.download_dir);
            commands::download(&engine, args.names, args.all, args.zip, dir)
        }
        Command::Delete(args) => commands::delete(&engine, args.names, args.all),
    }
}
