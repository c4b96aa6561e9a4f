//! snappy - tiered ZFS snapshot manager.

use chrono::Utc;
use clap::Parser;
use snappy_cli::{commands, logging, Cli, Command, Formatter};
use snappy_config::ConfigFile;
use snappy_store::ZfsStore;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> snappy_cli::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let command = cli.resolved_command()?;

    let formatter = Formatter::new(cli.format.into(), !cli.no_color);
    let config = ConfigFile::load(&cli.conf)?;
    let mut store = match &cli.zfs {
        Some(path) => ZfsStore::with_binary(path),
        None => ZfsStore::new(),
    };
    let now = cli.now.unwrap_or_else(Utc::now);

    let output = match command {
        Command::Run(args) => commands::execute_run(args, &config, &mut store, &formatter, now)?,
        Command::Plan(args) => commands::execute_plan(args, &config, &store, &formatter, now)?,
        Command::List(args) => commands::execute_list(args, &config, &store, &formatter, now)?,
        Command::Watch(args) => commands::execute_watch(args, &config, &mut store, &formatter).await?,
        Command::Config(args) => commands::execute_config(args, &config, &formatter)?,
    };

    if !output.is_empty() {
        println!("{}", output);
    }

    Ok(())
}
