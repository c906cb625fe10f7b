mod config;
mod constants;
mod core_cli;
mod core_error;
mod core_ftpcommand;
mod core_log;
mod core_network;
mod core_transfer;
mod helpers;
mod session;

#[cfg(test)]
mod test_support;

use crate::config::{log_config, Config};
use crate::core_cli::progress::ProgressPrinter;
use crate::core_cli::repl::{login_at_startup, Repl};
use crate::core_cli::Cli;
use crate::core_ftpcommand::{dispatch, Outcome};
use crate::core_log::init_logger;
use crate::core_transfer::Progress;
use crate::session::Session;
use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Cli::parse();

    init_logger(args.verbose);

    // Load configuration, then let the command line override it
    let mut config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply_overrides(&mut config.client);
    log_config(&config.client);
    let target = args.target(&config.client)?;

    let mut session = Session::new(&config.client);
    println!("Connecting to {}:{}", target.host, target.port);
    let greeting = session
        .connect(&target.host, target.port)
        .await
        .with_context(|| format!("Connection to {}:{} failed", target.host, target.port))?;
    print!("{}", greeting);

    match login_at_startup(&mut session, &target, &config.client).await {
        Ok(reply) => print!("{}", reply),
        Err(e) if e.is_session_fatal() => return Err(e).context("Login failed"),
        Err(e) => println!("{}", e.to_string().red()),
    }

    if let Some(get) = &args.get {
        run_single_shot(&mut session, "get", &get[0], &get[1]).await
    } else if let Some(upload) = &args.upload {
        run_single_shot(&mut session, "put", &upload[0], &upload[1]).await
    } else {
        println!("Print \"?\" to show available commands");
        Repl::new(BufReader::new(tokio::io::stdin()))
            .run(&mut session)
            .await
    }
}

/// Runs one transfer without the prompt and closes the session afterwards.
async fn run_single_shot(session: &mut Session, command: &str, first: &str, second: &str) -> Result<()> {
    let mut printer = ProgressPrinter::default();
    let mut progress = |p: &Progress| printer.update(p);
    let outcome = dispatch(session, command, Some(first), Some(second), &mut progress).await;
    session.disconnect().await?;

    if let Outcome::Text(text) = outcome.with_context(|| format!("{} {} failed", command, first))? {
        print!("{}", text);
    }
    Ok(())
}
