//! Interactive prompt around a logged-in session.

use crate::config::ClientConfig;
use crate::constants::{ANONYMOUS_PASSWORD, ANONYMOUS_USERNAME};
use crate::core_cli::progress::ProgressPrinter;
use crate::core_cli::Target;
use crate::core_error::{FtpError, FtpResult};
use crate::core_ftpcommand::handlers::INVALID_COMMAND;
use crate::core_ftpcommand::{dispatch, Outcome};
use crate::core_network::{DataMode, Reply};
use crate::core_transfer::Progress;
use crate::session::Session;
use anyhow::Result;
use colored::Colorize;
use log::{debug, error, warn};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

pub const PROMPT: &str = ">>";
pub const WRONG_PARAMETERS: &str = "Wrong parameters";

/// A command name, lower-cased, with at most two arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub name: String,
    pub first: Option<String>,
    pub second: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    Empty,
    Command(CommandLine),
    /// Unbalanced quotes or too many arguments.
    WrongParameters,
}

/// Splits `line` with POSIX shell quoting rules. Unbalanced quotes and more
/// than two arguments are reported as `WrongParameters`.
pub fn parse_line(line: &str) -> ParsedLine {
    let tokens = match shell_words::split(line) {
        Ok(tokens) => tokens,
        Err(e) => {
            debug!("Cannot split {:?}: {}", line, e);
            return ParsedLine::WrongParameters;
        }
    };
    if tokens.len() > 3 {
        return ParsedLine::WrongParameters;
    }
    let mut tokens = tokens.into_iter();
    match tokens.next() {
        None => ParsedLine::Empty,
        Some(name) => ParsedLine::Command(CommandLine {
            name: name.to_lowercase(),
            first: tokens.next(),
            second: tokens.next(),
        }),
    }
}

/// Logs in with the resolved credentials, retrying once as `anonymous` when
/// they are refused and the configuration allows it.
pub async fn login_at_startup(session: &mut Session, target: &Target, config: &ClientConfig) -> FtpResult<Reply> {
    match session.login(&target.username, &target.password).await {
        Err(FtpError::LoginFailure(reason))
            if config.anonymous_fallback && target.username != ANONYMOUS_USERNAME =>
        {
            warn!("Login as {} refused ({}), trying anonymous", target.username, reason);
            session.login(ANONYMOUS_USERNAME, ANONYMOUS_PASSWORD).await
        }
        other => other,
    }
}

fn print_error(err: &FtpError) {
    println!("{}", err.to_string().red());
}

fn print_text(text: &str) {
    if text.ends_with('\n') {
        print!("{}", text);
    } else {
        println!("{}", text);
    }
}

pub struct Repl<R> {
    lines: Lines<R>,
    printer: ProgressPrinter,
}

impl<R: AsyncBufRead + Unpin> Repl<R> {
    pub fn new(input: R) -> Self {
        Self {
            lines: input.lines(),
            printer: ProgressPrinter::default(),
        }
    }

    async fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        print!("{}", label);
        std::io::stdout().flush()?;
        Ok(self.lines.next_line().await?)
    }

    /// Reads commands until the session is closed or input ends.
    pub async fn run(&mut self, session: &mut Session) -> Result<()> {
        while !session.is_closed() {
            let line = match self.prompt(PROMPT).await? {
                Some(line) => line,
                None => {
                    session.disconnect().await?;
                    break;
                }
            };
            match parse_line(&line) {
                ParsedLine::Empty => continue,
                ParsedLine::WrongParameters => println!("{}", WRONG_PARAMETERS),
                ParsedLine::Command(command) => self.run_once(session, command).await?,
            }
        }
        Ok(())
    }

    /// Dispatches one command and applies the error policy: session-fatal
    /// errors disconnect, permission and login errors ask for credentials
    /// again, anything else is printed and the prompt continues.
    pub async fn run_once(&mut self, session: &mut Session, mut command: CommandLine) -> Result<()> {
        if command.name == "user" && command.second.is_none() {
            match self.ask_credentials(command.first.take()).await? {
                Some((name, password)) => {
                    command.first = Some(name);
                    command.second = Some(password);
                }
                None => return Ok(()),
            }
        }

        let result = {
            let printer = &mut self.printer;
            let mut progress = |p: &Progress| printer.update(p);
            dispatch(
                session,
                &command.name,
                command.first.as_deref(),
                command.second.as_deref(),
                &mut progress,
            )
            .await
        };

        match result {
            Ok(Outcome::Text(text)) => print_text(&text),
            Ok(Outcome::Silent) => {}
            Ok(Outcome::ModeChanged(DataMode::Active)) => println!("Active mode"),
            Ok(Outcome::ModeChanged(DataMode::Passive)) => println!("Passive mode"),
            Ok(Outcome::Closed) => println!("Goodbye"),
            Ok(Outcome::Invalid) => println!("{}", INVALID_COMMAND),
            Err(e) if e.is_session_fatal() => {
                error!("{}: {}", command.name, e);
                print_error(&e);
                session.disconnect().await?;
            }
            Err(e) if e.requires_login() => {
                print_error(&e);
                self.relogin(session).await?;
            }
            Err(e) => {
                error!("{}: {}", command.name, e);
                print_error(&e);
            }
        }
        Ok(())
    }

    async fn ask_credentials(&mut self, name: Option<String>) -> Result<Option<(String, String)>> {
        let name = match name {
            Some(name) => name,
            None => match self.prompt("Username: ").await? {
                Some(name) => name.trim().to_string(),
                None => return Ok(None),
            },
        };
        let password = match self.prompt("Password: ").await? {
            Some(password) => password,
            None => return Ok(None),
        };
        Ok(Some((name, password)))
    }

    async fn relogin(&mut self, session: &mut Session) -> Result<()> {
        let (name, password) = match self.ask_credentials(None).await? {
            Some(credentials) => credentials,
            None => return Ok(()),
        };
        match session.login(&name, &password).await {
            Ok(reply) => print_text(reply.text()),
            Err(e) if e.is_session_fatal() => {
                print_error(&e);
                session.disconnect().await?;
            }
            Err(e) => print_error(&e),
        }
        Ok(())
    }
}
