use crate::core_error::{FtpError, FtpResult};
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_network::DataMode;
use crate::core_transfer::io::{resolve_download_path, resolve_upload_name};
use crate::core_transfer::{FileSource, Progress};
use crate::session::Session;
use log::{debug, warn};

pub const HELP_TEXT: &str = "Supported commands:
    get     get REMOTE [LOCAL]  Download a file (LOCAL may be a directory or \"current\")
    put     put LOCAL [REMOTE]  Upload a file
    quit    quit                Close the session (also: exit)
    ls      ls                  Show the current directory
            ls -r               Show the current and all nested directories
            ls -r DEPTH         Show nested directories down to DEPTH levels
    cd      cd DIR              Change the working directory
    pwd     pwd                 Print the working directory
    mkd     mkd DIR             Make a directory
    rmd     rmd DIR             Remove a directory
    rename  rename OLD NEW      Rename a file or directory
    del     del FILE            Delete a file
    size    size FILE           Show the size of a file
    port    port                Switch to active mode
    pasv    pasv                Switch to passive mode
    user    user [NAME [PASS]]  Log in again
    type    type A|I            Change the representation type
    help    help [CMD]          Ask the server for help
    ?       ?                   Show this help message";

pub const INVALID_COMMAND: &str = "Invalid command, use \"?\" for help";

/// What a dispatched command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Text to show to the user.
    Text(String),
    Silent,
    /// The data connection mode was switched.
    ModeChanged(DataMode),
    /// The session is closed; nothing else can be dispatched.
    Closed,
    /// Unknown command name.
    Invalid,
}

/// Runs one command typed at the prompt against `session`.
///
/// `first` and `second` are the (at most two) arguments following the command
/// name. Unknown names give `Outcome::Invalid`, never an error.
pub async fn dispatch(
    session: &mut Session,
    command: &str,
    first: Option<&str>,
    second: Option<&str>,
    progress: &mut dyn FnMut(&Progress),
) -> FtpResult<Outcome> {
    let command = match FtpCommand::from_str(command) {
        Some(command) => command,
        None => {
            debug!("Unknown command: {}", command);
            return Ok(Outcome::Invalid);
        }
    };
    if session.is_closed() {
        return Err(FtpError::SessionClosed);
    }

    match command {
        FtpCommand::User => {
            let name = first.ok_or(FtpError::MissingArgument("user name"))?;
            let password = second.ok_or(FtpError::MissingArgument("password"))?;
            let reply = session.login(name, password).await?;
            Ok(Outcome::Text(reply.to_string()))
        }
        FtpCommand::Quit => {
            session.disconnect().await?;
            Ok(Outcome::Closed)
        }
        FtpCommand::Size => {
            let remote = first.ok_or(FtpError::MissingArgument("file name"))?;
            let size = session.size(remote).await?;
            Ok(Outcome::Text(format!("{} bytes", size)))
        }
        FtpCommand::Ls => {
            let (recursive, depth) = parse_ls_arguments(first, second)?;
            let listing = session.list(recursive, depth).await?;
            if listing.trim().is_empty() {
                return Ok(Outcome::Silent);
            }
            Ok(Outcome::Text(listing))
        }
        FtpCommand::Cd => {
            let dir = first.ok_or(FtpError::MissingArgument("directory"))?;
            Ok(Outcome::Text(session.change_dir(dir).await?.to_string()))
        }
        FtpCommand::Pwd => Ok(Outcome::Text(session.print_dir().await?.to_string())),
        FtpCommand::Rename => {
            let from = first.ok_or(FtpError::MissingArgument("old name"))?;
            let to = second.ok_or(FtpError::MissingArgument("new name"))?;
            Ok(Outcome::Text(session.rename(from, to).await?.to_string()))
        }
        FtpCommand::Mkd => {
            let dir = first.ok_or(FtpError::MissingArgument("directory"))?;
            Ok(Outcome::Text(session.make_dir(dir).await?.to_string()))
        }
        FtpCommand::Rmd => {
            let dir = first.ok_or(FtpError::MissingArgument("directory"))?;
            Ok(Outcome::Text(session.remove_dir(dir).await?.to_string()))
        }
        FtpCommand::Del => {
            let file = first.ok_or(FtpError::MissingArgument("file name"))?;
            Ok(Outcome::Text(session.delete_file(file).await?.to_string()))
        }
        FtpCommand::Get => {
            let remote = first.ok_or(FtpError::MissingArgument("remote file name"))?;
            download(session, remote, second, progress).await
        }
        FtpCommand::Put => {
            let local = first.ok_or(FtpError::MissingArgument("local file name"))?;
            let remote = resolve_upload_name(local, second);
            let mut source = FileSource::open(local).await?;
            let reply = session.store(&mut source, &remote, progress).await?;
            Ok(Outcome::Text(reply.to_string()))
        }
        FtpCommand::Type => Ok(Outcome::Text(session.set_type(first).await?.to_string())),
        FtpCommand::Port => {
            session.set_mode(DataMode::Active);
            Ok(Outcome::ModeChanged(DataMode::Active))
        }
        FtpCommand::Pasv => {
            session.set_mode(DataMode::Passive);
            Ok(Outcome::ModeChanged(DataMode::Passive))
        }
        FtpCommand::Help => Ok(Outcome::Text(session.server_help(first).await?.to_string())),
        FtpCommand::LocalHelp => Ok(Outcome::Text(HELP_TEXT.to_string())),
    }
}

/// Downloads into a local file; the file is removed again when the server
/// has no such remote file.
async fn download(
    session: &mut Session,
    remote: &str,
    local: Option<&str>,
    progress: &mut dyn FnMut(&Progress),
) -> FtpResult<Outcome> {
    let path = resolve_download_path(remote, local)?;
    let mut file = tokio::fs::File::create(&path).await?;
    match session.retrieve(remote, &mut file, progress).await {
        Ok(reply) => Ok(Outcome::Text(reply.to_string())),
        Err(e) => {
            if let FtpError::FileNotFound(_) = e {
                drop(file);
                if let Err(remove_err) = tokio::fs::remove_file(&path).await {
                    warn!("Failed to remove {:?}: {}", path, remove_err);
                }
            }
            Err(e)
        }
    }
}

fn parse_ls_arguments(first: Option<&str>, second: Option<&str>) -> FtpResult<(bool, Option<u32>)> {
    match first {
        None => Ok((false, None)),
        Some(flag) if flag.eq_ignore_ascii_case("-r") => {
            let depth = match second {
                None => None,
                Some(depth) => Some(
                    depth
                        .parse::<u32>()
                        .map_err(|_| FtpError::InvalidArgument(format!("depth must be a number: {}", depth)))?,
                ),
            };
            Ok((true, depth))
        }
        Some(other) => Err(FtpError::InvalidArgument(format!("unknown ls flag: {}", other))),
    }
}
