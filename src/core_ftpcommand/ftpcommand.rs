/// Commands understood by the interactive client.
#[derive(Eq, Hash, PartialEq, Debug, Clone, Copy)]
pub enum FtpCommand {
    User,
    Quit,
    Size,
    Ls,
    Cd,
    Pwd,
    Rename,
    Mkd,
    Rmd,
    Get,
    Put,
    Del,
    Type,
    Port,
    Pasv,
    Help,
    LocalHelp,
}

impl FtpCommand {
    pub fn from_str(cmd: &str) -> Option<FtpCommand> {
        match cmd.to_lowercase().as_str() {
            "user" => Some(FtpCommand::User),
            "quit" | "exit" => Some(FtpCommand::Quit),
            "size" => Some(FtpCommand::Size),
            "ls" => Some(FtpCommand::Ls),
            "cd" => Some(FtpCommand::Cd),
            "pwd" => Some(FtpCommand::Pwd),
            "rename" => Some(FtpCommand::Rename),
            "mkd" => Some(FtpCommand::Mkd),
            "rmd" => Some(FtpCommand::Rmd),
            "get" => Some(FtpCommand::Get),
            "put" => Some(FtpCommand::Put),
            "del" => Some(FtpCommand::Del),
            "type" => Some(FtpCommand::Type),
            "port" => Some(FtpCommand::Port),
            "pasv" => Some(FtpCommand::Pasv),
            "help" => Some(FtpCommand::Help),
            "?" => Some(FtpCommand::LocalHelp),
            _ => None,
        }
    }
}
