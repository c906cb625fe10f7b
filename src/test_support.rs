//! In-process FTP server used by the session tests.
//!
//! Speaks just enough of the protocol for the client: USER/PASS, TYPE, SIZE,
//! PORT/PASV, RETR/STOR/LIST, CWD/PWD, MKD/RMD/DELE, RNFR/RNTO, HELP, QUIT.
//! The file tree lives in memory and every received command line is logged.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

pub const GREETING: &str = "220-Welcome to the mock server\r\n220 Ready\r\n";

#[derive(Default)]
struct Tree {
    dirs: BTreeSet<String>,
    files: BTreeMap<String, Vec<u8>>,
}

impl Tree {
    fn exists(&self, path: &str) -> bool {
        self.dirs.contains(path) || self.files.contains_key(path)
    }

    fn children(&self, dir: &str) -> Vec<(String, Option<usize>)> {
        let mut entries: Vec<(String, Option<usize>)> = self
            .dirs
            .iter()
            .filter(|d| d.as_str() != "/" && parent_of(d) == dir)
            .map(|d| (last_segment(d).to_string(), None))
            .collect();
        entries.extend(
            self.files
                .iter()
                .filter(|(f, _)| parent_of(f) == dir)
                .map(|(f, content)| (last_segment(f).to_string(), Some(content.len()))),
        );
        entries.sort();
        entries
    }
}

#[derive(Default)]
struct Shared {
    tree: Tree,
    commands: Vec<String>,
    data_connections: usize,
}

#[derive(Clone)]
struct Options {
    users: Vec<(String, String)>,
    allow_anonymous: bool,
    reject_port: bool,
    stor_reply: Option<String>,
    stall_data: Option<Duration>,
    deny_list: Vec<String>,
}

fn parent_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(idx) => &path[..idx],
    }
}

fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Resolves `arg` against `cwd` into a normalized absolute path.
fn resolve(cwd: &str, arg: &str) -> String {
    let joined = if arg.starts_with('/') {
        arg.to_string()
    } else {
        format!("{}/{}", cwd, arg)
    };
    let mut parts: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    format!("/{}", parts.join("/"))
}

pub struct MockServerBuilder {
    options: Options,
    tree: Tree,
}

impl MockServerBuilder {
    pub fn dir(mut self, path: &str) -> Self {
        self.tree.dirs.insert(path.to_string());
        self
    }

    pub fn file(mut self, path: &str, content: &[u8]) -> Self {
        self.tree.files.insert(path.to_string(), content.to_vec());
        self
    }

    /// Answer every PORT with a 500.
    pub fn reject_port(mut self) -> Self {
        self.options.reject_port = true;
        self
    }

    /// Answer every STOR with `reply` and never open the data connection.
    pub fn stor_reply(mut self, reply: &str) -> Self {
        self.options.stor_reply = Some(reply.to_string());
        self
    }

    /// Answer RETR, STOR and LIST with a 150, never use the data connection and
    /// send a 425 after `delay`.
    pub fn stall_data(mut self, delay: Duration) -> Self {
        self.options.stall_data = Some(delay);
        self
    }

    /// Refuse LIST with a 550 while the working directory is `dir`.
    pub fn deny_list_in(mut self, dir: &str) -> Self {
        self.options.deny_list.push(dir.to_string());
        self
    }

    pub fn no_anonymous(mut self) -> Self {
        self.options.allow_anonymous = false;
        self
    }

    pub async fn start(self) -> MockServer {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shared = Arc::new(Mutex::new(Shared {
            tree: self.tree,
            ..Default::default()
        }));

        let server_shared = Arc::clone(&shared);
        let options = self.options;
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let shared = Arc::clone(&server_shared);
                let options = options.clone();
                tokio::spawn(async move {
                    let _ = serve(stream, shared, options).await;
                });
            }
        });

        MockServer { addr, shared }
    }
}

pub struct MockServer {
    pub addr: SocketAddr,
    shared: Arc<Mutex<Shared>>,
}

impl MockServer {
    pub fn builder() -> MockServerBuilder {
        let mut tree = Tree::default();
        tree.dirs.insert("/".to_string());
        MockServerBuilder {
            options: Options {
                users: vec![("ftp".to_string(), "ftp".to_string())],
                allow_anonymous: true,
                reject_port: false,
                stor_reply: None,
                stall_data: None,
                deny_list: Vec::new(),
            },
            tree,
        }
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Every command line received so far, without the CRLF.
    pub fn commands(&self) -> Vec<String> {
        self.shared.lock().unwrap().commands.clone()
    }

    /// Number of logged commands whose verb is `verb`.
    pub fn count(&self, verb: &str) -> usize {
        self.commands()
            .iter()
            .filter(|c| c.split(' ').next() == Some(verb))
            .count()
    }

    pub fn data_connections(&self) -> usize {
        self.shared.lock().unwrap().data_connections
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.shared.lock().unwrap().tree.files.get(path).cloned()
    }

    pub fn has_dir(&self, path: &str) -> bool {
        self.shared.lock().unwrap().tree.dirs.contains(path)
    }
}

enum PendingData {
    Active(SocketAddr),
    Passive(TcpListener),
}

struct Connection {
    shared: Arc<Mutex<Shared>>,
    options: Options,
    writer: OwnedWriteHalf,
    cwd: String,
    user: Option<String>,
    logged_in: bool,
    pending: Option<PendingData>,
    rename_from: Option<String>,
}

async fn serve(stream: TcpStream, shared: Arc<Mutex<Shared>>, options: Options) -> io::Result<()> {
    let (reader, writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut conn = Connection {
        shared,
        options,
        writer,
        cwd: "/".to_string(),
        user: None,
        logged_in: false,
        pending: None,
        rename_from: None,
    };
    conn.reply(GREETING).await?;

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(());
        }
        let request = line.trim_end_matches(['\r', '\n']).to_string();
        conn.shared.lock().unwrap().commands.push(request.clone());

        let (verb, arg) = match request.split_once(' ') {
            Some((verb, arg)) => (verb.to_ascii_uppercase(), arg.to_string()),
            None => (request.to_ascii_uppercase(), String::new()),
        };
        if !conn.handle(&verb, &arg).await? {
            return Ok(());
        }
    }
}

impl Connection {
    async fn reply(&mut self, text: &str) -> io::Result<()> {
        self.writer.write_all(text.as_bytes()).await
    }

    async fn open_data(&mut self) -> io::Result<TcpStream> {
        let stream = match self.pending.take() {
            Some(PendingData::Active(addr)) => TcpStream::connect(addr).await?,
            Some(PendingData::Passive(listener)) => {
                timeout(Duration::from_secs(5), listener.accept())
                    .await
                    .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "no passive connection"))??
                    .0
            }
            None => return Err(io::Error::new(io::ErrorKind::NotConnected, "no data channel")),
        };
        self.shared.lock().unwrap().data_connections += 1;
        Ok(stream)
    }

    async fn stall(&mut self, delay: Duration) -> io::Result<()> {
        self.reply("150 Opening data connection.\r\n").await?;
        tokio::time::sleep(delay).await;
        self.pending = None;
        self.reply("425 Can't open data connection.\r\n").await
    }

    fn path(&self, arg: &str) -> String {
        resolve(&self.cwd, arg)
    }

    /// Returns `false` once the connection should be closed.
    async fn handle(&mut self, verb: &str, arg: &str) -> io::Result<bool> {
        match verb {
            "USER" => {
                self.user = Some(arg.to_string());
                self.logged_in = false;
                self.reply("331 Please specify the password.\r\n").await?;
            }
            "PASS" => {
                let accepted = match &self.user {
                    Some(user) if user == "anonymous" => self.options.allow_anonymous,
                    Some(user) => self
                        .options
                        .users
                        .iter()
                        .any(|(name, password)| name == user && password == arg),
                    None => false,
                };
                self.logged_in = accepted;
                if accepted {
                    self.reply("230 Login successful.\r\n").await?;
                } else {
                    self.reply("530 Login incorrect.\r\n").await?;
                }
            }
            "QUIT" => {
                self.reply("221 Goodbye.\r\n").await?;
                return Ok(false);
            }
            "HELP" => {
                self.reply(
                    "214-The following commands are recognized.\r\n \
                     USER PASS TYPE SIZE PORT PASV RETR STOR LIST\r\n \
                     CWD PWD MKD RMD DELE RNFR RNTO HELP QUIT\r\n\
                     214 Help OK.\r\n",
                )
                .await?;
            }
            _ if !self.logged_in => {
                self.reply("530 Please login with USER and PASS.\r\n").await?;
            }
            "TYPE" => match arg.to_ascii_uppercase().as_str() {
                "A" => self.reply("200 Switching to ASCII mode.\r\n").await?,
                "I" => self.reply("200 Switching to Binary mode.\r\n").await?,
                _ => self.reply("504 Bad MODE command.\r\n").await?,
            },
            "SIZE" => {
                let path = self.path(arg);
                let size = self.shared.lock().unwrap().tree.files.get(&path).map(Vec::len);
                match size {
                    Some(size) => self.reply(&format!("213 {}\r\n", size)).await?,
                    None => self.reply("550 Could not get file size.\r\n").await?,
                }
            }
            "PORT" => {
                if self.options.reject_port {
                    self.reply("500 Illegal PORT command.\r\n").await?;
                    return Ok(true);
                }
                let numbers: Vec<u16> = arg.split(',').filter_map(|n| n.trim().parse().ok()).collect();
                if numbers.len() != 6 {
                    self.reply("501 Illegal PORT command.\r\n").await?;
                    return Ok(true);
                }
                let addr: SocketAddr = format!(
                    "{}.{}.{}.{}:{}",
                    numbers[0],
                    numbers[1],
                    numbers[2],
                    numbers[3],
                    numbers[4] * 256 + numbers[5]
                )
                .parse()
                .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "bad PORT address"))?;
                self.pending = Some(PendingData::Active(addr));
                self.reply("200 PORT command successful. Consider using PASV.\r\n").await?;
            }
            "PASV" => {
                let listener = TcpListener::bind("127.0.0.1:0").await?;
                let port = listener.local_addr()?.port();
                self.pending = Some(PendingData::Passive(listener));
                self.reply(&format!(
                    "227 Entering Passive Mode (127,0,0,1,{},{}).\r\n",
                    port / 256,
                    port % 256
                ))
                .await?;
            }
            "RETR" => {
                let path = self.path(arg);
                let content = self.shared.lock().unwrap().tree.files.get(&path).cloned();
                let content = match content {
                    Some(content) => content,
                    None => {
                        self.pending = None;
                        self.reply("550 Failed to open file.\r\n").await?;
                        return Ok(true);
                    }
                };
                if let Some(delay) = self.options.stall_data {
                    self.stall(delay).await?;
                    return Ok(true);
                }
                self.reply("150 Opening BINARY mode data connection.\r\n").await?;
                let mut data = self.open_data().await?;
                data.write_all(&content).await?;
                data.shutdown().await?;
                drop(data);
                self.reply("226 Transfer complete.\r\n").await?;
            }
            "STOR" => {
                if let Some(reply) = self.options.stor_reply.clone() {
                    self.pending = None;
                    self.reply(&reply).await?;
                    return Ok(true);
                }
                if let Some(delay) = self.options.stall_data {
                    self.stall(delay).await?;
                    return Ok(true);
                }
                let path = self.path(arg);
                self.reply("150 Ok to send data.\r\n").await?;
                let mut data = self.open_data().await?;
                let mut content = Vec::new();
                data.read_to_end(&mut content).await?;
                drop(data);
                self.shared.lock().unwrap().tree.files.insert(path, content);
                self.reply("226 Transfer complete.\r\n").await?;
            }
            "LIST" => {
                if self.options.deny_list.contains(&self.cwd) {
                    self.pending = None;
                    self.reply("550 Permission denied.\r\n").await?;
                    return Ok(true);
                }
                if let Some(delay) = self.options.stall_data {
                    self.stall(delay).await?;
                    return Ok(true);
                }
                let entries = self.shared.lock().unwrap().tree.children(&self.cwd);
                let mut listing = String::new();
                for (name, size) in entries {
                    match size {
                        None => listing.push_str(&format!(
                            "drwxr-xr-x 1 owner group 0 Jan 01 00:00 {}\r\n",
                            name
                        )),
                        Some(size) => listing.push_str(&format!(
                            "-rw-r--r-- 1 owner group {} Jan 01 00:00 {}\r\n",
                            size, name
                        )),
                    }
                }
                self.reply("150 Here comes the directory listing.\r\n").await?;
                let mut data = self.open_data().await?;
                data.write_all(listing.as_bytes()).await?;
                data.shutdown().await?;
                drop(data);
                self.reply("226 Directory send OK.\r\n").await?;
            }
            "CWD" => {
                let path = self.path(arg);
                let is_dir = self.shared.lock().unwrap().tree.dirs.contains(&path);
                if is_dir {
                    self.cwd = path;
                    self.reply("250 Directory successfully changed.\r\n").await?;
                } else {
                    self.reply("550 Failed to change directory.\r\n").await?;
                }
            }
            "PWD" => {
                let quoted = self.cwd.replace('"', "\"\"");
                self.reply(&format!("257 \"{}\" is the current directory\r\n", quoted)).await?;
            }
            "MKD" => {
                let path = self.path(arg);
                let created = {
                    let mut shared = self.shared.lock().unwrap();
                    let tree = &mut shared.tree;
                    if tree.exists(&path) || !tree.dirs.contains(parent_of(&path)) {
                        false
                    } else {
                        tree.dirs.insert(path.clone());
                        true
                    }
                };
                if created {
                    self.reply(&format!("257 \"{}\" created\r\n", path)).await?;
                } else {
                    self.reply("550 Create directory operation failed.\r\n").await?;
                }
            }
            "RMD" => {
                let path = self.path(arg);
                let removed = {
                    let mut shared = self.shared.lock().unwrap();
                    let tree = &mut shared.tree;
                    if path != "/" && tree.dirs.contains(&path) && tree.children(&path).is_empty() {
                        tree.dirs.remove(&path);
                        true
                    } else {
                        false
                    }
                };
                if removed {
                    self.reply("250 Remove directory operation successful.\r\n").await?;
                } else {
                    self.reply("550 Remove directory operation failed.\r\n").await?;
                }
            }
            "DELE" => {
                let path = self.path(arg);
                let removed = self.shared.lock().unwrap().tree.files.remove(&path).is_some();
                if removed {
                    self.reply("250 Delete operation successful.\r\n").await?;
                } else {
                    self.reply("550 Delete operation failed.\r\n").await?;
                }
            }
            "RNFR" => {
                let path = self.path(arg);
                let exists = self.shared.lock().unwrap().tree.exists(&path);
                if exists {
                    self.rename_from = Some(path);
                    self.reply("350 Ready for RNTO.\r\n").await?;
                } else {
                    self.reply("550 RNFR command failed.\r\n").await?;
                }
            }
            "RNTO" => {
                let from = match self.rename_from.take() {
                    Some(from) => from,
                    None => {
                        self.reply("503 RNFR required first.\r\n").await?;
                        return Ok(true);
                    }
                };
                let to = self.path(arg);
                {
                    let mut shared = self.shared.lock().unwrap();
                    let tree = &mut shared.tree;
                    if let Some(content) = tree.files.remove(&from) {
                        tree.files.insert(to, content);
                    } else if tree.dirs.remove(&from) {
                        tree.dirs.insert(to);
                    }
                }
                self.reply("250 Rename successful.\r\n").await?;
            }
            _ => {
                self.reply("502 Command not implemented.\r\n").await?;
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve() {
        assert_eq!(resolve("/", "docs"), "/docs");
        assert_eq!(resolve("/docs", ".."), "/");
        assert_eq!(resolve("/docs", "/pub/a"), "/pub/a");
        assert_eq!(resolve("/docs/inner", "../x"), "/docs/x");
    }
}
