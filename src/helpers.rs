use log::trace;

/// Decodes a chunk of control-channel bytes, dropping anything that is not valid UTF-8.
pub fn decode_dropping_invalid(bytes: &[u8]) -> String {
    let mut decoded = String::with_capacity(bytes.len());
    let mut rest = bytes;
    loop {
        match std::str::from_utf8(rest) {
            Ok(valid) => {
                decoded.push_str(valid);
                return decoded;
            }
            Err(e) => {
                let (valid, after) = rest.split_at(e.valid_up_to());
                decoded.push_str(std::str::from_utf8(valid).unwrap_or_default());
                // An incomplete sequence at the end has no error length.
                let skip = e.error_len().unwrap_or(after.len());
                rest = &after[skip..];
            }
        }
    }
}

/// Builds the CRLF-terminated wire line for a command.
pub fn format_command_line(command: &str, argument: Option<&str>) -> String {
    match argument {
        Some(arg) => format!("{} {}\r\n", command, arg),
        None => format!("{}\r\n", command),
    }
}

/// The command as it may appear in logs.
pub fn loggable_command(command: &str, argument: Option<&str>) -> String {
    match argument {
        Some(_) if command.eq_ignore_ascii_case("PASS") => format!("{} ****", command),
        Some(arg) => format!("{} {}", command, arg),
        None => command.to_string(),
    }
}

/// Extracts the path from a `257 "path" ...` reply.
///
/// A doubled quote inside the path stands for one literal quote.
pub fn parse_quoted_path(text: &str) -> Option<String> {
    let start = text.find('"')? + 1;
    let mut path = String::new();
    let mut chars = text[start..].chars().peekable();
    while let Some(c) = chars.next() {
        if c == '"' {
            if chars.peek() == Some(&'"') {
                chars.next();
                path.push('"');
            } else {
                trace!("Parsed quoted path: {}", path);
                return Some(path);
            }
        } else {
            path.push(c);
        }
    }
    None
}

/// Drops the last `/`-separated segment of a remote path.
pub fn parent_directory(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rsplit_once('/') {
        Some((parent, _)) if !parent.is_empty() => parent.to_string(),
        _ => String::from("/"),
    }
}

/// Last segment of a remote or local path.
pub fn base_name(path: &str) -> &str {
    path.trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(path)
}
