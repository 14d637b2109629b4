use std::fmt;

static CRLF: &str = "\r\n";

/// A command name plus its ordered arguments, ready to be encoded into a
/// single inline request frame.
///
/// Built and written once per call; never reused.
///
/// ```
/// use redlink::cmd::Command;
///
/// let cmd = Command::new("SET").arg("greeting").arg("hello world");
/// assert_eq!(cmd.encode(), b"SET \"greeting\" \"hello world\"\r\n");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    name: String,
    args: Vec<String>,
}

impl Command {
    /// `name` must be non-empty; it is sent as-is, unquoted.
    pub fn new(name: impl Into<String>) -> Command {
        let name = name.into();
        debug_assert!(!name.is_empty(), "command name must be non-empty");

        Command {
            name,
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Command {
        self.args.push(arg.into());
        self
    }

    pub fn args<I>(mut self, args: I) -> Command
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Encodes the command as one inline request line: the name, then each
    /// argument quoted and space-separated, then CRLF. Pure; always
    /// succeeds.
    ///
    /// This is the text-safe inline encoding, not RESP's length-prefixed
    /// multi-bulk request format: arguments containing the separator or
    /// control characters round-trip as single tokens thanks to the
    /// quoting, but embedded NUL bytes are not guaranteed to survive.
    pub fn encode(&self) -> Vec<u8> {
        let mut frame = String::with_capacity(self.name.len() + CRLF.len());

        frame.push_str(&self.name);
        for arg in &self.args {
            frame.push(' ');
            quote_into(&mut frame, arg);
        }
        frame.push_str(CRLF);

        frame.into_bytes()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Renders `arg` as a double-quoted token, escaping quotes, backslashes
/// and control characters.
fn quote_into(out: &mut String, arg: &str) {
    out.push('"');
    for c in arg.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
