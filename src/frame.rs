// https://redis.io/docs/reference/protocol-spec

use std::fmt;

use bytes::Buf;
use bytes::Bytes;
use std::io::Cursor;
use thiserror::Error as ThisError;

static CRLF: &[u8; 2] = b"\r\n";

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("not enough data is available to parse an entire reply")]
    Incomplete,
    #[error("invalid reply data type: {0}")]
    InvalidDataType(u8),
    #[error("invalid length prefix: {0}")]
    InvalidLength(String),
    #[error("invalid UTF-8 in reply line")]
    InvalidUtf8,
    /// The server answered with an error frame (`-...`). Never represented
    /// as a [`Reply`] value, even inside arrays.
    #[error("{0}")]
    Server(String),
}

/// One decoded RESP reply frame.
///
/// `Integer` keeps the raw decimal digits as received; numeric parsing
/// happens in the projections so a caller asking for text never pays for
/// (or trips over) an integer conversion.
#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    Simple(String),
    Integer(String),
    Bulk(Bytes),
    /// A bulk string with a negative declared length: the value is absent.
    /// Not the same thing as `Bulk("")`.
    Null,
    Array(Vec<Reply>),
}

impl Reply {
    /// Parses one reply frame out of `src`, recursing for arrays.
    ///
    /// Returns [`Error::Incomplete`] when the buffer does not yet hold the
    /// whole frame; the caller is expected to read more bytes and retry
    /// from the same start position. On success the cursor sits exactly at
    /// the end of the parsed frame, so sequential calls consume sequential
    /// frames.
    ///
    /// Recursion depth is driven by peer-declared array counts. This
    /// client trusts its peer; there is no depth budget.
    pub fn parse(src: &mut Cursor<&[u8]>) -> Result<Self, Error> {
        // The first byte in a RESP-serialized payload always identifies
        // its type. Subsequent bytes constitute the type's contents.
        let data_type = get_u8(src)?;

        match data_type {
            // +OK\r\n
            b'+' => {
                let line = get_line(src)?;
                Ok(Reply::Simple(to_utf8(line)?))
            }
            // -ERR unknown command\r\n
            b'-' => {
                let line = get_line(src)?;
                Err(Error::Server(to_utf8(line)?))
            }
            // :1000\r\n
            b':' => {
                let line = get_line(src)?;
                Ok(Reply::Integer(to_utf8(line)?))
            }
            // $<length>\r\n<data>\r\n
            b'$' => {
                let length = get_decimal::<i64>(src)?;

                if length < 0 {
                    return Ok(Reply::Null);
                }

                let data = get_exact(src, length as usize)?;

                Ok(Reply::Bulk(data))
            }
            // *<number-of-elements>\r\n<element-1>...<element-n>
            b'*' => {
                let length = get_decimal::<u64>(src)?;

                let mut replies = Vec::with_capacity(length as usize);
                for _ in 0..length {
                    let reply = Self::parse(src)?;
                    replies.push(reply);
                }

                Ok(Reply::Array(replies))
            }
            data_type => Err(Error::InvalidDataType(data_type)),
        }
    }

    /// Short reply-kind name, used in type-mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Reply::Simple(_) => "simple string",
            Reply::Integer(_) => "integer",
            Reply::Bulk(_) => "bulk string",
            Reply::Null => "null",
            Reply::Array(_) => "array",
        }
    }

    /// Projects a scalar reply into text. Arrays and nulls don't fit.
    pub fn into_string(self) -> crate::Result<String> {
        match self {
            Reply::Simple(s) => Ok(s),
            Reply::Integer(digits) => Ok(digits),
            Reply::Bulk(bytes) => String::from_utf8(bytes.to_vec())
                .map_err(|e| crate::Error::Parse(e.to_string())),
            reply => Err(mismatch("a scalar reply", &reply)),
        }
    }

    /// Projects a scalar reply into a boolean. Accepts case-insensitive
    /// `true`/`false` as well as the `0`/`1` integer convention Redis uses
    /// for predicates like EXISTS and SISMEMBER.
    pub fn into_bool(self) -> crate::Result<bool> {
        match self {
            Reply::Simple(_) | Reply::Integer(_) | Reply::Bulk(_) => {
                let text = self.into_string()?;
                match text.to_ascii_lowercase().as_str() {
                    "true" | "1" => Ok(true),
                    "false" | "0" => Ok(false),
                    _ => Err(crate::Error::TypeMismatch {
                        expected: "a boolean reply",
                        actual: text,
                    }),
                }
            }
            reply => Err(mismatch("a boolean reply", &reply)),
        }
    }

    /// Projects a scalar reply into a signed 64-bit integer.
    pub fn into_int(self) -> crate::Result<i64> {
        match self {
            Reply::Simple(_) | Reply::Integer(_) | Reply::Bulk(_) => {
                let text = self.into_string()?;
                text.parse::<i64>()
                    .map_err(|e| crate::Error::Parse(format!("{text:?}: {e}")))
            }
            reply => Err(mismatch("an integer reply", &reply)),
        }
    }

    /// Projects an array reply whose every element is a scalar into an
    /// ordered list of strings. A null or nested-array element fails the
    /// whole projection; there are no partial results.
    pub fn into_string_array(self) -> crate::Result<Vec<String>> {
        let elements = self.into_array()?;

        let mut strings = Vec::with_capacity(elements.len());
        for element in elements {
            strings.push(element.into_string()?);
        }

        Ok(strings)
    }

    /// Projects an array reply into its raw elements, preserving each
    /// element's kind (nulls and nested arrays included).
    pub fn into_array(self) -> crate::Result<Vec<Reply>> {
        match self {
            Reply::Array(elements) => Ok(elements),
            reply => Err(mismatch("an array reply", &reply)),
        }
    }
}

fn mismatch(expected: &'static str, actual: &Reply) -> crate::Error {
    crate::Error::TypeMismatch {
        expected,
        actual: actual.kind().to_string(),
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Simple(s) => write!(f, "+{}", s),
            Reply::Integer(digits) => write!(f, ":{}", digits),
            Reply::Bulk(bytes) => write!(f, "${}", String::from_utf8_lossy(bytes)),
            Reply::Null => write!(f, "$-1"),
            Reply::Array(arr) => {
                write!(f, "*{}", arr.len())?;
                for reply in arr {
                    write!(f, " {}", reply)?;
                }
                Ok(())
            }
        }
    }
}

impl From<Error> for crate::Error {
    fn from(src: Error) -> crate::Error {
        match src {
            Error::Server(message) => crate::Error::Server(message),
            // Incomplete is handled by the read loop before conversion; if
            // it escapes, the stream ended mid-frame.
            Error::Incomplete => crate::Error::Protocol("incomplete reply".to_string()),
            err => crate::Error::Protocol(err.to_string()),
        }
    }
}

fn get_u8(src: &mut Cursor<&[u8]>) -> Result<u8, Error> {
    if !src.has_remaining() {
        return Err(Error::Incomplete);
    }
    Ok(src.get_u8())
}

/// Reads up to the next CRLF, returning the line without its terminator
/// and leaving the cursor positioned after it.
fn get_line<'a>(src: &mut Cursor<&'a [u8]>) -> Result<&'a [u8], Error> {
    let start = src.position() as usize;
    let end = src.get_ref().len();

    let line_end = src.get_ref()[start..end]
        .windows(2)
        .position(|window| window == CRLF)
        .ok_or(Error::Incomplete)
        .map(|index| start + index)?;

    src.set_position((line_end + CRLF.len()) as u64);

    Ok(&src.get_ref()[start..line_end])
}

/// Reads a decimal length/count line, e.g. the `5` of `$5\r\n`.
fn get_decimal<T: std::str::FromStr>(src: &mut Cursor<&[u8]>) -> Result<T, Error> {
    let line = get_line(src)?;
    let text = to_utf8(line)?;
    text.parse::<T>().map_err(|_| Error::InvalidLength(text))
}

/// Reads exactly `n` payload bytes plus the trailing CRLF. The terminator
/// is consumed but not validated.
fn get_exact(src: &mut Cursor<&[u8]>, n: usize) -> Result<Bytes, Error> {
    if src.remaining() < n + CRLF.len() {
        return Err(Error::Incomplete);
    }

    let start = src.position() as usize;
    let data = Bytes::copy_from_slice(&src.get_ref()[start..start + n]);
    src.set_position((start + n + CRLF.len()) as u64);

    Ok(data)
}

fn to_utf8(line: &[u8]) -> Result<String, Error> {
    String::from_utf8(line.to_vec()).map_err(|_| Error::InvalidUtf8)
}
