use bytes::{Buf, BytesMut};
use std::io::Cursor;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tracing::debug;
use uuid::Uuid;

use crate::cmd::Command;
use crate::frame::{self, Reply};
use crate::{Error, Result};

/// One live connection to a Redis server.
///
/// Data is read from the socket into the read buffer. When a reply is
/// parsed, the corresponding data is removed from the buffer, so
/// sequential [`read_reply`](Connection::read_reply) calls consume
/// sequential frames. All I/O is blocking (at the async level: awaited to
/// completion); timeouts belong on the socket, not here.
pub struct Connection {
    pub id: Uuid,
    stream: TcpStream,
    buffer: BytesMut,
}

impl Connection {
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Connection> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Connection::new(stream))
    }

    pub fn new(stream: TcpStream) -> Connection {
        Connection {
            id: Uuid::new_v4(),
            stream,
            // Allocate the buffer with 4kb of capacity.
            buffer: BytesMut::with_capacity(4096),
        }
    }

    /// Encodes and writes one command frame.
    pub async fn write_command(&mut self, command: &Command) -> Result<()> {
        let frame = command.encode();

        debug!(connection_id = %self.id, command = %command, "writing command frame");

        self.stream.write_all(&frame).await?;
        self.stream.flush().await?;

        Ok(())
    }

    /// Reads exactly one reply frame.
    ///
    /// A top-level null bulk string (`$-1`) surfaces as
    /// [`Error::NotFound`]; an error frame as [`Error::Server`] with the
    /// server's message verbatim. After either, the offending frame has
    /// been consumed and the connection stays usable. A peer that closes
    /// the stream mid-frame surfaces as [`Error::Io`].
    pub async fn read_reply(&mut self) -> Result<Reply> {
        loop {
            let mut cursor = Cursor::new(&self.buffer[..]);

            match Reply::parse(&mut cursor) {
                Ok(reply) => {
                    let position = cursor.position() as usize;
                    self.buffer.advance(position);

                    debug!(connection_id = %self.id, reply = %reply, "decoded reply");

                    if let Reply::Null = reply {
                        return Err(Error::NotFound);
                    }
                    return Ok(reply);
                }
                // Not enough buffered data for a whole frame yet.
                Err(frame::Error::Incomplete) => {
                    if 0 == self.stream.read_buf(&mut self.buffer).await? {
                        return Err(Error::Io(std::io::Error::new(
                            std::io::ErrorKind::UnexpectedEof,
                            "connection closed by peer mid-reply",
                        )));
                    }
                }
                Err(err @ frame::Error::Server(_)) => {
                    // The error line itself has been consumed; drop it from
                    // the buffer so the next call starts on a fresh frame.
                    let position = cursor.position() as usize;
                    self.buffer.advance(position);

                    return Err(err.into());
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Closes the connection. Consumes `self`: there is no such thing as a
    /// closed-but-still-held connection.
    pub async fn close(mut self) -> Result<()> {
        debug!(connection_id = %self.id, "closing connection");
        self.stream.shutdown().await?;
        Ok(())
    }
}
