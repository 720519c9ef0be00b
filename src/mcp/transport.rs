//! Line-delimited JSON-RPC transport.
//!
//! Implements the MCP stdio framing over any async reader/writer pair:
//!
//! - Messages are UTF-8 encoded JSON-RPC
//! - Messages are delimited by newlines
//! - Messages must not contain embedded newlines
//!
//! [`StdioTransport`] binds it to stdin/stdout; stderr stays free for logging.
//! Tests drive the same code over in-memory pipes.

use std::io;

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::mcp::protocol::{JsonRpcError, JsonRpcResponse};

/// A newline-delimited JSON-RPC transport.
pub struct Transport<R, W> {
    /// Buffered message source.
    reader: R,
    /// Message sink.
    writer: W,
}

/// The transport used by the server binary.
pub type StdioTransport = Transport<BufReader<tokio::io::Stdin>, tokio::io::Stdout>;

impl StdioTransport {
    /// Creates a transport over the process's stdin and stdout.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> Transport<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a transport over `reader` and `writer`.
    #[must_use]
    pub const fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Reads the next message line.
    ///
    /// Returns `None` if the reader is closed (EOF).
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails.
    pub async fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        let bytes_read = self.reader.read_line(&mut line).await?;

        if bytes_read == 0 {
            return Ok(None);
        }

        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }

        Ok(Some(line))
    }

    /// Writes a JSON-RPC success response.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or writing fails.
    pub async fn write_response(&mut self, response: &JsonRpcResponse) -> io::Result<()> {
        self.write_message(response).await
    }

    /// Writes a JSON-RPC error response.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or writing fails.
    pub async fn write_error(&mut self, error: &JsonRpcError) -> io::Result<()> {
        self.write_message(error).await
    }

    /// Serialises `message` as one line and flushes it.
    async fn write_message<T: Serialize + Sync>(&mut self, message: &T) -> io::Result<()> {
        let json = serde_json::to_string(message)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        // MCP stdio framing: no embedded newlines
        debug_assert!(
            !json.contains('\n'),
            "JSON message must not contain embedded newlines"
        );

        self.writer.write_all(json.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;

        Ok(())
    }

    /// Consumes the transport, returning the reader and writer.
    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::protocol::RequestId;

    #[tokio::test]
    async fn read_line_strips_line_endings() {
        let reader = tokio_test::io::Builder::new()
            .read(b"{\"a\":1}\r\n{\"b\":2}\n")
            .build();
        let mut transport = Transport::new(BufReader::new(reader), Vec::new());

        assert_eq!(transport.read_line().await.unwrap().as_deref(), Some("{\"a\":1}"));
        assert_eq!(transport.read_line().await.unwrap().as_deref(), Some("{\"b\":2}"));
        assert_eq!(transport.read_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn write_response_is_one_line() {
        let writer = tokio_test::io::Builder::new()
            .write(br#"{"jsonrpc":"2.0","id":1,"result":{"ok":true}}"#)
            .write(b"\n")
            .build();
        let mut transport = Transport::new(BufReader::new(tokio::io::empty()), writer);

        let response = JsonRpcResponse::success(RequestId::Number(1), serde_json::json!({"ok": true}));
        transport.write_response(&response).await.unwrap();
    }

    #[tokio::test]
    async fn serialise_error_no_newlines() {
        let mut transport = Transport::new(BufReader::new(tokio::io::empty()), Vec::new());
        let error = JsonRpcError::method_not_found(RequestId::Number(1), "test/method");
        transport.write_error(&error).await.unwrap();

        let (_, written) = transport.into_parts();
        let text = String::from_utf8(written).unwrap();
        assert_eq!(text.matches('\n').count(), 1);
        assert!(text.ends_with('\n'));
        assert!(text.contains("test/method"));
    }
}
