//! The command/response exchange with a running companion.

use crate::error::Error;
use crate::pty::PtySession;
use crate::response::{Reply, Response, ResponseReader};
use std::io::Write;
use tokio::sync::mpsc::UnboundedReceiver;

/// Terminates every command line. A PTY passes `\n` through untouched;
/// `\r\n` would arrive as two lines, the second an extra status query.
pub const LINE_TERMINATOR: &[u8] = b"\n";

/// Owns the companion's channels and runs one exchange at a time
pub struct Engine {
    pty: Option<PtySession>,
    writer: Box<dyn Write + Send>,
    output_rx: UnboundedReceiver<Vec<u8>>,
    reader: ResponseReader,
}

impl Engine {
    /// Create an engine over a writer and the output receiver
    pub fn new(
        pty: Option<PtySession>,
        writer: Box<dyn Write + Send>,
        output_rx: UnboundedReceiver<Vec<u8>>,
    ) -> Self {
        Engine {
            pty,
            writer,
            output_rx,
            reader: ResponseReader::new(),
        }
    }

    pub fn pid(&self) -> Option<u32> {
        self.pty.as_ref().and_then(PtySession::pid)
    }

    /// Send `command` and decode the data lines of a successful response.
    ///
    /// An `error` response becomes [`Error::Protocol`]. When nothing usable
    /// precedes the terminator the message falls back to the command and the
    /// raw response text.
    pub async fn execute(&mut self, command: &str) -> Result<Reply, Error> {
        let response = self.round_trip(command).await?;
        if response.is_ok() {
            let reply = response.reply();
            tracing::debug!(command, ?reply, "ok");
            return Ok(reply);
        }

        let message = response
            .error_message()
            .unwrap_or_else(|| format!("{command} failed: {}", response.raw().trim_end()));
        tracing::debug!(command, %message, "error");
        Err(Error::Protocol(message))
    }

    /// Send a bare terminator and return the payload ahead of `ok`.
    pub async fn status(&mut self) -> Result<String, Error> {
        let response = self.round_trip("").await?;
        if !response.is_ok() {
            let message = response
                .error_message()
                .unwrap_or_else(|| format!("status query failed: {}", response.raw().trim_end()));
            return Err(Error::Protocol(message));
        }
        Ok(response.payload())
    }

    /// Write one line and block until a full response or end of stream.
    pub async fn round_trip(&mut self, line: &str) -> Result<Response, Error> {
        tracing::debug!(command = line, "sending");
        let mut bytes = Vec::with_capacity(line.len() + LINE_TERMINATOR.len());
        bytes.extend_from_slice(line.as_bytes());
        bytes.extend_from_slice(LINE_TERMINATOR);
        self.writer.write_all(&bytes)?;
        self.writer.flush()?;

        loop {
            if let Some(response) = self.reader.next_response() {
                return Ok(response);
            }
            match self.output_rx.recv().await {
                Some(chunk) => self.reader.feed(&chunk),
                None => {
                    tracing::warn!(command = line, "companion output ended before a terminator");
                    return Err(Error::ProcessDied);
                }
            }
        }
    }

    /// Reap the companion, waiting for it to exit.
    ///
    /// The blocking wait runs on tokio's blocking pool so a companion that
    /// lingers after `Quit` does not stall the runtime.
    pub async fn wait_for_exit(&mut self) {
        let Some(mut pty) = self.pty.take() else {
            return;
        };
        match tokio::task::spawn_blocking(move || pty.wait()).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::debug!(error = %err, "wait on companion failed"),
            Err(err) => tracing::debug!(error = %err, "reaper task failed"),
        }
    }

    /// Kill the companion if it is still running, then reap it
    pub fn shutdown(&mut self) {
        let Some(mut pty) = self.pty.take() else {
            return;
        };
        if !pty.is_running() {
            return;
        }
        if let Err(err) = pty.kill() {
            tracing::debug!(error = %err, "kill companion failed");
            return;
        }
        if let Err(err) = pty.wait() {
            tracing::debug!(error = %err, "wait on killed companion failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SharedWriter;
    use tokio::sync::mpsc::unbounded_channel;

    fn engine_with(chunks: &[&str]) -> (Engine, SharedWriter) {
        let (tx, rx) = unbounded_channel();
        for chunk in chunks {
            tx.send(chunk.as_bytes().to_vec()).unwrap();
        }
        let writer = SharedWriter::default();
        (Engine::new(None, Box::new(writer.clone()), rx), writer)
    }

    #[tokio::test]
    async fn test_execute_writes_command_line() {
        let (mut engine, writer) = engine_with(&["ok\r\n"]);
        assert_eq!(engine.execute("Enter").await.unwrap(), Reply::Empty);
        assert_eq!(writer.contents(), "Enter\n");
    }

    #[tokio::test]
    async fn test_execute_decodes_across_chunks() {
        let (mut engine, _) = engine_with(&["data: 2", "4\r\ndata: 80\r", "\nok\r\n"]);
        let reply = engine.execute("Ascii(0,0,2)").await.unwrap();
        assert_eq!(reply, Reply::List(vec!["24".into(), "80".into()]));
    }

    #[tokio::test]
    async fn test_execute_error_payload() {
        let (mut engine, _) = engine_with(&["Field not found\r\nerror\r\n"]);
        let err = engine.execute("MoveCursor(99,99)").await.unwrap_err();
        assert!(matches!(err, Error::Protocol(ref m) if m == "Field not found"));
    }

    #[tokio::test]
    async fn test_execute_bare_error_falls_back_to_raw() {
        let (mut engine, _) = engine_with(&["error\r\n"]);
        let err = engine.execute("Bogus").await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Bogus"), "got: {message}");
        assert!(message.contains("error"), "got: {message}");
    }

    #[tokio::test]
    async fn test_end_of_stream_is_process_died() {
        let (mut engine, _) = engine_with(&["data: partial\r\n"]);
        assert!(matches!(engine.execute("Enter").await, Err(Error::ProcessDied)));
    }

    #[tokio::test]
    async fn test_status_sends_bare_line() {
        let (mut engine, writer) = engine_with(&["U F U C(host) I 2 24 80 0 0 0x0 -\r\nok\r\n"]);
        let status = engine.status().await.unwrap();
        assert_eq!(status, "U F U C(host) I 2 24 80 0 0 0x0 -");
        assert_eq!(writer.contents(), "\n");
    }

    #[tokio::test]
    async fn test_responses_stay_in_order() {
        let (mut engine, _) = engine_with(&["data: one\nok\ndata: two\nok\n"]);
        assert_eq!(engine.execute("A").await.unwrap(), Reply::Scalar("one".into()));
        assert_eq!(engine.execute("B").await.unwrap(), Reply::Scalar("two".into()));
    }
}
