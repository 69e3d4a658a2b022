use std::io::Read;
use std::sync::Arc;
use std::thread;
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

/// Receives every raw chunk read from the companion.
pub type TranscriptHandler = Arc<dyn Fn(&[u8]) + Send + Sync>;

/// Spawns a background thread to read companion output.
///
/// The channel closes when the reader hits end of stream or an error; on
/// Linux a PTY master reports `EIO` once the child has exited.
pub fn spawn_reader<R: Read + Send + 'static>(
    mut reader: R,
    transcript: TranscriptHandler,
) -> UnboundedReceiver<Vec<u8>> {
    let (tx, rx) = unbounded_channel();

    thread::spawn(move || {
        let mut buffer = [0u8; 4096];
        loop {
            match reader.read(&mut buffer) {
                Ok(0) => break, // EOF
                Ok(n) => {
                    transcript(&buffer[..n]);
                    if tx.send(buffer[..n].to_vec()).is_err() {
                        break; // Receiver dropped
                    }
                }
                Err(err) => {
                    tracing::debug!(error = %err, "companion output closed");
                    break;
                }
            }
        }
    });

    rx
}
