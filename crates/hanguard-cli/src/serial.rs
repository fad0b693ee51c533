//! Serial implementation of the gateway transport.
//!
//! `serialport` reads are blocking, so the port is split: a dedicated OS
//! thread owns the read side and forwards raw chunks over a channel, while
//! the async side keeps the original handle for writes. Writes are a handful
//! of bytes at 115200 baud and complete fast enough to stay on the async
//! thread.
//!
//! The reference deployment is an RS-485 adapter at 115200 8E1.

use std::io::{self, Read, Write};
use std::thread;
use std::time::Duration;

use serialport::{DataBits, Parity, SerialPort, StopBits};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use hanguard_core::constants::{BAUD_RATE, READ_TIMEOUT_MS};
use hanguard_core::{Error, Result};
use hanguard_gateway::BusTransport;

const READ_CHUNK_SIZE: usize = 256;
const CHANNEL_CAPACITY: usize = 64;

/// Serial port bridged into the async gateway loop.
pub struct SerialTransport {
    incoming: mpsc::Receiver<Vec<u8>>,
    writer: Box<dyn SerialPort>,
    read_timeout: Duration,
}

impl SerialTransport {
    /// Open the door bus on `path` with the fixed line parameters (115200
    /// baud, 8 data bits, even parity, 1 stop bit) and spawn the reader
    /// thread.
    ///
    /// # Errors
    /// Fails if the device cannot be opened or cloned for the reader.
    pub fn open(path: &str) -> Result<Self> {
        let writer = serialport::new(path, BAUD_RATE)
            .data_bits(DataBits::Eight)
            .parity(Parity::Even)
            .stop_bits(StopBits::One)
            .timeout(Duration::from_millis(READ_TIMEOUT_MS))
            .open()
            .map_err(|e| Error::Transport(format!("opening {path}: {e}")))?;

        let reader = writer
            .try_clone()
            .map_err(|e| Error::Transport(format!("cloning {path} for reads: {e}")))?;

        let (tx, incoming) = mpsc::channel(CHANNEL_CAPACITY);
        thread::Builder::new()
            .name("hanguard-serial-read".to_string())
            .spawn(move || read_loop(reader, tx))
            .map_err(|e| Error::Transport(format!("spawning reader thread: {e}")))?;

        Ok(Self {
            incoming,
            writer,
            read_timeout: Duration::from_millis(READ_TIMEOUT_MS),
        })
    }
}

impl BusTransport for SerialTransport {
    async fn read(&mut self) -> Result<Option<Vec<u8>>> {
        match tokio::time::timeout(self.read_timeout, self.incoming.recv()).await {
            Ok(Some(chunk)) => Ok(Some(chunk)),
            // Channel closed: the reader thread hit a hard error and exited.
            Ok(None) => Err(Error::Transport(
                "serial reader thread terminated".to_string(),
            )),
            Err(_elapsed) => Ok(None),
        }
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Blocking read loop run on the dedicated thread. Exits when the port fails
/// or the gateway side drops the channel.
fn read_loop(mut port: Box<dyn SerialPort>, tx: mpsc::Sender<Vec<u8>>) {
    let mut buf = [0u8; READ_CHUNK_SIZE];
    loop {
        match port.read(&mut buf) {
            Ok(0) => {}
            Ok(n) => {
                if tx.blocking_send(buf[..n].to_vec()).is_err() {
                    debug!("gateway side closed, stopping serial reads");
                    return;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::TimedOut => {}
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => {
                warn!(error = %e, "serial read failed, stopping");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_device_fails() {
        let result = SerialTransport::open("/dev/hanguard-does-not-exist");
        assert!(matches!(result, Err(Error::Transport(_))));
    }
}
