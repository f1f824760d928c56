//! Byte transports underneath a [`Connection`](crate::Connection).
//!
//! Serial, Bluetooth and network links live outside this crate and plug in
//! through [`Transport`]. Two in-memory transports are provided: a
//! [`loopback`] pair where another thread plays the printer, and a
//! [`ScriptedTransport`] that answers requests from a fixed script.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use flume::RecvTimeoutError;
use parking_lot::Mutex;
use tracing::trace;

use crate::error::TransportError;

pub trait Transport: Send {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

    /// Wait up to `timeout` for the next chunk of input. `Ok(None)` means
    /// nothing arrived within `timeout`.
    fn read(&mut self, timeout: Duration) -> Result<Option<Vec<u8>>, TransportError>;

    /// Drop input that arrived before the next request.
    fn discard_input(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Host side of an in-memory link.
pub struct LoopbackTransport {
    tx: flume::Sender<Vec<u8>>,
    rx: flume::Receiver<Vec<u8>>,
}

/// Printer side of an in-memory link.
pub struct PrinterEnd {
    rx: flume::Receiver<Vec<u8>>,
    tx: flume::Sender<Vec<u8>>,
}

/// Create a connected pair of in-memory endpoints.
pub fn loopback() -> (LoopbackTransport, PrinterEnd) {
    let (host_tx, printer_rx) = flume::unbounded();
    let (printer_tx, host_rx) = flume::unbounded();
    (
        LoopbackTransport {
            tx: host_tx,
            rx: host_rx,
        },
        PrinterEnd {
            rx: printer_rx,
            tx: printer_tx,
        },
    )
}

fn recv_chunk(
    rx: &flume::Receiver<Vec<u8>>,
    timeout: Duration,
) -> Result<Option<Vec<u8>>, TransportError> {
    match rx.recv_timeout(timeout) {
        Ok(chunk) => Ok(Some(chunk)),
        Err(RecvTimeoutError::Timeout) => Ok(None),
        Err(RecvTimeoutError::Disconnected) => Err(TransportError::Closed),
    }
}

impl Transport for LoopbackTransport {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.tx
            .send(bytes.to_vec())
            .map_err(|_| TransportError::Closed)
    }

    fn read(&mut self, timeout: Duration) -> Result<Option<Vec<u8>>, TransportError> {
        recv_chunk(&self.rx, timeout)
    }

    fn discard_input(&mut self) -> Result<(), TransportError> {
        let dropped = self.rx.drain().count();
        if dropped > 0 {
            trace!("[TRN] discarded {} stale chunk(s)", dropped);
        }
        Ok(())
    }
}

impl PrinterEnd {
    /// Wait for the next request written by the host.
    pub fn recv_request(&self, timeout: Duration) -> Result<Option<Vec<u8>>, TransportError> {
        recv_chunk(&self.rx, timeout)
    }

    /// Send one chunk to the host.
    pub fn reply(&self, bytes: impl AsRef<[u8]>) -> Result<(), TransportError> {
        self.tx
            .send(bytes.as_ref().to_vec())
            .map_err(|_| TransportError::Closed)
    }
}

/// Requests written to a [`ScriptedTransport`], shared so they stay readable
/// after the transport moves into a connection.
#[derive(Debug, Clone, Default)]
pub struct RequestLog(Arc<Mutex<Vec<Vec<u8>>>>);

impl RequestLog {
    pub fn requests(&self) -> Vec<Vec<u8>> {
        self.0.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }
}

#[derive(Debug)]
struct ScriptedReply {
    request: Vec<u8>,
    chunks: Vec<Vec<u8>>,
}

/// Transport that answers each request with the next scripted reply.
///
/// Requests must arrive in script order. A scripted reply without chunks
/// simulates a printer that stays silent, so the read times out at once.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: VecDeque<ScriptedReply>,
    pending: VecDeque<Vec<u8>>,
    log: RequestLog,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `request` with `chunks`, delivered one per read.
    pub fn reply<I, C>(mut self, request: impl AsRef<[u8]>, chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[u8]>,
    {
        self.script.push_back(ScriptedReply {
            request: request.as_ref().to_vec(),
            chunks: chunks.into_iter().map(|c| c.as_ref().to_vec()).collect(),
        });
        self
    }

    /// Accept `request` and never answer it.
    pub fn silence(self, request: impl AsRef<[u8]>) -> Self {
        self.reply(request, std::iter::empty::<&[u8]>())
    }

    /// Push unsolicited input that is already waiting before any request.
    pub fn with_pending_input(mut self, bytes: impl AsRef<[u8]>) -> Self {
        self.pending.push_back(bytes.as_ref().to_vec());
        self
    }

    pub fn log(&self) -> RequestLog {
        self.log.clone()
    }
}

impl Transport for ScriptedTransport {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.log.0.lock().push(bytes.to_vec());
        match self.script.pop_front() {
            Some(reply) if reply.request == bytes => {
                self.pending.extend(reply.chunks);
                Ok(())
            }
            _ => Err(TransportError::UnexpectedRequest(
                String::from_utf8_lossy(bytes).into_owned(),
            )),
        }
    }

    fn read(&mut self, _timeout: Duration) -> Result<Option<Vec<u8>>, TransportError> {
        Ok(self.pending.pop_front())
    }

    fn discard_input(&mut self) -> Result<(), TransportError> {
        self.pending.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loopback_round_trip() {
        let (mut host, printer) = loopback();
        host.write_all(b"{FN?}").unwrap();
        assert_eq!(
            printer.recv_request(Duration::from_secs(1)).unwrap(),
            Some(b"{FN?}".to_vec())
        );
        printer.reply("{FN!N:0}").unwrap();
        assert_eq!(
            host.read(Duration::from_secs(1)).unwrap(),
            Some(b"{FN!N:0}".to_vec())
        );
        assert_eq!(host.read(Duration::from_millis(10)).unwrap(), None);
    }

    #[test]
    fn test_loopback_discard_and_close() {
        let (mut host, printer) = loopback();
        printer.reply("stale").unwrap();
        host.discard_input().unwrap();
        assert_eq!(host.read(Duration::from_millis(10)).unwrap(), None);

        drop(printer);
        assert!(matches!(
            host.read(Duration::from_millis(10)),
            Err(TransportError::Closed)
        ));
        assert!(matches!(host.write_all(b"{FN?}"), Err(TransportError::Closed)));
    }

    #[test]
    fn test_scripted_replies_in_order() {
        let mut transport = ScriptedTransport::new()
            .silence("{FN?}")
            .reply("{FN?}", ["{FN!", "N:0}"]);
        let log = transport.log();

        transport.write_all(b"{FN?}").unwrap();
        assert_eq!(transport.read(Duration::ZERO).unwrap(), None);

        transport.write_all(b"{FN?}").unwrap();
        assert_eq!(transport.read(Duration::ZERO).unwrap(), Some(b"{FN!".to_vec()));
        assert_eq!(transport.read(Duration::ZERO).unwrap(), Some(b"N:0}".to_vec()));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_scripted_unexpected_request() {
        let mut transport = ScriptedTransport::new().reply("{FN?}", ["{FN!}"]);
        assert!(matches!(
            transport.write_all(b"{ST?}"),
            Err(TransportError::UnexpectedRequest(_))
        ));
        assert!(matches!(
            transport.write_all(b"{FN?}"),
            Err(TransportError::UnexpectedRequest(_))
        ));
    }
}
