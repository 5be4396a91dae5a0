use std::io::{self, Read, Write};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use log::{debug, info, warn};

use super::{Transport, TransportError, take_buffered};
use crate::config::{READ_CHUNK, STDIN_QUEUE};

/// Локальный транспорт: отчёты в `out`, команды из канала, который
/// наполняет поток-насос stdin. Сам цикл сессии остаётся однопоточным.
pub(crate) struct LocalTransport<W: Write> {
    out: W,
    rx: Receiver<Vec<u8>>,
    pending: Vec<u8>,
    input_closed: bool,
    closed: bool,
}

impl LocalTransport<io::Stdout> {
    pub(crate) fn stdio() -> Result<Self, TransportError> {
        let (tx, rx) = crossbeam_channel::bounded(STDIN_QUEUE);
        thread::Builder::new()
            .name("stdin-pump".into())
            .spawn(move || pump(io::stdin().lock(), tx))?;

        Ok(Self::new(io::stdout(), rx))
    }
}

impl<W: Write> LocalTransport<W> {
    pub(crate) fn new(out: W, rx: Receiver<Vec<u8>>) -> Self {
        Self {
            out,
            rx,
            pending: Vec::new(),
            input_closed: false,
            closed: false,
        }
    }
}

/// Читает источник чанками и отправляет в канал до EOF или закрытия канала
fn pump<R: Read>(mut reader: R, tx: Sender<Vec<u8>>) {
    let mut buf = [0u8; READ_CHUNK];

    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                if tx.send(buf[..n].to_vec()).is_err() {
                    // сессия завершилась
                    break;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!("stdin read error: {e}");
                break;
            }
        }
    }

    debug!("stdin pump finished");
}

impl<W: Write> Transport for LocalTransport<W> {
    fn send(&mut self, line: &str) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        writeln!(self.out, "{line}")?;
        self.out.flush()?;
        Ok(())
    }

    fn poll_readable(&mut self, timeout: Duration) -> Result<bool, TransportError> {
        if !self.pending.is_empty() {
            return Ok(true);
        }

        if self.input_closed {
            // команд больше не будет, но тик цикла должен длиться как обычно
            thread::sleep(timeout);
            return Ok(false);
        }

        match self.rx.recv_timeout(timeout) {
            Ok(chunk) => {
                self.pending = chunk;
                Ok(!self.pending.is_empty())
            }
            Err(RecvTimeoutError::Timeout) => Ok(false),
            Err(RecvTimeoutError::Disconnected) => {
                info!("stdin closed; reporting continues without commands");
                self.input_closed = true;
                Ok(false)
            }
        }
    }

    fn read_available(&mut self, max_bytes: usize) -> Result<Vec<u8>, TransportError> {
        if self.pending.is_empty() {
            if let Ok(chunk) = self.rx.try_recv() {
                self.pending = chunk;
            }
        }
        Ok(take_buffered(&mut self.pending, max_bytes))
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let _ = self.out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TICK: Duration = Duration::from_millis(5);

    #[test]
    fn send_appends_newline() {
        let (_tx, rx) = crossbeam_channel::bounded(1);
        let mut t = LocalTransport::new(Vec::new(), rx);

        t.send("10:00:00 72.5").unwrap();
        t.send("10:00:01 SHUTDOWN").unwrap();
        assert_eq!(t.out, b"10:00:00 72.5\n10:00:01 SHUTDOWN\n");
    }

    #[test]
    fn send_after_close_fails_and_writes_nothing() {
        let (_tx, rx) = crossbeam_channel::bounded(1);
        let mut t = LocalTransport::new(Vec::new(), rx);

        t.close();
        t.close();
        assert!(matches!(t.send("x"), Err(TransportError::Closed)));
        assert!(t.out.is_empty());
    }

    #[test]
    fn poll_and_read_chunks_in_order() {
        let (tx, rx) = crossbeam_channel::bounded(4);
        let mut t = LocalTransport::new(Vec::new(), rx);

        assert!(!t.poll_readable(TICK).unwrap());

        tx.send(b"PERIOD=2\n".to_vec()).unwrap();
        tx.send(b"OFF\n".to_vec()).unwrap();

        assert!(t.poll_readable(TICK).unwrap());
        assert_eq!(t.read_available(READ_CHUNK).unwrap(), b"PERIOD=2\n");
        assert!(t.poll_readable(TICK).unwrap());
        assert_eq!(t.read_available(READ_CHUNK).unwrap(), b"OFF\n");
        assert!(!t.poll_readable(TICK).unwrap());
    }

    #[test]
    fn small_reads_keep_the_rest_buffered() {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let mut t = LocalTransport::new(Vec::new(), rx);

        tx.send(b"SCALE=C\n".to_vec()).unwrap();
        assert!(t.poll_readable(TICK).unwrap());
        assert_eq!(t.read_available(3).unwrap(), b"SCA");
        assert!(t.poll_readable(TICK).unwrap());
        assert_eq!(t.read_available(100).unwrap(), b"LE=C\n");
    }

    #[test]
    fn input_eof_is_not_an_error() {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let mut t = LocalTransport::new(Vec::new(), rx);
        drop(tx);

        assert!(!t.poll_readable(TICK).unwrap());
        assert!(t.input_closed);
        assert!(!t.poll_readable(TICK).unwrap());
        assert!(t.read_available(READ_CHUNK).unwrap().is_empty());

        t.send("still reporting").unwrap();
    }

    #[test]
    fn pump_forwards_everything_then_disconnects() {
        let (tx, rx) = crossbeam_channel::unbounded();
        pump(Cursor::new(b"STOP\nSTART\n".to_vec()), tx);

        let got: Vec<u8> = rx.iter().flatten().collect();
        assert_eq!(got, b"STOP\nSTART\n");
    }
}
