//! Двунаправленный строчный канал: отчёты наружу, команды внутрь.
//!
//! Один и тот же цикл сессии работает поверх stdin/stdout ([`local`])
//! и поверх TLS-сокета ([`tls`]).

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub(crate) mod local;
pub(crate) mod tls;

#[cfg(test)]
pub(crate) mod mock;

#[derive(Debug, Error)]
pub(crate) enum TransportError {
    #[error("failed to resolve host {host:?}")]
    Resolve {
        host: String,
        #[source]
        source: io::Error,
    },

    #[error("host {0:?} resolved to no addresses")]
    NoAddress(String),

    #[error("failed to connect to {addr}")]
    Connect {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("invalid TLS server name {0:?}")]
    ServerName(String),

    #[error("failed to load CA file {path:?}")]
    CaFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no certificates found in CA file {0:?}")]
    EmptyCaFile(PathBuf),

    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    #[error("transport I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("peer closed connection")]
    PeerClosed,

    #[error("transport already closed")]
    Closed,
}

/// Контракт транспорта. Любая ошибка `send`/`poll_readable`/`read_available`
/// фатальна для сессии; ошибки `close` игнорируются.
pub(crate) trait Transport {
    /// Отправить строку; `\n` дописывает транспорт
    fn send(&mut self, line: &str) -> Result<(), TransportError>;

    /// Есть ли что читать; ждёт не дольше `timeout`
    fn poll_readable(&mut self, timeout: Duration) -> Result<bool, TransportError>;

    /// Забрать до `max_bytes` уже пришедших байт, не блокируясь
    fn read_available(&mut self, max_bytes: usize) -> Result<Vec<u8>, TransportError>;

    /// Закрыть; повторный вызов ничего не делает
    fn close(&mut self);
}

/// Отдать из буфера не больше `max` байт
fn take_buffered(buf: &mut Vec<u8>, max: usize) -> Vec<u8> {
    let n = buf.len().min(max);
    buf.drain(..n).collect()
}
