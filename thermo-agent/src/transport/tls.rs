use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, ClientConnection, RootCertStore};
use thermo_core::DeviceId;

use super::{Transport, TransportError, take_buffered};
use crate::config::{CONNECT_TIMEOUT, READ_CHUNK, TLS_WRITE_TIMEOUT};

/// `set_read_timeout(Some(ZERO))` запрещён, поэтому минимальное ожидание такое
const MIN_READ_TIMEOUT: Duration = Duration::from_millis(1);

/// TLS поверх одного TCP-соединения. Сразу после рукопожатия
/// отправляет `ID=<id>`.
pub(crate) struct TlsTransport {
    conn: ClientConnection,
    sock: TcpStream,
    /// расшифрованные, но ещё не отданные байты
    plain: Vec<u8>,
    closed: bool,
}

impl TlsTransport {
    pub(crate) fn connect(
        host: &str,
        port: u16,
        ca_file: Option<&Path>,
        id: &DeviceId,
    ) -> Result<Self, TransportError> {
        let config = client_config(ca_file)?;
        let server_name = ServerName::try_from(host.to_string())
            .map_err(|_| TransportError::ServerName(host.to_string()))?;

        let sock = connect_tcp(host, port)?;
        let conn = ClientConnection::new(Arc::new(config), server_name)?;

        let mut transport = Self {
            conn,
            sock,
            plain: Vec::new(),
            closed: false,
        };
        transport.handshake()?;

        info!("connected to {host}:{port}, sending id {id}");
        transport.send(&id.id_line())?;

        Ok(transport)
    }

    fn handshake(&mut self) -> Result<(), TransportError> {
        self.sock.set_read_timeout(Some(CONNECT_TIMEOUT))?;
        while self.conn.is_handshaking() {
            self.conn.complete_io(&mut self.sock)?;
        }
        debug!(
            "TLS handshake complete: {:?} {:?}",
            self.conn.protocol_version(),
            self.conn.negotiated_cipher_suite().map(|s| s.suite())
        );
        Ok(())
    }

    fn flush_tls(&mut self) -> Result<(), TransportError> {
        while self.conn.wants_write() {
            self.conn.write_tls(&mut self.sock)?;
        }
        Ok(())
    }

    /// Переложить расшифрованное из rustls в `plain`; `true`, если пир
    /// прислал close_notify
    fn drain_plaintext(&mut self) -> Result<bool, TransportError> {
        let mut buf = [0u8; READ_CHUNK];
        loop {
            match self.conn.reader().read(&mut buf) {
                Ok(0) => return Ok(true),
                Ok(n) => self.plain.extend_from_slice(&buf[..n]),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(false),
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl Transport for TlsTransport {
    fn send(&mut self, line: &str) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.conn.writer().write_all(format!("{line}\n").as_bytes())?;
        self.flush_tls()
    }

    fn poll_readable(&mut self, timeout: Duration) -> Result<bool, TransportError> {
        if !self.plain.is_empty() {
            return Ok(true);
        }

        // данные могли прийти вместе с Finished и уже лежать в rustls
        if self.drain_plaintext()? && self.plain.is_empty() {
            return Err(TransportError::PeerClosed);
        }
        if !self.plain.is_empty() {
            return Ok(true);
        }

        self.sock.set_read_timeout(Some(timeout.max(MIN_READ_TIMEOUT)))?;
        match self.conn.read_tls(&mut self.sock) {
            Ok(0) => return Err(TransportError::PeerClosed),
            Ok(_) => {}
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
                ) =>
            {
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        }

        self.conn.process_new_packets()?;
        // ответы на key update и т.п.
        self.flush_tls()?;

        let peer_closed = self.drain_plaintext()?;
        if peer_closed && self.plain.is_empty() {
            return Err(TransportError::PeerClosed);
        }
        Ok(!self.plain.is_empty())
    }

    fn read_available(&mut self, max_bytes: usize) -> Result<Vec<u8>, TransportError> {
        Ok(take_buffered(&mut self.plain, max_bytes))
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        self.conn.send_close_notify();
        let _ = self.flush_tls();
        let _ = self.sock.shutdown(Shutdown::Both);
        debug!("TLS transport closed");
    }
}

/// Корни: из PEM-файла, если задан, иначе встроенные webpki roots
fn client_config(ca_file: Option<&Path>) -> Result<ClientConfig, TransportError> {
    let mut roots = RootCertStore::empty();

    match ca_file {
        Some(path) => {
            let ca_err = |source: io::Error| TransportError::CaFile {
                path: path.to_path_buf(),
                source,
            };
            let mut reader = BufReader::new(File::open(path).map_err(ca_err)?);

            let mut added = 0usize;
            for cert in rustls_pemfile::certs(&mut reader) {
                roots.add(cert.map_err(ca_err)?)?;
                added += 1;
            }
            if added == 0 {
                return Err(TransportError::EmptyCaFile(path.to_path_buf()));
            }
            debug!("loaded {added} CA certificates from {:?}", path);
        }
        None => roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned()),
    }

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .with_root_certificates(roots)
        .with_no_client_auth();

    Ok(config)
}

/// Первый адрес, к которому удалось подключиться
fn connect_tcp(host: &str, port: u16) -> Result<TcpStream, TransportError> {
    let addrs: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|source| TransportError::Resolve {
            host: host.to_string(),
            source,
        })?
        .collect();

    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT) {
            Ok(sock) => {
                sock.set_nodelay(true).ok();
                sock.set_write_timeout(Some(TLS_WRITE_TIMEOUT)).ok();
                debug!("tcp connected to {addr}");
                return Ok(sock);
            }
            Err(source) => {
                debug!("connect to {addr} failed: {source}");
                last_err = Some(TransportError::Connect { addr, source });
            }
        }
    }

    Err(last_err.unwrap_or_else(|| TransportError::NoAddress(host.to_string())))
}
