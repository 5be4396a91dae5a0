//! Точка входа `thermo-agent`.
//!
//! Жизненный цикл:
//! - парсинг CLI и проверка конфигурации (любая ошибка - выход с ненулевым кодом)
//! - журнал, датчик, кнопка и обработчик `Ctrl+C`
//! - подключение транспорта (stdin/stdout или TLS + `ID=...`)
//! - цикл сессии до `OFF`, кнопки или сигнала

mod cli;
mod config;
mod log_sink;
mod sensor;
mod session;
mod shutdown;
mod transport;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use log::info;
use thermo_core::SessionConfig;

use crate::cli::Mode;
use crate::log_sink::LogSink;
use crate::session::Session;
use crate::shutdown::ShutdownLatch;
use crate::transport::local::LocalTransport;
use crate::transport::tls::TlsTransport;

fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    let common = args.common();

    // Логи через RUST_LOG=info/trace; --debug поднимает уровень по умолчанию
    let default_level = if common.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    args.validate()?;

    let latch = Arc::new(ShutdownLatch::default());
    shutdown::install_ctrlc(latch.clone()).context("install Ctrl+C handler")?;

    let log_sink = match &common.log {
        Some(path) => LogSink::open_append(path)?,
        None => LogSink::disabled(),
    };

    let sensor = common.sensor.open().context("open sensor")?;

    if let Some(path) = &common.button {
        shutdown::spawn_button_watcher(path.clone(), latch.clone())
            .context("start button watcher")?;
    }

    let session_config = SessionConfig::new(common.period, common.scale);

    match &args.mode {
        Mode::Local { .. } => {
            info!("starting local session on stdin/stdout");
            let transport = LocalTransport::stdio().context("set up stdio transport")?;
            Session::new(transport, sensor, log_sink, session_config, latch).run()?;
        }
        Mode::Tls {
            id,
            host,
            ca_file,
            port,
            ..
        } => {
            info!("starting TLS session: host={host} port={port} id={id}");
            let transport = TlsTransport::connect(host, *port, ca_file.as_deref(), id)
                .with_context(|| format!("connect to TLS server {host}:{port}"))?;
            Session::new(transport, sensor, log_sink, session_config, latch).run()?;
        }
    }

    Ok(())
}
