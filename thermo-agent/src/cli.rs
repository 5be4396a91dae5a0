use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use thermo_core::{DeviceId, Scale};

use crate::config;
use crate::sensor::SensorSpec;

/// Thermo Agent - периодически отчитывается температурой и принимает команды
/// (`SCALE=`, `PERIOD=`, `STOP`, `START`, `LOG`, `OFF`) по тому же каналу.
#[derive(Parser, Debug, Clone)]
#[command(name = "thermo-agent", version, about)]
pub(crate) struct Args {
    #[command(subcommand)]
    pub(crate) mode: Mode,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum Mode {
    /// Отчёты в stdout, команды из stdin
    Local {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Отчёты и команды через TLS-соединение с сервером
    Tls {
        #[command(flatten)]
        common: CommonArgs,

        /// Идентификатор устройства (9 символов), уходит строкой ID=... после подключения
        #[arg(long)]
        id: DeviceId,

        /// Хост сервера (он же имя для проверки сертификата)
        #[arg(long)]
        host: String,

        /// PEM с корневыми сертификатами; по умолчанию встроенные webpki roots
        #[arg(long)]
        ca_file: Option<PathBuf>,

        /// TCP порт сервера
        #[arg(value_parser = clap::value_parser!(u16).range(1..=65535))]
        port: u16,
    },
}

/// Опции, общие для обоих транспортов
#[derive(clap::Args, Debug, Clone)]
pub(crate) struct CommonArgs {
    /// Период отчётов, секунды
    #[arg(long, default_value_t = config::DEFAULT_PERIOD_SECS,
          value_parser = clap::value_parser!(i64).range(1..))]
    pub(crate) period: i64,

    /// Шкала: F или C
    #[arg(long, default_value = "F")]
    pub(crate) scale: Scale,

    /// Файл журнала (дозапись): команды и отчёты
    #[arg(long)]
    pub(crate) log: Option<PathBuf>,

    /// Источник показаний: fixed:<raw>, sim[:<raw>] или sysfs:<path>
    #[arg(long, default_value = config::DEFAULT_SENSOR)]
    pub(crate) sensor: SensorSpec,

    /// Файл значения GPIO кнопки; фронт 0 -> 1 завершает сессию
    #[arg(long)]
    pub(crate) button: Option<PathBuf>,

    /// Уровень логов по умолчанию debug вместо info
    #[arg(long)]
    pub(crate) debug: bool,
}

impl Args {
    pub(crate) fn common(&self) -> &CommonArgs {
        match &self.mode {
            Mode::Local { common } | Mode::Tls { common, .. } => common,
        }
    }

    /// Проверки, которые clap сам не делает (пустой host, существование файлов)
    pub(crate) fn validate(&self) -> Result<()> {
        if let Mode::Tls { host, ca_file, .. } = &self.mode {
            if host.trim().is_empty() {
                bail!("--host is empty");
            }
            if let Some(path) = ca_file {
                let md = std::fs::metadata(path)
                    .with_context(|| format!("CA file not found: {:?}", path))?;
                if !md.is_file() {
                    bail!("--ca-file must point to a file: {:?}", path);
                }
            }
        }

        if let Some(path) = &self.common().button {
            std::fs::metadata(path)
                .with_context(|| format!("button GPIO value file not found: {:?}", path))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> std::result::Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("thermo-agent").chain(argv.iter().copied()))
    }

    #[test]
    fn local_defaults() {
        let args = parse(&["local"]).unwrap();
        let c = args.common();
        assert_eq!(c.period, 1);
        assert_eq!(c.scale, Scale::Fahrenheit);
        assert!(c.log.is_none());
        assert_eq!(c.sensor, SensorSpec::Fixed(100));
        assert!(!c.debug);
        args.validate().unwrap();
    }

    #[test]
    fn tls_full() {
        let args = parse(&[
            "tls", "--id", "805419480", "--host", "lever.cs.ucla.edu", "--period", "2",
            "--scale", "C", "--log", "out.txt", "18000",
        ])
        .unwrap();

        match &args.mode {
            Mode::Tls {
                common,
                id,
                host,
                ca_file,
                port,
            } => {
                assert_eq!(id.as_str(), "805419480");
                assert_eq!(host, "lever.cs.ucla.edu");
                assert!(ca_file.is_none());
                assert_eq!(*port, 18000);
                assert_eq!(common.period, 2);
                assert_eq!(common.scale, Scale::Celsius);
            }
            other => panic!("unexpected mode: {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_values() {
        assert!(parse(&["local", "--scale", "K"]).is_err());
        assert!(parse(&["local", "--period", "0"]).is_err());
        assert!(parse(&["local", "--sensor", "thermocouple"]).is_err());
        assert!(parse(&["tls", "--id", "123", "--host", "h", "1"]).is_err());
        assert!(parse(&["tls", "--id", "123456789", "--host", "h", "0"]).is_err());
        assert!(parse(&["tls", "--id", "123456789", "--host", "h"]).is_err());
        assert!(parse(&["tls", "--id", "123456789", "10"]).is_err());
    }

    #[test]
    fn validate_rejects_empty_host_and_missing_files() {
        let args = parse(&["tls", "--id", "123456789", "--host", " ", "10"]).unwrap();
        assert!(args.validate().is_err());

        let args = parse(&[
            "tls", "--id", "123456789", "--host", "h", "--ca-file", "/definitely/missing.pem", "10",
        ])
        .unwrap();
        assert!(args.validate().is_err());

        let args = parse(&["local", "--button", "/definitely/missing/value"]).unwrap();
        assert!(args.validate().is_err());
    }
}
