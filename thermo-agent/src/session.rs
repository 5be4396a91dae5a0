use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Timelike;
use log::{debug, info, warn};
use thermo_core::thermistor;
use thermo_core::{
    Command, Control, LineBuffer, Record, ReportRecord, ReportScheduler, SessionConfig, TimeOfDay,
    parse_command,
};
use thiserror::Error;

use crate::config::{READ_CHUNK, SESSION_TICK};
use crate::log_sink::{LogSink, LogSinkError};
use crate::sensor::{ReadingSource, SensorError};
use crate::shutdown::ShutdownLatch;
use crate::transport::{Transport, TransportError};

#[derive(Debug, Error)]
pub(crate) enum SessionError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Sensor(#[from] SensorError),

    #[error(transparent)]
    LogSink(#[from] LogSinkError),
}

/// Одна сессия агента: от установленного транспорта до SHUTDOWN.
///
/// Владеет транспортом и журналом. Настройки меняет только интерпретатор,
/// планировщик их только читает. Всё крутится в одном потоке.
pub(crate) struct Session<T: Transport> {
    transport: T,
    sensor: Box<dyn ReadingSource>,
    log_sink: LogSink,
    config: SessionConfig,
    scheduler: ReportScheduler,
    lines: LineBuffer,
    shutdown: Arc<ShutdownLatch>,
    tick: Duration,
    discarded_seen: usize,
}

impl<T: Transport> Session<T> {
    pub(crate) fn new(
        transport: T,
        sensor: Box<dyn ReadingSource>,
        log_sink: LogSink,
        config: SessionConfig,
        shutdown: Arc<ShutdownLatch>,
    ) -> Self {
        Self {
            transport,
            sensor,
            log_sink,
            config,
            scheduler: ReportScheduler::new(Instant::now()),
            lines: LineBuffer::default(),
            shutdown,
            tick: SESSION_TICK,
            discarded_seen: 0,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    #[cfg(test)]
    pub(crate) fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    /// Крутить цикл до `OFF`, внешнего запроса остановки или фатальной ошибки.
    /// При ошибке ресурсы закрываются без строки SHUTDOWN.
    pub(crate) fn run(&mut self) -> Result<(), SessionError> {
        info!(
            "session started: period={}s scale={} reporting={}",
            self.config.period_secs, self.config.scale, self.config.reporting_enabled
        );

        let res = self.run_loop();
        if let Err(e) = &res {
            warn!("session aborted: {e}");
            self.abort();
        }
        res
    }

    fn run_loop(&mut self) -> Result<(), SessionError> {
        loop {
            if self.shutdown.is_requested() {
                return self.shut_down();
            }

            self.tick_scheduler(Instant::now())?;

            if self.transport.poll_readable(self.tick)? {
                let chunk = self.transport.read_available(READ_CHUNK)?;
                if self.handle_input(&chunk)? == Control::Shutdown {
                    return self.shut_down();
                }
            }
        }
    }

    /// Отчёт, если период истёк и отчёты включены
    fn tick_scheduler(&mut self, now: Instant) -> Result<(), SessionError> {
        if !self.scheduler.is_due(now, &self.config) {
            return Ok(());
        }

        let raw = self.sensor.sample()?;
        let record = Record::Report(ReportRecord {
            time: local_time_of_day(),
            temperature: thermistor::convert(raw, self.config.scale),
        });
        self.emit(&record)?;
        self.scheduler.mark_reported(now);
        Ok(())
    }

    /// Лексер + интерпретатор. Команды после `OFF` в том же чанке
    /// уже не выполняются.
    fn handle_input(&mut self, chunk: &[u8]) -> Result<Control, SessionError> {
        let commands = self.lines.push(chunk);

        let discarded = self.lines.discarded();
        if discarded > self.discarded_seen {
            warn!(
                "dropped {} bytes of overlong command input",
                discarded - self.discarded_seen
            );
            self.discarded_seen = discarded;
        }

        for line in commands {
            // каждая строка попадает в журнал до интерпретации
            self.log_sink.write_line(&line)?;

            let cmd = parse_command(&line);
            match &cmd {
                Command::Unrecognized(raw) => debug!("unrecognized command {raw:?}"),
                Command::Log(msg) => debug!("LOG {msg}"),
                other => debug!("command {other:?}"),
            }

            if self.config.apply(&cmd) == Control::Shutdown {
                return Ok(Control::Shutdown);
            }
        }

        Ok(Control::Continue)
    }

    /// Журнал, затем транспорт
    fn emit(&mut self, record: &Record) -> Result<(), SessionError> {
        let line = record.to_string();
        info!("{line}");
        self.log_sink.write_line(&line)?;
        self.transport.send(&line)?;
        Ok(())
    }

    /// SHUTDOWN -> закрыть журнал -> закрыть транспорт. Ровно один раз.
    fn shut_down(&mut self) -> Result<(), SessionError> {
        if !self.shutdown.try_begin() {
            return Ok(());
        }

        let res = self.emit(&Record::Shutdown(local_time_of_day()));
        self.log_sink.close();
        self.transport.close();
        info!("session finished");
        res
    }

    fn abort(&mut self) {
        if self.shutdown.try_begin() {
            self.log_sink.close();
            self.transport.close();
        }
    }
}

pub(crate) fn local_time_of_day() -> TimeOfDay {
    let now = chrono::Local::now();
    TimeOfDay {
        hour: now.hour(),
        minute: now.minute(),
        second: now.second(),
    }
}
