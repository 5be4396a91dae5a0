use std::time::Duration;

use crate::constants::DEFAULT_PERIOD_SECS;
use crate::protocol::Command;
use crate::types::Scale;

/// Что делать циклу после команды
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Работаем дальше
    Continue,
    /// `OFF`: терминальное состояние
    Shutdown,
}

/// Настройки сессии. Меняются только командами, читаются планировщиком.
///
/// `period_secs` может стать нулём или отрицательным после `PERIOD=...`
/// с мусором: такая команда не отклоняется, отчёт тогда положен на каждом тике.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Шкала для следующих отчётов
    pub scale: Scale,
    /// `false` после `STOP`, `true` после `START`
    pub reporting_enabled: bool,
    /// Период отчётов, секунды
    pub period_secs: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PERIOD_SECS, Scale::default())
    }
}

impl SessionConfig {
    /// Начальные настройки; отчёты включены
    pub fn new(period_secs: i64, scale: Scale) -> Self {
        Self {
            scale,
            reporting_enabled: true,
            period_secs,
        }
    }

    /// Интерпретатор команд: меняет состояние и никогда не падает
    pub fn apply(&mut self, cmd: &Command) -> Control {
        match cmd {
            Command::SetScale(scale) => self.scale = *scale,
            Command::Stop => self.reporting_enabled = false,
            Command::Start => self.reporting_enabled = true,
            Command::Period(secs) => self.period_secs = *secs,
            Command::Off => return Control::Shutdown,
            Command::Log(_) | Command::Unrecognized(_) => {}
        }
        Control::Continue
    }

    /// Период как `Duration`; ноль и отрицательные значения дают `ZERO`
    pub fn period(&self) -> Duration {
        u64::try_from(self.period_secs)
            .map(Duration::from_secs)
            .unwrap_or(Duration::ZERO)
    }
}
