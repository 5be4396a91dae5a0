use std::time::{Duration, Instant};

use crate::session::SessionConfig;

/// Решает, пора ли отчитываться.
///
/// База отсчёта сдвигается только успешным отчётом. Пока отчёты
/// выключены (`STOP`), прошедшее время продолжает копиться, поэтому
/// после `START` отчёт уходит сразу, если период уже истёк.
#[derive(Debug, Clone)]
pub struct ReportScheduler {
    last_report: Instant,
}

impl ReportScheduler {
    /// `start` - начало сессии, первый отчёт через полный период
    pub fn new(start: Instant) -> Self {
        Self { last_report: start }
    }

    /// Сколько прошло с последнего отчёта
    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_report)
    }

    /// Idle -> Due
    pub fn is_due(&self, now: Instant, cfg: &SessionConfig) -> bool {
        cfg.reporting_enabled && self.elapsed(now) >= cfg.period()
    }

    /// Due -> Idle
    pub fn mark_reported(&mut self, now: Instant) {
        self.last_report = now;
    }
}
