use std::time::Duration;

pub(crate) use thermo_core::DEFAULT_PERIOD_SECS;

/// Тик цикла сессии: сколько максимум ждём входящие данные
pub(crate) const SESSION_TICK: Duration = Duration::from_millis(10);

/// Размер одного чтения из транспорта
pub(crate) const READ_CHUNK: usize = 1023;

/// Сколько непрочитанных чанков stdin держим в канале
pub(crate) const STDIN_QUEUE: usize = 64;

pub(crate) const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub(crate) const TLS_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Опрос файла GPIO кнопки
pub(crate) const BUTTON_POLL: Duration = Duration::from_millis(50);

/// Без железа: постоянное значение, как в сборке для ПК
pub(crate) const DEFAULT_SENSOR: &str = "fixed:100";
