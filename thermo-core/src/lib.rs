//! # thermo-core
//!
//! Протокол и логика телеметрического агента температуры без ввода-вывода.
//!
//! Этот крейт содержит:
//!
//! - [`lexer`] - нарезка входящего потока на строки-команды с буферизацией хвоста
//! - [`protocol`] - разбор команд (`SCALE=`, `STOP`, `START`, `OFF`, `PERIOD=`, `LOG`)
//! - [`session`] - настройки сессии и интерпретатор команд
//! - [`scheduler`] - решение "пора ли отчитываться"
//! - [`thermistor`] - пересчёт сырого значения АЦП в температуру
//! - [`types`] - доменные типы и форматирование исходящих строк
//! - [`error`] - типы ошибок `thermo-core`
//!
//! ## Пример: команды из одного чанка
//!
//! ```rust
//! use thermo_core::lexer::LineBuffer;
//! use thermo_core::protocol::{parse_command, Command};
//! use thermo_core::session::{Control, SessionConfig};
//!
//! let mut lines = LineBuffer::default();
//! let mut cfg = SessionConfig::default();
//!
//! let cmds = lines.push(b"  PERIOD=2\nOFF\nSTO");
//! assert_eq!(cmds, vec!["PERIOD=2".to_string(), "OFF".to_string()]);
//!
//! assert_eq!(cfg.apply(&parse_command(&cmds[0])), Control::Continue);
//! assert_eq!(cfg.period_secs, 2);
//! assert_eq!(parse_command(&cmds[1]), Command::Off);
//!
//! // "STO" ждёт своего `\n`
//! assert_eq!(lines.pending(), b"STO");
//! ```
//!
//! ## Пример: строка отчёта
//!
//! ```rust
//! use thermo_core::types::{Record, ReportRecord, Scale, TimeOfDay};
//! use thermo_core::thermistor::convert;
//!
//! let rec = Record::Report(ReportRecord {
//!     time: TimeOfDay { hour: 9, minute: 3, second: 7 },
//!     temperature: convert(512, Scale::Celsius),
//! });
//! assert_eq!(rec.to_string(), "09:03:07 25.0");
//! ```
//!
//! ## Дизайн
//!
//! Транспорт, файлы и часы живут в `thermo-agent`. Здесь только чистые
//! функции и маленькие state machine, которые одинаково работают поверх
//! stdin/stdout и поверх TLS.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Инкрементальный лексер команд.
pub mod lexer;

/// Текстовый протокол команд.
pub mod protocol;

/// Настройки сессии и интерпретатор.
pub mod session;

/// Планировщик отчётов.
pub mod scheduler;

/// Формула термистора.
pub mod thermistor;

/// Доменные типы.
pub mod types;

/// Ошибки `thermo-core`.
pub mod error;

/// Общие константы
mod constants;
pub use constants::{ADC_MAX, DEFAULT_PERIOD_SECS, ID_LEN, MAX_COMMAND_LEN};

// --- Re-exports (публичный фасад API) ---

pub use crate::error::{DeviceIdError, ScaleError};
pub use crate::lexer::LineBuffer;
pub use crate::protocol::{Command, parse_command};
pub use crate::scheduler::ReportScheduler;
pub use crate::session::{Control, SessionConfig};
pub use crate::types::{DeviceId, Record, ReportRecord, Scale, TimeOfDay};
