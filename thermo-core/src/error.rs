use thiserror::Error;

/// Ошибки разбора шкалы
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScaleError {
    /// Ни `F`, ни `C`
    #[error("invalid scale {0:?}: expected F or C")]
    Invalid(String),
}

/// Ошибки идентификатора устройства
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeviceIdError {
    /// Неверная длина
    #[error("device id must be exactly {expected} characters, got {got}")]
    BadLength {
        /// ожидаемая длина
        expected: usize,
        /// фактическая длина
        got: usize,
    },

    /// Пробелы и управляющие символы сломают строчный протокол
    #[error("device id must not contain whitespace or control characters")]
    BadChar,
}
