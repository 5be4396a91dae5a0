/// Период отчётов по умолчанию, секунды
pub const DEFAULT_PERIOD_SECS: i64 = 1;

/// Максимальная длина незавершённой команды (без `\n`), которую держим в буфере
pub const MAX_COMMAND_LEN: usize = 1023;

/// Верхняя граница 10-битного АЦП датчика
pub const ADC_MAX: u16 = 1023;

/// Длина идентификатора устройства в строке `ID=...`
pub const ID_LEN: usize = 9;
