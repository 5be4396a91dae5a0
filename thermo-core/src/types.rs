use std::fmt;
use std::str::FromStr;

use crate::constants::ID_LEN;
use crate::error::{DeviceIdError, ScaleError};

/// Шкала температуры для всех отчётов
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scale {
    /// Фаренгейт (по умолчанию)
    #[default]
    Fahrenheit,
    /// Цельсий
    Celsius,
}

impl FromStr for Scale {
    type Err = ScaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "F" => Ok(Scale::Fahrenheit),
            "C" => Ok(Scale::Celsius),
            other => Err(ScaleError::Invalid(other.to_string())),
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scale::Fahrenheit => f.write_str("F"),
            Scale::Celsius => f.write_str("C"),
        }
    }
}

/// Локальное время отчёта, формат `HH:MM:SS`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeOfDay {
    /// 0..=23
    pub hour: u32,
    /// 0..=59
    pub minute: u32,
    /// 0..=59
    pub second: u32,
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

/// Один отчёт о температуре. Живёт ровно до того, как станет строкой.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportRecord {
    /// Время снятия показания
    pub time: TimeOfDay,
    /// Температура в текущей шкале
    pub temperature: f64,
}

/// Исходящая строка протокола (без завершающего `\n`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Record {
    /// `HH:MM:SS T.t`
    Report(ReportRecord),
    /// `HH:MM:SS SHUTDOWN`
    Shutdown(TimeOfDay),
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Record::Report(r) => write!(f, "{} {:.1}", r.time, r.temperature),
            Record::Shutdown(time) => write!(f, "{time} SHUTDOWN"),
        }
    }
}

/// Идентификатор устройства, который сетевой вариант шлёт сразу после подключения
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceId(String);

impl DeviceId {
    /// Сам идентификатор
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Строка рукопожатия: `ID=<id>`
    pub fn id_line(&self) -> String {
        format!("ID={}", self.0)
    }
}

impl FromStr for DeviceId {
    type Err = DeviceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let got = s.chars().count();
        if got != ID_LEN {
            return Err(DeviceIdError::BadLength {
                expected: ID_LEN,
                got,
            });
        }
        if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(DeviceIdError::BadChar);
        }
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(hour: u32, minute: u32, second: u32) -> TimeOfDay {
        TimeOfDay {
            hour,
            minute,
            second,
        }
    }

    #[test]
    fn scale_parses_only_exact_letters() {
        assert_eq!("F".parse::<Scale>(), Ok(Scale::Fahrenheit));
        assert_eq!("C".parse::<Scale>(), Ok(Scale::Celsius));
        assert_eq!(
            "c".parse::<Scale>(),
            Err(ScaleError::Invalid("c".to_string()))
        );
        assert!("".parse::<Scale>().is_err());
        assert!("FC".parse::<Scale>().is_err());
    }

    #[test]
    fn report_line_is_zero_padded_with_one_decimal() {
        let rec = Record::Report(ReportRecord {
            time: t(7, 5, 9),
            temperature: 72.456,
        });
        assert_eq!(rec.to_string(), "07:05:09 72.5");

        let rec = Record::Report(ReportRecord {
            time: t(23, 59, 0),
            temperature: -3.0,
        });
        assert_eq!(rec.to_string(), "23:59:00 -3.0");
    }

    #[test]
    fn infinite_reading_formats_as_inf() {
        let rec = Record::Report(ReportRecord {
            time: t(0, 0, 1),
            temperature: f64::INFINITY,
        });
        assert_eq!(rec.to_string(), "00:00:01 inf");
    }

    #[test]
    fn shutdown_line_format() {
        assert_eq!(Record::Shutdown(t(12, 0, 3)).to_string(), "12:00:03 SHUTDOWN");
    }

    #[test]
    fn device_id_requires_nine_printable_chars() {
        let id: DeviceId = "805419480".parse().unwrap();
        assert_eq!(id.id_line(), "ID=805419480");

        assert_eq!(
            "12345".parse::<DeviceId>(),
            Err(DeviceIdError::BadLength {
                expected: 9,
                got: 5
            })
        );
        assert_eq!("1234 6789".parse::<DeviceId>(), Err(DeviceIdError::BadChar));
        assert_eq!("1234\n6789".parse::<DeviceId>(), Err(DeviceIdError::BadChar));
    }
}
