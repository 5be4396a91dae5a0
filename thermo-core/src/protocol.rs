use crate::types::Scale;

/// Входящая команда управления
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `SCALE=F` / `SCALE=C`
    SetScale(Scale),
    /// `STOP`
    Stop,
    /// `START`
    Start,
    /// `OFF`
    Off,
    /// `PERIOD=<int>`; значение не проверяется
    Period(i64),
    /// `LOG <text>`: только запись в лог
    Log(String),
    /// Всё остальное: тоже только запись в лог
    Unrecognized(String),
}

/// Разбирает одну уже обрезанную строку команды.
///
/// Никогда не падает: нераспознанная строка становится
/// [`Command::Unrecognized`], а мусор после `PERIOD=` даёт `0`.
pub fn parse_command(line: &str) -> Command {
    match line {
        "SCALE=F" => Command::SetScale(Scale::Fahrenheit),
        "SCALE=C" => Command::SetScale(Scale::Celsius),
        "STOP" => Command::Stop,
        "START" => Command::Start,
        "OFF" => Command::Off,
        _ => {
            if let Some(rest) = line.strip_prefix("PERIOD=") {
                Command::Period(parse_leading_int(rest))
            } else if let Some(rest) = line.strip_prefix("LOG ") {
                Command::Log(rest.to_string())
            } else {
                Command::Unrecognized(line.to_string())
            }
        }
    }
}

/// Целое из начала строки в стиле `atoi`: пробелы, знак, цифры до первого
/// постороннего символа. Нет цифр - `0`, переполнение насыщается.
pub fn parse_leading_int(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        let d = i64::from(b - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(d)
        } else {
            value.saturating_mul(10).saturating_add(d)
        };
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_commands() {
        assert_eq!(parse_command("SCALE=F"), Command::SetScale(Scale::Fahrenheit));
        assert_eq!(parse_command("SCALE=C"), Command::SetScale(Scale::Celsius));
        assert_eq!(parse_command("STOP"), Command::Stop);
        assert_eq!(parse_command("START"), Command::Start);
        assert_eq!(parse_command("OFF"), Command::Off);
    }

    #[test]
    fn exact_commands_are_case_sensitive() {
        assert_eq!(parse_command("off"), Command::Unrecognized("off".into()));
        assert_eq!(
            parse_command("SCALE=c"),
            Command::Unrecognized("SCALE=c".into())
        );
        assert_eq!(parse_command("STOP "), Command::Unrecognized("STOP ".into()));
        assert_eq!(parse_command(""), Command::Unrecognized(String::new()));
    }

    #[test]
    fn period_is_prefix_match_and_permissive() {
        assert_eq!(parse_command("PERIOD=5"), Command::Period(5));
        assert_eq!(parse_command("PERIOD=abc"), Command::Period(0));
        assert_eq!(parse_command("PERIOD="), Command::Period(0));
        assert_eq!(parse_command("PERIOD=12s"), Command::Period(12));
        assert_eq!(parse_command("PERIOD=-4"), Command::Period(-4));
        assert_eq!(parse_command("PERIOD= 7"), Command::Period(7));
    }

    #[test]
    fn log_keeps_message() {
        assert_eq!(
            parse_command("LOG hello world"),
            Command::Log("hello world".into())
        );
        assert_eq!(parse_command("LOGX"), Command::Unrecognized("LOGX".into()));
    }

    #[test]
    fn anything_else_is_unrecognized() {
        assert_eq!(
            parse_command("REBOOT now"),
            Command::Unrecognized("REBOOT now".into())
        );
    }

    #[test]
    fn leading_int_saturates() {
        assert_eq!(parse_leading_int("99999999999999999999999"), i64::MAX);
        assert_eq!(parse_leading_int("-99999999999999999999999"), i64::MIN);
        assert_eq!(parse_leading_int("+8"), 8);
        assert_eq!(parse_leading_int("-"), 0);
    }
}
