use crate::constants::ADC_MAX;
use crate::types::Scale;

/// B-константа термистора Grove Temperature Sensor v1.2
pub const B: f64 = 4275.0;

/// Номинальное сопротивление при 25 °C, Ом
pub const R0: f64 = 100_000.0;

const T0_KELVIN: f64 = 298.15;
const ABSOLUTE_ZERO_C: f64 = -273.15;

/// Сырое значение АЦП -> градусы Цельсия.
///
/// Особые точки:
/// - `raw >= 1023` (нулевое сопротивление) -> `+inf`
/// - `raw == 0` (обрыв) -> абсолютный ноль
pub fn to_celsius(raw: u16) -> f64 {
    if raw >= ADC_MAX {
        return f64::INFINITY;
    }
    if raw == 0 {
        return ABSOLUTE_ZERO_C;
    }

    let r = R0 * (f64::from(ADC_MAX) / f64::from(raw) - 1.0);
    1.0 / ((r / R0).ln() / B + 1.0 / T0_KELVIN) + ABSOLUTE_ZERO_C
}

/// °C -> °F
pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

/// Сырое значение -> температура в выбранной шкале
pub fn convert(raw: u16, scale: Scale) -> f64 {
    let c = to_celsius(raw);
    match scale {
        Scale::Celsius => c,
        Scale::Fahrenheit => celsius_to_fahrenheit(c),
    }
}
