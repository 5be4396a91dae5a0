use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::debug;
use rand::Rng;
use thermo_core::ADC_MAX;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum SensorError {
    #[error("failed to read sensor {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("sensor {path:?} returned non-numeric value {raw:?}")]
    Parse { path: PathBuf, raw: String },
}

/// Источник сырых показаний АЦП
pub(crate) trait ReadingSource {
    fn sample(&mut self) -> Result<u16, SensorError>;
}

/// Какой источник поднять, из `--sensor`
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SensorSpec {
    /// `fixed:<raw>`
    Fixed(u16),
    /// `sim` или `sim:<raw>`
    Simulated(u16),
    /// `sysfs:<path>`, например `/sys/bus/iio/devices/iio:device0/in_voltage1_raw`
    Sysfs(PathBuf),
}

/// База симулятора: примерно комнатная температура
const SIM_BASE_RAW: u16 = 512;

impl FromStr for SensorSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, arg) = match s.split_once(':') {
            Some((k, a)) => (k, Some(a)),
            None => (s, None),
        };

        match (kind, arg) {
            ("fixed", Some(raw)) => parse_raw(raw).map(SensorSpec::Fixed),
            ("sim", None) => Ok(SensorSpec::Simulated(SIM_BASE_RAW)),
            ("sim", Some(raw)) => parse_raw(raw).map(SensorSpec::Simulated),
            ("sysfs", Some(path)) if !path.is_empty() => Ok(SensorSpec::Sysfs(PathBuf::from(path))),
            _ => Err(format!(
                "unknown sensor {s:?}: expected fixed:<raw>, sim[:<raw>] or sysfs:<path>"
            )),
        }
    }
}

fn parse_raw(raw: &str) -> Result<u16, String> {
    raw.parse::<u16>()
        .ok()
        .filter(|v| *v <= ADC_MAX)
        .ok_or_else(|| format!("raw value must be 0..={ADC_MAX}, got {raw:?}"))
}

impl SensorSpec {
    /// Поднять источник. sysfs читается один раз сразу, чтобы ошибка
    /// конфигурации всплыла на старте, а не на первом отчёте.
    pub(crate) fn open(&self) -> Result<Box<dyn ReadingSource>, SensorError> {
        match self {
            SensorSpec::Fixed(raw) => Ok(Box::new(FixedSensor(*raw))),
            SensorSpec::Simulated(base) => Ok(Box::new(SimulatedSensor::new(*base))),
            SensorSpec::Sysfs(path) => {
                let mut s = SysfsSensor::new(path);
                let first = s.sample()?;
                debug!("sysfs sensor {:?} first reading {first}", path);
                Ok(Box::new(s))
            }
        }
    }
}

pub(crate) struct FixedSensor(pub(crate) u16);

impl ReadingSource for FixedSensor {
    fn sample(&mut self) -> Result<u16, SensorError> {
        Ok(self.0)
    }
}

/// Случайное блуждание вокруг базового значения
pub(crate) struct SimulatedSensor {
    base: f64,
    value: f64,
    /// Максимальный шаг за отсчёт, единицы АЦП
    max_step: f64,
    /// Доля отклонения от базы, которая гасится за отсчёт
    pull: f64,
}

impl SimulatedSensor {
    pub(crate) fn new(base: u16) -> Self {
        let base = f64::from(base);
        Self {
            base,
            value: base,
            max_step: 3.0,
            pull: 0.1,
        }
    }
}

impl ReadingSource for SimulatedSensor {
    fn sample(&mut self) -> Result<u16, SensorError> {
        let mut rng = rand::rng();
        let delta = rng.random_range(-self.max_step..self.max_step);

        self.value += delta - (self.value - self.base) * self.pull;
        // крайние точки формулы вырождены, симулятор их избегает
        self.value = self.value.clamp(1.0, f64::from(ADC_MAX - 1));

        Ok(self.value.round() as u16)
    }
}

/// Канал IIO АЦП через sysfs: файл с одним целым числом
pub(crate) struct SysfsSensor {
    path: PathBuf,
}

impl SysfsSensor {
    pub(crate) fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ReadingSource for SysfsSensor {
    fn sample(&mut self) -> Result<u16, SensorError> {
        let text = fs::read_to_string(&self.path).map_err(|source| SensorError::Read {
            path: self.path.clone(),
            source,
        })?;
        let raw = text.trim();

        // значения шире u16 насыщаются
        raw.parse::<u32>()
            .map(|v| u16::try_from(v).unwrap_or(u16::MAX))
            .map_err(|_| SensorError::Parse {
                path: self.path.clone(),
                raw: raw.to_string(),
            })
    }
}
