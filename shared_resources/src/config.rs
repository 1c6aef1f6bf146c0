use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{ElevatorError, Result};

const CONFIG_FILE_PATH: &str = "config.json";
const FALLBACK_CONFIG_FILE_PATH: &str = "_config.json";
const VERBOSE_FLAG: &str = "--verbose";

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ElevatorConfig {
    pub num_elevators: u8,
    pub num_floors: u8,
    pub speed_between_floors_ms: u64,
    pub avg_waiting_time_per_stop_ms: u64,
    pub shutdown_timeout_ms: u64,
}

impl Default for ElevatorConfig {
    fn default() -> Self {
        ElevatorConfig {
            num_elevators: 3,
            num_floors: 10,
            speed_between_floors_ms: 100,
            avg_waiting_time_per_stop_ms: 200,
            shutdown_timeout_ms: 60_000,
        }
    }
}

impl ElevatorConfig {
    pub fn speed_between_floors(&self) -> Duration {
        Duration::from_millis(self.speed_between_floors_ms)
    }

    pub fn avg_waiting_time_per_stop(&self) -> Duration {
        Duration::from_millis(self.avg_waiting_time_per_stop_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PassengerConfig {
    pub num_passengers: u32,
    pub request_interval_ms: u64,
    pub debug: bool,
}

impl Default for PassengerConfig {
    fn default() -> Self {
        PassengerConfig {
            num_passengers: 20,
            request_interval_ms: 1000,
            debug: false,
        }
    }
}

impl PassengerConfig {
    pub fn request_interval(&self) -> Duration {
        Duration::from_millis(self.request_interval_ms)
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub elevator: ElevatorConfig,
    pub simulation: PassengerConfig,
}

impl SimulationConfig {
    /// Reads `config.json`, then `_config.json`, then falls back to the
    /// built-in defaults. Command line overrides from `args` are applied last.
    pub fn load(args: &[String]) -> Result<Self> {
        let mut config = match Self::read_first_existing(&[CONFIG_FILE_PATH, FALLBACK_CONFIG_FILE_PATH])? {
            Some(config) => config,
            None => {
                tracing::info!("No configuration file provided, using default settings...");
                SimulationConfig::default()
            }
        };
        config.apply_args(args);
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(contents: &str) -> Result<Self> {
        let config: SimulationConfig = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn read_first_existing(paths: &[&str]) -> Result<Option<Self>> {
        for path in paths {
            if Path::new(path).exists() {
                tracing::debug!("reading configuration from {}", path);
                return Self::from_file(path).map(Some);
            }
        }
        Ok(None)
    }

    /// Command line arguments after the program name.
    pub fn env_args() -> Vec<String> {
        env::args().skip(1).collect()
    }

    /// `--verbose` turns on debug logging for the elevator crates. It is read
    /// before the logger exists, so before any configuration is loaded.
    pub fn verbose_requested(args: &[String]) -> bool {
        args.iter().any(|arg| arg == VERBOSE_FLAG)
    }

    /// Applies `--flag value` pairs. `--verbose` stands alone. Unknown flags
    /// and unparsable values are skipped with a warning.
    pub fn apply_args(&mut self, args: &[String]) {
        let mut args = args.iter().map(String::as_str).filter(|arg| *arg != VERBOSE_FLAG);
        while let Some(flag) = args.next() {
            let Some(value) = args.next() else {
                tracing::warn!("argument {} has no value, skipping...", flag);
                break;
            };
            match flag {
                "--elevators" => match value.parse::<u8>() {
                    Ok(num) => self.elevator.num_elevators = num,
                    Err(_) => tracing::warn!("elevators {} is not a number, skipping...", value),
                },
                "--floors" => match value.parse::<u8>() {
                    Ok(num) => self.elevator.num_floors = num,
                    Err(_) => tracing::warn!("floors {} is not a number, skipping...", value),
                },
                "--passengers" => match value.parse::<u32>() {
                    Ok(num) => self.simulation.num_passengers = num,
                    Err(_) => tracing::warn!("passengers {} is not a number, skipping...", value),
                },
                other => tracing::warn!("illegal argument {}, skipping...", other),
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.elevator.num_elevators == 0 {
            return Err(ElevatorError::config("num_elevators must be at least 1"));
        }
        if self.elevator.num_floors < 2 {
            return Err(ElevatorError::config("num_floors must be at least 2"));
        }
        if self.simulation.num_passengers == 0 {
            return Err(ElevatorError::config("num_passengers must be at least 1"));
        }
        Ok(())
    }
}
