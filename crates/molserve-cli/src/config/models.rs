use clap::ValueEnum;
use molserve::control::{ConsoleConfig, SocketConfig};
use molserve::core::forcefield::params::SimulationParams;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SessionMode {
    /// Publish each submitted structure as a static frame.
    #[default]
    Visual,
    /// Run a simulation of the submitted structure.
    Simulation,
}

impl FromStr for SessionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "visual" => Ok(Self::Visual),
            "simulation" => Ok(Self::Simulation),
            _ => Err(format!("unknown mode '{s}' (expected 'visual' or 'simulation')")),
        }
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Visual => f.write_str("visual"),
            Self::Simulation => f.write_str("simulation"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub mode: SessionMode,
    pub socket: SocketConfig,
    pub console: ConsoleConfig,
    pub console_enabled: bool,
    pub shutdown_poll: Duration,
    pub journal_dir: PathBuf,
    pub simulation: SimulationParams,
}
