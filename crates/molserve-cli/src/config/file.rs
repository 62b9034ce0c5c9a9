use super::models::SessionMode;
use crate::error::{CliError, Result};
use molserve::core::forcefield::params::{Constraints, NonbondedMethod};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub read_timeout_ms: Option<u64>,
    pub accept_poll_ms: Option<u64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileShutdownConfig {
    pub poll_ms: Option<u64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileJournalConfig {
    pub dir: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConsoleConfig {
    pub prompt: Option<String>,
    pub enabled: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileSimulationConfig {
    pub forcefield: Option<Vec<String>>,
    pub nonbonded_method: Option<NonbondedMethod>,
    pub nonbonded_cutoff_nm: Option<f64>,
    pub constraints: Option<Constraints>,
    pub remove_cm_motion: Option<bool>,
    pub temperature_k: Option<f64>,
    pub friction_per_ps: Option<f64>,
    pub timestep_ps: Option<f64>,
    pub frame_interval_ms: Option<u64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub mode: Option<SessionMode>,
    pub quit_token: Option<String>,
    pub server: Option<FileServerConfig>,
    pub shutdown: Option<FileShutdownConfig>,
    pub journal: Option<FileJournalConfig>,
    pub console: Option<FileConsoleConfig>,
    pub simulation: Option<FileSimulationConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn parses_full_document() {
        let config = FileConfig::from_toml(
            r#"
            mode = "simulation"
            quit-token = "exit"

            [server]
            host = "0.0.0.0"
            port = 7800
            read-timeout-ms = 0

            [shutdown]
            poll-ms = 20

            [journal]
            dir = "var/log"

            [console]
            prompt = "> "
            enabled = false

            [simulation]
            forcefield = ["amber14-all.xml"]
            nonbonded-method = "no-cutoff"
            constraints = "all-bonds"
            temperature-k = 310.0
            frame-interval-ms = 100
            "#,
        )
        .unwrap();

        assert_eq!(config.mode, Some(SessionMode::Simulation));
        assert_eq!(config.quit_token.as_deref(), Some("exit"));
        let server = config.server.unwrap();
        assert_eq!(server.port, Some(7800));
        assert_eq!(server.read_timeout_ms, Some(0));
        assert_eq!(config.shutdown.unwrap().poll_ms, Some(20));
        assert_eq!(config.console.unwrap().enabled, Some(false));
        let simulation = config.simulation.unwrap();
        assert_eq!(simulation.nonbonded_method, Some(NonbondedMethod::NoCutoff));
        assert_eq!(simulation.constraints, Some(Constraints::AllBonds));
        assert_eq!(simulation.temperature_k, Some(310.0));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(FileConfig::from_toml("[server]\nbacklog = 5\n").is_err());
        assert!(FileConfig::from_toml("colour = \"red\"\n").is_err());
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(FileConfig::from_toml("mode = \"replay\"\n").is_err());
    }

    #[test]
    fn from_file_reports_path_on_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "mode = ").unwrap();

        match FileConfig::from_file(&path) {
            Err(CliError::FileParsing { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = FileConfig::from_file(Path::new("/nonexistent/molserve.toml"));
        assert!(matches!(result, Err(CliError::Io(_))));
    }
}
