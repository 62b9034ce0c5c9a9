use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::{AppConfig, SessionMode};
use crate::cli::ServeArgs;
use crate::error::{CliError, Result};
use molserve::control::{ConsoleConfig, SocketConfig};
use molserve::core::forcefield::params::{
    ForceFieldSpec, IntegratorParams, ParamError, SimulationParams, SystemOptions,
};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub fn build_config(args: &ServeArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };
    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let mode = args.mode.or(file_config.mode).unwrap_or_default();

    let quit_token = file_config.quit_token.take().unwrap_or(defaults.quit_token);
    if quit_token.is_empty() {
        return Err(CliError::Config("`quit-token` must not be empty".to_string()));
    }

    let server = file_config.server.take().unwrap_or_default();
    let read_timeout_ms = server.read_timeout_ms.unwrap_or(defaults.read_timeout_ms);
    let socket = SocketConfig {
        host: args.host.clone().or(server.host).unwrap_or(defaults.host),
        port: args.port.or(server.port).unwrap_or(defaults.port),
        read_timeout: (read_timeout_ms > 0).then_some(Duration::from_millis(read_timeout_ms)),
        accept_poll: positive_millis(
            "server.accept-poll-ms",
            server.accept_poll_ms.unwrap_or(defaults.accept_poll_ms),
        )?,
        quit_token: quit_token.clone(),
    };

    let console_file = file_config.console.take().unwrap_or_default();
    let console = ConsoleConfig {
        prompt: console_file.prompt.unwrap_or(defaults.prompt),
        quit_token,
    };
    let console_enabled = !args.no_console && console_file.enabled.unwrap_or(true);

    let shutdown_poll = positive_millis(
        "shutdown.poll-ms",
        file_config
            .shutdown
            .take()
            .and_then(|s| s.poll_ms)
            .unwrap_or(defaults.shutdown_poll_ms),
    )?;

    let journal_dir = args.journal_dir.clone().unwrap_or_else(|| {
        let dir = file_config.journal.take().and_then(|j| j.dir);
        PathBuf::from(dir.unwrap_or(defaults.journal_dir))
    });

    let sim = file_config.simulation.take().unwrap_or_default();
    let simulation = SimulationParams {
        forcefield: ForceFieldSpec {
            files: sim.forcefield.unwrap_or(defaults.forcefield),
        },
        system: SystemOptions {
            nonbonded_method: sim.nonbonded_method.unwrap_or(defaults.nonbonded_method),
            nonbonded_cutoff_nm: sim
                .nonbonded_cutoff_nm
                .unwrap_or(defaults.nonbonded_cutoff_nm),
            constraints: sim.constraints.unwrap_or(defaults.constraints),
            remove_cm_motion: sim.remove_cm_motion.unwrap_or(defaults.remove_cm_motion),
        },
        integrator: IntegratorParams {
            temperature_k: sim.temperature_k.unwrap_or(defaults.temperature_k),
            friction_per_ps: sim.friction_per_ps.unwrap_or(defaults.friction_per_ps),
            timestep_ps: sim.timestep_ps.unwrap_or(defaults.timestep_ps),
        },
        frame_interval: positive_millis(
            "simulation.frame-interval-ms",
            sim.frame_interval_ms.unwrap_or(defaults.frame_interval_ms),
        )?,
    };
    // Parameters only matter in simulation mode, but a bad file should fail either way.
    simulation
        .validate()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(AppConfig {
        mode,
        socket,
        console,
        console_enabled,
        shutdown_poll,
        journal_dir,
        simulation,
    })
}

fn positive_millis(key: &str, value: u64) -> Result<Duration> {
    if value == 0 {
        return Err(CliError::Config(format!("`{}` must be greater than zero", key)));
    }
    Ok(Duration::from_millis(value))
}

fn parse_value<T: FromStr>(key: &str, value_str: &str, kind: &str) -> Result<T> {
    value_str.parse().map_err(|_| {
        CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value_str))
    })
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Argument(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };

        match key {
            "mode" => {
                config.mode = Some(
                    SessionMode::from_str(value_str).map_err(CliError::Config)?,
                );
            }
            "quit-token" => config.quit_token = Some(value_str.to_string()),
            "server.host" => {
                config.server.get_or_insert_with(Default::default).host =
                    Some(value_str.to_string());
            }
            "server.port" => {
                config.server.get_or_insert_with(Default::default).port =
                    Some(parse_value(key, value_str, "port")?);
            }
            "server.read-timeout-ms" => {
                config
                    .server
                    .get_or_insert_with(Default::default)
                    .read_timeout_ms = Some(parse_value(key, value_str, "integer")?);
            }
            "server.accept-poll-ms" => {
                config
                    .server
                    .get_or_insert_with(Default::default)
                    .accept_poll_ms = Some(parse_value(key, value_str, "integer")?);
            }
            "shutdown.poll-ms" => {
                config.shutdown.get_or_insert_with(Default::default).poll_ms =
                    Some(parse_value(key, value_str, "integer")?);
            }
            "journal.dir" => {
                config.journal.get_or_insert_with(Default::default).dir =
                    Some(value_str.to_string());
            }
            "console.prompt" => {
                config.console.get_or_insert_with(Default::default).prompt =
                    Some(value_str.to_string());
            }
            "console.enabled" => {
                config.console.get_or_insert_with(Default::default).enabled =
                    Some(parse_value(key, value_str, "boolean")?);
            }
            "simulation.nonbonded-method" => {
                config
                    .simulation
                    .get_or_insert_with(Default::default)
                    .nonbonded_method = Some(
                    value_str
                        .parse()
                        .map_err(|e: ParamError| CliError::Config(e.to_string()))?,
                );
            }
            "simulation.nonbonded-cutoff-nm" => {
                config
                    .simulation
                    .get_or_insert_with(Default::default)
                    .nonbonded_cutoff_nm = Some(parse_value(key, value_str, "float")?);
            }
            "simulation.constraints" => {
                config.simulation.get_or_insert_with(Default::default).constraints = Some(
                    value_str
                        .parse()
                        .map_err(|e: ParamError| CliError::Config(e.to_string()))?,
                );
            }
            "simulation.remove-cm-motion" => {
                config
                    .simulation
                    .get_or_insert_with(Default::default)
                    .remove_cm_motion = Some(parse_value(key, value_str, "boolean")?);
            }
            "simulation.temperature-k" => {
                config
                    .simulation
                    .get_or_insert_with(Default::default)
                    .temperature_k = Some(parse_value(key, value_str, "float")?);
            }
            "simulation.friction-per-ps" => {
                config
                    .simulation
                    .get_or_insert_with(Default::default)
                    .friction_per_ps = Some(parse_value(key, value_str, "float")?);
            }
            "simulation.timestep-ps" => {
                config
                    .simulation
                    .get_or_insert_with(Default::default)
                    .timestep_ps = Some(parse_value(key, value_str, "float")?);
            }
            "simulation.frame-interval-ms" => {
                config
                    .simulation
                    .get_or_insert_with(Default::default)
                    .frame_interval_ms = Some(parse_value(key, value_str, "integer")?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}
