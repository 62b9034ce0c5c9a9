use molserve::control::DEFAULT_QUIT_TOKEN;
use molserve::core::forcefield::params::{Constraints, NonbondedMethod};

pub struct DefaultsConfig {
    pub host: String,
    pub port: u16,
    pub read_timeout_ms: u64,
    pub accept_poll_ms: u64,
    pub shutdown_poll_ms: u64,
    pub journal_dir: String,
    pub prompt: String,
    pub quit_token: String,
    pub forcefield: Vec<String>,
    pub nonbonded_method: NonbondedMethod,
    pub nonbonded_cutoff_nm: f64,
    pub constraints: Constraints,
    pub remove_cm_motion: bool,
    pub temperature_k: f64,
    pub friction_per_ps: f64,
    pub timestep_ps: f64,
    pub frame_interval_ms: u64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 7777,
            read_timeout_ms: 10_000,
            accept_poll_ms: 50,
            shutdown_poll_ms: 100,
            journal_dir: "logs".to_string(),
            prompt: ">>> ".to_string(),
            quit_token: DEFAULT_QUIT_TOKEN.to_string(),
            forcefield: vec!["ff99SB.xml".to_string(), "tip3p_standard.xml".to_string()],
            nonbonded_method: NonbondedMethod::Pme,
            nonbonded_cutoff_nm: 1.0,
            constraints: Constraints::HBonds,
            remove_cm_motion: false,
            temperature_k: 300.0,
            friction_per_ps: 1.0,
            timestep_ps: 0.002,
            frame_interval_ms: 50,
        }
    }
}
