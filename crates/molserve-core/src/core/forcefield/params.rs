use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ParamError {
    #[error("Invalid value for '{name}': {value} ({reason})")]
    OutOfRange {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
    #[error("Force field definition lists no files")]
    EmptyForceField,
    #[error("Unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NonbondedMethod {
    NoCutoff,
    CutoffNonPeriodic,
    CutoffPeriodic,
    Ewald,
    #[default]
    Pme,
}

impl FromStr for NonbondedMethod {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "no-cutoff" | "nocutoff" => Ok(Self::NoCutoff),
            "cutoff-non-periodic" => Ok(Self::CutoffNonPeriodic),
            "cutoff-periodic" => Ok(Self::CutoffPeriodic),
            "ewald" => Ok(Self::Ewald),
            "pme" => Ok(Self::Pme),
            _ => Err(ParamError::UnknownVariant {
                kind: "nonbonded method",
                value: s.to_string(),
            }),
        }
    }
}

impl NonbondedMethod {
    pub fn uses_cutoff(self) -> bool {
        !matches!(self, Self::NoCutoff)
    }
}

/// Which bond lengths are held rigid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Constraints {
    None,
    #[default]
    HBonds,
    AllBonds,
}

impl FromStr for Constraints {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "h-bonds" | "hbonds" => Ok(Self::HBonds),
            "all-bonds" | "allbonds" => Ok(Self::AllBonds),
            _ => Err(ParamError::UnknownVariant {
                kind: "constraint set",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Constraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::HBonds => "h-bonds",
            Self::AllBonds => "all-bonds",
        };
        f.write_str(s)
    }
}

/// The force-field files a simulation system is parameterized from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForceFieldSpec {
    pub files: Vec<String>,
}

impl Default for ForceFieldSpec {
    fn default() -> Self {
        Self {
            files: vec!["ff99SB.xml".to_string(), "tip3p_standard.xml".to_string()],
        }
    }
}

impl ForceFieldSpec {
    pub fn validate(&self) -> Result<(), ParamError> {
        if self.files.is_empty() {
            return Err(ParamError::EmptyForceField);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemOptions {
    pub nonbonded_method: NonbondedMethod,
    pub nonbonded_cutoff_nm: f64,
    pub constraints: Constraints,
    pub remove_cm_motion: bool,
}

impl Default for SystemOptions {
    fn default() -> Self {
        Self {
            nonbonded_method: NonbondedMethod::Pme,
            nonbonded_cutoff_nm: 1.0,
            constraints: Constraints::HBonds,
            remove_cm_motion: false,
        }
    }
}

impl SystemOptions {
    pub fn validate(&self) -> Result<(), ParamError> {
        if self.nonbonded_method.uses_cutoff() && !(self.nonbonded_cutoff_nm > 0.0) {
            return Err(ParamError::OutOfRange {
                name: "nonbonded-cutoff-nm",
                value: self.nonbonded_cutoff_nm,
                reason: "must be positive",
            });
        }
        Ok(())
    }
}

/// Langevin integrator constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegratorParams {
    pub temperature_k: f64,
    pub friction_per_ps: f64,
    pub timestep_ps: f64,
}

impl Default for IntegratorParams {
    fn default() -> Self {
        Self {
            temperature_k: 300.0,
            friction_per_ps: 1.0,
            timestep_ps: 0.002,
        }
    }
}

impl IntegratorParams {
    pub fn validate(&self) -> Result<(), ParamError> {
        if !(self.temperature_k > 0.0) {
            return Err(ParamError::OutOfRange {
                name: "temperature-k",
                value: self.temperature_k,
                reason: "must be positive",
            });
        }
        if !(self.friction_per_ps >= 0.0) {
            return Err(ParamError::OutOfRange {
                name: "friction-per-ps",
                value: self.friction_per_ps,
                reason: "must not be negative",
            });
        }
        if !(self.timestep_ps > 0.0) {
            return Err(ParamError::OutOfRange {
                name: "timestep-ps",
                value: self.timestep_ps,
                reason: "must be positive",
            });
        }
        Ok(())
    }
}

/// Everything a simulation session needs besides the structure itself.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationParams {
    pub forcefield: ForceFieldSpec,
    pub system: SystemOptions,
    pub integrator: IntegratorParams,
    pub frame_interval: Duration,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            forcefield: ForceFieldSpec::default(),
            system: SystemOptions::default(),
            integrator: IntegratorParams::default(),
            frame_interval: Duration::from_millis(50),
        }
    }
}

impl SimulationParams {
    pub fn validate(&self) -> Result<(), ParamError> {
        self.forcefield.validate()?;
        self.system.validate()?;
        self.integrator.validate()
    }
}
