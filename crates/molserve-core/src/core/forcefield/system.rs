use super::params::{
    Constraints, ForceFieldSpec, IntegratorParams, NonbondedMethod, ParamError, SystemOptions,
};
use crate::core::elements;
use crate::core::frame::FrameData;
use crate::core::models::system::MolecularSystem;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SystemBuildError {
    #[error("Topology contains no atoms")]
    EmptyTopology,
    #[error("No mass known for atom {serial} ({name}) with element '{element}'")]
    UnknownMass {
        serial: usize,
        name: String,
        element: String,
    },
    #[error("Invalid simulation parameters: {0}")]
    Params(#[from] ParamError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForceTerm {
    Nonbonded {
        method: NonbondedMethod,
        cutoff_nm: Option<f64>,
    },
    CenterOfMassMotionRemover,
    /// Receives user-applied forces from interacting viewers.
    Interactive,
}

/// A parameterized particle system ready to be paired with an integrator.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSystem {
    pub forcefield: ForceFieldSpec,
    pub particle_masses: Vec<f64>,
    pub constrained_bonds: Vec<[usize; 2]>,
    pub forces: Vec<ForceTerm>,
}

impl SimulationSystem {
    /// Parameterizes a system from a topology.
    ///
    /// Every atom needs a known element so that a mass can be assigned;
    /// particles follow the same order as [`FrameData::from_system`].
    pub fn from_topology(
        topology: &MolecularSystem,
        forcefield: &ForceFieldSpec,
        options: &SystemOptions,
    ) -> Result<Self, SystemBuildError> {
        forcefield.validate()?;
        options.validate()?;
        if topology.is_empty() {
            return Err(SystemBuildError::EmptyTopology);
        }

        let mut particle_masses = Vec::with_capacity(topology.atom_count());
        let mut is_hydrogen = Vec::with_capacity(topology.atom_count());
        for (_, atom) in topology.atoms_in_order() {
            let mass = elements::atomic_mass(&atom.element).ok_or_else(|| {
                SystemBuildError::UnknownMass {
                    serial: atom.serial,
                    name: atom.name.clone(),
                    element: atom.element.clone(),
                }
            })?;
            particle_masses.push(mass);
            is_hydrogen.push(atom.is_hydrogen());
        }

        let frame = FrameData::from_system(topology);
        let constrained_bonds = match options.constraints {
            Constraints::None => Vec::new(),
            Constraints::HBonds => frame
                .bonds
                .iter()
                .copied()
                .filter(|[a, b]| is_hydrogen[*a] || is_hydrogen[*b])
                .collect(),
            Constraints::AllBonds => frame.bonds.clone(),
        };

        let mut forces = vec![ForceTerm::Nonbonded {
            method: options.nonbonded_method,
            cutoff_nm: options
                .nonbonded_method
                .uses_cutoff()
                .then_some(options.nonbonded_cutoff_nm),
        }];
        if options.remove_cm_motion {
            forces.push(ForceTerm::CenterOfMassMotionRemover);
        }

        Ok(Self {
            forcefield: forcefield.clone(),
            particle_masses,
            constrained_bonds,
            forces,
        })
    }

    pub fn particle_count(&self) -> usize {
        self.particle_masses.len()
    }

    /// Adds the interactive force term. Returns its index; repeated calls
    /// return the index of the existing term.
    pub fn add_interactive_force(&mut self) -> usize {
        if let Some(index) = self.interactive_force_index() {
            return index;
        }
        self.forces.push(ForceTerm::Interactive);
        self.forces.len() - 1
    }

    pub fn interactive_force_index(&self) -> Option<usize> {
        self.forces.iter().position(|f| *f == ForceTerm::Interactive)
    }
}

/// A system paired with its integrator and starting coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    pub system: SimulationSystem,
    pub integrator: IntegratorParams,
    pub initial_frame: FrameData,
}

impl Simulation {
    pub fn new(
        system: SimulationSystem,
        integrator: IntegratorParams,
        initial_frame: FrameData,
    ) -> Result<Self, SystemBuildError> {
        integrator.validate()?;
        Ok(Self {
            system,
            integrator,
            initial_frame,
        })
    }
}
