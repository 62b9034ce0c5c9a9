use super::atom::Atom;
use super::chain::ChainType;
use super::system::MolecularSystem;
use super::topology::BondOrder;
use super::{AtomId, ChainId, ResidueId};
use nalgebra::Point3;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("A chain must be started before adding residues")]
    NoCurrentChain,
    #[error("A residue must be started before adding atoms")]
    NoCurrentResidue,
    #[error("Duplicate atom serial: {0}")]
    DuplicateSerial(usize),
    #[error("Bond references unknown atom serial: {0}")]
    UnknownSerial(usize),
}

/// Fields of a single atom record, independent of the file format.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomRecord<'a> {
    pub serial: usize,
    pub name: &'a str,
    pub element: Option<&'a str>,
    pub position: Point3<f64>,
    pub charge: Option<f64>,
    pub force_field_type: Option<&'a str>,
    pub is_hetero: bool,
}

/// Incrementally builds a [`MolecularSystem`] from sequential file records,
/// resolving bonds through the atoms' file serial numbers.
#[derive(Default)]
pub struct MolecularSystemBuilder {
    system: MolecularSystem,
    atom_serial_map: HashMap<usize, AtomId>,
    current_chain: Option<ChainId>,
    current_residue: Option<ResidueId>,
}

impl MolecularSystemBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_chain(&mut self, id: char, chain_type: ChainType) -> &mut Self {
        let chain_id = self.system.add_chain(id, chain_type);
        if chain_type != ChainType::Polymer {
            self.system.set_chain_type(chain_id, chain_type);
        }
        self.current_chain = Some(chain_id);
        self.current_residue = None;
        self
    }

    pub fn start_residue(&mut self, id: isize, name: &str) -> Result<&mut Self, BuildError> {
        let chain_id = self.current_chain.ok_or(BuildError::NoCurrentChain)?;
        let residue_id = self
            .system
            .add_residue(chain_id, id, name)
            .ok_or(BuildError::NoCurrentChain)?;
        self.current_residue = Some(residue_id);
        Ok(self)
    }

    pub fn add_atom(&mut self, record: AtomRecord<'_>) -> Result<&mut Self, BuildError> {
        let residue_id = self.current_residue.ok_or(BuildError::NoCurrentResidue)?;
        if self.atom_serial_map.contains_key(&record.serial) {
            return Err(BuildError::DuplicateSerial(record.serial));
        }

        let mut atom = Atom::new(record.serial, record.name, residue_id, record.position);
        if let Some(symbol) = record.element {
            atom = atom.with_element(symbol);
        }
        atom.partial_charge = record.charge.unwrap_or(0.0);
        atom.force_field_type = record.force_field_type.unwrap_or_default().to_string();
        atom.is_hetero = record.is_hetero;

        let atom_id = self
            .system
            .add_atom(atom)
            .ok_or(BuildError::NoCurrentResidue)?;
        self.atom_serial_map.insert(record.serial, atom_id);
        Ok(self)
    }

    pub fn add_bond(
        &mut self,
        serial1: usize,
        serial2: usize,
        order: BondOrder,
    ) -> Result<&mut Self, BuildError> {
        let id1 = *self
            .atom_serial_map
            .get(&serial1)
            .ok_or(BuildError::UnknownSerial(serial1))?;
        let id2 = *self
            .atom_serial_map
            .get(&serial2)
            .ok_or(BuildError::UnknownSerial(serial2))?;
        self.system.add_bond(id1, id2, order);
        Ok(self)
    }

    pub fn atom_count(&self) -> usize {
        self.atom_serial_map.len()
    }

    pub fn build(self) -> MolecularSystem {
        self.system
    }
}
