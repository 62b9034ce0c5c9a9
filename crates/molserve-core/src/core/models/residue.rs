use super::{AtomId, ChainId};

/// Residue names treated as solvent when classifying chains.
const WATER_RESIDUE_NAMES: &[&str] = &["HOH", "WAT", "H2O", "TIP3", "TIP", "SOL", "DOD"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Residue {
    pub id: isize,            // sequence number from the source file
    pub name: String,         // e.g. "ALA", "HOH"
    pub chain_id: ChainId,    // parent chain
    pub(crate) atoms: Vec<AtomId>,
}

impl Residue {
    pub(crate) fn new(id: isize, name: &str, chain_id: ChainId) -> Self {
        Self {
            id,
            name: name.to_string(),
            chain_id,
            atoms: Vec::new(),
        }
    }

    pub fn atoms(&self) -> &[AtomId] {
        &self.atoms
    }

    pub fn is_water(&self) -> bool {
        is_water_residue_name(&self.name)
    }
}

pub fn is_water_residue_name(name: &str) -> bool {
    let name = name.trim();
    WATER_RESIDUE_NAMES
        .iter()
        .any(|water| water.eq_ignore_ascii_case(name))
}
