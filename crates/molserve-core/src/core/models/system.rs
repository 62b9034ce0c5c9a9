use super::atom::Atom;
use super::chain::{Chain, ChainType};
use super::residue::Residue;
use super::topology::{Bond, BondOrder};
use super::{AtomId, ChainId, ResidueId};
use slotmap::{SecondaryMap, SlotMap};
use std::collections::{BTreeMap, HashMap};

/// A complete parsed structure: chains, residues, atoms and bonds.
///
/// The system is the unit exchanged between the structure parser and the
/// session controllers. Chains, residues and atoms keep their file order so
/// that frames built from a system list particles in the same order as the
/// source file.
#[derive(Debug, Clone, Default)]
pub struct MolecularSystem {
    atoms: SlotMap<AtomId, Atom>,
    residues: SlotMap<ResidueId, Residue>,
    chains: SlotMap<ChainId, Chain>,
    chain_order: Vec<ChainId>,
    bonds: Vec<Bond>,
    residue_id_map: HashMap<(ChainId, isize), ResidueId>,
    chain_id_map: HashMap<char, ChainId>,
    bond_adjacency: SecondaryMap<AtomId, Vec<AtomId>>,
}

impl MolecularSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    pub fn atom_mut(&mut self, id: AtomId) -> Option<&mut Atom> {
        self.atoms.get_mut(id)
    }

    pub fn residue(&self, id: ResidueId) -> Option<&Residue> {
        self.residues.get(id)
    }

    pub fn chain(&self, id: ChainId) -> Option<&Chain> {
        self.chains.get(id)
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn residue_count(&self) -> usize {
        self.residues.len()
    }

    pub fn chain_count(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Iterates over chains in the order they were first encountered.
    pub fn chains_iter(&self) -> impl Iterator<Item = (ChainId, &Chain)> {
        self.chain_order
            .iter()
            .filter_map(|&id| self.chains.get(id).map(|chain| (id, chain)))
    }

    /// Iterates over atoms in file order (chain, then residue, then atom).
    pub fn atoms_in_order(&self) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.chains_iter()
            .flat_map(move |(_, chain)| chain.residues().iter())
            .filter_map(move |&residue_id| self.residues.get(residue_id))
            .flat_map(move |residue| residue.atoms().iter())
            .filter_map(move |&atom_id| self.atoms.get(atom_id).map(|atom| (atom_id, atom)))
    }

    pub fn find_chain_by_id(&self, id: char) -> Option<ChainId> {
        self.chain_id_map.get(&id).copied()
    }

    pub fn find_residue_by_id(&self, chain_id: ChainId, residue_number: isize) -> Option<ResidueId> {
        self.residue_id_map
            .get(&(chain_id, residue_number))
            .copied()
    }

    /// Adds a chain, returning the existing one if the identifier is already known.
    pub fn add_chain(&mut self, id: char, chain_type: ChainType) -> ChainId {
        if let Some(&existing) = self.chain_id_map.get(&id) {
            return existing;
        }
        let chain_id = self.chains.insert(Chain::new(id, chain_type));
        self.chain_id_map.insert(id, chain_id);
        self.chain_order.push(chain_id);
        chain_id
    }

    /// Reclassifies a chain, e.g. once a HETATM record shows it holds a ligand.
    pub fn set_chain_type(&mut self, chain_id: ChainId, chain_type: ChainType) -> Option<()> {
        self.chains.get_mut(chain_id)?.chain_type = chain_type;
        Some(())
    }

    /// Adds a residue to a chain, returning the existing one for a repeated number.
    ///
    /// Returns `None` if the chain does not exist.
    pub fn add_residue(
        &mut self,
        chain_id: ChainId,
        residue_number: isize,
        name: &str,
    ) -> Option<ResidueId> {
        let chain = self.chains.get_mut(chain_id)?;
        let residue_id = *self
            .residue_id_map
            .entry((chain_id, residue_number))
            .or_insert_with(|| self.residues.insert(Residue::new(residue_number, name, chain_id)));
        if !chain.residues.contains(&residue_id) {
            chain.residues.push(residue_id);
        }
        Some(residue_id)
    }

    /// Inserts an atom and registers it with its residue.
    ///
    /// Returns `None` if the atom's residue does not exist.
    pub fn add_atom(&mut self, atom: Atom) -> Option<AtomId> {
        let residue_id = atom.residue_id;
        if !self.residues.contains_key(residue_id) {
            return None;
        }
        let atom_id = self.atoms.insert(atom);
        self.bond_adjacency.insert(atom_id, Vec::new());
        self.residues[residue_id].atoms.push(atom_id);
        Some(atom_id)
    }

    /// Adds a bond between two existing atoms. Repeated bonds are ignored.
    pub fn add_bond(&mut self, atom1_id: AtomId, atom2_id: AtomId, order: BondOrder) -> Option<()> {
        if atom1_id == atom2_id
            || !self.atoms.contains_key(atom1_id)
            || !self.atoms.contains_key(atom2_id)
        {
            return None;
        }
        if self.bond_adjacency[atom1_id].contains(&atom2_id) {
            return Some(());
        }
        self.bonds.push(Bond::new(atom1_id, atom2_id, order));
        self.bond_adjacency[atom1_id].push(atom2_id);
        self.bond_adjacency[atom2_id].push(atom1_id);
        Some(())
    }

    pub fn bonded_neighbors(&self, atom_id: AtomId) -> Option<&[AtomId]> {
        self.bond_adjacency.get(atom_id).map(Vec::as_slice)
    }

    /// Counts atoms per element symbol. Atoms with an unknown element are
    /// counted under `"?"`.
    pub fn element_composition(&self) -> BTreeMap<String, usize> {
        let mut composition = BTreeMap::new();
        for atom in self.atoms.values() {
            let key = if atom.element.is_empty() {
                "?".to_string()
            } else {
                atom.element.clone()
            };
            *composition.entry(key).or_insert(0) += 1;
        }
        composition
    }
}
