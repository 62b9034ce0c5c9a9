//! Conversion of parsed structures into the frame representation published to viewers.

use crate::core::models::AtomId;
use crate::core::models::system::MolecularSystem;
use std::collections::HashMap;

/// Length conversion applied to coordinates: structure files use Angstroms,
/// frames use nanometres.
pub const ANGSTROM_TO_NANOMETER: f64 = 0.1;

/// A snapshot of particle data as published to viewers.
///
/// All per-particle vectors share the same order and length
/// (`particle_count`). Bonds reference particles by their index in that order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameData {
    pub particle_count: usize,
    pub positions: Vec<[f32; 3]>,
    pub elements: Vec<u8>,
    pub particle_names: Vec<String>,
    pub residue_names: Vec<String>,
    pub residue_ids: Vec<isize>,
    pub chain_ids: Vec<char>,
    pub bonds: Vec<[usize; 2]>,
}

impl FrameData {
    /// Builds a frame from a molecular system, preserving file order.
    ///
    /// Atoms with an unknown element are published with atomic number 0.
    pub fn from_system(system: &MolecularSystem) -> Self {
        let mut frame = FrameData::default();
        let mut index_of: HashMap<AtomId, usize> = HashMap::with_capacity(system.atom_count());

        for (_, chain) in system.chains_iter() {
            for &residue_id in chain.residues() {
                let Some(residue) = system.residue(residue_id) else {
                    continue;
                };
                for &atom_id in residue.atoms() {
                    let Some(atom) = system.atom(atom_id) else {
                        continue;
                    };
                    index_of.insert(atom_id, frame.particle_count);
                    frame.particle_count += 1;

                    let p = atom.position * ANGSTROM_TO_NANOMETER;
                    frame.positions.push([p.x as f32, p.y as f32, p.z as f32]);
                    frame.elements.push(atom.atomic_number().unwrap_or(0));
                    frame.particle_names.push(atom.name.clone());
                    frame.residue_names.push(residue.name.clone());
                    frame.residue_ids.push(residue.id);
                    frame.chain_ids.push(chain.id);
                }
            }
        }

        frame.bonds = system
            .bonds()
            .iter()
            .filter_map(|bond| {
                let a = *index_of.get(&bond.atom1_id)?;
                let b = *index_of.get(&bond.atom2_id)?;
                Some([a.min(b), a.max(b)])
            })
            .collect();

        frame
    }

    pub fn is_empty(&self) -> bool {
        self.particle_count == 0
    }
}
