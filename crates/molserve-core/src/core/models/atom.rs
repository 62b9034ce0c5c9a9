use super::ResidueId;
use crate::core::elements;
use nalgebra::Point3;

/// A single atom of a parsed structure.
///
/// Coordinates are kept in Angstroms, exactly as read from the structure file;
/// unit conversion happens only when a frame is produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Serial number from the source file.
    pub serial: usize,
    /// The atom name (e.g., "CA", "OW").
    pub name: String,
    /// Normalized element symbol (e.g., "C", "Cl"). Empty when unknown.
    pub element: String,
    /// The ID of the parent residue.
    pub residue_id: ResidueId,
    /// Cartesian coordinates in Angstroms.
    pub position: Point3<f64>,
    /// Partial charge in elementary charge units, when the format carries one.
    pub partial_charge: f64,
    /// Force-field atom type, when the format carries one.
    pub force_field_type: String,
    /// Whether the atom came from a HETATM record.
    pub is_hetero: bool,
}

impl Atom {
    /// Creates an atom whose element is inferred from its name.
    pub fn new(serial: usize, name: &str, residue_id: ResidueId, position: Point3<f64>) -> Self {
        Self {
            serial,
            name: name.to_string(),
            element: elements::infer_from_atom_name(name).unwrap_or_default(),
            residue_id,
            position,
            partial_charge: 0.0,
            force_field_type: String::new(),
            is_hetero: false,
        }
    }

    /// Overrides the inferred element with an explicit symbol.
    ///
    /// Unknown symbols leave the inferred element untouched.
    pub fn with_element(mut self, symbol: &str) -> Self {
        if let Some(normalized) = elements::normalize_symbol(symbol) {
            self.element = normalized;
        }
        self
    }

    pub fn atomic_number(&self) -> Option<u8> {
        elements::atomic_number(&self.element)
    }

    pub fn is_hydrogen(&self) -> bool {
        self.element == "H"
    }
}
