//! # Structure Models
//!
//! In-memory representation of a parsed molecular structure, as handed from the
//! structure parser to the session controllers and frame conversion.
//!
//! - [`atom`] - Individual atoms with element, coordinates and force-field typing
//! - [`residue`] - Residues grouping atoms under a sequence number
//! - [`chain`] - Chains grouping residues under a single-character identifier
//! - [`topology`] - Bonds and bond orders
//! - [`system`] - The complete [`system::MolecularSystem`]
//! - [`builder`] - Incremental, serial-addressed construction used by the file readers
//!
//! Storage uses [`slotmap`] keys so that atoms, residues and chains can be
//! referenced stably without borrowing the system.

pub mod atom;
pub mod builder;
pub mod chain;
pub mod residue;
pub mod system;
pub mod topology;

use slotmap::new_key_type;

new_key_type! {
    /// Stable key of an atom inside a [`system::MolecularSystem`].
    pub struct AtomId;
    /// Stable key of a residue inside a [`system::MolecularSystem`].
    pub struct ResidueId;
    /// Stable key of a chain inside a [`system::MolecularSystem`].
    pub struct ChainId;
}
