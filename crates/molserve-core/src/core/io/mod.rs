//! Structure file readers.
//!
//! [`read_structure`] is the parser entry point used by the session
//! controllers: it picks a reader from the file extension and converts
//! format-specific errors into a single [`StructureError`].

pub mod bgf;
pub mod pdb;
pub mod traits;

use crate::core::models::system::MolecularSystem;
use bgf::{BgfError, BgfFile};
use pdb::{PdbError, PdbFile};
use std::path::Path;
use thiserror::Error;
use traits::StructureFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureFormat {
    Pdb,
    Bgf,
}

impl StructureFormat {
    /// Picks the format from the file extension. Unknown extensions are read as PDB.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("bgf") => StructureFormat::Bgf,
            _ => StructureFormat::Pdb,
        }
    }
}

#[derive(Debug, Error)]
pub enum StructureError {
    #[error(transparent)]
    Pdb(#[from] PdbError),
    #[error(transparent)]
    Bgf(#[from] BgfError),
}

/// Parses the structure file at `path`.
pub fn read_structure(path: &Path) -> Result<MolecularSystem, StructureError> {
    match StructureFormat::from_path(path) {
        StructureFormat::Pdb => Ok(PdbFile::read_from_path(path)?),
        StructureFormat::Bgf => Ok(BgfFile::read_from_path(path)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn format_is_chosen_from_extension() {
        assert_eq!(StructureFormat::from_path(Path::new("a.BGF")), StructureFormat::Bgf);
        assert_eq!(StructureFormat::from_path(Path::new("a.pdb")), StructureFormat::Pdb);
        assert_eq!(StructureFormat::from_path(Path::new("a.ent")), StructureFormat::Pdb);
        assert_eq!(StructureFormat::from_path(Path::new("noext")), StructureFormat::Pdb);
    }

    #[test]
    fn read_structure_reports_missing_file_as_io_error() {
        let dir = tempdir().unwrap();
        let result = read_structure(&dir.path().join("missing.pdb"));
        assert!(matches!(result, Err(StructureError::Pdb(PdbError::Io(_)))));
    }

    #[test]
    fn read_structure_dispatches_pdb_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("water.pdb");
        fs::write(
            &path,
            "HETATM    1  O   HOH A   1       0.000   0.000   0.000  1.00  0.00           O\nEND\n",
        )
        .unwrap();
        let system = read_structure(&path).unwrap();
        assert_eq!(system.atom_count(), 1);
    }
}
