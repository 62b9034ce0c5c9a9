use super::traits::StructureFile;
use crate::core::elements;
use crate::core::models::builder::{AtomRecord, BuildError, MolecularSystemBuilder};
use crate::core::models::chain::ChainType;
use crate::core::models::residue::is_water_residue_name;
use crate::core::models::system::MolecularSystem;
use crate::core::models::topology::BondOrder;
use nalgebra::Point3;
use std::io::{self, BufRead};
use thiserror::Error;
use tracing::debug;

/// Minimum line length that still carries all three coordinates.
const MIN_ATOM_LINE_LEN: usize = 54;

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: PdbParseErrorKind,
    },
    #[error("Inconsistent structure on line {line}: {source}")]
    Build {
        line: usize,
        #[source]
        source: BuildError,
    },
    #[error("Missing required record: {0}")]
    MissingRecord(String),
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Required field in columns {columns} is empty")]
    MissingRequiredField { columns: String },
    #[error("Line is too short for ATOM/HETATM record (must be at least 54 chars)")]
    LineTooShort,
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end.min(line.len())).unwrap_or("").trim()
}

fn parse_int<T: std::str::FromStr>(line_num: usize, value: &str, columns: &str) -> Result<T, PdbError> {
    value.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidInt {
            columns: columns.into(),
            value: value.into(),
        },
    })
}

fn parse_float(line_num: usize, value: &str, columns: &str) -> Result<f64, PdbError> {
    value.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidFloat {
            columns: columns.into(),
            value: value.into(),
        },
    })
}

/// Reader for Protein Data Bank files.
///
/// Only the first model is read. Alternate locations other than the first
/// (blank or `A`) are skipped, and CONECT records that reference skipped
/// atoms are dropped.
pub struct PdbFile;

impl StructureFile for PdbFile {
    type Error = PdbError;

    fn read_from(reader: &mut impl BufRead) -> Result<MolecularSystem, Self::Error> {
        let mut builder = MolecularSystemBuilder::new();
        let mut bonds: Vec<(usize, usize)> = Vec::new();

        let mut current_chain: Option<char> = None;
        let mut current_residue: Option<isize> = None;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            match slice_and_trim(&line, 0, 6) {
                record_type @ ("ATOM" | "HETATM") => {
                    if line.len() < MIN_ATOM_LINE_LEN {
                        return Err(PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::LineTooShort,
                        });
                    }

                    let alt_loc = slice_and_trim(&line, 16, 17);
                    if !alt_loc.is_empty() && alt_loc != "A" {
                        continue;
                    }

                    let serial: usize = parse_int(line_num, slice_and_trim(&line, 6, 11), "7-11")?;
                    let raw_name = line.get(12..16).unwrap_or("");
                    if raw_name.trim().is_empty() {
                        return Err(PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::MissingRequiredField {
                                columns: "13-16".into(),
                            },
                        });
                    }
                    let res_name = slice_and_trim(&line, 17, 20);
                    let chain_id = slice_and_trim(&line, 21, 22).chars().next().unwrap_or('A');
                    let res_id: isize = parse_int(line_num, slice_and_trim(&line, 22, 26), "23-26")?;
                    let x = parse_float(line_num, slice_and_trim(&line, 30, 38), "31-38")?;
                    let y = parse_float(line_num, slice_and_trim(&line, 38, 46), "39-46")?;
                    let z = parse_float(line_num, slice_and_trim(&line, 46, 54), "47-54")?;
                    let element = slice_and_trim(&line, 76, 78);
                    let is_hetero = record_type == "HETATM";

                    if current_chain != Some(chain_id) {
                        let chain_type = match (is_hetero, is_water_residue_name(res_name)) {
                            (_, true) => ChainType::Water,
                            (true, false) => ChainType::Ligand,
                            (false, false) => ChainType::Polymer,
                        };
                        builder.start_chain(chain_id, chain_type);
                        current_chain = Some(chain_id);
                        current_residue = None;
                    }
                    if current_residue != Some(res_id) {
                        builder
                            .start_residue(res_id, res_name)
                            .map_err(|source| PdbError::Build {
                                line: line_num,
                                source,
                            })?;
                        current_residue = Some(res_id);
                    }

                    let inferred;
                    let element = if element.is_empty() {
                        inferred = elements::infer_from_atom_name(raw_name);
                        inferred.as_deref()
                    } else {
                        Some(element)
                    };
                    builder
                        .add_atom(AtomRecord {
                            serial,
                            name: raw_name.trim(),
                            element,
                            position: Point3::new(x, y, z),
                            charge: None,
                            force_field_type: None,
                            is_hetero,
                        })
                        .map_err(|source| PdbError::Build {
                            line: line_num,
                            source,
                        })?;
                }
                "CONECT" => {
                    let origin: usize =
                        parse_int(line_num, slice_and_trim(&line, 6, 11), "7-11")?;
                    for (start, columns) in [(11, "12-16"), (16, "17-21"), (21, "22-26"), (26, "27-31")] {
                        let field = slice_and_trim(&line, start, start + 5);
                        if field.is_empty() {
                            continue;
                        }
                        let target: usize = parse_int(line_num, field, columns)?;
                        bonds.push((origin.min(target), origin.max(target)));
                    }
                }
                "ENDMDL" | "END" => break,
                _ => {}
            }
        }

        if builder.atom_count() == 0 {
            return Err(PdbError::MissingRecord("ATOM/HETATM records".into()));
        }

        bonds.sort_unstable();
        bonds.dedup();
        for (serial1, serial2) in bonds {
            if let Err(e) = builder.add_bond(serial1, serial2, BondOrder::Single) {
                debug!("Skipping CONECT bond {}-{}: {}", serial1, serial2, e);
            }
        }

        Ok(builder.build())
    }
}
