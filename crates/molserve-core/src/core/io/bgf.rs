use super::traits::StructureFile;
use crate::core::models::builder::{AtomRecord, BuildError, MolecularSystemBuilder};
use crate::core::models::chain::ChainType;
use crate::core::models::system::MolecularSystem;
use crate::core::models::topology::BondOrder;
use nalgebra::Point3;
use std::collections::HashMap;
use std::io::{self, BufRead};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BgfError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: BgfParseErrorKind,
    },
    #[error("Inconsistent data: {0}")]
    Inconsistency(#[from] BuildError),
    #[error("Missing required record: {0}")]
    MissingRecord(String),
}

#[derive(Debug, Error)]
pub enum BgfParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Required field in columns {columns} is empty")]
    MissingRequiredField { columns: String },
    #[error("Line is too short for ATOM/HETATM record (must be at least 80 chars)")]
    LineTooShort,
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("").trim()
}

fn invalid_int(line: usize, columns: &str, value: &str) -> BgfError {
    BgfError::Parse {
        line,
        kind: BgfParseErrorKind::InvalidInt {
            columns: columns.into(),
            value: value.into(),
        },
    }
}

fn invalid_float(line: usize, columns: &str, value: &str) -> BgfError {
    BgfError::Parse {
        line,
        kind: BgfParseErrorKind::InvalidFloat {
            columns: columns.into(),
            value: value.into(),
        },
    }
}

/// Element symbol encoded in a force-field type such as `C_3` or `Cl`.
fn element_from_ff_type(ff_type: &str) -> Option<&str> {
    ff_type.split('_').next().filter(|symbol| !symbol.is_empty())
}

/// Reader for BioGraf (BGF) files.
pub struct BgfFile;

impl StructureFile for BgfFile {
    type Error = BgfError;

    fn read_from(reader: &mut impl BufRead) -> Result<MolecularSystem, Self::Error> {
        let mut builder = MolecularSystemBuilder::new();

        let mut conect: Vec<(usize, usize)> = Vec::new();
        let mut orders: HashMap<(usize, usize), BondOrder> = HashMap::new();

        let mut current_chain_id = '\0';
        let mut current_residue_id = isize::MIN;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            match slice_and_trim(&line, 0, 6) {
                record_type @ ("ATOM" | "HETATM") => {
                    if line.len() < 80 {
                        return Err(BgfError::Parse {
                            line: line_num,
                            kind: BgfParseErrorKind::LineTooShort,
                        });
                    }

                    let serial_str = slice_and_trim(&line, 7, 12);
                    let name_str = slice_and_trim(&line, 13, 18);
                    let res_name_str = slice_and_trim(&line, 19, 22);
                    let chain_id_str = slice_and_trim(&line, 23, 24);
                    let res_id_str = slice_and_trim(&line, 25, 30);
                    let x_str = slice_and_trim(&line, 30, 40);
                    let y_str = slice_and_trim(&line, 40, 50);
                    let z_str = slice_and_trim(&line, 50, 60);
                    let ff_type_str = slice_and_trim(&line, 61, 66);
                    let charge_str = slice_and_trim(&line, 72, 80);

                    if name_str.is_empty() {
                        return Err(BgfError::Parse {
                            line: line_num,
                            kind: BgfParseErrorKind::MissingRequiredField {
                                columns: "14-18".into(),
                            },
                        });
                    }
                    let serial: usize = serial_str
                        .parse()
                        .map_err(|_| invalid_int(line_num, "8-12", serial_str))?;
                    let res_id: isize = res_id_str
                        .parse()
                        .map_err(|_| invalid_int(line_num, "26-30", res_id_str))?;
                    let x: f64 = x_str
                        .parse()
                        .map_err(|_| invalid_float(line_num, "31-40", x_str))?;
                    let y: f64 = y_str
                        .parse()
                        .map_err(|_| invalid_float(line_num, "41-50", y_str))?;
                    let z: f64 = z_str
                        .parse()
                        .map_err(|_| invalid_float(line_num, "51-60", z_str))?;
                    let charge: f64 = charge_str
                        .parse()
                        .map_err(|_| invalid_float(line_num, "73-80", charge_str))?;

                    let chain_id = chain_id_str.chars().next().unwrap_or('A');
                    let is_hetero = record_type == "HETATM";
                    if chain_id != current_chain_id {
                        let chain_type = if is_hetero {
                            ChainType::Ligand
                        } else {
                            ChainType::Polymer
                        };
                        builder.start_chain(chain_id, chain_type);
                        current_chain_id = chain_id;
                        current_residue_id = isize::MIN;
                    }
                    if res_id != current_residue_id {
                        builder.start_residue(res_id, res_name_str)?;
                        current_residue_id = res_id;
                    }

                    builder.add_atom(AtomRecord {
                        serial,
                        name: name_str,
                        element: element_from_ff_type(ff_type_str),
                        position: Point3::new(x, y, z),
                        charge: Some(charge),
                        force_field_type: Some(ff_type_str),
                        is_hetero,
                    })?;
                }
                record_type @ ("CONECT" | "ORDER") => {
                    let parts: Vec<&str> = line.split_whitespace().collect();
                    if parts.len() < 3 {
                        continue;
                    }
                    let origin: usize = parts[1]
                        .parse()
                        .map_err(|_| invalid_int(line_num, "7-12", parts[1]))?;
                    if record_type == "CONECT" {
                        for target in &parts[2..] {
                            let target: usize = target
                                .parse()
                                .map_err(|_| invalid_int(line_num, "13-", target))?;
                            conect.push((origin.min(target), origin.max(target)));
                        }
                    } else {
                        let target: usize = parts[2]
                            .parse()
                            .map_err(|_| invalid_int(line_num, "13-18", parts[2]))?;
                        let order = parts
                            .get(3)
                            .and_then(|o| o.parse().ok())
                            .unwrap_or_default();
                        orders.insert((origin.min(target), origin.max(target)), order);
                    }
                }
                "END" => break,
                _ => {}
            }
        }

        if builder.atom_count() == 0 {
            return Err(BgfError::MissingRecord("ATOM/HETATM records".into()));
        }

        conect.sort_unstable();
        conect.dedup();
        for (a1, a2) in conect {
            let order = orders.get(&(a1, a2)).copied().unwrap_or_default();
            builder.add_bond(a1, a2, order)?;
        }

        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn atom_line(serial: usize, name: &str, res_id: isize, x: f64, ff_type: &str, charge: f64) -> String {
        format!(
            "{:<6} {:>5} {:<5} {:>3} {:1} {:>5}{:>10.5}{:>10.5}{:>10.5} {:<5}{:>3}{:>2} {:>8.5}",
            "HETATM", serial, name, "LIG", "A", res_id, x, 0.0, 0.0, ff_type, 1, 0, charge
        )
    }

    fn read(content: &str) -> Result<MolecularSystem, BgfError> {
        BgfFile::read_from(&mut Cursor::new(content.as_bytes()))
    }

    #[test]
    fn reads_atoms_with_charge_and_force_field_type() {
        let content = [
            "BIOGRF 200".to_string(),
            "FORCEFIELD DREIDING".to_string(),
            atom_line(1, "C1", 1, 1.5, "C_3", -0.12),
            atom_line(2, "CL1", 1, 3.2, "Cl", -0.05),
            "FORMAT CONECT (a6,12i6)".to_string(),
            "CONECT     1     2".to_string(),
            "ORDER      1     2     1".to_string(),
            "END".to_string(),
        ]
        .join("\n");

        let system = read(&content).unwrap();
        assert_eq!(system.atom_count(), 2);
        assert_eq!(system.bonds().len(), 1);

        let atoms: Vec<_> = system.atoms_in_order().map(|(_, a)| a).collect();
        assert_eq!(atoms[0].element, "C");
        assert_eq!(atoms[0].force_field_type, "C_3");
        assert!((atoms[0].partial_charge + 0.12).abs() < 1e-9);
        assert_eq!(atoms[1].element, "Cl");
        assert!(atoms[1].is_hetero);
    }

    #[test]
    fn short_atom_line_is_rejected() {
        let err = read("HETATM     1 C1    LIG A     1").unwrap_err();
        assert!(matches!(
            err,
            BgfError::Parse {
                kind: BgfParseErrorKind::LineTooShort,
                ..
            }
        ));
    }

    #[test]
    fn bond_to_unknown_atom_is_inconsistent() {
        let content = [atom_line(1, "C1", 1, 0.0, "C_3", 0.0), "CONECT     1     9".to_string()].join("\n");
        assert!(matches!(
            read(&content),
            Err(BgfError::Inconsistency(BuildError::UnknownSerial(9)))
        ));
    }

    #[test]
    fn file_without_atoms_is_rejected() {
        assert!(matches!(
            read("BIOGRF 200\nEND\n"),
            Err(BgfError::MissingRecord(_))
        ));
    }
}
