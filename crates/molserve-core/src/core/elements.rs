//! Element lookup tables and element inference from PDB-style atom names.

use phf::{Map, phf_map};

/// Atomic number and standard atomic mass (Da) keyed by normalized symbol.
static ELEMENTS: Map<&'static str, (u8, f64)> = phf_map! {
    "H" => (1, 1.008), "He" => (2, 4.0026), "Li" => (3, 6.94), "Be" => (4, 9.0122),
    "B" => (5, 10.81), "C" => (6, 12.011), "N" => (7, 14.007), "O" => (8, 15.999),
    "F" => (9, 18.998), "Ne" => (10, 20.180), "Na" => (11, 22.990), "Mg" => (12, 24.305),
    "Al" => (13, 26.982), "Si" => (14, 28.085), "P" => (15, 30.974), "S" => (16, 32.06),
    "Cl" => (17, 35.45), "Ar" => (18, 39.948), "K" => (19, 39.098), "Ca" => (20, 40.078),
    "Mn" => (25, 54.938), "Fe" => (26, 55.845), "Co" => (27, 58.933), "Ni" => (28, 58.693),
    "Cu" => (29, 63.546), "Zn" => (30, 65.38), "Se" => (34, 78.971), "Br" => (35, 79.904),
    "Rb" => (37, 85.468), "Sr" => (38, 87.62), "Cd" => (48, 112.41), "I" => (53, 126.90),
    "Cs" => (55, 132.91), "Ba" => (56, 137.33), "Hg" => (80, 200.59),
};

/// Deuterium is reported as hydrogen.
const ISOTOPE_ALIASES: &[(&str, &str)] = &[("D", "H"), ("T", "H")];

/// Normalizes a symbol such as `"CL"` or `" cl"` to `"Cl"`.
///
/// Returns `None` for symbols that are not in the element table.
pub fn normalize_symbol(symbol: &str) -> Option<String> {
    let trimmed = symbol.trim();
    let mut chars = trimmed.chars();
    let first = chars.next()?.to_ascii_uppercase();
    let normalized: String = std::iter::once(first)
        .chain(chars.map(|c| c.to_ascii_lowercase()))
        .collect();
    if let Some((_, target)) = ISOTOPE_ALIASES.iter().find(|(alias, _)| *alias == normalized) {
        return Some(target.to_string());
    }
    ELEMENTS.contains_key(normalized.as_str()).then_some(normalized)
}

pub fn atomic_number(symbol: &str) -> Option<u8> {
    ELEMENTS.get(symbol).map(|(number, _)| *number)
}

pub fn atomic_mass(symbol: &str) -> Option<f64> {
    ELEMENTS.get(symbol).map(|(_, mass)| *mass)
}

/// Infers the element of an atom from its name.
///
/// Follows the PDB column convention: in the raw four-character name field a
/// two-letter element starts in the first column (`"FE  "`, `"CL  "`), while a
/// one-letter element is preceded by a space (`" CA "` is an alpha carbon).
/// Trimmed names fall back to leading-digit stripping and the first letter.
pub fn infer_from_atom_name(raw_name: &str) -> Option<String> {
    if raw_name.len() == 4 && raw_name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        if let Some(symbol) = raw_name.get(0..2).and_then(normalize_symbol) {
            return Some(symbol);
        }
    }

    let letters: String = raw_name
        .trim()
        .trim_start_matches(|c: char| c.is_ascii_digit())
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    letters.get(0..1).and_then(normalize_symbol)
}
