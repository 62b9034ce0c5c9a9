use crate::cli::InspectArgs;
use crate::error::{CliError, Result};
use molserve::core::frame::FrameData;
use molserve::core::io::read_structure;
use molserve::core::models::system::MolecularSystem;
use std::fmt::Write as _;
use tracing::info;

pub async fn run(args: InspectArgs) -> Result<()> {
    info!("Reading structure from {:?}", args.input);
    let system = read_structure(&args.input).map_err(|e| CliError::FileParsing {
        path: args.input.clone(),
        source: e.into(),
    })?;

    print!("{}", summarize(&system));
    Ok(())
}

fn summarize(system: &MolecularSystem) -> String {
    let frame = FrameData::from_system(system);
    let mut out = String::new();

    writeln!(out, "Atoms:    {}", system.atom_count()).ok();
    writeln!(out, "Residues: {}", system.residue_count()).ok();
    writeln!(out, "Chains:   {}", system.chain_count()).ok();
    for (_, chain) in system.chains_iter() {
        writeln!(
            out,
            "  {} ({}, {} residues)",
            chain.id,
            chain.chain_type,
            chain.residues().len()
        )
        .ok();
    }
    writeln!(out, "Bonds:    {}", system.bonds().len()).ok();
    writeln!(out, "Elements:").ok();
    for (element, count) in system.element_composition() {
        writeln!(out, "  {:<3}{}", element, count).ok();
    }
    writeln!(out, "Frame particles: {}", frame.particle_count).ok();
    out
}
