//! # Core Module
//!
//! Stateless building blocks shared by the session controllers: structure
//! models and readers, the conversion to published frames, the fixed
//! rendering style, simulation parameters and the error journal.
//!
//! - **Structure representation** ([`models`], [`elements`]) - atoms, residues, chains, bonds
//! - **File I/O** ([`io`]) - PDB and BGF readers behind [`io::read_structure`]
//! - **Frames** ([`frame`]) - particle data in the form viewers consume
//! - **Rendering** ([`rendering`]) - CPK colour scheme and interaction method
//! - **Simulation parameters** ([`forcefield`]) - force field, system options, integrator
//! - **Error journal** ([`journal`]) - timestamped per-process failure log

pub mod elements;
pub mod forcefield;
pub mod frame;
pub mod io;
pub mod journal;
pub mod models;
pub mod rendering;
