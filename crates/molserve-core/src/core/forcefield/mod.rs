//! Force-field and integrator definitions for simulation sessions, plus the
//! in-memory simulation system built from a parsed topology.
//!
//! Only the parameters are modelled here; no forces are evaluated and no
//! integration is performed.

pub mod params;
pub mod system;
