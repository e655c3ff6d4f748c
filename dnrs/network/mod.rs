//! Static model of the distribution network: sections, switches, junctions,
//! and the per-configuration loss evaluation.
mod network;

pub mod parser;

pub use crate::network::network::*;
