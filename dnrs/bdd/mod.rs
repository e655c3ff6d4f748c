//! The Binary Decision Diagram over switch variables: node types and the
//! arena they are parsed into.
mod node;
mod store;

pub use crate::bdd::node::*;
pub use crate::bdd::store::*;
