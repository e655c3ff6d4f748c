//! BDD-guided search for the minimum-loss switch configuration.
pub(crate) mod enumerate;
pub(crate) mod graph;
mod optimizer;

pub mod options;
pub mod report;

pub use crate::optimize::optimizer::*;
pub use crate::optimize::options::*;
pub use crate::optimize::report::*;
