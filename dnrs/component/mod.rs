//! Decomposition of the network into ordered independent components.
mod finder;
mod unionfind;

pub use crate::component::finder::*;
pub use crate::component::unionfind::*;
