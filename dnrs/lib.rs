//! # Minimum-loss reconfiguration of radial distribution networks.
//!
//! Given a network model (sections, switches, per-phase loads and impedances)
//! and a Binary Decision Diagram whose satisfying assignments are exactly the
//! switch configurations keeping the network radial and connected, find the
//! set of closed switches that minimizes total resistive power loss.
//!
//! The search works in stages:
//!
//! 1. partition switches and non-root sections into ordered *independent
//!    components* ([`crate::component::find_components`]),
//! 2. for each component, enumerate every feasible closed-switch subset by
//!    walking the BDD restricted to that component's variables, memoizing the
//!    numeric loss of each distinct subset,
//! 3. link components through a weighted *decision graph* whose nodes are BDD
//!    entry/exit nodes and whose edge weights are component losses,
//! 4. run a shortest-path search over the decision graph from the top
//!    decision node to the satisfied terminal ([`crate::optimize::Optimizer::run`]).
//!
//! The following snippet loads a network description and a BDD node list,
//! solves for the optimum, and prints the result:
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! use dnrs::bdd::NodeStore;
//! use dnrs::network::parser::read_network;
//! use dnrs::optimize::{OptimizeOptions, Optimizer, ReportStyle};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut network_file = BufReader::new(File::open("feeders.dnet")?);
//!     let network = read_network(&mut network_file)?;
//!
//!     let mut bdd_file = BufReader::new(File::open("radial.bdd")?);
//!     let store = NodeStore::from_reader(&mut bdd_file)?;
//!
//!     let solution = Optimizer::new(&network, &store).run()?;
//!
//!     let options = OptimizeOptions::builder()
//!         .report_style(ReportStyle::Table)
//!         .build();
//!     print!("{}", solution.render(&network, &options));
//!     Ok(())
//! }
//! ```
//!
//! Main entry points:
//!
//! * [`crate::network::parser::read_network`] -- parse the textual network description
//! * [`crate::bdd::NodeStore::from_reader`] -- parse the BDD node list
//! * [`crate::optimize::Optimizer::run`] -- compute the minimum-loss configuration
//! * [`crate::optimize::Solution::render`] -- render the result for humans
//!
//! All detected inconsistencies between the network and the diagram are
//! unrecoverable: they surface as [`crate::error::ConsistencyError`] and
//! indicate malformed input rather than a condition worth retrying.

pub mod bdd;
pub mod component;
pub mod error;
pub mod network;
pub mod optimize;
pub(crate) mod util;
