//! Grid view of blocks-world planning problems.
//!
//! Ground STRIPS problems are simulated step by step ([`simulator`]), their
//! states are read as piles standing in a fixed list of slots
//! ([`representation`]) and an episode loop ([`env`]) drives both through a
//! small, fixed action space whose observations are grid layouts.

pub mod catalog;
pub mod env;
pub mod error;
pub mod generator;
pub mod pddl;
pub mod representation;
pub mod simulator;

pub use catalog::Catalog;
pub use env::{GridEnv, Step};
pub use error::{Error, ParseError, Result};
pub use pddl::atom::{Action, Atom, State};
pub use pddl::problem::Problem;
pub use representation::{Blocks, Columns, Layout, Representation, RepresentationConfig};
pub use simulator::{DomainSimulator, ProblemSimulator, Simulator};
