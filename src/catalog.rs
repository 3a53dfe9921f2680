//! Explicit table of ready-made environments.
//!
//! A catalog is read from JSON mapping an id to an [`EnvSpec`]:
//!
//! ```json
//! {
//!   "stack-abc": {
//!     "variant": "blocks",
//!     "problem": {
//!       "name": "abc",
//!       "objects": {"a": "object", "b": "object", "c": "object"},
//!       "init": ["ontable a", "ontable b", "ontable c", "clear a", "clear b", "clear c", "handempty"],
//!       "goal": ["on a b", "on b c"]
//!     },
//!     "n_actions": 5
//!   }
//! }
//! ```
//!
//! Every entry is checked against its representation when the catalog is
//! built; one bad entry rejects the whole catalog.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::env::{GridEnv, DEFAULT_MAX_MOVES};
use crate::error::{Error, Result};
use crate::pddl::atom::State;
use crate::pddl::domain::{self, Domain};
use crate::pddl::problem::Problem;
use crate::representation::{Blocks, Columns, Representation, RepresentationConfig};
use crate::simulator::ProblemSimulator;

/// Representation chosen at run time.
pub type DynRepresentation = Box<dyn Representation + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    Blocks,
    BlocksColumns,
}

impl Variant {
    pub fn domain(self) -> Domain {
        match self {
            Variant::Blocks => domain::blocks(),
            Variant::BlocksColumns => domain::blocks_columns(),
        }
    }

    pub fn representation(self, config: RepresentationConfig) -> DynRepresentation {
        match self {
            Variant::Blocks => Box::new(Blocks::new(config)),
            Variant::BlocksColumns => Box::new(Columns::new(config)),
        }
    }
}

/// Problem with atoms written as text, `(on a b)` or `on a b`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemSpec {
    pub name: String,
    pub objects: BTreeMap<String, String>,
    pub init: Vec<String>,
    pub goal: Vec<String>,
}

fn default_max_moves() -> usize {
    DEFAULT_MAX_MOVES
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvSpec {
    pub variant: Variant,
    pub problem: ProblemSpec,
    #[serde(flatten)]
    pub config: RepresentationConfig,
    #[serde(default = "default_max_moves")]
    pub max_moves: usize,
}

impl EnvSpec {
    pub fn problem(&self) -> Result<Problem> {
        let spec = &self.problem;
        let domain = self.variant.domain();
        Ok(Problem::new(&spec.name, &domain.name, spec.objects.clone(), State::parse(&spec.init)?, State::parse(&spec.goal)?))
    }

    pub fn representation(&self) -> DynRepresentation {
        self.variant.representation(self.config)
    }

    /// Parses the problem and checks it fits the representation.
    pub fn validate(&self) -> Result<()> {
        self.representation().validate(&self.problem()?)
    }

    pub fn make(&self) -> Result<GridEnv<ProblemSimulator, DynRepresentation>> {
        let simulator = ProblemSimulator::new(&self.variant.domain(), self.problem()?)?;
        GridEnv::new(simulator, self.representation(), self.max_moves)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: BTreeMap<String, EnvSpec>,
}

impl Catalog {
    pub fn new(entries: BTreeMap<String, EnvSpec>) -> Result<Self> {
        for (id, spec) in &entries {
            if let Err(e) = spec.validate() {
                warn!("Rejecting environment {}: {}", id, e);
                return Err(e);
            }
        }
        Ok(Self { entries })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::new(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| Error::Io { path: path.display().to_string(), source })?;
        Self::from_json(&json)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn get(&self, id: &str) -> Option<&EnvSpec> {
        self.entries.get(id)
    }

    pub fn make(&self, id: &str) -> Result<GridEnv<ProblemSimulator, DynRepresentation>> {
        self.get(id).ok_or_else(|| Error::Config(format!("no environment {} in catalog", id)))?.make()
    }
}
