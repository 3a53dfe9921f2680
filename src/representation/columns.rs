use std::collections::BTreeMap;

use super::{check_fit, Relations, Representation, RepresentationConfig, Rgb, Vocabulary, PALETTE};
use crate::error::{Error, Result};
use crate::pddl::atom::{Action, Atom, State};
use crate::pddl::problem::Problem;
use crate::pddl::utils::AtomIndex;

const VOCABULARY: Vocabulary = Vocabulary {
    on: "on",
    clear: "clear",
    holding: "holding",
    hand_free: "hand-free",
    base: "bottom",
    base_object: 0,
    base_anchor: 1,
    empty: Some(EMPTY),
};

const EMPTY: &str = "empty";
const COLUMN: &str = "column";
const BLOCK: &str = "block";
const SALIENT: &str = "salient";

/// Colours of salient blocks, in order.
const SALIENT_COLORS: [Rgb; 3] = [[255, 0, 0], [0, 255, 0], [0, 0, 255]];

/// Fixed number of columns: one slot per column, any column can take the held block.
#[derive(Debug, Clone, Default)]
pub struct Columns {
    config: RepresentationConfig,
}

impl Columns {
    pub fn new(config: RepresentationConfig) -> Self {
        Self { config }
    }
}

impl Representation for Columns {
    fn vocabulary(&self) -> &Vocabulary {
        &VOCABULARY
    }

    fn config(&self) -> &RepresentationConfig {
        &self.config
    }

    fn slots<'p>(&self, problem: &'p Problem) -> &'p [String] {
        problem.objects_of(COLUMN)
    }

    /// Salient blocks first, then the plain ones.
    fn pile_objects(&self, problem: &Problem) -> Vec<String> {
        problem.objects_of(SALIENT).iter().chain(problem.objects_of(BLOCK)).cloned().collect()
    }

    fn put_down(&self, held: &str, slot: &str) -> Option<Action> {
        Some(Action::new("putdown", &[held, slot]))
    }

    fn pick_up(&self, object: &str, slot: &str) -> Action {
        Action::new("pickup", &[object, slot])
    }

    fn slot_atoms(&self, slot: &str, pile: &[String]) -> Vec<Atom> {
        match pile.first() {
            Some(bottom) => vec![Atom::new(VOCABULARY.base, &[bottom.as_str(), slot])],
            None => vec![Atom::new(EMPTY, &[slot])],
        }
    }

    fn colors(&self, problem: &Problem) -> BTreeMap<String, Rgb> {
        let salients = problem.objects_of(SALIENT).iter().zip(SALIENT_COLORS.iter());
        let blocks = problem.objects_of(BLOCK).iter().zip(PALETTE.iter().cycle());
        salients.chain(blocks).map(|(o, rgb)| (o.clone(), *rgb)).collect()
    }

    fn validate(&self, problem: &Problem) -> Result<()> {
        let salients = problem.objects_of(SALIENT).len();
        if salients > SALIENT_COLORS.len() {
            return Err(Error::Config(format!("problem {} has {} salient blocks, at most {} are supported", problem.name, salients, SALIENT_COLORS.len())));
        }
        check_fit(self, problem)
    }

    /// Unplaced blocks fill the columns the atoms say nothing about, in
    /// canonical order; columns left over are empty.
    fn complete_bases(&self, problem: &Problem, atoms: &State, relations: &Relations, unplaced: &[String]) -> Result<Vec<Atom>> {
        let index = AtomIndex::new(atoms);
        let mut free = self.slots(problem).iter()
            .filter(|col| relations.base(col).is_none() && index.fixed_param(EMPTY, 0, col).is_none());
        let mut completed = Vec::new();
        for block in unplaced {
            let col = free.next().ok_or_else(|| Error::Consistency(format!("no free column left for {}", block)))?;
            completed.push(Atom::new(VOCABULARY.base, &[block, col]));
        }
        completed.extend(free.map(|col| Atom::new(EMPTY, &[col])));
        Ok(completed)
    }
}
