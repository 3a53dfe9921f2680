use super::{Relations, Representation, RepresentationConfig, Vocabulary};
use crate::error::Result;
use crate::pddl::atom::{Action, Atom, State};
use crate::pddl::domain::OBJECT;
use crate::pddl::problem::Problem;

const VOCABULARY: Vocabulary = Vocabulary {
    on: "on",
    clear: "clear",
    holding: "holding",
    hand_free: "handempty",
    base: "ontable",
    base_object: 0,
    base_anchor: 0,
    empty: None,
};

/// Single table: one slot per block, a block's slot holds the pile it is the
/// bottom of.
#[derive(Debug, Clone, Default)]
pub struct Blocks {
    config: RepresentationConfig,
}

impl Blocks {
    pub fn new(config: RepresentationConfig) -> Self {
        Self { config }
    }
}

impl Representation for Blocks {
    fn vocabulary(&self) -> &Vocabulary {
        &VOCABULARY
    }

    fn config(&self) -> &RepresentationConfig {
        &self.config
    }

    fn slots<'p>(&self, problem: &'p Problem) -> &'p [String] {
        problem.objects_of(OBJECT)
    }

    fn pile_objects(&self, problem: &Problem) -> Vec<String> {
        problem.objects_of(OBJECT).to_vec()
    }

    /// A block can only go back to the table in its own slot.
    fn put_down(&self, held: &str, slot: &str) -> Option<Action> {
        if held == slot {
            Some(Action::new("put-down", &[held]))
        } else {
            None
        }
    }

    fn pick_up(&self, object: &str, _slot: &str) -> Action {
        Action::new("pick-up", &[object])
    }

    fn slot_atoms(&self, _slot: &str, pile: &[String]) -> Vec<Atom> {
        pile.first().map(|bottom| Atom::new(VOCABULARY.base, &[bottom])).into_iter().collect()
    }

    fn complete_bases(&self, _problem: &Problem, _atoms: &State, _relations: &Relations, unplaced: &[String]) -> Result<Vec<Atom>> {
        Ok(unplaced.iter().map(|b| Atom::new(VOCABULARY.base, &[b])).collect())
    }
}
