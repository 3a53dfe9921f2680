//! Slot/pile view of a stacking state.
//!
//! A [`Representation`] enumerates a fixed, sorted list of slots for a problem,
//! rebuilds the pile standing in each slot from the relational atoms and maps
//! every slot to the one high-level action that makes sense for it. The same
//! piles give each object a grid coordinate for rendering.
//!
//! The algorithms are provided methods of the trait; [`Blocks`] and
//! [`Columns`] only name their predicates, their slot objects and their
//! pick-up / put-down actions.

pub mod blocks;
pub mod columns;
pub mod relations;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

pub use blocks::Blocks;
pub use columns::Columns;
pub use relations::{Relations, Vocabulary};

use crate::error::{Error, Result};
use crate::pddl::atom::{Action, Atom, State};
use crate::pddl::problem::Problem;

pub type Rgb = [u8; 3];

/// Distinguishable colours assigned to pile objects in canonical order.
pub const PALETTE: [Rgb; 20] = [
    [230, 25, 75], [60, 180, 75], [255, 225, 25], [0, 130, 200], [245, 130, 48],
    [145, 30, 180], [70, 240, 240], [240, 50, 230], [210, 245, 60], [250, 190, 190],
    [0, 128, 128], [230, 190, 255], [170, 110, 40], [255, 250, 200], [128, 0, 0],
    [170, 255, 195], [128, 128, 0], [255, 215, 180], [0, 0, 128], [128, 128, 128],
];

/// Sizing of the reduced action space and of the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepresentationConfig {
    /// Fixed number of reduced actions; trailing slots are no-ops.
    #[serde(default)]
    pub n_actions: Option<usize>,
    /// Minimum (width, height) of the grid.
    #[serde(default)]
    pub min_extent: Option<(usize, usize)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridObject {
    pub name: String,
    /// (column, row), row 0 at the top.
    pub pos: (usize, usize),
    pub rgb: Rgb,
}

/// What the renderer receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layout {
    pub extent: (usize, usize),
    pub objects: Vec<GridObject>,
}

impl Layout {
    pub fn at(&self, pos: (usize, usize)) -> Option<&GridObject> {
        self.objects.iter().find(|o| o.pos == pos)
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (width, height) = self.extent;
        for row in 0..height {
            let line = (0..width)
                .map(|col| self.at((col, row)).and_then(|o| o.name.chars().next()).unwrap_or('.'))
                .collect::<String>();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Slot count against the action cap and natural extent against the grid.
pub(crate) fn check_fit<R: Representation + ?Sized>(repr: &R, problem: &Problem) -> Result<()> {
    let n_slots = repr.slots(problem).len();
    if n_slots == 0 {
        return Err(Error::Config(format!("problem {} has no slots", problem.name)));
    }
    if let Some(cap) = repr.config().n_actions {
        if n_slots > cap {
            return Err(Error::Config(format!("problem {} has {} slots, more than the {} actions configured", problem.name, n_slots, cap)));
        }
    }
    if let Some((min_width, min_height)) = repr.config().min_extent {
        let (width, height) = repr.natural_extent(problem);
        if min_width < width || min_height < height {
            return Err(Error::Config(format!("grid of {}x{} is smaller than the {}x{} problem {} needs",
                min_width, min_height, width, height, problem.name)));
        }
    }
    Ok(())
}

pub trait Representation {
    fn vocabulary(&self) -> &Vocabulary;

    fn config(&self) -> &RepresentationConfig;

    /// Canonically sorted slot objects of `problem`.
    fn slots<'p>(&self, problem: &'p Problem) -> &'p [String];

    /// Every object that can stand in a pile, in colour order.
    fn pile_objects(&self, problem: &Problem) -> Vec<String>;

    /// Putting the held object into the empty `slot`, if that is legal.
    fn put_down(&self, held: &str, slot: &str) -> Option<Action>;

    /// Picking up `object`, the only object in `slot`.
    fn pick_up(&self, object: &str, slot: &str) -> Action;

    /// Atoms describing the bottom of `slot` holding `pile`.
    fn slot_atoms(&self, slot: &str, pile: &[String]) -> Vec<Atom>;

    /// Base atoms for `unplaced` objects, which rest on nothing and are not
    /// held in the partial atoms `relations` was read from.
    fn complete_bases(&self, problem: &Problem, atoms: &State, relations: &Relations, unplaced: &[String]) -> Result<Vec<Atom>>;

    fn stack(&self, held: &str, top: &str) -> Action {
        Action::new("stack", &[held, top])
    }

    fn unstack(&self, top: &str, below: &str) -> Action {
        Action::new("unstack", &[top, below])
    }

    fn colors(&self, problem: &Problem) -> BTreeMap<String, Rgb> {
        self.pile_objects(problem).into_iter()
            .enumerate()
            .map(|(i, o)| (o, PALETTE[i % PALETTE.len()]))
            .collect()
    }

    fn n_actions(&self, problem: &Problem) -> usize {
        self.config().n_actions.unwrap_or_else(|| self.slots(problem).len())
    }

    /// (slots, pile objects + 1): one row per possible pile level plus the
    /// row of the held object.
    fn natural_extent(&self, problem: &Problem) -> (usize, usize) {
        (self.slots(problem).len(), self.pile_objects(problem).len() + 1)
    }

    fn extent(&self, problem: &Problem) -> (usize, usize) {
        let (width, height) = self.natural_extent(problem);
        match self.config().min_extent {
            Some((min_width, min_height)) => (width.max(min_width), height.max(min_height)),
            None => (width, height),
        }
    }

    /// Rejects problems that do not fit the configured action space or grid.
    fn validate(&self, problem: &Problem) -> Result<()> {
        check_fit(self, problem)
    }

    fn relations(&self, atoms: &State) -> Result<Relations> {
        Relations::new(self.vocabulary(), atoms.iter())
    }

    /// Pile of `slot`. Where the vocabulary has an empty predicate, a slot
    /// must have either a base or that atom, not both.
    fn pile(&self, relations: &Relations, slot: &str) -> Result<Vec<String>> {
        let pile = relations.pile(slot)?;
        if let Some(empty) = self.vocabulary().empty {
            match (pile.is_empty(), relations.is_empty(slot)) {
                (true, false) => return Err(Error::Consistency(format!("{} has neither a base nor ({} {})", slot, empty, slot))),
                (false, true) => return Err(Error::Consistency(format!("{} has a base and ({} {})", slot, empty, slot))),
                _ => {},
            }
        }
        Ok(pile)
    }

    /// Action of a single slot given its pile.
    fn slot_action(&self, relations: &Relations, slot: &str, pile: &[String]) -> Option<Action> {
        match (relations.held(), pile) {
            (Some(held), []) => self.put_down(held, slot),
            (Some(held), [.., top]) => Some(self.stack(held, top)),
            (None, []) => None,
            (None, [only]) => Some(self.pick_up(only, slot)),
            (None, [.., below, top]) => Some(self.unstack(top, below)),
        }
    }

    /// One entry per reduced action index; `None` is a no-op.
    fn reduced_actions(&self, problem: &Problem, relations: &Relations) -> Result<Vec<Option<Action>>> {
        let slots = self.slots(problem);
        let n_actions = self.n_actions(problem);
        if slots.len() > n_actions {
            return Err(Error::Config(format!("problem {} has {} slots, more than the {} actions configured", problem.name, slots.len(), n_actions)));
        }
        let mut actions = Vec::with_capacity(n_actions);
        for slot in slots {
            let pile = self.pile(relations, slot)?;
            actions.push(self.slot_action(relations, slot, &pile));
        }
        actions.resize(n_actions, None);
        Ok(actions)
    }

    fn reduced_action(&self, problem: &Problem, relations: &Relations, index: usize) -> Result<Option<Action>> {
        let n_actions = self.n_actions(problem);
        if index >= n_actions {
            return Err(Error::IndexOutOfRange { index, len: n_actions });
        }
        match self.slots(problem).get(index) {
            Some(slot) => {
                let pile = self.pile(relations, slot)?;
                Ok(self.slot_action(relations, slot, &pile))
            },
            None => Ok(None),
        }
    }

    /// Grid coordinates: column = slot position, piles grow upwards from the
    /// bottom row, the held object sits in the top-right corner.
    fn layout(&self, problem: &Problem, relations: &Relations) -> Result<Layout> {
        let (width, height) = self.extent(problem);
        let colors = self.colors(problem);
        let color = |name: &str| colors.get(name).copied().unwrap_or(PALETTE[PALETTE.len() - 1]);
        let mut objects = Vec::new();
        for (i, slot) in self.slots(problem).iter().enumerate() {
            for (depth, name) in self.pile(relations, slot)?.into_iter().enumerate() {
                let row = height.checked_sub(depth + 1)
                    .filter(|row| *row > 0)
                    .ok_or_else(|| Error::Consistency(format!("pile of {} is taller than the grid", slot)))?;
                let rgb = color(&name);
                objects.push(GridObject { name, pos: (i, row), rgb });
            }
        }
        if let Some(held) = relations.held() {
            let col = width.checked_sub(1)
                .ok_or_else(|| Error::Config(format!("problem {} has no slots to hold {} above", problem.name, held)))?;
            objects.push(GridObject { name: held.to_owned(), pos: (col, 0), rgb: color(held) });
        }
        Ok(Layout { extent: (width, height), objects })
    }

    /// Closed-world completion of a partial atom set: every object not on
    /// another and not held rests on its base, every object nothing rests on
    /// and not held is clear, and the hand is free unless something is held.
    fn complete_atoms(&self, problem: &Problem, atoms: &State) -> Result<State> {
        let vocabulary = self.vocabulary();
        let relations = Relations::read(vocabulary, atoms.iter())?;
        let supported: BTreeSet<&str> = relations.supported().collect();
        let supports: BTreeSet<&str> = relations.supports().collect();
        let bottoms: BTreeSet<&str> = relations.bottoms().collect();
        let held = relations.held();

        let mut completed = atoms.clone();
        let mut unplaced = Vec::new();
        for object in self.pile_objects(problem) {
            if held == Some(object.as_str()) {
                continue;
            }
            if !supports.contains(object.as_str()) {
                completed.0.insert(Atom::new(vocabulary.clear, &[&object]));
            }
            if !supported.contains(object.as_str()) && !bottoms.contains(object.as_str()) {
                unplaced.push(object);
            }
        }
        completed.extend(self.complete_bases(problem, atoms, &relations, &unplaced)?);
        if held.is_none() {
            completed.0.insert(Atom::new::<&str>(vocabulary.hand_free, &[]));
        }
        Ok(completed)
    }

    /// Re-derives the stacking atoms of `relations` from its piles.
    fn pile_atoms(&self, problem: &Problem, relations: &Relations) -> Result<State> {
        let vocabulary = self.vocabulary();
        let mut atoms = State::new();
        for slot in self.slots(problem) {
            let pile = self.pile(relations, slot)?;
            atoms.extend(self.slot_atoms(slot, &pile));
            atoms.extend(pile.windows(2).map(|pair| Atom::new(vocabulary.on, &[&pair[1], &pair[0]])));
            if let Some(top) = pile.last() {
                atoms.0.insert(Atom::new(vocabulary.clear, &[top]));
            }
        }
        match relations.held() {
            Some(held) => atoms.0.insert(Atom::new(vocabulary.holding, &[held])),
            None => atoms.0.insert(Atom::new::<&str>(vocabulary.hand_free, &[])),
        };
        Ok(atoms)
    }
}

/// Lets a catalog pick the representation at run time. Every method is
/// forwarded so overrides of provided methods survive boxing.
impl<R: Representation + ?Sized> Representation for Box<R> {
    fn vocabulary(&self) -> &Vocabulary {
        (**self).vocabulary()
    }

    fn config(&self) -> &RepresentationConfig {
        (**self).config()
    }

    fn slots<'p>(&self, problem: &'p Problem) -> &'p [String] {
        (**self).slots(problem)
    }

    fn pile_objects(&self, problem: &Problem) -> Vec<String> {
        (**self).pile_objects(problem)
    }

    fn put_down(&self, held: &str, slot: &str) -> Option<Action> {
        (**self).put_down(held, slot)
    }

    fn pick_up(&self, object: &str, slot: &str) -> Action {
        (**self).pick_up(object, slot)
    }

    fn slot_atoms(&self, slot: &str, pile: &[String]) -> Vec<Atom> {
        (**self).slot_atoms(slot, pile)
    }

    fn complete_bases(&self, problem: &Problem, atoms: &State, relations: &Relations, unplaced: &[String]) -> Result<Vec<Atom>> {
        (**self).complete_bases(problem, atoms, relations, unplaced)
    }

    fn stack(&self, held: &str, top: &str) -> Action {
        (**self).stack(held, top)
    }

    fn unstack(&self, top: &str, below: &str) -> Action {
        (**self).unstack(top, below)
    }

    fn colors(&self, problem: &Problem) -> BTreeMap<String, Rgb> {
        (**self).colors(problem)
    }

    fn n_actions(&self, problem: &Problem) -> usize {
        (**self).n_actions(problem)
    }

    fn natural_extent(&self, problem: &Problem) -> (usize, usize) {
        (**self).natural_extent(problem)
    }

    fn extent(&self, problem: &Problem) -> (usize, usize) {
        (**self).extent(problem)
    }

    fn validate(&self, problem: &Problem) -> Result<()> {
        (**self).validate(problem)
    }

    fn relations(&self, atoms: &State) -> Result<Relations> {
        (**self).relations(atoms)
    }

    fn pile(&self, relations: &Relations, slot: &str) -> Result<Vec<String>> {
        (**self).pile(relations, slot)
    }

    fn slot_action(&self, relations: &Relations, slot: &str, pile: &[String]) -> Option<Action> {
        (**self).slot_action(relations, slot, pile)
    }

    fn reduced_actions(&self, problem: &Problem, relations: &Relations) -> Result<Vec<Option<Action>>> {
        (**self).reduced_actions(problem, relations)
    }

    fn reduced_action(&self, problem: &Problem, relations: &Relations, index: usize) -> Result<Option<Action>> {
        (**self).reduced_action(problem, relations, index)
    }

    fn layout(&self, problem: &Problem, relations: &Relations) -> Result<Layout> {
        (**self).layout(problem, relations)
    }

    fn complete_atoms(&self, problem: &Problem, atoms: &State) -> Result<State> {
        (**self).complete_atoms(problem, atoms)
    }

    fn pile_atoms(&self, problem: &Problem, relations: &Relations) -> Result<State> {
        (**self).pile_atoms(problem, relations)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{Blocks, Columns, Representation, RepresentationConfig};
    use crate::error::Error;
    use crate::pddl::atom::State;
    use crate::pddl::problem::Problem;

    fn state(atoms: &[&str]) -> State {
        State::parse(atoms.iter()).unwrap()
    }

    fn columns_problem(columns: &[&str]) -> Problem {
        let objects: BTreeMap<String, String> = [("a", "block"), ("b", "block")].iter().copied()
            .chain(columns.iter().map(|c| (*c, "column")))
            .map(|(o, t)| (o.to_string(), t.to_string()))
            .collect();
        Problem::new("p", "blocks-columns", objects, State::new(), State::new())
    }

    #[test]
    fn test_held_object_without_slots() {
        let problem = columns_problem(&[]);
        let repr = Columns::default();
        let r = repr.relations(&state(&["(holding a)"])).unwrap();
        assert!(matches!(repr.layout(&problem, &r), Err(Error::Config(_))));
    }

    #[test]
    fn test_column_without_base_or_empty() {
        let problem = columns_problem(&["c1", "c2"]);
        let repr = Columns::default();
        let r = repr.relations(&state(&["(bottom a c1)", "(clear a)", "(holding b)"])).unwrap();
        assert!(matches!(repr.reduced_actions(&problem, &r), Err(Error::Consistency(_))));
        assert!(matches!(repr.reduced_action(&problem, &r, 1), Err(Error::Consistency(_))));
        assert!(repr.reduced_action(&problem, &r, 0).unwrap().is_some());

        let both = repr.relations(&state(&["(bottom a c1)", "(empty c1)", "(empty c2)", "(holding b)"])).unwrap();
        assert!(matches!(repr.pile(&both, "c1"), Err(Error::Consistency(_))));
    }

    #[test]
    fn test_boxed_representation_forwards() {
        let problem = columns_problem(&["c1", "c2"]);
        let config = RepresentationConfig { n_actions: Some(4), min_extent: Some((5, 5)) };
        let boxed: Box<dyn Representation> = Box::new(Columns::new(config));
        let plain = Columns::new(config);
        let s = state(&["(bottom a c1)", "(clear a)", "(empty c2)", "(holding b)"]);
        let r = boxed.relations(&s).unwrap();
        assert_eq!(boxed.colors(&problem), plain.colors(&problem));
        assert_eq!(boxed.extent(&problem), (5, 5));
        assert_eq!(boxed.reduced_actions(&problem, &r).unwrap(), plain.reduced_actions(&problem, &r).unwrap());
        assert_eq!(boxed.layout(&problem, &r).unwrap(), plain.layout(&problem, &r).unwrap());
        assert!(matches!(boxed.pile(&boxed.relations(&state(&["(holding b)"])).unwrap(), "c1"), Err(Error::Consistency(_))));

        let blocks: Box<dyn Representation> = Box::new(Blocks::default());
        assert_eq!(blocks.vocabulary().empty, None);
    }
}
