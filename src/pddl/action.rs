use std::collections::BTreeSet;
use std::fmt;

use super::atom::{Action, Atom, State};

/// One grounded instantiation of an action schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    pub action: Action,
    pub precondition: BTreeSet<Atom>,
    pub add: BTreeSet<Atom>,
    pub delete: BTreeSet<Atom>,
}

impl Operator {
    #[inline]
    pub fn applicable(&self, state: &State) -> bool {
        self.precondition.is_subset(&state.0)
    }

    /// Precondition atoms absent from `state`.
    pub fn missing(&self, state: &State) -> Vec<Atom> {
        self.precondition.difference(&state.0).cloned().collect()
    }

    /// (state - delete) | add. Does not check the precondition.
    pub fn apply(&self, state: &State) -> State {
        let mut next: BTreeSet<Atom> = state.0.difference(&self.delete).cloned().collect();
        next.extend(self.add.iter().cloned());
        State(next)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let join = |atoms: &BTreeSet<Atom>| atoms.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(" ");
        write!(f, "(:action {} :precondition (and {}) :add (and {}) :delete (and {}))",
            self.action, join(&self.precondition), join(&self.add), join(&self.delete))
    }
}

#[cfg(test)]
mod tests {
    use super::Operator;
    use crate::pddl::atom::{Action, Atom, State};

    fn pick_up_a() -> Operator {
        Operator {
            action: Action::new("pick-up", &["a"]),
            precondition: [Atom::new("clear", &["a"]), Atom::new("ontable", &["a"]), Atom::new::<&str>("handempty", &[])].into_iter().collect(),
            add: [Atom::new("holding", &["a"])].into_iter().collect(),
            delete: [Atom::new("clear", &["a"]), Atom::new("ontable", &["a"]), Atom::new::<&str>("handempty", &[])].into_iter().collect(),
        }
    }

    #[test]
    fn test_apply() {
        let op = pick_up_a();
        let state = State::parse(["(clear a)", "(ontable a)", "(handempty)", "(clear b)"]).unwrap();
        assert!(op.applicable(&state));
        let next = op.apply(&state);
        assert_eq!(next, State::parse(["(holding a)", "(clear b)"]).unwrap());
        // argument untouched
        assert_eq!(state.len(), 4);
    }

    #[test]
    fn test_apply_ignores_precondition() {
        let op = pick_up_a();
        let state = State::parse(["(clear b)"]).unwrap();
        assert!(!op.applicable(&state));
        assert_eq!(op.missing(&state).len(), 3);
        assert_eq!(op.apply(&state), State::parse(["(clear b)", "(holding a)"]).unwrap());
    }
}
