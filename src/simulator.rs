//! Stepwise simulators over grounded problems.
//!
//! [`ProblemSimulator`] serves one fixed problem; [`DomainSimulator`] draws a
//! fresh problem from a generator on every reset and tags its states with the
//! instance they belong to.

pub mod domain;
pub mod problem;

use std::collections::BTreeMap;
use std::sync::Arc;

pub use domain::{DomainSimulator, InstanceState};
pub use problem::ProblemSimulator;

use crate::error::Result;
use crate::pddl::action::Operator;
use crate::pddl::atom::{Action, State};
use crate::pddl::problem::Problem;

/// Applicable grounded actions: action name to parameter tuples.
pub type ApplicableActions = BTreeMap<String, Vec<Vec<String>>>;

pub trait Simulator {
    type State: Clone + std::fmt::Debug + PartialEq;

    fn reset(&self) -> Result<Self::State>;

    /// Applies `action`, returning the successor and the operator that produced it.
    fn transition(&self, state: &Self::State, action: &Action) -> Result<(Self::State, Operator)>;

    fn goal_reached(&self, state: &Self::State) -> Result<bool>;

    fn applicable_actions(&self, state: &Self::State) -> Result<ApplicableActions>;

    /// Ground atoms of a simulator state.
    fn atoms<'s>(&self, state: &'s Self::State) -> &'s State;

    /// Problem of the active instance.
    fn problem(&self) -> Arc<Problem>;

    fn apply(&self, state: &Self::State, action: &Action) -> Result<Self::State> {
        self.transition(state, action).map(|(next, _)| next)
    }

    fn goal(&self) -> State {
        self.problem().goal.clone()
    }
}
