use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, trace};

use super::{ApplicableActions, Simulator};
use crate::error::{Error, Result};
use crate::pddl::action::Operator;
use crate::pddl::atom::{Action, State};
use crate::pddl::domain::Domain;
use crate::pddl::grounding::ground;
use crate::pddl::problem::Problem;

/// Simulator of a single problem. The operator table is read-only after construction.
#[derive(Debug)]
pub struct ProblemSimulator {
    problem: Arc<Problem>,
    operators: Vec<Operator>,
    mapping: HashMap<Action, usize>,
}

impl ProblemSimulator {
    pub fn new(domain: &Domain, problem: Problem) -> Result<Self> {
        let operators = ground(domain, &problem)?;
        Self::from_operators(problem, operators)
    }

    /// Wraps operators grounded elsewhere. Signatures must be unique.
    pub fn from_operators(problem: Problem, operators: Vec<Operator>) -> Result<Self> {
        let mut mapping = HashMap::with_capacity(operators.len());
        for (idx, op) in operators.iter().enumerate() {
            if mapping.insert(op.action.clone(), idx).is_some() {
                return Err(Error::Config(format!("operator {} is grounded twice", op.action)));
            }
        }
        debug!("Simulator for {} over {} operators", problem.name, operators.len());
        Ok(Self { problem: Arc::new(problem), operators, mapping })
    }

    pub fn reset(&self) -> State {
        self.problem.init.clone()
    }

    pub fn problem(&self) -> &Arc<Problem> {
        &self.problem
    }

    pub fn goal(&self) -> &State {
        &self.problem.goal
    }

    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    pub fn operator(&self, action: &Action) -> Result<&Operator> {
        self.mapping.get(action).map(|idx| &self.operators[*idx]).ok_or_else(|| Error::UnknownAction(action.clone()))
    }

    pub fn apply(&self, state: &State, action: &Action) -> Result<State> {
        let op = self.checked(state, action)?;
        Ok(op.apply(state))
    }

    pub fn apply_str(&self, state: &State, action: &str) -> Result<State> {
        self.apply(state, &Action::parse(action)?)
    }

    pub fn goal_reached(&self, state: &State) -> bool {
        self.problem.goal.is_subset(state)
    }

    pub fn applicable_actions(&self, state: &State) -> ApplicableActions {
        let mut result = ApplicableActions::new();
        for op in self.operators.iter().filter(|op| op.applicable(state)) {
            result.entry(op.action.name.clone()).or_default().push(op.action.params.clone());
        }
        result
    }

    pub fn applicable_str_actions(&self, state: &State) -> Vec<String> {
        self.operators.iter().filter(|op| op.applicable(state)).map(|op| op.action.to_string()).collect()
    }

    fn checked(&self, state: &State, action: &Action) -> Result<&Operator> {
        let op = self.operator(action)?;
        if !op.applicable(state) {
            return Err(Error::PreconditionNotSatisfied { action: action.clone(), missing: op.missing(state) });
        }
        trace!("Applying {}", action);
        Ok(op)
    }
}

impl Simulator for ProblemSimulator {
    type State = State;

    fn reset(&self) -> Result<State> {
        Ok(ProblemSimulator::reset(self))
    }

    fn transition(&self, state: &State, action: &Action) -> Result<(State, Operator)> {
        let op = self.checked(state, action)?;
        Ok((op.apply(state), op.clone()))
    }

    fn goal_reached(&self, state: &State) -> Result<bool> {
        Ok(ProblemSimulator::goal_reached(self, state))
    }

    fn applicable_actions(&self, state: &State) -> Result<ApplicableActions> {
        Ok(ProblemSimulator::applicable_actions(self, state))
    }

    fn atoms<'s>(&self, state: &'s State) -> &'s State {
        state
    }

    fn problem(&self) -> Arc<Problem> {
        self.problem.clone()
    }
}
