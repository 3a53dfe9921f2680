//! Episode loop over a simulator and a representation.
//!
//! The environment keeps the simulator state of the current episode together
//! with its [`Relations`] index. Every applied operator updates the index from
//! its delete and add lists instead of re-reading the whole state.

use std::sync::Arc;

use log::debug;
use serde::Serialize;

use crate::error::Result;
use crate::pddl::atom::Action;
use crate::pddl::problem::Problem;
use crate::representation::{Layout, Relations, Representation};
use crate::simulator::{ApplicableActions, Simulator};

/// Moves per episode when nothing else is configured.
pub const DEFAULT_MAX_MOVES: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    pub observation: Layout,
    pub reward: f64,
    pub done: bool,
}

/// Everything needed to resume an episode.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    problem: Arc<Problem>,
    state: T,
    relations: Relations,
    moves: usize,
}

pub struct GridEnv<S: Simulator, R: Representation> {
    simulator: S,
    representation: R,
    max_moves: usize,
    problem: Arc<Problem>,
    state: S::State,
    relations: Relations,
    moves: usize,
}

impl<S: Simulator, R: Representation> GridEnv<S, R> {
    /// Starts the first episode.
    pub fn new(simulator: S, representation: R, max_moves: usize) -> Result<Self> {
        let (problem, state, relations) = Self::start(&simulator, &representation)?;
        Ok(Self { simulator, representation, max_moves, problem, state, relations, moves: 0 })
    }

    fn start(simulator: &S, representation: &R) -> Result<(Arc<Problem>, S::State, Relations)> {
        let state = simulator.reset()?;
        let problem = simulator.problem();
        representation.validate(&problem)?;
        let relations = representation.relations(simulator.atoms(&state))?;
        debug!("Episode on {} with {} actions", problem.name, representation.n_actions(&problem));
        Ok((problem, state, relations))
    }

    pub fn reset(&mut self) -> Result<Layout> {
        let (problem, state, relations) = Self::start(&self.simulator, &self.representation)?;
        self.problem = problem;
        self.state = state;
        self.relations = relations;
        self.moves = 0;
        self.observation()
    }

    pub fn observation(&self) -> Result<Layout> {
        self.representation.layout(&self.problem, &self.relations)
    }

    /// Layout of the goal once completed under the closed world assumption.
    pub fn goal_observation(&self) -> Result<Layout> {
        let goal = self.representation.complete_atoms(&self.problem, &self.problem.goal)?;
        let relations = self.representation.relations(&goal)?;
        self.representation.layout(&self.problem, &relations)
    }

    /// Takes the reduced action `index`. A no-op keeps the state and earns
    /// nothing but still uses up a move; the state must still belong to the
    /// active instance.
    pub fn step(&mut self, index: usize) -> Result<Step> {
        match self.representation.reduced_action(&self.problem, &self.relations, index)? {
            Some(action) => self.step_action(&action),
            None => {
                let reached = self.simulator.goal_reached(&self.state)?;
                self.moves += 1;
                Ok(Step { observation: self.observation()?, reward: 0.0, done: reached || self.moves >= self.max_moves })
            },
        }
    }

    /// Applies a grounded action. On error the episode is left untouched.
    pub fn step_action(&mut self, action: &Action) -> Result<Step> {
        let (next, op) = self.simulator.transition(&self.state, action)?;
        let mut relations = self.relations.clone();
        relations.update(self.representation.vocabulary(), op.delete.iter(), op.add.iter())?;
        let reached = self.simulator.goal_reached(&next)?;
        self.state = next;
        self.relations = relations;
        self.moves += 1;
        Ok(Step {
            observation: self.observation()?,
            reward: if reached { 1.0 } else { 0.0 },
            done: reached || self.moves >= self.max_moves,
        })
    }

    pub fn indexed_actions(&self) -> Result<Vec<Option<Action>>> {
        self.representation.reduced_actions(&self.problem, &self.relations)
    }

    pub fn applicable_actions(&self) -> Result<ApplicableActions> {
        self.simulator.applicable_actions(&self.state)
    }

    pub fn goal_reached(&self) -> Result<bool> {
        self.simulator.goal_reached(&self.state)
    }

    pub fn clone_state(&self) -> Snapshot<S::State> {
        Snapshot {
            problem: self.problem.clone(),
            state: self.state.clone(),
            relations: self.relations.clone(),
            moves: self.moves,
        }
    }

    pub fn restore_state(&mut self, snapshot: Snapshot<S::State>) {
        self.problem = snapshot.problem;
        self.state = snapshot.state;
        self.relations = snapshot.relations;
        self.moves = snapshot.moves;
    }

    pub fn state(&self) -> &S::State {
        &self.state
    }

    pub fn relations(&self) -> &Relations {
        &self.relations
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    pub fn moves(&self) -> usize {
        self.moves
    }

    pub fn n_actions(&self) -> usize {
        self.representation.n_actions(&self.problem)
    }

    pub fn simulator(&self) -> &S {
        &self.simulator
    }

    pub fn representation(&self) -> &R {
        &self.representation
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg64;

    use super::GridEnv;
    use crate::error::Error;
    use crate::generator::RandomColumns;
    use crate::pddl::atom::{Action, State};
    use crate::pddl::domain::{blocks, blocks_columns};
    use crate::pddl::problem::Problem;
    use crate::representation::{Blocks, Columns, Representation, RepresentationConfig};
    use crate::simulator::{DomainSimulator, ProblemSimulator, Simulator};

    fn env(max_moves: usize) -> GridEnv<ProblemSimulator, Blocks> {
        let objects: BTreeMap<String, String> = ["a", "b", "c"].iter().map(|o| (o.to_string(), "object".to_owned())).collect();
        let init = State::parse([
            "(ontable a)", "(ontable b)", "(ontable c)", "(clear a)", "(clear b)", "(clear c)", "(handempty)",
        ]).unwrap();
        let problem = Problem::new("abc", "blocks", objects, init, State::parse(["(on a b)"]).unwrap());
        let sim = ProblemSimulator::new(&blocks(), problem).unwrap();
        GridEnv::new(sim, Blocks::default(), max_moves).unwrap()
    }

    #[test]
    fn test_episode_reaches_goal() {
        let mut env = env(10);
        let start = env.reset().unwrap();
        assert_eq!(start.to_string(), "...\n...\n...\nabc\n");

        let step = env.step(0).unwrap();
        assert_eq!((step.reward, step.done), (0.0, false));
        assert_eq!(step.observation.at((2, 0)).unwrap().name, "a");

        let step = env.step(1).unwrap();
        assert_eq!((step.reward, step.done), (1.0, true));
        assert_eq!(step.observation.to_string(), "...\n...\n.a.\n.bc\n");
        assert!(env.goal_reached().unwrap());
    }

    #[test]
    fn test_no_op_keeps_state() {
        let mut env = env(10);
        env.step(0).unwrap();
        env.step(2).unwrap();
        let before = env.state().clone();
        assert_eq!(env.indexed_actions().unwrap()[0], None);
        let step = env.step(0).unwrap();
        assert_eq!(step.reward, 0.0);
        assert!(!step.done);
        assert_eq!(env.state(), &before);
        assert_eq!(env.moves(), 3);
    }

    #[test]
    fn test_move_budget() {
        let mut env = env(2);
        assert!(!env.step(0).unwrap().done);
        let step = env.step(0).unwrap();
        assert!(step.done);
        assert_eq!(step.reward, 0.0);
        env.reset().unwrap();
        assert_eq!(env.moves(), 0);
    }

    #[test]
    fn test_failed_action_leaves_episode() {
        let mut env = env(10);
        let before = env.clone_state();
        let err = env.step_action(&Action::new("stack", &["a", "b"])).unwrap_err();
        assert!(matches!(err, Error::PreconditionNotSatisfied { .. }));
        assert!(matches!(env.step_action(&Action::new("fly", &["a"])), Err(Error::UnknownAction(_))));
        assert_eq!(env.clone_state(), before);
        assert!(matches!(env.step(3), Err(Error::IndexOutOfRange { index: 3, len: 3 })));
    }

    #[test]
    fn test_snapshot_restore() {
        let mut env = env(10);
        env.step(1).unwrap();
        let snapshot = env.clone_state();
        let observation = env.observation().unwrap();
        env.step(2).unwrap();
        env.step(0).unwrap();
        env.restore_state(snapshot);
        assert_eq!(env.observation().unwrap(), observation);
        assert_eq!(env.moves(), 1);
    }

    #[test]
    fn test_goal_observation() {
        let env = env(10);
        let goal = env.goal_observation().unwrap();
        assert_eq!(goal.to_string(), "...\n...\n.a.\n.bc\n");
    }

    #[test]
    fn test_random_walk_actions_are_applicable() {
        let mut env = env(1000);
        let mut rng = Pcg64::seed_from_u64(3);
        for _ in 0..300 {
            let applicable = env.applicable_actions().unwrap();
            for action in env.indexed_actions().unwrap().into_iter().flatten() {
                let params = applicable.get(&action.name).map(Vec::as_slice).unwrap_or(&[]);
                assert!(params.contains(&action.params), "{} is not applicable", action);
            }
            let rebuilt = env.representation().relations(env.state()).unwrap();
            assert_eq!(env.relations(), &rebuilt);
            env.step(rng.gen_range(0..env.n_actions())).unwrap();
        }
    }

    #[test]
    fn test_generated_instances() {
        let sim = DomainSimulator::new(blocks(), Box::new(RandomColumns::new(4, 11).unwrap())).unwrap();
        let config = RepresentationConfig { n_actions: Some(6), min_extent: Some((6, 6)) };
        let mut env = GridEnv::new(sim, Blocks::new(config), 50).unwrap();
        assert_eq!(env.state().instance, 1);
        let layout = env.reset().unwrap();
        assert_eq!(env.state().instance, 2);
        assert_eq!(layout.extent, (6, 6));
        assert_eq!(env.indexed_actions().unwrap().len(), 6);
        assert_eq!(env.simulator().goal(), env.problem().goal);

        let stale = env.clone_state();
        env.step(0).unwrap();
        env.reset().unwrap();
        env.restore_state(stale);
        assert!(matches!(env.step(0), Err(Error::StaleInstance { state: 2, active: 3 })));
    }

    #[test]
    fn test_stale_no_op() {
        let sim = DomainSimulator::new(blocks(), Box::new(RandomColumns::new(3, 5).unwrap())).unwrap();
        let mut env = GridEnv::new(sim, Blocks::default(), 50).unwrap();
        env.step(0).unwrap();
        env.step(2).unwrap();
        let stale = env.clone_state();
        assert_eq!(env.indexed_actions().unwrap()[0], None);
        env.reset().unwrap();
        env.restore_state(stale);
        assert!(matches!(env.step(0), Err(Error::StaleInstance { state: 1, active: 2 })));
        assert_eq!(env.moves(), 2);
    }

    #[test]
    fn test_random_walk_columns() {
        let objects: BTreeMap<String, String> = [
            ("a", "block"), ("b", "block"), ("c", "block"), ("r", "salient"), ("c1", "column"), ("c2", "column"), ("c3", "column"),
        ].iter().map(|(o, t)| (o.to_string(), t.to_string())).collect();
        let init = State::parse([
            "(bottom a c1)", "(on b a)", "(clear b)", "(bottom r c2)", "(on c r)", "(clear c)", "(empty c3)", "(hand-free)",
        ]).unwrap();
        let problem = Problem::new("walk", "blocks-columns", objects, init, State::parse(["(on a b)", "(on b c)", "(on c r)"]).unwrap());
        let sim = ProblemSimulator::new(&blocks_columns(), problem).unwrap();
        let mut env = GridEnv::new(sim, Columns::new(RepresentationConfig { n_actions: Some(4), min_extent: None }), 1000).unwrap();
        let mut rng = Pcg64::seed_from_u64(8);
        for _ in 0..300 {
            let applicable = env.applicable_actions().unwrap();
            for action in env.indexed_actions().unwrap().into_iter().flatten() {
                let params = applicable.get(&action.name).map(Vec::as_slice).unwrap_or(&[]);
                assert!(params.contains(&action.params), "{} is not applicable", action);
            }
            let rebuilt = env.representation().relations(env.state()).unwrap();
            assert_eq!(env.relations(), &rebuilt);
            let step = env.step(rng.gen_range(0..env.n_actions())).unwrap();
            if step.done {
                env.reset().unwrap();
            }
        }
    }
}
