use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::debug;

use super::{ApplicableActions, ProblemSimulator, Simulator};
use crate::error::{Error, Result};
use crate::pddl::action::Operator;
use crate::pddl::atom::{Action, State};
use crate::pddl::domain::Domain;
use crate::pddl::problem::Problem;

/// Source of problem instances, possibly infinite.
pub type ProblemGenerator = Box<dyn Iterator<Item = Problem> + Send>;

/// Atoms tagged with the instance they were produced by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceState {
    pub instance: u64,
    pub atoms: State,
}

struct Inner {
    generator: ProblemGenerator,
    instance: u64,
    simulator: Arc<ProblemSimulator>,
}

/// Simulator that grounds a new problem on every reset.
pub struct DomainSimulator {
    domain: Domain,
    inner: Mutex<Inner>,
}

impl fmt::Debug for DomainSimulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        write!(f, "DomainSimulator({}, instance {}: {})", self.domain.name, inner.instance, inner.simulator.problem().name)
    }
}

impl DomainSimulator {
    /// Activates the first generated problem as instance 0.
    pub fn new(domain: Domain, mut generator: ProblemGenerator) -> Result<Self> {
        let simulator = Arc::new(Self::next_simulator(&domain, &mut generator)?);
        debug!("Instance 0 is {}", simulator.problem().name);
        Ok(Self { domain, inner: Mutex::new(Inner { generator, instance: 0, simulator }) })
    }

    fn next_simulator(domain: &Domain, generator: &mut ProblemGenerator) -> Result<ProblemSimulator> {
        let problem = generator.next().ok_or(Error::GeneratorExhausted)?;
        ProblemSimulator::new(domain, problem)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Id of the instance states must belong to.
    pub fn instance(&self) -> u64 {
        self.lock().instance
    }

    /// Simulator of the active instance, if `instance` is still active.
    pub fn active(&self, instance: u64) -> Result<Arc<ProblemSimulator>> {
        let inner = self.lock();
        if inner.instance != instance {
            return Err(Error::StaleInstance { state: instance, active: inner.instance });
        }
        Ok(inner.simulator.clone())
    }
}

impl Simulator for DomainSimulator {
    type State = InstanceState;

    /// Pulls the next problem and makes it the active instance. The generator
    /// is advanced and the id bumped under one lock.
    fn reset(&self) -> Result<InstanceState> {
        let mut inner = self.lock();
        let simulator = Self::next_simulator(&self.domain, &mut inner.generator)?;
        inner.instance += 1;
        inner.simulator = Arc::new(simulator);
        debug!("Instance {} is {}", inner.instance, inner.simulator.problem().name);
        Ok(InstanceState { instance: inner.instance, atoms: inner.simulator.reset() })
    }

    fn transition(&self, state: &InstanceState, action: &Action) -> Result<(InstanceState, Operator)> {
        let (atoms, op) = self.active(state.instance)?.transition(&state.atoms, action)?;
        Ok((InstanceState { instance: state.instance, atoms }, op))
    }

    fn goal_reached(&self, state: &InstanceState) -> Result<bool> {
        Ok(self.active(state.instance)?.goal_reached(&state.atoms))
    }

    fn applicable_actions(&self, state: &InstanceState) -> Result<ApplicableActions> {
        Ok(self.active(state.instance)?.applicable_actions(&state.atoms))
    }

    fn atoms<'s>(&self, state: &'s InstanceState) -> &'s State {
        &state.atoms
    }

    fn problem(&self) -> Arc<Problem> {
        self.lock().simulator.problem().clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::DomainSimulator;
    use crate::error::Error;
    use crate::generator::RandomColumns;
    use crate::pddl::atom::Action;
    use crate::pddl::domain::{blocks, blocks_columns};
    use crate::simulator::Simulator;

    fn simulator(seed: u64) -> DomainSimulator {
        DomainSimulator::new(blocks(), Box::new(RandomColumns::new(3, seed).unwrap())).unwrap()
    }

    #[test]
    fn test_reset_advances_instance() {
        let sim = simulator(7);
        assert_eq!(sim.instance(), 0);
        let s1 = sim.reset().unwrap();
        assert_eq!(s1.instance, 1);
        let s2 = sim.reset().unwrap();
        assert_eq!(s2.instance, 2);
        assert_eq!(sim.instance(), 2);
        assert_eq!(sim.atoms(&s2), &sim.problem().init);
    }

    #[test]
    fn test_stale_instance() {
        let sim = simulator(7);
        let old = sim.reset().unwrap();
        let pick_up = Action::new("pick-up", &["a"]);
        assert!(sim.apply(&old, &pick_up).is_ok());
        let new = sim.reset().unwrap();
        match sim.apply(&old, &pick_up) {
            Err(Error::StaleInstance { state, active }) => assert_eq!((state, active), (1, 2)),
            r => panic!("unexpected {:?}", r),
        }
        assert!(matches!(sim.goal_reached(&old), Err(Error::StaleInstance { .. })));
        assert!(matches!(sim.applicable_actions(&old), Err(Error::StaleInstance { .. })));
        let next = sim.apply(&new, &pick_up).unwrap();
        assert_eq!(next.instance, new.instance);
        assert!(next.atoms.contains(&"(holding a)".parse().unwrap()));
    }

    #[test]
    fn test_exhausted_generator() {
        let problems = RandomColumns::new(2, 1).unwrap().take(2);
        let sim = DomainSimulator::new(blocks(), Box::new(problems)).unwrap();
        assert!(sim.reset().is_ok());
        assert!(matches!(sim.reset(), Err(Error::GeneratorExhausted)));
    }

    #[test]
    fn test_domain_mismatch() {
        let r = DomainSimulator::new(blocks_columns(), Box::new(RandomColumns::new(2, 1).unwrap()));
        assert!(matches!(r, Err(Error::Config(_))));
    }

    #[test]
    fn test_concurrent_resets_get_distinct_ids() {
        let sim = Arc::new(simulator(3));
        let handles = (0..4).map(|_| {
            let sim = sim.clone();
            thread::spawn(move || (0..5).map(|_| sim.reset().unwrap().instance).collect::<Vec<_>>())
        }).collect::<Vec<_>>();
        let mut ids = handles.into_iter().flat_map(|h| h.join().unwrap()).collect::<Vec<_>>();
        ids.sort();
        assert_eq!(ids, (1..=20).collect::<Vec<u64>>());
    }
}
