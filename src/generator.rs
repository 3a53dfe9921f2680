use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_pcg::Pcg64;

use crate::error::{Error, Result};
use crate::pddl::atom::{Atom, State};
use crate::pddl::domain::OBJECT;
use crate::pddl::problem::Problem;

/// Endless stream of blocks problems: every block starts on the table and the
/// goal is a single column in random order.
pub struct RandomColumns {
    blocks: Vec<String>,
    rng: Pcg64,
}

impl RandomColumns {
    /// Blocks are named `a`, `b`, ... so at most 26 are supported.
    pub fn new(n_blocks: usize, seed: u64) -> Result<Self> {
        if n_blocks == 0 || n_blocks > 26 {
            return Err(Error::Config(format!("random columns need 1 to 26 blocks, got {}", n_blocks)));
        }
        let blocks = (0..n_blocks as u8).map(|i| ((b'a' + i) as char).to_string()).collect();
        Ok(Self { blocks, rng: Pcg64::seed_from_u64(seed) })
    }
}

impl Iterator for RandomColumns {
    type Item = Problem;

    fn next(&mut self) -> Option<Problem> {
        let mut column = self.blocks.clone();
        column.shuffle(&mut self.rng);

        let mut init = State::new();
        for b in &self.blocks {
            init.0.insert(Atom::new("ontable", &[b]));
            init.0.insert(Atom::new("clear", &[b]));
        }
        init.0.insert(Atom::new::<&str>("handempty", &[]));

        let goal = column.windows(2).map(|pair| Atom::new("on", pair)).collect();
        let objects = self.blocks.iter().map(|b| (b.clone(), OBJECT.to_owned())).collect();
        Some(Problem::new(&format!("random-column-{}", self.blocks.len()), "blocks", objects, init, goal))
    }
}
