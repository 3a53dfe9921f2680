use std::collections::BTreeMap;
use std::fmt;

use super::atom::State;
use super::utils::objects_by_type;

/// A planning problem: typed objects, initial state and goal.
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    pub name: String,
    pub domain: String,
    pub objects: BTreeMap<String, String>,
    pub init: State,
    pub goal: State,
    objects_by_type: BTreeMap<String, Vec<String>>,
}

impl Problem {
    pub fn new(name: &str, domain: &str, objects: BTreeMap<String, String>, init: State, goal: State) -> Self {
        let objects_by_type = objects_by_type(&objects);
        Self { name: name.to_owned(), domain: domain.to_owned(), objects, init, goal, objects_by_type }
    }

    /// Sorted objects declared with type `kind`; empty if there are none.
    pub fn objects_of(&self, kind: &str) -> &[String] {
        self.objects_by_type.get(kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn objects_by_type(&self) -> &BTreeMap<String, Vec<String>> {
        &self.objects_by_type
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let objects = self.objects.iter().fold(String::new(), |acc, (o, t)| acc + " " + o + " - " + t);
        write!(f, "(define (problem {})\n(:domain {})\n(:objects{})\n(:init {})\n(:goal {})\n)",
            self.name, self.domain, objects, self.init, self.goal)
    }
}
