use std::collections::{BTreeMap, HashMap};

use super::atom::State;

/// Parameter tuples of a state grouped by predicate name.
#[derive(Debug, Default)]
pub struct AtomIndex<'a> {
    atoms: HashMap<&'a str, Vec<&'a [String]>>,
}

impl<'a> AtomIndex<'a> {
    pub fn new(state: &'a State) -> Self {
        let mut atoms: HashMap<&str, Vec<&[String]>> = HashMap::new();
        for atom in state.iter() {
            atoms.entry(atom.name.as_str()).or_default().push(atom.args.as_slice());
        }
        Self { atoms }
    }

    pub fn get(&self, name: &str) -> &[&'a [String]] {
        self.atoms.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First parameter tuple of `name` whose `idx`-th argument is `value`.
    pub fn fixed_param(&self, name: &str, idx: usize, value: &str) -> Option<&'a [String]> {
        self.get(name).iter().find(|params| params.get(idx).map(String::as_str) == Some(value)).copied()
    }
}

/// Groups objects by declared type, each list sorted.
pub fn objects_by_type(objects: &BTreeMap<String, String>) -> BTreeMap<String, Vec<String>> {
    let mut result: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (object, kind) in objects {
        result.entry(kind.clone()).or_default().push(object.clone());
    }
    result.values_mut().for_each(|v| v.sort());
    result
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{AtomIndex, objects_by_type};
    use crate::pddl::atom::State;

    #[test]
    fn test_fixed_param() {
        let state = State::parse(["(on a b)", "(on c a)", "(ontable b)"]).unwrap();
        let index = AtomIndex::new(&state);
        assert_eq!(index.fixed_param("on", 1, "a"), Some(&["c".to_owned(), "a".to_owned()][..]));
        assert_eq!(index.fixed_param("on", 1, "c"), None);
        assert_eq!(index.fixed_param("holding", 0, "a"), None);
        assert_eq!(index.get("ontable").len(), 1);
        assert!(index.get("handempty").is_empty());
    }

    #[test]
    fn test_objects_by_type() {
        let objects: BTreeMap<String, String> = [("c1", "column"), ("b2", "block"), ("b1", "block")]
            .iter().map(|(o, t)| (o.to_string(), t.to_string())).collect();
        let by_type = objects_by_type(&objects);
        assert_eq!(by_type["block"], vec!["b1".to_owned(), "b2".to_owned()]);
        assert_eq!(by_type["column"], vec!["c1".to_owned()]);
    }
}
