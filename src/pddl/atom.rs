use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::parser::parse_tuple;
use crate::error::ParseError;

/// A ground atom: predicate name applied to concrete objects.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Atom {
    pub name: String,
    pub args: Vec<String>,
}

impl Atom {
    pub fn new<S: AsRef<str>>(name: &str, args: &[S]) -> Self {
        Self { name: name.to_owned(), args: args.iter().map(|a| a.as_ref().to_owned()).collect() }
    }

    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let (name, args) = parse_tuple(text)?;
        Ok(Self { name, args })
    }

    #[inline]
    pub fn arg(&self, idx: usize) -> Option<&str> {
        self.args.get(idx).map(String::as_str)
    }
}

fn write_tuple(f: &mut fmt::Formatter, name: &str, args: &[String]) -> fmt::Result {
    write!(f, "({}", name)?;
    for arg in args {
        write!(f, " {}", arg)?;
    }
    write!(f, ")")
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_tuple(f, &self.name, &self.args)
    }
}

impl FromStr for Atom {
    type Err = ParseError;
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}

/// Signature of a grounded operator, matched by exact equality.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    pub params: Vec<String>,
}

impl Action {
    pub fn new<S: AsRef<str>>(name: &str, params: &[S]) -> Self {
        Self { name: name.to_owned(), params: params.iter().map(|a| a.as_ref().to_owned()).collect() }
    }

    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let (name, params) = parse_tuple(text)?;
        Ok(Self { name, params })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_tuple(f, &self.name, &self.params)
    }
}

impl FromStr for Action {
    type Err = ParseError;
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}

/// Complete world snapshot. Transitions build new values.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct State(pub BTreeSet<Atom>);

impl State {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Parses every item as atom text.
    pub fn parse<I, S>(atoms: I) -> Result<Self, ParseError> where I: IntoIterator<Item = S>, S: AsRef<str> {
        atoms.into_iter().map(|a| Atom::parse(a.as_ref())).collect::<Result<BTreeSet<_>, _>>().map(State)
    }

    #[inline]
    pub fn contains(&self, atom: &Atom) -> bool {
        self.0.contains(atom)
    }

    #[inline]
    pub fn is_subset(&self, other: &State) -> bool {
        self.0.is_subset(&other.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Atom> {
        self.0.iter()
    }

    /// Atoms whose predicate is one of `names`.
    pub fn restrict(&self, names: &[&str]) -> State {
        State(self.0.iter().filter(|a| names.contains(&a.name.as_str())).cloned().collect())
    }
}

impl FromIterator<Atom> for State {
    fn from_iter<T: IntoIterator<Item = Atom>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Atom> for State {
    fn extend<T: IntoIterator<Item = Atom>>(&mut self, iter: T) {
        self.0.extend(iter)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        for (i, atom) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", atom)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::{Action, Atom, State};

    #[test]
    fn test_atom_text() {
        let atom: Atom = "(on a b)".parse().unwrap();
        assert_eq!(atom, Atom::new("on", &["a", "b"]));
        assert_eq!(atom.to_string(), "(on a b)");
        assert_eq!(Atom::new::<&str>("handempty", &[]).to_string(), "(handempty)");
        assert_eq!(Atom::parse("clear c").unwrap().arg(0), Some("c"));
    }

    #[test]
    fn test_action_text() {
        let action = Action::parse("unstack a b").unwrap();
        assert_eq!(action, Action::new("unstack", &["a", "b"]));
        assert_eq!(action.to_string(), "(unstack a b)");
        assert!(Action::parse("(unstack a b").is_err());
    }

    #[test]
    fn test_state() {
        let state = State::parse(["(clear a)", "(ontable a)", "(handempty)", "(clear a)"]).unwrap();
        assert_eq!(state.len(), 3);
        assert_eq!(state.restrict(&["clear"]).to_string(), "{(clear a)}");
        assert!(State::parse(["(clear a"]).is_err());
    }
}
