use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::pddl::atom::Atom;

/// Predicate names a representation reads piles from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    pub on: &'static str,
    pub clear: &'static str,
    pub holding: &'static str,
    pub hand_free: &'static str,
    /// Predicate marking the bottom object of a pile.
    pub base: &'static str,
    /// Argument of `base` naming the bottom object.
    pub base_object: usize,
    /// Argument of `base` naming the slot anchor.
    pub base_anchor: usize,
    /// Predicate marking an anchor with no pile, if the domain states it.
    pub empty: Option<&'static str>,
}

/// Reverse index over the stacking atoms of one state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relations {
    /// support -> object directly on top of it
    above: HashMap<String, String>,
    /// slot anchor -> bottom object of its pile
    bases: HashMap<String, String>,
    /// anchors explicitly marked empty
    empties: HashSet<String>,
    holding: Option<String>,
    hand_free: bool,
}

fn arg<'a>(atom: &'a Atom, idx: usize) -> Result<&'a str> {
    atom.arg(idx).ok_or_else(|| Error::Consistency(format!("{} lacks argument {}", atom, idx)))
}

fn claim(map: &mut HashMap<String, String>, key: &str, value: &str, what: &str) -> Result<()> {
    if let Some(existing) = map.get(key) {
        if existing != value {
            return Err(Error::Consistency(format!("{} and {} both claim {} {}", existing, value, what, key)));
        }
        return Ok(());
    }
    map.insert(key.to_owned(), value.to_owned());
    Ok(())
}

fn release(map: &mut HashMap<String, String>, key: &str, value: &str) {
    if map.get(key).map(String::as_str) == Some(value) {
        map.remove(key);
    }
}

impl Relations {
    /// Builds the index of a complete state, checking that exactly one of
    /// holding / hand-free holds.
    pub fn new<'a, I>(vocabulary: &Vocabulary, atoms: I) -> Result<Self> where I: IntoIterator<Item = &'a Atom> {
        let relations = Self::read(vocabulary, atoms)?;
        relations.check_hand()?;
        Ok(relations)
    }

    /// Builds the index of a possibly partial atom set. Only the pile
    /// structure is checked.
    pub fn read<'a, I>(vocabulary: &Vocabulary, atoms: I) -> Result<Self> where I: IntoIterator<Item = &'a Atom> {
        let mut relations = Self::default();
        for atom in atoms {
            relations.insert(vocabulary, atom)?;
        }
        Ok(relations)
    }

    /// Applies an operator effect: deletes first, then adds.
    pub fn update<'a, D, A>(&mut self, vocabulary: &Vocabulary, deleted: D, added: A) -> Result<()>
    where D: IntoIterator<Item = &'a Atom>, A: IntoIterator<Item = &'a Atom> {
        for atom in deleted {
            self.remove(vocabulary, atom)?;
        }
        for atom in added {
            self.insert(vocabulary, atom)?;
        }
        self.check_hand()
    }

    fn insert(&mut self, vocabulary: &Vocabulary, atom: &Atom) -> Result<()> {
        let name = atom.name.as_str();
        if name == vocabulary.on {
            claim(&mut self.above, arg(atom, 1)?, arg(atom, 0)?, "to be on")
        } else if name == vocabulary.base {
            claim(&mut self.bases, arg(atom, vocabulary.base_anchor)?, arg(atom, vocabulary.base_object)?, "the bottom of")
        } else if name == vocabulary.holding {
            let held = arg(atom, 0)?;
            if let Some(other) = self.holding.as_deref() {
                if other != held {
                    return Err(Error::Consistency(format!("holding both {} and {}", other, held)));
                }
            }
            self.holding = Some(held.to_owned());
            Ok(())
        } else if vocabulary.empty == Some(name) {
            self.empties.insert(arg(atom, 0)?.to_owned());
            Ok(())
        } else {
            if name == vocabulary.hand_free {
                self.hand_free = true;
            }
            Ok(())
        }
    }

    fn remove(&mut self, vocabulary: &Vocabulary, atom: &Atom) -> Result<()> {
        let name = atom.name.as_str();
        if name == vocabulary.on {
            release(&mut self.above, arg(atom, 1)?, arg(atom, 0)?);
        } else if name == vocabulary.base {
            release(&mut self.bases, arg(atom, vocabulary.base_anchor)?, arg(atom, vocabulary.base_object)?);
        } else if name == vocabulary.holding {
            if self.holding.as_deref() == Some(arg(atom, 0)?) {
                self.holding = None;
            }
        } else if vocabulary.empty == Some(name) {
            self.empties.remove(arg(atom, 0)?);
        } else if name == vocabulary.hand_free {
            self.hand_free = false;
        }
        Ok(())
    }

    fn check_hand(&self) -> Result<()> {
        match (&self.holding, self.hand_free) {
            (Some(held), true) => Err(Error::Consistency(format!("holding {} with a free hand", held))),
            (None, false) => Err(Error::Consistency("hand is neither free nor holding".to_owned())),
            _ => Ok(()),
        }
    }

    pub fn held(&self) -> Option<&str> {
        self.holding.as_deref()
    }

    pub fn hand_free(&self) -> bool {
        self.hand_free
    }

    /// Bottom object of the pile anchored at `anchor`.
    pub fn base(&self, anchor: &str) -> Option<&str> {
        self.bases.get(anchor).map(String::as_str)
    }

    /// Whether `anchor` is explicitly marked empty.
    pub fn is_empty(&self, anchor: &str) -> bool {
        self.empties.contains(anchor)
    }

    /// Object directly on top of `support`.
    pub fn above(&self, support: &str) -> Option<&str> {
        self.above.get(support).map(String::as_str)
    }

    /// Objects some other object rests on.
    pub fn supports(&self) -> impl Iterator<Item = &str> {
        self.above.keys().map(String::as_str)
    }

    /// Objects resting on another object.
    pub fn supported(&self) -> impl Iterator<Item = &str> {
        self.above.values().map(String::as_str)
    }

    /// Objects at the bottom of some pile.
    pub fn bottoms(&self) -> impl Iterator<Item = &str> {
        self.bases.values().map(String::as_str)
    }

    /// Bottom-to-top pile anchored at `anchor`; empty if the anchor has no base.
    /// Every object is visited at most once; a cycle is an error.
    pub fn pile(&self, anchor: &str) -> Result<Vec<String>> {
        let mut pile = Vec::new();
        let mut current = match self.bases.get(anchor) {
            Some(base) => base,
            None => return Ok(pile),
        };
        let mut visited = HashSet::new();
        visited.insert(current.as_str());
        pile.push(current.clone());
        while let Some(next) = self.above.get(current) {
            if !visited.insert(next.as_str()) {
                return Err(Error::Consistency(format!("cycle through {} in pile of {}", next, anchor)));
            }
            pile.push(next.clone());
            current = next;
        }
        Ok(pile)
    }
}
