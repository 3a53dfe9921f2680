use std::collections::BTreeMap;
use std::fmt;

use super::atom::Atom;

/// Root of every type hierarchy.
pub const OBJECT: &str = "object";

/// Typed action schema. Atom arguments starting with `?` refer to parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub name: String,
    pub parameters: Vec<(String, String)>,
    pub precondition: Vec<Atom>,
    pub add: Vec<Atom>,
    pub delete: Vec<Atom>,
}

impl Schema {
    fn new(name: &str, parameters: &[(&str, &str)]) -> Self {
        Self {
            name: name.to_owned(),
            parameters: parameters.iter().map(|(v, t)| (v.to_string(), t.to_string())).collect(),
            precondition: Vec::new(),
            add: Vec::new(),
            delete: Vec::new(),
        }
    }

    fn pre(mut self, atoms: &[(&str, &[&str])]) -> Self {
        self.precondition.extend(atoms.iter().map(|(n, a)| Atom::new(n, *a)));
        self
    }

    fn add(mut self, atoms: &[(&str, &[&str])]) -> Self {
        self.add.extend(atoms.iter().map(|(n, a)| Atom::new(n, *a)));
        self
    }

    fn del(mut self, atoms: &[(&str, &[&str])]) -> Self {
        self.delete.extend(atoms.iter().map(|(n, a)| Atom::new(n, *a)));
        self
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let parameters = self.parameters.iter().map(|(v, t)| format!("{} - {}", v, t)).collect::<Vec<_>>().join(" ");
        let join = |atoms: &[Atom]| atoms.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(" ");
        let negated = self.delete.iter().map(|a| format!("(not {})", a)).collect::<Vec<_>>().join(" ");
        write!(f, "(:action {} :parameters ({}) :precondition (and {}) :effect (and {} {}))",
            self.name, parameters, join(&self.precondition), join(&self.add), negated)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Domain {
    pub name: String,
    /// Child type to parent type. `object` is implicit and has no entry.
    pub types: BTreeMap<String, String>,
    pub actions: Vec<Schema>,
}

impl Domain {
    /// Whether `kind` is `ancestor` or one of its subtypes.
    pub fn is_type(&self, kind: &str, ancestor: &str) -> bool {
        if kind == ancestor || ancestor == OBJECT {
            return true;
        }
        let mut current = kind;
        let mut depth = 0;
        while let Some(parent) = self.types.get(current) {
            if parent == ancestor {
                return true;
            }
            current = parent;
            depth += 1;
            if depth > self.types.len() {
                return false;
            }
        }
        false
    }

    pub fn knows_type(&self, kind: &str) -> bool {
        kind == OBJECT || self.types.contains_key(kind)
    }
}

/// Untyped four-operator blocksworld with a single table.
pub fn blocks() -> Domain {
    let x: &[&str] = &["?x"];
    let xy: &[&str] = &["?x", "?y"];
    let y: &[&str] = &["?y"];
    let none: &[&str] = &[];
    let actions = vec![
        Schema::new("pick-up", &[("?x", OBJECT)])
            .pre(&[("clear", x), ("ontable", x), ("handempty", none)])
            .add(&[("holding", x)])
            .del(&[("ontable", x), ("clear", x), ("handempty", none)]),
        Schema::new("put-down", &[("?x", OBJECT)])
            .pre(&[("holding", x)])
            .add(&[("clear", x), ("handempty", none), ("ontable", x)])
            .del(&[("holding", x)]),
        Schema::new("stack", &[("?x", OBJECT), ("?y", OBJECT)])
            .pre(&[("holding", x), ("clear", y)])
            .add(&[("clear", x), ("handempty", none), ("on", xy)])
            .del(&[("holding", x), ("clear", y)]),
        Schema::new("unstack", &[("?x", OBJECT), ("?y", OBJECT)])
            .pre(&[("on", xy), ("clear", x), ("handempty", none)])
            .add(&[("holding", x), ("clear", y)])
            .del(&[("clear", x), ("handempty", none), ("on", xy)]),
    ];
    Domain { name: "blocks".to_owned(), types: BTreeMap::new(), actions }
}

/// Blocksworld over a fixed set of columns; salient blocks are a subtype of block.
pub fn blocks_columns() -> Domain {
    let b: &[&str] = &["?b"];
    let c: &[&str] = &["?c"];
    let bc: &[&str] = &["?b", "?c"];
    let b1: &[&str] = &["?b1"];
    let b2: &[&str] = &["?b2"];
    let b12: &[&str] = &["?b1", "?b2"];
    let none: &[&str] = &[];
    let actions = vec![
        Schema::new("pickup", &[("?b", "block"), ("?c", "column")])
            .pre(&[("bottom", bc), ("clear", b), ("hand-free", none)])
            .add(&[("holding", b), ("empty", c)])
            .del(&[("bottom", bc), ("clear", b), ("hand-free", none)]),
        Schema::new("putdown", &[("?b", "block"), ("?c", "column")])
            .pre(&[("holding", b), ("empty", c)])
            .add(&[("bottom", bc), ("clear", b), ("hand-free", none)])
            .del(&[("holding", b), ("empty", c)]),
        Schema::new("stack", &[("?b1", "block"), ("?b2", "block")])
            .pre(&[("holding", b1), ("clear", b2)])
            .add(&[("on", b12), ("clear", b1), ("hand-free", none)])
            .del(&[("holding", b1), ("clear", b2)]),
        Schema::new("unstack", &[("?b1", "block"), ("?b2", "block")])
            .pre(&[("on", b12), ("clear", b1), ("hand-free", none)])
            .add(&[("holding", b1), ("clear", b2)])
            .del(&[("on", b12), ("clear", b1), ("hand-free", none)]),
    ];
    let types = [("block", OBJECT), ("column", OBJECT), ("salient", "block")]
        .iter().map(|(t, p)| (t.to_string(), p.to_string())).collect();
    Domain { name: "blocks-columns".to_owned(), types, actions }
}

#[cfg(test)]
mod tests {
    use super::{blocks, blocks_columns, OBJECT};

    #[test]
    fn test_type_hierarchy() {
        let d = blocks_columns();
        assert!(d.is_type("salient", "block"));
        assert!(d.is_type("salient", OBJECT));
        assert!(d.is_type("column", "column"));
        assert!(!d.is_type("column", "block"));
        assert!(!d.is_type("block", "salient"));
        assert!(d.knows_type("salient"));
        assert!(!blocks().knows_type("column"));
    }

    #[test]
    fn test_schema_display() {
        let d = blocks();
        assert_eq!(d.actions[1].to_string(),
            "(:action put-down :parameters (?x - object) :precondition (and (holding ?x)) :effect (and (clear ?x) (handempty) (ontable ?x) (not (holding ?x))))");
    }
}
