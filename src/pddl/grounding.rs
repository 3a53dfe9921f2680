use std::collections::{BTreeSet, HashMap};

use log::debug;

use super::action::Operator;
use super::atom::{Action, Atom};
use super::domain::{Domain, Schema};
use super::problem::Problem;
use crate::error::{Error, Result};

/// Instantiates every schema of `domain` with every type-compatible binding of
/// the problem's objects.
pub fn ground(domain: &Domain, problem: &Problem) -> Result<Vec<Operator>> {
    if problem.domain != domain.name {
        return Err(Error::Config(format!("problem {} is for domain {}, not {}", problem.name, problem.domain, domain.name)));
    }
    if let Some((object, kind)) = problem.objects.iter().find(|(_, kind)| !domain.knows_type(kind)) {
        return Err(Error::Config(format!("object {} has unknown type {}", object, kind)));
    }
    let mut operators = Vec::new();
    for schema in &domain.actions {
        let candidates = schema.parameters.iter()
            .map(|(_, kind)| problem.objects.iter()
                .filter(|(_, object_kind)| domain.is_type(object_kind, kind))
                .map(|(object, _)| object.as_str())
                .collect::<Vec<_>>())
            .collect::<Vec<_>>();
        let mut binding = Vec::with_capacity(candidates.len());
        bind(schema, &candidates, &mut binding, &mut operators);
    }
    debug!("Grounded {} operators for problem {}", operators.len(), problem.name);
    Ok(operators)
}

fn bind<'a>(schema: &Schema, candidates: &[Vec<&'a str>], binding: &mut Vec<&'a str>, out: &mut Vec<Operator>) {
    if binding.len() == candidates.len() {
        out.push(instantiate(schema, binding));
        return;
    }
    for object in &candidates[binding.len()] {
        binding.push(*object);
        bind(schema, candidates, binding, out);
        binding.pop();
    }
}

fn instantiate(schema: &Schema, binding: &[&str]) -> Operator {
    let substitution: HashMap<&str, &str> = schema.parameters.iter()
        .map(|(var, _)| var.as_str())
        .zip(binding.iter().copied())
        .collect();
    let substitute = |atoms: &[Atom]| -> BTreeSet<Atom> {
        atoms.iter().map(|atom| Atom {
            name: atom.name.clone(),
            args: atom.args.iter().map(|arg| substitution.get(arg.as_str()).map(|o| o.to_string()).unwrap_or_else(|| arg.clone())).collect(),
        }).collect()
    };
    Operator {
        action: Action::new(&schema.name, binding),
        precondition: substitute(&schema.precondition),
        add: substitute(&schema.add),
        delete: substitute(&schema.delete),
    }
}
