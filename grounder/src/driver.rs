//! The grounder driver: wires the dependency analyzer and instantiator
//! together into the full non-ground-to-ground pipeline of §4.1/§5.
//!
//! 1. Every rule is safety-checked first; a single unsafe rule aborts
//!    grounding before any output is produced (§4.2, §7).
//! 2. Predicate arities are checked for consistency (§3's arity invariant).
//! 3. The dependency graph is built and its components ordered so a
//!    producer always grounds before its consumers (§4.3).
//! 4. Each component is instantiated to a fixed point in that order,
//!    feeding derived atoms forward; constraints (empty heads) run last,
//!    once the whole program has settled.

use crate::config::Config;
use crate::deps::DependencyGraph;
use crate::derivation::DerivationStore;
use crate::dispatch::library::report::{self, Report};
use crate::dispatch::library::stat::Stat;
use crate::dispatch::{Dispatch, Dispatcher};
use crate::error::{Arity, Grounding, Internal, Safety};
use crate::instantiate;
use crate::program::{Program, Rule};
use rustc_hash::{FxHashMap, FxHashSet};
use std::rc::Rc;

/// Ground `program` under `config`, reporting progress through `dispatcher`
/// if one is given. Returns the fully ground [`Program`] or the first fatal
/// error encountered.
pub fn ground(program: &Program, config: &Config, dispatcher: Option<&Dispatcher>) -> Result<Program, Grounding> {
    check_safety(program)?;
    check_arities(program)?;

    let graph = DependencyGraph::build(program, dispatcher);
    let mut store = DerivationStore::with_predicate_count(graph.interner.len());

    let rule_component = assign_components(program, &graph);
    let constraint_component = graph.component_order.len();

    let mut ground_rules: Vec<Rule> = Vec::new();
    let mut seen: FxHashSet<Rule> = FxHashSet::default();

    for (order_index, &component) in graph.component_order.iter().enumerate() {
        let rules: Vec<&Rule> = program
            .rules
            .iter()
            .enumerate()
            .filter(|(i, _)| rule_component[*i] == component)
            .map(|(_, r)| r)
            .collect();

        let passes = run_to_fixed_point(&rules, &graph, &mut store, config, dispatcher, component)?;

        for rule in &rules {
            for ground in instantiate::instantiate_rule(rule, &graph.interner, &mut store, config, dispatcher) {
                if seen.insert(ground.clone()) {
                    ground_rules.push(ground);
                }
            }
        }

        if let Some(d) = dispatcher {
            for id in graph.interner.ids() {
                if graph.component_of[id.index()] == component {
                    d(Dispatch::Stat(Stat::DerivationSetSize {
                        predicate: id,
                        size: store.get(id).len(),
                    }));
                }
            }
            d(Dispatch::Report(Report::Driver(report::Driver::ComponentGrounded {
                component: order_index,
                passes,
            })));
        }
    }

    // Constraints depend only on predicates that are by now fully settled,
    // regardless of which component they belong to; ground them once.
    let constraints: Vec<&Rule> = program
        .rules
        .iter()
        .enumerate()
        .filter(|(i, _)| rule_component[*i] == constraint_component)
        .map(|(_, r)| r)
        .collect();
    for rule in &constraints {
        for ground in instantiate::instantiate_rule(rule, &graph.interner, &mut store, config, dispatcher) {
            if seen.insert(ground.clone()) {
                ground_rules.push(ground);
            }
        }
    }

    for rule in &ground_rules {
        if !rule.is_ground() {
            return Err(Internal::NonGroundOutput.into());
        }
    }

    if let Some(d) = dispatcher {
        d(Dispatch::Report(Report::Finish));
    }

    Ok(Program {
        rules: ground_rules,
        directives: program.directives.clone(),
    })
}

fn check_safety(program: &Program) -> Result<(), Grounding> {
    for (rule_index, rule) in program.rules.iter().enumerate() {
        if let Err(e) = rule.check_safety() {
            let safety: Safety = (rule_index, e).into();
            return Err(safety.into());
        }
    }
    Ok(())
}

fn check_arities(program: &Program) -> Result<(), Grounding> {
    let mut seen: FxHashMap<Rc<str>, (usize, usize)> = FxHashMap::default();
    let mut check = |predicate: &Rc<str>, arity: usize, index: usize| -> Result<(), Grounding> {
        match seen.get(predicate) {
            Some(&(first_seen, _)) if first_seen != arity => Err(Arity {
                predicate: predicate.clone(),
                first_seen,
                conflicting: arity,
            }
            .into()),
            Some(_) => Ok(()),
            None => {
                seen.insert(predicate.clone(), (arity, index));
                Ok(())
            }
        }
    };

    for (index, rule) in program.rules.iter().enumerate() {
        for (name, arity) in rule.head.head_predicates() {
            check(&name, arity, index)?;
        }
        for ((name, arity), _) in rule.body_predicate_occurrences() {
            check(&name, arity, index)?;
        }
    }
    Ok(())
}

/// Map every rule index to the component it is grounded in: the latest
/// (highest topological-order-index) component among its head predicates,
/// or a trailing virtual component (one past the last real one) for
/// constraints, which have no head predicate of their own.
fn assign_components(program: &Program, graph: &DependencyGraph) -> Vec<usize> {
    let order_index_of: FxHashMap<usize, usize> = graph
        .component_order
        .iter()
        .enumerate()
        .map(|(order_index, &component)| (component, order_index))
        .collect();
    let constraint_component = graph.component_order.len();

    program
        .rules
        .iter()
        .map(|rule| {
            let heads = rule.head.head_predicates();
            if heads.is_empty() {
                return constraint_component;
            }
            heads
                .iter()
                .filter_map(|(name, arity)| graph.interner.lookup(name, *arity))
                .map(|id| graph.component_of[id.index()])
                .max_by_key(|c| order_index_of.get(c).copied().unwrap_or(0))
                .unwrap_or(constraint_component)
        })
        .collect()
}

/// Iterate `rules` against `store` until a full sweep derives nothing new,
/// bounded by [`Config::max_iterations_per_component`].
fn run_to_fixed_point(
    rules: &[&Rule],
    graph: &DependencyGraph,
    store: &mut DerivationStore,
    config: &Config,
    dispatcher: Option<&Dispatcher>,
    component: usize,
) -> Result<usize, Grounding> {
    let mut passes = 0usize;
    loop {
        let before: usize = graph.interner.ids().map(|id| store.get(id).len()).sum();

        for rule in rules {
            instantiate::instantiate_rule(rule, &graph.interner, store, config, dispatcher);
        }

        let after: usize = graph.interner.ids().map(|id| store.get(id).len()).sum();

        passes += 1;
        if after == before {
            return Ok(passes);
        }
        if passes >= config.max_iterations_per_component {
            return Err(Internal::FixedPointDidNotConverge { component }.into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::{Atom, CmpOp, Literal};
    use crate::program::Head;
    use crate::term::Term;

    fn var(name: &str) -> Term {
        Term::var(name)
    }

    #[test]
    fn facts_ground_to_themselves() {
        let mut program = Program::new();
        program.add_fact(Atom::new("p", [Term::num(1)]));
        program.add_fact(Atom::new("p", [Term::num(2)]));
        let out = ground(&program, &Config::default(), None).unwrap();
        assert_eq!(out.rules.len(), 2);
        assert!(out.is_ground());
    }

    #[test]
    fn simple_rule_derives_from_facts() {
        let mut program = Program::new();
        program.add_fact(Atom::new("edge", [Term::num(1), Term::num(2)]));
        program.add_fact(Atom::new("edge", [Term::num(2), Term::num(3)]));
        program.add_rule(Rule::new(
            Head::single(Atom::new("path", [var("X"), var("Y")])),
            vec![Literal::Positive(Atom::new("edge", [var("X"), var("Y")]))],
        ));
        let out = ground(&program, &Config::default(), None).unwrap();
        let paths = out
            .rules
            .iter()
            .filter(|r| matches!(&r.head, Head::Disjunction(atoms) if atoms[0].predicate.as_ref() == "path"))
            .count();
        assert_eq!(paths, 2);
    }

    #[test]
    fn negation_across_a_stratum() {
        let mut program = Program::new();
        program.add_fact(Atom::new("a", []));
        program.add_rule(Rule::new(
            Head::single(Atom::new("b", [])),
            vec![Literal::Negative(Atom::new("a", []))],
        ));
        let out = ground(&program, &Config::default(), None).unwrap();
        let has_b = out
            .rules
            .iter()
            .any(|r| matches!(&r.head, Head::Disjunction(atoms) if atoms[0].predicate.as_ref() == "b"));
        assert!(!has_b, "a(.) holds so b should never be derivable");
    }

    #[test]
    fn unsafe_rule_aborts_before_any_output() {
        let mut program = Program::new();
        program.add_rule(Rule::new(Head::single(Atom::new("p", [var("X")])), vec![]));
        let result = ground(&program, &Config::default(), None);
        assert!(matches!(result, Err(Grounding::Safety(_))));
    }

    #[test]
    fn inconsistent_arity_is_rejected() {
        let mut program = Program::new();
        program.add_fact(Atom::new("p", [Term::num(1)]));
        program.add_fact(Atom::new("p", [Term::num(1), Term::num(2)]));
        let result = ground(&program, &Config::default(), None);
        assert!(matches!(result, Err(Grounding::Arity(_))));
    }

    #[test]
    fn arithmetic_in_a_constraint_filters_correctly() {
        let mut program = Program::new();
        program.add_fact(Atom::new("n", [Term::num(5)]));
        program.add_rule(Rule::new(
            Head::Empty,
            vec![
                Literal::Positive(Atom::new("n", [var("X")])),
                Literal::Builtin(CmpOp::Gt, var("X"), Term::num(3)),
            ],
        ));
        let out = ground(&program, &Config::default(), None).unwrap();
        assert_eq!(out.rules.len(), 2, "fact plus one grounded constraint");
    }

    #[test]
    fn grounding_is_deterministic_across_runs() {
        let mut program = Program::new();
        program.add_fact(Atom::new("edge", [Term::num(1), Term::num(2)]));
        program.add_fact(Atom::new("edge", [Term::num(2), Term::num(3)]));
        program.add_rule(Rule::new(
            Head::single(Atom::new("path", [var("X"), var("Y")])),
            vec![Literal::Positive(Atom::new("edge", [var("X"), var("Y")]))],
        ));
        let a = ground(&program, &Config::default(), None).unwrap();
        let b = ground(&program, &Config::default(), None).unwrap();
        assert_eq!(a.to_string(), b.to_string());
    }
}
