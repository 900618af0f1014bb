//! Aggregate and choice-head element instantiation (§3/§4.4).
//!
//! An aggregate's guard variables are already bound by the time it is
//! reached in the planned body order (§4.2 safety requires it), so an
//! aggregate literal never branches the outer search: its value is computed
//! once from the current substitution and the guards are checked against
//! it. Per [`crate::config::AggregateCollapse::Never`], this module only
//! ever *evaluates truth*, never rewrites the aggregate away in the emitted
//! rule — the ground rule keeps the full enumerated element list.

use crate::atom::{Aggregate, AggFun, ChoiceElement, CmpOp, Literal};
use crate::derivation::DerivationStore;
use crate::interner::PredicateInterner;
use crate::term::{Substitution, Term};
use rustc_hash::FxHashSet;

/// Enumerate every ground element tuple of `agg` that satisfies its
/// condition against `store`, given the already-bound `outer` substitution.
/// Tuples are deduplicated per ASP-Core-2 aggregate semantics (a repeated
/// term tuple contributes once, even if reached through multiple distinct
/// conditions).
pub fn element_tuples(
    agg: &Aggregate,
    outer: &Substitution,
    interner: &PredicateInterner,
    store: &DerivationStore,
) -> Vec<Vec<Term>> {
    let mut seen = FxHashSet::default();
    let mut out = Vec::new();
    for element in &agg.elements {
        let mut local = outer.clone();
        enumerate_condition(&element.condition, 0, &mut local, interner, store, &mut |sub| {
            let tuple: Vec<Term> = element.terms.iter().map(|t| t.apply(sub)).collect();
            if seen.insert(tuple.clone()) {
                out.push(tuple);
            }
        });
    }
    out
}

/// As [`element_tuples`], but for a choice-head element: returns every
/// ground instance of the element's atom whose condition is satisfied.
pub fn choice_element_atoms(
    element: &ChoiceElement,
    outer: &Substitution,
    interner: &PredicateInterner,
    store: &DerivationStore,
) -> Vec<crate::atom::Atom> {
    let mut out = Vec::new();
    let mut local = outer.clone();
    enumerate_condition(&element.condition, 0, &mut local, interner, store, &mut |sub| {
        out.push(element.atom.apply(sub));
    });
    out
}

/// Backtracking walk over `condition`'s literals (already in body order —
/// element conditions are typically small and rarely need their own
/// fan-out planning), invoking `emit` with the bound substitution at every
/// full satisfaction.
fn enumerate_condition(
    condition: &[Literal],
    pos: usize,
    sub: &mut Substitution,
    interner: &PredicateInterner,
    store: &DerivationStore,
    emit: &mut dyn FnMut(&Substitution),
) {
    if pos == condition.len() {
        emit(sub);
        return;
    }
    match &condition[pos] {
        Literal::Positive(atom) => {
            let Some(pred_id) = interner.lookup(&atom.predicate, atom.arity()) else {
                return;
            };
            for candidate in store.get(pred_id).iter() {
                let mark = sub.mark();
                if super::match_atom_args(&atom.args, candidate, sub).is_ok() {
                    enumerate_condition(condition, pos + 1, sub, interner, store, emit);
                }
                sub.undo_to(mark);
            }
        }
        Literal::Negative(atom) => {
            let ground = atom.apply(sub);
            let absent = match interner.lookup(&ground.predicate, ground.arity()) {
                Some(id) => !store.get(id).contains(&ground.args),
                None => true,
            };
            if absent {
                enumerate_condition(condition, pos + 1, sub, interner, store, emit);
            }
        }
        Literal::Builtin(op, l, r) => {
            if let (Ok(lt), Ok(rt)) = (super::resolve_term(l, sub), super::resolve_term(r, sub)) {
                if op.holds(&lt, &rt) {
                    enumerate_condition(condition, pos + 1, sub, interner, store, emit);
                }
            }
        }
        Literal::Aggregate(nested) => {
            let value = evaluate(nested, sub, interner, store);
            if guards_hold(nested, &value, sub) {
                enumerate_condition(condition, pos + 1, sub, interner, store, emit);
            }
        }
    }
}

/// Compute an aggregate's value from its (deduplicated) element tuples.
/// `#count` counts tuples; `#sum` sums each tuple's first term (required to
/// be numeric — a non-numeric first term is simply excluded, matching the
/// "discard, don't error" policy of §4.4); `#min`/`#max` order tuples by
/// their first term under the total order of [`crate::term::order`],
/// defaulting to [`Term::Supremum`]/[`Term::Infimum`] on an empty set so a
/// vacuous aggregate never falsely satisfies a guard.
pub fn evaluate(
    agg: &Aggregate,
    outer: &Substitution,
    interner: &PredicateInterner,
    store: &DerivationStore,
) -> Term {
    let tuples = element_tuples(agg, outer, interner, store);
    match agg.fun {
        AggFun::Count => Term::Number(tuples.len() as i64),
        AggFun::Sum => {
            let total: i64 = tuples
                .iter()
                .filter_map(|t| t.first())
                .filter_map(|t| match t {
                    Term::Number(n) => Some(*n),
                    _ => None,
                })
                .sum();
            Term::Number(total)
        }
        AggFun::Min => tuples
            .iter()
            .filter_map(|t| t.first())
            .min()
            .cloned()
            .unwrap_or(Term::Supremum),
        AggFun::Max => tuples
            .iter()
            .filter_map(|t| t.first())
            .max()
            .cloned()
            .unwrap_or(Term::Infimum),
    }
}

/// Check both guards of `agg` against its computed `value`, given already
/// ground guard terms from `sub`.
pub fn guards_hold(agg: &Aggregate, value: &Term, sub: &Substitution) -> bool {
    let left_ok = agg
        .guard_left
        .as_ref()
        .map(|(op, t)| op.holds(&t.apply(sub), value))
        .unwrap_or(true);
    let right_ok = agg
        .guard_right
        .as_ref()
        .map(|(op, t)| op.holds(value, &t.apply(sub)))
        .unwrap_or(true);
    left_ok && right_ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::{AggregateElement, Atom};
    use crate::interner::PredicateInterner;
    use std::rc::Rc;

    fn set_up() -> (PredicateInterner, DerivationStore) {
        let mut interner = PredicateInterner::new();
        let name: Rc<str> = Rc::from("p");
        let id = interner.intern(&name, 1);
        let mut store = DerivationStore::with_predicate_count(interner.len());
        store.insert(id, vec![Term::num(1)]);
        store.insert(id, vec![Term::num(2)]);
        store.insert(id, vec![Term::num(3)]);
        (interner, store)
    }

    #[test]
    fn count_counts_distinct_element_tuples() {
        let (interner, store) = set_up();
        let agg = Aggregate {
            fun: AggFun::Count,
            guard_left: None,
            guard_right: Some((CmpOp::Eq, Term::num(3))),
            elements: vec![AggregateElement {
                terms: vec![Term::var("X")],
                condition: vec![Literal::Positive(Atom::new("p", [Term::var("X")]))],
            }],
        };
        let sub = Substitution::new();
        let value = evaluate(&agg, &sub, &interner, &store);
        assert_eq!(value, Term::Number(3));
        assert!(guards_hold(&agg, &value, &sub));
    }

    #[test]
    fn sum_adds_the_first_element_term() {
        let (interner, store) = set_up();
        let agg = Aggregate {
            fun: AggFun::Sum,
            guard_left: None,
            guard_right: None,
            elements: vec![AggregateElement {
                terms: vec![Term::var("X")],
                condition: vec![Literal::Positive(Atom::new("p", [Term::var("X")]))],
            }],
        };
        let sub = Substitution::new();
        assert_eq!(evaluate(&agg, &sub, &interner, &store), Term::Number(6));
    }

    #[test]
    fn min_of_empty_set_is_supremum() {
        let interner = PredicateInterner::new();
        let store = DerivationStore::with_predicate_count(0);
        let agg = Aggregate {
            fun: AggFun::Min,
            guard_left: None,
            guard_right: None,
            elements: vec![],
        };
        let sub = Substitution::new();
        assert_eq!(evaluate(&agg, &sub, &interner, &store), Term::Supremum);
    }
}
