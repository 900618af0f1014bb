//! Matching-order heuristic (§4.4's join strategy): decide which order to
//! walk a rule body's literals in so the backtracking search in
//! [`super::search`] prunes as early as possible.

use crate::atom::Literal;
use crate::derivation::DerivationStore;
use crate::interner::PredicateInterner;
use std::rc::Rc;

/// Plan a walk order over `body`'s indices.
///
/// Positive atoms go first, each picked greedily: among the positive atoms
/// not yet placed, prefer one that shares a variable with what's already
/// bound (so the join stays connected rather than producing a cartesian
/// product), breaking ties by the smaller current derivation set (the
/// fan-out heuristic — fewer candidates to try first). The very first positive
/// atom is chosen by derivation-set size alone, since nothing is bound yet.
/// Builtins are placed immediately after the last positive atom that
/// completes their variables; negatives and aggregates — whose variables
/// must already be fully bound by §4.2 safety — are placed last, in their
/// original relative order.
pub fn plan(body: &[Literal], store: &DerivationStore, interner: &PredicateInterner) -> Vec<usize> {
    let mut positive: Vec<usize> = body
        .iter()
        .enumerate()
        .filter(|(_, l)| matches!(l, Literal::Positive(_)))
        .map(|(i, _)| i)
        .collect();

    let mut ordered_positive = Vec::with_capacity(positive.len());
    let mut bound: Vec<Rc<str>> = Vec::new();

    while !positive.is_empty() {
        let best = positive
            .iter()
            .enumerate()
            .min_by_key(|(_, &i)| {
                let overlap = overlap_count(&body[i], &bound);
                let size = derivation_set_size(&body[i], store, interner);
                // Connected atoms (overlap > 0) always precede disconnected
                // ones; within a tier, smaller derivation sets go first.
                (if overlap > 0 { 0 } else { 1 }, size)
            })
            .map(|(pos, _)| pos)
            .expect("positive is non-empty");
        let idx = positive.remove(best);
        if let Literal::Positive(atom) = &body[idx] {
            atom.free_vars(&mut bound);
        }
        ordered_positive.push(idx);
    }

    let mut rest: Vec<usize> = body
        .iter()
        .enumerate()
        .filter(|(_, l)| !matches!(l, Literal::Positive(_)))
        .map(|(i, _)| i)
        .collect();

    // Builtins whose variables are all already bound by the chosen positive
    // prefix can run as early as the prefix allows; stable-sort keeps
    // negatives/aggregates in their original relative order after builtins.
    rest.sort_by_key(|&i| match &body[i] {
        Literal::Builtin(..) => 0,
        Literal::Aggregate(_) => 1,
        Literal::Negative(_) => 2,
        Literal::Positive(_) => unreachable!("positives filtered out above"),
    });

    let mut planned = ordered_positive;
    planned.extend(rest);
    planned
}

fn overlap_count(lit: &Literal, bound: &[Rc<str>]) -> usize {
    let mut vars = Vec::new();
    lit.free_vars(&mut vars);
    vars.iter().filter(|v| bound.contains(v)).count()
}

fn derivation_set_size(lit: &Literal, store: &DerivationStore, interner: &PredicateInterner) -> usize {
    let Literal::Positive(atom) = lit else {
        return 0;
    };
    match interner.lookup(&atom.predicate, atom.arity()) {
        Some(id) => store.get(id).len(),
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Atom;
    use crate::atom::CmpOp;
    use crate::term::Term;
    use std::rc::Rc;

    fn var(name: &str) -> Term {
        Term::var(name)
    }

    #[test]
    fn smaller_derivation_set_is_tried_first() {
        let mut interner = PredicateInterner::new();
        let small_name: Rc<str> = Rc::from("small");
        let big_name: Rc<str> = Rc::from("big");
        let small = interner.intern(&small_name, 1);
        let big = interner.intern(&big_name, 1);
        let mut store = DerivationStore::with_predicate_count(interner.len());
        store.insert(small, vec![Term::num(1)]);
        store.insert(big, vec![Term::num(1)]);
        store.insert(big, vec![Term::num(2)]);
        store.insert(big, vec![Term::num(3)]);

        let body = vec![
            Literal::Positive(Atom::new("big", [var("X")])),
            Literal::Positive(Atom::new("small", [var("X")])),
        ];
        let planned = plan(&body, &store, &interner);
        assert_eq!(planned[0], 1, "the smaller `small(X)` set should be matched first");
    }

    #[test]
    fn builtins_and_negatives_trail_positives() {
        let interner = PredicateInterner::new();
        let store = DerivationStore::with_predicate_count(0);
        let body = vec![
            Literal::Builtin(CmpOp::Gt, var("X"), Term::num(0)),
            Literal::Negative(Atom::new("p", [var("X")])),
            Literal::Positive(Atom::new("q", [var("X")])),
        ];
        let planned = plan(&body, &store, &interner);
        assert_eq!(planned[0], 2, "the only positive atom leads");
    }
}
