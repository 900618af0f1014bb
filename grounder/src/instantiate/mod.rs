//! The instantiator: one fixed-point pass of bottom-up rule matching (§4.4).
//!
//! A rule's body is walked in the order [`order::plan`] picks, backtracking
//! via the substitution's trail exactly as [`crate::term::Substitution`]
//! documents — no substitution map is ever cloned on the search path, only
//! marked and undone.

pub mod aggregate;
pub mod order;

use crate::atom::{Aggregate, AggregateElement, Atom, ChoiceElement, ChoiceHead, CmpOp, Literal};
use crate::config::{ChoiceFeedback, Config};
use crate::derivation::DerivationStore;
use crate::dispatch::library::delta::{Delta, Instantiate as InstantiateDelta};
use crate::dispatch::library::stat::Stat;
use crate::dispatch::{Dispatch, Dispatcher};
use crate::interner::PredicateInterner;
use crate::program::{Head, Rule};
use crate::term::{MatchError, Substitution, Term};

/// Run one pass of instantiation of `rule` against the current contents of
/// `store`, returning every newly-ground rule instance this pass produces.
/// Newly derived head atoms are inserted into `store` as a side effect so a
/// subsequent rule in the same pass — or the next pass over the same
/// component — sees them (§4.4's bottom-up fixed point).
pub fn instantiate_rule(
    rule: &Rule,
    interner: &PredicateInterner,
    store: &mut DerivationStore,
    config: &Config,
    dispatcher: Option<&Dispatcher>,
) -> Vec<Rule> {
    let planned = order::plan(&rule.body, store, interner);
    let mut sub = Substitution::new();
    let mut considered = 0usize;
    let mut out = Vec::new();

    search(rule, &planned, 0, &mut sub, interner, store, &mut out, &mut considered);

    if let Some(d) = dispatcher {
        d(Dispatch::Stat(Stat::SubstitutionsConsidered(considered)));
        d(Dispatch::Stat(Stat::RulesEmitted(out.len())));
    }

    for ground_rule in &out {
        record_head(&ground_rule.head, interner, store, config, dispatcher);
    }

    out
}

fn search(
    rule: &Rule,
    planned: &[usize],
    pos: usize,
    sub: &mut Substitution,
    interner: &PredicateInterner,
    store: &DerivationStore,
    out: &mut Vec<Rule>,
    considered: &mut usize,
) {
    if pos == planned.len() {
        *considered += 1;
        let head = apply_head(&rule.head, sub, interner, store);
        let body: Vec<Literal> = rule
            .body
            .iter()
            .map(|l| apply_body_literal(l, sub, interner, store))
            .collect();
        out.push(Rule::new(head, body));
        return;
    }

    match &rule.body[planned[pos]] {
        Literal::Positive(atom) => {
            let Some(pred_id) = interner.lookup(&atom.predicate, atom.arity()) else {
                return;
            };
            for candidate in store.get(pred_id).iter() {
                let mark = sub.mark();
                if match_atom_args(&atom.args, candidate, sub).is_ok() {
                    search(rule, planned, pos + 1, sub, interner, store, out, considered);
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
                search(rule, planned, pos + 1, sub, interner, store, out, considered);
            }
        }
        Literal::Builtin(op, l, r) => {
            // `X = t` assigns X when it isn't bound yet, mirroring the
            // safety analyzer's treatment of equality as a binding chain
            // (see `atom::safety::try_extend_via_equality`); otherwise `=`
            // and every other comparison just test two resolved values.
            if *op == CmpOp::Eq {
                if let Some(name) = unbound_var(l, sub) {
                    if let Ok(value) = resolve_term(r, sub) {
                        bind_and_continue(rule, planned, pos, name, value, sub, interner, store, out, considered);
                    }
                    return;
                }
                if let Some(name) = unbound_var(r, sub) {
                    if let Ok(value) = resolve_term(l, sub) {
                        bind_and_continue(rule, planned, pos, name, value, sub, interner, store, out, considered);
                    }
                    return;
                }
            }
            if let (Ok(lt), Ok(rt)) = (resolve_term(l, sub), resolve_term(r, sub)) {
                if op.holds(&lt, &rt) {
                    search(rule, planned, pos + 1, sub, interner, store, out, considered);
                }
            }
        }
        Literal::Aggregate(agg) => {
            let value = aggregate::evaluate(agg, sub, interner, store);
            if aggregate::guards_hold(agg, &value, sub) {
                search(rule, planned, pos + 1, sub, interner, store, out, considered);
            }
        }
    }
}

/// Resolve a (possibly arithmetic) body term against `sub` to a ground
/// value, substituting first and then reducing any `Arith` node. A failure
/// here — a non-numeric operand, division by zero — is not a grounding
/// error (§4.4/§7): the caller simply treats the candidate substitution as
/// not matching.
fn resolve_term(t: &Term, sub: &Substitution) -> Result<Term, crate::term::ArithError> {
    t.apply(sub).eval_arith()
}

/// `t` is an equality assignment target iff it is a bare, still-unbound
/// variable. Anything more complex (a functor, an already-bound variable)
/// is compared rather than assigned.
fn unbound_var(t: &Term, sub: &Substitution) -> Option<std::rc::Rc<str>> {
    match t {
        Term::Variable(name) if sub.get(name).is_none() => Some(name.clone()),
        _ => None,
    }
}

#[allow(clippy::too_many_arguments)]
fn bind_and_continue(
    rule: &Rule,
    planned: &[usize],
    pos: usize,
    name: std::rc::Rc<str>,
    value: Term,
    sub: &mut Substitution,
    interner: &PredicateInterner,
    store: &DerivationStore,
    out: &mut Vec<Rule>,
    considered: &mut usize,
) {
    let mark = sub.mark();
    if Term::Variable(name).match_against(&value, sub).is_ok() {
        search(rule, planned, pos + 1, sub, interner, store, out, considered);
    }
    sub.undo_to(mark);
}

/// Match an already-known-ground `args` tuple against a pattern argument
/// list, extending `sub`. A thin wrapper so [`aggregate`] can reuse the same
/// per-argument matching `search` uses for positive literals.
pub(crate) fn match_atom_args(pattern: &[Term], target: &[Term], sub: &mut Substitution) -> Result<(), MatchError> {
    if pattern.len() != target.len() {
        return Err(MatchError::Mismatch);
    }
    for (p, t) in pattern.iter().zip(target.iter()) {
        p.match_against(t, sub)?;
    }
    Ok(())
}

/// Finish a body literal for the emitted rule. Every literal but
/// `Aggregate` is a plain substitution; an aggregate's element list is
/// rebuilt from the current derivation store so the emitted literal carries
/// the full enumerated elements it satisfied, not the symbolic template
/// `Literal::apply` alone would leave behind.
fn apply_body_literal(lit: &Literal, sub: &Substitution, interner: &PredicateInterner, store: &DerivationStore) -> Literal {
    match lit {
        Literal::Aggregate(agg) => Literal::Aggregate(Aggregate {
            fun: agg.fun,
            guard_left: agg.guard_left.as_ref().map(|(op, t)| (*op, t.apply(sub))),
            guard_right: agg.guard_right.as_ref().map(|(op, t)| (*op, t.apply(sub))),
            elements: aggregate::element_tuples(agg, sub, interner, store)
                .into_iter()
                .map(|terms| AggregateElement { terms, condition: vec![] })
                .collect(),
        }),
        other => other.apply(sub),
    }
}

fn apply_head(head: &Head, sub: &Substitution, interner: &PredicateInterner, store: &DerivationStore) -> Head {
    match head {
        Head::Empty => Head::Empty,
        Head::Disjunction(atoms) => Head::Disjunction(atoms.iter().map(|a| a.apply(sub)).collect()),
        Head::Choice(choice) => Head::Choice(apply_choice(choice, sub, interner, store)),
    }
}

fn apply_choice(choice: &ChoiceHead, sub: &Substitution, interner: &PredicateInterner, store: &DerivationStore) -> ChoiceHead {
    let mut elements = Vec::new();
    for element in &choice.elements {
        for atom in aggregate::choice_element_atoms(element, sub, interner, store) {
            elements.push(ChoiceElement { atom, condition: vec![] });
        }
    }
    ChoiceHead {
        lower: choice.lower.as_ref().map(|t| t.apply(sub)),
        upper: choice.upper.as_ref().map(|t| t.apply(sub)),
        elements,
    }
}

fn record_head(
    head: &Head,
    interner: &PredicateInterner,
    store: &mut DerivationStore,
    config: &Config,
    dispatcher: Option<&Dispatcher>,
) {
    match head {
        Head::Empty => {}
        Head::Disjunction(atoms) => {
            for atom in atoms {
                insert_atom(atom, interner, store, dispatcher);
            }
        }
        Head::Choice(choice) => {
            if config.choice_feedback == ChoiceFeedback::Optimistic {
                for element in &choice.elements {
                    insert_atom(&element.atom, interner, store, dispatcher);
                }
            }
        }
    }
}

fn insert_atom(atom: &Atom, interner: &PredicateInterner, store: &mut DerivationStore, dispatcher: Option<&Dispatcher>) {
    let Some(id) = interner.lookup(&atom.predicate, atom.arity()) else {
        return;
    };
    if store.insert(id, atom.args.clone()) {
        if let Some(d) = dispatcher {
            d(Dispatch::Delta(Delta::Instantiate(InstantiateDelta::Derived { predicate: id })));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::{Atom, CmpOp};
    use crate::program::Head;
    use std::rc::Rc;

    fn var(name: &str) -> Term {
        Term::var(name)
    }

    fn setup_edges() -> (PredicateInterner, DerivationStore) {
        let mut interner = PredicateInterner::new();
        let name: Rc<str> = Rc::from("edge");
        let id = interner.intern(&name, 2);
        let mut store = DerivationStore::with_predicate_count(interner.len());
        store.insert(id, vec![Term::num(1), Term::num(2)]);
        store.insert(id, vec![Term::num(2), Term::num(3)]);
        (interner, store)
    }

    #[test]
    fn single_positive_literal_instantiates_one_rule_per_fact() {
        let (interner, mut store) = setup_edges();
        let rule = Rule::new(
            Head::single(Atom::new("path", [var("X"), var("Y")])),
            vec![Literal::Positive(Atom::new("edge", [var("X"), var("Y")]))],
        );
        let config = Config::default();
        let out = instantiate_rule(&rule, &interner, &mut store, &config, None);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(Rule::is_ground));
    }

    #[test]
    fn builtin_filters_candidate_substitutions() {
        let (interner, mut store) = setup_edges();
        let rule = Rule::new(
            Head::single(Atom::new("big_edge", [var("X"), var("Y")])),
            vec![
                Literal::Positive(Atom::new("edge", [var("X"), var("Y")])),
                Literal::Builtin(CmpOp::Gt, var("X"), Term::num(1)),
            ],
        );
        let config = Config::default();
        let out = instantiate_rule(&rule, &interner, &mut store, &config, None);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn newly_derived_head_atoms_feed_the_derivation_store() {
        let (interner, mut store) = setup_edges();
        let edge_id = interner.lookup("edge", 2).unwrap();
        let rule = Rule::new(
            Head::single(Atom::new("edge", [var("Y"), var("X")])),
            vec![Literal::Positive(Atom::new("edge", [var("X"), var("Y")]))],
        );
        let config = Config::default();
        instantiate_rule(&rule, &interner, &mut store, &config, None);
        assert!(store.get(edge_id).contains(&[Term::num(2), Term::num(1)]));
    }

    #[test]
    fn aggregate_literal_in_emitted_rule_carries_enumerated_elements() {
        use crate::atom::{AggFun, Aggregate, AggregateElement};

        let mut interner = PredicateInterner::new();
        let group: Rc<str> = Rc::from("group");
        let p: Rc<str> = Rc::from("p");
        let group_id = interner.intern(&group, 1);
        let p_id = interner.intern(&p, 2);
        let mut store = DerivationStore::with_predicate_count(interner.len());
        store.insert(group_id, vec![Term::num(1)]);
        store.insert(p_id, vec![Term::num(1), Term::num(10)]);
        store.insert(p_id, vec![Term::num(1), Term::num(20)]);

        let rule = Rule::new(
            Head::single(Atom::new("big_group", [var("X")])),
            vec![
                Literal::Positive(Atom::new("group", [var("X")])),
                Literal::Aggregate(Aggregate {
                    fun: AggFun::Count,
                    guard_left: None,
                    guard_right: Some((CmpOp::Ge, Term::num(2))),
                    elements: vec![AggregateElement {
                        terms: vec![var("Y")],
                        condition: vec![Literal::Positive(Atom::new("p", [var("X"), var("Y")]))],
                    }],
                }),
            ],
        );
        let config = Config::default();
        let out = instantiate_rule(&rule, &interner, &mut store, &config, None);
        assert_eq!(out.len(), 1);
        let Literal::Aggregate(agg) = &out[0].body[1] else {
            panic!("expected an aggregate literal");
        };
        assert_eq!(agg.elements.len(), 2, "both (1,10) and (1,20) should survive as enumerated elements");
        assert!(agg.elements.iter().all(|el| el.terms.iter().all(Term::is_ground)));
    }

    #[test]
    fn negative_literal_excludes_already_derived_atoms() {
        let (interner, mut store) = setup_edges();
        let rule = Rule::new(
            Head::single(Atom::new("missing", [var("X"), var("Y")])),
            vec![
                Literal::Positive(Atom::new("edge", [var("X"), var("Y")])),
                Literal::Negative(Atom::new("edge", [var("Y"), var("X")])),
            ],
        );
        let config = Config::default();
        let out = instantiate_rule(&rule, &interner, &mut store, &config, None);
        // Neither (1,2) nor (2,3) has its reverse already derived.
        assert_eq!(out.len(), 2);
    }
}
