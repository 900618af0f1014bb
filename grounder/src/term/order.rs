//! The strict total order over terms required by §3 of the grounder's
//! invariants: `Infimum < numbers < strings < constants/functors < Supremum`,
//! with functors (including 0-arity constants and tuples) ranked among
//! themselves first by arity, then by name, then lexicographically by
//! argument.

use super::Term;
use std::cmp::Ordering;
use std::rc::Rc;

/// The coarse class a term belongs to, in the order the total order ranks them.
#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum Rank {
    Infimum,
    Number,
    String,
    Functor,
    /// Unresolved terms never appear in ground output; ranked last so they
    /// sort deterministically without participating in the spec's order.
    Unresolved,
    Supremum,
}

fn rank(t: &Term) -> Rank {
    match t {
        Term::Infimum => Rank::Infimum,
        Term::Number(_) => Rank::Number,
        Term::String(_) => Rank::String,
        Term::SymbolicConstant(_) | Term::FuncTerm(..) | Term::TupleTerm(_) => Rank::Functor,
        Term::Variable(_) | Term::AnonymousVariable(_) | Term::Arith(..) => Rank::Unresolved,
        Term::Supremum => Rank::Supremum,
    }
}

/// `(arity, name, args)` view of anything ranked [`Rank::Functor`].
fn functor_key(t: &Term) -> (usize, &str, &[Term]) {
    match t {
        Term::SymbolicConstant(name) => (0, name.as_ref(), &[]),
        Term::FuncTerm(name, args) => (args.len(), name.as_ref(), args.as_slice()),
        Term::TupleTerm(args) => (args.len(), "", args.as_slice()),
        _ => unreachable!("functor_key called on a non-functor term"),
    }
}

fn compare_args(a: &[Term], b: &[Term]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        let c = compare(x, y);
        if c != Ordering::Equal {
            return c;
        }
    }
    a.len().cmp(&b.len())
}

/// Total order comparison. Defined over every [`Term`] variant for use in
/// deduplication and stable sorting, but only meaningful per §3 on ground
/// terms; unresolved terms compare equal-rank to each other by structural
/// `Debug`-free recursion and never appear in emitted output.
pub fn compare(a: &Term, b: &Term) -> Ordering {
    let (ra, rb) = (rank(a), rank(b));
    if ra != rb {
        return ra.cmp(&rb);
    }
    match (a, b) {
        (Term::Infimum, Term::Infimum) | (Term::Supremum, Term::Supremum) => Ordering::Equal,
        (Term::Number(x), Term::Number(y)) => x.cmp(y),
        (Term::String(x), Term::String(y)) => x.cmp(y),
        (_, _) if ra == Rank::Functor => {
            let (aa, an, aargs) = functor_key(a);
            let (ba, bn, bargs) = functor_key(b);
            aa.cmp(&ba).then_with(|| an.cmp(bn)).then_with(|| compare_args(aargs, bargs))
        }
        _ => compare_unresolved(a, b),
    }
}

fn compare_unresolved(a: &Term, b: &Term) -> Ordering {
    fn tag(t: &Term) -> u8 {
        match t {
            Term::Variable(_) => 0,
            Term::AnonymousVariable(_) => 1,
            Term::Arith(..) => 2,
            _ => unreachable!(),
        }
    }
    let (ta, tb) = (tag(a), tag(b));
    if ta != tb {
        return ta.cmp(&tb);
    }
    match (a, b) {
        (Term::Variable(x), Term::Variable(y)) => x.cmp(y),
        (Term::AnonymousVariable(x), Term::AnonymousVariable(y)) => x.cmp(y),
        (Term::Arith(op_a, la, ra), Term::Arith(op_b, lb, rb)) => (*op_a as u8)
            .cmp(&(*op_b as u8))
            .then_with(|| compare(la, lb))
            .then_with(|| compare(ra, rb)),
        _ => unreachable!(),
    }
}

impl PartialOrd for Term {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(compare(self, other))
    }
}

impl Ord for Term {
    fn cmp(&self, other: &Self) -> Ordering {
        compare(self, other)
    }
}

/// A lexicographically-earliest fresh name for an anonymous variable, used
/// only by builders that need to hand out distinct ids.
pub fn fresh_anonymous_name(id: u32) -> Rc<str> {
    Rc::from(format!("_{id}"))
}
