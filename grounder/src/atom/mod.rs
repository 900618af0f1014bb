//! Predicate atoms, built-in comparisons, aggregates, and choice heads — the
//! literal model a rule body is built from.

mod safety;

pub use safety::{check_safety, SafetyError};

use crate::term::{Substitution, Term};
use std::rc::Rc;

/// A predicate atom `name(arg, ...)`. Identity is `(name, arity, args)`; two
/// atoms with the same name but differing arity are never considered the
/// same predicate at the type level — arity consistency is instead a
/// program-wide invariant checked once up front (see [`crate::error::Arity`]).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Atom {
    pub predicate: Rc<str>,
    pub args: Vec<Term>,
}

impl Atom {
    pub fn new(predicate: impl Into<Rc<str>>, args: impl IntoIterator<Item = Term>) -> Self {
        Atom {
            predicate: predicate.into(),
            args: args.into_iter().collect(),
        }
    }

    pub fn arity(&self) -> usize {
        self.args.len()
    }

    pub fn is_ground(&self) -> bool {
        self.args.iter().all(Term::is_ground)
    }

    pub fn free_vars(&self, out: &mut Vec<Rc<str>>) {
        for a in &self.args {
            a.free_vars(out);
        }
    }

    pub fn apply(&self, sub: &Substitution) -> Atom {
        Atom {
            predicate: self.predicate.clone(),
            args: self.args.iter().map(|a| a.apply(sub)).collect(),
        }
    }
}

/// Comparison operators available to built-in literals and aggregate guards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    /// Evaluate the comparison over two ground terms. `=`/`!=` use the total
    /// term order of [`crate::term::order`]; the strict/non-strict numeric
    /// comparisons require both sides to be numbers, failing (not erroring)
    /// the literal otherwise, per §4.2.
    pub fn holds(self, l: &Term, r: &Term) -> bool {
        use std::cmp::Ordering;
        match self {
            CmpOp::Eq => l == r,
            CmpOp::Ne => l != r,
            CmpOp::Lt | CmpOp::Le | CmpOp::Gt | CmpOp::Ge => {
                let (Term::Number(a), Term::Number(b)) = (l, r) else {
                    return false;
                };
                let ord = a.cmp(b);
                match self {
                    CmpOp::Lt => ord == Ordering::Less,
                    CmpOp::Le => ord != Ordering::Greater,
                    CmpOp::Gt => ord == Ordering::Greater,
                    CmpOp::Ge => ord != Ordering::Less,
                    CmpOp::Eq | CmpOp::Ne => unreachable!(),
                }
            }
        }
    }
}

impl std::fmt::Display for CmpOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CmpOp::Eq => "=",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        };
        write!(f, "{s}")
    }
}

/// The aggregate functions §3 permits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AggFun {
    Count,
    Sum,
    Min,
    Max,
}

impl std::fmt::Display for AggFun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AggFun::Count => "count",
            AggFun::Sum => "sum",
            AggFun::Min => "min",
            AggFun::Max => "max",
        };
        write!(f, "{s}")
    }
}

/// One `terms : literals` element of an aggregate or choice construct.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AggregateElement {
    pub terms: Vec<Term>,
    pub condition: Vec<Literal>,
}

/// An aggregate literal `fun{ element; ... } guard`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Aggregate {
    pub fun: AggFun,
    pub guard_left: Option<(CmpOp, Term)>,
    pub guard_right: Option<(CmpOp, Term)>,
    pub elements: Vec<AggregateElement>,
}

impl Aggregate {
    pub fn free_vars(&self, out: &mut Vec<Rc<str>>) {
        if let Some((_, t)) = &self.guard_left {
            t.free_vars(out);
        }
        if let Some((_, t)) = &self.guard_right {
            t.free_vars(out);
        }
        // Element-local terms/conditions are scoped to the element, not free
        // in the enclosing rule, so they are deliberately excluded here.
    }
}

/// A single body literal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Literal {
    Positive(Atom),
    /// Default negation (`not p(...)`).
    Negative(Atom),
    Builtin(CmpOp, Term, Term),
    Aggregate(Aggregate),
}

impl Literal {
    pub fn free_vars(&self, out: &mut Vec<Rc<str>>) {
        match self {
            Literal::Positive(a) | Literal::Negative(a) => a.free_vars(out),
            Literal::Builtin(_, l, r) => {
                l.free_vars(out);
                r.free_vars(out);
            }
            Literal::Aggregate(agg) => agg.free_vars(out),
        }
    }

    /// Substitute `sub` into this literal's own terms. For an aggregate,
    /// this only carries the guards across — it cannot enumerate the
    /// element list itself, since that requires the derivation store and
    /// interner. Building the final, fully-enumerated aggregate literal for
    /// an emitted rule is [`crate::instantiate`]'s job, not this method's.
    pub fn apply(&self, sub: &Substitution) -> Literal {
        match self {
            Literal::Positive(a) => Literal::Positive(a.apply(sub)),
            Literal::Negative(a) => Literal::Negative(a.apply(sub)),
            Literal::Builtin(op, l, r) => Literal::Builtin(*op, l.apply(sub), r.apply(sub)),
            Literal::Aggregate(agg) => Literal::Aggregate(Aggregate {
                fun: agg.fun,
                guard_left: agg.guard_left.as_ref().map(|(op, t)| (*op, t.apply(sub))),
                guard_right: agg.guard_right.as_ref().map(|(op, t)| (*op, t.apply(sub))),
                elements: agg.elements.clone(),
            }),
        }
    }
}

/// A choice-head element `atom : condition`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChoiceElement {
    pub atom: Atom,
    pub condition: Vec<Literal>,
}

/// `lower { element; ... } upper`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChoiceHead {
    pub lower: Option<Term>,
    pub upper: Option<Term>,
    pub elements: Vec<ChoiceElement>,
}
