//! Symbolic terms, the substitutions over them, and their total order.
//!
//! A [Term] is a closed sum type rather than a class hierarchy: every case a
//! non-ground logic program can mention — numbers, symbolic constants,
//! strings, variables, arithmetic, functors, tuples, and the two sentinel
//! values used to bound aggregates — is a variant, dispatched by matching
//! rather than by any runtime type probe.

mod arith;
mod order;
mod subst;

pub use arith::{ArithError, ArithOp};
pub use subst::{MatchError, Substitution};

use std::rc::Rc;

/// A symbolic term, possibly containing variables or unresolved arithmetic.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Term {
    /// Least element of the total order; used only as an aggregate bound.
    Infimum,
    /// An exact integer.
    Number(i64),
    /// A quoted string constant.
    String(Rc<str>),
    /// A lowercase-leading 0-arity symbolic constant, e.g. `a` or `foo`.
    SymbolicConstant(Rc<str>),
    /// A function term `name(arg, ...)` with one or more arguments.
    FuncTerm(Rc<str>, Vec<Term>),
    /// A tuple term `(arg, ...)`, as used in aggregate element heads.
    TupleTerm(Vec<Term>),
    /// A named first-order variable.
    Variable(Rc<str>),
    /// An anonymous variable (`_`); distinct occurrences never unify with
    /// one another and are never bound by a substitution.
    AnonymousVariable(u32),
    /// An arithmetic expression awaiting evaluation.
    Arith(ArithOp, Box<Term>, Box<Term>),
    /// Greatest element of the total order; used only as an aggregate bound.
    Supremum,
}

/// Free-function form of [`Term::num`], for `term::num(1)`-style construction.
pub fn num(n: i64) -> Term {
    Term::Number(n)
}

/// Free-function form of [`Term::var`].
pub fn var(name: impl Into<Rc<str>>) -> Term {
    Term::Variable(name.into())
}

impl Term {
    pub fn num(n: i64) -> Term {
        Term::Number(n)
    }

    pub fn var(name: impl Into<Rc<str>>) -> Term {
        Term::Variable(name.into())
    }

    pub fn constant(name: impl Into<Rc<str>>) -> Term {
        Term::SymbolicConstant(name.into())
    }

    pub fn string(s: impl Into<Rc<str>>) -> Term {
        Term::String(s.into())
    }

    pub fn func(name: impl Into<Rc<str>>, args: impl IntoIterator<Item = Term>) -> Term {
        let args: Vec<Term> = args.into_iter().collect();
        if args.is_empty() {
            Term::SymbolicConstant(name.into())
        } else {
            Term::FuncTerm(name.into(), args)
        }
    }

    pub fn tuple(args: impl IntoIterator<Item = Term>) -> Term {
        Term::TupleTerm(args.into_iter().collect())
    }

    /// True once every variable, anonymous variable, and arithmetic node has
    /// been eliminated. A ground-program invariant checked at emission.
    pub fn is_ground(&self) -> bool {
        match self {
            Term::Variable(_) | Term::AnonymousVariable(_) | Term::Arith(..) => false,
            Term::Number(_)
            | Term::String(_)
            | Term::SymbolicConstant(_)
            | Term::Infimum
            | Term::Supremum => true,
            Term::FuncTerm(_, args) | Term::TupleTerm(args) => args.iter().all(Term::is_ground),
        }
    }

    /// Free variable names occurring in this term, anonymous variables excluded.
    pub fn free_vars(&self, out: &mut Vec<Rc<str>>) {
        match self {
            Term::Variable(name) => {
                if !out.iter().any(|v| v == name) {
                    out.push(name.clone());
                }
            }
            Term::FuncTerm(_, args) | Term::TupleTerm(args) => {
                for a in args {
                    a.free_vars(out);
                }
            }
            Term::Arith(_, l, r) => {
                l.free_vars(out);
                r.free_vars(out);
            }
            Term::AnonymousVariable(_)
            | Term::Number(_)
            | Term::String(_)
            | Term::SymbolicConstant(_)
            | Term::Infimum
            | Term::Supremum => {}
        }
    }

    /// Apply a substitution, replacing every bound variable with its value.
    /// Anonymous variables and arithmetic nodes pass through unevaluated;
    /// evaluating arithmetic is a distinct step (see [`Term::eval_arith`]).
    pub fn apply(&self, sub: &Substitution) -> Term {
        match self {
            Term::Variable(name) => sub.get(name).cloned().unwrap_or_else(|| self.clone()),
            Term::FuncTerm(name, args) => {
                Term::FuncTerm(name.clone(), args.iter().map(|a| a.apply(sub)).collect())
            }
            Term::TupleTerm(args) => Term::TupleTerm(args.iter().map(|a| a.apply(sub)).collect()),
            Term::Arith(op, l, r) => {
                Term::Arith(*op, Box::new(l.apply(sub)), Box::new(r.apply(sub)))
            }
            other => other.clone(),
        }
    }

    /// One-way match of `self` (the pattern, possibly containing variables)
    /// against `target` (assumed ground), extending `sub`.
    ///
    /// Succeeds on equal constants/numbers/strings, on structurally equal
    /// functors of equal name and arity (arguments matched pointwise), and
    /// binds an unbound variable to any ground term. A variable already
    /// bound in `sub` must match its prior binding exactly.
    pub fn match_against(&self, target: &Term, sub: &mut Substitution) -> Result<(), MatchError> {
        subst::match_term(self, target, sub)
    }

    /// Reduce a fully-substituted `Arith` node (or any other ground term) to
    /// a [`Term::Number`], failing on non-numeric operands or division/mod
    /// by zero. Non-arithmetic ground terms evaluate to themselves.
    pub fn eval_arith(&self) -> Result<Term, arith::ArithError> {
        arith::eval(self)
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Infimum => write!(f, "#inf"),
            Term::Supremum => write!(f, "#sup"),
            Term::Number(n) => write!(f, "{n}"),
            Term::String(s) => write!(f, "{s:?}"),
            Term::SymbolicConstant(name) => write!(f, "{name}"),
            Term::Variable(name) => write!(f, "{name}"),
            Term::AnonymousVariable(_) => write!(f, "_"),
            Term::FuncTerm(name, args) => {
                write!(f, "{name}(")?;
                write_args(f, args)?;
                write!(f, ")")
            }
            Term::TupleTerm(args) => {
                write!(f, "(")?;
                write_args(f, args)?;
                write!(f, ")")
            }
            Term::Arith(op, l, r) => match op {
                ArithOp::Neg => write!(f, "-{l}"),
                ArithOp::Add => write!(f, "{l}+{r}"),
                ArithOp::Sub => write!(f, "{l}-{r}"),
                ArithOp::Mul => write!(f, "{l}*{r}"),
                ArithOp::Div => write!(f, "{l}/{r}"),
                ArithOp::Mod => write!(f, "{l}\\{r}"),
            },
        }
    }
}

fn write_args(f: &mut std::fmt::Formatter<'_>, args: &[Term]) -> std::fmt::Result {
    for (i, a) in args.iter().enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        write!(f, "{a}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ground_detection() {
        assert!(Term::num(1).is_ground());
        assert!(!Term::var("X").is_ground());
        assert!(!Term::AnonymousVariable(0).is_ground());
        let f = Term::func("f", [Term::num(1), Term::var("X")]);
        assert!(!f.is_ground());
    }

    #[test]
    fn free_vars_dedup_and_skip_anonymous() {
        let t = Term::func("f", [Term::var("X"), Term::var("X"), Term::var("Y")]);
        let mut vars = vec![];
        t.free_vars(&mut vars);
        assert_eq!(vars.len(), 2);
    }

    #[test]
    fn zero_arity_func_is_a_symbolic_constant() {
        assert_eq!(Term::func("a", []), Term::SymbolicConstant("a".into()));
    }
}
