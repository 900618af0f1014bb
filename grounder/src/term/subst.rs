//! Variable substitutions and one-way matching of a (possibly non-ground)
//! pattern term against a ground target.
//!
//! Matching, not full unification, is all the instantiator ever needs: a
//! rule's body literal is always matched against an atom already present in
//! a derivation set, so the target side is always ground. This sidesteps
//! occurs-checks entirely.

use super::Term;
use rustc_hash::FxHashMap;
use std::rc::Rc;

/// Why a match attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchError {
    /// The pattern and target are not unifiable (different constants,
    /// arities, or a variable's existing binding conflicts).
    Mismatch,
}

/// A binding from variable name to ground term, implemented as a flat map
/// plus an undo trail so the instantiator's backtracking search can unwind a
/// failed branch in `O(bindings made on that branch)` rather than cloning
/// the whole map at every choice point.
#[derive(Clone, Debug, Default)]
pub struct Substitution {
    bindings: FxHashMap<Rc<str>, Term>,
    trail: Vec<Rc<str>>,
}

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Term> {
        self.bindings.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Marks the current trail position so a later [`Substitution::undo_to`]
    /// can unwind exactly the bindings made since.
    pub fn mark(&self) -> usize {
        self.trail.len()
    }

    /// Unwind every binding made since `mark`, in reverse order.
    pub fn undo_to(&mut self, mark: usize) {
        while self.trail.len() > mark {
            let name = self.trail.pop().expect("trail length checked above");
            self.bindings.remove(&name);
        }
    }

    /// Bind `name` to `value`, recording the binding on the trail. Panics if
    /// `name` is already bound; callers must check [`Substitution::get`]
    /// first, as [`match_term`] does.
    fn bind(&mut self, name: Rc<str>, value: Term) {
        debug_assert!(
            !self.bindings.contains_key(&name),
            "rebinding an already-bound variable"
        );
        self.trail.push(name.clone());
        self.bindings.insert(name, value);
    }
}

/// One-way match of `pattern` against `target` (assumed ground), extending
/// `sub`. On failure, `sub` may have been partially extended by bindings
/// made before the failing subterm; callers performing backtracking search
/// must restore via [`Substitution::mark`]/[`Substitution::undo_to`].
pub fn match_term(pattern: &Term, target: &Term, sub: &mut Substitution) -> Result<(), MatchError> {
    match pattern {
        Term::Variable(name) => match sub.get(name) {
            Some(bound) => {
                if bound == target {
                    Ok(())
                } else {
                    Err(MatchError::Mismatch)
                }
            }
            None => {
                sub.bind(name.clone(), target.clone());
                Ok(())
            }
        },
        Term::AnonymousVariable(_) => Ok(()), // never bound, matches anything
        Term::Number(n) => match target {
            Term::Number(m) if n == m => Ok(()),
            _ => Err(MatchError::Mismatch),
        },
        Term::String(s) => match target {
            Term::String(t) if s == t => Ok(()),
            _ => Err(MatchError::Mismatch),
        },
        Term::SymbolicConstant(name) => match target {
            Term::SymbolicConstant(t) if name == t => Ok(()),
            _ => Err(MatchError::Mismatch),
        },
        Term::FuncTerm(name, args) => match target {
            Term::FuncTerm(tname, targs) if name == tname && args.len() == targs.len() => {
                match_args(args, targs, sub)
            }
            _ => Err(MatchError::Mismatch),
        },
        Term::TupleTerm(args) => match target {
            Term::TupleTerm(targs) if args.len() == targs.len() => match_args(args, targs, sub),
            _ => Err(MatchError::Mismatch),
        },
        Term::Infimum => match target {
            Term::Infimum => Ok(()),
            _ => Err(MatchError::Mismatch),
        },
        Term::Supremum => match target {
            Term::Supremum => Ok(()),
            _ => Err(MatchError::Mismatch),
        },
        Term::Arith(..) => {
            // A pattern never legitimately contains an unresolved Arith node
            // by the time matching runs; the instantiator evaluates
            // arithmetic terms before they are used as match patterns.
            Err(MatchError::Mismatch)
        }
    }
}

fn match_args(pattern: &[Term], target: &[Term], sub: &mut Substitution) -> Result<(), MatchError> {
    for (p, t) in pattern.iter().zip(target.iter()) {
        match_term(p, t, sub)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Term;

    #[test]
    fn binds_unbound_variable() {
        let mut sub = Substitution::new();
        match_term(&Term::var("X"), &Term::num(5), &mut sub).unwrap();
        assert_eq!(sub.get("X"), Some(&Term::num(5)));
    }

    #[test]
    fn repeated_variable_must_match_prior_binding() {
        let mut sub = Substitution::new();
        let pattern = Term::func("p", [Term::var("X"), Term::var("X")]);
        assert!(match_term(&pattern, &Term::func("p", [Term::num(1), Term::num(1)]), &mut sub).is_ok());

        let mut sub2 = Substitution::new();
        assert_eq!(
            match_term(&pattern, &Term::func("p", [Term::num(1), Term::num(2)]), &mut sub2),
            Err(MatchError::Mismatch)
        );
    }

    #[test]
    fn anonymous_variable_matches_anything_unbound() {
        let mut sub = Substitution::new();
        let pattern = Term::func("p", [Term::AnonymousVariable(0), Term::AnonymousVariable(1)]);
        assert!(match_term(&pattern, &Term::func("p", [Term::num(1), Term::num(2)]), &mut sub).is_ok());
        assert!(sub.is_empty());
    }

    #[test]
    fn trail_undo_removes_only_bindings_since_mark() {
        let mut sub = Substitution::new();
        match_term(&Term::var("X"), &Term::num(1), &mut sub).unwrap();
        let mark = sub.mark();
        match_term(&Term::var("Y"), &Term::num(2), &mut sub).unwrap();
        sub.undo_to(mark);
        assert_eq!(sub.get("X"), Some(&Term::num(1)));
        assert_eq!(sub.get("Y"), None);
    }
}
