//! The safety analyzer of §4.2: every variable in the head, in a negated
//! literal, in a built-in literal, or in an aggregate guard must be
//! range-restricted by a positive, non-aggregate body literal — directly, or
//! transitively through a chain of built-in equalities.

use super::{CmpOp, Literal};
use std::rc::Rc;

/// A rule failed safety. Carries the offending variable names; the caller
/// (the driver) attaches the rule's position for the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetyError {
    pub unsafe_vars: Vec<Rc<str>>,
}

impl std::fmt::Display for SafetyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unsafe variables: ")?;
        for (i, v) in self.unsafe_vars.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// Check safety for a rule given the free variables of its head and the
/// literals of its body. Returns the rule's `pos_vars` fixpoint on success,
/// which the instantiator reuses to decide a sound matching order.
pub fn check_safety(head_vars: &[Rc<str>], body: &[Literal]) -> Result<Vec<Rc<str>>, SafetyError> {
    let mut pos_vars: Vec<Rc<str>> = Vec::new();

    for lit in body {
        if let Literal::Positive(atom) = lit {
            atom.free_vars(&mut pos_vars);
        }
    }

    // Fixpoint: extend pos_vars through chained built-in equalities `x = t`
    // once fv(t) is already covered.
    loop {
        let mut grew = false;
        for lit in body {
            if let Literal::Builtin(CmpOp::Eq, l, r) = lit {
                grew |= try_extend_via_equality(l, r, &mut pos_vars);
                grew |= try_extend_via_equality(r, l, &mut pos_vars);
            }
        }
        if !grew {
            break;
        }
    }

    let mut unsafe_vars = Vec::new();

    for v in head_vars {
        if !pos_vars.contains(v) {
            push_unique(&mut unsafe_vars, v.clone());
        }
    }

    for lit in body {
        match lit {
            Literal::Negative(atom) => {
                let mut vs = Vec::new();
                atom.free_vars(&mut vs);
                for v in vs {
                    if !pos_vars.contains(&v) {
                        push_unique(&mut unsafe_vars, v);
                    }
                }
            }
            Literal::Builtin(_, l, r) => {
                let mut vs = Vec::new();
                l.free_vars(&mut vs);
                r.free_vars(&mut vs);
                for v in vs {
                    if !pos_vars.contains(&v) {
                        push_unique(&mut unsafe_vars, v);
                    }
                }
            }
            Literal::Aggregate(agg) => {
                let mut vs = Vec::new();
                agg.free_vars(&mut vs);
                for v in vs {
                    if !pos_vars.contains(&v) {
                        push_unique(&mut unsafe_vars, v);
                    }
                }
            }
            Literal::Positive(_) => {}
        }
    }

    if unsafe_vars.is_empty() {
        Ok(pos_vars)
    } else {
        Err(SafetyError { unsafe_vars })
    }
}

/// If `var_side` is a single bound-candidate variable not yet in `pos_vars`,
/// and every free variable of `other_side` already is, add it. Returns
/// whether `pos_vars` grew.
fn try_extend_via_equality(
    var_side: &crate::term::Term,
    other_side: &crate::term::Term,
    pos_vars: &mut Vec<Rc<str>>,
) -> bool {
    use crate::term::Term;
    let Term::Variable(name) = var_side else {
        return false;
    };
    if pos_vars.contains(name) {
        return false;
    }
    let mut other_vars = Vec::new();
    other_side.free_vars(&mut other_vars);
    if other_vars.iter().all(|v| pos_vars.contains(v)) {
        pos_vars.push(name.clone());
        true
    } else {
        false
    }
}

fn push_unique(vars: &mut Vec<Rc<str>>, v: Rc<str>) {
    if !vars.contains(&v) {
        vars.push(v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Atom;
    use crate::term::Term;

    #[test]
    fn positive_body_atom_makes_head_var_safe() {
        let body = vec![Literal::Positive(Atom::new("p", [Term::var("X")]))];
        let head_vars = vec![Rc::from("X")];
        assert!(check_safety(&head_vars, &body).is_ok());
    }

    #[test]
    fn unbound_head_var_is_unsafe() {
        let body: Vec<Literal> = vec![];
        let head_vars = vec![Rc::from("X")];
        let err = check_safety(&head_vars, &body).unwrap_err();
        assert_eq!(err.unsafe_vars, vec![Rc::<str>::from("X")]);
    }

    #[test]
    fn negative_literal_variable_must_appear_positively() {
        let body = vec![Literal::Negative(Atom::new("q", [Term::var("X")]))];
        assert!(check_safety(&[], &body).is_err());

        let body_safe = vec![
            Literal::Positive(Atom::new("p", [Term::var("X")])),
            Literal::Negative(Atom::new("q", [Term::var("X")])),
        ];
        assert!(check_safety(&[], &body_safe).is_ok());
    }

    #[test]
    fn chained_equality_propagates_safety() {
        let body = vec![
            Literal::Positive(Atom::new("p", [Term::var("X")])),
            Literal::Builtin(CmpOp::Eq, Term::var("Y"), Term::var("X")),
        ];
        let head_vars = vec![Rc::from("Y")];
        assert!(check_safety(&head_vars, &body).is_ok());
    }

    #[test]
    fn builtin_inequality_variable_must_be_bound() {
        let body = vec![Literal::Builtin(CmpOp::Lt, Term::var("X"), Term::num(3))];
        assert!(check_safety(&[], &body).is_err());
    }
}
