//! Arithmetic evaluation over ground numeric terms.

use super::Term;

/// The binary and unary arithmetic operators a rule may mention.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    /// Unary negation; represented as a binary node whose right operand is
    /// [`Term::Number(0)`] is avoided in favour of a dedicated variant so a
    /// single free variable in `-X` is still recognised by safety analysis.
    Neg,
}

/// Why a candidate substitution's arithmetic could not be reduced.
///
/// Per §4.4 this is never a program error: the instantiator catches it and
/// silently discards the substitution under consideration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithError {
    NonNumericOperand,
    DivisionByZero,
}

/// Reduce a ground term to a [`Term::Number`]. Non-arithmetic ground terms
/// evaluate to themselves; `Arith` nodes recurse into their operands first.
pub fn eval(term: &Term) -> Result<Term, ArithError> {
    match term {
        Term::Arith(ArithOp::Neg, operand, _) => {
            let v = as_number(&eval(operand)?)?;
            Ok(Term::Number(-v))
        }
        Term::Arith(op, left, right) => {
            let l = as_number(&eval(left)?)?;
            let r = as_number(&eval(right)?)?;
            let v = match op {
                ArithOp::Add => l.checked_add(r).ok_or(ArithError::NonNumericOperand)?,
                ArithOp::Sub => l.checked_sub(r).ok_or(ArithError::NonNumericOperand)?,
                ArithOp::Mul => l.checked_mul(r).ok_or(ArithError::NonNumericOperand)?,
                ArithOp::Div => {
                    if r == 0 {
                        return Err(ArithError::DivisionByZero);
                    }
                    l.wrapping_div(r)
                }
                ArithOp::Mod => {
                    if r == 0 {
                        return Err(ArithError::DivisionByZero);
                    }
                    l.wrapping_rem(r)
                }
                ArithOp::Neg => unreachable!("handled above"),
            };
            Ok(Term::Number(v))
        }
        other => Ok(other.clone()),
    }
}

fn as_number(t: &Term) -> Result<i64, ArithError> {
    match t {
        Term::Number(n) => Ok(*n),
        _ => Err(ArithError::NonNumericOperand),
    }
}

/// Build a unary negation node. `Neg` only consumes its left operand; the
/// right slot is filled with [`Term::Infimum`] as an unused placeholder so
/// `Arith` can stay a uniform two-child node rather than growing a third,
/// arity-1 variant.
pub fn neg(operand: Term) -> Term {
    Term::Arith(ArithOp::Neg, Box::new(operand), Box::new(Term::Infimum))
}
