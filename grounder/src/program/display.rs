//! Textual rendering per §6: a newline-separated list of rules, each
//! terminated by `.`, using the standard ASP surface syntax the external
//! parser and pretty-printer also use. Rendering is not part of the core
//! pipeline but is required to round-trip identity-preserving ground facts.

use super::{Directive, Head, Program, Rule};
use crate::atom::{Aggregate, Atom, ChoiceHead, Literal};
use std::fmt;

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.predicate)?;
        if !self.args.is_empty() {
            write!(f, "(")?;
            for (i, a) in self.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{a}")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some((op, t)) = &self.guard_left {
            write!(f, "{t} {op} ")?;
        }
        write!(f, "{}{{", self.fun)?;
        for (i, el) in self.elements.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write_element(f, &el.terms, &el.condition)?;
        }
        write!(f, "}}")?;
        if let Some((op, t)) = &self.guard_right {
            write!(f, " {op} {t}")?;
        }
        Ok(())
    }
}

fn write_element(f: &mut fmt::Formatter<'_>, terms: &[crate::term::Term], condition: &[Literal]) -> fmt::Result {
    for (i, t) in terms.iter().enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        write!(f, "{t}")?;
    }
    if !condition.is_empty() {
        write!(f, " : ")?;
        for (i, l) in condition.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{l}")?;
        }
    }
    Ok(())
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Positive(a) => write!(f, "{a}"),
            Literal::Negative(a) => write!(f, "not {a}"),
            Literal::Builtin(op, l, r) => write!(f, "{l} {op} {r}"),
            Literal::Aggregate(agg) => write!(f, "{agg}"),
        }
    }
}

impl fmt::Display for ChoiceHead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(t) = &self.lower {
            write!(f, "{t} ")?;
        }
        write!(f, "{{")?;
        for (i, el) in self.elements.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", el.atom)?;
            if !el.condition.is_empty() {
                write!(f, " : ")?;
                for (j, l) in el.condition.iter().enumerate() {
                    if j > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{l}")?;
                }
            }
        }
        write!(f, "}}")?;
        if let Some(t) = &self.upper {
            write!(f, " {t}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Head {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Head::Empty => Ok(()),
            Head::Disjunction(atoms) => {
                for (i, a) in atoms.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{a}")?;
                }
                Ok(())
            }
            Head::Choice(choice) => write!(f, "{choice}"),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.head)?;
        if !self.body.is_empty() {
            write!(f, " :- ")?;
            for (i, lit) in self.body.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{lit}")?;
            }
        }
        write!(f, ".")
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rule in &self.rules {
            writeln!(f, "{rule}")?;
        }
        for directive in &self.directives {
            writeln!(f, "{directive}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::CmpOp;
    use crate::term::Term;

    #[test]
    fn renders_a_fact() {
        let r = Rule::fact(Atom::new("p", [Term::num(1), Term::num(2)]));
        assert_eq!(r.to_string(), "p(1,2).");
    }

    #[test]
    fn renders_a_negative_literal_body() {
        let r = Rule::new(
            Head::single(Atom::new("r", [Term::var("X")])),
            vec![Literal::Negative(Atom::new("p", [Term::var("X")]))],
        );
        assert_eq!(r.to_string(), "r(X) :- not p(X).");
    }

    #[test]
    fn renders_a_constraint_with_builtin() {
        let r = Rule::new(
            Head::Empty,
            vec![
                Literal::Positive(Atom::new("n", [Term::var("X")])),
                Literal::Builtin(CmpOp::Gt, Term::var("X"), Term::num(3)),
            ],
        );
        assert_eq!(r.to_string(), ":- n(X), X > 3.");
    }
}
