//! Rules and programs — the external AST contract the grounder consumes and
//! produces (§6).

mod display;

use crate::atom::{check_safety, Atom, ChoiceHead, Literal, SafetyError};
use std::rc::Rc;

/// A rule's head: a disjunction of atoms, a choice construct, or empty (an
/// integrity constraint).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Head {
    Empty,
    Disjunction(Vec<Atom>),
    Choice(ChoiceHead),
}

impl Head {
    pub fn single(atom: Atom) -> Head {
        Head::Disjunction(vec![atom])
    }

    pub fn free_vars(&self, out: &mut Vec<Rc<str>>) {
        match self {
            Head::Empty => {}
            Head::Disjunction(atoms) => {
                for a in atoms {
                    a.free_vars(out);
                }
            }
            Head::Choice(choice) => {
                if let Some(t) = &choice.lower {
                    t.free_vars(out);
                }
                if let Some(t) = &choice.upper {
                    t.free_vars(out);
                }
                for el in &choice.elements {
                    el.atom.free_vars(out);
                    // Condition-local variables are scoped to the element,
                    // not free in the enclosing rule.
                }
            }
        }
    }

    /// The predicates this head may derive, for dependency-graph edges.
    pub fn head_predicates(&self) -> Vec<(Rc<str>, usize)> {
        match self {
            Head::Empty => vec![],
            Head::Disjunction(atoms) => atoms.iter().map(|a| (a.predicate.clone(), a.arity())).collect(),
            Head::Choice(choice) => choice
                .elements
                .iter()
                .map(|el| (el.atom.predicate.clone(), el.atom.arity()))
                .collect(),
        }
    }
}

/// A single rule: `head :- body.` A fact has an empty body; a constraint has
/// an empty head.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Rule {
    pub head: Head,
    pub body: Vec<Literal>,
}

impl Rule {
    pub fn new(head: Head, body: Vec<Literal>) -> Self {
        Rule { head, body }
    }

    pub fn fact(atom: Atom) -> Self {
        Rule {
            head: Head::single(atom),
            body: vec![],
        }
    }

    pub fn is_fact(&self) -> bool {
        self.body.is_empty() && matches!(self.head, Head::Disjunction(_))
    }

    pub fn is_constraint(&self) -> bool {
        matches!(self.head, Head::Empty)
    }

    pub fn is_ground(&self) -> bool {
        let mut vars = Vec::new();
        self.free_vars(&mut vars);
        vars.is_empty()
    }

    pub fn free_vars(&self, out: &mut Vec<Rc<str>>) {
        self.head.free_vars(out);
        for lit in &self.body {
            lit.free_vars(out);
        }
    }

    /// Run the §4.2 safety analyzer over this rule, returning the `pos_vars`
    /// fixpoint the instantiator can reuse to plan a matching order.
    pub fn check_safety(&self) -> Result<Vec<Rc<str>>, SafetyError> {
        let mut head_vars = Vec::new();
        self.head.free_vars(&mut head_vars);
        check_safety(&head_vars, &self.body)
    }

    /// Every predicate occurrence in the body, tagged by polarity, for the
    /// dependency analyzer. Aggregate element conditions contribute their
    /// own occurrences too (they are ordinary literals once ungrounded).
    pub fn body_predicate_occurrences(&self) -> Vec<((Rc<str>, usize), bool)> {
        let mut out = Vec::new();
        for lit in &self.body {
            collect_literal_occurrences(lit, &mut out);
        }
        out
    }
}

fn collect_literal_occurrences(lit: &Literal, out: &mut Vec<((Rc<str>, usize), bool)>) {
    match lit {
        Literal::Positive(a) => out.push(((a.predicate.clone(), a.arity()), true)),
        Literal::Negative(a) => out.push(((a.predicate.clone(), a.arity()), false)),
        Literal::Builtin(..) => {}
        Literal::Aggregate(agg) => {
            for el in &agg.elements {
                for l in &el.condition {
                    collect_literal_occurrences(l, out);
                }
            }
        }
    }
}

/// A directive (e.g. `#show`); opaque to grounding, carried through unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Directive {
    pub text: String,
}

/// An ordered sequence of rules plus a set of opaque directives — the input
/// and output AST contract of §6.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Program {
    pub rules: Vec<Rule>,
    pub directives: Vec<Directive>,
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }

    pub fn add_rule(&mut self, rule: Rule) -> &mut Self {
        self.rules.push(rule);
        self
    }

    pub fn add_fact(&mut self, atom: Atom) -> &mut Self {
        self.rules.push(Rule::fact(atom));
        self
    }

    pub fn add_directive(&mut self, text: impl Into<String>) -> &mut Self {
        self.directives.push(Directive { text: text.into() });
        self
    }

    /// `true` once every rule is ground — the output contract's invariant (i).
    pub fn is_ground(&self) -> bool {
        self.rules.iter().all(Rule::is_ground)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Term;

    #[test]
    fn fact_has_empty_body_and_is_a_fact() {
        let r = Rule::fact(Atom::new("p", [Term::num(1)]));
        assert!(r.is_fact());
        assert!(!r.is_constraint());
    }

    #[test]
    fn constraint_has_empty_head() {
        let r = Rule::new(Head::Empty, vec![Literal::Positive(Atom::new("p", []))]);
        assert!(r.is_constraint());
        assert!(!r.is_fact());
    }
}
