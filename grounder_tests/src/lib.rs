use grounder::atom::{Atom, Literal};
use grounder::config::Config;
use grounder::driver;
use grounder::error::Grounding;
use grounder::program::{Head, Program, Rule};

/// Parse and ground `text` under the default configuration, panicking with a
/// descriptive message on either failure.
pub fn ground_text(text: &str) -> Program {
    ground_text_with(text, &Config::default())
}

pub fn ground_text_with(text: &str, config: &Config) -> Program {
    let program = grounder::builder::parse_program(text).expect("parse failure");
    driver::ground(&program, config, None).expect("grounding failure")
}

pub fn try_ground_text(text: &str) -> Result<Program, Grounding> {
    let program = grounder::builder::parse_program(text).expect("parse failure");
    driver::ground(&program, &Config::default(), None)
}

/// Number of rules in `program` whose head derives `predicate`.
pub fn derives(program: &Program, predicate: &str) -> usize {
    program
        .rules
        .iter()
        .filter(|r| rule_derives(r, predicate))
        .count()
}

fn rule_derives(rule: &Rule, predicate: &str) -> bool {
    match &rule.head {
        Head::Empty => false,
        Head::Disjunction(atoms) => atoms.iter().any(|a| a.predicate.as_ref() == predicate),
        Head::Choice(choice) => choice.elements.iter().any(|el| el.atom.predicate.as_ref() == predicate),
    }
}

/// `true` iff every atom occurring as a head atom or a positive/negative
/// body literal has fully ground, `Arith`-free arguments, and every
/// aggregate literal's element list is fully enumerated (no element term
/// left as a free variable). A `Builtin` literal's own left/right terms are
/// not checked: the renderer keeps the original arithmetic expression
/// there as a record of what was checked, even once the variable it
/// range-restricts has been bound to a number.
pub fn atoms_are_fully_resolved(program: &Program) -> bool {
    program.rules.iter().all(rule_atoms_resolved)
}

fn rule_atoms_resolved(rule: &Rule) -> bool {
    let head_ok = match &rule.head {
        Head::Empty => true,
        Head::Disjunction(atoms) => atoms.iter().all(atom_resolved),
        Head::Choice(choice) => choice.elements.iter().all(|el| atom_resolved(&el.atom)),
    };
    head_ok
        && rule.body.iter().all(|lit| match lit {
            Literal::Positive(a) | Literal::Negative(a) => atom_resolved(a),
            Literal::Builtin(..) => true,
            Literal::Aggregate(agg) => agg
                .elements
                .iter()
                .all(|el| el.terms.iter().all(|t| t.is_ground())),
        })
}

fn atom_resolved(atom: &Atom) -> bool {
    atom.args.iter().all(|t| t.is_ground())
}
