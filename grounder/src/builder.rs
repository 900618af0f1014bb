//! Convenience construction and a minimal textual surface format.
//!
//! This is deliberately not a conformant ASP-Core-2 parser — the real
//! surface syntax is a separate, external concern per §6 — just enough
//! line-oriented syntax to build a [`Program`] by hand or from a short
//! string for CLI smoke-testing and demonstration.

use crate::atom::{AggFun, Aggregate, AggregateElement, Atom, ChoiceElement, ChoiceHead, CmpOp, Literal};
use crate::program::{Head, Program, Rule};
use crate::term::{ArithOp, Term};
use std::rc::Rc;

/// Build an [`Atom`]; a free function so callers can write `atom("p", [..])`
/// instead of `Atom::new`.
pub fn atom(predicate: impl Into<Rc<str>>, args: impl IntoIterator<Item = Term>) -> Atom {
    Atom::new(predicate, args)
}

/// Why [`parse_program`] rejected its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    UnexpectedEnd,
    Unexpected { found: String, expected: &'static str },
    InvalidNumber(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::UnexpectedEnd => write!(f, "unexpected end of input"),
            ParseError::Unexpected { found, expected } => {
                write!(f, "expected {expected}, found '{found}'")
            }
            ParseError::InvalidNumber(s) => write!(f, "invalid number literal '{s}'"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse a small program from the minimal textual surface format.
pub fn parse_program(text: &str) -> Result<Program, ParseError> {
    let tokens = lex(text)?;
    let mut parser = Parser { tokens: &tokens, pos: 0 };
    let mut program = Program::new();
    while !parser.at_end() {
        if let Some(Tok::Directive(text)) = parser.peek().cloned() {
            parser.pos += 1;
            program.add_directive(text.to_string());
        } else {
            let rule = parser.parse_rule()?;
            program.add_rule(rule);
        }
    }
    Ok(program)
}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Ident(Rc<str>),
    Variable(Rc<str>),
    Number(i64),
    Str(Rc<str>),
    Hash(Rc<str>),
    /// A `#show ...` directive, captured whole up to its terminating `.`.
    Directive(Rc<str>),
    Symbol(char),
    Op(&'static str),
}

fn lex(text: &str) -> Result<Vec<Tok>, ParseError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        if c == '%' {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            continue;
        }
        if c == '#' && starts_with_show(&chars, i + 1) {
            let start = i;
            let mut j = i;
            while j < chars.len() && chars[j] != '.' {
                j += 1;
            }
            let directive_text: String = chars[start..j].iter().collect();
            tokens.push(Tok::Directive(directive_text.trim().to_string().into()));
            i = if j < chars.len() { j + 1 } else { j };
            continue;
        }
        if c == '#' {
            let start = i + 1;
            let mut j = start;
            while j < chars.len() && (chars[j].is_alphanumeric() || chars[j] == '_') {
                j += 1;
            }
            tokens.push(Tok::Hash(chars[start..j].iter().collect::<String>().into()));
            i = j;
            continue;
        }
        if c.is_ascii_digit() {
            let start = i;
            let mut j = i;
            while j < chars.len() && chars[j].is_ascii_digit() {
                j += 1;
            }
            let s: String = chars[start..j].iter().collect();
            let n: i64 = s.parse().map_err(|_| ParseError::InvalidNumber(s.clone()))?;
            tokens.push(Tok::Number(n));
            i = j;
            continue;
        }
        if c == '"' {
            let mut j = i + 1;
            let mut s = String::new();
            while j < chars.len() && chars[j] != '"' {
                s.push(chars[j]);
                j += 1;
            }
            tokens.push(Tok::Str(s.into()));
            i = j + 1;
            continue;
        }
        if c.is_alphabetic() || c == '_' {
            let start = i;
            let mut j = i;
            while j < chars.len() && (chars[j].is_alphanumeric() || chars[j] == '_') {
                j += 1;
            }
            let s: String = chars[start..j].iter().collect();
            if s.chars().next().is_some_and(|c| c.is_uppercase()) || s == "_" {
                tokens.push(Tok::Variable(s.into()));
            } else {
                tokens.push(Tok::Ident(s.into()));
            }
            i = j;
            continue;
        }
        match c {
            '>' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(Tok::Op(">="));
                i += 2;
            }
            '<' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(Tok::Op("<="));
                i += 2;
            }
            '!' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(Tok::Op("!="));
                i += 2;
            }
            ':' if chars.get(i + 1) == Some(&'-') => {
                tokens.push(Tok::Op(":-"));
                i += 2;
            }
            '>' => {
                tokens.push(Tok::Op(">"));
                i += 1;
            }
            '<' => {
                tokens.push(Tok::Op("<"));
                i += 1;
            }
            '=' => {
                tokens.push(Tok::Op("="));
                i += 1;
            }
            '(' | ')' | ',' | '.' | ':' | '|' | '{' | '}' | ';' | '+' | '-' | '*' | '/' | '\\' => {
                tokens.push(Tok::Symbol(c));
                i += 1;
            }
            other => {
                return Err(ParseError::Unexpected {
                    found: other.to_string(),
                    expected: "a token",
                })
            }
        }
    }
    Ok(tokens)
}

fn starts_with_show(chars: &[char], from: usize) -> bool {
    let needle = ['s', 'h', 'o', 'w'];
    chars.get(from..from + needle.len()).is_some_and(|s| s == needle)
}

struct Parser<'a> {
    tokens: &'a [Tok],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Tok> {
        let t = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        t
    }

    fn expect_symbol(&mut self, c: char) -> Result<(), ParseError> {
        match self.bump() {
            Some(Tok::Symbol(s)) if s == c => Ok(()),
            Some(t) => Err(ParseError::Unexpected {
                found: format!("{t:?}"),
                expected: "a symbol",
            }),
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    fn eat_symbol(&mut self, c: char) -> bool {
        if matches!(self.peek(), Some(Tok::Symbol(s)) if *s == c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_op(&mut self, op: &str) -> bool {
        if matches!(self.peek(), Some(Tok::Op(s)) if *s == op) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_rule(&mut self) -> Result<Rule, ParseError> {
        if self.eat_op(":-") {
            let body = self.parse_body()?;
            self.expect_symbol('.')?;
            return Ok(Rule::new(Head::Empty, body));
        }

        let head = self.parse_head()?;
        let body = if self.eat_op(":-") { self.parse_body()? } else { Vec::new() };
        self.expect_symbol('.')?;
        Ok(Rule::new(head, body))
    }

    fn parse_head(&mut self) -> Result<Head, ParseError> {
        if matches!(self.peek(), Some(Tok::Symbol('{'))) || self.looks_like_choice_bound() {
            return self.parse_choice_head();
        }
        let mut atoms = vec![self.parse_atom()?];
        while self.eat_symbol('|') {
            atoms.push(self.parse_atom()?);
        }
        Ok(Head::Disjunction(atoms))
    }

    /// A choice head may be preceded by a lower-bound term, so `{` isn't
    /// always the first token; look ahead for `{` before the next `:-`/`.`.
    fn looks_like_choice_bound(&self) -> bool {
        let mut j = self.pos;
        while let Some(t) = self.tokens.get(j) {
            match t {
                Tok::Symbol('{') => return true,
                Tok::Op(":-") | Tok::Symbol('.') => return false,
                _ => j += 1,
            }
        }
        false
    }

    fn parse_choice_head(&mut self) -> Result<Head, ParseError> {
        let lower = if matches!(self.peek(), Some(Tok::Symbol('{'))) {
            None
        } else {
            Some(self.parse_term()?)
        };
        self.expect_symbol('{')?;
        let mut elements = Vec::new();
        if !matches!(self.peek(), Some(Tok::Symbol('}'))) {
            loop {
                let atom = self.parse_atom()?;
                let condition = if self.eat_symbol(':') { self.parse_body()? } else { Vec::new() };
                elements.push(ChoiceElement { atom, condition });
                if !self.eat_symbol(';') {
                    break;
                }
            }
        }
        self.expect_symbol('}')?;
        let upper = match self.peek() {
            Some(Tok::Op(":-")) | Some(Tok::Symbol('.')) | None => None,
            _ => Some(self.parse_term()?),
        };
        Ok(Head::Choice(ChoiceHead { lower, upper, elements }))
    }

    fn parse_body(&mut self) -> Result<Vec<Literal>, ParseError> {
        let mut lits = vec![self.parse_literal()?];
        while self.eat_symbol(',') {
            lits.push(self.parse_literal()?);
        }
        Ok(lits)
    }

    fn parse_literal(&mut self) -> Result<Literal, ParseError> {
        if matches!(self.peek(), Some(Tok::Ident(name)) if name.as_ref() == "not") {
            self.pos += 1;
            return Ok(Literal::Negative(self.parse_atom()?));
        }
        if matches!(self.peek(), Some(Tok::Hash(_))) {
            return Ok(Literal::Aggregate(self.parse_aggregate(None)?));
        }

        // Disambiguate a bare atom from `term cmp term` (possibly an
        // aggregate guard) by speculatively parsing a term and checking
        // what follows; back up if it turns out to just be an atom.
        let start = self.pos;
        if let Ok(term) = self.parse_term() {
            if let Some(op) = self.peek_cmp() {
                self.pos += 1;
                if matches!(self.peek(), Some(Tok::Hash(_))) {
                    return Ok(Literal::Aggregate(self.parse_aggregate(Some((op, term)))?));
                }
                let rhs = self.parse_term()?;
                return Ok(Literal::Builtin(op, term, rhs));
            }
        }
        self.pos = start;
        Ok(Literal::Positive(self.parse_atom()?))
    }

    fn peek_cmp(&self) -> Option<CmpOp> {
        match self.peek() {
            Some(Tok::Op("=")) => Some(CmpOp::Eq),
            Some(Tok::Op("!=")) => Some(CmpOp::Ne),
            Some(Tok::Op("<")) => Some(CmpOp::Lt),
            Some(Tok::Op("<=")) => Some(CmpOp::Le),
            Some(Tok::Op(">")) => Some(CmpOp::Gt),
            Some(Tok::Op(">=")) => Some(CmpOp::Ge),
            _ => None,
        }
    }

    fn parse_aggregate(&mut self, guard_left: Option<(CmpOp, Term)>) -> Result<Aggregate, ParseError> {
        let fun = match self.bump() {
            Some(Tok::Hash(name)) => match name.as_ref() {
                "count" => AggFun::Count,
                "sum" => AggFun::Sum,
                "min" => AggFun::Min,
                "max" => AggFun::Max,
                other => {
                    return Err(ParseError::Unexpected {
                        found: other.to_string(),
                        expected: "count|sum|min|max",
                    })
                }
            },
            _ => return Err(ParseError::UnexpectedEnd),
        };
        self.expect_symbol('{')?;
        let mut elements = Vec::new();
        if !matches!(self.peek(), Some(Tok::Symbol('}'))) {
            loop {
                let mut terms = vec![self.parse_term()?];
                while self.eat_symbol(',') {
                    terms.push(self.parse_term()?);
                }
                let condition = if self.eat_symbol(':') { self.parse_body()? } else { Vec::new() };
                elements.push(AggregateElement { terms, condition });
                if !self.eat_symbol(';') {
                    break;
                }
            }
        }
        self.expect_symbol('}')?;
        let guard_right = match self.peek_cmp() {
            Some(op) => {
                self.pos += 1;
                Some((op, self.parse_term()?))
            }
            None => None,
        };
        Ok(Aggregate { fun, guard_left, guard_right, elements })
    }

    fn parse_atom(&mut self) -> Result<Atom, ParseError> {
        let name = match self.bump() {
            Some(Tok::Ident(name)) => name,
            Some(t) => {
                return Err(ParseError::Unexpected {
                    found: format!("{t:?}"),
                    expected: "a predicate name",
                })
            }
            None => return Err(ParseError::UnexpectedEnd),
        };
        let args = if self.eat_symbol('(') {
            let mut args = vec![self.parse_term()?];
            while self.eat_symbol(',') {
                args.push(self.parse_term()?);
            }
            self.expect_symbol(')')?;
            args
        } else {
            Vec::new()
        };
        Ok(Atom::new(name, args))
    }

    fn parse_term(&mut self) -> Result<Term, ParseError> {
        let mut left = self.parse_arith_term()?;
        loop {
            if self.eat_symbol('+') {
                let right = self.parse_arith_term()?;
                left = Term::Arith(ArithOp::Add, Box::new(left), Box::new(right));
            } else if self.eat_symbol('-') {
                let right = self.parse_arith_term()?;
                left = Term::Arith(ArithOp::Sub, Box::new(left), Box::new(right));
            } else {
                break;
            }
        }
        Ok(left)
    }

    fn parse_arith_term(&mut self) -> Result<Term, ParseError> {
        let mut left = self.parse_arith_factor()?;
        loop {
            if self.eat_symbol('*') {
                let right = self.parse_arith_factor()?;
                left = Term::Arith(ArithOp::Mul, Box::new(left), Box::new(right));
            } else if self.eat_symbol('/') {
                let right = self.parse_arith_factor()?;
                left = Term::Arith(ArithOp::Div, Box::new(left), Box::new(right));
            } else if self.eat_symbol('\\') {
                let right = self.parse_arith_factor()?;
                left = Term::Arith(ArithOp::Mod, Box::new(left), Box::new(right));
            } else {
                break;
            }
        }
        Ok(left)
    }

    fn parse_arith_factor(&mut self) -> Result<Term, ParseError> {
        if self.eat_symbol('-') {
            let inner = self.parse_arith_factor()?;
            return Ok(Term::Arith(ArithOp::Neg, Box::new(inner), Box::new(Term::Infimum)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Term, ParseError> {
        match self.bump() {
            Some(Tok::Number(n)) => Ok(Term::Number(n)),
            Some(Tok::Str(s)) => Ok(Term::String(s)),
            Some(Tok::Variable(name)) if name.as_ref() == "_" => Ok(Term::AnonymousVariable(self.pos as u32)),
            Some(Tok::Variable(name)) => Ok(Term::Variable(name)),
            Some(Tok::Ident(name)) => {
                if self.eat_symbol('(') {
                    let mut args = vec![self.parse_term()?];
                    while self.eat_symbol(',') {
                        args.push(self.parse_term()?);
                    }
                    self.expect_symbol(')')?;
                    Ok(Term::func(name, args))
                } else {
                    Ok(Term::SymbolicConstant(name))
                }
            }
            Some(Tok::Symbol('(')) => {
                let mut args = vec![self.parse_term()?];
                while self.eat_symbol(',') {
                    args.push(self.parse_term()?);
                }
                self.expect_symbol(')')?;
                Ok(Term::TupleTerm(args))
            }
            Some(t) => Err(ParseError::Unexpected {
                found: format!("{t:?}"),
                expected: "a term",
            }),
            None => Err(ParseError::UnexpectedEnd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_fact() {
        let program = parse_program("p(1,2).").unwrap();
        assert_eq!(program.rules.len(), 1);
        assert!(program.rules[0].is_fact());
    }

    #[test]
    fn parses_a_rule_with_negation_and_builtin() {
        let program = parse_program("q(X) :- p(X), not r(X), X > 0.").unwrap();
        assert_eq!(program.rules[0].body.len(), 3);
    }

    #[test]
    fn parses_a_constraint() {
        let program = parse_program(":- p(X), X < 0.").unwrap();
        assert!(program.rules[0].is_constraint());
    }

    #[test]
    fn parses_a_choice_head() {
        let program = parse_program("1 { p(1); p(2); p(3) } 2.").unwrap();
        let Head::Choice(choice) = &program.rules[0].head else {
            panic!("expected a choice head");
        };
        assert_eq!(choice.elements.len(), 3);
    }

    #[test]
    fn parses_a_count_aggregate() {
        let program = parse_program("ok :- #count{ X : p(X) } = 2.").unwrap();
        assert_eq!(program.rules[0].body.len(), 1);
    }

    #[test]
    fn parses_a_show_directive() {
        let program = parse_program("p(1). #show p/1.").unwrap();
        assert_eq!(program.directives.len(), 1);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(parse_program("p(1").is_err());
    }
}
