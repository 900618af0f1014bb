//! Error kinds, namespaced by the component that raises them, matching §7.
//!
//! As with the rest of this crate, errors are plain enums rather than a
//! `thiserror`/`anyhow` wrapper: the intended use is to namespace errors via
//! the module, e.g. `use error::{self}; ... error::Safety { .. }`.

use crate::atom::SafetyError;
use crate::term::ArithError;
use std::rc::Rc;

/// A rule violates §4.2 safety. Fatal; aborts grounding before any output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Safety {
    pub rule_index: usize,
    pub unsafe_vars: Vec<Rc<str>>,
}

impl std::fmt::Display for Safety {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rule {} is unsafe: unsafe variables ", self.rule_index)?;
        for (i, v) in self.unsafe_vars.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

impl From<(usize, SafetyError)> for Safety {
    fn from((rule_index, e): (usize, SafetyError)) -> Self {
        Safety {
            rule_index,
            unsafe_vars: e.unsafe_vars,
        }
    }
}

/// A predicate name is used with inconsistent arities. Fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arity {
    pub predicate: Rc<str>,
    pub first_seen: usize,
    pub conflicting: usize,
}

impl std::fmt::Display for Arity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "predicate '{}' used with arity {} and arity {}",
            self.predicate, self.first_seen, self.conflicting
        )
    }
}

/// An invariant violation: non-ground output, or unresolved arithmetic on an
/// emitted rule. Fatal; indicates a bug in the instantiator or driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Internal {
    NonGroundOutput,
    UnresolvedArith,
    /// A component's fixed-point iteration exceeded
    /// [`crate::config::Config::max_iterations_per_component`] without
    /// converging. Not named in the original spec — a correctly
    /// safety-checked program always converges — but any implementation
    /// carrying an iteration budget needs a way to report hitting it.
    FixedPointDidNotConverge { component: usize },
}

impl std::fmt::Display for Internal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Internal::NonGroundOutput => write!(f, "grounding produced a non-ground rule"),
            Internal::UnresolvedArith => write!(f, "grounding emitted an unresolved arithmetic term"),
            Internal::FixedPointDidNotConverge { component } => {
                write!(f, "component {component} did not reach a fixed point within the iteration budget")
            }
        }
    }
}

/// Arithmetic or comparison failure during the match of a candidate
/// substitution. Per §4.4/§7 this is **not** an error: the instantiator
/// catches it and silently discards the substitution. Exposed here only so
/// [`crate::term::Term::eval_arith`]'s error type has a named home in the
/// error module's namespace convention; callers should not surface it.
pub type EvaluationDiscard = ArithError;

/// Every fatal error kind the driver can return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grounding {
    Safety(Safety),
    Arity(Arity),
    Internal(Internal),
}

impl std::fmt::Display for Grounding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Grounding::Safety(e) => write!(f, "{e}"),
            Grounding::Arity(e) => write!(f, "{e}"),
            Grounding::Internal(e) => write!(f, "{e}"),
        }
    }
}

impl From<Safety> for Grounding {
    fn from(e: Safety) -> Self {
        Grounding::Safety(e)
    }
}

impl From<Arity> for Grounding {
    fn from(e: Arity) -> Self {
        Grounding::Arity(e)
    }
}

impl From<Internal> for Grounding {
    fn from(e: Internal) -> Self {
        Grounding::Internal(e)
    }
}
