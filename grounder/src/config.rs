//! Configuration for a grounding run.

/// Named default constants, mirrored on the teacher's `config::defaults`.
pub mod defaults {
    /// Safety valve: a component's semi-naive fixed-point loop aborts with
    /// [`crate::error::Internal::FixedPointDidNotConverge`] after this many
    /// passes without growth. A safety-checked program always converges far
    /// below this; it exists only to turn an instantiator bug into a
    /// reported error instead of an infinite loop.
    pub const MAX_ITERATIONS_PER_COMPONENT: usize = 1_000_000;
}

/// Whether choice-head atoms feed their own stratum's derivation sets while
/// that stratum is still being grounded.
///
/// This is the open question of §9: the source's intent is undocumented, so
/// the conservative, conventional gringo-like reading is taken as the
/// default — see `DESIGN.md`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChoiceFeedback {
    /// Choice-head atoms never contribute to the derivation set of the
    /// component currently being grounded (the default).
    Conservative,
    /// Choice-head atoms are added to the derivation set as soon as they are
    /// instantiated, same as an ordinary disjunctive head.
    Optimistic,
}

/// Whether an aggregate whose elements are already fully determined should
/// be eagerly collapsed to its computed value, or always emitted with
/// concrete enumerated elements for the solver to resolve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AggregateCollapse {
    /// Never collapse; always emit the full aggregate expression (the
    /// default, matching §4.4's stated policy).
    Never,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub choice_feedback: ChoiceFeedback,
    pub aggregate_collapse: AggregateCollapse,
    pub max_iterations_per_component: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            choice_feedback: ChoiceFeedback::Conservative,
            aggregate_collapse: AggregateCollapse::Never,
            max_iterations_per_component: defaults::MAX_ITERATIONS_PER_COMPONENT,
        }
    }
}
