#[derive(Clone, Debug)]
pub enum Stat {
    /// Candidate substitutions considered for one rule during one pass.
    SubstitutionsConsidered(usize),
    /// Ground rules emitted for one rule during one pass.
    RulesEmitted(usize),
    /// Total size of a predicate's derivation set once its component froze.
    DerivationSetSize { predicate: crate::interner::PredicateId, size: usize },
}
