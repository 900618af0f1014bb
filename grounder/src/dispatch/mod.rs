//! Dispatches for external observers of a grounding run.
//!
//! Dispatches have two uses, matching the teacher's own [Dispatch] design:
//! - communication after some procedure (a component finished, a rule was
//!   rejected by the safety analyzer), and
//! - optional observation of the dynamics of grounding while it runs (a
//!   derivation set grew, a rule was instantiated).
//!
//! Each dispatch is a small message of some pre-determined type; the driver
//! takes an optional dispatcher closure and never requires one — grounding
//! without an observer is the common case and costs nothing beyond a branch.

pub mod library;

/// Dispatch types.
#[derive(Clone, Debug)]
pub enum Dispatch {
    Delta(library::delta::Delta),
    Report(library::report::Report),
    Stat(library::stat::Stat),
}

/// The type every dispatcher closure implements.
pub type Dispatcher<'a> = dyn Fn(Dispatch) + 'a;

/// Ignores a dispatch; useful as an explicit no-op dispatcher in tests.
pub fn hand(_: Dispatch) {}
