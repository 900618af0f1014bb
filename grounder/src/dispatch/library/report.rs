//! Details on the result of some procedure.

use crate::error::Safety;

#[derive(Clone, Debug)]
pub enum Report {
    Driver(self::Driver),
    Finish,
}

/// Progress reports from the [driver](crate::driver).
#[derive(Clone, Debug)]
pub enum Driver {
    /// A rule failed the safety analyzer and grounding aborted.
    SafetyRejected(Safety),
    /// Every rule in the component intersecting `heads` predicates reached a
    /// fixed point after `passes` passes.
    ComponentGrounded { component: usize, passes: usize },
}

impl std::fmt::Display for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Driver::SafetyRejected(e) => write!(f, "safety rejected: {e}"),
            Driver::ComponentGrounded { component, passes } => {
                write!(f, "component {component} grounded in {passes} passes")
            }
        }
    }
}
