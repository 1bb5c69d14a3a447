//! Refinement actions
use std::fmt;

/// Action to perform on a node
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Action {
    /// Replace the node and its siblings with their parent
    Coarsen,
    /// Keep the node
    #[default]
    None,
    /// Replace the node with its children
    Refine,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Coarsen => write!(f, "coarsen"),
            Action::None => write!(f, "none"),
            Action::Refine => write!(f, "refine"),
        }
    }
}

/// Combine the votes of two indicators
///
/// A refine vote always wins, and a node is only coarsened if both indicators agree.
pub fn combine(a: Action, b: Action) -> Action {
    match (a, b) {
        (Action::Refine, _) | (_, Action::Refine) => Action::Refine,
        (Action::Coarsen, Action::Coarsen) => Action::Coarsen,
        _ => Action::None,
    }
}

/// Combine the votes of any number of indicators
///
/// Without votes the node is kept.
pub fn combine_all<I: IntoIterator<Item = Action>>(actions: I) -> Action {
    actions.into_iter().reduce(combine).unwrap_or_default()
}
