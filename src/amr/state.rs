//! Adaptive mesh refinement algorithm
use super::action::Action;
use crate::traits::AmrTarget;
use crate::types::Level;
use log::{debug, info, warn};

/// Options of the adaptive mesh refinement algorithm
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AmrOptions {
    /// Maximum number of iterations used to make the actions 2:1 balanced
    max_iterations: usize,
    /// Nodes at this level or deeper are never refined
    max_level: Option<Level>,
}

impl Default for AmrOptions {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            max_level: None,
        }
    }
}

impl AmrOptions {
    /// Set the maximum number of balancing iterations
    pub fn set_max_iterations(&mut self, max_iterations: usize) {
        assert!(max_iterations > 0, "at least one balancing iteration is needed");
        self.max_iterations = max_iterations;
    }

    /// Never refine nodes at `max_level` or deeper
    pub fn set_max_level(&mut self, max_level: Option<Level>) {
        self.max_level = max_level;
    }

    /// Maximum number of balancing iterations
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Level at which refinement stops
    pub fn max_level(&self) -> Option<Level> {
        self.max_level
    }
}

/// Outcome of one adaptation of a target
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AmrSummary {
    /// Did the target change?
    pub target_changed: bool,
    /// Number of target nodes before the adaptation
    pub nodes_before: usize,
    /// Number of target nodes after the adaptation
    pub nodes_after: usize,
    /// Number of refined nodes
    pub refined: usize,
    /// Number of coarsened sibling groups
    pub coarsened: usize,
    /// Number of balancing iterations
    pub iterations: usize,
}

/// Adaptive mesh refinement of a target
///
/// One adaptation computes an action for every node of the target, adjusts the actions so that
/// applying them keeps the target 2:1 balanced, and finally coarsens and refines the target.
pub struct Amr<T: AmrTarget> {
    target: T,
    options: AmrOptions,
    /// Nodes and their actions, sorted by node
    nodes: Vec<(T::Node, Action)>,
}

impl<T: AmrTarget> Amr<T> {
    /// Create the algorithm for `target` with default options
    pub fn new(target: T) -> Self {
        Self::with_options(target, AmrOptions::default())
    }

    /// Create the algorithm for `target`
    pub fn with_options(target: T, options: AmrOptions) -> Self {
        Self {
            target,
            options,
            nodes: vec![],
        }
    }

    /// The target
    pub fn target(&self) -> &T {
        &self.target
    }

    /// The target
    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    /// Release the target
    pub fn into_target(self) -> T {
        self.target
    }

    /// The options
    pub fn options(&self) -> &AmrOptions {
        &self.options
    }

    /// The nodes and their current actions, sorted by node
    pub fn actions(&self) -> &[(T::Node, Action)] {
        &self.nodes
    }

    /// Current action of node `n` (`None` if `n` is not a node of the target)
    pub fn action(&self, n: T::Node) -> Option<Action> {
        self.find(n).map(|i| self.nodes[i].1)
    }

    fn find(&self, n: T::Node) -> Option<usize> {
        self.nodes.binary_search_by(|(m, _)| m.cmp(&n)).ok()
    }

    /// Positions of the siblings of the node at position `i`, including `i`
    fn siblings(&self, i: usize) -> Vec<usize> {
        self.target
            .siblings(self.nodes[i].0)
            .into_iter()
            .filter_map(|s| self.find(s))
            .collect()
    }

    /// Positions of the neighbors of the node at position `i`
    fn neighbors(&self, i: usize) -> Vec<usize> {
        self.target
            .neighbors(self.nodes[i].0)
            .into_iter()
            .filter_map(|s| self.find(s))
            .collect()
    }

    fn level(&self, i: usize) -> Level {
        self.target.level(self.nodes[i].0)
    }

    fn set_actions(&mut self, positions: &[usize], action: Action) {
        for i in positions {
            self.nodes[*i].1 = action;
        }
    }

    /// Compute the action of every node of the target with `f`
    ///
    /// Refinement of nodes at or below the maximum level of the options, or at the deepest level
    /// of the target, is turned down.
    pub fn compute_actions<F: FnMut(T::Node) -> Action>(&mut self, mut f: F) {
        let max_level = self
            .options
            .max_level
            .map_or(self.target.max_level(), |l| l.min(self.target.max_level()));
        let mut nodes: Vec<_> = self
            .target
            .nodes()
            .into_iter()
            .map(|n| {
                let action = match f(n) {
                    Action::Refine if self.target.level(n) >= max_level => Action::None,
                    a => a,
                };
                (n, action)
            })
            .collect();
        nodes.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        self.nodes = nodes;
    }

    /// Step 1: a sibling group can only be coarsened if all its siblings are nodes of the target
    /// (none has children) and all are marked for coarsening
    fn keep_complete_coarse_groups(&mut self) -> bool {
        let mut done = true;
        for i in 0..self.nodes.len() {
            if self.nodes[i].1 != Action::Coarsen {
                continue;
            }
            let siblings = self.siblings(i);
            if siblings.len() == self.target.no_siblings()
                && siblings.iter().all(|s| self.nodes[*s].1 == Action::Coarsen)
            {
                continue;
            }
            for s in siblings {
                if self.nodes[s].1 == Action::Coarsen {
                    self.nodes[s].1 = Action::None;
                }
            }
            done = false;
        }
        debug!("AMR balancing step 1 done: {done}");
        done
    }

    /// Step 2: a sibling group cannot be coarsened if one of the siblings has a neighbor at the
    /// same level marked for refinement, or a finer neighbor not marked for coarsening
    fn keep_coarse_groups_balanced(&mut self) -> bool {
        let mut done = true;
        for i in 0..self.nodes.len() {
            if self.nodes[i].1 != Action::Coarsen {
                continue;
            }
            let level = self.level(i);
            let siblings = self.siblings(i);
            let blocked = siblings.iter().any(|s| {
                self.neighbors(*s).into_iter().any(|j| {
                    let (neighbor_level, action) = (self.level(j), self.nodes[j].1);
                    (neighbor_level == level && action == Action::Refine)
                        || (neighbor_level == level + 1 && action != Action::Coarsen)
                })
            });
            if blocked {
                self.set_actions(&siblings, Action::None);
                done = false;
            }
        }
        debug!("AMR balancing step 2 done: {done}");
        done
    }

    /// Step 3: coarser neighbors of a node marked for refinement, and their siblings, must be
    /// refined too
    fn refine_coarser_neighbors(&mut self) -> bool {
        let mut done = true;
        for i in 0..self.nodes.len() {
            if self.nodes[i].1 != Action::Refine {
                continue;
            }
            let level = self.level(i);
            for j in self.neighbors(i) {
                if self.level(j) < level && self.nodes[j].1 != Action::Refine {
                    let siblings = self.siblings(j);
                    self.nodes[j].1 = Action::Refine;
                    self.set_actions(&siblings, Action::Refine);
                    done = false;
                }
            }
        }
        debug!("AMR balancing step 3 done: {done}");
        done
    }

    /// Perform one iteration of the 2:1 balancing of the actions
    ///
    /// Returns whether the actions were already balanced.
    pub fn enforce_2_to_1_ratio_step(&mut self) -> bool {
        // All steps run even if an earlier one changed the actions
        let step1 = self.keep_complete_coarse_groups();
        let step2 = self.keep_coarse_groups_balanced();
        let step3 = self.refine_coarser_neighbors();
        step1 && step2 && step3
    }

    /// Make the actions 2:1 balanced
    ///
    /// Returns the number of iterations performed.
    pub fn enforce_2_to_1_ratio(&mut self) -> usize {
        for iteration in 1..=self.options.max_iterations {
            debug!("AMR balancing iteration {iteration}");
            if self.enforce_2_to_1_ratio_step() {
                return iteration;
            }
        }
        warn!(
            "AMR actions are not balanced after {} iterations",
            self.options.max_iterations
        );
        self.options.max_iterations
    }

    /// Apply the actions to the target
    ///
    /// Sibling groups marked for coarsening are coarsened first, once per group. Then the nodes
    /// marked for refinement are refined, coarsest first. Returns the number of refined nodes and
    /// of coarsened sibling groups; nodes the target turned down (for example because a cascade
    /// already refined them) are not counted.
    pub fn apply(&mut self) -> (usize, usize) {
        let mut coarsened = 0;
        for i in 0..self.nodes.len() {
            if self.nodes[i].1 != Action::Coarsen {
                continue;
            }
            let siblings = self.siblings(i);
            self.set_actions(&siblings, Action::None);
            if self.target.coarsen_siblings_of(self.nodes[i].0) {
                coarsened += 1;
            }
        }

        let mut to_refine: Vec<(Level, T::Node)> = self
            .nodes
            .iter()
            .filter(|(_, a)| *a == Action::Refine)
            .map(|(n, _)| (self.target.level(*n), *n))
            .collect();
        to_refine.sort_unstable();
        let mut refined = 0;
        for (_, n) in to_refine {
            if self.target.refine(n) {
                refined += 1;
            }
        }
        self.nodes.clear();
        (refined, coarsened)
    }

    /// Adapt the target to the actions computed by `f`
    pub fn adapt<F: FnMut(T::Node) -> Action>(&mut self, f: F) -> AmrSummary {
        self.compute_actions(f);
        let nodes_before = self.nodes.len();
        let iterations = self.enforce_2_to_1_ratio();
        let (refined, coarsened) = self.apply();
        let summary = AmrSummary {
            target_changed: refined > 0 || coarsened > 0,
            nodes_before,
            nodes_after: self.target.nodes().len(),
            refined,
            coarsened,
            iterations,
        };
        info!(
            "AMR summary: target changed: {}, nodes before/after: {}/{}, refined/coarsened: {}/{}, \
             iterations: {}",
            summary.target_changed,
            summary.nodes_before,
            summary.nodes_after,
            summary.refined,
            summary.coarsened,
            summary.iterations
        );
        summary
    }
}
