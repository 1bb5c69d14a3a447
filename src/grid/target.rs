//! Adaptive mesh refinement of a solver grid
use super::client::SolverGrid;
use super::multi::MultiTree;
use crate::location::Interleaved;
use crate::traits::{AmrTarget, Location};
use crate::types::{GridNodeIdx, Level};
use log::warn;

type Transfer<'a> = Box<dyn FnMut(GridNodeIdx, &[GridNodeIdx]) + 'a>;

/// Adapts a [`SolverGrid`] on its [`MultiTree`]
///
/// Refining a grid node replaces it with grid nodes for its children and coarsening replaces a
/// sibling group with its parent. Solver data follows through the projection and restriction
/// callbacks, which receive the grid nodes of the parent and of the children.
pub struct GridTarget<'a, const D: usize, L: Location<D> = Interleaved<D>> {
    tree: &'a mut MultiTree<D, L>,
    grid: &'a mut SolverGrid,
    projection: Transfer<'a>,
    restriction: Transfer<'a>,
}

impl<'a, const D: usize, L: Location<D>> GridTarget<'a, D, L> {
    /// Create a target for `grid`, stored on `tree`
    pub fn new(tree: &'a mut MultiTree<D, L>, grid: &'a mut SolverGrid) -> Self {
        Self {
            tree,
            grid,
            projection: Box::new(|_, _| {}),
            restriction: Box::new(|_, _| {}),
        }
    }

    /// Call `projection(parent, children)` every time a grid node is refined
    pub fn with_projection<P: FnMut(GridNodeIdx, &[GridNodeIdx]) + 'a>(
        mut self,
        projection: P,
    ) -> Self {
        self.projection = Box::new(projection);
        self
    }

    /// Call `restriction(parent, children)` every time a sibling group is coarsened
    pub fn with_restriction<R: FnMut(GridNodeIdx, &[GridNodeIdx]) + 'a>(
        mut self,
        restriction: R,
    ) -> Self {
        self.restriction = Box::new(restriction);
        self
    }

    /// The tree
    pub fn tree(&self) -> &MultiTree<D, L> {
        &*self.tree
    }

    /// The grid
    pub fn grid(&self) -> &SolverGrid {
        &*self.grid
    }
}

impl<const D: usize, L: Location<D>> AmrTarget for GridTarget<'_, D, L> {
    type Node = GridNodeIdx;

    fn nodes(&self) -> Vec<GridNodeIdx> {
        self.grid.in_use().collect()
    }

    fn siblings(&self, n: GridNodeIdx) -> Vec<GridNodeIdx> {
        self.grid.siblings(&*self.tree, n).to_vec()
    }

    fn no_siblings(&self) -> usize {
        MultiTree::<D, L>::no_siblings()
    }

    fn neighbors(&self, n: GridNodeIdx) -> Vec<GridNodeIdx> {
        self.grid.neighbors(&*self.tree, n)
    }

    fn level(&self, n: GridNodeIdx) -> Level {
        self.grid.level(&*self.tree, n)
    }

    fn max_level(&self) -> Level {
        L::max_level()
    }

    fn refine(&mut self, n: GridNodeIdx) -> bool {
        let level = self.level(n);
        if level >= L::max_level() {
            warn!("Cannot refine grid node {n}: level {level} is the maximum level");
            return false;
        }
        let projection = &mut self.projection;
        self.grid.refine(&mut *self.tree, n, |p, c| projection(p, c));
        true
    }

    fn coarsen_siblings_of(&mut self, n: GridNodeIdx) -> bool {
        let restriction = &mut self.restriction;
        self.grid.coarsen(&mut *self.tree, n, |p, c| restriction(p, c));
        true
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::{GridIdx, NodeIdx};

    #[test]
    fn test_target() {
        let mut tree = MultiTree::<2>::new(1);
        let mut grid = SolverGrid::new(GridIdx(0));
        let root = grid.push(&mut tree, NodeIdx(0));
        let mut refined = vec![];
        let mut coarsened = vec![];
        {
            let mut target = GridTarget::new(&mut tree, &mut grid)
                .with_projection(|p, c| refined.push((p, c.len())))
                .with_restriction(|p, c| coarsened.push((p, c.len())));
            assert_eq!(target.nodes(), vec![root]);
            assert_eq!(target.no_siblings(), 4);
            target.refine(root);
            assert_eq!(target.nodes().len(), 4);
            assert_eq!(target.level(GridNodeIdx(1)), 1);
            assert_eq!(target.siblings(GridNodeIdx(1)).len(), 4);
            assert_eq!(target.neighbors(GridNodeIdx(1)).len(), 3);
            target.coarsen_siblings_of(GridNodeIdx(3));
            assert_eq!(target.nodes(), vec![GridNodeIdx(0)]);
        }
        assert_eq!(refined, vec![(root, 4)]);
        assert_eq!(coarsened, vec![(GridNodeIdx(0), 4)]);
        assert_eq!(tree.tree().size(), 1);
    }
}
