//! Reading and writing trees
//!
//! A tree is persisted as its spatial dimension, its node capacity, and for every node in arena
//! order the index of its parent and whether it has children. Location codes are not persisted:
//! they follow from the parent links. Only compact trees sorted in depth-first order can be
//! written, see [`crate::algorithms::dfs_sort`] and [`MultiTree::sort`].
use crate::algorithms::is_dfs_sorted;
use crate::grid::MultiTree;
use crate::traits::Location;
use crate::tree::Tree;
use crate::types::{Error, GridNodeIdx, NodeIdx, Result, SiblingsIdx};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct NodeRecord {
    parent: Option<NodeIdx>,
    has_children: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct TreeRecord {
    dimension: usize,
    node_capacity: usize,
    nodes: Vec<NodeRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct MultiTreeRecord {
    tree: TreeRecord,
    no_grids: usize,
    /// One row of `no_grids` entries per node
    grid_nodes: Vec<Option<GridNodeIdx>>,
}

impl TreeRecord {
    fn new<const D: usize, L: Location<D>>(tree: &Tree<D, L>) -> Result<Self> {
        if !tree.is_compact() {
            return Err(Error::NotCompact);
        }
        if !is_dfs_sorted(tree) {
            return Err(Error::NotSorted);
        }
        let nodes = (0..tree.size())
            .map(|i| NodeRecord {
                parent: tree.parent(NodeIdx(i)),
                has_children: tree.is_internal(NodeIdx(i)),
            })
            .collect();
        Ok(Self {
            dimension: D,
            node_capacity: tree.size(),
            nodes,
        })
    }

    fn into_tree<const D: usize, L: Location<D>>(self) -> Result<Tree<D, L>> {
        if self.dimension != D {
            return Err(Error::DimensionMismatch {
                expected: D,
                found: self.dimension,
            });
        }
        if self.nodes.len() != self.node_capacity {
            return Err(Error::Corrupted(format!(
                "node capacity {} but {} nodes stored",
                self.node_capacity,
                self.nodes.len()
            )));
        }
        let groups = Tree::<D, L>::no_sibling_groups(self.node_capacity);
        if groups == 0 || Tree::<D, L>::no_nodes(groups) != self.node_capacity {
            return Err(Error::Corrupted(format!(
                "{} nodes do not form complete sibling groups",
                self.node_capacity
            )));
        }

        let parents: Vec<Option<NodeIdx>> = (0..groups)
            .map(|s| self.nodes[Tree::<D, L>::first_node(SiblingsIdx(s)).0].parent)
            .collect();
        for (i, node) in self.nodes.iter().enumerate() {
            let s = Tree::<D, L>::sibling_group(NodeIdx(i));
            if node.parent != parents[s.0] {
                return Err(Error::Corrupted(format!(
                    "node {i} does not share the parent of its siblings"
                )));
            }
        }

        let tree = Tree::from_group_parents(parents)
            .ok_or_else(|| Error::Corrupted("parent links do not form a tree".to_string()))?;
        if let Some(i) = self
            .nodes
            .iter()
            .enumerate()
            .position(|(i, node)| node.has_children != tree.is_internal(NodeIdx(i)))
        {
            return Err(Error::Corrupted(format!(
                "children flag of node {i} does not match the parent links"
            )));
        }
        if tree.size() != self.node_capacity || !is_dfs_sorted(&tree) {
            return Err(Error::Corrupted(
                "nodes are not stored in depth-first order".to_string(),
            ));
        }
        Ok(tree)
    }
}

/// Write `tree` to `writer`
///
/// Fails with [`Error::NotCompact`] or [`Error::NotSorted`] if the tree is not compact or not
/// sorted in depth-first order.
pub fn write_tree<const D: usize, L: Location<D>, W: Write>(
    tree: &Tree<D, L>,
    writer: W,
) -> Result<()> {
    let record = TreeRecord::new(tree)?;
    bincode::serialize_into(writer, &record)?;
    Ok(())
}

/// Read a tree written by [`write_tree`] from `reader`
pub fn read_tree<const D: usize, L: Location<D>, R: Read>(reader: R) -> Result<Tree<D, L>> {
    let record: TreeRecord = bincode::deserialize_from(reader)?;
    record.into_tree()
}

/// Write `tree` and the nodes of all its grids to `writer`
///
/// The tree must be sorted, see [`MultiTree::sort`].
pub fn write_multi_tree<const D: usize, L: Location<D>, W: Write>(
    tree: &MultiTree<D, L>,
    writer: W,
) -> Result<()> {
    let record = TreeRecord::new(tree.tree())?;
    let grid_nodes = (0..tree.tree().size())
        .flat_map(|i| tree.grid_nodes(NodeIdx(i)))
        .collect();
    let record = MultiTreeRecord {
        tree: record,
        no_grids: tree.no_grids(),
        grid_nodes,
    };
    bincode::serialize_into(writer, &record)?;
    Ok(())
}

/// Read a multi-tree written by [`write_multi_tree`] from `reader`
pub fn read_multi_tree<const D: usize, L: Location<D>, R: Read>(
    reader: R,
) -> Result<MultiTree<D, L>> {
    let record: MultiTreeRecord = bincode::deserialize_from(reader)?;
    if record.no_grids == 0 {
        return Err(Error::Corrupted("no grids stored".to_string()));
    }
    if record.grid_nodes.len() != record.tree.node_capacity * record.no_grids {
        return Err(Error::Corrupted(format!(
            "{} grid nodes stored for {} nodes and {} grids",
            record.grid_nodes.len(),
            record.tree.node_capacity,
            record.no_grids
        )));
    }
    let tree = record.tree.into_tree()?;
    let no_grids = record.no_grids;
    Ok(MultiTree::from_parts(tree, no_grids, record.grid_nodes))
}
