//! Structural edits of the TimeLine tree: inserting, removing, linking and
//! reordering nodes.
//!
//! Removal cascades: a TimeLine whose last node goes is dropped, which in
//! turn removes the branch linking it, which may empty the TimeLine above.
//! The cascade runs on an explicit work queue and stops at the first
//! TimeLine that keeps a node, so it is bounded by the depth of the tree.

use crate::error::{BoardError, BoardResult};
use crate::geometry::Point;
use crate::models::*;

use super::movement::{refresh_branch_connector, refresh_connectors, LINK_STEP};
use super::TimeBoard;

/// Offset from a new branch slot's top-right corner to its child TimeLine.
pub const BRANCH_OFFSET: Point = Point::new(100.0, 100.0);

/// Side of a reference node an insertion goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Above,
    Below,
}

impl Placement {
    fn insertion_index(self, reference_index: usize) -> usize {
        match self {
            Self::Above => reference_index,
            Self::Below => reference_index + 1,
        }
    }
}

impl TimeBoard {
    fn line_mut(&mut self, id: &TimeLineId) -> BoardResult<&mut TimeLine> {
        self.lines
            .get_mut(id)
            .ok_or_else(|| BoardError::UnknownTimeLine(id.clone()))
    }

    /// Refresh role tags and connector geometry after `id`'s sequence changed.
    fn restructured(&mut self, id: &TimeLineId) {
        if let Some(line) = self.lines.get_mut(id) {
            line.update_item_locations();
        }
        refresh_connectors(&mut self.lines, id);
    }

    // ============================================================
    // Items
    // ============================================================

    /// Insert `item` (a blank item when `None`) directly above `reference`.
    pub fn add_item_above(&mut self, reference: &NodeId, item: Option<TimeItem>) -> BoardResult<NodeId> {
        self.add_item(reference, Placement::Above, item)
    }

    /// Insert `item` (a blank item when `None`) directly below `reference`.
    pub fn add_item_below(&mut self, reference: &NodeId, item: Option<TimeItem>) -> BoardResult<NodeId> {
        self.add_item(reference, Placement::Below, item)
    }

    fn add_item(&mut self, reference: &NodeId, placement: Placement, item: Option<TimeItem>) -> BoardResult<NodeId> {
        let item = item.unwrap_or_default();
        if self.node(&item.id).is_ok() {
            return Err(BoardError::DuplicateNode(item.id));
        }

        let (owner, index) = self.locate(reference)?;
        let id = item.id.clone();
        self.line_mut(&owner)?
            .insert(placement.insertion_index(index), Node::Item(item));
        self.restructured(&owner);

        tracing::debug!("Added item {} to {}", id, owner);
        Ok(id)
    }

    /// Insert a copy of an item directly above it.
    pub fn duplicate_item(&mut self, id: &NodeId) -> BoardResult<NodeId> {
        let copy = self.item(id)?.extract_as_clone();
        self.add_item_above(id, Some(copy))
    }

    /// Remove a node. Removing a branch turns its child into a root;
    /// removing the last node of a TimeLine drops the TimeLine and cascades
    /// upward through its parent branch.
    pub fn remove_item(&mut self, id: &NodeId) -> BoardResult<()> {
        let (owner, _) = self.locate(id)?;
        self.remove_node_cascading(owner, id.clone());
        Ok(())
    }

    fn remove_node_cascading(&mut self, owner: TimeLineId, node: NodeId) {
        let mut queue = vec![(owner, node)];

        while let Some((line_id, node_id)) = queue.pop() {
            let Some(line) = self.lines.get_mut(&line_id) else {
                continue;
            };
            let Some(index) = line.index_of(&node_id) else {
                continue;
            };

            let removed = line.remove(index);
            let now_empty = line.is_empty();
            let parent = line.parent().cloned();

            if let Node::Branch(branch) = &removed {
                let link = BranchRef {
                    time_line: line_id.clone(),
                    branch: branch.id.clone(),
                };
                self.detach_from_time_branch(branch.child(), &link);
            }

            if now_empty {
                if let Some(parent) = parent {
                    tracing::debug!("Time line {} emptied, removing branch {}", line_id, parent.branch);
                    queue.push((parent.time_line, parent.branch));
                }
                self.drop_time_line(&line_id);
            } else {
                self.restructured(&line_id);
            }
        }
    }

    // ============================================================
    // Branches
    // ============================================================

    /// Insert a branch above `reference` linking `child`. `child` is first
    /// moved (with its subtree) to the right of the owning TimeLine if needed
    /// and is detached from any previous parent.
    pub fn link_item_above(&mut self, reference: &NodeId, child: &TimeLineId) -> BoardResult<NodeId> {
        self.link_item(reference, Placement::Above, child)
    }

    /// Insert a branch below `reference` linking `child`.
    pub fn link_item_below(&mut self, reference: &NodeId, child: &TimeLineId) -> BoardResult<NodeId> {
        self.link_item(reference, Placement::Below, child)
    }

    fn link_item(&mut self, reference: &NodeId, placement: Placement, child: &TimeLineId) -> BoardResult<NodeId> {
        let (owner, index) = self.locate(reference)?;
        self.time_line(child)?;
        self.check_link(&owner, child)?;

        self.ensure_linked_to_the_right(&owner, child)?;
        let id = self.insert_branch(&owner, placement.insertion_index(index), child, Connector::default())?;

        tracing::info!("Linked {} below {} via branch {}", child, owner, id);
        Ok(id)
    }

    /// Extension point clicked next to `reference`: link the pending link
    /// target there if there is one, otherwise add a blank item.
    pub fn extend_at(&mut self, reference: &NodeId, placement: Placement) -> BoardResult<NodeId> {
        match self.linkable.clone() {
            Some(target) => {
                let id = self.link_item(reference, placement, &target)?;
                self.reset_linkable_item();
                Ok(id)
            }
            None => self.add_item(reference, placement, None),
        }
    }

    /// Insert a branch above `item` leading to a new TimeLine.
    pub fn branch_above(&mut self, item: &NodeId) -> BoardResult<TimeLineId> {
        self.create_branch(item, Placement::Above)
    }

    /// Insert a branch below `item` leading to a new TimeLine.
    pub fn branch_below(&mut self, item: &NodeId) -> BoardResult<TimeLineId> {
        self.create_branch(item, Placement::Below)
    }

    fn create_branch(&mut self, reference: &NodeId, placement: Placement) -> BoardResult<TimeLineId> {
        let (owner, index) = self.locate(reference)?;
        let at = placement.insertion_index(index);

        let (top_left, bottom_right) = self.time_line(&owner)?.slot_rect(at);
        let corner = Point::new(bottom_right.x, top_left.y) + BRANCH_OFFSET;
        let start = self.grid.snap_forward(corner);
        let pos = self.find_free_item_spot(start, LINK_STEP);

        let child = self.create_item_at(pos)?;
        self.insert_branch(&owner, at, &child, Connector::default())?;
        Ok(child)
    }

    /// Point an existing branch at another TimeLine. The old child becomes
    /// a root; the new child loses its previous parent branch.
    pub fn set_branch_child(&mut self, branch: &NodeId, child: &TimeLineId) -> BoardResult<()> {
        let (owner, _) = self.locate(branch)?;
        let current = self.branch(branch)?.child().clone();
        self.time_line(child)?;
        if &current == child {
            return Ok(());
        }
        self.check_link(&owner, child)?;

        let link = BranchRef {
            time_line: owner.clone(),
            branch: branch.clone(),
        };
        self.detach_from_time_branch(&current, &link);
        if let Some(node) = self.line_mut(&owner)?.node_mut(branch).and_then(Node::as_branch_mut) {
            node.set_child(child.clone());
        }
        self.attach_to_time_branch(&owner, branch, child);
        Ok(())
    }

    pub fn set_split_ratio(&mut self, branch: &NodeId, ratio: f64) -> BoardResult<()> {
        let (owner, _) = self.locate(branch)?;
        self.line_mut(&owner)?
            .node_mut(branch)
            .and_then(Node::as_branch_mut)
            .ok_or_else(|| BoardError::NotABranch(branch.clone()))?
            .connector_mut()
            .set_split_ratio(ratio);
        Ok(())
    }

    /// Remove the branch linking `id`, making it a root. Returns whether
    /// there was a parent.
    pub fn unlink_from_parent(&mut self, id: &TimeLineId) -> BoardResult<bool> {
        let Some(parent) = self.time_line(id)?.parent().cloned() else {
            return Ok(false);
        };
        self.remove_node_cascading(parent.time_line, parent.branch);
        Ok(true)
    }

    /// Reject links that would make `owner` hang below `child`.
    fn check_link(&self, owner: &TimeLineId, child: &TimeLineId) -> BoardResult<()> {
        if self.is_in_subtree(child, owner) {
            return Err(BoardError::WouldCreateCycle {
                owner: owner.clone(),
                child: child.clone(),
            });
        }
        Ok(())
    }

    fn insert_branch(
        &mut self,
        owner: &TimeLineId,
        index: usize,
        child: &TimeLineId,
        connector: Connector,
    ) -> BoardResult<NodeId> {
        let id = NodeId::generate();
        self.line_mut(owner)?.insert(
            index,
            Node::Branch(TimeBranch::new(id.clone(), child.clone(), connector)),
        );
        self.attach_to_time_branch(owner, &id, child);
        self.restructured(owner);
        Ok(id)
    }

    /// Make `branch` in `owner` the only parent of `child`. A previous
    /// parent branch is removed from its TimeLine, cascading as usual.
    fn attach_to_time_branch(&mut self, owner: &TimeLineId, branch: &NodeId, child: &TimeLineId) {
        let link = BranchRef {
            time_line: owner.clone(),
            branch: branch.clone(),
        };

        let previous = self.lines.get(child).and_then(|line| line.parent().cloned());
        if let Some(previous) = previous.filter(|previous| previous != &link) {
            tracing::debug!("Time line {} leaves branch {}", child, previous.branch);
            self.remove_node_cascading(previous.time_line, previous.branch);
        }

        if let Some(line) = self.lines.get_mut(child) {
            line.set_parent(Some(link));
            line.update_item_locations();
        }
        refresh_branch_connector(&mut self.lines, owner, branch);
    }

    /// Clear `child`'s back-reference if it still points at `link`.
    fn detach_from_time_branch(&mut self, child: &TimeLineId, link: &BranchRef) {
        if let Some(line) = self.lines.get_mut(child) {
            if line.parent() == Some(link) {
                line.set_parent(None);
                line.update_item_locations();
            }
        }
    }

    // ============================================================
    // Reordering
    // ============================================================

    /// Move `node` into `target` right below `reference`, or to the front
    /// when `reference` is `None`. The node is re-created under a new id
    /// (a moved branch keeps its child and connector) and the original is
    /// removed, which may cascade in its old TimeLine. Returns the new id.
    pub fn insert_item_below(
        &mut self,
        target: &TimeLineId,
        node: &NodeId,
        reference: Option<&NodeId>,
    ) -> BoardResult<NodeId> {
        let (owner, _) = self.locate(node)?;
        let target_line = self.time_line(target)?;
        if reference == Some(node) {
            return Ok(node.clone());
        }
        let index = match reference {
            Some(r) => {
                target_line
                    .index_of(r)
                    .ok_or_else(|| BoardError::UnknownNode(r.clone()))?
                    + 1
            }
            None => 0,
        };

        let original = self.node(node)?;
        if let Node::Branch(branch) = original {
            self.check_link(target, branch.child())?;
        }
        let copy = original.extract_as_clone();
        let copy_id = copy.id().clone();
        let moved_child = copy.as_branch().map(|branch| branch.child().clone());

        self.line_mut(target)?.insert(index, copy);
        if let Some(child) = moved_child {
            // The link moves with the copy; the original no longer owns it.
            if let Some(line) = self.lines.get_mut(&child) {
                line.set_parent(Some(BranchRef {
                    time_line: target.clone(),
                    branch: copy_id.clone(),
                }));
            }
        }

        self.remove_node_cascading(owner, node.clone());
        self.restructured(target);

        tracing::debug!("Moved node {} to {} as {}", node, target, copy_id);
        Ok(copy_id)
    }

    /// Drop `node` onto `target_node`: the upper half inserts above it, the
    /// lower half below it. Dropping a node onto itself leaves it in place.
    pub fn drop_on(&mut self, node: &NodeId, target_node: &NodeId, upper_half: bool) -> BoardResult<NodeId> {
        if node == target_node {
            self.locate(node)?;
            return Ok(node.clone());
        }
        let (target, index) = self.locate(target_node)?;
        let reference = if upper_half {
            match index.checked_sub(1) {
                Some(above) => Some(self.time_line(&target)?.slots()[above].node.id().clone()),
                None => None,
            }
        } else {
            Some(target_node.clone())
        };
        self.insert_item_below(&target, node, reference.as_ref())
    }

    // ============================================================
    // Item content
    // ============================================================

    /// Run `f` on a TimeItem in place.
    pub fn edit_item<R>(&mut self, id: &NodeId, f: impl FnOnce(&mut TimeItem) -> R) -> BoardResult<R> {
        let node = self
            .lines
            .values_mut()
            .find_map(|line| line.node_mut(id))
            .ok_or_else(|| BoardError::UnknownNode(id.clone()))?;
        let item = node
            .as_item_mut()
            .ok_or_else(|| BoardError::NotAnItem(id.clone()))?;
        Ok(f(item))
    }

    pub fn set_item_color(&mut self, id: &NodeId, color: Option<String>) -> BoardResult<()> {
        self.edit_item(id, |item| item.color = color)
    }

    /// Copy the color of the item above; a branch or nothing above clears it.
    pub fn color_as_above(&mut self, id: &NodeId) -> BoardResult<()> {
        let (owner, _) = self.locate(id)?;
        let color = self.time_line(&owner)?.above_item_color(id).map(str::to_string);
        self.set_item_color(id, color)
    }

    /// Copy the color of the item below; a branch or nothing below clears it.
    pub fn color_as_below(&mut self, id: &NodeId) -> BoardResult<()> {
        let (owner, _) = self.locate(id)?;
        let color = self.time_line(&owner)?.below_item_color(id).map(str::to_string);
        self.set_item_color(id, color)
    }
}
