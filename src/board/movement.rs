//! Moving TimeLines around and keeping connector geometry in step.

use crate::error::{BoardError, BoardResult};
use crate::geometry::Point;
use crate::models::{Node, NodeId, TimeLineId};

use super::{Lines, Selection, TimeBoard};

/// Minimal horizontal gap between a TimeLine and a child linked to it.
pub const LINK_MARGIN: f64 = 50.0;
/// Step used when searching a free spot for a linked or branched child.
pub const LINK_STEP: Point = Point::new(0.0, 100.0);

/// Recompute one branch connector from the current positions of both ends.
pub(crate) fn refresh_branch_connector(lines: &mut Lines, owner: &TimeLineId, branch: &NodeId) {
    let Some(line) = lines.get(owner) else {
        return;
    };
    let Some(index) = line.index_of(branch) else {
        return;
    };
    let start = line.branch_start(index);
    let Some(child) = line.slots()[index].node.as_branch().map(|b| b.child().clone()) else {
        return;
    };
    let Some(end) = lines.get(&child).map(|c| c.attachment_point()) else {
        return;
    };

    if let Some(connector) = lines
        .get_mut(owner)
        .and_then(|line| line.node_mut(branch))
        .and_then(Node::as_branch_mut)
        .map(|branch| branch.connector_mut())
    {
        connector.set_path(start, end);
    }
}

/// Recompute the incoming connector and every outgoing connector of `id`.
pub(crate) fn refresh_connectors(lines: &mut Lines, id: &TimeLineId) {
    let Some(line) = lines.get(id) else {
        return;
    };
    let parent = line.parent().cloned();
    let branches: Vec<NodeId> = line.branches().map(|b| b.id.clone()).collect();

    if let Some(parent) = parent {
        refresh_branch_connector(lines, &parent.time_line, &parent.branch);
    }
    for branch in branches {
        refresh_branch_connector(lines, id, &branch);
    }
}

/// Translate one member of `selection` and fix up the connectors touching it.
///
/// A connector whose both ends are selected moves rigidly with the owner;
/// one with a single selected end is recomputed.
pub(crate) fn move_in_selection(
    lines: &mut Lines,
    selection: &Selection,
    id: &TimeLineId,
    vector: Point,
) {
    let Some(line) = lines.get_mut(id) else {
        return;
    };
    line.translate(vector);

    let parent = line.parent().cloned();
    let branches: Vec<(NodeId, TimeLineId)> = line
        .branches()
        .map(|b| (b.id.clone(), b.child().clone()))
        .collect();

    if let Some(parent) = parent {
        if !selection.has(&parent.time_line) {
            refresh_branch_connector(lines, &parent.time_line, &parent.branch);
        }
    }

    for (branch, child) in branches {
        if selection.has(&child) {
            if let Some(connector) = lines
                .get_mut(id)
                .and_then(|line| line.node_mut(&branch))
                .and_then(Node::as_branch_mut)
                .map(|branch| branch.connector_mut())
            {
                connector.translate(vector);
            }
        } else {
            refresh_branch_connector(lines, id, &branch);
        }
    }
}

impl TimeBoard {
    /// Move every selected TimeLine by `vector`, all or nothing.
    pub fn move_selection(&mut self, vector: Point) -> bool {
        self.selection.move_by(&mut self.lines, vector)
    }

    /// Drag target for a TimeLine. The location is snapped to the grid;
    /// locations off the board are ignored. A selected TimeLine drags the
    /// whole selection along. Returns whether anything moved.
    pub fn reposition(&mut self, id: &TimeLineId, location: Point) -> BoardResult<bool> {
        let current = self.time_line(id)?.position();
        let target = self.grid.snap(location);
        if !target.is_non_negative() {
            return Ok(false);
        }

        if self.selection.has(id) {
            return Ok(self.move_selection(target - current));
        }

        if target == current {
            return Ok(false);
        }

        if let Some(line) = self.lines.get_mut(id) {
            line.set_position(target);
        }
        refresh_connectors(&mut self.lines, id);
        tracing::debug!("Moved time line {} to {}", id, target);
        Ok(true)
    }

    /// Resize a TimeLine to the base width plus `offset`.
    pub fn resize_width(&mut self, id: &TimeLineId, offset: f64) -> BoardResult<()> {
        self.lines
            .get_mut(id)
            .ok_or_else(|| BoardError::UnknownTimeLine(id.clone()))?
            .resize_width(offset);
        refresh_connectors(&mut self.lines, id);
        Ok(())
    }

    /// Push `child` and its subtree right of `owner` if it sits too close or
    /// to the left, stepping down until a free spot is found.
    pub(crate) fn ensure_linked_to_the_right(&mut self, owner: &TimeLineId, child: &TimeLineId) -> BoardResult<()> {
        let owner_line = self.time_line(owner)?;
        let minimal_x = owner_line.position().x + owner_line.width() + LINK_MARGIN;
        let child_pos = self.time_line(child)?.position();

        if child_pos.x >= minimal_x {
            return Ok(());
        }

        let target = self.find_free_item_spot(child_pos.with_x(minimal_x), LINK_STEP);
        let group: Selection = self.subtree(child).into_iter().collect();
        if group.move_by(&mut self.lines, target - child_pos) {
            tracing::debug!("Moved {} and {} descendants to {}", child, group.len() - 1, target);
        }
        Ok(())
    }
}
