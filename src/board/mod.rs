//! The board: every TimeLine of a document plus the transient editing state
//! around them (selection, pending link target, stacking order, viewport).
//!
//! TimeLines live in an insertion-ordered arena keyed by [`TimeLineId`].
//! Whether a TimeLine is a root is always derived from its back-reference;
//! there is no separate index of roots that could drift.

mod edit;
mod movement;
mod selection;

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::error::{BoardError, BoardResult};
use crate::geometry::{Grid, Point};
use crate::models::*;

pub use edit::{Placement, BRANCH_OFFSET};
pub use movement::{LINK_MARGIN, LINK_STEP};
pub use selection::Selection;

pub(crate) type Lines = IndexMap<TimeLineId, TimeLine>;

/// Space kept free past the right-most and bottom-most TimeLine.
pub const EXTENT_MARGIN: f64 = 200.0;
/// Offset from the viewport origin where new TimeLines are placed.
pub const NEW_ITEM_OFFSET: Point = Point::new(100.0, 100.0);
/// Step used to find a free spot for a new top-level TimeLine.
pub const NEW_ITEM_STEP: Point = Point::new(100.0, 0.0);

/// Which TimeItems [`TimeBoard::find_items_in_order`] collects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemFilter {
    /// Items whose own color equals the given color.
    Color(String),
    /// Items tagged with the given category color.
    Category(String),
}

impl ItemFilter {
    pub fn matches(&self, item: &TimeItem) -> bool {
        match self {
            Self::Color(color) => item.color.as_deref() == Some(color.as_str()),
            Self::Category(category) => item.has_category(category),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TimeBoard {
    lines: Lines,
    grid: Grid,
    selection: Selection,
    linkable: Option<TimeLineId>,
    top: Option<TimeLineId>,
    viewport: Point,
}

impl TimeBoard {
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            ..Self::default()
        }
    }

    /// Assemble a board from fully linked TimeLines, e.g. after loading.
    /// Role tags and connector geometry are recomputed here.
    pub(crate) fn from_lines(mut lines: Lines, grid: Grid, viewport: Point) -> Self {
        let ids: Vec<TimeLineId> = lines.keys().cloned().collect();
        for id in &ids {
            if let Some(line) = lines.get_mut(id) {
                line.update_item_locations();
            }
        }
        for id in &ids {
            movement::refresh_connectors(&mut lines, id);
        }

        Self {
            lines,
            grid,
            viewport,
            ..Self::default()
        }
    }

    // ============================================================
    // Queries
    // ============================================================

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn contains(&self, id: &TimeLineId) -> bool {
        self.lines.contains_key(id)
    }

    pub fn time_line(&self, id: &TimeLineId) -> BoardResult<&TimeLine> {
        self.lines
            .get(id)
            .ok_or_else(|| BoardError::UnknownTimeLine(id.clone()))
    }

    /// All TimeLines in board order.
    pub fn time_lines(&self) -> impl Iterator<Item = &TimeLine> + '_ {
        self.lines.values()
    }

    /// TimeLines no branch links to.
    pub fn roots(&self) -> impl Iterator<Item = &TimeLine> + '_ {
        self.lines.values().filter(|line| line.is_root())
    }

    /// The TimeLine holding `node` and the node's index in it.
    pub fn locate(&self, node: &NodeId) -> BoardResult<(TimeLineId, usize)> {
        self.lines
            .values()
            .find_map(|line| line.index_of(node).map(|i| (line.id.clone(), i)))
            .ok_or_else(|| BoardError::UnknownNode(node.clone()))
    }

    pub fn node(&self, id: &NodeId) -> BoardResult<&Node> {
        self.lines
            .values()
            .find_map(|line| line.node(id))
            .ok_or_else(|| BoardError::UnknownNode(id.clone()))
    }

    pub fn item(&self, id: &NodeId) -> BoardResult<&TimeItem> {
        self.node(id)?
            .as_item()
            .ok_or_else(|| BoardError::NotAnItem(id.clone()))
    }

    pub fn branch(&self, id: &NodeId) -> BoardResult<&TimeBranch> {
        self.node(id)?
            .as_branch()
            .ok_or_else(|| BoardError::NotABranch(id.clone()))
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn set_grid_size(&mut self, size: f64) {
        self.grid.size = size;
    }

    pub fn viewport(&self) -> Point {
        self.viewport
    }

    pub fn scroll_to(&mut self, viewport: Point) {
        self.viewport = viewport;
    }

    /// Size of the canvas needed to show every TimeLine with a margin.
    pub fn extent(&self) -> Point {
        self.lines.values().fold(Point::ZERO, |acc, line| {
            let corner = line.bottom_right().moved(EXTENT_MARGIN, EXTENT_MARGIN);
            Point::new(acc.x.max(corner.x), acc.y.max(corner.y))
        })
    }

    /// `id` followed by every TimeLine hanging below it, depth-first.
    pub fn subtree(&self, id: &TimeLineId) -> Vec<TimeLineId> {
        let mut out = Vec::new();
        let mut stack = vec![id.clone()];
        while let Some(current) = stack.pop() {
            let Some(line) = self.lines.get(&current) else {
                continue;
            };
            out.push(current);
            for branch in line.branches().collect::<Vec<_>>().into_iter().rev() {
                stack.push(branch.child().clone());
            }
        }
        out
    }

    /// `candidate` is `root` or hangs somewhere below it.
    pub fn is_in_subtree(&self, root: &TimeLineId, candidate: &TimeLineId) -> bool {
        let mut current = Some(candidate.clone());
        let mut hops = 0;
        while let Some(id) = current {
            if &id == root {
                return true;
            }
            hops += 1;
            if hops > self.lines.len() {
                return false;
            }
            current = self
                .lines
                .get(&id)
                .and_then(|line| line.parent())
                .map(|parent| parent.time_line.clone());
        }
        false
    }

    /// TimeItems of `id` and its subtree matching `filter`, in depth-first
    /// pre-order: a branch's child sequence is visited at the branch's slot.
    pub fn find_items_in_order(&self, id: &TimeLineId, filter: &ItemFilter) -> BoardResult<Vec<&TimeItem>> {
        let root = self.time_line(id)?;
        let mut found = Vec::new();
        let mut stack: Vec<(&TimeLine, usize)> = vec![(root, 0)];

        while let Some((line, index)) = stack.pop() {
            let Some(slot) = line.slots().get(index) else {
                continue;
            };
            stack.push((line, index + 1));

            match &slot.node {
                Node::Branch(branch) => {
                    if let Some(child) = self.lines.get(branch.child()) {
                        stack.push((child, 0));
                    }
                }
                Node::Item(item) => {
                    if filter.matches(item) {
                        found.push(item);
                    }
                }
            }
        }

        Ok(found)
    }

    /// One group of matching items per root TimeLine; empty groups are left out.
    pub fn item_groups(&self, filter: &ItemFilter) -> Vec<Vec<&TimeItem>> {
        self.roots()
            .filter_map(|root| self.find_items_in_order(&root.id, filter).ok())
            .filter(|group| !group.is_empty())
            .collect()
    }

    // ============================================================
    // Placement
    // ============================================================

    /// First position of `start, start + step, start + 2·step, …` that no
    /// TimeLine occupies exactly. With a zero step, `start` is returned as is.
    pub fn find_free_item_spot(&self, start: Point, step: Point) -> Point {
        let mut pos = start;
        // Each TimeLine blocks at most one candidate, so len + 1 tries suffice.
        for _ in 0..=self.lines.len() {
            if !self.lines.values().any(|line| line.position() == pos) {
                return pos;
            }
            if step.is_zero() {
                break;
            }
            pos = pos + step;
        }
        pos
    }

    /// Create a TimeLine holding one blank item right of the viewport origin.
    pub fn create_item(&mut self) -> BoardResult<TimeLineId> {
        let start = self.grid.snap(self.viewport + NEW_ITEM_OFFSET);
        let pos = self.find_free_item_spot(start, NEW_ITEM_STEP);
        self.create_item_at(pos)
    }

    /// Create a TimeLine holding one blank item at `pos`.
    pub fn create_item_at(&mut self, pos: Point) -> BoardResult<TimeLineId> {
        if !pos.is_non_negative() {
            return Err(BoardError::NegativePosition(pos));
        }

        let mut line = TimeLine::shell(TimeLineId::generate(), pos, BASE_WIDTH);
        line.push(Node::Item(TimeItem::new()));
        line.update_item_locations();

        let id = line.id.clone();
        self.lines.insert(id.clone(), line);
        self.update_stack_ordering(&id);

        tracing::info!("Created time line {} at {}", id, pos);
        Ok(id)
    }

    /// Forget a TimeLine and every piece of board state pointing at it.
    fn drop_time_line(&mut self, id: &TimeLineId) {
        self.lines.shift_remove(id);
        self.selection.remove(id);
        if self.linkable.as_ref() == Some(id) {
            self.linkable = None;
        }
        if self.top.as_ref() == Some(id) {
            self.top = None;
        }
        tracing::debug!("Removed time line {}", id);
    }

    // ============================================================
    // Stacking, selection and link target
    // ============================================================

    pub fn top_item(&self) -> Option<&TimeLineId> {
        self.top.as_ref()
    }

    /// Raise `id` above every other TimeLine.
    pub fn update_stack_ordering(&mut self, id: &TimeLineId) {
        if self.lines.contains_key(id) {
            self.top = Some(id.clone());
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn is_selected(&self, id: &TimeLineId) -> bool {
        self.selection.has(id)
    }

    /// Selecting a TimeLine cancels any pending link target.
    pub fn select(&mut self, id: &TimeLineId) -> BoardResult<()> {
        self.time_line(id)?;
        self.selection.add(id.clone());
        self.reset_linkable_item();
        Ok(())
    }

    pub fn deselect(&mut self, id: &TimeLineId) {
        self.selection.remove(id);
    }

    /// Returns whether `id` is selected afterwards.
    pub fn toggle_selected(&mut self, id: &TimeLineId) -> BoardResult<bool> {
        if self.selection.has(id) {
            self.deselect(id);
            Ok(false)
        } else {
            self.select(id)?;
            Ok(true)
        }
    }

    /// Select `id` together with its whole subtree.
    pub fn select_children(&mut self, id: &TimeLineId) -> BoardResult<()> {
        self.time_line(id)?;
        for member in self.subtree(id) {
            self.selection.add(member);
        }
        self.reset_linkable_item();
        Ok(())
    }

    pub fn unselect_all(&mut self) {
        self.selection.clear();
        self.linkable = None;
    }

    pub fn linkable_item(&self) -> Option<&TimeLineId> {
        self.linkable.as_ref()
    }

    /// Mark `id` as the pending target of the next link. Supersedes any
    /// earlier target and clears the selection.
    pub fn set_linkable_item(&mut self, id: &TimeLineId) -> BoardResult<()> {
        self.time_line(id)?;
        self.unselect_all();
        self.linkable = Some(id.clone());
        Ok(())
    }

    pub fn reset_linkable_item(&mut self) {
        self.linkable = None;
    }

    // ============================================================
    // Auditing
    // ============================================================

    /// Verify the structural invariants of the whole board.
    pub fn check_invariants(&self) -> BoardResult<()> {
        let broken = |msg: String| Err(BoardError::Invariant(msg));
        let mut node_ids = HashSet::new();

        for line in self.lines.values() {
            if line.is_empty() {
                return broken(format!("time line {} is empty", line.id));
            }
            if !line.position().is_non_negative() {
                return broken(format!("time line {} is at {}", line.id, line.position()));
            }
            if line.width() < BASE_WIDTH {
                return broken(format!("time line {} is narrower than the base width", line.id));
            }

            for node in line.nodes() {
                if !node_ids.insert(node.id().clone()) {
                    return broken(format!("node id {} is used twice", node.id()));
                }
            }

            for branch in line.branches() {
                let ratio = branch.connector().split_ratio();
                if !(MIN_SPLIT_RATIO..=MAX_SPLIT_RATIO).contains(&ratio) {
                    return broken(format!("branch {} has split ratio {}", branch.id, ratio));
                }
                let expected = BranchRef {
                    time_line: line.id.clone(),
                    branch: branch.id.clone(),
                };
                match self.lines.get(branch.child()) {
                    Some(child) if child.parent() == Some(&expected) => {}
                    Some(_) => {
                        return broken(format!(
                            "branch {} links {} without a matching back-reference",
                            branch.id,
                            branch.child()
                        ))
                    }
                    None => {
                        return broken(format!(
                            "branch {} links missing time line {}",
                            branch.id,
                            branch.child()
                        ))
                    }
                }
            }

            if let Some(parent) = line.parent() {
                let linked = self
                    .lines
                    .get(&parent.time_line)
                    .and_then(|owner| owner.node(&parent.branch))
                    .and_then(Node::as_branch)
                    .is_some_and(|branch| branch.child() == &line.id);
                if !linked {
                    return broken(format!("time line {} has a stale parent reference", line.id));
                }
            }
        }

        // Every TimeLine must reach a root without revisiting anything.
        for line in self.lines.values() {
            let mut seen = HashSet::new();
            let mut current = line;
            while let Some(parent) = current.parent() {
                if !seen.insert(current.id.clone()) {
                    return broken(format!("time line {} is part of a link cycle", line.id));
                }
                match self.lines.get(&parent.time_line) {
                    Some(owner) => current = owner,
                    None => break,
                }
            }
        }

        Ok(())
    }
}
