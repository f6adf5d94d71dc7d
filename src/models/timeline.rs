use crate::geometry::Point;

use super::{NodeId, TimeBranch, TimeItem, TimeLineId};

/// Nominal height of one sequence slot.
pub const ROW_HEIGHT: f64 = 100.0;
/// Width of a TimeLine that was never resized.
pub const BASE_WIDTH: f64 = 300.0;

/// Position of a node within its sequence, used for styling the ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemLocation {
    First,
    #[default]
    Middle,
    Last,
}

impl ItemLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Middle => "middle",
            Self::Last => "last",
        }
    }
}

/// Role tags recomputed after every structural change of a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeTags {
    pub location: ItemLocation,
    /// Set on the first node of a TimeLine that hangs off a branch.
    pub branched: bool,
}

/// Non-owning back-reference from a child TimeLine to the branch linking it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BranchRef {
    /// The TimeLine whose sequence holds the branch.
    pub time_line: TimeLineId,
    pub branch: NodeId,
}

/// One node of a sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Item(TimeItem),
    Branch(TimeBranch),
}

impl Node {
    pub fn id(&self) -> &NodeId {
        match self {
            Self::Item(item) => &item.id,
            Self::Branch(branch) => &branch.id,
        }
    }

    pub fn as_item(&self) -> Option<&TimeItem> {
        match self {
            Self::Item(item) => Some(item),
            Self::Branch(_) => None,
        }
    }

    pub fn as_item_mut(&mut self) -> Option<&mut TimeItem> {
        match self {
            Self::Item(item) => Some(item),
            Self::Branch(_) => None,
        }
    }

    pub fn as_branch(&self) -> Option<&TimeBranch> {
        match self {
            Self::Branch(branch) => Some(branch),
            Self::Item(_) => None,
        }
    }

    pub(crate) fn as_branch_mut(&mut self) -> Option<&mut TimeBranch> {
        match self {
            Self::Branch(branch) => Some(branch),
            Self::Item(_) => None,
        }
    }

    pub fn is_branch(&self) -> bool {
        matches!(self, Self::Branch(_))
    }

    /// The same node under a fresh id. A branch copy carries the link, so the
    /// original must be discarded.
    pub(crate) fn extract_as_clone(&self) -> Self {
        match self {
            Self::Item(item) => Self::Item(item.extract_as_clone()),
            Self::Branch(branch) => Self::Branch(branch.extract_as_clone()),
        }
    }
}

/// A node together with its role tags.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub node: Node,
    pub tags: NodeTags,
}

/// A positioned, ordered sequence of nodes.
///
/// A TimeLine on a board is never empty; the board removes it as soon as its
/// last node goes. `parent` is set while a branch links to this TimeLine.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeLine {
    pub id: TimeLineId,
    position: Point,
    width: f64,
    slots: Vec<Slot>,
    parent: Option<BranchRef>,
}

impl TimeLine {
    /// An empty shell. Callers fill it before it becomes reachable.
    pub(crate) fn shell(id: TimeLineId, position: Point, width: f64) -> Self {
        Self {
            id,
            position,
            width: width.max(BASE_WIDTH),
            slots: Vec::new(),
            parent: None,
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.slots.len().max(1) as f64 * ROW_HEIGHT
    }

    pub fn parent(&self) -> Option<&BranchRef> {
        self.parent.as_ref()
    }

    /// No branch links to this TimeLine.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn nodes(&self) -> impl DoubleEndedIterator<Item = &Node> + '_ {
        self.slots.iter().map(|slot| &slot.node)
    }

    pub fn items(&self) -> impl Iterator<Item = &TimeItem> + '_ {
        self.nodes().filter_map(Node::as_item)
    }

    pub fn branches(&self) -> impl Iterator<Item = &TimeBranch> + '_ {
        self.nodes().filter_map(Node::as_branch)
    }

    pub fn index_of(&self, node: &NodeId) -> Option<usize> {
        self.slots.iter().position(|slot| slot.node.id() == node)
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes().find(|node| node.id() == id)
    }

    pub(crate) fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.slots
            .iter_mut()
            .map(|slot| &mut slot.node)
            .find(|node| node.id() == id)
    }

    pub fn tags(&self, id: &NodeId) -> Option<NodeTags> {
        self.slots
            .iter()
            .find(|slot| slot.node.id() == id)
            .map(|slot| slot.tags)
    }

    /// Top-left and bottom-right corner of slot `index`.
    pub fn slot_rect(&self, index: usize) -> (Point, Point) {
        let top_left = self.position.moved(0.0, index as f64 * ROW_HEIGHT);
        (top_left, top_left.moved(self.width, ROW_HEIGHT))
    }

    /// Where an incoming connector ends: left edge, middle of the first slot.
    pub fn attachment_point(&self) -> Point {
        self.position.moved(0.0, ROW_HEIGHT / 2.0)
    }

    /// Where an outgoing connector starts: right edge, middle of slot `index`.
    pub fn branch_start(&self, index: usize) -> Point {
        let (top_left, _) = self.slot_rect(index);
        top_left.moved(self.width, ROW_HEIGHT / 2.0)
    }

    /// Far corner including an empty sequence's placeholder row.
    pub fn bottom_right(&self) -> Point {
        self.position.moved(self.width, self.height())
    }

    /// Color of the item directly above `node`, if that neighbour is an item.
    pub fn above_item_color(&self, node: &NodeId) -> Option<&str> {
        let index = self.index_of(node)?;
        let above = index.checked_sub(1)?;
        self.slots[above].node.as_item()?.color.as_deref()
    }

    /// Color of the item directly below `node`, if that neighbour is an item.
    pub fn below_item_color(&self, node: &NodeId) -> Option<&str> {
        let index = self.index_of(node)?;
        self.slots.get(index + 1)?.node.as_item()?.color.as_deref()
    }

    pub(crate) fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub(crate) fn translate(&mut self, vector: Point) {
        self.position = self.position + vector;
    }

    /// Width grows from the base width by a non-negative offset.
    pub(crate) fn resize_width(&mut self, offset: f64) {
        self.width = BASE_WIDTH + offset.max(0.0);
    }

    pub(crate) fn set_parent(&mut self, parent: Option<BranchRef>) {
        self.parent = parent;
    }

    pub(crate) fn insert(&mut self, index: usize, node: Node) {
        let index = index.min(self.slots.len());
        self.slots.insert(
            index,
            Slot {
                node,
                tags: NodeTags::default(),
            },
        );
    }

    pub(crate) fn push(&mut self, node: Node) {
        self.insert(self.slots.len(), node);
    }

    pub(crate) fn remove(&mut self, index: usize) -> Node {
        self.slots.remove(index).node
    }

    /// Recompute first/middle/last and the branched flag of every slot.
    pub(crate) fn update_item_locations(&mut self) {
        let len = self.slots.len();
        let branched = self.parent.is_some();

        for (i, slot) in self.slots.iter_mut().enumerate() {
            slot.tags.location = if len > 1 && i == 0 {
                ItemLocation::First
            } else if len > 1 && i == len - 1 {
                ItemLocation::Last
            } else {
                ItemLocation::Middle
            };
            slot.tags.branched = i == 0 && branched;
        }
    }
}
