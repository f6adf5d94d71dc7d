use indexmap::IndexSet;

use crate::geometry::Point;
use crate::models::TimeLineId;

use super::movement::move_in_selection;
use super::Lines;

/// A set of TimeLines that move together. Membership confers no ownership;
/// ids of TimeLines that left the board are skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    members: IndexSet<TimeLineId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, id: TimeLineId) {
        self.members.insert(id);
    }

    pub fn remove(&mut self, id: &TimeLineId) {
        self.members.shift_remove(id);
    }

    pub fn has(&self, id: &TimeLineId) -> bool {
        self.members.contains(id)
    }

    pub fn clear(&mut self) {
        self.members.clear();
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimeLineId> + '_ {
        self.members.iter()
    }

    /// Translate every member by `vector` as one atomic step.
    ///
    /// Nothing moves if any member would end up at a negative coordinate.
    /// Returns whether the move was applied; a zero vector is never applied.
    pub(crate) fn move_by(&self, lines: &mut Lines, vector: Point) -> bool {
        if vector.is_zero() {
            return false;
        }

        let fits = self
            .members
            .iter()
            .filter_map(|id| lines.get(id))
            .all(|line| (line.position() + vector).is_non_negative());
        if !fits {
            tracing::debug!("Rejected selection move by {}: leaves the board", vector);
            return false;
        }

        for id in &self.members {
            move_in_selection(lines, self, id, vector);
        }

        true
    }
}

impl FromIterator<TimeLineId> for Selection {
    fn from_iter<I: IntoIterator<Item = TimeLineId>>(iter: I) -> Self {
        Self {
            members: iter.into_iter().collect(),
        }
    }
}
