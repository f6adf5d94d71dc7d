//! Referential checks on a parsed project file.
//!
//! Field types and unknown keys are already enforced by deserialization;
//! this pass checks what the schema cannot express. It never mutates.

use std::collections::{HashMap, HashSet};

use crate::models::{NodeId, TimeLineId};

use super::{LoadError, PersistedNode, ProjectFile, FORMAT_VERSION};

/// Check a parsed file before anything is built from it.
pub fn validate(file: &ProjectFile) -> Result<(), LoadError> {
    if file.version != FORMAT_VERSION {
        return Err(LoadError::VersionMismatch {
            found: file.version.clone(),
            expected: FORMAT_VERSION,
        });
    }

    let mut line_ids = HashSet::new();
    for line in &file.time_lines {
        if !line_ids.insert(&line.id) {
            return Err(LoadError::DuplicateTimeLine(line.id.clone()));
        }
    }

    let mut node_ids: HashSet<&NodeId> = HashSet::new();
    // child -> TimeLine holding the branch that links it
    let mut parents: HashMap<&TimeLineId, &TimeLineId> = HashMap::new();

    for line in &file.time_lines {
        if line.items.is_empty() {
            return Err(LoadError::EmptyTimeLine(line.id.clone()));
        }
        if !line.position.is_non_negative() {
            return Err(LoadError::NegativePosition {
                time_line: line.id.clone(),
                position: line.position,
            });
        }

        for node in &line.items {
            if !node_ids.insert(node.id()) {
                return Err(LoadError::DuplicateNode(node.id().clone()));
            }

            let PersistedNode::Branch(branch) = node else {
                continue;
            };
            if !line_ids.contains(&branch.sub_time_line_id) {
                return Err(LoadError::DanglingReference {
                    branch: branch.id.clone(),
                    target: branch.sub_time_line_id.clone(),
                });
            }
            if parents.insert(&branch.sub_time_line_id, &line.id).is_some() {
                return Err(LoadError::MultipleParents(branch.sub_time_line_id.clone()));
            }
        }
    }

    // With one parent each, a walk upward either reaches a root or loops.
    for line in &file.time_lines {
        let mut seen = HashSet::new();
        let mut current = &line.id;
        while let Some(&parent) = parents.get(current) {
            if !seen.insert(current) {
                return Err(LoadError::Cycle(line.id.clone()));
            }
            current = parent;
        }
    }

    Ok(())
}
