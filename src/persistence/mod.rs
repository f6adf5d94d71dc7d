//! Project files: capturing a board into the versioned file format and
//! rebuilding a board from one.
//!
//! Loading is all-or-nothing. A file is parsed, validated and rebuilt into a
//! fresh board before the caller ever sees it, so a failed load leaves the
//! document that is currently open untouched.
//!
//! The rebuild runs in two passes: first every TimeLine is created as an
//! empty shell, then the sequences are filled in. A branch may name a
//! TimeLine listed later in the file; by the second pass its shell exists.

mod format;
mod validation;

use std::path::Path;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::board::{Lines, TimeBoard};
use crate::geometry::{Grid, Point};
use crate::models::*;

pub use format::*;
pub use validation::validate;

/// Version string written to and required from every project file.
pub const FORMAT_VERSION: &str = "0.1";
/// Extension of project files.
pub const FILE_EXTENSION: &str = "json";

/// Why a project file could not be opened. Recoverable: the caller keeps
/// the current document.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Could not read project file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed project file: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Incompatible file version {found:?}, expected {expected:?}")]
    VersionMismatch { found: String, expected: &'static str },

    #[error("Branch {branch} references unknown time line {target}")]
    DanglingReference { branch: NodeId, target: TimeLineId },

    #[error("Time line id {0} is used twice")]
    DuplicateTimeLine(TimeLineId),

    #[error("Node id {0} is used twice")]
    DuplicateNode(NodeId),

    #[error("Time line {0} has no items")]
    EmptyTimeLine(TimeLineId),

    #[error("Time line {time_line} is at {position}")]
    NegativePosition { time_line: TimeLineId, position: Point },

    #[error("Time line {0} is linked by more than one branch")]
    MultipleParents(TimeLineId),

    #[error("Time line {0} is part of a link cycle")]
    Cycle(TimeLineId),
}

/// Strip characters that are not allowed in file names and replace runs of
/// whitespace with `_`.
pub fn safe_file_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_whitespace = false;
    for c in name.chars() {
        if matches!(c, '/' | '\\' | '?' | '%' | '*' | ':' | '|' | '"' | '<' | '>') {
            continue;
        }
        if c.is_whitespace() {
            if !in_whitespace {
                out.push('_');
            }
            in_whitespace = true;
        } else {
            out.push(c);
            in_whitespace = false;
        }
    }
    out
}

impl ProjectFile {
    /// Snapshot a board. TimeLines are written depth-first: every root in
    /// board order, each followed by its subtree.
    pub fn capture(name: &str, board: &TimeBoard, colors: &ColorTable) -> Self {
        let time_lines = board
            .roots()
            .flat_map(|root| board.subtree(&root.id))
            .filter_map(|id| board.time_line(&id).ok())
            .map(PersistedTimeLine::from)
            .collect();

        Self {
            version: FORMAT_VERSION.to_string(),
            created: Utc::now().to_rfc3339(),
            name: name.to_string(),
            viewport_position: board.viewport(),
            colors: colors.iter().collect(),
            time_lines,
        }
    }

    /// Parse and validate a project file's text.
    pub fn parse(text: &str) -> Result<Self, LoadError> {
        let file: ProjectFile = serde_json::from_str(text)?;
        validate(&file)?;
        Ok(file)
    }

    pub fn read(path: &Path) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn write(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, self.to_json()?)
    }

    /// `<safe name>.json`
    pub fn file_name(&self) -> String {
        format!("{}.{}", safe_file_name(&self.name), FILE_EXTENSION)
    }

    /// When the file was saved, if the timestamp parses.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    /// Rebuild the board and color table described by this file.
    pub fn restore(&self, grid: Grid) -> Result<(TimeBoard, ColorTable), LoadError> {
        validate(self)?;

        let mut lines = Lines::new();
        for persisted in &self.time_lines {
            let shell = TimeLine::shell(persisted.id.clone(), persisted.position, persisted.width);
            lines.insert(persisted.id.clone(), shell);
        }

        for persisted in &self.time_lines {
            for node in &persisted.items {
                let node = match node {
                    PersistedNode::Item(item) => Node::Item(item.into()),
                    PersistedNode::Branch(branch) => {
                        let child = lines.get_mut(&branch.sub_time_line_id).ok_or_else(|| {
                            LoadError::DanglingReference {
                                branch: branch.id.clone(),
                                target: branch.sub_time_line_id.clone(),
                            }
                        })?;
                        child.set_parent(Some(BranchRef {
                            time_line: persisted.id.clone(),
                            branch: branch.id.clone(),
                        }));
                        Node::Branch(TimeBranch::new(
                            branch.id.clone(),
                            branch.sub_time_line_id.clone(),
                            Connector::with_split_ratio(branch.branch_line_split_ratio),
                        ))
                    }
                };

                if let Some(line) = lines.get_mut(&persisted.id) {
                    line.push(node);
                }
            }
        }

        let colors = self.colors.iter().cloned().collect();
        let board = TimeBoard::from_lines(lines, grid, self.viewport_position);

        tracing::info!(
            "Restored project {:?} with {} time lines",
            self.name,
            board.len()
        );
        Ok((board, colors))
    }
}
