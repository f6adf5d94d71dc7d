//! On-disk shape of a project file.
//!
//! Field names follow the file format (camelCase). Every struct rejects
//! unknown keys and nullable fields must be present, even when `null`.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::models::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProjectFile {
    pub version: String,
    /// RFC 3339 timestamp of the save.
    pub created: String,
    pub name: String,
    #[serde(default)]
    pub viewport_position: Point,
    pub colors: Vec<NamedColor>,
    pub time_lines: Vec<PersistedTimeLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PersistedTimeLine {
    pub id: TimeLineId,
    pub position: Point,
    pub width: f64,
    pub items: Vec<PersistedNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PersistedNode {
    Item(PersistedTimeItem),
    Branch(PersistedTimeBranch),
}

impl PersistedNode {
    pub fn id(&self) -> &NodeId {
        match self {
            Self::Item(item) => &item.id,
            Self::Branch(branch) => &branch.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PersistedTimeItem {
    pub id: NodeId,
    #[serde(deserialize_with = "Option::deserialize")]
    pub title: Option<String>,
    #[serde(deserialize_with = "Option::deserialize")]
    pub description: Option<String>,
    #[serde(deserialize_with = "Option::deserialize")]
    pub color: Option<String>,
    pub expanded_size: f64,
    pub is_expanded: bool,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PersistedTimeBranch {
    pub id: NodeId,
    pub sub_time_line_id: TimeLineId,
    pub branch_line_split_ratio: f64,
}

impl From<&TimeItem> for PersistedTimeItem {
    fn from(item: &TimeItem) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            description: item.description.clone(),
            color: item.color.clone(),
            expanded_size: item.expanded_size,
            is_expanded: item.is_expanded,
            categories: item.categories.iter().cloned().collect(),
        }
    }
}

impl From<&PersistedTimeItem> for TimeItem {
    fn from(item: &PersistedTimeItem) -> Self {
        TimeItem {
            id: item.id.clone(),
            title: item.title.clone(),
            description: item.description.clone(),
            color: item.color.clone(),
            categories: item.categories.iter().cloned().collect(),
            expanded_size: item.expanded_size,
            is_expanded: item.is_expanded,
        }
    }
}

impl From<&TimeBranch> for PersistedTimeBranch {
    fn from(branch: &TimeBranch) -> Self {
        Self {
            id: branch.id.clone(),
            sub_time_line_id: branch.child().clone(),
            branch_line_split_ratio: branch.connector().split_ratio(),
        }
    }
}

impl From<&Node> for PersistedNode {
    fn from(node: &Node) -> Self {
        match node {
            Node::Item(item) => Self::Item(item.into()),
            Node::Branch(branch) => Self::Branch(branch.into()),
        }
    }
}

impl From<&TimeLine> for PersistedTimeLine {
    fn from(line: &TimeLine) -> Self {
        Self {
            id: line.id.clone(),
            position: line.position(),
            width: line.width(),
            items: line.nodes().map(PersistedNode::from).collect(),
        }
    }
}
