//! ASCII tree rendering for boards.

use crate::board::TimeBoard;
use crate::models::{Node, TimeItem, TimeLine};

const ITEM: char = '●';
const EMPTY_ITEM: char = '○';
const BRANCH: char = '◆';

fn item_label(item: &TimeItem) -> String {
    let symbol = if item.is_empty() { EMPTY_ITEM } else { ITEM };
    let title = item.title.as_deref().unwrap_or("(untitled)");
    match &item.color {
        Some(color) => format!("{} {} [{}]", symbol, title, color),
        None => format!("{} {}", symbol, title),
    }
}

/// Render every root TimeLine with its branches expanded in place.
///
/// Example output:
/// ```text
/// time-line-1 (100, 100)
/// ├── ● Kickoff
/// ├── ◆ time-line-2
/// │   ├── ● Research [#ff8800]
/// │   └── ○ (untitled)
/// └── ● Ship
/// ```
pub fn render_board(board: &TimeBoard) -> String {
    let mut output = String::new();
    for root in board.roots() {
        output.push_str(&format!("{} {}\n", root.id, root.position()));
        render_line(&mut output, board, root, "");
    }
    output
}

/// Recursively render the nodes of a TimeLine.
fn render_line(output: &mut String, board: &TimeBoard, line: &TimeLine, prefix: &str) {
    let len = line.len();
    for (i, node) in line.nodes().enumerate() {
        let is_last = i == len - 1;
        let branch = if is_last { "└── " } else { "├── " };
        output.push_str(prefix);
        output.push_str(branch);

        match node {
            Node::Item(item) => {
                output.push_str(&item_label(item));
                output.push('\n');
            }
            Node::Branch(link) => {
                output.push(BRANCH);
                output.push(' ');
                output.push_str(link.child().as_str());
                output.push('\n');

                // Calculate prefix for the child's nodes
                let continuation = if is_last { "    " } else { "│   " };
                let child_prefix = format!("{}{}", prefix, continuation);
                if let Ok(child) = board.time_line(link.child()) {
                    render_line(output, board, child, &child_prefix);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::models::NodeId;

    fn first_node(board: &TimeBoard, line: &crate::models::TimeLineId) -> NodeId {
        board.time_line(line).unwrap().slots()[0].node.id().clone()
    }

    #[test]
    fn test_single_untitled_item() {
        let mut board = TimeBoard::default();
        let line = board.create_item_at(Point::new(100.0, 100.0)).unwrap();

        let output = render_board(&board);
        assert_eq!(output, format!("{} (100, 100)\n└── ○ (untitled)\n", line));
    }

    #[test]
    fn test_branch_children_are_nested() {
        let mut board = TimeBoard::default();
        let root = board.create_item_at(Point::new(100.0, 100.0)).unwrap();
        let first = first_node(&board, &root);
        board.edit_item(&first, |item| item.set_title(Some("Kickoff".into()))).unwrap();

        let child = board.branch_below(&first).unwrap();
        let child_item = first_node(&board, &child);
        board
            .edit_item(&child_item, |item| {
                item.set_title(Some("Research".into()));
                item.color = Some("#ff8800".into());
            })
            .unwrap();

        let output = render_board(&board);
        assert_eq!(
            output,
            format!(
                "{} (100, 100)\n├── ● Kickoff\n└── ◆ {}\n    └── ● Research [#ff8800]\n",
                root, child
            )
        );
    }
}
