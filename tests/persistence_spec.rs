use serde_json::{json, Value};
use speculate2::speculate;
use timeboard::board::TimeBoard;
use timeboard::editor::Editor;
use timeboard::geometry::{Grid, Point};
use timeboard::models::*;
use timeboard::persistence::*;

fn item(id: &str, title: Option<&str>) -> Value {
    json!({
        "type": "item",
        "id": id,
        "title": title,
        "description": null,
        "color": null,
        "expandedSize": 30,
        "isExpanded": false,
        "categories": []
    })
}

fn branch(id: &str, target: &str) -> Value {
    json!({
        "type": "branch",
        "id": id,
        "subTimeLineId": target,
        "branchLineSplitRatio": 0.5
    })
}

fn time_line(id: &str, x: f64, y: f64, items: Vec<Value>) -> Value {
    json!({
        "id": id,
        "position": { "x": x, "y": y },
        "width": 300,
        "items": items
    })
}

/// A branch in "root" pointing forward at "child", listed after it.
fn document() -> Value {
    json!({
        "version": "0.1",
        "created": "2024-05-01T12:00:00Z",
        "name": "Forward",
        "viewportPosition": { "x": 0, "y": 0 },
        "colors": [{ "name": "Red", "color": "#FF0000" }],
        "timeLines": [
            time_line("root", 100.0, 100.0, vec![item("i1", Some("Start")), branch("b1", "child")]),
            time_line("child", 500.0, 300.0, vec![item("i2", None)])
        ]
    })
}

fn parse(doc: &Value) -> Result<ProjectFile, LoadError> {
    ProjectFile::parse(&doc.to_string())
}

fn first_node(board: &TimeBoard, line: &TimeLineId) -> NodeId {
    board.time_line(line).expect("Unknown time line").slots()[0]
        .node
        .id()
        .clone()
}

/// Structural equality that ignores derived state such as tags.
fn assert_same_structure(a: &TimeBoard, b: &TimeBoard) {
    assert_eq!(a.len(), b.len());
    for line in a.time_lines() {
        let other = b.time_line(&line.id).expect("Time line missing after load");
        assert_eq!(line.position(), other.position());
        assert_eq!(line.width(), other.width());
        assert_eq!(line.parent(), other.parent());

        let ours: Vec<_> = line.nodes().collect();
        let theirs: Vec<_> = other.nodes().collect();
        assert_eq!(ours.len(), theirs.len());
        for (x, y) in ours.iter().zip(theirs.iter()) {
            match (x, y) {
                (Node::Item(x), Node::Item(y)) => assert_eq!(x, y),
                (Node::Branch(x), Node::Branch(y)) => {
                    assert_eq!(x.id, y.id);
                    assert_eq!(x.child(), y.child());
                    assert_eq!(x.connector().split_ratio(), y.connector().split_ratio());
                }
                _ => panic!("Node kinds differ at {}", x.id()),
            }
        }
    }
}

speculate! {
    describe "round trip" {
        before {
            let mut board = TimeBoard::default();
            let mut colors = ColorTable::new();
            colors.set("#ff0000", Some("Red"));
            colors.set("#00ff00", None);

            let a = board.create_item_at(Point::new(100.0, 100.0)).expect("Failed to create");
            let a1 = first_node(&board, &a);
            board.edit_item(&a1, |item| {
                item.set_title(Some("Kickoff".into()));
                item.set_description(Some("First steps".into()));
                item.color = Some("#ff0000".into());
                item.resize_description(80.0);
            }).expect("Failed to edit");
            let b = board.create_item_at(Point::new(900.0, 100.0)).expect("Failed to create");
            let c = board.branch_below(&a1).expect("Failed to branch");
            let c1 = first_node(&board, &c);
            board.edit_item(&c1, |item| item.set_categories(["#00ff00"])).expect("Failed to edit");
            let link = board.time_line(&a).unwrap().slots()[1].node.id().clone();
            board.set_split_ratio(&link, 0.25).unwrap();
            board.resize_width(&b, 150.0).unwrap();
            board.scroll_to(Point::new(40.0, 80.0));
        }

        it "reproduces time lines, items and links" {
            let file = ProjectFile::capture("Plan", &board, &colors);
            let text = file.to_json().expect("Failed to serialize");

            let loaded = ProjectFile::parse(&text).expect("Failed to parse");
            let (restored, restored_colors) = loaded.restore(Grid::default()).expect("Failed to restore");

            assert_same_structure(&board, &restored);
            assert_eq!(restored_colors, colors);
            assert_eq!(restored.viewport(), Point::new(40.0, 80.0));
            restored.check_invariants().expect("Restored board is inconsistent");
        }

        it "does not rewrite unnormalized item content" {
            board.edit_item(&a1, |item| {
                item.title = Some(" padded ".into());
                item.color = Some("#FF0000".into());
                item.set_categories(["red"]);
            }).expect("Failed to edit");
            let before = board.item(&a1).unwrap().clone();

            let text = ProjectFile::capture("Plan", &board, &colors).to_json().unwrap();
            let (restored, _) = ProjectFile::parse(&text).unwrap().restore(Grid::default()).unwrap();

            assert_eq!(restored.item(&a1).unwrap(), &before);
        }

        it "writes time lines depth-first" {
            let file = ProjectFile::capture("Plan", &board, &colors);
            let order: Vec<_> = file.time_lines.iter().map(|line| line.id.clone()).collect();
            assert_eq!(order, vec![a.clone(), c.clone(), b.clone()]);
        }

        it "uses the wire field names" {
            let file = ProjectFile::capture("Plan", &board, &colors);
            let value: Value = serde_json::from_str(&file.to_json().unwrap()).unwrap();

            assert_eq!(value["version"], "0.1");
            assert_eq!(value["viewportPosition"]["x"], 40.0);
            let first = &value["timeLines"][0]["items"][0];
            assert_eq!(first["type"], "item");
            assert_eq!(first["isExpanded"], true);
            assert_eq!(first["expandedSize"], 80.0);
            let link = &value["timeLines"][0]["items"][1];
            assert_eq!(link["type"], "branch");
            assert_eq!(link["subTimeLineId"], c.as_str());
            assert_eq!(link["branchLineSplitRatio"], 0.25);
        }

        it "survives a trip through the file system" {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let mut editor = Editor::default();
            editor.board = board.clone();
            editor.colors = colors.clone();
            editor.set_project_name("My Plan");

            let path = editor.save(dir.path()).expect("Failed to save");
            assert_eq!(path.file_name().unwrap(), "My_Plan.json");

            let mut reopened = Editor::default();
            reopened.open(&path).expect("Failed to open");
            assert_eq!(reopened.project_name(), "My Plan");
            assert_same_structure(&board, &reopened.board);
        }
    }

    describe "loading" {
        it "resolves branches to time lines listed later" {
            let file = parse(&document()).expect("Failed to parse");
            let (board, colors) = file.restore(Grid::default()).expect("Failed to restore");

            let child = board.time_line(&TimeLineId::from("child")).unwrap();
            assert_eq!(child.parent(), Some(&BranchRef {
                time_line: TimeLineId::from("root"),
                branch: NodeId::from("b1"),
            }));
            assert!(child.slots()[0].tags.branched);
            assert_eq!(board.roots().count(), 1);
            assert_eq!(colors.name_of("#ff0000"), Some("Red"));
            board.check_invariants().expect("Board is inconsistent");
        }

        it "keeps item content exactly as stored" {
            let mut doc = document();
            doc["timeLines"][1]["items"][0]["title"] = json!("  padded ");
            doc["timeLines"][1]["items"][0]["color"] = json!("#FF8800");
            doc["timeLines"][1]["items"][0]["categories"] = json!(["#ABC", "red"]);

            let (board, colors) = parse(&doc).unwrap().restore(Grid::default()).unwrap();
            let item = board.item(&NodeId::from("i2")).unwrap();
            assert_eq!(item.title.as_deref(), Some("  padded "));
            assert_eq!(item.color.as_deref(), Some("#FF8800"));
            assert!(item.has_category("#ABC"));
            assert!(item.has_category("red"));
            assert_eq!(colors.name_of("#ff0000"), Some("Red"));
        }

        it "clamps split ratios" {
            let mut doc = document();
            doc["timeLines"][0]["items"][1]["branchLineSplitRatio"] = json!(1.5);

            let (board, _) = parse(&doc).unwrap().restore(Grid::default()).unwrap();
            let ratio = board.branch(&NodeId::from("b1")).unwrap().connector().split_ratio();
            assert_eq!(ratio, MAX_SPLIT_RATIO);
        }

        it "defaults a missing viewport position" {
            let mut doc = document();
            doc.as_object_mut().unwrap().remove("viewportPosition");

            let (board, _) = parse(&doc).unwrap().restore(Grid::default()).unwrap();
            assert_eq!(board.viewport(), Point::ZERO);
        }
    }

    describe "validation" {
        it "rejects a dangling branch reference" {
            let mut doc = document();
            doc["timeLines"][0]["items"][1]["subTimeLineId"] = json!("missing");

            assert!(matches!(parse(&doc), Err(LoadError::DanglingReference { .. })));
        }

        it "rejects another file version" {
            let mut doc = document();
            doc["version"] = json!("0.2");

            assert!(matches!(parse(&doc), Err(LoadError::VersionMismatch { .. })));
        }

        it "rejects unknown keys" {
            let mut doc = document();
            doc["timeLines"][0]["items"][0]["extra"] = json!(1);
            assert!(matches!(parse(&doc), Err(LoadError::Malformed(_))));

            let mut doc = document();
            doc["extra"] = json!(true);
            assert!(matches!(parse(&doc), Err(LoadError::Malformed(_))));
        }

        it "requires nullable fields to be present" {
            let mut doc = document();
            doc["timeLines"][0]["items"][0].as_object_mut().unwrap().remove("description");

            assert!(matches!(parse(&doc), Err(LoadError::Malformed(_))));
        }

        it "rejects wrongly typed fields" {
            let mut doc = document();
            doc["timeLines"][0]["width"] = json!("wide");
            assert!(matches!(parse(&doc), Err(LoadError::Malformed(_))));

            let mut doc = document();
            doc["timeLines"][0]["items"][0]["type"] = json!("note");
            assert!(matches!(parse(&doc), Err(LoadError::Malformed(_))));
        }

        it "rejects empty time lines" {
            let mut doc = document();
            doc["timeLines"][1]["items"] = json!([]);

            assert!(matches!(parse(&doc), Err(LoadError::EmptyTimeLine(_))));
        }

        it "rejects negative positions" {
            let mut doc = document();
            doc["timeLines"][1]["position"]["y"] = json!(-10);

            assert!(matches!(parse(&doc), Err(LoadError::NegativePosition { .. })));
        }

        it "rejects duplicate ids" {
            let mut doc = document();
            doc["timeLines"][1]["id"] = json!("root");
            assert!(matches!(parse(&doc), Err(LoadError::DuplicateTimeLine(_))));

            let mut doc = document();
            doc["timeLines"][1]["items"][0]["id"] = json!("i1");
            assert!(matches!(parse(&doc), Err(LoadError::DuplicateNode(_))));
        }

        it "rejects a time line linked twice" {
            let mut doc = document();
            doc["timeLines"][0]["items"] = json!([branch("b1", "child"), branch("b2", "child")]);

            assert!(matches!(parse(&doc), Err(LoadError::MultipleParents(_))));
        }

        it "rejects link cycles" {
            let doc = json!({
                "version": "0.1",
                "created": "2024-05-01T12:00:00Z",
                "name": "Loop",
                "colors": [],
                "timeLines": [
                    time_line("x", 100.0, 100.0, vec![branch("bx", "y")]),
                    time_line("y", 500.0, 100.0, vec![branch("by", "x")])
                ]
            });

            assert!(matches!(parse(&doc), Err(LoadError::Cycle(_))));
        }

        it "leaves the open document untouched on failure" {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let path = dir.path().join("broken.json");
            let mut doc = document();
            doc["timeLines"][0]["items"][1]["subTimeLineId"] = json!("missing");
            std::fs::write(&path, doc.to_string()).unwrap();

            let mut editor = Editor::default();
            let line = editor.board.create_item().unwrap();
            editor.set_project_name("Current");

            assert!(editor.open(&path).is_err());
            assert_eq!(editor.project_name(), "Current");
            assert_eq!(editor.board.len(), 1);
            assert!(editor.board.contains(&line));
        }

        it "reports unreadable files" {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let mut editor = Editor::default();

            let result = editor.open(&dir.path().join("nothing.json"));
            assert!(matches!(result, Err(LoadError::Io(_))));
        }
    }
}
