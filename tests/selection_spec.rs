use speculate2::speculate;
use timeboard::board::*;
use timeboard::geometry::Point;
use timeboard::models::*;

fn first_node(board: &TimeBoard, line: &TimeLineId) -> NodeId {
    board.time_line(line).expect("Unknown time line").slots()[0]
        .node
        .id()
        .clone()
}

fn position(board: &TimeBoard, line: &TimeLineId) -> Point {
    board.time_line(line).expect("Unknown time line").position()
}

fn connector(board: &TimeBoard, owner: &TimeLineId) -> Connector {
    board
        .time_line(owner)
        .expect("Unknown time line")
        .branches()
        .next()
        .expect("No branch")
        .connector()
        .clone()
}

speculate! {
    before {
        let mut board = TimeBoard::default();
        let a = board.create_item_at(Point::new(100.0, 100.0)).expect("Failed to create time line");
        let b = board.create_item_at(Point::new(500.0, 100.0)).expect("Failed to create time line");
    }

    describe "membership" {
        it "behaves like a set" {
            let mut selection = Selection::new();
            selection.add(a.clone());
            selection.add(a.clone());
            selection.add(b.clone());

            assert_eq!(selection.len(), 2);
            assert!(selection.has(&a));

            selection.remove(&a);
            assert!(!selection.has(&a));
            assert_eq!(selection.iter().collect::<Vec<_>>(), vec![&b]);

            selection.clear();
            assert!(selection.is_empty());
        }

        it "toggles membership on the board" {
            assert!(board.toggle_selected(&a).unwrap());
            assert!(board.is_selected(&a));
            assert!(!board.toggle_selected(&a).unwrap());
            assert!(!board.is_selected(&a));
        }

        it "selects a time line with its whole subtree" {
            let c = board.branch_below(&first_node(&board, &a)).expect("Failed to branch");
            let d = board.branch_below(&first_node(&board, &c)).expect("Failed to branch");

            board.select_children(&a).unwrap();

            assert!(board.is_selected(&a));
            assert!(board.is_selected(&c));
            assert!(board.is_selected(&d));
            assert!(!board.is_selected(&b));
        }

        it "clears the link target when everything is unselected" {
            board.set_linkable_item(&b).unwrap();
            board.unselect_all();
            assert_eq!(board.linkable_item(), None);
        }
    }

    describe "move_selection" {
        it "moves every member by the vector" {
            board.select(&a).unwrap();
            board.select(&b).unwrap();

            assert!(board.move_selection(Point::new(50.0, 50.0)));

            assert_eq!(position(&board, &a), Point::new(150.0, 150.0));
            assert_eq!(position(&board, &b), Point::new(550.0, 150.0));
        }

        it "is atomic when a member would leave the board" {
            let edge = board.create_item_at(Point::new(0.0, 0.0)).unwrap();
            board.select(&a).unwrap();
            board.select(&edge).unwrap();

            assert!(!board.move_selection(Point::new(-50.0, 0.0)));

            assert_eq!(position(&board, &a), Point::new(100.0, 100.0));
            assert_eq!(position(&board, &edge), Point::ZERO);
        }

        it "ignores the zero vector" {
            board.select(&a).unwrap();
            assert!(!board.move_selection(Point::ZERO));
        }

        it "leaves unselected time lines alone" {
            board.select(&a).unwrap();
            board.move_selection(Point::new(0.0, 100.0));
            assert_eq!(position(&board, &b), Point::new(500.0, 100.0));
        }

        it "translates connectors whose ends both move" {
            let c = board.branch_below(&first_node(&board, &a)).expect("Failed to branch");
            let before = connector(&board, &a);
            board.select_children(&a).unwrap();
            assert!(board.is_selected(&c));

            assert!(board.move_selection(Point::new(100.0, 50.0)));

            let after = connector(&board, &a);
            assert_eq!(after.anchor(), before.anchor() + Point::new(100.0, 50.0));
            assert_eq!(after.size(), before.size());
        }

        it "recomputes connectors with one selected end" {
            let c = board.branch_below(&first_node(&board, &a)).expect("Failed to branch");
            board.select(&c).unwrap();

            assert!(board.move_selection(Point::new(100.0, 0.0)));

            let after = connector(&board, &a);
            assert_eq!(position(&board, &c), Point::new(600.0, 300.0));
            assert_eq!(after.anchor(), Point::new(400.0, 248.0));
            assert_eq!(after.size(), Point::new(200.0, 104.0));
        }

        it "recomputes the outgoing connector when only the owner moves" {
            board.branch_below(&first_node(&board, &a)).expect("Failed to branch");
            board.select(&a).unwrap();

            assert!(board.move_selection(Point::new(0.0, 100.0)));

            let after = connector(&board, &a);
            assert_eq!(after.anchor(), Point::new(400.0, 348.0));
            assert!(!after.is_up());
            assert_eq!(after.size(), Point::new(100.0, 4.0));
        }
    }
}
