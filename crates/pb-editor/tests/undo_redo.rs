//! Integration tests: undo/redo through the editing session.
//!
//! Mixes explicit edits and pointer gestures and checks that history
//! snapshots restore exactly the states they captured.

use kurbo::Point;
use pb_core::id::NodeId;
use pb_core::model::*;
use pb_editor::Session;
use pretty_assertions::assert_eq;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn plain_session() -> Session {
    init();
    Session::new(Project::with_settings(Settings {
        snap_to_grid: false,
        show_guides: false,
        ..Settings::default()
    }))
}

/// Build a small page with a mix of edits. Returns the ids involved and
/// the number of history entries pushed.
fn build(s: &mut Session) -> (NodeId, NodeId, usize) {
    let root = s.project().root_node_id;
    let section = s
        .create_node(NodeType::Section, root, Point::new(0.0, 100.0))
        .unwrap();
    let heading = s
        .create_node(NodeType::Heading, section, Point::new(40.0, 140.0))
        .unwrap();
    s.rename_node(heading, "Title").unwrap();
    s.set_style(
        heading,
        &StylePatch {
            text_color: Some("#1d4ed8".into()),
            ..Default::default()
        },
    )
    .unwrap();
    s.set_content(
        heading,
        Content {
            text: Some("Ship it".into()),
            ..Default::default()
        },
    )
    .unwrap();
    let copy = s.duplicate_node(heading).unwrap();
    s.bring_to_front(heading).unwrap();
    s.reparent(copy, root).unwrap();

    // Drag the heading 100 units right.
    s.pointer_down(Point::new(50.0, 150.0));
    s.pointer_move(Point::new(150.0, 150.0));
    s.pointer_up(Point::new(150.0, 150.0));

    (section, heading, 9)
}

#[test]
fn undo_n_then_redo_n_restores_state() {
    let mut s = plain_session();
    let initial = s.project().clone();
    let (_, _, n) = build(&mut s);
    assert_eq!(s.history().undo_len(), n);
    let edited = s.project().clone();

    for _ in 0..n {
        assert!(s.undo().is_some());
    }
    assert!(s.undo().is_none());
    assert_eq!(s.project(), &initial);

    for _ in 0..n {
        assert!(s.redo().is_some());
    }
    assert!(s.redo().is_none());
    assert_eq!(s.project(), &edited);
}

#[test]
fn each_undo_reverts_one_step() {
    let mut s = plain_session();
    let (section, heading, _) = build(&mut s);

    assert_eq!(s.undo().as_deref(), Some("Move"));
    assert_eq!(s.project().get(heading).unwrap().frame.x, 40.0);
    assert_eq!(s.undo().as_deref(), Some("Move into"));
    assert_eq!(s.project().children_of(section).len(), 2);
    assert_eq!(s.undo().as_deref(), Some("Bring to front"));
    assert_eq!(s.project().children_of(section)[0], heading);
}

#[test]
fn undo_clears_selection_and_new_edit_clears_redo() {
    let mut s = plain_session();
    let (_, heading, _) = build(&mut s);
    s.select(Some(heading));

    s.undo();
    assert_eq!(s.selection(), None);
    assert!(s.history().can_redo());

    s.rename_node(heading, "Renamed").unwrap();
    assert!(!s.history().can_redo());
}

#[test]
fn removing_selected_node_clears_selection() {
    let mut s = plain_session();
    let (section, heading, _) = build(&mut s);
    s.select(Some(heading));
    s.remove_node(section).unwrap();
    assert_eq!(s.selection(), None);
    assert!(!s.project().contains(heading));

    s.undo();
    assert!(s.project().contains(heading));
    assert_eq!(s.project().validate(), Ok(()));
}

#[test]
fn transient_moves_share_one_entry() {
    let mut s = plain_session();
    let root = s.project().root_node_id;
    let id = s
        .create_node(NodeType::Button, root, Point::new(0.0, 0.0))
        .unwrap();
    let before = s.history().undo_len();

    s.pointer_down(Point::new(10.0, 10.0));
    for step in 1..=50 {
        s.pointer_move(Point::new(10.0 + step as f64 * 3.0, 10.0));
        assert_eq!(s.history().undo_len(), before);
    }
    s.pointer_up(Point::new(160.0, 10.0));
    assert_eq!(s.history().undo_len(), before + 1);
    assert_eq!(s.project().get(id).unwrap().frame.x, 150.0);

    s.undo();
    assert_eq!(s.project().get(id).unwrap().frame.x, 0.0);
}

#[test]
fn undo_mid_gesture_commits_the_gesture_first() {
    let mut s = plain_session();
    let root = s.project().root_node_id;
    let id = s
        .create_node(NodeType::Button, root, Point::new(0.0, 0.0))
        .unwrap();

    s.pointer_down(Point::new(10.0, 10.0));
    s.pointer_move(Point::new(60.0, 10.0));
    assert_eq!(s.undo().as_deref(), Some("Move"));
    assert_eq!(s.project().get(id).unwrap().frame.x, 0.0);
    assert!(s.interaction() == &pb_editor::Interaction::Idle);
}

#[test]
fn history_depth_is_bounded() {
    init();
    let mut s = Session::with_history_depth(Project::new(), 5);
    let root = s.project().root_node_id;
    let id = s
        .create_node(NodeType::Text, root, Point::new(0.0, 0.0))
        .unwrap();
    for i in 0..20 {
        s.rename_node(id, &format!("Text {i}")).unwrap();
    }
    assert_eq!(s.history().undo_len(), 5);
    while s.undo().is_some() {}
    assert_eq!(s.project().get(id).unwrap().name, "Text 14");
}

#[test]
fn settings_updates_are_undoable() {
    let mut s = plain_session();
    let settings = Settings {
        grid_size: 4.0,
        canvas_width: 1440.0,
        ..s.project().settings
    };
    s.update_settings(settings);
    assert_eq!(s.project().settings.grid_size, 4.0);
    assert_eq!(s.project().root().unwrap().frame.width, 1440.0);

    s.undo();
    assert_eq!(s.project().settings.grid_size, 8.0);
    assert_eq!(s.project().root().unwrap().frame.width, 1280.0);
}
