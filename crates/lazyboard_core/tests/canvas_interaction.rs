mod common;

use common::{owner_scope, signed_in, total_writes, RecordingStore, USER};
use lazyboard_core::db::open_db_in_memory;
use lazyboard_core::model::atom::{Atom, AtomType};
use lazyboard_core::repo::atom_repo::{AtomRepository, SqliteAtomRepository};
use lazyboard_core::{
    BoardCanvas, BoardCategory, BoardStore, CanvasConfig, EdgeStyle, GesturePhase, HitTarget,
    Identity, ManualClock, NewNode, NodeId, PointerEvent, Position, Size, SqliteBoardStore,
    WriteOp,
};

fn open_canvas<'conn>(
    store: RecordingStore<'conn>,
    clock: &ManualClock,
) -> BoardCanvas<RecordingStore<'conn>> {
    let service = signed_in(store);
    let board = service
        .create_board(&owner_scope(), BoardCategory::Personal, true)
        .unwrap()
        .id;
    BoardCanvas::open(service, board, CanvasConfig::default(), Box::new(clock.clone())).unwrap()
}

fn add_node(
    canvas: &mut BoardCanvas<RecordingStore<'_>>,
    tag: &str,
    at: Position,
    size: Size,
) -> NodeId {
    let node = canvas
        .service()
        .create_node(canvas.board_id(), NewNode::new(tag, at).with_size(size))
        .unwrap();
    canvas.tick();
    node
}

fn drag(canvas: &mut BoardCanvas<RecordingStore<'_>>, node: NodeId, from: Position, to: Position) {
    canvas.handle_event(PointerEvent::Down {
        target: HitTarget::Node(node),
        screen: from,
    });
    canvas.handle_event(PointerEvent::Move { screen: to });
    canvas.handle_event(PointerEvent::Up { screen: to });
}

fn resize(
    canvas: &mut BoardCanvas<RecordingStore<'_>>,
    node: NodeId,
    from: Position,
    to: Position,
) {
    canvas.handle_event(PointerEvent::Down {
        target: HitTarget::ResizeHandle(node),
        screen: from,
    });
    canvas.handle_event(PointerEvent::Up { screen: to });
}

#[test]
fn drag_release_commits_nearest_grid_point_once() {
    let conn = open_db_in_memory().unwrap();
    let clock = ManualClock::new();
    let mut canvas = open_canvas(RecordingStore::new(&conn), &clock);
    let node = add_node(&mut canvas, "note", Position::new(0.0, 0.0), Size::new(200.0, 100.0));
    canvas.service().store().reset_counts();

    drag(
        &mut canvas,
        node,
        Position::new(10.0, 10.0),
        Position::new(113.0, 67.0),
    );

    assert_eq!(canvas.service().store().count("update_node_position"), 1);
    assert_eq!(total_writes(canvas.service().store()), 1);
    assert_eq!(
        canvas.model().node(node).unwrap().position,
        Position::new(100.0, 60.0)
    );
    let stored = canvas.service().store().get_node(node).unwrap().unwrap();
    assert_eq!(stored.position, Position::new(100.0, 60.0));
    assert_eq!(canvas.phase(), GesturePhase::Idle);
}

#[test]
fn resize_burst_writes_once_after_quiet_period() {
    let conn = open_db_in_memory().unwrap();
    let clock = ManualClock::new();
    let mut canvas = open_canvas(RecordingStore::new(&conn), &clock);
    let node = add_node(&mut canvas, "note", Position::new(0.0, 0.0), Size::new(200.0, 100.0));
    canvas.service().store().reset_counts();

    canvas.handle_event(PointerEvent::Down {
        target: HitTarget::ResizeHandle(node),
        screen: Position::new(200.0, 100.0),
    });
    let mut last = Position::new(200.0, 100.0);
    for step in 1..=5 {
        clock.advance(100);
        last = Position::new(200.0 + 13.0 * step as f64, 100.0 + 7.0 * step as f64);
        canvas.handle_event(PointerEvent::Move { screen: last });
        canvas.tick();
    }
    canvas.handle_event(PointerEvent::Up { screen: last });
    assert_eq!(canvas.service().store().count("update_node_size"), 0);
    assert_eq!(canvas.next_deadline(), Some(1300));

    clock.advance(799);
    canvas.tick();
    assert_eq!(canvas.service().store().count("update_node_size"), 0);

    clock.advance(1);
    canvas.tick();
    assert_eq!(
        canvas.service().store().size_writes(),
        vec![(node, Size::new(260.0, 140.0))]
    );
    assert!(!canvas.has_pending_writes());
    assert_eq!(
        canvas.model().node(node).unwrap().size,
        Some(Size::new(260.0, 140.0))
    );
}

#[test]
fn pending_resize_survives_rebuild_from_other_writes() {
    let conn = open_db_in_memory().unwrap();
    let clock = ManualClock::new();
    let mut canvas = open_canvas(RecordingStore::new(&conn), &clock);
    let size = Size::new(200.0, 100.0);
    let resized = add_node(&mut canvas, "note", Position::new(0.0, 0.0), size);
    let other = add_node(&mut canvas, "note", Position::new(400.0, 0.0), size);

    resize(
        &mut canvas,
        resized,
        Position::new(200.0, 100.0),
        Position::new(300.0, 200.0),
    );
    drag(
        &mut canvas,
        other,
        Position::new(410.0, 10.0),
        Position::new(410.0, 210.0),
    );
    clock.advance(100);
    assert!(canvas.tick());

    let node = canvas.model().node(resized).unwrap();
    assert_eq!(node.measured_size, Some(Size::new(300.0, 200.0)));
    assert_eq!(node.size, Some(size));
    assert_eq!(
        canvas.model().node(other).unwrap().position,
        Position::new(400.0, 200.0)
    );

    clock.advance(700);
    canvas.tick();
    assert_eq!(
        canvas.service().store().size_writes(),
        vec![(resized, Size::new(300.0, 200.0))]
    );
    assert_eq!(
        canvas.model().node(resized).unwrap().size,
        Some(Size::new(300.0, 200.0))
    );
}

#[test]
fn cancelled_resize_of_intrinsic_node_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let clock = ManualClock::new();
    let mut canvas = open_canvas(RecordingStore::new(&conn), &clock);
    let node = canvas
        .service()
        .create_node(canvas.board_id(), NewNode::new("note", Position::new(0.0, 0.0)))
        .unwrap();
    canvas.tick();

    canvas.handle_event(PointerEvent::Down {
        target: HitTarget::ResizeHandle(node),
        screen: Position::new(300.0, 200.0),
    });
    canvas.handle_event(PointerEvent::Move {
        screen: Position::new(350.0, 260.0),
    });
    canvas.handle_event(PointerEvent::Escape);
    assert!(!canvas.has_pending_writes());

    clock.advance(1000);
    canvas.tick();
    assert_eq!(canvas.service().store().count("update_node_size"), 0);
    let stored = canvas.service().store().get_node(node).unwrap().unwrap();
    assert_eq!(stored.size, None);
    let local = canvas.model().node(node).unwrap();
    assert_eq!(local.size, None);
    assert_eq!(local.measured_size, None);
}

#[test]
fn cancelled_resize_undoes_write_that_already_landed() {
    let conn = open_db_in_memory().unwrap();
    let clock = ManualClock::new();
    let mut canvas = open_canvas(RecordingStore::new(&conn), &clock);
    let original = Size::new(200.0, 100.0);
    let node = add_node(&mut canvas, "note", Position::new(0.0, 0.0), original);

    canvas.handle_event(PointerEvent::Down {
        target: HitTarget::ResizeHandle(node),
        screen: Position::new(200.0, 100.0),
    });
    canvas.handle_event(PointerEvent::Move {
        screen: Position::new(283.0, 167.0),
    });
    clock.advance(800);
    canvas.tick();
    assert_eq!(
        canvas.service().store().size_writes(),
        vec![(node, Size::new(280.0, 160.0))]
    );

    canvas.handle_event(PointerEvent::Escape);
    assert!(canvas.has_pending_writes());
    clock.advance(800);
    canvas.tick();

    assert_eq!(
        canvas.service().store().size_writes(),
        vec![(node, Size::new(280.0, 160.0)), (node, original)]
    );
    let stored = canvas.service().store().get_node(node).unwrap().unwrap();
    assert_eq!(stored.size, Some(original));
    assert_eq!(canvas.model().node(node).unwrap().measured_size, Some(original));
}

#[test]
fn deleting_a_node_cascades_to_item_and_incident_edges_only() {
    let conn = open_db_in_memory().unwrap();
    let clock = ManualClock::new();
    let mut canvas = open_canvas(RecordingStore::new(&conn), &clock);
    let board = canvas.board_id();

    let hub = canvas
        .service()
        .create_item_node(
            board,
            NewNode::new("task", Position::new(400.0, 200.0)),
            &Atom::new(AtomType::Task, "hub"),
        )
        .unwrap();
    canvas.tick();
    let size = Size::new(200.0, 100.0);
    let a = add_node(&mut canvas, "note", Position::new(0.0, 0.0), size);
    let b = add_node(&mut canvas, "note", Position::new(0.0, 400.0), size);
    let c = add_node(&mut canvas, "stat", Position::new(800.0, 0.0), size);

    canvas.connect(hub, a, EdgeStyle::Default).unwrap();
    canvas.connect(b, hub, EdgeStyle::Dependency).unwrap();
    canvas.connect(hub, c, EdgeStyle::Flow).unwrap();
    let survivor = canvas.connect(a, b, EdgeStyle::Default).unwrap();
    canvas.service().store().reset_counts();

    canvas.delete_node(hub);

    let store = canvas.service().store();
    assert_eq!(store.count("delete_node"), 1);
    assert_eq!(store.count("delete_edge"), 3);
    assert_eq!(store.count("delete_linked_item"), 1);
    assert!(canvas.write_failures().is_empty());

    let snapshot = canvas.service().snapshot(board).unwrap();
    assert_eq!(snapshot.nodes.len(), 3);
    assert_eq!(snapshot.edges.len(), 1);
    assert_eq!(snapshot.edges[0].id, survivor);
    assert!(canvas.model().node(hub).is_none());
    assert_eq!(canvas.model().edges().len(), 1);
}

#[test]
fn failed_edge_delete_keeps_node_and_its_item() {
    let conn = open_db_in_memory().unwrap();
    let clock = ManualClock::new();
    let mut canvas = open_canvas(RecordingStore::new(&conn), &clock);
    let board = canvas.board_id();
    let task = canvas
        .service()
        .create_item_node(
            board,
            NewNode::new("task", Position::new(0.0, 0.0)),
            &Atom::new(AtomType::Task, "file taxes"),
        )
        .unwrap();
    canvas.tick();
    let note = add_node(&mut canvas, "note", Position::new(400.0, 0.0), Size::new(200.0, 100.0));
    canvas.connect(task, note, EdgeStyle::Default).unwrap();
    let item = canvas.model().node(task).unwrap().linked_item.unwrap().item_id;
    canvas.service().store().fail("delete_edge");
    canvas.service().store().reset_counts();

    assert!(!canvas.delete_node(task));

    let atoms = SqliteAtomRepository::try_new(&conn).unwrap();
    assert!(atoms.get_atom(item, false).unwrap().is_some());
    assert!(canvas.service().store().get_node(task).unwrap().is_some());
    assert!(canvas.model().node(task).is_some());
    assert_eq!(canvas.service().store().count("delete_linked_item"), 0);
    assert_eq!(canvas.write_failures().back().unwrap().op, WriteOp::DeleteNode);

    canvas.service().store().heal("delete_edge");
    assert!(canvas.delete_node(task));
    assert!(atoms.get_atom(item, false).unwrap().is_none());
    assert!(canvas.service().store().get_node(task).unwrap().is_none());
}

#[test]
fn failed_delete_keeps_pending_resize() {
    let conn = open_db_in_memory().unwrap();
    let clock = ManualClock::new();
    let mut canvas = open_canvas(RecordingStore::new(&conn), &clock);
    let node = add_node(&mut canvas, "note", Position::new(0.0, 0.0), Size::new(200.0, 100.0));
    resize(
        &mut canvas,
        node,
        Position::new(200.0, 100.0),
        Position::new(300.0, 160.0),
    );

    canvas.service_mut().set_identity(None);
    assert!(!canvas.delete_node(node));
    assert!(canvas.has_pending_writes());

    canvas.service_mut().set_identity(Some(Identity::new(USER)));
    clock.advance(800);
    canvas.tick();
    let stored = canvas.service().store().get_node(node).unwrap().unwrap();
    assert_eq!(stored.size, Some(Size::new(300.0, 160.0)));
}

#[test]
fn failed_commit_keeps_local_position_and_records_failure() {
    let conn = open_db_in_memory().unwrap();
    let clock = ManualClock::new();
    let mut canvas = open_canvas(RecordingStore::new(&conn), &clock);
    let node = add_node(&mut canvas, "note", Position::new(0.0, 0.0), Size::new(200.0, 100.0));
    canvas.service().store().fail("update_node_position");

    drag(
        &mut canvas,
        node,
        Position::new(10.0, 10.0),
        Position::new(113.0, 67.0),
    );

    assert_eq!(
        canvas.model().node(node).unwrap().position,
        Position::new(100.0, 60.0)
    );
    let failures = canvas.take_write_failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].op, WriteOp::MoveNode);
    assert_eq!(failures[0].target, Some(node));

    canvas.service().store().heal("update_node_position");
    let stored = canvas.service().store().get_node(node).unwrap().unwrap();
    assert_eq!(stored.position, Position::new(0.0, 0.0));
}

#[test]
fn signed_out_canvas_issues_no_store_writes() {
    let conn = open_db_in_memory().unwrap();
    let clock = ManualClock::new();
    let mut canvas = open_canvas(RecordingStore::new(&conn), &clock);
    let node = add_node(&mut canvas, "note", Position::new(0.0, 0.0), Size::new(200.0, 100.0));
    canvas.service_mut().set_identity(None);
    canvas.service().store().reset_counts();

    drag(
        &mut canvas,
        node,
        Position::new(10.0, 10.0),
        Position::new(113.0, 67.0),
    );
    canvas.delete_node(node);

    assert_eq!(total_writes(canvas.service().store()), 0);
    let ops: Vec<_> = canvas.write_failures().iter().map(|f| f.op).collect();
    assert_eq!(ops, vec![WriteOp::MoveNode, WriteOp::DeleteNode]);
    assert!(canvas.write_failures()[0].message.contains("authenticated"));
}

#[test]
fn create_menu_spawns_offered_type_at_snapped_point() {
    let conn = open_db_in_memory().unwrap();
    let clock = ManualClock::new();
    let mut canvas = open_canvas(RecordingStore::new(&conn), &clock);

    canvas.handle_event(PointerEvent::DoubleClick {
        target: HitTarget::Canvas,
        screen: Position::new(333.0, 147.0),
    });
    assert!(canvas
        .menu_options()
        .iter()
        .any(|definition| definition.tag() == "task"));

    assert_eq!(canvas.choose_template("kanban"), None);
    assert!(matches!(canvas.phase(), GesturePhase::CreateMenuOpen { .. }));

    let node = canvas.choose_template("task").unwrap();
    assert_eq!(canvas.phase(), GesturePhase::Idle);
    let created = canvas.model().node(node).unwrap();
    assert_eq!(created.position, Position::new(340.0, 140.0));
    assert_eq!(created.size, Some(Size::new(280.0, 160.0)));
    assert!(created.selected);
    assert!(created.linked_item.map_or(false, |link| link.owned));
    assert_eq!(created.props["owner_id"], "user_1");
    assert_eq!(canvas.service().store().count("create_linked_item"), 1);

    assert_eq!(canvas.choose_template("task"), None);
}

#[test]
fn dismissing_menu_creates_nothing() {
    let conn = open_db_in_memory().unwrap();
    let clock = ManualClock::new();
    let mut canvas = open_canvas(RecordingStore::new(&conn), &clock);
    canvas.handle_event(PointerEvent::DoubleClick {
        target: HitTarget::Canvas,
        screen: Position::new(50.0, 50.0),
    });
    assert!(canvas.dismiss_menu());
    assert!(!canvas.dismiss_menu());
    assert_eq!(canvas.service().store().count("create_node"), 0);
}

#[test]
fn rebuild_during_drag_keeps_dragged_geometry() {
    let conn = open_db_in_memory().unwrap();
    let clock = ManualClock::new();
    let mut canvas = open_canvas(RecordingStore::new(&conn), &clock);
    let size = Size::new(200.0, 100.0);
    let dragged = add_node(&mut canvas, "note", Position::new(0.0, 0.0), size);
    let other = add_node(&mut canvas, "note", Position::new(400.0, 0.0), size);

    canvas.handle_event(PointerEvent::Down {
        target: HitTarget::Node(dragged),
        screen: Position::new(10.0, 10.0),
    });
    canvas.handle_event(PointerEvent::Move {
        screen: Position::new(57.0, 33.0),
    });

    let foreign = SqliteBoardStore::try_new(&conn).unwrap();
    foreign
        .update_node_position(other, Position::new(400.0, 300.0))
        .unwrap();
    assert!(canvas.tick());

    assert_eq!(
        canvas.model().node(dragged).unwrap().position,
        Position::new(47.0, 23.0)
    );
    assert_eq!(
        canvas.model().node(other).unwrap().position,
        Position::new(400.0, 300.0)
    );
    assert_eq!(canvas.model().selected(), Some(dragged));
}

#[test]
fn dropping_canvas_flushes_pending_resize() {
    let conn = open_db_in_memory().unwrap();
    let clock = ManualClock::new();
    let mut canvas = open_canvas(RecordingStore::new(&conn), &clock);
    let node = add_node(&mut canvas, "note", Position::new(0.0, 0.0), Size::new(200.0, 100.0));

    canvas.handle_event(PointerEvent::Down {
        target: HitTarget::ResizeHandle(node),
        screen: Position::new(200.0, 100.0),
    });
    canvas.handle_event(PointerEvent::Up {
        screen: Position::new(300.0, 160.0),
    });
    assert!(canvas.has_pending_writes());
    drop(canvas);

    let store = SqliteBoardStore::try_new(&conn).unwrap();
    let stored = store.get_node(node).unwrap().unwrap();
    assert_eq!(stored.size, Some(Size::new(300.0, 160.0)));
}

#[test]
fn discarded_resize_is_never_written() {
    let conn = open_db_in_memory().unwrap();
    let clock = ManualClock::new();
    let mut canvas = open_canvas(RecordingStore::new(&conn), &clock);
    let node = add_node(&mut canvas, "note", Position::new(0.0, 0.0), Size::new(200.0, 100.0));

    canvas.handle_event(PointerEvent::Down {
        target: HitTarget::ResizeHandle(node),
        screen: Position::new(200.0, 100.0),
    });
    canvas.handle_event(PointerEvent::Up {
        screen: Position::new(300.0, 160.0),
    });
    assert_eq!(canvas.discard_pending(), 1);
    drop(canvas);

    let store = SqliteBoardStore::try_new(&conn).unwrap();
    let stored = store.get_node(node).unwrap().unwrap();
    assert_eq!(stored.size, Some(Size::new(200.0, 100.0)));
}

#[test]
fn edge_paths_follow_style() {
    let conn = open_db_in_memory().unwrap();
    let clock = ManualClock::new();
    let mut canvas = open_canvas(RecordingStore::new(&conn), &clock);
    let size = Size::new(200.0, 100.0);
    let a = add_node(&mut canvas, "note", Position::new(0.0, 0.0), size);
    let b = add_node(&mut canvas, "note", Position::new(400.0, 200.0), size);

    let dependency = canvas.connect(a, b, EdgeStyle::Dependency).unwrap();
    let flow = canvas.connect(b, a, EdgeStyle::Flow).unwrap();

    assert_eq!(
        canvas.edge_path(dependency).unwrap(),
        vec![
            Position::new(100.0, 50.0),
            Position::new(300.0, 50.0),
            Position::new(300.0, 250.0),
            Position::new(500.0, 250.0),
        ]
    );
    assert_eq!(
        canvas.edge_path(flow).unwrap(),
        vec![Position::new(500.0, 250.0), Position::new(100.0, 50.0)]
    );
    assert!(canvas.connect(a, a, EdgeStyle::Default).is_none());
}

#[test]
fn unknown_node_types_render_nothing() {
    let conn = open_db_in_memory().unwrap();
    let clock = ManualClock::new();
    let mut canvas = open_canvas(RecordingStore::new(&conn), &clock);
    add_node(&mut canvas, "note", Position::new(0.0, 0.0), Size::new(200.0, 100.0));

    let raw = SqliteBoardStore::try_new(&conn).unwrap();
    raw.create_node(
        canvas.board_id(),
        &NewNode::new("retired-widget", Position::new(400.0, 0.0)),
    )
    .unwrap();
    canvas.tick();

    assert_eq!(canvas.model().nodes().len(), 2);
    let views = canvas.render();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].title, "Note");
}
