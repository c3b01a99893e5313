//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `lazyboard_core` linkage.
//! - Drive one in-memory board through template expansion, a drag and an
//!   auto-layout, printing deterministic counts.

use lazyboard_core::{
    open_db_in_memory, BoardCanvas, BoardCategory, BoardScope, BoardService, CanvasConfig,
    HitTarget, Identity, ManualClock, PointerEvent, Position, SqliteBoardStore, SurfaceSize,
    TemplateService,
};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("lazyboard_core ping={}", lazyboard_core::ping());
    println!("lazyboard_core version={}", lazyboard_core::core_version());

    match run_scenario() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("scenario failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_scenario() -> Result<(), Box<dyn Error>> {
    let conn = open_db_in_memory()?;
    let scope = BoardScope::Owner("cli".to_string());
    let service =
        BoardService::new(SqliteBoardStore::try_new(&conn)?).with_identity(Identity::new("cli"));
    let board_id =
        TemplateService::new(&service).create_default_board(&scope, BoardCategory::Personal)?;

    let clock = ManualClock::new();
    let mut canvas =
        BoardCanvas::open(service, board_id, CanvasConfig::default(), Box::new(clock))?;
    canvas.set_surface_size(SurfaceSize::new(1280.0, 800.0));
    println!("board nodes={}", canvas.model().nodes().len());

    if let Some(first) = canvas.model().nodes().first().map(|node| (node.id, node.position)) {
        let (node_id, origin) = first;
        let grab = canvas.viewport().canvas_to_screen(origin);
        canvas.handle_event(PointerEvent::Down {
            target: HitTarget::Node(node_id),
            screen: grab,
        });
        let release = Position::new(grab.x + 63.0, grab.y + 17.0);
        canvas.handle_event(PointerEvent::Move { screen: release });
        canvas.handle_event(PointerEvent::Up { screen: release });
        if let Some(node) = canvas.model().node(node_id) {
            println!("drag committed x={} y={}", node.position.x, node.position.y);
        }
    }

    println!("auto_layout placed={}", canvas.auto_layout());
    canvas.tick();
    println!("rendered views={}", canvas.render().len());
    println!("write failures={}", canvas.write_failures().len());
    Ok(())
}
