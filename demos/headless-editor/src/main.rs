//! A headless Tilecamp client that connects, identifies, and plays a short
//! scripted editing session, then idles until Ctrl-C.
//!
//! ```text
//! cargo run -p headless-editor -- ws://127.0.0.1:8080/ws ./tilecamp.json
//! RUST_LOG=tilecamp=debug cargo run -p headless-editor
//! ```

use tilecamp::prelude::*;
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "ws://127.0.0.1:8080/ws";
const DEFAULT_TOKEN_FILE: &str = "tilecamp.json";
const FRAME_RATE: u32 = 30;

/// One frame's worth of scripted input.
#[derive(Debug, Clone, Copy)]
enum Step {
    Key(&'static str),
    Tool(Tool),
    SheetTile { x: f32, y: f32 },
    Object(ObjectKind),
    Drag { from: (f32, f32), to: (f32, f32) },
    Click(f32, f32),
    Idle,
}

/// Switch the editor on, paint a strip of tiles from the second sheet,
/// place a butterfly, then switch the editor off again.
const SCRIPT: &[Step] = &[
    Step::Key("KeyE"),
    Step::Tool(Tool::TilePicker),
    Step::SheetTile { x: 10.0, y: 10.0 },
    Step::Drag { from: (0.5, 0.5), to: (6.5, 0.5) },
    Step::Tool(Tool::ObjectPicker),
    Step::Object(ObjectKind::Butterfly),
    Step::Click(3.5, 2.5),
    Step::Idle,
    Step::Key("KeyE"),
];

fn apply<T, S, M, U>(client: &mut Client<T, S, M, U>, step: Step) -> Result<(), TilecampError>
where
    T: Transport,
    S: TokenStore,
    M: MapCollaborator + 'static,
    U: UiCollaborator,
{
    match step {
        Step::Key(code) => {
            client.key_down(code);
            client.key_up(code);
        }
        Step::Tool(tool) => {
            client.select_tool(tool);
        }
        Step::SheetTile { x, y } => {
            // Cycle to the second sheet before picking.
            client.next_tile_set();
            client.pick_sheet_tile(x, y, 400.0, 400.0);
        }
        Step::Object(kind) => {
            client.pick_object(kind);
        }
        Step::Drag { from, to } => {
            client.pointer_down(from.0, from.1)?;
            let steps = 8;
            for i in 1..=steps {
                let t = i as f32 / steps as f32;
                client.pointer_move(from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * t)?;
            }
            client.pointer_up();
        }
        Step::Click(x, y) => {
            client.pointer_down(x, y)?;
            client.pointer_up();
        }
        Step::Idle => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .init();

    let mut args = std::env::args().skip(1);
    let url = args.next().unwrap_or_else(|| DEFAULT_URL.to_string());
    let token_file = args.next().unwrap_or_else(|| DEFAULT_TOKEN_FILE.to_string());

    let transport = WebSocketTransport::connect(&url)?;
    let store = FileTokenStore::open(&token_file)?;
    let mut client = ClientBuilder::new()
        .frame_rate(FRAME_RATE)
        .build(transport, store, GridMap::default(), NullUi)?;

    tracing::info!(%url, %token_file, "connected; running edit script");

    let mut frames = TickScheduler::with_rate(FRAME_RATE);
    for &step in SCRIPT {
        frames.wait_for_tick().await;
        if let Err(e) = apply(&mut client, step) {
            tracing::warn!(?step, error = %e, "scripted step failed");
        }
        let report = client.tick();
        let utilization = frames.record_tick_end().unwrap_or_else(|| frames.last_utilization());
        tracing::info!(?step, flush = ?report.flush, toggled = ?report.toggled, utilization, "frame");
    }

    tracing::info!(tiles = client.map().tile_count(), "script done; idling until Ctrl-C");
    client
        .run(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;

    Ok(())
}
