//! Integration tests for the client frame loop.
//!
//! A scripted transport stands in for the server: tests push inbound
//! frames into it and decode what the client sent. The map is a
//! `GridMap` with one screen pixel per world unit, so screen and world
//! coordinates coincide.

use std::collections::VecDeque;
use std::time::Duration;

use serde_json::{json, Value};
use tilecamp::prelude::*;

// =========================================================================
// Scripted transport
// =========================================================================

#[derive(Default)]
struct ScriptedTransport {
    sent: Vec<Vec<u8>>,
    inbound: VecDeque<Vec<u8>>,
    fail_sends: bool,
    closed: bool,
    reconnects: u32,
}

impl ScriptedTransport {
    fn push_inbound(&mut self, batch: Value) {
        self.inbound.push_back(serde_json::to_vec(&batch).unwrap());
    }

    /// Every sent batch, decoded.
    fn sent_json(&self) -> Vec<Value> {
        self.sent
            .iter()
            .map(|b| serde_json::from_slice(b).unwrap())
            .collect()
    }
}

impl Transport for ScriptedTransport {
    fn send(&mut self, batch: &[u8]) -> Result<(), TransportError> {
        if self.fail_sends {
            return Err(TransportError::SendFailed("scripted failure".into()));
        }
        self.sent.push(batch.to_vec());
        Ok(())
    }

    fn closed(&self) -> bool {
        self.closed
    }

    fn reconnect(&mut self) -> Result<(), TransportError> {
        self.reconnects += 1;
        self.closed = false;
        self.fail_sends = false;
        Ok(())
    }

    fn receive(&mut self) -> Option<Vec<u8>> {
        self.inbound.pop_front()
    }
}

type TestClient = Client<ScriptedTransport, MemoryTokenStore, GridMap, NullUi>;

// =========================================================================
// Helpers
// =========================================================================

fn client_with_store(store: MemoryTokenStore) -> TestClient {
    ClientBuilder::new()
        .build(ScriptedTransport::default(), store, GridMap::default(), NullUi)
        .unwrap()
}

fn client() -> TestClient {
    client_with_store(MemoryTokenStore::new())
}

/// A client past its startup frame, with the editor switched on and the
/// identify batch cleared from the transport.
fn editing_client() -> TestClient {
    let mut client = client();
    client.key_down("KeyE");
    client.key_up("KeyE");
    let report = client.tick();
    assert_eq!(report.toggled, Some(true));
    client.transport_mut().sent.clear();
    client
}

// =========================================================================
// Startup identify
// =========================================================================

#[test]
fn test_build_fresh_store_generates_persists_and_identifies() {
    let mut client = client();

    let token = client.identity().token().unwrap().to_string();
    assert_eq!(token.len(), 32);
    assert_eq!(client.identity().store().get("token"), Some(token.clone()));

    let report = client.tick();
    assert_eq!(report.flush, FlushResult::Sent { events: 1 });
    assert_eq!(
        client.transport().sent_json(),
        vec![json!([["identify", { "token": token }]])]
    );
}

#[test]
fn test_build_persisted_token_is_reused() {
    let mut store = MemoryTokenStore::new();
    store.set("token", "abc123").unwrap();
    let mut client = client_with_store(store);

    client.tick();
    assert_eq!(
        client.transport().sent_json(),
        vec![json!([["identify", { "token": "abc123" }]])]
    );
}

#[test]
fn test_tick_nothing_queued_sends_nothing() {
    let mut client = client();
    client.tick();
    let report = client.tick();
    assert_eq!(report.flush, FlushResult::Empty);
    assert_eq!(client.transport().sent.len(), 1);
}

// =========================================================================
// Editing through input
// =========================================================================

#[test]
fn test_pointer_down_while_disabled_is_ignored() {
    let mut client = client();
    assert!(!client.pointer_down(3.0, 3.0).unwrap());
    client.tick();
    // Only the startup identify went out.
    assert_eq!(client.transport().sent.len(), 1);
}

#[test]
fn test_drag_paints_each_cell_once_and_flushes_one_batch() {
    let mut client = editing_client();

    client.pointer_down(0.5, 0.5).unwrap();
    client.pointer_move(0.7, 0.5).unwrap();
    client.pointer_move(1.5, 0.5).unwrap();
    client.pointer_up();
    // Released: moves no longer draw.
    client.pointer_move(5.5, 5.5).unwrap();

    let report = client.tick();
    assert_eq!(report.flush, FlushResult::Sent { events: 2 });
    assert_eq!(
        client.transport().sent_json(),
        vec![json!([
            ["edit", { "tile": [0, 0, 0, 0] }],
            ["edit", { "tile": [1, 0, 0, 0] }],
        ])]
    );
    assert_eq!(client.map().tile_count(), 2);
}

#[test]
fn test_flush_clears_queue_between_frames() {
    let mut client = editing_client();

    client.pointer_down(0.5, 0.5).unwrap();
    client.tick();
    assert!(client.pipeline().is_empty());

    let report = client.tick();
    assert_eq!(report.flush, FlushResult::Empty);
    assert_eq!(client.transport().sent.len(), 1);
}

#[test]
fn test_ctrl_click_picks_tile_then_click_paints_it() {
    let mut client = editing_client();
    client.map_mut().set_tile(Cell::new(4, 4), MapTile::new(1, 20));

    client.key_down("ControlLeft");
    assert!(client.pointer_down(4.5, 4.5).unwrap());
    client.pointer_up();
    client.key_up("ControlLeft");
    assert_eq!(client.editor().selected_tile(), MapTile::new(1, 20));

    client.pointer_down(7.5, 7.5).unwrap();
    client.pointer_up();
    client.tick();

    assert_eq!(
        client.transport().sent_json(),
        vec![json!([["edit", { "tile": [7, 7, 1, 20] }]])]
    );
}

#[test]
fn test_ctrl_drag_paints_with_picked_tile() {
    let mut client = editing_client();
    client.map_mut().set_tile(Cell::new(4, 4), MapTile::new(1, 20));

    client.key_down("ControlLeft");
    assert!(client.pointer_down(4.5, 4.5).unwrap());
    // Only the press picks; moves keep drawing with the new tile.
    assert!(client.pointer_move(6.5, 6.5).unwrap());
    client.pointer_up();
    client.tick();

    assert_eq!(
        client.transport().sent_json(),
        vec![json!([["edit", { "tile": [6, 6, 1, 20] }]])]
    );
}

#[test]
fn test_drag_held_while_editor_turns_on_starts_drawing() {
    let mut client = client();
    client.tick();
    client.transport_mut().sent.clear();

    // Editor off: the press draws nothing but is remembered.
    assert!(!client.pointer_down(0.5, 0.5).unwrap());
    client.key_down("KeyE");
    client.key_up("KeyE");
    assert_eq!(client.tick().toggled, Some(true));

    assert!(client.pointer_move(1.5, 0.5).unwrap());
    client.pointer_up();
    client.tick();

    assert_eq!(
        client.transport().sent_json(),
        vec![json!([["edit", { "tile": [1, 0, 0, 0] }]])]
    );
}

#[test]
fn test_toolbar_click_does_not_also_draw() {
    let mut client = editing_client();

    assert!(client.select_tool(Tool::ObjectPicker));
    assert!(!client.pointer_down(2.5, 2.5).unwrap());
    assert!(client.pick_object(ObjectKind::Butterfly));
    client.tick();
    assert!(client.transport().sent.is_empty());

    // Next frame the click reaches the map.
    assert!(client.pointer_down(2.5, 2.5).unwrap());
    client.pointer_up();
    client.tick();
    assert_eq!(
        client.transport().sent_json(),
        vec![json!([["edit", { "addObj": { "type": "butterfly", "pos": [2.5, 2.5] } }]])]
    );
}

#[test]
fn test_toggle_off_stops_drawing() {
    let mut client = editing_client();
    client.pointer_down(0.5, 0.5).unwrap();

    client.key_down("KeyE");
    let report = client.tick();
    assert_eq!(report.toggled, Some(false));
    assert!(!client.editor().is_enabled());

    client.transport_mut().sent.clear();
    assert!(!client.pointer_move(3.5, 3.5).unwrap());
    client.tick();
    assert!(client.transport().sent.is_empty());
}

// =========================================================================
// Inbound
// =========================================================================

#[test]
fn test_inbound_map_event_updates_map() {
    let mut client = client();
    client.transport_mut().push_inbound(json!([
        ["map", {
            "tiles": [[1, 2, 1, 5]],
            "objs": [{ "id": "b-1", "type": "butterfly", "pos": [3.0, 4.0] }],
        }],
    ]));

    let report = client.tick();

    assert_eq!(report.inbound, DispatchReport { handled: 1, skipped: 0 });
    assert_eq!(client.map().tile_at(Cell::new(1, 2)), Some(MapTile::new(1, 5)));
    let obj = client.map().object("b-1").unwrap();
    assert_eq!(obj.kind, ObjectKind::Butterfly);
    assert_eq!(obj.pos, WorldPos::new(3.0, 4.0));
}

#[test]
fn test_inbound_duplicate_delivery_is_idempotent() {
    let mut client = client();
    let batch = json!([
        ["map", { "objs": [{ "id": "p-1", "type": "player", "pos": [1.0, 1.0] }] }],
        ["leave", { "id": "d-9" }],
    ]);
    client.transport_mut().push_inbound(batch.clone());
    client.transport_mut().push_inbound(batch);

    let report = client.tick();

    assert_eq!(report.inbound, DispatchReport { handled: 4, skipped: 0 });
    assert_eq!(client.map().objects().len(), 1);
}

#[test]
fn test_inbound_leave_removes_object() {
    let mut client = client();
    client.transport_mut().push_inbound(json!([
        ["map", { "objs": [{ "id": "d-1", "type": "drop", "pos": [0.0, 0.0] }] }],
    ]));
    client.tick();
    client.transport_mut().push_inbound(json!([["leave", { "id": "d-1" }]]));
    client.tick();

    assert!(client.map().object("d-1").is_none());
}

#[test]
fn test_inbound_malformed_entries_skipped_rest_applied() {
    let mut client = client();
    client.transport_mut().push_inbound(json!([
        ["teleport", { "to": [0, 0] }],
        ["map", { "tiles": "not a list" }],
        ["map", { "tiles": [[0, 0, -1, 3], [2, 2, 0, 3]] }],
    ]));
    client
        .transport_mut()
        .inbound
        .push_back(b"not json".to_vec());

    let report = client.tick();

    assert_eq!(report.inbound, DispatchReport { handled: 1, skipped: 3 });
    // The negative tile set is ignored; the other tile lands.
    assert_eq!(client.map().tile_at(Cell::new(0, 0)), None);
    assert_eq!(client.map().tile_at(Cell::new(2, 2)), Some(MapTile::new(0, 3)));
}

#[test]
fn test_inbound_bad_pairs_in_frame_do_not_drop_neighbours() {
    let mut client = client();
    client.transport_mut().push_inbound(json!([
        ["map", { "tiles": [[1, 1, 0, 2]] }],
        [7, {}],
        ["leave"],
        ["map", { "objs": [{ "id": "b-2", "type": "butterfly", "pos": [0.0, 0.0] }] }],
    ]));

    let report = client.tick();

    assert_eq!(report.inbound, DispatchReport { handled: 2, skipped: 2 });
    assert_eq!(client.map().tile_at(Cell::new(1, 1)), Some(MapTile::new(0, 2)));
    assert!(client.map().object("b-2").is_some());
}

// =========================================================================
// Failure and reconnect
// =========================================================================

#[test]
fn test_send_failure_on_closed_transport_reconnects_and_reidentifies() {
    let mut client = editing_client();
    let token = client.identity().token().unwrap().to_string();

    client.transport_mut().fail_sends = true;
    client.transport_mut().closed = true;
    client.pointer_down(0.5, 0.5).unwrap();

    let report = client.tick();
    assert_eq!(
        report.flush,
        FlushResult::Dropped {
            events: 1,
            reconnected: true
        }
    );
    assert_eq!(client.transport().reconnects, 1);

    // The edit is gone; the next frame carries only the re-identify.
    client.tick();
    assert_eq!(
        client.transport().sent_json(),
        vec![json!([["identify", { "token": token }]])]
    );
}

#[test]
fn test_send_failure_on_open_transport_drops_without_reconnect() {
    let mut client = editing_client();
    client.transport_mut().fail_sends = true;
    client.pointer_down(0.5, 0.5).unwrap();

    let report = client.tick();
    assert_eq!(
        report.flush,
        FlushResult::Dropped {
            events: 1,
            reconnected: false
        }
    );
    assert_eq!(client.transport().reconnects, 0);
    assert!(client.pipeline().is_empty());
}

// =========================================================================
// Dispatcher access
// =========================================================================

#[test]
fn test_default_handlers_cannot_be_registered_twice() {
    let mut client = client();
    let result = client
        .dispatcher_mut()
        .register(EventKind::Map, |_, _| Ok(()));
    assert!(matches!(result, Err(ProtocolError::DuplicateHandler(_))));
}

// =========================================================================
// Frame loop
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_run_ticks_until_shutdown() {
    let mut client = ClientBuilder::new()
        .frame_rate(20)
        .build(
            ScriptedTransport::default(),
            MemoryTokenStore::new(),
            GridMap::default(),
            NullUi,
        )
        .unwrap();
    client.transport_mut().push_inbound(json!([
        ["map", { "tiles": [[9, 9, 0, 1]] }],
    ]));

    client.run(tokio::time::sleep(Duration::from_millis(175))).await;

    // The first frame sent the identify and applied the inbound tile.
    assert_eq!(client.transport().sent.len(), 1);
    assert_eq!(client.map().tile_at(Cell::new(9, 9)), Some(MapTile::new(0, 1)));
}
