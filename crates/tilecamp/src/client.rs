//! `Client` builder and frame loop.
//!
//! This is the entry point for a Tilecamp host. It ties together all the
//! layers: transport → protocol → session → editor. The host feeds raw
//! input in as it arrives and calls [`Client::tick`] once per frame:
//!
//! 1. drain inbound batches into the map through the dispatcher,
//! 2. let the editor see this frame's key presses,
//! 3. flush the outbound queue,
//! 4. forget this frame's input.

use std::collections::HashSet;
use std::future::Future;

use tilecamp_editor::{
    Cell, Editor, EditorConfig, MapCollaborator, MapTile, Tool, UiCollaborator, WorldObject,
};
use tilecamp_protocol::{EventKind, LeaveEvent, MapEvent, ObjectKind};
use tilecamp_session::{SessionIdentity, TokenStore};
use tilecamp_tick::{TickConfig, TickScheduler};
use tilecamp_transport::Transport;

use crate::{DispatchReport, EventPipeline, FlushResult, InboundDispatcher, TilecampError};

/// What happened during one [`Client::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    /// Inbound entries handled and skipped this frame.
    pub inbound: DispatchReport,
    /// `Some(enabled)` if the editor was toggled this frame.
    pub toggled: Option<bool>,
    /// What the end-of-frame flush did.
    pub flush: FlushResult,
}

/// Input collected since the last frame.
#[derive(Debug, Default)]
struct FrameInput {
    /// Keys pressed this frame, in order.
    pressed: Vec<String>,
    /// Keys currently held down.
    held: HashSet<String>,
    pointer_down: bool,
    /// A toolbar or dialog took this frame's click.
    interaction_consumed: bool,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for configuring a [`Client`].
///
/// # Example
///
/// ```rust,ignore
/// use tilecamp::prelude::*;
///
/// let mut client = ClientBuilder::new()
///     .frame_rate(30)
///     .build(transport, FileTokenStore::open("tilecamp.json")?, GridMap::default(), NullUi)?;
/// client.run(shutdown).await;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClientBuilder {
    editor_config: EditorConfig,
    tick_config: TickConfig,
}

impl ClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the editor configuration.
    pub fn editor_config(mut self, config: EditorConfig) -> Self {
        self.editor_config = config;
        self
    }

    /// Sets the frame rate [`Client::run`] ticks at.
    pub fn frame_rate(mut self, hz: u32) -> Self {
        self.tick_config.tick_rate_hz = hz;
        self
    }

    /// Sets the full frame scheduler configuration.
    pub fn tick_config(mut self, config: TickConfig) -> Self {
        self.tick_config = config;
        self
    }

    /// Builds the client and queues the startup identify.
    ///
    /// The `map` and `leave` handlers that keep `map` in sync with the
    /// server are registered here.
    ///
    /// # Errors
    /// [`TilecampError::Session`] if the session token can't be persisted.
    pub fn build<T, S, M, U>(
        self,
        transport: T,
        store: S,
        map: M,
        ui: U,
    ) -> Result<Client<T, S, M, U>, TilecampError>
    where
        T: Transport,
        S: TokenStore,
        M: MapCollaborator + 'static,
        U: UiCollaborator,
    {
        let mut dispatcher = InboundDispatcher::new();
        register_map_handlers(&mut dispatcher)?;

        let mut pipeline = EventPipeline::new();
        let mut identity = SessionIdentity::new(store);
        identity.identify(&mut pipeline)?;

        tracing::info!(frame_rate = self.tick_config.tick_rate_hz, "client started");

        Ok(Client {
            transport,
            identity,
            pipeline,
            dispatcher,
            editor: Editor::new(self.editor_config),
            map,
            ui,
            input: FrameInput::default(),
            tick_config: self.tick_config,
        })
    }
}

/// Keeps the local map in step with the server's `map` and `leave` events.
///
/// Both handlers are idempotent: replaying an event leaves the map as it
/// was after the first delivery.
fn register_map_handlers<M>(dispatcher: &mut InboundDispatcher<M>) -> Result<(), TilecampError>
where
    M: MapCollaborator + 'static,
{
    dispatcher.register_typed(EventKind::Map, |map: &mut M, evt: MapEvent| {
        for tile in evt.tiles {
            let Ok(tile_set) = usize::try_from(tile.tile_set) else {
                tracing::warn!(?tile, "ignoring tile with negative tile set");
                continue;
            };
            map.set_tile(Cell::new(tile.x, tile.y), MapTile::new(tile_set, tile.tile_index));
        }
        for obj in evt.objs {
            map.upsert_object(WorldObject {
                id: obj.id,
                kind: obj.kind,
                pos: obj.pos.into(),
            });
        }
    })?;

    dispatcher.register_typed(EventKind::Leave, |map: &mut M, evt: LeaveEvent| {
        if !map.remove_object(&evt.id) {
            tracing::debug!(id = %evt.id, "leave for unknown object");
        }
    })?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// A frame-driven Tilecamp client.
///
/// Owns the transport, the session identity, the outbound pipeline, the
/// inbound dispatcher, the editor, and the host's map and UI
/// collaborators.
pub struct Client<T, S, M, U>
where
    S: TokenStore,
{
    transport: T,
    identity: SessionIdentity<S>,
    pipeline: EventPipeline,
    dispatcher: InboundDispatcher<M>,
    editor: Editor,
    map: M,
    ui: U,
    input: FrameInput,
    tick_config: TickConfig,
}

impl<T, S, M, U> Client<T, S, M, U>
where
    T: Transport,
    S: TokenStore,
    M: MapCollaborator + 'static,
    U: UiCollaborator,
{
    // -- Keyboard ---------------------------------------------------------

    /// A key went down. `code` is a `KeyboardEvent.code` value.
    pub fn key_down(&mut self, code: &str) {
        self.input.pressed.push(code.to_string());
        self.input.held.insert(code.to_string());
    }

    /// A key was released.
    pub fn key_up(&mut self, code: &str) {
        self.input.held.remove(code);
    }

    fn pick_modifier_held(&self) -> bool {
        self.input.held.iter().any(|k| self.editor.is_pick_modifier(k))
    }

    // -- Pointer ----------------------------------------------------------

    /// The pointer was pressed at screen `(x, y)`.
    ///
    /// With a pick modifier held this selects the tile under the pointer;
    /// otherwise it draws with the current pen. Returns `true` if the
    /// editor took the click.
    ///
    /// The press is remembered even while the editor is off, so a drag
    /// that is still held when the editor comes on starts drawing.
    pub fn pointer_down(&mut self, x: f32, y: f32) -> Result<bool, TilecampError> {
        if self.input.interaction_consumed {
            return Ok(false);
        }
        self.input.pointer_down = true;

        if self.pick_modifier_held() {
            let tile = self.map.pick_tile(x, y);
            return Ok(self.editor.use_tile(tile));
        }
        Ok(self.editor.draw(x, y, &mut self.map, &mut self.pipeline)?)
    }

    /// The pointer moved. Draws while the pointer is held down, pick
    /// modifier or not.
    pub fn pointer_move(&mut self, x: f32, y: f32) -> Result<bool, TilecampError> {
        if !self.input.pointer_down || self.input.interaction_consumed {
            return Ok(false);
        }
        Ok(self.editor.draw(x, y, &mut self.map, &mut self.pipeline)?)
    }

    pub fn pointer_up(&mut self) {
        self.input.pointer_down = false;
    }

    /// Keeps this frame's remaining pointer input away from the map, e.g.
    /// because a UI widget under the pointer handled it.
    pub fn prevent_interaction(&mut self) {
        self.input.interaction_consumed = true;
    }

    // -- Toolbar and picker -----------------------------------------------

    /// A toolbar button was clicked.
    pub fn select_tool(&mut self, tool: Tool) -> bool {
        let consumed = self.editor.select_tool(tool, &mut self.ui);
        self.consume_if(consumed)
    }

    /// The tile sheet in the picker dialog was clicked. See
    /// [`Editor::pick_tile`].
    pub fn pick_sheet_tile(&mut self, local_x: f32, local_y: f32, width: f32, height: f32) -> bool {
        let consumed = self
            .editor
            .pick_tile(local_x, local_y, width, height, &mut self.ui);
        self.consume_if(consumed)
    }

    /// The picker's "next sheet" button was clicked.
    pub fn next_tile_set(&mut self) -> bool {
        let consumed = self.editor.next_tile_set(&mut self.ui);
        self.consume_if(consumed)
    }

    /// An object in the picker dialog was clicked.
    pub fn pick_object(&mut self, kind: ObjectKind) -> bool {
        let consumed = self.editor.pick_object(kind, &mut self.ui);
        self.consume_if(consumed)
    }

    fn consume_if(&mut self, consumed: bool) -> bool {
        if consumed {
            self.prevent_interaction();
        }
        consumed
    }

    // -- Frame ------------------------------------------------------------

    /// Runs one frame. Never fails: problems are logged and reported.
    pub fn tick(&mut self) -> FrameReport {
        let mut inbound = DispatchReport::default();
        while let Some(frame) = self.transport.receive() {
            inbound.merge(self.dispatcher.dispatch_bytes(&mut self.map, &frame));
        }

        let toggled = self
            .editor
            .update(self.input.pressed.iter().map(String::as_str), &mut self.ui);
        if toggled == Some(false) {
            self.input.pointer_down = false;
        }

        // Flush last, so edits made during this frame go out with it.
        let flush = self.pipeline.flush(&mut self.transport, &mut self.identity);

        self.input.pressed.clear();
        self.input.interaction_consumed = false;

        if inbound != DispatchReport::default() || flush != FlushResult::Empty {
            tracing::debug!(?inbound, ?flush, "frame");
        }

        FrameReport {
            inbound,
            toggled,
            flush,
        }
    }

    /// Ticks at the configured frame rate until `shutdown` resolves.
    pub async fn run(&mut self, shutdown: impl Future<Output = ()>) {
        let mut frames = TickScheduler::new(self.tick_config.clone());
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = frames.wait_for_tick() => {
                    self.tick();
                    frames.record_tick_end();
                }
            }
        }

        tracing::info!(frames = frames.tick_count(), "client loop stopped");
    }

    // -- Accessors --------------------------------------------------------

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut M {
        &mut self.map
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn identity(&self) -> &SessionIdentity<S> {
        &self.identity
    }

    /// The outbound queue for the current frame.
    pub fn pipeline(&self) -> &EventPipeline {
        &self.pipeline
    }

    /// The inbound dispatcher, for registering more handlers.
    pub fn dispatcher_mut(&mut self) -> &mut InboundDispatcher<M> {
        &mut self.dispatcher
    }
}
