//! Event payloads and the envelope that carries them.
//!
//! The wire format is deliberately small. A batch is a JSON array of
//! envelopes, and an envelope is a two-element array `[typeId, payload]`:
//!
//! ```text
//! [
//!   ["identify", { "token": "9f2c..." }],
//!   ["edit",     { "tile": [4, 7, 0, 12] }],
//!   ["edit",     { "moveObj": { "id": "b-17", "pos": [3.5, 2.0] } }]
//! ]
//! ```
//!
//! The type id is always a [`TypeRegistry`](crate::TypeRegistry) name, so
//! the receiver can resolve it back into an [`EventKind`].

use serde::{Deserialize, Serialize};

use crate::{EventKind, ObjectKind, ProtocolError};

// ---------------------------------------------------------------------------
// Edit payload pieces
// ---------------------------------------------------------------------------

/// One painted map cell: `[x, y, tileSetIndex, tileIndex]` on the wire.
///
/// `#[serde(from, into)]` routes (de)serialization through the array form,
/// so the struct keeps readable field names while the JSON stays compact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct TileEdit {
    pub x: i32,
    pub y: i32,
    pub tile_set: i32,
    pub tile_index: i32,
}

impl From<[i32; 4]> for TileEdit {
    fn from([x, y, tile_set, tile_index]: [i32; 4]) -> Self {
        Self {
            x,
            y,
            tile_set,
            tile_index,
        }
    }
}

impl From<TileEdit> for [i32; 4] {
    fn from(t: TileEdit) -> Self {
        [t.x, t.y, t.tile_set, t.tile_index]
    }
}

/// An object reference inside an edit.
///
/// Add-intents carry `type` (which kind to create), move-intents carry `id`
/// (which existing instance to move). Use [`ObjDef::add`] and
/// [`ObjDef::moved`]; they are the only shapes the server accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ObjectKind>,

    pub pos: [f32; 2],
}

impl ObjDef {
    /// "Create a new `kind` at `pos`."
    pub fn add(kind: ObjectKind, pos: [f32; 2]) -> Self {
        Self {
            id: None,
            kind: Some(kind),
            pos,
        }
    }

    /// "Move the existing object `id` to `pos`."
    pub fn moved(id: impl Into<String>, pos: [f32; 2]) -> Self {
        Self {
            id: Some(id.into()),
            kind: None,
            pos,
        }
    }
}

// ---------------------------------------------------------------------------
// Client → Server events
// ---------------------------------------------------------------------------

/// Identifies this client install to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifyEvent {
    pub token: String,
}

/// A single edit intent.
///
/// Serde's default (externally tagged) enum representation gives exactly
/// the wire shape: `{ "tile": [...] }`, `{ "addObj": {...} }` or
/// `{ "moveObj": {...} }`. Because it's an enum, an edit can never carry
/// two of them at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditEvent {
    Tile(TileEdit),
    AddObj(ObjDef),
    MoveObj(ObjDef),
}

/// Everything the client can put on the outbound queue.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    Identify(IdentifyEvent),
    Edit(EditEvent),
}

impl ClientEvent {
    /// The registry kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Identify(_) => EventKind::Identify,
            Self::Edit(_) => EventKind::Edit,
        }
    }

    /// Wraps this event in an envelope, resolving its wire name.
    ///
    /// # Errors
    /// [`ProtocolError::UnknownKind`] if the kind has no registered name,
    /// [`ProtocolError::Encode`] if the payload can't be serialized.
    pub fn to_envelope(&self) -> Result<Envelope, ProtocolError> {
        match self {
            Self::Identify(evt) => Envelope::from_event(self.kind(), evt),
            Self::Edit(evt) => Envelope::from_event(self.kind(), evt),
        }
    }
}

impl From<IdentifyEvent> for ClientEvent {
    fn from(evt: IdentifyEvent) -> Self {
        Self::Identify(evt)
    }
}

impl From<EditEvent> for ClientEvent {
    fn from(evt: EditEvent) -> Self {
        Self::Edit(evt)
    }
}

// ---------------------------------------------------------------------------
// Server → Client events
// ---------------------------------------------------------------------------

/// Authoritative state of one object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjState {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    pub pos: [f32; 2],
}

/// Authoritative tiles and objects. Objects are upserts keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapEvent {
    #[serde(default)]
    pub tiles: Vec<TileEdit>,
    #[serde(default)]
    pub objs: Vec<ObjState>,
}

/// An object left the world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveEvent {
    pub id: String,
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// `(typeId, payload)`: the unit of transmission.
///
/// The payload stays an untyped [`serde_json::Value`] until a handler for
/// the resolved kind decodes it. That keeps decoding of one bad entry from
/// failing the whole batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(String, serde_json::Value)", into = "(String, serde_json::Value)")]
pub struct Envelope {
    pub type_id: String,
    pub payload: serde_json::Value,
}

impl Envelope {
    /// Builds an envelope for `event` under the wire name of `kind`.
    pub fn from_event<E: Serialize>(
        kind: EventKind,
        event: &E,
    ) -> Result<Self, ProtocolError> {
        Ok(Self {
            type_id: kind.name()?.to_string(),
            payload: serde_json::to_value(event)
                .map_err(ProtocolError::Encode)?,
        })
    }

    /// Reads one batch element as a `[typeId, payload]` pair.
    ///
    /// # Errors
    /// [`ProtocolError::MalformedEvent`] if `value` isn't a pair with a
    /// string type id.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ProtocolError> {
        serde_json::from_value(value)
            .map_err(|e| ProtocolError::MalformedEvent(format!("bad envelope: {e}")))
    }

    /// Resolves the type id through the event registry.
    pub fn kind(&self) -> Result<EventKind, ProtocolError> {
        EventKind::from_name(&self.type_id)
    }

    /// Decodes the payload into a concrete event type.
    pub fn decode_payload<E: serde::de::DeserializeOwned>(
        &self,
    ) -> Result<E, ProtocolError> {
        E::deserialize(&self.payload).map_err(ProtocolError::Decode)
    }
}

impl From<(String, serde_json::Value)> for Envelope {
    fn from((type_id, payload): (String, serde_json::Value)) -> Self {
        Self { type_id, payload }
    }
}

impl From<Envelope> for (String, serde_json::Value) {
    fn from(env: Envelope) -> Self {
        (env.type_id, env.payload)
    }
}

// ---------------------------------------------------------------------------
// EventSink
// ---------------------------------------------------------------------------

/// Anything that accepts outbound events.
///
/// The editor and the session identity emit through this trait rather
/// than holding the pipeline itself, so they can be tested against a plain
/// `Vec`.
pub trait EventSink {
    /// Appends an event. Never fails.
    fn enqueue(&mut self, event: ClientEvent);
}

impl EventSink for Vec<ClientEvent> {
    fn enqueue(&mut self, event: ClientEvent) {
        self.push(event);
    }
}

// =========================================================================
// Tests
// =========================================================================
