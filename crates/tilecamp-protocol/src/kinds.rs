//! The closed sets of kinds that cross the wire, and their name tables.
//!
//! Each kind enum has one static table and one process-wide
//! [`TypeRegistry`] built from it on first access. Adding a kind means
//! adding a variant and a table row; the bijection test below catches a
//! forgotten row.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::{ProtocolError, TypeRegistry};

// ---------------------------------------------------------------------------
// EventKind
// ---------------------------------------------------------------------------

/// Every event shape the client sends or receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Client → Server: "this is who I am" (session token).
    Identify,
    /// Client → Server: one map edit (tile, new object, moved object).
    Edit,
    /// Server → Client: authoritative tiles and objects.
    Map,
    /// Server → Client: an object left the world.
    Leave,
}

const EVENT_KINDS: &[(&str, EventKind)] = &[
    ("identify", EventKind::Identify),
    ("edit", EventKind::Edit),
    ("map", EventKind::Map),
    ("leave", EventKind::Leave),
];

impl EventKind {
    /// All variants, in table order.
    pub const ALL: [EventKind; 4] = [
        EventKind::Identify,
        EventKind::Edit,
        EventKind::Map,
        EventKind::Leave,
    ];

    /// The process-wide event registry.
    ///
    /// Built once on first access. The table is a compile-time constant,
    /// so a failure here is a bug in [`EVENT_KINDS`], not bad input.
    pub fn registry() -> &'static TypeRegistry<EventKind> {
        static REGISTRY: OnceLock<TypeRegistry<EventKind>> = OnceLock::new();
        REGISTRY.get_or_init(|| {
            TypeRegistry::from_table(EVENT_KINDS)
                .expect("event kind table must be a bijection")
        })
    }

    /// Wire name of this kind.
    pub fn name(self) -> Result<&'static str, ProtocolError> {
        Self::registry().name_of(self)
    }

    /// Resolves a wire name.
    pub fn from_name(name: &str) -> Result<Self, ProtocolError> {
        Self::registry().kind_of(name)
    }
}

// ---------------------------------------------------------------------------
// ObjectKind
// ---------------------------------------------------------------------------

/// Everything that can be placed in the world.
///
/// On the wire an object's type is its registry name (`"butterfly"`), so
/// this enum serializes through the registry rather than through serde's
/// derived variant names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Player,
    Butterfly,
    Flower,
    FlowerSpawnArea,
    Drop,
}

const OBJECT_KINDS: &[(&str, ObjectKind)] = &[
    ("player", ObjectKind::Player),
    ("butterfly", ObjectKind::Butterfly),
    ("flower", ObjectKind::Flower),
    ("flower-spawn-area", ObjectKind::FlowerSpawnArea),
    ("drop", ObjectKind::Drop),
];

impl ObjectKind {
    /// All variants, in table order.
    pub const ALL: [ObjectKind; 5] = [
        ObjectKind::Player,
        ObjectKind::Butterfly,
        ObjectKind::Flower,
        ObjectKind::FlowerSpawnArea,
        ObjectKind::Drop,
    ];

    /// The process-wide object registry.
    pub fn registry() -> &'static TypeRegistry<ObjectKind> {
        static REGISTRY: OnceLock<TypeRegistry<ObjectKind>> = OnceLock::new();
        REGISTRY.get_or_init(|| {
            TypeRegistry::from_table(OBJECT_KINDS)
                .expect("object kind table must be a bijection")
        })
    }

    /// Wire name of this kind.
    pub fn name(self) -> Result<&'static str, ProtocolError> {
        Self::registry().name_of(self)
    }

    /// Resolves a wire name.
    pub fn from_name(name: &str) -> Result<Self, ProtocolError> {
        Self::registry().kind_of(name)
    }
}

impl Serialize for ObjectKind {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let name = self.name().map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(name)
    }
}

impl<'de> Deserialize<'de> for ObjectKind {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        ObjectKind::from_name(&name).map_err(serde::de::Error::custom)
    }
}
