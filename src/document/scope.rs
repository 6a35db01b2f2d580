//! Per-document encode and decode state.
//!
//! An [`Encoder`] remembers which shared entities it has already written so
//! each one is embedded once and referenced afterwards. A [`Decoder`]
//! indexes every embedded entity of the document up front, so references
//! resolve regardless of whether they appear before or after the embedding.
//! References only resolve to entities embedded in a slot of the same kind.

use serde_json::{json, Value};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{trace, warn};
use uuid::Uuid;

use super::EntityKind;
use crate::data::{Clip, Recording, Sequence, SoundEvent, User};
use crate::error::{Result, SoundEventError};

/// Key of identifier-only references.
pub const REF_KEY: &str = "$ref";

/// Key holding an embedded entity's identifier.
pub const ID_KEY: &str = "uuid";

/// An entity that can be the root of a document.
pub trait DocumentEntity: Sized {
    const KIND: EntityKind;

    /// Encodes the entity within an ongoing document scope.
    fn encode_with(&self, encoder: &mut Encoder) -> Value;

    /// Decodes the entity within an ongoing document scope.
    fn decode_with<'a>(value: &'a Value, decoder: &mut Decoder<'a>) -> Result<Self>;
}

/// Entities that are embedded once per document and referenced by
/// identifier afterwards.
pub trait Shared: DocumentEntity {
    fn uuid(&self) -> Uuid;

    #[doc(hidden)]
    fn resolved<'d>(cache: &'d mut Resolved) -> &'d mut HashMap<Uuid, Arc<Self>>;
}

/// Encoding state for one document.
#[derive(Debug, Default)]
pub struct Encoder {
    seen: HashSet<(EntityKind, Uuid)>,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Embeds `entity` the first time it is seen, then writes `{"$ref": uuid}`.
    pub fn shared<T: Shared>(&mut self, entity: &T) -> Value {
        let id = entity.uuid();
        if self.seen.insert((T::KIND, id)) {
            entity.encode_with(self)
        } else {
            json!({ "$ref": id.to_string() })
        }
    }

    /// Number of distinct shared entities embedded so far.
    pub fn embedded(&self) -> usize {
        self.seen.len()
    }
}

/// Shared entities decoded so far, one table per kind.
#[doc(hidden)]
#[derive(Debug, Default)]
pub struct Resolved {
    recordings: HashMap<Uuid, Arc<Recording>>,
    clips: HashMap<Uuid, Arc<Clip>>,
    sound_events: HashMap<Uuid, Arc<SoundEvent>>,
    sequences: HashMap<Uuid, Arc<Sequence>>,
    users: HashMap<Uuid, Arc<User>>,
}

/// Field names under which shared entities are embedded.
fn slot_kind(key: &str) -> Option<EntityKind> {
    match key {
        "recording" => Some(EntityKind::Recording),
        "clip" => Some(EntityKind::Clip),
        "sound_event" => Some(EntityKind::SoundEvent),
        "sequence" => Some(EntityKind::Sequence),
        "created_by" | "owners" => Some(EntityKind::User),
        _ => None,
    }
}

/// Embedded entity bodies of one document, keyed by the kind of the slot
/// they were found in.
#[derive(Debug, Default)]
struct Embedded<'a> {
    bodies: HashMap<(EntityKind, Uuid), &'a Value>,
    conflicting: HashSet<(EntityKind, Uuid)>,
}

impl<'a> Embedded<'a> {
    fn visit(&mut self, value: &'a Value, slot: Option<EntityKind>) {
        match value {
            Value::Object(object) => {
                if let Some(kind) = slot.filter(|_| !object.contains_key(REF_KEY)) {
                    let id = object.get(ID_KEY).and_then(Value::as_str).and_then(|s| Uuid::parse_str(s).ok());
                    if let Some(id) = id {
                        self.insert(kind, id, value);
                    }
                }
                for (key, child) in object {
                    self.visit(child, slot_kind(key));
                }
            }
            Value::Array(items) => items.iter().for_each(|child| self.visit(child, slot)),
            _ => {}
        }
    }

    fn insert(&mut self, kind: EntityKind, id: Uuid, body: &'a Value) {
        match self.bodies.entry((kind, id)) {
            Entry::Vacant(entry) => {
                entry.insert(body);
            }
            Entry::Occupied(first) if *first.get() == body => {
                warn!(%kind, %id, "entity embedded more than once");
            }
            Entry::Occupied(_) => {
                warn!(%kind, %id, "entity embedded more than once with different contents");
                self.conflicting.insert((kind, id));
            }
        }
    }

    /// Kind of the slot holding `id`, when it is embedded under another kind.
    fn kind_of(&self, id: Uuid) -> Option<EntityKind> {
        self.bodies.keys().find(|(_, other)| *other == id).map(|(kind, _)| *kind)
    }
}

/// Decoding state for one document.
#[derive(Debug)]
pub struct Decoder<'a> {
    embedded: Embedded<'a>,
    resolved: Resolved,
}

impl<'a> Decoder<'a> {
    /// Indexes every embedded shared entity (an object with a `"uuid"` and
    /// no `"$ref"` in a `recording`, `clip`, `sound_event`, `sequence`,
    /// `created_by` or `owners` slot) found anywhere in `data`.
    pub fn new(data: &'a Value) -> Self {
        let mut embedded = Embedded::default();
        embedded.visit(data, None);
        Self {
            embedded,
            resolved: Resolved::default(),
        }
    }

    /// Number of embedded entities found in the document.
    pub fn embedded(&self) -> usize {
        self.embedded.bodies.len()
    }

    /// Decodes an embedded-or-referenced shared entity.
    ///
    /// Every occurrence of the same identifier yields the same `Arc`. A
    /// reference to an entity embedded under another kind is unresolved, and
    /// an identifier embedded twice with different contents is invalid.
    pub fn shared<T: Shared>(&mut self, value: &'a Value) -> Result<Arc<T>> {
        let kind = T::KIND.name();
        let (id, body) = match value.get(REF_KEY) {
            Some(reference) => (parse_id(kind, reference)?, None),
            None => {
                let id = value
                    .get(ID_KEY)
                    .ok_or_else(|| SoundEventError::validation(format!("{kind}.{ID_KEY}"), "missing field"))?;
                (parse_id(kind, id)?, Some(value))
            }
        };

        let key = (T::KIND, id);
        if self.embedded.conflicting.contains(&key) {
            return Err(SoundEventError::validation(
                format!("{kind}.{ID_KEY}"),
                format!("'{id}' is embedded more than once with different contents"),
            ));
        }

        if let Some(hit) = T::resolved(&mut self.resolved).get(&id) {
            trace!(kind, %id, "reused decoded entity");
            return Ok(Arc::clone(hit));
        }

        let body = match body.or_else(|| self.embedded.bodies.get(&key).copied()) {
            Some(body) => body,
            None => {
                if let Some(found) = self.embedded.kind_of(id) {
                    warn!(expected = kind, found = found.name(), %id, "reference names an entity of another kind");
                }
                return Err(SoundEventError::reference(kind, id));
            }
        };

        let entity = Arc::new(T::decode_with(body, self)?);
        T::resolved(&mut self.resolved).insert(id, Arc::clone(&entity));
        Ok(entity)
    }
}

fn parse_id(kind: &str, value: &Value) -> Result<Uuid> {
    let raw = value
        .as_str()
        .ok_or_else(|| SoundEventError::validation(format!("{kind}.{ID_KEY}"), "expected a UUID string"))?;
    Uuid::parse_str(raw).map_err(|e| SoundEventError::validation(format!("{kind}.{ID_KEY}"), format!("'{raw}': {e}")))
}

macro_rules! impl_shared {
    ($($entity:ty => $table:ident),+ $(,)?) => {
        $(
            impl Shared for $entity {
                fn uuid(&self) -> Uuid {
                    self.id().as_uuid()
                }

                fn resolved<'d>(cache: &'d mut Resolved) -> &'d mut HashMap<Uuid, Arc<Self>> {
                    &mut cache.$table
                }
            }
        )+
    };
}

impl_shared!(
    Recording => recordings,
    Clip => clips,
    SoundEvent => sound_events,
    Sequence => sequences,
    User => users,
);
