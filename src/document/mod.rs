//! The document format: entity graphs as JSON values.
//!
//! A document wraps one entity (or a list of entities of one kind) in an
//! envelope:
//!
//! ```json
//! {"version": "1.0", "kind": "clip_annotation", "data": { ... }}
//! ```
//!
//! Recordings, clips, sound events, sequences and users are *shared*: the
//! first time one is written it is embedded in full, and every later
//! occurrence in the same document is written as `{"$ref": "<uuid>"}`.
//! Decoding resolves references anywhere in the document, and all
//! references to one entity yield the same [`Arc`](std::sync::Arc).
//!
//! # Example
//!
//! ```
//! use soundevent::data::{Recording, SoundEvent};
//! use soundevent::document::{decode, encode};
//! use soundevent::geometry::Geometry;
//!
//! let recording = Recording::new("dawn_chorus.wav", 60.0, 44_100, 1).unwrap();
//! let event = SoundEvent::new(recording.id(), Geometry::time_interval(1.0, 2.5).unwrap());
//!
//! let document = encode(&event);
//! let decoded: SoundEvent = decode(&document).unwrap();
//! assert_eq!(decoded, event);
//! ```

mod entities;
mod fields;
mod scope;

use serde_json::Value;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

use crate::data::{
    Clip, ClipAnnotation, ClipPrediction, Recording, Sequence, SequenceAnnotation,
    SequencePrediction, SoundEvent, SoundEventAnnotation, SoundEventPrediction, User,
};
use crate::error::{Result, SoundEventError};

pub use scope::{Decoder, DocumentEntity, Encoder, Shared, ID_KEY, REF_KEY};

/// Version written to, and expected in, every document envelope.
pub const DOCUMENT_VERSION: &str = "1.0";

/// Path reported by errors from the in-memory helpers.
const IN_MEMORY: &str = "<memory>";

macro_rules! entity_kinds {
    ($($kind:ident => $tag:literal),+ $(,)?) => {
        /// The kind of entity a document holds.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum EntityKind {
            $($kind),+
        }

        impl EntityKind {
            pub const ALL: &'static [EntityKind] = &[$(EntityKind::$kind),+];

            /// The envelope tag, e.g. `sound_event`.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$kind => $tag),+
                }
            }

            /// The type name, e.g. `SoundEvent`.
            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$kind => stringify!($kind)),+
                }
            }
        }

        impl FromStr for EntityKind {
            type Err = SoundEventError;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($tag => Ok(Self::$kind),)+
                    other => Err(SoundEventError::UnsupportedKind(other.to_string())),
                }
            }
        }

        /// A decoded entity of any kind.
        #[derive(Clone, Debug, PartialEq)]
        pub enum AnyEntity {
            $($kind($kind)),+
        }

        impl AnyEntity {
            pub fn kind(&self) -> EntityKind {
                match self {
                    $(Self::$kind(_) => EntityKind::$kind),+
                }
            }

            fn decode_with<'a>(kind: EntityKind, value: &'a Value, decoder: &mut Decoder<'a>) -> Result<Self> {
                match kind {
                    $(EntityKind::$kind => $kind::decode_with(value, decoder).map(Self::$kind)),+
                }
            }
        }
    };
}

entity_kinds!(
    Recording => "recording",
    Clip => "clip",
    SoundEvent => "sound_event",
    Sequence => "sequence",
    User => "user",
    SoundEventAnnotation => "sound_event_annotation",
    SequenceAnnotation => "sequence_annotation",
    ClipAnnotation => "clip_annotation",
    SoundEventPrediction => "sound_event_prediction",
    SequencePrediction => "sequence_prediction",
    ClipPrediction => "clip_prediction",
);

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AnyEntity {
    /// Every sound event this entity holds or refers to, in document order.
    pub fn sound_events(&self) -> Vec<&SoundEvent> {
        match self {
            Self::SoundEvent(event) => vec![event],
            Self::SoundEventAnnotation(annotation) => vec![annotation.sound_event().as_ref()],
            Self::ClipAnnotation(annotation) => annotation
                .sound_events()
                .iter()
                .map(|a| a.sound_event().as_ref())
                .collect(),
            Self::SoundEventPrediction(prediction) => vec![prediction.sound_event().as_ref()],
            Self::ClipPrediction(prediction) => prediction
                .sound_events()
                .iter()
                .map(|p| p.sound_event().as_ref())
                .collect(),
            Self::Recording(_)
            | Self::Clip(_)
            | Self::Sequence(_)
            | Self::User(_)
            | Self::SequenceAnnotation(_)
            | Self::SequencePrediction(_) => Vec::new(),
        }
    }
}

/// Options for decoding documents.
#[derive(Clone, Debug)]
pub struct DecodeOptions {
    /// Require the envelope's `kind` to be present and to match the
    /// requested type. When off, a missing or different kind is logged and
    /// the data is decoded as the requested type.
    pub strict_kind: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self { strict_kind: true }
    }
}

impl DecodeOptions {
    pub fn lenient() -> Self {
        Self { strict_kind: false }
    }
}

fn envelope(kind: EntityKind, data: Value) -> Value {
    let mut object = serde_json::Map::new();
    object.insert("version".into(), Value::from(DOCUMENT_VERSION));
    object.insert("kind".into(), Value::from(kind.as_str()));
    object.insert("data".into(), data);
    Value::Object(object)
}

/// Checks the envelope and returns the declared kind and the data.
///
/// `expected` is the kind the caller wants; `None` accepts any kind but
/// then requires one to be declared.
fn open_envelope<'a>(
    document: &'a Value,
    expected: Option<EntityKind>,
    options: &DecodeOptions,
) -> Result<(EntityKind, &'a Value)> {
    let object = document
        .as_object()
        .ok_or_else(|| SoundEventError::validation("document", "expected an object"))?;

    match object.get("version").and_then(Value::as_str) {
        Some(DOCUMENT_VERSION) => {}
        Some(other) => warn!(version = other, expected = DOCUMENT_VERSION, "unexpected document version"),
        None => return Err(SoundEventError::validation("document.version", "missing field")),
    }

    let declared = match object.get("kind") {
        Some(kind) => Some(
            kind.as_str()
                .ok_or_else(|| SoundEventError::validation("document.kind", "expected a string"))?
                .parse::<EntityKind>()?,
        ),
        None => None,
    };

    let kind = match (declared, expected) {
        (Some(declared), None) => declared,
        (None, None) => return Err(SoundEventError::validation("document.kind", "missing field")),
        (Some(declared), Some(expected)) if declared == expected => declared,
        (declared, Some(expected)) => {
            let found = declared.map_or("nothing", EntityKind::as_str);
            if options.strict_kind {
                return Err(SoundEventError::validation(
                    "document.kind",
                    format!("expected {expected}, found {found}"),
                ));
            }
            warn!(%expected, found, "document kind does not match; decoding anyway");
            expected
        }
    };

    let data = object
        .get("data")
        .ok_or_else(|| SoundEventError::validation("document.data", "missing field"))?;
    Ok((kind, data))
}

/// Encodes one entity as a document.
pub fn encode<T: DocumentEntity>(entity: &T) -> Value {
    let mut encoder = Encoder::new();
    let data = entity.encode_with(&mut encoder);
    debug!(kind = %T::KIND, shared = encoder.embedded(), "encoded document");
    envelope(T::KIND, data)
}

/// Encodes several entities of one kind in a single document scope, so
/// entities they share are embedded once.
pub fn encode_all<T: DocumentEntity>(entities: &[T]) -> Value {
    let mut encoder = Encoder::new();
    let data = entities.iter().map(|e| e.encode_with(&mut encoder)).collect();
    debug!(
        kind = %T::KIND,
        count = entities.len(),
        shared = encoder.embedded(),
        "encoded document"
    );
    envelope(T::KIND, Value::Array(data))
}

/// Decodes a single-entity document with default options.
pub fn decode<T: DocumentEntity>(document: &Value) -> Result<T> {
    decode_with_options(document, &DecodeOptions::default())
}

/// Decodes a single-entity document.
///
/// Any failure aborts the whole decode.
pub fn decode_with_options<T: DocumentEntity>(document: &Value, options: &DecodeOptions) -> Result<T> {
    let (_, data) = open_envelope(document, Some(T::KIND), options)?;
    if data.is_array() {
        return Err(SoundEventError::validation(
            "document.data",
            "holds a list of entities; decode it as a list",
        ));
    }
    let mut decoder = Decoder::new(data);
    let entity = T::decode_with(data, &mut decoder)?;
    debug!(kind = %T::KIND, embedded = decoder.embedded(), "decoded document");
    Ok(entity)
}

/// Decodes a document holding a list of entities of one kind.
///
/// A single-entity document decodes to a list of one.
pub fn decode_all<T: DocumentEntity>(document: &Value) -> Result<Vec<T>> {
    let (_, data) = open_envelope(document, Some(T::KIND), &DecodeOptions::default())?;
    let mut decoder = Decoder::new(data);
    let entities = match data {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| T::decode_with(item, &mut decoder).map_err(|e| e.within(&format!("data[{i}]"))))
            .collect::<Result<Vec<_>>>()?,
        single => vec![T::decode_with(single, &mut decoder)?],
    };
    debug!(kind = %T::KIND, count = entities.len(), "decoded document");
    Ok(entities)
}

/// Decodes a document of whatever kind its envelope declares.
pub fn decode_any(document: &Value) -> Result<Vec<AnyEntity>> {
    let (kind, data) = open_envelope(document, None, &DecodeOptions::default())?;
    let mut decoder = Decoder::new(data);
    let entities = match data {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                AnyEntity::decode_with(kind, item, &mut decoder).map_err(|e| e.within(&format!("data[{i}]")))
            })
            .collect::<Result<Vec<_>>>()?,
        single => vec![AnyEntity::decode_with(kind, single, &mut decoder)?],
    };
    debug!(%kind, count = entities.len(), "decoded document");
    Ok(entities)
}

/// Reads a document from a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be opened or is not valid JSON.
pub fn read_document(path: &Path) -> Result<Value> {
    let file = File::open(path).map_err(SoundEventError::Io)?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| SoundEventError::DocumentParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a document to a JSON file, pretty-printed.
///
/// # Errors
/// Returns an error if the file cannot be created or written.
pub fn write_document(path: &Path, document: &Value) -> Result<()> {
    let file = File::create(path).map_err(SoundEventError::Io)?;
    serde_json::to_writer_pretty(BufWriter::new(file), document).map_err(|source| {
        SoundEventError::DocumentWrite {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Renders a document as pretty-printed JSON.
pub fn to_json_string(document: &Value) -> Result<String> {
    serde_json::to_string_pretty(document).map_err(|source| SoundEventError::DocumentWrite {
        path: PathBuf::from(IN_MEMORY),
        source,
    })
}

/// Parses a document from JSON text.
pub fn from_json_str(json: &str) -> Result<Value> {
    serde_json::from_str(json).map_err(|source| SoundEventError::DocumentParse {
        path: PathBuf::from(IN_MEMORY),
        source,
    })
}

/// Parses a document from raw bytes, without requiring UTF-8 up front.
pub fn from_json_slice(bytes: &[u8]) -> Result<Value> {
    serde_json::from_slice(bytes).map_err(|source| SoundEventError::DocumentParse {
        path: PathBuf::from(IN_MEMORY),
        source,
    })
}
