//! Newtype IDs for type-safe identification of entities.
//!
//! Every entity kind gets its own UUID wrapper, so a recording ID cannot be
//! passed where a sound event ID is expected. IDs are stable across
//! serialization: they are how documents link entities together.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::SoundEventError;

/// Namespace of derived identifiers.
pub fn namespace() -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_DNS, b"soundevent")
}

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a fresh random (v4) identifier.
            #[inline]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Derives a name-based (v5) identifier, stable across runs.
            #[inline]
            pub fn derived(name: &str) -> Self {
                Self(Uuid::new_v5(&namespace(), name.as_bytes()))
            }

            #[inline]
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            #[inline]
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = SoundEventError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|e| SoundEventError::validation("uuid", format!("'{s}' is not a UUID: {e}")))
            }
        }
    };
}

uuid_id! {
    /// Identifies a [`Recording`](super::Recording).
    RecordingId
}

uuid_id! {
    /// Identifies a [`Clip`](super::Clip).
    ClipId
}

uuid_id! {
    /// Identifies a [`SoundEvent`](super::SoundEvent).
    SoundEventId
}

uuid_id! {
    /// Identifies a [`Sequence`](super::Sequence).
    SequenceId
}

uuid_id! {
    /// Identifies a sound event, sequence or clip annotation.
    AnnotationId
}

uuid_id! {
    /// Identifies a sound event, sequence or clip prediction.
    PredictionId
}

uuid_id! {
    /// Identifies a [`User`](super::User).
    UserId
}

uuid_id! {
    /// Identifies a [`Note`](super::Note).
    NoteId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(RecordingId::new(), RecordingId::new());
    }

    #[test]
    fn test_id_hash() {
        use std::collections::HashSet;
        let id = SoundEventId::new();
        let mut set = HashSet::new();
        set.insert(id);
        set.insert(id);
        set.insert(SoundEventId::new());
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_id_display_and_parse() {
        let uuid = Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        let id = ClipId::from_uuid(uuid);
        assert_eq!(id.to_string(), "67e55044-10b1-426f-9247-bb680e5fe0c8");
        assert_eq!(format!("{id:?}"), "ClipId(67e55044-10b1-426f-9247-bb680e5fe0c8)");
        assert_eq!(id.to_string().parse::<ClipId>().unwrap(), id);
        assert!("not-a-uuid".parse::<ClipId>().is_err());
    }

    #[test]
    fn test_id_serializes_as_string() {
        let id = UserId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        let restored: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, id);
    }
}
