//! Entity model: recordings, clips, sound events, sequences, and the
//! annotations and predictions made about them.
//!
//! Entities are immutable values with validated construction. Builders
//! (`with_*`) consume an entity and return an updated copy; nothing is
//! edited in place. Entities refer to one another either by ID
//! ([`SoundEvent::recording`], [`Sequence::parent`]) or through shared
//! [`Arc`](std::sync::Arc) handles when the referenced value travels with
//! them (a [`Clip`] and its [`Recording`]).

mod annotations;
mod clip;
mod descriptors;
mod ids;
mod predictions;
mod recording;
mod sequence;
mod sound_event;

pub use annotations::{ClipAnnotation, SequenceAnnotation, SoundEventAnnotation};
pub use clip::Clip;
pub use descriptors::{Described, Descriptors, Feature, Features, Note, Tag, Tags, User};
pub use ids::{AnnotationId, ClipId, NoteId, PredictionId, RecordingId, SequenceId, SoundEventId, UserId};
pub use predictions::{ClipPrediction, PredictedTag, SequencePrediction, SoundEventPrediction};
pub use recording::Recording;
pub use sequence::{Sequence, SequenceForest};
pub use sound_event::SoundEvent;
