//! Human annotations of sound events, sequences and clips.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;

use super::clip::Clip;
use super::descriptors::{impl_described, Descriptors, User};
use super::ids::{AnnotationId, RecordingId, SequenceId, SoundEventId};
use super::sequence::{Sequence, SequenceForest};
use super::sound_event::SoundEvent;
use crate::error::{Result, SoundEventError};

/// A person's (or process's) labelling of one sound event.
#[derive(Clone, Debug, PartialEq)]
pub struct SoundEventAnnotation {
    id: AnnotationId,
    sound_event: Arc<SoundEvent>,
    created_by: Option<Arc<User>>,
    created_at: DateTime<Utc>,
    descriptors: Descriptors,
}

/// A labelling of one sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct SequenceAnnotation {
    id: AnnotationId,
    sequence: Arc<Sequence>,
    created_by: Option<Arc<User>>,
    created_at: DateTime<Utc>,
    descriptors: Descriptors,
}

/// Everything annotated within one clip.
///
/// Sound events must lie on the clip's recording. Sequences must group
/// annotated sound events and may only name sequences of the same clip
/// annotation as parents; [`ClipAnnotation::check_references`] verifies
/// those links once the annotation is complete.
#[derive(Clone, Debug, PartialEq)]
pub struct ClipAnnotation {
    id: AnnotationId,
    clip: Arc<Clip>,
    sound_events: Vec<SoundEventAnnotation>,
    sequences: Vec<SequenceAnnotation>,
    created_at: DateTime<Utc>,
    descriptors: Descriptors,
}

impl_described!(SoundEventAnnotation, SequenceAnnotation, ClipAnnotation);

impl SoundEventAnnotation {
    pub fn new(sound_event: Arc<SoundEvent>) -> Self {
        Self {
            id: AnnotationId::new(),
            sound_event,
            created_by: None,
            created_at: Utc::now(),
            descriptors: Descriptors::default(),
        }
    }

    pub fn with_id(mut self, id: AnnotationId) -> Self {
        self.id = id;
        self
    }

    pub fn with_author(mut self, user: Arc<User>) -> Self {
        self.created_by = Some(user);
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn id(&self) -> AnnotationId {
        self.id
    }

    pub fn sound_event(&self) -> &Arc<SoundEvent> {
        &self.sound_event
    }

    pub fn created_by(&self) -> Option<&Arc<User>> {
        self.created_by.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl SequenceAnnotation {
    pub fn new(sequence: Arc<Sequence>) -> Self {
        Self {
            id: AnnotationId::new(),
            sequence,
            created_by: None,
            created_at: Utc::now(),
            descriptors: Descriptors::default(),
        }
    }

    pub fn with_id(mut self, id: AnnotationId) -> Self {
        self.id = id;
        self
    }

    pub fn with_author(mut self, user: Arc<User>) -> Self {
        self.created_by = Some(user);
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn id(&self) -> AnnotationId {
        self.id
    }

    pub fn sequence(&self) -> &Arc<Sequence> {
        &self.sequence
    }

    pub fn created_by(&self) -> Option<&Arc<User>> {
        self.created_by.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl ClipAnnotation {
    pub fn new(clip: Arc<Clip>) -> Self {
        Self {
            id: AnnotationId::new(),
            clip,
            sound_events: Vec::new(),
            sequences: Vec::new(),
            created_at: Utc::now(),
            descriptors: Descriptors::default(),
        }
    }

    pub fn with_id(mut self, id: AnnotationId) -> Self {
        self.id = id;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Adds a sound event annotation; the event must be on the clip's recording.
    pub fn with_sound_event(mut self, annotation: SoundEventAnnotation) -> Result<Self> {
        let field = format!("sound_events[{}]", self.sound_events.len());
        check_recording(&field, self.recording(), annotation.sound_event.recording())?;
        self.sound_events.push(annotation);
        Ok(self)
    }

    /// Adds a sequence annotation; the sequence must be on the clip's recording.
    pub fn with_sequence(mut self, annotation: SequenceAnnotation) -> Result<Self> {
        let field = format!("sequences[{}]", self.sequences.len());
        check_recording(&field, self.recording(), annotation.sequence.recording())?;
        self.sequences.push(annotation);
        Ok(self)
    }

    /// Checks that sequences only group annotated sound events and that
    /// their parent links resolve within this annotation without cycles.
    pub fn check_references(&self) -> Result<()> {
        check_sequence_links(
            self.sound_events.iter().map(|a| a.sound_event.id()),
            self.sequences.iter().map(|a| a.sequence.as_ref()),
        )
    }

    pub fn id(&self) -> AnnotationId {
        self.id
    }

    pub fn clip(&self) -> &Arc<Clip> {
        &self.clip
    }

    pub fn sound_events(&self) -> &[SoundEventAnnotation] {
        &self.sound_events
    }

    pub fn sequences(&self) -> &[SequenceAnnotation] {
        &self.sequences
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn recording(&self) -> RecordingId {
        self.clip.recording().id()
    }
}

pub(crate) fn check_recording(field: &str, expected: RecordingId, actual: RecordingId) -> Result<()> {
    if expected != actual {
        return Err(SoundEventError::validation(
            field,
            format!("belongs to recording {actual}, but the clip is on recording {expected}"),
        ));
    }
    Ok(())
}

/// Verifies sequence membership and parent links against the sound events
/// and sequences present in one clip-level container.
pub(crate) fn check_sequence_links<'a>(
    sound_events: impl Iterator<Item = SoundEventId>,
    sequences: impl Iterator<Item = &'a Sequence> + Clone,
) -> Result<()> {
    let events: HashSet<SoundEventId> = sound_events.collect();
    let known: HashSet<SequenceId> = sequences.clone().map(Sequence::id).collect();

    for sequence in sequences.clone() {
        if let Some(missing) = sequence.sound_events().iter().find(|id| !events.contains(*id)) {
            return Err(SoundEventError::reference("SoundEvent", missing));
        }
        if let Some(parent) = sequence.parent().filter(|p| !known.contains(p)) {
            return Err(SoundEventError::reference("Sequence", parent));
        }
    }
    SequenceForest::from_sequences(sequences.cloned()).map(|_| ())
}
