//! Sequences of sound events and the forest their parent links form.

use std::collections::{BTreeMap, HashSet};

use super::descriptors::{impl_described, Descriptors};
use super::ids::{RecordingId, SequenceId, SoundEventId};
use super::sound_event::SoundEvent;
use crate::error::{Result, SoundEventError};

/// An ordered group of sound events from one recording, e.g. the syllables
/// of a song.
///
/// Sequences may nest: a sequence can name a parent sequence. Parent links
/// are held by ID, so a single sequence can only reject the cycles it can
/// see (itself, or a parent that already points back at it). Use a
/// [`SequenceForest`] to enforce acyclicity over a whole collection.
#[derive(Clone, Debug, PartialEq)]
pub struct Sequence {
    id: SequenceId,
    recording: RecordingId,
    sound_events: Vec<SoundEventId>,
    parent: Option<SequenceId>,
    descriptors: Descriptors,
}

impl_described!(Sequence);

impl Sequence {
    /// Groups sound events into a sequence, keeping their order.
    ///
    /// Fails if `sound_events` is empty, lists an event twice, or mixes
    /// events from different recordings.
    pub fn new<'a>(sound_events: impl IntoIterator<Item = &'a SoundEvent>) -> Result<Self> {
        let events: Vec<&SoundEvent> = sound_events.into_iter().collect();
        let first = events
            .first()
            .ok_or_else(|| SoundEventError::validation("sound_events", "a sequence needs at least one sound event"))?;
        let recording = first.recording();
        if let Some((i, stray)) = events.iter().enumerate().find(|(_, e)| e.recording() != recording) {
            return Err(SoundEventError::validation(
                format!("sound_events[{i}]"),
                format!(
                    "belongs to recording {}, but the sequence is on recording {recording}",
                    stray.recording()
                ),
            ));
        }
        Self::from_members(recording, events.iter().map(|e| e.id()).collect())
    }

    /// Builds a sequence from member IDs whose recording is already known.
    pub(crate) fn from_members(recording: RecordingId, sound_events: Vec<SoundEventId>) -> Result<Self> {
        if sound_events.is_empty() {
            return Err(SoundEventError::validation(
                "sound_events",
                "a sequence needs at least one sound event",
            ));
        }
        let mut seen = HashSet::with_capacity(sound_events.len());
        if let Some(i) = sound_events.iter().position(|id| !seen.insert(*id)) {
            return Err(SoundEventError::validation(
                format!("sound_events[{i}]"),
                format!("sound event {} is listed twice", sound_events[i]),
            ));
        }
        Ok(Self {
            id: SequenceId::new(),
            recording,
            sound_events,
            parent: None,
            descriptors: Descriptors::default(),
        })
    }

    pub fn with_id(mut self, id: SequenceId) -> Self {
        self.id = id;
        self
    }

    /// Returns a copy whose parent is `parent`.
    ///
    /// Fails with a cycle error if `parent` is this sequence or already has
    /// this sequence as its parent.
    pub fn with_parent(self, parent: &Sequence) -> Result<Self> {
        if parent.id == self.id || parent.parent == Some(self.id) {
            return Err(SoundEventError::Cycle { sequence: self.id });
        }
        Ok(self.with_parent_id(Some(parent.id)))
    }

    pub(crate) fn with_parent_id(mut self, parent: Option<SequenceId>) -> Self {
        self.parent = parent;
        self
    }

    pub fn id(&self) -> SequenceId {
        self.id
    }

    pub fn recording(&self) -> RecordingId {
        self.recording
    }

    pub fn sound_events(&self) -> &[SoundEventId] {
        &self.sound_events
    }

    pub fn contains(&self, sound_event: SoundEventId) -> bool {
        self.sound_events.contains(&sound_event)
    }

    pub fn parent(&self) -> Option<SequenceId> {
        self.parent
    }
}

/// A collection of sequences whose parent links form a forest.
///
/// Every parent must be in the forest and no sequence may be its own
/// ancestor. Both are checked on every insertion and re-parenting, and a
/// failed operation leaves the forest unchanged.
#[derive(Clone, Debug, Default)]
pub struct SequenceForest {
    sequences: BTreeMap<SequenceId, Sequence>,
}

impl SequenceForest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a forest from sequences given in any order.
    pub fn from_sequences(sequences: impl IntoIterator<Item = Sequence>) -> Result<Self> {
        let forest = Self {
            sequences: sequences.into_iter().map(|s| (s.id, s)).collect(),
        };
        for id in forest.sequences.keys() {
            forest.check_chain(*id)?;
        }
        Ok(forest)
    }

    /// Adds (or replaces) a sequence.
    pub fn insert(&mut self, sequence: Sequence) -> Result<()> {
        let id = sequence.id;
        let previous = self.sequences.insert(id, sequence);
        if let Err(err) = self.check_chain(id) {
            match previous {
                Some(previous) => self.sequences.insert(id, previous),
                None => self.sequences.remove(&id),
            };
            return Err(err);
        }
        Ok(())
    }

    /// Re-parents `child`; `None` makes it a root.
    pub fn set_parent(&mut self, child: SequenceId, parent: Option<SequenceId>) -> Result<()> {
        let current = self
            .sequences
            .get(&child)
            .ok_or_else(|| SoundEventError::reference("Sequence", child))?
            .clone();
        self.insert(current.with_parent_id(parent))
    }

    pub fn get(&self, id: SequenceId) -> Option<&Sequence> {
        self.sequences.get(&id)
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sequence> {
        self.sequences.values()
    }

    /// Sequences without a parent.
    pub fn roots(&self) -> impl Iterator<Item = &Sequence> {
        self.sequences.values().filter(|s| s.parent.is_none())
    }

    pub fn children(&self, id: SequenceId) -> impl Iterator<Item = &Sequence> {
        self.sequences.values().filter(move |s| s.parent == Some(id))
    }

    /// Parent, grandparent, ... of `id`, nearest first.
    pub fn ancestors(&self, id: SequenceId) -> Vec<&Sequence> {
        let mut chain = Vec::new();
        let mut next = self.sequences.get(&id).and_then(|s| s.parent);
        while let Some(parent) = next.and_then(|p| self.sequences.get(&p)) {
            if chain.len() >= self.sequences.len() {
                break;
            }
            chain.push(parent);
            next = parent.parent;
        }
        chain
    }

    pub fn into_sequences(self) -> impl Iterator<Item = Sequence> {
        self.sequences.into_values()
    }

    /// Walks the parent chain from `start`, which must not loop or dangle.
    fn check_chain(&self, start: SequenceId) -> Result<()> {
        let mut current = start;
        for _ in 0..=self.sequences.len() {
            let sequence = self
                .sequences
                .get(&current)
                .ok_or_else(|| SoundEventError::reference("Sequence", current))?;
            match sequence.parent {
                None => return Ok(()),
                Some(parent) if parent == start => {
                    return Err(SoundEventError::Cycle { sequence: start })
                }
                Some(parent) => current = parent,
            }
        }
        // More steps than sequences: a loop further up the chain.
        Err(SoundEventError::Cycle { sequence: start })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::geometry::Geometry;

    fn events(recording: RecordingId, n: usize) -> Vec<SoundEvent> {
        (0..n)
            .map(|i| SoundEvent::new(recording, Geometry::time_stamp(i as f64).unwrap()))
            .collect()
    }

    fn sequence() -> Sequence {
        Sequence::new(&events(RecordingId::new(), 2)).unwrap()
    }

    #[test]
    fn test_sequence_members_share_recording() {
        let mut members = events(RecordingId::new(), 2);
        members.extend(events(RecordingId::new(), 1));
        let err = Sequence::new(&members).unwrap_err();
        match err {
            SoundEventError::Validation { field, .. } => assert_eq!(field, "sound_events[2]"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_sequence_rejects_empty_and_duplicates() {
        assert!(Sequence::new(Vec::<&SoundEvent>::new()).is_err());
        let members = events(RecordingId::new(), 1);
        let twice = [members[0].clone(), members[0].clone()];
        assert!(Sequence::new(&twice).is_err());
    }

    #[test]
    fn test_two_cycle_rejected() {
        let a = sequence();
        let b = sequence();
        let a = a.with_parent(&b).unwrap();
        let err = b.with_parent(&a).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cycle);
    }

    #[test]
    fn test_self_parent_rejected() {
        let a = sequence();
        assert_eq!(a.clone().with_parent(&a).unwrap_err().kind(), ErrorKind::Cycle);
    }

    #[test]
    fn test_forest_rejects_long_cycle() {
        let a = sequence();
        let b = sequence().with_parent(&a).unwrap();
        let c = sequence().with_parent(&b).unwrap();
        let mut forest = SequenceForest::from_sequences([a.clone(), b.clone(), c.clone()]).unwrap();

        let err = forest.set_parent(a.id(), Some(c.id())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cycle);
        // Failed re-parenting leaves the forest untouched.
        assert_eq!(forest.get(a.id()).unwrap().parent(), None);

        let chain: Vec<SequenceId> = forest.ancestors(c.id()).iter().map(|s| s.id()).collect();
        assert_eq!(chain, vec![b.id(), a.id()]);
        assert_eq!(forest.roots().count(), 1);
        assert_eq!(forest.children(a.id()).count(), 1);
    }

    #[test]
    fn test_forest_rejects_dangling_parent() {
        let missing = sequence();
        let orphan = sequence().with_parent(&missing).unwrap();
        let mut forest = SequenceForest::new();
        let err = forest.insert(orphan).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Reference);
        assert!(forest.is_empty());
    }

    #[test]
    fn test_from_sequences_accepts_any_order() {
        let a = sequence();
        let b = sequence().with_parent(&a).unwrap();
        let forest = SequenceForest::from_sequences([b, a]).unwrap();
        assert_eq!(forest.len(), 2);
    }
}
