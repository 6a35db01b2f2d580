//! Model predictions: scored counterparts of the annotation types.
//!
//! Predictions carry confidence scores in `[0, 1]` instead of notes and
//! authors. A prediction's tags are [`PredictedTag`]s, each with its own
//! score.

use std::sync::Arc;

use super::annotations::{check_recording, check_sequence_links};
use super::clip::Clip;
use super::descriptors::{Feature, Features, Tag};
use super::ids::PredictionId;
use super::sequence::Sequence;
use super::sound_event::SoundEvent;
use crate::error::{Result, SoundEventError};

fn check_score(field: &str, score: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&score) {
        return Err(SoundEventError::validation(
            field,
            format!("score {score} is outside [0, 1]"),
        ));
    }
    Ok(())
}

/// A tag with the model's confidence in it.
#[derive(Clone, Debug, PartialEq)]
pub struct PredictedTag {
    tag: Tag,
    score: f64,
}

impl PredictedTag {
    pub fn new(tag: Tag, score: f64) -> Result<Self> {
        check_score("score", score)?;
        Ok(Self { tag, score })
    }

    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    pub fn score(&self) -> f64 {
        self.score
    }
}

/// Shared state of every prediction kind.
#[derive(Clone, Debug, PartialEq)]
struct Scored {
    score: f64,
    tags: Vec<PredictedTag>,
    features: Features,
}

impl Scored {
    fn new(score: f64) -> Result<Self> {
        check_score("score", score)?;
        Ok(Self {
            score,
            tags: Vec::new(),
            features: Features::new(),
        })
    }
}

macro_rules! scored_accessors {
    ($($prediction:ty),+) => {
        $(
            impl $prediction {
                pub fn with_id(mut self, id: PredictionId) -> Self {
                    self.id = id;
                    self
                }

                pub fn with_tag(mut self, tag: PredictedTag) -> Self {
                    self.scored.tags.push(tag);
                    self
                }

                /// Fails if a feature with the same name is already attached.
                pub fn with_feature(mut self, feature: Feature) -> Result<Self> {
                    self.scored.features = self.scored.features.with_feature(feature)?;
                    Ok(self)
                }

                pub(crate) fn with_features(mut self, features: Features) -> Self {
                    self.scored.features = features;
                    self
                }

                pub fn id(&self) -> PredictionId {
                    self.id
                }

                pub fn score(&self) -> f64 {
                    self.scored.score
                }

                pub fn tags(&self) -> &[PredictedTag] {
                    &self.scored.tags
                }

                pub fn features(&self) -> &Features {
                    &self.scored.features
                }
            }
        )+
    };
}

/// A detected sound event.
#[derive(Clone, Debug, PartialEq)]
pub struct SoundEventPrediction {
    id: PredictionId,
    sound_event: Arc<SoundEvent>,
    scored: Scored,
}

/// A detected sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct SequencePrediction {
    id: PredictionId,
    sequence: Arc<Sequence>,
    scored: Scored,
}

/// All predictions a model made for one clip.
///
/// The clip-level score is the model's confidence in the clip as a whole.
#[derive(Clone, Debug, PartialEq)]
pub struct ClipPrediction {
    id: PredictionId,
    clip: Arc<Clip>,
    sound_events: Vec<SoundEventPrediction>,
    sequences: Vec<SequencePrediction>,
    scored: Scored,
}

scored_accessors!(SoundEventPrediction, SequencePrediction, ClipPrediction);

impl SoundEventPrediction {
    pub fn new(sound_event: Arc<SoundEvent>, score: f64) -> Result<Self> {
        Ok(Self {
            id: PredictionId::new(),
            sound_event,
            scored: Scored::new(score)?,
        })
    }

    pub fn sound_event(&self) -> &Arc<SoundEvent> {
        &self.sound_event
    }
}

impl SequencePrediction {
    pub fn new(sequence: Arc<Sequence>, score: f64) -> Result<Self> {
        Ok(Self {
            id: PredictionId::new(),
            sequence,
            scored: Scored::new(score)?,
        })
    }

    pub fn sequence(&self) -> &Arc<Sequence> {
        &self.sequence
    }
}

impl ClipPrediction {
    pub fn new(clip: Arc<Clip>, score: f64) -> Result<Self> {
        Ok(Self {
            id: PredictionId::new(),
            clip,
            sound_events: Vec::new(),
            sequences: Vec::new(),
            scored: Scored::new(score)?,
        })
    }

    /// Adds a sound event prediction; the event must be on the clip's recording.
    pub fn with_sound_event(mut self, prediction: SoundEventPrediction) -> Result<Self> {
        let field = format!("sound_events[{}]", self.sound_events.len());
        check_recording(&field, self.clip.recording().id(), prediction.sound_event.recording())?;
        self.sound_events.push(prediction);
        Ok(self)
    }

    /// Adds a sequence prediction; the sequence must be on the clip's recording.
    pub fn with_sequence(mut self, prediction: SequencePrediction) -> Result<Self> {
        let field = format!("sequences[{}]", self.sequences.len());
        check_recording(&field, self.clip.recording().id(), prediction.sequence.recording())?;
        self.sequences.push(prediction);
        Ok(self)
    }

    /// Checks that predicted sequences only group predicted sound events and
    /// that their parent links resolve within this prediction.
    pub fn check_references(&self) -> Result<()> {
        check_sequence_links(
            self.sound_events.iter().map(|p| p.sound_event.id()),
            self.sequences.iter().map(|p| p.sequence.as_ref()),
        )
    }

    pub fn clip(&self) -> &Arc<Clip> {
        &self.clip
    }

    pub fn sound_events(&self) -> &[SoundEventPrediction] {
        &self.sound_events
    }

    pub fn sequences(&self) -> &[SequencePrediction] {
        &self.sequences
    }
}
