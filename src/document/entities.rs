//! Document encodings of the entity model.

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::fields::{format_timestamp, object, Fields};
use super::scope::{Decoder, DocumentEntity, Encoder};
use super::EntityKind;
use crate::data::{
    Clip, ClipAnnotation, ClipPrediction, Described, Descriptors, Features, Note, PredictedTag,
    Recording, Sequence, SequenceAnnotation, SequencePrediction, SoundEvent, SoundEventAnnotation,
    SoundEventId, SoundEventPrediction, Tag, Tags, User,
};
use crate::error::{Result, SoundEventError};
use crate::geometry::Geometry;

type Entries = Vec<(&'static str, Option<Value>)>;

fn id_value(id: impl ToString) -> Option<Value> {
    Some(Value::from(id.to_string()))
}

fn non_empty(items: Vec<Value>) -> Option<Value> {
    (!items.is_empty()).then_some(Value::Array(items))
}

fn tags_value(tags: &Tags) -> Option<Value> {
    non_empty(
        tags.iter()
            .map(|tag| json!({ "key": tag.key(), "value": tag.value() }))
            .collect(),
    )
}

fn features_value(features: &Features) -> Option<Value> {
    non_empty(
        features
            .iter()
            .map(|(name, value)| json!({ "name": name, "value": value }))
            .collect(),
    )
}

fn note_value(note: &Note, encoder: &mut Encoder) -> Value {
    object([
        ("uuid", id_value(note.id())),
        ("message", Some(Value::from(note.message()))),
        (
            "created_by",
            note.created_by().map(|user| encoder.shared(user.as_ref())),
        ),
        ("is_issue", Some(Value::from(note.is_issue()))),
        ("created_at", Some(format_timestamp(&note.created_at()))),
    ])
}

/// The `tags`, `features` and `notes` entries; empty collections are omitted.
fn descriptor_entries(descriptors: &Descriptors, encoder: &mut Encoder) -> Entries {
    let notes = descriptors
        .notes()
        .iter()
        .map(|note| note_value(note, encoder))
        .collect();
    vec![
        ("tags", tags_value(descriptors.tags())),
        ("features", features_value(descriptors.features())),
        ("notes", non_empty(notes)),
    ]
}

fn decode_note<'a>(value: &'a Value, decoder: &mut Decoder<'a>) -> Result<Note> {
    let fields = Fields::of("Note", value)?;
    let mut note = fields
        .context(Note::new(fields.str("message")?))?
        .with_id(fields.id("uuid")?)
        .with_issue(fields.bool_or("is_issue", false)?)
        .with_created_at(fields.timestamp("created_at")?);
    if let Some(author) = fields.optional("created_by") {
        note = note.with_author(decoder.shared::<User>(author)?);
    }
    Ok(note)
}

fn decode_descriptors<'a>(fields: &Fields<'a>, decoder: &mut Decoder<'a>) -> Result<Descriptors> {
    let tags = fields.serde_or_default::<Tags>("tags")?;
    let features = fields.serde_or_default::<Features>("features")?;
    let notes = fields
        .list("notes")?
        .iter()
        .enumerate()
        .map(|(i, note)| decode_note(note, decoder).map_err(|e| e.within(&format!("notes[{i}]"))))
        .collect::<Result<Vec<_>>>();
    Ok(Descriptors::new(tags, features, fields.context(notes)?))
}

fn with_descriptors(mut entries: Entries, entity: &impl Described, encoder: &mut Encoder) -> Value {
    entries.extend(descriptor_entries(entity.descriptors(), encoder));
    object(entries)
}

fn author_value(author: Option<&std::sync::Arc<User>>, encoder: &mut Encoder) -> Option<Value> {
    author.map(|user| encoder.shared(user.as_ref()))
}

impl DocumentEntity for User {
    const KIND: EntityKind = EntityKind::User;

    fn encode_with(&self, _encoder: &mut Encoder) -> Value {
        object([
            ("uuid", id_value(self.id())),
            ("username", Some(Value::from(self.username()))),
            ("email", self.email().map(Value::from)),
            ("name", self.name().map(Value::from)),
            ("institution", self.institution().map(Value::from)),
        ])
    }

    fn decode_with<'a>(value: &'a Value, _decoder: &mut Decoder<'a>) -> Result<Self> {
        User::deserialize(value).map_err(|e| SoundEventError::validation("User", e.to_string()))
    }
}

impl DocumentEntity for Recording {
    const KIND: EntityKind = EntityKind::Recording;

    fn encode_with(&self, encoder: &mut Encoder) -> Value {
        let owners = self
            .owners()
            .iter()
            .map(|owner| encoder.shared(owner.as_ref()))
            .collect();
        let location = self.location();
        let entries = vec![
            ("uuid", id_value(self.id())),
            ("path", Some(Value::from(self.path().to_string_lossy().into_owned()))),
            ("duration", Some(Value::from(self.duration()))),
            ("samplerate", Some(Value::from(self.samplerate()))),
            ("channels", Some(Value::from(self.channels()))),
            ("time_expansion", Some(Value::from(self.time_expansion()))),
            ("hash", self.hash().map(Value::from)),
            ("date", self.date().map(|d| Value::from(d.to_string()))),
            ("time", self.time().map(|t| Value::from(t.to_string()))),
            ("latitude", location.map(|(lat, _)| Value::from(lat))),
            ("longitude", location.map(|(_, lon)| Value::from(lon))),
            ("owners", non_empty(owners)),
            ("rights", self.rights().map(Value::from)),
        ];
        with_descriptors(entries, self, encoder)
    }

    fn decode_with<'a>(value: &'a Value, decoder: &mut Decoder<'a>) -> Result<Self> {
        let fields = Fields::of("Recording", value)?;
        let mut recording = fields
            .context(Recording::new(
                fields.str("path")?,
                fields.f64("duration")?,
                fields.integer("samplerate")?,
                fields.integer("channels")?,
            ))?
            .with_id(fields.id("uuid")?);

        if let Some(factor) = fields.optional_f64("time_expansion")? {
            recording = fields.context(recording.with_time_expansion(factor))?;
        }
        if let Some(hash) = fields.optional_str("hash")? {
            recording = recording.with_hash(hash);
        }
        if let Some(date) = fields.optional_parsed::<NaiveDate>("date")? {
            recording = recording.with_date(date);
        }
        if let Some(time) = fields.optional_parsed::<NaiveTime>("time")? {
            recording = recording.with_time(time);
        }
        match (fields.optional_f64("latitude")?, fields.optional_f64("longitude")?) {
            (Some(latitude), Some(longitude)) => {
                recording = fields.context(recording.with_location(latitude, longitude))?;
            }
            (None, None) => {}
            _ => {
                return Err(fields.error("latitude", "latitude and longitude must be given together"));
            }
        }
        for owner in fields.list("owners")? {
            recording = recording.with_owner(decoder.shared::<User>(owner)?);
        }
        if let Some(rights) = fields.optional_str("rights")? {
            recording = recording.with_rights(rights);
        }
        Ok(recording.with_descriptors(decode_descriptors(&fields, decoder)?))
    }
}

impl DocumentEntity for Clip {
    const KIND: EntityKind = EntityKind::Clip;

    fn encode_with(&self, encoder: &mut Encoder) -> Value {
        let entries = vec![
            ("uuid", id_value(self.id())),
            ("recording", Some(encoder.shared(self.recording().as_ref()))),
            ("start_time", Some(Value::from(self.start_time()))),
            ("end_time", Some(Value::from(self.end_time()))),
        ];
        with_descriptors(entries, self, encoder)
    }

    fn decode_with<'a>(value: &'a Value, decoder: &mut Decoder<'a>) -> Result<Self> {
        let fields = Fields::of("Clip", value)?;
        let recording = decoder.shared::<Recording>(fields.value("recording")?)?;
        let clip = fields
            .context(Clip::new(
                recording,
                fields.f64("start_time")?,
                fields.f64("end_time")?,
            ))?
            .with_id(fields.id("uuid")?);
        Ok(clip.with_descriptors(decode_descriptors(&fields, decoder)?))
    }
}

impl DocumentEntity for SoundEvent {
    const KIND: EntityKind = EntityKind::SoundEvent;

    fn encode_with(&self, encoder: &mut Encoder) -> Value {
        let entries = vec![
            ("uuid", id_value(self.id())),
            ("recording", id_value(self.recording())),
            ("geometry", Some(self.geometry().to_json())),
        ];
        with_descriptors(entries, self, encoder)
    }

    fn decode_with<'a>(value: &'a Value, decoder: &mut Decoder<'a>) -> Result<Self> {
        let fields = Fields::of("SoundEvent", value)?;
        let geometry = fields.context(Geometry::from_json(fields.value("geometry")?))?;
        let event = SoundEvent::new(fields.id("recording")?, geometry).with_id(fields.id("uuid")?);
        Ok(event.with_descriptors(decode_descriptors(&fields, decoder)?))
    }
}

impl DocumentEntity for Sequence {
    const KIND: EntityKind = EntityKind::Sequence;

    fn encode_with(&self, encoder: &mut Encoder) -> Value {
        let members = self.sound_events().iter().map(|id| Value::from(id.to_string())).collect();
        let entries = vec![
            ("uuid", id_value(self.id())),
            ("recording", id_value(self.recording())),
            ("sound_events", Some(Value::Array(members))),
            ("parent", self.parent().and_then(id_value)),
        ];
        with_descriptors(entries, self, encoder)
    }

    fn decode_with<'a>(value: &'a Value, decoder: &mut Decoder<'a>) -> Result<Self> {
        let fields = Fields::of("Sequence", value)?;
        let members = fields
            .list("sound_events")?
            .iter()
            .enumerate()
            .map(|(i, member)| {
                member
                    .as_str()
                    .and_then(|raw| Uuid::parse_str(raw).ok())
                    .map(SoundEventId::from)
                    .ok_or_else(|| fields.error(&format!("sound_events[{i}]"), "expected a UUID string"))
            })
            .collect::<Result<Vec<_>>>()?;

        let id = fields.id("uuid")?;
        let parent = fields.optional_id("parent")?;
        if parent == Some(id) {
            return Err(SoundEventError::Cycle { sequence: id });
        }
        let sequence = fields
            .context(Sequence::from_members(fields.id("recording")?, members))?
            .with_id(id)
            .with_parent_id(parent);
        Ok(sequence.with_descriptors(decode_descriptors(&fields, decoder)?))
    }
}

impl DocumentEntity for SoundEventAnnotation {
    const KIND: EntityKind = EntityKind::SoundEventAnnotation;

    fn encode_with(&self, encoder: &mut Encoder) -> Value {
        let entries = vec![
            ("uuid", id_value(self.id())),
            ("sound_event", Some(encoder.shared(self.sound_event().as_ref()))),
            ("created_by", author_value(self.created_by(), encoder)),
            ("created_at", Some(format_timestamp(&self.created_at()))),
        ];
        with_descriptors(entries, self, encoder)
    }

    fn decode_with<'a>(value: &'a Value, decoder: &mut Decoder<'a>) -> Result<Self> {
        let fields = Fields::of("SoundEventAnnotation", value)?;
        let sound_event = decoder.shared::<SoundEvent>(fields.value("sound_event")?)?;
        let mut annotation = SoundEventAnnotation::new(sound_event)
            .with_id(fields.id("uuid")?)
            .with_created_at(fields.timestamp("created_at")?);
        if let Some(author) = fields.optional("created_by") {
            annotation = annotation.with_author(decoder.shared::<User>(author)?);
        }
        Ok(annotation.with_descriptors(decode_descriptors(&fields, decoder)?))
    }
}

impl DocumentEntity for SequenceAnnotation {
    const KIND: EntityKind = EntityKind::SequenceAnnotation;

    fn encode_with(&self, encoder: &mut Encoder) -> Value {
        let entries = vec![
            ("uuid", id_value(self.id())),
            ("sequence", Some(encoder.shared(self.sequence().as_ref()))),
            ("created_by", author_value(self.created_by(), encoder)),
            ("created_at", Some(format_timestamp(&self.created_at()))),
        ];
        with_descriptors(entries, self, encoder)
    }

    fn decode_with<'a>(value: &'a Value, decoder: &mut Decoder<'a>) -> Result<Self> {
        let fields = Fields::of("SequenceAnnotation", value)?;
        let sequence = decoder.shared::<Sequence>(fields.value("sequence")?)?;
        let mut annotation = SequenceAnnotation::new(sequence)
            .with_id(fields.id("uuid")?)
            .with_created_at(fields.timestamp("created_at")?);
        if let Some(author) = fields.optional("created_by") {
            annotation = annotation.with_author(decoder.shared::<User>(author)?);
        }
        Ok(annotation.with_descriptors(decode_descriptors(&fields, decoder)?))
    }
}

impl DocumentEntity for ClipAnnotation {
    const KIND: EntityKind = EntityKind::ClipAnnotation;

    fn encode_with(&self, encoder: &mut Encoder) -> Value {
        let clip = encoder.shared(self.clip().as_ref());
        let sound_events = self.sound_events().iter().map(|a| a.encode_with(encoder)).collect();
        let sequences = self.sequences().iter().map(|a| a.encode_with(encoder)).collect();
        let entries = vec![
            ("uuid", id_value(self.id())),
            ("clip", Some(clip)),
            ("sound_events", Some(Value::Array(sound_events))),
            ("sequences", Some(Value::Array(sequences))),
            ("created_at", Some(format_timestamp(&self.created_at()))),
        ];
        with_descriptors(entries, self, encoder)
    }

    fn decode_with<'a>(value: &'a Value, decoder: &mut Decoder<'a>) -> Result<Self> {
        let fields = Fields::of("ClipAnnotation", value)?;
        let clip = decoder.shared::<Clip>(fields.value("clip")?)?;
        let mut annotation = ClipAnnotation::new(clip)
            .with_id(fields.id("uuid")?)
            .with_created_at(fields.timestamp("created_at")?);

        for (i, item) in fields.list("sound_events")?.iter().enumerate() {
            let path = format!("sound_events[{i}]");
            let child = SoundEventAnnotation::decode_with(item, decoder).map_err(|e| e.within(&path))?;
            annotation = fields.context(annotation.with_sound_event(child))?;
        }
        for (i, item) in fields.list("sequences")?.iter().enumerate() {
            let path = format!("sequences[{i}]");
            let child = SequenceAnnotation::decode_with(item, decoder).map_err(|e| e.within(&path))?;
            annotation = fields.context(annotation.with_sequence(child))?;
        }

        let annotation = annotation.with_descriptors(decode_descriptors(&fields, decoder)?);
        fields.context(annotation.check_references())?;
        Ok(annotation)
    }
}

fn predicted_tags_value(tags: &[PredictedTag]) -> Option<Value> {
    non_empty(
        tags.iter()
            .map(|predicted| {
                json!({
                    "tag": { "key": predicted.tag().key(), "value": predicted.tag().value() },
                    "score": predicted.score(),
                })
            })
            .collect(),
    )
}

fn decode_predicted_tags(fields: &Fields<'_>) -> Result<Vec<PredictedTag>> {
    let tags = fields
        .list("tags")?
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let path = format!("tags[{i}]");
            let entry = Fields::of("PredictedTag", item).map_err(|e| e.within(&path))?;
            let tag = Tag::deserialize(entry.value("tag")?).map_err(|e| entry.error("tag", e.to_string()));
            let predicted = tag.and_then(|tag| PredictedTag::new(tag, entry.f64("score")?));
            predicted.map_err(|e| e.within(&path))
        })
        .collect::<Result<Vec<_>>>();
    fields.context(tags)
}

impl DocumentEntity for SoundEventPrediction {
    const KIND: EntityKind = EntityKind::SoundEventPrediction;

    fn encode_with(&self, encoder: &mut Encoder) -> Value {
        object([
            ("uuid", id_value(self.id())),
            ("sound_event", Some(encoder.shared(self.sound_event().as_ref()))),
            ("score", Some(Value::from(self.score()))),
            ("tags", predicted_tags_value(self.tags())),
            ("features", features_value(self.features())),
        ])
    }

    fn decode_with<'a>(value: &'a Value, decoder: &mut Decoder<'a>) -> Result<Self> {
        let fields = Fields::of("SoundEventPrediction", value)?;
        let sound_event = decoder.shared::<SoundEvent>(fields.value("sound_event")?)?;
        let prediction = fields
            .context(SoundEventPrediction::new(sound_event, fields.f64("score")?))?
            .with_id(fields.id("uuid")?)
            .with_features(fields.serde_or_default("features")?);
        Ok(decode_predicted_tags(&fields)?
            .into_iter()
            .fold(prediction, SoundEventPrediction::with_tag))
    }
}

impl DocumentEntity for SequencePrediction {
    const KIND: EntityKind = EntityKind::SequencePrediction;

    fn encode_with(&self, encoder: &mut Encoder) -> Value {
        object([
            ("uuid", id_value(self.id())),
            ("sequence", Some(encoder.shared(self.sequence().as_ref()))),
            ("score", Some(Value::from(self.score()))),
            ("tags", predicted_tags_value(self.tags())),
            ("features", features_value(self.features())),
        ])
    }

    fn decode_with<'a>(value: &'a Value, decoder: &mut Decoder<'a>) -> Result<Self> {
        let fields = Fields::of("SequencePrediction", value)?;
        let sequence = decoder.shared::<Sequence>(fields.value("sequence")?)?;
        let prediction = fields
            .context(SequencePrediction::new(sequence, fields.f64("score")?))?
            .with_id(fields.id("uuid")?)
            .with_features(fields.serde_or_default("features")?);
        Ok(decode_predicted_tags(&fields)?
            .into_iter()
            .fold(prediction, SequencePrediction::with_tag))
    }
}

impl DocumentEntity for ClipPrediction {
    const KIND: EntityKind = EntityKind::ClipPrediction;

    fn encode_with(&self, encoder: &mut Encoder) -> Value {
        let clip = encoder.shared(self.clip().as_ref());
        let sound_events = self.sound_events().iter().map(|p| p.encode_with(encoder)).collect();
        let sequences = self.sequences().iter().map(|p| p.encode_with(encoder)).collect();
        object([
            ("uuid", id_value(self.id())),
            ("clip", Some(clip)),
            ("score", Some(Value::from(self.score()))),
            ("sound_events", Some(Value::Array(sound_events))),
            ("sequences", Some(Value::Array(sequences))),
            ("tags", predicted_tags_value(self.tags())),
            ("features", features_value(self.features())),
        ])
    }

    fn decode_with<'a>(value: &'a Value, decoder: &mut Decoder<'a>) -> Result<Self> {
        let fields = Fields::of("ClipPrediction", value)?;
        let clip = decoder.shared::<Clip>(fields.value("clip")?)?;
        let mut prediction = fields
            .context(ClipPrediction::new(clip, fields.f64("score")?))?
            .with_id(fields.id("uuid")?)
            .with_features(fields.serde_or_default("features")?);

        for (i, item) in fields.list("sound_events")?.iter().enumerate() {
            let path = format!("sound_events[{i}]");
            let child = SoundEventPrediction::decode_with(item, decoder).map_err(|e| e.within(&path))?;
            prediction = fields.context(prediction.with_sound_event(child))?;
        }
        for (i, item) in fields.list("sequences")?.iter().enumerate() {
            let path = format!("sequences[{i}]");
            let child = SequencePrediction::decode_with(item, decoder).map_err(|e| e.within(&path))?;
            prediction = fields.context(prediction.with_sequence(child))?;
        }

        let prediction = decode_predicted_tags(&fields)?
            .into_iter()
            .fold(prediction, ClipPrediction::with_tag);
        fields.context(prediction.check_references())?;
        Ok(prediction)
    }
}
