//! Descriptors attached to entities: tags, features, notes, and the users
//! who write them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use super::ids::{NoteId, UserId};
use crate::error::{Result, SoundEventError};

/// A categorical key-value label, e.g. `species = Myotis myotis`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawTag")]
pub struct Tag {
    key: String,
    value: String,
}

#[derive(Deserialize)]
struct RawTag {
    key: String,
    value: String,
}

impl TryFrom<RawTag> for Tag {
    type Error = SoundEventError;

    fn try_from(raw: RawTag) -> Result<Self> {
        Tag::new(raw.key, raw.value)
    }
}

impl Tag {
    /// Creates a tag; the key must not be blank.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(SoundEventError::validation("key", "tag key must not be empty"));
        }
        Ok(Self {
            key,
            value: value.into(),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// A set of distinct tags, iterated in sorted order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(BTreeSet<Tag>);

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, tag: &Tag) -> bool {
        self.0.contains(tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.0.iter()
    }

    /// Returns the tag set with `tag` added. Adding a present tag is a no-op.
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.0.insert(tag);
        self
    }
}

impl FromIterator<Tag> for Tags {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A named numeric measurement, e.g. `duration = 0.12`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFeature")]
pub struct Feature {
    name: String,
    value: f64,
}

#[derive(Deserialize)]
struct RawFeature {
    name: String,
    value: f64,
}

impl TryFrom<RawFeature> for Feature {
    type Error = SoundEventError;

    fn try_from(raw: RawFeature) -> Result<Self> {
        Feature::new(raw.name, raw.value)
    }
}

impl Feature {
    /// Creates a feature; the name must not be blank and the value finite.
    pub fn new(name: impl Into<String>, value: f64) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SoundEventError::validation("name", "feature name must not be empty"));
        }
        if !value.is_finite() {
            return Err(SoundEventError::validation(
                name.clone(),
                format!("feature value {value} is not finite"),
            ));
        }
        Ok(Self { name, value })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Features keyed by name; each name appears once.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "Vec<Feature>", try_from = "Vec<Feature>")]
pub struct Features(BTreeMap<String, f64>);

impl Features {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps values already known to be finite.
    pub(crate) fn from_finite(values: BTreeMap<String, f64>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    /// Iterates `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Returns the collection with `feature` added.
    ///
    /// Fails if a feature of the same name is already present.
    pub fn with_feature(mut self, feature: Feature) -> Result<Self> {
        if self.0.contains_key(&feature.name) {
            return Err(SoundEventError::validation(
                format!("features.{}", feature.name),
                "duplicate feature name",
            ));
        }
        self.0.insert(feature.name, feature.value);
        Ok(self)
    }

    /// Collects features, rejecting duplicate names.
    pub fn try_from_features(features: impl IntoIterator<Item = Feature>) -> Result<Self> {
        features
            .into_iter()
            .try_fold(Self::new(), |collected, feature| collected.with_feature(feature))
    }
}

impl From<Features> for Vec<Feature> {
    fn from(features: Features) -> Self {
        features
            .0
            .into_iter()
            .map(|(name, value)| Feature { name, value })
            .collect()
    }
}

impl TryFrom<Vec<Feature>> for Features {
    type Error = SoundEventError;

    fn try_from(features: Vec<Feature>) -> Result<Self> {
        Features::try_from_features(features)
    }
}

/// A person or process that creates annotations and notes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawUser")]
pub struct User {
    #[serde(rename = "uuid")]
    id: UserId,
    username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    institution: Option<String>,
}

#[derive(Deserialize)]
struct RawUser {
    uuid: UserId,
    username: String,
    email: Option<String>,
    name: Option<String>,
    institution: Option<String>,
}

impl TryFrom<RawUser> for User {
    type Error = SoundEventError;

    fn try_from(raw: RawUser) -> Result<Self> {
        let mut user = User::new(raw.username)?.with_id(raw.uuid);
        if let Some(email) = raw.email {
            user = user.with_email(email)?;
        }
        user.name = raw.name;
        user.institution = raw.institution;
        Ok(user)
    }
}

impl User {
    pub fn new(username: impl Into<String>) -> Result<Self> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(SoundEventError::validation("username", "must not be empty"));
        }
        Ok(Self {
            id: UserId::new(),
            username,
            email: None,
            name: None,
            institution: None,
        })
    }

    pub fn with_id(mut self, id: UserId) -> Self {
        self.id = id;
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Result<Self> {
        let email = email.into();
        if !email.contains('@') {
            return Err(SoundEventError::validation(
                "email",
                format!("'{email}' is not an email address"),
            ));
        }
        self.email = Some(email);
        Ok(self)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_institution(mut self, institution: impl Into<String>) -> Self {
        self.institution = Some(institution.into());
        self
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn institution(&self) -> Option<&str> {
        self.institution.as_deref()
    }
}

/// A free-text comment, optionally flagged as an issue to resolve.
#[derive(Clone, Debug, PartialEq)]
pub struct Note {
    id: NoteId,
    message: String,
    created_by: Option<Arc<User>>,
    is_issue: bool,
    created_at: DateTime<Utc>,
}

impl Note {
    /// Creates a note timestamped now; the message must not be blank.
    pub fn new(message: impl Into<String>) -> Result<Self> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(SoundEventError::validation("message", "note message must not be empty"));
        }
        Ok(Self {
            id: NoteId::new(),
            message,
            created_by: None,
            is_issue: false,
            created_at: Utc::now(),
        })
    }

    pub fn with_id(mut self, id: NoteId) -> Self {
        self.id = id;
        self
    }

    pub fn with_author(mut self, user: Arc<User>) -> Self {
        self.created_by = Some(user);
        self
    }

    pub fn with_issue(mut self, is_issue: bool) -> Self {
        self.is_issue = is_issue;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn id(&self) -> NoteId {
        self.id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn created_by(&self) -> Option<&Arc<User>> {
        self.created_by.as_ref()
    }

    pub fn is_issue(&self) -> bool {
        self.is_issue
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// The tags, features and notes carried by one entity.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Descriptors {
    tags: Tags,
    features: Features,
    notes: Vec<Note>,
}

impl Descriptors {
    pub fn new(tags: Tags, features: Features, notes: Vec<Note>) -> Self {
        Self { tags, features, notes }
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn features(&self) -> &Features {
        &self.features
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }
}

/// Read access to an entity's descriptors, plus builders that return an
/// updated copy of the entity.
pub trait Described: Sized {
    fn descriptors(&self) -> &Descriptors;

    /// Returns the entity with its descriptors replaced.
    fn with_descriptors(self, descriptors: Descriptors) -> Self;

    fn tags(&self) -> &Tags {
        self.descriptors().tags()
    }

    fn features(&self) -> &Features {
        self.descriptors().features()
    }

    fn notes(&self) -> &[Note] {
        self.descriptors().notes()
    }

    fn with_tag(self, tag: Tag) -> Self {
        let mut descriptors = self.descriptors().clone();
        descriptors.tags = descriptors.tags.with_tag(tag);
        self.with_descriptors(descriptors)
    }

    /// Fails if a feature with the same name is already attached.
    fn with_feature(self, feature: Feature) -> Result<Self> {
        let mut descriptors = self.descriptors().clone();
        descriptors.features = descriptors.features.with_feature(feature)?;
        Ok(self.with_descriptors(descriptors))
    }

    fn with_note(self, note: Note) -> Self {
        let mut descriptors = self.descriptors().clone();
        descriptors.notes.push(note);
        self.with_descriptors(descriptors)
    }
}

/// Implements [`Described`] for a struct with a `descriptors` field.
macro_rules! impl_described {
    ($($entity:ty),+ $(,)?) => {
        $(
            impl $crate::data::Described for $entity {
                fn descriptors(&self) -> &$crate::data::Descriptors {
                    &self.descriptors
                }

                fn with_descriptors(mut self, descriptors: $crate::data::Descriptors) -> Self {
                    self.descriptors = descriptors;
                    self
                }
            }
        )+
    };
}

pub(crate) use impl_described;
