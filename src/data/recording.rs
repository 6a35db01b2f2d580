//! Audio recordings and their capture metadata.

use chrono::{NaiveDate, NaiveTime};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::descriptors::{impl_described, Descriptors, User};
use super::ids::RecordingId;
use crate::error::{Result, SoundEventError};

/// A single audio file and what is known about how it was captured.
///
/// The content hash identifies the audio independently of where the file
/// lives; two recordings with the same hash hold the same samples.
#[derive(Clone, Debug, PartialEq)]
pub struct Recording {
    id: RecordingId,
    path: PathBuf,
    duration: f64,
    samplerate: u32,
    channels: u16,
    time_expansion: f64,
    hash: Option<String>,
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    owners: Vec<Arc<User>>,
    rights: Option<String>,
    descriptors: Descriptors,
}

impl_described!(Recording);

impl Recording {
    /// Creates a recording from its technical metadata.
    ///
    /// `duration` is in seconds and must be positive; `samplerate` (Hz) and
    /// `channels` must be non-zero. The path must be valid UTF-8 so documents
    /// can store it as a string.
    pub fn new(path: impl Into<PathBuf>, duration: f64, samplerate: u32, channels: u16) -> Result<Self> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(SoundEventError::validation(
                "duration",
                format!("{duration} must be a positive number of seconds"),
            ));
        }
        if samplerate == 0 {
            return Err(SoundEventError::validation("samplerate", "must be greater than zero"));
        }
        if channels == 0 {
            return Err(SoundEventError::validation("channels", "must be greater than zero"));
        }
        let path = path.into();
        if path.to_str().is_none() {
            return Err(SoundEventError::validation(
                "path",
                format!("{} is not valid UTF-8", path.display()),
            ));
        }
        Ok(Self {
            id: RecordingId::new(),
            path,
            duration,
            samplerate,
            channels,
            time_expansion: 1.0,
            hash: None,
            date: None,
            time: None,
            latitude: None,
            longitude: None,
            owners: Vec::new(),
            rights: None,
            descriptors: Descriptors::default(),
        })
    }

    pub fn with_id(mut self, id: RecordingId) -> Self {
        self.id = id;
        self
    }

    /// Sets the time-expansion factor of ultrasonic recorders (1 = real time).
    pub fn with_time_expansion(mut self, factor: f64) -> Result<Self> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(SoundEventError::validation(
                "time_expansion",
                format!("{factor} must be positive"),
            ));
        }
        self.time_expansion = factor;
        Ok(self)
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_time(mut self, time: NaiveTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Sets the capture location in decimal degrees.
    pub fn with_location(mut self, latitude: f64, longitude: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(SoundEventError::validation(
                "latitude",
                format!("{latitude} is outside [-90, 90]"),
            ));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(SoundEventError::validation(
                "longitude",
                format!("{longitude} is outside [-180, 180]"),
            ));
        }
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        Ok(self)
    }

    pub fn with_owner(mut self, owner: Arc<User>) -> Self {
        self.owners.push(owner);
        self
    }

    pub fn with_rights(mut self, rights: impl Into<String>) -> Self {
        self.rights = Some(rights.into());
        self
    }

    pub fn id(&self) -> RecordingId {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn samplerate(&self) -> u32 {
        self.samplerate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn time_expansion(&self) -> f64 {
        self.time_expansion
    }

    pub fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn time(&self) -> Option<NaiveTime> {
        self.time
    }

    /// Returns `(latitude, longitude)` if the location is known.
    pub fn location(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }

    pub fn owners(&self) -> &[Arc<User>] {
        &self.owners
    }

    pub fn rights(&self) -> Option<&str> {
        self.rights.as_deref()
    }

    /// Returns true if both recordings carry the same content hash.
    ///
    /// Recordings without a hash never match, not even themselves.
    pub fn same_content(&self, other: &Recording) -> bool {
        matches!((&self.hash, &other.hash), (Some(a), Some(b)) if a == b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Described, Tag};

    fn recording() -> Recording {
        Recording::new("site_a/20230601.wav", 60.0, 256_000, 1).unwrap()
    }

    #[cfg(unix)]
    #[test]
    fn test_new_rejects_non_utf8_path() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = PathBuf::from(OsStr::from_bytes(b"site_a/\xff.wav"));
        let err = Recording::new(path, 60.0, 48_000, 1).unwrap_err();
        assert!(matches!(err, SoundEventError::Validation { ref field, .. } if field == "path"));
    }

    #[test]
    fn test_new_validates_metadata() {
        assert!(Recording::new("a.wav", 0.0, 44_100, 1).is_err());
        assert!(Recording::new("a.wav", f64::NAN, 44_100, 1).is_err());
        assert!(Recording::new("a.wav", 1.0, 0, 1).is_err());
        assert!(Recording::new("a.wav", 1.0, 44_100, 0).is_err());
        assert_eq!(recording().time_expansion(), 1.0);
    }

    #[test]
    fn test_location_ranges() {
        assert!(recording().with_location(91.0, 0.0).is_err());
        assert!(recording().with_location(0.0, -181.0).is_err());
        let located = recording().with_location(51.5, -0.12).unwrap();
        assert_eq!(located.location(), Some((51.5, -0.12)));
    }

    #[test]
    fn test_same_content_uses_hash() {
        let a = recording().with_hash("abc");
        let b = Recording::new("moved/elsewhere.wav", 60.0, 256_000, 1)
            .unwrap()
            .with_hash("abc");
        assert!(a.same_content(&b));
        assert!(!recording().same_content(&recording()));
    }

    #[test]
    fn test_with_tag_returns_new_value() {
        let original = recording();
        let tagged = original.clone().with_tag(Tag::new("site", "A").unwrap());
        assert!(original.tags().is_empty());
        assert_eq!(tagged.tags().len(), 1);
        assert_eq!(tagged.id(), original.id());
    }
}
