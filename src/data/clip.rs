//! Clips: time windows of a recording.

use std::sync::Arc;

use super::descriptors::{impl_described, Descriptors};
use super::ids::ClipId;
use super::recording::Recording;
use crate::error::{Result, SoundEventError};

/// A `[start_time, end_time)` window of a recording, in seconds.
#[derive(Clone, Debug, PartialEq)]
pub struct Clip {
    id: ClipId,
    recording: Arc<Recording>,
    start_time: f64,
    end_time: f64,
    descriptors: Descriptors,
}

impl_described!(Clip);

impl Clip {
    /// Creates a clip; requires `0 <= start_time < end_time <= duration`.
    pub fn new(recording: Arc<Recording>, start_time: f64, end_time: f64) -> Result<Self> {
        if !start_time.is_finite() || start_time < 0.0 {
            return Err(SoundEventError::validation(
                "start_time",
                format!("{start_time} must be a non-negative number of seconds"),
            ));
        }
        if !end_time.is_finite() || end_time <= start_time {
            return Err(SoundEventError::validation(
                "end_time",
                format!("{end_time} must be after start time {start_time}"),
            ));
        }
        if end_time > recording.duration() {
            return Err(SoundEventError::validation(
                "end_time",
                format!(
                    "{end_time} is past the end of the recording ({} s)",
                    recording.duration()
                ),
            ));
        }
        Ok(Self {
            id: ClipId::new(),
            recording,
            start_time,
            end_time,
            descriptors: Descriptors::default(),
        })
    }

    pub fn with_id(mut self, id: ClipId) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> ClipId {
        self.id
    }

    pub fn recording(&self) -> &Arc<Recording> {
        &self.recording
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Splits the clip into windows of `duration` seconds, `hop` seconds
    /// apart (`hop` defaults to `duration`).
    ///
    /// A trailing window that would run past the clip is dropped, unless
    /// `include_incomplete` is set, in which case it is cut at the clip end.
    /// Segment IDs derive from this clip's ID and the segment's times, so
    /// segmenting the same clip twice yields the same IDs.
    pub fn segments(&self, duration: f64, hop: Option<f64>, include_incomplete: bool) -> Result<Vec<Clip>> {
        let hop = hop.unwrap_or(duration);
        if !duration.is_finite() || duration <= 0.0 {
            return Err(SoundEventError::validation(
                "duration",
                format!("{duration} must be a positive number of seconds"),
            ));
        }
        if !hop.is_finite() || hop <= 0.0 {
            return Err(SoundEventError::validation(
                "hop",
                format!("{hop} must be a positive number of seconds"),
            ));
        }

        let count = (self.duration() / hop).floor() as usize;
        let mut segments = Vec::with_capacity(count);
        for i in 0..count {
            let start_time = self.start_time + i as f64 * hop;
            let mut end_time = start_time + duration;
            if start_time >= self.end_time || (end_time > self.end_time && !include_incomplete) {
                break;
            }
            end_time = end_time.min(self.end_time);

            let name = format!("segment_clip:{}:{start_time:?}:{end_time:?}", self.id);
            segments.push(
                Clip::new(Arc::clone(&self.recording), start_time, end_time)?.with_id(ClipId::derived(&name)),
            );
        }
        Ok(segments)
    }
}
