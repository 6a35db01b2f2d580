//! Sound events: located regions of interest within a recording.

use super::descriptors::{impl_described, Descriptors};
use super::ids::{RecordingId, SoundEventId};
use crate::geometry::{Bounds, Geometry};

/// A region of interest in one recording.
///
/// The geometry's times are relative to the start of the recording, not of
/// any clip.
#[derive(Clone, Debug, PartialEq)]
pub struct SoundEvent {
    id: SoundEventId,
    recording: RecordingId,
    geometry: Geometry,
    descriptors: Descriptors,
}

impl_described!(SoundEvent);

impl SoundEvent {
    pub fn new(recording: RecordingId, geometry: Geometry) -> Self {
        Self {
            id: SoundEventId::new(),
            recording,
            geometry,
            descriptors: Descriptors::default(),
        }
    }

    pub fn with_id(mut self, id: SoundEventId) -> Self {
        self.id = id;
        self
    }

    /// Returns a copy with its geometry replaced; the ID is kept.
    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn id(&self) -> SoundEventId {
        self.id
    }

    pub fn recording(&self) -> RecordingId {
        self.recording
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn bounds(&self) -> Bounds {
        self.geometry.bounds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Described, Feature};
    use crate::geometry::compute_geometric_features;

    #[test]
    fn test_sound_event_bounds() {
        let geometry = Geometry::bounding_box(1.0, 20_000.0, 1.05, 45_000.0).unwrap();
        let event = SoundEvent::new(RecordingId::new(), geometry);
        assert_eq!(event.bounds().as_tuple(), (1.0, 20_000.0, 1.05, 45_000.0));
    }

    #[test]
    fn test_attach_geometric_features() {
        let geometry = Geometry::time_interval(0.5, 0.75).unwrap();
        let mut event = SoundEvent::new(RecordingId::new(), geometry);
        for (name, value) in compute_geometric_features(event.geometry()).iter() {
            event = event.with_feature(Feature::new(name, value).unwrap()).unwrap();
        }
        assert_eq!(event.features().get("duration"), Some(0.25));
    }
}
