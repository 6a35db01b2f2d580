use std::sync::Arc;

use proptest::prelude::*;
use soundevent::data::{ClipAnnotation, SoundEvent};
use soundevent::document::{decode, encode, from_json_str, to_json_string};
use soundevent::geometry::Geometry;

mod proptest_helpers;

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn clip_annotation_roundtrip_is_lossless(annotation in proptest_helpers::arb_clip_annotation()) {
        let text = to_json_string(&encode(&annotation)).expect("serialize document");
        let restored: ClipAnnotation = decode(&from_json_str(&text).expect("parse document"))
            .expect("decode document");

        prop_assert_eq!(annotation, restored);
    }

    #[test]
    fn clip_annotation_encoding_is_idempotent(annotation in proptest_helpers::arb_clip_annotation()) {
        let first = encode(&annotation);
        let restored: ClipAnnotation = decode(&first).expect("decode first pass");
        let second = encode(&restored);

        prop_assert_eq!(first, second);
    }

    #[test]
    fn decoded_annotation_shares_author(annotation in proptest_helpers::arb_clip_annotation()) {
        let restored: ClipAnnotation = decode(&encode(&annotation)).expect("decode document");
        let authors: Vec<_> = restored
            .sound_events()
            .iter()
            .filter_map(|a| a.created_by().cloned())
            .collect();
        for pair in authors.windows(2) {
            prop_assert!(Arc::ptr_eq(&pair[0], &pair[1]));
        }
    }

    #[test]
    fn sound_event_roundtrip_is_lossless(geometry in proptest_helpers::arb_geometry()) {
        let event = SoundEvent::new(Default::default(), geometry);
        let restored: SoundEvent = decode(&encode(&event)).expect("decode document");
        prop_assert_eq!(event, restored);
    }
}

#[test]
fn geometry_document_form_matches_nesting() {
    let line: Geometry = Geometry::line_string([(0.0, 100.0), (1.0, 200.0)]).unwrap();
    assert_eq!(
        line.to_json(),
        serde_json::json!({"type": "LineString", "coordinates": [[0.0, 100.0], [1.0, 200.0]]})
    );

    let stamp: Geometry = Geometry::time_stamp(2.5).unwrap();
    assert_eq!(
        stamp.to_json(),
        serde_json::json!({"type": "TimeStamp", "coordinates": 2.5})
    );
}
