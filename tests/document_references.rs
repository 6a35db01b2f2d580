use std::sync::Arc;

use serde_json::{json, Value};
use soundevent::data::{ClipAnnotation, Recording};
use soundevent::document::decode;
use soundevent::{ErrorKind, SoundEventError};

const RECORDING: &str = "0f6c7d2e-4b8a-4c1e-9d3f-2a5b6c7d8e9f";
const CLIP: &str = "1a2b3c4d-5e6f-4a1b-8c2d-3e4f5a6b7c8d";
const EVENT: &str = "2b3c4d5e-6f7a-4b2c-9d3e-4f5a6b7c8d9e";
const CREATED: &str = "2024-05-01T05:30:00Z";

fn recording() -> Value {
    json!({
        "uuid": RECORDING,
        "path": "site_a/dawn.wav",
        "duration": 60.0,
        "samplerate": 48000,
        "channels": 1
    })
}

fn clip() -> Value {
    json!({
        "uuid": CLIP,
        "recording": recording(),
        "start_time": 0.0,
        "end_time": 30.0
    })
}

fn event() -> Value {
    json!({
        "uuid": EVENT,
        "recording": RECORDING,
        "geometry": {"type": "BoundingBox", "coordinates": [1.0, 2000.0, 1.5, 6000.0]}
    })
}

fn event_annotation(id: &str, sound_event: Value) -> Value {
    json!({"uuid": id, "sound_event": sound_event, "created_at": CREATED})
}

fn document(sound_events: Vec<Value>, sequences: Vec<Value>) -> Value {
    json!({
        "version": "1.0",
        "kind": "clip_annotation",
        "data": {
            "uuid": "3c4d5e6f-7a8b-4c3d-8e4f-5a6b7c8d9e0f",
            "clip": clip(),
            "sound_events": sound_events,
            "sequences": sequences,
            "created_at": CREATED
        }
    })
}

fn reference(id: &str) -> Value {
    json!({ "$ref": id })
}

#[test]
fn embedded_once_referenced_twice_shares_one_value() {
    let doc = document(
        vec![
            event_annotation("4d5e6f7a-8b9c-4d4e-9f5a-6b7c8d9e0f1a", event()),
            event_annotation("5e6f7a8b-9c0d-4e5f-8a6b-7c8d9e0f1a2b", reference(EVENT)),
            event_annotation("6f7a8b9c-0d1e-4f6a-9b7c-8d9e0f1a2b3c", reference(EVENT)),
        ],
        vec![],
    );

    let annotation: ClipAnnotation = decode(&doc).expect("decode document");
    let events: Vec<_> = annotation.sound_events().iter().map(|a| a.sound_event()).collect();
    assert_eq!(events.len(), 3);
    assert!(Arc::ptr_eq(events[0], events[1]));
    assert!(Arc::ptr_eq(events[1], events[2]));
    assert_eq!(events[0].id().to_string(), EVENT);
}

#[test]
fn reference_before_embedding_resolves() {
    let doc = document(
        vec![
            event_annotation("4d5e6f7a-8b9c-4d4e-9f5a-6b7c8d9e0f1a", reference(EVENT)),
            event_annotation("5e6f7a8b-9c0d-4e5f-8a6b-7c8d9e0f1a2b", event()),
        ],
        vec![],
    );

    let annotation: ClipAnnotation = decode(&doc).expect("decode document");
    let events = annotation.sound_events();
    assert!(Arc::ptr_eq(events[0].sound_event(), events[1].sound_event()));
}

#[test]
fn dangling_reference_fails() {
    let missing = "7a8b9c0d-1e2f-4a7b-8c8d-9e0f1a2b3c4d";
    let doc = document(
        vec![
            event_annotation("4d5e6f7a-8b9c-4d4e-9f5a-6b7c8d9e0f1a", event()),
            event_annotation("5e6f7a8b-9c0d-4e5f-8a6b-7c8d9e0f1a2b", reference(missing)),
        ],
        vec![],
    );

    let err = decode::<ClipAnnotation>(&doc).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Reference);
    match err {
        SoundEventError::Reference { kind, id } => {
            assert_eq!(kind, "SoundEvent");
            assert_eq!(id, missing);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn reference_to_entity_of_another_kind_fails() {
    let doc = document(
        vec![event_annotation("4d5e6f7a-8b9c-4d4e-9f5a-6b7c8d9e0f1a", reference(RECORDING))],
        vec![],
    );

    match decode::<ClipAnnotation>(&doc).unwrap_err() {
        SoundEventError::Reference { kind, id } => {
            assert_eq!(kind, "SoundEvent");
            assert_eq!(id, RECORDING);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn identical_duplicate_embeddings_share_one_value() {
    let doc = document(
        vec![
            event_annotation("4d5e6f7a-8b9c-4d4e-9f5a-6b7c8d9e0f1a", event()),
            event_annotation("5e6f7a8b-9c0d-4e5f-8a6b-7c8d9e0f1a2b", event()),
        ],
        vec![],
    );

    let annotation: ClipAnnotation = decode(&doc).expect("decode document");
    let events = annotation.sound_events();
    assert!(Arc::ptr_eq(events[0].sound_event(), events[1].sound_event()));
}

#[test]
fn conflicting_duplicate_embeddings_fail() {
    let mut moved = event();
    moved["geometry"] = json!({"type": "TimeStamp", "coordinates": 2.0});
    let doc = document(
        vec![
            event_annotation("4d5e6f7a-8b9c-4d4e-9f5a-6b7c8d9e0f1a", reference(EVENT)),
            event_annotation("5e6f7a8b-9c0d-4e5f-8a6b-7c8d9e0f1a2b", event()),
            event_annotation("6f7a8b9c-0d1e-4f6a-9b7c-8d9e0f1a2b3c", moved),
        ],
        vec![],
    );

    match decode::<ClipAnnotation>(&doc).unwrap_err() {
        SoundEventError::Validation { field, message } => {
            assert!(field.ends_with("SoundEvent.uuid"), "{field}");
            assert!(message.contains("different contents"), "{message}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

fn sequence(id: &str, parent: Option<&str>) -> Value {
    json!({
        "uuid": id,
        "recording": RECORDING,
        "sound_events": [EVENT],
        "parent": parent
    })
}

fn sequence_annotation(id: &str, sequence: Value) -> Value {
    json!({"uuid": id, "sequence": sequence, "created_at": CREATED})
}

#[test]
fn sequence_cycle_fails() {
    let first = "8b9c0d1e-2f3a-4b8c-9d9e-0f1a2b3c4d5e";
    let second = "9c0d1e2f-3a4b-4c9d-8e0f-1a2b3c4d5e6f";
    let doc = document(
        vec![event_annotation("4d5e6f7a-8b9c-4d4e-9f5a-6b7c8d9e0f1a", event())],
        vec![
            sequence_annotation("0d1e2f3a-4b5c-4d0e-9f1a-2b3c4d5e6f7a", sequence(first, Some(second))),
            sequence_annotation("1e2f3a4b-5c6d-4e1f-8a2b-3c4d5e6f7a8b", sequence(second, Some(first))),
        ],
    );

    let err = decode::<ClipAnnotation>(&doc).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cycle);
}

#[test]
fn self_parented_sequence_fails() {
    let only = "8b9c0d1e-2f3a-4b8c-9d9e-0f1a2b3c4d5e";
    let doc = document(
        vec![event_annotation("4d5e6f7a-8b9c-4d4e-9f5a-6b7c8d9e0f1a", event())],
        vec![sequence_annotation(
            "0d1e2f3a-4b5c-4d0e-9f1a-2b3c4d5e6f7a",
            sequence(only, Some(only)),
        )],
    );

    assert_eq!(decode::<ClipAnnotation>(&doc).unwrap_err().kind(), ErrorKind::Cycle);
}

#[test]
fn valid_sequence_hierarchy_decodes() {
    let parent = "8b9c0d1e-2f3a-4b8c-9d9e-0f1a2b3c4d5e";
    let child = "9c0d1e2f-3a4b-4c9d-8e0f-1a2b3c4d5e6f";
    let doc = document(
        vec![event_annotation("4d5e6f7a-8b9c-4d4e-9f5a-6b7c8d9e0f1a", event())],
        vec![
            sequence_annotation("0d1e2f3a-4b5c-4d0e-9f1a-2b3c4d5e6f7a", sequence(parent, None)),
            sequence_annotation("1e2f3a4b-5c6d-4e1f-8a2b-3c4d5e6f7a8b", sequence(child, Some(parent))),
        ],
    );

    let annotation: ClipAnnotation = decode(&doc).expect("decode document");
    let sequences = annotation.sequences();
    assert_eq!(sequences[1].sequence().parent(), Some(sequences[0].sequence().id()));
}

#[test]
fn invalid_field_is_named() {
    let mut doc = json!({"version": "1.0", "kind": "recording", "data": recording()});
    doc["data"]["duration"] = json!(-1.0);

    match decode::<Recording>(&doc).unwrap_err() {
        SoundEventError::Validation { field, .. } => assert_eq!(field, "Recording.duration"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn invalid_geometry_aborts_decode() {
    let mut bad_event = event();
    bad_event["geometry"] = json!({"type": "TimeInterval", "coordinates": [3.0, 1.0]});
    let doc = document(
        vec![event_annotation("4d5e6f7a-8b9c-4d4e-9f5a-6b7c8d9e0f1a", bad_event)],
        vec![],
    );

    match decode::<ClipAnnotation>(&doc).unwrap_err() {
        SoundEventError::Validation { field, .. } => assert!(field.contains("geometry"), "{field}"),
        other => panic!("unexpected error: {other:?}"),
    }
}
