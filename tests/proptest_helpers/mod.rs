#![allow(dead_code)]

use std::sync::Arc;

use proptest::collection::vec;
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};
use soundevent::data::{
    Clip, ClipAnnotation, Described, Feature, Recording, SoundEvent, SoundEventAnnotation, Tag, User,
};
use soundevent::geometry::{Discretization, Geometry, MAX_FREQUENCY};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

pub fn arb_time() -> impl Strategy<Value = f64> {
    0.0f64..600.0
}

pub fn arb_frequency() -> impl Strategy<Value = f64> {
    0.0f64..=MAX_FREQUENCY
}

pub fn arb_position() -> impl Strategy<Value = (f64, f64)> {
    (arb_time(), 0.0f64..100_000.0)
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// A time-ordered line with at least two distinct positions.
fn arb_line() -> impl Strategy<Value = Vec<(f64, f64)>> {
    (arb_time(), 0.01f64..5.0, vec(0.0f64..100_000.0, 2..8)).prop_map(|(start, step, freqs)| {
        freqs
            .into_iter()
            .enumerate()
            .map(|(i, f)| (start + step * i as f64, f))
            .collect()
    })
}

/// A closed rectangular ring.
fn arb_ring() -> impl Strategy<Value = Vec<(f64, f64)>> {
    (arb_position(), 0.01f64..10.0, 1.0f64..5_000.0).prop_map(|((t, f), dt, df)| {
        vec![(t, f), (t + dt, f), (t + dt, f + df), (t, f + df), (t, f)]
    })
}

pub fn arb_geometry() -> BoxedStrategy<Geometry> {
    prop_oneof![
        arb_time().prop_map(|t| Geometry::time_stamp(t).unwrap()),
        (arb_time(), arb_time()).prop_map(|(a, b)| {
            let (start, end) = ordered(a, b);
            Geometry::time_interval(start, end).unwrap()
        }),
        (arb_time(), arb_frequency()).prop_map(|(t, f)| Geometry::point(t, f).unwrap()),
        arb_line().prop_map(|line| Geometry::line_string(line).unwrap()),
        arb_ring().prop_map(|ring| Geometry::polygon([ring]).unwrap()),
        (arb_time(), arb_time(), arb_frequency(), arb_frequency()).prop_map(|(t0, t1, f0, f1)| {
            let (start, end) = ordered(t0, t1);
            let (low, high) = ordered(f0, f1);
            Geometry::bounding_box(start, low, end, high).unwrap()
        }),
        vec(arb_position(), 1..6).prop_map(|points| Geometry::multi_point(points).unwrap()),
        vec(arb_line(), 1..4).prop_map(|lines| Geometry::multi_line_string(lines).unwrap()),
        vec(arb_ring(), 1..4)
            .prop_map(|rings| Geometry::multi_polygon(rings.into_iter().map(|r| vec![r])).unwrap()),
    ]
    .boxed()
}

/// A geometry with a frequency extent.
pub fn arb_geometry_2d() -> BoxedStrategy<Geometry> {
    arb_geometry()
        .prop_filter("needs a frequency extent", |g| !g.bounds().is_time_only())
        .boxed()
}

/// A strictly increasing axis of `n` bins starting at zero.
pub fn arb_axis(n: std::ops::Range<usize>, max_step: f64) -> impl Strategy<Value = Vec<f64>> {
    vec(0.001f64..max_step, n).prop_map(|steps| {
        steps
            .into_iter()
            .scan(0.0, |acc, step| {
                let value = *acc;
                *acc += step;
                Some(value)
            })
            .collect()
    })
}

pub fn arb_discretization() -> impl Strategy<Value = Discretization> {
    (arb_axis(2..64, 20.0), arb_axis(2..64, 100_000.0))
        .prop_map(|(times, frequencies)| Discretization::new(times, frequencies).unwrap())
}

fn arb_tag() -> impl Strategy<Value = Tag> {
    ("[a-z]{1,8}", "[A-Za-z ]{1,12}").prop_map(|(key, value)| Tag::new(key, value).unwrap())
}

/// A clip annotation whose sound events all share one author and recording.
pub fn arb_clip_annotation() -> BoxedStrategy<ClipAnnotation> {
    (
        vec(arb_geometry(), 0..6),
        vec(arb_tag(), 0..4),
        "[a-z]{3,10}",
        proptest::option::of(-1000.0f64..1000.0),
    )
        .prop_map(|(geometries, tags, username, snr)| {
            let recording = Arc::new(Recording::new("clip.wav", 600.0, 48_000, 1).unwrap());
            let clip = Arc::new(Clip::new(recording.clone(), 0.0, 600.0).unwrap());
            let author = Arc::new(User::new(username).unwrap());

            let mut annotation = ClipAnnotation::new(clip);
            for geometry in geometries {
                let event = Arc::new(SoundEvent::new(recording.id(), geometry));
                let child = tags
                    .iter()
                    .cloned()
                    .fold(SoundEventAnnotation::new(event), |a, tag| a.with_tag(tag))
                    .with_author(author.clone());
                annotation = annotation.with_sound_event(child).unwrap();
            }
            if let Some(snr) = snr {
                annotation = annotation.with_feature(Feature::new("snr", snr).unwrap()).unwrap();
            }
            annotation
        })
        .boxed()
}
