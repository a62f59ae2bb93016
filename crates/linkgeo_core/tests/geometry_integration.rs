mod common;

use std::sync::Arc;

use common::*;
use linkgeo_core::{
    AberrationCorrection, Body, BodySegment, EngineError, Epoch, Frame, FrameLink,
    GeometryEngine, GeometrySettings, LinkRequest, MemoryProvider, Stage, StateVectorResolver,
};
use linkgeo_frames::matrix::{IDENTITY, rotation_about_axis};

fn request(boresight: [f64; 3]) -> LinkRequest {
    LinkRequest {
        observer: LANDER,
        target: Body::EARTH,
        boresight,
        boresight_frame: LANDER_FRAME,
        inertial_frame: Frame::J2000,
    }
}

#[test]
fn perpendicular_target_is_ninety_degrees() {
    let time = time();
    let provider = static_scene([1000.0, 0.0, 0.0]);
    let engine = GeometryEngine::new(&time, &provider);
    let sep = engine
        .angular_separation_to_target(
            UTC,
            [0.0, 0.0, 1.0],
            LANDER_FRAME,
            Frame::J2000,
            LANDER,
            Body::EARTH,
        )
        .unwrap();
    assert_close(sep.degrees(), 90.0, 1e-12);
}

#[test]
fn boresight_on_target_is_zero() {
    let time = time();
    let provider = static_scene([0.0, 0.0, 1000.0]);
    let engine = GeometryEngine::new(&time, &provider);
    let sep = engine.separation_at_utc(UTC, &request([0.0, 0.0, 1.0])).unwrap();
    assert_eq!(sep.degrees(), 0.0);
}

#[test]
fn antiparallel_is_exactly_one_eighty() {
    let time = time();
    let provider = static_scene([0.0, 0.0, -1000.0]);
    let engine = GeometryEngine::new(&time, &provider);
    let sep = engine.separation_at_utc(UTC, &request([0.0, 0.0, 1.0])).unwrap();
    assert_eq!(sep.degrees(), 180.0);
}

#[test]
fn separation_ignores_boresight_length() {
    let time = time();
    let provider = static_scene([1000.0, 2000.0, -500.0]);
    let engine = GeometryEngine::new(&time, &provider);
    let reference = engine.separation_at_utc(UTC, &request([0.3, -0.2, 0.9])).unwrap();
    for k in [1e-6, 0.5, 7.0, 1e9] {
        let sep = engine
            .separation_at_utc(UTC, &request([0.3 * k, -0.2 * k, 0.9 * k]))
            .unwrap();
        assert_close(sep.degrees(), reference.degrees(), 1e-12);
    }
}

#[test]
fn boresight_is_rotated_into_inertial_frame() {
    let time = time();
    let mut provider = static_scene([0.0, 1000.0, 0.0]);
    // Antenna frame x axis points along J2000 +y.
    let yaw = rotation_about_axis(&[0.0, 0.0, 1.0], std::f64::consts::FRAC_PI_2).unwrap();
    provider
        .load_frame_link(FrameLink::fixed(ANTENNA_FRAME, LANDER_FRAME, yaw))
        .unwrap();
    let engine = GeometryEngine::new(&time, &provider);
    let req = LinkRequest {
        boresight_frame: ANTENNA_FRAME,
        ..request([1.0, 0.0, 0.0])
    };
    let sep = engine.separation_at_utc(UTC, &req).unwrap();
    assert!(sep.degrees() < 1e-12, "{sep}");
}

#[test]
fn ecliptic_measurement_frame_gives_same_angle() {
    let time = time();
    let provider = static_scene([1000.0, 2000.0, -500.0]);
    let engine = GeometryEngine::new(&time, &provider);
    let j2000 = engine.separation_at_utc(UTC, &request([0.1, 0.2, 0.9])).unwrap();
    let ecliptic = engine
        .separation_at_utc(
            UTC,
            &LinkRequest {
                inertial_frame: Frame::ECLIPJ2000,
                ..request([0.1, 0.2, 0.9])
            },
        )
        .unwrap();
    assert_close(ecliptic.degrees(), j2000.degrees(), 1e-11);
}

#[test]
fn zero_boresight_is_degenerate() {
    let time = time();
    let provider = static_scene([1000.0, 0.0, 0.0]);
    let engine = GeometryEngine::new(&time, &provider);
    let err = engine.separation_at_utc(UTC, &request([0.0; 3])).unwrap_err();
    assert!(matches!(err, EngineError::DegenerateGeometry(_)));
    assert_eq!(err.stage(), Stage::Geometry);
}

#[test]
fn coincident_bodies_are_degenerate() {
    let time = time();
    let provider = static_scene([0.0; 3]);
    let engine = GeometryEngine::new(&time, &provider);
    let err = engine.separation_at_utc(UTC, &request([0.0, 0.0, 1.0])).unwrap_err();
    assert!(matches!(err, EngineError::DegenerateGeometry(_)), "{err}");
}

#[test]
fn malformed_time_fails_first_stage() {
    let time = time();
    let provider = static_scene([1000.0, 0.0, 0.0]);
    let engine = GeometryEngine::new(&time, &provider);
    for utc in ["", "2012-AUG-06", "2012-13-06 05:17:57", "2012-AUG-06 05:17:57 05:17:57"] {
        let err = engine.separation_at_utc(utc, &request([0.0, 0.0, 1.0])).unwrap_err();
        assert!(matches!(err, EngineError::MalformedTime(_)), "{utc:?}: {err}");
        assert_eq!(err.stage(), Stage::TimeConversion);
    }
}

#[test]
fn missing_leap_seconds_is_reference_data_missing() {
    let time = linkgeo_core::TimeConverter::unloaded();
    let provider = static_scene([1000.0, 0.0, 0.0]);
    let engine = GeometryEngine::new(&time, &provider);
    let err = engine.separation_at_utc(UTC, &request([0.0, 0.0, 1.0])).unwrap_err();
    assert!(matches!(err, EngineError::ReferenceDataMissing(_)), "{err}");
}

#[test]
fn missing_body_and_frame_data_are_reported_by_stage() {
    let time = time();
    let mut provider = MemoryProvider::new();
    provider
        .load_segment(BodySegment::fixed(
            Body::EARTH,
            Body::SOLAR_SYSTEM_BARYCENTER,
            [1.0e3, 0.0, 0.0],
        ))
        .unwrap();
    let engine = GeometryEngine::new(&time, &provider);
    let err = engine.separation_at_utc(UTC, &request([0.0, 0.0, 1.0])).unwrap_err();
    assert!(matches!(err, EngineError::EphemerisDataUnavailable { .. }), "{err}");
    assert_eq!(err.stage(), Stage::StateResolution);

    provider
        .load_segment(BodySegment::fixed(
            LANDER,
            Body::SOLAR_SYSTEM_BARYCENTER,
            [0.0; 3],
        ))
        .unwrap();
    let engine = GeometryEngine::new(&time, &provider);
    let err = engine.separation_at_utc(UTC, &request([0.0, 0.0, 1.0])).unwrap_err();
    assert!(matches!(err, EngineError::FrameDataUnavailable { .. }), "{err}");
    assert_eq!(err.stage(), Stage::FrameTransform);
}

#[test]
fn link_report_carries_both_directions() {
    let time = time();
    let at = time.to_ephemeris_time(UTC).unwrap().epoch;
    let mut provider = MemoryProvider::new();
    provider
        .load_segment(BodySegment::uniform(
            LANDER,
            Body::SOLAR_SYSTEM_BARYCENTER,
            at,
            [0.0; 3],
            [0.0, 20.0, 0.0],
        ))
        .unwrap();
    provider
        .load_segment(BodySegment::fixed(
            Body::EARTH,
            Body::SOLAR_SYSTEM_BARYCENTER,
            [3.0e7, 0.0, 0.0],
        ))
        .unwrap();
    provider
        .load_frame_link(FrameLink::fixed(LANDER_FRAME, Frame::J2000, IDENTITY))
        .unwrap();
    let engine = GeometryEngine::new(&time, &provider);
    let report = engine.link_geometry(UTC, &request([1.0, 0.0, 0.0])).unwrap();

    assert_eq!(report.instant.text, UTC);
    assert_eq!(report.sol(), None);
    assert_eq!(report.boresight.frame, Frame::J2000);
    assert_eq!(report.apparent_target().frame, Frame::J2000);
    assert_eq!(report.target_from_observer.state.target, Body::EARTH);
    assert_eq!(report.observer_from_target.state.target, LANDER);
    assert_eq!(
        report.target_from_observer.state.correction,
        AberrationCorrection::LightTimeStellar
    );
    assert_close(report.target_from_observer.light_time_s, 3.0e7 / 299_792.458, 1e-6);
    // Aberration from the lander's 20 km/s tilts Earth off the +x boresight.
    let expected = (20.0_f64 / 299_792.458).asin().to_degrees();
    assert_close(report.separation.degrees(), expected, 1e-9);
    assert!(report.boresight_aligned);

    let strict = GeometrySettings {
        alignment_threshold_deg: 1e-3,
        ..GeometrySettings::default()
    };
    let engine = GeometryEngine::with_settings(&time, &provider, strict).unwrap();
    assert!(!engine.link_geometry(UTC, &request([1.0, 0.0, 0.0])).unwrap().boresight_aligned);
}

#[test]
fn series_results_are_independent() {
    let time = time();
    let provider = static_scene([1000.0, 0.0, 0.0]);
    let engine = GeometryEngine::new(&time, &provider);
    let results = engine.separation_series(
        &["2012-AUG-06 05:17:57", "bogus", "2012-08-06T06:00:00"],
        &request([0.0, 0.0, 1.0]),
    );
    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(EngineError::MalformedTime(_))));
    assert!(results[2].is_ok());
}

#[test]
fn provider_is_shared_across_threads() {
    let time = Arc::new(time());
    let provider = Arc::new(static_scene([1000.0, 1000.0, 0.0]));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let time = Arc::clone(&time);
            let provider = Arc::clone(&provider);
            std::thread::spawn(move || {
                let engine = GeometryEngine::new(&time, provider.as_ref());
                let utc = format!("2012-AUG-06 05:1{i}:00");
                engine.separation_at_utc(&utc, &request([1.0, 0.0, 0.0])).map(|s| s.degrees())
            })
        })
        .collect();
    for h in handles {
        assert_close(h.join().unwrap().unwrap(), 45.0, 1e-12);
    }
}

#[test]
fn resolver_is_usable_without_engine() {
    let provider = static_scene([0.0, 299_792.458, 0.0]);
    let rs = StateVectorResolver::new(&provider)
        .relative_state(
            LANDER,
            Body::EARTH,
            Epoch::from_tdb_seconds(0.0),
            Frame::J2000,
            AberrationCorrection::LightTime,
        )
        .unwrap();
    assert_close(rs.light_time_s, 1.0, 1e-12);
}
