//! Synthetic scenes shared by the integration tests.

#![allow(dead_code)]

use linkgeo_core::{Body, BodySegment, Frame, FrameLink, MemoryProvider, TimeConverter};
use linkgeo_frames::matrix::IDENTITY;

pub const LANDER: Body = Body::new(-76);
pub const LANDER_FRAME: Frame = Frame::new(-76000);
pub const ANTENNA_FRAME: Frame = Frame::new(-76060);

pub const UTC: &str = "2012-AUG-06 05:17:57.000";

pub fn time() -> TimeConverter {
    TimeConverter::with_builtin_table()
}

/// Lander at rest at the barycenter, boresight frame aligned with J2000,
/// Earth at rest at `earth_km`.
pub fn static_scene(earth_km: [f64; 3]) -> MemoryProvider {
    let mut p = MemoryProvider::new();
    p.load_segment(BodySegment::fixed(
        LANDER,
        Body::SOLAR_SYSTEM_BARYCENTER,
        [0.0; 3],
    ))
    .unwrap();
    p.load_segment(BodySegment::fixed(
        Body::EARTH,
        Body::SOLAR_SYSTEM_BARYCENTER,
        earth_km,
    ))
    .unwrap();
    p.load_frame_link(FrameLink::fixed(LANDER_FRAME, Frame::J2000, IDENTITY))
        .unwrap();
    p
}

pub fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() <= tol,
        "expected {expected}, got {actual} (tol {tol})"
    );
}
