//! Lander/Earth link geometry.
//!
//! Given a UTC instant, a boresight fixed on an observer, and a target
//! body, [`GeometryEngine`] computes the light-time and stellar-aberration
//! corrected direction to the target and its angle from the boresight.
//!
//! Reference data reaches the engine through the [`EphemerisProvider`]
//! trait. [`MemoryProvider`] is the in-memory implementation, populated
//! by a caller-side [`KernelLoader`] or directly from segments and frame
//! links.
//!
//! ```rust,ignore
//! let data = ReferenceData::load(&config, &loader)?;
//! let engine = data.engine()?;
//! let sep = engine.angular_separation_to_target(
//!     "2012-AUG-06 05:17:57.0",
//!     [0.0, 0.0, -1.0],
//!     HGA_FRAME,
//!     Frame::J2000,
//!     LANDER,
//!     Body::EARTH,
//! )?;
//! ```

pub mod body;
pub mod chebyshev;
pub mod clock;
pub mod config;
pub mod error;
pub mod geometry;
pub mod memory;
pub mod provider;
pub mod resolver;
pub mod state;
pub mod transformer;

pub use body::Body;
pub use chebyshev::ChebyshevRecord;
pub use clock::{ClockCorrelation, SclkReading, SpacecraftClock, sol_of};
pub use config::{KernelConfig, KernelKind, KernelLoader, ReferenceData};
pub use error::{EngineError, Stage};
pub use geometry::{
    AngularSeparation, GeometryEngine, GeometrySettings, LINK_CORRECTION, LinkGeometry,
    LinkRequest,
};
pub use memory::{AttitudeModel, BodyModel, BodySegment, FrameLink, MemoryProvider};
pub use provider::EphemerisProvider;
pub use resolver::{LightTimeSettings, QueryStats, StateVectorResolver, stellar_aberration};
pub use state::{AberrationCorrection, RelativeState, SPEED_OF_LIGHT_KM_S, StateVector};
pub use transformer::{FrameTransformer, ROTATION_TOLERANCE};

pub use linkgeo_frames::{Frame, FrameVector};
pub use linkgeo_time::{Epoch, Instant, TimeConverter};

// Compile-time assertion: shared state must be Send + Sync.
#[allow(dead_code)]
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn check() {
        assert_send_sync::<MemoryProvider>();
        assert_send_sync::<ReferenceData>();
        assert_send_sync::<GeometryEngine<'static, MemoryProvider>>();
        assert_send_sync::<StateVectorResolver<'static, MemoryProvider>>();
    }
};
