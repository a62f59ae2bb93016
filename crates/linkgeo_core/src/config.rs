//! Reference-data locations and the load lifecycle.
//!
//! The core never reads kernel files itself. A [`KernelLoader`] supplied by
//! the caller turns each configured path into leap seconds, a spacecraft
//! clock, body segments, or frame links; [`ReferenceData`] owns the result for as long as
//! queries run and releases it on drop.

use std::path::{Path, PathBuf};

use linkgeo_time::{LeapSecondTable, TimeConverter};

use crate::clock::SpacecraftClock;
use crate::error::EngineError;
use crate::geometry::{GeometryEngine, GeometrySettings};
use crate::memory::MemoryProvider;

/// Kinds of reference data, in the order they are loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelKind {
    LeapSeconds,
    SpacecraftClock,
    Ephemeris,
    FrameDefinitions,
    PlanetaryConstants,
    Attitude,
}

/// Paths to the reference data for one session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KernelConfig {
    pub lsk_path: PathBuf,
    pub sclk_path: Option<PathBuf>,
    pub spk_paths: Vec<PathBuf>,
    pub ck_paths: Vec<PathBuf>,
    pub frame_kernel_path: Option<PathBuf>,
    pub pck_path: Option<PathBuf>,
}

impl KernelConfig {
    /// Leap seconds and a single ephemeris file, no attitude data.
    pub fn with_single_spk(lsk_path: PathBuf, spk_path: PathBuf) -> Self {
        Self {
            lsk_path,
            spk_paths: vec![spk_path],
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if is_empty(&self.lsk_path) {
            return Err(EngineError::InvalidConfig("lsk_path must not be empty"));
        }
        if self.spk_paths.is_empty() {
            return Err(EngineError::InvalidConfig("spk_paths must not be empty"));
        }
        if self.spk_paths.iter().any(|p| is_empty(p)) {
            return Err(EngineError::InvalidConfig(
                "spk_paths must not contain empty paths",
            ));
        }
        if self.ck_paths.iter().any(|p| is_empty(p)) {
            return Err(EngineError::InvalidConfig(
                "ck_paths must not contain empty paths",
            ));
        }
        for optional in [&self.sclk_path, &self.frame_kernel_path, &self.pck_path] {
            if optional.as_deref().is_some_and(is_empty) {
                return Err(EngineError::InvalidConfig(
                    "optional kernel paths must not be empty when present",
                ));
            }
        }
        if !self.ck_paths.is_empty() {
            // Attitude records are tagged in spacecraft clock ticks and
            // attached to frames declared in a frame kernel.
            if self.sclk_path.is_none() {
                return Err(EngineError::InvalidConfig("ck_paths require sclk_path"));
            }
            if self.frame_kernel_path.is_none() {
                return Err(EngineError::InvalidConfig(
                    "ck_paths require frame_kernel_path",
                ));
            }
        }
        Ok(())
    }

    /// Every configured path with its kind, in load order.
    pub fn load_order(&self) -> Vec<(KernelKind, &Path)> {
        let mut order = vec![(KernelKind::LeapSeconds, self.lsk_path.as_path())];
        if let Some(p) = &self.sclk_path {
            order.push((KernelKind::SpacecraftClock, p.as_path()));
        }
        order.extend(
            self.spk_paths
                .iter()
                .map(|p| (KernelKind::Ephemeris, p.as_path())),
        );
        if let Some(p) = &self.frame_kernel_path {
            order.push((KernelKind::FrameDefinitions, p.as_path()));
        }
        if let Some(p) = &self.pck_path {
            order.push((KernelKind::PlanetaryConstants, p.as_path()));
        }
        order.extend(
            self.ck_paths
                .iter()
                .map(|p| (KernelKind::Attitude, p.as_path())),
        );
        order
    }
}

fn is_empty(path: &Path) -> bool {
    path.as_os_str().is_empty()
}

/// Turns configured files into in-memory reference data.
pub trait KernelLoader {
    /// Leap-second table held in the file at `path`.
    fn leap_seconds(&self, path: &Path) -> Result<LeapSecondTable, EngineError>;

    /// Spacecraft clock correlation held in the file at `path`.
    fn spacecraft_clock(&self, path: &Path) -> Result<SpacecraftClock, EngineError>;

    /// Load the body segments or frame links in `path` into `provider`.
    fn load(
        &self,
        kind: KernelKind,
        path: &Path,
        provider: &mut MemoryProvider,
    ) -> Result<(), EngineError>;
}

/// Time conversion and ephemeris data loaded for one session.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    pub time: TimeConverter,
    pub provider: MemoryProvider,
    pub clock: Option<SpacecraftClock>,
}

impl ReferenceData {
    pub fn new(time: TimeConverter, provider: MemoryProvider) -> Self {
        Self {
            time,
            provider,
            clock: None,
        }
    }

    pub fn with_clock(mut self, clock: SpacecraftClock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Validate `config` and load every file it names.
    pub fn load(config: &KernelConfig, loader: &impl KernelLoader) -> Result<Self, EngineError> {
        config.validate()?;
        let table = loader.leap_seconds(&config.lsk_path)?;
        let clock = config
            .sclk_path
            .as_deref()
            .map(|path| loader.spacecraft_clock(path))
            .transpose()?;
        let provider = MemoryProvider::from_config(config, loader)?;
        log::debug!(
            "loaded {} leap-second entries, {} body segments, {} frame links{}",
            table.entries().len(),
            provider.segment_count(),
            provider.frame_link_count(),
            if clock.is_some() { ", spacecraft clock" } else { "" }
        );
        Ok(Self {
            time: TimeConverter::new(table),
            provider,
            clock,
        })
    }

    /// Engine over this data with default settings.
    pub fn engine(&self) -> Result<GeometryEngine<'_, MemoryProvider>, EngineError> {
        self.engine_with_settings(GeometrySettings::default())
    }

    pub fn engine_with_settings(
        &self,
        settings: GeometrySettings,
    ) -> Result<GeometryEngine<'_, MemoryProvider>, EngineError> {
        if self.time.leap_seconds().is_none() {
            return Err(EngineError::ReferenceDataMissing(
                "no leap-second table loaded".into(),
            ));
        }
        let engine = GeometryEngine::with_settings(&self.time, &self.provider, settings)?;
        Ok(match &self.clock {
            Some(clock) => engine.with_clock(clock),
            None => engine,
        })
    }
}
