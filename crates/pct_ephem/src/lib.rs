//! Planetary ecliptic longitudes for cycle studies.
//!
//! This crate provides:
//! - The [`Ephemeris`] trait, the single seam every search and pipeline
//!   queries positions through
//! - [`KeplerEphemeris`], a self-contained analytic source
//! - [`TableEphemeris`], an interpolating source fed by an external table
//! - Angle normalization helpers

pub mod angle;
pub mod body;
pub mod ephemeris;
pub mod error;
mod kepler;
mod moon;
pub mod spherical;
pub mod table;

pub use angle::{angular_distance, normalize_360, normalize_pm180};
pub use body::{ALL_BODIES, Body, Frame, Perspective, Query};
pub use ephemeris::{Ephemeris, KeplerEphemeris, SPEED_STEP_DAYS};
pub use error::EphemError;
pub use spherical::{EclipticPosition, LongitudeState, cartesian_to_ecliptic};
pub use table::TableEphemeris;
