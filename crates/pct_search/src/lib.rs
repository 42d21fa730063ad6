//! Longitude event search: the angle-crossing refiner and everything built on it.
//!
//! This crate provides:
//! - [`find_crossings`], the refiner: coarse scan of a longitude callback for
//!   wraparound-aware sign changes and touches against a target angle, then
//!   bisection
//! - Body longitude crossings read through any [`pct_ephem::Ephemeris`]
//! - Two-body separations (conjunctions, oppositions, any fixed angle)
//! - Stationary points (retrograde/direct stations)
//! - Cycle travel and lookback multiples on unwrapped longitude
//!
//! A loop that opens and closes between two samples, with no third sample to
//! show the turn, is missed; pick `step_days` well below the time the body
//! needs to reverse across a target.

pub mod crossing;
pub mod crossing_types;
pub mod error;
pub mod longitude;
pub(crate) mod search_util;
pub mod separation;
pub mod stationary;
pub mod stationary_types;
pub mod travel;

pub use crossing::{find_crossings, find_crossings_with_speed, find_next_crossing};
pub use crossing_types::{
    CrossingConfig, CrossingDirection, CrossingEvent, CrossingFilter, SearchDirection, Track,
};
pub use error::SearchError;
pub use longitude::{body_crossings, next_body_crossing, prev_body_crossing};
pub use separation::{
    SeparationConfig, SeparationEvent, next_separation, prev_separation, search_separations,
};
pub use stationary::{next_stationary, prev_stationary, search_stationary};
pub use stationary_types::{StationType, StationaryConfig, StationaryEvent};
pub use travel::{TravelConfig, TravelEvent, find_travel, lookback, project};
