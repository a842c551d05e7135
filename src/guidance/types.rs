//! Guidance unit and state types
//!
//! This module contains the basic types shared by the guidance engines:
//! - Unit aliases for angles, distances, speeds and altitudes
//! - `Coordinates`: a geographic position on the spherical earth model
//! - `AircraftState`: the live flight state sampled once per guidance tick
//! - `LateralGuidance`: the per-tick lateral control-law output

/// Angle in degrees
pub type Degrees = f64;

/// Distance in nautical miles
pub type NauticalMiles = f64;

/// Speed in knots
pub type Knots = f64;

/// Altitude in feet
pub type Feet = f64;

/// Geographic position on the spherical earth model
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Coordinates {
    /// Latitude in degrees (-90 to +90)
    pub lat: Degrees,
    /// Longitude in degrees (-180 to +180)
    pub long: Degrees,
}

impl Coordinates {
    /// Create a new position
    pub fn new(lat: Degrees, long: Degrees) -> Self {
        Self { lat, long }
    }
}

/// Live flight state sampled once per guidance tick
///
/// Passed explicitly into every per-tick evaluation call so the evaluators
/// stay pure functions of (internal state, live inputs).
#[derive(Clone, Copy, Debug, Default)]
pub struct AircraftState {
    /// Present position
    pub position: Coordinates,
    /// True track in degrees (0-360)
    pub true_track: Degrees,
    /// True airspeed in knots
    pub true_airspeed: Knots,
    /// Ground speed in knots
    pub ground_speed: Knots,
}

/// Lateral control-law output for one guidance tick
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LateralGuidance {
    /// Lateral deviation from the desired path in nautical miles
    /// (positive right of path)
    pub cross_track_error: NauticalMiles,
    /// Current track minus desired track in degrees
    pub track_angle_error: Degrees,
    /// Commanded bank angle in degrees (positive right wing down)
    pub phi_command: Degrees,
}

impl LateralGuidance {
    /// Neutral zero-deviation command
    pub fn neutral() -> Self {
        Self::default()
    }
}
