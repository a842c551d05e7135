//! Vertical profile computation
//!
//! The climb, descent and deceleration path builders are external
//! collaborators invoked with a leg geometry; this module defines their
//! contracts and the profile characteristics they publish, plus the driver
//! that orchestrates them.

pub mod driver;

pub use driver::VerticalProfileDriver;

use crate::flightplan::FlightPlanGeometry;
use crate::guidance::types::{Feet, Knots, NauticalMiles};

/// Climb path characteristics
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ClimbProfile {
    /// Distance from the origin at which the cruise altitude is reached
    pub top_of_climb_distance: NauticalMiles,
    /// Cruise altitude the climb tops out at
    pub cruise_altitude: Feet,
}

/// Theoretical descent path characteristics
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DescentProfile {
    /// Distance from the destination at which the descent begins
    pub top_of_descent_distance: NauticalMiles,
}

/// Deceleration and approach path characteristics
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DecelerationProfile {
    /// Distance from the destination at which deceleration begins
    pub decel_distance: NauticalMiles,
    /// Distance from the destination for the first flap extension
    pub flap1_distance: NauticalMiles,
    /// Distance from the destination for the second flap extension
    pub flap2_distance: NauticalMiles,
    /// Target speed at the deceleration point
    pub decel_speed: Knots,
}

/// Climb path construction
pub trait ClimbPathBuilder {
    /// Refresh cached aircraft performance inputs
    ///
    /// Called once when a new geometry is accepted rather than on every
    /// guidance tick.
    fn update(&mut self);

    /// Build the climb profile for the given leg geometry
    fn compute_climb_path(&mut self, geometry: &dyn FlightPlanGeometry) -> ClimbProfile;
}

/// Deceleration and approach path construction
pub trait ApproachPathBuilder {
    /// Build the deceleration profile for the given leg geometry
    fn compute_decel_path(&mut self, geometry: &dyn FlightPlanGeometry) -> DecelerationProfile;
}

/// Descent path construction
pub trait DescentPathBuilder {
    /// Build the descent profile, ending where the approach profile begins
    fn compute_descent_path(
        &mut self,
        geometry: &dyn FlightPlanGeometry,
        approach: &DecelerationProfile,
    ) -> DescentProfile;
}

/// Downstream consumer notified when a fresh vertical profile is available
pub trait PseudoWaypointSink {
    fn accept_vertical_profile(&mut self);
}
