//! Flight-plan leg interfaces
//!
//! The flight-plan data store and leg graph live outside this crate. Only
//! their published geometric interfaces appear here, as traits the guidance
//! engines consume and tests mock.

use crate::guidance::types::{Coordinates, Degrees, Knots, NauticalMiles};
use crate::guidance::LateralGuidance;

/// Holding-pattern turn direction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnDirection {
    Left,
    Right,
}

/// Guidance sub-state a holding leg starts in once the entry hands over
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HoldInitialState {
    /// First turn of the racetrack
    Arc1,
    /// Outbound straight segment
    Outbound,
    /// Inbound straight segment
    Inbound,
}

/// Geometric interface of a flight-plan leg
pub trait GuidanceLeg {
    /// Course flown into the leg terminus, in degrees
    fn inbound_course(&self) -> Degrees;

    /// Course flown out of the leg terminus, in degrees
    fn outbound_course(&self) -> Degrees;

    /// Terminating fix of the leg
    fn terminus(&self) -> Coordinates;

    /// Remaining distance along the leg from the given position
    ///
    /// Reaching zero or below signals the leg is flown out.
    fn distance_to_go(&self, ppos: Coordinates) -> NauticalMiles;
}

/// Geometric interface of a holding-pattern leg
pub trait HoldingLeg: GuidanceLeg {
    /// Turn radius of the racetrack, in nautical miles
    fn turn_radius(&self) -> NauticalMiles;

    /// Turn direction of the racetrack
    fn turn_direction(&self) -> TurnDirection;

    /// Length of the straight segments of the racetrack
    fn leg_length(&self) -> NauticalMiles;

    /// Prime the guidance sub-state the leg starts in, chosen by entry type
    fn set_initial_state(&mut self, state: HoldInitialState);

    /// The leg's own control-law output, used at capture handoff
    fn guidance_parameters(&self, ppos: Coordinates, true_track: Degrees) -> LateralGuidance;

    /// Steady bank angle the leg itself commands at the given ground speed
    fn nominal_roll_angle(&self, ground_speed: Knots) -> Degrees;
}

/// Leg-graph view consumed by the vertical profile driver
pub trait FlightPlanGeometry {
    /// Number of legs in the active flight plan
    fn leg_count(&self) -> usize;
}
