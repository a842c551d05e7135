//! Vertical profile driver
//!
//! Event-driven orchestration of the climb, descent and approach builders:
//! the profile is rebuilt when a new lateral geometry is accepted or when the
//! cruise altitude changes between ticks, never on every tick. An empty
//! geometry is a recoverable no-op that is logged rather than computed.

use crate::flightplan::FlightPlanGeometry;
use crate::guidance::types::Feet;
use crate::parameters::vnav::VnavConfig;

use super::{
    ApproachPathBuilder, ClimbPathBuilder, ClimbProfile, DecelerationProfile, DescentPathBuilder,
    DescentProfile, PseudoWaypointSink,
};

/// Driver recomputing the full vertical profile on geometry or cruise
/// altitude changes
pub struct VerticalProfileDriver<C, D, A, S>
where
    C: ClimbPathBuilder,
    D: DescentPathBuilder,
    A: ApproachPathBuilder,
    S: PseudoWaypointSink,
{
    climb_builder: C,
    descent_builder: D,
    approach_builder: A,
    pseudo_waypoints: S,
    config: VnavConfig,
    last_cruise_altitude: Feet,
    climb_profile: Option<ClimbProfile>,
    descent_profile: Option<DescentProfile>,
    approach_profile: Option<DecelerationProfile>,
}

impl<C, D, A, S> VerticalProfileDriver<C, D, A, S>
where
    C: ClimbPathBuilder,
    D: DescentPathBuilder,
    A: ApproachPathBuilder,
    S: PseudoWaypointSink,
{
    /// Create a driver with no profile computed yet
    pub fn new(
        climb_builder: C,
        descent_builder: D,
        approach_builder: A,
        pseudo_waypoints: S,
        config: VnavConfig,
    ) -> Self {
        Self {
            climb_builder,
            descent_builder,
            approach_builder,
            pseudo_waypoints,
            config,
            last_cruise_altitude: 0.0,
            climb_profile: None,
            descent_profile: None,
            approach_profile: None,
        }
    }

    pub fn init(&mut self) {
        crate::log_info!("vnav driver initialized");
    }

    /// Accept a recomputed lateral geometry and rebuild the vertical profile
    pub fn accept_geometry(&mut self, geometry: &dyn FlightPlanGeometry) {
        // refresh per-geometry aircraft inputs here instead of per tick
        self.climb_builder.update();
        self.compute_vertical_profile(geometry);
    }

    /// Periodic update; recomputes only when the cruise altitude changed
    /// since the last observed value
    pub fn tick(&mut self, geometry: &dyn FlightPlanGeometry, cruise_altitude: Feet) {
        if cruise_altitude != self.last_cruise_altitude {
            self.last_cruise_altitude = cruise_altitude;
            crate::log_debug!("vnav: recomputing profile, cruise altitude changed");
            self.compute_vertical_profile(geometry);
        }
    }

    /// Most recent climb profile, if one was computed
    pub fn current_climb_profile(&self) -> Option<&ClimbProfile> {
        self.climb_profile.as_ref()
    }

    /// Most recent descent profile, if one was computed
    pub fn current_descent_profile(&self) -> Option<&DescentProfile> {
        self.descent_profile.as_ref()
    }

    /// Most recent approach profile, if one was computed
    pub fn current_approach_profile(&self) -> Option<&DecelerationProfile> {
        self.approach_profile.as_ref()
    }

    fn compute_vertical_profile(&mut self, geometry: &dyn FlightPlanGeometry) {
        if geometry.leg_count() == 0 {
            crate::log_warn!("vnav: profile not computed, no legs in flight plan");
            return;
        }

        if self.config.calculate_climb_profile {
            self.climb_profile = Some(self.climb_builder.compute_climb_path(geometry));
        }

        let approach = self.approach_builder.compute_decel_path(geometry);
        self.descent_profile = Some(
            self.descent_builder
                .compute_descent_path(geometry, &approach),
        );
        self.approach_profile = Some(approach);

        self.pseudo_waypoints.accept_vertical_profile();
    }
}
