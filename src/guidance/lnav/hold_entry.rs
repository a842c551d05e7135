//! Hold-entry transition
//!
//! Computes the one-time maneuver joining a holding pattern from an
//! arbitrary inbound course: classifies the entry from the angle between the
//! previous leg's outbound course and the hold's inbound course, synthesizes
//! the teardrop or parallel entry path, and serves per-tick lateral guidance
//! while the maneuver is flown.
//!
//! # Lifecycle
//!
//! One transition instance exists per (previous leg, holding leg) pair. A
//! flight-plan geometry change triggers `recompute`, which reclassifies and
//! resynthesizes; every guidance tick queries `guidance_parameters`, which
//! advances the internal sub-state. `Capture` is terminal and hands control
//! to the holding leg. Once the transition becomes the active guidance
//! element it freezes: further geometry changes leave the synthesized turns
//! untouched so the commanded bank stays continuous mid-maneuver.
//!
//! Direct entries synthesize no path: the holding leg is primed to begin
//! guidance at the matching racetrack sub-state instead, and the transition
//! answers neutral commands and degenerate geometry.

use heapless::Vec;
use libm::{fabs, tan};

use crate::flightplan::{GuidanceLeg, HoldInitialState, HoldingLeg, TurnDirection};
use crate::guidance::geometry::{
    arc_distance_to_go, arc_guidance, bearing_distance_to_coordinates, clamp_angle,
    course_to_fix_distance_to_go, course_to_fix_guidance, diff_angle, great_circle_heading,
    great_circle_intersection, max_bank, roll_anticipation_distance,
};
use crate::guidance::lnav::path::PathVector;
use crate::guidance::types::{
    AircraftState, Coordinates, Degrees, Knots, LateralGuidance, NauticalMiles,
};

/// Maximum number of segments in a synthesized entry path
pub const MAX_PATH_SEGMENTS: usize = 5;

/// Track-angle error below which the final turn captures the holding leg
const CAPTURE_TRACK_ANGLE: Degrees = 130.0;

/// Entry angles within this magnitude need no maneuver
const ALIGNED_ENTRY_ANGLE: Degrees = 3.0;

/// Distance reported while a maneuver is in progress
// TODO: accumulate the true per-segment distance to go instead
const MANEUVER_DISTANCE_PLACEHOLDER: NauticalMiles = 1.0;

const DEG_TO_RAD: f64 = core::f64::consts::PI / 180.0;

/// Entry maneuver classification
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryType {
    /// Already aligned with the hold inbound course, no maneuver
    None,
    /// Join by flying the racetrack outbound segment directly
    DirectOutbound,
    /// Join by turning directly onto the racetrack
    DirectTurn,
    /// Teardrop entry
    Teardrop,
    /// Parallel entry
    Parallel,
}

/// Sub-state while flying a teardrop or parallel entry
///
/// Strictly forward-advancing; `Capture` is terminal and signals control has
/// been handed to the holding leg.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryState {
    Turn1,
    Straight1,
    Turn2,
    Capture,
}

/// One synthesized turn: entry point, arc centre, exit point, signed sweep
#[derive(Clone, Copy, Debug, PartialEq)]
struct EntryTurn {
    itp: Coordinates,
    arc_centre: Coordinates,
    ftp: Coordinates,
    sweep_angle: Degrees,
}

/// Fully-populated geometry of a teardrop or parallel entry
#[derive(Clone, Copy, Debug, PartialEq)]
struct ManeuverGeometry {
    turn1: EntryTurn,
    straight_course: Degrees,
    turn2: EntryTurn,
    turn3: EntryTurn,
}

/// Entry geometry tagged by classification
///
/// Only the maneuver variants carry turn records, so an unset field can
/// never be read.
#[derive(Clone, Copy, Debug, PartialEq)]
enum EntryGeometry {
    None,
    DirectOutbound,
    DirectTurn,
    Teardrop(ManeuverGeometry),
    Parallel(ManeuverGeometry),
}

/// Direction-signed geometric offsets of one {entry type, turn direction}
struct EntryOffsets {
    /// Bearing offset from the inbound course to the turn-1 centre
    turn1_centre: Degrees,
    /// Offset from the hold inbound course to the entry's outbound-side
    /// course; also the turn-1 sweep reference
    outbound_leg_offset: Degrees,
    /// Bias applied to the turn-1 sweep for the turn-1 exit bearing
    turn1_exit_bias: Degrees,
    /// Fraction of the hold leg length flown straight after turn 1
    straight_fraction: f64,
    /// Bearing offset from the hold inbound course to the turn-2 centre
    turn2_centre: Degrees,
    /// Bearing from the turn-2 centre to the turn-2 exit point
    turn2_exit: Degrees,
    /// Turn-2 sweep angle
    turn2_sweep: Degrees,
    /// Course offset of the final intercept toward the hold fix
    intercept: Degrees,
}

const TEARDROP_RIGHT: EntryOffsets = EntryOffsets {
    turn1_centre: 90.0,
    outbound_leg_offset: 150.0,
    turn1_exit_bias: -90.0,
    straight_fraction: 1.0 / 6.0,
    turn2_centre: -120.0,
    turn2_exit: -45.0,
    turn2_sweep: 285.0,
    intercept: 45.0,
};

const TEARDROP_LEFT: EntryOffsets = EntryOffsets {
    turn1_centre: -90.0,
    outbound_leg_offset: 150.0,
    turn1_exit_bias: -90.0,
    straight_fraction: 1.0 / 6.0,
    turn2_centre: 120.0,
    turn2_exit: -45.0,
    turn2_sweep: -285.0,
    intercept: 45.0,
};

const PARALLEL_RIGHT: EntryOffsets = EntryOffsets {
    turn1_centre: -90.0,
    outbound_leg_offset: 180.0,
    turn1_exit_bias: 90.0,
    straight_fraction: 1.0 / 4.0,
    turn2_centre: 90.0,
    turn2_exit: 45.0,
    turn2_sweep: -225.0,
    intercept: -45.0,
};

const PARALLEL_LEFT: EntryOffsets = EntryOffsets {
    turn1_centre: 90.0,
    outbound_leg_offset: 180.0,
    turn1_exit_bias: 90.0,
    straight_fraction: 1.0 / 4.0,
    turn2_centre: -90.0,
    turn2_exit: 45.0,
    turn2_sweep: 255.0,
    intercept: -45.0,
};

/// Classify the entry maneuver from the inbound course, the hold inbound
/// course and the hold turn direction
///
/// Total over all inputs. The boundary table is a policy choice: adjacent
/// categories produce geometrically different maneuvers, and path continuity
/// across a boundary is not guaranteed.
pub fn classify_entry(
    inbound_course: Degrees,
    outbound_course: Degrees,
    turn_direction: TurnDirection,
) -> EntryType {
    let entry_angle = diff_angle(inbound_course, outbound_course);

    if entry_angle >= -ALIGNED_ENTRY_ANGLE && entry_angle <= ALIGNED_ENTRY_ANGLE {
        return EntryType::None;
    }

    match turn_direction {
        TurnDirection::Left => {
            if entry_angle > 110.0 && entry_angle < 177.0 {
                EntryType::Teardrop
            } else if (entry_angle >= 177.0 && entry_angle <= 180.0)
                || (entry_angle > -180.0 && entry_angle < -70.0)
            {
                EntryType::Parallel
            } else if entry_angle >= -70.0 && entry_angle < -3.0 {
                EntryType::DirectTurn
            } else {
                EntryType::DirectOutbound
            }
        }
        TurnDirection::Right => {
            if entry_angle > -177.0 && entry_angle < -110.0 {
                EntryType::Teardrop
            } else if (entry_angle > 70.0 && entry_angle <= 180.0)
                || (entry_angle > -180.0 && entry_angle <= -177.0)
            {
                EntryType::Parallel
            } else if entry_angle > 3.0 && entry_angle <= 70.0 {
                EntryType::DirectTurn
            } else {
                EntryType::DirectOutbound
            }
        }
    }
}

/// Transition flying the entry maneuver into a holding pattern
pub struct HoldEntryTransition {
    entry: EntryGeometry,
    computed_path: Vec<PathVector, MAX_PATH_SEGMENTS>,
    state: EntryState,
    was_abeam: bool,
    frozen: bool,
}

impl HoldEntryTransition {
    /// Create a transition with no entry computed yet
    pub fn new() -> Self {
        Self {
            entry: EntryGeometry::None,
            computed_path: Vec::new(),
            state: EntryState::Turn1,
            was_abeam: false,
            frozen: false,
        }
    }

    /// Current classification
    pub fn entry_type(&self) -> EntryType {
        match self.entry {
            EntryGeometry::None => EntryType::None,
            EntryGeometry::DirectOutbound => EntryType::DirectOutbound,
            EntryGeometry::DirectTurn => EntryType::DirectTurn,
            EntryGeometry::Teardrop(_) => EntryType::Teardrop,
            EntryGeometry::Parallel(_) => EntryType::Parallel,
        }
    }

    /// True when no entry maneuver is required
    pub fn is_null(&self) -> bool {
        matches!(self.entry, EntryGeometry::None)
    }

    /// Current maneuver sub-state
    pub fn state(&self) -> EntryState {
        self.state
    }

    /// Reclassify and resynthesize the entry for the current leg geometry
    ///
    /// Called on flight-plan geometry changes, not per tick. Once the
    /// transition is the active guidance element it freezes: later calls
    /// leave the turn geometry untouched and only clear the predicted path
    /// after capture, to mark the maneuver complete for display.
    pub fn recompute(
        &mut self,
        previous_leg: &dyn GuidanceLeg,
        holding_leg: &mut dyn HoldingLeg,
        is_active: bool,
    ) {
        let inbound_course = previous_leg.outbound_course();
        let outbound_course = holding_leg.inbound_course();

        if self.frozen {
            if self.state == EntryState::Capture {
                self.computed_path.clear();
            }
            return;
        }

        if is_active {
            self.frozen = true;
        }

        match classify_entry(inbound_course, outbound_course, holding_leg.turn_direction()) {
            EntryType::None => self.install(EntryGeometry::None),
            EntryType::DirectOutbound => self.install(EntryGeometry::DirectOutbound),
            EntryType::DirectTurn => self.install(EntryGeometry::DirectTurn),
            EntryType::Teardrop => {
                let offsets = match holding_leg.turn_direction() {
                    TurnDirection::Right => &TEARDROP_RIGHT,
                    TurnDirection::Left => &TEARDROP_LEFT,
                };
                let geometry =
                    synthesize_entry(inbound_course, outbound_course, holding_leg, offsets);
                self.install(EntryGeometry::Teardrop(geometry));
            }
            EntryType::Parallel => {
                let offsets = match holding_leg.turn_direction() {
                    TurnDirection::Right => &PARALLEL_RIGHT,
                    TurnDirection::Left => &PARALLEL_LEFT,
                };
                let geometry =
                    synthesize_entry(inbound_course, outbound_course, holding_leg, offsets);
                self.install(EntryGeometry::Parallel(geometry));
            }
        }

        self.prime_holding_leg(holding_leg);
    }

    /// Per-tick control-law output
    ///
    /// Advances the entry sub-state from the live aircraft state before
    /// computing guidance. Entries without a synthesized maneuver answer the
    /// neutral command.
    pub fn guidance_parameters(
        &mut self,
        holding_leg: &dyn HoldingLeg,
        aircraft: &AircraftState,
    ) -> LateralGuidance {
        match self.entry {
            EntryGeometry::Teardrop(geometry) | EntryGeometry::Parallel(geometry) => {
                self.maneuver_guidance(&geometry, holding_leg, aircraft)
            }
            _ => LateralGuidance::neutral(),
        }
    }

    /// Remaining distance along the entry maneuver
    pub fn distance_to_go(&self, _ppos: Coordinates) -> NauticalMiles {
        match self.entry {
            EntryGeometry::Teardrop(_) | EntryGeometry::Parallel(_) => {
                if self.state == EntryState::Capture {
                    0.0
                } else {
                    MANEUVER_DISTANCE_PLACEHOLDER
                }
            }
            _ => 0.0,
        }
    }

    /// Ordered path segments of the entry maneuver, for display
    pub fn predicted_path(&self) -> &[PathVector] {
        match self.entry {
            EntryGeometry::None => &[],
            _ => &self.computed_path,
        }
    }

    /// One-shot latch: true once the previous leg first flies out, until the
    /// maneuver reaches capture
    pub fn is_abeam(&mut self, previous_leg: &dyn GuidanceLeg, ppos: Coordinates) -> bool {
        if !self.was_abeam && previous_leg.distance_to_go(ppos) <= 0.0 {
            self.was_abeam = true;
            return true;
        }
        self.was_abeam && self.state != EntryState::Capture
    }

    /// Start and end points of the entry, for downstream path joining
    ///
    /// Entries without a synthesized maneuver answer the hold fix twice.
    pub fn turning_points(&self, holding_leg: &dyn HoldingLeg) -> (Coordinates, Coordinates) {
        let fix = holding_leg.terminus();
        match self.entry {
            EntryGeometry::Teardrop(geometry) | EntryGeometry::Parallel(geometry) => {
                (fix, geometry.turn3.ftp)
            }
            _ => (fix, fix),
        }
    }

    /// Steady bank the transition commands at the given ground speed
    ///
    /// Entries without a synthesized maneuver delegate to the holding leg.
    pub fn nominal_roll_angle(
        &self,
        holding_leg: &dyn HoldingLeg,
        ground_speed: Knots,
    ) -> Degrees {
        match self.entry {
            EntryGeometry::Teardrop(geometry) | EntryGeometry::Parallel(geometry) => {
                if fabs(geometry.turn1.sweep_angle) <= ALIGNED_ENTRY_ANGLE {
                    0.0
                } else if geometry.turn1.sweep_angle > 0.0 {
                    max_bank(ground_speed, true)
                } else {
                    -max_bank(ground_speed, true)
                }
            }
            _ => holding_leg.nominal_roll_angle(ground_speed),
        }
    }

    /// Replace classification, geometry, path and sub-state in one step
    fn install(&mut self, entry: EntryGeometry) {
        self.entry = entry;
        self.state = EntryState::Turn1;
        self.computed_path.clear();

        let geometry = match self.entry {
            EntryGeometry::Teardrop(geometry) | EntryGeometry::Parallel(geometry) => geometry,
            _ => return,
        };

        let turn1 = geometry.turn1;
        let turn2 = geometry.turn2;
        let turn3 = geometry.turn3;

        self.computed_path
            .push(PathVector::Arc {
                start: turn1.itp,
                end: turn1.ftp,
                centre: turn1.arc_centre,
                sweep_angle: turn1.sweep_angle,
            })
            .ok();
        self.computed_path
            .push(PathVector::Line {
                start: turn1.ftp,
                end: turn2.itp,
            })
            .ok();
        self.computed_path
            .push(PathVector::Arc {
                start: turn2.itp,
                end: turn2.ftp,
                centre: turn2.arc_centre,
                sweep_angle: turn2.sweep_angle,
            })
            .ok();
        self.computed_path
            .push(PathVector::Line {
                start: turn2.ftp,
                end: turn3.itp,
            })
            .ok();
        self.computed_path
            .push(PathVector::Arc {
                start: turn3.itp,
                end: turn3.ftp,
                centre: turn3.arc_centre,
                sweep_angle: turn3.sweep_angle,
            })
            .ok();
    }

    /// Prime the holding leg's racetrack sub-state for the entry type
    fn prime_holding_leg(&self, holding_leg: &mut dyn HoldingLeg) {
        let initial = match self.entry {
            EntryGeometry::None | EntryGeometry::DirectTurn => HoldInitialState::Arc1,
            EntryGeometry::DirectOutbound => HoldInitialState::Outbound,
            EntryGeometry::Teardrop(_) | EntryGeometry::Parallel(_) => HoldInitialState::Inbound,
        };
        holding_leg.set_initial_state(initial);
    }

    fn maneuver_guidance(
        &mut self,
        geometry: &ManeuverGeometry,
        holding_leg: &dyn HoldingLeg,
        aircraft: &AircraftState,
    ) -> LateralGuidance {
        let ppos = aircraft.position;
        let true_track = aircraft.true_track;
        let tas = aircraft.true_airspeed;
        let outbound_course = holding_leg.inbound_course();

        // advance the sub-state from the live position
        let mut dtg = None;
        match self.state {
            EntryState::Turn1 => {
                let remaining = arc_distance_to_go(
                    ppos,
                    geometry.turn1.itp,
                    geometry.turn1.arc_centre,
                    geometry.turn1.sweep_angle,
                );
                if remaining <= 0.0 {
                    self.state = EntryState::Straight1;
                }
                dtg = Some(remaining);
            }
            EntryState::Straight1 => {
                let remaining =
                    course_to_fix_distance_to_go(ppos, geometry.straight_course, geometry.turn2.itp);
                if remaining <= 0.0 {
                    self.state = EntryState::Turn2;
                }
                dtg = Some(remaining);
            }
            EntryState::Turn2 | EntryState::Capture => {}
        }

        // guidance for the possibly just-advanced state
        let mut bank_next: Degrees = 0.0;
        let mut params = match self.state {
            EntryState::Turn1 => arc_guidance(
                ppos,
                true_track,
                aircraft.ground_speed,
                geometry.turn1.itp,
                geometry.turn1.arc_centre,
                geometry.turn1.sweep_angle,
            ),
            EntryState::Straight1 => {
                bank_next = if geometry.turn2.sweep_angle > 0.0 {
                    max_bank(tas, true)
                } else {
                    -max_bank(tas, true)
                };
                course_to_fix_guidance(ppos, true_track, geometry.straight_course, geometry.turn2.itp)
            }
            EntryState::Turn2 | EntryState::Capture => {
                let phi_command = if geometry.turn2.sweep_angle > 0.0 {
                    max_bank(tas, true)
                } else {
                    -max_bank(tas, true)
                };
                // track-angle error in the hold inbound reference frame,
                // signed by the turn-2 direction
                let reference_offset = diff_angle(0.0, outbound_course);
                let track_angle_error = if geometry.turn2.sweep_angle < 0.0 {
                    clamp_angle(reference_offset - true_track)
                } else {
                    clamp_angle(true_track - reference_offset)
                };

                if track_angle_error < CAPTURE_TRACK_ANGLE {
                    self.state = EntryState::Capture;
                    holding_leg.guidance_parameters(ppos, true_track)
                } else {
                    // constant bank keeps the rollout from continuing the
                    // wrong way around
                    LateralGuidance {
                        cross_track_error: 0.0,
                        track_angle_error,
                        phi_command,
                    }
                }
            }
        };

        params.phi_command = anticipate_roll(params.phi_command, bank_next, dtg, tas);
        params
    }
}

impl Default for HoldEntryTransition {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for HoldEntryTransition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "HOLD ENTRY ({:?})", self.entry_type())
    }
}

/// Bank override near the end of a segment: once the remaining distance is
/// inside the anticipation distance, roll toward the next segment's bank
fn anticipate_roll(
    phi_command: Degrees,
    bank_next: Degrees,
    distance_to_go: Option<NauticalMiles>,
    speed: Knots,
) -> Degrees {
    let rad = roll_anticipation_distance(speed, phi_command, bank_next);
    match distance_to_go {
        Some(dtg) if rad > 0.0 && dtg <= rad => bank_next,
        _ => phi_command,
    }
}

/// Synthesize the three-turn entry geometry for one offsets table
fn synthesize_entry(
    inbound_course: Degrees,
    outbound_course: Degrees,
    holding_leg: &dyn HoldingLeg,
    offsets: &EntryOffsets,
) -> ManeuverGeometry {
    let radius = holding_leg.turn_radius();
    let fix = holding_leg.terminus();
    let direction_sign = match holding_leg.turn_direction() {
        TurnDirection::Right => 1.0,
        TurnDirection::Left => -1.0,
    };

    // turn 1 off the hold fix, opening toward the entry's outbound side
    let turn1_sweep = diff_angle(inbound_course, outbound_course + offsets.outbound_leg_offset);
    let turn1_centre =
        bearing_distance_to_coordinates(inbound_course + offsets.turn1_centre, radius, fix);
    let turn1_exit_bearing =
        clamp_angle(inbound_course + direction_sign * (turn1_sweep + offsets.turn1_exit_bias));
    let turn1_ftp = bearing_distance_to_coordinates(turn1_exit_bearing, radius, turn1_centre);
    let turn1 = EntryTurn {
        itp: fix,
        arc_centre: turn1_centre,
        ftp: turn1_ftp,
        sweep_angle: turn1_sweep,
    };

    // straight stand-off scaled from the racetrack leg length
    let turn2_itp = bearing_distance_to_coordinates(
        outbound_course + offsets.outbound_leg_offset,
        holding_leg.leg_length() * offsets.straight_fraction,
        turn1_ftp,
    );
    let straight_course = great_circle_heading(turn1_ftp, turn2_itp);

    // turn 2 reverses back toward the inbound side
    let turn2_centre =
        bearing_distance_to_coordinates(outbound_course + offsets.turn2_centre, radius, turn2_itp);
    let turn2_ftp =
        bearing_distance_to_coordinates(outbound_course + offsets.turn2_exit, radius, turn2_centre);
    let turn2 = EntryTurn {
        itp: turn2_itp,
        arc_centre: turn2_centre,
        ftp: turn2_ftp,
        sweep_angle: offsets.turn2_sweep,
    };

    // final 45 degree intercept back onto the hold inbound course
    let final_intercept = great_circle_intersection(
        turn2_ftp,
        clamp_angle(outbound_course + offsets.intercept),
        fix,
        clamp_angle(outbound_course + 180.0),
    );
    let turn3 = final_turn(
        outbound_course,
        radius,
        final_intercept,
        holding_leg.turn_direction(),
    );

    ManeuverGeometry {
        turn1,
        straight_course,
        turn2,
        turn3,
    }
}

/// The fixed 45 degree intercept turn onto the hold inbound course
fn final_turn(
    outbound_course: Degrees,
    radius: NauticalMiles,
    intercept: Coordinates,
    direction: TurnDirection,
) -> EntryTurn {
    let stand_off = radius * tan(22.5 * DEG_TO_RAD);
    let ftp = bearing_distance_to_coordinates(outbound_course, stand_off, intercept);
    let arc_centre =
        bearing_distance_to_coordinates(clamp_angle(outbound_course + 90.0), radius, ftp);
    let itp =
        bearing_distance_to_coordinates(clamp_angle(outbound_course - 135.0), radius, arc_centre);
    let sweep_angle = match direction {
        TurnDirection::Right => 45.0,
        TurnDirection::Left => -45.0,
    };

    EntryTurn {
        itp,
        arc_centre,
        ftp,
        sweep_angle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guidance::geometry::great_circle_distance;

    struct StubPreviousLeg {
        outbound_course: Degrees,
        distance_to_go: NauticalMiles,
    }

    impl GuidanceLeg for StubPreviousLeg {
        fn inbound_course(&self) -> Degrees {
            self.outbound_course
        }

        fn outbound_course(&self) -> Degrees {
            self.outbound_course
        }

        fn terminus(&self) -> Coordinates {
            Coordinates::default()
        }

        fn distance_to_go(&self, _ppos: Coordinates) -> NauticalMiles {
            self.distance_to_go
        }
    }

    struct StubHoldingLeg {
        inbound_course: Degrees,
        fix: Coordinates,
        radius: NauticalMiles,
        direction: TurnDirection,
        leg_length: NauticalMiles,
        initial_state: Option<HoldInitialState>,
        handoff: LateralGuidance,
    }

    impl GuidanceLeg for StubHoldingLeg {
        fn inbound_course(&self) -> Degrees {
            self.inbound_course
        }

        fn outbound_course(&self) -> Degrees {
            clamp_angle(self.inbound_course + 180.0)
        }

        fn terminus(&self) -> Coordinates {
            self.fix
        }

        fn distance_to_go(&self, ppos: Coordinates) -> NauticalMiles {
            great_circle_distance(ppos, self.fix)
        }
    }

    impl HoldingLeg for StubHoldingLeg {
        fn turn_radius(&self) -> NauticalMiles {
            self.radius
        }

        fn turn_direction(&self) -> TurnDirection {
            self.direction
        }

        fn leg_length(&self) -> NauticalMiles {
            self.leg_length
        }

        fn set_initial_state(&mut self, state: HoldInitialState) {
            self.initial_state = Some(state);
        }

        fn guidance_parameters(&self, _ppos: Coordinates, _true_track: Degrees) -> LateralGuidance {
            self.handoff
        }

        fn nominal_roll_angle(&self, ground_speed: Knots) -> Degrees {
            match self.direction {
                TurnDirection::Right => max_bank(ground_speed, true),
                TurnDirection::Left => -max_bank(ground_speed, true),
            }
        }
    }

    fn previous_leg(outbound_course: Degrees) -> StubPreviousLeg {
        StubPreviousLeg {
            outbound_course,
            distance_to_go: 3.0,
        }
    }

    fn holding_leg(inbound_course: Degrees, direction: TurnDirection) -> StubHoldingLeg {
        StubHoldingLeg {
            inbound_course,
            fix: Coordinates::new(45.0, 9.0),
            radius: 1.2,
            direction,
            leg_length: 5.0,
            initial_state: None,
            handoff: LateralGuidance {
                cross_track_error: 0.25,
                track_angle_error: -2.0,
                phi_command: -20.0,
            },
        }
    }

    fn aircraft_at(position: Coordinates, true_track: Degrees) -> AircraftState {
        AircraftState {
            position,
            true_track,
            true_airspeed: 220.0,
            ground_speed: 220.0,
        }
    }

    fn assert_path_is_continuous(path: &[PathVector]) {
        for window in path.windows(2) {
            let end = window[0].end();
            let start = window[1].start();
            assert!(
                (end.lat - start.lat).abs() < 1e-12 && (end.long - start.long).abs() < 1e-12,
                "path discontinuity between {:?} and {:?}",
                window[0],
                window[1]
            );
        }
    }

    // ========== Classification Tests ==========

    #[test]
    fn test_classify_aligned_is_none() {
        for direction in [TurnDirection::Left, TurnDirection::Right] {
            assert_eq!(classify_entry(90.0, 92.0, direction), EntryType::None);
            assert_eq!(classify_entry(90.0, 87.0, direction), EntryType::None);
            assert_eq!(classify_entry(90.0, 93.0, direction), EntryType::None);
        }
    }

    #[test]
    fn test_classify_left_turn_boundary_table() {
        let left = TurnDirection::Left;
        // teardrop band (110, 177) is open on both ends
        assert_eq!(classify_entry(0.0, 109.99, left), EntryType::DirectOutbound);
        assert_eq!(classify_entry(0.0, 110.01, left), EntryType::Teardrop);
        assert_eq!(classify_entry(0.0, 176.99, left), EntryType::Teardrop);
        assert_eq!(classify_entry(0.0, 177.0, left), EntryType::Parallel);
        assert_eq!(classify_entry(0.0, 180.0, left), EntryType::Parallel);
        assert_eq!(classify_entry(0.0, -179.99, left), EntryType::Parallel);
        assert_eq!(classify_entry(0.0, -70.01, left), EntryType::Parallel);
        assert_eq!(classify_entry(0.0, -70.0, left), EntryType::DirectTurn);
        assert_eq!(classify_entry(0.0, -3.01, left), EntryType::DirectTurn);
        assert_eq!(classify_entry(0.0, 50.0, left), EntryType::DirectOutbound);
    }

    #[test]
    fn test_classify_right_turn_boundary_table() {
        let right = TurnDirection::Right;
        assert_eq!(classify_entry(0.0, -109.99, right), EntryType::DirectOutbound);
        assert_eq!(classify_entry(0.0, -110.01, right), EntryType::Teardrop);
        assert_eq!(classify_entry(0.0, -176.99, right), EntryType::Teardrop);
        assert_eq!(classify_entry(0.0, -177.0, right), EntryType::Parallel);
        assert_eq!(classify_entry(0.0, 180.0, right), EntryType::Parallel);
        assert_eq!(classify_entry(0.0, 70.01, right), EntryType::Parallel);
        assert_eq!(classify_entry(0.0, 70.0, right), EntryType::DirectTurn);
        assert_eq!(classify_entry(0.0, 3.01, right), EntryType::DirectTurn);
        assert_eq!(classify_entry(0.0, -50.0, right), EntryType::DirectOutbound);
    }

    #[test]
    fn test_classify_wraps_entry_angle() {
        // 350 to 010 is a 20 degree right entry, not 340
        assert_eq!(
            classify_entry(350.0, 10.0, TurnDirection::Right),
            EntryType::DirectTurn
        );
    }

    #[test]
    fn test_classify_is_total_over_full_circle() {
        for direction in [TurnDirection::Left, TurnDirection::Right] {
            for tenth in -1800..=1800 {
                let outbound = tenth as f64 / 10.0;
                // any result is fine, the call must just always produce one
                let _ = classify_entry(0.0, outbound, direction);
            }
        }
    }

    // ========== Synthesis Tests ==========

    #[test]
    fn test_parallel_entry_scenario() {
        // inbound 090, hold inbound 270, left turn: entry angle 180
        let prev = previous_leg(90.0);
        let mut hold = holding_leg(270.0, TurnDirection::Left);
        let mut transition = HoldEntryTransition::new();

        transition.recompute(&prev, &mut hold, false);

        assert_eq!(transition.entry_type(), EntryType::Parallel);
        assert!(!transition.is_null());
        let path = transition.predicted_path();
        assert_eq!(path.len(), 5, "expected a 5 segment entry path");
        assert_path_is_continuous(path);
        assert_eq!(path[0].start(), hold.fix, "entry starts at the hold fix");
        assert_eq!(hold.initial_state, Some(HoldInitialState::Inbound));
    }

    #[test]
    fn test_teardrop_entry_scenario() {
        // entry angle 150, left turn: teardrop band
        let prev = previous_leg(90.0);
        let mut hold = holding_leg(240.0, TurnDirection::Left);
        let mut transition = HoldEntryTransition::new();

        transition.recompute(&prev, &mut hold, false);

        assert_eq!(transition.entry_type(), EntryType::Teardrop);
        let path = transition.predicted_path();
        assert_eq!(path.len(), 5);
        assert_path_is_continuous(path);
        assert_eq!(hold.initial_state, Some(HoldInitialState::Inbound));
    }

    #[test]
    fn test_synthesized_paths_are_continuous_across_course_grid() {
        for direction in [TurnDirection::Left, TurnDirection::Right] {
            for inbound_tens in 0..36 {
                let inbound = inbound_tens as f64 * 10.0;
                for offset in [-150.0, -120.0, 120.0, 150.0, 180.0] {
                    let outbound = clamp_angle(inbound + offset);
                    let entry = classify_entry(inbound, outbound, direction);
                    if entry != EntryType::Teardrop && entry != EntryType::Parallel {
                        continue;
                    }

                    let prev = previous_leg(inbound);
                    let mut hold = holding_leg(outbound, direction);
                    let mut transition = HoldEntryTransition::new();
                    transition.recompute(&prev, &mut hold, false);

                    let path = transition.predicted_path();
                    assert_eq!(path.len(), 5, "inbound {} outbound {}", inbound, outbound);
                    assert_path_is_continuous(path);
                }
            }
        }
    }

    #[test]
    fn test_aligned_entry_is_null() {
        let prev = previous_leg(90.0);
        let mut hold = holding_leg(92.0, TurnDirection::Left);
        let mut transition = HoldEntryTransition::new();

        transition.recompute(&prev, &mut hold, false);

        assert!(transition.is_null());
        assert!(transition.predicted_path().is_empty());
        assert!((transition.distance_to_go(hold.fix) - 0.0).abs() < 1e-12);
        let params = transition.guidance_parameters(&hold, &aircraft_at(hold.fix, 90.0));
        assert_eq!(params, LateralGuidance::neutral());
        assert_eq!(hold.initial_state, Some(HoldInitialState::Arc1));
    }

    #[test]
    fn test_direct_entries_are_degenerate() {
        // entry angle -30, left turn: direct turn
        let prev = previous_leg(90.0);
        let mut hold = holding_leg(60.0, TurnDirection::Left);
        let mut transition = HoldEntryTransition::new();
        transition.recompute(&prev, &mut hold, false);

        assert_eq!(transition.entry_type(), EntryType::DirectTurn);
        assert!(transition.predicted_path().is_empty());
        assert!((transition.distance_to_go(hold.fix) - 0.0).abs() < 1e-12);
        let params = transition.guidance_parameters(&hold, &aircraft_at(hold.fix, 90.0));
        assert_eq!(params, LateralGuidance::neutral());
        assert_eq!(transition.turning_points(&hold), (hold.fix, hold.fix));
        assert_eq!(hold.initial_state, Some(HoldInitialState::Arc1));

        // entry angle 50, left turn: direct outbound
        let mut hold = holding_leg(140.0, TurnDirection::Left);
        let mut transition = HoldEntryTransition::new();
        transition.recompute(&prev, &mut hold, false);

        assert_eq!(transition.entry_type(), EntryType::DirectOutbound);
        assert!(transition.predicted_path().is_empty());
        assert_eq!(hold.initial_state, Some(HoldInitialState::Outbound));
    }

    #[test]
    fn test_turning_points_span_the_maneuver() {
        let prev = previous_leg(90.0);
        let mut hold = holding_leg(270.0, TurnDirection::Left);
        let mut transition = HoldEntryTransition::new();
        transition.recompute(&prev, &mut hold, false);

        let (start, end) = transition.turning_points(&hold);
        assert_eq!(start, hold.fix);
        let path = transition.predicted_path();
        assert_eq!(end, path[path.len() - 1].end());
    }

    // ========== Reclassification and Freeze Tests ==========

    #[test]
    fn test_recompute_replaces_geometry_while_unfrozen() {
        let prev = previous_leg(90.0);
        let mut hold = holding_leg(270.0, TurnDirection::Left);
        let mut transition = HoldEntryTransition::new();
        transition.recompute(&prev, &mut hold, false);
        assert_eq!(transition.entry_type(), EntryType::Parallel);

        // pretend the maneuver had advanced, then the geometry changes
        transition.state = EntryState::Straight1;
        hold.inbound_course = 240.0;
        transition.recompute(&prev, &mut hold, false);

        assert_eq!(transition.entry_type(), EntryType::Teardrop);
        assert_eq!(transition.state(), EntryState::Turn1);
    }

    #[test]
    fn test_freeze_makes_recompute_idempotent() {
        let prev = previous_leg(90.0);
        let mut hold = holding_leg(270.0, TurnDirection::Left);
        let mut transition = HoldEntryTransition::new();

        // becoming active freezes the transition after this synthesis
        transition.recompute(&prev, &mut hold, true);
        let path_before: std::vec::Vec<PathVector> = transition.predicted_path().to_vec();
        let points_before = transition.turning_points(&hold);

        // an upstream edit changes the courses; the frozen entry must not move
        hold.inbound_course = 200.0;
        transition.recompute(&prev, &mut hold, true);

        assert_eq!(transition.entry_type(), EntryType::Parallel);
        assert_eq!(transition.predicted_path(), path_before.as_slice());
        assert_eq!(transition.turning_points(&hold), points_before);

        // and stays identical over repeated calls
        transition.recompute(&prev, &mut hold, true);
        assert_eq!(transition.predicted_path(), path_before.as_slice());
    }

    #[test]
    fn test_frozen_capture_clears_path_only() {
        let prev = previous_leg(90.0);
        let mut hold = holding_leg(270.0, TurnDirection::Left);
        let mut transition = HoldEntryTransition::new();
        transition.recompute(&prev, &mut hold, true);

        transition.state = EntryState::Capture;
        transition.recompute(&prev, &mut hold, true);

        assert!(transition.predicted_path().is_empty());
        // classification and sub-state are untouched
        assert_eq!(transition.entry_type(), EntryType::Parallel);
        assert_eq!(transition.state(), EntryState::Capture);
    }

    // ========== Guidance State Machine Tests ==========

    #[test]
    fn test_turn1_guidance_follows_first_arc() {
        // teardrop, left turn: turn 1 sweeps -60 degrees
        let prev = previous_leg(90.0);
        let mut hold = holding_leg(240.0, TurnDirection::Left);
        let mut transition = HoldEntryTransition::new();
        transition.recompute(&prev, &mut hold, false);

        // halfway around turn 1
        let path = transition.predicted_path().to_vec();
        let (centre, sweep) = match path[0] {
            PathVector::Arc {
                centre, sweep_angle, ..
            } => (centre, sweep_angle),
            _ => unreachable!("first segment is always an arc"),
        };
        assert!(sweep < 0.0, "left teardrop turn 1 sweeps left, got {}", sweep);

        let itp_bearing = great_circle_heading(centre, hold.fix);
        let midway = bearing_distance_to_coordinates(
            clamp_angle(itp_bearing - sweep.abs() / 2.0),
            hold.radius,
            centre,
        );
        let params =
            transition.guidance_parameters(&hold, &aircraft_at(midway, clamp_angle(90.0 - 30.0)));

        assert_eq!(transition.state(), EntryState::Turn1);
        assert!(params.phi_command < 0.0, "phi {}", params.phi_command);
        assert!(params.cross_track_error.abs() < 0.05, "xte {}", params.cross_track_error);
    }

    #[test]
    fn test_state_machine_advances_monotonically_to_capture() {
        // inbound 090, hold inbound 270, left turn: parallel entry
        let prev = previous_leg(90.0);
        let mut hold = holding_leg(270.0, TurnDirection::Left);
        let mut transition = HoldEntryTransition::new();
        transition.recompute(&prev, &mut hold, false);

        let path = transition.predicted_path().to_vec();
        let turn2_itp = path[1].end();
        let mut states = std::vec::Vec::new();

        // turn 1 has zero sweep for an exactly opposite entry, so the first
        // tick at the fix advances straight through it
        transition.guidance_parameters(&hold, &aircraft_at(hold.fix, 90.0));
        states.push(transition.state());

        // reaching the turn 2 entry point ends the straight segment
        transition.guidance_parameters(&hold, &aircraft_at(turn2_itp, 90.0));
        states.push(transition.state());
        assert_eq!(transition.state(), EntryState::Turn2);

        // still heading away from the hold inbound course: forced bank
        let forced = transition.guidance_parameters(&hold, &aircraft_at(turn2_itp, 180.0));
        states.push(transition.state());
        assert_eq!(transition.state(), EntryState::Turn2);
        assert!((forced.cross_track_error - 0.0).abs() < 1e-12);
        assert!(
            (forced.track_angle_error - 270.0).abs() < 1e-9,
            "tae {}",
            forced.track_angle_error
        );
        assert!(
            (forced.phi_command - max_bank(220.0, true)).abs() < 1e-9,
            "phi {}",
            forced.phi_command
        );

        // rolled out far enough: capture and hand off to the holding leg
        let captured = transition.guidance_parameters(&hold, &aircraft_at(turn2_itp, 0.0));
        states.push(transition.state());
        assert_eq!(transition.state(), EntryState::Capture);
        assert_eq!(captured, hold.handoff);

        // capture is absorbing
        let after = transition.guidance_parameters(&hold, &aircraft_at(turn2_itp, 0.0));
        states.push(transition.state());
        assert_eq!(transition.state(), EntryState::Capture);
        assert_eq!(after, hold.handoff);
        assert!((transition.distance_to_go(turn2_itp) - 0.0).abs() < 1e-12);

        // no state ever steps backwards
        let order = |s: EntryState| match s {
            EntryState::Turn1 => 0,
            EntryState::Straight1 => 1,
            EntryState::Turn2 => 2,
            EntryState::Capture => 3,
        };
        for window in states.windows(2) {
            assert!(
                order(window[0]) <= order(window[1]),
                "state regressed: {:?}",
                states
            );
        }
    }

    #[test]
    fn test_maneuver_distance_to_go_until_capture() {
        let prev = previous_leg(90.0);
        let mut hold = holding_leg(270.0, TurnDirection::Left);
        let mut transition = HoldEntryTransition::new();
        transition.recompute(&prev, &mut hold, false);

        assert!(transition.distance_to_go(hold.fix) > 0.0);
        transition.state = EntryState::Capture;
        assert!((transition.distance_to_go(hold.fix) - 0.0).abs() < 1e-12);
    }

    // ========== Roll Anticipation Tests ==========

    #[test]
    fn test_roll_anticipation_override_at_exact_boundary() {
        let rad = roll_anticipation_distance(220.0, 15.0, 25.0);
        assert!(rad > 0.0);

        // the boundary is inclusive: dtg equal to the anticipation distance
        // already rolls toward the next bank
        assert!((anticipate_roll(15.0, 25.0, Some(rad), 220.0) - 25.0).abs() < 1e-12);
        assert!((anticipate_roll(15.0, 25.0, Some(rad * 1.01), 220.0) - 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_roll_anticipation_ignored_without_distance() {
        assert!((anticipate_roll(15.0, 25.0, None, 220.0) - 15.0).abs() < 1e-12);
        // no pending bank change, nothing to anticipate
        assert!((anticipate_roll(15.0, 15.0, Some(0.0), 220.0) - 15.0).abs() < 1e-12);
    }

    // ========== Abeam Latch Tests ==========

    #[test]
    fn test_is_abeam_latches_until_capture() {
        let mut prev = previous_leg(90.0);
        let mut hold = holding_leg(270.0, TurnDirection::Left);
        let mut transition = HoldEntryTransition::new();
        transition.recompute(&prev, &mut hold, false);

        assert!(!transition.is_abeam(&prev, hold.fix));

        prev.distance_to_go = 0.0;
        assert!(transition.is_abeam(&prev, hold.fix));

        // stays latched even if the previous leg reports distance again
        prev.distance_to_go = 3.0;
        assert!(transition.is_abeam(&prev, hold.fix));

        transition.state = EntryState::Capture;
        assert!(!transition.is_abeam(&prev, hold.fix));
    }

    // ========== Nominal Roll Tests ==========

    #[test]
    fn test_nominal_roll_zero_for_degenerate_first_turn() {
        // exactly opposite parallel entry: turn 1 has zero sweep
        let prev = previous_leg(90.0);
        let mut hold = holding_leg(270.0, TurnDirection::Left);
        let mut transition = HoldEntryTransition::new();
        transition.recompute(&prev, &mut hold, false);

        assert!((transition.nominal_roll_angle(&hold, 220.0) - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_nominal_roll_signed_by_first_turn() {
        // left teardrop: turn 1 sweeps -60
        let prev = previous_leg(90.0);
        let mut hold = holding_leg(240.0, TurnDirection::Left);
        let mut transition = HoldEntryTransition::new();
        transition.recompute(&prev, &mut hold, false);

        let roll = transition.nominal_roll_angle(&hold, 220.0);
        assert!((roll + max_bank(220.0, true)).abs() < 1e-9, "roll {}", roll);
    }

    #[test]
    fn test_nominal_roll_delegates_when_null() {
        let prev = previous_leg(90.0);
        let mut hold = holding_leg(92.0, TurnDirection::Left);
        let mut transition = HoldEntryTransition::new();
        transition.recompute(&prev, &mut hold, false);

        let roll = transition.nominal_roll_angle(&hold, 220.0);
        assert!((roll - hold.nominal_roll_angle(220.0)).abs() < 1e-12);
    }

    // ========== Diagnostics Tests ==========

    #[test]
    fn test_display_names_the_classification() {
        let prev = previous_leg(90.0);
        let mut hold = holding_leg(270.0, TurnDirection::Left);
        let mut transition = HoldEntryTransition::new();
        transition.recompute(&prev, &mut hold, false);

        let repr = format!("{}", transition);
        assert!(repr.contains("HOLD ENTRY"), "repr {}", repr);
        assert!(repr.contains("Parallel"), "repr {}", repr);
    }
}
