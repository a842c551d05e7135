//! Spherical-earth guidance geometry
//!
//! Stateless great-circle math shared by the hold-entry transition and the
//! per-tick guidance evaluators. All functions are total over their expected
//! input domain and degrade to degenerate outputs (zero-length distances,
//! zero-sweep arcs) rather than failing.
//!
//! Angles are degrees, distances nautical miles, speeds knots.

use libm::{asin, atan, atan2, cos, fabs, sin, sqrt};
use nalgebra::Vector3;

use super::types::{Coordinates, Degrees, Knots, LateralGuidance, NauticalMiles};

/// Mean earth radius in nautical miles
const EARTH_RADIUS_NM: f64 = 3440.065;

/// Nautical miles to metres
const NM_TO_M: f64 = 1852.0;

/// Knots to metres per second
const KT_TO_MPS: f64 = 0.514444;

/// Acceleration of gravity in m/s^2
const G_MPS2: f64 = 9.81;

const DEG_TO_RAD: f64 = core::f64::consts::PI / 180.0;
const RAD_TO_DEG: f64 = 180.0 / core::f64::consts::PI;

/// Bank ceiling in degrees
const MAX_BANK_DEG: f64 = 25.0;

/// Standard-rate turn rate in degrees per second
const STANDARD_TURN_RATE: f64 = 3.0;

/// Maximum roll rate assumed by the anticipation model, degrees per second
const MAX_ROLL_RATE: f64 = 5.0;

/// Shape constant of the roll-anticipation model
const ROLL_ANTICIPATION_K2: f64 = 0.0038;

/// Normalize a bearing to [0, 360)
pub fn clamp_angle(angle: Degrees) -> Degrees {
    let wrapped = angle % 360.0;
    if wrapped < 0.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

/// Signed angular difference from `a` to `b`, in (-180, 180]
///
/// The sign encodes turn direction: positive means `b` lies clockwise of `a`.
pub fn diff_angle(a: Degrees, b: Degrees) -> Degrees {
    let mut diff = b - a;
    while diff > 180.0 {
        diff -= 360.0;
    }
    while diff <= -180.0 {
        diff += 360.0;
    }
    diff
}

/// Great-circle distance between two positions using the haversine formula
pub fn great_circle_distance(from: Coordinates, to: Coordinates) -> NauticalMiles {
    let lat1 = from.lat * DEG_TO_RAD;
    let lat2 = to.lat * DEG_TO_RAD;
    let delta_lat = (to.lat - from.lat) * DEG_TO_RAD;
    let delta_long = (to.long - from.long) * DEG_TO_RAD;

    let sin_dlat = sin(delta_lat / 2.0);
    let sin_dlong = sin(delta_long / 2.0);
    let a = sin_dlat * sin_dlat + cos(lat1) * cos(lat2) * sin_dlong * sin_dlong;
    let c = 2.0 * atan2(sqrt(a), sqrt(1.0 - a));
    EARTH_RADIUS_NM * c
}

/// Initial bearing of the great circle from `from` to `to`, in degrees [0, 360)
pub fn great_circle_heading(from: Coordinates, to: Coordinates) -> Degrees {
    let lat1 = from.lat * DEG_TO_RAD;
    let lat2 = to.lat * DEG_TO_RAD;
    let delta_long = (to.long - from.long) * DEG_TO_RAD;

    let y = sin(delta_long) * cos(lat2);
    let x = cos(lat1) * sin(lat2) - sin(lat1) * cos(lat2) * cos(delta_long);
    clamp_angle(atan2(y, x) * RAD_TO_DEG)
}

/// Project a point along a great-circle bearing
pub fn bearing_distance_to_coordinates(
    bearing: Degrees,
    distance: NauticalMiles,
    origin: Coordinates,
) -> Coordinates {
    let delta = distance / EARTH_RADIUS_NM;
    let theta = bearing * DEG_TO_RAD;
    let lat1 = origin.lat * DEG_TO_RAD;
    let long1 = origin.long * DEG_TO_RAD;

    let lat2 = asin(sin(lat1) * cos(delta) + cos(lat1) * sin(delta) * cos(theta));
    let long2 = long1 + atan2(sin(theta) * sin(delta) * cos(lat1), cos(delta) - sin(lat1) * sin(lat2));

    Coordinates {
        lat: lat2 * RAD_TO_DEG,
        long: wrap_longitude(long2 * RAD_TO_DEG),
    }
}

/// Intersection of two great-circle courses
///
/// The two input bearings must each be pre-adjusted by the caller so the
/// intended intersection lies ahead: of the two antipodal solutions, the one
/// in the hemisphere around `point_a` is returned. Coincident great circles
/// degrade to `point_b`.
pub fn great_circle_intersection(
    point_a: Coordinates,
    bearing_a: Degrees,
    point_b: Coordinates,
    bearing_b: Degrees,
) -> Coordinates {
    let reference = unit_vector(point_a);
    let normal_a = great_circle_normal(point_a, bearing_a);
    let normal_b = great_circle_normal(point_b, bearing_b);

    let cross = normal_a.cross(&normal_b);
    let norm = cross.norm();
    if norm < 1e-12 {
        return point_b;
    }

    let candidate = cross / norm;
    if candidate.dot(&reference) >= 0.0 {
        from_unit_vector(candidate)
    } else {
        from_unit_vector(-candidate)
    }
}

/// Along-course distance remaining from `ppos` to the fix
///
/// Zero once the fix is abeam or behind.
pub fn course_to_fix_distance_to_go(
    ppos: Coordinates,
    course: Degrees,
    fix: Coordinates,
) -> NauticalMiles {
    let distance = great_circle_distance(ppos, fix);
    let bearing = great_circle_heading(ppos, fix);
    let along = distance * cos(diff_angle(course, bearing) * DEG_TO_RAD);
    if along > 0.0 {
        along
    } else {
        0.0
    }
}

/// Lateral guidance for a straight course through a fix
///
/// Cross-track error is positive when the aircraft is right of the course.
/// The straight segment commands wings level; bank transitions are handled
/// by roll anticipation at the segment boundaries.
pub fn course_to_fix_guidance(
    ppos: Coordinates,
    true_track: Degrees,
    course: Degrees,
    fix: Coordinates,
) -> LateralGuidance {
    let angular_distance = great_circle_distance(fix, ppos) / EARTH_RADIUS_NM;
    let bearing_from_fix = great_circle_heading(fix, ppos);
    let offset = diff_angle(course, bearing_from_fix) * DEG_TO_RAD;

    LateralGuidance {
        cross_track_error: asin(sin(angular_distance) * sin(offset)) * EARTH_RADIUS_NM,
        track_angle_error: diff_angle(course, true_track),
        phi_command: 0.0,
    }
}

/// Remaining distance along an arc segment
///
/// The arc starts at `itp` around `centre`; the sweep sign encodes turn
/// direction. Zero once the swept angle is used up.
pub fn arc_distance_to_go(
    ppos: Coordinates,
    itp: Coordinates,
    centre: Coordinates,
    sweep_angle: Degrees,
) -> NauticalMiles {
    let itp_bearing = great_circle_heading(centre, itp);
    let ppos_bearing = great_circle_heading(centre, ppos);
    let radius = great_circle_distance(centre, itp);

    let traversed = if sweep_angle < 0.0 {
        clamp_angle(itp_bearing - ppos_bearing)
    } else {
        clamp_angle(ppos_bearing - itp_bearing)
    };

    let total = fabs(sweep_angle);
    if traversed >= total {
        return 0.0;
    }
    (total - traversed) / 360.0 * 2.0 * core::f64::consts::PI * radius
}

/// Lateral guidance for an arc segment
///
/// Cross-track error is positive when the aircraft is right of the arc in
/// the direction of travel; the commanded bank is the steady bank holding
/// the arc radius at the given ground speed, signed by the sweep.
pub fn arc_guidance(
    ppos: Coordinates,
    true_track: Degrees,
    ground_speed: Knots,
    itp: Coordinates,
    centre: Coordinates,
    sweep_angle: Degrees,
) -> LateralGuidance {
    let ppos_bearing = great_circle_heading(centre, ppos);
    let desired_track = if sweep_angle > 0.0 {
        clamp_angle(ppos_bearing + 90.0)
    } else {
        clamp_angle(ppos_bearing - 90.0)
    };

    let radius = great_circle_distance(centre, itp);
    let distance_from_centre = great_circle_distance(centre, ppos);
    let cross_track_error = if sweep_angle > 0.0 {
        radius - distance_from_centre
    } else {
        distance_from_centre - radius
    };

    LateralGuidance {
        cross_track_error,
        track_angle_error: diff_angle(desired_track, true_track),
        phi_command: nominal_arc_bank(ground_speed, radius, sweep_angle),
    }
}

/// Steady bank angle holding an arc of the given radius at the given ground
/// speed, signed by the sweep direction
pub fn nominal_arc_bank(
    ground_speed: Knots,
    radius: NauticalMiles,
    sweep_angle: Degrees,
) -> Degrees {
    let radius_m = radius * NM_TO_M;
    if radius_m <= 0.0 {
        return 0.0;
    }
    let v = ground_speed * KT_TO_MPS;
    let phi = atan(v * v / (radius_m * G_MPS2)) * RAD_TO_DEG;
    if sweep_angle > 0.0 {
        phi
    } else {
        -phi
    }
}

/// Speed-scheduled maximum commanded bank, as a positive magnitude
///
/// Holds are limited to the standard-rate bank, capped at the overall bank
/// ceiling. Callers apply sign per turn direction.
pub fn max_bank(speed: Knots, is_hold: bool) -> Degrees {
    if is_hold {
        let v = fabs(speed) * KT_TO_MPS;
        let standard_rate = atan(v * STANDARD_TURN_RATE * DEG_TO_RAD / G_MPS2) * RAD_TO_DEG;
        if standard_rate < MAX_BANK_DEG {
            standard_rate
        } else {
            MAX_BANK_DEG
        }
    } else {
        MAX_BANK_DEG
    }
}

/// Lead distance at which the roll toward `next_bank` must begin so the
/// rate-limited roll completes at the segment boundary
///
/// Zero when no bank change is pending.
pub fn roll_anticipation_distance(
    ground_speed: Knots,
    current_bank: Degrees,
    next_bank: Degrees,
) -> NauticalMiles {
    let delta_phi = fabs(current_bank - next_bank);
    ground_speed / 3600.0
        * (sqrt(1.0 + 2.0 * ROLL_ANTICIPATION_K2 * G_MPS2 * delta_phi / MAX_ROLL_RATE) - 1.0)
        / (ROLL_ANTICIPATION_K2 * G_MPS2)
}

/// Wrap a longitude to (-180, 180]
fn wrap_longitude(long: Degrees) -> Degrees {
    let wrapped = long % 360.0;
    if wrapped > 180.0 {
        wrapped - 360.0
    } else if wrapped <= -180.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

/// Earth-centred unit vector of a position
fn unit_vector(point: Coordinates) -> Vector3<f64> {
    let lat = point.lat * DEG_TO_RAD;
    let long = point.long * DEG_TO_RAD;
    Vector3::new(cos(lat) * cos(long), cos(lat) * sin(long), sin(lat))
}

/// Position of an earth-centred unit vector
fn from_unit_vector(v: Vector3<f64>) -> Coordinates {
    Coordinates {
        lat: asin(v.z.clamp(-1.0, 1.0)) * RAD_TO_DEG,
        long: atan2(v.y, v.x) * RAD_TO_DEG,
    }
}

/// Normal of the great circle through `point` with the given initial bearing
fn great_circle_normal(point: Coordinates, bearing: Degrees) -> Vector3<f64> {
    let lat = point.lat * DEG_TO_RAD;
    let long = point.long * DEG_TO_RAD;
    let position = unit_vector(point);

    let east = Vector3::new(-sin(long), cos(long), 0.0);
    let north = Vector3::new(-sin(lat) * cos(long), -sin(lat) * sin(long), cos(lat));

    let theta = bearing * DEG_TO_RAD;
    let direction = north * cos(theta) + east * sin(theta);
    position.cross(&direction)
}
