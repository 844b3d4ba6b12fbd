//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of inches in one meter.
pub const INCHES_PER_METER: f64 = 39.370_078_740_157_48;

/// Newtons per pound-force.
pub const NEWTONS_PER_LBF: f64 = 4.448_221_615_260_5;

/// Mass in kilograms of an object weighing one pound-force under standard
/// gravity.
pub const KG_PER_LBF: f64 = 0.453_592_37;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Clamp a value between the given limits.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()` if `lhs` is much smaller than `rhs.abs()` in
/// magnitude and `lhs < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

/// Wrap an angle in degrees into the range [0, 360).
pub fn wrap_360<T>(angle_deg: T) -> T
where
    T: Float
{
    let full_t: T = T::from(360.0).unwrap();

    let wrapped = rem_euclid(angle_deg, full_t);

    // Round-off can land exactly on the upper bound
    if wrapped >= full_t {
        wrapped - full_t
    }
    else {
        wrapped
    }
}

/// Get the signed angle in degrees that must be turned through to go from
/// `from_deg` to `to_deg`.
///
/// The result is the shortest turn, in the range (-180, 180]. An exact half
/// turn is always reported as +180.
pub fn angle_diff_deg<T>(from_deg: T, to_deg: T) -> T
where
    T: Float
{
    let half_t: T = T::from(180.0).unwrap();
    let full_t: T = T::from(360.0).unwrap();

    let d = wrap_360(to_deg - from_deg);

    if d > half_t {
        d - full_t
    }
    else {
        d
    }
}

/// Convert a length in inches to meters.
pub fn inches_to_meters(inches: f64) -> f64 {
    inches / INCHES_PER_METER
}

/// Convert a length in meters to inches.
pub fn meters_to_inches(meters: f64) -> f64 {
    meters * INCHES_PER_METER
}

/// Convert a force in pound-force to newtons.
pub fn lbf_to_newtons(lbf: f64) -> f64 {
    lbf * NEWTONS_PER_LBF
}

/// Get the mass (kg) of a body from its weight in pound-force.
pub fn weight_lbf_to_mass_kg(lbf: f64) -> f64 {
    lbf * KG_PER_LBF
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_angle_diff_deg() {
        assert_eq!(angle_diff_deg(10f64, 20f64), 10f64);
        assert_eq!(angle_diff_deg(20f64, 10f64), -10f64);
        assert_eq!(angle_diff_deg(350f64, 10f64), 20f64);
        assert_eq!(angle_diff_deg(10f64, 350f64), -20f64);
        assert_eq!(angle_diff_deg(0f64, 360f64), 0f64);
        assert_eq!(angle_diff_deg(0f64, 180f64), 180f64);
        assert_eq!(angle_diff_deg(180f64, 0f64), 180f64);
        assert_eq!(angle_diff_deg(-90f64, 90f64), 180f64);
        assert_eq!(angle_diff_deg(720f64, 45f64), 45f64);
    }

    #[test]
    fn test_angle_diff_range_and_antisymmetry() {
        let mut a = -725.0f64;
        while a < 725.0 {
            let mut b = -725.0f64;
            while b < 725.0 {
                let ab = angle_diff_deg(a, b);
                let ba = angle_diff_deg(b, a);

                assert!(ab > -180.0 && ab <= 180.0, "({}, {}) -> {}", a, b, ab);

                // Half turns are reported as +180 in both directions
                if (ab.abs() - 180.0).abs() > 1e-9 {
                    assert!((ab + ba).abs() < 1e-9, "({}, {}) -> {} / {}", a, b, ab, ba);
                }

                b += 17.5;
            }
            a += 13.25;
        }
    }

    #[test]
    fn test_wrap_360() {
        assert_eq!(wrap_360(0f64), 0f64);
        assert_eq!(wrap_360(360f64), 0f64);
        assert_eq!(wrap_360(-90f64), 270f64);
        assert_eq!(wrap_360(450f64), 90f64);

        let tiny = wrap_360(-1e-20f64);
        assert!(tiny >= 0.0 && tiny < 360.0);
    }

    #[test]
    fn test_unit_conversions() {
        assert!((inches_to_meters(39.370_078_740_157_48) - 1.0).abs() < 1e-12);
        assert!((meters_to_inches(inches_to_meters(12.5)) - 12.5).abs() < 1e-12);
        assert!((lbf_to_newtons(1.0) - 4.448_221_615_260_5).abs() < 1e-12);

        // Fn / m for a body resting on flat ground is g
        let g = lbf_to_newtons(125.0) / weight_lbf_to_mass_kg(125.0);
        assert!((g - 9.806_65).abs() < 1e-4);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&5.0, &0.0, &1.0), 1.0);
        assert_eq!(clamp(&-5.0, &0.0, &1.0), 0.0);
        assert_eq!(clamp(&0.5, &0.0, &1.0), 0.5);
    }
}
