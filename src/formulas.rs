//! Load prescription formulas.

use crate::domain::WorkoutFormat;

/// Smallest load increment the athlete can actually put on the bar, in kg.
pub const PLATE_INCREMENT_KG: f64 = 2.5;

/// Returns the base intensity for a workout format, as a fraction of 1RM.
///
/// Values sit at the conservative end of the ranges commonly programmed
/// for each scheme.
pub fn base_percentage(format: WorkoutFormat) -> f64 {
    match format {
        WorkoutFormat::FourByFive => 0.80,   // typical range 75-85%
        WorkoutFormat::ThreeByFive => 0.78,  // typical range 75-82%
        WorkoutFormat::ThreeByThree => 0.84, // typical range 80-88%
        WorkoutFormat::OneRep => 0.88,       // typical range 85-92%
        WorkoutFormat::Speed => 0.65,        // typical range 60-70%
    }
}

/// Calculates the prescribed load for one exercise in a given format.
///
/// Formula: 1RM × base percentage × daily multiplier, rounded down to the
/// nearest plate increment. Rounding always goes down: the athlete is never
/// asked to lift more than the raw formula value.
///
/// A 1RM of 0 ("not recorded yet") yields a 0 load, and very small 1RMs
/// can floor to 0 as well. The multiplier is applied as-is; values outside
/// the readiness tables are the caller's responsibility.
///
/// # Arguments
/// * `one_rm_kg` - Current one-repetition maximum in kilograms
/// * `format` - Set/rep scheme the load is prescribed for
/// * `multiplier` - Daily readiness multiplier (1.0 on a nominal day)
///
/// # Returns
/// Prescribed load in kilograms, a multiple of 2.5
pub fn calculate_load(one_rm_kg: f64, format: WorkoutFormat, multiplier: f64) -> f64 {
    let raw_load = one_rm_kg * base_percentage(format) * multiplier;
    round_down_to_increment(raw_load)
}

/// Rounds a load down to the nearest plate increment.
///
/// Uses an explicit floor, not truncation: 82.3 becomes 80.0 and
/// 84.9 becomes 82.5.
pub fn round_down_to_increment(load_kg: f64) -> f64 {
    (load_kg / PLATE_INCREMENT_KG).floor() * PLATE_INCREMENT_KG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_percentage_table() {
        assert_eq!(base_percentage(WorkoutFormat::FourByFive), 0.80);
        assert_eq!(base_percentage(WorkoutFormat::ThreeByFive), 0.78);
        assert_eq!(base_percentage(WorkoutFormat::ThreeByThree), 0.84);
        assert_eq!(base_percentage(WorkoutFormat::OneRep), 0.88);
        assert_eq!(base_percentage(WorkoutFormat::Speed), 0.65);
    }

    #[test]
    fn test_round_down_examples() {
        assert_eq!(round_down_to_increment(82.3), 80.0);
        assert_eq!(round_down_to_increment(84.9), 82.5);
        assert_eq!(round_down_to_increment(85.0), 85.0);
        assert_eq!(round_down_to_increment(2.4), 0.0);
        assert_eq!(round_down_to_increment(0.0), 0.0);
    }

    #[test]
    fn test_load_triples_at_full_readiness() {
        // 100kg × 0.84 × 1.0 = 84.0, floored to the 2.5 grid = 82.5
        assert_eq!(
            calculate_load(100.0, WorkoutFormat::ThreeByThree, 1.0),
            82.5
        );
    }

    #[test]
    fn test_load_triples_on_a_poor_day() {
        // 100kg × 0.84 × 0.90 = 75.6 -> 75.0
        assert_eq!(
            calculate_load(100.0, WorkoutFormat::ThreeByThree, 0.90),
            75.0
        );
    }

    #[test]
    fn test_load_fives_on_a_medium_day() {
        // 140kg × 0.78 × 0.95 = 103.74 -> 102.5
        assert_eq!(
            calculate_load(140.0, WorkoutFormat::ThreeByFive, 0.95),
            102.5
        );
    }

    #[test]
    fn test_load_heavy_single_at_full_readiness() {
        // 40kg × 0.88 × 1.0 = 35.2 -> 35.0
        assert_eq!(calculate_load(40.0, WorkoutFormat::OneRep, 1.0), 35.0);
    }

    #[test]
    fn test_load_speed_work() {
        // 100kg × 0.65 × 1.0 = 65.0, already on the grid
        assert_eq!(calculate_load(100.0, WorkoutFormat::Speed, 1.0), 65.0);
        // 100kg × 0.65 × 0.95 = 61.75 -> 60.0
        assert_eq!(calculate_load(100.0, WorkoutFormat::Speed, 0.95), 60.0);
    }

    #[test]
    fn test_load_unrecorded_one_rm_is_zero() {
        for format in WorkoutFormat::all() {
            assert_eq!(calculate_load(0.0, *format, 1.0), 0.0);
            assert_eq!(calculate_load(0.0, *format, 0.90), 0.0);
        }
    }

    #[test]
    fn test_load_tiny_one_rm_floors_to_zero() {
        // 1kg × 0.80 × 1.0 = 0.8, below one increment
        assert_eq!(calculate_load(1.0, WorkoutFormat::FourByFive, 1.0), 0.0);
        // 2kg × 0.65 × 0.90 = 1.17, still below one increment
        assert_eq!(calculate_load(2.0, WorkoutFormat::Speed, 0.90), 0.0);
    }

    #[test]
    fn test_load_is_always_a_plate_multiple_and_never_rounds_up() {
        let one_rms = [0.0, 1.0, 37.5, 40.0, 62.3, 100.0, 102.5, 140.0, 180.0, 200.7];
        let multipliers = [0.90, 0.95, 1.0];

        for &one_rm in &one_rms {
            for format in WorkoutFormat::all() {
                for &multiplier in &multipliers {
                    let raw = one_rm * base_percentage(*format) * multiplier;
                    let load = calculate_load(one_rm, *format, multiplier);
                    assert!(
                        load % PLATE_INCREMENT_KG == 0.0,
                        "{} is not a plate multiple",
                        load
                    );
                    assert!(
                        load <= raw + 1e-9,
                        "load {} exceeds raw value {}",
                        load,
                        raw
                    );
                    assert!(load >= 0.0);
                }
            }
        }
    }

    #[test]
    fn test_load_with_out_of_table_multiplier() {
        // The multiplier is not clamped: 100kg × 0.80 × 1.2 = 96.0 -> 95.0
        assert_eq!(calculate_load(100.0, WorkoutFormat::FourByFive, 1.2), 95.0);
    }
}
