//! Session planning: turning a stored session into the day's prescribed loads.
//!
//! This module resolves session entries against the profile and applies the
//! readiness adjustment, so the load formulas stay pure functions.

use crate::domain::{Profile, ReadinessState, WorkoutFormat, WorkoutSession};
use crate::formulas::calculate_load;
use crate::readiness::daily_multiplier;

/// One prescribed load in a planned session.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatedLoad {
    pub exercise_id: String,
    /// Display name of the exercise. None when the reference is unresolved.
    pub exercise_name: Option<String>,
    pub format: WorkoutFormat,
    /// Prescribed load in kg, already floored to the plate increment.
    pub load_kg: f64,
}

impl CalculatedLoad {
    /// Returns true if the session entry referenced an existing exercise.
    pub fn is_resolved(&self) -> bool {
        self.exercise_name.is_some()
    }
}

/// A session with loads computed for one day's readiness.
#[derive(Debug, Clone)]
pub struct SessionPlan {
    pub session_id: String,
    pub session_name: String,
    /// The day's multiplier from the readiness check-in.
    pub multiplier: f64,
    /// Whole-percent adjustment relative to nominal, e.g. -10 on a poor day.
    pub adjustment_pct: i32,
    pub loads: Vec<CalculatedLoad>,
}

impl SessionPlan {
    /// Returns true if the plan runs at the nominal (unadjusted) load.
    pub fn is_nominal(&self) -> bool {
        self.adjustment_pct == 0
    }
}

/// Plans a workout: one prescribed load per session entry, in session order.
///
/// The daily multiplier is derived once from the check-in and applied to
/// every entry. An entry whose exercise id is not in the profile degrades
/// to a zero-load row with no name instead of failing the whole plan; the
/// load formula is not called for such rows.
pub fn plan_session(
    profile: &Profile,
    session: &WorkoutSession,
    readiness: ReadinessState,
) -> SessionPlan {
    let multiplier = daily_multiplier(readiness);
    let adjustment_pct = ((multiplier - 1.0) * 100.0).round() as i32;

    let loads = session
        .exercises
        .iter()
        .map(|entry| match profile.exercise(&entry.exercise_id) {
            Some(exercise) => CalculatedLoad {
                exercise_id: entry.exercise_id.clone(),
                exercise_name: Some(exercise.name.clone()),
                format: entry.format,
                load_kg: calculate_load(exercise.one_rm_kg, entry.format, multiplier),
            },
            None => {
                log::warn!(
                    "session {}: unknown exercise id '{}'",
                    session.id,
                    entry.exercise_id
                );
                CalculatedLoad {
                    exercise_id: entry.exercise_id.clone(),
                    exercise_name: None,
                    format: entry.format,
                    load_kg: 0.0,
                }
            }
        })
        .collect();

    SessionPlan {
        session_id: session.id.clone(),
        session_name: session.name.clone(),
        multiplier,
        adjustment_pct,
        loads,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Exercise, ReadinessLevel, SessionExercise};

    fn profile() -> Profile {
        Profile::from_parts(
            vec![
                Exercise::new("bench", "Développé Couché", 100.0),
                Exercise::new("squat", "Squat", 140.0),
                Exercise::new("dips", "Dips Lestés", 50.0),
                Exercise::new("pullups", "Tractions Lestées", 0.0),
            ],
            vec![],
        )
    }

    fn session(entries: Vec<(&str, WorkoutFormat)>) -> WorkoutSession {
        WorkoutSession {
            id: "s1".to_string(),
            name: "Séance 1 : Force Poussée".to_string(),
            exercises: entries
                .into_iter()
                .map(|(id, format)| SessionExercise {
                    exercise_id: id.to_string(),
                    format,
                })
                .collect(),
        }
    }

    #[test]
    fn test_plan_at_full_readiness() {
        let session = session(vec![
            ("bench", WorkoutFormat::ThreeByThree),
            ("dips", WorkoutFormat::FourByFive),
        ]);
        let plan = plan_session(&profile(), &session, ReadinessState::default());

        assert_eq!(plan.session_id, "s1");
        assert_eq!(plan.multiplier, 1.0);
        assert_eq!(plan.adjustment_pct, 0);
        assert!(plan.is_nominal());
        assert_eq!(plan.loads.len(), 2);

        // 100 × 0.84 = 84.0 -> 82.5 on the plate grid
        assert_eq!(plan.loads[0].load_kg, 82.5);
        assert_eq!(plan.loads[0].exercise_name.as_deref(), Some("Développé Couché"));
        // 50 × 0.80 = 40.0
        assert_eq!(plan.loads[1].load_kg, 40.0);
    }

    #[test]
    fn test_plan_on_a_poor_day() {
        let session = session(vec![
            ("bench", WorkoutFormat::ThreeByThree),
            ("dips", WorkoutFormat::FourByFive),
        ]);
        let readiness = ReadinessState::new(
            ReadinessLevel::Poor,
            ReadinessLevel::Good,
            ReadinessLevel::Good,
        );
        let plan = plan_session(&profile(), &session, readiness);

        assert_eq!(plan.multiplier, 0.90);
        assert_eq!(plan.adjustment_pct, -10);
        assert!(!plan.is_nominal());
        // 100 × 0.84 × 0.90 = 75.6 -> 75.0
        assert_eq!(plan.loads[0].load_kg, 75.0);
        // 50 × 0.80 × 0.90 = 36.0 -> 35.0
        assert_eq!(plan.loads[1].load_kg, 35.0);
    }

    #[test]
    fn test_plan_on_a_medium_day_reports_minus_five_percent() {
        let session = session(vec![("squat", WorkoutFormat::ThreeByFive)]);
        let readiness = ReadinessState::new(
            ReadinessLevel::Good,
            ReadinessLevel::Medium,
            ReadinessLevel::Good,
        );
        let plan = plan_session(&profile(), &session, readiness);

        assert_eq!(plan.multiplier, 0.95);
        assert_eq!(plan.adjustment_pct, -5);
        // 140 × 0.78 × 0.95 = 103.74 -> 102.5
        assert_eq!(plan.loads[0].load_kg, 102.5);
    }

    #[test]
    fn test_unknown_exercise_degrades_to_zero_load_row() {
        let session = session(vec![
            ("ghost", WorkoutFormat::ThreeByThree),
            ("bench", WorkoutFormat::ThreeByThree),
        ]);
        let plan = plan_session(&profile(), &session, ReadinessState::default());

        // The bad reference yields a visible placeholder row
        assert_eq!(plan.loads.len(), 2);
        assert_eq!(plan.loads[0].exercise_id, "ghost");
        assert_eq!(plan.loads[0].exercise_name, None);
        assert!(!plan.loads[0].is_resolved());
        assert_eq!(plan.loads[0].load_kg, 0.0);

        // The rest of the session still gets real loads
        assert!(plan.loads[1].is_resolved());
        assert_eq!(plan.loads[1].load_kg, 82.5);
    }

    #[test]
    fn test_unrecorded_one_rm_prescribes_zero() {
        let session = session(vec![("pullups", WorkoutFormat::OneRep)]);
        let plan = plan_session(&profile(), &session, ReadinessState::default());

        // Resolved exercise, but no 1RM recorded yet
        assert!(plan.loads[0].is_resolved());
        assert_eq!(plan.loads[0].load_kg, 0.0);
    }

    #[test]
    fn test_plan_preserves_entry_order_and_duplicates() {
        let session = session(vec![
            ("bench", WorkoutFormat::Speed),
            ("squat", WorkoutFormat::ThreeByFive),
            ("bench", WorkoutFormat::ThreeByThree),
        ]);
        let plan = plan_session(&profile(), &session, ReadinessState::default());

        assert_eq!(plan.loads.len(), 3);
        assert_eq!(plan.loads[0].exercise_id, "bench");
        assert_eq!(plan.loads[0].format, WorkoutFormat::Speed);
        // 100 × 0.65 = 65.0
        assert_eq!(plan.loads[0].load_kg, 65.0);
        assert_eq!(plan.loads[1].exercise_id, "squat");
        assert_eq!(plan.loads[2].exercise_id, "bench");
        assert_eq!(plan.loads[2].load_kg, 82.5);
    }

    #[test]
    fn test_plan_of_empty_session() {
        let session = session(vec![]);
        let readiness = ReadinessState::new(
            ReadinessLevel::Medium,
            ReadinessLevel::Good,
            ReadinessLevel::Good,
        );
        let plan = plan_session(&profile(), &session, readiness);

        assert!(plan.loads.is_empty());
        // The multiplier is still computed for the day
        assert_eq!(plan.multiplier, 0.95);
    }
}
