//! Domain types for exercises, sessions, and the daily readiness check-in.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Self-reported quality of one readiness indicator.
///
/// Variants are ordered by severity (`Poor < Medium < Good`), so the
/// weakest indicator of a day is simply the minimum.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReadinessLevel {
    Poor,
    Medium,
    #[default]
    Good,
}

impl FromStr for ReadinessLevel {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "good" => Ok(ReadinessLevel::Good),
            "medium" => Ok(ReadinessLevel::Medium),
            "poor" => Ok(ReadinessLevel::Poor),
            _ => Err(ParseError::UnknownLevel(s.to_string())),
        }
    }
}

/// The athlete's daily check-in: three independent readiness indicators.
///
/// Missing fields deserialize to `Good`, matching the check-in form's
/// initial state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessState {
    pub sleep: ReadinessLevel,
    pub form: ReadinessLevel,
    pub motivation: ReadinessLevel,
}

impl ReadinessState {
    /// Creates a readiness state from the three indicators.
    pub fn new(sleep: ReadinessLevel, form: ReadinessLevel, motivation: ReadinessLevel) -> Self {
        Self {
            sleep,
            form,
            motivation,
        }
    }

    /// Returns the lowest of the three indicators.
    ///
    /// This is the indicator that drives the day's load adjustment: one
    /// poor night caps the whole session regardless of the other two.
    pub fn weakest_link(self) -> ReadinessLevel {
        self.sleep.min(self.form).min(self.motivation)
    }
}

/// Set/rep schemes the application can prescribe loads for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkoutFormat {
    #[serde(rename = "4x5")]
    FourByFive,
    #[serde(rename = "3x5")]
    ThreeByFive,
    #[serde(rename = "3x3")]
    ThreeByThree,
    #[serde(rename = "1rep")]
    OneRep,
    #[serde(rename = "SPEED")]
    Speed,
}

impl WorkoutFormat {
    /// Returns all format variants.
    pub fn all() -> &'static [WorkoutFormat] {
        &[
            WorkoutFormat::FourByFive,
            WorkoutFormat::ThreeByFive,
            WorkoutFormat::ThreeByThree,
            WorkoutFormat::OneRep,
            WorkoutFormat::Speed,
        ]
    }

    /// Returns the stable identifier used in profile files and the API.
    pub fn id(&self) -> &'static str {
        match self {
            WorkoutFormat::FourByFive => "4x5",
            WorkoutFormat::ThreeByFive => "3x5",
            WorkoutFormat::ThreeByThree => "3x3",
            WorkoutFormat::OneRep => "1rep",
            WorkoutFormat::Speed => "SPEED",
        }
    }

    /// Returns the name shown to the athlete.
    ///
    /// Speed work is programmed as six triples, so it displays as "6x3"
    /// rather than its stored identifier.
    pub fn display_name(&self) -> &'static str {
        match self {
            WorkoutFormat::Speed => "6x3",
            other => other.id(),
        }
    }
}

impl FromStr for WorkoutFormat {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "4x5" => Ok(WorkoutFormat::FourByFive),
            "3x5" => Ok(WorkoutFormat::ThreeByFive),
            "3x3" => Ok(WorkoutFormat::ThreeByThree),
            "1rep" => Ok(WorkoutFormat::OneRep),
            "speed" => Ok(WorkoutFormat::Speed),
            _ => Err(ParseError::UnknownFormat(s.to_string())),
        }
    }
}

impl std::fmt::Display for WorkoutFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// An exercise with its current one-repetition maximum.
#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    /// Current 1RM in kilograms. 0 means "not recorded yet".
    pub one_rm_kg: f64,
}

impl Exercise {
    /// Creates a new exercise record.
    pub fn new(id: impl Into<String>, name: impl Into<String>, one_rm_kg: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            one_rm_kg,
        }
    }
}

/// One entry of a workout session: an exercise reference plus its format.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionExercise {
    pub exercise_id: String,
    pub format: WorkoutFormat,
}

/// A planned workout session.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutSession {
    pub id: String,
    pub name: String,
    pub exercises: Vec<SessionExercise>,
}

/// Container for the athlete's stored state: exercise records and sessions.
#[derive(Debug, Clone, Default)]
pub struct Profile {
    exercises: Vec<Exercise>,
    sessions: Vec<WorkoutSession>,
}

impl Profile {
    /// Creates a profile from validated parts.
    pub fn from_parts(exercises: Vec<Exercise>, sessions: Vec<WorkoutSession>) -> Self {
        Self {
            exercises,
            sessions,
        }
    }

    /// Returns all exercises in their stored order.
    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    /// Returns all sessions in their stored order.
    pub fn sessions(&self) -> &[WorkoutSession] {
        &self.sessions
    }

    /// Looks up an exercise by id.
    pub fn exercise(&self, id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == id)
    }

    /// Looks up a session by id.
    pub fn session(&self, id: &str) -> Option<&WorkoutSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    /// Replaces the whole exercise list, keeping the given order.
    pub fn set_exercises(&mut self, exercises: Vec<Exercise>) {
        self.exercises = exercises;
    }

    /// Inserts a session, or replaces the one with the same id in place.
    pub fn upsert_session(&mut self, session: WorkoutSession) {
        match self.sessions.iter_mut().find(|s| s.id == session.id) {
            Some(existing) => *existing = session,
            None => self.sessions.push(session),
        }
    }

    /// Removes a session by id. Returns false if no such session exists.
    pub fn remove_session(&mut self, id: &str) -> bool {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != id);
        self.sessions.len() < before
    }

    /// Returns the number of exercise records.
    pub fn exercise_count(&self) -> usize {
        self.exercises.len()
    }

    /// Returns the number of sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Returns how many exercises have a recorded (non-zero) 1RM.
    pub fn recorded_count(&self) -> usize {
        self.exercises.iter().filter(|e| e.one_rm_kg > 0.0).count()
    }
}
