//! JSON profile persistence.
//!
//! The profile file holds the athlete's exercise records and planned
//! sessions. Parsing is strict about the JSON shape but lenient about
//! entry content: entries with an unknown format, a negative 1RM, or a
//! duplicate id are logged and skipped so one stale entry never takes
//! down the whole profile.

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::domain::{Exercise, Profile, SessionExercise, WorkoutFormat, WorkoutSession};
use crate::error::StoreError;

/// On-disk layout of a profile file.
#[derive(Debug, Serialize, Deserialize)]
struct ProfileFile {
    /// When the application last wrote the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    saved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    exercises: Vec<ExerciseRecord>,
    #[serde(default)]
    sessions: Vec<SessionRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ExerciseRecord {
    id: String,
    name: String,
    one_rm_kg: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionRecord {
    id: String,
    name: String,
    #[serde(default)]
    exercises: Vec<SessionExerciseRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionExerciseRecord {
    exercise_id: String,
    /// Raw string so an unknown format skips one entry, not the whole file.
    format: String,
}

/// Loads a profile from a JSON file.
///
/// # Arguments
/// * `path` - Path to the profile file
///
/// # Returns
/// The profile with all valid entries, in stored order.
///
/// # Errors
/// Returns StoreError if the file is missing, unreadable, or not valid
/// JSON. Invalid individual entries are logged and skipped instead.
pub fn load_profile<P: AsRef<Path>>(path: P) -> Result<Profile, StoreError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(StoreError::FileNotFound(path.display().to_string()));
    }

    let contents = fs::read_to_string(path)
        .map_err(|e| StoreError::CannotRead(format!("{}: {}", path.display(), e)))?;

    let file: ProfileFile = serde_json::from_str(&contents)
        .map_err(|e| StoreError::InvalidJson(format!("{}: {}", path.display(), e)))?;

    if let Some(saved_at) = file.saved_at {
        log::debug!("profile last saved at {}", saved_at);
    }

    let exercises = validate_exercises(file.exercises);
    let sessions = validate_sessions(file.sessions);

    Ok(Profile::from_parts(exercises, sessions))
}

/// Saves a profile to a JSON file, creating parent directories as needed.
///
/// # Errors
/// Returns StoreError::CannotWrite if the file cannot be written.
pub fn save_profile<P: AsRef<Path>>(path: P, profile: &Profile) -> Result<(), StoreError> {
    let path = path.as_ref();

    let file = ProfileFile {
        saved_at: Some(Utc::now()),
        exercises: profile
            .exercises()
            .iter()
            .map(|e| ExerciseRecord {
                id: e.id.clone(),
                name: e.name.clone(),
                one_rm_kg: e.one_rm_kg,
            })
            .collect(),
        sessions: profile
            .sessions()
            .iter()
            .map(|s| SessionRecord {
                id: s.id.clone(),
                name: s.name.clone(),
                exercises: s
                    .exercises
                    .iter()
                    .map(|e| SessionExerciseRecord {
                        exercise_id: e.exercise_id.clone(),
                        format: e.format.id().to_string(),
                    })
                    .collect(),
            })
            .collect(),
    };

    let json = serde_json::to_string_pretty(&file)
        .map_err(|e| StoreError::CannotWrite(format!("{}: {}", path.display(), e)))?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .map_err(|e| StoreError::CannotWrite(format!("{}: {}", parent.display(), e)))?;
    }

    fs::write(path, json)
        .map_err(|e| StoreError::CannotWrite(format!("{}: {}", path.display(), e)))
}

/// Loads a profile, creating and saving a fresh one if the file is missing.
///
/// A fresh profile starts with the five standard exercises and no recorded
/// 1RMs. With `demo` set, it starts with sample 1RMs and three sessions
/// instead.
pub fn load_or_init<P: AsRef<Path>>(path: P, demo: bool) -> Result<Profile, StoreError> {
    let path = path.as_ref();

    if path.exists() {
        return load_profile(path);
    }

    let profile = if demo { demo_profile() } else { starter_profile() };
    save_profile(path, &profile)?;
    log::info!("created new profile at {}", path.display());
    Ok(profile)
}

/// Drops exercise records with a negative 1RM or a duplicate id.
fn validate_exercises(records: Vec<ExerciseRecord>) -> Vec<Exercise> {
    let mut seen = HashSet::new();
    let mut exercises = Vec::with_capacity(records.len());

    for record in records {
        if record.one_rm_kg < 0.0 {
            warn!(
                "exercise '{}': negative 1RM {}, skipping",
                record.id, record.one_rm_kg
            );
            continue;
        }
        if !seen.insert(record.id.clone()) {
            warn!("duplicate exercise id '{}', keeping the first", record.id);
            continue;
        }
        exercises.push(Exercise {
            id: record.id,
            name: record.name,
            one_rm_kg: record.one_rm_kg,
        });
    }

    exercises
}

/// Drops sessions with a duplicate id and entries with an unknown format.
///
/// Entries referencing an unknown exercise id are kept as-is; they degrade
/// to zero-load rows at planning time.
fn validate_sessions(records: Vec<SessionRecord>) -> Vec<WorkoutSession> {
    let mut seen = HashSet::new();
    let mut sessions = Vec::with_capacity(records.len());

    for record in records {
        if !seen.insert(record.id.clone()) {
            warn!("duplicate session id '{}', keeping the first", record.id);
            continue;
        }

        let mut exercises = Vec::with_capacity(record.exercises.len());
        for entry in record.exercises {
            match WorkoutFormat::from_str(&entry.format) {
                Ok(format) => exercises.push(SessionExercise {
                    exercise_id: entry.exercise_id,
                    format,
                }),
                Err(_) => {
                    warn!(
                        "session '{}': unknown workout format '{}', skipping entry",
                        record.id, entry.format
                    );
                }
            }
        }

        sessions.push(WorkoutSession {
            id: record.id,
            name: record.name,
            exercises,
        });
    }

    sessions
}

/// The five standard exercises, with no 1RMs recorded yet.
fn starter_profile() -> Profile {
    Profile::from_parts(
        vec![
            Exercise::new("1", "Développé Couché", 0.0),
            Exercise::new("2", "Squat", 0.0),
            Exercise::new("3", "Deadlift", 0.0),
            Exercise::new("4", "Tractions", 0.0),
            Exercise::new("5", "Dips", 0.0),
        ],
        vec![],
    )
}

/// Sample profile with recorded 1RMs and three ready-made sessions.
fn demo_profile() -> Profile {
    let entry = |exercise_id: &str, format: WorkoutFormat| SessionExercise {
        exercise_id: exercise_id.to_string(),
        format,
    };

    Profile::from_parts(
        vec![
            Exercise::new("bench", "Développé Couché", 100.0),
            Exercise::new("squat", "Squat", 140.0),
            Exercise::new("deadlift", "Soulevé de Terre", 180.0),
            Exercise::new("pullups", "Tractions Lestées", 40.0),
            Exercise::new("dips", "Dips Lestés", 50.0),
        ],
        vec![
            WorkoutSession {
                id: "s1".to_string(),
                name: "Séance 1 : Force Poussée".to_string(),
                exercises: vec![
                    entry("bench", WorkoutFormat::ThreeByThree),
                    entry("dips", WorkoutFormat::FourByFive),
                ],
            },
            WorkoutSession {
                id: "s2".to_string(),
                name: "Séance 2 : Jambes / Pull".to_string(),
                exercises: vec![
                    entry("squat", WorkoutFormat::ThreeByFive),
                    entry("pullups", WorkoutFormat::OneRep),
                ],
            },
            WorkoutSession {
                id: "s3".to_string(),
                name: "Séance 3 : Explosivité".to_string(),
                exercises: vec![
                    entry("bench", WorkoutFormat::Speed),
                    entry("deadlift", WorkoutFormat::ThreeByThree),
                ],
            },
        ],
    )
}
