//! Web server for the load planning dashboard.
//!
//! Provides a REST API for exercises, sessions, and daily load plans,
//! WebSocket for live updates, and static file serving for the frontend.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, broadcast};
use tower_http::services::ServeDir;

use crate::domain::{
    Exercise, Profile, ReadinessState, SessionExercise, WorkoutFormat, WorkoutSession,
};
use crate::formulas::base_percentage;
use crate::planner::{SessionPlan, plan_session};
use crate::store;

/// Name given to sessions saved without one.
const UNTITLED_SESSION: &str = "Sans titre";

/// Message types for WebSocket broadcast.
#[derive(Clone, Debug)]
pub enum WsMessage {
    /// The profile has been reloaded successfully.
    DataUpdated,
    /// An error occurred during reload.
    Error(String),
}

impl WsMessage {
    /// Text frame sent to clients for this message.
    fn frame(&self) -> String {
        match self {
            WsMessage::DataUpdated => "reload".to_string(),
            WsMessage::Error(err) => format!("error:{}", err),
        }
    }
}

/// Shared application state with the reloadable profile.
pub struct AppState {
    /// The profile, protected by RwLock for concurrent reads.
    pub data: RwLock<Profile>,
    /// Path to the profile file for persisting changes.
    pub file_path: PathBuf,
    /// Broadcast channel for WebSocket notifications.
    pub ws_broadcast: broadcast::Sender<WsMessage>,
}

// === JSON Request/Response Types ===

#[derive(Serialize, Deserialize)]
pub struct ExerciseJson {
    pub id: String,
    pub name: String,
    pub one_rm_kg: f64,
}

#[derive(Serialize)]
pub struct SessionSummaryJson {
    pub id: String,
    pub name: String,
    pub exercise_count: usize,
}

#[derive(Serialize, Deserialize)]
pub struct SessionExerciseJson {
    pub exercise_id: String,
    pub format: WorkoutFormat,
}

#[derive(Serialize)]
pub struct SessionJson {
    pub id: String,
    pub name: String,
    pub exercises: Vec<SessionExerciseJson>,
}

/// Body of PUT /api/sessions/{id}; the id comes from the path.
#[derive(Deserialize)]
pub struct SessionUpsertJson {
    pub name: String,
    #[serde(default)]
    pub exercises: Vec<SessionExerciseJson>,
}

#[derive(Serialize)]
pub struct SessionPlanJson {
    pub session_id: String,
    pub session_name: String,
    pub multiplier: f64,
    pub adjustment_pct: i32,
    pub loads: Vec<CalculatedLoadJson>,
}

#[derive(Serialize)]
pub struct CalculatedLoadJson {
    pub exercise_id: String,
    /// Null when the session entry references a missing exercise.
    pub exercise_name: Option<String>,
    pub format: WorkoutFormat,
    pub format_display: String,
    pub load_kg: f64,
}

#[derive(Serialize)]
pub struct FormatJson {
    pub id: String,
    pub display_name: String,
    pub base_percentage: f64,
}

// === Router Setup ===

/// Creates the application router.
pub fn create_router(state: Arc<AppState>, static_dir: PathBuf) -> Router {
    Router::new()
        .route("/api/exercises", get(get_exercises).put(put_exercises))
        .route("/api/sessions", get(get_sessions))
        .route(
            "/api/sessions/{id}",
            get(get_session).put(put_session).delete(delete_session),
        )
        .route("/api/sessions/{id}/plan", post(plan_workout))
        .route("/api/formats", get(get_formats))
        .route("/ws", get(ws_handler))
        .fallback_service(ServeDir::new(static_dir).append_index_html_on_directories(true))
        .with_state(state)
}

// === WebSocket Handler ===

/// WebSocket upgrade handler for live updates.
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws_connection(socket, state))
}

/// Handles an individual WebSocket connection.
async fn handle_ws_connection(mut socket: WebSocket, state: Arc<AppState>) {
    log::info!("WebSocket client connected");

    let mut rx = state.ws_broadcast.subscribe();

    loop {
        tokio::select! {
            // Forward broadcast messages to the client
            msg = rx.recv() => {
                let frame = match msg {
                    Ok(msg) => msg.frame(),
                    // Missed some messages, tell the client to reload anyway
                    Err(broadcast::error::RecvError::Lagged(_)) => WsMessage::DataUpdated.frame(),
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                if socket.send(Message::Text(frame.into())).await.is_err() {
                    break;
                }
            }
            // Handle client messages (ping/pong, close)
            result = socket.recv() => {
                match result {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    log::info!("WebSocket client disconnected");
}

/// Runs the web server.
pub async fn run_server(
    state: Arc<AppState>,
    port: u16,
    static_dir: PathBuf,
) -> anyhow::Result<()> {
    let app = create_router(state, static_dir);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    println!("Server running at http://localhost:{}", port);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// === API Handlers ===

/// GET /api/exercises - All exercise records.
async fn get_exercises(State(state): State<Arc<AppState>>) -> Json<Vec<ExerciseJson>> {
    let data = state.data.read().await;
    Json(data.exercises().iter().map(exercise_json).collect())
}

/// PUT /api/exercises - Replace the whole exercise list.
async fn put_exercises(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Vec<ExerciseJson>>,
) -> Result<Json<Vec<ExerciseJson>>, StatusCode> {
    if body.iter().any(|e| e.one_rm_kg < 0.0) {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let exercises = body
        .into_iter()
        .map(|e| Exercise {
            id: e.id,
            name: e.name,
            one_rm_kg: e.one_rm_kg,
        })
        .collect();

    let mut data = state.data.write().await;
    data.set_exercises(exercises);
    persist(&state, &data)?;

    Ok(Json(data.exercises().iter().map(exercise_json).collect()))
}

/// GET /api/sessions - Session list with entry counts.
async fn get_sessions(State(state): State<Arc<AppState>>) -> Json<Vec<SessionSummaryJson>> {
    let data = state.data.read().await;
    let summaries = data
        .sessions()
        .iter()
        .map(|s| SessionSummaryJson {
            id: s.id.clone(),
            name: s.name.clone(),
            exercise_count: s.exercises.len(),
        })
        .collect();
    Json(summaries)
}

/// GET /api/sessions/{id} - Full data for one session.
async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionJson>, StatusCode> {
    let data = state.data.read().await;
    let session = data.session(&id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(session_json(session)))
}

/// PUT /api/sessions/{id} - Create or replace a session.
async fn put_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<SessionUpsertJson>,
) -> Result<Json<SessionJson>, StatusCode> {
    let session = WorkoutSession {
        id: id.clone(),
        name: session_display_name(&body.name),
        exercises: body
            .exercises
            .into_iter()
            .map(|e| SessionExercise {
                exercise_id: e.exercise_id,
                format: e.format,
            })
            .collect(),
    };

    let mut data = state.data.write().await;
    data.upsert_session(session);
    persist(&state, &data)?;

    // The session was just upserted under this id
    let session = data.session(&id).ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(session_json(session)))
}

/// DELETE /api/sessions/{id} - Remove a session.
async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    let mut data = state.data.write().await;
    if !data.remove_session(&id) {
        return Err(StatusCode::NOT_FOUND);
    }
    persist(&state, &data)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/sessions/{id}/plan - Compute the day's loads for a session.
///
/// The body is the readiness check-in; omitted indicators default to GOOD.
async fn plan_workout(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(readiness): Json<ReadinessState>,
) -> Result<Json<SessionPlanJson>, StatusCode> {
    let data = state.data.read().await;
    let session = data.session(&id).ok_or(StatusCode::NOT_FOUND)?;
    let plan = plan_session(&data, session, readiness);
    Ok(Json(plan_json(plan)))
}

/// GET /api/formats - The prescription table for all workout formats.
async fn get_formats() -> Json<Vec<FormatJson>> {
    let formats = WorkoutFormat::all()
        .iter()
        .map(|f| FormatJson {
            id: f.id().to_string(),
            display_name: f.display_name().to_string(),
            base_percentage: base_percentage(*f),
        })
        .collect();
    Json(formats)
}

// === Helper Functions ===

/// Persists the profile behind a handler, mapping failures to a 500.
fn persist(state: &AppState, data: &Profile) -> Result<(), StatusCode> {
    store::save_profile(&state.file_path, data).map_err(|e| {
        log::error!("Failed to persist profile: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// Applies the fallback name for sessions saved without one.
fn session_display_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        UNTITLED_SESSION.to_string()
    } else {
        trimmed.to_string()
    }
}

fn exercise_json(exercise: &Exercise) -> ExerciseJson {
    ExerciseJson {
        id: exercise.id.clone(),
        name: exercise.name.clone(),
        one_rm_kg: exercise.one_rm_kg,
    }
}

fn session_json(session: &WorkoutSession) -> SessionJson {
    SessionJson {
        id: session.id.clone(),
        name: session.name.clone(),
        exercises: session
            .exercises
            .iter()
            .map(|e| SessionExerciseJson {
                exercise_id: e.exercise_id.clone(),
                format: e.format,
            })
            .collect(),
    }
}

fn plan_json(plan: SessionPlan) -> SessionPlanJson {
    SessionPlanJson {
        session_id: plan.session_id,
        session_name: plan.session_name,
        multiplier: plan.multiplier,
        adjustment_pct: plan.adjustment_pct,
        loads: plan
            .loads
            .into_iter()
            .map(|l| CalculatedLoadJson {
                exercise_id: l.exercise_id,
                exercise_name: l.exercise_name,
                format: l.format,
                format_display: l.format.display_name().to_string(),
                load_kg: l.load_kg,
            })
            .collect(),
    }
}
