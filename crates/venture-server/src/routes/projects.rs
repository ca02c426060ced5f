use axum::extract::{Path, State};
use axum::Json;

use venture_core::{ChatHistory, ProjectStatus};

use crate::error::AppError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[derive(Debug, serde::Deserialize)]
pub struct CreateProjectBody {
    pub project_type: String,
    #[serde(default)]
    pub requirements: Option<String>,
    #[serde(default)]
    pub constraints: Option<serde_json::Value>,
}

/// POST /projects/ — create a project and queue the agent pipeline.
pub async fn create_project(
    State(app): State<AppState>,
    Json(body): Json<CreateProjectBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let status = app
        .orchestrator
        .create_project(body.project_type, body.requirements, body.constraints)
        .await?;
    Ok(Json(serde_json::json!({
        "project_id": status.id,
        "message": "AI agents started working on the project",
        "status": status,
    })))
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// GET /projects/:id — current status and accumulated stages.
pub async fn get_project(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProjectStatus>, AppError> {
    Ok(Json(app.orchestrator.get_status(&id)?))
}

// ---------------------------------------------------------------------------
// Feedback
// ---------------------------------------------------------------------------

#[derive(Debug, serde::Deserialize)]
pub struct FeedbackBody {
    /// Accepted for wire compatibility; the path id is authoritative.
    #[serde(default)]
    #[allow(dead_code)]
    pub project_id: Option<String>,
    pub feedback: String,
}

/// POST /projects/:id/feedback — queue a refinement run.
pub async fn submit_feedback(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<FeedbackBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let status = app.orchestrator.submit_feedback(&id, body.feedback).await?;
    Ok(Json(serde_json::json!({
        "message": "Feedback received, refining project",
        "status": status,
    })))
}

// ---------------------------------------------------------------------------
// Chat history
// ---------------------------------------------------------------------------

/// GET /projects/:id/chat_history — both agent transcripts for the project.
pub async fn chat_history(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ChatHistory>, AppError> {
    Ok(Json(app.orchestrator.chat_history(&id).await?))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
