use axum::extract::State;
use axum::Json;

use crate::state::AppState;

/// GET / — liveness, tracked project count, and background queue counters.
pub async fn health_check(State(app): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "running",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "active_projects": app.orchestrator.active_projects(),
        "jobs_in_flight": app.orchestrator.jobs_in_flight(),
        "jobs_completed": app.orchestrator.jobs_completed(),
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chat_agent::{CompletionClient, ModelParams, Turn};
    use std::sync::Arc;
    use venture_core::{Orchestrator, OrchestratorConfig};

    struct EchoClient;

    #[async_trait]
    impl CompletionClient for EchoClient {
        async fn complete(
            &self,
            _params: &ModelParams,
            transcript: &[Turn],
        ) -> chat_agent::Result<String> {
            Ok(transcript
                .last()
                .map(|t| t.text.clone())
                .unwrap_or_default())
        }
    }

    #[tokio::test]
    async fn health_reports_running_and_project_count() {
        let app = AppState::new(Orchestrator::new(
            Arc::new(EchoClient),
            OrchestratorConfig::default(),
        ));
        let body = health_check(State(app)).await.0;
        assert_eq!(body["status"], "running");
        assert_eq!(body["active_projects"], 0);
        assert_eq!(body["jobs_in_flight"], 0);
        assert_eq!(body["jobs_completed"], 0);
        assert!(body["timestamp"].is_string());
    }
}
