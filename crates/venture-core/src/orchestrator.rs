//! The planner→developer pipeline state machine.
//!
//! Each project gets its own Planner and Developer at creation, so
//! transcripts never interleave across projects. Pipeline and refinement
//! runs execute as jobs on the shared [`WorkerPool`] and report progress by
//! mutating the project's status record; errors are caught at the job
//! boundary and surface only through status polls.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};

use chat_agent::{CompletionClient, Developer, ModelParams, Planner, Turn};

use crate::error::{Result, VentureError};
use crate::project::{ProjectPhase, ProjectStatus, Stage, StageKind};
use crate::store::{MemoryStore, StatusStore};
use crate::worker::WorkerPool;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub planner_params: ModelParams,
    pub developer_params: ModelParams,
    /// Cap on each agent transcript, in turns. Unbounded when unset.
    pub max_transcript_turns: Option<usize>,
    pub workers: usize,
    pub queue_depth: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            planner_params: Planner::default_params(),
            developer_params: Developer::default_params(),
            max_transcript_turns: None,
            workers: 4,
            queue_depth: 32,
        }
    }
}

// ---------------------------------------------------------------------------
// Per-project agents
// ---------------------------------------------------------------------------

/// The agent pair owned by one project. Async mutexes serialize pipeline
/// work against concurrent history reads and overlapping feedback runs.
#[derive(Clone)]
struct ProjectAgents {
    planner: Arc<Mutex<Planner>>,
    developer: Arc<Mutex<Developer>>,
}

/// Both transcripts of a project, as returned by the chat-history endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ChatHistory {
    pub planner_history: Vec<Turn>,
    pub developer_history: Vec<Turn>,
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct Orchestrator {
    store: Arc<dyn StatusStore>,
    client: Arc<dyn CompletionClient>,
    agents: Arc<RwLock<HashMap<String, ProjectAgents>>>,
    pool: Arc<WorkerPool>,
    next_id: Arc<AtomicU64>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(client: Arc<dyn CompletionClient>, config: OrchestratorConfig) -> Self {
        Self::with_store(Arc::new(MemoryStore::default()), client, config)
    }

    pub fn with_store(
        store: Arc<dyn StatusStore>,
        client: Arc<dyn CompletionClient>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            store,
            client,
            agents: Arc::new(RwLock::new(HashMap::new())),
            pool: Arc::new(WorkerPool::new(config.workers, config.queue_depth)),
            next_id: Arc::new(AtomicU64::new(0)),
            config,
        }
    }

    /// Allocate a project, queue its pipeline, and return the `started`
    /// snapshot without waiting for any agent work.
    pub async fn create_project(
        &self,
        project_type: impl Into<String>,
        requirements: Option<String>,
        constraints: Option<serde_json::Value>,
    ) -> Result<ProjectStatus> {
        let id = format!("proj_{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);

        let agents = ProjectAgents {
            planner: Arc::new(Mutex::new(Planner::new(
                self.client.clone(),
                self.config.planner_params.clone(),
                self.config.max_transcript_turns,
            ))),
            developer: Arc::new(Mutex::new(Developer::new(
                self.client.clone(),
                self.config.developer_params.clone(),
                self.config.max_transcript_turns,
            ))),
        };
        self.agents.write().await.insert(id.clone(), agents);

        let status = ProjectStatus::new(&id, project_type, requirements, constraints);
        self.store.insert(status.clone());

        let this = self.clone();
        let job_id = id.clone();
        self.pool
            .submit(async move { this.run_pipeline(job_id).await })
            .await?;

        tracing::info!(project = %id, "project created, pipeline queued");
        Ok(status)
    }

    pub fn get_status(&self, id: &str) -> Result<ProjectStatus> {
        self.store
            .get(id)
            .ok_or_else(|| VentureError::ProjectNotFound(id.to_string()))
    }

    /// Mark the project `refining` and queue the refinement run. Unknown ids
    /// fail here, before any work is scheduled.
    pub async fn submit_feedback(
        &self,
        id: &str,
        feedback: impl Into<String>,
    ) -> Result<ProjectStatus> {
        let mut status = self.get_status(id)?;
        self.store.set_phase(id, ProjectPhase::Refining);
        status.status = ProjectPhase::Refining;

        let this = self.clone();
        let job_id = id.to_string();
        let feedback = feedback.into();
        self.pool
            .submit(async move { this.run_refinement(job_id, feedback).await })
            .await?;

        tracing::info!(project = %id, "feedback received, refinement queued");
        Ok(status)
    }

    /// Both transcripts for the project's own agents.
    pub async fn chat_history(&self, id: &str) -> Result<ChatHistory> {
        let agents = self.project_agents(id).await?;
        let planner_history = agents.planner.lock().await.history().to_vec();
        let developer_history = agents.developer.lock().await.history().to_vec();
        Ok(ChatHistory {
            planner_history,
            developer_history,
        })
    }

    pub fn active_projects(&self) -> usize {
        self.store.len()
    }

    pub fn jobs_in_flight(&self) -> usize {
        self.pool.in_flight()
    }

    pub fn jobs_completed(&self) -> usize {
        self.pool.completed()
    }

    /// Drain queued pipeline runs and stop the workers.
    pub async fn shutdown(&self) {
        self.pool.shutdown().await;
    }

    // ── Pipeline execution ────────────────────────────────────────────────

    async fn run_pipeline(&self, id: String) {
        match self.pipeline_steps(&id).await {
            Ok(()) => tracing::info!(project = %id, "pipeline completed"),
            Err(e) => {
                tracing::error!(project = %id, error = %e, "pipeline failed");
                self.store
                    .record_failure(&id, ProjectPhase::Failed, &e.to_string());
            }
        }
    }

    async fn pipeline_steps(&self, id: &str) -> Result<()> {
        let agents = self.project_agents(id).await?;

        self.store.set_phase(id, ProjectPhase::Brainstorming);
        let ideas = agents.planner.lock().await.brainstorm_ideas().await?;
        self.store
            .record_stage(id, Stage::text(StageKind::Brainstorming, ideas.clone()));

        self.store.set_phase(id, ProjectPhase::Planning);
        let plan = agents.planner.lock().await.create_plan(&ideas).await?;
        self.store
            .record_stage(id, Stage::text(StageKind::Planning, plan.clone()));

        self.store.set_phase(id, ProjectPhase::Implementing);
        let report = agents.developer.lock().await.execute_plan(&plan).await?;
        self.store
            .record_stage(id, Stage::report(StageKind::Implementing, report));

        self.store.set_phase(id, ProjectPhase::Completed);
        Ok(())
    }

    async fn run_refinement(&self, id: String, feedback: String) {
        match self.refinement_steps(&id, &feedback).await {
            Ok(()) => tracing::info!(project = %id, "refinement completed"),
            Err(e) => {
                tracing::error!(project = %id, error = %e, "refinement failed");
                self.store
                    .record_failure(&id, ProjectPhase::RefinementFailed, &e.to_string());
            }
        }
    }

    async fn refinement_steps(&self, id: &str, feedback: &str) -> Result<()> {
        let agents = self.project_agents(id).await?;

        let status = self.get_status(id)?;
        let plan = status
            .latest_plan()
            .map(str::to_owned)
            .ok_or_else(|| VentureError::NoPriorPlan(id.to_string()))?;

        let refined = agents
            .planner
            .lock()
            .await
            .refine_plan(&plan, feedback)
            .await?;
        self.store
            .record_stage(id, Stage::text(StageKind::Refinement, refined.clone()));

        let report = agents.developer.lock().await.execute_plan(&refined).await?;
        self.store
            .record_stage(id, Stage::report(StageKind::RefinedImplementation, report));

        self.store.set_phase(id, ProjectPhase::Completed);
        Ok(())
    }

    async fn project_agents(&self, id: &str) -> Result<ProjectAgents> {
        self.agents
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| VentureError::ProjectNotFound(id.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chat_agent::{ChatAgentError, Role};
    use std::collections::HashSet;
    use std::time::Duration;
    use tokio::sync::Notify;

    /// Replies with the text of the latest user turn.
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

    struct FailingClient;

    #[async_trait]
    impl CompletionClient for FailingClient {
        async fn complete(
            &self,
            _params: &ModelParams,
            _transcript: &[Turn],
        ) -> chat_agent::Result<String> {
            Err(ChatAgentError::Api {
                status: 500,
                body: "model exploded".into(),
            })
        }
    }

    /// Blocks every completion until released, so tests can observe
    /// pre-pipeline state deterministically.
    struct GatedClient {
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl CompletionClient for GatedClient {
        async fn complete(
            &self,
            _params: &ModelParams,
            transcript: &[Turn],
        ) -> chat_agent::Result<String> {
            self.gate.notified().await;
            Ok(transcript
                .last()
                .map(|t| t.text.clone())
                .unwrap_or_default())
        }
    }

    fn orchestrator(client: Arc<dyn CompletionClient>) -> Orchestrator {
        Orchestrator::new(
            client,
            OrchestratorConfig {
                workers: 2,
                queue_depth: 32,
                ..OrchestratorConfig::default()
            },
        )
    }

    async fn wait_for_phase(orch: &Orchestrator, id: &str, phase: ProjectPhase) -> ProjectStatus {
        for _ in 0..500 {
            let status = orch.get_status(id).unwrap();
            if status.status == phase {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!(
            "project {id} never reached {phase}, stuck at {}",
            orch.get_status(id).unwrap().status
        );
    }

    #[tokio::test]
    async fn create_project_returns_started_with_no_stages() {
        let gate = Arc::new(Notify::new());
        let orch = orchestrator(Arc::new(GatedClient { gate: gate.clone() }));

        let status = orch
            .create_project("web_app", Some("a shop".into()), None)
            .await
            .unwrap();
        assert_eq!(status.id, "proj_1");
        assert_eq!(status.status, ProjectPhase::Started);
        assert!(status.stages.is_empty());

        // Pipeline is parked on the gate: polling still sees pre-completion state.
        let polled = orch.get_status("proj_1").unwrap();
        assert!(polled.stages.is_empty());
        assert!(!polled.status.is_terminal());
    }

    #[tokio::test]
    async fn pipeline_records_three_stages_in_order() {
        let orch = orchestrator(Arc::new(EchoClient));
        let id = orch.create_project("web_app", None, None).await.unwrap().id;

        let status = wait_for_phase(&orch, &id, ProjectPhase::Completed).await;
        let kinds: Vec<StageKind> = status.stages.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                StageKind::Brainstorming,
                StageKind::Planning,
                StageKind::Implementing
            ]
        );
        assert!(status.stages[0].recorded_at < status.stages[1].recorded_at);
        assert!(status.stages[1].recorded_at < status.stages[2].recorded_at);
        assert!(status.error.is_none());
    }

    #[tokio::test]
    async fn pipeline_chains_plan_into_generated_code() {
        let orch = orchestrator(Arc::new(EchoClient));
        let id = orch.create_project("web_app", None, None).await.unwrap().id;

        let status = wait_for_phase(&orch, &id, ProjectPhase::Completed).await;
        let report = status.stages[2].outcome.as_report().unwrap();
        // With an echoing model, every prompt embeds its input verbatim, so
        // the generated code must contain the implementation plan's output.
        assert!(report.code.contains(&report.implementation));
        assert!(report.review.contains(&report.code));
    }

    #[tokio::test]
    async fn upstream_failure_marks_project_failed() {
        let orch = orchestrator(Arc::new(FailingClient));
        let id = orch.create_project("web_app", None, None).await.unwrap().id;

        let status = wait_for_phase(&orch, &id, ProjectPhase::Failed).await;
        assert!(status.stages.is_empty());
        assert!(status.error.as_deref().unwrap().contains("model exploded"));
    }

    #[tokio::test]
    async fn get_status_unknown_id_is_not_found() {
        let orch = orchestrator(Arc::new(EchoClient));
        let err = orch.get_status("proj_404").unwrap_err();
        assert!(matches!(err, VentureError::ProjectNotFound(_)));
    }

    #[tokio::test]
    async fn feedback_on_unknown_id_schedules_nothing() {
        let orch = orchestrator(Arc::new(EchoClient));
        let err = orch.submit_feedback("proj_404", "feedback").await.unwrap_err();
        assert!(matches!(err, VentureError::ProjectNotFound(_)));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(orch.jobs_completed(), 0);
    }

    #[tokio::test]
    async fn feedback_without_prior_plan_fails_refinement() {
        let orch = orchestrator(Arc::new(FailingClient));
        let id = orch.create_project("web_app", None, None).await.unwrap().id;
        wait_for_phase(&orch, &id, ProjectPhase::Failed).await;

        orch.submit_feedback(&id, "try again").await.unwrap();
        let status = wait_for_phase(&orch, &id, ProjectPhase::RefinementFailed).await;
        assert!(status
            .error
            .as_deref()
            .unwrap()
            .contains("no development plan recorded"));
    }

    #[tokio::test]
    async fn refinement_appends_stages_and_completes() {
        let orch = orchestrator(Arc::new(EchoClient));
        let id = orch.create_project("web_app", None, None).await.unwrap().id;
        wait_for_phase(&orch, &id, ProjectPhase::Completed).await;

        let snapshot = orch.submit_feedback(&id, "add rate limiting").await.unwrap();
        assert_eq!(snapshot.status, ProjectPhase::Refining);

        let status = wait_for_phase(&orch, &id, ProjectPhase::Completed).await;
        let kinds: Vec<StageKind> = status.stages.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                StageKind::Brainstorming,
                StageKind::Planning,
                StageKind::Implementing,
                StageKind::Refinement,
                StageKind::RefinedImplementation,
            ]
        );
        // The refined plan saw both the original plan and the feedback text.
        let refined = status.stages[3].outcome.as_text().unwrap();
        assert!(refined.contains("add rate limiting"));
    }

    #[tokio::test]
    async fn concurrent_creations_yield_unique_ids() {
        let orch = orchestrator(Arc::new(EchoClient));
        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..16 {
            let orch = orch.clone();
            tasks.spawn(async move {
                orch.create_project("web_app", None, None).await.unwrap().id
            });
        }
        let mut ids = HashSet::new();
        while let Some(id) = tasks.join_next().await {
            ids.insert(id.unwrap());
        }
        assert_eq!(ids.len(), 16);
        assert_eq!(orch.active_projects(), 16);
    }

    #[tokio::test]
    async fn chat_history_is_scoped_per_project() {
        let orch = orchestrator(Arc::new(EchoClient));
        let first = orch.create_project("web_app", None, None).await.unwrap().id;
        let second = orch.create_project("cli_tool", None, None).await.unwrap().id;
        wait_for_phase(&orch, &first, ProjectPhase::Completed).await;
        wait_for_phase(&orch, &second, ProjectPhase::Completed).await;

        let history = orch.chat_history(&first).await.unwrap();
        assert_eq!(history.planner_history[0].role, Role::System);
        // One brainstorm + one plan exchange on top of the instruction.
        assert_eq!(history.planner_history.len(), 5);
        // Four developer exchanges.
        assert_eq!(history.developer_history.len(), 9);

        let other = orch.chat_history(&second).await.unwrap();
        assert_eq!(other.planner_history.len(), 5);
    }

    #[tokio::test]
    async fn chat_history_unknown_id_is_not_found() {
        let orch = orchestrator(Arc::new(EchoClient));
        let err = orch.chat_history("proj_404").await.unwrap_err();
        assert!(matches!(err, VentureError::ProjectNotFound(_)));
    }

    #[tokio::test]
    async fn shutdown_drains_queued_pipelines() {
        let orch = orchestrator(Arc::new(EchoClient));
        let id = orch.create_project("web_app", None, None).await.unwrap().id;
        orch.shutdown().await;
        // The queued pipeline ran to completion before the workers exited.
        assert_eq!(orch.get_status(&id).unwrap().status, ProjectPhase::Completed);

        let err = orch.create_project("web_app", None, None).await.unwrap_err();
        assert!(matches!(err, VentureError::QueueClosed));
    }
}
