//! Project status records and the stages that accumulate on them.

use chat_agent::ExecutionReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// ProjectPhase
// ---------------------------------------------------------------------------

/// Lifecycle of a project: `started → brainstorming → planning → implementing
/// → completed`, with `failed` reachable from any point, and the refinement
/// branch `refining → completed | refinement_failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectPhase {
    Started,
    Brainstorming,
    Planning,
    Implementing,
    Completed,
    Failed,
    Refining,
    RefinementFailed,
}

impl ProjectPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectPhase::Started => "started",
            ProjectPhase::Brainstorming => "brainstorming",
            ProjectPhase::Planning => "planning",
            ProjectPhase::Implementing => "implementing",
            ProjectPhase::Completed => "completed",
            ProjectPhase::Failed => "failed",
            ProjectPhase::Refining => "refining",
            ProjectPhase::RefinementFailed => "refinement_failed",
        }
    }

    /// True once no further pipeline work will touch the project (absent new
    /// feedback submissions).
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ProjectPhase::Completed | ProjectPhase::Failed | ProjectPhase::RefinementFailed
        )
    }
}

impl fmt::Display for ProjectPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProjectPhase {
    type Err = crate::error::VentureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "started" => Ok(ProjectPhase::Started),
            "brainstorming" => Ok(ProjectPhase::Brainstorming),
            "planning" => Ok(ProjectPhase::Planning),
            "implementing" => Ok(ProjectPhase::Implementing),
            "completed" => Ok(ProjectPhase::Completed),
            "failed" => Ok(ProjectPhase::Failed),
            "refining" => Ok(ProjectPhase::Refining),
            "refinement_failed" => Ok(ProjectPhase::RefinementFailed),
            _ => Err(crate::error::VentureError::InvalidPhase(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// StageKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Brainstorming,
    Planning,
    Implementing,
    Refinement,
    RefinedImplementation,
}

impl StageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StageKind::Brainstorming => "brainstorming",
            StageKind::Planning => "planning",
            StageKind::Implementing => "implementing",
            StageKind::Refinement => "refinement",
            StageKind::RefinedImplementation => "refined_implementation",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StageKind {
    type Err = crate::error::VentureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "brainstorming" => Ok(StageKind::Brainstorming),
            "planning" => Ok(StageKind::Planning),
            "implementing" => Ok(StageKind::Implementing),
            "refinement" => Ok(StageKind::Refinement),
            "refined_implementation" => Ok(StageKind::RefinedImplementation),
            _ => Err(crate::error::VentureError::InvalidStage(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// Output of one completed pipeline step: planner stages carry free text,
/// implementation stages a full [`ExecutionReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StageOutcome {
    Text(String),
    Report(ExecutionReport),
}

impl StageOutcome {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            StageOutcome::Text(text) => Some(text),
            StageOutcome::Report(_) => None,
        }
    }

    pub fn as_report(&self) -> Option<&ExecutionReport> {
        match self {
            StageOutcome::Text(_) => None,
            StageOutcome::Report(report) => Some(report),
        }
    }
}

/// One immutable record of a completed pipeline step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    #[serde(rename = "stage")]
    pub kind: StageKind,
    #[serde(rename = "result")]
    pub outcome: StageOutcome,
    #[serde(rename = "timestamp")]
    pub recorded_at: DateTime<Utc>,
}

impl Stage {
    pub fn text(kind: StageKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            outcome: StageOutcome::Text(text.into()),
            recorded_at: Utc::now(),
        }
    }

    pub fn report(kind: StageKind, report: ExecutionReport) -> Self {
        Self {
            kind,
            outcome: StageOutcome::Report(report),
            recorded_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// ProjectStatus
// ---------------------------------------------------------------------------

/// Mutable status record for one project. Created on request, appended to as
/// pipeline steps complete, never deleted for the process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectStatus {
    pub id: String,
    pub status: ProjectPhase,
    pub created_at: DateTime<Utc>,
    pub project_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraints: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub stages: Vec<Stage>,
}

impl ProjectStatus {
    pub fn new(
        id: impl Into<String>,
        project_type: impl Into<String>,
        requirements: Option<String>,
        constraints: Option<serde_json::Value>,
    ) -> Self {
        Self {
            id: id.into(),
            status: ProjectPhase::Started,
            created_at: Utc::now(),
            project_type: project_type.into(),
            requirements,
            constraints,
            error: None,
            stages: Vec::new(),
        }
    }

    /// The most recent `planning` stage text, if any. Refinement starts from
    /// this, never from a refined plan recorded later.
    pub fn latest_plan(&self) -> Option<&str> {
        self.stages
            .iter()
            .rev()
            .filter(|stage| stage.kind == StageKind::Planning)
            .find_map(|stage| stage.outcome.as_text())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn phase_round_trips_through_str() {
        for phase in [
            ProjectPhase::Started,
            ProjectPhase::Brainstorming,
            ProjectPhase::Planning,
            ProjectPhase::Implementing,
            ProjectPhase::Completed,
            ProjectPhase::Failed,
            ProjectPhase::Refining,
            ProjectPhase::RefinementFailed,
        ] {
            assert_eq!(ProjectPhase::from_str(phase.as_str()).unwrap(), phase);
        }
    }

    #[test]
    fn unknown_phase_is_rejected() {
        assert!(ProjectPhase::from_str("shipping").is_err());
    }

    #[test]
    fn terminal_phases() {
        assert!(ProjectPhase::Completed.is_terminal());
        assert!(ProjectPhase::Failed.is_terminal());
        assert!(ProjectPhase::RefinementFailed.is_terminal());
        assert!(!ProjectPhase::Refining.is_terminal());
        assert!(!ProjectPhase::Started.is_terminal());
    }

    #[test]
    fn stage_kind_serializes_snake_case() {
        let json = serde_json::to_string(&StageKind::RefinedImplementation).unwrap();
        assert_eq!(json, "\"refined_implementation\"");
    }

    #[test]
    fn stage_serializes_with_wire_keys() {
        let stage = Stage::text(StageKind::Brainstorming, "three ideas");
        let json = serde_json::to_value(&stage).unwrap();
        assert_eq!(json["stage"], "brainstorming");
        assert_eq!(json["result"], "three ideas");
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn report_outcome_serializes_as_object() {
        let stage = Stage::report(
            StageKind::Implementing,
            chat_agent::ExecutionReport {
                requirements: "r".into(),
                implementation: "i".into(),
                code: "c".into(),
                review: "v".into(),
            },
        );
        let json = serde_json::to_value(&stage).unwrap();
        assert_eq!(json["result"]["code"], "c");
    }

    #[test]
    fn new_status_is_started_with_no_stages() {
        let status = ProjectStatus::new("proj_1", "web_app", None, None);
        assert_eq!(status.status, ProjectPhase::Started);
        assert!(status.stages.is_empty());
        assert!(status.error.is_none());
    }

    #[test]
    fn latest_plan_prefers_most_recent_planning_stage() {
        let mut status = ProjectStatus::new("proj_1", "web_app", None, None);
        status.stages.push(Stage::text(StageKind::Planning, "plan v1"));
        status
            .stages
            .push(Stage::text(StageKind::Refinement, "refined plan"));
        status.stages.push(Stage::text(StageKind::Planning, "plan v2"));
        assert_eq!(status.latest_plan(), Some("plan v2"));
    }

    #[test]
    fn latest_plan_is_none_without_planning_stage() {
        let mut status = ProjectStatus::new("proj_1", "web_app", None, None);
        status
            .stages
            .push(Stage::text(StageKind::Brainstorming, "ideas"));
        assert_eq!(status.latest_plan(), None);
    }

    #[test]
    fn optional_fields_are_omitted_from_json() {
        let status = ProjectStatus::new("proj_1", "web_app", None, None);
        let json = serde_json::to_value(&status).unwrap();
        assert!(json.get("requirements").is_none());
        assert!(json.get("error").is_none());
        assert_eq!(json["status"], "started");
    }
}
