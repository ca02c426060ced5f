//! Status storage behind a trait so the in-memory map can later be swapped
//! for a durable backend without touching the orchestrator.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::project::{ProjectPhase, ProjectStatus, Stage};

// ---------------------------------------------------------------------------
// StatusStore
// ---------------------------------------------------------------------------

/// Key-value view of project status records. All mutation goes through
/// single-key operations so implementations can serialize writers per key.
pub trait StatusStore: Send + Sync {
    fn insert(&self, status: ProjectStatus);

    /// Snapshot of a project's current record.
    fn get(&self, id: &str) -> Option<ProjectStatus>;

    /// Returns false when the project is unknown.
    fn set_phase(&self, id: &str, phase: ProjectPhase) -> bool;

    /// Append a completed stage. Returns false when the project is unknown.
    fn record_stage(&self, id: &str, stage: Stage) -> bool;

    /// Move the project to a terminal failure phase and record the message.
    fn record_failure(&self, id: &str, phase: ProjectPhase, message: &str) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// Process-lifetime in-memory store. Records are never evicted.
#[derive(Default)]
pub struct MemoryStore {
    projects: RwLock<HashMap<String, ProjectStatus>>,
}

impl StatusStore for MemoryStore {
    fn insert(&self, status: ProjectStatus) {
        self.projects
            .write()
            .expect("status store lock poisoned")
            .insert(status.id.clone(), status);
    }

    fn get(&self, id: &str) -> Option<ProjectStatus> {
        self.projects
            .read()
            .expect("status store lock poisoned")
            .get(id)
            .cloned()
    }

    fn set_phase(&self, id: &str, phase: ProjectPhase) -> bool {
        let mut projects = self.projects.write().expect("status store lock poisoned");
        match projects.get_mut(id) {
            Some(status) => {
                status.status = phase;
                true
            }
            None => false,
        }
    }

    fn record_stage(&self, id: &str, stage: Stage) -> bool {
        let mut projects = self.projects.write().expect("status store lock poisoned");
        match projects.get_mut(id) {
            Some(status) => {
                status.stages.push(stage);
                true
            }
            None => false,
        }
    }

    fn record_failure(&self, id: &str, phase: ProjectPhase, message: &str) -> bool {
        let mut projects = self.projects.write().expect("status store lock poisoned");
        match projects.get_mut(id) {
            Some(status) => {
                status.status = phase;
                status.error = Some(message.to_string());
                true
            }
            None => false,
        }
    }

    fn len(&self) -> usize {
        self.projects
            .read()
            .expect("status store lock poisoned")
            .len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::StageKind;

    fn store_with_project(id: &str) -> MemoryStore {
        let store = MemoryStore::default();
        store.insert(ProjectStatus::new(id, "web_app", None, None));
        store
    }

    #[test]
    fn insert_and_get_snapshot() {
        let store = store_with_project("proj_1");
        let status = store.get("proj_1").unwrap();
        assert_eq!(status.id, "proj_1");
        assert_eq!(status.status, ProjectPhase::Started);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn get_unknown_returns_none() {
        let store = MemoryStore::default();
        assert!(store.get("proj_9").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn set_phase_updates_record() {
        let store = store_with_project("proj_1");
        assert!(store.set_phase("proj_1", ProjectPhase::Brainstorming));
        assert_eq!(
            store.get("proj_1").unwrap().status,
            ProjectPhase::Brainstorming
        );
    }

    #[test]
    fn mutations_on_unknown_id_return_false() {
        let store = MemoryStore::default();
        assert!(!store.set_phase("proj_9", ProjectPhase::Completed));
        assert!(!store.record_stage("proj_9", Stage::text(StageKind::Planning, "p")));
        assert!(!store.record_failure("proj_9", ProjectPhase::Failed, "oops"));
    }

    #[test]
    fn record_stage_appends_in_order() {
        let store = store_with_project("proj_1");
        store.record_stage("proj_1", Stage::text(StageKind::Brainstorming, "ideas"));
        store.record_stage("proj_1", Stage::text(StageKind::Planning, "plan"));
        let stages = store.get("proj_1").unwrap().stages;
        assert_eq!(stages.len(), 2);
        assert_eq!(stages[0].kind, StageKind::Brainstorming);
        assert_eq!(stages[1].kind, StageKind::Planning);
    }

    #[test]
    fn record_failure_sets_phase_and_message() {
        let store = store_with_project("proj_1");
        store.record_failure("proj_1", ProjectPhase::Failed, "completion timed out");
        let status = store.get("proj_1").unwrap();
        assert_eq!(status.status, ProjectPhase::Failed);
        assert_eq!(status.error.as_deref(), Some("completion timed out"));
    }

    #[test]
    fn snapshots_do_not_alias_the_stored_record() {
        let store = store_with_project("proj_1");
        let mut snapshot = store.get("proj_1").unwrap();
        snapshot.status = ProjectPhase::Completed;
        assert_eq!(store.get("proj_1").unwrap().status, ProjectPhase::Started);
    }
}
