//! Core domain and pipeline orchestration for venture.
//!
//! The orchestrator drives the planner→developer pipeline for each project as
//! background work on a bounded queue, recording one stage per completed step
//! in an in-memory status store.

pub mod error;
pub mod orchestrator;
pub mod project;
pub mod store;
pub mod worker;

pub use error::{Result, VentureError};
pub use orchestrator::{ChatHistory, Orchestrator, OrchestratorConfig};
pub use project::{ProjectPhase, ProjectStatus, Stage, StageKind, StageOutcome};
pub use store::{MemoryStore, StatusStore};
pub use worker::WorkerPool;
