use thiserror::Error;

#[derive(Debug, Error)]
pub enum VentureError {
    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("no development plan recorded for project {0}")]
    NoPriorPlan(String),

    #[error("invalid project phase: {0}")]
    InvalidPhase(String),

    #[error("invalid stage kind: {0}")]
    InvalidStage(String),

    #[error("background task queue is closed")]
    QueueClosed,

    #[error(transparent)]
    Upstream(#[from] chat_agent::ChatAgentError),
}

pub type Result<T> = std::result::Result<T, VentureError>;
