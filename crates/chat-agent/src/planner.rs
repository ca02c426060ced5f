//! Planner role: idea generation, plan drafting, and plan refinement.

use std::sync::Arc;

use crate::agent::Agent;
use crate::client::CompletionClient;
use crate::types::{ModelParams, Turn};
use crate::Result;

pub const DEFAULT_PLANNER_MODEL: &str = "claude-3";
pub const DEFAULT_PLANNER_TEMPERATURE: f32 = 0.7;

const PLANNER_INSTRUCTION: &str = "\
You are an expert AI project planner specialized in:
1. Breaking down complex projects into manageable tasks
2. Creating detailed technical specifications
3. Identifying potential challenges and solutions
4. Estimating resource requirements and timelines
5. Ensuring project feasibility and scalability

Always provide structured, detailed responses with clear reasoning.";

const BRAINSTORM_PROMPT: &str = "\
Generate 3 innovative AI-based business ideas. For each idea provide:
1. Concept overview
2. Target market
3. Technical requirements
4. Potential challenges
5. Revenue model
6. Initial development timeline

Format the response as a structured analysis.";

fn plan_prompt(selected_idea: &str) -> String {
    format!(
        "Create a comprehensive development plan for: {selected_idea}\n\n\
         Include:\n\
         1. System architecture overview\n\
         2. Core components and their interactions\n\
         3. API specifications\n\
         4. Database schema\n\
         5. Development phases with milestones\n\
         6. Testing strategy\n\
         7. Deployment considerations\n\
         8. Security measures\n\n\
         Format as a structured technical specification."
    )
}

fn refine_prompt(plan: &str, feedback: &str) -> String {
    format!(
        "Review and refine this development plan based on the feedback:\n\n\
         Current Plan:\n{plan}\n\n\
         Feedback:\n{feedback}\n\n\
         Provide a revised plan addressing the feedback points."
    )
}

// ─── Planner ──────────────────────────────────────────────────────────────

/// Conversational agent specialized for ideation and technical planning.
pub struct Planner {
    agent: Agent,
}

impl Planner {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        params: ModelParams,
        max_turns: Option<usize>,
    ) -> Self {
        Self {
            agent: Agent::new(client, PLANNER_INSTRUCTION, params).with_max_turns(max_turns),
        }
    }

    pub fn default_params() -> ModelParams {
        ModelParams::new(DEFAULT_PLANNER_MODEL, DEFAULT_PLANNER_TEMPERATURE)
    }

    /// Generate idea descriptions. The returned text is opaque; no structure
    /// is parsed out of it.
    pub async fn brainstorm_ideas(&mut self) -> Result<String> {
        self.agent.respond(BRAINSTORM_PROMPT).await
    }

    /// Draft a technical plan for the selected idea text.
    pub async fn create_plan(&mut self, selected_idea: &str) -> Result<String> {
        self.agent.respond(plan_prompt(selected_idea)).await
    }

    /// Revise an existing plan against caller feedback.
    pub async fn refine_plan(&mut self, plan: &str, feedback: &str) -> Result<String> {
        self.agent.respond(refine_prompt(plan, feedback)).await
    }

    pub fn history(&self) -> &[Turn] {
        self.agent.history()
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
