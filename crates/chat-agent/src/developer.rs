//! Developer role: requirements analysis, implementation planning, code
//! generation, and review, composed into one execute-plan pipeline.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::agent::Agent;
use crate::client::CompletionClient;
use crate::types::{ModelParams, Turn};
use crate::Result;

pub const DEFAULT_DEVELOPER_MODEL: &str = "gpt-4-turbo";
pub const DEFAULT_DEVELOPER_TEMPERATURE: f32 = 0.5;

const DEVELOPER_INSTRUCTION: &str = "\
You are an expert AI developer specialized in:
1. Implementing complex software systems
2. Writing clean, maintainable code
3. Following best practices and design patterns
4. Handling edge cases and error conditions
5. Creating comprehensive documentation

Always provide detailed implementation plans and code snippets when relevant.";

fn analysis_prompt(plan: &str) -> String {
    format!(
        "Analyze the following development plan and break down the technical requirements:\n\n\
         {plan}\n\n\
         Provide:\n\
         1. Core technology stack recommendations\n\
         2. External dependencies and libraries needed\n\
         3. API endpoints specification\n\
         4. Data models and schema definitions\n\
         5. Implementation complexity assessment\n\
         6. Potential technical challenges\n\
         7. Security considerations\n\n\
         Format as a structured technical analysis."
    )
}

fn implementation_prompt(requirements: &str) -> String {
    format!(
        "Create a detailed implementation plan for these requirements:\n\n\
         {requirements}\n\n\
         Include:\n\
         1. Step-by-step implementation tasks\n\
         2. Code structure and organization\n\
         3. Key functions and classes needed\n\
         4. Database migrations\n\
         5. API implementation details\n\
         6. Testing requirements\n\
         7. Deployment steps\n\n\
         Format as a structured development plan."
    )
}

fn code_prompt(component: &str, specs: &str) -> String {
    format!(
        "Generate implementation code for this component:\n\n\
         Component: {component}\n\
         Specifications: {specs}\n\n\
         Provide:\n\
         1. Complete code implementation\n\
         2. Inline documentation\n\
         3. Usage examples\n\
         4. Test cases\n\
         5. Error handling\n\
         6. Performance considerations\n\n\
         Format as a structured code document."
    )
}

fn review_prompt(code: &str) -> String {
    format!(
        "Review this code implementation:\n\n\
         {code}\n\n\
         Analyze for:\n\
         1. Code quality and best practices\n\
         2. Potential bugs or issues\n\
         3. Performance optimizations\n\
         4. Security vulnerabilities\n\
         5. Error handling improvements\n\
         6. Documentation completeness\n\n\
         Provide detailed feedback and suggestions."
    )
}

// ─── ExecutionReport ──────────────────────────────────────────────────────

/// Result of a full execute-plan run; each field is the raw assistant text
/// of one pipeline step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub requirements: String,
    pub implementation: String,
    pub code: String,
    pub review: String,
}

// ─── Developer ────────────────────────────────────────────────────────────

/// Conversational agent specialized for turning a plan into implementation
/// artifacts.
pub struct Developer {
    agent: Agent,
}

impl Developer {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        params: ModelParams,
        max_turns: Option<usize>,
    ) -> Self {
        Self {
            agent: Agent::new(client, DEVELOPER_INSTRUCTION, params).with_max_turns(max_turns),
        }
    }

    pub fn default_params() -> ModelParams {
        ModelParams::new(DEFAULT_DEVELOPER_MODEL, DEFAULT_DEVELOPER_TEMPERATURE)
    }

    pub async fn analyze_requirements(&mut self, plan: &str) -> Result<String> {
        self.agent.respond(analysis_prompt(plan)).await
    }

    pub async fn create_implementation_plan(&mut self, requirements: &str) -> Result<String> {
        self.agent.respond(implementation_prompt(requirements)).await
    }

    pub async fn generate_code(&mut self, component: &str, specs: &str) -> Result<String> {
        self.agent.respond(code_prompt(component, specs)).await
    }

    pub async fn review_code(&mut self, code: &str) -> Result<String> {
        self.agent.respond(review_prompt(code)).await
    }

    /// Run the fixed four-step pipeline, each step's output feeding the next
    /// verbatim. Fails fast: the first error aborts the run with no partial
    /// report (transcript turns appended up to that point remain).
    pub async fn execute_plan(&mut self, plan: &str) -> Result<ExecutionReport> {
        let requirements = self.analyze_requirements(plan).await?;
        let implementation = self.create_implementation_plan(&requirements).await?;
        let code = self.generate_code("core_system", &implementation).await?;
        let review = self.review_code(&code).await?;
        Ok(ExecutionReport {
            requirements,
            implementation,
            code,
            review,
        })
    }

    pub fn history(&self) -> &[Turn] {
        self.agent.history()
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
