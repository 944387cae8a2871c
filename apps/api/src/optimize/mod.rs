// Resume optimization: forwards the draft to the chat-completion API and returns the
// rewritten JSON. All LLM calls go through llm_client.

pub mod handlers;
pub mod prompts;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::optimize::prompts::{build_optimize_prompt, OPTIMIZE_SYSTEM};

/// Rewrites a resume draft. The draft is arbitrary JSON; the result is whatever JSON the
/// backend returns, echoed to the caller unchanged.
#[async_trait]
pub trait ResumeOptimizer: Send + Sync {
    async fn optimize(&self, resume: &Value) -> Result<Value, AppError>;
}

/// Default optimizer backed by the chat-completion client.
pub struct LlmResumeOptimizer {
    llm: LlmClient,
}

impl LlmResumeOptimizer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ResumeOptimizer for LlmResumeOptimizer {
    async fn optimize(&self, resume: &Value) -> Result<Value, AppError> {
        let resume_json = serde_json::to_string_pretty(resume)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to serialize resume: {e}")))?;
        let prompt = build_optimize_prompt(&resume_json);

        let optimized: Value = self.llm.call_json(&prompt, OPTIMIZE_SYSTEM).await?;
        info!(model = self.llm.model(), "Resume optimized");
        Ok(optimized)
    }
}
