use tracing::{info, warn};

use crate::{
    auth::repo::User,
    error::AppError,
    llm::TextGenerator,
    plans::{
        dto::PlanRequest,
        prompts::{build_plan_prompt, FALLBACK_PLAN, SYSTEM_PROMPT},
    },
};

pub const API_KEY_SETTING: &str = "OPENAI_API_KEY";

/// Generates an advertising plan for `user`. `generator` is `None` when no
/// API credential is configured.
pub async fn generate(
    generator: Option<&dyn TextGenerator>,
    user: &User,
    req: &PlanRequest,
) -> Result<String, AppError> {
    let generator = generator.ok_or_else(|| AppError::Config(API_KEY_SETTING.into()))?;

    let prompt = build_plan_prompt(&user.name, &user.plan, req);
    let text = generator.complete(SYSTEM_PROMPT, &prompt).await?;

    match text.filter(|t| !t.trim().is_empty()) {
        Some(plan) => {
            info!(user_id = %user.id, chars = plan.len(), "plan generated");
            Ok(plan)
        }
        None => {
            warn!(user_id = %user.id, "completion had no text; returning fallback");
            Ok(FALLBACK_PLAN.to_string())
        }
    }
}
