use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Free-form plan inputs. Any JSON value is accepted; see
/// [`render_field`](crate::plans::prompts::render_field).
#[derive(Debug, Default, Deserialize)]
pub struct PlanRequest {
    pub segmento: Option<Value>,
    pub objetivo: Option<Value>,
    pub orcamento: Option<Value>,
    pub plataformas: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub ok: bool,
    pub plan: String,
}
