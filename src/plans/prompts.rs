use serde_json::Value;

use crate::plans::dto::PlanRequest;

pub const SYSTEM_PROMPT: &str = "Você é um especialista em tráfego pago e mídia online.";

pub const FALLBACK_PLAN: &str = "Não foi possível gerar o planejamento. Tente novamente.";

pub const NOT_INFORMED: &str = "não informado";

/// Text for one free-form input; blank or absent values become [`NOT_INFORMED`].
pub fn render_field(value: Option<&Value>) -> String {
    let rendered = match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| render_field(Some(v)))
            .filter(|s| s != NOT_INFORMED)
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
    };
    if rendered.is_empty() {
        NOT_INFORMED.to_string()
    } else {
        rendered
    }
}

pub fn build_plan_prompt(name: &str, plan_tier: &str, req: &PlanRequest) -> String {
    format!(
        "Você é um planejador de tráfego pago sênior. Crie um plano completo de mídia paga de 30 dias.

Dados do usuário:
- Nome: {name}
- Plano: {plan_tier}

Negócio / Nicho: {segmento}
Objetivo principal: {objetivo}
Orçamento mensal: {orcamento}
Plataformas desejadas: {plataformas}

Entregue o plano no seguinte formato:

1. Resumo da estratégia
2. Público-alvo e segmentações sugeridas
3. Estrutura de campanhas e conjuntos de anúncios
4. Sugestões de criativos (imagens, vídeos, copies)
5. Distribuição do orçamento (por plataforma e campanha)
6. Métricas principais para acompanhar
7. Sugestões de testes A/B para os 30 dias
",
        segmento = render_field(req.segmento.as_ref()),
        objetivo = render_field(req.objetivo.as_ref()),
        orcamento = render_field(req.orcamento.as_ref()),
        plataformas = render_field(req.plataformas.as_ref()),
    )
}
